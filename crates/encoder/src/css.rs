//! CSS string and identifier encoding.
//!
//! ASCII letters and digits pass through. Everything else is a backslash
//! followed by the lowercase hex code point. A hex escape swallows the
//! following hex digits, so a space separates it from a literal hex digit.

use crate::table::{EscapeTable, Lookup, alphanumeric};
use std::fmt::Write;
use std::sync::LazyLock;

static TABLE: LazyLock<EscapeTable> = LazyLock::new(|| {
    EscapeTable::escape_all("css", 256, |cp| format!("\\{cp:x}")).punch_where(alphanumeric)
});

pub(crate) fn encode_chars(chars: impl Iterator<Item = char>, out: &mut String) {
    let mut after_escape = false;
    for ch in chars {
        match TABLE.lookup(ch as u32) {
            Lookup::Safe => {
                if after_escape && ch.is_ascii_hexdigit() {
                    out.push(' ');
                }
                out.push(ch);
                after_escape = false;
            }
            Lookup::Escape(replacement) => {
                out.push_str(replacement);
                after_escape = true;
            }
            Lookup::Fallback => {
                let _ = write!(out, "\\{:x}", ch as u32);
                after_escape = true;
            }
        }
    }
}

pub fn css_encode(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(input.len() * 2);
    encode_chars(input.chars(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_pass_and_symbols_escape() {
        assert_eq!(css_encode("a"), "a");
        assert_eq!(css_encode("*"), "\\2a");
        assert_eq!(css_encode("a b"), "a\\20 b");
        assert_eq!(css_encode("x:y"), "x\\3ay");
    }

    #[test]
    fn hex_digit_after_escape_is_separated() {
        assert_eq!(css_encode("*1"), "\\2a 1");
        assert_eq!(css_encode("*g"), "\\2ag");
        assert_eq!(css_encode("**"), "\\2a\\2a");
    }

    #[test]
    fn non_ascii_uses_the_code_point() {
        assert_eq!(css_encode("é"), "\\e9");
        assert_eq!(css_encode("\u{1F600}"), "\\1f600");
        assert_eq!(css_encode(""), "");
    }
}
