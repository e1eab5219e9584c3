//! JavaScript and VBScript string literal encoding.

use crate::table::{EscapeTable, Lookup};
use std::fmt::Write;
use std::sync::LazyLock;

fn literal_safe(cp: u32) -> bool {
    char::from_u32(cp).is_some_and(|ch| ch.is_ascii_alphanumeric() || matches!(ch, ' ' | ',' | '.' | '_'))
}

static JAVASCRIPT: LazyLock<EscapeTable> = LazyLock::new(|| {
    EscapeTable::escape_all("javascript", 256, |cp| format!("\\x{cp:02x}")).punch_where(literal_safe)
});

static VBSCRIPT: LazyLock<EscapeTable> = LazyLock::new(|| {
    EscapeTable::escape_all("vbscript", 256, |cp| format!("chrw({cp})")).punch_where(literal_safe)
});

pub(crate) fn javascript_chars(chars: impl Iterator<Item = char>, emit_quotes: bool, out: &mut String) {
    if emit_quotes {
        out.push('\'');
    }
    for ch in chars {
        match JAVASCRIPT.lookup(ch as u32) {
            Lookup::Safe => out.push(ch),
            Lookup::Escape(replacement) => out.push_str(replacement),
            Lookup::Fallback => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
        }
    }
    if emit_quotes {
        out.push('\'');
    }
}

/// Encode text for a JavaScript string literal.
///
/// With `emit_quotes` the result is wrapped in single quotes. Empty input
/// stays empty either way.
pub fn javascript_encode(input: &str, emit_quotes: bool) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(input.len() * 2 + 2);
    javascript_chars(input.chars(), emit_quotes, &mut out);
    out
}

pub(crate) fn vbscript_chars(chars: impl Iterator<Item = char>, out: &mut String) {
    let mut in_literal = false;
    let mut pieces = 0usize;
    let mut open_piece = |out: &mut String| {
        if pieces > 0 {
            out.push('&');
        }
        pieces += 1;
    };
    for ch in chars {
        match VBSCRIPT.lookup(ch as u32) {
            Lookup::Safe => {
                if !in_literal {
                    open_piece(out);
                    out.push('"');
                    in_literal = true;
                }
                out.push(ch);
            }
            other => {
                if in_literal {
                    out.push('"');
                    in_literal = false;
                }
                match other {
                    Lookup::Escape(replacement) => {
                        open_piece(out);
                        out.push_str(replacement);
                    }
                    _ => {
                        let mut units = [0u16; 2];
                        for unit in ch.encode_utf16(&mut units) {
                            open_piece(out);
                            let _ = write!(out, "chrw({unit})");
                        }
                    }
                }
            }
        }
    }
    if in_literal {
        out.push('"');
    }
}

/// Encode text as a VBScript string expression: quoted runs of safe
/// characters and `chrw(N)` calls, joined with `&`.
pub fn visual_basic_script_encode(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(input.len() * 2 + 2);
    vbscript_chars(input.chars(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn javascript_escapes() {
        assert_eq!(javascript_encode("a'b", false), "a\\x27b");
        assert_eq!(javascript_encode("<x>", true), "'\\x3cx\\x3e'");
        assert_eq!(javascript_encode("é", false), "\\xe9");
        assert_eq!(javascript_encode("\u{2028}", false), "\\u2028");
        assert_eq!(javascript_encode("\u{1F600}", false), "\\ud83d\\ude00");
        assert_eq!(javascript_encode("", true), "");
    }

    #[test]
    fn vbscript_joins_literals_and_calls() {
        assert_eq!(visual_basic_script_encode("ab"), "\"ab\"");
        assert_eq!(visual_basic_script_encode("a'b"), "\"a\"&chrw(39)&\"b\"");
        assert_eq!(visual_basic_script_encode("''"), "chrw(39)&chrw(39)");
        assert_eq!(
            visual_basic_script_encode("\u{1F600}x"),
            "chrw(55357)&chrw(56832)&\"x\""
        );
    }
}
