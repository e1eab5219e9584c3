//! HTML and XML text and attribute encoding.
//!
//! The safe list decides which characters pass through. Everything else
//! becomes a named entity for the markup specials or `&#decimal;`.

use crate::safe_list::{self, SafeList};
use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flavor {
    Html,
    HtmlAttribute,
    Xml,
    XmlAttribute,
}

impl Flavor {
    /// Per-flavor replacements consulted before the safe list.
    fn tweak(self, ch: char) -> Option<&'static str> {
        match (self, ch) {
            (Flavor::Xml | Flavor::XmlAttribute, '\'') => Some("&apos;"),
            (Flavor::HtmlAttribute | Flavor::XmlAttribute, ' ') => Some("&#32;"),
            _ => None,
        }
    }
}

fn escape(ch: char, out: &mut String) {
    match ch {
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '&' => out.push_str("&amp;"),
        '"' => out.push_str("&quot;"),
        // `&#0;` is not a valid reference; parsers read it as U+FFFD anyway.
        '\0' => out.push_str("&#65533;"),
        _ => {
            let _ = write!(out, "&#{};", ch as u32);
        }
    }
}

pub(crate) fn encode_chars(flavor: Flavor, chars: impl Iterator<Item = char>, out: &mut String) {
    let list = safe_list::snapshot();
    encode_with(&list, flavor, chars, out);
}

fn encode_with(
    list: &SafeList,
    flavor: Flavor,
    chars: impl Iterator<Item = char>,
    out: &mut String,
) {
    for ch in chars {
        if let Some(tweak) = flavor.tweak(ch) {
            out.push_str(tweak);
        } else if list.is_safe(ch) {
            out.push(ch);
        } else {
            escape(ch, out);
        }
    }
}

fn encode(flavor: Flavor, input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    encode_chars(flavor, input.chars(), &mut out);
    out
}

/// Encode text for an HTML element body.
pub fn html_encode(input: &str) -> String {
    encode(Flavor::Html, input)
}

/// Encode text for a quoted or unquoted HTML attribute value.
pub fn html_attribute_encode(input: &str) -> String {
    encode(Flavor::HtmlAttribute, input)
}

pub fn xml_encode(input: &str) -> String {
    encode(Flavor::Xml, input)
}

pub fn xml_attribute_encode(input: &str) -> String {
    encode(Flavor::XmlAttribute, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{CodeCharts, LowerCodeCharts};

    #[test]
    fn script_tag() {
        assert_eq!(
            html_encode("<script>alert('x');</script>"),
            "&lt;script&gt;alert(&#39;x&#39;);&lt;/script&gt;"
        );
    }

    #[test]
    fn flavors_differ_on_apostrophe_and_space() {
        assert_eq!(html_encode("a 'b'"), "a &#39;b&#39;");
        assert_eq!(html_attribute_encode("a 'b'"), "a&#32;&#39;b&#39;");
        assert_eq!(xml_encode("a 'b'"), "a &apos;b&apos;");
        assert_eq!(xml_attribute_encode("a \"b\""), "a&#32;&quot;b&quot;");
    }

    #[test]
    fn controls_and_astral_characters_are_numeric() {
        assert_eq!(html_encode("\t\n"), "&#9;&#10;");
        assert_eq!(html_encode("`"), "&#96;");
        assert_eq!(html_encode("\u{1F600}"), "&#128512;");
        assert_eq!(html_encode(""), "");
    }

    #[test]
    fn nul_becomes_the_replacement_character() {
        assert_eq!(html_encode("java\0script"), "java&#65533;script");
        assert_eq!(xml_attribute_encode("\0"), "&#65533;");
    }

    #[test]
    fn explicit_list_controls_pass_through() {
        let list = SafeList::build(CodeCharts {
            lower: LowerCodeCharts::CYRILLIC,
            ..CodeCharts::default()
        });
        let mut out = String::new();
        encode_with(&list, Flavor::Html, "жé&".chars(), &mut out);
        assert_eq!(out, "ж&#233;&amp;");
    }
}
