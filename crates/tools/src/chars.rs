//! Character classification for the markup and style scanners.
//!
//! ASCII lookups go through a 128-entry flag table; everything above ASCII is
//! classified as `NonAscii` and treated as a name character by both grammars.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Null,
    Control,
    Whitespace,
    Alpha,
    Numeric,
    Punctuation,
    NonAscii,
}

const ALPHA: u8 = 1 << 0;
const DIGIT: u8 = 1 << 1;
const HEX: u8 = 1 << 2;
const HTML_SPACE: u8 = 1 << 3;
const CSS_SPACE: u8 = 1 << 4;
const CONTROL: u8 = 1 << 5;
const PUNCT: u8 = 1 << 6;

const fn build_table() -> [u8; 128] {
    let mut table = [0u8; 128];
    let mut i = 0usize;
    while i < 128 {
        let b = i as u8;
        let mut flags = 0u8;
        if b.is_ascii_alphabetic() {
            flags |= ALPHA;
        }
        if b.is_ascii_digit() {
            flags |= DIGIT;
        }
        if b.is_ascii_hexdigit() {
            flags |= HEX;
        }
        // Both grammars use the same set: SPACE, TAB, LF, CR, FF.
        if matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C) {
            flags |= HTML_SPACE | CSS_SPACE;
        }
        if b < 0x20 || b == 0x7F {
            flags |= CONTROL;
        }
        if b.is_ascii_punctuation() {
            flags |= PUNCT;
        }
        table[i] = flags;
        i += 1;
    }
    table
}

static TABLE: [u8; 128] = build_table();

#[inline]
fn flags(ch: char) -> u8 {
    let cp = ch as u32;
    if cp < 128 { TABLE[cp as usize] } else { 0 }
}

pub fn classify(ch: char) -> CharClass {
    if ch == '\0' {
        return CharClass::Null;
    }
    if !ch.is_ascii() {
        return CharClass::NonAscii;
    }
    let f = flags(ch);
    if f & HTML_SPACE != 0 {
        CharClass::Whitespace
    } else if f & CONTROL != 0 {
        CharClass::Control
    } else if f & ALPHA != 0 {
        CharClass::Alpha
    } else if f & DIGIT != 0 {
        CharClass::Numeric
    } else {
        CharClass::Punctuation
    }
}

#[inline]
pub fn is_html_whitespace(ch: char) -> bool {
    flags(ch) & HTML_SPACE != 0
}

#[inline]
pub fn is_css_whitespace(ch: char) -> bool {
    flags(ch) & CSS_SPACE != 0
}

#[inline]
pub fn is_ascii_alpha(ch: char) -> bool {
    flags(ch) & ALPHA != 0
}

#[inline]
pub fn is_ascii_digit(ch: char) -> bool {
    flags(ch) & DIGIT != 0
}

#[inline]
pub fn is_ascii_alphanumeric(ch: char) -> bool {
    flags(ch) & (ALPHA | DIGIT) != 0
}

#[inline]
pub fn is_hex_digit(ch: char) -> bool {
    flags(ch) & HEX != 0
}

#[inline]
pub fn is_control(ch: char) -> bool {
    flags(ch) & CONTROL != 0 || ('\u{80}'..='\u{9F}').contains(&ch)
}

#[inline]
pub fn is_ascii_punctuation(ch: char) -> bool {
    flags(ch) & PUNCT != 0
}

pub fn hex_value(ch: char) -> Option<u32> {
    ch.to_digit(16)
}

/// CSS `name-start`: letter, underscore, or any non-ASCII code point.
#[inline]
pub fn is_css_name_start(ch: char) -> bool {
    is_ascii_alpha(ch) || ch == '_' || !ch.is_ascii()
}

/// CSS `name`: `name-start`, digit or hyphen.
#[inline]
pub fn is_css_name_char(ch: char) -> bool {
    is_css_name_start(ch) || is_ascii_digit(ch) || ch == '-'
}

/// Characters that may not appear in an HTML tag or attribute name.
#[inline]
pub fn ends_html_name(ch: char) -> bool {
    is_html_whitespace(ch) || matches!(ch, '/' | '>')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_ascii_groups() {
        assert_eq!(classify('\0'), CharClass::Null);
        assert_eq!(classify('\u{1}'), CharClass::Control);
        assert_eq!(classify('\t'), CharClass::Whitespace);
        assert_eq!(classify(' '), CharClass::Whitespace);
        assert_eq!(classify('q'), CharClass::Alpha);
        assert_eq!(classify('Q'), CharClass::Alpha);
        assert_eq!(classify('7'), CharClass::Numeric);
        assert_eq!(classify('<'), CharClass::Punctuation);
        assert_eq!(classify('\u{e9}'), CharClass::NonAscii);
    }

    #[test]
    fn hex_digits_cover_both_cases() {
        for ch in "0123456789abcdefABCDEF".chars() {
            assert!(is_hex_digit(ch), "{ch}");
        }
        assert!(!is_hex_digit('g'));
        assert_eq!(hex_value('F'), Some(15));
        assert_eq!(hex_value('x'), None);
    }

    #[test]
    fn css_names_accept_non_ascii() {
        assert!(is_css_name_start('\u{4e2d}'));
        assert!(is_css_name_start('_'));
        assert!(!is_css_name_start('-'));
        assert!(!is_css_name_start('1'));
        assert!(is_css_name_char('-'));
        assert!(is_css_name_char('1'));
        assert!(!is_css_name_char('('));
    }

    #[test]
    fn c1_controls_are_controls() {
        assert!(is_control('\u{85}'));
        assert!(is_control('\u{7f}'));
        assert!(!is_control('\u{a0}'));
    }
}
