//! CSS escape sequences.

use tools::chars::{hex_value, is_css_whitespace};

/// Decode the escape that starts at `input[0]` (a backslash).
///
/// Returns the characters consumed and the decoded character, or `None` when
/// the backslash does not start an escape (end of input or a newline).
/// Up to six hex digits are read, followed by one optional whitespace
/// character; zero, surrogates and values above U+10FFFF decode to U+FFFD.
pub(crate) fn decode_escape(input: &[char]) -> Option<(usize, char)> {
    debug_assert_eq!(input.first(), Some(&'\\'));
    let next = *input.get(1)?;
    if matches!(next, '\n' | '\r' | '\x0C') {
        return None;
    }
    if hex_value(next).is_none() {
        return Some((2, next));
    }
    let mut value = 0u32;
    let mut len = 1;
    while len <= 6 {
        let Some(digit) = input.get(len).and_then(|&c| hex_value(c)) else {
            break;
        };
        value = value * 16 + digit;
        len += 1;
    }
    match input.get(len) {
        Some('\r') => {
            len += 1;
            if input.get(len) == Some(&'\n') {
                len += 1;
            }
        }
        Some(&c) if is_css_whitespace(c) => len += 1,
        _ => {}
    }
    let ch = match value {
        0 => char::REPLACEMENT_CHARACTER,
        _ => char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER),
    };
    Some((len, ch))
}

/// Length of a backslash-newline line continuation at the start of `input`.
pub(crate) fn line_continuation(input: &[char]) -> Option<usize> {
    match input {
        ['\\', '\r', '\n', ..] => Some(3),
        ['\\', '\n' | '\r' | '\x0C', ..] => Some(2),
        _ => None,
    }
}

/// A backslash at the start of `input` begins a valid escape.
pub(crate) fn starts_escape(input: &[char]) -> bool {
    matches!(input, ['\\', next, ..] if !matches!(next, '\n' | '\r' | '\x0C'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(s: &str) -> Option<(usize, char)> {
        let chars: Vec<char> = s.chars().collect();
        decode_escape(&chars)
    }

    #[test]
    fn hex_escapes_take_one_trailing_space() {
        assert_eq!(decode("\\41 b"), Some((4, 'A')));
        assert_eq!(decode("\\000041b"), Some((7, 'A')));
        assert_eq!(decode("\\41\r\nb"), Some((5, 'A')));
        assert_eq!(decode("\\6c"), Some((3, 'l')));
    }

    #[test]
    fn invalid_code_points_become_replacement() {
        assert_eq!(decode("\\0"), Some((2, '\u{FFFD}')));
        assert_eq!(decode("\\d800"), Some((5, '\u{FFFD}')));
        assert_eq!(decode("\\110000"), Some((7, '\u{FFFD}')));
    }

    #[test]
    fn other_characters_escape_themselves() {
        assert_eq!(decode("\\:x"), Some((2, ':')));
        assert_eq!(decode("\\\\"), Some((2, '\\')));
    }

    #[test]
    fn newline_and_end_are_not_escapes() {
        assert_eq!(decode("\\\nx"), None);
        assert_eq!(decode("\\"), None);
        let chars: Vec<char> = "\\\r\nx".chars().collect();
        assert_eq!(line_continuation(&chars), Some(3));
        assert!(!starts_escape(&chars));
    }
}
