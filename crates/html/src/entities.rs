//! Incremental character-reference matching.
//!
//! Contract:
//! - Only semicolon-terminated references decode: `&name;`, `&#123;`, `&#x1F4A9;`.
//! - Numeric references that are zero, surrogates, or beyond U+10FFFF decode to U+FFFD.
//! - Unknown names, missing semicolons and overlong digit runs are not references;
//!   the `&` stays literal text.
//! - The matcher never looks further than `MAX_REFERENCE_LEN` characters, so a
//!   caller can always decide once that many characters are buffered.

pub const MAX_REFERENCE_LEN: usize = 12;

const MAX_HEX_DIGITS: usize = 6;
const MAX_DEC_DIGITS: usize = 7;
const MAX_NAME: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityMatch {
    /// The first `len` characters are a reference for `ch`.
    Matched { len: usize, ch: char },
    /// Not a reference; treat the `&` as text.
    NoMatch,
    /// Could still become a reference; more characters are needed.
    Incomplete,
}

static NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("apos", '\''),
    ("bull", '\u{2022}'),
    ("cent", '\u{A2}'),
    ("copy", '\u{A9}'),
    ("deg", '\u{B0}'),
    ("divide", '\u{F7}'),
    ("euro", '\u{20AC}'),
    ("gt", '>'),
    ("hellip", '\u{2026}'),
    ("iexcl", '\u{A1}'),
    ("iquest", '\u{BF}'),
    ("laquo", '\u{AB}'),
    ("ldquo", '\u{201C}'),
    ("lsquo", '\u{2018}'),
    ("lt", '<'),
    ("mdash", '\u{2014}'),
    ("middot", '\u{B7}'),
    ("nbsp", '\u{A0}'),
    ("ndash", '\u{2013}'),
    ("para", '\u{B6}'),
    ("plusmn", '\u{B1}'),
    ("pound", '\u{A3}'),
    ("quot", '"'),
    ("raquo", '\u{BB}'),
    ("rdquo", '\u{201D}'),
    ("reg", '\u{AE}'),
    ("rsquo", '\u{2019}'),
    ("sect", '\u{A7}'),
    ("shy", '\u{AD}'),
    ("times", '\u{D7}'),
    ("trade", '\u{2122}'),
    ("yen", '\u{A5}'),
];

fn lookup_named(name: &str) -> Option<char> {
    NAMED
        .binary_search_by(|(candidate, _)| candidate.cmp(&name))
        .ok()
        .map(|idx| NAMED[idx].1)
}

/// Match a reference at the start of `input` (which must begin with `&`).
///
/// `at_end` means no characters will follow `input`: an unfinished reference
/// is then `NoMatch` instead of `Incomplete`.
pub fn match_entity(input: &[char], at_end: bool) -> EntityMatch {
    debug_assert_eq!(input.first(), Some(&'&'));
    let starved = || {
        if at_end {
            EntityMatch::NoMatch
        } else {
            EntityMatch::Incomplete
        }
    };
    match input.get(1) {
        None => starved(),
        Some('#') => match input.get(2) {
            None => starved(),
            Some('x' | 'X') => match_numeric(input, 3, 16, MAX_HEX_DIGITS, at_end),
            Some(_) => match_numeric(input, 2, 10, MAX_DEC_DIGITS, at_end),
        },
        Some(_) => match_named(input, at_end),
    }
}

fn match_numeric(
    input: &[char],
    start: usize,
    radix: u32,
    max_digits: usize,
    at_end: bool,
) -> EntityMatch {
    let mut value = 0u32;
    let mut digits = 0usize;
    for (idx, &ch) in input.iter().enumerate().skip(start) {
        if ch == ';' {
            if digits == 0 {
                return EntityMatch::NoMatch;
            }
            return EntityMatch::Matched {
                len: idx + 1,
                ch: decode_scalar(value),
            };
        }
        let Some(digit) = ch.to_digit(radix) else {
            return EntityMatch::NoMatch;
        };
        if digits == max_digits {
            return EntityMatch::NoMatch;
        }
        value = value * radix + digit;
        digits += 1;
    }
    if at_end {
        EntityMatch::NoMatch
    } else {
        EntityMatch::Incomplete
    }
}

fn match_named(input: &[char], at_end: bool) -> EntityMatch {
    let mut name = String::new();
    for (idx, &ch) in input.iter().enumerate().skip(1) {
        if ch == ';' {
            return match lookup_named(&name) {
                Some(decoded) if !name.is_empty() => EntityMatch::Matched {
                    len: idx + 1,
                    ch: decoded,
                },
                _ => EntityMatch::NoMatch,
            };
        }
        if !ch.is_ascii_alphanumeric() || name.len() == MAX_NAME {
            return EntityMatch::NoMatch;
        }
        name.push(ch);
    }
    if at_end {
        EntityMatch::NoMatch
    } else {
        EntityMatch::Incomplete
    }
}

fn decode_scalar(value: u32) -> char {
    if value == 0 {
        return char::REPLACEMENT_CHARACTER;
    }
    char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str, at_end: bool) -> EntityMatch {
        let chars: Vec<char> = s.chars().collect();
        match_entity(&chars, at_end)
    }

    #[test]
    fn named_table_is_sorted() {
        assert!(NAMED.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn decodes_named_and_numeric() {
        assert_eq!(m("&amp;x", true), EntityMatch::Matched { len: 5, ch: '&' });
        assert_eq!(m("&#60;", true), EntityMatch::Matched { len: 5, ch: '<' });
        assert_eq!(m("&#x3C;", true), EntityMatch::Matched { len: 6, ch: '<' });
        assert_eq!(
            m("&#x1F4A9;", true),
            EntityMatch::Matched {
                len: 9,
                ch: '\u{1F4A9}'
            }
        );
    }

    #[test]
    fn invalid_scalars_become_replacement() {
        assert_eq!(
            m("&#0;", true),
            EntityMatch::Matched {
                len: 4,
                ch: '\u{FFFD}'
            }
        );
        assert_eq!(
            m("&#xD800;", true),
            EntityMatch::Matched {
                len: 8,
                ch: '\u{FFFD}'
            }
        );
        assert_eq!(
            m("&#x110000;", true),
            EntityMatch::Matched {
                len: 10,
                ch: '\u{FFFD}'
            }
        );
    }

    #[test]
    fn rejects_non_references() {
        assert_eq!(m("&amp x", true), EntityMatch::NoMatch);
        assert_eq!(m("&bogus;", true), EntityMatch::NoMatch);
        assert_eq!(m("&#;", true), EntityMatch::NoMatch);
        assert_eq!(m("&#12345678;", true), EntityMatch::NoMatch);
        assert_eq!(m("& ", true), EntityMatch::NoMatch);
        assert_eq!(m("&;", true), EntityMatch::NoMatch);
    }

    #[test]
    fn unfinished_prefixes_wait_for_more_input() {
        assert_eq!(m("&", false), EntityMatch::Incomplete);
        assert_eq!(m("&am", false), EntityMatch::Incomplete);
        assert_eq!(m("&#x3", false), EntityMatch::Incomplete);
        assert_eq!(m("&am", true), EntityMatch::NoMatch);
    }

    #[test]
    fn decision_never_needs_more_than_the_bound() {
        let long = format!("&{}", "a".repeat(MAX_REFERENCE_LEN));
        let chars: Vec<char> = long.chars().collect();
        assert_ne!(match_entity(&chars, false), EntityMatch::Incomplete);
        let hex = "&#x0000001;";
        assert_ne!(m(hex, false), EntityMatch::Incomplete);
    }
}
