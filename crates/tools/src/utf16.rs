//! UTF-16 code units to Unicode scalar values.
//!
//! Surrogate pairs are combined; a lone high or low surrogate becomes U+FFFD
//! and decoding continues with the next unit.

#[derive(Clone, Debug)]
pub struct ScalarReader<'a> {
    units: &'a [u16],
    pos: usize,
}

impl<'a> ScalarReader<'a> {
    pub fn new(units: &'a [u16]) -> Self {
        Self { units, pos: 0 }
    }

    /// Index of the next unread code unit.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.units.len()
    }
}

impl Iterator for ScalarReader<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let unit = *self.units.get(self.pos)?;
        self.pos += 1;
        match unit {
            0xD800..=0xDBFF => match self.units.get(self.pos) {
                Some(&low @ 0xDC00..=0xDFFF) => {
                    self.pos += 1;
                    let cp = 0x10000 + (((unit as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);
                    Some(char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
                }
                _ => Some(char::REPLACEMENT_CHARACTER),
            },
            0xDC00..=0xDFFF => Some(char::REPLACEMENT_CHARACTER),
            _ => Some(char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.units.len() - self.pos;
        (left.div_ceil(2), Some(left))
    }
}

/// Collect UTF-16 units into a `String`, replacing invalid sequences.
pub fn to_string_lossy(units: &[u16]) -> String {
    ScalarReader::new(units).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn pairs_surrogates() {
        let units: Vec<u16> = "a\u{1F600}b".encode_utf16().collect();
        let chars: Vec<char> = ScalarReader::new(&units).collect();
        assert_eq!(chars, vec!['a', '\u{1F600}', 'b']);
    }

    #[test]
    fn lone_high_surrogate_is_replaced() {
        let chars: Vec<char> = ScalarReader::new(&[0xD83D, 0x0041]).collect();
        assert_eq!(chars, vec!['\u{FFFD}', 'A']);
    }

    #[test]
    fn lone_low_surrogate_is_replaced() {
        let chars: Vec<char> = ScalarReader::new(&[0x0041, 0xDE00]).collect();
        assert_eq!(chars, vec!['A', '\u{FFFD}']);
    }

    #[test]
    fn trailing_high_surrogate_is_replaced() {
        assert_eq!(to_string_lossy(&[0x0041, 0xD800]), "A\u{FFFD}");
    }

    #[test]
    fn position_tracks_units() {
        let units: Vec<u16> = "\u{1F600}x".encode_utf16().collect();
        let mut reader = ScalarReader::new(&units);
        reader.next();
        assert_eq!(reader.position(), 2);
        reader.next();
        assert!(reader.is_empty());
    }

    #[quickcheck]
    fn matches_std_lossy_decoding(units: Vec<u16>) -> bool {
        to_string_lossy(&units) == String::from_utf16_lossy(&units)
    }
}
