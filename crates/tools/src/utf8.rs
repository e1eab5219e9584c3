//! Incremental UTF-8 decoding for byte sources read in arbitrary chunks.
//!
//! A multi-byte sequence split across two reads is carried over to the next
//! `push`; invalid bytes become U+FFFD so decoding always makes progress.

#[derive(Debug, Default)]
pub struct Utf8Decoder {
    // Incomplete suffix of the previous chunk, at most 3 bytes.
    carry: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        !self.carry.is_empty()
    }

    /// Decode `bytes` and append the text to `out`.
    pub fn push(&mut self, bytes: &[u8], out: &mut String) {
        let mut rest = bytes;
        while !self.carry.is_empty() && !rest.is_empty() {
            let want = sequence_len(self.carry[0]);
            if want == 0 {
                out.push('\u{FFFD}');
                self.carry.clear();
                break;
            }
            let missing = want.saturating_sub(self.carry.len());
            let take = missing.min(rest.len());
            let mut joined = [0u8; 4];
            let held = self.carry.len();
            joined[..held].copy_from_slice(&self.carry);
            joined[held..held + take].copy_from_slice(&rest[..take]);
            rest = &rest[take..];
            self.carry.clear();
            self.decode(&joined[..held + take], out);
            if take < missing {
                return;
            }
        }
        if !rest.is_empty() {
            self.decode(rest, out);
        }
    }

    /// Flush a trailing incomplete sequence as U+FFFD.
    pub fn finish(&mut self, out: &mut String) {
        if !self.carry.is_empty() {
            out.push_str(&String::from_utf8_lossy(&self.carry));
            self.carry.clear();
        }
    }

    fn decode(&mut self, mut bytes: &[u8], out: &mut String) {
        while !bytes.is_empty() {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    out.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, tail) = bytes.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            out.push('\u{FFFD}');
                            bytes = &tail[len..];
                        }
                        None => {
                            self.carry.extend_from_slice(tail);
                            return;
                        }
                    }
                }
            }
        }
    }
}

fn sequence_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_chunks(chunks: &[&[u8]]) -> String {
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        for chunk in chunks {
            decoder.push(chunk, &mut out);
        }
        decoder.finish(&mut out);
        out
    }

    #[test]
    fn two_byte_sequence_split_across_pushes() {
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        decoder.push(&[0xC3], &mut out);
        assert_eq!(out, "");
        assert!(decoder.has_pending());
        decoder.push(&[0x97], &mut out);
        assert_eq!(out, "\u{D7}");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn four_byte_sequence_fed_one_byte_at_a_time() {
        assert_eq!(
            decode_chunks(&[&[0xF0], &[0x9F], &[0x98], &[0x80, b'!']]),
            "\u{1F600}!"
        );
    }

    #[test]
    fn trailing_partial_sequence_is_carried_again() {
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        decoder.push(&[0xE2], &mut out);
        decoder.push(&[0x82, 0xAC, 0xE2], &mut out);
        assert_eq!(out, "\u{20AC}");
        assert!(decoder.has_pending());
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        assert_eq!(decode_chunks(&[&[0xFF, b'f']]), "\u{FFFD}f");
        assert_eq!(decode_chunks(&[&[0xE2, 0x82], &[b'a']]), "\u{FFFD}a");
    }

    #[test]
    fn unfinished_sequence_is_flushed_on_finish() {
        assert_eq!(decode_chunks(&[&[0xE2, 0x82]]), "\u{FFFD}");
    }
}
