//! Bounded character window shared by the scanners.

use std::sync::atomic::{AtomicU64, Ordering};

/// Smallest window a tokenizer accepts. Every lookahead decision fits in it.
pub const MIN_WINDOW: usize = 64;

/// A bounded window over a character stream.
///
/// Positions handed out by tokenizers are logical offsets into the whole
/// stream; `base_offset` is the logical offset of the first buffered
/// character. Characters are only dropped through `discard_before`.
///
/// Invariant: `chars.len() <= capacity`.
#[derive(Debug)]
pub struct ScanBuffer {
    id: u64,
    chars: Vec<char>,
    capacity: usize,
    base: usize,
    end_of_stream: bool,
}

impl ScanBuffer {
    pub fn new(capacity: usize) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id,
            chars: Vec::with_capacity(capacity),
            capacity,
            base: 0,
            end_of_stream: false,
        }
    }

    /// Opaque identity; a tokenizer binds to exactly one buffer.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn free_space(&self) -> usize {
        self.capacity - self.chars.len()
    }

    pub fn is_full(&self) -> bool {
        self.chars.len() >= self.capacity
    }

    pub fn base_offset(&self) -> usize {
        self.base
    }

    /// Logical offset one past the last buffered character.
    pub fn end_offset(&self) -> usize {
        self.base + self.chars.len()
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }

    /// Append as much of `text` as fits and return the number of bytes taken.
    ///
    /// The returned count always falls on a char boundary of `text`.
    pub fn fill(&mut self, text: &str) -> usize {
        assert!(!self.end_of_stream, "fill after end of stream");
        let room = self.free_space();
        if room == 0 {
            return 0;
        }
        let mut taken = 0usize;
        for (count, (idx, ch)) in text.char_indices().enumerate() {
            if count == room {
                return idx;
            }
            self.chars.push(ch);
            taken = idx + ch.len_utf8();
        }
        taken
    }

    /// Append characters until the window is full; returns how many were taken.
    pub fn fill_chars(&mut self, chars: &mut impl Iterator<Item = char>) -> usize {
        assert!(!self.end_of_stream, "fill after end of stream");
        let mut taken = 0usize;
        while !self.is_full() {
            let Some(ch) = chars.next() else { break };
            self.chars.push(ch);
            taken += 1;
        }
        taken
    }

    /// Mark that no more characters will arrive.
    pub fn set_end_of_stream(&mut self) {
        self.end_of_stream = true;
    }

    pub fn char_at(&self, logical: usize) -> Option<char> {
        logical
            .checked_sub(self.base)
            .and_then(|idx| self.chars.get(idx))
            .copied()
    }

    /// Characters for the logical range `[start, end)`, clamped to the window.
    pub fn slice(&self, start: usize, end: usize) -> &[char] {
        let lo = start.saturating_sub(self.base).min(self.chars.len());
        let hi = end.saturating_sub(self.base).min(self.chars.len()).max(lo);
        &self.chars[lo..hi]
    }

    /// Characters from `start` to the end of the window.
    pub fn tail(&self, start: usize) -> &[char] {
        self.slice(start, self.end_offset())
    }

    /// Drop every character before the logical offset `logical`.
    pub fn discard_before(&mut self, logical: usize) {
        if logical <= self.base {
            return;
        }
        let count = (logical - self.base).min(self.chars.len());
        self.chars.drain(..count);
        self.base += count;
    }

    /// Empty the window and clear the end-of-stream flag, keeping the allocation.
    pub fn reset(&mut self) {
        self.chars.clear();
        self.base = 0;
        self.end_of_stream = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_stops_at_capacity_on_char_boundary() {
        let mut buf = ScanBuffer::new(3);
        let taken = buf.fill("a\u{e9}bc");
        assert_eq!(taken, "a\u{e9}b".len());
        assert!(buf.is_full());
        assert_eq!(buf.fill("zz"), 0);
    }

    #[test]
    fn discard_rebases_logical_offsets() {
        let mut buf = ScanBuffer::new(8);
        buf.fill("abcdef");
        buf.discard_before(4);
        assert_eq!(buf.base_offset(), 4);
        assert_eq!(buf.char_at(4), Some('e'));
        assert_eq!(buf.char_at(3), None);
        assert_eq!(buf.slice(4, 6), &['e', 'f']);
        buf.fill("gh");
        assert_eq!(buf.end_offset(), 8);
        assert_eq!(buf.tail(6), &['g', 'h']);
    }

    #[test]
    fn slice_is_clamped() {
        let mut buf = ScanBuffer::new(8);
        buf.fill("abc");
        assert_eq!(buf.slice(1, 10), &['b', 'c']);
        assert!(buf.slice(5, 2).is_empty());
    }

    #[test]
    #[should_panic(expected = "fill after end of stream")]
    fn fill_after_end_of_stream_panics() {
        let mut buf = ScanBuffer::new(8);
        buf.set_end_of_stream();
        buf.fill("x");
    }
}
