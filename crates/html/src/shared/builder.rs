//! Generic token builder: the mutation half of `RunList`.
//!
//! Scanners reserve room with `prepare`/`reserve` before appending runs, and
//! delimit sub-structures with `head()` / `fragment_from()`. Both calls seal
//! the run list so a run recorded after a fragment boundary never merges into
//! one recorded before it; run lists therefore depend only on the characters
//! scanned, not on how the input was chunked.

use super::fragment::Fragment;
use super::run::{Run, RunKind, RunType};
use super::runs::RunList;

/// The start of a fragment that has not been ended yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentHead {
    index: usize,
    offset: usize,
}

impl FragmentHead {
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Head for a fragment that starts at the beginning of a fresh piece.
    pub fn piece_start(offset: usize) -> Self {
        Self { index: 0, offset }
    }
}

/// Saved run-list state for undoing a partially scanned construct.
#[derive(Clone, Copy, Debug)]
pub struct Checkpoint {
    len: usize,
    tail: usize,
    floor: usize,
    last: Option<Run>,
}

impl Checkpoint {
    pub fn offset(&self) -> usize {
        self.tail
    }
}

impl RunList {
    /// Clear the list for a new piece starting at logical offset `start`.
    pub fn reset(&mut self, start: usize) {
        self.runs.clear();
        self.start = start;
        self.tail = start;
        self.floor = 0;
    }

    /// Make room for `n` more runs.
    ///
    /// Grows geometrically up to `max_runs`. Returns `false` when the request
    /// cannot be met; the caller must stop and cut the piece.
    pub fn prepare(&mut self, n: usize) -> bool {
        let needed = self.runs.len() + n;
        if needed > self.max_runs {
            return false;
        }
        if needed > self.runs.capacity() {
            let target = (self.runs.capacity() * 2).max(needed).min(self.max_runs);
            self.runs.reserve_exact(target - self.runs.len());
            log::trace!(target: "html.runs", "grew run arena to {}", self.runs.capacity());
        }
        true
    }

    /// Like `prepare(1)`, but succeeds without growth when the run would merge.
    pub fn reserve(&mut self, kind: RunKind, ty: RunType) -> bool {
        self.would_merge(kind, ty) || self.prepare(1)
    }

    fn would_merge(&self, kind: RunKind, ty: RunType) -> bool {
        self.runs.len() > self.floor
            && self
                .runs
                .last()
                .is_some_and(|last| last.extends_with(kind, ty))
    }

    /// Append a run; zero-length runs are dropped.
    ///
    /// Callers must have reserved room first.
    pub fn add(&mut self, kind: RunKind, ty: RunType, len: usize) {
        if len == 0 {
            return;
        }
        self.tail += len;
        if self.would_merge(kind, ty) {
            if let Some(last) = self.runs.last_mut() {
                last.len += len as u32;
            }
            return;
        }
        debug_assert!(self.runs.len() < self.max_runs, "run added without reservation");
        self.runs.push(Run::new(kind, ty, len));
    }

    /// Seal the list: the next run starts a new entry even if it could merge.
    pub fn seal(&mut self) {
        self.floor = self.runs.len();
    }

    /// Start a fragment at the current tail.
    pub fn head(&mut self) -> FragmentHead {
        self.seal();
        FragmentHead {
            index: self.runs.len(),
            offset: self.tail,
        }
    }

    /// End the fragment started at `head`.
    pub fn fragment_from(&mut self, head: FragmentHead) -> Fragment {
        assert!(
            head.index <= self.runs.len(),
            "fragment head {} beyond run tail {}",
            head.index,
            self.runs.len()
        );
        self.seal();
        Fragment {
            head: head.index,
            tail: self.runs.len(),
            head_offset: head.offset,
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            len: self.runs.len(),
            tail: self.tail,
            floor: self.floor,
            last: self.runs.last().copied(),
        }
    }

    /// Undo every run recorded after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.runs.truncate(checkpoint.len);
        if let (Some(last), Some(slot)) = (checkpoint.last, self.runs.last_mut()) {
            *slot = last;
        }
        self.tail = checkpoint.tail;
        self.floor = checkpoint.floor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::buffer::ScanBuffer;
    use crate::shared::fragment::FragmentPosition;

    fn window(text: &str) -> ScanBuffer {
        let mut buf = ScanBuffer::new(128);
        buf.fill(text);
        buf
    }

    #[test]
    fn zero_length_runs_are_noops() {
        let mut list = RunList::new(4, 16);
        list.reset(0);
        assert!(list.prepare(1));
        list.add(RunKind::Text, RunType::Normal, 0);
        assert!(list.is_empty());
        assert_eq!(list.tail_offset(), 0);
    }

    #[test]
    fn adjacent_runs_merge_until_sealed() {
        let mut list = RunList::new(4, 16);
        list.reset(10);
        assert!(list.prepare(1));
        list.add(RunKind::Text, RunType::Normal, 3);
        list.add(RunKind::Text, RunType::Normal, 2);
        assert_eq!(list.len(), 1);
        assert_eq!(list.runs()[0].len(), 5);
        list.seal();
        assert!(list.prepare(1));
        list.add(RunKind::Text, RunType::Normal, 1);
        assert_eq!(list.len(), 2);
        assert_eq!(list.tail_offset(), 16);
    }

    #[test]
    fn literal_runs_never_merge() {
        let mut list = RunList::new(4, 16);
        list.reset(0);
        assert!(list.prepare(2));
        list.add(RunKind::Text, RunType::Literal('&'), 5);
        list.add(RunKind::Text, RunType::Literal('&'), 5);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn prepare_grows_geometrically_up_to_the_limit() {
        let mut list = RunList::new(2, 5);
        list.reset(0);
        for i in 0..5 {
            assert!(list.prepare(1), "run {i}");
            let kind = if i % 2 == 0 { RunKind::Text } else { RunKind::Markup };
            list.add(kind, RunType::Normal, 1);
        }
        assert!(list.allocated() >= 5);
        assert!(!list.prepare(1));
        // A merging run still fits.
        assert!(list.reserve(RunKind::Text, RunType::Normal));
        assert!(!list.reserve(RunKind::Markup, RunType::Normal));
    }

    #[test]
    fn reset_keeps_allocation() {
        let mut list = RunList::new(1, 64);
        list.reset(0);
        assert!(list.prepare(20));
        let allocated = list.allocated();
        list.reset(100);
        assert!(list.is_empty());
        assert_eq!(list.allocated(), allocated);
        assert_eq!(list.start_offset(), 100);
    }

    #[test]
    fn fragment_replays_normal_literal_and_skips_invalid() {
        // "<b>&amp;x"
        let buf = window("<b>&amp;x");
        let mut list = RunList::new(8, 16);
        list.reset(0);
        assert!(list.prepare(5));
        list.add(RunKind::Markup, RunType::Invalid, 1);
        let head = list.head();
        list.add(RunKind::TagName, RunType::Normal, 1);
        let name = list.fragment_from(head);
        list.add(RunKind::Markup, RunType::Invalid, 1);
        let head = list.head();
        list.add(RunKind::Text, RunType::Literal('&'), 5);
        list.add(RunKind::Text, RunType::Normal, 1);
        let text = list.fragment_from(head);

        assert_eq!(list.text(name, &buf), "b");
        assert_eq!(list.text(text, &buf), "&x");
        assert_eq!(list.source(text, &buf).iter().collect::<String>(), "&amp;x");

        let mut pos = FragmentPosition::new(text);
        let mut out = String::new();
        assert_eq!(pos.read_into(&list, &buf, &mut out, 1), 1);
        assert_eq!(out, "&");
        pos.rewind();
        out.clear();
        pos.read_into(&list, &buf, &mut out, 10);
        assert_eq!(out, "&x");
        assert!(pos.is_done());
    }

    #[test]
    fn rollback_restores_merged_run() {
        let mut list = RunList::new(4, 16);
        list.reset(0);
        assert!(list.prepare(1));
        list.add(RunKind::Value, RunType::Normal, 2);
        let cp = list.checkpoint();
        list.add(RunKind::Value, RunType::Normal, 3);
        assert!(list.prepare(1));
        list.add(RunKind::Invalid, RunType::Invalid, 1);
        list.rollback(cp);
        assert_eq!(list.len(), 1);
        assert_eq!(list.runs()[0].len(), 2);
        assert_eq!(list.tail_offset(), 2);
        assert_eq!(cp.offset(), 2);
    }

    #[test]
    #[should_panic(expected = "beyond run tail")]
    fn ending_a_foreign_fragment_panics() {
        let mut list = RunList::new(4, 16);
        list.reset(0);
        assert!(list.prepare(2));
        list.add(RunKind::Text, RunType::Normal, 1);
        let head = list.head();
        list.add(RunKind::Markup, RunType::Normal, 1);
        list.reset(0);
        list.fragment_from(head);
    }
}
