//! Fragments: named views over a token's runs, and cursors that replay them.

use super::buffer::ScanBuffer;
use super::run::{Run, RunType};
use super::runs::RunList;

/// A sub-range `[head, tail)` of a token's run vector.
///
/// `head_offset` is the logical stream offset of the first character of the
/// `head` run. A fragment is only meaningful until its token is reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    pub head: usize,
    pub tail: usize,
    pub head_offset: usize,
}

impl Fragment {
    pub fn is_empty(&self) -> bool {
        self.head >= self.tail
    }

    pub fn run_count(&self) -> usize {
        self.tail.saturating_sub(self.head)
    }
}

/// Replays the characters of one fragment.
///
/// Invalid runs are skipped, literal runs yield their decoded character once,
/// and normal runs are read from the window. The cursor holds no borrows, so a
/// consumer can interleave reads with other work and `rewind` to start over.
#[derive(Clone, Copy, Debug)]
pub struct FragmentPosition {
    fragment: Fragment,
    run: usize,
    offset: usize,
    within: usize,
}

impl FragmentPosition {
    pub fn new(fragment: Fragment) -> Self {
        Self {
            fragment,
            run: fragment.head,
            offset: fragment.head_offset,
            within: 0,
        }
    }

    pub fn fragment(&self) -> Fragment {
        self.fragment
    }

    pub fn rewind(&mut self) {
        *self = Self::new(self.fragment);
    }

    pub fn is_done(&self) -> bool {
        self.run >= self.fragment.tail
    }

    pub fn next_char(&mut self, runs: &RunList, buffer: &ScanBuffer) -> Option<char> {
        let all = runs.runs();
        while self.run < self.fragment.tail.min(all.len()) {
            let run = all[self.run];
            match run.ty {
                RunType::Invalid => self.skip(run),
                RunType::Literal(ch) => {
                    if self.within == 0 {
                        self.within = run.len().max(1);
                        return Some(ch);
                    }
                    self.skip(run);
                }
                RunType::Normal => {
                    if self.within < run.len() {
                        let ch = buffer.char_at(self.offset + self.within);
                        self.within += 1;
                        if ch.is_some() {
                            return ch;
                        }
                        // Rebased past this run: nothing left to read.
                        self.run = self.fragment.tail;
                        return None;
                    }
                    self.skip(run);
                }
            }
        }
        None
    }

    /// Append up to `max` characters to `out`; returns how many were written.
    pub fn read_into(
        &mut self,
        runs: &RunList,
        buffer: &ScanBuffer,
        out: &mut String,
        max: usize,
    ) -> usize {
        let mut written = 0usize;
        while written < max {
            let Some(ch) = self.next_char(runs, buffer) else {
                break;
            };
            out.push(ch);
            written += 1;
        }
        written
    }

    fn skip(&mut self, run: Run) {
        self.offset += run.len();
        self.run += 1;
        self.within = 0;
    }
}

/// Iterator adapter over a `FragmentPosition`.
pub struct FragmentChars<'a> {
    position: FragmentPosition,
    runs: &'a RunList,
    buffer: &'a ScanBuffer,
}

impl<'a> FragmentChars<'a> {
    pub fn new(fragment: Fragment, runs: &'a RunList, buffer: &'a ScanBuffer) -> Self {
        Self {
            position: FragmentPosition::new(fragment),
            runs,
            buffer,
        }
    }
}

impl Iterator for FragmentChars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        self.position.next_char(self.runs, self.buffer)
    }
}
