//! The run arena owned by every token.

use super::buffer::ScanBuffer;
use super::fragment::{Fragment, FragmentChars};
use super::run::Run;

/// Runs covering one token piece, `[start_offset, tail_offset)` in the stream.
///
/// The vector is cleared between pieces but never shrunk, and never grows past
/// `max_runs`. Mutation lives in the builder half of this type.
#[derive(Debug)]
pub struct RunList {
    pub(crate) runs: Vec<Run>,
    pub(crate) max_runs: usize,
    pub(crate) start: usize,
    pub(crate) tail: usize,
    // Runs below this index are sealed by a fragment boundary and never merged.
    pub(crate) floor: usize,
}

impl RunList {
    pub fn new(initial: usize, max_runs: usize) -> Self {
        Self {
            runs: Vec::with_capacity(initial.min(max_runs)),
            max_runs,
            start: 0,
            tail: 0,
            floor: 0,
        }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn max_runs(&self) -> usize {
        self.max_runs
    }

    /// Allocated run slots; grows geometrically, never shrinks.
    pub fn allocated(&self) -> usize {
        self.runs.capacity()
    }

    pub fn start_offset(&self) -> usize {
        self.start
    }

    pub fn tail_offset(&self) -> usize {
        self.tail
    }

    /// Fragment over every run of the piece.
    pub fn whole(&self) -> Fragment {
        Fragment {
            head: 0,
            tail: self.runs.len(),
            head_offset: self.start,
        }
    }

    pub fn chars<'a>(&'a self, fragment: Fragment, buffer: &'a ScanBuffer) -> FragmentChars<'a> {
        FragmentChars::new(fragment, self, buffer)
    }

    pub fn text(&self, fragment: Fragment, buffer: &ScanBuffer) -> String {
        self.chars(fragment, buffer).collect()
    }

    /// Each run of `fragment` with the window characters it covers.
    ///
    /// Consumers that re-escape content by run kind (strings, urls, literal
    /// substitutions) walk a fragment this way instead of char by char.
    pub fn run_slices<'a>(&'a self, fragment: Fragment, buffer: &'a ScanBuffer) -> RunSlices<'a> {
        let end = fragment.tail.min(self.runs.len());
        RunSlices {
            runs: &self.runs[fragment.head.min(end)..end],
            offset: fragment.head_offset,
            buffer,
        }
    }

    /// Raw window characters under `fragment`, including invalid runs and the
    /// undecoded source of literal runs.
    pub fn source<'a>(&self, fragment: Fragment, buffer: &'a ScanBuffer) -> &'a [char] {
        let end = fragment.tail.min(self.runs.len());
        let begin = fragment.head.min(end);
        let span: usize = self.runs[begin..end].iter().map(Run::len).sum();
        buffer.slice(fragment.head_offset, fragment.head_offset + span)
    }
}

/// Iterator returned by [`RunList::run_slices`].
pub struct RunSlices<'a> {
    runs: &'a [Run],
    offset: usize,
    buffer: &'a ScanBuffer,
}

impl<'a> Iterator for RunSlices<'a> {
    type Item = (Run, &'a [char]);

    fn next(&mut self) -> Option<Self::Item> {
        let (&run, rest) = self.runs.split_first()?;
        self.runs = rest;
        let start = self.offset;
        self.offset += run.len();
        Some((run, self.buffer.slice(start, self.offset)))
    }
}
