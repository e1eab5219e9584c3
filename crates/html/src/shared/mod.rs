//! Run/fragment/token model shared by the markup and style scanners.
//!
//! Scanners record what they consume as runs into a reusable `RunList`; named
//! sub-structures are `Fragment`s over those runs; `Phase` tracks whether a
//! unit is complete or split across buffer windows.

mod builder;
mod buffer;
mod counters;
mod error;
mod fragment;
mod phase;
mod run;
mod runs;

pub use buffer::{MIN_WINDOW, ScanBuffer};
pub use builder::{Checkpoint, FragmentHead};
pub use counters::ScanStats;
pub use error::{ConfigError, MIN_RUNS, ScanError, validate_limit, validate_runs, validate_window};
pub use fragment::{Fragment, FragmentChars, FragmentPosition};
pub use phase::{Phase, PhaseEvent};
pub use run::{Run, RunKind, RunType};
pub use runs::{RunList, RunSlices};

/// What a scanner produced on one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanResult {
    /// A token piece is ready to be read.
    Token,
    /// The window is exhausted; refill it (or mark end of stream) and call again.
    NeedMoreInput,
    /// End of stream was reported and the final token has been handed out.
    Finished,
}
