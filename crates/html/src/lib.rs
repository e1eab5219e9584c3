//! Streaming markup scanning: a bounded character window, the run/fragment
//! token model shared with the style scanner, tag and attribute name tables,
//! character references, and the markup tokenizer.

pub mod entities;
pub mod names;
pub mod shared;
pub mod tokenizer;

pub use crate::names::{AttributeId, TagId, TextMode};
pub use crate::shared::{
    Checkpoint, ConfigError, Fragment, FragmentChars, FragmentHead, FragmentPosition, MIN_RUNS,
    MIN_WINDOW, Phase, PhaseEvent, Run, RunKind, RunList, RunSlices, RunType, ScanBuffer,
    ScanError, ScanResult, ScanStats,
};
pub use crate::tokenizer::{
    AttributeEntry, HtmlToken, HtmlTokenKind, HtmlTokenizer, QuoteStyle, TagFlags, TagPart,
    TokenizerConfig,
};
