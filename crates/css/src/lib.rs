//! Streaming style sheet parsing on top of the markup crate's window and run
//! model: statement pieces with selector and declaration entries that a
//! consumer can inspect, mark deleted, and re-emit.

mod boundary;
mod escape;
pub mod functions;
pub mod parser;
pub mod properties;
pub mod token;

// Re-exports so consumers can just use `css::...`.
pub use functions::FunctionPolicy;
pub use parser::{ConfigError, CssMode, CssParser, CssParserConfig};
pub use properties::PropertyId;
pub use token::{
    AtRuleKind, ClassType, Combinator, CssPart, CssToken, CssTokenKind, PropertyEntry,
    SelectorEntry,
};
