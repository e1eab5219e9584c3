//! Character-level helpers shared by the scanners and encoders.

pub mod chars;
pub mod utf16;
pub mod utf8;

pub use chars::{CharClass, classify};
pub use utf16::ScalarReader;
pub use utf8::Utf8Decoder;
