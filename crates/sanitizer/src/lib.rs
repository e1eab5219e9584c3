//! Policy-driven markup sanitizing.
//!
//! The rewriter re-parses untrusted markup with the streaming tokenizers and
//! writes back only what the [`Policy`] allows: kept tags are rebuilt from
//! their known names, attribute values and text are re-encoded, URLs must
//! use an allowed scheme, and style sheets and `style` attributes are
//! re-serialized declaration by declaration.
//!
//! ```
//! let clean = sanitizer::sanitize("<div onclick=\"evil()\">ok</div>");
//! assert_eq!(clean, "<div>ok</div>");
//! ```

mod config;
mod error;
mod policy;
mod rewriter;
mod style;

use std::io::{Read, Write};

use log::warn;
use tools::Utf8Decoder;

pub use crate::config::SanitizerConfig;
pub use crate::error::{PolicyError, SanitizeError};
pub use crate::policy::{AttributeAction, Policy, PropertyAction, TagAction};
pub use crate::rewriter::HtmlRewriter;

const READ_CHUNK: usize = 8 * 1024;

/// Whether input is a whole document or a piece of one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Document,
    /// Strip `html`, `head` and `body` and drop head-only elements.
    Fragment,
}

impl Mode {
    fn config(self) -> SanitizerConfig {
        match self {
            Mode::Document => SanitizerConfig::default(),
            Mode::Fragment => SanitizerConfig::fragment(),
        }
    }
}

/// A reusable sanitizer: one rewriter, any number of documents.
pub struct Sanitizer {
    rewriter: HtmlRewriter,
}

impl Sanitizer {
    pub fn new(policy: Policy, config: SanitizerConfig) -> Result<Self, SanitizeError> {
        Ok(Self {
            rewriter: HtmlRewriter::new(policy, config)?,
        })
    }

    pub fn with_mode(mode: Mode) -> Result<Self, SanitizeError> {
        Self::new(Policy::default(), mode.config())
    }

    pub fn policy(&self) -> &Policy {
        self.rewriter.policy()
    }

    pub fn sanitize_str(&mut self, markup: &str) -> Result<String, SanitizeError> {
        let mut out = String::with_capacity(markup.len());
        self.sanitize_chunks([markup], &mut out)?;
        Ok(out)
    }

    /// Sanitize a document that arrives as text chunks, appending to `out`.
    pub fn sanitize_chunks<'a, I>(&mut self, chunks: I, out: &mut String) -> Result<(), SanitizeError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for chunk in chunks {
            if let Err(err) = self.rewriter.feed(chunk, out) {
                self.rewriter.abandon(out);
                return Err(err.into());
            }
        }
        self.rewriter.finish(out)?;
        Ok(())
    }

    /// Sanitize UTF-8 bytes from `reader` into `writer`. Malformed sequences
    /// become U+FFFD; output is written as it is produced.
    pub fn sanitize_reader<R: Read, W: Write>(
        &mut self,
        mut reader: R,
        mut writer: W,
    ) -> Result<(), SanitizeError> {
        let mut decoder = Utf8Decoder::new();
        let mut bytes = vec![0u8; READ_CHUNK];
        let mut text = String::with_capacity(READ_CHUNK);
        let mut out = String::with_capacity(READ_CHUNK);
        loop {
            let read = match reader.read(&mut bytes) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.rewriter.reset();
                    return Err(err.into());
                }
            };
            text.clear();
            decoder.push(&bytes[..read], &mut text);
            let fed = self.rewriter.feed(&text, &mut out);
            if let Err(err) = fed {
                self.rewriter.abandon(&mut out);
                writer.write_all(out.as_bytes())?;
                return Err(err.into());
            }
            if let Err(err) = writer.write_all(out.as_bytes()) {
                self.rewriter.reset();
                return Err(err.into());
            }
            out.clear();
        }
        text.clear();
        decoder.finish(&mut text);
        let result = match self.rewriter.feed(&text, &mut out) {
            Ok(()) => self.rewriter.finish(&mut out),
            Err(err) => {
                self.rewriter.abandon(&mut out);
                Err(err)
            }
        };
        writer.write_all(out.as_bytes())?;
        writer.flush()?;
        result.map_err(SanitizeError::from)
    }
}

/// Sanitize a whole document with the built-in policy.
///
/// Never fails: if a unit exceeds the scanner limits, the output produced so
/// far is returned with every open element closed.
pub fn sanitize(markup: &str) -> String {
    sanitize_with_mode(markup, Mode::Document)
}

/// Sanitize a fragment with the built-in policy; see [`sanitize`].
pub fn sanitize_fragment(markup: &str) -> String {
    sanitize_with_mode(markup, Mode::Fragment)
}

fn sanitize_with_mode(markup: &str, mode: Mode) -> String {
    if markup.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(markup.len());
    let result = Sanitizer::with_mode(mode)
        .and_then(|mut sanitizer| sanitizer.sanitize_chunks([markup], &mut out));
    if let Err(err) = result {
        warn!(target: "sanitizer.rewriter", "sanitize stopped early: {err}");
    }
    out
}

pub fn sanitize_reader<R: Read, W: Write>(reader: R, writer: W, mode: Mode) -> Result<(), SanitizeError> {
    Sanitizer::with_mode(mode)?.sanitize_reader(reader, writer)
}

pub fn sanitize_chunks<'a, I>(chunks: I, out: &mut String, mode: Mode) -> Result<(), SanitizeError>
where
    I: IntoIterator<Item = &'a str>,
{
    Sanitizer::with_mode(mode)?.sanitize_chunks(chunks, out)
}
