//! Fixed-size escape tables for the single-byte contexts.

use log::trace;

pub(crate) enum Lookup<'a> {
    Safe,
    Escape(&'a str),
    /// Outside the table; the context's fallback generator decides.
    Fallback,
}

/// Per-code-point replacement strings, `None` for pass-through.
pub(crate) struct EscapeTable {
    entries: Box<[Option<Box<str>>]>,
}

impl EscapeTable {
    /// A table of `size` entries where every code point is escaped with
    /// `generator`.
    pub fn escape_all(name: &str, size: u32, generator: impl Fn(u32) -> String) -> Self {
        trace!(target: "encoder.tables", "building {name} table ({size} entries)");
        Self {
            entries: (0..size)
                .map(|cp| Some(generator(cp).into_boxed_str()))
                .collect(),
        }
    }

    /// Let every listed code point through unchanged.
    pub fn punch(mut self, safe: impl IntoIterator<Item = u32>) -> Self {
        for cp in safe {
            if let Some(entry) = self.entries.get_mut(cp as usize) {
                *entry = None;
            }
        }
        self
    }

    /// Let every code point matching `safe` through unchanged.
    pub fn punch_where(self, safe: impl Fn(u32) -> bool) -> Self {
        let size = self.entries.len() as u32;
        self.punch((0..size).filter(|&cp| safe(cp)))
    }

    /// Replace one entry.
    pub fn with(mut self, cp: u32, replacement: &str) -> Self {
        if let Some(entry) = self.entries.get_mut(cp as usize) {
            *entry = Some(replacement.into());
        }
        self
    }

    #[inline]
    pub fn lookup(&self, cp: u32) -> Lookup<'_> {
        match self.entries.get(cp as usize) {
            Some(None) => Lookup::Safe,
            Some(Some(replacement)) => Lookup::Escape(replacement),
            None => Lookup::Fallback,
        }
    }
}

/// ASCII letters and digits.
pub(crate) fn alphanumeric(cp: u32) -> bool {
    char::from_u32(cp).is_some_and(|ch| ch.is_ascii_alphanumeric())
}
