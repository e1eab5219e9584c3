//! Runs: the smallest recorded spans of classified characters.

/// What a run's characters mean to the grammar that recorded them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunKind {
    // Markup.
    Text,
    Whitespace,
    Markup,
    TagName,
    AttrName,
    AttrEquals,
    AttrQuote,
    AttrValue,
    Comment,
    Declaration,
    // Style.
    AtRule,
    Selector,
    SelectorClass,
    Combinator,
    PropertyName,
    Colon,
    Value,
    Quote,
    String,
    Url,
    Function,
    Important,
    Delimiter,
    Invalid,
}

/// How a consumer should treat a run's characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunType {
    /// Characters are content, read them from the window.
    Normal,
    /// Syntax or junk; covered for offset bookkeeping, never content.
    Invalid,
    /// The run's characters stand for this single decoded character.
    Literal(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    pub kind: RunKind,
    pub ty: RunType,
    pub len: u32,
}

impl Run {
    pub fn new(kind: RunKind, ty: RunType, len: usize) -> Self {
        Self {
            kind,
            ty,
            len: len as u32,
        }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_normal(&self) -> bool {
        self.ty == RunType::Normal
    }

    pub fn is_invalid(&self) -> bool {
        self.ty == RunType::Invalid
    }

    pub fn literal(&self) -> Option<char> {
        match self.ty {
            RunType::Literal(ch) => Some(ch),
            _ => None,
        }
    }

    /// Whether `other` may be merged into this run.
    pub(crate) fn extends_with(&self, kind: RunKind, ty: RunType) -> bool {
        self.kind == kind && self.ty == ty && !matches!(ty, RunType::Literal(_))
    }
}
