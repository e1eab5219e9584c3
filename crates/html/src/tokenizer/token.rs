//! The reusable markup token.

use crate::names::{AttributeId, TagId};
use crate::shared::{Fragment, FragmentChars, Phase, RunList, ScanBuffer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HtmlTokenKind {
    #[default]
    None,
    Text,
    Tag,
    Comment,
    Declaration,
    EndOfFile,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuoteStyle {
    #[default]
    None,
    Double,
    Single,
}

/// Which part of a tag was open when a piece was cut.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TagPart {
    #[default]
    None,
    Name,
    Attributes,
    AttributeName,
    AttributeValue,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagFlags {
    pub end_tag: bool,
    /// Self-closing syntax (`<br/>`).
    pub empty_scope: bool,
    /// Block-level element; surrounding whitespace is insignificant.
    pub allow_whitespace: bool,
}

/// One attribute of a tag piece.
///
/// An attribute cut by a window boundary shows up in consecutive pieces with
/// `phase` Begin/Continue/End; `name_phase` and `value_phase` do the same for
/// the two parts. A part absent from this piece has phase `None` and an empty
/// fragment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttributeEntry {
    pub id: AttributeId,
    pub phase: Phase,
    pub name_phase: Phase,
    pub value_phase: Phase,
    pub name: Fragment,
    pub value: Fragment,
    pub quote: QuoteStyle,
    pub has_value: bool,
    pub deleted: bool,
}

impl AttributeEntry {
    pub fn name_ends_here(&self) -> bool {
        self.name_phase.ends_here()
    }
}

/// The markup token: one instance per tokenizer, reset between units.
#[derive(Debug)]
pub struct HtmlToken {
    pub(crate) kind: HtmlTokenKind,
    pub(crate) phase: Phase,
    pub(crate) part: TagPart,
    pub(crate) runs: RunList,
    pub(crate) content: Fragment,
    pub(crate) name: Fragment,
    pub(crate) name_phase: Phase,
    pub(crate) tag_id: TagId,
    pub(crate) flags: TagFlags,
    pub(crate) attributes: Vec<AttributeEntry>,
}

impl HtmlToken {
    pub(crate) fn new(initial_runs: usize, max_runs: usize) -> Self {
        Self {
            kind: HtmlTokenKind::None,
            phase: Phase::None,
            part: TagPart::None,
            runs: RunList::new(initial_runs, max_runs),
            content: Fragment::default(),
            name: Fragment::default(),
            name_phase: Phase::None,
            tag_id: TagId::Unknown,
            flags: TagFlags::default(),
            attributes: Vec::new(),
        }
    }

    pub fn kind(&self) -> HtmlTokenKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn part(&self) -> TagPart {
        self.part
    }

    pub fn runs(&self) -> &RunList {
        &self.runs
    }

    /// Text of a Text token, or the body of a Comment/Declaration.
    pub fn content(&self) -> Fragment {
        self.content
    }

    pub fn name(&self) -> Fragment {
        self.name
    }

    pub fn name_phase(&self) -> Phase {
        self.name_phase
    }

    pub fn tag_id(&self) -> TagId {
        self.tag_id
    }

    pub fn flags(&self) -> TagFlags {
        self.flags
    }

    pub fn is_end_tag(&self) -> bool {
        self.flags.end_tag
    }

    pub fn attributes(&self) -> &[AttributeEntry] {
        &self.attributes
    }

    /// Mark an attribute of this piece deleted.
    pub fn delete_attribute(&mut self, index: usize) {
        if let Some(entry) = self.attributes.get_mut(index) {
            entry.deleted = true;
        }
    }

    pub fn chars<'a>(&'a self, fragment: Fragment, buffer: &'a ScanBuffer) -> FragmentChars<'a> {
        self.runs.chars(fragment, buffer)
    }

    pub fn text(&self, fragment: Fragment, buffer: &ScanBuffer) -> String {
        self.runs.text(fragment, buffer)
    }

    pub(crate) fn clear(&mut self, start: usize) {
        self.kind = HtmlTokenKind::None;
        self.phase = Phase::None;
        self.part = TagPart::None;
        self.runs.reset(start);
        self.content = Fragment::default();
        self.name = Fragment::default();
        self.name_phase = Phase::None;
        self.tag_id = TagId::Unknown;
        self.flags = TagFlags::default();
        self.attributes.clear();
    }
}
