//! The reusable style token.

use html::{Fragment, FragmentChars, Phase, RunList, RunSlices, ScanBuffer, TagId};

use crate::properties::PropertyId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CssTokenKind {
    #[default]
    None,
    /// Whitespace, comments, CDO/CDC markers, stray delimiters, or a statement
    /// that was dropped as invalid. Carries no content.
    Skipped,
    RuleSet,
    AtRule,
    /// A bare declaration list (an inline `style` attribute).
    Declarations,
    EndOfFile,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AtRuleKind {
    #[default]
    None,
    Page,
    FontFace,
}

/// Which part of a statement was open when a piece was cut.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CssPart {
    #[default]
    None,
    Declarations,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClassType {
    /// No class part.
    #[default]
    None,
    /// `.name`
    Regular,
    /// `#name`
    Hash,
    /// `:name`, `::name` (the second colon is part of the class), or `:name(args)`.
    Pseudo,
    /// `[name op value]`; the class covers what is between the brackets.
    Attrib,
}

/// How a selector entry attaches to the entry before it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Combinator {
    /// First entry, or another part of the same compound selector.
    #[default]
    None,
    Descendant,
    Child,
    Adjacent,
    /// Starts a new selector in a comma-separated group.
    Comma,
}

impl Combinator {
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::None => "",
            Combinator::Descendant => " ",
            Combinator::Child => ">",
            Combinator::Adjacent => "+",
            Combinator::Comma => ",",
        }
    }
}

/// One simple-selector part: an optional type name and an optional class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectorEntry {
    pub name: Fragment,
    pub class: Fragment,
    pub name_id: TagId,
    pub class_type: ClassType,
    pub combinator: Combinator,
    pub deleted: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyEntry {
    pub name: Fragment,
    /// The value without `!important` and surrounding whitespace.
    pub value: Fragment,
    pub id: PropertyId,
    pub important: bool,
    pub deleted: bool,
}

/// The style token: one instance per parser, reset between units.
#[derive(Debug)]
pub struct CssToken {
    pub(crate) kind: CssTokenKind,
    pub(crate) phase: Phase,
    pub(crate) part: CssPart,
    pub(crate) invalid: bool,
    pub(crate) at_rule: AtRuleKind,
    pub(crate) runs: RunList,
    pub(crate) selectors: Vec<SelectorEntry>,
    pub(crate) properties: Vec<PropertyEntry>,
}

impl CssToken {
    pub(crate) fn new(initial_runs: usize, max_runs: usize) -> Self {
        Self {
            kind: CssTokenKind::None,
            phase: Phase::None,
            part: CssPart::None,
            invalid: false,
            at_rule: AtRuleKind::None,
            runs: RunList::new(initial_runs, max_runs),
            selectors: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn kind(&self) -> CssTokenKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn part(&self) -> CssPart {
        self.part
    }

    /// The statement this piece belongs to was dropped as malformed.
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn at_rule(&self) -> AtRuleKind {
        self.at_rule
    }

    pub fn runs(&self) -> &RunList {
        &self.runs
    }

    pub fn selectors(&self) -> &[SelectorEntry] {
        &self.selectors
    }

    pub fn properties(&self) -> &[PropertyEntry] {
        &self.properties
    }

    pub fn delete_selector(&mut self, index: usize) {
        if let Some(entry) = self.selectors.get_mut(index) {
            entry.deleted = true;
        }
    }

    pub fn delete_property(&mut self, index: usize) {
        if let Some(entry) = self.properties.get_mut(index) {
            entry.deleted = true;
        }
    }

    pub fn chars<'a>(&'a self, fragment: Fragment, buffer: &'a ScanBuffer) -> FragmentChars<'a> {
        self.runs.chars(fragment, buffer)
    }

    pub fn text(&self, fragment: Fragment, buffer: &ScanBuffer) -> String {
        self.runs.text(fragment, buffer)
    }

    pub fn run_slices<'a>(&'a self, fragment: Fragment, buffer: &'a ScanBuffer) -> RunSlices<'a> {
        self.runs.run_slices(fragment, buffer)
    }

    pub(crate) fn clear(&mut self, start: usize) {
        self.kind = CssTokenKind::None;
        self.phase = Phase::None;
        self.part = CssPart::None;
        self.invalid = false;
        self.at_rule = AtRuleKind::None;
        self.runs.reset(start);
        self.selectors.clear();
        self.properties.clear();
    }

    /// Start the next piece of the same statement at `start`.
    pub(crate) fn continue_at(&mut self, start: usize) {
        self.part = CssPart::None;
        self.runs.reset(start);
        self.selectors.clear();
        self.properties.clear();
    }
}
