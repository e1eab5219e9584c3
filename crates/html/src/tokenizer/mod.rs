//! Streaming markup tokenizer.
//!
//! The tokenizer reads from a caller-owned [`ScanBuffer`] and hands out one
//! token piece per [`HtmlTokenizer::next_token`] call. A token that does not
//! fit the window (or the run arena) is cut into pieces; each piece reports
//! its [`Phase`] and, for tags, which [`TagPart`] was open at the cut.
//!
//! Every lookahead decision (tag openers, character references, the end tag
//! that closes raw text) waits for more input unless the stream has ended,
//! so the token stream depends only on the characters, never on how they
//! were chunked into the window.
//!
//! Positions are logical offsets into the whole stream. At the start of each
//! call the tokenizer discards every buffered character before the piece it
//! is about to produce; a consumer must finish reading a piece before asking
//! for the next one.

mod states;
mod token;

#[cfg(test)]
mod tests;

pub use token::{AttributeEntry, HtmlToken, HtmlTokenKind, QuoteStyle, TagFlags, TagPart};

use crate::entities::{EntityMatch, match_entity};
use crate::names::{AttributeId, MAX_NAME_LEN, TagId, TextMode};
use crate::shared::{
    ConfigError, Fragment, FragmentHead, MIN_WINDOW, Phase, PhaseEvent, RunKind, RunType,
    ScanBuffer, ScanError, ScanResult, ScanStats, validate_limit, validate_runs,
};
use states::{MarkupOpen, RawClose, Step, TokenizerState, classify_markup, match_raw_close};
use tools::chars::{ends_html_name, is_html_whitespace};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Runs allocated up front for the token's arena.
    pub initial_runs: usize,
    /// Hard limit on runs per piece; reaching it cuts the piece.
    pub max_runs: usize,
    /// Attributes per tag piece; reaching it cuts the piece.
    pub max_attributes: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            initial_runs: 64,
            max_runs: 4096,
            max_attributes: 64,
        }
    }
}

impl TokenizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_runs(self.initial_runs, self.max_runs)?;
        validate_limit("max_attributes", self.max_attributes)
    }
}

/// What the next call does with the current token before scanning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    /// Keep building the token (the last call asked for more input).
    Resume,
    /// The last token ended; start a new one.
    Fresh,
    /// The last piece was cut; carry open parts into a new piece.
    Continue,
}

pub struct HtmlTokenizer {
    config: TokenizerConfig,
    state: TokenizerState,
    raw_end: TagId,
    cursor: usize,
    token: HtmlToken,
    pending: Pending,
    content_head: Option<FragmentHead>,
    name_head: Option<FragmentHead>,
    attr_name_head: Option<FragmentHead>,
    attr_value_head: Option<FragmentHead>,
    open_attr: Option<usize>,
    scratch: String,
    scratch_overflow: bool,
    buffer_id: Option<u64>,
    finished: bool,
    failed: Option<ScanError>,
    stats: ScanStats,
}

impl HtmlTokenizer {
    pub fn new(config: TokenizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let token = HtmlToken::new(config.initial_runs, config.max_runs);
        Ok(Self {
            config,
            state: TokenizerState::Data,
            raw_end: TagId::Unknown,
            cursor: 0,
            token,
            pending: Pending::Fresh,
            content_head: None,
            name_head: None,
            attr_name_head: None,
            attr_value_head: None,
            open_attr: None,
            scratch: String::with_capacity(MAX_NAME_LEN),
            scratch_overflow: false,
            buffer_id: None,
            finished: false,
            failed: None,
            stats: ScanStats::default(),
        })
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// The piece produced by the last `next_token` call that returned `Token`.
    pub fn token(&self) -> &HtmlToken {
        &self.token
    }

    /// Mutable access for consumers that mark attributes deleted.
    pub fn token_mut(&mut self) -> &mut HtmlToken {
        &mut self.token
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Logical offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.cursor
    }

    /// Return to the initial state and release the buffer binding.
    pub fn reset(&mut self) {
        self.state = TokenizerState::Data;
        self.raw_end = TagId::Unknown;
        self.cursor = 0;
        self.token.clear(0);
        self.pending = Pending::Fresh;
        self.content_head = None;
        self.name_head = None;
        self.attr_name_head = None;
        self.attr_value_head = None;
        self.open_attr = None;
        self.scratch.clear();
        self.scratch_overflow = false;
        self.buffer_id = None;
        self.finished = false;
        self.failed = None;
        self.stats = ScanStats::default();
    }

    pub fn next_token(&mut self, buffer: &mut ScanBuffer) -> Result<ScanResult, ScanError> {
        self.bind(buffer);
        if let Some(err) = self.failed {
            return Err(err);
        }
        if self.finished {
            return Ok(ScanResult::Finished);
        }
        self.begin_piece();
        buffer.discard_before(self.token.runs.start_offset());
        loop {
            self.stats.steps += 1;
            match self.step(buffer) {
                Step::Progress => {}
                Step::NeedMoreInput => {
                    self.stats.need_more_input += 1;
                    return Ok(ScanResult::NeedMoreInput);
                }
                Step::Emit => return Ok(ScanResult::Token),
                Step::Exhausted => {
                    let err = ScanError::CapacityExceeded {
                        offset: self.token.runs.start_offset(),
                        max_runs: self.config.max_runs,
                    };
                    log::debug!(target: "html.tokenizer", "{err}");
                    self.failed = Some(err);
                    return Err(err);
                }
            }
        }
    }

    fn bind(&mut self, buffer: &ScanBuffer) {
        match self.buffer_id {
            Some(id) => assert_eq!(
                id,
                buffer.id(),
                "tokenizer is bound to another buffer; reset it first"
            ),
            None => {
                assert!(
                    buffer.capacity() >= MIN_WINDOW,
                    "window of {} characters is below the minimum of {MIN_WINDOW}",
                    buffer.capacity()
                );
                self.buffer_id = Some(buffer.id());
            }
        }
    }

    fn begin_piece(&mut self) {
        match std::mem::replace(&mut self.pending, Pending::Resume) {
            Pending::Resume => {}
            Pending::Fresh => self.token.clear(self.cursor),
            Pending::Continue => self.continue_piece(),
        }
    }

    /// Start a new piece of the token that was cut, reopening whatever was
    /// open at the cut.
    fn continue_piece(&mut self) {
        let start = self.cursor;
        let carried = self
            .open_attr
            .and_then(|idx| self.token.attributes.get(idx).copied());
        self.token.runs.reset(start);
        self.token.part = TagPart::None;
        self.token.content = Fragment::default();
        self.token.name = Fragment::default();
        self.token.attributes.clear();
        if self.content_head.is_some() {
            self.content_head = Some(FragmentHead::piece_start(start));
        }
        if self.name_head.is_some() {
            self.name_head = Some(FragmentHead::piece_start(start));
        } else {
            self.token.name_phase = Phase::None;
        }
        self.open_attr = None;
        if let Some(prev) = carried {
            let mut entry = AttributeEntry {
                id: prev.id,
                phase: prev.phase,
                quote: prev.quote,
                has_value: prev.has_value,
                ..AttributeEntry::default()
            };
            if self.attr_name_head.is_some() {
                entry.name_phase = prev.name_phase;
                self.attr_name_head = Some(FragmentHead::piece_start(start));
            }
            if self.attr_value_head.is_some() {
                entry.value_phase = prev.value_phase;
                self.attr_value_head = Some(FragmentHead::piece_start(start));
            }
            self.token.attributes.push(entry);
            self.open_attr = Some(0);
        }
    }

    fn transition_to(&mut self, next: TokenizerState) {
        if self.state == next {
            return;
        }
        log::trace!(
            target: "html.tokenizer",
            "state {:?} -> {:?} @{}",
            self.state,
            next,
            self.cursor
        );
        self.state = next;
    }

    fn step(&mut self, buffer: &ScanBuffer) -> Step {
        match self.state {
            TokenizerState::Data => self.step_data(buffer),
            TokenizerState::RawText | TokenizerState::RcData => self.step_raw_text(buffer),
            TokenizerState::PlainText => self.step_plain_text(buffer),
            TokenizerState::TagName => self.step_tag_name(buffer),
            TokenizerState::BeforeAttributeName => self.step_before_attribute_name(buffer),
            TokenizerState::AttributeName => self.step_attribute_name(buffer),
            TokenizerState::AfterAttributeName => self.step_after_attribute_name(buffer),
            TokenizerState::BeforeAttributeValue => self.step_before_attribute_value(buffer),
            TokenizerState::AttributeValueQuoted(quote) => {
                self.step_attribute_value_quoted(buffer, quote)
            }
            TokenizerState::AttributeValueUnquoted => self.step_attribute_value_unquoted(buffer),
            TokenizerState::SelfClosingStartTag => self.step_self_closing(buffer),
            TokenizerState::Comment => self.step_comment(buffer),
            TokenizerState::Declaration => self.step_declaration(buffer),
        }
    }

    // ---- input availability -------------------------------------------------

    /// No character at the cursor.
    fn starved(&mut self, buffer: &ScanBuffer) -> Step {
        if buffer.is_end_of_stream() {
            return self.end_of_stream();
        }
        self.wait(buffer)
    }

    /// A decision needs characters that are not buffered yet.
    fn wait(&mut self, buffer: &ScanBuffer) -> Step {
        if buffer.is_full() {
            self.cut_piece()
        } else {
            Step::NeedMoreInput
        }
    }

    fn end_of_stream(&mut self) -> Step {
        if self.token.kind == HtmlTokenKind::None {
            self.token.kind = HtmlTokenKind::EndOfFile;
            self.token.phase = Phase::Complete;
            self.finished = true;
            self.stats.tokens_emitted += 1;
            log::trace!(target: "html.tokenizer", "end of stream @{}", self.cursor);
            return Step::Emit;
        }
        // Unterminated constructs end with the stream.
        self.transition_to(TokenizerState::Data);
        self.finish_token()
    }

    // ---- run recording ------------------------------------------------------

    /// Record `len` characters as one run and advance past them.
    ///
    /// Returns `false` when the run arena is full; nothing is recorded then.
    fn record(&mut self, kind: RunKind, ty: RunType, len: usize) -> bool {
        if !self.token.runs.reserve(kind, ty) {
            return false;
        }
        self.token.runs.add(kind, ty, len);
        self.cursor += len;
        true
    }

    fn has_room(&mut self) -> bool {
        self.token.runs.prepare(1)
    }

    fn capacity_cut(&mut self) -> Step {
        self.stats.capacity_cuts += 1;
        self.cut_piece()
    }

    fn ensure_text(&mut self) {
        if self.token.kind == HtmlTokenKind::None {
            self.token.kind = HtmlTokenKind::Text;
            self.content_head = Some(self.token.runs.head());
        }
    }

    fn text(&mut self, ty: RunType, len: usize) -> Step {
        self.ensure_text();
        if !self.record(RunKind::Text, ty, len) {
            return self.capacity_cut();
        }
        Step::Progress
    }

    fn attribute_value(&mut self, ty: RunType, len: usize) -> Step {
        if !self.record(RunKind::AttrValue, ty, len) {
            return self.capacity_cut();
        }
        Step::Progress
    }

    fn push_name(&mut self, chars: &[char]) {
        for &ch in chars {
            if self.scratch.len() >= MAX_NAME_LEN {
                self.scratch_overflow = true;
                return;
            }
            self.scratch.push(ch.to_ascii_lowercase());
        }
    }

    fn clear_name(&mut self) {
        self.scratch.clear();
        self.scratch_overflow = false;
    }

    // ---- piece boundaries ---------------------------------------------------

    fn open_part(&self) -> TagPart {
        if self.token.kind != HtmlTokenKind::Tag {
            TagPart::None
        } else if self.attr_value_head.is_some() {
            TagPart::AttributeValue
        } else if self.attr_name_head.is_some() {
            TagPart::AttributeName
        } else if self.name_head.is_some() {
            TagPart::Name
        } else {
            TagPart::Attributes
        }
    }

    fn close_content(&mut self) {
        if let Some(head) = self.content_head.take() {
            self.token.content = self.token.runs.fragment_from(head);
        }
    }

    fn close_name(&mut self, event: PhaseEvent) {
        let Some(head) = self.name_head else { return };
        self.token.name = self.token.runs.fragment_from(head);
        self.token.name_phase = self.token.name_phase.advance(event);
        if event == PhaseEvent::Finish {
            self.name_head = None;
            self.token.tag_id = if self.scratch_overflow {
                TagId::Unknown
            } else {
                TagId::lookup(&self.scratch)
            };
            self.token.flags.allow_whitespace = self.token.tag_id.is_block();
        }
    }

    fn close_attribute_name(&mut self, event: PhaseEvent) {
        let Some(head) = self.attr_name_head else { return };
        let fragment = self.token.runs.fragment_from(head);
        let id = if self.scratch_overflow {
            AttributeId::Unknown
        } else {
            AttributeId::lookup(&self.scratch)
        };
        if let Some(entry) = self.open_entry() {
            entry.name = fragment;
            entry.name_phase = entry.name_phase.advance(event);
            if event == PhaseEvent::Finish {
                entry.id = id;
            }
        }
        if event == PhaseEvent::Finish {
            self.attr_name_head = None;
        }
    }

    fn close_attribute_value(&mut self, event: PhaseEvent) {
        let Some(head) = self.attr_value_head else { return };
        let fragment = self.token.runs.fragment_from(head);
        if let Some(entry) = self.open_entry() {
            entry.value = fragment;
            entry.value_phase = entry.value_phase.advance(event);
        }
        if event == PhaseEvent::Finish {
            self.attr_value_head = None;
        }
    }

    fn end_attribute(&mut self, event: PhaseEvent) {
        self.close_attribute_name(event);
        self.close_attribute_value(event);
        if let Some(entry) = self.open_entry() {
            entry.phase = entry.phase.advance(event);
        }
        if event == PhaseEvent::Finish {
            self.open_attr = None;
        }
    }

    fn open_entry(&mut self) -> Option<&mut AttributeEntry> {
        self.open_attr
            .and_then(|idx| self.token.attributes.get_mut(idx))
    }

    fn close_parts(&mut self, event: PhaseEvent) {
        if let Some(head) = self.content_head {
            self.token.content = self.token.runs.fragment_from(head);
            if event == PhaseEvent::Finish {
                self.content_head = None;
            }
        }
        self.close_name(event);
        self.end_attribute(event);
    }

    /// Hand out what was scanned so far as a piece of a longer token.
    fn cut_piece(&mut self) -> Step {
        let start = self.token.runs.start_offset();
        if self.token.kind == HtmlTokenKind::None || self.cursor == start {
            return Step::Exhausted;
        }
        self.token.part = self.open_part();
        self.close_parts(PhaseEvent::Flush);
        self.token.phase = self.token.phase.advance(PhaseEvent::Flush);
        self.pending = Pending::Continue;
        self.stats.pieces_cut += 1;
        log::debug!(
            target: "html.tokenizer",
            "cut {:?} piece [{}, {}) in {:?}",
            self.token.kind,
            start,
            self.cursor,
            self.token.part
        );
        Step::Emit
    }

    fn finish_token(&mut self) -> Step {
        self.token.part = TagPart::None;
        self.close_parts(PhaseEvent::Finish);
        self.token.phase = self.token.phase.advance(PhaseEvent::Finish);
        self.pending = Pending::Fresh;
        self.stats.tokens_emitted += 1;
        Step::Emit
    }

    fn finish_tag(&mut self) -> Step {
        let next = if self.token.flags.end_tag {
            TokenizerState::Data
        } else {
            match self.token.tag_id.text_mode() {
                TextMode::Normal => TokenizerState::Data,
                TextMode::RawText => {
                    self.raw_end = self.token.tag_id;
                    TokenizerState::RawText
                }
                TextMode::RcData => {
                    self.raw_end = self.token.tag_id;
                    TokenizerState::RcData
                }
                TextMode::PlainText => TokenizerState::PlainText,
            }
        };
        self.transition_to(next);
        self.finish_token()
    }

    // ---- states -------------------------------------------------------------

    fn step_data(&mut self, buffer: &ScanBuffer) -> Step {
        let Some(ch) = buffer.char_at(self.cursor) else {
            return self.starved(buffer);
        };
        match ch {
            '<' => self.markup_open(buffer),
            '&' => self.char_ref(buffer, RunKind::Text),
            _ => {
                let len = span(buffer.tail(self.cursor), |c| c != '<' && c != '&');
                self.text(RunType::Normal, len)
            }
        }
    }

    fn markup_open(&mut self, buffer: &ScanBuffer) -> Step {
        let open = classify_markup(buffer.tail(self.cursor), buffer.is_end_of_stream());
        let starts_markup = !matches!(open, MarkupOpen::Text | MarkupOpen::Incomplete);
        if starts_markup && self.token.kind == HtmlTokenKind::Text {
            return self.finish_token();
        }
        match open {
            MarkupOpen::Incomplete => self.wait(buffer),
            MarkupOpen::Text => self.text(RunType::Normal, 1),
            MarkupOpen::StartTag => self.open_tag(false),
            MarkupOpen::EndTag => self.open_tag(true),
            MarkupOpen::Comment => {
                self.open_body(HtmlTokenKind::Comment, 4, TokenizerState::Comment)
            }
            MarkupOpen::Declaration(prefix) => {
                self.open_body(HtmlTokenKind::Declaration, prefix, TokenizerState::Declaration)
            }
        }
    }

    fn open_tag(&mut self, end_tag: bool) -> Step {
        self.token.kind = HtmlTokenKind::Tag;
        self.token.flags.end_tag = end_tag;
        let prefix = if end_tag { 2 } else { 1 };
        if !self.record(RunKind::Markup, RunType::Invalid, prefix) {
            return self.capacity_cut();
        }
        self.clear_name();
        self.name_head = Some(self.token.runs.head());
        self.transition_to(TokenizerState::TagName);
        Step::Progress
    }

    fn open_body(&mut self, kind: HtmlTokenKind, prefix: usize, next: TokenizerState) -> Step {
        self.token.kind = kind;
        if !self.record(RunKind::Markup, RunType::Invalid, prefix) {
            return self.capacity_cut();
        }
        self.content_head = Some(self.token.runs.head());
        self.transition_to(next);
        Step::Progress
    }

    fn char_ref(&mut self, buffer: &ScanBuffer, kind: RunKind) -> Step {
        let (ty, len) = match match_entity(buffer.tail(self.cursor), buffer.is_end_of_stream()) {
            EntityMatch::Incomplete => return self.wait(buffer),
            EntityMatch::NoMatch => (RunType::Normal, 1),
            EntityMatch::Matched { len, ch } => (RunType::Literal(ch), len),
        };
        match kind {
            RunKind::AttrValue => self.attribute_value(ty, len),
            _ => self.text(ty, len),
        }
    }

    fn step_raw_text(&mut self, buffer: &ScanBuffer) -> Step {
        let Some(ch) = buffer.char_at(self.cursor) else {
            return self.starved(buffer);
        };
        let rcdata = self.state == TokenizerState::RcData;
        match ch {
            '<' => {
                let tail = buffer.tail(self.cursor);
                match match_raw_close(tail, self.raw_end.name(), buffer.is_end_of_stream()) {
                    RawClose::Found => {
                        self.transition_to(TokenizerState::Data);
                        if self.token.kind == HtmlTokenKind::Text {
                            return self.finish_token();
                        }
                        Step::Progress
                    }
                    RawClose::NotHere => self.text(RunType::Normal, 1),
                    RawClose::Incomplete => self.wait(buffer),
                }
            }
            '&' if rcdata => self.char_ref(buffer, RunKind::Text),
            _ => {
                let len = span(buffer.tail(self.cursor), |c| {
                    c != '<' && !(rcdata && c == '&')
                });
                self.text(RunType::Normal, len)
            }
        }
    }

    fn step_plain_text(&mut self, buffer: &ScanBuffer) -> Step {
        let len = buffer.tail(self.cursor).len();
        if len == 0 {
            return self.starved(buffer);
        }
        self.text(RunType::Normal, len)
    }

    fn step_tag_name(&mut self, buffer: &ScanBuffer) -> Step {
        let Some(ch) = buffer.char_at(self.cursor) else {
            return self.starved(buffer);
        };
        if ends_html_name(ch) {
            self.close_name(PhaseEvent::Finish);
            self.transition_to(TokenizerState::BeforeAttributeName);
            return Step::Progress;
        }
        let start = self.cursor;
        let len = span(buffer.tail(start), |c| !ends_html_name(c));
        if !self.record(RunKind::TagName, RunType::Normal, len) {
            return self.capacity_cut();
        }
        self.push_name(buffer.slice(start, start + len));
        Step::Progress
    }

    fn whitespace(&mut self, buffer: &ScanBuffer) -> Step {
        let len = span(buffer.tail(self.cursor), is_html_whitespace);
        if !self.record(RunKind::Whitespace, RunType::Invalid, len) {
            return self.capacity_cut();
        }
        Step::Progress
    }

    fn step_before_attribute_name(&mut self, buffer: &ScanBuffer) -> Step {
        let Some(ch) = buffer.char_at(self.cursor) else {
            return self.starved(buffer);
        };
        match ch {
            c if is_html_whitespace(c) => self.whitespace(buffer),
            '/' => {
                if !self.record(RunKind::Markup, RunType::Invalid, 1) {
                    return self.capacity_cut();
                }
                self.transition_to(TokenizerState::SelfClosingStartTag);
                Step::Progress
            }
            '>' => {
                if !self.record(RunKind::Markup, RunType::Invalid, 1) {
                    return self.capacity_cut();
                }
                self.finish_tag()
            }
            _ => self.start_attribute(buffer),
        }
    }

    /// Open a new attribute; its first character is always part of the name.
    fn start_attribute(&mut self, buffer: &ScanBuffer) -> Step {
        if self.token.attributes.len() >= self.config.max_attributes
            && self.cursor > self.token.runs.start_offset()
        {
            return self.cut_piece();
        }
        if !self.has_room() {
            return self.capacity_cut();
        }
        self.token.attributes.push(AttributeEntry::default());
        self.open_attr = Some(self.token.attributes.len() - 1);
        self.clear_name();
        self.attr_name_head = Some(self.token.runs.head());
        let start = self.cursor;
        self.record(RunKind::AttrName, RunType::Normal, 1);
        self.push_name(buffer.slice(start, start + 1));
        self.transition_to(TokenizerState::AttributeName);
        Step::Progress
    }

    fn step_attribute_name(&mut self, buffer: &ScanBuffer) -> Step {
        let Some(ch) = buffer.char_at(self.cursor) else {
            return self.starved(buffer);
        };
        let ends = |c: char| is_html_whitespace(c) || matches!(c, '/' | '>' | '=');
        if ends(ch) {
            self.close_attribute_name(PhaseEvent::Finish);
            self.transition_to(TokenizerState::AfterAttributeName);
            return Step::Progress;
        }
        let start = self.cursor;
        let len = span(buffer.tail(start), |c| !ends(c));
        if !self.record(RunKind::AttrName, RunType::Normal, len) {
            return self.capacity_cut();
        }
        self.push_name(buffer.slice(start, start + len));
        Step::Progress
    }

    fn step_after_attribute_name(&mut self, buffer: &ScanBuffer) -> Step {
        let Some(ch) = buffer.char_at(self.cursor) else {
            return self.starved(buffer);
        };
        match ch {
            c if is_html_whitespace(c) => self.whitespace(buffer),
            '=' => {
                if !self.record(RunKind::AttrEquals, RunType::Invalid, 1) {
                    return self.capacity_cut();
                }
                if let Some(entry) = self.open_entry() {
                    entry.has_value = true;
                }
                self.transition_to(TokenizerState::BeforeAttributeValue);
                Step::Progress
            }
            _ => {
                self.end_attribute(PhaseEvent::Finish);
                self.transition_to(TokenizerState::BeforeAttributeName);
                Step::Progress
            }
        }
    }

    fn step_before_attribute_value(&mut self, buffer: &ScanBuffer) -> Step {
        let Some(ch) = buffer.char_at(self.cursor) else {
            return self.starved(buffer);
        };
        match ch {
            c if is_html_whitespace(c) => self.whitespace(buffer),
            '"' | '\'' => {
                if !self.record(RunKind::AttrQuote, RunType::Invalid, 1) {
                    return self.capacity_cut();
                }
                if let Some(entry) = self.open_entry() {
                    entry.quote = if ch == '"' {
                        QuoteStyle::Double
                    } else {
                        QuoteStyle::Single
                    };
                }
                self.attr_value_head = Some(self.token.runs.head());
                self.transition_to(TokenizerState::AttributeValueQuoted(ch));
                Step::Progress
            }
            '>' => {
                self.end_attribute(PhaseEvent::Finish);
                self.transition_to(TokenizerState::BeforeAttributeName);
                Step::Progress
            }
            _ => {
                self.attr_value_head = Some(self.token.runs.head());
                self.transition_to(TokenizerState::AttributeValueUnquoted);
                Step::Progress
            }
        }
    }

    fn step_attribute_value_quoted(&mut self, buffer: &ScanBuffer, quote: char) -> Step {
        let Some(ch) = buffer.char_at(self.cursor) else {
            return self.starved(buffer);
        };
        match ch {
            c if c == quote => {
                if !self.has_room() {
                    return self.capacity_cut();
                }
                self.close_attribute_value(PhaseEvent::Finish);
                self.record(RunKind::AttrQuote, RunType::Invalid, 1);
                self.end_attribute(PhaseEvent::Finish);
                self.transition_to(TokenizerState::BeforeAttributeName);
                Step::Progress
            }
            '&' => self.char_ref(buffer, RunKind::AttrValue),
            _ => {
                let len = span(buffer.tail(self.cursor), |c| c != quote && c != '&');
                self.attribute_value(RunType::Normal, len)
            }
        }
    }

    fn step_attribute_value_unquoted(&mut self, buffer: &ScanBuffer) -> Step {
        let Some(ch) = buffer.char_at(self.cursor) else {
            return self.starved(buffer);
        };
        match ch {
            c if is_html_whitespace(c) || c == '>' => {
                self.end_attribute(PhaseEvent::Finish);
                self.transition_to(TokenizerState::BeforeAttributeName);
                Step::Progress
            }
            '&' => self.char_ref(buffer, RunKind::AttrValue),
            _ => {
                let len = span(buffer.tail(self.cursor), |c| {
                    !is_html_whitespace(c) && c != '>' && c != '&'
                });
                self.attribute_value(RunType::Normal, len)
            }
        }
    }

    fn step_self_closing(&mut self, buffer: &ScanBuffer) -> Step {
        let Some(ch) = buffer.char_at(self.cursor) else {
            return self.starved(buffer);
        };
        if ch != '>' {
            self.transition_to(TokenizerState::BeforeAttributeName);
            return Step::Progress;
        }
        if !self.record(RunKind::Markup, RunType::Invalid, 1) {
            return self.capacity_cut();
        }
        self.token.flags.empty_scope = true;
        self.finish_tag()
    }

    fn step_comment(&mut self, buffer: &ScanBuffer) -> Step {
        const CLOSE: [char; 3] = ['-', '-', '>'];
        let tail = buffer.tail(self.cursor);
        let Some(&ch) = tail.first() else {
            return self.starved(buffer);
        };
        if ch != '-' {
            let len = span(tail, |c| c != '-');
            if !self.record(RunKind::Comment, RunType::Normal, len) {
                return self.capacity_cut();
            }
            return Step::Progress;
        }
        let avail = tail.len().min(CLOSE.len());
        let closes = tail[..avail] == CLOSE[..avail];
        if closes && avail < CLOSE.len() && !buffer.is_end_of_stream() {
            return self.wait(buffer);
        }
        if closes && avail == CLOSE.len() {
            if !self.has_room() {
                return self.capacity_cut();
            }
            self.close_content();
            self.record(RunKind::Markup, RunType::Invalid, CLOSE.len());
            self.transition_to(TokenizerState::Data);
            return self.finish_token();
        }
        if !self.record(RunKind::Comment, RunType::Normal, 1) {
            return self.capacity_cut();
        }
        Step::Progress
    }

    fn step_declaration(&mut self, buffer: &ScanBuffer) -> Step {
        let tail = buffer.tail(self.cursor);
        let Some(&ch) = tail.first() else {
            return self.starved(buffer);
        };
        if ch == '>' {
            if !self.has_room() {
                return self.capacity_cut();
            }
            self.close_content();
            self.record(RunKind::Markup, RunType::Invalid, 1);
            self.transition_to(TokenizerState::Data);
            return self.finish_token();
        }
        let len = span(tail, |c| c != '>');
        if !self.record(RunKind::Declaration, RunType::Normal, len) {
            return self.capacity_cut();
        }
        Step::Progress
    }
}

fn span(input: &[char], keep: impl Fn(char) -> bool) -> usize {
    input.iter().take_while(|&&c| keep(c)).count()
}
