//! Streaming style parser.
//!
//! Reads from a caller-owned [`ScanBuffer`] like the markup tokenizer and
//! hands out one statement piece per [`CssParser::next_token`] call. A rule
//! whose declarations do not fit the window is cut after its last complete
//! declaration; the first piece carries the selectors, later pieces only
//! declarations. A single declaration longer than the window is dropped.
//!
//! Statements are located with a boundary scan first, then parsed as
//! complete ranges, so decisions depend only on the characters and on
//! whether the window is full, never on how input was chunked.

mod grammar;


use html::shared::{validate_limit, validate_runs};
use html::{
    MIN_WINDOW, PhaseEvent, RunKind, RunType, ScanBuffer, ScanError, ScanResult, ScanStats,
};
use tools::chars::{is_css_name_char, is_css_whitespace};

use crate::boundary::{Boundaries, next_declaration_end};
use crate::functions::FunctionPolicy;
use crate::token::{AtRuleKind, CssPart, CssToken, CssTokenKind};
use grammar::{Grammar, Stop};

pub use html::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssParserConfig {
    pub initial_runs: usize,
    pub max_runs: usize,
    /// Selector entries per rule; a longer selector group drops the rule.
    pub max_selectors: usize,
    /// Declarations per piece; reaching it cuts the piece.
    pub max_properties: usize,
}

impl Default for CssParserConfig {
    fn default() -> Self {
        Self {
            initial_runs: 64,
            max_runs: 4096,
            max_selectors: 256,
            max_properties: 256,
        }
    }
}

impl CssParserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_runs(self.initial_runs, self.max_runs)?;
        validate_limit("max_selectors", self.max_selectors)?;
        validate_limit("max_properties", self.max_properties)
    }
}

/// What the input is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CssMode {
    /// A style sheet: rules and at-rules.
    #[default]
    StyleTag,
    /// The body of a `style` attribute: declarations only.
    Declarations,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    /// Between statements.
    Idle,
    /// Whitespace, comments and comment markers between statements.
    Junk,
    /// Waiting for the prelude of a statement to complete.
    Statement,
    /// Dropping a statement up to its end.
    SkipStatement,
    /// Inside a declaration block.
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Progress,
    NeedMoreInput,
    Emit,
    Exhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Resume,
    Fresh,
    Continue,
}

/// What the characters at the cursor are when no statement is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Junk {
    Trivia(usize),
    CommentOpen,
    Incomplete,
    Statement,
}

pub struct CssParser {
    config: CssParserConfig,
    mode: CssMode,
    functions: FunctionPolicy,
    stage: Stage,
    cursor: usize,
    token: CssToken,
    pending: Pending,
    boundary: Boundaries,
    at_keyword: usize,
    in_comment: bool,
    after_star: bool,
    skipping_declaration: bool,
    scratch: String,
    buffer_id: Option<u64>,
    finished: bool,
    failed: Option<ScanError>,
    stats: ScanStats,
}

impl CssParser {
    pub fn new(
        config: CssParserConfig,
        mode: CssMode,
        functions: FunctionPolicy,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let token = CssToken::new(config.initial_runs, config.max_runs);
        let mut parser = Self {
            config,
            mode,
            functions,
            stage: Stage::Idle,
            cursor: 0,
            token,
            pending: Pending::Fresh,
            boundary: Boundaries::default(),
            at_keyword: 0,
            in_comment: false,
            after_star: false,
            skipping_declaration: false,
            scratch: String::new(),
            buffer_id: None,
            finished: false,
            failed: None,
            stats: ScanStats::default(),
        };
        parser.reset(mode);
        Ok(parser)
    }

    pub fn config(&self) -> &CssParserConfig {
        &self.config
    }

    pub fn mode(&self) -> CssMode {
        self.mode
    }

    pub fn functions(&self) -> &FunctionPolicy {
        &self.functions
    }

    pub fn token(&self) -> &CssToken {
        &self.token
    }

    /// Mutable access for consumers that mark selectors or properties deleted.
    pub fn token_mut(&mut self) -> &mut CssToken {
        &mut self.token
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn offset(&self) -> usize {
        self.cursor
    }

    /// Return to the initial state for `mode` and release the buffer binding.
    pub fn reset(&mut self, mode: CssMode) {
        self.mode = mode;
        self.cursor = 0;
        self.token.clear(0);
        self.pending = Pending::Fresh;
        self.at_keyword = 0;
        self.in_comment = false;
        self.after_star = false;
        self.skipping_declaration = false;
        self.buffer_id = None;
        self.finished = false;
        self.failed = None;
        self.stats = ScanStats::default();
        match mode {
            CssMode::StyleTag => {
                self.stage = Stage::Idle;
                self.boundary = Boundaries::default();
            }
            CssMode::Declarations => {
                self.stage = Stage::Body;
                self.boundary = Boundaries::declarations(0);
            }
        }
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
                    log::debug!(target: "css.parser", "{err}");
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
                "parser is bound to another buffer; reset it first"
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
            Pending::Continue => self.token.continue_at(self.cursor),
        }
    }

    fn transition_to(&mut self, next: Stage) {
        if self.stage != next {
            log::trace!(
                target: "css.parser",
                "stage {:?} -> {:?} @{}",
                self.stage,
                next,
                self.cursor
            );
            self.stage = next;
        }
    }

    fn step(&mut self, buffer: &ScanBuffer) -> Step {
        match self.stage {
            Stage::Idle => self.step_idle(buffer),
            Stage::Junk => self.step_junk(buffer),
            Stage::Statement => self.step_statement(buffer),
            Stage::SkipStatement => self.step_skip_statement(buffer),
            Stage::Body => self.step_body(buffer),
        }
    }

    // ---- input availability -------------------------------------------------

    fn starved(&mut self, buffer: &ScanBuffer) -> Step {
        if buffer.is_end_of_stream() {
            return self.end_of_stream();
        }
        self.wait(buffer)
    }

    fn wait(&mut self, buffer: &ScanBuffer) -> Step {
        if buffer.is_full() {
            self.cut_piece()
        } else {
            Step::NeedMoreInput
        }
    }

    fn end_of_stream(&mut self) -> Step {
        if self.token.kind == CssTokenKind::None {
            self.token.kind = CssTokenKind::EndOfFile;
            self.token.phase = self.token.phase.advance(PhaseEvent::Finish);
            self.finished = true;
            self.stats.tokens_emitted += 1;
            log::trace!(target: "css.parser", "end of stream @{}", self.cursor);
            return Step::Emit;
        }
        self.transition_to(Stage::Idle);
        self.finish_token()
    }

    // ---- run recording ------------------------------------------------------

    fn record(&mut self, kind: RunKind, ty: RunType, len: usize) -> bool {
        if !self.token.runs.reserve(kind, ty) {
            return false;
        }
        self.token.runs.add(kind, ty, len);
        self.cursor += len;
        true
    }

    fn skip(&mut self, len: usize) -> Step {
        if !self.record(RunKind::Invalid, RunType::Invalid, len) {
            return self.capacity_cut();
        }
        Step::Progress
    }

    fn capacity_cut(&mut self) -> Step {
        self.stats.capacity_cuts += 1;
        self.cut_piece()
    }

    // ---- piece boundaries ---------------------------------------------------

    fn cut_piece(&mut self) -> Step {
        let start = self.token.runs.start_offset();
        if self.token.kind == CssTokenKind::None || self.cursor == start {
            return Step::Exhausted;
        }
        self.token.part = if self.stage == Stage::Body {
            CssPart::Declarations
        } else {
            CssPart::None
        };
        self.token.phase = self.token.phase.advance(PhaseEvent::Flush);
        self.pending = Pending::Continue;
        self.stats.pieces_cut += 1;
        log::debug!(
            target: "css.parser",
            "cut {:?} piece [{}, {}) in {:?}",
            self.token.kind,
            start,
            self.cursor,
            self.token.part
        );
        Step::Emit
    }

    fn finish_token(&mut self) -> Step {
        self.token.part = CssPart::None;
        self.token.phase = self.token.phase.advance(PhaseEvent::Finish);
        self.pending = Pending::Fresh;
        self.stats.tokens_emitted += 1;
        Step::Emit
    }

    /// Throw away everything recorded for the current statement.
    fn discard_statement(&mut self) {
        let start = self.token.runs.start_offset();
        self.cursor = start;
        self.token.runs.reset(start);
        self.token.selectors.clear();
        self.token.properties.clear();
        self.token.at_rule = AtRuleKind::None;
        self.token.kind = CssTokenKind::Skipped;
        self.token.invalid = true;
    }

    // ---- stages -------------------------------------------------------------

    fn step_idle(&mut self, buffer: &ScanBuffer) -> Step {
        let tail = buffer.tail(self.cursor);
        if tail.is_empty() {
            return self.starved(buffer);
        }
        match classify_junk(tail, buffer.is_end_of_stream()) {
            Junk::Incomplete => self.wait(buffer),
            Junk::Statement => self.start_statement(buffer),
            Junk::Trivia(_) | Junk::CommentOpen => {
                self.token.kind = CssTokenKind::Skipped;
                self.transition_to(Stage::Junk);
                Step::Progress
            }
        }
    }

    fn step_junk(&mut self, buffer: &ScanBuffer) -> Step {
        let tail = buffer.tail(self.cursor);
        if tail.is_empty() {
            return self.starved(buffer);
        }
        if self.in_comment {
            let mut len = 0;
            for &ch in tail {
                len += 1;
                if self.after_star && ch == '/' {
                    self.in_comment = false;
                    break;
                }
                self.after_star = ch == '*';
            }
            return self.skip(len);
        }
        match classify_junk(tail, buffer.is_end_of_stream()) {
            Junk::Trivia(len) => self.skip(len),
            Junk::CommentOpen => {
                self.in_comment = true;
                self.after_star = false;
                self.skip(2)
            }
            Junk::Incomplete => self.wait(buffer),
            Junk::Statement => {
                self.transition_to(Stage::Idle);
                self.finish_token()
            }
        }
    }

    fn start_statement(&mut self, buffer: &ScanBuffer) -> Step {
        let tail = buffer.tail(self.cursor);
        self.boundary = Boundaries::statement(self.cursor);
        self.at_keyword = 0;
        if tail.first() != Some(&'@') {
            self.token.kind = CssTokenKind::RuleSet;
            self.transition_to(Stage::Statement);
            return Step::Progress;
        }
        let name_len = tail[1..].iter().take_while(|&&c| is_css_name_char(c)).count();
        if 1 + name_len == tail.len() && !buffer.is_end_of_stream() && !buffer.is_full() {
            return Step::NeedMoreInput;
        }
        let name = &tail[1..1 + name_len];
        self.token.at_rule = if keyword_is(name, "page") {
            AtRuleKind::Page
        } else if keyword_is(name, "font-face") {
            AtRuleKind::FontFace
        } else {
            AtRuleKind::None
        };
        if self.token.at_rule == AtRuleKind::None {
            log::debug!(target: "css.parser", "dropping unsupported at-rule at {}", self.cursor);
            self.token.kind = CssTokenKind::Skipped;
            self.token.invalid = true;
            self.transition_to(Stage::SkipStatement);
            return Step::Progress;
        }
        self.at_keyword = 1 + name_len;
        self.token.kind = CssTokenKind::AtRule;
        self.transition_to(Stage::Statement);
        Step::Progress
    }

    fn step_statement(&mut self, buffer: &ScanBuffer) -> Step {
        self.boundary.advance(buffer);
        match (self.boundary.prelude_end, self.boundary.end) {
            (Some(open), _) => self.open_block(buffer, open),
            // Ended by `;` or a stray `}` before any block.
            (None, Some(end)) => self.drop_statement(end),
            (None, None) if buffer.is_end_of_stream() => {
                self.drop_statement(buffer.end_offset())
            }
            (None, None) if buffer.is_full() => {
                log::debug!(target: "css.parser", "prelude at {} exceeds the window", self.cursor);
                self.discard_statement();
                self.transition_to(Stage::SkipStatement);
                Step::Progress
            }
            (None, None) => Step::NeedMoreInput,
        }
    }

    fn drop_statement(&mut self, end: usize) -> Step {
        self.discard_statement();
        if !self.record(RunKind::Invalid, RunType::Invalid, end - self.cursor) {
            return self.capacity_cut();
        }
        self.transition_to(Stage::Idle);
        self.finish_token()
    }

    /// Parse the complete prelude `[cursor, open)` and the `{`.
    fn open_block(&mut self, buffer: &ScanBuffer, open: usize) -> Step {
        let start = self.cursor;
        let at_rule = self.token.at_rule;
        let mut grammar = Grammar::new(
            buffer.slice(start, open),
            &mut self.token,
            &self.functions,
            &mut self.scratch,
            self.config.max_selectors,
        );
        let parsed = parse_prelude(&mut grammar, at_rule, self.at_keyword);
        let opened = match parsed {
            Ok(()) => {
                self.cursor = open;
                self.record(RunKind::Delimiter, RunType::Invalid, 1)
            }
            Err(_) => false,
        };
        if !opened {
            log::debug!(
                target: "css.parser",
                "dropping statement at {start}: {:?}",
                parsed.err().unwrap_or(Stop::Full)
            );
            self.discard_statement();
            self.transition_to(Stage::SkipStatement);
            return Step::Progress;
        }
        self.token.part = CssPart::Declarations;
        self.transition_to(Stage::Body);
        Step::Progress
    }

    fn step_skip_statement(&mut self, buffer: &ScanBuffer) -> Step {
        self.boundary.advance(buffer);
        let to = self.boundary.end.unwrap_or(self.boundary.pos);
        if to > self.cursor && !self.record(RunKind::Invalid, RunType::Invalid, to - self.cursor) {
            return self.capacity_cut();
        }
        if self.boundary.end.is_some() || buffer.is_end_of_stream() {
            self.transition_to(Stage::Idle);
            return self.finish_token();
        }
        self.wait(buffer)
    }

    fn step_body(&mut self, buffer: &ScanBuffer) -> Step {
        if self.token.kind == CssTokenKind::None {
            self.token.kind = CssTokenKind::Declarations;
        }
        self.boundary.advance(buffer);
        if self.skipping_declaration {
            return self.skip_declaration(buffer);
        }
        if let Some(end) = self.boundary.end {
            if let Some(step) = self.declarations(buffer, end - 1) {
                return step;
            }
            if !self.record(RunKind::Delimiter, RunType::Invalid, 1) {
                return self.capacity_cut();
            }
            self.transition_to(Stage::Idle);
            return self.finish_token();
        }
        if buffer.is_end_of_stream() {
            if let Some(step) = self.declarations(buffer, buffer.end_offset()) {
                return step;
            }
            self.transition_to(Stage::Idle);
            return self.finish_token();
        }
        if !buffer.is_full() {
            return Step::NeedMoreInput;
        }
        match self.boundary.last_decl.filter(|&at| at > self.cursor) {
            Some(to) => {
                if let Some(step) = self.declarations(buffer, to) {
                    return step;
                }
                self.cut_piece()
            }
            None if self.cursor > self.token.runs.start_offset() => self.cut_piece(),
            None => {
                log::debug!(
                    target: "css.parser",
                    "dropping declaration at {} longer than the window",
                    self.cursor
                );
                self.skipping_declaration = true;
                self.boundary.watch();
                self.skip_declaration(buffer)
            }
        }
    }

    /// Drop characters up to the end of an oversized declaration.
    fn skip_declaration(&mut self, buffer: &ScanBuffer) -> Step {
        let stop = self
            .boundary
            .next_decl
            .or(self.boundary.end.map(|end| end - 1));
        let to = stop.unwrap_or(self.boundary.pos);
        if to > self.cursor && !self.record(RunKind::Invalid, RunType::Invalid, to - self.cursor) {
            return self.capacity_cut();
        }
        if stop.is_some() || buffer.is_end_of_stream() {
            self.skipping_declaration = false;
            self.boundary.unwatch();
            return Step::Progress;
        }
        self.wait(buffer)
    }

    /// Parse the complete declarations in `[cursor, to)`.
    ///
    /// Returns a step when the piece has to be cut before all of them fit.
    fn declarations(&mut self, buffer: &ScanBuffer, to: usize) -> Option<Step> {
        let piece_start = self.token.runs.start_offset();
        let base = self.cursor;
        let src = buffer.slice(base, to);
        let mut idx = 0;
        while idx < src.len() {
            let at = base + idx;
            let end = next_declaration_end(&src[idx..]).map_or(src.len(), |len| idx + len);
            let next = (end + 1).min(src.len());
            if self.token.properties.len() >= self.config.max_properties {
                return Some(self.cut_piece());
            }
            let checkpoint = self.token.runs.checkpoint();
            let count = self.token.properties.len();
            let mut outcome = Grammar::new(
                &src[idx..end],
                &mut self.token,
                &self.functions,
                &mut self.scratch,
                self.config.max_selectors,
            )
            .declaration();
            if outcome.is_ok() {
                self.cursor = base + end;
                if end < src.len() && !self.record(RunKind::Delimiter, RunType::Invalid, 1) {
                    outcome = Err(Stop::Full);
                }
            }
            if let Err(stop) = outcome {
                self.token.runs.rollback(checkpoint);
                self.token.properties.truncate(count);
                self.cursor = at;
                if stop == Stop::Full && at > piece_start {
                    return Some(self.capacity_cut());
                }
                log::trace!(target: "css.parser", "dropping declaration at {at}: {stop:?}");
                if !self.record(RunKind::Invalid, RunType::Invalid, next - idx) {
                    return Some(self.capacity_cut());
                }
            }
            idx = next;
        }
        None
    }
}

fn parse_prelude(grammar: &mut Grammar<'_>, at_rule: AtRuleKind, keyword: usize) -> Result<(), Stop> {
    if keyword > 0 {
        grammar.at_keyword(keyword)?;
    }
    match at_rule {
        AtRuleKind::None => grammar.selectors(),
        AtRuleKind::Page => grammar.page_prelude(),
        AtRuleKind::FontFace => grammar.empty_prelude(),
    }
}

fn keyword_is(name: &[char], keyword: &str) -> bool {
    name.len() == keyword.len()
        && name
            .iter()
            .zip(keyword.chars())
            .all(|(got, want)| got.eq_ignore_ascii_case(&want))
}

fn classify_junk(input: &[char], at_end: bool) -> Junk {
    let Some(&first) = input.first() else {
        return Junk::Incomplete;
    };
    match first {
        c if is_css_whitespace(c) => {
            Junk::Trivia(input.iter().take_while(|&&c| is_css_whitespace(c)).count())
        }
        ';' | '}' => Junk::Trivia(1),
        '/' => match input.get(1) {
            Some('*') => Junk::CommentOpen,
            Some(_) => Junk::Statement,
            None if at_end => Junk::Statement,
            None => Junk::Incomplete,
        },
        '<' => marker(input, &['<', '!', '-', '-'], at_end),
        '-' => marker(input, &['-', '-', '>'], at_end),
        _ => Junk::Statement,
    }
}

/// `<!--` and `-->` are skipped between statements.
fn marker(input: &[char], marker: &[char], at_end: bool) -> Junk {
    let avail = input.len().min(marker.len());
    if input[..avail] != marker[..avail] {
        Junk::Statement
    } else if avail == marker.len() {
        Junk::Trivia(marker.len())
    } else if at_end {
        Junk::Statement
    } else {
        Junk::Incomplete
    }
}
