//! Recursive descent over one complete range of the window.
//!
//! The driver only hands the grammar ranges whose end is known (a prelude up
//! to its `{`, a single declaration up to its `;`), so nothing here waits for
//! input. Every character of the range is recorded as a run; fragments for
//! names, classes and values are delimited with `head` / `fragment_from`.

use html::{Fragment, RunKind, RunType, TagId};
use tools::chars::{is_ascii_digit, is_css_name_char, is_css_name_start, is_css_whitespace};

use crate::escape::{decode_escape, line_continuation, starts_escape};
use crate::functions::FunctionPolicy;
use crate::properties::PropertyId;
use crate::token::{ClassType, Combinator, CssToken, PropertyEntry, SelectorEntry};

/// Nesting limit for function calls inside a value.
const MAX_FUNCTION_DEPTH: usize = 16;
/// Longest name worth resolving; anything longer is unknown.
const MAX_LOOKUP: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stop {
    /// The run arena is full.
    Full,
    /// The construct does not parse.
    Invalid,
}

type Parse<T> = Result<T, Stop>;

pub(crate) struct Grammar<'a> {
    src: &'a [char],
    pos: usize,
    token: &'a mut CssToken,
    functions: &'a FunctionPolicy,
    scratch: &'a mut String,
    max_selectors: usize,
    overflow: bool,
    disallowed: bool,
}

impl<'a> Grammar<'a> {
    pub fn new(
        src: &'a [char],
        token: &'a mut CssToken,
        functions: &'a FunctionPolicy,
        scratch: &'a mut String,
        max_selectors: usize,
    ) -> Self {
        Self {
            src,
            pos: 0,
            token,
            functions,
            scratch,
            max_selectors,
            overflow: false,
            disallowed: false,
        }
    }

    // ---- statements ---------------------------------------------------------

    /// `@keyword`, already measured by the driver.
    pub fn at_keyword(&mut self, len: usize) -> Parse<()> {
        self.record(RunKind::AtRule, RunType::Normal, len)
    }

    /// A comma-separated selector group filling the whole range.
    pub fn selectors(&mut self) -> Parse<()> {
        self.trivia()?;
        let mut combinator = Combinator::None;
        loop {
            self.compound(combinator)?;
            let spaced = self.trivia()?;
            let explicit = match self.peek() {
                None => return Ok(()),
                Some('>') => Some(Combinator::Child),
                Some('+') => Some(Combinator::Adjacent),
                Some(',') => Some(Combinator::Comma),
                Some(_) => None,
            };
            combinator = match explicit {
                Some(found) => {
                    self.record(RunKind::Combinator, RunType::Normal, 1)?;
                    self.trivia()?;
                    found
                }
                None if spaced => Combinator::Descendant,
                None => return Err(Stop::Invalid),
            };
        }
    }

    /// `@page` prelude: nothing, or one `:name` pseudo-class.
    pub fn page_prelude(&mut self) -> Parse<()> {
        self.trivia()?;
        if self.peek() == Some(':') {
            self.record(RunKind::Colon, RunType::Normal, 1)?;
            let head = self.token.runs.head();
            if !self.ident(RunKind::SelectorClass)? {
                return Err(Stop::Invalid);
            }
            let class = self.token.runs.fragment_from(head);
            self.push_selector(SelectorEntry {
                class,
                class_type: ClassType::Pseudo,
                ..SelectorEntry::default()
            })?;
            self.trivia()?;
        }
        self.expect_end()
    }

    /// A prelude that must hold only whitespace and comments.
    pub fn empty_prelude(&mut self) -> Parse<()> {
        self.trivia()?;
        self.expect_end()
    }

    /// One declaration; an empty range (between two `;`) is accepted.
    pub fn declaration(&mut self) -> Parse<()> {
        self.trivia()?;
        if self.at_end() {
            return Ok(());
        }
        let head = self.token.runs.head();
        if !self.ident(RunKind::PropertyName)? {
            return Err(Stop::Invalid);
        }
        let name = self.token.runs.fragment_from(head);
        let id = if self.overflow {
            PropertyId::Unknown
        } else {
            PropertyId::lookup(self.scratch.as_str())
        };
        self.trivia()?;
        if self.peek() != Some(':') {
            return Err(Stop::Invalid);
        }
        self.record(RunKind::Colon, RunType::Invalid, 1)?;
        self.disallowed = false;
        let (value, important) = self.value()?;
        self.token.properties.push(PropertyEntry {
            name,
            value,
            id,
            important,
            deleted: self.disallowed,
        });
        Ok(())
    }

    // ---- selectors ----------------------------------------------------------

    fn compound(&mut self, combinator: Combinator) -> Parse<()> {
        let mut entry = SelectorEntry {
            combinator,
            ..SelectorEntry::default()
        };
        let mut parts = 0;
        if self.peek() == Some('*') {
            let head = self.token.runs.head();
            self.record(RunKind::Selector, RunType::Normal, 1)?;
            entry.name = self.token.runs.fragment_from(head);
            parts += 1;
        } else if self.starts_ident() {
            let head = self.token.runs.head();
            self.ident(RunKind::Selector)?;
            entry.name = self.token.runs.fragment_from(head);
            entry.name_id = if self.overflow {
                TagId::Unknown
            } else {
                TagId::lookup(self.scratch.as_str())
            };
            parts += 1;
        }
        loop {
            let class_type = match self.peek() {
                Some('.') => ClassType::Regular,
                Some('#') => ClassType::Hash,
                Some(':') => ClassType::Pseudo,
                Some('[') => ClassType::Attrib,
                _ => break,
            };
            if entry.class_type != ClassType::None {
                self.push_selector(entry)?;
                entry = SelectorEntry::default();
            }
            entry.class_type = class_type;
            match class_type {
                ClassType::Pseudo => self.pseudo_class(&mut entry)?,
                ClassType::Attrib => self.attribute_selector(&mut entry)?,
                _ => {
                    self.record(RunKind::Delimiter, RunType::Normal, 1)?;
                    let head = self.token.runs.head();
                    if !self.ident(RunKind::SelectorClass)? {
                        return Err(Stop::Invalid);
                    }
                    entry.class = self.token.runs.fragment_from(head);
                }
            }
            parts += 1;
        }
        if parts == 0 {
            return Err(Stop::Invalid);
        }
        self.push_selector(entry)
    }

    fn pseudo_class(&mut self, entry: &mut SelectorEntry) -> Parse<()> {
        self.record(RunKind::Colon, RunType::Normal, 1)?;
        let head = self.token.runs.head();
        if self.peek() == Some(':') {
            self.record(RunKind::SelectorClass, RunType::Normal, 1)?;
        }
        if !self.ident(RunKind::SelectorClass)? {
            return Err(Stop::Invalid);
        }
        if self.peek() == Some('(') {
            let allowed =
                !self.overflow && self.functions.allows_pseudo_class(self.scratch.as_str());
            self.record(RunKind::Function, RunType::Normal, 1)?;
            self.pseudo_arguments()?;
            if !allowed {
                entry.deleted = true;
            }
        }
        entry.class = self.token.runs.fragment_from(head);
        Ok(())
    }

    fn pseudo_arguments(&mut self) -> Parse<()> {
        loop {
            self.trivia()?;
            match self.peek() {
                None => return Err(Stop::Invalid),
                Some(')') => return self.record(RunKind::Function, RunType::Normal, 1),
                Some('"' | '\'') => self.string(RunKind::String)?,
                Some(ch) => {
                    if self.ident(RunKind::SelectorClass)? {
                        continue;
                    }
                    let len = self.number_len();
                    if len > 0 {
                        self.record(RunKind::Value, RunType::Normal, len)?;
                    } else if matches!(
                        ch,
                        '+' | '-' | ',' | '.' | '#' | ':' | '[' | ']' | '*' | '>' | '~' | '='
                    ) {
                        self.record(RunKind::Delimiter, RunType::Normal, 1)?;
                    } else {
                        return Err(Stop::Invalid);
                    }
                }
            }
        }
    }

    /// `[name]` or `[name op value]`; the class covers the bracket contents.
    fn attribute_selector(&mut self, entry: &mut SelectorEntry) -> Parse<()> {
        self.record(RunKind::Delimiter, RunType::Normal, 1)?;
        let head = self.token.runs.head();
        self.trivia()?;
        if !self.ident(RunKind::SelectorClass)? {
            return Err(Stop::Invalid);
        }
        self.trivia()?;
        let op = match self.rest() {
            ['=', ..] => 1,
            ['~' | '|' | '^' | '$' | '*', '=', ..] => 2,
            _ => 0,
        };
        if op > 0 {
            self.record(RunKind::Delimiter, RunType::Normal, op)?;
            self.trivia()?;
            match self.peek() {
                Some('"' | '\'') => self.string(RunKind::String)?,
                _ => {
                    if !self.ident(RunKind::SelectorClass)? {
                        return Err(Stop::Invalid);
                    }
                }
            }
            self.trivia()?;
        }
        entry.class = self.token.runs.fragment_from(head);
        if self.peek() != Some(']') {
            return Err(Stop::Invalid);
        }
        self.record(RunKind::Delimiter, RunType::Normal, 1)
    }

    fn push_selector(&mut self, entry: SelectorEntry) -> Parse<()> {
        if self.token.selectors.len() >= self.max_selectors {
            return Err(Stop::Invalid);
        }
        self.token.selectors.push(entry);
        Ok(())
    }

    // ---- values -------------------------------------------------------------

    /// The value after `:`; the fragment stops before trailing whitespace
    /// and `!important`.
    fn value(&mut self) -> Parse<(Fragment, bool)> {
        self.trivia()?;
        let head = self.token.runs.head();
        let mut value = self.token.runs.fragment_from(head);
        let mut terms = 0;
        let mut important = false;
        while let Some(ch) = self.peek() {
            if ch == '!' {
                self.important()?;
                important = true;
                break;
            }
            self.term(0)?;
            terms += 1;
            value = self.token.runs.fragment_from(head);
            self.trivia()?;
        }
        if terms == 0 {
            return Err(Stop::Invalid);
        }
        Ok((value, important))
    }

    fn important(&mut self) -> Parse<()> {
        self.record(RunKind::Important, RunType::Normal, 1)?;
        self.trivia()?;
        if !self.ident(RunKind::Important)? || self.scratch.as_str() != "important" {
            return Err(Stop::Invalid);
        }
        self.trivia()?;
        self.expect_end()
    }

    fn term(&mut self, depth: usize) -> Parse<()> {
        let Some(ch) = self.peek() else {
            return Err(Stop::Invalid);
        };
        match ch {
            '"' | '\'' => self.string(RunKind::String),
            '#' => self.hash(),
            ',' | '/' => self.record(RunKind::Delimiter, RunType::Normal, 1),
            _ => {
                let range = self.unicode_range_len();
                if range > 0 {
                    return self.record(RunKind::Value, RunType::Normal, range);
                }
                if self.starts_url() {
                    return self.url();
                }
                let number = self.number_len();
                if number > 0 {
                    return self.number(number);
                }
                if !self.starts_ident() {
                    return Err(Stop::Invalid);
                }
                if self.src.get(self.ident_end()) == Some(&'(') {
                    self.ident(RunKind::Function)?;
                    return self.function(depth);
                }
                self.ident(RunKind::Value)?;
                Ok(())
            }
        }
    }

    fn hash(&mut self) -> Parse<()> {
        self.record(RunKind::Value, RunType::Normal, 1)?;
        if !self.name_chars(RunKind::Value)? {
            return Err(Stop::Invalid);
        }
        Ok(())
    }

    fn number(&mut self, len: usize) -> Parse<()> {
        self.record(RunKind::Value, RunType::Normal, len)?;
        if self.peek() == Some('%') {
            self.record(RunKind::Value, RunType::Normal, 1)?;
        } else if self.starts_ident() {
            self.ident(RunKind::Value)?;
        }
        Ok(())
    }

    /// Arguments of a call whose name was just recorded; `scratch` holds it.
    fn function(&mut self, depth: usize) -> Parse<()> {
        if depth >= MAX_FUNCTION_DEPTH {
            return Err(Stop::Invalid);
        }
        if self.overflow || !self.functions.allows_term(self.scratch.as_str()) {
            self.disallowed = true;
        }
        self.record(RunKind::Function, RunType::Normal, 1)?;
        loop {
            self.trivia()?;
            match self.peek() {
                None => return Err(Stop::Invalid),
                Some(')') => return self.record(RunKind::Function, RunType::Normal, 1),
                Some(_) => self.term(depth + 1)?,
            }
        }
    }

    fn starts_url(&self) -> bool {
        matches!(
            self.rest(),
            [u, r, l, '(', ..]
                if u.eq_ignore_ascii_case(&'u')
                    && r.eq_ignore_ascii_case(&'r')
                    && l.eq_ignore_ascii_case(&'l')
        )
    }

    /// `url(...)`, quoted or not; the target is recorded as `Url` runs.
    fn url(&mut self) -> Parse<()> {
        self.record(RunKind::Function, RunType::Normal, 4)?;
        self.whitespace()?;
        match self.peek() {
            Some('"' | '\'') => self.string(RunKind::Url)?,
            _ => self.unquoted_url()?,
        }
        self.whitespace()?;
        if self.peek() != Some(')') {
            return Err(Stop::Invalid);
        }
        self.record(RunKind::Function, RunType::Normal, 1)
    }

    fn unquoted_url(&mut self) -> Parse<()> {
        loop {
            let Some(ch) = self.peek() else {
                return Err(Stop::Invalid);
            };
            match ch {
                ')' => return Ok(()),
                c if is_css_whitespace(c) => return Ok(()),
                '"' | '\'' | '(' => return Err(Stop::Invalid),
                c if c.is_control() => return Err(Stop::Invalid),
                '\\' => match decode_escape(self.rest()) {
                    Some((len, decoded)) => {
                        self.record(RunKind::Url, RunType::Literal(decoded), len)?
                    }
                    None => return Err(Stop::Invalid),
                },
                _ => {
                    let len = self.span(|c| {
                        !is_css_whitespace(c)
                            && !c.is_control()
                            && !matches!(c, ')' | '"' | '\'' | '(' | '\\')
                    });
                    self.record(RunKind::Url, RunType::Normal, len)?;
                }
            }
        }
    }

    /// `U+0-7F`, `u+4??` and the like.
    fn unicode_range_len(&self) -> usize {
        let rest = self.rest();
        if !matches!(rest, ['u' | 'U', '+', ..]) {
            return 0;
        }
        let first = rest[2..]
            .iter()
            .take(6)
            .take_while(|&&c| c.is_ascii_hexdigit() || c == '?')
            .count();
        if first == 0 {
            return 0;
        }
        let mut len = 2 + first;
        if rest.get(len) == Some(&'-') {
            let second = rest[len + 1..]
                .iter()
                .take(6)
                .take_while(|c| c.is_ascii_hexdigit())
                .count();
            if second > 0 {
                len += 1 + second;
            }
        }
        len
    }

    /// A quoted string; the contents are recorded as `content` runs.
    fn string(&mut self, content: RunKind) -> Parse<()> {
        let Some(quote) = self.peek() else {
            return Err(Stop::Invalid);
        };
        self.record(RunKind::Quote, RunType::Normal, 1)?;
        loop {
            let Some(ch) = self.peek() else {
                return Err(Stop::Invalid);
            };
            match ch {
                c if c == quote => return self.record(RunKind::Quote, RunType::Normal, 1),
                '\n' | '\r' | '\x0C' => return Err(Stop::Invalid),
                '\\' => {
                    if let Some(len) = line_continuation(self.rest()) {
                        self.record(content, RunType::Invalid, len)?;
                    } else if let Some((len, decoded)) = decode_escape(self.rest()) {
                        self.record(content, RunType::Literal(decoded), len)?;
                    } else {
                        return Err(Stop::Invalid);
                    }
                }
                _ => {
                    let len = self.span(|c| c != quote && !matches!(c, '\\' | '\n' | '\r' | '\x0C'));
                    self.record(content, RunType::Normal, len)?;
                }
            }
        }
    }

    // ---- lexical ------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn rest(&self) -> &'a [char] {
        let src = self.src;
        &src[self.pos.min(src.len())..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn expect_end(&self) -> Parse<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(Stop::Invalid)
        }
    }

    fn span(&self, keep: impl Fn(char) -> bool) -> usize {
        self.rest().iter().take_while(|&&c| keep(c)).count()
    }

    fn record(&mut self, kind: RunKind, ty: RunType, len: usize) -> Parse<()> {
        if !self.token.runs.reserve(kind, ty) {
            return Err(Stop::Full);
        }
        self.token.runs.add(kind, ty, len);
        self.pos += len;
        Ok(())
    }

    fn whitespace(&mut self) -> Parse<()> {
        let len = self.span(is_css_whitespace);
        if len > 0 {
            self.record(RunKind::Whitespace, RunType::Normal, len)?;
        }
        Ok(())
    }

    /// Whitespace and comments; reports whether anything was skipped.
    fn trivia(&mut self) -> Parse<bool> {
        let start = self.pos;
        loop {
            let len = self.span(is_css_whitespace);
            if len > 0 {
                self.record(RunKind::Whitespace, RunType::Normal, len)?;
                continue;
            }
            let rest = self.rest();
            if let ['/', '*', body @ ..] = rest {
                let len = body
                    .windows(2)
                    .position(|pair| pair[0] == '*' && pair[1] == '/')
                    .map_or(rest.len(), |idx| idx + 4);
                self.record(RunKind::Comment, RunType::Invalid, len)?;
                continue;
            }
            return Ok(self.pos > start);
        }
    }

    fn starts_ident(&self) -> bool {
        let rest = self.rest();
        match rest {
            ['-', '-', ..] => true,
            ['-', next, ..] => is_css_name_start(*next) || starts_escape(&rest[1..]),
            ['\\', ..] => starts_escape(rest),
            [first, ..] => is_css_name_start(*first),
            [] => false,
        }
    }

    /// Offset just past the identifier at the cursor, without recording it.
    fn ident_end(&self) -> usize {
        let mut at = self.pos;
        while let Some(&ch) = self.src.get(at) {
            if is_css_name_char(ch) {
                at += 1;
            } else if ch == '\\' {
                match decode_escape(&self.src[at..]) {
                    Some((len, _)) => at += len,
                    None => break,
                }
            } else {
                break;
            }
        }
        at
    }

    /// Record an identifier as `kind` runs and leave its lowercased decoded
    /// text in `scratch`. Returns `false` (recording nothing) when no
    /// identifier starts at the cursor.
    fn ident(&mut self, kind: RunKind) -> Parse<bool> {
        if !self.starts_ident() {
            return Ok(false);
        }
        self.name_chars(kind)
    }

    fn name_chars(&mut self, kind: RunKind) -> Parse<bool> {
        self.scratch.clear();
        self.overflow = false;
        let start = self.pos;
        loop {
            let len = self.span(is_css_name_char);
            if len > 0 {
                let src = self.src;
                let from = self.pos;
                self.record(kind, RunType::Normal, len)?;
                for &ch in &src[from..from + len] {
                    self.push_scratch(ch);
                }
                continue;
            }
            if self.peek() == Some('\\') {
                if let Some((len, decoded)) = decode_escape(self.rest()) {
                    self.record(kind, RunType::Literal(decoded), len)?;
                    self.push_scratch(decoded);
                    continue;
                }
            }
            return Ok(self.pos > start);
        }
    }

    fn push_scratch(&mut self, ch: char) {
        if self.scratch.len() >= MAX_LOOKUP {
            self.overflow = true;
            return;
        }
        self.scratch.push(ch.to_ascii_lowercase());
    }

    /// Length of a number at the cursor, or zero.
    fn number_len(&self) -> usize {
        let rest = self.rest();
        let digits = |from: usize| {
            rest.get(from..)
                .map_or(0, |s| s.iter().take_while(|&&c| is_ascii_digit(c)).count())
        };
        let mut len = usize::from(matches!(rest.first(), Some('+' | '-')));
        let int = digits(len);
        len += int;
        let mut frac = 0;
        if rest.get(len) == Some(&'.') {
            frac = digits(len + 1);
            if frac > 0 {
                len += 1 + frac;
            }
        }
        if int == 0 && frac == 0 {
            0
        } else {
            len
        }
    }
}
