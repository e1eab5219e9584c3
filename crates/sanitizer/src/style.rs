//! Style re-emission.
//!
//! Style sheets and `style` attribute values are parsed by the streaming
//! style parser and written back from the parsed entries only: selectors,
//! property names and values are re-serialized run by run, so nothing the
//! parser did not recognize reaches the output. Declarations the policy
//! refuses are marked deleted on the token before it is written.

use css::{
    AtRuleKind, ClassType, Combinator, CssMode, CssParser, CssToken, CssTokenKind, PropertyEntry,
};
use html::{Fragment, RunKind, RunType, ScanBuffer, ScanError, ScanResult};
use log::{debug, trace};

use crate::config::SanitizerConfig;
use crate::policy::{Policy, PropertyAction};

pub(crate) struct StyleRewriter {
    parser: CssParser,
    buffer: ScanBuffer,
    /// `{` of a rule has been written and its `}` has not.
    rule_open: bool,
    /// The rule being read was refused; its remaining pieces are dropped.
    skipping_rule: bool,
    /// The sheet hit a scan error; the rest of it is dropped.
    failed: bool,
}

impl StyleRewriter {
    pub(crate) fn new(policy: &Policy, config: &SanitizerConfig) -> Result<Self, html::ConfigError> {
        let parser = CssParser::new(
            config.css.clone(),
            CssMode::StyleTag,
            policy.functions().clone(),
        )?;
        Ok(Self {
            parser,
            buffer: ScanBuffer::new(config.window_size),
            rule_open: false,
            skipping_rule: false,
            failed: false,
        })
    }

    /// Sanitize the body of a `style` attribute; the result is plain CSS,
    /// not yet escaped for the attribute.
    pub(crate) fn declarations(&mut self, policy: &Policy, value: &str) -> Result<String, ScanError> {
        self.restart(CssMode::Declarations);
        let mut out = String::with_capacity(value.len());
        self.pump(policy, value, true, &mut out)?;
        Ok(out)
    }

    pub(crate) fn begin_sheet(&mut self) {
        self.restart(CssMode::StyleTag);
    }

    /// Feed the next piece of `<style>` content.
    pub(crate) fn write_sheet(&mut self, policy: &Policy, text: &str, out: &mut String) {
        if self.failed {
            return;
        }
        if let Err(err) = self.pump(policy, text, false, out) {
            self.fail(err, out);
        }
    }

    /// End of the `<style>` content: flush the parser and close any open rule.
    pub(crate) fn finish_sheet(&mut self, policy: &Policy, out: &mut String) {
        if !self.failed {
            if let Err(err) = self.pump(policy, "", true, out) {
                self.fail(err, out);
            }
        }
        self.close_rule(out);
        self.restart(CssMode::StyleTag);
    }

    fn fail(&mut self, err: ScanError, out: &mut String) {
        debug!(target: "sanitizer.rewriter", "dropping rest of style sheet: {err}");
        self.failed = true;
        self.close_rule(out);
    }

    fn restart(&mut self, mode: CssMode) {
        self.parser.reset(mode);
        self.buffer.reset();
        self.rule_open = false;
        self.skipping_rule = false;
        self.failed = false;
    }

    fn close_rule(&mut self, out: &mut String) {
        if self.rule_open {
            out.push('}');
            self.rule_open = false;
        }
        self.skipping_rule = false;
    }

    fn pump(
        &mut self,
        policy: &Policy,
        mut input: &str,
        finishing: bool,
        out: &mut String,
    ) -> Result<(), ScanError> {
        loop {
            match self.parser.next_token(&mut self.buffer)? {
                ScanResult::Token => self.emit(policy, out),
                ScanResult::NeedMoreInput => {
                    if !input.is_empty() {
                        let taken = self.buffer.fill(input);
                        debug_assert!(taken > 0, "style parser asked for input with a full window");
                        input = &input[taken..];
                    } else if finishing && !self.buffer.is_end_of_stream() {
                        self.buffer.set_end_of_stream();
                    } else {
                        return Ok(());
                    }
                }
                ScanResult::Finished => return Ok(()),
            }
        }
    }

    fn emit(&mut self, policy: &Policy, out: &mut String) {
        let kind = self.parser.token().kind();
        match kind {
            CssTokenKind::RuleSet | CssTokenKind::AtRule => self.emit_rule(policy, out),
            CssTokenKind::Declarations => {
                self.filter_properties(policy);
                write_properties(self.parser.token(), &self.buffer, out);
            }
            CssTokenKind::Skipped => {
                if self.parser.token().is_invalid() {
                    debug!(target: "sanitizer.rewriter", "dropped invalid style statement");
                }
            }
            CssTokenKind::None | CssTokenKind::EndOfFile => {}
        }
    }

    fn emit_rule(&mut self, policy: &Policy, out: &mut String) {
        let phase = self.parser.token().phase();
        if phase.starts_here() {
            self.close_rule(out);
            let mut head = String::new();
            if self.write_prelude(&mut head) {
                out.push_str(&head);
                out.push('{');
                self.rule_open = true;
            } else {
                trace!(target: "sanitizer.rewriter", "rule refused: no selector survived");
                self.skipping_rule = true;
            }
        }
        if !self.skipping_rule {
            self.filter_properties(policy);
            write_properties(self.parser.token(), &self.buffer, out);
        }
        if phase.ends_here() {
            self.close_rule(out);
        }
    }

    /// Write the selector group or at-rule keyword. Returns `false` when
    /// nothing is left to attach the declarations to.
    fn write_prelude(&mut self, out: &mut String) -> bool {
        match self.parser.token().at_rule() {
            AtRuleKind::FontFace => {
                out.push_str("@font-face");
                return true;
            }
            AtRuleKind::Page => {
                out.push_str("@page");
                let token = self.parser.token();
                if let Some(entry) = token.selectors().first() {
                    out.push_str(" :");
                    write_runs(token, entry.class, &self.buffer, out);
                }
                return true;
            }
            AtRuleKind::None => {}
        }

        // A comma group with a refused part is dropped as a whole.
        let groups = comma_groups(
            self.parser
                .token()
                .selectors()
                .iter()
                .map(|entry| (entry.combinator, entry.deleted)),
        );
        for (start, end, keep) in &groups {
            if !keep {
                for index in *start..*end {
                    self.parser.token_mut().delete_selector(index);
                }
            }
        }
        let token = self.parser.token();
        let mut first = true;
        for (start, end, keep) in groups {
            if !keep {
                continue;
            }
            if !first {
                out.push(',');
            }
            first = false;
            for (offset, entry) in token.selectors()[start..end].iter().enumerate() {
                if offset > 0 {
                    out.push_str(entry.combinator.as_str());
                }
                write_runs(token, entry.name, &self.buffer, out);
                let prefix = match entry.class_type {
                    ClassType::None => None,
                    ClassType::Regular => Some('.'),
                    ClassType::Hash => Some('#'),
                    ClassType::Pseudo => Some(':'),
                    ClassType::Attrib => Some('['),
                };
                if let Some(prefix) = prefix {
                    out.push(prefix);
                    write_runs(token, entry.class, &self.buffer, out);
                    if entry.class_type == ClassType::Attrib {
                        out.push(']');
                    }
                }
            }
        }
        !first
    }

    /// Mark every declaration of the current piece the policy refuses.
    fn filter_properties(&mut self, policy: &Policy) {
        let refused: Vec<usize> = {
            let token = self.parser.token();
            token
                .properties()
                .iter()
                .enumerate()
                .filter(|(_, prop)| !property_allowed(policy, token, prop, &self.buffer))
                .map(|(index, _)| index)
                .collect()
        };
        for index in refused {
            trace!(target: "sanitizer.rewriter", "declaration {index} refused");
            self.parser.token_mut().delete_property(index);
        }
    }
}

/// Split selector entries into comma groups: `(start, end, keep)`.
fn comma_groups(entries: impl Iterator<Item = (Combinator, bool)>) -> Vec<(usize, usize, bool)> {
    let mut groups = Vec::new();
    let mut start = 0;
    let mut keep = true;
    let mut len = 0;
    for (index, (combinator, deleted)) in entries.enumerate() {
        if combinator == Combinator::Comma && index > start {
            groups.push((start, index, keep));
            start = index;
            keep = true;
        }
        keep &= !deleted;
        len = index + 1;
    }
    if len > start {
        groups.push((start, len, keep));
    }
    groups
}

fn property_allowed(policy: &Policy, token: &CssToken, prop: &PropertyEntry, buffer: &ScanBuffer) -> bool {
    if prop.deleted || policy.property(prop.id) == PropertyAction::Drop {
        return false;
    }
    let urls = collect_urls(token, prop.value, buffer);
    if urls.is_empty() {
        return true;
    }
    if !prop.id.takes_url() {
        debug!(target: "sanitizer.rewriter", "url in {} refused", prop.id.name());
        return false;
    }
    urls.iter().all(|url| policy.allows_url(url))
}

/// Decoded targets of every `url(...)` in a value.
fn collect_urls(token: &CssToken, value: Fragment, buffer: &ScanBuffer) -> Vec<String> {
    let mut urls = Vec::new();
    let mut current: Option<String> = None;
    for (run, chars) in token.run_slices(value, buffer) {
        if run.kind != RunKind::Url {
            if let Some(url) = current.take() {
                urls.push(url);
            }
            continue;
        }
        let url = current.get_or_insert_with(String::new);
        match run.ty {
            RunType::Normal => url.extend(chars),
            RunType::Literal(ch) => url.push(ch),
            RunType::Invalid => {}
        }
    }
    urls.extend(current);
    urls
}

fn write_properties(token: &CssToken, buffer: &ScanBuffer, out: &mut String) {
    for prop in token.properties().iter().filter(|prop| !prop.deleted) {
        write_runs(token, prop.name, buffer, out);
        out.push(':');
        write_runs(token, prop.value, buffer, out);
        if prop.important {
            out.push_str(" !important");
        }
        out.push(';');
    }
}

/// Characters written as-is inside strings and url targets.
fn plain_in_string(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            ' ' | '-' | '_' | '.' | ',' | '/' | ':' | '#' | '%' | '?' | '=' | '+' | '@' | '~' | '!'
        )
}

/// Characters written as-is in names, numbers and delimiters.
fn plain_in_syntax(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '-' | '_' | '.' | ',' | '/' | '#' | '%' | '+' | '(' | ')' | '*' | '=' | '~' | '|' | '^'
                | '$' | ':' | '?'
        )
}

fn push_escaped(ch: char, out: &mut String) {
    use std::fmt::Write;
    let _ = write!(out, "\\{:x} ", ch as u32);
}

/// Re-serialize `fragment` run by run.
fn write_runs(token: &CssToken, fragment: Fragment, buffer: &ScanBuffer, out: &mut String) {
    for (run, chars) in token.run_slices(fragment, buffer) {
        match run.kind {
            RunKind::Whitespace | RunKind::Comment => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            RunKind::Quote => out.push('\''),
            RunKind::String | RunKind::Url => match run.ty {
                RunType::Normal => {
                    for &ch in chars {
                        if plain_in_string(ch) {
                            out.push(ch);
                        } else {
                            push_escaped(ch, out);
                        }
                    }
                }
                RunType::Literal(ch) if plain_in_string(ch) => out.push(ch),
                RunType::Literal(ch) => push_escaped(ch, out),
                RunType::Invalid => {}
            },
            _ => match run.ty {
                RunType::Normal => {
                    for &ch in chars {
                        if plain_in_syntax(ch) {
                            out.push(ch);
                        } else {
                            push_escaped(ch, out);
                        }
                    }
                }
                RunType::Literal(ch) => push_escaped(ch, out),
                RunType::Invalid => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter(policy: &Policy) -> StyleRewriter {
        StyleRewriter::new(policy, &SanitizerConfig::default()).unwrap()
    }

    fn sheet(input: &str) -> String {
        let policy = Policy::default();
        let mut style = rewriter(&policy);
        let mut out = String::new();
        style.begin_sheet();
        style.write_sheet(&policy, input, &mut out);
        style.finish_sheet(&policy, &mut out);
        out
    }

    fn attr(input: &str) -> String {
        let policy = Policy::default();
        rewriter(&policy).declarations(&policy, input).unwrap()
    }

    #[test]
    fn style_attribute_keeps_only_safe_declarations() {
        assert_eq!(attr("color:red; behavior:url(evil.htc)"), "color:red;");
        assert_eq!(attr("width: expression(alert(1)); color: blue"), "color:blue;");
        assert_eq!(attr("COLOR : red !important"), "COLOR:red !important;");
        assert_eq!(attr("colour: red"), "");
        assert_eq!(attr(""), "");
    }

    #[test]
    fn urls_need_an_allowed_scheme_and_a_url_property() {
        assert_eq!(
            attr("background-image: url(\"http://x.com/a.png\")"),
            "background-image:url('http://x.com/a.png');"
        );
        assert_eq!(attr("background-image: url(javascript:alert(1))"), "");
        assert_eq!(attr("color: url(x.png)"), "");
        assert_eq!(attr("background: url(a.png) no-repeat"), "background:url(a.png) no-repeat;");
    }

    #[test]
    fn strings_are_re_escaped() {
        assert_eq!(attr("font-family: \"a<b\""), "font-family:'a\\3c b';");
        assert_eq!(attr("font-family: 'x\\\"'"), "font-family:'x\\22 ';");
    }

    #[test]
    fn rules_are_rewritten_compactly() {
        assert_eq!(sheet("p { color: red }"), "p{color:red;}");
        assert_eq!(sheet("div > p.a, h1 { margin: 0 }"), "div>p.a,h1{margin:0;}");
        assert_eq!(sheet("a:hover { color: red }"), "a:hover{color:red;}");
        assert_eq!(sheet("@font-face { font-family: x }"), "@font-face{font-family:x;}");
        assert_eq!(sheet("@import url(x.css); p { color: red }"), "p{color:red;}");
    }

    #[test]
    fn refused_selector_groups_drop_only_themselves() {
        assert_eq!(sheet("a:not(b), p { color: red }"), "p{color:red;}");
        assert_eq!(sheet("a:not(b) { color: red } p { color: blue }"), "p{color:blue;}");
        assert_eq!(sheet("p:lang(en) { color: red }"), "p:lang(en){color:red;}");
    }

    #[test]
    fn sheet_fed_in_pieces_matches_whole() {
        let input = "p { color: red } h1 { margin: 0; background: url(a.png) }";
        let policy = Policy::default();
        let mut style = rewriter(&policy);
        let mut out = String::new();
        style.begin_sheet();
        for piece in input.as_bytes().chunks(3) {
            style.write_sheet(&policy, std::str::from_utf8(piece).unwrap(), &mut out);
        }
        style.finish_sheet(&policy, &mut out);
        assert_eq!(out, sheet(input));
    }

    #[test]
    fn property_policy_is_consulted() {
        let mut policy = Policy::default();
        policy.set_property(css::PropertyId::Color, PropertyAction::Drop);
        let mut style = rewriter(&policy);
        assert_eq!(
            style.declarations(&policy, "color: red; margin: 0").unwrap(),
            "margin:0;"
        );
    }
}
