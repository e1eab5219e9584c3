//! Markup re-emission.
//!
//! [`HtmlRewriter`] drives the markup tokenizer over its own window and
//! writes a cleaned copy of the document: tags the policy keeps are rebuilt
//! from their name id and allowed attributes, text is re-encoded, comments
//! and declarations are dropped, and `<style>` content goes through the style
//! rewriter. Output only ever contains markup the rewriter wrote itself.
//!
//! Input is pushed with [`HtmlRewriter::feed`] in chunks of any size and
//! closed with [`HtmlRewriter::finish`]; the output does not depend on how
//! the input was chunked.

mod tag;

#[cfg(test)]
mod tests;

use encoder::html_encode;
use html::{
    AttributeId, ConfigError, HtmlTokenKind, HtmlTokenizer, ScanBuffer, ScanError, ScanResult,
    TagId, TextMode,
};
use log::{debug, trace, warn};

use crate::config::SanitizerConfig;
use crate::policy::{AttributeAction, Policy, TagAction};
use crate::style::StyleRewriter;
use tag::PendingTag;

/// Content of a dropped element being skipped up to its end tag.
#[derive(Clone, Copy, Debug)]
struct Skip {
    tag: TagId,
    depth: usize,
}

pub struct HtmlRewriter {
    config: SanitizerConfig,
    policy: Policy,
    tokenizer: HtmlTokenizer,
    buffer: ScanBuffer,
    style: StyleRewriter,
    tag: PendingTag,
    stack: Vec<TagId>,
    skip: Option<Skip>,
    in_style: bool,
}

impl HtmlRewriter {
    pub fn new(policy: Policy, config: SanitizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let tokenizer = HtmlTokenizer::new(config.tokenizer.clone())?;
        let style = StyleRewriter::new(&policy, &config)?;
        let buffer = ScanBuffer::new(config.window_size);
        Ok(Self {
            config,
            policy,
            tokenizer,
            buffer,
            style,
            tag: PendingTag::default(),
            stack: Vec::new(),
            skip: None,
            in_style: false,
        })
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Rewrite the next chunk of input, appending whatever is complete.
    pub fn feed(&mut self, input: &str, out: &mut String) -> Result<(), ScanError> {
        self.pump(input, false, out)
    }

    /// End of input: flush the tokenizer, close open elements and get ready
    /// for the next document.
    pub fn finish(&mut self, out: &mut String) -> Result<(), ScanError> {
        let result = self.pump("", true, out);
        self.close_all(out);
        self.reset();
        result
    }

    /// Close whatever is open after a failed scan and get ready for the next
    /// document.
    pub fn abandon(&mut self, out: &mut String) {
        warn!(
            target: "sanitizer.rewriter",
            "abandoning document with {} open elements",
            self.stack.len()
        );
        self.close_all(out);
        self.reset();
    }

    pub fn reset(&mut self) {
        self.tokenizer.reset();
        self.buffer.reset();
        self.tag.clear();
        self.stack.clear();
        self.skip = None;
        self.in_style = false;
    }

    fn pump(&mut self, mut input: &str, finishing: bool, out: &mut String) -> Result<(), ScanError> {
        loop {
            match self.tokenizer.next_token(&mut self.buffer)? {
                ScanResult::Token => self.emit(out),
                ScanResult::NeedMoreInput => {
                    if !input.is_empty() {
                        let taken = self.buffer.fill(input);
                        debug_assert!(taken > 0, "tokenizer asked for input with a full window");
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

    fn emit(&mut self, out: &mut String) {
        let token = self.tokenizer.token();
        match token.kind() {
            HtmlTokenKind::Text => {
                if self.skip.is_some() {
                    return;
                }
                let text = token.text(token.content(), &self.buffer);
                if self.in_style {
                    self.style.write_sheet(&self.policy, &text, out);
                } else {
                    push_text(&text, out);
                }
            }
            HtmlTokenKind::Tag => {
                self.tag
                    .absorb(token, &self.buffer, self.config.max_attribute_value);
                if token.phase().ends_here() {
                    self.end_of_tag(out);
                }
            }
            HtmlTokenKind::Comment | HtmlTokenKind::Declaration => {
                if token.phase().starts_here() {
                    trace!(target: "sanitizer.rewriter", "dropped {:?}", token.kind());
                }
            }
            HtmlTokenKind::None | HtmlTokenKind::EndOfFile => {}
        }
    }

    fn action(&self, id: TagId) -> TagAction {
        if self.config.fragment_mode
            && matches!(id, TagId::Title | TagId::Meta | TagId::Link | TagId::Base)
        {
            return TagAction::DropWithContent;
        }
        self.policy.tag(id)
    }

    fn end_of_tag(&mut self, out: &mut String) {
        let id = self.tag.id();
        let end_tag = self.tag.end_tag;
        let opens_scope = !end_tag && !id.is_void() && !self.closes_itself(id);
        if self.tag.dropped() > 0 {
            debug!(
                target: "sanitizer.rewriter",
                "<{}>: {} attributes over the limit dropped",
                id.name(),
                self.tag.dropped()
            );
        }

        if let Some(skip) = self.skip.as_mut() {
            if id == skip.tag {
                if end_tag {
                    skip.depth -= 1;
                } else if opens_scope {
                    skip.depth += 1;
                }
                if skip.depth == 0 {
                    trace!(target: "sanitizer.rewriter", "end of dropped <{}>", id.name());
                    self.skip = None;
                }
            }
            return;
        }

        if self.config.fragment_mode && matches!(id, TagId::Html | TagId::Head | TagId::Body) {
            return;
        }

        match self.action(id) {
            TagAction::DropWithContent => {
                if opens_scope {
                    debug!(target: "sanitizer.rewriter", "dropping <{}> with content", id.name());
                    self.skip = Some(Skip { tag: id, depth: 1 });
                }
            }
            TagAction::Drop => {
                if self.config.filter_disallowed_tags {
                    trace!(target: "sanitizer.rewriter", "dropped <{}>", self.tag.name);
                } else {
                    self.write_as_text(out);
                }
            }
            TagAction::Keep | TagAction::CheckContent if end_tag => self.close(id, out),
            TagAction::Keep | TagAction::CheckContent => self.open(id, out),
        }
    }

    /// `<br/>`-style syntax. The tokenizer still reads the content of a
    /// raw-text or RCDATA element written that way, so those stay open.
    fn closes_itself(&self, id: TagId) -> bool {
        self.tag.empty_scope && id.text_mode() == TextMode::Normal
    }

    fn open(&mut self, id: TagId, out: &mut String) {
        let scoped = !id.is_void() && !self.closes_itself(id);
        if scoped && self.stack.len() >= self.config.max_open_elements {
            debug!(
                target: "sanitizer.rewriter",
                "<{}> dropped: {} elements already open",
                id.name(),
                self.stack.len()
            );
            return;
        }
        out.push('<');
        out.push_str(id.name());
        self.write_attributes(out);
        out.push('>');
        if id.is_void() {
            return;
        }
        if !scoped {
            push_end_tag(id, out);
            return;
        }
        self.stack.push(id);
        if id == TagId::Style && self.action(id) == TagAction::CheckContent {
            self.in_style = true;
            self.style.begin_sheet();
        }
    }

    fn close(&mut self, id: TagId, out: &mut String) {
        if id.is_void() {
            return;
        }
        if self.in_style && id == TagId::Style {
            self.style.finish_sheet(&self.policy, out);
            self.in_style = false;
        }
        let Some(depth) = self.stack.iter().rposition(|&open| open == id) else {
            trace!(target: "sanitizer.rewriter", "stray </{}> dropped", id.name());
            return;
        };
        if self.config.normalize_markup {
            while self.stack.len() > depth {
                if let Some(open) = self.stack.pop() {
                    push_end_tag(open, out);
                }
            }
        } else {
            self.stack.remove(depth);
            push_end_tag(id, out);
        }
    }

    fn close_all(&mut self, out: &mut String) {
        if self.in_style {
            self.style.finish_sheet(&self.policy, out);
            self.in_style = false;
        }
        if !self.config.normalize_markup {
            self.stack.clear();
            return;
        }
        while let Some(open) = self.stack.pop() {
            push_end_tag(open, out);
        }
    }

    fn write_attributes(&mut self, out: &mut String) {
        let mut written: Vec<AttributeId> = Vec::with_capacity(self.tag.attributes.len());
        for index in 0..self.tag.attributes.len() {
            let attr = &self.tag.attributes[index];
            let id = attr.id();
            if !id.is_known() || written.contains(&id) {
                continue;
            }
            if attr.overflow {
                debug!(target: "sanitizer.rewriter", "{} value over the limit dropped", id.name());
                continue;
            }
            let value = match self.policy.attribute(id) {
                AttributeAction::Drop => {
                    trace!(target: "sanitizer.rewriter", "dropped attribute {}", attr.name);
                    continue;
                }
                AttributeAction::Keep => attr.value.clone(),
                AttributeAction::CheckContent if id == AttributeId::Style => {
                    let value = attr.value.clone();
                    match self.style.declarations(&self.policy, &value) {
                        Ok(css) if !css.is_empty() => css,
                        Ok(_) => continue,
                        Err(err) => {
                            debug!(target: "sanitizer.rewriter", "style attribute dropped: {err}");
                            continue;
                        }
                    }
                }
                AttributeAction::CheckContent => {
                    if !self.policy.allows_url(&attr.value) {
                        debug!(target: "sanitizer.rewriter", "{} url refused", id.name());
                        continue;
                    }
                    attr.value.clone()
                }
            };
            written.push(id);
            out.push(' ');
            out.push_str(id.name());
            if self.tag.attributes[index].has_value {
                out.push_str("=\"");
                out.push_str(&html_encode(&value));
                out.push('"');
            }
        }
    }

    /// A refused tag written back as visible text.
    fn write_as_text(&self, out: &mut String) {
        let mut source = String::from("<");
        if self.tag.end_tag {
            source.push('/');
        }
        source.push_str(&self.tag.name);
        for attr in &self.tag.attributes {
            source.push(' ');
            source.push_str(&attr.name);
            if attr.has_value {
                source.push_str("=\"");
                source.push_str(&attr.value);
                source.push('"');
            }
        }
        if self.tag.empty_scope {
            source.push('/');
        }
        source.push('>');
        out.push_str(&html_encode(&source));
    }
}

fn push_end_tag(id: TagId, out: &mut String) {
    out.push_str("</");
    out.push_str(id.name());
    out.push('>');
}

/// Encode text, keeping line breaks and tabs as they are.
fn push_text(text: &str, out: &mut String) {
    let mut rest = text;
    while let Some(at) = rest.find(['\n', '\r', '\t']) {
        out.push_str(&html_encode(&rest[..at]));
        out.push_str(&rest[at..at + 1]);
        rest = &rest[at + 1..];
    }
    out.push_str(&html_encode(rest));
}
