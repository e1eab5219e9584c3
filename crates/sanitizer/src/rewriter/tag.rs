//! A tag assembled from the pieces the tokenizer cut it into.

use html::names::MAX_NAME_LEN;
use html::{AttributeId, FragmentChars, HtmlToken, ScanBuffer, TagId};

/// Attributes kept per tag; later ones are dropped.
pub(crate) const MAX_TAG_ATTRIBUTES: usize = 256;

/// Append name characters up to `MAX_NAME_LEN` bytes. Returns false once the
/// name no longer fits.
fn push_name(name: &mut String, chars: FragmentChars<'_>) -> bool {
    for ch in chars {
        if name.len() + ch.len_utf8() > MAX_NAME_LEN {
            return false;
        }
        name.push(ch);
    }
    true
}

#[derive(Debug, Default)]
pub(crate) struct PendingAttribute {
    /// Source spelling, kept only for writing a refused tag back as text.
    pub(crate) name: String,
    pub(crate) value: String,
    pub(crate) has_value: bool,
    /// The value grew past the configured limit.
    pub(crate) overflow: bool,
    name_overflow: bool,
    id: AttributeId,
}

impl PendingAttribute {
    pub(crate) fn id(&self) -> AttributeId {
        if self.name_overflow {
            AttributeId::Unknown
        } else {
            self.id
        }
    }
}

/// Owned copy of one tag. The tokenizer's pieces only live until the next
/// call, so names and values are copied out as they arrive.
#[derive(Debug, Default)]
pub(crate) struct PendingTag {
    /// Source spelling, at most `MAX_NAME_LEN` bytes of it.
    pub(crate) name: String,
    pub(crate) end_tag: bool,
    pub(crate) empty_scope: bool,
    pub(crate) attributes: Vec<PendingAttribute>,
    name_overflow: bool,
    id: TagId,
    /// Index in `attributes` of the attribute each piece continues, or
    /// `None` when the attribute limit dropped it.
    open: Option<usize>,
    dropped: usize,
}

impl PendingTag {
    pub(crate) fn clear(&mut self) {
        self.name.clear();
        self.end_tag = false;
        self.empty_scope = false;
        self.attributes.clear();
        self.name_overflow = false;
        self.id = TagId::Unknown;
        self.open = None;
        self.dropped = 0;
    }

    /// The id the tokenizer resolved for the whole name.
    pub(crate) fn id(&self) -> TagId {
        if self.name_overflow {
            TagId::Unknown
        } else {
            self.id
        }
    }

    /// Attributes lost to the per-tag limit.
    pub(crate) fn dropped(&self) -> usize {
        self.dropped
    }

    /// Copy one piece of the tag.
    pub(crate) fn absorb(&mut self, token: &HtmlToken, buffer: &ScanBuffer, max_value: usize) {
        if token.phase().starts_here() {
            self.clear();
        }
        let name_phase = token.name_phase();
        if name_phase != html::Phase::None {
            if !self.name_overflow {
                self.name_overflow = !push_name(&mut self.name, token.chars(token.name(), buffer));
            }
            if name_phase.ends_here() {
                self.id = token.tag_id();
            }
        }
        let flags = token.flags();
        self.end_tag |= flags.end_tag;
        self.empty_scope |= flags.empty_scope;

        for entry in token.attributes() {
            if entry.phase.starts_here() {
                if self.attributes.len() >= MAX_TAG_ATTRIBUTES {
                    self.dropped += 1;
                    self.open = None;
                    continue;
                }
                self.attributes.push(PendingAttribute::default());
                self.open = Some(self.attributes.len() - 1);
            }
            let Some(attr) = self.open.and_then(|index| self.attributes.get_mut(index)) else {
                continue;
            };
            if !entry.name.is_empty() && !attr.name_overflow {
                attr.name_overflow = !push_name(&mut attr.name, token.chars(entry.name, buffer));
            }
            if entry.name_ends_here() {
                attr.id = entry.id;
            }
            attr.has_value |= entry.has_value;
            if !attr.overflow && !entry.value.is_empty() {
                for ch in token.chars(entry.value, buffer) {
                    if attr.value.len() >= max_value {
                        attr.overflow = true;
                        break;
                    }
                    attr.value.push(ch);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::{HtmlTokenizer, ScanResult, TokenizerConfig};

    fn assemble(input: &str, window: usize, max_value: usize) -> PendingTag {
        let mut tokenizer = HtmlTokenizer::new(TokenizerConfig::default()).unwrap();
        let mut buffer = ScanBuffer::new(window);
        let mut rest = input;
        let mut tag = PendingTag::default();
        loop {
            match tokenizer.next_token(&mut buffer).unwrap() {
                ScanResult::Token => {
                    let token = tokenizer.token();
                    if token.kind() == html::HtmlTokenKind::Tag {
                        tag.absorb(token, &buffer, max_value);
                        if token.phase().ends_here() {
                            return tag;
                        }
                    }
                }
                ScanResult::NeedMoreInput if rest.is_empty() => buffer.set_end_of_stream(),
                ScanResult::NeedMoreInput => {
                    let taken = buffer.fill(rest);
                    rest = &rest[taken..];
                }
                ScanResult::Finished => return tag,
            }
        }
    }

    #[test]
    fn copies_name_and_attributes() {
        let tag = assemble("<A HREF='x.html' title=\"a &amp; b\" hidden>", 1024, 100);
        assert_eq!(tag.id(), TagId::A);
        assert!(!tag.end_tag);
        assert_eq!(tag.attributes.len(), 3);
        assert_eq!(tag.attributes[0].id(), AttributeId::Href);
        assert_eq!(tag.attributes[0].value, "x.html");
        assert_eq!(tag.attributes[1].value, "a & b");
        assert!(!tag.attributes[2].has_value);
    }

    #[test]
    fn joins_pieces_of_a_long_value() {
        let long = "v".repeat(300);
        let tag = assemble(&format!("<p title=\"{long}\" class=\"x\"/>"), 64, 1000);
        assert_eq!(tag.id(), TagId::P);
        assert_eq!(tag.attributes[0].value, long);
        assert_eq!(tag.attributes[1].value, "x");
        assert!(tag.empty_scope);
    }

    #[test]
    fn marks_values_over_the_limit() {
        let tag = assemble("<p title=\"abcdef\" class=x>", 1024, 4);
        assert!(tag.attributes[0].overflow);
        assert_eq!(tag.attributes[0].value, "abcd");
        assert!(!tag.attributes[1].overflow);
    }

    #[test]
    fn end_tags() {
        let tag = assemble("</div >", 1024, 10);
        assert!(tag.end_tag);
        assert_eq!(tag.id(), TagId::Div);
    }

    #[test]
    fn long_names_stay_bounded() {
        let long = "x".repeat(100_000);
        let tag = assemble(&format!("<{long} {long}=1 title=t>"), 64, 100);
        assert!(tag.name.len() <= MAX_NAME_LEN);
        assert_eq!(tag.id(), TagId::Unknown);
        assert_eq!(tag.attributes.len(), 2);
        assert!(tag.attributes[0].name.len() <= MAX_NAME_LEN);
        assert_eq!(tag.attributes[0].id(), AttributeId::Unknown);
        assert_eq!(tag.attributes[1].id(), AttributeId::Title);
    }

    #[test]
    fn ids_come_from_the_tokenizer_across_pieces() {
        let padding = "x".repeat(200);
        let tag = assemble(&format!("<TD data-a=\"{padding}\" COLSPAN=2>"), 64, 1000);
        assert_eq!(tag.id(), TagId::Td);
        assert_eq!(tag.attributes[1].id(), AttributeId::Colspan);
        assert_eq!(tag.attributes[1].name, "COLSPAN");
    }
}
