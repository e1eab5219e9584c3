//! Tokenizer state machine definitions.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenizerState {
    Data,
    /// Inside `<script>`-like content: only the matching end tag is markup.
    RawText,
    /// Like `RawText`, but character references decode.
    RcData,
    /// Everything up to end of stream is text.
    PlainText,
    TagName,
    BeforeAttributeName,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValueQuoted(char),
    AttributeValueUnquoted,
    SelfClosingStartTag,
    Comment,
    Declaration,
}

/// Outcome of one state-machine step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Progress,
    NeedMoreInput,
    Emit,
    Exhausted,
}

/// How `<` at the cursor starts markup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MarkupOpen {
    StartTag,
    EndTag,
    Comment,
    /// Bogus comment, doctype or processing instruction; the prefix length is
    /// recorded as markup.
    Declaration(usize),
    /// Not markup: the `<` is text.
    Text,
    Incomplete,
}

/// Decide what `<` at the start of `input` opens.
pub(crate) fn classify_markup(input: &[char], at_end: bool) -> MarkupOpen {
    debug_assert_eq!(input.first(), Some(&'<'));
    let starved = |fallback| if at_end { fallback } else { MarkupOpen::Incomplete };
    match input.get(1) {
        None => starved(MarkupOpen::Text),
        Some(ch) if ch.is_ascii_alphabetic() => MarkupOpen::StartTag,
        Some('/') => match input.get(2) {
            None => starved(MarkupOpen::Text),
            Some(ch) if ch.is_ascii_alphabetic() => MarkupOpen::EndTag,
            Some(_) => MarkupOpen::Declaration(2),
        },
        Some('!') => {
            const OPEN: [char; 4] = ['<', '!', '-', '-'];
            let avail = input.len().min(OPEN.len());
            if input[..avail] == OPEN[..avail] {
                if avail == OPEN.len() {
                    return MarkupOpen::Comment;
                }
                return starved(MarkupOpen::Declaration(2));
            }
            MarkupOpen::Declaration(2)
        }
        Some('?') => MarkupOpen::Declaration(2),
        Some(_) => MarkupOpen::Text,
    }
}

/// Result of looking for the end tag that closes raw text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RawClose {
    Found,
    NotHere,
    Incomplete,
}

/// Check whether `input` (starting at `<`) is `</name` followed by a name
/// terminator, comparing ASCII case-insensitively.
pub(crate) fn match_raw_close(input: &[char], name: &str, at_end: bool) -> RawClose {
    let needed = 2 + name.chars().count() + 1;
    let expected = ['<', '/'].into_iter().chain(name.chars());
    for (idx, want) in expected.enumerate() {
        match input.get(idx) {
            None => return if at_end { RawClose::NotHere } else { RawClose::Incomplete },
            Some(got) if got.eq_ignore_ascii_case(&want) => {}
            Some(_) => return RawClose::NotHere,
        }
    }
    match input.get(needed - 1) {
        None if at_end => RawClose::NotHere,
        None => RawClose::Incomplete,
        Some(&ch) if tools::chars::ends_html_name(ch) => RawClose::Found,
        Some(_) => RawClose::NotHere,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn classifies_markup_openers() {
        assert_eq!(classify_markup(&chars("<a"), false), MarkupOpen::StartTag);
        assert_eq!(classify_markup(&chars("</b"), false), MarkupOpen::EndTag);
        assert_eq!(classify_markup(&chars("<!--"), false), MarkupOpen::Comment);
        assert_eq!(
            classify_markup(&chars("<!DOCTYPE"), false),
            MarkupOpen::Declaration(2)
        );
        assert_eq!(classify_markup(&chars("<?x"), false), MarkupOpen::Declaration(2));
        assert_eq!(classify_markup(&chars("</ "), false), MarkupOpen::Declaration(2));
        assert_eq!(classify_markup(&chars("< a"), false), MarkupOpen::Text);
        assert_eq!(classify_markup(&chars("<1"), false), MarkupOpen::Text);
    }

    #[test]
    fn short_prefixes_wait_unless_at_end() {
        assert_eq!(classify_markup(&chars("<"), false), MarkupOpen::Incomplete);
        assert_eq!(classify_markup(&chars("<"), true), MarkupOpen::Text);
        assert_eq!(classify_markup(&chars("</"), false), MarkupOpen::Incomplete);
        assert_eq!(classify_markup(&chars("</"), true), MarkupOpen::Text);
        assert_eq!(classify_markup(&chars("<!-"), false), MarkupOpen::Incomplete);
        assert_eq!(
            classify_markup(&chars("<!-"), true),
            MarkupOpen::Declaration(2)
        );
    }

    #[test]
    fn raw_close_requires_name_terminator() {
        assert_eq!(match_raw_close(&chars("</script>"), "script", false), RawClose::Found);
        assert_eq!(match_raw_close(&chars("</SCRIPT "), "script", false), RawClose::Found);
        assert_eq!(
            match_raw_close(&chars("</scripts>"), "script", false),
            RawClose::NotHere
        );
        assert_eq!(
            match_raw_close(&chars("</scr"), "script", false),
            RawClose::Incomplete
        );
        assert_eq!(match_raw_close(&chars("</scr"), "script", true), RawClose::NotHere);
        assert_eq!(match_raw_close(&chars("<b"), "script", false), RawClose::NotHere);
    }
}
