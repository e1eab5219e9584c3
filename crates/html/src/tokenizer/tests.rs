use super::{HtmlToken, HtmlTokenKind, HtmlTokenizer, QuoteStyle, TagPart, TokenizerConfig};
use crate::names::{AttributeId, TagId};
use crate::shared::{ConfigError, Phase, ScanBuffer, ScanResult};
use quickcheck_macros::quickcheck;

fn fmt_token(token: &HtmlToken, buf: &ScanBuffer) -> String {
    match token.kind() {
        HtmlTokenKind::Text | HtmlTokenKind::Comment | HtmlTokenKind::Declaration => format!(
            "{:?} {:?} {:?}",
            token.kind(),
            token.phase(),
            token.text(token.content(), buf)
        ),
        HtmlTokenKind::Tag => {
            let mut out = format!(
                "Tag {:?} {}{}",
                token.phase(),
                if token.is_end_tag() { "/" } else { "" },
                token.text(token.name(), buf)
            );
            for attr in token.attributes() {
                out.push(' ');
                out.push_str(&token.text(attr.name, buf));
                if attr.has_value {
                    out.push_str(&format!("={:?}", token.text(attr.value, buf)));
                }
            }
            if token.flags().empty_scope {
                out.push_str(" /");
            }
            out
        }
        HtmlTokenKind::EndOfFile => "EOF".to_string(),
        HtmlTokenKind::None => "None".to_string(),
    }
}

/// Feed `input` in chunks of at most `chunk` characters and format every piece.
fn drain_all_fmt(input: &str, window: usize, chunk: usize) -> Vec<String> {
    let mut tokenizer = HtmlTokenizer::new(TokenizerConfig::default()).unwrap();
    drain_with(&mut tokenizer, input, window, chunk)
}

fn drain_with(tokenizer: &mut HtmlTokenizer, input: &str, window: usize, chunk: usize) -> Vec<String> {
    let mut buf = ScanBuffer::new(window);
    let mut rest = input;
    let mut out = Vec::new();
    loop {
        match tokenizer.next_token(&mut buf).expect("scan must not fail") {
            ScanResult::Token => out.push(fmt_token(tokenizer.token(), &buf)),
            ScanResult::NeedMoreInput => {
                if rest.is_empty() {
                    buf.set_end_of_stream();
                    continue;
                }
                let end = rest
                    .char_indices()
                    .nth(chunk)
                    .map(|(idx, _)| idx)
                    .unwrap_or(rest.len());
                let taken = buf.fill(&rest[..end]);
                assert!(taken > 0, "tokenizer asked for input with a full window");
                rest = &rest[taken..];
            }
            ScanResult::Finished => break,
        }
    }
    out
}

fn whole(input: &str) -> Vec<String> {
    drain_all_fmt(input, 1024, usize::MAX)
}

#[test]
fn tokenizes_basic_markup() {
    let got = whole("<p class=\"a\">x &amp; y</p><!-- c --><br/>");
    assert_eq!(
        got,
        vec![
            "Tag Complete p class=\"a\"",
            "Text Complete \"x & y\"",
            "Tag Complete /p",
            "Comment Complete \" c \"",
            "Tag Complete br /",
            "EOF",
        ]
    );
}

#[test]
fn attribute_forms() {
    let got = whole("<input type=text disabled value='a b' data-x=\"&lt;\">");
    assert_eq!(
        got,
        vec![
            "Tag Complete input type=\"text\" disabled value=\"a b\" data-x=\"<\"",
            "EOF"
        ]
    );
}

#[test]
fn names_resolve_case_insensitively() {
    let mut tokenizer = HtmlTokenizer::new(TokenizerConfig::default()).unwrap();
    let mut buf = ScanBuffer::new(128);
    buf.fill("<DIV OnClick='x' STYLE=a>");
    buf.set_end_of_stream();
    assert_eq!(tokenizer.next_token(&mut buf), Ok(ScanResult::Token));
    let token = tokenizer.token();
    assert_eq!(token.tag_id(), TagId::Div);
    assert!(token.flags().allow_whitespace);
    assert_eq!(token.attributes()[0].id, AttributeId::Onclick);
    assert_eq!(token.attributes()[0].quote, QuoteStyle::Single);
    assert_eq!(token.attributes()[1].id, AttributeId::Style);
    assert_eq!(token.attributes()[1].quote, QuoteStyle::None);
    assert_eq!(token.text(token.name(), &buf), "DIV");
}

#[test]
fn raw_text_ends_only_at_matching_end_tag() {
    let got = whole("<script>if (a<b) x=\"</p>\";</script >tail");
    assert_eq!(
        got,
        vec![
            "Tag Complete script",
            "Text Complete \"if (a<b) x=\\\"</p>\\\";\"",
            "Tag Complete /script",
            "Text Complete \"tail\"",
            "EOF",
        ]
    );
}

#[test]
fn raw_text_does_not_decode_references_but_rcdata_does() {
    assert_eq!(
        whole("<style>a&amp;b</style>")[1],
        "Text Complete \"a&amp;b\""
    );
    assert_eq!(
        whole("<title>a&lt;b</title>")[1],
        "Text Complete \"a<b\""
    );
}

#[test]
fn plaintext_swallows_the_rest() {
    let got = whole("<plaintext><b>x</b>");
    assert_eq!(
        got,
        vec!["Tag Complete plaintext", "Text Complete \"<b>x</b>\"", "EOF"]
    );
}

#[test]
fn stray_angle_brackets_are_text() {
    assert_eq!(
        whole("a < b <1 c<"),
        vec!["Text Complete \"a < b <1 c<\"", "EOF"]
    );
}

#[test]
fn declarations_and_bogus_comments() {
    assert_eq!(
        whole("<!DOCTYPE html><?xml x?></ x>"),
        vec![
            "Declaration Complete \"DOCTYPE html\"",
            "Declaration Complete \"xml x?\"",
            "Declaration Complete \" x\"",
            "EOF",
        ]
    );
}

#[test]
fn unterminated_constructs_end_with_the_stream() {
    assert_eq!(
        whole("<a href=\"x"),
        vec!["Tag Complete a href=\"x\"", "EOF"]
    );
    assert_eq!(whole("<!-- open"), vec!["Comment Complete \" open\"", "EOF"]);
    assert_eq!(whole("<b"), vec!["Tag Complete b", "EOF"]);
}

#[test]
fn references_need_a_semicolon() {
    assert_eq!(
        whole("&amp &lt; &#65; &bogus;"),
        vec!["Text Complete \"&amp < A &bogus;\"", "EOF"]
    );
}

#[test]
fn empty_input_yields_only_end_of_file() {
    assert_eq!(whole(""), vec!["EOF"]);
}

#[test]
fn finished_tokenizer_keeps_reporting_finished() {
    let mut tokenizer = HtmlTokenizer::new(TokenizerConfig::default()).unwrap();
    let mut buf = ScanBuffer::new(64);
    buf.set_end_of_stream();
    assert_eq!(tokenizer.next_token(&mut buf), Ok(ScanResult::Token));
    assert_eq!(tokenizer.token().kind(), HtmlTokenKind::EndOfFile);
    assert_eq!(tokenizer.next_token(&mut buf), Ok(ScanResult::Finished));
    assert_eq!(tokenizer.next_token(&mut buf), Ok(ScanResult::Finished));
}

#[test]
fn small_chunks_match_single_chunk_sequence() {
    let input = "<div id=a>Hello &amp; <b>wor&#108;d</b></div><!-- x --><title>&lt;</title>";
    let expected = whole(input);
    for chunk in 1..8 {
        assert_eq!(
            drain_all_fmt(input, 1024, chunk),
            expected,
            "chunk size {chunk}"
        );
    }
}

#[test]
fn long_text_is_cut_into_pieces() {
    let text = "abcdefghij".repeat(30);
    let got = drain_all_fmt(&text, 64, 64);
    assert!(got.len() > 3);
    assert!(got[0].starts_with("Text Begin"));
    assert!(got[got.len() - 2].starts_with("Text End"));
    assert!(
        got[1..got.len() - 2]
            .iter()
            .all(|piece| piece.starts_with("Text Continue"))
    );
}

#[test]
fn long_attribute_value_spans_pieces() {
    let value = "v".repeat(200);
    let input = format!("<a title=\"{value}\" href=x>t</a>");
    let mut tokenizer = HtmlTokenizer::new(TokenizerConfig::default()).unwrap();
    let mut buf = ScanBuffer::new(64);
    let mut rest = input.as_str();
    let mut collected = String::new();
    let mut value_phases = Vec::new();
    let mut parts = Vec::new();
    loop {
        match tokenizer.next_token(&mut buf).unwrap() {
            ScanResult::Token => {
                let token = tokenizer.token();
                if token.kind() != HtmlTokenKind::Tag || token.is_end_tag() {
                    continue;
                }
                parts.push(token.part());
                for attr in token.attributes() {
                    if attr.id == AttributeId::Title {
                        collected.push_str(&token.text(attr.value, &buf));
                        value_phases.push(attr.value_phase);
                    }
                }
            }
            ScanResult::NeedMoreInput => {
                if rest.is_empty() {
                    buf.set_end_of_stream();
                } else {
                    let taken = buf.fill(rest);
                    rest = &rest[taken..];
                }
            }
            ScanResult::Finished => break,
        }
    }
    assert_eq!(collected, value);
    assert_eq!(value_phases.first(), Some(&Phase::Begin));
    assert_eq!(value_phases.last(), Some(&Phase::End));
    assert_eq!(parts.first(), Some(&TagPart::AttributeValue));
    assert_eq!(parts.last(), Some(&TagPart::None));
}

#[test]
fn attribute_limit_cuts_the_tag() {
    let config = TokenizerConfig {
        max_attributes: 2,
        ..TokenizerConfig::default()
    };
    let mut tokenizer = HtmlTokenizer::new(config).unwrap();
    let got = drain_with(&mut tokenizer, "<a b c d e>", 128, usize::MAX);
    assert_eq!(
        got,
        vec!["Tag Begin a b c", "Tag End  d e", "EOF"]
    );
}

#[test]
fn config_is_validated() {
    let bad = TokenizerConfig {
        max_runs: 4,
        ..TokenizerConfig::default()
    };
    assert!(matches!(
        HtmlTokenizer::new(bad),
        Err(ConfigError::RunLimitTooSmall { .. })
    ));
    let bad = TokenizerConfig {
        max_attributes: 0,
        ..TokenizerConfig::default()
    };
    assert!(matches!(
        HtmlTokenizer::new(bad),
        Err(ConfigError::ZeroLimit { .. })
    ));
}

#[test]
fn reset_allows_a_new_buffer() {
    let mut tokenizer = HtmlTokenizer::new(TokenizerConfig::default()).unwrap();
    let first = drain_with(&mut tokenizer, "<i>a</i>", 64, usize::MAX);
    tokenizer.reset();
    let second = drain_with(&mut tokenizer, "<i>a</i>", 64, usize::MAX);
    assert_eq!(first, second);
    assert!(tokenizer.stats().tokens_emitted >= 4);
}

#[test]
#[should_panic(expected = "bound to another buffer")]
fn second_buffer_is_rejected() {
    let mut tokenizer = HtmlTokenizer::new(TokenizerConfig::default()).unwrap();
    let mut first = ScanBuffer::new(64);
    let mut second = ScanBuffer::new(64);
    let _ = tokenizer.next_token(&mut first);
    let _ = tokenizer.next_token(&mut second);
}

#[quickcheck]
fn chunking_never_changes_short_inputs(input: String, chunk: u8) -> bool {
    let input: String = input.chars().take(48).collect();
    let chunk = usize::from(chunk % 7) + 1;
    drain_all_fmt(&input, 64, chunk) == whole(&input)
}
