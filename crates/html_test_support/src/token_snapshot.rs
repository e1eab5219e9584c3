//! One-line snapshots of markup token pieces.

use html::{HtmlToken, HtmlTokenKind, HtmlTokenizer, ScanBuffer, ScanResult, TokenizerConfig};
use tools::Utf8Decoder;

use crate::chunker::ChunkPlan;
use crate::escape_text;

pub fn format_piece(token: &HtmlToken, buffer: &ScanBuffer) -> String {
    let text = |fragment| escape_text(&token.text(fragment, buffer));
    match token.kind() {
        HtmlTokenKind::Text => format!("TEXT {:?} \"{}\"", token.phase(), text(token.content())),
        HtmlTokenKind::Comment => format!("COMMENT {:?} \"{}\"", token.phase(), text(token.content())),
        HtmlTokenKind::Declaration => {
            format!("DECL {:?} \"{}\"", token.phase(), text(token.content()))
        }
        HtmlTokenKind::Tag => {
            let mut line = format!(
                "{} {:?} {}",
                if token.is_end_tag() { "END" } else { "START" },
                token.phase(),
                text(token.name())
            );
            for attr in token.attributes() {
                line.push_str(&format!(" {}", text(attr.name)));
                if attr.has_value {
                    line.push_str(&format!("=\"{}\"", text(attr.value)));
                }
            }
            if token.flags().empty_scope {
                line.push_str(" /");
            }
            line
        }
        HtmlTokenKind::EndOfFile => "EOF".to_string(),
        HtmlTokenKind::None => "NONE".to_string(),
    }
}

/// Tokenize `input` through a `window`-sized buffer fed per `plan` and
/// snapshot every piece.
pub fn snapshot_pieces(input: &[u8], window: usize, plan: &ChunkPlan) -> Result<Vec<String>, String> {
    let mut tokenizer = HtmlTokenizer::new(TokenizerConfig::default()).map_err(|err| err.to_string())?;
    let mut buffer = ScanBuffer::new(window);
    let mut decoder = Utf8Decoder::new();
    let mut chunks = plan.split(input).into_iter();
    let mut pending = String::new();
    let mut out = Vec::new();
    loop {
        match tokenizer
            .next_token(&mut buffer)
            .map_err(|err| format!("{err} with plan {plan}"))?
        {
            ScanResult::Token => out.push(format_piece(tokenizer.token(), &buffer)),
            ScanResult::NeedMoreInput => {
                while pending.is_empty() {
                    let Some(chunk) = chunks.next() else { break };
                    decoder.push(chunk, &mut pending);
                }
                if pending.is_empty() {
                    decoder.finish(&mut pending);
                }
                if pending.is_empty() {
                    buffer.set_end_of_stream();
                } else {
                    let taken = buffer.fill(&pending);
                    pending.drain(..taken);
                }
            }
            ScanResult::Finished => break,
        }
    }
    Ok(out)
}
