//! One-line snapshots of style statement pieces.

use css::{
    AtRuleKind, ClassType, CssMode, CssParser, CssParserConfig, CssToken, CssTokenKind,
    FunctionPolicy,
};
use html::{ScanBuffer, ScanResult};
use tools::Utf8Decoder;

use crate::chunker::ChunkPlan;
use crate::escape_text;

pub fn format_rule(token: &CssToken, buffer: &ScanBuffer) -> String {
    let text = |fragment| escape_text(&token.text(fragment, buffer));
    let mut line = match token.kind() {
        CssTokenKind::EndOfFile => return "EOF".to_string(),
        CssTokenKind::None => return "NONE".to_string(),
        CssTokenKind::Skipped if token.is_invalid() => {
            return format!("DROP {:?}", token.phase());
        }
        CssTokenKind::Skipped => return format!("SKIP {:?}", token.phase()),
        CssTokenKind::RuleSet => format!("RULE {:?}", token.phase()),
        CssTokenKind::AtRule => format!("AT {:?}", token.phase()),
        CssTokenKind::Declarations => format!("DECLS {:?}", token.phase()),
    };
    match token.at_rule() {
        AtRuleKind::None => {}
        AtRuleKind::Page => line.push_str(" @page"),
        AtRuleKind::FontFace => line.push_str(" @font-face"),
    }
    for entry in token.selectors() {
        line.push(' ');
        line.push_str(entry.combinator.as_str());
        line.push_str(&text(entry.name));
        let class = text(entry.class);
        match entry.class_type {
            ClassType::None => {}
            ClassType::Regular => line.push_str(&format!(".{class}")),
            ClassType::Hash => line.push_str(&format!("#{class}")),
            ClassType::Pseudo => line.push_str(&format!(":{class}")),
            ClassType::Attrib => line.push_str(&format!("[{class}]")),
        }
        if entry.deleted {
            line.push_str("(deleted)");
        }
    }
    for prop in token.properties() {
        line.push_str(&format!(" | {}=\"{}\"", text(prop.name), text(prop.value)));
        if prop.important {
            line.push_str(" !important");
        }
        if prop.deleted {
            line.push_str(" (deleted)");
        }
    }
    line
}

/// Parse `input` in `mode` through a `window`-sized buffer fed per `plan`
/// and snapshot every piece.
pub fn snapshot_rules(
    input: &[u8],
    window: usize,
    mode: CssMode,
    plan: &ChunkPlan,
) -> Result<Vec<String>, String> {
    let mut parser = CssParser::new(CssParserConfig::default(), mode, FunctionPolicy::default())
        .map_err(|err| err.to_string())?;
    let mut buffer = ScanBuffer::new(window);
    let mut decoder = Utf8Decoder::new();
    let mut chunks = plan.split(input).into_iter();
    let mut pending = String::new();
    let mut out = Vec::new();
    loop {
        match parser
            .next_token(&mut buffer)
            .map_err(|err| format!("{err} with plan {plan}"))?
        {
            ScanResult::Token => out.push(format_rule(parser.token(), &buffer)),
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
