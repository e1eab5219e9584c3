//! Helpers shared by the scanner and sanitizer integration tests: chunk
//! plans for streaming coverage, token snapshots, and readable diffs.

use std::fmt::Write;

pub mod chunker;
pub mod css_snapshot;
pub mod token_snapshot;

pub use chunker::{BoundaryPolicy, ChunkPlan, ChunkPlanCase, build_chunk_plans};
pub use css_snapshot::{format_rule, snapshot_rules};
pub use token_snapshot::{format_piece, snapshot_pieces};

/// Escape control characters and quotes so snapshot lines stay on one line.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

const MISSING: &str = "<missing>";

/// Describe the first differing line with a little context.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    let max = expected.len().max(actual.len());
    fn line(lines: &[String], idx: usize) -> &str {
        lines.get(idx).map(String::as_str).unwrap_or(MISSING)
    }
    let mut out = String::new();
    let mismatch = (0..max).find(|&idx| line(expected, idx) != line(actual, idx));
    match mismatch {
        Some(first) => {
            let start = first.saturating_sub(2);
            let end = (first + 3).min(max);
            let _ = writeln!(&mut out, "first mismatch at line {}:", first + 1);
            for idx in start..end {
                let marker = if idx == first { ">" } else { " " };
                let _ = writeln!(&mut out, "{marker} {:>4}  expected: {}", idx + 1, line(expected, idx));
                let _ = writeln!(&mut out, "{marker} {:>4}    actual: {}", idx + 1, line(actual, idx));
            }
        }
        None => {
            let _ = writeln!(&mut out, "no differing lines");
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}
