//! Statement boundary scanning.
//!
//! Before a statement is parsed, the scanner walks its characters once to
//! find where the prelude ends, where the statement ends, and the last
//! top-level `;` inside the block. It keeps its state between calls, so it
//! can follow a statement across window refills without rescanning.

use html::ScanBuffer;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Boundaries {
    /// Next logical offset to scan.
    pub pos: usize,
    brace: u32,
    paren: u32,
    quote: Option<char>,
    comment: bool,
    escape: bool,
    after_slash: bool,
    after_star: bool,
    declarations_only: bool,
    /// Offset of the `{` that opens the block.
    pub prelude_end: Option<usize>,
    /// The statement has a block.
    pub block: bool,
    /// Offset just past the last top-level `;` inside the block.
    pub last_decl: Option<usize>,
    /// Offset just past the first top-level `;` seen since `watch`.
    pub next_decl: Option<usize>,
    watching: bool,
    /// Offset just past the statement.
    pub end: Option<usize>,
}

impl Boundaries {
    /// Scanner for a statement starting at `start`.
    pub fn statement(start: usize) -> Self {
        Self {
            pos: start,
            ..Self::default()
        }
    }

    /// Scanner for a bare declaration list: already inside a block that
    /// never closes.
    pub fn declarations(start: usize) -> Self {
        Self {
            pos: start,
            brace: 1,
            block: true,
            declarations_only: true,
            ..Self::default()
        }
    }

    /// Start looking for the next declaration end after everything scanned
    /// so far.
    pub fn watch(&mut self) {
        self.watching = true;
        self.next_decl = None;
    }

    pub fn unwatch(&mut self) {
        self.watching = false;
        self.next_decl = None;
    }

    /// Scan every buffered character after `pos`, stopping at the end of the
    /// statement.
    pub fn advance(&mut self, buffer: &ScanBuffer) {
        if self.end.is_some() {
            return;
        }
        let start = self.pos;
        for &ch in buffer.tail(start) {
            let at = self.pos;
            self.pos += 1;
            self.feed(ch, at);
            if self.end.is_some() {
                return;
            }
        }
    }

    fn feed(&mut self, ch: char, at: usize) {
        if self.comment {
            if self.after_star && ch == '/' {
                self.comment = false;
                self.after_star = false;
            } else {
                self.after_star = ch == '*';
            }
            return;
        }
        if let Some(quote) = self.quote {
            if self.escape {
                self.escape = false;
            } else if ch == '\\' {
                self.escape = true;
            } else if ch == quote || ch == '\n' {
                self.quote = None;
            }
            return;
        }
        if self.escape {
            self.escape = false;
            return;
        }
        if self.after_slash {
            self.after_slash = false;
            if ch == '*' {
                self.comment = true;
                return;
            }
        }
        match ch {
            '\\' => self.escape = true,
            '/' => self.after_slash = true,
            '"' | '\'' => self.quote = Some(ch),
            '(' | '[' => self.paren += 1,
            ')' | ']' => self.paren = self.paren.saturating_sub(1),
            '{' => {
                if self.brace == 0 && self.prelude_end.is_none() {
                    self.prelude_end = Some(at);
                    self.block = true;
                }
                self.brace += 1;
            }
            '}' => {
                if self.declarations_only && self.brace == 1 {
                    return;
                }
                if self.brace == 0 {
                    // Stray close brace inside a prelude ends the statement.
                    self.end = Some(at + 1);
                    return;
                }
                self.brace -= 1;
                if self.brace == 0 {
                    self.end = Some(at + 1);
                }
            }
            ';' => {
                if self.brace == 0 && !self.block {
                    self.end = Some(at + 1);
                } else if self.brace == 1 && self.paren == 0 {
                    self.last_decl = Some(at + 1);
                    if self.watching && self.next_decl.is_none() {
                        self.next_decl = Some(at + 1);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Index of the first top-level `;` in `src`, ignoring strings, comments,
/// escapes and bracketed groups.
pub(crate) fn next_declaration_end(src: &[char]) -> Option<usize> {
    let mut scan = Boundaries::declarations(0);
    for (idx, &ch) in src.iter().enumerate() {
        scan.feed(ch, idx);
        if scan.last_decl.is_some() {
            return Some(idx);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Boundaries {
        let mut buf = ScanBuffer::new(256);
        buf.fill(text);
        let mut scan = Boundaries::statement(0);
        scan.advance(&buf);
        scan
    }

    #[test]
    fn finds_prelude_block_and_end() {
        let b = scan("a > b { color: red; x: y } tail");
        assert_eq!(b.prelude_end, Some(6));
        assert_eq!(b.last_decl, Some(19));
        assert_eq!(b.end, Some(26));
        assert_eq!(b.pos, 26);
    }

    #[test]
    fn braces_in_strings_and_comments_do_not_count() {
        let b = scan("a { content: \"}\"; /* } */ b: c }");
        assert_eq!(b.end, Some(32));
        assert_eq!(b.last_decl, Some(17));
    }

    #[test]
    fn semicolons_inside_parens_are_not_declaration_ends() {
        let b = scan("a { b: url(x;y) }");
        assert_eq!(b.last_decl, None);
        assert_eq!(b.end, Some(17));
    }

    #[test]
    fn nested_blocks_end_at_the_outer_brace() {
        let b = scan("@media x { a { b: c } } d");
        assert_eq!(b.end, Some(23));
    }

    #[test]
    fn statement_without_block_ends_at_semicolon() {
        let b = scan("@import x; a {}");
        assert_eq!(b.end, Some(10));
        assert!(!b.block);
    }

    #[test]
    fn stray_close_brace_ends_prelude() {
        let b = scan("a } b {}");
        assert_eq!(b.end, Some(3));
        assert_eq!(b.prelude_end, None);
    }

    #[test]
    fn scanning_resumes_across_refills() {
        let mut buf = ScanBuffer::new(64);
        buf.fill("a { b: \"x");
        let mut scan = Boundaries::statement(0);
        scan.advance(&buf);
        assert_eq!(scan.end, None);
        buf.fill("}\"; }");
        scan.advance(&buf);
        assert_eq!(scan.end, Some(14));
        assert_eq!(scan.last_decl, Some(12));
    }

    #[test]
    fn watching_reports_the_first_boundary() {
        let mut buf = ScanBuffer::new(64);
        buf.fill("a { b: c");
        let mut scan = Boundaries::statement(0);
        scan.advance(&buf);
        scan.watch();
        buf.fill("; d: e; }");
        scan.advance(&buf);
        assert_eq!(scan.next_decl, Some(9));
        assert_eq!(scan.last_decl, Some(15));
    }

    #[test]
    fn declaration_list_never_ends() {
        let mut buf = ScanBuffer::new(64);
        buf.fill("a: b; } c: d;");
        let mut scan = Boundaries::declarations(0);
        scan.advance(&buf);
        assert_eq!(scan.end, None);
        assert_eq!(scan.last_decl, Some(13));
    }

    #[test]
    fn finds_top_level_semicolon() {
        let src: Vec<char> = "a: url(';'); b".chars().collect();
        assert_eq!(next_declaration_end(&src), Some(11));
        let src: Vec<char> = "a: 'x;y'".chars().collect();
        assert_eq!(next_declaration_end(&src), None);
    }
}
