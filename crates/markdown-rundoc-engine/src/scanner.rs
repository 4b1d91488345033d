//! # Fenced Block Scanning
//!
//! Finds fenced code blocks in a text buffer with a forward cursor.
//!
//! ## Grammar
//!
//! - **Opener**: three or more identical `` ` `` or `~` at line start, followed by
//!   an optional tag annotation (`{`, `.`, tag string, `hl_lines="..."`, `}`) and a
//!   line break. Words after the tag string are ignored
//! - **Body**: every line after the opener up to the closer; always ends in `\n`
//!   unless empty
//! - **Closer**: the opener's fence character repeated at least as many times at
//!   line start, optional trailing spaces, then end of line or end of text
//!
//! The first valid closer ends the block. An opener without a closer is skipped
//! and scanning resumes on the following line, so a later fence pair can still
//! match.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::tags::TagList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

impl FenceKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '`' => Some(FenceKind::Backticks),
            '~' => Some(FenceKind::Tildes),
            _ => None,
        }
    }
}

/// A run of fence characters at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    pub kind: FenceKind,
    pub len: usize,
}

impl Fence {
    pub const MIN_LEN: usize = 3;

    /// Detects a fence at the start of `line`, returning it with the rest of the line.
    pub fn sig(line: &str) -> Option<(Fence, &str)> {
        let first = line.chars().next()?;
        let kind = FenceKind::from_char(first)?;
        let len = line.chars().take_while(|&c| c == first).count();
        if len < Self::MIN_LEN {
            return None;
        }
        // Fence characters are ASCII, so `len` is also a byte offset.
        Some((Fence { kind, len }, &line[len..]))
    }

    /// Whether `line` closes a block opened by this fence.
    pub fn closes(self, line: &str) -> bool {
        match Fence::sig(line) {
            Some((closer, rest)) => {
                closer.kind == self.kind
                    && closer.len >= self.len
                    && rest.trim_start_matches(' ').is_empty()
            }
            None => false,
        }
    }
}

/// The tag annotation on an opening fence line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoString<'a> {
    pub tags: &'a str,
    pub hl_lines: Option<&'a str>,
}

impl<'a> InfoString<'a> {
    /// Parses the remainder of an opening line (fence stripped, no line break).
    ///
    /// Words after the tag string are ignored. Returns `None` when a `hl_lines`
    /// quote is left open.
    pub fn parse(remainder: &'a str) -> Option<Self> {
        static INFO_RE: OnceLock<Regex> = OnceLock::new();
        static HL_LINES_RE: OnceLock<Regex> = OnceLock::new();
        let info_re = INFO_RE.get_or_init(|| {
            Regex::new(
                r#"^[ ]*\{?\.?(?P<tags>[^\s{}]*?)[ ]*(?:hl_lines=(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'))?(?P<rest>[ ]+[^\n]*?)?[ ]*\}?[ ]*$"#,
            )
            .expect("Invalid info string regex")
        });
        let hl_lines_re = HL_LINES_RE.get_or_init(|| {
            Regex::new(r#"hl_lines=(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
                .expect("Invalid hl_lines regex")
        });

        let caps = info_re.captures(remainder)?;
        let tags = caps.name("tags").map_or("", |m| m.as_str());
        let mut hl_lines = caps.name("dq").or_else(|| caps.name("sq")).map(|m| m.as_str());

        if hl_lines.is_none()
            && let Some(rest) = caps.name("rest").map(|m| m.as_str())
            && rest.contains("hl_lines=")
        {
            let directive = hl_lines_re.captures(rest)?;
            hl_lines = directive
                .name("dq")
                .or_else(|| directive.name("sq"))
                .map(|m| m.as_str());
        }
        Some(InfoString { tags, hl_lines })
    }
}

/// One fenced block found by [`FenceScanner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock<'a> {
    pub fence: Fence,
    /// Raw tag string, e.g. `python#run`.
    pub tags: &'a str,
    /// Raw `hl_lines` directive value, without quotes.
    pub hl_lines: Option<&'a str>,
    pub body: &'a str,
    /// Byte span from the opener's first fence character to the end of the
    /// closing line, excluding its line break.
    pub span: Range<usize>,
    /// 1-based line number of the opener.
    pub line: usize,
}

impl FencedBlock<'_> {
    pub fn tag_list(&self) -> TagList {
        TagList::parse(self.tags)
    }
}

/// Lazily yields non-overlapping fenced blocks in document order.
#[derive(Debug, Clone)]
pub struct FenceScanner<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> FenceScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
        }
    }

    /// Finds the closing line for `fence`, searching lines from `from`.
    ///
    /// Returns the closer's start and end (exclusive of its line break).
    fn find_closer(&self, fence: Fence, from: usize) -> Option<(usize, usize)> {
        let mut start = from;
        while start < self.text.len() {
            let end = self.line_end(start);
            if fence.closes(&self.text[start..end]) {
                return Some((start, end));
            }
            start = end + 1;
        }
        None
    }

    fn line_end(&self, start: usize) -> usize {
        self.text[start..]
            .find('\n')
            .map_or(self.text.len(), |i| start + i)
    }
}

impl<'a> Iterator for FenceScanner<'a> {
    type Item = FencedBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        while self.pos < text.len() {
            let line_start = self.pos;
            let line_no = self.line;
            // An opener needs a line break after its annotation.
            let Some(offset) = text[line_start..].find('\n') else {
                self.pos = text.len();
                return None;
            };
            let line_end = line_start + offset;
            self.pos = line_end + 1;
            self.line += 1;

            let Some((fence, remainder)) = Fence::sig(&text[line_start..line_end]) else {
                continue;
            };
            let Some(info) = InfoString::parse(remainder) else {
                continue;
            };

            let body_start = line_end + 1;
            let Some((close_start, close_end)) = self.find_closer(fence, body_start) else {
                log::debug!("unterminated code fence on line {line_no}, leaving it untouched");
                continue;
            };

            let body = &text[body_start..close_start];
            self.pos = close_end;
            self.line = line_no + 1 + body.matches('\n').count();

            return Some(FencedBlock {
                fence,
                tags: info.tags,
                hl_lines: info.hl_lines,
                body,
                span: line_start..close_end,
                line: line_no,
            });
        }
        None
    }
}
