use std::collections::BTreeSet;
use std::fmt::Write;

use crate::render::{class_attr, escape};

pub const DEFAULT_CSS_CLASS: &str = "codehilite";

/// Everything a highlighter gets to know about one block.
#[derive(Debug, Clone, Copy)]
pub struct HighlightRequest<'a> {
    /// Raw, unescaped body.
    pub code: &'a str,
    /// The block's interpreter tag.
    pub lang: Option<&'a str>,
    /// 1-based line numbers to emphasise.
    pub hl_lines: &'a [usize],
    /// Class labels (tags plus selection tag) the markup must carry.
    pub classes: &'a [String],
}

/// Turns a block into finished markup in place of the plain `<pre><code>` wrapper.
pub trait Highlighter {
    fn highlight(&self, request: &HighlightRequest<'_>) -> String;
}

/// Parses an `hl_lines` value such as `"1 3 5"`.
///
/// A single token that is not a number discards the whole list.
pub fn parse_hl_lines(spec: Option<&str>) -> Vec<usize> {
    let Some(spec) = spec else {
        return Vec::new();
    };
    spec.split_whitespace()
        .map(str::parse::<usize>)
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Class of the wrapping `<div>`.
    pub css_class: String,
    /// Prefix every line with its number.
    pub linenums: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            css_class: DEFAULT_CSS_CLASS.to_string(),
            linenums: false,
        }
    }
}

/// Line-oriented highlighter: wraps the block in a styled `<div>` and marks the
/// requested lines with `<span class="hll">`.
#[derive(Debug, Clone, Default)]
pub struct LineHighlighter {
    config: HighlightConfig,
}

impl LineHighlighter {
    pub fn new(config: HighlightConfig) -> Self {
        Self { config }
    }
}

impl Highlighter for LineHighlighter {
    fn highlight(&self, request: &HighlightRequest<'_>) -> String {
        let marked: BTreeSet<usize> = request.hl_lines.iter().copied().collect();
        let line_count = request.code.lines().count();
        let width = line_count.to_string().len();

        let mut out = format!(
            "<div class=\"{}\"><pre><code{}>",
            escape(&self.config.css_class),
            class_attr(request.classes)
        );
        for (i, line) in request.code.split_inclusive('\n').enumerate() {
            let number = i + 1;
            if self.config.linenums {
                let _ = write!(out, "<span class=\"linenos\">{number:>width$}</span> ");
            }
            if marked.contains(&number) {
                let _ = write!(out, "<span class=\"hll\">{}</span>", escape(line));
            } else {
                out.push_str(&escape(line));
            }
        }
        out.push_str("</code></pre></div>");
        out
    }
}
