//! # Rundoc Preprocessor
//!
//! Replaces every fenced block in a document with a stash placeholder whose markup
//! carries the block's tags and, when selected, the selection tag.
//!
//! Each run makes two passes over the same text: the first collects the tag pool,
//! the second classifies and substitutes. Text outside blocks is copied through
//! unchanged.

use std::ops::Range;

use crate::highlight::{HighlightRequest, Highlighter, parse_hl_lines};
use crate::render;
use crate::scanner::{FenceScanner, FencedBlock};
use crate::selection::{SelectionConfig, Selector, TagPool};
use crate::stash::Stash;
use crate::tags::TagList;

/// Outcome of the final pass for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedBlock {
    /// 1-based line of the opening fence.
    pub line: usize,
    pub span: Range<usize>,
    pub tags: TagList,
    pub selected: bool,
    pub classes: Vec<String>,
}

pub struct RundocPreprocessor {
    selector: Selector,
    highlighter: Option<Box<dyn Highlighter + Send + Sync>>,
}

impl Default for RundocPreprocessor {
    fn default() -> Self {
        Self::new(SelectionConfig::default())
    }
}

impl std::fmt::Debug for RundocPreprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RundocPreprocessor")
            .field("selector", &self.selector)
            .field("highlighter", &self.highlighter.is_some())
            .finish()
    }
}

impl RundocPreprocessor {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            selector: Selector::new(config),
            highlighter: None,
        }
    }

    pub fn with_highlighter(
        mut self,
        highlighter: impl Highlighter + Send + Sync + 'static,
    ) -> Self {
        self.highlighter = Some(Box::new(highlighter));
        self
    }

    /// First pass: the pool of tags contributed by selected blocks.
    pub fn collect_pool(&self, text: &str) -> TagPool {
        let tag_lists: Vec<TagList> = FenceScanner::new(text).map(|b| b.tag_list()).collect();
        let pool = self.selector.collect(&tag_lists);
        log::debug!(
            "collected {} tag(s) from {} block(s)",
            pool.len(),
            tag_lists.len()
        );
        pool
    }

    /// Classifies every block without touching the text.
    pub fn blocks(&self, text: &str) -> Vec<ClassifiedBlock> {
        let pool = self.collect_pool(text);
        FenceScanner::new(text)
            .map(|block| self.classify(&block, &pool))
            .collect()
    }

    /// Runs both passes and returns `text` with each block replaced by its token.
    pub fn run<S: Stash + ?Sized>(&self, text: &str, stash: &mut S) -> String {
        let pool = self.collect_pool(text);

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for block in FenceScanner::new(text) {
            let classified = self.classify(&block, &pool);
            out.push_str(&text[last..block.span.start]);
            out.push_str(&stash.store(self.render(&block, &classified)));
            last = block.span.end;
        }
        out.push_str(&text[last..]);
        out
    }

    /// Line-based entry point: joins with `\n`, runs, and splits again.
    pub fn run_lines<S, L>(&self, lines: &[L], stash: &mut S) -> Vec<String>
    where
        S: Stash + ?Sized,
        L: AsRef<str>,
    {
        let text = lines.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n");
        self.run(&text, stash)
            .split('\n')
            .map(str::to_string)
            .collect()
    }

    fn classify(&self, block: &FencedBlock<'_>, pool: &TagPool) -> ClassifiedBlock {
        let tags = block.tag_list();
        let selected = self.selector.classify(&tags, pool);
        let classes = self.selector.labels(&tags, selected);
        log::debug!(
            "line {}: [{}] {}",
            block.line,
            tags,
            if selected { "selected" } else { "skipped" }
        );
        ClassifiedBlock {
            line: block.line,
            span: block.span.clone(),
            tags,
            selected,
            classes,
        }
    }

    fn render(&self, block: &FencedBlock<'_>, classified: &ClassifiedBlock) -> String {
        match &self.highlighter {
            Some(highlighter) => {
                let hl_lines = parse_hl_lines(block.hl_lines);
                highlighter.highlight(&HighlightRequest {
                    code: block.body,
                    lang: classified.tags.first(),
                    hl_lines: &hl_lines,
                    classes: &classified.classes,
                })
            }
            None => render::code_block(&classified.classes, block.body),
        }
    }
}
