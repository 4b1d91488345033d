pub mod highlight;
pub mod io;
pub mod preprocessor;
pub mod render;
pub mod scanner;
pub mod selection;
pub mod stash;
pub mod tags;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use highlight::{HighlightConfig, HighlightRequest, Highlighter, LineHighlighter};
pub use preprocessor::{ClassifiedBlock, RundocPreprocessor};
pub use scanner::{Fence, FenceKind, FenceScanner, FencedBlock};
pub use selection::{
    DEFAULT_SELECTION_TAG, ENVIRONMENT_TAGS, SelectionConfig, Selector, TagPool,
};
pub use stash::{HtmlStash, Stash};
pub use tags::{TagList, TagSet};
