//! # Block Selection
//!
//! Decides which fenced blocks belong to the executable set.
//!
//! Selection runs twice per document:
//!
//! 1. **Collection** ([`Selector::collect`]): environment blocks are skipped and every
//!    selected block adds its tags after the interpreter to a [`TagPool`]
//! 2. **Final** ([`Selector::classify`]): every block is classified against the
//!    finished pool, which lets environment blocks join when they share a tag with
//!    a selected block anywhere in the document
//!
//! An environment block is decided by the pool alone; the configured filters never
//! apply to it.

use std::collections::btree_set;

use crate::tags::{TagList, TagSet, parse_tag_set};

pub const DEFAULT_SELECTION_TAG: &str = "selected";

/// First tags marking a block that holds environment variables or secrets.
pub const ENVIRONMENT_TAGS: [&str; 4] = ["env", "environment", "secret", "secrets"];

pub fn is_environment_tag(tag: &str) -> bool {
    ENVIRONMENT_TAGS.contains(&tag)
}

/// Filters applied to every non-environment block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Any-of: a block needs at least one of these.
    pub have_tags: TagSet,
    /// All-of: a block missing any of these is rejected.
    pub must_have_tags: TagSet,
    /// None-of: a block carrying any of these is rejected.
    pub must_not_have_tags: TagSet,
    /// Only blocks with this interpreter are considered.
    pub single_session: Option<String>,
    /// Label appended to the classes of a selected block.
    pub selection_tag: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            have_tags: TagSet::new(),
            must_have_tags: TagSet::new(),
            must_not_have_tags: TagSet::new(),
            single_session: None,
            selection_tag: DEFAULT_SELECTION_TAG.to_string(),
        }
    }
}

impl SelectionConfig {
    pub fn with_tags(mut self, raw: &str) -> Self {
        self.have_tags = parse_tag_set(raw);
        self
    }

    pub fn with_must_have_tags(mut self, raw: &str) -> Self {
        self.must_have_tags = parse_tag_set(raw);
        self
    }

    pub fn with_must_not_have_tags(mut self, raw: &str) -> Self {
        self.must_not_have_tags = parse_tag_set(raw);
        self
    }

    /// An empty value clears the constraint.
    pub fn with_single_session(mut self, raw: &str) -> Self {
        self.single_session = (!raw.is_empty()).then(|| raw.to_string());
        self
    }

    /// An empty value restores [`DEFAULT_SELECTION_TAG`].
    pub fn with_selection_tag(mut self, raw: &str) -> Self {
        self.selection_tag = if raw.is_empty() {
            DEFAULT_SELECTION_TAG.to_string()
        } else {
            raw.to_string()
        };
        self
    }

    fn has_tag_filters(&self) -> bool {
        !(self.have_tags.is_empty()
            && self.must_have_tags.is_empty()
            && self.must_not_have_tags.is_empty())
    }
}

/// Tags gathered from selected blocks during collection.
///
/// Scoped to a single document run. It only grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPool(TagSet);

impl TagPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend<'a>(&mut self, tags: impl IntoIterator<Item = &'a String>) {
        for tag in tags {
            if self.0.insert(tag.clone()) {
                log::trace!("collected tag {tag:?}");
            }
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a TagPool {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Applies a [`SelectionConfig`] to tag lists.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    config: SelectionConfig,
}

impl Selector {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// The selection predicate.
    ///
    /// Blocks whose interpreter is in `skip` are rejected outright. Environment
    /// blocks are selected iff one of their tags is in `pool`.
    pub fn is_selected(&self, tags: &TagList, pool: &TagPool, skip: &[&str]) -> bool {
        let Some(interpreter) = tags.first() else {
            return false;
        };
        if skip.contains(&interpreter) {
            return false;
        }
        if is_environment_tag(interpreter) {
            return tags.iter().any(|tag| pool.contains(tag));
        }
        if let Some(session) = &self.config.single_session
            && interpreter != session.as_str()
        {
            return false;
        }

        let config = &self.config;
        let mut selected = (config.have_tags.is_empty() && config.must_have_tags.is_empty())
            || tags.intersects(&config.have_tags);

        if !config.must_have_tags.is_empty() && !tags.contains_all(&config.must_have_tags) {
            selected = false;
        }
        if selected
            && !config.must_not_have_tags.is_empty()
            && tags.intersects(&config.must_not_have_tags)
        {
            selected = false;
        }

        if !config.has_tag_filters() {
            selected = !tags.is_empty();
        }
        selected
    }

    /// Collection pass: builds the pool from selected non-environment blocks.
    pub fn collect<'a>(&self, blocks: impl IntoIterator<Item = &'a TagList>) -> TagPool {
        // Environment blocks are skipped: the pool only holds tags of executable blocks.
        let empty = TagPool::new();
        let mut pool = TagPool::new();
        for tags in blocks {
            if self.is_selected(tags, &empty, &ENVIRONMENT_TAGS) {
                pool.extend(tags.rest());
            }
        }
        pool
    }

    /// Final pass: classifies a block against the finished pool.
    pub fn classify(&self, tags: &TagList, pool: &TagPool) -> bool {
        self.is_selected(tags, pool, &[])
    }

    /// Class labels for a block: its tags, then the selection tag if selected.
    pub fn labels(&self, tags: &TagList, selected: bool) -> Vec<String> {
        let mut labels = tags.as_slice().to_vec();
        if selected {
            labels.push(self.config.selection_tag.clone());
        }
        labels
    }
}
