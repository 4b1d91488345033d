use std::collections::BTreeSet;
use std::fmt;

/// Separator between tags on a fence line and in configured filter lists.
pub const TAG_SEPARATOR: char = '#';

/// A set of tags used for filters and for the collected pool.
pub type TagSet = BTreeSet<String>;

/// Parses a `#`-separated list into a set, dropping empty segments.
pub fn parse_tag_set(raw: &str) -> TagSet {
    split_tags(raw).map(str::to_string).collect()
}

fn split_tags(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(TAG_SEPARATOR).filter(|tag| !tag.is_empty())
}

/// Ordered tags of one block. The first tag names the interpreter.
///
/// Tags compare by exact string equality; nothing is trimmed or case-folded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn parse(raw: &str) -> Self {
        Self(split_tags(raw).map(str::to_string).collect())
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Tags after the interpreter.
    pub fn rest(&self) -> &[String] {
        self.0.get(1..).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.iter().any(|t| t == tag)
    }

    /// At least one tag is in `set`.
    pub fn intersects(&self, set: &TagSet) -> bool {
        self.iter().any(|t| set.contains(t))
    }

    /// Every tag of `set` is present.
    pub fn contains_all(&self, set: &TagSet) -> bool {
        set.iter().all(|t| self.contains(t))
    }
}

impl fmt::Display for TagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(&TAG_SEPARATOR.to_string()))
    }
}

impl<S: Into<String>> FromIterator<S> for TagList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
