//! Placeholder storage for finished markup.
//!
//! Later rendering stages only ever see an opaque token. The token is framed by
//! the STX and ETX control characters, which no Markdown construct produces.

use std::sync::OnceLock;

use regex::{Captures, Regex};

const STX: char = '\u{2}';
const ETX: char = '\u{3}';

/// Stores markup and hands back a token to splice into the text.
pub trait Stash {
    fn store(&mut self, markup: String) -> String;
}

/// In-memory stash with numbered placeholders.
#[derive(Debug, Clone, Default)]
pub struct HtmlStash {
    blocks: Vec<String>,
}

impl HtmlStash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placeholder(index: usize) -> String {
        format!("{STX}wzxhzdk:{index}{ETX}")
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.blocks.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Replaces every known placeholder in `text` with its markup.
    ///
    /// Tokens with an unknown index are left as they are.
    pub fn restore(&self, text: &str) -> String {
        static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
        let placeholder_re = PLACEHOLDER_RE.get_or_init(|| {
            Regex::new(r"\x02wzxhzdk:(\d+)\x03").expect("Invalid placeholder regex")
        });

        placeholder_re
            .replace_all(text, |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.get(index))
                    .map_or_else(|| caps[0].to_string(), str::to_string)
            })
            .into_owned()
    }
}

impl Stash for HtmlStash {
    fn store(&mut self, markup: String) -> String {
        let token = Self::placeholder(self.blocks.len());
        self.blocks.push(markup);
        token
    }
}
