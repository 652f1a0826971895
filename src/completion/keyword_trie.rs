//! Keyword trie for nested keyword grammars
//!
//! The trie is a tree of whole keywords, not characters. It is built once
//! from a static table of [`KeywordEntry`] values and never changes. Tables
//! that appear under several keywords are built once and shared.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::candidate::{Candidate, Category};
use super::document::Document;
use super::keywords;
use crate::error::GrammarError;

/// One keyword of a static grammar table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeywordEntry {
    pub keyword: &'static str,
    pub next: Option<&'static [KeywordEntry]>,
}

/// Keyword with nothing after it
pub const fn leaf(keyword: &'static str) -> KeywordEntry {
    KeywordEntry {
        keyword,
        next: None,
    }
}

/// Keyword followed by the keywords in `next`
pub const fn branch(keyword: &'static str, next: &'static [KeywordEntry]) -> KeywordEntry {
    KeywordEntry {
        keyword,
        next: Some(next),
    }
}

#[derive(Debug)]
struct TrieNode {
    keyword: String,
    meta: Option<String>,
    children: Option<Arc<TrieLevel>>,
}

#[derive(Debug, Default)]
struct TrieLevel {
    nodes: Vec<TrieNode>,
}

impl TrieLevel {
    fn get(&self, keyword: &str) -> Option<&TrieNode> {
        self.nodes.iter().find(|node| node.keyword == keyword)
    }
}

/// Lexical completer over a keyword grammar.
#[derive(Debug, Clone)]
pub struct KeywordTrie {
    root: Arc<TrieLevel>,
}

impl KeywordTrie {
    /// Build the trie for a named grammar.
    ///
    /// # Arguments
    /// * `selector` - Grammar name, `bigquery` or `ansi`
    ///
    /// # Returns
    /// * `Result<KeywordTrie, GrammarError>` - The trie, or an error for an unknown name
    pub fn for_grammar(selector: &str) -> Result<Self, GrammarError> {
        match selector.to_ascii_lowercase().as_str() {
            "bigquery" => Ok(Self::from_table(keywords::BIGQUERY, keywords::META)),
            "ansi" => Ok(Self::from_table(keywords::ANSI, keywords::META)),
            _ => Err(GrammarError::UnknownSelector(selector.to_string())),
        }
    }

    /// Build the trie from a static table and keyword descriptions
    pub fn from_table(
        table: &'static [KeywordEntry],
        meta: &[(&'static str, &'static str)],
    ) -> Self {
        let meta: HashMap<String, &str> = meta
            .iter()
            .map(|(keyword, description)| (keyword.to_uppercase(), *description))
            .collect();
        let mut built = HashMap::new();
        let root = build_level(table, &meta, &mut built);
        debug!(levels = built.len(), "keyword trie built");
        Self { root }
    }

    /// Candidates for the text before the cursor
    pub fn complete(&self, document: &Document) -> Vec<Candidate> {
        self.complete_text(document.text_before_cursor())
    }

    /// Candidates for `text`, taken as everything before the cursor
    pub fn complete_text(&self, text: &str) -> Vec<Candidate> {
        let mut level = &self.root;
        let mut rest = text.trim_start();

        // Each step drops one word, so the walk ends
        while let Some(split) = rest.find(char::is_whitespace) {
            let first = rest[..split].to_uppercase();
            match level.get(&first).and_then(|node| node.children.as_ref()) {
                Some(children) => {
                    level = children;
                    rest = rest[split..].trim_start();
                }
                None => return matching(&self.root, last_word(rest)),
            }
        }

        matching(level, rest)
    }
}

fn build_level(
    table: &'static [KeywordEntry],
    meta: &HashMap<String, &str>,
    built: &mut HashMap<&'static [KeywordEntry], Arc<TrieLevel>>,
) -> Arc<TrieLevel> {
    if let Some(level) = built.get(table) {
        return Arc::clone(level);
    }

    let nodes = table
        .iter()
        .map(|entry| {
            let keyword = entry.keyword.to_uppercase();
            TrieNode {
                meta: meta.get(&keyword).map(|m| m.to_string()),
                children: entry.next.map(|next| build_level(next, meta, built)),
                keyword,
            }
        })
        .collect();

    let level = Arc::new(TrieLevel { nodes });
    built.insert(table, Arc::clone(&level));
    level
}

fn last_word(text: &str) -> &str {
    if text.ends_with(char::is_whitespace) {
        return "";
    }
    text.rsplit(char::is_whitespace).next().unwrap_or(text)
}

fn matching(level: &TrieLevel, word: &str) -> Vec<Candidate> {
    let prefix = word.to_uppercase();
    level
        .nodes
        .iter()
        .filter(|node| node.keyword.starts_with(&prefix))
        .map(|node| {
            let candidate = Candidate::new(node.keyword.as_str(), word, Category::Keyword);
            match &node.meta {
                Some(meta) => candidate.with_meta(meta.as_str()),
                None => candidate,
            }
        })
        .collect()
}
