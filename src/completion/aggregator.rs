//! Merges the candidate streams of all configured sources

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;

use futures::future::join_all;
use futures::FutureExt;
use tracing::{error, trace};

use super::candidate::{Candidate, Category};
use super::document::Document;
use super::source::CompletionSource;

/// Runs every source for a document and merges the results.
///
/// Sources run concurrently. Output keeps source order, then each source's
/// own order, with later duplicates of a (text, category) pair dropped.
#[derive(Debug, Default)]
pub struct Aggregator {
    sources: Vec<CompletionSource>,
}

impl Aggregator {
    /// Create an aggregator over `sources`, in priority order
    pub fn new(sources: Vec<CompletionSource>) -> Self {
        Self { sources }
    }

    /// Append a source
    pub fn with_source(mut self, source: impl Into<CompletionSource>) -> Self {
        self.sources.push(source.into());
        self
    }

    /// Configured sources
    pub fn sources(&self) -> &[CompletionSource] {
        &self.sources
    }

    /// Complete `document` with every source.
    ///
    /// A source that panics contributes nothing; the others are unaffected.
    pub async fn complete(&self, document: &Document) -> Vec<Candidate> {
        let runs = self.sources.iter().map(|source| async move {
            match AssertUnwindSafe(source.complete(document)).catch_unwind().await {
                Ok(candidates) => {
                    trace!(source = source.name(), count = candidates.len(), "source completed");
                    candidates
                }
                Err(_) => {
                    error!(source = source.name(), "completion source panicked");
                    Vec::new()
                }
            }
        });

        merge(join_all(runs).await)
    }
}

/// Concatenate candidate streams, keeping the first of each (text, category) pair
pub fn merge<I>(streams: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = Vec<Candidate>>,
{
    let mut seen: HashSet<(String, Category)> = HashSet::new();
    let mut out = Vec::new();

    for candidate in streams.into_iter().flatten() {
        if seen.insert((candidate.text.clone(), candidate.category)) {
            out.push(candidate);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::completion::command_tree::CommandNode;
    use crate::completion::keyword_trie::KeywordTrie;
    use crate::completion::resource::{ResourceCache, StaticResources};
    use crate::completion::resource_completer::ResourceCompleter;

    fn candidate(text: &str, category: Category) -> Candidate {
        Candidate::new(text, "", category)
    }

    #[test]
    fn test_merge_keeps_first_seen() {
        let merged = merge(vec![
            vec![candidate("a", Category::Table), candidate("b", Category::Table)],
            vec![
                candidate("a", Category::Field),
                candidate("b", Category::Table).with_meta("second"),
                candidate("c", Category::Table),
            ],
        ]);

        let keys: Vec<_> = merged.iter().map(|c| (c.text.as_str(), c.category)).collect();
        assert_eq!(
            keys,
            vec![
                ("a", Category::Table),
                ("b", Category::Table),
                ("a", Category::Field),
                ("c", Category::Table)
            ]
        );
        assert!(merged[1].meta.is_none());
    }

    fn resources() -> ResourceCompleter {
        let provider: StaticResources = serde_json::from_str(
            r#"{"schemas": {"sales": {"tables": {"orders": ["id"]}}, "select_tests": {}}}"#,
        )
        .unwrap();
        let cache = ResourceCache::new(Arc::new(provider), Duration::from_secs(5));
        ResourceCompleter::new(Arc::new(cache))
    }

    #[tokio::test]
    async fn test_no_duplicate_pairs() {
        let aggregator = Aggregator::default()
            .with_source(KeywordTrie::for_grammar("ansi").unwrap())
            .with_source(KeywordTrie::for_grammar("bigquery").unwrap())
            .with_source(resources());

        let out = aggregator.complete(&Document::at_end("sel")).await;
        let mut keys: Vec<_> = out.iter().map(|c| c.key()).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);

        assert_eq!(out[0].text, "SELECT");
        assert!(out
            .iter()
            .any(|c| c.text == "select_tests" && c.category == Category::Dataset));
    }

    #[tokio::test]
    async fn test_idempotent() {
        let root = CommandNode::group("app").subcommand(CommandNode::command("sales"));
        let aggregator = Aggregator::new(vec![
            CompletionSource::command_grammar(Arc::new(root)),
            resources().into(),
        ]);

        let document = Document::at_end("sa");
        let first = aggregator.complete(&document).await;
        let second = aggregator.complete(&document).await;
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn test_no_sources() {
        let out = Aggregator::default().complete(&Document::at_end("x")).await;
        assert!(out.is_empty());
    }
}
