//! Completer sources run by the aggregator
//!
//! The set of sources is fixed: the command grammar, a keyword trie and the
//! resource hierarchy. Each turns a [`Document`] into candidates.

use std::sync::Arc;

use super::candidate::Candidate;
use super::command_tree::CommandNode;
use super::context::ContextResolver;
use super::document::Document;
use super::generator::CommandCandidateGenerator;
use super::keyword_trie::KeywordTrie;
use super::resource_completer::ResourceCompleter;
use super::tokenizer::tokenize_with_spans;

/// Completes input against a command tree.
#[derive(Debug)]
pub struct CommandCompleter {
    resolver: ContextResolver,
    generator: CommandCandidateGenerator,
}

impl CommandCompleter {
    /// Create a completer for the tree rooted at `root`
    pub fn new(root: Arc<CommandNode>) -> Self {
        Self {
            resolver: ContextResolver::new(root),
            generator: CommandCandidateGenerator::new(),
        }
    }

    /// The resolver, with its cache of the last resolution
    pub fn resolver(&self) -> &ContextResolver {
        &self.resolver
    }

    /// Candidates for the token under the cursor.
    ///
    /// A token touching the cursor is the one being typed; everything before
    /// it is resolved against the tree.
    pub fn complete(&self, document: &Document) -> Vec<Candidate> {
        let before = document.text_before_cursor();
        let mut tokens = tokenize_with_spans(before);

        let typing = tokens
            .last()
            .is_some_and(|token| token.span.end == before.len());
        let (incomplete, replaced) = match tokens.pop() {
            Some(token) if typing => (token.value, &before[token.span.start..]),
            Some(token) => {
                tokens.push(token);
                (String::new(), "")
            }
            None => (String::new(), ""),
        };

        let values: Vec<String> = tokens.into_iter().map(|token| token.value).collect();
        let resolution = self.resolver.resolve(&values);
        self.generator
            .candidates_replacing(resolution.context(), &incomplete, replaced)
    }
}

/// One completer source.
#[derive(Debug)]
pub enum CompletionSource {
    /// Command tree with options, arguments and subcommands
    CommandGrammar(CommandCompleter),
    /// Nested keyword grammar
    KeywordTrie(KeywordTrie),
    /// Schema, table, routine and field names
    ResourceHierarchy(ResourceCompleter),
}

impl CompletionSource {
    /// Command grammar source for the tree rooted at `root`
    pub fn command_grammar(root: Arc<CommandNode>) -> Self {
        CompletionSource::CommandGrammar(CommandCompleter::new(root))
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            CompletionSource::CommandGrammar(_) => "command_grammar",
            CompletionSource::KeywordTrie(_) => "keyword_trie",
            CompletionSource::ResourceHierarchy(_) => "resource_hierarchy",
        }
    }

    /// Produce candidates for `document`
    pub async fn complete(&self, document: &Document) -> Vec<Candidate> {
        match self {
            CompletionSource::CommandGrammar(completer) => completer.complete(document),
            CompletionSource::KeywordTrie(trie) => trie.complete(document),
            CompletionSource::ResourceHierarchy(completer) => completer.complete(document).await,
        }
    }
}

impl From<KeywordTrie> for CompletionSource {
    fn from(trie: KeywordTrie) -> Self {
        CompletionSource::KeywordTrie(trie)
    }
}

impl From<ResourceCompleter> for CompletionSource {
    fn from(completer: ResourceCompleter) -> Self {
        CompletionSource::ResourceHierarchy(completer)
    }
}

impl From<CommandCompleter> for CompletionSource {
    fn from(completer: CommandCompleter) -> Self {
        CompletionSource::CommandGrammar(completer)
    }
}
