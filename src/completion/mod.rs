//! Context-aware completion engine
//!
//! The engine turns a [`Document`] (input text plus cursor) into a list of
//! [`Candidate`]s. Three kinds of source take part:
//!
//! - the command grammar: [`tokenizer`] splits the input, [`context`] walks
//!   the [`CommandNode`] tree and [`generator`] proposes options, values and
//!   subcommands for the command under the cursor
//! - a [`KeywordTrie`] for nested keyword grammars such as SQL clauses
//! - a [`ResourceCompleter`] over schemas, tables, routines and fields, backed
//!   by a [`ResourceCache`] that fetches each level once
//!
//! The [`Aggregator`] runs the configured sources and merges their output;
//! the [`CompletionWorker`] runs the aggregator in the background and drops
//! results that a newer keystroke has made stale.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ledger_complete::completion::{
//!     Aggregator, CommandNode, CompletionSource, Document, KeywordTrie, Parameter,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let root = CommandNode::group("app").subcommand(
//!     CommandNode::command("add").param(Parameter::flag("billable")),
//! );
//! let aggregator = Aggregator::default()
//!     .with_source(CompletionSource::command_grammar(Arc::new(root)))
//!     .with_source(KeywordTrie::for_grammar("ansi").unwrap());
//!
//! let candidates = aggregator.complete(&Document::at_end("add --b")).await;
//! assert_eq!(candidates[0].text, "--billable");
//! # }
//! ```

pub mod aggregator;
pub mod candidate;
pub mod command_tree;
pub mod context;
pub mod document;
pub mod generator;
pub mod keyword_trie;
pub mod keywords;
pub mod resource;
pub mod resource_completer;
pub mod source;
pub mod tokenizer;
pub mod value_domain;
pub mod worker;

pub use aggregator::Aggregator;
pub use candidate::{Candidate, Category};
pub use command_tree::{
    Choices, CommandNode, ParamKind, Parameter, ProjectNames, ProjectNotes, ValueForm, ValueItem,
    ValueProvider, ValueRequest,
};
pub use context::{ContextResolver, ParsedContext, Resolution};
pub use document::Document;
pub use generator::CommandCandidateGenerator;
pub use keyword_trie::{KeywordEntry, KeywordTrie};
pub use resource::{FetchState, ResourceCache, ResourceKey, ResourceProvider, StaticResources};
pub use resource_completer::ResourceCompleter;
pub use source::{CommandCompleter, CompletionSource};
pub use tokenizer::{tokenize, Token};
pub use value_domain::{StaticValueDomain, ValueDomain};
pub use worker::{CompletionOutcome, CompletionWorker, PendingCompletion};
