//! Context-aware completion engine
//!
//! This library computes completion candidates for an interactive shell from
//! three kinds of sources and merges them into one deduplicated list:
//!
//! - a hierarchical command grammar (commands, options, values, chained subcommands)
//! - a SQL keyword grammar held in a prefix trie
//! - a lazily fetched schema/table/field hierarchy plus project names and notes
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `completion`: The completion engine
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `repl`: Interactive shell built on reedline
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ledger_complete::completion::{
//!     Aggregator, Document, ResourceCache, ResourceCompleter, StaticResources,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let resources: StaticResources = serde_json::from_str(
//!         r#"{"schemas": {"sales": {"tables": {"orders": ["id", "total"]}}}}"#,
//!     )
//!     .unwrap();
//!     let cache = ResourceCache::new(Arc::new(resources), Duration::from_secs(5));
//!     let aggregator =
//!         Aggregator::default().with_source(ResourceCompleter::new(Arc::new(cache)));
//!
//!     for candidate in aggregator.complete(&Document::at_end("SELECT * FROM sales.o")).await {
//!         println!("{} {}", candidate.text, candidate.category);
//!     }
//! }
//! ```

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod repl;

// Re-export commonly used types
pub use completion::{Aggregator, Candidate, Category, CompletionWorker, Document};
pub use config::Config;
pub use error::{CompletionError, Result};
pub use repl::{Mode, ReplEngine, ShellSources};
