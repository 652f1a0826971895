//! Error handling module for the completion engine.
//!
//! Typing never produces an error: malformed input degrades to a best-effort
//! result. Errors exist for three situations only:
//! - Misconfiguration detected at construction time (config, grammar selector)
//! - Resource provider fetch failures, which are recorded and logged
//! - I/O while loading configuration or fixtures
//!
//! # Example
//!
//! ```rust
//! use ledger_complete::error::{CompletionError, GrammarError, Result};
//!
//! fn select(name: &str) -> Result<()> {
//!     if name != "bigquery" {
//!         return Err(GrammarError::UnknownSelector(name.to_string()).into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(matches!(select("cobol"), Err(CompletionError::Grammar(_))));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{CompletionError, ConfigError, FetchError, GrammarError, Result};
