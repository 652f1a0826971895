use std::time::Duration;
use std::{fmt, io};

/// Crate-wide `Result` type using [`CompletionError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Top-level error type for the completion engine.
///
/// Only construction-time problems (configuration, grammar selection) and
/// resource fetches produce errors. Parsing of typed input never does.
#[derive(Debug)]
pub enum CompletionError {
    /// Configuration errors.
    Config(ConfigError),

    /// Keyword grammar selection errors.
    Grammar(GrammarError),

    /// Resource provider fetch errors.
    Fetch(FetchError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Errors raised while building a keyword grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// The grammar selector does not name a known grammar.
    UnknownSelector(String),
}

/// Errors raised by a resource provider fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The provider reported a failure.
    Provider(String),

    /// The provider did not answer in time.
    Timeout(Duration),

    /// The blocking fetch task died before producing a result.
    Aborted(String),
}

impl FetchError {
    /// Convenience constructor for provider implementations.
    pub fn provider(message: impl Into<String>) -> Self {
        FetchError::Provider(message.into())
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Config(e) => write!(f, "Configuration error: {e}"),
            CompletionError::Grammar(e) => write!(f, "Grammar error: {e}"),
            CompletionError::Fetch(e) => write!(f, "Fetch error: {e}"),
            CompletionError::Io(e) => write!(f, "I/O error: {e}"),
            CompletionError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UnknownSelector(name) => {
                write!(f, "Unknown keyword grammar: {name}")
            }
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Provider(msg) => write!(f, "Provider failed: {msg}"),
            FetchError::Timeout(after) => {
                write!(f, "Provider timed out after {}ms", after.as_millis())
            }
            FetchError::Aborted(msg) => write!(f, "Fetch aborted: {msg}"),
        }
    }
}

impl std::error::Error for CompletionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompletionError::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ConfigError {}
impl std::error::Error for GrammarError {}
impl std::error::Error for FetchError {}

/* ========================= Conversions to CompletionError ========================= */

impl From<io::Error> for CompletionError {
    fn from(err: io::Error) -> Self {
        CompletionError::Io(err)
    }
}

impl From<ConfigError> for CompletionError {
    fn from(err: ConfigError) -> Self {
        CompletionError::Config(err)
    }
}

impl From<GrammarError> for CompletionError {
    fn from(err: GrammarError) -> Self {
        CompletionError::Grammar(err)
    }
}

impl From<FetchError> for CompletionError {
    fn from(err: FetchError) -> Self {
        CompletionError::Fetch(err)
    }
}

impl From<toml::de::Error> for CompletionError {
    fn from(err: toml::de::Error) -> Self {
        CompletionError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<serde_json::Error> for CompletionError {
    fn from(err: serde_json::Error) -> Self {
        CompletionError::Generic(format!("Invalid fixture: {err}"))
    }
}

impl From<String> for CompletionError {
    fn from(msg: String) -> Self {
        CompletionError::Generic(msg)
    }
}

impl From<&str> for CompletionError {
    fn from(msg: &str) -> Self {
        CompletionError::Generic(msg.to_owned())
    }
}
