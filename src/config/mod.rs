//! Configuration management for the completion engine
//!
//! Configuration is read from a TOML file. Every field has a default so a
//! partial (or missing) file is valid.
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::completion::KeywordTrie;
use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Completion engine configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionConfig {
    /// Keyword grammar used by the query completer (bigquery, ansi)
    #[serde(default = "default_keyword_grammar")]
    pub keyword_grammar: String,

    /// Upper bound for a single resource provider call, in milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// How long the interactive adapter waits for a result, in milliseconds
    #[serde(default = "default_interactive_wait_ms")]
    pub interactive_wait_ms: u64,

    /// Maximum number of characters of a note shown in the completion menu
    #[serde(default = "default_max_note_display")]
    pub max_note_display: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_keyword_grammar() -> String {
    "bigquery".to_string()
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_interactive_wait_ms() -> u64 {
    150
}

fn default_max_note_display() -> usize {
    45
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            keyword_grammar: default_keyword_grammar(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            interactive_wait_ms: default_interactive_wait_ms(),
            max_note_display: default_max_note_display(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the usual precedence.
    ///
    /// An explicit path must exist. Without one, the default path is used when
    /// present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ledger-complete")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// Misconfiguration fails here, at startup, never per keystroke.
    pub fn validate(&self) -> Result<()> {
        KeywordTrie::for_grammar(&self.completion.keyword_grammar)?;

        if self.completion.fetch_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "completion.fetch_timeout_ms".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Get the resource fetch timeout as Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.completion.fetch_timeout_ms)
    }

    /// Get the interactive wait budget as Duration
    pub fn interactive_wait(&self) -> Duration {
        Duration::from_millis(self.completion.interactive_wait_ms)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
