//! Command-line interface for the completion shell
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Subcommands that run without the interactive shell

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{Config, LogLevel};
use crate::error::Result;

/// Interactive shell with context-aware completion
#[derive(Parser, Debug)]
#[command(
    name = "ledger-complete",
    version,
    about = "Interactive timesheet shell with context-aware completion",
    long_about = "An interactive shell demonstrating context-aware completion over a command
tree, a SQL keyword grammar and a schema/table/field resource hierarchy."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// JSON fixture with resources and projects
    #[arg(short = 'f', long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Start in query mode (SQL keywords and resource names)
    #[arg(long)]
    pub query: bool,

    /// Keyword grammar for query mode (bigquery, ansi)
    #[arg(long, value_name = "NAME")]
    pub grammar: Option<String>,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Print completions for a line and exit
    Complete {
        /// Input text; the cursor is at its end
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// A configuration that fails validation is reported and replaced by the
    /// defaults; a grammar given on the command line must be valid.
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = match Config::load(args.config_file.as_deref()) {
            Ok(config) => config,
            Err(e) if args.config_file.is_none() => {
                eprintln!("Warning: Configuration validation failed: {}", e);
                eprintln!("Using default configuration instead.");
                Config::default()
            }
            Err(e) => return Err(e),
        };

        Self::apply_args_to_config(&mut config, args);
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI arguments to configuration
    ///
    /// # Arguments
    /// * `config` - Configuration to modify
    /// * `args` - Command-line arguments
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        if let Some(grammar) = &args.grammar {
            config.completion.keyword_grammar = grammar.clone();
        }

        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Explicit configuration file, if one was given
    pub fn config_path(&self) -> Option<&Path> {
        self.args.config_file.as_deref()
    }

    /// Handle subcommands that do not need the completion engine
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            Some(Commands::Complete { .. }) | None => Ok(false),
        }
    }

    /// Text passed to the `complete` subcommand
    pub fn one_shot_text(&self) -> Option<&str> {
        match &self.args.command {
            Some(Commands::Complete { text }) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("ledger-complete version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// # Arguments
    /// * `show` - Whether to show configuration
    /// * `validate` - Whether to validate configuration
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file();
        }

        if show {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("Configuration file does not exist, defaults apply");
            return;
        }

        match Config::from_file(&path) {
            Ok(_) => println!("Configuration is valid"),
            Err(e) => println!("Configuration is invalid: {}", e),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("{}", self.config.to_toml()?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.config_path()
            .map(Path::to_path_buf)
            .unwrap_or_else(Config::default_path)
    }

    /// Print banner with version and mode
    pub fn print_banner(&self) {
        if !self.args.quiet {
            let mode = if self.args.query { "query" } else { "command" };
            println!(
                "ledger-complete {} ({} mode, Tab to complete, 'exit' to quit)",
                env!("CARGO_PKG_VERSION"),
                mode
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(vec!["ledger-complete"]).unwrap();
        assert!(args.config_file.is_none());
        assert!(!args.query);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_with_flags() {
        let args =
            CliArgs::try_parse_from(vec!["ledger-complete", "--query", "--grammar", "ansi", "-q"])
                .unwrap();
        assert!(args.query);
        assert!(args.quiet);
        assert_eq!(args.grammar.as_deref(), Some("ansi"));
    }

    #[test]
    fn test_complete_subcommand() {
        let args = CliArgs::try_parse_from(vec!["ledger-complete", "complete", "timer a"]).unwrap();
        let cli = CliInterface {
            args,
            config: Config::default(),
        };
        assert_eq!(cli.one_shot_text(), Some("timer a"));
        assert!(!cli.handle_subcommand().unwrap());
    }

    #[test]
    fn test_args_override_config() {
        let args = CliArgs::try_parse_from(vec!["ledger-complete", "--grammar", "ansi", "--vv"])
            .unwrap();
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        assert_eq!(config.completion.keyword_grammar, "ansi");
        assert_eq!(config.logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_config_path_prefers_argument() {
        let args =
            CliArgs::try_parse_from(vec!["ledger-complete", "-c", "/tmp/ledger.toml"]).unwrap();
        let cli = CliInterface {
            args,
            config: Config::default(),
        };
        assert_eq!(cli.config_path(), Some(Path::new("/tmp/ledger.toml")));
        assert_eq!(cli.get_config_path(), PathBuf::from("/tmp/ledger.toml"));

        let cli = CliInterface {
            args: CliArgs::try_parse_from(vec!["ledger-complete"]).unwrap(),
            config: Config::default(),
        };
        assert_eq!(cli.get_config_path(), Config::default_path());
    }

    #[test]
    fn test_invalid_grammar_argument_fails() {
        let args =
            CliArgs::try_parse_from(vec!["ledger-complete", "--grammar", "cobol"]).unwrap();
        assert!(CliInterface::from_args(args).is_err());
    }
}
