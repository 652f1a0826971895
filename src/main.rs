//! Ledger shell with context-aware completion
//!
//! An interactive timesheet shell whose only job is to show off the
//! completion engine: press Tab in command mode for commands, options and
//! project values, or switch to query mode for SQL keywords, schemas, tables,
//! fields, projects and notes.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode
//! ledger-complete
//!
//! # Print completions for a line and exit
//! ledger-complete --query complete "SELECT * FROM ledger."
//! ```

use ledger_complete::cli::CliInterface;
use ledger_complete::completion::{Document, tokenize};
use ledger_complete::error::Result;
use ledger_complete::repl::{Fixture, Mode, ReplEngine, ShellSources};
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or start the shell
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    let fixture = Fixture::load(cli.args().fixture.as_deref())?;
    let sources = ShellSources::new(cli.config(), fixture)?;
    let mode = if cli.args().query {
        Mode::Query
    } else {
        Mode::Command
    };

    if let Some(text) = cli.one_shot_text() {
        return print_completions(&sources, mode, text).await;
    }

    cli.print_banner();

    let mut repl = ReplEngine::new(
        sources,
        mode,
        cli.config().interactive_wait(),
        Handle::current(),
    );
    run_repl_loop(&mut repl)?;

    println!("Goodbye!");
    Ok(())
}

/// Print every candidate for `text` with the cursor at its end
async fn print_completions(sources: &ShellSources, mode: Mode, text: &str) -> Result<()> {
    let candidates = sources
        .for_mode(mode)
        .complete(&Document::at_end(text))
        .await;

    for candidate in candidates {
        let meta = candidate.meta.as_deref().unwrap_or("");
        println!("{}\t{}\t{}", candidate.text, candidate.category, meta);
    }
    Ok(())
}

/// Main REPL loop
fn run_repl_loop(repl: &mut ReplEngine) -> Result<()> {
    while let Some(line) = repl.read_line()? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match (repl.mode(), input) {
            (Mode::Command, "exit" | "quit") => break,
            (Mode::Command, "query") => {
                println!("Query mode: SQL keywords and resource names; '\\q' returns");
                repl.set_mode(Mode::Query);
            }
            (Mode::Query, "\\q" | "exit" | "quit") => repl.set_mode(Mode::Command),
            (Mode::Command, _) => echo_command(input),
            (Mode::Query, _) => println!("{}", input),
        }
    }

    Ok(())
}

/// Echo a command line as the tokens the completion engine sees
fn echo_command(input: &str) {
    println!("tokens: {:?}", tokenize(input));
}

/// Initialize logging based on configuration
///
/// `RUST_LOG` takes precedence over the configured level when set.
///
/// # Arguments
/// * `cli` - CLI interface with configuration
fn initialize_logging(cli: &CliInterface) {
    let logging = &cli.config().logging;
    let level = logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
