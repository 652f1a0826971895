//! Interactive shell around the completion engine
//!
//! This module provides:
//! - Line editing with reedline and a Tab-driven completion menu
//! - A command mode completing the demo command tree
//! - A query mode completing SQL keywords, resources, projects and notes

pub mod completer;
pub mod fixture;
pub mod prompt;
pub mod sample;

use std::sync::Arc;
use std::time::Duration;

use reedline::{
    ColumnarMenu, Emacs, KeyCode, KeyModifiers, MenuBuilder, Reedline, ReedlineEvent,
    ReedlineMenu, Signal, default_emacs_keybindings,
};
use tokio::runtime::Handle;
use tracing::debug;

use crate::completion::{
    Aggregator, CompletionSource, CompletionWorker, KeywordTrie, ResourceCache, ResourceCompleter,
    ResourceProvider, ValueDomain,
};
use crate::config::Config;
use crate::error::Result;

pub use completer::EngineCompleter;
pub use fixture::Fixture;
pub use prompt::LedgerPrompt;

const COMPLETION_MENU: &str = "completion_menu";

/// Input mode of the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Commands of the demo command tree
    #[default]
    Command,
    /// SQL with resource and project names
    Query,
}

/// Completion sources for both shell modes.
///
/// Both modes share one value domain; the resource cache lives as long as the
/// sources do, so switching modes keeps whatever was fetched.
#[derive(Debug, Clone)]
pub struct ShellSources {
    command: Arc<Aggregator>,
    query: Arc<Aggregator>,
    cache: Arc<ResourceCache>,
}

impl ShellSources {
    /// Build the sources from configuration and fixture data
    ///
    /// # Arguments
    /// * `config` - Completion settings
    /// * `fixture` - Resources and projects to complete
    ///
    /// # Returns
    /// * `Result<Self>` - Sources, or an error for an unknown keyword grammar
    pub fn new(config: &Config, fixture: Fixture) -> Result<Self> {
        let domain: Arc<dyn ValueDomain> = Arc::new(fixture.projects);
        let provider: Arc<dyn ResourceProvider> = Arc::new(fixture.resources);
        let cache = Arc::new(ResourceCache::new(provider, config.fetch_timeout()));

        let tree = Arc::new(sample::command_tree(Arc::clone(&domain)));
        let command = Aggregator::default().with_source(CompletionSource::command_grammar(tree));

        let resources = ResourceCompleter::new(Arc::clone(&cache))
            .with_value_domain(domain)
            .with_max_note_display(config.completion.max_note_display);
        let query = Aggregator::default()
            .with_source(resources)
            .with_source(KeywordTrie::for_grammar(&config.completion.keyword_grammar)?);

        Ok(Self {
            command: Arc::new(command),
            query: Arc::new(query),
            cache,
        })
    }

    /// Aggregator serving `mode`
    pub fn for_mode(&self, mode: Mode) -> &Arc<Aggregator> {
        match mode {
            Mode::Command => &self.command,
            Mode::Query => &self.query,
        }
    }

    /// Resource cache shared by the query sources
    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }
}

/// Line editor bound to the sources of the current mode
pub struct ReplEngine {
    editor: Reedline,
    sources: ShellSources,
    mode: Mode,
    wait: Duration,
    runtime: Handle,
}

impl ReplEngine {
    /// Create a new REPL engine
    ///
    /// # Arguments
    /// * `sources` - Completion sources for both modes
    /// * `mode` - Initial mode
    /// * `wait` - How long a completion request may take before the menu gives up
    /// * `runtime` - Runtime completion requests run on
    pub fn new(sources: ShellSources, mode: Mode, wait: Duration, runtime: Handle) -> Self {
        let editor = build_editor(sources.for_mode(mode), wait, &runtime);
        Self {
            editor,
            sources,
            mode,
            wait,
            runtime,
        }
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch to `mode`, rebinding the completion menu
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        debug!(?mode, "switching shell mode");
        self.editor = build_editor(self.sources.for_mode(mode), self.wait, &self.runtime);
        self.mode = mode;
    }

    /// Read one line of input
    ///
    /// # Returns
    /// * `Result<Option<String>>` - The line, an empty line on Ctrl-C, `None` on end of input
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let prompt = LedgerPrompt::new(self.mode);
        match self.editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => Ok(Some(line)),
            Ok(Signal::CtrlC) => Ok(Some(String::new())),
            Ok(_) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn build_editor(aggregator: &Arc<Aggregator>, wait: Duration, runtime: &Handle) -> Reedline {
    let worker = Arc::new(CompletionWorker::new(Arc::clone(aggregator), runtime.clone()));
    let completer = Box::new(EngineCompleter::new(worker, runtime.clone(), wait));
    let menu = Box::new(ColumnarMenu::default().with_name(COMPLETION_MENU));

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );

    Reedline::create()
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_edit_mode(Box::new(Emacs::new(keybindings)))
}
