//! Completer for reedline - bridges the completion worker to the line editor

use std::sync::Arc;
use std::time::Duration;

use nu_ansi_term::{Color, Style};
use reedline::{Completer, Span, Suggestion};
use tokio::runtime::Handle;
use tracing::debug;

use crate::completion::{Candidate, Category, CompletionOutcome, CompletionWorker, Document};

/// Reedline completer backed by a [`CompletionWorker`].
///
/// Reedline asks for suggestions synchronously. Each request is submitted to
/// the worker and awaited for a bounded time; a request still running after
/// that is left to finish in the background, where it warms the resource
/// cache for the next keystroke.
pub struct EngineCompleter {
    worker: Arc<CompletionWorker>,
    runtime: Handle,
    wait: Duration,
}

impl EngineCompleter {
    /// Create a completer
    ///
    /// # Arguments
    /// * `worker` - Worker running the completion sources
    /// * `runtime` - Runtime the worker spawns on
    /// * `wait` - How long to wait for a result per request
    pub fn new(worker: Arc<CompletionWorker>, runtime: Handle, wait: Duration) -> Self {
        Self {
            worker,
            runtime,
            wait,
        }
    }
}

impl Completer for EngineCompleter {
    /// Complete the input at the given cursor position
    ///
    /// # Arguments
    /// * `line` - The input line
    /// * `pos` - Cursor position (byte index)
    ///
    /// # Returns
    /// * `Vec<Suggestion>` - List of completion suggestions
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let document = Document::new(line, pos);
        let pos = document.cursor();
        let pending = self.worker.submit(document);
        let wait = self.wait;
        let runtime = self.runtime.clone();

        // block_in_place keeps the runtime's other workers free while we wait
        let outcome = tokio::task::block_in_place(|| {
            runtime.block_on(tokio::time::timeout(wait, pending.wait()))
        });

        match outcome {
            Ok(CompletionOutcome::Ready(candidates)) => candidates
                .into_iter()
                .map(|candidate| to_suggestion(line, pos, candidate))
                .collect(),
            Ok(CompletionOutcome::Superseded) => Vec::new(),
            Err(_) => {
                debug!(wait_ms = wait.as_millis() as u64, "completion not ready in time");
                Vec::new()
            }
        }
    }
}

/// Convert a candidate into a reedline suggestion replacing text up to `pos`
pub fn to_suggestion(line: &str, pos: usize, candidate: Candidate) -> Suggestion {
    let start = byte_start(line, pos, candidate.replaced_chars());
    let description = describe(&candidate);
    let style = candidate.style.as_deref().and_then(parse_style);

    Suggestion {
        value: candidate.text,
        description,
        style,
        span: Span::new(start, pos),
        append_whitespace: false,
        ..Default::default()
    }
}

fn describe(candidate: &Candidate) -> Option<String> {
    let label = (candidate.display != candidate.text).then_some(candidate.display.as_str());
    let meta = candidate.meta.as_deref();

    let text = match candidate.category {
        Category::Dataset
        | Category::Table
        | Category::Routine
        | Category::Field
        | Category::Project
        | Category::Note => {
            let tag = candidate.category.tag();
            match meta {
                Some(meta) => format!("{tag}:{meta}"),
                None => tag.to_string(),
            }
        }
        _ => meta.unwrap_or_default().to_string(),
    };

    match (label, text.is_empty()) {
        (Some(label), true) => Some(label.to_string()),
        (Some(label), false) => Some(format!("{label}  {text}")),
        (None, true) => None,
        (None, false) => Some(text),
    }
}

/// Byte offset `chars` characters before `pos`
fn byte_start(line: &str, pos: usize, chars: usize) -> usize {
    if chars == 0 {
        return pos;
    }
    line[..pos]
        .char_indices()
        .rev()
        .nth(chars - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Parse a `fg:#rrggbb` style hint
fn parse_style(hint: &str) -> Option<Style> {
    let hex = hint.strip_prefix("fg:#")?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some(Style::new().fg(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{Aggregator, CommandNode, CompletionSource, Parameter};

    fn create_test_completer() -> EngineCompleter {
        let root = CommandNode::group("app")
            .subcommand(CommandNode::command("timer").param(Parameter::flag("billable")));
        let aggregator = Aggregator::default().with_source(CompletionSource::command_grammar(
            Arc::new(root),
        ));
        let worker = CompletionWorker::new(Arc::new(aggregator), Handle::current());
        EngineCompleter::new(Arc::new(worker), Handle::current(), Duration::from_secs(2))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_complete_with_prefix() {
        let mut completer = create_test_completer();
        let suggestions = completer.complete("tim", 3);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].value, "timer");
        assert_eq!(suggestions[0].span, Span::new(0, 3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_span_position() {
        let mut completer = create_test_completer();
        let suggestions = completer.complete("timer --b", 9);

        assert_eq!(suggestions[0].value, "--billable");
        assert_eq!(suggestions[0].span.start, 6);
        assert_eq!(suggestions[0].span.end, 9);
        assert_eq!(suggestions[0].description.as_deref(), Some("[flag][opt]"));
    }

    #[test]
    fn test_byte_start_multibyte() {
        // "héllo": replacing 4 chars before the end starts after 'h'
        assert_eq!(byte_start("héllo", 6, 4), 1);
        assert_eq!(byte_start("abc", 3, 0), 3);
        assert_eq!(byte_start("abc", 3, 10), 0);
    }

    #[test]
    fn test_parse_style() {
        assert_eq!(
            parse_style("fg:#f3aa61"),
            Some(Style::new().fg(Color::Rgb(0xf3, 0xaa, 0x61)))
        );
        assert_eq!(parse_style("bold"), None);
        assert_eq!(parse_style("fg:#zzzzzz"), None);
    }

    #[test]
    fn test_describe_resource_and_note() {
        let table = Candidate::new("orders", "", Category::Table).with_meta("sales");
        assert_eq!(describe(&table).as_deref(), Some("TABLE:sales"));

        let note = Candidate::new("\"a long note\"", "", Category::Note).with_display("a lo…");
        assert_eq!(describe(&note).as_deref(), Some("a lo…  NOTE"));

        let command = Candidate::new("timer", "", Category::Command);
        assert_eq!(describe(&command), None);
    }
}
