//! Prompt for the demo shell

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

use super::Mode;

/// Prompt showing the current input mode
pub struct LedgerPrompt {
    mode: Mode,
}

impl LedgerPrompt {
    /// Create a prompt for `mode`
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }
}

impl Prompt for LedgerPrompt {
    fn render_prompt_left(&self) -> std::borrow::Cow<'_, str> {
        match self.mode {
            Mode::Command => "ledger> ".into(),
            Mode::Query => "ledger (query)> ".into(),
        }
    }

    fn render_prompt_right(&self) -> std::borrow::Cow<'_, str> {
        "".into()
    }

    /// Indicator is part of the left prompt
    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> std::borrow::Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> std::borrow::Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_follows_mode() {
        assert_eq!(LedgerPrompt::new(Mode::Command).render_prompt_left(), "ledger> ");
        assert_eq!(LedgerPrompt::new(Mode::Query).render_prompt_left(), "ledger (query)> ");
    }

    #[test]
    fn test_indicator_empty() {
        let prompt = LedgerPrompt::new(Mode::Command);
        assert_eq!(prompt.render_prompt_indicator(PromptEditMode::Default), "");
        assert_eq!(prompt.render_prompt_right(), "");
    }
}
