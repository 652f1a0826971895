//! Command candidate generation
//!
//! Given a resolved [`ParsedContext`] and the token being typed, produces
//! option names, parameter values and subcommand names. Suggestions are
//! scoped to the command the cursor is in; for chained groups that is the
//! last chain segment.

use super::candidate::{Candidate, Category};
use super::command_tree::{CommandNode, ParamKind, Parameter, ValueForm, ValueRequest};
use super::context::ParsedContext;

/// Where an option stands within a segment's tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionState {
    /// Not given yet
    Unused,
    /// Given with all its values
    Consumed,
    /// Given and still waiting for a value
    AwaitingValue,
}

/// Candidates produced for one command's parameters
enum ParamCompletions {
    /// An option is waiting for its value: only its values apply
    Values(Vec<Candidate>),
    /// Option names plus values of hidden/positional parameters
    Names(Vec<Candidate>),
}

/// Produces candidates for the command grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandCandidateGenerator;

impl CommandCandidateGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Candidates for `incomplete`, each replacing exactly that text
    pub fn candidates(&self, context: &ParsedContext, incomplete: &str) -> Vec<Candidate> {
        self.candidates_replacing(context, incomplete, incomplete)
    }

    /// Candidates for `incomplete`, each replacing the raw text `replaced`.
    ///
    /// `replaced` differs from `incomplete` when the token is quoted or escaped.
    pub fn candidates_replacing(
        &self,
        context: &ParsedContext,
        incomplete: &str,
        replaced: &str,
    ) -> Vec<Candidate> {
        let active = context.active();

        if active.chains {
            return self.chained(context, incomplete, replaced);
        }

        let scan = self.params(active, &context.args, &context.tokens, incomplete, replaced);
        match scan {
            ParamCompletions::Values(values) => values,
            ParamCompletions::Names(mut names) => {
                if active.is_group {
                    names.extend(self.subcommands(active, incomplete, replaced, |_| false));
                }
                names
            }
        }
    }

    fn chained(&self, context: &ParsedContext, incomplete: &str, replaced: &str) -> Vec<Candidate> {
        let group = context.active();

        let Some(segment) = context.current_segment() else {
            // No subcommand yet: the group's own parameters and its subcommands
            return match self.params(group, &context.args, &context.tokens, incomplete, replaced) {
                ParamCompletions::Values(values) => values,
                ParamCompletions::Names(mut names) => {
                    names.extend(self.subcommands(group, incomplete, replaced, |_| false));
                    names
                }
            };
        };

        let command = &segment.command;
        match self.params(command, &segment.args, &context.tokens, incomplete, replaced) {
            ParamCompletions::Values(values) => values,
            ParamCompletions::Names(mut names) => {
                // Until the subcommand just named has an argument, nothing else is offered
                if segment.args.is_empty() && !command.params.is_empty() {
                    return names;
                }
                names.extend(self.subcommands(group, incomplete, replaced, |name| {
                    context.segment_used(name)
                }));
                names
            }
        }
    }

    fn params(
        &self,
        command: &CommandNode,
        args: &[String],
        tokens: &[String],
        incomplete: &str,
        replaced: &str,
    ) -> ParamCompletions {
        let request = ValueRequest {
            command,
            args,
            tokens,
            incomplete,
        };
        let positionals = positional_count(command, args);
        let mut slot = 0usize;
        let mut names = Vec::new();

        for param in &command.params {
            match param.kind {
                ParamKind::Option => {
                    let state = option_state(param, args);
                    if state == OptionState::AwaitingValue {
                        return ParamCompletions::Values(values(param, &request, replaced));
                    }
                    // Hidden options keep their values reachable, never their name
                    if param.hidden {
                        names.extend(values(param, &request, replaced));
                        continue;
                    }
                    if state == OptionState::Consumed && !param.multiple {
                        continue;
                    }
                    if let Some(surface) = param.inline_surface() {
                        if surface.starts_with(incomplete) {
                            names.push(
                                Candidate::new(surface, replaced, Category::Option)
                                    .with_meta(param.display_meta()),
                            );
                        }
                    }
                }
                ParamKind::Argument => {
                    let width = match param.form {
                        ValueForm::Multiple(_) => usize::MAX,
                        ValueForm::Flag | ValueForm::Single => 1,
                    };
                    let owns_next = positionals >= slot && positionals - slot < width;
                    slot = slot.saturating_add(width);
                    if owns_next {
                        names.extend(values(param, &request, replaced));
                    }
                }
            }
        }

        ParamCompletions::Names(names)
    }

    fn subcommands(
        &self,
        group: &CommandNode,
        incomplete: &str,
        replaced: &str,
        exclude: impl Fn(&str) -> bool,
    ) -> Vec<Candidate> {
        let mut out = Vec::new();

        for child in group.children.values() {
            if child.hidden || exclude(&child.name) {
                continue;
            }

            if child.name.starts_with(incomplete) {
                let candidate = Candidate::new(child.name.as_str(), replaced, Category::Command);
                out.push(match &child.short_help {
                    Some(help) => candidate.with_meta(help.as_str()),
                    None => candidate,
                });
            } else if let Some(alias) = child.aliases.iter().find(|a| a.starts_with(incomplete)) {
                out.push(
                    Candidate::new(alias.as_str(), replaced, Category::Command)
                        .with_meta(format!("alias of {}", child.name)),
                );
            }
        }

        out
    }
}

fn values(param: &Parameter, request: &ValueRequest<'_>, replaced: &str) -> Vec<Candidate> {
    let Some(provider) = &param.provider else {
        return Vec::new();
    };
    provider
        .values(request)
        .into_iter()
        .filter(|item| !item.value.is_empty())
        .map(|item| item.into_candidate(replaced))
        .collect()
}

fn option_state(param: &Parameter, args: &[String]) -> OptionState {
    let Some(pos) = args.iter().rposition(|arg| param.matches_surface(arg)) else {
        return OptionState::Unused;
    };
    let given = args.len() - pos - 1;
    if given < param.form.arity() {
        OptionState::AwaitingValue
    } else {
        OptionState::Consumed
    }
}

/// Number of positional tokens: everything that is neither an option nor an option value
fn positional_count(command: &CommandNode, args: &[String]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if let Some(option) = command.option(arg) {
            i += option.form.arity();
        } else if !arg.starts_with('-') {
            count += 1;
        }
        i += 1;
    }
    count
}
