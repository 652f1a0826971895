//! Command tree of the demo shell

use std::sync::Arc;

use crate::completion::{
    Choices, CommandNode, Parameter, ProjectNames, ProjectNotes, ValueDomain, ValueForm,
};

const DATES: [&str; 4] = ["today", "yesterday", "monday", "last week"];

/// Build the demo command tree.
///
/// Project and note values come from `domain`.
pub fn command_tree(domain: Arc<dyn ValueDomain>) -> CommandNode {
    CommandNode::group("ledger")
        .param(Parameter::flag("debug").hidden())
        .subcommand(timer(&domain))
        .subcommand(project(&domain))
        .subcommand(summary())
        .subcommand(
            CommandNode::group("config")
                .help("Show or change settings")
                .subcommand(CommandNode::command("show").help("Print settings"))
                .subcommand(
                    CommandNode::command("set")
                        .help("Change a setting")
                        .param(Parameter::argument("key").provider(Choices::new([
                            "keyword_grammar",
                            "fetch_timeout_ms",
                            "interactive_wait_ms",
                            "max_note_display",
                        ])))
                        .param(Parameter::argument("value")),
                ),
        )
        .subcommand(CommandNode::command("query").help("Switch to query mode"))
        .subcommand(CommandNode::command("exit").alias("quit").help("Leave the shell"))
}

fn project_option(domain: &Arc<dyn ValueDomain>) -> Parameter {
    Parameter::option("project")
        .short("-p")
        .help("Project name")
        .provider(ProjectNames::new(Arc::clone(domain)))
}

fn note_option(domain: &Arc<dyn ValueDomain>) -> Parameter {
    Parameter::option("note")
        .short("-n")
        .help("Note for the entry")
        .provider(ProjectNotes::new(Arc::clone(domain), "project"))
}

fn timer(domain: &Arc<dyn ValueDomain>) -> CommandNode {
    CommandNode::group("timer")
        .alias("t")
        .help("Track time entries")
        .subcommand(
            CommandNode::command("add")
                .help("Insert a finished entry")
                .param(project_option(domain).required())
                .param(note_option(domain))
                .param(
                    Parameter::option("start")
                        .short("-s")
                        .provider(Choices::new(DATES)),
                )
                .param(Parameter::option("end").short("-e").provider(Choices::new(DATES)))
                .param(Parameter::flag("billable").short("-b").help("Billable time"))
                .param(Parameter::option("tag").multiple().help("Free-form tag")),
        )
        .subcommand(
            CommandNode::command("run")
                .help("Start a new entry")
                .param(project_option(domain).default_value("no-project"))
                .param(note_option(domain))
                .param(Parameter::flag("billable").short("-b")),
        )
        .subcommand(CommandNode::command("stop").help("Stop the running entry"))
        .subcommand(CommandNode::command("pause").help("Pause the running entry"))
        .subcommand(CommandNode::command("resume").help("Resume a paused entry"))
        .subcommand(
            CommandNode::command("list")
                .alias("ls")
                .help("List entries")
                .param(
                    Parameter::option("date")
                        .short("-d")
                        .provider(Choices::new(DATES)),
                )
                .param(Parameter::flag("all").short("-a")),
        )
        .subcommand(
            CommandNode::command("purge")
                .hidden()
                .param(Parameter::flag("yes").short("-y")),
        )
}

fn project(domain: &Arc<dyn ValueDomain>) -> CommandNode {
    CommandNode::group("project")
        .alias("p")
        .help("Manage projects")
        .subcommand(
            CommandNode::command("create")
                .help("Create a project")
                .param(Parameter::argument("name"))
                .param(Parameter::option("description").help("Project description")),
        )
        .subcommand(CommandNode::command("list").help("List projects"))
        .subcommand(
            CommandNode::command("archive")
                .help("Archive projects")
                .param(
                    Parameter::argument("names")
                        .form(ValueForm::Multiple(0))
                        .provider(ProjectNames::new(Arc::clone(domain))),
                ),
        )
}

fn summary() -> CommandNode {
    let range = |command: CommandNode| {
        command
            .param(Parameter::option("start").short("-s").provider(Choices::new(DATES)))
            .param(Parameter::option("end").short("-e").provider(Choices::new(DATES)))
    };

    CommandNode::group("summary")
        .chained()
        .help("Summarise entries")
        .param(Parameter::flag("round").help("Round to quarter hours"))
        .subcommand(range(CommandNode::command("table")).help("Print a table"))
        .subcommand(
            range(CommandNode::command("csv"))
                .help("Write CSV")
                .param(Parameter::option("output").short("-o")),
        )
        .subcommand(
            range(CommandNode::command("json"))
                .help("Write JSON")
                .param(Parameter::option("orient").provider(Choices::new([
                    "records", "columns", "index",
                ]))),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CommandCompleter, Document, StaticValueDomain};

    fn completer() -> CommandCompleter {
        let domain = StaticValueDomain::default()
            .with_project("apollo", ["deploy window", "retro"])
            .with_project("zephyr", ["kickoff"]);
        CommandCompleter::new(Arc::new(command_tree(Arc::new(domain))))
    }

    fn texts(text: &str) -> Vec<String> {
        completer()
            .complete(&Document::at_end(text))
            .into_iter()
            .map(|c| c.text)
            .collect()
    }

    #[test]
    fn test_top_level() {
        assert_eq!(
            texts(""),
            vec!["config", "exit", "project", "query", "summary", "timer"]
        );
        assert_eq!(texts("qu"), vec!["quit", "query"]);
    }

    #[test]
    fn test_project_values() {
        assert_eq!(texts("timer add --project "), vec!["apollo", "zephyr"]);
        assert_eq!(texts("t add -p z"), vec!["zephyr"]);
    }

    #[test]
    fn test_notes_follow_project() {
        assert_eq!(
            texts("timer add -p apollo --note dep"),
            vec!["\"deploy window\""]
        );
    }

    #[test]
    fn test_archive_takes_many_projects() {
        assert_eq!(texts("project archive apollo "), vec!["zephyr"]);
    }

    #[test]
    fn test_date_with_space_is_quoted() {
        assert_eq!(texts("summary table --start l"), vec!["\"last week\""]);
    }

    #[test]
    fn test_summary_chain() {
        assert_eq!(texts("summary table --start today csv -"), vec!["--start", "--end", "--output"]);
        assert_eq!(texts("summary table --start today "), vec!["--end", "csv", "json"]);
    }
}
