//! Command tree consumed by the command grammar completer
//!
//! The tree is built once by the host and shared read-only; the engine only
//! ever holds `Arc` references into it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::candidate::{Candidate, Category};
use super::value_domain::ValueDomain;

/// A command or command group.
#[derive(Debug, Clone, Default)]
pub struct CommandNode {
    /// Canonical name
    pub name: String,
    /// Alternative names resolving to this command
    pub aliases: Vec<String>,
    /// Options and arguments, in declaration order
    pub params: Vec<Parameter>,
    /// Subcommands keyed by canonical name
    pub children: BTreeMap<String, Arc<CommandNode>>,
    /// Whether this node dispatches to subcommands
    pub is_group: bool,
    /// Whether subcommands compose on one line instead of replacing each other
    pub chains: bool,
    /// Excluded from suggestions, still reachable by exact name
    pub hidden: bool,
    /// One-line description shown next to the name
    pub short_help: Option<String>,
}

impl CommandNode {
    /// Create a leaf command
    pub fn command(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a command group
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_group: true,
            ..Self::default()
        }
    }

    /// Add an alias
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add a parameter
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Add a subcommand; turns the node into a group
    pub fn subcommand(mut self, child: CommandNode) -> Self {
        self.is_group = true;
        self.children.insert(child.name.clone(), Arc::new(child));
        self
    }

    /// Mark subcommands as chainable
    pub fn chained(mut self) -> Self {
        self.is_group = true;
        self.chains = true;
        self
    }

    /// Hide from suggestions
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Set the short help text
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.short_help = Some(help.into());
        self
    }

    /// Resolve a token to a child by exact name or alias.
    ///
    /// Hidden children resolve like any other.
    pub fn child(&self, token: &str) -> Option<&Arc<CommandNode>> {
        self.children.get(token).or_else(|| {
            self.children
                .values()
                .find(|child| child.aliases.iter().any(|alias| alias == token))
        })
    }

    /// Find the option that owns a surface form such as `-p` or `--project`
    pub fn option(&self, surface: &str) -> Option<&Parameter> {
        self.params
            .iter()
            .find(|param| param.is_option() && param.matches_surface(surface))
    }
}

/// Whether a parameter is named (`--opt`) or positional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Option,
    Argument,
}

/// How many value tokens a parameter takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueForm {
    /// Boolean switch, no value
    Flag,
    /// Exactly one value
    Single,
    /// A fixed number of values; for arguments, all remaining positionals
    Multiple(usize),
}

impl ValueForm {
    /// Number of value tokens following an option's surface form
    pub fn arity(&self) -> usize {
        match self {
            ValueForm::Flag => 0,
            ValueForm::Single => 1,
            ValueForm::Multiple(n) => (*n).max(1),
        }
    }
}

/// An option or argument of a command.
#[derive(Clone)]
pub struct Parameter {
    /// Parameter name (`project`)
    pub name: String,
    /// Named or positional
    pub kind: ParamKind,
    /// Value arity
    pub form: ValueForm,
    /// Short surface form (`-p`)
    pub short: Option<String>,
    /// Long surface form (`--project`)
    pub long: Option<String>,
    /// Source of value candidates
    pub provider: Option<Arc<dyn ValueProvider>>,
    /// Must be given
    pub required: bool,
    /// May be given more than once
    pub multiple: bool,
    /// Surface form is not suggested
    pub hidden: bool,
    /// Help text for the menu
    pub help: Option<String>,
    /// Default value shown in the menu
    pub default: Option<String>,
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("form", &self.form)
            .field("short", &self.short)
            .field("long", &self.long)
            .field("provider", &self.provider.is_some())
            .field("required", &self.required)
            .field("multiple", &self.multiple)
            .field("hidden", &self.hidden)
            .finish()
    }
}

impl Parameter {
    fn new(name: impl Into<String>, kind: ParamKind, form: ValueForm) -> Self {
        Self {
            name: name.into(),
            kind,
            form,
            short: None,
            long: None,
            provider: None,
            required: false,
            multiple: false,
            hidden: false,
            help: None,
            default: None,
        }
    }

    /// Option taking a single value; the long form is derived from the name
    pub fn option(name: impl Into<String>) -> Self {
        let name = name.into();
        let long = format!("--{name}");
        Self::new(name, ParamKind::Option, ValueForm::Single).long(long)
    }

    /// Boolean flag; the long form is derived from the name
    pub fn flag(name: impl Into<String>) -> Self {
        let name = name.into();
        let long = format!("--{name}");
        Self::new(name, ParamKind::Option, ValueForm::Flag).long(long)
    }

    /// Positional argument taking one value
    pub fn argument(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Argument, ValueForm::Single)
    }

    /// Set the short surface form
    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    /// Set the long surface form
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    /// Set the value arity
    pub fn form(mut self, form: ValueForm) -> Self {
        self.form = form;
        self
    }

    /// Attach a value provider
    pub fn provider(mut self, provider: impl ValueProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allow repetition
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Hide the surface form from suggestions
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Set the help text
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Set the displayed default
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Whether this is a named option
    pub fn is_option(&self) -> bool {
        self.kind == ParamKind::Option
    }

    /// Whether this option takes no value
    pub fn is_flag(&self) -> bool {
        self.form == ValueForm::Flag
    }

    /// Whether `token` is one of this parameter's surface forms
    pub fn matches_surface(&self, token: &str) -> bool {
        self.short.as_deref() == Some(token) || self.long.as_deref() == Some(token)
    }

    /// Surface form offered inline: the long form when there is one
    pub fn inline_surface(&self) -> Option<&str> {
        self.long.as_deref().or(self.short.as_deref())
    }

    /// Menu metadata: `[-s][flag][#][req|opt][default=..] help`
    pub fn display_meta(&self) -> String {
        let flag = if self.is_flag() { "[flag]" } else { "" };
        let multiple = if self.multiple { "[#]" } else { "" };
        let required = if self.required { "[req]" } else { "[opt]" };
        let default = self
            .default
            .as_ref()
            .map(|d| format!("[default={d}]"))
            .unwrap_or_default();
        let help = self.help.as_deref().unwrap_or("");

        let mut meta = format!("{flag}{multiple}{required}{default}");
        if !help.is_empty() {
            meta.push(' ');
            meta.push_str(help);
        }

        // The short form is only shown when a long form is what gets inserted
        match (&self.short, &self.long) {
            (Some(short), Some(_)) => format!("[{short}]{meta}"),
            _ => meta,
        }
    }
}

/// What a value provider sees when asked for candidates.
#[derive(Debug, Clone, Copy)]
pub struct ValueRequest<'a> {
    /// Command owning the parameter
    pub command: &'a CommandNode,
    /// Tokens of the command's segment, after its name
    pub args: &'a [String],
    /// Every complete token before the cursor
    pub tokens: &'a [String],
    /// The token being typed, quotes removed
    pub incomplete: &'a str,
}

impl ValueRequest<'_> {
    /// Values already given for the option named `name` in this segment
    pub fn option_values(&self, name: &str) -> Vec<&str> {
        let Some(param) = self
            .command
            .params
            .iter()
            .find(|p| p.is_option() && p.name == name)
        else {
            return Vec::new();
        };

        let arity = param.form.arity();
        let mut values = Vec::new();
        let mut i = 0;
        while i < self.args.len() {
            if param.matches_surface(&self.args[i]) {
                values.extend(self.args.iter().skip(i + 1).take(arity).map(String::as_str));
                i += arity;
            }
            i += 1;
        }
        values
    }
}

/// One value suggested by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueItem {
    /// Value to insert
    pub value: String,
    /// Help shown next to the value
    pub help: Option<String>,
    /// Category tag
    pub category: Category,
}

impl ValueItem {
    /// Plain value
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            help: None,
            category: Category::Value,
        }
    }

    /// Attach help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Override the category
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Turn into a candidate replacing `replaced`
    pub fn into_candidate(self, replaced: &str) -> Candidate {
        let candidate = Candidate::new(self.value, replaced, self.category);
        match self.help {
            Some(help) => candidate.with_meta(help),
            None => candidate,
        }
    }
}

/// Pluggable source of parameter values.
///
/// Providers receive the token being typed and do their own matching.
pub trait ValueProvider: Send + Sync {
    /// Values to suggest for the parameter
    fn values(&self, request: &ValueRequest<'_>) -> Vec<ValueItem>;
}

impl<F> ValueProvider for F
where
    F: Fn(&ValueRequest<'_>) -> Vec<ValueItem> + Send + Sync,
{
    fn values(&self, request: &ValueRequest<'_>) -> Vec<ValueItem> {
        self(request)
    }
}

/// Fixed set of choices, prefix-matched.
///
/// Choices containing whitespace are inserted double-quoted.
#[derive(Debug, Clone)]
pub struct Choices(pub Vec<String>);

impl Choices {
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(choices.into_iter().map(Into::into).collect())
    }
}

impl ValueProvider for Choices {
    fn values(&self, request: &ValueRequest<'_>) -> Vec<ValueItem> {
        let needle = strip_quotes(request.incomplete);
        self.0
            .iter()
            .filter(|choice| choice.starts_with(&needle))
            .map(|choice| ValueItem::new(quote(choice)))
            .collect()
    }
}

/// Project names from the secondary value domain.
///
/// Projects already named in the segment are not offered again.
pub struct ProjectNames {
    domain: Arc<dyn ValueDomain>,
}

impl ProjectNames {
    pub fn new(domain: Arc<dyn ValueDomain>) -> Self {
        Self { domain }
    }
}

impl ValueProvider for ProjectNames {
    fn values(&self, request: &ValueRequest<'_>) -> Vec<ValueItem> {
        let needle = request.incomplete.to_lowercase();
        let mut names = self.domain.project_names();
        names.sort();
        names
            .into_iter()
            .filter(|name| name.to_lowercase().starts_with(&needle))
            .filter(|name| !request.args.contains(name))
            .map(|name| ValueItem::new(name).with_category(Category::Project))
            .collect()
    }
}

/// Notes of the project given by a sibling parameter of the same segment.
///
/// The project is looked up as the value of option `project_option`, or,
/// failing that, as any segment token naming a known project.
pub struct ProjectNotes {
    domain: Arc<dyn ValueDomain>,
    project_option: String,
}

impl ProjectNotes {
    pub fn new(domain: Arc<dyn ValueDomain>, project_option: impl Into<String>) -> Self {
        Self {
            domain,
            project_option: project_option.into(),
        }
    }

    fn project(&self, request: &ValueRequest<'_>) -> Option<String> {
        if let Some(value) = request.option_values(&self.project_option).last() {
            return Some((*value).to_string());
        }
        let known = self.domain.project_names();
        request
            .args
            .iter()
            .find(|arg| known.contains(arg))
            .cloned()
    }
}

impl ValueProvider for ProjectNotes {
    fn values(&self, request: &ValueRequest<'_>) -> Vec<ValueItem> {
        let Some(project) = self.project(request) else {
            return Vec::new();
        };
        let needle = strip_quotes(request.incomplete).to_lowercase();
        self.domain
            .notes_for(&project)
            .into_iter()
            .filter(|note| strip_quotes(note).to_lowercase().contains(&needle))
            .map(|note| {
                ValueItem::new(quote(&note))
                    .with_help(format!("project: {project}"))
                    .with_category(Category::Note)
            })
            .collect()
    }
}

fn strip_quotes(s: &str) -> String {
    s.chars().filter(|c| *c != '"' && *c != '\'').collect()
}

fn quote(s: &str) -> String {
    if s.chars().any(char::is_whitespace) {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::value_domain::StaticValueDomain;

    fn domain() -> Arc<dyn ValueDomain> {
        Arc::new(
            StaticValueDomain::default()
                .with_project("alpha", ["fix login bug", "review"])
                .with_project("beta", ["planning"]),
        )
    }

    fn request<'a>(cmd: &'a CommandNode, args: &'a [String], incomplete: &'a str) -> ValueRequest<'a> {
        ValueRequest {
            command: cmd,
            args,
            tokens: args,
            incomplete,
        }
    }

    #[test]
    fn test_child_by_name_and_alias() {
        let root = CommandNode::group("app")
            .subcommand(CommandNode::command("timer").alias("t"))
            .subcommand(CommandNode::command("secret").hidden());

        assert_eq!(root.child("timer").map(|c| c.name.as_str()), Some("timer"));
        assert_eq!(root.child("t").map(|c| c.name.as_str()), Some("timer"));
        assert_eq!(root.child("secret").map(|c| c.name.as_str()), Some("secret"));
        assert!(root.child("tim").is_none());
    }

    #[test]
    fn test_display_meta() {
        let p = Parameter::flag("billable").short("-b").help("Billable time");
        assert_eq!(p.display_meta(), "[-b][flag][opt] Billable time");

        let p = Parameter::option("project").required().multiple();
        assert_eq!(p.display_meta(), "[#][req]");

        let p = Parameter::option("limit").default_value("10");
        assert_eq!(p.display_meta(), "[opt][default=10]");
    }

    #[test]
    fn test_inline_surface_prefers_long() {
        let p = Parameter::option("project").short("-p");
        assert_eq!(p.inline_surface(), Some("--project"));
        assert!(p.matches_surface("-p"));
        assert!(p.matches_surface("--project"));
    }

    #[test]
    fn test_option_values() {
        let cmd = CommandNode::command("add").param(Parameter::option("project").short("-p"));
        let args: Vec<String> = ["-p", "alpha", "x", "--project", "beta"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let req = request(&cmd, &args, "");
        assert_eq!(req.option_values("project"), vec!["alpha", "beta"]);
        assert!(req.option_values("missing").is_empty());
    }

    #[test]
    fn test_choices_prefix() {
        let cmd = CommandNode::command("c");
        let values = Choices::new(["json", "table", "jsonl"]).values(&request(&cmd, &[], "js"));
        let values: Vec<_> = values.into_iter().map(|v| v.value).collect();
        assert_eq!(values, vec!["json", "jsonl"]);
    }

    #[test]
    fn test_choices_quote_whitespace() {
        let cmd = CommandNode::command("c");
        let choices = Choices::new(["today", "last week", "last month"]);

        let values: Vec<_> = choices
            .values(&request(&cmd, &[], "last w"))
            .into_iter()
            .map(|v| v.value)
            .collect();
        assert_eq!(values, vec!["\"last week\""]);

        let values: Vec<_> = choices
            .values(&request(&cmd, &[], "\"last"))
            .into_iter()
            .map(|v| v.value)
            .collect();
        assert_eq!(values, vec!["\"last week\"", "\"last month\""]);

        let values: Vec<_> = choices
            .values(&request(&cmd, &[], "to"))
            .into_iter()
            .map(|v| v.value)
            .collect();
        assert_eq!(values, vec!["today"]);
    }

    #[test]
    fn test_project_notes_scoped_by_option() {
        let cmd = CommandNode::command("add").param(Parameter::option("project"));
        let args: Vec<String> = vec!["--project".into(), "alpha".into()];
        let notes = ProjectNotes::new(domain(), "project").values(&request(&cmd, &args, "LOG"));

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].value, "\"fix login bug\"");
        assert_eq!(notes[0].category, Category::Note);
        assert_eq!(notes[0].help.as_deref(), Some("project: alpha"));
    }

    #[test]
    fn test_project_notes_without_project() {
        let cmd = CommandNode::command("add");
        let notes = ProjectNotes::new(domain(), "project").values(&request(&cmd, &[], ""));
        assert!(notes.is_empty());
    }

    #[test]
    fn test_project_names_skip_already_given() {
        let cmd = CommandNode::command("archive");
        let args: Vec<String> = vec!["alpha".into()];
        let names = ProjectNames::new(domain()).values(&request(&cmd, &args, ""));
        let names: Vec<_> = names.into_iter().map(|v| v.value).collect();
        assert_eq!(names, vec!["beta"]);
    }

    #[test]
    fn test_closure_provider() {
        let provider = |req: &ValueRequest<'_>| vec![ValueItem::new(format!("{}!", req.incomplete))];
        let cmd = CommandNode::command("c");
        let values = provider.values(&request(&cmd, &[], "hi"));
        assert_eq!(values[0].value, "hi!");
    }
}
