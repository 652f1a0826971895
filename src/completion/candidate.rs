//! Completion candidate value type

use std::fmt;

/// What kind of thing a candidate names.
///
/// Part of the deduplication key: the same text may legitimately appear once
/// as a table and once as a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Subcommand name
    Command,
    /// Option surface form (`--name`)
    Option,
    /// Parameter value from a value provider
    Value,
    /// Grammar keyword
    Keyword,
    /// Top-level schema
    Dataset,
    /// Table inside a schema
    Table,
    /// Routine inside a schema
    Routine,
    /// Field of a table
    Field,
    /// Project name from the secondary value domain
    Project,
    /// Note attached to a project
    Note,
}

impl Category {
    /// Upper-case tag shown next to a candidate
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Command => "COMMAND",
            Category::Option => "OPTION",
            Category::Value => "VALUE",
            Category::Keyword => "KEYWORD",
            Category::Dataset => "DATASET",
            Category::Table => "TABLE",
            Category::Routine => "ROUTINE",
            Category::Field => "FIELD",
            Category::Project => "PROJECT",
            Category::Note => "NOTE",
        }
    }

    /// Default style hint for the category
    pub fn default_style(&self) -> Option<&'static str> {
        match self {
            Category::Dataset => Some("fg:#f3aa61"),
            Category::Table => Some("fg:#ceaafb"),
            Category::Routine => Some("fg:#f08375"),
            Category::Project | Category::Note => Some("fg:#239551"),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One suggested completion.
///
/// `start_position` is zero or negative: the number of characters before the
/// cursor that `text` replaces, negated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Text to insert
    pub text: String,
    /// Replacement start, relative to the cursor, in characters
    pub start_position: isize,
    /// Label shown in the menu
    pub display: String,
    /// Secondary text shown next to the label
    pub meta: Option<String>,
    /// Kind of thing this candidate names
    pub category: Category,
    /// Free-form style hint (`fg:#rrggbb`)
    pub style: Option<String>,
}

impl Candidate {
    /// Create a candidate replacing `replaced` characters before the cursor
    pub fn new(text: impl Into<String>, replaced: &str, category: Category) -> Self {
        let text = text.into();
        Self {
            display: text.clone(),
            text,
            start_position: -char_len(replaced),
            meta: None,
            category,
            style: category.default_style().map(str::to_string),
        }
    }

    /// Attach secondary text
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        let meta = meta.into();
        self.meta = if meta.is_empty() { None } else { Some(meta) };
        self
    }

    /// Override the menu label
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    /// Override the style hint
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Number of characters replaced before the cursor
    pub fn replaced_chars(&self) -> usize {
        self.start_position.unsigned_abs()
    }

    /// Deduplication key
    pub fn key(&self) -> (&str, Category) {
        (&self.text, self.category)
    }
}

fn char_len(s: &str) -> isize {
    isize::try_from(s.chars().count()).unwrap_or(isize::MAX)
}
