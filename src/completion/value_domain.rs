//! Secondary value domain: projects and their notes
//!
//! Backed by an in-memory store that is synchronised outside the engine, so
//! calls are cheap and never fail.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::Deserialize;

/// Source of project names and per-project notes.
pub trait ValueDomain: Send + Sync {
    /// Notes recorded for `project`
    fn notes_for(&self, project: &str) -> Vec<String>;

    /// Every known project name
    fn project_names(&self) -> Vec<String>;
}

/// Value domain held in memory, replaceable at runtime.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<String>>")]
pub struct StaticValueDomain {
    projects: RwLock<BTreeMap<String, Vec<String>>>,
}

impl StaticValueDomain {
    /// Add a project with its notes
    pub fn with_project<I, S>(self, project: impl Into<String>, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_notes(project, notes);
        self
    }

    /// Replace the notes of a project, creating it if needed
    pub fn set_notes<I, S>(&self, project: impl Into<String>, notes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut projects = self
            .projects
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        projects.insert(project.into(), notes.into_iter().map(Into::into).collect());
    }
}

impl From<BTreeMap<String, Vec<String>>> for StaticValueDomain {
    fn from(projects: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            projects: RwLock::new(projects),
        }
    }
}

impl ValueDomain for StaticValueDomain {
    fn notes_for(&self, project: &str) -> Vec<String> {
        self.projects
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(project)
            .cloned()
            .unwrap_or_default()
    }

    fn project_names(&self) -> Vec<String> {
        self.projects
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_for_known_and_unknown_project() {
        let domain = StaticValueDomain::default().with_project("alpha", ["one", "two"]);
        assert_eq!(domain.notes_for("alpha"), vec!["one", "two"]);
        assert!(domain.notes_for("zeta").is_empty());
    }

    #[test]
    fn test_set_notes_replaces() {
        let domain = StaticValueDomain::default().with_project("alpha", ["one"]);
        domain.set_notes("alpha", ["three"]);
        domain.set_notes("beta", Vec::<String>::new());
        assert_eq!(domain.notes_for("alpha"), vec!["three"]);
        assert_eq!(domain.project_names(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_deserialize_from_map() {
        let domain: StaticValueDomain =
            serde_json::from_str(r#"{"alpha": ["x"], "beta": []}"#).unwrap();
        assert_eq!(domain.project_names(), vec!["alpha", "beta"]);
        assert_eq!(domain.notes_for("alpha"), vec!["x"]);
    }
}
