//! Static data behind the demo shell
//!
//! A fixture is a JSON document holding the resource hierarchy and the
//! projects with their notes:
//!
//! ```json
//! {
//!   "resources": {"schemas": {"ledger": {"tables": {"entries": ["id", "project"]}}}},
//!   "projects": {"apollo": ["deploy window"]}
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::completion::{StaticResources, StaticValueDomain};
use crate::error::{ConfigError, Result};

const DEMO: &str = r#"{
  "resources": {
    "schemas": {
      "ledger": {
        "tables": {
          "entries": ["id", "date", "project", "note", "timestamp_start", "timestamp_end", "is_billable", "paused", "hours"],
          "projects": ["name", "description", "default_billable", "created", "archived"]
        },
        "routines": ["add_entry", "archive_project", "summary_by_day"]
      },
      "ledger_archive": {
        "tables": {"entries_2023": ["id", "date", "project", "hours"]}
      }
    }
  },
  "projects": {
    "apollo": ["deploy window", "incident review", "retro"],
    "no-project": [],
    "zephyr": ["kickoff", "vendor call about the quarterly roadmap and budget"]
  }
}"#;

/// Resources and projects for the demo shell
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub resources: StaticResources,
    #[serde(default)]
    pub projects: StaticValueDomain,
}

impl Fixture {
    /// Load a fixture from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to the fixture
    ///
    /// # Returns
    /// * `Result<Fixture>` - Parsed fixture or error
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Built-in fixture used when none is given
    pub fn demo() -> Result<Self> {
        Ok(serde_json::from_str(DEMO)?)
    }

    /// Load `path` when given, the built-in fixture otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::demo(),
        }
    }
}
