//! Completion over the resource hierarchy and the project/note value domain
//!
//! The word before the cursor is read as a dotted reference:
//!
//! * `pre` completes schema names
//! * `schema.pre` completes tables and routines of `schema`
//! * `schema.table.pre` completes fields of `schema.table`
//!
//! Bare words also complete fields of every `schema.table` referenced
//! elsewhere in the input. Project names and notes come from a separate
//! [`ValueDomain`] and never touch the resource provider.

use std::sync::Arc;

use tracing::debug;

use super::candidate::{Candidate, Category};
use super::document::Document;
use super::resource::{ResourceCache, ResourceKey};
use super::value_domain::ValueDomain;
use crate::error::FetchError;

/// Characters that may precede a reference without belonging to it
const REFERENCE_PUNCTUATION: &[char] = &['(', ')', ',', '\'', '"', '=', '<', '>', '`'];

/// Characters that may precede a value without belonging to it
const VALUE_PUNCTUATION: &[char] = &['(', ')', ',', '=', '<', '>'];

const QUOTES: &[char] = &['\'', '"'];

/// Default display width for notes
pub const DEFAULT_MAX_NOTE_DISPLAY: usize = 45;

/// Completer for the resource hierarchy.
pub struct ResourceCompleter {
    cache: Arc<ResourceCache>,
    domain: Option<Arc<dyn ValueDomain>>,
    max_note_display: usize,
}

impl std::fmt::Debug for ResourceCompleter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCompleter")
            .field("cache", &self.cache)
            .field("domain", &self.domain.is_some())
            .field("max_note_display", &self.max_note_display)
            .finish()
    }
}

impl ResourceCompleter {
    /// Create a completer reading from `cache`
    pub fn new(cache: Arc<ResourceCache>) -> Self {
        Self {
            cache,
            domain: None,
            max_note_display: DEFAULT_MAX_NOTE_DISPLAY,
        }
    }

    /// Also complete project names and notes from `domain`
    pub fn with_value_domain(mut self, domain: Arc<dyn ValueDomain>) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Truncate note labels longer than `width` characters
    pub fn with_max_note_display(mut self, width: usize) -> Self {
        self.max_note_display = width;
        self
    }

    /// The cache this completer reads from
    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }

    /// Candidates for the word before the cursor.
    ///
    /// Fetch failures only empty the branch they occur in.
    pub async fn complete(&self, document: &Document) -> Vec<Candidate> {
        let word = document.word_before_cursor();
        let reference = word.trim_start_matches(REFERENCE_PUNCTUATION);
        let parts: Vec<&str> = reference.split('.').collect();

        let mut out = match parts.as_slice() {
            [prefix] => {
                let mut out = self.schema_candidates(prefix).await;
                out.extend(self.referenced_member_candidates(document, prefix).await);
                out.extend(self.referenced_field_candidates(document, prefix).await);
                out
            }
            [schema, prefix] => self.schema_member_candidates(schema, prefix).await,
            [schema, table, prefix] => self.field_candidates(schema, table, prefix).await,
            _ => Vec::new(),
        };

        if let Some(domain) = &self.domain {
            let value = word.trim_start_matches(VALUE_PUNCTUATION);
            out.extend(self.domain_candidates(domain.as_ref(), document, value));
        }

        out
    }

    async fn schemas(&self) -> Option<Arc<[String]>> {
        ok_or_skip(&ResourceKey::Schemas, self.cache.schemas().await)
    }

    async fn names(&self, key: ResourceKey) -> Option<Arc<[String]>> {
        let result = self.cache.children(&key).await;
        ok_or_skip(&key, result)
    }

    async fn schema_candidates(&self, prefix: &str) -> Vec<Candidate> {
        let Some(schemas) = self.schemas().await else {
            return Vec::new();
        };
        schemas
            .iter()
            .filter(|schema| schema.starts_with(prefix))
            .map(|schema| Candidate::new(schema.as_str(), prefix, Category::Dataset))
            .collect()
    }

    async fn schema_member_candidates(&self, schema: &str, prefix: &str) -> Vec<Candidate> {
        if !self.is_schema(schema).await {
            return Vec::new();
        }

        let mut out = Vec::new();
        if let Some(tables) = self.names(ResourceKey::tables(schema)).await {
            out.extend(
                tables
                    .iter()
                    .filter(|table| table.starts_with(prefix))
                    .map(|table| {
                        Candidate::new(table.as_str(), prefix, Category::Table).with_meta(schema)
                    }),
            );
        }
        if let Some(routines) = self.names(ResourceKey::routines(schema)).await {
            out.extend(
                routines
                    .iter()
                    .filter(|routine| routine.starts_with(prefix))
                    .map(|routine| {
                        Candidate::new(routine.as_str(), prefix, Category::Routine)
                            .with_meta(schema)
                    }),
            );
        }
        out
    }

    async fn field_candidates(&self, schema: &str, table: &str, prefix: &str) -> Vec<Candidate> {
        if !self.is_table(schema, table).await {
            return Vec::new();
        }
        let Some(fields) = self.names(ResourceKey::fields(schema, table)).await else {
            return Vec::new();
        };
        let owner = format!("{schema}.{table}");
        fields
            .iter()
            .filter(|field| field.starts_with(prefix))
            .map(|field| Candidate::new(field.as_str(), prefix, Category::Field).with_meta(&owner))
            .collect()
    }

    /// Tables and routines of schemas named as `schema.table` elsewhere in the input
    async fn referenced_member_candidates(&self, document: &Document, prefix: &str) -> Vec<Candidate> {
        let mut out = Vec::new();
        let mut seen: Vec<String> = Vec::new();

        for (schema, _) in references(document) {
            if seen.contains(&schema) {
                continue;
            }
            out.extend(self.schema_member_candidates(&schema, prefix).await);
            seen.push(schema);
        }
        out
    }

    /// Fields of tables named as `schema.table` elsewhere in the input
    async fn referenced_field_candidates(&self, document: &Document, prefix: &str) -> Vec<Candidate> {
        let mut out = Vec::new();
        let mut seen: Vec<(String, String)> = Vec::new();

        for (schema, table) in references(document) {
            if seen.iter().any(|(s, t)| *s == schema && *t == table) {
                continue;
            }
            out.extend(self.field_candidates(&schema, &table, prefix).await);
            seen.push((schema, table));
        }
        out
    }

    async fn is_schema(&self, schema: &str) -> bool {
        self.schemas()
            .await
            .is_some_and(|schemas| schemas.iter().any(|s| s == schema))
    }

    async fn is_table(&self, schema: &str, table: &str) -> bool {
        if !self.is_schema(schema).await {
            return false;
        }
        self.names(ResourceKey::tables(schema))
            .await
            .is_some_and(|tables| tables.iter().any(|t| t == table))
    }

    fn domain_candidates(
        &self,
        domain: &dyn ValueDomain,
        document: &Document,
        value: &str,
    ) -> Vec<Candidate> {
        let text = document.text().to_lowercase();
        let needle = value.replace(QUOTES, "").to_lowercase();
        let quote = value.chars().next().filter(|c| QUOTES.contains(c));
        let mut out = Vec::new();

        let mut projects = domain.project_names();
        projects.sort();

        if text.contains("project") {
            out.extend(
                projects
                    .iter()
                    .filter(|project| project.to_lowercase().starts_with(&needle))
                    .map(|project| {
                        Candidate::new(quoted(project, quote), value, Category::Project)
                    }),
            );
        }

        if text.contains("note") {
            if let Some(project) = mentioned_project(document, &projects) {
                out.extend(
                    domain
                        .notes_for(&project)
                        .into_iter()
                        .filter(|note| note.to_lowercase().starts_with(&needle))
                        .map(|note| {
                            let text = match quote {
                                Some(_) => quoted(&note, quote),
                                None if note.contains(char::is_whitespace) => {
                                    quoted(&note, Some('"'))
                                }
                                None => note.clone(),
                            };
                            Candidate::new(text, value, Category::Note)
                                .with_display(truncate(&note, self.max_note_display))
                                .with_meta(format!("project: {project}"))
                        }),
                );
            }
        }

        out
    }
}

fn ok_or_skip(key: &ResourceKey, result: Result<Arc<[String]>, FetchError>) -> Option<Arc<[String]>> {
    match result {
        Ok(names) => Some(names),
        Err(err) => {
            debug!(key = %key, error = %err, "skipping resource branch");
            None
        }
    }
}

/// Every `schema.table` pair written out in the input, except the word being typed
fn references(document: &Document) -> Vec<(String, String)> {
    let before = document.text_before_cursor();
    let current = document.word_before_cursor();
    let before = &before[..before.len() - current.len()];
    let after = &document.text()[document.cursor()..];

    before
        .split_whitespace()
        .chain(after.split_whitespace())
        .filter_map(|word| {
            let word = word.trim_matches(REFERENCE_PUNCTUATION);
            let mut parts = word.split('.');
            let schema = parts.next()?;
            let table = parts.next()?;
            if schema.is_empty() || table.is_empty() {
                return None;
            }
            Some((schema.to_string(), table.to_string()))
        })
        .collect()
}

/// Most recently mentioned project name in the input
fn mentioned_project(document: &Document, projects: &[String]) -> Option<String> {
    document
        .text()
        .split_whitespace()
        .rev()
        .map(|word| word.trim_matches(REFERENCE_PUNCTUATION))
        .find_map(|word| projects.iter().find(|project| project.as_str() == word))
        .cloned()
}

fn quoted(value: &str, quote: Option<char>) -> String {
    match quote {
        Some(q) => {
            let escaped = value.replace(q, &format!("\\{q}"));
            format!("{q}{escaped}{q}")
        }
        None => value.to_string(),
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::completion::resource::{ResourceProvider, StaticResources};
    use crate::completion::value_domain::StaticValueDomain;

    struct Counting {
        inner: StaticResources,
        table_calls: AtomicUsize,
        fail_routines: bool,
    }

    impl Counting {
        fn new(fail_routines: bool) -> Self {
            let inner = serde_json::from_str(
                r#"{"schemas": {
                    "s1": {"tables": {"t1": ["id", "name"], "t2": ["id"]}, "routines": ["rollup"]},
                    "s2": {"tables": {"events": ["ts"]}}
                }}"#,
            )
            .unwrap();
            Self {
                inner,
                table_calls: AtomicUsize::new(0),
                fail_routines,
            }
        }
    }

    impl ResourceProvider for Counting {
        fn list_schemas(&self) -> Result<Vec<String>, FetchError> {
            self.inner.list_schemas()
        }

        fn list_tables(&self, schema: &str) -> Result<Vec<String>, FetchError> {
            self.table_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_tables(schema)
        }

        fn list_routines(&self, schema: &str) -> Result<Vec<String>, FetchError> {
            if self.fail_routines {
                return Err(FetchError::provider("routines unavailable"));
            }
            self.inner.list_routines(schema)
        }

        fn get_fields(&self, schema: &str, table: &str) -> Result<Vec<String>, FetchError> {
            self.inner.get_fields(schema, table)
        }
    }

    fn completer(provider: Arc<Counting>) -> ResourceCompleter {
        let cache = ResourceCache::new(provider, Duration::from_secs(5));
        ResourceCompleter::new(Arc::new(cache))
    }

    async fn complete(completer: &ResourceCompleter, text: &str) -> Vec<(String, Category)> {
        completer
            .complete(&Document::at_end(text))
            .await
            .into_iter()
            .map(|c| (c.text, c.category))
            .collect()
    }

    #[tokio::test]
    async fn test_schema_candidates() {
        let completer = completer(Arc::new(Counting::new(false)));
        let out = complete(&completer, "s").await;
        assert_eq!(
            out,
            vec![
                ("s1".to_string(), Category::Dataset),
                ("s2".to_string(), Category::Dataset)
            ]
        );
    }

    #[tokio::test]
    async fn test_tables_fetched_once() {
        let provider = Arc::new(Counting::new(false));
        let completer = completer(Arc::clone(&provider));

        for _ in 0..3 {
            let out = complete(&completer, "SELECT * FROM s1.").await;
            assert!(out.contains(&("t1".to_string(), Category::Table)));
            assert!(out.contains(&("rollup".to_string(), Category::Routine)));
        }
        assert_eq!(provider.table_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_fetch_once() {
        let provider = Arc::new(Counting::new(false));
        let completer = completer(Arc::clone(&provider));
        let document = Document::at_end("s1.");

        let (a, b, c) = tokio::join!(
            completer.complete(&document),
            completer.complete(&document),
            completer.complete(&document)
        );
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(provider.table_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_table_meta_and_start_position() {
        let completer = completer(Arc::new(Counting::new(false)));
        let out = completer.complete(&Document::at_end("(s1.t")).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].meta.as_deref(), Some("s1"));
        assert_eq!(out[0].start_position, -1);
        assert_eq!(out[0].style.as_deref(), Some("fg:#ceaafb"));
    }

    #[tokio::test]
    async fn test_field_candidates() {
        let completer = completer(Arc::new(Counting::new(false)));
        let out = completer.complete(&Document::at_end("s1.t1.n")).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "name");
        assert_eq!(out[0].category, Category::Field);
        assert_eq!(out[0].meta.as_deref(), Some("s1.t1"));
    }

    #[tokio::test]
    async fn test_unknown_schema_yields_nothing() {
        let completer = completer(Arc::new(Counting::new(false)));
        assert!(complete(&completer, "nope.").await.is_empty());
        assert!(complete(&completer, "s1.nope.").await.is_empty());
    }

    #[tokio::test]
    async fn test_referenced_table_fields_for_bare_word() {
        let completer = completer(Arc::new(Counting::new(false)));
        let out = complete(&completer, "SELECT i").await;
        assert!(out.is_empty());

        let document = Document::new("SELECT i FROM s1.t1", "SELECT i".len());
        let out: Vec<_> = completer
            .complete(&document)
            .await
            .into_iter()
            .map(|c| (c.text, c.category))
            .collect();
        assert_eq!(out, vec![("id".to_string(), Category::Field)]);
    }

    #[tokio::test]
    async fn test_members_of_typed_schema_for_bare_word() {
        let provider = Arc::new(Counting::new(false));
        let completer = completer(Arc::clone(&provider));
        let out = complete(&completer, "SELECT * FROM s1.t1 JOIN t").await;
        assert_eq!(
            out,
            vec![
                ("t1".to_string(), Category::Table),
                ("t2".to_string(), Category::Table),
            ]
        );

        let out = complete(&completer, "SELECT * FROM s1.t1 JOIN s1.t2 JOIN r").await;
        assert_eq!(out, vec![("rollup".to_string(), Category::Routine)]);
        assert_eq!(provider.table_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_routine_failure_keeps_tables() {
        let completer = completer(Arc::new(Counting::new(true)));
        let out = complete(&completer, "s1.").await;
        assert_eq!(
            out,
            vec![
                ("t1".to_string(), Category::Table),
                ("t2".to_string(), Category::Table)
            ]
        );
    }

    fn with_domain(completer: ResourceCompleter) -> ResourceCompleter {
        let domain = StaticValueDomain::default()
            .with_project("alpha", ["Fix the login bug that only shows up on mobile Safari", "review"])
            .with_project("beta", Vec::<String>::new());
        completer.with_value_domain(Arc::new(domain)).with_max_note_display(10)
    }

    #[tokio::test]
    async fn test_project_names_when_project_mentioned() {
        let completer = with_domain(completer(Arc::new(Counting::new(false))));

        let out = complete(&completer, "WHERE project = 'a").await;
        assert_eq!(out, vec![("'alpha'".to_string(), Category::Project)]);

        assert!(complete(&completer, "WHERE x = a").await.is_empty());
    }

    #[tokio::test]
    async fn test_notes_for_mentioned_project() {
        let completer = with_domain(completer(Arc::new(Counting::new(false))));
        let out = completer
            .complete(&Document::at_end("WHERE project = alpha AND note = fix"))
            .await;

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, Category::Note);
        assert_eq!(
            out[0].text,
            "\"Fix the login bug that only shows up on mobile Safari\""
        );
        assert_eq!(out[0].display, "Fix the lo…");
        assert_eq!(out[0].start_position, -3);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}
