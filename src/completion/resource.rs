//! Lazily populated cache of the resource hierarchy
//!
//! Schemas contain tables and routines, tables contain fields. Every level is
//! fetched from a [`ResourceProvider`] on first use and then served from
//! memory for the rest of the session.
//!
//! Fetches are serialized per key: concurrent requests for the same key share
//! one provider call, requests for other keys are not held up. A failed fetch
//! stays failed, so a broken provider is asked once per key and not on every
//! keystroke.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::FetchError;

/// Blocking access to the resource hierarchy.
///
/// Calls may be slow and may fail; the cache runs them off the async runtime.
pub trait ResourceProvider: Send + Sync {
    /// Top-level schema names
    fn list_schemas(&self) -> Result<Vec<String>, FetchError>;

    /// Tables of `schema`
    fn list_tables(&self, schema: &str) -> Result<Vec<String>, FetchError>;

    /// Routines of `schema`
    fn list_routines(&self, schema: &str) -> Result<Vec<String>, FetchError>;

    /// Fields of `schema.table`
    fn get_fields(&self, schema: &str, table: &str) -> Result<Vec<String>, FetchError>;
}

/// Identifies one cached level of the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Schemas,
    Tables(String),
    Routines(String),
    Fields { schema: String, table: String },
}

impl ResourceKey {
    pub fn tables(schema: impl Into<String>) -> Self {
        ResourceKey::Tables(schema.into())
    }

    pub fn routines(schema: impl Into<String>) -> Self {
        ResourceKey::Routines(schema.into())
    }

    pub fn fields(schema: impl Into<String>, table: impl Into<String>) -> Self {
        ResourceKey::Fields {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Schemas => write!(f, "schemas"),
            ResourceKey::Tables(schema) => write!(f, "{schema}.tables"),
            ResourceKey::Routines(schema) => write!(f, "{schema}.routines"),
            ResourceKey::Fields { schema, table } => write!(f, "{schema}.{table}.fields"),
        }
    }
}

/// Fetch state of a cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// Never requested
    Unfetched,
    /// A fetch is running
    InFlight,
    /// Names are cached
    Ready(Arc<[String]>),
    /// The fetch failed; the entry stays failed
    Failed(FetchError),
}

#[derive(Debug)]
struct EntryState {
    // Unfetched, Ready or Failed; InFlight is reported while the lock is held
    state: FetchState,
    last_fetch: Option<Instant>,
}

#[derive(Debug)]
struct CacheEntry {
    state: tokio::sync::Mutex<EntryState>,
}

impl CacheEntry {
    fn new() -> Self {
        Self {
            state: tokio::sync::Mutex::new(EntryState {
                state: FetchState::Unfetched,
                last_fetch: None,
            }),
        }
    }
}

/// Session-scoped cache in front of a [`ResourceProvider`].
pub struct ResourceCache {
    provider: Arc<dyn ResourceProvider>,
    entries: Mutex<HashMap<ResourceKey, Arc<CacheEntry>>>,
    fetch_timeout: Duration,
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}

impl ResourceCache {
    /// Create a cache in front of `provider`.
    ///
    /// # Arguments
    /// * `provider` - Source of resource names
    /// * `fetch_timeout` - Upper bound for a single provider call
    pub fn new(provider: Arc<dyn ResourceProvider>, fetch_timeout: Duration) -> Self {
        Self {
            provider,
            entries: Mutex::new(HashMap::new()),
            fetch_timeout,
        }
    }

    /// Names stored under `key`, fetching them on first use.
    ///
    /// The fetch runs on its own task: a caller that goes away does not
    /// interrupt it, and the result is cached for the next caller.
    pub async fn children(&self, key: &ResourceKey) -> Result<Arc<[String]>, FetchError> {
        let entry = self.entry(key);

        if let Ok(guard) = entry.state.try_lock() {
            match &guard.state {
                FetchState::Ready(names) => return Ok(Arc::clone(names)),
                FetchState::Failed(err) => return Err(err.clone()),
                FetchState::Unfetched | FetchState::InFlight => {}
            }
        }

        let provider = Arc::clone(&self.provider);
        let key = key.clone();
        let timeout = self.fetch_timeout;

        let task = tokio::spawn(async move {
            let mut guard = entry.state.lock().await;
            match &guard.state {
                FetchState::Ready(names) => return Ok(Arc::clone(names)),
                FetchState::Failed(err) => return Err(err.clone()),
                FetchState::Unfetched | FetchState::InFlight => {}
            }

            let result = fetch(provider, key.clone(), timeout).await;
            match &result {
                Ok(names) => {
                    debug!(key = %key, count = names.len(), "resource fetched");
                    guard.state = FetchState::Ready(Arc::clone(names));
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "resource fetch failed");
                    guard.state = FetchState::Failed(err.clone());
                }
            }
            guard.last_fetch = Some(Instant::now());
            result
        });

        match task.await {
            Ok(result) => result,
            Err(err) => Err(FetchError::Aborted(err.to_string())),
        }
    }

    /// Top-level schema names
    pub async fn schemas(&self) -> Result<Arc<[String]>, FetchError> {
        self.children(&ResourceKey::Schemas).await
    }

    /// Fields of `schema.table`
    pub async fn fields_for(&self, schema: &str, table: &str) -> Result<Arc<[String]>, FetchError> {
        self.children(&ResourceKey::fields(schema, table)).await
    }

    /// Current state of `key` without triggering a fetch
    pub fn state(&self, key: &ResourceKey) -> FetchState {
        let Some(entry) = self.lookup(key) else {
            return FetchState::Unfetched;
        };
        match entry.state.try_lock() {
            Ok(guard) => guard.state.clone(),
            Err(_) => FetchState::InFlight,
        }
    }

    /// When `key` was last fetched, if ever
    pub fn last_fetch(&self, key: &ResourceKey) -> Option<Instant> {
        let entry = self.lookup(key)?;
        let guard = entry.state.try_lock().ok()?;
        guard.last_fetch
    }

    fn lookup(&self, key: &ResourceKey) -> Option<Arc<CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn entry(&self, key: &ResourceKey) -> Arc<CacheEntry> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(CacheEntry::new())),
        )
    }
}

async fn fetch(
    provider: Arc<dyn ResourceProvider>,
    key: ResourceKey,
    timeout: Duration,
) -> Result<Arc<[String]>, FetchError> {
    let call = tokio::task::spawn_blocking(move || match &key {
        ResourceKey::Schemas => provider.list_schemas(),
        ResourceKey::Tables(schema) => provider.list_tables(schema),
        ResourceKey::Routines(schema) => provider.list_routines(schema),
        ResourceKey::Fields { schema, table } => provider.get_fields(schema, table),
    });

    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(result)) => result.map(Arc::from),
        Ok(Err(err)) => Err(FetchError::Aborted(err.to_string())),
        Err(_) => Err(FetchError::Timeout(timeout)),
    }
}

/// Schema contents of a [`StaticResources`] fixture
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaFixture {
    /// Table name to field names
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub routines: Vec<String>,
}

/// Resource provider backed by an in-memory hierarchy, usually read from JSON
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticResources {
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaFixture>,
}

impl StaticResources {
    fn schema(&self, schema: &str) -> Result<&SchemaFixture, FetchError> {
        self.schemas
            .get(schema)
            .ok_or_else(|| FetchError::provider(format!("unknown schema '{schema}'")))
    }
}

impl ResourceProvider for StaticResources {
    fn list_schemas(&self) -> Result<Vec<String>, FetchError> {
        Ok(self.schemas.keys().cloned().collect())
    }

    fn list_tables(&self, schema: &str) -> Result<Vec<String>, FetchError> {
        Ok(self.schema(schema)?.tables.keys().cloned().collect())
    }

    fn list_routines(&self, schema: &str) -> Result<Vec<String>, FetchError> {
        Ok(self.schema(schema)?.routines.clone())
    }

    fn get_fields(&self, schema: &str, table: &str) -> Result<Vec<String>, FetchError> {
        self.schema(schema)?
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| FetchError::provider(format!("unknown table '{schema}.{table}'")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio_test::{assert_err, assert_ok};

    use super::*;

    /// Provider that counts calls and can be slowed down
    #[derive(Default)]
    struct Counting {
        inner: StaticResources,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl Counting {
        fn with_delay(delay: Duration) -> Self {
            let inner: StaticResources = serde_json::from_str(
                r#"{"schemas": {"s1": {"tables": {"t1": ["id", "name"]}, "routines": ["r1"]}, "s2": {}}}"#,
            )
            .unwrap();
            Self {
                inner,
                calls: AtomicUsize::new(0),
                delay,
            }
        }

        fn tick(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
        }
    }

    impl ResourceProvider for Counting {
        fn list_schemas(&self) -> Result<Vec<String>, FetchError> {
            self.tick();
            self.inner.list_schemas()
        }

        fn list_tables(&self, schema: &str) -> Result<Vec<String>, FetchError> {
            self.tick();
            self.inner.list_tables(schema)
        }

        fn list_routines(&self, _schema: &str) -> Result<Vec<String>, FetchError> {
            self.tick();
            Err(FetchError::provider("permission denied"))
        }

        fn get_fields(&self, schema: &str, table: &str) -> Result<Vec<String>, FetchError> {
            self.tick();
            self.inner.get_fields(schema, table)
        }
    }

    fn cache(provider: Arc<Counting>) -> ResourceCache {
        ResourceCache::new(provider, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_fetch_once_sequential() {
        let provider = Arc::new(Counting::with_delay(Duration::ZERO));
        let cache = cache(Arc::clone(&provider));

        assert_eq!(cache.state(&ResourceKey::Schemas), FetchState::Unfetched);
        let first = cache.schemas().await.unwrap();
        let second = cache.schemas().await.unwrap();

        assert_eq!(first.as_ref(), ["s1".to_string(), "s2".to_string()]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(cache.last_fetch(&ResourceKey::Schemas).is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fetch_once_concurrent() {
        let provider = Arc::new(Counting::with_delay(Duration::from_millis(50)));
        let cache = Arc::new(cache(Arc::clone(&provider)));
        let key = ResourceKey::tables("s1");

        let requests: Vec<_> = (0..3)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let key = key.clone();
                tokio::spawn(async move { cache.children(&key).await })
            })
            .collect();

        for request in futures::future::join_all(requests).await {
            assert_eq!(request.unwrap().unwrap().as_ref(), ["t1".to_string()]);
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_stays_failed() {
        let provider = Arc::new(Counting::with_delay(Duration::ZERO));
        let cache = cache(Arc::clone(&provider));
        let key = ResourceKey::routines("s1");

        assert_err!(cache.children(&key).await);
        assert_err!(cache.children(&key).await);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(cache.state(&key), FetchState::Failed(FetchError::Provider(_))));
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_other_keys() {
        let provider = Arc::new(Counting::with_delay(Duration::ZERO));
        let cache = cache(provider);

        assert_err!(cache.children(&ResourceKey::routines("s1")).await);
        let fields = assert_ok!(cache.fields_for("s1", "t1").await);
        assert_eq!(fields.as_ref(), ["id".to_string(), "name".to_string()]);
    }

    #[tokio::test]
    async fn test_timeout_marks_entry_failed() {
        let provider = Arc::new(Counting::with_delay(Duration::from_millis(200)));
        let cache = ResourceCache::new(provider, Duration::from_millis(20));

        let err = assert_err!(cache.schemas().await);
        assert_eq!(err, FetchError::Timeout(Duration::from_millis(20)));
        assert_eq!(cache.state(&ResourceKey::Schemas), FetchState::Failed(err));
    }

    #[test]
    fn test_static_resources_unknown_names() {
        let resources = StaticResources::default();
        assert!(assert_ok!(resources.list_schemas()).is_empty());
        assert_err!(resources.list_tables("nope"));
        assert_err!(resources.get_fields("nope", "t"));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ResourceKey::fields("s1", "t1").to_string(), "s1.t1.fields");
        assert_eq!(ResourceKey::Schemas.to_string(), "schemas");
    }
}
