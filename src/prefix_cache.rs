use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CacheResult;
use crate::filters::FilterRegistry;
use crate::traits::KeyValueSource;
use crate::value;

/// Token returned by single-key fetches for an empty value.
pub const EMPTY_PLACEHOLDER: &str = "---";

/// Option key → raw stored value.
pub type OptionMap = BTreeMap<String, String>;

/// What to do when an accessor name is not in the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownAccessorPolicy {
    /// Return no value and log at debug level
    #[default]
    SoftMiss,
    /// Fail with `CacheError::UnknownAccessor`
    Strict,
}

/// Configuration for PrefixCache
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Key prefix selecting the cached options; `None` caches the whole store
    pub prefix: Option<String>,
    /// Placeholder for empty single-key fetches
    pub empty_placeholder: String,
    /// Dispatch behaviour for unknown accessor names
    pub unknown_accessor: UnknownAccessorPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            empty_placeholder: EMPTY_PLACEHOLDER.to_string(),
            unknown_accessor: UnknownAccessorPolicy::default(),
        }
    }
}

impl CacheConfig {
    /// Create a configuration for the given prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::default().with_prefix(prefix)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_empty_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.empty_placeholder = placeholder.into();
        self
    }

    pub fn with_unknown_accessor(mut self, policy: UnknownAccessorPolicy) -> Self {
        self.unknown_accessor = policy;
        self
    }
}

/// Statistics for cache operations
#[derive(Debug, Default)]
pub struct CacheStatistics {
    loads: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStatistics {
    /// Number of store queries issued to fill the cache
    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Number of lookups that found their key
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of lookups that did not find their key
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone)]
enum CacheState {
    Empty,
    Loaded {
        options: Arc<OptionMap>,
        loaded_at: DateTime<Utc>,
    },
}

struct Inner {
    prefix: Option<String>,
    state: CacheState,
}

/// Lazily loaded, immutable snapshot of all options under a key prefix.
///
/// The first read queries the store once; the snapshot then stays until
/// [`set_prefix`](Self::set_prefix), [`reset`](Self::reset) or
/// [`set_options`](Self::set_options) replaces it.
pub struct PrefixCache {
    source: Arc<dyn KeyValueSource>,
    inner: Mutex<Inner>,
    filters: Arc<FilterRegistry>,
    config: CacheConfig,
    statistics: CacheStatistics,
}

impl PrefixCache {
    /// Creates an empty cache over `source`. The prefix comes from `config`.
    pub fn new(source: Arc<dyn KeyValueSource>, config: CacheConfig) -> Self {
        Self::with_filters(source, config, Arc::new(FilterRegistry::new()))
    }

    /// Creates an empty cache that runs lookups through `filters`.
    pub fn with_filters(
        source: Arc<dyn KeyValueSource>,
        config: CacheConfig,
        filters: Arc<FilterRegistry>,
    ) -> Self {
        Self {
            source,
            inner: Mutex::new(Inner {
                prefix: config.prefix.clone(),
                state: CacheState::Empty,
            }),
            filters,
            config,
            statistics: CacheStatistics::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn filters(&self) -> &Arc<FilterRegistry> {
        &self.filters
    }

    pub fn statistics(&self) -> &CacheStatistics {
        &self.statistics
    }

    pub async fn prefix(&self) -> Option<String> {
        self.inner.lock().await.prefix.clone()
    }

    /// Changes the prefix and drops the loaded snapshot. Does not query the store.
    pub async fn set_prefix(&self, prefix: Option<String>) {
        let mut inner = self.inner.lock().await;
        debug!("PrefixCache: prefix changed from {:?} to {:?}", inner.prefix, prefix);
        inner.prefix = prefix;
        inner.state = CacheState::Empty;
    }

    /// Drops the loaded snapshot, keeping the prefix.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        if matches!(inner.state, CacheState::Loaded { .. }) {
            debug!("PrefixCache: reset snapshot for prefix {:?}", inner.prefix);
        }
        inner.state = CacheState::Empty;
    }

    pub async fn is_loaded(&self) -> bool {
        matches!(self.inner.lock().await.state, CacheState::Loaded { .. })
    }

    /// When the current snapshot was installed.
    pub async fn loaded_at(&self) -> Option<DateTime<Utc>> {
        match &self.inner.lock().await.state {
            CacheState::Empty => None,
            CacheState::Loaded { loaded_at, .. } => Some(*loaded_at),
        }
    }

    /// Returns the snapshot, loading it from the store on first use.
    ///
    /// The lock is held across the store query so concurrent first reads
    /// share a single load.
    pub async fn get_options(&self) -> CacheResult<Arc<OptionMap>> {
        let mut inner = self.inner.lock().await;
        if let CacheState::Loaded { options, .. } = &inner.state {
            return Ok(Arc::clone(options));
        }

        let options = Arc::new(
            Self::fetch_all_under_prefix(self.source.as_ref(), inner.prefix.as_deref()).await?,
        );
        self.statistics.record_load();
        debug!(
            "PrefixCache: loaded {} options under prefix {:?}",
            options.len(),
            inner.prefix
        );
        inner.state = CacheState::Loaded {
            options: Arc::clone(&options),
            loaded_at: Utc::now(),
        };
        Ok(options)
    }

    /// Installs `options` as the snapshot without querying the store.
    pub async fn set_options(&self, options: OptionMap) {
        let mut inner = self.inner.lock().await;
        inner.state = CacheState::Loaded {
            options: Arc::new(options),
            loaded_at: Utc::now(),
        };
    }

    /// Looks up `key` exactly, decodes it and applies its filter.
    ///
    /// Returns `Ok(None)` when the key is not in the snapshot.
    pub async fn get_option(&self, key: &str) -> CacheResult<Option<Value>> {
        let options = self.get_options().await?;
        let Some(raw) = options.get(key) else {
            self.statistics.record_miss();
            return Ok(None);
        };
        self.statistics.record_hit();
        let decoded = value::decode(raw)?;
        Ok(Some(self.filters.apply(key, decoded)))
    }

    /// Looks up `key` and deserializes the value into `T`.
    pub async fn get_option_as<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        match self.get_option(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Queries `source` for every option starting with `prefix`.
    ///
    /// A missing or empty prefix fetches the whole store. No match is an
    /// empty map.
    pub async fn fetch_all_under_prefix(
        source: &dyn KeyValueSource,
        prefix: Option<&str>,
    ) -> CacheResult<OptionMap> {
        let rows = match prefix {
            Some(prefix) if !prefix.is_empty() => source.query_by_prefix(prefix).await?,
            _ => source.query_all().await?,
        };
        Ok(rows.into_iter().collect())
    }

    /// Fetches one option straight from `source`, bypassing any cache.
    ///
    /// An empty or missing value yields [`EMPTY_PLACEHOLDER`] when
    /// `empty_is_placeholder` is set, `None` otherwise.
    pub async fn fetch_single(
        source: &dyn KeyValueSource,
        key: &str,
        empty_is_placeholder: bool,
    ) -> CacheResult<Option<String>> {
        let placeholder = empty_is_placeholder.then_some(EMPTY_PLACEHOLDER);
        Self::fetch_single_with(source, key, placeholder).await
    }

    /// Like [`fetch_single`](Self::fetch_single) with a caller-chosen placeholder.
    pub async fn fetch_single_with(
        source: &dyn KeyValueSource,
        key: &str,
        placeholder: Option<&str>,
    ) -> CacheResult<Option<String>> {
        match source.get_single(key).await? {
            Some(raw) if !raw.is_empty() => Ok(Some(raw)),
            _ => Ok(placeholder.map(str::to_owned)),
        }
    }

    /// Single-key fetch from this cache's store using the configured placeholder.
    pub async fn fetch_single_uncached(
        &self,
        key: &str,
        empty_is_placeholder: bool,
    ) -> CacheResult<Option<String>> {
        let placeholder = empty_is_placeholder.then_some(self.config.empty_placeholder.as_str());
        Self::fetch_single_with(self.source.as_ref(), key, placeholder).await
    }
}

impl fmt::Debug for PrefixCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixCache")
            .field("config", &self.config)
            .field("filters", &self.filters)
            .field("statistics", &self.statistics)
            .finish_non_exhaustive()
    }
}
