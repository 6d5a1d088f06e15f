use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use prefix_options_cache::{CacheResult, InMemoryStore, KeyValueSource, OptionsSchema};

/// Store with the settings used across the integration tests
pub fn theme_store() -> InMemoryStore {
    InMemoryStore::from_iter([
        ("theme_color", "blue"),
        ("theme_size", "10"),
        ("theme_front_page", "42"),
        ("theme_menu_pages", "[3, 5, 8]"),
        ("theme_footer_text", "Made with care"),
        ("widget_color", "red"),
    ])
}

/// Sample schema over the `theme_` options
pub struct ThemeSchema;

impl OptionsSchema for ThemeSchema {
    const PREFIX: &'static str = "theme_";
    const KEYS: &'static [(&'static str, &'static str)] = &[
        ("THEME_COLOR", "theme_color"),
        ("THEME_SIZE", "theme_size"),
        ("THEME_FRONT_PAGE", "theme_front_page"),
        ("THEME_MENU_PAGES", "theme_menu_pages"),
    ];
}

/// Wraps an `InMemoryStore` and counts the queries reaching it
pub struct CountingStore {
    inner: InMemoryStore,
    prefix_queries: AtomicUsize,
    full_queries: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingStore {
    pub fn new(inner: InMemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            prefix_queries: AtomicUsize::new(0),
            full_queries: AtomicUsize::new(0),
            delay: None,
        })
    }

    /// Every query sleeps for `delay` before answering
    pub fn with_delay(inner: InMemoryStore, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner,
            prefix_queries: AtomicUsize::new(0),
            full_queries: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn prefix_queries(&self) -> usize {
        self.prefix_queries.load(Ordering::SeqCst)
    }

    pub fn full_queries(&self) -> usize {
        self.full_queries.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.prefix_queries() + self.full_queries()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl KeyValueSource for CountingStore {
    async fn query_by_prefix(&self, prefix: &str) -> CacheResult<Vec<(String, String)>> {
        self.prefix_queries.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.inner.query_by_prefix(prefix).await
    }

    async fn query_all(&self) -> CacheResult<Vec<(String, String)>> {
        self.full_queries.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.inner.query_all().await
    }

    async fn get_single(&self, key: &str) -> CacheResult<Option<String>> {
        self.inner.get_single(key).await
    }
}
