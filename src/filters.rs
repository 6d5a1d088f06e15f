use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

/// Hook name prefix under which option filters are registered.
pub const OPTION_FILTER_PREFIX: &str = "option_";

/// A transform applied to an option value after it has been decoded.
/// Receives the value and the option key.
pub type OptionFilter = Arc<dyn Fn(Value, &str) -> Value + Send + Sync>;

/// Registry of per-option value filters.
///
/// Filters are stored under `"option_" + key`. A key without a filter is
/// passed through unchanged.
#[derive(Default)]
pub struct FilterRegistry {
    filters: RwLock<HashMap<String, OptionFilter>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook name for an option key.
    pub fn hook_name(key: &str) -> String {
        format!("{OPTION_FILTER_PREFIX}{key}")
    }

    /// Registers a filter for `key`, replacing any previous one.
    pub fn register<F>(&self, key: &str, filter: F)
    where
        F: Fn(Value, &str) -> Value + Send + Sync + 'static,
    {
        self.filters
            .write()
            .insert(Self::hook_name(key), Arc::new(filter));
    }

    /// Removes the filter for `key`. Returns true if one was registered.
    pub fn unregister(&self, key: &str) -> bool {
        self.filters.write().remove(&Self::hook_name(key)).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.filters.read().contains_key(&Self::hook_name(key))
    }

    /// Runs `value` through the filter for `key`.
    pub fn apply(&self, key: &str, value: Value) -> Value {
        // Clone the handle so the filter runs without holding the lock.
        let filter = self.filters.read().get(&Self::hook_name(key)).cloned();
        match filter {
            Some(filter) => filter(value, key),
            None => value,
        }
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters = self.filters.read();
        let mut hooks: Vec<&String> = filters.keys().collect();
        hooks.sort();
        f.debug_struct("FilterRegistry").field("hooks", &hooks).finish()
    }
}
