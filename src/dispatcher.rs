//! Convention-based option accessors.
//!
//! A schema names each option with a constant such as `THEME_COLOR`. The
//! dispatcher turns every constant into the accessor `getThemeColor` and
//! resolves calls by that name to the option key behind the constant.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{CacheError, CacheResult, NotSupportedError, NullReferenceError};
use crate::prefix_cache::{PrefixCache, UnknownAccessorPolicy};
use crate::traits::OptionsSchema;

/// Accessor name prefix.
pub const ACCESSOR_PREFIX: &str = "get";

/// Returns the accessor name for a `SCREAMING_SNAKE_CASE` constant name.
///
/// `THEME_COLOR` becomes `getThemeColor`.
pub fn accessor_name(constant: &str) -> String {
    let mut name = String::from(ACCESSOR_PREFIX);
    for word in constant.split('_').filter(|word| !word.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(&chars.as_str().to_lowercase());
        }
    }
    name
}

/// Resolves accessor names to option keys and reads them through a [`PrefixCache`].
#[derive(Debug)]
pub struct AccessorDispatcher {
    cache: Arc<PrefixCache>,
    table: HashMap<String, String>,
    policy: UnknownAccessorPolicy,
}

impl AccessorDispatcher {
    /// Creates a dispatcher with an empty table.
    pub fn new(cache: Arc<PrefixCache>, policy: UnknownAccessorPolicy) -> Self {
        Self {
            cache,
            table: HashMap::new(),
            policy,
        }
    }

    /// Creates a dispatcher with the schema's constants, using the cache's
    /// configured unknown-accessor policy.
    ///
    /// The cache's current prefix must cover `S::PREFIX`; otherwise the
    /// schema's options could never be found in its snapshot.
    pub async fn for_schema<S: OptionsSchema>(cache: Arc<PrefixCache>) -> CacheResult<Self> {
        if let Some(prefix) = cache.prefix().await {
            if !S::PREFIX.starts_with(&prefix) {
                return Err(NotSupportedError::new(format!(
                    "schema with prefix '{}' on a cache scoped to '{}'",
                    S::PREFIX,
                    prefix
                ))
                .into());
            }
        }
        let policy = cache.config().unknown_accessor;
        let mut dispatcher = Self::new(cache, policy);
        for &(constant, key) in S::KEYS {
            dispatcher.register_constant(constant, key)?;
        }
        Ok(dispatcher)
    }

    /// Maps accessor `name` to option `key`.
    pub fn register(&mut self, name: impl Into<String>, key: impl Into<String>) -> CacheResult<()> {
        let name = name.into();
        let key = key.into();
        if name.is_empty() {
            return Err(NullReferenceError::new("accessor name").into());
        }
        if key.is_empty() {
            return Err(NullReferenceError::new(format!("option key of {name}")).into());
        }
        self.table.insert(name, key);
        Ok(())
    }

    /// Maps the accessor derived from `constant` to option `key`.
    pub fn register_constant(&mut self, constant: &str, key: impl Into<String>) -> CacheResult<()> {
        self.register(accessor_name(constant), key)
    }

    /// The option key behind accessor `name`.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.table.get(name).map(String::as_str)
    }

    /// Registered accessor names, sorted.
    pub fn accessor_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn policy(&self) -> UnknownAccessorPolicy {
        self.policy
    }

    pub fn cache(&self) -> &Arc<PrefixCache> {
        &self.cache
    }

    /// Reads the option behind accessor `name`.
    ///
    /// Unknown names return `Ok(None)` under [`UnknownAccessorPolicy::SoftMiss`]
    /// and [`CacheError::UnknownAccessor`] under [`UnknownAccessorPolicy::Strict`].
    pub async fn call(&self, name: &str) -> CacheResult<Option<Value>> {
        match self.resolve(name) {
            Some(key) => self.cache.get_option(key).await,
            None => match self.policy {
                UnknownAccessorPolicy::SoftMiss => {
                    debug!("AccessorDispatcher: no option behind accessor '{}'", name);
                    Ok(None)
                }
                UnknownAccessorPolicy::Strict => Err(CacheError::UnknownAccessor(name.to_string())),
            },
        }
    }

    /// Reads the option behind accessor `name` and deserializes it into `T`.
    pub async fn call_as<T: DeserializeOwned>(&self, name: &str) -> CacheResult<Option<T>> {
        match self.call(name).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}
