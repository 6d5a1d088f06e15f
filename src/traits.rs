use async_trait::async_trait;
use serde_json::Value;

use crate::error::CacheResult;

/// A key-value store that can be queried by key prefix.
///
/// Implementations return rows in store order. An empty result is an empty
/// vector, never an error.
#[async_trait]
pub trait KeyValueSource: Send + Sync {
    /// Returns every `(key, raw_value)` whose key starts with `prefix`.
    async fn query_by_prefix(&self, prefix: &str) -> CacheResult<Vec<(String, String)>>;

    /// Returns every `(key, raw_value)` in the store.
    async fn query_all(&self) -> CacheResult<Vec<(String, String)>>;

    /// Returns the raw value stored under `key`, if any.
    async fn get_single(&self, key: &str) -> CacheResult<Option<String>>;
}

/// Maps record identifiers onto their locale-specific equivalents.
pub trait IdentifierTranslator: Send + Sync {
    /// Returns the identifier of the `record_kind` record translated into
    /// `locale`, or `id` itself when no translation exists.
    fn translate_identifier(&self, id: &Value, record_kind: &str, locale: &str) -> Value;
}

/// Supplies translated free-text values.
pub trait TextTranslator: Send + Sync {
    /// Returns the translation registered for `key` under `context`.
    fn translate_text(&self, context: &str, key: &str) -> Option<String>;
}

/// A configuration schema: a key prefix plus a constant table naming each option.
///
/// Constant names are `SCREAMING_SNAKE_CASE`; each one yields the accessor
/// `get` + `CamelCase` (for example `THEME_COLOR` answers `getThemeColor`).
pub trait OptionsSchema {
    const PREFIX: &'static str;
    const KEYS: &'static [(&'static str, &'static str)];
}
