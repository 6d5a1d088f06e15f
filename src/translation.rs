use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::CacheResult;
use crate::prefix_cache::PrefixCache;
use crate::traits::{IdentifierTranslator, TextTranslator};

/// The active locale and the translator serving it.
#[derive(Clone)]
pub struct LocaleContext {
    translator: Arc<dyn IdentifierTranslator>,
    locale: String,
}

impl LocaleContext {
    pub fn new(translator: Arc<dyn IdentifierTranslator>, locale: impl Into<String>) -> Self {
        Self {
            translator,
            locale: locale.into(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    fn translate(&self, id: &Value, record_kind: &str) -> Value {
        self.translator.translate_identifier(id, record_kind, &self.locale)
    }
}

impl fmt::Debug for LocaleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleContext")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

/// Read-only translation of cached option values.
///
/// Without a [`LocaleContext`] identifier values pass through untouched;
/// without a [`TextTranslator`] text values come straight from the cache.
pub struct TranslationOverlay {
    cache: Arc<PrefixCache>,
    locale: Option<LocaleContext>,
    text: Option<Arc<dyn TextTranslator>>,
}

impl TranslationOverlay {
    pub fn new(cache: Arc<PrefixCache>) -> Self {
        Self {
            cache,
            locale: None,
            text: None,
        }
    }

    pub fn with_locale(mut self, locale: LocaleContext) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn with_text_translator(mut self, translator: Arc<dyn TextTranslator>) -> Self {
        self.text = Some(translator);
        self
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_ref().map(LocaleContext::locale)
    }

    /// Returns the option behind `key` with its record identifier(s)
    /// translated into the active locale.
    ///
    /// List values, including keyed ones, are translated element by element
    /// into a plain list, keeping order.
    pub async fn translate_identifier(
        &self,
        key: &str,
        record_kind: &str,
    ) -> CacheResult<Option<Value>> {
        let Some(value) = self.cache.get_option(key).await? else {
            return Ok(None);
        };
        let Some(locale) = &self.locale else {
            return Ok(Some(value));
        };

        let translated = match value {
            Value::Array(ids) => Value::Array(
                ids.iter()
                    .map(|id| locale.translate(id, record_kind))
                    .collect(),
            ),
            // Keyed lists keep their value order and lose their keys
            Value::Object(ids) => Value::Array(
                ids.values()
                    .map(|id| locale.translate(id, record_kind))
                    .collect(),
            ),
            id => locale.translate(&id, record_kind),
        };
        Ok(Some(translated))
    }

    /// Returns the translation of `key` under `context`, or the cached value
    /// when no non-empty translation exists.
    pub async fn translate_text(&self, key: &str, context: &str) -> CacheResult<Option<Value>> {
        if let Some(text) = &self.text {
            if let Some(translated) = text.translate_text(context, key) {
                if !translated.is_empty() {
                    return Ok(Some(Value::String(translated)));
                }
            }
        }
        self.cache.get_option(key).await
    }
}

impl fmt::Debug for TranslationOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationOverlay")
            .field("cache", &self.cache)
            .field("locale", &self.locale)
            .field("text", &self.text.is_some())
            .finish()
    }
}
