use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use prefix_options_cache::{IdentifierTranslator, TextTranslator};
use serde_json::{json, Value};

/// Translates identifier `id` to `"<locale>:<record_kind>:<id>"`
#[derive(Default)]
pub struct PrefixingTranslator {
    calls: AtomicUsize,
}

impl PrefixingTranslator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IdentifierTranslator for PrefixingTranslator {
    fn translate_identifier(&self, id: &Value, record_kind: &str, locale: &str) -> Value {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        json!(format!("{locale}:{record_kind}:{id}"))
    }
}

/// Text translations keyed by `(context, key)`
#[derive(Default)]
pub struct StubTextTranslator {
    texts: HashMap<(String, String), String>,
}

impl StubTextTranslator {
    pub fn with(mut self, context: &str, key: &str, text: &str) -> Self {
        self.texts
            .insert((context.to_string(), key.to_string()), text.to_string());
        self
    }
}

impl TextTranslator for StubTextTranslator {
    fn translate_text(&self, context: &str, key: &str) -> Option<String> {
        self.texts
            .get(&(context.to_string(), key.to_string()))
            .cloned()
    }
}
