//! Raw option value decoding.
//!
//! Structured values are stored as JSON object or array text. Anything else
//! is a scalar and is handed back untouched as a string.

use serde::Serialize;
use serde_json::Value;

use crate::error::CacheResult;

/// Returns true when `raw` is in serialized structured form.
pub fn is_serialized(raw: &str) -> bool {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() < 2 {
        return false;
    }
    matches!(
        (bytes[0], bytes[bytes.len() - 1]),
        (b'{', b'}') | (b'[', b']')
    )
}

/// Decodes a raw stored value.
///
/// A value in serialized form that fails to parse returns the serde_json error.
pub fn decode(raw: &str) -> CacheResult<Value> {
    if is_serialized(raw) {
        Ok(serde_json::from_str(raw)?)
    } else {
        Ok(Value::String(raw.to_owned()))
    }
}

/// Encodes a structured value into its stored form.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> CacheResult<String> {
    Ok(serde_json::to_string(value)?)
}
