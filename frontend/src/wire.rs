//! JSON encoding of request bodies and case-insensitive decoding of
//! response bodies.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

pub fn encode<T: Serialize>(record: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(record)
}

/// A blank body or a JSON `null` is an empty list.
pub fn decode_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, serde_json::Error> {
    Ok(decode_optional(body)?.unwrap_or_default())
}

/// A blank body or a JSON `null` is an absent record.
pub fn decode_optional<T: DeserializeOwned>(body: &str) -> Result<Option<T>, serde_json::Error> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    match fold_keys(serde_json::from_str(body)?) {
        Value::Null => Ok(None),
        value => serde_json::from_value(value).map(Some),
    }
}

/// Lowercases every object key, recursively.
pub fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), fold_keys(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}
