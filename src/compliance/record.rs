//! Record representation shared by the engine, handlers and CLI

use serde_json::{Map, Value};
use std::borrow::Cow;

/// A structured record: field name to arbitrary JSON value, in insertion order
pub type Record = Map<String, Value>;

/// Text form of a field value used for pattern matching and masking.
///
/// Strings are used as-is, `null` becomes the empty string, scalars use
/// their JSON display form and nested values their compact JSON text.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}
