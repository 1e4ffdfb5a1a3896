use serde_json::Value;

use crate::error::TypeError;

/// A JSON object: the unit of storage in a document collection.
pub type Document = serde_json::Map<String, Value>;

/// UTC wall-clock instant. Serialized as RFC 3339.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Unwrap a JSON value that must be an object into a [`Document`].
pub fn document_from_value(value: Value) -> Result<Document, TypeError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(TypeError::NotAnObject(kind_name(&other).to_string())),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
