//! Conversion from plain JSON into Firestore's typed value encoding.
//!
//! Firestore REST documents wrap every value in a single-key object naming
//! its type (`{"stringValue": "x"}`, `{"integerValue": "3"}`, ...). Integers
//! travel as decimal strings.

use serde_json::{json, Map, Value};

/// Encode one JSON value as a Firestore `Value`.
pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_firestore_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": to_fields(map) } }),
    }
}

/// Encode a JSON object as a Firestore `fields` map.
pub fn to_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), to_firestore_value(v)))
        .collect()
}

/// Last path segment of a document resource name
/// (`projects/p/databases/(default)/documents/recipes/123` → `123`).
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
