//! Bridge between [`Value`] and `serde_json::Value`.

use base64::Engine;
use serde_json::json;

use crate::value::{Integer, Map, Value};

fn to_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn integer_to_json(n: Integer) -> serde_json::Value {
    match (n.to_i64(), n.to_u64()) {
        (Ok(i), _) => json!(i),
        (_, Ok(u)) => json!(u),
        _ => serde_json::Value::Null,
    }
}

fn map_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.to_string_lossy().into_owned(),
        other => other.to_json().to_string(),
    }
}

impl Value {
    /// Converts to JSON.
    ///
    /// Non-finite floats become `null`, strings are decoded lossily, binary
    /// payloads become base64 strings and extensions become
    /// `[type, base64]`. Map keys that are not strings are rendered as their
    /// compact JSON text; a later duplicate key overwrites an earlier one.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Nil => serde_json::Value::Null,
            Value::Boolean(b) => json!(b),
            Value::Integer(n) => integer_to_json(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => json!(s.to_string_lossy()),
            Value::Binary(b) => json!(to_base64(b)),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => {
                let mut obj = serde_json::Map::with_capacity(map.len());
                for (k, v) in map.iter() {
                    obj.insert(map_key(k), v.to_json());
                }
                serde_json::Value::Object(obj)
            }
            Value::Extension(ext) => json!([ext.type_tag(), to_base64(ext.data())]),
        }
    }

    pub fn from_json(json: serde_json::Value) -> Value {
        Value::from(json)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Value::from(u)
                } else if let Some(i) = n.as_i64() {
                    Value::from(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(arr) => arr.into_iter().map(Value::from).collect(),
            serde_json::Value::Object(obj) => Value::Map(
                obj.into_iter()
                    .map(|(k, v)| (Value::from(k), Value::from(v)))
                    .collect::<Map>(),
            ),
        }
    }
}
