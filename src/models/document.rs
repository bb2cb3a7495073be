//! Schema-free document as stored in a collection.

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::AppError;

/// A stored document: its key plus the JSON object body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    /// Object body with `id` merged in.
    pub fn into_value(self) -> Value {
        let mut data = self.data;
        data.insert("id".to_string(), Value::String(self.id));
        Value::Object(data)
    }

    /// Deserialize into a typed entity.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, AppError> {
        let id = self.id.clone();
        serde_json::from_value(self.into_value())
            .map_err(|e| AppError::Internal(format!("Malformed document {}: {}", id, e)))
    }
}

/// Typed entities for a listing. Documents that fail to deserialize are
/// logged and left out.
pub fn typed_listing<T: DeserializeOwned>(documents: Vec<Document>) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|document| match document.into_typed() {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!("Skipping listing entry: {}", e);
                None
            }
        })
        .collect()
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut data = self.data.clone();
        data.insert("id".to_string(), Value::String(self.id.clone()));
        data.serialize(serializer)
    }
}

/// Serialize a request type into a JSON object body.
pub fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::BadRequest(format!(
            "Expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
