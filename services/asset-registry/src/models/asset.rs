// Asset record held by the registry
// Records are schemaless JSON; only the top-level "id" field has meaning here

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Asset record as posted by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asset(Value);

impl Asset {
    pub fn new(value: Value) -> Self {
        Asset(value)
    }

    /// Lookup key; absent when the record has no string "id" field
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Exact string match on "id". A numeric id never matches.
    pub fn has_id(&self, id: &str) -> bool {
        self.id() == Some(id)
    }

    /// Shallow merge: top-level fields of `patch` overwrite ours.
    /// A patch that is not an object contributes nothing.
    pub fn merge(&mut self, patch: Value) {
        if let (Value::Object(fields), Value::Object(updates)) = (&mut self.0, patch) {
            for (key, value) in updates {
                fields.insert(key, value);
            }
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Asset {
    fn from(value: Value) -> Self {
        Asset(value)
    }
}

/// `{ message, asset? }` body returned by mutating routes and 404s
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<Asset>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            asset: None,
        }
    }

    pub fn with_asset(message: impl Into<String>, asset: Asset) -> Self {
        Self {
            message: message.into(),
            asset: Some(asset),
        }
    }
}
