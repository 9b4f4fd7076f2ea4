//! Open-ended JSON document type.

use crate::keys::ID_FIELD;
use crate::{StoreError, StoreResult};
use paymeta_id::MetadataId;
use serde_json::{Map, Value};

/// A payment-metadata document.
///
/// Documents are arbitrary JSON objects. The only field the storage layer interprets is `id`,
/// which it sets to the document's identifier on every write and every read.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns a string field, if present and a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// The embedded `id` field.
    pub fn id(&self) -> Option<&str> {
        self.get_str(ID_FIELD)
    }

    /// Tags the document with `id`, replacing any existing value.
    pub fn with_id(mut self, id: &MetadataId) -> Self {
        self.0.insert(ID_FIELD.into(), Value::String(id.to_string()));
        self
    }

    pub(crate) fn to_json_bytes(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec_pretty(&self.0).map_err(StoreError::Serialization)
    }

    pub(crate) fn from_json_bytes(bytes: &[u8]) -> StoreResult<Self> {
        let value: Value = serde_json::from_slice(bytes).map_err(StoreError::Deserialization)?;
        Self::try_from(value)
    }
}

impl TryFrom<Value> for Document {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(StoreError::NotAnObject),
        }
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        Value::Object(document.0)
    }
}
