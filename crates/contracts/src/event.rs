//! Event payloads
//!
//! Validated single-event and batch requests. Property values are arbitrary
//! JSON; key order is preserved end to end.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A validated single-event call
#[derive(Debug, Clone, PartialEq)]
pub struct SingleEventRequest {
    /// Target collection (non-empty)
    pub collection: String,
    /// Event properties, serialized verbatim as the request body
    pub properties: Value,
}

/// A validated batch call: collection name -> ordered events
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchEventRequest {
    collections: Map<String, Value>,
}

impl BatchEventRequest {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-checked mapping
    ///
    /// Every value must be a JSON array; the validator guarantees this.
    pub fn from_map(collections: Map<String, Value>) -> Self {
        Self { collections }
    }

    /// Append one event to a collection, creating it on first use
    pub fn push(&mut self, collection: impl Into<String>, properties: Value) {
        let entry = self
            .collections
            .entry(collection.into())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(events) = entry {
            events.push(properties);
        }
    }

    /// Collection names in insertion order
    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Number of collections
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Total number of events across all collections
    pub fn event_count(&self) -> usize {
        self.collections
            .values()
            .map(|v| v.as_array().map_or(0, Vec::len))
            .sum()
    }

    /// Underlying mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.collections
    }
}

impl From<BatchEventRequest> for Value {
    fn from(batch: BatchEventRequest) -> Self {
        Value::Object(batch.collections)
    }
}
