//! Payload validation
//!
//! Rules:
//! - single event: collection name non-empty, properties present (not null)
//! - batch: a JSON object whose values are arrays of objects
//!
//! Property contents are never inspected; the server rejects bad ones.

use contracts::{BatchEventRequest, DispatchError, SingleEventRequest};
use serde_json::Value;

/// Validate a single-event call
pub fn validate_single(
    collection: &str,
    properties: Value,
) -> Result<SingleEventRequest, DispatchError> {
    if collection.trim().is_empty() {
        return Err(DispatchError::validation(
            "missing event collection name",
        ));
    }

    if properties.is_null() {
        return Err(DispatchError::validation(format!(
            "missing properties for collection '{collection}'"
        )));
    }

    Ok(SingleEventRequest {
        collection: collection.to_string(),
        properties,
    })
}

/// Validate a batch call
pub fn validate_batch(batch: Value) -> Result<BatchEventRequest, DispatchError> {
    let map = match batch {
        Value::Object(map) => map,
        other => {
            return Err(DispatchError::validation(format!(
                "batch must be a map of collection names to event arrays, got {}",
                describe(&other)
            )))
        }
    };

    for (collection, events) in &map {
        let Some(events) = events.as_array() else {
            return Err(DispatchError::validation(format!(
                "collection '{collection}' must map to an array of events, got {}",
                describe(events)
            )));
        };

        if let Some(index) = events.iter().position(|e| !e.is_object()) {
            return Err(DispatchError::validation(format!(
                "event {index} in collection '{collection}' must be an object, got {}",
                describe(&events[index])
            )));
        }
    }

    Ok(BatchEventRequest::from_map(map))
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(s) if s.is_empty() => "an empty string",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
