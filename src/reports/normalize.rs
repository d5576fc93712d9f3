// src/reports/normalize.rs

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::models::response::QuestionResponse;

const FLATTENED_PREFIX: &str = "responses.";

/// Question id -> answer record for one student.
pub type ResponseMap = BTreeMap<String, QuestionResponse>;

/// Merges both stored shapes of a response document into one map.
///
/// The nested `responses` object is read first, then every top-level
/// `responses.<id>` field whose value is an object. A flattened record
/// replaces a nested one with the same id.
pub fn normalize_responses(doc: &Map<String, Value>) -> ResponseMap {
    let mut merged = ResponseMap::new();

    if let Some(nested) = doc.get("responses").and_then(Value::as_object) {
        for (question_id, record) in nested {
            merged.insert(question_id.clone(), QuestionResponse::from_value(record));
        }
    }

    for (key, value) in doc {
        let Some(question_id) = key.strip_prefix(FLATTENED_PREFIX) else {
            continue;
        };
        if !value.is_object() {
            continue;
        }
        merged.insert(question_id.to_string(), QuestionResponse::from_value(value));
    }

    merged
}
