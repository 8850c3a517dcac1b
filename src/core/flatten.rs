//! Purpose: Flatten workflow batch outputs into typed analysis records.
//! Exports: `Record`, `RESULT_FIELD`, `coerce_record`, `flatten_outputs`.
//! Role: Companion to envelope peeling for batched workflow runs.
//! Invariants: Output preserves batch order and item order within a batch.
//! Invariants: Anything that cannot be coerced becomes the placeholder record.
//! Invariants: Textual results and items get exactly one guarded decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::decode::try_decode;
use crate::core::shape::{Shape, wrapper_payload};

/// Field a batch output uses to carry its result.
pub const RESULT_FIELD: &str = "result";

const NEUTRAL_SENTIMENT: &str = "neutral";

/// One flattened analysis item.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub is_valid: bool,
    pub keywords: Vec<String>,
    pub sentiment: String,
}

impl Record {
    /// Stand-in for items that cannot be coerced.
    pub fn placeholder() -> Self {
        Self {
            is_valid: false,
            keywords: Vec::new(),
            sentiment: NEUTRAL_SENTIMENT.to_string(),
        }
    }
}

/// Coerce one item into a [`Record`].
///
/// Keyed records map field-wise with defaults; textual items get one guarded
/// decode and must decode to a keyed record; everything else is the
/// placeholder.
pub fn coerce_record(item: &Value) -> Record {
    match Shape::of(item) {
        Shape::Record(map) => Record {
            is_valid: map.get("is_valid").map(truthy).unwrap_or(false),
            keywords: map.get("keywords").map(keyword_list).unwrap_or_default(),
            sentiment: map
                .get("sentiment")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .unwrap_or(NEUTRAL_SENTIMENT)
                .to_string(),
        },
        Shape::Text(text) => match try_decode(text) {
            Some(decoded @ Value::Object(_)) => coerce_record(&decoded),
            _ => Record::placeholder(),
        },
        Shape::Sequence(_) | Shape::Primitive => Record::placeholder(),
    }
}

/// Flatten batch outputs into records, one batch's `result` at a time.
///
/// A result may be a sequence of items, a wrapper object whose `data` field
/// holds the items, a single keyed record, or a JSON-encoded string of any of
/// those. Batches without a usable result contribute one placeholder so the
/// output still accounts for them.
pub fn flatten_outputs(batches: &[Value]) -> Vec<Record> {
    let mut records = Vec::new();
    for batch in batches {
        match batch.get(RESULT_FIELD) {
            Some(result) => flatten_result(result, &mut records),
            None => records.push(Record::placeholder()),
        }
    }
    records
}

fn flatten_result(result: &Value, records: &mut Vec<Record>) {
    match Shape::of(result) {
        Shape::Sequence(items) => {
            records.extend(items.iter().map(coerce_record));
        }
        Shape::Record(_) => match wrapper_payload(result) {
            Some(Value::Array(items)) => records.extend(items.iter().map(coerce_record)),
            _ => records.push(coerce_record(result)),
        },
        Shape::Text(text) => match try_decode(text) {
            Some(Value::Array(items)) => records.extend(items.iter().map(|item| coerce_record(item))),
            Some(decoded) => records.push(coerce_record(&decoded)),
            None => records.push(Record::placeholder()),
        },
        Shape::Primitive => records.push(Record::placeholder()),
    }
}

// Workflow outputs mark validity with whatever the model emitted
// (true, 1, "yes"), so any truthy value counts.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(num) => num.as_f64().is_some_and(|val| val != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}

// Keywords should be a list of strings; stray scalars are rendered compactly
// rather than dropped, non-lists are discarded.
fn keyword_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}
