//! Purpose: Normalize loosely-typed workflow response envelopes.
//! Exports: `peel_str`, `peel_value`.
//! Role: Core unwrapping logic; pure, total, no I/O.
//! Invariants: Only the top-level decode of textual input can fail the operation.
//! Invariants: Payload and per-item decode failures keep the original value in place.
//! Invariants: Sequence items are decoded one level; decoded sequences are not descended.

use serde_json::Value;

use crate::core::decode::{Decoded, decode_str};
use crate::core::shape::WRAPPER_FIELD;

/// Normalize a textual envelope.
///
/// Returns `None` when the input is not valid JSON; no payload can be
/// recovered in that case.
pub fn peel_str(input: &str) -> Option<Value> {
    match decode_str(input) {
        Decoded::Parsed(value) => Some(peel_value(value)),
        Decoded::Raw => None,
    }
}

/// Normalize an already-structured envelope.
///
/// Unwraps a `data` wrapper field if present, re-decodes a textual payload,
/// and decodes textual sequence items one level. Not idempotent in general:
/// a string kept verbatim by one pass may decode on a later pass if the
/// surrounding layers changed.
pub fn peel_value(envelope: Value) -> Value {
    let payload = redecode_text(take_payload(envelope));
    match payload {
        Value::Array(items) => Value::Array(items.into_iter().map(redecode_text).collect()),
        other => other,
    }
}

// Owned counterpart of `shape::wrapper_payload`. A present-but-null field
// still counts as the payload; the rest of the wrapper is dropped.
fn take_payload(envelope: Value) -> Value {
    match envelope {
        Value::Object(mut map) => match map.remove(WRAPPER_FIELD) {
            Some(payload) => payload,
            None => Value::Object(map),
        },
        other => other,
    }
}

fn redecode_text(value: Value) -> Value {
    match value {
        Value::String(text) => match decode_str(&text) {
            Decoded::Parsed(decoded) => decoded,
            Decoded::Raw => Value::String(text),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::{peel_str, peel_value};
    use serde_json::json;

    #[test]
    fn textual_non_wrapper_decodes_to_value() {
        assert_eq!(peel_str("{\"a\":1}"), Some(json!({"a":1})));
        assert_eq!(peel_str("[1,2,3]"), Some(json!([1, 2, 3])));
        assert_eq!(peel_str("42"), Some(json!(42)));
        assert_eq!(peel_str("null"), Some(json!(null)));
    }

    #[test]
    fn malformed_top_level_is_fatal() {
        assert_eq!(peel_str("{not json"), None);
        assert_eq!(peel_str(""), None);
    }

    #[test]
    fn structured_value_without_wrapper_passes_through() {
        let value = json!({"status": "ok", "count": 2});
        assert_eq!(peel_value(value.clone()), value);
        assert_eq!(peel_value(json!(true)), json!(true));
    }

    #[test]
    fn wrapper_field_is_extracted() {
        assert_eq!(peel_value(json!({"data": {"x": 1}})), json!({"x": 1}));
        assert_eq!(peel_value(json!({"data": null})), json!(null));
    }

    #[test]
    fn encoded_payload_string_is_decoded() {
        let envelope = json!({"data": "{\"x\":1}"});
        assert_eq!(peel_value(envelope), json!({"x": 1}));
    }

    #[test]
    fn undecodable_payload_string_is_kept() {
        let envelope = json!({"data": "not valid json"});
        assert_eq!(peel_value(envelope), json!("not valid json"));
    }

    #[test]
    fn encoded_array_payload_decodes_items_one_level() {
        let envelope = json!({"data": "[\"1\", \"{\\\"a\\\":1}\", \"plain\"]"});
        assert_eq!(peel_value(envelope), json!([1, {"a": 1}, "plain"]));
    }

    #[test]
    fn sequence_items_decode_independently() {
        let envelope = json!({"data": ["1", "{\"a\":1}", "plain", 7, null]});
        assert_eq!(peel_value(envelope), json!([1, {"a": 1}, "plain", 7, null]));
    }

    #[test]
    fn nested_encoded_sequences_are_not_descended() {
        // The item decodes to an array whose own items stay encoded.
        let envelope = json!({"data": ["[\"1\", \"2\"]"]});
        assert_eq!(peel_value(envelope), json!([["1", "2"]]));
    }

    #[test]
    fn full_textual_round_trip() {
        let input = "{\"data\": \"[\\\"1\\\", \\\"{\\\\\\\"a\\\\\\\":1}\\\", \\\"plain\\\"]\"}";
        assert_eq!(peel_str(input), Some(json!([1, {"a": 1}, "plain"])));
    }

    #[test]
    fn second_pass_may_decode_further() {
        // Idempotence is not guaranteed: a kept string can decode once the
        // wrapper above it is gone.
        let envelope = json!({"data": {"data": "[1]"}});
        let first = peel_value(envelope);
        assert_eq!(first, json!({"data": "[1]"}));
        assert_eq!(peel_value(first), json!([1]));
    }
}
