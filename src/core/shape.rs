//! Purpose: Classify JSON values into the closed shape set envelope handling needs.
//! Exports: `Shape`, `WRAPPER_FIELD`, `wrapper_payload`.
//! Role: Single dispatch point for "what does this value look like" questions.
//! Invariants: Classification is exhaustive; every `Value` variant maps to one shape.
//! Invariants: The wrapper probe only fires on keyed records carrying the field.

use serde_json::{Map, Value};

/// Field a wrapper object uses to carry its payload.
pub const WRAPPER_FIELD: &str = "data";

/// Borrowed classification of a JSON value.
#[derive(Clone, Copy, Debug)]
pub enum Shape<'a> {
    Text(&'a str),
    Sequence(&'a [Value]),
    Record(&'a Map<String, Value>),
    Primitive,
}

impl<'a> Shape<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::String(text) => Shape::Text(text),
            Value::Array(items) => Shape::Sequence(items),
            Value::Object(map) => Shape::Record(map),
            Value::Null | Value::Bool(_) | Value::Number(_) => Shape::Primitive,
        }
    }
}

/// Payload carried by a wrapper object, if `value` is one.
pub fn wrapper_payload(value: &Value) -> Option<&Value> {
    match Shape::of(value) {
        Shape::Record(map) => map.get(WRAPPER_FIELD),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Shape, wrapper_payload};
    use serde_json::json;

    #[test]
    fn classifies_each_variant() {
        assert!(matches!(Shape::of(&json!("x")), Shape::Text("x")));
        assert!(matches!(Shape::of(&json!([1])), Shape::Sequence(_)));
        assert!(matches!(Shape::of(&json!({"a":1})), Shape::Record(_)));
        assert!(matches!(Shape::of(&json!(null)), Shape::Primitive));
        assert!(matches!(Shape::of(&json!(true)), Shape::Primitive));
        assert!(matches!(Shape::of(&json!(2.5)), Shape::Primitive));
    }

    #[test]
    fn wrapper_payload_requires_record_with_field() {
        let wrapped = json!({"data": [1, 2]});
        assert_eq!(wrapper_payload(&wrapped), Some(&json!([1, 2])));
        assert_eq!(wrapper_payload(&json!({"other": 1})), None);
        assert_eq!(wrapper_payload(&json!(["data"])), None);
        assert_eq!(wrapper_payload(&json!("data")), None);
    }

    #[test]
    fn wrapper_payload_accepts_explicit_null() {
        // A present-but-null field still counts as the payload.
        assert_eq!(wrapper_payload(&json!({"data": null})), Some(&json!(null)));
    }
}
