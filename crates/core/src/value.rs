//! Canonical feature-value encoding (§6): every field value a reporter
//! scores is collapsed to a single string, so that `Feature.value` can carry
//! a uniqueness constraint and equality comparisons stay exact across types.

use serde_json::Value;

/// Encodes a JSON value to its canonical string form for use as a
/// `Feature.value`. `Null` and missing values both encode to `""`, matching
/// the original's treatment of missing fields as the empty string (the
/// `Optional` reporter's null-rate scoring depends on this).
pub fn encode_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => canonical_json(other),
    }
}

/// Serializes `value` with object keys sorted, so semantically identical
/// objects always produce the same string regardless of field order.
fn canonical_json(value: &Value) -> String {
    serde_json::to_string(&sort_keys(value)).unwrap_or_default()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_missing_encode_to_empty_string() {
        assert_eq!(encode_value(None), "");
        assert_eq!(encode_value(Some(&Value::Null)), "");
    }

    #[test]
    fn strings_pass_through_unquoted() {
        assert_eq!(encode_value(Some(&json!("alice"))), "alice");
    }

    #[test]
    fn objects_encode_with_sorted_keys_regardless_of_input_order() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(encode_value(Some(&a)), encode_value(Some(&b)));
        assert_eq!(encode_value(Some(&a)), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn numbers_and_bools_stringify() {
        assert_eq!(encode_value(Some(&json!(42))), "42");
        assert_eq!(encode_value(Some(&json!(true))), "true");
    }
}
