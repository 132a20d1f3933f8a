//! Field extractors: how a field pulls its raw value out of a [`Message`]
//! before it's handed to a reporter. Grounded in
//! `original_source/scrywarden/profile/fields.py`'s `Single`/`Multi`.

use serde_json::Value;
use warden_core::Message;

use crate::reporters::Reporter;

/// How a field reads its value out of a message.
#[derive(Debug, Clone)]
pub enum Extractor {
    /// Reads one JSON value at `key` (defaults to the field's own name).
    Single { key: Option<String> },
    /// Reads several keys and builds a JSON array from them.
    Multi { keys: Vec<String> },
}

impl Extractor {
    pub fn extract(&self, field_name: &str, message: &Message) -> Option<Value> {
        match self {
            Extractor::Single { key } => {
                let key = key.as_deref().unwrap_or(field_name);
                message.get(key).cloned()
            }
            Extractor::Multi { keys } => Some(Value::Array(
                keys.iter()
                    .map(|key| message.get(key).cloned().unwrap_or(Value::Null))
                    .collect(),
            )),
        }
    }
}

/// One field on a profile: how to extract its value, and the reporter that
/// turns observed values into an anomaly score.
pub struct FieldDefinition {
    pub name: String,
    pub extractor: Extractor,
    pub reporter: Box<dyn Reporter>,
}

impl FieldDefinition {
    pub fn single(name: impl Into<String>, reporter: impl Reporter + 'static) -> Self {
        Self {
            name: name.into(),
            extractor: Extractor::Single { key: None },
            reporter: Box::new(reporter),
        }
    }

    pub fn single_keyed(
        name: impl Into<String>,
        key: impl Into<String>,
        reporter: impl Reporter + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            extractor: Extractor::Single { key: Some(key.into()) },
            reporter: Box::new(reporter),
        }
    }

    pub fn multi(
        name: impl Into<String>,
        keys: Vec<String>,
        reporter: impl Reporter + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            extractor: Extractor::Multi { keys },
            reporter: Box::new(reporter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn message(data: Value) -> Message {
        Message::new(Utc::now(), data)
    }

    #[test]
    fn single_defaults_to_its_own_field_name() {
        let extractor = Extractor::Single { key: None };
        let message = message(json!({"greeting": "hello"}));
        assert_eq!(extractor.extract("greeting", &message), Some(json!("hello")));
    }

    #[test]
    fn multi_builds_an_array_of_the_given_keys() {
        let extractor = Extractor::Multi {
            keys: vec!["a".to_string(), "b".to_string()],
        };
        let message = message(json!({"a": 1, "b": 2}));
        assert_eq!(
            extractor.extract("ignored", &message),
            Some(json!([1, 2])),
        );
    }
}
