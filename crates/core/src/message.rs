//! The `Message` envelope transports carry and profiles read fields from.
//!
//! Grounded in `original_source/scrywarden/transport/message.py`: a message
//! is an opaque JSON blob plus an id and a timestamp, and profiles read
//! fields out of it by dotted/indexed path rather than by a fixed schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl Message {
    pub fn new(timestamp: DateTime<Utc>, data: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            data,
        }
    }

    /// Reads a field out of `data` by dotted path (`"user.name"`) with
    /// numeric segments indexing into arrays (`"tags.0"`). Returns `None`
    /// if any segment is missing or the wrong shape, mirroring
    /// `transport/message.py::get`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        get(&self.data, path)
    }
}

/// Standalone form of [`Message::get`], usable on any JSON value (features,
/// collector rows, etc. also carry nested paths worth resolving the same
/// way).
pub fn get<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Enumerates every leaf path reachable from `data`, depth-first, mirroring
/// `transport/message.py::keys`. Used by field definitions that want to
/// discover available paths rather than name one explicitly.
pub fn keys(data: &Value) -> Vec<String> {
    let mut out = Vec::new();
    walk_keys(data, String::new(), &mut out);
    out
}

fn walk_keys(value: &Value, prefix: String, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                walk_keys(child, path, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let path = if prefix.is_empty() {
                    index.to_string()
                } else {
                    format!("{prefix}.{index}")
                };
                walk_keys(child, path, out);
            }
        }
        _ => {
            if !prefix.is_empty() {
                out.push(prefix);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_resolves_nested_object_path() {
        let data = json!({"user": {"name": "alice", "tags": ["a", "b"]}});
        assert_eq!(get(&data, "user.name"), Some(&json!("alice")));
        assert_eq!(get(&data, "user.tags.1"), Some(&json!("b")));
        assert_eq!(get(&data, "user.missing"), None);
        assert_eq!(get(&data, "user.tags.9"), None);
    }

    #[test]
    fn keys_enumerates_every_leaf() {
        let data = json!({"a": 1, "b": {"c": 2, "d": [3, 4]}});
        let mut found = keys(&data);
        found.sort();
        assert_eq!(found, vec!["a", "b.c", "b.d.0", "b.d.1"]);
    }
}
