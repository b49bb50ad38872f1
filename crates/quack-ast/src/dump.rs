//! Structural tree dump.
//!
//! Each node becomes an object whose first key is its `kind`, followed by one
//! key per child tag in first-seen order. A tag with several children maps to
//! an array. Output is therefore deterministic regardless of how the producer
//! interleaved tags.

use serde_json::{Map, Value};

use crate::{Node, Payload};

/// Converts a tree into its structural JSON form.
pub fn to_json(node: &Node) -> Value {
    let mut object = Map::new();
    object.insert("kind".to_string(), Value::String(node.kind().to_string()));

    match node.payload() {
        Some(Payload::Int(value)) => {
            object.insert("value".to_string(), Value::from(*value));
        }
        Some(Payload::Text(text)) => {
            object.insert("value".to_string(), Value::String(text.clone()));
        }
        None => {
            for tag in node.tags() {
                let group = node.get_all(*tag);
                let entry = match group {
                    [only] => to_json(only),
                    _ => Value::Array(group.iter().map(to_json).collect()),
                };
                object.insert(tag.to_string(), entry);
            }
        }
    }

    Value::Object(object)
}

/// Pretty-printed structural dump.
pub fn to_pretty_string(node: &Node) -> String {
    // Serializing a `Value` cannot fail.
    serde_json::to_string_pretty(&to_json(node)).unwrap_or_default()
}
