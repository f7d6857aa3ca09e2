//! Deep merge for state trees.
//!
//! Mappings are merged key by key. Everything else (scalars, arrays, `null`,
//! and a mapping meeting a non-mapping) is replaced wholesale by the value
//! from the partial update.

use serde_json::{Map, Value};

/// Merges `partial` into a copy of `old` and returns the result.
///
/// `old` is left untouched. Keys missing from `partial` are carried over.
pub fn merge(old: &Map<String, Value>, partial: Map<String, Value>) -> Map<String, Value> {
    let mut out = old.clone();
    merge_into(&mut out, partial);
    out
}

/// In-place variant used once the caller already owns a fresh copy.
pub fn merge_into(target: &mut Map<String, Value>, partial: Map<String, Value>) {
    for (key, value) in partial {
        if let Value::Object(update) = value {
            if let Some(Value::Object(existing)) = target.get_mut(&key) {
                merge_into(existing, update);
                continue;
            }
            target.insert(key, Value::Object(update));
        } else {
            target.insert(key, value);
        }
    }
}

/// Human readable name of a JSON value's kind, used in error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            other => panic!("not a tree: {other}"),
        }
    }

    #[test]
    fn nested_update_keeps_siblings() {
        let old = tree(json!({ "a": 1, "b": { "c": 2, "d": 3 } }));
        let out = merge(&old, tree(json!({ "b": { "c": 99 } })));
        assert_eq!(Value::Object(out), json!({ "a": 1, "b": { "c": 99, "d": 3 } }));
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let old = tree(json!({ "items": [1, 2, 3] }));
        let out = merge(&old, tree(json!({ "items": [4] })));
        assert_eq!(out["items"], json!([4]));
    }

    #[test]
    fn mismatched_kinds_replace() {
        let old = tree(json!({ "a": { "x": 1 }, "b": 5 }));
        let out = merge(&old, tree(json!({ "a": "flat", "b": { "y": 2 } })));
        assert_eq!(Value::Object(out), json!({ "a": "flat", "b": { "y": 2 } }));
    }

    #[test]
    fn null_replaces_instead_of_deleting() {
        let old = tree(json!({ "a": 1 }));
        let out = merge(&old, tree(json!({ "a": null })));
        assert!(out.contains_key("a"));
        assert_eq!(out["a"], Value::Null);
    }

    #[test]
    fn old_is_not_mutated() {
        let old = tree(json!({ "a": { "b": 1 } }));
        let snapshot = old.clone();
        let _ = merge(&old, tree(json!({ "a": { "b": 2, "c": 3 } })));
        assert_eq!(old, snapshot);
    }

    #[test]
    fn empty_partial_is_identity() {
        let old = tree(json!({ "a": [1], "b": { "c": true } }));
        assert_eq!(merge(&old, Map::new()), old);
    }
}
