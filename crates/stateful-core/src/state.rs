use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::StateError;
use crate::merge::{kind_of, merge};

/// Immutable snapshot of an object's private state.
///
/// Cloning is cheap; every `set_state` produces a new snapshot, so a `State`
/// obtained earlier keeps its value forever.
#[derive(Clone, Default, PartialEq)]
pub struct State(Rc<Map<String, Value>>);

impl State {
    /// The empty tree every stateful object starts with.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(Rc::new(map))
    }

    /// Returns a new snapshot with `partial` deep-merged over this one.
    pub fn merged(&self, partial: Map<String, Value>) -> Self {
        Self(Rc::new(merge(&self.0, partial)))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// JSON pointer lookup into nested fields, e.g. `"/user/name"`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        if pointer.is_empty() {
            return None;
        }
        let rest = pointer.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        let head = head.replace("~1", "/").replace("~0", "~");
        let value = self.0.get(&head)?;
        if tail.is_empty() {
            Some(value)
        } else {
            value.pointer(tail)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object((*self.0).clone())
    }

    /// True when both snapshots are the same allocation, not merely equal.
    pub fn ptr_eq(&self, other: &State) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&*self.0) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl PartialEq<Value> for State {
    fn eq(&self, other: &Value) -> bool {
        matches!(other, Value::Object(map) if *map == *self.0)
    }
}

impl From<Map<String, Value>> for State {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

/// Checks that `value` can be used as a partial update and unwraps its fields.
pub fn partial(value: Value) -> Result<Map<String, Value>, StateError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StateError::NotATree {
            found: kind_of(&other),
        }),
    }
}

/// Construction options understood by the stateful initializer.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StatefulOptions {
    /// Fields merged into the empty tree at construction. No change event is
    /// emitted for the seed.
    #[serde(default)]
    pub state: Option<Map<String, Value>>,
}

impl StatefulOptions {
    pub fn with_state(state: Map<String, Value>) -> Self {
        Self { state: Some(state) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pointer_walks_nested_fields() {
        let s = State::empty().merged(partial(json!({ "user": { "name": "ada", "a/b": 1 } })).unwrap());
        assert_eq!(s.pointer("/user/name"), Some(&json!("ada")));
        assert_eq!(s.pointer("/user/a~1b"), Some(&json!(1)));
        assert_eq!(s.pointer("/user/missing"), None);
        assert_eq!(s.pointer(""), None);
    }

    #[test]
    fn rejects_non_tree_partials() {
        assert_eq!(
            partial(json!([1, 2])),
            Err(StateError::NotATree { found: "an array" })
        );
        assert!(partial(json!({})).is_ok());
    }

    #[test]
    fn options_deserialize_from_json() {
        let opts: StatefulOptions = serde_json::from_value(json!({ "state": { "open": true } })).unwrap();
        assert_eq!(opts.state.unwrap()["open"], json!(true));

        let opts: StatefulOptions = serde_json::from_value(json!({})).unwrap();
        assert!(opts.state.is_none());
    }

    #[test]
    fn display_is_json() {
        let s = State::empty().merged(partial(json!({ "x": 5 })).unwrap());
        assert_eq!(s.to_string(), r#"{"x":5}"#);
        assert_eq!(serde_json::to_value(&s).unwrap(), json!({ "x": 5 }));
    }
}
