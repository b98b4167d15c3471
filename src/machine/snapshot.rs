// SPDX-License-Identifier: MIT

//! State values and snapshots

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Which state(s) are active: a single state name, or a mapping from
/// child/region name to a nested state value
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    /// An atomic state name
    Leaf(String),
    /// Nested or parallel composition
    Composite(BTreeMap<String, StateValue>),
}

impl StateValue {
    /// An empty composite, the value of an atomic parallel region
    pub fn empty() -> Self {
        Self::Composite(BTreeMap::new())
    }

    pub fn leaf(name: impl Into<String>) -> Self {
        Self::Leaf(name.into())
    }

    /// Build a composite from `(key, value)` pairs
    pub fn composite<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, StateValue)>,
    {
        Self::Composite(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Child value under `key` of a composite
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        match self {
            Self::Composite(children) => children.get(key),
            Self::Leaf(_) => None,
        }
    }

    /// Follow a relative path of keys through nested composites
    pub fn at(&self, path: &[String]) -> Option<&StateValue> {
        let mut current = self;
        for key in path {
            current = current.get(key)?;
        }
        Some(current)
    }

    /// Every active leaf as the key path leading to it, leaf name last
    pub fn leaf_paths(&self) -> Vec<Vec<String>> {
        let mut out = Vec::new();
        collect_leaves(self, &mut Vec::new(), &mut out);
        out
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Leaf(name) => Value::String(name.clone()),
            Self::Composite(children) => Value::Object(
                children
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn collect_leaves(value: &StateValue, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    match value {
        StateValue::Leaf(name) => {
            let mut path = prefix.clone();
            path.push(name.clone());
            out.push(path);
        }
        StateValue::Composite(children) => {
            for (key, child) in children {
                prefix.push(key.clone());
                collect_leaves(child, prefix, out);
                prefix.pop();
            }
        }
    }
}

impl From<&str> for StateValue {
    fn from(name: &str) -> Self {
        Self::Leaf(name.to_string())
    }
}

/// A snapshot persisted by an actor runtime at some point in the past
///
/// Fields other than `value` and `context` (`status`, `historyValue`, ...)
/// are carried through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PersistedSnapshot {
    pub value: StateValue,
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PersistedSnapshot {
    pub fn new(value: StateValue, context: Map<String, Value>) -> Self {
        Self {
            value,
            context,
            extra: Map::new(),
        }
    }

    /// Parse a snapshot from an arbitrary JSON document
    pub fn from_json(value: Value) -> crate::error::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> crate::error::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// The state value and context a fresh instance of a definition starts with
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InitialSnapshot {
    pub value: StateValue,
    pub context: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_value_deserialize() {
        let leaf: StateValue = serde_json::from_value(json!("idle")).unwrap();
        assert_eq!(leaf, StateValue::leaf("idle"));

        let nested: StateValue =
            serde_json::from_value(json!({"parent": {"child1": "subChild2"}})).unwrap();
        assert_eq!(
            nested,
            StateValue::composite([(
                "parent",
                StateValue::composite([("child1", StateValue::leaf("subChild2"))])
            )])
        );
    }

    #[test]
    fn test_at_and_get() {
        let value: StateValue =
            serde_json::from_value(json!({"foo": "active", "bar": {"x": "y"}})).unwrap();

        assert_eq!(value.get("foo"), Some(&StateValue::leaf("active")));
        assert_eq!(
            value.at(&["bar".to_string(), "x".to_string()]),
            Some(&StateValue::leaf("y"))
        );
        assert_eq!(value.at(&[]), Some(&value));
        assert!(value.at(&["missing".to_string()]).is_none());
        assert!(StateValue::leaf("idle").get("anything").is_none());
    }

    #[test]
    fn test_leaf_paths() {
        let value: StateValue =
            serde_json::from_value(json!({"foo": "active", "bar": {"x": "y"}})).unwrap();
        assert_eq!(
            value.leaf_paths(),
            vec![
                vec!["bar".to_string(), "x".to_string(), "y".to_string()],
                vec!["foo".to_string(), "active".to_string()],
            ]
        );
        assert!(StateValue::empty().leaf_paths().is_empty());
    }

    #[test]
    fn test_snapshot_keeps_passthrough_fields() {
        let raw = json!({
            "value": "active",
            "context": {"count": 5},
            "status": "active",
            "historyValue": {}
        });
        let snapshot = PersistedSnapshot::from_json(raw.clone()).unwrap();

        assert_eq!(snapshot.value, StateValue::leaf("active"));
        assert_eq!(snapshot.context["count"], 5);
        assert_eq!(snapshot.extra["status"], "active");
        assert_eq!(snapshot.to_json().unwrap(), raw);
    }

    #[test]
    fn test_snapshot_missing_context_defaults_empty() {
        let snapshot = PersistedSnapshot::from_json(json!({"value": "idle"})).unwrap();
        assert!(snapshot.context.is_empty());
    }
}
