// SPDX-License-Identifier: MIT

//! Patch operations
//!
//! Operations serialize exactly as RFC 6902 JSON Patch entries, so a stored
//! migration list can be replayed by any JSON Patch implementation.

use json_patch::{AddOperation, PatchOperation, RemoveOperation, ReplaceOperation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root of the state value inside a snapshot document
pub const VALUE_ROOT: &str = "/value";
/// Root of the context inside a snapshot document
pub const CONTEXT_ROOT: &str = "/context";

/// One step of a migration patch
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
}

impl Operation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::Add {
            path: path.into(),
            value,
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self::Remove { path: path.into() }
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self::Replace {
            path: path.into(),
            value,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. } | Self::Remove { path } | Self::Replace { path, .. } => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Replace { .. } => "replace",
        }
    }

    /// Convert a diff result, dropping `move`, `copy` and `test`
    pub(crate) fn from_patch(op: PatchOperation) -> Option<Self> {
        match op {
            PatchOperation::Add(AddOperation { path, value }) => Some(Self::Add { path, value }),
            PatchOperation::Remove(RemoveOperation { path }) => Some(Self::Remove { path }),
            PatchOperation::Replace(ReplaceOperation { path, value }) => {
                Some(Self::Replace { path, value })
            }
            _ => None,
        }
    }

    /// Re-root the operation under `prefix`
    pub(crate) fn prefixed(self, prefix: &str) -> Self {
        match self {
            Self::Add { path, value } => Self::add(format!("{}{}", prefix, path), value),
            Self::Remove { path } => Self::remove(format!("{}{}", prefix, path)),
            Self::Replace { path, value } => Self::replace(format!("{}{}", prefix, path), value),
        }
    }
}

impl From<Operation> for PatchOperation {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Add { path, value } => PatchOperation::Add(AddOperation { path, value }),
            Operation::Remove { path } => PatchOperation::Remove(RemoveOperation { path }),
            Operation::Replace { path, value } => {
                PatchOperation::Replace(ReplaceOperation { path, value })
            }
        }
    }
}

/// Build a JSON pointer from a root and unescaped keys
pub fn pointer(root: &str, keys: &[String]) -> String {
    let mut out = root.to_string();
    for key in keys {
        out.push('/');
        out.push_str(&key.replace('~', "~0").replace('/', "~1"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_as_json_patch() {
        let ops = vec![
            Operation::add("/context/newProp", json!("default")),
            Operation::remove("/context/oldProp"),
            Operation::replace("/value", json!("idle")),
        ];
        assert_eq!(
            serde_json::to_value(&ops).unwrap(),
            json!([
                {"op": "add", "path": "/context/newProp", "value": "default"},
                {"op": "remove", "path": "/context/oldProp"},
                {"op": "replace", "path": "/value", "value": "idle"}
            ])
        );
    }

    #[test]
    fn test_deserialize_rejects_unknown_op() {
        let result: Result<Operation, _> =
            serde_json::from_value(json!({"op": "move", "from": "/a", "path": "/b"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_pointer_escapes_keys() {
        let keys = vec!["a/b".to_string(), "c~d".to_string()];
        assert_eq!(pointer(VALUE_ROOT, &keys), "/value/a~1b/c~0d");
        assert_eq!(pointer(VALUE_ROOT, &[]), "/value");
    }

    #[test]
    fn test_prefixed() {
        let op = Operation::add("/newProp", json!(1)).prefixed(CONTEXT_ROOT);
        assert_eq!(op.path(), "/context/newProp");
        assert_eq!(op.kind(), "add");
    }
}
