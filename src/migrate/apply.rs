// SPDX-License-Identifier: MIT

//! Applying operation lists to persisted snapshots

use json_patch::{Patch, PatchOperation};

use super::operation::Operation;
use crate::error::Result;
use crate::machine::PersistedSnapshot;

/// Apply `operations` in order to a deep copy of `persisted`
///
/// Any operation that cannot be resolved aborts the whole application and
/// nothing is returned; the input is never modified.
pub fn apply_operations(
    persisted: &PersistedSnapshot,
    operations: &[Operation],
) -> Result<PersistedSnapshot> {
    let mut document = serde_json::to_value(persisted)?;
    let patch = Patch(
        operations
            .iter()
            .cloned()
            .map(PatchOperation::from)
            .collect(),
    );
    json_patch::patch(&mut document, &patch)?;
    Ok(serde_json::from_value(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrateError;
    use crate::machine::StateValue;
    use serde_json::json;

    fn snapshot(raw: serde_json::Value) -> PersistedSnapshot {
        PersistedSnapshot::from_json(raw).unwrap()
    }

    #[test]
    fn test_apply_add_context() {
        let persisted = snapshot(json!({
            "context": {"count": 5},
            "value": "active",
            "status": "active"
        }));
        let ops = vec![Operation::add("/context/newProp", json!("default"))];

        let migrated = apply_operations(&persisted, &ops).unwrap();
        assert_eq!(
            serde_json::to_value(&migrated.context).unwrap(),
            json!({"count": 5, "newProp": "default"})
        );
        assert_eq!(migrated.extra["status"], "active");
        assert!(!persisted.context.contains_key("newProp"));
    }

    #[test]
    fn test_apply_replace_value() {
        let persisted = snapshot(json!({
            "context": {},
            "value": "nonexistentState",
            "status": "active"
        }));
        let ops = vec![Operation::replace("/value", json!("idle"))];

        let migrated = apply_operations(&persisted, &ops).unwrap();
        assert_eq!(migrated.value, StateValue::leaf("idle"));
        assert_eq!(persisted.value, StateValue::leaf("nonexistentState"));
    }

    #[test]
    fn test_empty_list_returns_equal_copy() {
        let persisted = snapshot(json!({"value": {"a": "b"}, "context": {"x": [1, 2]}}));
        assert_eq!(apply_operations(&persisted, &[]).unwrap(), persisted);
    }

    #[test]
    fn test_missing_parent_fails() {
        let persisted = snapshot(json!({"value": "idle", "context": {}}));
        let ops = vec![
            Operation::add("/context/ok", json!(1)),
            Operation::add("/context/missing/child", json!(1)),
        ];

        let result = apply_operations(&persisted, &ops);
        assert!(matches!(
            result,
            Err(MigrateError::UnresolvablePatch { .. })
        ));
    }

    #[test]
    fn test_remove_then_use_removed_parent_fails() {
        let persisted = snapshot(json!({
            "value": {"foo": "a", "bar": "b"},
            "context": {}
        }));
        let ops = vec![
            Operation::remove("/value/foo"),
            Operation::replace("/value/foo", json!("x")),
        ];
        assert!(apply_operations(&persisted, &ops).is_err());
    }
}
