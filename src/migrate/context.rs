// SPDX-License-Identifier: MIT

//! Context reconciliation
//!
//! Only structure is reconciled: keys the new definition introduces are added
//! with their defaults, and keys it dropped are removed when the policy allows.
//! Values of keys present on both sides are never touched; the persisted value
//! wins over the new default.

use serde_json::{Map, Value};

use super::config::ContextPolicy;
use super::operation::{Operation, CONTEXT_ROOT};

/// Operations adding new context fields and, under [`ContextPolicy::Prune`],
/// removing dropped ones
pub fn context_operations(
    persisted: &Map<String, Value>,
    initial: &Map<String, Value>,
    policy: ContextPolicy,
) -> Vec<Operation> {
    let old = Value::Object(persisted.clone());
    let new = Value::Object(initial.clone());

    let mut operations = Vec::new();
    for patch_op in json_patch::diff(&old, &new).0 {
        let Some(op) = Operation::from_patch(patch_op) else {
            continue;
        };

        // Array elements are values, not structure
        if has_array_ancestor(&old, op.path()) {
            continue;
        }

        match op {
            Operation::Add { .. } => operations.push(op.prefixed(CONTEXT_ROOT)),
            Operation::Remove { .. } if policy == ContextPolicy::Prune => {
                operations.push(op.prefixed(CONTEXT_ROOT))
            }
            Operation::Remove { ref path } => {
                log::warn!(
                    "Preserving context field '{}' no longer declared by the machine",
                    path
                );
            }
            Operation::Replace { .. } => {}
        }
    }
    operations
}

/// Whether any container above the target of `path` is an array in `doc`
fn has_array_ancestor(doc: &Value, path: &str) -> bool {
    path.match_indices('/')
        .map(|(idx, _)| &path[..idx])
        .any(|prefix| matches!(doc.pointer(prefix), Some(Value::Array(_))))
}
