// SPDX-License-Identifier: MIT

//! The narrow interface migration needs from a machine definition
//!
//! Paths are relative to the machine root: `[]` is the root itself,
//! `["parent", "child1"]` is a grandchild.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::snapshot::{InitialSnapshot, StateValue};
use crate::error::Result;

/// Kind of a state node
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    /// No child states
    Atomic,
    /// Exactly one child active at a time
    Compound,
    /// Every child region active at once
    Parallel,
    /// Terminal state, no children
    Final,
}

impl StateKind {
    pub fn has_children(self) -> bool {
        matches!(self, Self::Compound | Self::Parallel)
    }
}

/// Read-only view of a machine definition
pub trait MachineSchema {
    /// Globally unique root identifier
    fn id(&self) -> &str;

    /// Dotted id of every state node, root included (`test`, `test.idle`)
    fn state_ids(&self) -> Result<Vec<String>>;

    /// Kind of the node at `path`, `None` if no such node exists
    fn node_kind(&self, path: &[String]) -> Option<StateKind>;

    /// Child names of the node at `path` in declaration order
    fn children(&self, path: &[String]) -> Option<Vec<String>>;

    /// Declared `initial` child of the node at `path`
    fn initial_child(&self, path: &[String]) -> Option<String>;

    /// Value and context a fresh instance starts with for the given input
    fn initial_snapshot(&self, input: Option<&Value>) -> Result<InitialSnapshot>;

    fn has_node(&self, path: &[String]) -> bool {
        self.node_kind(path).is_some()
    }

    /// Initial state value of the subtree rooted at `path`
    ///
    /// Atomic nodes resolve to an empty composite.
    fn initial_value(&self, path: &[String]) -> Option<StateValue> {
        self.node_kind(path)?;
        Some(resolve_initial(self, path).unwrap_or_else(StateValue::empty))
    }
}

/// Initial value below the node at `path`, `None` for nodes without children.
/// Compound nodes without a declared `initial` enter their first child.
pub(crate) fn resolve_initial<M>(machine: &M, path: &[String]) -> Option<StateValue>
where
    M: MachineSchema + ?Sized,
{
    let kind = machine.node_kind(path)?;
    let children = machine.children(path).unwrap_or_default();

    match kind {
        StateKind::Atomic | StateKind::Final => None,
        StateKind::Compound => {
            let chosen = machine
                .initial_child(path)
                .or_else(|| children.first().cloned())?;
            let child_path = extend(path, &chosen);
            match resolve_initial(machine, &child_path) {
                Some(nested) => Some(StateValue::composite([(chosen, nested)])),
                None => Some(StateValue::Leaf(chosen)),
            }
        }
        StateKind::Parallel => Some(StateValue::composite(children.into_iter().map(|region| {
            let region_path = extend(path, &region);
            let value = resolve_initial(machine, &region_path).unwrap_or_else(StateValue::empty);
            (region, value)
        }))),
    }
}

pub(crate) fn extend(path: &[String], key: &str) -> Vec<String> {
    let mut next = path.to_vec();
    next.push(key.to_string());
    next
}
