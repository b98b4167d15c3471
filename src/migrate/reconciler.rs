// SPDX-License-Identifier: MIT

//! State-value reconciliation
//!
//! Walks a persisted state value alongside the new definition and replaces
//! every branch that no longer exists with the initial value of the subtree
//! it sits in. Still-valid states are never touched.

use super::operation::{pointer, Operation, VALUE_ROOT};
use super::paths::{qualify, ValidPaths};
use crate::machine::{extend, MachineSchema, StateKind, StateValue};
use std::collections::BTreeMap;

/// Operations repairing `persisted` against `machine`, parents before children
pub fn state_value_operations<M>(
    machine: &M,
    valid: &ValidPaths,
    initial: &StateValue,
    persisted: &StateValue,
) -> Vec<Operation>
where
    M: MachineSchema + ?Sized,
{
    let mut walker = StateWalker {
        machine,
        valid,
        initial,
        operations: Vec::new(),
    };
    walker.walk(persisted, &[]);
    walker.operations
}

struct StateWalker<'a, M: ?Sized> {
    machine: &'a M,
    valid: &'a ValidPaths,
    initial: &'a StateValue,
    operations: Vec<Operation>,
}

impl<M> StateWalker<'_, M>
where
    M: MachineSchema + ?Sized,
{
    fn walk(&mut self, value: &StateValue, path: &[String]) {
        match value {
            StateValue::Leaf(name) => self.visit_leaf(name, path),
            StateValue::Composite(children) => self.visit_composite(children, path),
        }
    }

    fn visit_leaf(&mut self, name: &str, path: &[String]) {
        let full_path = qualify(self.machine.id(), &extend(path, name));
        if self.valid.contains(&full_path) {
            return;
        }
        log::debug!("Invalid state found: {}", full_path);
        self.replace(path);
    }

    fn visit_composite(&mut self, children: &BTreeMap<String, StateValue>, path: &[String]) {
        let is_parallel = self.machine.node_kind(path) == Some(StateKind::Parallel);

        // A compound state must keep exactly one active child, so a vanished
        // child invalidates the whole composite.
        if !is_parallel {
            if let Some(missing) = children
                .keys()
                .find(|key| !self.machine.has_node(&extend(path, key)))
            {
                log::debug!(
                    "Child '{}' of '{}' no longer exists",
                    missing,
                    qualify(self.machine.id(), path)
                );
                self.replace(path);
                return;
            }

            // An atomic child is written as a bare name one level up
            if let Some(atomic) = children
                .keys()
                .find(|key| !self.has_children(&extend(path, key)))
            {
                log::debug!(
                    "'{}' has no child states anymore",
                    qualify(self.machine.id(), &extend(path, atomic))
                );
                self.replace_with(path, StateValue::Leaf(atomic.clone()));
                return;
            }
        }

        for (key, child) in children {
            let child_path = extend(path, key);

            if !self.machine.has_node(&child_path) {
                log::debug!(
                    "Region removed: {}",
                    qualify(self.machine.id(), &child_path)
                );
                self.operations
                    .push(Operation::remove(pointer(VALUE_ROOT, &child_path)));
                continue;
            }

            if let StateValue::Leaf(name) = child {
                let known = self
                    .machine
                    .children(&child_path)
                    .is_some_and(|names| names.iter().any(|n| n == name));
                if !known {
                    log::debug!(
                        "Invalid substate found: {} in {}",
                        name,
                        qualify(self.machine.id(), &child_path)
                    );
                    self.replace(&child_path);
                    continue;
                }
            }

            self.walk(child, &child_path);
        }
    }

    fn has_children(&self, path: &[String]) -> bool {
        self.machine
            .node_kind(path)
            .is_some_and(StateKind::has_children)
    }

    fn replace(&mut self, path: &[String]) {
        let replacement = self.initial_at(path);
        self.replace_with(path, replacement);
    }

    fn replace_with(&mut self, path: &[String], replacement: StateValue) {
        log::debug!(
            "Replacing {} with {}",
            pointer(VALUE_ROOT, path),
            replacement.to_json()
        );
        self.operations
            .push(Operation::replace(pointer(VALUE_ROOT, path), replacement.to_json()));
    }

    /// Initial value at `path`, taken from the initial snapshot when the
    /// position is part of the initial configuration
    fn initial_at(&self, path: &[String]) -> StateValue {
        self.initial
            .at(path)
            .cloned()
            .or_else(|| self.machine.initial_value(path))
            .unwrap_or_else(StateValue::empty)
    }
}
