// SPDX-License-Identifier: MIT

//! Valid state paths of a machine definition

use std::collections::HashSet;

use crate::error::{MigrateError, Result};
use crate::machine::{MachineSchema, StateValue};

/// Every state node of a definition as a `/`-separated path rooted at the
/// machine id (`test`, `test/parent/child1`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidPaths {
    paths: HashSet<String>,
}

impl ValidPaths {
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Fully qualified paths of the leaves in `value` that are not valid
    pub fn invalid_leaves(&self, machine_id: &str, value: &StateValue) -> Vec<String> {
        value
            .leaf_paths()
            .into_iter()
            .map(|keys| qualify(machine_id, &keys))
            .filter(|path| !self.contains(path))
            .collect()
    }
}

/// Collect the valid paths of `machine`
///
/// Fails when the definition exposes no usable state index.
pub fn build_valid_paths<M>(machine: &M) -> Result<ValidPaths>
where
    M: MachineSchema + ?Sized,
{
    let paths: HashSet<String> = machine
        .state_ids()?
        .iter()
        .map(|id| canonicalize(id))
        .collect();
    let valid = ValidPaths { paths };
    if valid.is_empty() {
        return Err(MigrateError::malformed(format!(
            "machine '{}' exposes no states",
            machine.id()
        )));
    }
    log::debug!("Built {} valid paths for '{}'", valid.len(), machine.id());
    Ok(valid)
}

/// Normalize dotted ids to the `/` convention
pub fn canonicalize(raw: &str) -> String {
    raw.replace('.', "/")
}

/// Join the machine id and relative keys into a canonical path
pub fn qualify(machine_id: &str, keys: &[String]) -> String {
    let mut out = canonicalize(machine_id);
    for key in keys {
        out.push('/');
        out.push_str(&canonicalize(key));
    }
    out
}
