// SPDX-License-Identifier: MIT

//! Migration entry points

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::apply::apply_operations;
use super::config::MigrateConfig;
use super::context::context_operations;
use super::operation::Operation;
use super::paths::build_valid_paths;
use super::reconciler::state_value_operations;
use crate::error::Result;
use crate::machine::{MachineSchema, PersistedSnapshot};

/// Generates and applies snapshot migrations
pub trait SnapshotMigrator {
    /// Operations bringing `persisted` into a valid shape under `machine`
    ///
    /// `input` is handed to the definition when computing its initial
    /// context.
    fn generate_migrations<M>(
        &self,
        machine: &M,
        persisted: &PersistedSnapshot,
        input: Option<&Value>,
    ) -> Result<Vec<Operation>>
    where
        M: MachineSchema + ?Sized;

    /// Apply `operations` to a copy of `persisted`
    fn apply_migrations(
        &self,
        persisted: &PersistedSnapshot,
        operations: &[Operation],
    ) -> Result<PersistedSnapshot>;

    /// Generate and apply in one step
    fn migrate<M>(
        &self,
        machine: &M,
        persisted: &PersistedSnapshot,
        input: Option<&Value>,
    ) -> Result<MigrationOutcome>
    where
        M: MachineSchema + ?Sized,
    {
        let operations = self.generate_migrations(machine, persisted, input)?;
        let snapshot = self.apply_migrations(persisted, &operations)?;
        Ok(MigrationOutcome {
            operations,
            snapshot,
        })
    }
}

/// Result of [`SnapshotMigrator::migrate`]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MigrationOutcome {
    pub operations: Vec<Operation>,
    pub snapshot: PersistedSnapshot,
}

impl MigrationOutcome {
    /// True when the persisted snapshot was already valid
    pub fn is_noop(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Default [`SnapshotMigrator`]
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    config: MigrateConfig,
}

impl Migrator {
    pub fn new(config: MigrateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MigrateConfig {
        &self.config
    }
}

impl SnapshotMigrator for Migrator {
    fn generate_migrations<M>(
        &self,
        machine: &M,
        persisted: &PersistedSnapshot,
        input: Option<&Value>,
    ) -> Result<Vec<Operation>>
    where
        M: MachineSchema + ?Sized,
    {
        log::debug!("Generating migrations for machine '{}'", machine.id());

        let valid = build_valid_paths(machine)?;
        let initial = machine.initial_snapshot(input)?;
        log::debug!("Initial value: {}", initial.value.to_json());

        let mut operations =
            state_value_operations(machine, &valid, &initial.value, &persisted.value);
        let value_count = operations.len();
        operations.extend(context_operations(
            &persisted.context,
            &initial.context,
            self.config.context_policy,
        ));

        for op in &operations {
            log::debug!("Migration: {} {}", op.kind(), op.path());
        }
        log::info!(
            "Generated {} migrations for '{}' ({} state value, {} context)",
            operations.len(),
            machine.id(),
            value_count,
            operations.len() - value_count
        );
        Ok(operations)
    }

    fn apply_migrations(
        &self,
        persisted: &PersistedSnapshot,
        operations: &[Operation],
    ) -> Result<PersistedSnapshot> {
        log::debug!("Applying {} migrations", operations.len());
        let migrated = apply_operations(persisted, operations)?;
        log::debug!("Migrated value: {}", migrated.value.to_json());
        Ok(migrated)
    }
}

/// [`SnapshotMigrator::generate_migrations`] with the default configuration
pub fn generate_migrations<M>(
    machine: &M,
    persisted: &PersistedSnapshot,
    input: Option<&Value>,
) -> Result<Vec<Operation>>
where
    M: MachineSchema + ?Sized,
{
    Migrator::default().generate_migrations(machine, persisted, input)
}

/// [`SnapshotMigrator::apply_migrations`] with the default configuration
pub fn apply_migrations(
    persisted: &PersistedSnapshot,
    operations: &[Operation],
) -> Result<PersistedSnapshot> {
    Migrator::default().apply_migrations(persisted, operations)
}
