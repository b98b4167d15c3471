// SPDX-License-Identifier: MIT

//! Snapshot migration
//!
//! Reconciles a persisted snapshot against a newer machine definition:
//! - `build_valid_paths` - every state path the new definition declares
//! - `generate_migrations` - state-value and context operations, in that order
//! - `apply_migrations` - the operations applied to a copy of the snapshot

mod apply;
mod config;
mod context;
mod migrator;
mod operation;
mod paths;
mod reconciler;

pub use apply::apply_operations;
pub use config::{ContextPolicy, MigrateConfig, CONTEXT_POLICY_ENV};
pub use context::context_operations;
pub use migrator::{
    apply_migrations, generate_migrations, MigrationOutcome, Migrator, SnapshotMigrator,
};
pub use operation::{pointer, Operation, CONTEXT_ROOT, VALUE_ROOT};
pub use paths::{build_valid_paths, canonicalize, qualify, ValidPaths};
pub use reconciler::state_value_operations;
