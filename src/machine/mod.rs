// SPDX-License-Identifier: MIT

//! Machine definitions and snapshots
//!
//! This module provides:
//! - `MachineSchema` - the read-only view migration needs from a definition
//! - `MachineDefinition` - declarative state trees loaded from YAML or JSON
//! - `PersistedSnapshot` / `StateValue` - what an actor runtime saved

mod definition;
mod loader;
mod schema;
mod snapshot;

pub use definition::{ContextFactory, MachineDefinition, StateNode};
pub use loader::{MachineLoader, SnapshotLoader};
pub use schema::{MachineSchema, StateKind};
pub use snapshot::{InitialSnapshot, PersistedSnapshot, StateValue};

pub(crate) use schema::extend;
