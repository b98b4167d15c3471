// SPDX-License-Identifier: MIT

//! Migrate persisted state-machine snapshots to newer machine definitions.
//!
//! ```no_run
//! use snapmig_rs::machine::{MachineLoader, SnapshotLoader};
//! use snapmig_rs::migrate::{apply_migrations, generate_migrations};
//!
//! # fn main() -> snapmig_rs::error::Result<()> {
//! let machine = MachineLoader::new().load_machine("order.yaml")?;
//! let persisted = SnapshotLoader::load_snapshot("snapshot.json")?;
//!
//! let operations = generate_migrations(&machine, &persisted, None)?;
//! let migrated = apply_migrations(&persisted, &operations)?;
//! # let _ = migrated;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod machine;
pub mod migrate;

pub use error::{MigrateError, Result};
