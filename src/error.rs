// SPDX-License-Identifier: MIT

//! Typed error handling for snapmig-rs
//!
//! Every fallible library operation returns [`MigrateError`]. The CLI wraps
//! these in `anyhow` for file-level context.

use thiserror::Error;

/// Top-level error type for snapshot migration
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The machine definition does not expose a usable state index
    #[error("Malformed machine definition: {0}")]
    MalformedDefinition(String),

    /// An operation could not be resolved against the snapshot being patched
    #[error("Unresolvable patch: {message}")]
    UnresolvablePatch { message: String },

    /// Runtime input rejected while computing the initial snapshot
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl MigrateError {
    /// Create a malformed-definition error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDefinition(message.into())
    }

    /// Create an invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<json_patch::PatchError> for MigrateError {
    fn from(err: json_patch::PatchError) -> Self {
        Self::UnresolvablePatch {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
