// SPDX-License-Identifier: MIT

//! Migration configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::MigrateError;

/// Environment variable overriding [`ContextPolicy`]
pub const CONTEXT_POLICY_ENV: &str = "SNAPMIG_CONTEXT_POLICY";

/// What to do with persisted context fields the new definition no longer declares
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContextPolicy {
    /// Keep them untouched (default)
    #[default]
    Preserve,
    /// Emit `remove` operations for them
    Prune,
}

impl FromStr for ContextPolicy {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "prune" => Ok(Self::Prune),
            other => Err(MigrateError::invalid_input(format!(
                "unknown context policy '{}', expected 'preserve' or 'prune'",
                other
            ))),
        }
    }
}

/// Settings for [`Migrator`](super::Migrator)
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct MigrateConfig {
    #[serde(default)]
    pub context_policy: ContextPolicy,
}

impl MigrateConfig {
    /// Defaults, overridden by `SNAPMIG_CONTEXT_POLICY` when set
    pub fn from_env() -> Result<Self, MigrateError> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(CONTEXT_POLICY_ENV) {
            config.context_policy = raw.parse()?;
        }
        Ok(config)
    }

    pub fn with_context_policy(mut self, policy: ContextPolicy) -> Self {
        self.context_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preserves_context() {
        assert_eq!(MigrateConfig::default().context_policy, ContextPolicy::Preserve);
    }

    #[test]
    fn test_deserialize_yaml() {
        let config: MigrateConfig = serde_yaml::from_str("context_policy: prune").unwrap();
        assert_eq!(config.context_policy, ContextPolicy::Prune);

        let empty: MigrateConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(empty.context_policy, ContextPolicy::Preserve);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Prune".parse::<ContextPolicy>().unwrap(), ContextPolicy::Prune);
        assert_eq!(
            " preserve ".parse::<ContextPolicy>().unwrap(),
            ContextPolicy::Preserve
        );
        assert!("drop".parse::<ContextPolicy>().is_err());
    }

    #[test]
    fn test_from_env() {
        std::env::set_var(CONTEXT_POLICY_ENV, "prune");
        assert_eq!(
            MigrateConfig::from_env().unwrap().context_policy,
            ContextPolicy::Prune
        );

        std::env::set_var(CONTEXT_POLICY_ENV, "shred");
        assert!(matches!(
            MigrateConfig::from_env(),
            Err(MigrateError::InvalidInput(_))
        ));

        std::env::remove_var(CONTEXT_POLICY_ENV);
        assert_eq!(MigrateConfig::from_env().unwrap(), MigrateConfig::default());
    }
}
