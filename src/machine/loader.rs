// SPDX-License-Identifier: MIT

//! Machine and snapshot loading
//!
//! Machine definitions are read from YAML or JSON files; persisted snapshots
//! and operation lists are JSON documents.

use super::definition::MachineDefinition;
use super::snapshot::PersistedSnapshot;
use crate::error::Result;
use crate::migrate::Operation;
use std::fs;
use std::path::Path;

/// Loads machine definitions from YAML or JSON files
pub struct MachineLoader;

impl MachineLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a machine definition, choosing the format by file extension
    pub fn load_machine<P: AsRef<Path>>(&self, path: P) -> Result<MachineDefinition> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&content),
            _ => Self::parse_yaml(&content),
        }
    }

    /// Parse a machine definition from a YAML string
    pub fn parse_yaml(content: &str) -> Result<MachineDefinition> {
        let def: MachineDefinition = serde_yaml::from_str(content)?;
        Ok(def)
    }

    /// Parse a machine definition from a JSON string
    pub fn parse_json(content: &str) -> Result<MachineDefinition> {
        let def: MachineDefinition = serde_json::from_str(content)?;
        Ok(def)
    }
}

impl Default for MachineLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads persisted snapshots and stored operation lists
pub struct SnapshotLoader;

impl SnapshotLoader {
    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<PersistedSnapshot> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_operations<P: AsRef<Path>>(path: P) -> Result<Vec<Operation>> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrateError;
    use crate::machine::{MachineSchema, StateKind, StateValue};
    use serde_json::json;

    #[test]
    fn test_parse_yaml_machine() {
        let yaml = r#"
id: nested
initial: parent
context:
  data: ""
states:
  parent:
    initial: child1
    states:
      child1:
        on:
          NEXT: child2
      child2: {}
"#;
        let def = MachineLoader::parse_yaml(yaml).unwrap();
        assert_eq!(def.id, "nested");
        assert_eq!(def.context["data"], json!(""));
        assert_eq!(
            def.node_kind(&["parent".to_string()]),
            Some(StateKind::Compound)
        );
        assert_eq!(
            def.initial_child(&["parent".to_string()]).as_deref(),
            Some("child1")
        );
    }

    #[test]
    fn test_parse_json_machine() {
        let json = r#"{
            "id": "test",
            "initial": "idle",
            "states": { "idle": {}, "active": {} }
        }"#;
        let def = MachineLoader::parse_json(json).unwrap();
        assert_eq!(def.id, "test");
        assert!(def.context.is_empty());
        assert_eq!(def.children(&[]).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_yaml_missing_id() {
        let result = MachineLoader::parse_yaml("states: { idle: {} }");
        assert!(matches!(result, Err(MigrateError::Yaml(_))));
    }

    #[test]
    fn test_load_files_by_extension() {
        let dir = std::env::temp_dir().join(format!("snapmig-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let machine_path = dir.join("machine.json");
        fs::write(
            &machine_path,
            r#"{"id": "m", "initial": "a", "states": {"a": {}}}"#,
        )
        .unwrap();
        let snapshot_path = dir.join("snapshot.json");
        fs::write(
            &snapshot_path,
            r#"{"value": "a", "context": {"n": 1}, "status": "active"}"#,
        )
        .unwrap();
        let ops_path = dir.join("ops.json");
        fs::write(
            &ops_path,
            r#"[{"op": "replace", "path": "/value", "value": "a"}]"#,
        )
        .unwrap();

        let machine = MachineLoader::new().load_machine(&machine_path).unwrap();
        assert_eq!(machine.id, "m");

        let snapshot = SnapshotLoader::load_snapshot(&snapshot_path).unwrap();
        assert_eq!(snapshot.value, StateValue::leaf("a"));
        assert_eq!(snapshot.extra["status"], "active");

        let ops = SnapshotLoader::load_operations(&ops_path).unwrap();
        assert_eq!(ops.len(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let result = MachineLoader::new().load_machine("/nonexistent/machine.yaml");
        assert!(matches!(result, Err(MigrateError::Io(_))));
    }
}
