// SPDX-License-Identifier: MIT

//! Declarative machine definitions
//!
//! A definition is a tree of named states loaded from YAML or JSON:
//!
//! ```yaml
//! id: order
//! initial: pending
//! context:
//!   attempts: 0
//! states:
//!   pending: {}
//!   shipping:
//!     initial: packing
//!     states:
//!       packing: {}
//!       in_transit: {}
//! ```
//!
//! Transition tables, actions and guards may be present in the source but are
//! ignored; only the state hierarchy and the initial context matter here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use super::schema::{resolve_initial, MachineSchema, StateKind};
use super::snapshot::{InitialSnapshot, StateValue};
use crate::error::{MigrateError, Result};

const PATH_DELIMITERS: [char; 2] = ['.', '/'];

/// A single state node and its children
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct StateNode {
    /// Explicit kind; inferred from `states` when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<StateKind>,
    /// Child entered when this node is entered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
    /// Child states in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub states: IndexMap<String, StateNode>,
}

impl StateNode {
    pub fn atomic() -> Self {
        Self::default()
    }

    pub fn compound<I>(initial: Option<&str>, states: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, StateNode)>,
    {
        Self {
            kind: None,
            initial: initial.map(str::to_string),
            states: states
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        }
    }

    pub fn parallel<I>(regions: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, StateNode)>,
    {
        Self {
            kind: Some(StateKind::Parallel),
            ..Self::compound(None, regions)
        }
    }

    /// Effective kind of this node
    pub fn kind(&self) -> StateKind {
        match self.kind {
            Some(kind) => kind,
            None if self.states.is_empty() => StateKind::Atomic,
            None => StateKind::Compound,
        }
    }

    fn find(&self, path: &[String]) -> Option<&StateNode> {
        let mut current = self;
        for key in path {
            current = current.states.get(key)?;
        }
        Some(current)
    }

    fn collect_ids(&self, prefix: &str, out: &mut Vec<String>) -> Result<()> {
        out.push(prefix.to_string());
        for (name, child) in &self.states {
            if name.is_empty() || name.contains(PATH_DELIMITERS) {
                return Err(MigrateError::malformed(format!(
                    "state name '{}' under '{}' is empty or contains a path delimiter",
                    name, prefix
                )));
            }
            child.collect_ids(&format!("{}.{}", prefix, name), out)?;
        }
        Ok(())
    }
}

/// Computes the initial context from optional runtime input
#[derive(Clone)]
pub struct ContextFactory(Arc<dyn Fn(Option<&Value>) -> Result<Map<String, Value>> + Send + Sync>);

impl ContextFactory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<Map<String, Value>> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, input: Option<&Value>) -> Result<Map<String, Value>> {
        (self.0)(input)
    }
}

impl fmt::Debug for ContextFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContextFactory(..)")
    }
}

/// Top-level machine definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MachineDefinition {
    /// Root identifier, prefix of every state path
    pub id: String,
    /// Static initial context
    #[serde(default)]
    pub context: Map<String, Value>,
    /// Root state node
    #[serde(flatten)]
    pub root: StateNode,
    /// Dynamic initial context, takes precedence over `context`
    #[serde(skip)]
    pub context_factory: Option<ContextFactory>,
}

impl MachineDefinition {
    pub fn new(id: impl Into<String>, root: StateNode) -> Self {
        Self {
            id: id.into(),
            context: Map::new(),
            root,
            context_factory: None,
        }
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Derive the initial context from runtime input instead of a literal
    pub fn with_context_factory<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<Map<String, Value>> + Send + Sync + 'static,
    {
        self.context_factory = Some(ContextFactory::new(f));
        self
    }

    pub fn node(&self, path: &[String]) -> Option<&StateNode> {
        self.root.find(path)
    }
}

impl MachineSchema for MachineDefinition {
    fn id(&self) -> &str {
        &self.id
    }

    fn state_ids(&self) -> Result<Vec<String>> {
        if self.id.is_empty() {
            return Err(MigrateError::malformed("machine has no id"));
        }
        if self.root.kind().has_children() && self.root.states.is_empty() {
            return Err(MigrateError::malformed(format!(
                "machine '{}' declares {:?} root without states",
                self.id,
                self.root.kind()
            )));
        }

        let mut ids = Vec::new();
        self.root.collect_ids(&self.id, &mut ids)?;
        Ok(ids)
    }

    fn node_kind(&self, path: &[String]) -> Option<StateKind> {
        self.node(path).map(StateNode::kind)
    }

    fn children(&self, path: &[String]) -> Option<Vec<String>> {
        self.node(path)
            .map(|node| node.states.keys().cloned().collect())
    }

    fn initial_child(&self, path: &[String]) -> Option<String> {
        self.node(path)?.initial.clone()
    }

    fn initial_snapshot(&self, input: Option<&Value>) -> Result<InitialSnapshot> {
        let context = match &self.context_factory {
            Some(factory) => factory.call(input)?,
            None => self.context.clone(),
        };
        let value = resolve_initial(self, &[]).unwrap_or_else(StateValue::empty);
        Ok(InitialSnapshot { value, context })
    }
}
