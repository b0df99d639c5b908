//! Configuration registry
//!
//! The immutable output of a resolution run: validated entities indexed by
//! kind and name. A registry is never mutated after construction. Reloading
//! builds a new registry and swaps it into a [`RegistryHandle`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::document::EntityKind;
use crate::error::{Error, Result};
use crate::schema::{AgentDef, IntegrationType, ModelDef, ResolvedConfig, ToolDef};

/// A validated entity together with the document it came from
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub source: String,
    pub config: ResolvedConfig,
}

/// Read-only mapping of `(kind, name)` to [`ResolvedConfig`]
///
/// # Example
///
/// ```
/// use agentcfg_core::{EntityKind, Environment, RawDocument, ResolutionContext};
/// use serde_json::json;
///
/// let models = RawDocument::from_value(
///     EntityKind::Model,
///     "models.yaml",
///     json!({"gpt": {"provider": "openai", "endpoint": "https://api.openai.com"}}),
/// )
/// .unwrap();
///
/// let registry = ResolutionContext::new(vec![models], Environment::new())
///     .resolve()
///     .unwrap();
/// assert_eq!(registry.model("gpt").unwrap().provider, "openai");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<(EntityKind, String), usize>,
}

impl ConfigRegistry {
    /// Build from the validator's success output, keeping its order.
    pub(crate) fn new(entries: Vec<RegistryEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| ((e.config.kind(), e.config.name().to_string()), i))
            .collect();
        Self { entries, index }
    }

    fn entry(&self, kind: EntityKind, name: &str) -> Result<&RegistryEntry> {
        self.index
            .get(&(kind, name.to_string()))
            .map(|&i| &self.entries[i])
            .ok_or_else(|| Error::NotFound {
                kind,
                name: name.to_string(),
            })
    }

    /// Look up one entity.
    pub fn get(&self, kind: EntityKind, name: &str) -> Result<&ResolvedConfig> {
        self.entry(kind, name).map(|e| &e.config)
    }

    /// All entities of one kind, in load order.
    pub fn list(&self, kind: EntityKind) -> Vec<&ResolvedConfig> {
        self.entries
            .iter()
            .map(|e| &e.config)
            .filter(|c| c.kind() == kind)
            .collect()
    }

    pub fn names(&self, kind: EntityKind) -> Vec<&str> {
        self.list(kind).into_iter().map(ResolvedConfig::name).collect()
    }

    /// Name of the document an entity was loaded from.
    pub fn source_of(&self, kind: EntityKind, name: &str) -> Result<&str> {
        self.entry(kind, name).map(|e| e.source.as_str())
    }

    pub fn agent(&self, name: &str) -> Result<&AgentDef> {
        self.get(EntityKind::Agent, name)
            .map(|c| c.as_agent())?
            .ok_or_else(|| not_found(EntityKind::Agent, name))
    }

    pub fn model(&self, name: &str) -> Result<&ModelDef> {
        self.get(EntityKind::Model, name)
            .map(|c| c.as_model())?
            .ok_or_else(|| not_found(EntityKind::Model, name))
    }

    pub fn tool(&self, name: &str) -> Result<&ToolDef> {
        self.get(EntityKind::Tool, name)
            .map(|c| c.as_tool())?
            .ok_or_else(|| not_found(EntityKind::Tool, name))
    }

    pub fn agents(&self) -> impl Iterator<Item = &AgentDef> {
        self.entries.iter().filter_map(|e| e.config.as_agent())
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelDef> {
        self.entries.iter().filter_map(|e| e.config.as_model())
    }

    pub fn tools(&self) -> impl Iterator<Item = &ToolDef> {
        self.entries.iter().filter_map(|e| e.config.as_tool())
    }

    /// The model an agent runs on.
    pub fn model_for(&self, agent: &str) -> Result<&ModelDef> {
        let agent = self.agent(agent)?;
        self.model(&agent.model)
    }

    /// An agent's tools, in declared order.
    pub fn tools_for(&self, agent: &str) -> Result<Vec<&ToolDef>> {
        let agent = self.agent(agent)?;
        agent.tools.iter().map(|t| self.tool(t)).collect()
    }

    pub fn tools_by_type(&self, integration_type: IntegrationType) -> Vec<&ToolDef> {
        self.tools()
            .filter(|t| t.integration_type == integration_type)
            .collect()
    }

    /// Number of entities of one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entries
            .iter()
            .filter(|e| e.config.kind() == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn not_found(kind: EntityKind, name: &str) -> Error {
    Error::NotFound {
        kind,
        name: name.to_string(),
    }
}

/// Shared holder of the current registry
///
/// Readers take a snapshot with [`current`](Self::current) and keep using it
/// even if a reload replaces the registry meanwhile.
#[derive(Debug, Default)]
pub struct RegistryHandle {
    current: RwLock<Arc<ConfigRegistry>>,
}

impl RegistryHandle {
    pub fn new(registry: ConfigRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// Snapshot of the registry in effect right now.
    pub fn current(&self) -> Arc<ConfigRegistry> {
        Arc::clone(&self.current.read())
    }

    /// Install a new registry, returning the one it replaces.
    pub fn replace(&self, registry: ConfigRegistry) -> Arc<ConfigRegistry> {
        let mut guard = self.current.write();
        let previous = std::mem::replace(&mut *guard, Arc::new(registry));
        tracing::debug!(
            previous = previous.len(),
            current = guard.len(),
            "Registry replaced"
        );
        previous
    }
}
