//! Typed entity definitions
//!
//! The closed set of entity shapes produced by the validator:
//!
//! - `agents.<name>` - [`AgentDef`]
//! - `models.<name>` - [`ModelDef`]
//! - `tools.<name>` - [`ToolDef`]
//!
//! Each definition is built field by field through a
//! [`FieldReader`](crate::validation::FieldReader), so every field problem
//! is reported and unknown fields are rejected.

pub mod agent;
pub mod model;
pub mod tool;

pub use agent::{AgentDef, SystemPrompt};
pub use model::ModelDef;
pub use tool::{IntegrationType, ToolDef};

use serde::Serialize;

use crate::document::EntityKind;

/// A fully substituted, schema-validated entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResolvedConfig {
    Agent(AgentDef),
    Model(ModelDef),
    Tool(ToolDef),
}

impl ResolvedConfig {
    pub fn kind(&self) -> EntityKind {
        match self {
            ResolvedConfig::Agent(_) => EntityKind::Agent,
            ResolvedConfig::Model(_) => EntityKind::Model,
            ResolvedConfig::Tool(_) => EntityKind::Tool,
        }
    }

    /// Canonical name: the entity's key in its namespace.
    pub fn name(&self) -> &str {
        match self {
            ResolvedConfig::Agent(a) => &a.name,
            ResolvedConfig::Model(m) => &m.name,
            ResolvedConfig::Tool(t) => &t.name,
        }
    }

    /// Human-facing name, falling back to the canonical name.
    pub fn display_name(&self) -> &str {
        match self {
            ResolvedConfig::Agent(a) => a.display_name(),
            ResolvedConfig::Model(m) => m.display_name(),
            ResolvedConfig::Tool(t) => t.display_name(),
        }
    }

    pub fn as_agent(&self) -> Option<&AgentDef> {
        match self {
            ResolvedConfig::Agent(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&ModelDef> {
        match self {
            ResolvedConfig::Model(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_tool(&self) -> Option<&ToolDef> {
        match self {
            ResolvedConfig::Tool(t) => Some(t),
            _ => None,
        }
    }
}
