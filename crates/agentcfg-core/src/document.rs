//! Raw document model
//!
//! A [`RawDocument`] is one configuration source before resolution: a named
//! mapping of entity name to entity fields, tagged with the namespace it
//! belongs to. Documents are consumed by the resolution pipeline and never
//! reach downstream collaborators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// The closed set of entity kinds, one per namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Agent,
    Model,
    Tool,
}

impl EntityKind {
    /// All kinds, in the order the validator processes them.
    pub const ALL: [EntityKind; 3] = [EntityKind::Model, EntityKind::Tool, EntityKind::Agent];

    /// The namespace key used in `${ref:...}` paths and combined documents.
    pub fn namespace(&self) -> &'static str {
        match self {
            EntityKind::Agent => "agents",
            EntityKind::Model => "models",
            EntityKind::Tool => "tools",
        }
    }

    /// Map a namespace key back to its kind.
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "agents" => Some(EntityKind::Agent),
            "models" => Some(EntityKind::Model),
            "tools" => Some(EntityKind::Tool),
            _ => None,
        }
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "agent" | "agents" => Ok(EntityKind::Agent),
            "model" | "models" => Ok(EntityKind::Model),
            "tool" | "tools" => Ok(EntityKind::Tool),
            _ => Err(Error::UnknownKind {
                kind: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Agent => write!(f, "agent"),
            EntityKind::Model => write!(f, "model"),
            EntityKind::Tool => write!(f, "tool"),
        }
    }
}

/// One configuration source for a single namespace.
///
/// Entries keep their source order, duplicates included, so the pipeline
/// can report duplicate names instead of silently keeping the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    kind: EntityKind,
    source: String,
    entries: Vec<(String, Value)>,
}

impl RawDocument {
    /// Create an empty document.
    pub fn new(kind: EntityKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            entries: Vec::new(),
        }
    }

    /// Build a document from a decoded value tree.
    ///
    /// The value must be a mapping of entity name to entity fields; anything
    /// else is a structural error that stops the load immediately.
    pub fn from_value(kind: EntityKind, source: impl Into<String>, value: Value) -> Result<Self> {
        let source = source.into();
        match value {
            Value::Object(map) => Ok(Self {
                kind,
                source,
                entries: map.into_iter().collect(),
            }),
            // An empty YAML file decodes to null.
            Value::Null => Ok(Self::new(kind, source)),
            other => Err(Error::InvalidDocument {
                document: source,
                reason: format!(
                    "expected a mapping of {} names, found {}",
                    kind,
                    value_type_name(&other)
                ),
            }),
        }
    }

    /// Build a document from entries decoded with every key kept.
    pub fn from_entries(
        kind: EntityKind,
        source: impl Into<String>,
        entries: Vec<(String, Value)>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            entries,
        }
    }

    /// Split a combined document (`version`, `agents`, `models`, `tools`
    /// at top level) into one document per namespace.
    pub fn split_combined(source: impl Into<String>, value: Value) -> Result<Vec<Self>> {
        let source = source.into();
        let Value::Object(map) = value else {
            return Err(Error::InvalidDocument {
                document: source,
                reason: format!("expected a mapping, found {}", value_type_name(&value)),
            });
        };
        Self::split_sections(
            source,
            map.into_iter().map(|(key, value)| (key, Section::Value(value))),
        )
    }

    /// Split the top-level sections of a combined document.
    ///
    /// `version` is optional and must be a string. Every other key must
    /// name a namespace.
    pub fn split_sections(
        source: impl Into<String>,
        sections: impl IntoIterator<Item = (String, Section)>,
    ) -> Result<Vec<Self>> {
        let source = source.into();
        let mut documents = Vec::new();
        for (key, section) in sections {
            if key == "version" {
                match section {
                    Section::Value(Value::String(_) | Value::Null) => continue,
                    Section::Value(other) => {
                        return Err(Error::InvalidDocument {
                            document: source,
                            reason: format!(
                                "'version' must be a string, found {}",
                                value_type_name(&other)
                            ),
                        });
                    }
                    Section::Entries(_) => {
                        return Err(Error::InvalidDocument {
                            document: source,
                            reason: "'version' must be a string, found mapping".to_string(),
                        });
                    }
                }
            }
            let Some(kind) = EntityKind::from_namespace(&key) else {
                return Err(Error::InvalidDocument {
                    document: source,
                    reason: format!(
                        "unknown top-level key '{key}' (expected: version, agents, models, tools)"
                    ),
                });
            };
            let document = match section {
                Section::Entries(entries) => Self::from_entries(kind, source.clone(), entries),
                Section::Value(value) => Self::from_value(kind, source.clone(), value)?,
            };
            documents.push(document);
        }
        Ok(documents)
    }

    /// Add an entity, keeping duplicates.
    pub fn with_entity(mut self, name: impl Into<String>, fields: Value) -> Self {
        self.push(name, fields);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, fields: Value) {
        self.entries.push((name.into(), fields));
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<(String, Value)> {
        self.entries
    }
}

/// One top-level section of a combined document
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// A mapping decoded with duplicate keys kept
    Entries(Vec<(String, Value)>),
    /// Any other decoded value
    Value(Value),
}

/// Human-readable name of a value's shape, used in error messages.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Empty mapping with every namespace present, in a fixed order.
pub(crate) fn empty_namespace_tree() -> Map<String, Value> {
    let mut tree = Map::new();
    for kind in [EntityKind::Agent, EntityKind::Model, EntityKind::Tool] {
        tree.insert(kind.namespace().to_string(), Value::Object(Map::new()));
    }
    tree
}
