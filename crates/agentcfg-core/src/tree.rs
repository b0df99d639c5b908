//! Combined namespace tree
//!
//! All documents are merged into one tree shaped like
//! `{agents: {...}, models: {...}, tools: {...}}` so that `${ref:...}`
//! paths address every loaded value uniformly. The tree remembers which
//! document each entity came from for error locations.

use std::collections::HashMap;

use serde_json::Value;

use crate::document::{EntityKind, RawDocument, empty_namespace_tree};
use crate::error::{ConfigError, ErrorList, Location};
use crate::path::FieldPath;

/// The merged, mutable-until-resolved configuration tree
#[derive(Debug, Clone)]
pub struct NamespaceTree {
    root: Value,
    origins: HashMap<(EntityKind, String), String>,
}

impl NamespaceTree {
    /// Merge documents, rejecting duplicate names within a namespace.
    ///
    /// Every duplicate is reported; nothing else about the documents is
    /// inspected yet.
    pub fn build(documents: Vec<RawDocument>) -> Result<Self, ErrorList> {
        let mut root = empty_namespace_tree();
        let mut origins: HashMap<(EntityKind, String), String> = HashMap::new();
        let mut errors = ErrorList::new();

        for document in documents {
            let kind = document.kind();
            let source = document.source().to_string();
            if document.is_empty() {
                tracing::warn!(document = %source, %kind, "Document defines no entities");
            }
            let Some(Value::Object(namespace)) = root.get_mut(kind.namespace()) else {
                continue;
            };

            for (name, fields) in document.into_entries() {
                let key = (kind, name.clone());
                if let Some(first) = origins.get(&key) {
                    errors.push(ConfigError::DuplicateName {
                        kind,
                        name,
                        first: first.clone(),
                        second: source.clone(),
                    });
                    continue;
                }
                origins.insert(key, source.clone());
                namespace.insert(name, fields);
            }
        }

        errors.into_result(Self {
            root: Value::Object(root),
            origins,
        })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    /// Entities of one kind, in load order.
    pub fn entities(&self, kind: EntityKind) -> impl Iterator<Item = (&String, &Value)> {
        self.root
            .get(kind.namespace())
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|m| m.iter())
    }

    /// Entity names of one kind, in load order.
    pub fn names(&self, kind: EntityKind) -> Vec<String> {
        self.entities(kind).map(|(name, _)| name.clone()).collect()
    }

    /// Source document of an entity.
    pub fn origin(&self, kind: EntityKind, name: &str) -> Option<&str> {
        self.origins
            .get(&(kind, name.to_string()))
            .map(String::as_str)
    }

    /// Document that owns the node at `path`.
    pub fn document_of(&self, path: &FieldPath) -> &str {
        let segments = path.segments();
        segments
            .first()
            .and_then(|ns| EntityKind::from_namespace(ns))
            .zip(segments.get(1))
            .and_then(|(kind, name)| self.origin(kind, name))
            .unwrap_or("<unknown>")
    }

    /// Location of the node at `path`, for error reporting.
    pub fn location(&self, path: &FieldPath) -> Location {
        Location::new(self.document_of(path), path.clone())
    }

    pub fn into_root(self) -> Value {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigErrorKind;
    use serde_json::json;

    #[test]
    fn test_build_merges_namespaces() {
        let tree = NamespaceTree::build(vec![
            RawDocument::new(EntityKind::Model, "models-a.yaml").with_entity("m1", json!({})),
            RawDocument::new(EntityKind::Model, "models-b.yaml").with_entity("m2", json!({})),
            RawDocument::new(EntityKind::Agent, "agents.yaml").with_entity("a", json!({})),
        ])
        .unwrap();

        assert_eq!(tree.names(EntityKind::Model), vec!["m1", "m2"]);
        assert_eq!(tree.names(EntityKind::Agent), vec!["a"]);
        assert!(tree.names(EntityKind::Tool).is_empty());
        assert_eq!(tree.origin(EntityKind::Model, "m2"), Some("models-b.yaml"));
    }

    #[test]
    fn test_build_reports_every_duplicate() {
        let errors = NamespaceTree::build(vec![
            RawDocument::new(EntityKind::Model, "one.yaml")
                .with_entity("standard-assistant", json!({}))
                .with_entity("other", json!({})),
            RawDocument::new(EntityKind::Model, "two.yaml")
                .with_entity("standard-assistant", json!({}))
                .with_entity("other", json!({})),
        ])
        .unwrap_err();

        assert_eq!(errors.count(ConfigErrorKind::DuplicateName), 2);
        let first = errors.iter().next().unwrap();
        assert_eq!(
            first.to_string(),
            "Duplicate model name 'standard-assistant' (defined in one.yaml and two.yaml)"
        );
    }

    #[test]
    fn test_same_name_in_different_kinds_is_fine() {
        let tree = NamespaceTree::build(vec![
            RawDocument::new(EntityKind::Model, "m.yaml").with_entity("search", json!({})),
            RawDocument::new(EntityKind::Tool, "t.yaml").with_entity("search", json!({})),
        ]);
        assert!(tree.is_ok());
    }

    #[test]
    fn test_location_uses_entity_origin() {
        let tree = NamespaceTree::build(vec![
            RawDocument::new(EntityKind::Agent, "agents/analyst.yaml")
                .with_entity("analyst", json!({"model": "m"})),
        ])
        .unwrap();
        let path = FieldPath::parse("agents.analyst.model").unwrap();
        assert_eq!(tree.document_of(&path), "agents/analyst.yaml");
        assert_eq!(
            tree.document_of(&FieldPath::parse("models.x").unwrap()),
            "<unknown>"
        );
    }
}
