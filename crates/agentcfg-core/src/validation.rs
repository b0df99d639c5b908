//! Schema and cross-reference validation
//!
//! Runs on the fully substituted tree. Every entity is checked on its own
//! and every field of every entity is checked, so one run reports all
//! problems at once. Cross-references are checked for agents whose own
//! schema is valid.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::document::{EntityKind, value_type_name};
use crate::error::{ConfigError, ErrorList};
use crate::registry::RegistryEntry;
use crate::schema::{AgentDef, ModelDef, ResolvedConfig, ToolDef};
use crate::tree::NamespaceTree;

/// Field name used for problems with the entity as a whole.
pub const ENTITY_FIELD: &str = "<entity>";

const UNKNOWN_DOCUMENT: &str = "<unknown>";

/// Validate every entity in the tree.
///
/// Returns the typed entities in load order (models, then tools, then
/// agents) or every error found.
pub fn validate(tree: &NamespaceTree) -> Result<Vec<RegistryEntry>, ErrorList> {
    validate_except(tree, &HashSet::new())
}

/// Validate every entity except those in `skip`.
///
/// Skipped entities already failed resolution. Their names still count as
/// declared for cross-reference checks.
pub fn validate_except(
    tree: &NamespaceTree,
    skip: &HashSet<(EntityKind, String)>,
) -> Result<Vec<RegistryEntry>, ErrorList> {
    let mut errors: Vec<ConfigError> = Vec::new();
    let mut entries = Vec::new();

    for kind in EntityKind::ALL {
        for (name, fields) in tree.entities(kind) {
            if skip.contains(&(kind, name.clone())) {
                continue;
            }
            let document = tree.origin(kind, name).unwrap_or(UNKNOWN_DOCUMENT);
            if let Some(config) = validate_entity(kind, name, document, fields, &mut errors) {
                entries.push(RegistryEntry {
                    source: document.to_string(),
                    config,
                });
            }
        }
    }

    check_cross_references(tree, &entries, &mut errors);

    tracing::debug!(
        valid = entries.len(),
        errors = errors.len(),
        "Validation complete"
    );
    ErrorList::from(errors).into_result(entries)
}

/// Check one entity against its kind's schema.
pub fn validate_entity(
    kind: EntityKind,
    name: &str,
    document: &str,
    fields: &Value,
    errors: &mut Vec<ConfigError>,
) -> Option<ResolvedConfig> {
    let before = errors.len();
    if name.is_empty() || name.contains('.') {
        errors.push(schema_error(
            kind,
            name,
            document,
            ENTITY_FIELD,
            "entity names must be non-empty and must not contain '.'",
        ));
    }

    let Value::Object(fields) = fields else {
        errors.push(schema_error(
            kind,
            name,
            document,
            ENTITY_FIELD,
            format!("expected a mapping of fields, found {}", value_type_name(fields)),
        ));
        return None;
    };

    let mut reader = FieldReader::new(kind, name, document, "", fields, errors);
    let config = match kind {
        EntityKind::Agent => AgentDef::read(name, &mut reader).map(ResolvedConfig::Agent),
        EntityKind::Model => ModelDef::read(name, &mut reader).map(ResolvedConfig::Model),
        EntityKind::Tool => ToolDef::read(name, &mut reader).map(ResolvedConfig::Tool),
    };
    let clean = reader.finish();

    if let Some(config) = &config {
        if config.display_name() != name {
            tracing::debug!(%kind, entity = name, display = config.display_name(), "Display name differs from entity key");
        }
    }
    config.filter(|_| clean && errors.len() == before)
}

fn check_cross_references(
    tree: &NamespaceTree,
    entries: &[RegistryEntry],
    errors: &mut Vec<ConfigError>,
) {
    let models: HashSet<String> = tree.names(EntityKind::Model).into_iter().collect();
    let tools: HashSet<String> = tree.names(EntityKind::Tool).into_iter().collect();

    for (agent, document) in entries
        .iter()
        .filter_map(|e| e.config.as_agent().map(|a| (a, &e.source)))
    {
        if !models.contains(&agent.model) {
            errors.push(ConfigError::CrossReference {
                agent: agent.name.clone(),
                field: "model".to_string(),
                target: EntityKind::Model,
                missing: agent.model.clone(),
                document: document.clone(),
            });
        }
        for tool in agent.tools.iter().filter(|t| !tools.contains(*t)) {
            errors.push(ConfigError::CrossReference {
                agent: agent.name.clone(),
                field: "tools".to_string(),
                target: EntityKind::Tool,
                missing: tool.clone(),
                document: document.clone(),
            });
        }
    }
}

fn schema_error(
    kind: EntityKind,
    entity: &str,
    document: &str,
    field: &str,
    reason: impl Into<String>,
) -> ConfigError {
    ConfigError::Schema {
        kind,
        entity: entity.to_string(),
        field: field.to_string(),
        reason: reason.into(),
        document: document.to_string(),
    }
}

/// Reads typed fields out of one mapping and records every problem.
///
/// Each accessor marks its field as known. [`FieldReader::finish`] then
/// rejects whatever was not read, so typos never pass through silently.
pub struct FieldReader<'a> {
    kind: EntityKind,
    entity: &'a str,
    document: &'a str,
    prefix: String,
    fields: &'a Map<String, Value>,
    known: Vec<&'static str>,
    errors: &'a mut Vec<ConfigError>,
    failed: bool,
}

impl<'a> FieldReader<'a> {
    pub fn new(
        kind: EntityKind,
        entity: &'a str,
        document: &'a str,
        prefix: &str,
        fields: &'a Map<String, Value>,
        errors: &'a mut Vec<ConfigError>,
    ) -> Self {
        Self {
            kind,
            entity,
            document,
            prefix: prefix.to_string(),
            fields,
            known: Vec::new(),
            errors,
            failed: false,
        }
    }

    fn field_name(&self, field: &str) -> String {
        format!("{}{}", self.prefix, field)
    }

    /// Record a rule violation on `field`.
    pub fn invalid(&mut self, field: &str, reason: impl Into<String>) {
        let field = self.field_name(field);
        self.errors
            .push(schema_error(self.kind, self.entity, self.document, &field, reason));
        self.failed = true;
    }

    /// Fetch a field, treating explicit null as absent.
    fn get(&mut self, field: &'static str) -> Option<&'a Value> {
        self.known.push(field);
        self.fields.get(field).filter(|v| !v.is_null())
    }

    fn wrong_type(&mut self, field: &str, expected: &str, found: &Value) {
        let reason = format!("expected {expected}, found {}", value_type_name(found));
        self.invalid(field, reason);
    }

    pub fn required_str(&mut self, field: &'static str) -> Option<String> {
        match self.get(field) {
            None => {
                self.invalid(field, "required field is missing");
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.invalid(field, "must not be empty");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.wrong_type(field, "a string", other);
                None
            }
        }
    }

    pub fn optional_str(&mut self, field: &'static str) -> Option<String> {
        match self.get(field) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.wrong_type(field, "a string", other);
                None
            }
        }
    }

    /// A list of strings; absent means empty.
    pub fn optional_str_list(&mut self, field: &'static str) -> Vec<String> {
        let items = match self.get(field) {
            None => return Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.wrong_type(field, "a list of strings", other);
                return Vec::new();
            }
        };

        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => out.push(s.clone()),
                other => self.wrong_type(&format!("{field}.{i}"), "a string", other),
            }
        }
        out
    }

    pub fn required_map(&mut self, field: &'static str) -> Option<Map<String, Value>> {
        match self.get(field) {
            None => {
                self.invalid(field, "required field is missing");
                None
            }
            Some(Value::Object(map)) => Some(map.clone()),
            Some(other) => {
                self.wrong_type(field, "a mapping", other);
                None
            }
        }
    }

    /// A free-form mapping; absent means empty.
    pub fn optional_map(&mut self, field: &'static str) -> Map<String, Value> {
        match self.get(field) {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                self.wrong_type(field, "a mapping", other);
                Map::new()
            }
        }
    }

    /// A nested mapping with its own strict schema.
    pub fn optional_nested<T>(
        &mut self,
        field: &'static str,
        read: impl FnOnce(&mut FieldReader<'_>) -> Option<T>,
    ) -> Option<T> {
        let nested = match self.get(field) {
            None => return None,
            Some(Value::Object(map)) => map,
            Some(other) => {
                self.wrong_type(field, "a mapping", other);
                return None;
            }
        };

        let prefix = format!("{}{}.", self.prefix, field);
        let mut reader =
            FieldReader::new(self.kind, self.entity, self.document, &prefix, nested, &mut *self.errors);
        let value = read(&mut reader);
        let clean = reader.finish();
        if !clean {
            self.failed = true;
        }
        value.filter(|_| clean)
    }

    /// Reject unread fields. Returns true when no problem was recorded.
    pub fn finish(mut self) -> bool {
        let fields = self.fields;
        let unknown: Vec<&String> = fields
            .keys()
            .filter(|k| !self.known.contains(&k.as_str()))
            .collect();

        for key in unknown {
            let reason = match suggest(key, &self.known, 2) {
                Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
                None => "unknown field".to_string(),
            };
            self.invalid(key, reason);
        }
        !self.failed
    }
}

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Closest candidate within `max_distance` edits.
fn suggest<'k>(needle: &str, candidates: &[&'k str], max_distance: usize) -> Option<&'k str> {
    let mut best: Option<(&'k str, usize)> = None;
    for &candidate in candidates {
        let d = levenshtein(needle, candidate);
        if d > 0 && d <= max_distance && best.is_none_or(|(_, bd)| d < bd) {
            best = Some((candidate, d));
        }
    }
    best.map(|(s, _)| s)
}
