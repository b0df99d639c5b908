//! Substitution engine
//!
//! Walks the namespace tree depth-first and replaces `${env:...}`
//! placeholders in scalar strings. Strings that also contain `${ref:...}`
//! are not rewritten here: their environment parts are filled in and the
//! remaining template is handed to the reference resolver as a pending
//! node. Everything else is left untouched, so a tree without placeholders
//! comes out exactly as it went in.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::env::Environment;
use crate::error::{ConfigError, Location};
use crate::path::FieldPath;
use crate::placeholder::{Placeholder, PlaceholderKind, Segment, Template};
use crate::tree::NamespaceTree;

/// A string waiting on `${ref:...}` targets
#[derive(Debug, Clone, PartialEq)]
pub struct PendingValue {
    pub location: Location,
    /// Literal text and `ref` placeholders only; environment parts are
    /// already substituted
    pub template: Template,
}

/// What one substitution pass did
#[derive(Debug, Default)]
pub struct Substitution {
    /// Strings that need the reference resolver, keyed by tree path
    pub pending: BTreeMap<FieldPath, PendingValue>,
    /// Strings that could not be substituted; anything depending on them
    /// fails without a second error
    pub failed: BTreeSet<FieldPath>,
    /// Paths rewritten in place during this pass
    pub replaced: Vec<FieldPath>,
    pub errors: Vec<ConfigError>,
}

impl Substitution {
    /// True when the pass found nothing left to substitute.
    pub fn is_fixed_point(&self) -> bool {
        self.pending.is_empty() && self.replaced.is_empty() && self.errors.is_empty()
    }

    /// Every path this pass rewrote or left waiting on references.
    pub fn touched(&self) -> impl Iterator<Item = &FieldPath> {
        self.replaced.iter().chain(self.pending.keys())
    }
}

/// Substitutes environment placeholders against one environment snapshot
#[derive(Debug, Clone, Copy)]
pub struct Substituter<'e> {
    env: &'e Environment,
}

impl<'e> Substituter<'e> {
    pub fn new(env: &'e Environment) -> Self {
        Self { env }
    }

    /// Run one pass over the whole tree.
    pub fn substitute_tree(&self, tree: &mut NamespaceTree) -> Substitution {
        self.substitute_pass(tree, &BTreeSet::new())
    }

    /// Run one pass, leaving strings that failed in an earlier pass alone.
    ///
    /// `known_failures` carry over into [`Substitution::failed`] so that
    /// anything depending on them fails quietly.
    pub fn substitute_pass(
        &self,
        tree: &mut NamespaceTree,
        known_failures: &BTreeSet<FieldPath>,
    ) -> Substitution {
        let mut outcome = Substitution {
            failed: known_failures.clone(),
            ..Substitution::default()
        };
        let mut root = std::mem::take(tree.root_mut());
        self.walk(&mut root, &FieldPath::root(), tree, &mut outcome);
        *tree.root_mut() = root;

        tracing::debug!(
            replaced = outcome.replaced.len(),
            pending = outcome.pending.len(),
            errors = outcome.errors.len(),
            "Substitution pass complete"
        );
        outcome
    }

    fn walk(
        &self,
        node: &mut Value,
        path: &FieldPath,
        tree: &NamespaceTree,
        outcome: &mut Substitution,
    ) {
        match node {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    self.walk(child, &path.child(key.as_str()), tree, outcome);
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter_mut().enumerate() {
                    self.walk(child, &path.index(i), tree, outcome);
                }
            }
            Value::String(_) if outcome.failed.contains(path) => {}
            Value::String(text) => {
                if let Some(replacement) = self.substitute_string(text, path, tree, outcome) {
                    *node = replacement;
                    outcome.replaced.push(path.clone());
                }
            }
            _ => {}
        }
    }

    /// Returns the replacement value when the string is rewritten in place.
    fn substitute_string(
        &self,
        text: &str,
        path: &FieldPath,
        tree: &NamespaceTree,
        outcome: &mut Substitution,
    ) -> Option<Value> {
        // Fast path: no placeholder opener at all.
        if !text.contains("${") {
            return None;
        }

        let template = match Template::parse(text) {
            Ok(template) => template,
            Err(err) => {
                outcome.errors.push(ConfigError::PlaceholderSyntax {
                    location: tree.location(path),
                    text: text.to_string(),
                    offset: err.offset,
                    reason: err.reason,
                });
                outcome.failed.insert(path.clone());
                return None;
            }
        };
        if !template.has_placeholders() {
            return None;
        }

        let location = tree.location(path);
        let template = match self.apply_env(template, &location, &mut outcome.errors) {
            Some(template) => template,
            None => {
                outcome.failed.insert(path.clone());
                return None;
            }
        };

        if template.has_references() {
            outcome
                .pending
                .insert(path.clone(), PendingValue { location, template });
            return None;
        }

        Some(Value::String(template.to_string()))
    }

    /// Replace every `env` placeholder with literal text. Returns `None`
    /// after recording an error for each unset variable without a default.
    fn apply_env(
        &self,
        template: Template,
        location: &Location,
        errors: &mut Vec<ConfigError>,
    ) -> Option<Template> {
        let mut segments: Vec<Segment> = Vec::new();
        let mut ok = true;

        for segment in template.into_segments() {
            let segment = match segment {
                Segment::Placeholder(p) if p.kind == PlaceholderKind::Env => {
                    match self.lookup(&p) {
                        Some(value) => Segment::Literal(value),
                        None => {
                            errors.push(ConfigError::MissingEnvironmentVariable {
                                name: p.target.clone(),
                                location: location.clone(),
                            });
                            ok = false;
                            continue;
                        }
                    }
                }
                other => other,
            };
            match (segments.last_mut(), segment) {
                (Some(Segment::Literal(prev)), Segment::Literal(next)) => prev.push_str(&next),
                (_, segment) => segments.push(segment),
            }
        }

        ok.then(|| Template::from_segments(segments))
    }

    /// Resolve one `env` placeholder. An empty default is a real default.
    fn lookup(&self, placeholder: &Placeholder) -> Option<String> {
        self.env
            .get(&placeholder.target)
            .map(str::to_string)
            .or_else(|| placeholder.default.clone())
    }
}

/// One `${env:...}` use found in the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvReference {
    pub name: String,
    pub has_default: bool,
    pub location: Location,
}

/// List every environment variable the tree refers to, in tree order.
///
/// Malformed strings are skipped; the resolution pipeline reports them.
pub fn env_references(tree: &NamespaceTree) -> Vec<EnvReference> {
    let mut found = Vec::new();
    collect_env(tree.root(), &FieldPath::root(), tree, &mut found);
    found
}

fn collect_env(node: &Value, path: &FieldPath, tree: &NamespaceTree, found: &mut Vec<EnvReference>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                collect_env(child, &path.child(key.as_str()), tree, found);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_env(child, &path.index(i), tree, found);
            }
        }
        Value::String(text) => {
            let Ok(template) = Template::parse(text) else {
                return;
            };
            for p in template.placeholders().filter(|p| p.kind == PlaceholderKind::Env) {
                found.push(EnvReference {
                    name: p.target.clone(),
                    has_default: p.default.is_some(),
                    location: tree.location(path),
                });
            }
        }
        _ => {}
    }
}
