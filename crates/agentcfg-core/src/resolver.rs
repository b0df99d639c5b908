//! Reference graph resolver
//!
//! Resolves pending `${ref:...}` strings against the namespace tree.
//!
//! Nodes of the dependency graph are tree paths. Resolving a node may
//! require other nodes first:
//!
//! - a pending string needs every path its `ref` placeholders name;
//! - a path below a pending string needs that string resolved first, since
//!   the string may expand into the mapping being navigated;
//! - a path whose subtree holds pending strings needs all of them.
//!
//! Traversal is depth-first over an explicit stack rather than host
//! recursion. A dependency that is already on the stack is a cycle and is
//! reported with the full chain. Resolved values are memoized by path, so
//! a target referenced from many places is computed once per pass.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde_json::Value;

use crate::error::{ConfigError, Location};
use crate::path::FieldPath;
use crate::placeholder::Segment;
use crate::substitute::{PendingValue, Substitution};
use crate::tree::NamespaceTree;

enum Step {
    /// All dependencies are resolved; this is the node's final value
    Ready(Value),
    /// This dependency must be resolved first
    Needs(FieldPath),
    /// The path does not exist in the tree
    Missing,
}

/// Outcome of resolving one pass
#[derive(Debug, Default)]
pub struct Resolution {
    pub errors: Vec<ConfigError>,
    /// Paths that could not be resolved, including those that failed
    /// during substitution
    pub failed: BTreeSet<FieldPath>,
}

/// Resolves one pass worth of pending references
pub struct ReferenceResolver<'t> {
    tree: &'t mut NamespaceTree,
    pending: BTreeMap<FieldPath, PendingValue>,
    memo: HashMap<FieldPath, Value>,
    failed: BTreeSet<FieldPath>,
    /// Reference targets that do not exist; kept apart from `failed` since
    /// they name no node that could own an error
    missing: BTreeSet<FieldPath>,
    errors: Vec<ConfigError>,
}

impl<'t> ReferenceResolver<'t> {
    /// Prepare to resolve the pending strings of one substitution pass.
    pub fn new(tree: &'t mut NamespaceTree, substitution: Substitution) -> Self {
        Self {
            tree,
            pending: substitution.pending,
            memo: HashMap::new(),
            failed: substitution.failed,
            missing: BTreeSet::new(),
            errors: Vec::new(),
        }
    }

    /// Resolve every pending string and write the results into the tree.
    ///
    /// Strings that could not be resolved are left as they were.
    pub fn resolve_all(mut self) -> Resolution {
        let locations: Vec<FieldPath> = self.pending.keys().cloned().collect();
        tracing::debug!(pending = locations.len(), "Resolving references");

        for location in locations {
            if !self.is_settled(&location) {
                self.resolve(location);
            }
        }

        tracing::debug!(
            resolved = self.memo.len(),
            failed = self.failed.len(),
            "Reference resolution complete"
        );
        Resolution {
            errors: self.errors,
            failed: self.failed,
        }
    }

    fn is_settled(&self, path: &FieldPath) -> bool {
        self.memo.contains_key(path) || self.failed.contains(path) || self.missing.contains(path)
    }

    fn resolve(&mut self, start: FieldPath) {
        let mut stack: Vec<FieldPath> = vec![start.clone()];
        let mut on_stack: HashSet<FieldPath> = HashSet::from([start]);

        while let Some(top) = stack.last().cloned() {
            if self.is_settled(&top) {
                stack.pop();
                on_stack.remove(&top);
                continue;
            }

            match self.step(&top) {
                Step::Ready(value) => {
                    self.settle(&top, value);
                    stack.pop();
                    on_stack.remove(&top);
                }
                Step::Missing => {
                    self.missing.insert(top.clone());
                    stack.pop();
                    on_stack.remove(&top);
                }
                Step::Needs(dep) if self.missing.contains(&dep) => {
                    let requested_by = self.requester(&top);
                    self.errors.push(ConfigError::UnresolvedReference {
                        path: dep,
                        requested_by,
                    });
                    self.failed.insert(top.clone());
                    stack.pop();
                    on_stack.remove(&top);
                }
                Step::Needs(dep) if self.failed.contains(&dep) => {
                    // Already reported where it failed.
                    self.failed.insert(top.clone());
                    stack.pop();
                    on_stack.remove(&top);
                }
                Step::Needs(dep) if on_stack.contains(&dep) => {
                    let start = stack.iter().position(|p| *p == dep).unwrap_or(0);
                    let mut cycle: Vec<FieldPath> = stack[start..].to_vec();
                    cycle.push(dep);
                    tracing::debug!(length = cycle.len() - 1, "Reference cycle detected");
                    self.errors.push(ConfigError::CyclicReference { cycle });
                    for member in stack.drain(start..) {
                        on_stack.remove(&member);
                        self.failed.insert(member);
                    }
                }
                Step::Needs(dep) => {
                    on_stack.insert(dep.clone());
                    stack.push(dep);
                }
            }
        }
    }

    /// Work out the next thing `path` is waiting on, or its value.
    fn step(&self, path: &FieldPath) -> Step {
        if let Some(pending) = self.pending.get(path) {
            return self.step_pending(pending);
        }

        for ancestor in path.ancestors() {
            if self.failed.contains(&ancestor) {
                return Step::Needs(ancestor);
            }
            if self.pending.contains_key(&ancestor) && !self.memo.contains_key(&ancestor) {
                return Step::Needs(ancestor);
            }
        }

        let Some(value) = path.lookup(self.tree.root()) else {
            return Step::Missing;
        };

        if let Some(below) = self.first_failed_below(path) {
            return Step::Needs(below);
        }
        let unresolved_below = self
            .pending
            .range(path.clone()..)
            .take_while(|(p, _)| p.starts_with(path))
            .map(|(p, _)| p)
            .find(|p| !self.memo.contains_key(*p));
        if let Some(below) = unresolved_below {
            return Step::Needs(below.clone());
        }

        Step::Ready(value.clone())
    }

    fn step_pending(&self, pending: &PendingValue) -> Step {
        for placeholder in pending.template.placeholders() {
            let Some(target) = placeholder.reference_path() else {
                continue;
            };
            if !self.memo.contains_key(&target) {
                return Step::Needs(target);
            }
        }
        Step::Ready(self.render(pending))
    }

    fn first_failed_below(&self, path: &FieldPath) -> Option<FieldPath> {
        self.failed
            .range(path.clone()..)
            .take_while(|p| p.starts_with(path))
            .next()
            .cloned()
    }

    /// Build the final value of a pending string from memoized targets.
    ///
    /// A string that is exactly one reference takes the target's value with
    /// its type; otherwise every part is rendered as text.
    fn render(&self, pending: &PendingValue) -> Value {
        if let Some(target) = pending
            .template
            .as_single()
            .and_then(|p| p.reference_path())
        {
            if let Some(value) = self.memo.get(&target) {
                return value.clone();
            }
        }

        let mut text = String::new();
        for segment in pending.template.segments() {
            match segment {
                Segment::Literal(literal) => text.push_str(literal),
                Segment::Placeholder(p) => match p.reference_path().and_then(|t| self.memo.get(&t)) {
                    Some(value) => text.push_str(&value_as_text(value)),
                    None => text.push_str(&p.to_string()),
                },
            }
        }
        Value::String(text)
    }

    fn settle(&mut self, path: &FieldPath, value: Value) {
        if self.pending.contains_key(path) {
            if let Some(slot) = path.lookup_mut(self.tree.root_mut()) {
                *slot = value.clone();
            }
        }
        self.memo.insert(path.clone(), value);
    }

    /// Where the string waiting on `path` was written.
    fn requester(&self, path: &FieldPath) -> Location {
        self.pending
            .get(path)
            .map(|p| p.location.clone())
            .unwrap_or_else(|| self.tree.location(path))
    }
}

/// Text form of a value spliced into a larger string.
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
