//! Resolution context and pipeline
//!
//! A [`ResolutionContext`] owns everything one resolution run needs: the
//! raw documents, an environment snapshot and the options. Running it
//! drives the whole engine:
//!
//! 1. merge documents, rejecting duplicate names
//! 2. substitute and resolve, repeating until a pass changes nothing
//! 3. validate schemas and cross-references
//! 4. build the registry
//!
//! Errors from every stage are aggregated. Nothing is shared between
//! contexts, so independent runs can proceed on separate threads.

use std::collections::{BTreeSet, HashSet};

use crate::document::{EntityKind, RawDocument};
use crate::env::Environment;
use crate::error::{ConfigError, ErrorList, Result};
use crate::path::FieldPath;
use crate::registry::ConfigRegistry;
use crate::resolver::ReferenceResolver;
use crate::substitute::{EnvReference, Substituter, env_references};
use crate::tree::NamespaceTree;
use crate::validation::validate_except;

/// Default bound on substitution passes.
pub const DEFAULT_MAX_PASSES: usize = 8;

/// Tunables for one resolution run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionOptions {
    /// Passes allowed before a still-changing tree is reported as
    /// `ResolutionDidNotConverge`
    pub max_passes: usize,
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl ResolutionOptions {
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }
}

/// Inputs of one resolution run
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    documents: Vec<RawDocument>,
    env: Environment,
    options: ResolutionOptions,
}

impl ResolutionContext {
    pub fn new(documents: Vec<RawDocument>, env: Environment) -> Self {
        Self {
            documents,
            env,
            options: ResolutionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolutionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn documents(&self) -> &[RawDocument] {
        &self.documents
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn options(&self) -> ResolutionOptions {
        self.options
    }

    /// Resolve and validate everything, producing a registry or every
    /// error found.
    pub fn resolve(&self) -> Result<ConfigRegistry> {
        let mut tree = NamespaceTree::build(self.documents.clone())?;
        let mut errors = ErrorList::new();

        let failed = self.run_passes(&mut tree, &mut errors);
        let skip = failed_entities(&tree, &failed);

        match validate_except(&tree, &skip) {
            Ok(entries) if errors.is_empty() => {
                let registry = ConfigRegistry::new(entries);
                tracing::info!(
                    agents = registry.count(EntityKind::Agent),
                    models = registry.count(EntityKind::Model),
                    tools = registry.count(EntityKind::Tool),
                    "Configuration registry built"
                );
                Ok(registry)
            }
            Ok(_) => Err(errors.into()),
            Err(validation) => {
                errors.extend(validation);
                Err(errors.into())
            }
        }
    }

    /// Every `${env:...}` use in the documents, with its location.
    pub fn env_references(&self) -> Result<Vec<EnvReference>> {
        let tree = NamespaceTree::build(self.documents.clone())?;
        Ok(env_references(&tree))
    }

    /// Substitute and resolve until a pass finds nothing to do.
    ///
    /// Returns the paths that failed.
    fn run_passes(&self, tree: &mut NamespaceTree, errors: &mut ErrorList) -> BTreeSet<FieldPath> {
        let substituter = Substituter::new(&self.env);
        let mut failed = BTreeSet::new();
        let mut pass = 0;

        loop {
            let substitution = substituter.substitute_pass(tree, &failed);
            if substitution.is_fixed_point() {
                tracing::debug!(passes = pass, "Resolution reached a fixed point");
                return failed;
            }

            pass += 1;
            if pass > self.options.max_passes {
                let remaining: Vec<_> = substitution
                    .touched()
                    .map(|path| tree.location(path))
                    .collect();
                tracing::debug!(remaining = remaining.len(), "Resolution did not converge");
                failed.extend(substitution.touched().cloned());
                errors.push(ConfigError::ResolutionDidNotConverge {
                    passes: self.options.max_passes,
                    remaining,
                });
                return failed;
            }

            tracing::debug!(
                pass,
                replaced = substitution.replaced.len(),
                pending = substitution.pending.len(),
                "Substitution pass"
            );
            errors.extend(substitution.errors.iter().cloned());
            let resolution = ReferenceResolver::new(tree, substitution).resolve_all();
            errors.extend(resolution.errors);
            failed = resolution.failed;
        }
    }
}

/// Entities that own at least one failed path present in the tree.
fn failed_entities(
    tree: &NamespaceTree,
    failed: &BTreeSet<FieldPath>,
) -> HashSet<(EntityKind, String)> {
    failed
        .iter()
        .filter(|path| path.lookup(tree.root()).is_some())
        .filter_map(|path| {
            let segments = path.segments();
            let kind = EntityKind::from_namespace(segments.first()?)?;
            Some((kind, segments.get(1)?.clone()))
        })
        .collect()
}
