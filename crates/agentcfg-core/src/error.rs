//! Error types for agentcfg-core
//!
//! Resolution never stops at the first problem. Every error found while
//! substituting, resolving and validating is collected as a [`ConfigError`]
//! into one [`ErrorList`], which is what callers receive on failure.

use std::fmt;

use crate::document::EntityKind;
use crate::path::FieldPath;

/// Result type for agentcfg-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the public API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more configuration errors, in detection order
    #[error(transparent)]
    Load(#[from] ErrorList),

    /// The document cannot be analysed at all
    #[error("Invalid document {document}: {reason}")]
    InvalidDocument { document: String, reason: String },

    /// Registry lookup miss
    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },

    /// Unrecognised entity kind name
    #[error("Unknown entity kind: {kind} (expected agent, model or tool)")]
    UnknownKind { kind: String },
}

impl Error {
    /// The aggregated configuration errors, if this is a load failure.
    pub fn errors(&self) -> Option<&ErrorList> {
        match self {
            Error::Load(list) => Some(list),
            _ => None,
        }
    }
}

/// Where in the loaded configuration something happened
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Source name of the document the node came from
    pub document: String,
    /// Full path in the namespace tree, e.g. `agents.analyst.model`
    pub path: FieldPath,
}

impl Location {
    pub fn new(document: impl Into<String>, path: FieldPath) -> Self {
        Self {
            document: document.into(),
            path,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.document)
    }
}

/// A single configuration problem
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Placeholder syntax error at {location}: {reason} at offset {offset} in \"{text}\"")]
    PlaceholderSyntax {
        location: Location,
        text: String,
        offset: usize,
        reason: String,
    },

    #[error("Environment variable '{name}' is not set (required by {location})")]
    MissingEnvironmentVariable { name: String, location: Location },

    #[error("Reference path '{path}' not found (requested by {requested_by})")]
    UnresolvedReference {
        path: FieldPath,
        requested_by: Location,
    },

    #[error("Cyclic reference: {}", render_cycle(.cycle))]
    CyclicReference { cycle: Vec<FieldPath> },

    #[error(
        "Resolution did not converge after {passes} passes; placeholders remain at {}",
        render_locations(.remaining)
    )]
    ResolutionDidNotConverge {
        passes: usize,
        remaining: Vec<Location>,
    },

    #[error("Schema error in {kind} '{entity}', field '{field}': {reason} ({document})")]
    Schema {
        kind: EntityKind,
        entity: String,
        field: String,
        reason: String,
        document: String,
    },

    #[error("Agent '{agent}' field '{field}' names unknown {target} '{missing}' ({document})")]
    CrossReference {
        agent: String,
        field: String,
        target: EntityKind,
        missing: String,
        document: String,
    },

    #[error("Duplicate {kind} name '{name}' (defined in {first} and {second})")]
    DuplicateName {
        kind: EntityKind,
        name: String,
        first: String,
        second: String,
    },
}

/// Discriminant of [`ConfigError`], for filtering and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigErrorKind {
    PlaceholderSyntax,
    MissingEnvironmentVariable,
    UnresolvedReference,
    CyclicReference,
    ResolutionDidNotConverge,
    Schema,
    CrossReference,
    DuplicateName,
}

impl ConfigError {
    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            ConfigError::PlaceholderSyntax { .. } => ConfigErrorKind::PlaceholderSyntax,
            ConfigError::MissingEnvironmentVariable { .. } => {
                ConfigErrorKind::MissingEnvironmentVariable
            }
            ConfigError::UnresolvedReference { .. } => ConfigErrorKind::UnresolvedReference,
            ConfigError::CyclicReference { .. } => ConfigErrorKind::CyclicReference,
            ConfigError::ResolutionDidNotConverge { .. } => {
                ConfigErrorKind::ResolutionDidNotConverge
            }
            ConfigError::Schema { .. } => ConfigErrorKind::Schema,
            ConfigError::CrossReference { .. } => ConfigErrorKind::CrossReference,
            ConfigError::DuplicateName { .. } => ConfigErrorKind::DuplicateName,
        }
    }
}

fn render_cycle(cycle: &[FieldPath]) -> String {
    cycle
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn render_locations(locations: &[Location]) -> String {
    locations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The aggregate failure: every error from one load, in detection order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorList {
    errors: Vec<ConfigError>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ConfigError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ConfigError>) {
        self.errors.extend(errors);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of errors of the given kind.
    pub fn count(&self, kind: ConfigErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind() == kind).count()
    }

    /// True if at least one error of the given kind is present.
    pub fn contains(&self, kind: ConfigErrorKind) -> bool {
        self.count(kind) > 0
    }

    /// `Ok(value)` when no errors were collected, otherwise the list.
    pub fn into_result<T>(self, value: T) -> std::result::Result<T, ErrorList> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<Vec<ConfigError>> for ErrorList {
    fn from(errors: Vec<ConfigError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ErrorList {
    type Item = ConfigError;
    type IntoIter = std::vec::IntoIter<ConfigError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a ConfigError;
    type IntoIter = std::slice::Iter<'a, ConfigError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        write!(f, "Configuration validation failed with {} {}", self.errors.len(), noun)?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}
