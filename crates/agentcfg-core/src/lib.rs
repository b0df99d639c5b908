//! Resolution and cross-validation engine for agent configuration.
//!
//! Turns raw agent, model and tool documents into a validated, immutable
//! [`ConfigRegistry`]. String values may carry placeholders:
//!
//! - `${env:NAME}` / `${env:NAME:default}` - an environment variable
//! - `${ref:models.standard-assistant.endpoint}` - another value in the
//!   loaded configuration
//!
//! Every problem found during substitution, resolution and validation is
//! collected into one [`ErrorList`].

pub mod context;
pub mod document;
pub mod env;
pub mod error;
pub mod path;
pub mod placeholder;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod substitute;
pub mod tree;
pub mod validation;

pub use context::{DEFAULT_MAX_PASSES, ResolutionContext, ResolutionOptions};
pub use document::{EntityKind, RawDocument, Section};
pub use env::Environment;
pub use error::{ConfigError, ConfigErrorKind, Error, ErrorList, Location, Result};
pub use path::FieldPath;
pub use placeholder::{Placeholder, PlaceholderKind, Segment, Template};
pub use registry::{ConfigRegistry, RegistryEntry, RegistryHandle};
pub use schema::{AgentDef, IntegrationType, ModelDef, ResolvedConfig, SystemPrompt, ToolDef};
pub use substitute::EnvReference;
