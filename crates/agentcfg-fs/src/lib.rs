//! Configuration file loading for agentcfg
//!
//! Decodes YAML, TOML and JSON files into raw documents for the
//! resolution engine in `agentcfg-core`.

pub mod config;
pub mod decode;
pub mod error;
pub mod loader;

pub use config::{ConfigFormat, ConfigStore};
pub use decode::Decoded;
pub use error::{Error, Result};
pub use loader::{COMBINED_FILE_STEM, DocumentLoader, load_registry};
