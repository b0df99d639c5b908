//! Error types for agentcfg-fs

use std::path::PathBuf;

/// Result type for agentcfg-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading configuration files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("No configuration found at {path} (expected a file, agents/, models/ or tools/ directories, or an agentcfg.yaml)")]
    NoConfiguration { path: PathBuf },

    #[error(transparent)]
    Core(#[from] agentcfg_core::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The aggregated configuration errors, if resolution failed.
    pub fn config_errors(&self) -> Option<&agentcfg_core::ErrorList> {
        match self {
            Error::Core(core) => core.errors(),
            _ => None,
        }
    }
}
