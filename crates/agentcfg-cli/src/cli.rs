//! CLI argument parsing using clap derive

use std::path::PathBuf;

use agentcfg_core::{DEFAULT_MAX_PASSES, EntityKind};
use agentcfg_fs::ConfigFormat;
use clap::{Args, Parser, Subcommand};

/// agentcfg - Resolve and validate agent, model and tool configuration
#[derive(Parser, Debug)]
#[command(name = "agentcfg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GlobalOptions {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Maximum substitution passes before giving up
    #[arg(long, global = true, env = "AGENTCFG_MAX_PASSES", default_value_t = DEFAULT_MAX_PASSES)]
    pub max_passes: usize,

    /// Set an environment variable for resolution (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", global = true, value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Resolve against --set values only, ignoring the process environment
    #[arg(long, global = true)]
    pub no_process_env: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve and validate a configuration
    ///
    /// Examples:
    ///   agentcfg check config/
    ///   agentcfg check agentcfg.yaml --set AZURE_ENDPOINT=https://example.com
    Check {
        /// Configuration file or directory
        path: PathBuf,
    },

    /// List entity names in load order
    List {
        /// Configuration file or directory
        path: PathBuf,

        /// Only list one kind (agent, model or tool)
        #[arg(short, long)]
        kind: Option<EntityKind>,
    },

    /// Show one resolved entity
    Show {
        /// Configuration file or directory
        path: PathBuf,

        /// Entity kind (agent, model or tool)
        kind: EntityKind,

        /// Entity name
        name: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Write an example combined configuration
    ///
    /// Examples:
    ///   agentcfg init config/
    ///   agentcfg init agentcfg.toml
    ///   agentcfg init config/ --format json
    Init {
        /// Target file, or a directory to create `agentcfg.<ext>` in
        path: PathBuf,

        /// File format (yaml, toml or json); taken from the extension when omitted
        #[arg(short, long)]
        format: Option<ConfigFormat>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List the environment variables a configuration uses
    ///
    /// Shows whether each is set; values are never printed.
    Env {
        /// Configuration file or directory
        path: PathBuf,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
