//! Command implementations for agentcfg-cli

pub mod check;
pub mod env;
pub mod init;
pub mod list;
pub mod show;

pub use check::run_check;
pub use env::run_env;
pub use init::run_init;
pub use list::run_list;
pub use show::run_show;

use std::path::Path;

use agentcfg_core::{ConfigRegistry, Environment, ResolutionOptions};

use crate::cli::GlobalOptions;
use crate::error::Result;

/// The environment snapshot resolution runs against.
pub fn environment(global: &GlobalOptions) -> Environment {
    let base = if global.no_process_env {
        Environment::new()
    } else {
        Environment::from_process()
    };
    let overrides = Environment::from_pairs(global.set.iter().cloned());
    base.overlay(&overrides)
}

pub fn options(global: &GlobalOptions) -> ResolutionOptions {
    ResolutionOptions::default().with_max_passes(global.max_passes)
}

/// Load and resolve `path` with the global options applied.
pub fn load(path: &Path, global: &GlobalOptions) -> Result<ConfigRegistry> {
    tracing::debug!(path = %path.display(), "Loading configuration");
    let registry = agentcfg_fs::load_registry(path, environment(global), options(global))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(set: &[(&str, &str)], no_process_env: bool) -> GlobalOptions {
        GlobalOptions {
            verbose: false,
            max_passes: 4,
            set: set
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            no_process_env,
        }
    }

    #[test]
    fn test_set_values_override() {
        let env = environment(&global(&[("PATH", "/override")], false));
        assert_eq!(env.get("PATH"), Some("/override"));
    }

    #[test]
    fn test_no_process_env_isolates() {
        let env = environment(&global(&[("ONLY", "1")], true));
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("ONLY"), Some("1"));
    }

    #[test]
    fn test_options_use_max_passes() {
        assert_eq!(options(&global(&[], true)).max_passes, 4);
    }
}
