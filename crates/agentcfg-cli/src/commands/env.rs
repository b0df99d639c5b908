//! The env command: which environment variables a configuration uses

use std::path::Path;

use agentcfg_core::ResolutionContext;
use agentcfg_fs::DocumentLoader;
use colored::Colorize;

use crate::cli::GlobalOptions;
use crate::error::Result;

/// How one variable would resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarStatus {
    Set,
    /// Unset, but every use has a default
    Default,
    Missing,
}

/// Run the env command. Values are never printed.
pub fn run_env(path: &Path, global: &GlobalOptions) -> Result<()> {
    let documents = DocumentLoader::new().load_path(path)?;
    let env = super::environment(global);
    let references = ResolutionContext::new(documents, env.clone()).env_references()?;

    // First use order; a variable needs a value if any use lacks a default.
    let mut vars: Vec<(String, bool)> = Vec::new();
    for reference in &references {
        match vars.iter_mut().find(|(name, _)| *name == reference.name) {
            Some((_, required)) => *required |= !reference.has_default,
            None => vars.push((reference.name.clone(), !reference.has_default)),
        }
    }

    if vars.is_empty() {
        println!("No environment variables referenced.");
        return Ok(());
    }

    let mut missing = 0;
    for (name, required) in &vars {
        let status = match (env.contains(name), *required) {
            (true, _) => VarStatus::Set,
            (false, false) => VarStatus::Default,
            (false, true) => VarStatus::Missing,
        };
        let label = match status {
            VarStatus::Set => "set".green(),
            VarStatus::Default => "default".yellow(),
            VarStatus::Missing => {
                missing += 1;
                "missing".red().bold()
            }
        };
        println!("  {name:<32} {label}");
    }

    println!();
    println!(
        "{} {} variables referenced, {} missing",
        "Total:".dimmed(),
        vars.len(),
        missing
    );
    Ok(())
}
