//! The show command: one resolved entity

use std::path::Path;

use agentcfg_core::EntityKind;
use colored::Colorize;

use crate::cli::GlobalOptions;
use crate::error::Result;

/// Run the show command
pub fn run_show(
    path: &Path,
    kind: EntityKind,
    name: &str,
    json: bool,
    global: &GlobalOptions,
) -> Result<()> {
    let registry = super::load(path, global)?;
    let config = registry.get(kind, name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    let source = registry.source_of(kind, name)?;
    println!("{} {} ({})", kind.to_string().cyan().bold(), name.green().bold(), source.dimmed());
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
