//! The list command: entity names per kind

use std::path::Path;

use agentcfg_core::EntityKind;
use colored::Colorize;

use crate::cli::GlobalOptions;
use crate::error::Result;

/// Run the list command
pub fn run_list(path: &Path, kind: Option<EntityKind>, global: &GlobalOptions) -> Result<()> {
    let registry = super::load(path, global)?;

    for current in EntityKind::ALL {
        if kind.is_some_and(|k| k != current) {
            continue;
        }

        let entries = registry.list(current);
        println!("{}:", current.namespace().cyan().bold());
        if entries.is_empty() {
            println!("  {}", "(none)".dimmed());
        }
        for config in entries {
            let source = registry.source_of(current, config.name())?;
            if config.display_name() == config.name() {
                println!("  {:<24} {}", config.name().green(), source.dimmed());
            } else {
                println!(
                    "  {:<24} {} {}",
                    config.name().green(),
                    config.display_name(),
                    source.dimmed()
                );
            }
        }
    }

    Ok(())
}
