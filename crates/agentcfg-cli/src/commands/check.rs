//! The check command: resolve, validate, summarize

use std::path::Path;

use agentcfg_core::EntityKind;
use colored::Colorize;

use crate::cli::GlobalOptions;
use crate::error::Result;

/// Run the check command.
///
/// Any configuration error is returned and printed by `main` as a
/// numbered list.
pub fn run_check(path: &Path, global: &GlobalOptions) -> Result<()> {
    let registry = super::load(path, global)?;

    let counts: Vec<String> = EntityKind::ALL
        .iter()
        .map(|kind| {
            let count = registry.count(*kind);
            let noun = if count == 1 {
                kind.to_string()
            } else {
                kind.namespace().to_string()
            };
            format!("{count} {noun}")
        })
        .collect();

    println!(
        "{} {} is valid ({})",
        "OK".green().bold(),
        path.display(),
        counts.join(", ")
    );
    Ok(())
}
