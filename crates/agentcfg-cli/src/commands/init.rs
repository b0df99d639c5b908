//! The init command: write an example combined configuration

use std::path::{Path, PathBuf};

use agentcfg_fs::{COMBINED_FILE_STEM, ConfigFormat, ConfigStore};
use colored::Colorize;
use serde_json::{Value, json};

use crate::error::{CliError, Result};

/// Run the init command.
///
/// Writes to `path` when it names a file, or to `agentcfg.<ext>` inside it
/// when it is a directory or has no extension.
pub fn run_init(path: &Path, format: Option<ConfigFormat>, force: bool) -> Result<()> {
    let (target, format) = target_file(path, format)?;
    if target.exists() && !force {
        return Err(CliError::user(format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        )));
    }

    ConfigStore::new().save(&target, &example_config())?;
    tracing::debug!(path = %target.display(), %format, "Wrote example configuration");

    println!("{} {}", "Created".green().bold(), target.display());
    println!(
        "  Run {} to validate it",
        format!("agentcfg check {}", target.display()).cyan()
    );
    Ok(())
}

fn target_file(path: &Path, format: Option<ConfigFormat>) -> Result<(PathBuf, ConfigFormat)> {
    if path.is_dir() || path.extension().is_none() {
        let format = format.unwrap_or(ConfigFormat::Yaml);
        let file = format!("{COMBINED_FILE_STEM}.{}", format.extension());
        return Ok((path.join(file), format));
    }

    let detected = ConfigFormat::from_path(path)?;
    match format {
        Some(requested) if requested != detected => Err(CliError::user(format!(
            "--format {} does not match the extension of {}",
            requested.extension(),
            path.display()
        ))),
        _ => Ok((path.to_path_buf(), detected)),
    }
}

/// A small configuration that resolves without any environment set.
pub fn example_config() -> Value {
    json!({
        "version": "1.0",
        "models": {
            "demo-model": {
                "name": "Demo Model",
                "provider": "azure_openai",
                "endpoint": "https://${env:AZURE_OPENAI_HOST:your-resource.openai.azure.com}/openai",
                "id": "gpt-4",
                "parameters": {
                    "temperature": 0.2,
                    "max_tokens": 800
                },
                "config": {
                    "api_key": "${env:AZURE_OPENAI_API_KEY:}"
                }
            },
            "demo-model-fast": {
                "provider": "azure_openai",
                "endpoint": "${ref:models.demo-model.endpoint}",
                "id": "gpt-35-turbo",
                "parameters": "${ref:models.demo-model.parameters}"
            }
        },
        "tools": {
            "web-search": {
                "integration_type": "openapi",
                "description": "Search the web",
                "spec": {
                    "url": "https://tools.example.com/openapi.json"
                }
            }
        },
        "agents": {
            "demo-agent": {
                "name": "Demo Agent",
                "description": "Answers questions using web search",
                "model": "${env:DEMO_AGENT_MODEL:demo-model}",
                "tools": ["web-search"],
                "system_prompt": {
                    "version": "1.0",
                    "path": "prompts/demo-agent.md"
                }
            }
        }
    })
}
