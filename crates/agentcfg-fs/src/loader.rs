//! Configuration discovery and loading
//!
//! Two on-disk layouts are understood:
//!
//! ```text
//! agentcfg.yaml            # combined: version, agents, models, tools
//!
//! config/
//!   agentcfg.yaml          # optional combined file
//!   models/azure.yaml      # one namespace per directory
//!   tools/search.toml
//!   agents/analyst.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use agentcfg_core::{
    ConfigRegistry, EntityKind, Environment, RawDocument, ResolutionContext, ResolutionOptions,
};
use serde_json::Value;

use crate::config::{ConfigFormat, ConfigStore};
use crate::decode::Decoded;
use crate::{Error, Result};

/// File stem of the combined document looked for inside a directory.
pub const COMBINED_FILE_STEM: &str = "agentcfg";

const COMBINED_EXTENSIONS: [&str; 4] = ["yaml", "yml", "toml", "json"];

/// Loads raw documents from a file or directory
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentLoader {
    store: ConfigStore,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every document under `path`.
    ///
    /// A file is read as a combined document. A directory contributes its
    /// combined file, if any, followed by the files in its `models/`,
    /// `tools/` and `agents/` subdirectories, each sorted by file name.
    pub fn load_path(&self, path: &Path) -> Result<Vec<RawDocument>> {
        if path.is_file() {
            return self.load_combined(path, &display_name(path));
        }
        if !path.is_dir() {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            ));
        }

        let mut documents = Vec::new();
        let mut found = false;

        for extension in COMBINED_EXTENSIONS {
            let combined = path.join(format!("{COMBINED_FILE_STEM}.{extension}"));
            if combined.is_file() {
                found = true;
                documents.extend(self.load_combined(&combined, &relative_name(path, &combined))?);
            }
        }

        for kind in EntityKind::ALL {
            let dir = path.join(kind.namespace());
            if !dir.is_dir() {
                continue;
            }
            found = true;
            for file in config_files(&dir)? {
                let source = relative_name(path, &file);
                documents.push(self.load_namespace(kind, &file, source)?);
            }
        }

        if !found {
            return Err(Error::NoConfiguration {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(
            path = %path.display(),
            documents = documents.len(),
            "Loaded configuration directory"
        );
        Ok(documents)
    }

    fn load_namespace(&self, kind: EntityKind, file: &Path, source: String) -> Result<RawDocument> {
        let document = match self.store.load::<Decoded<Value>>(file)? {
            Decoded::Mapping(entries) => RawDocument::from_entries(kind, source, entries),
            Decoded::Other(value) => RawDocument::from_value(kind, source, value)?,
        };
        Ok(document)
    }

    fn load_combined(&self, file: &Path, source: &str) -> Result<Vec<RawDocument>> {
        let documents = match self.store.load::<Decoded<Decoded<Value>>>(file)? {
            Decoded::Mapping(sections) => RawDocument::split_sections(
                source,
                sections
                    .into_iter()
                    .map(|(key, section)| (key, section.into_section())),
            )?,
            Decoded::Other(value) => RawDocument::split_combined(source, value)?,
        };
        Ok(documents)
    }
}

/// Supported files directly inside `dir`, sorted by file name.
fn config_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if ConfigFormat::is_supported(&path) {
            files.push(path);
        } else {
            tracing::debug!(path = %path.display(), "Skipping unsupported file");
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Source name of `file` relative to the loaded root, with `/` separators.
fn relative_name(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

/// Load `path` and resolve it into a registry.
pub fn load_registry(
    path: &Path,
    env: Environment,
    options: ResolutionOptions,
) -> Result<ConfigRegistry> {
    let documents = DocumentLoader::new().load_path(path)?;
    let registry = ResolutionContext::new(documents, env)
        .with_options(options)
        .resolve()?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_relative_name_uses_forward_slashes() {
        let root = Path::new("/etc/agentcfg");
        let file = root.join("models").join("azure.yaml");
        assert_eq!(relative_name(root, &file), "models/azure.yaml");
    }

    #[test]
    fn test_files_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        for name in ["b.yaml", "a.toml", "notes.md", "c.json"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.yaml")).unwrap();

        let names: Vec<String> = config_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| display_name(p))
            .collect();
        assert_eq!(names, vec!["a.toml", "b.yaml", "c.json"]);
    }

    #[test]
    fn test_empty_directory_has_no_configuration() {
        let dir = tempdir().unwrap();
        let err = DocumentLoader::new().load_path(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NoConfiguration { .. }));
    }

    #[test]
    fn test_missing_path() {
        let dir = tempdir().unwrap();
        let err = DocumentLoader::new()
            .load_path(&dir.path().join("absent"))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
