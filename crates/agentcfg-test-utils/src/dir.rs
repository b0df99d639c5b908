//! [`TestConfigDir`] builder for on-disk configuration layouts.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::fixtures::VALID_COMBINED_YAML;

/// A temporary configuration directory.
///
/// # Example
///
/// ```rust,no_run
/// use agentcfg_test_utils::TestConfigDir;
///
/// let dir = TestConfigDir::new();
/// dir.write("models/azure.yaml", "gpt:\n  provider: openai\n  endpoint: https://x\n");
/// dir.assert_file_exists("models/azure.yaml");
/// ```
pub struct TestConfigDir {
    temp_dir: TempDir,
}

impl Default for TestConfigDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigDir {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// A directory holding the valid fixture set split across
    /// `models/`, `tools/` and `agents/`.
    pub fn with_valid_layout() -> Self {
        let dir = Self::new();
        dir.write(
            "models/azure.yaml",
            "standard-assistant:\n  provider: azure_openai\n  endpoint: https://example.openai.azure.com\n",
        );
        dir.write(
            "tools/search.yaml",
            "web-search:\n  integration_type: openapi\n  spec:\n    url: https://tools.example.com/openapi.json\n",
        );
        dir.write(
            "tools/math.toml",
            "[calculator]\nintegration_type = \"function\"\n\n[calculator.spec]\nentry = \"calc.evaluate\"\n",
        );
        dir.write(
            "agents/analyst.yaml",
            "analyst:\n  description: Researches market data\n  model: standard-assistant\n  tools: [web-search, calculator]\n",
        );
        dir
    }

    /// A directory holding the valid fixture set as one combined file.
    pub fn with_combined(file_name: &str) -> Self {
        let dir = Self::new();
        dir.write(file_name, VALID_COMBINED_YAML);
        dir
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the directory.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Assert that `relative` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }
}
