//! Model definition schema - `models.<name>`

use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::FieldReader;

/// A validated model endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDef {
    /// Entity key in the `models` namespace
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Provider identifier, e.g. `azure_openai`
    pub provider: String,
    pub endpoint: String,
    /// Sampling parameters passed through to the provider
    pub parameters: Map<String, Value>,
    /// Provider-side model id such as `gpt-4`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Connection settings (deployment, api version, credentials)
    pub config: Map<String, Value>,
}

impl ModelDef {
    pub(crate) fn read(name: &str, reader: &mut FieldReader<'_>) -> Option<Self> {
        let provider = reader.required_str("provider");
        let endpoint = reader.required_str("endpoint");
        let parameters = reader.optional_map("parameters");
        let display_name = reader.optional_str("name");
        let id = reader.optional_str("id");
        let version = reader.optional_str("version");
        let config = reader.optional_map("config");

        Some(Self {
            name: name.to_string(),
            display_name,
            provider: provider?,
            endpoint: endpoint?,
            parameters,
            id,
            version,
            config,
        })
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }
}
