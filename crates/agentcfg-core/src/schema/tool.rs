//! Tool definition schema - `tools.<name>`
//!
//! # Example YAML
//!
//! ```yaml
//! web-search:
//!   integration_type: openapi
//!   description: Bing-backed web search
//!   spec:
//!     url: https://api.example.com/openapi.json
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validation::FieldReader;

/// How a tool is wired to the agent runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationType {
    /// Described by an OpenAPI document
    #[serde(rename = "openapi")]
    OpenApi,
    /// Hosted by the AI Foundry platform
    AiFoundry,
    /// Local function call
    Function,
}

impl IntegrationType {
    pub const ALL: [IntegrationType; 3] = [
        IntegrationType::OpenApi,
        IntegrationType::AiFoundry,
        IntegrationType::Function,
    ];
}

impl FromStr for IntegrationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openapi" => Ok(IntegrationType::OpenApi),
            "ai_foundry" => Ok(IntegrationType::AiFoundry),
            "function" => Ok(IntegrationType::Function),
            _ => Err(format!(
                "unknown integration type '{s}' (expected one of: openapi, ai_foundry, function)"
            )),
        }
    }
}

impl fmt::Display for IntegrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationType::OpenApi => write!(f, "openapi"),
            IntegrationType::AiFoundry => write!(f, "ai_foundry"),
            IntegrationType::Function => write!(f, "function"),
        }
    }
}

/// A validated tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDef {
    /// Entity key in the `tools` namespace
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub integration_type: IntegrationType,
    /// Integration-specific settings, opaque to the engine
    pub spec: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ToolDef {
    pub(crate) fn read(name: &str, reader: &mut FieldReader<'_>) -> Option<Self> {
        let integration_type = reader.required_str("integration_type").and_then(|raw| {
            raw.parse::<IntegrationType>()
                .map_err(|reason| reader.invalid("integration_type", reason))
                .ok()
        });
        let spec = reader.required_map("spec");
        let display_name = reader.optional_str("name");
        let description = reader.optional_str("description");
        let version = reader.optional_str("version");

        Some(Self {
            name: name.to_string(),
            display_name,
            integration_type: integration_type?,
            spec: spec?,
            description,
            version,
        })
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EntityKind;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("openapi", IntegrationType::OpenApi)]
    #[case("ai_foundry", IntegrationType::AiFoundry)]
    #[case("function", IntegrationType::Function)]
    fn test_integration_type_round_trip(#[case] raw: &str, #[case] expected: IntegrationType) {
        assert_eq!(raw.parse::<IntegrationType>().unwrap(), expected);
        assert_eq!(expected.to_string(), raw);
        assert_eq!(serde_json::to_value(expected).unwrap(), json!(raw));
    }

    #[test]
    fn test_unknown_integration_type() {
        let map = json!({"integration_type": "grpc", "spec": {}});
        let map = map.as_object().unwrap();
        let mut errors = Vec::new();
        let mut reader = FieldReader::new(EntityKind::Tool, "t", "test.yaml", "", map, &mut errors);
        assert!(ToolDef::read("t", &mut reader).is_none());
        assert!(!reader.finish());
        assert!(errors[0].to_string().contains("unknown integration type 'grpc'"));
    }
}
