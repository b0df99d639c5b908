//! Ready-made entity definitions.
//!
//! The `valid_*` helpers produce a small, fully valid configuration set:
//! one model (`standard-assistant`), two tools (`web-search`,
//! `calculator`) and one agent (`analyst`) that uses all of them.

use agentcfg_core::{EntityKind, RawDocument};
use serde_json::{Value, json};

/// A valid model definition.
pub fn model(endpoint: &str) -> Value {
    json!({
        "provider": "azure_openai",
        "endpoint": endpoint,
        "id": "gpt-4",
        "parameters": {"temperature": 0.2, "max_tokens": 800},
    })
}

/// A valid tool definition.
pub fn tool(integration_type: &str) -> Value {
    json!({
        "integration_type": integration_type,
        "description": "fixture tool",
        "spec": {"url": "https://tools.example.com/openapi.json"},
    })
}

/// A valid agent definition.
pub fn agent(model: &str, tools: &[&str]) -> Value {
    json!({
        "description": "fixture agent",
        "model": model,
        "tools": tools,
    })
}

pub fn valid_models() -> RawDocument {
    RawDocument::new(EntityKind::Model, "models.yaml")
        .with_entity("standard-assistant", model("https://example.openai.azure.com"))
}

pub fn valid_tools() -> RawDocument {
    RawDocument::new(EntityKind::Tool, "tools.yaml")
        .with_entity("web-search", tool("openapi"))
        .with_entity("calculator", tool("function"))
}

pub fn valid_agents() -> RawDocument {
    RawDocument::new(EntityKind::Agent, "agents.yaml").with_entity(
        "analyst",
        agent("standard-assistant", &["web-search", "calculator"]),
    )
}

/// The complete valid set, models first.
pub fn valid_documents() -> Vec<RawDocument> {
    vec![valid_models(), valid_tools(), valid_agents()]
}

/// Combined-document YAML equivalent of [`valid_documents`].
pub const VALID_COMBINED_YAML: &str = r#"version: "1.0"
models:
  standard-assistant:
    provider: azure_openai
    endpoint: https://example.openai.azure.com
    id: gpt-4
    parameters:
      temperature: 0.2
      max_tokens: 800
tools:
  web-search:
    integration_type: openapi
    description: fixture tool
    spec:
      url: https://tools.example.com/openapi.json
  calculator:
    integration_type: function
    description: fixture tool
    spec:
      url: https://tools.example.com/openapi.json
agents:
  analyst:
    description: fixture agent
    model: standard-assistant
    tools: [web-search, calculator]
"#;
