//! Agent definition schema - `agents.<name>`
//!
//! # Example YAML
//!
//! ```yaml
//! analyst:
//!   description: Researches market data
//!   model: standard-assistant
//!   tools: [web-search, calculator]
//!   system_prompt:
//!     version: "1.0"
//!     path: prompts/analyst.md
//! ```

use serde::Serialize;

use crate::validation::FieldReader;

/// A validated agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentDef {
    /// Entity key in the `agents` namespace
    pub name: String,
    /// Optional human-readable name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub description: String,
    /// Name of a model entity
    pub model: String,
    /// Names of tool entities, in declared order
    pub tools: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Hosting platform hint, e.g. `azure_ai_foundry`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<SystemPrompt>,
}

/// Pointer to a versioned prompt file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemPrompt {
    pub version: String,
    /// Relative path, must end in `.md` or `.txt`
    pub path: String,
}

const PROMPT_EXTENSIONS: [&str; 2] = [".md", ".txt"];

impl SystemPrompt {
    fn read(reader: &mut FieldReader<'_>) -> Option<Self> {
        let version = reader.required_str("version");
        let path = reader.required_str("path");
        if let Some(p) = &path {
            if !PROMPT_EXTENSIONS.iter().any(|ext| p.ends_with(ext)) {
                reader.invalid("path", format!("'{p}' must end with .md or .txt"));
            }
        }
        Some(Self {
            version: version?,
            path: path?,
        })
    }
}

impl AgentDef {
    pub(crate) fn read(name: &str, reader: &mut FieldReader<'_>) -> Option<Self> {
        let version = reader.optional_str("version");
        let display_name = reader.optional_str("name");
        let description = reader.required_str("description");
        let model = reader.required_str("model");
        let tools = reader.optional_str_list("tools");
        let platform = reader.optional_str("platform");
        let system_prompt = reader.optional_nested("system_prompt", SystemPrompt::read);

        for (i, tool) in tools.iter().enumerate() {
            if tools[..i].contains(tool) {
                reader.invalid("tools", format!("tool '{tool}' is listed more than once"));
            }
        }

        Some(Self {
            name: name.to_string(),
            display_name,
            description: description?,
            model: model?,
            tools,
            version,
            platform,
            system_prompt,
        })
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t == tool)
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}
