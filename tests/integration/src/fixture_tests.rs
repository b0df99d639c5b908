//! Resolution runs against the checked-in fixtures in `test-fixtures/configs`.

use std::path::PathBuf;

use agentcfg_core::{
    ConfigError, ConfigErrorKind, EntityKind, Environment, IntegrationType, ResolutionOptions,
};
use agentcfg_fs::{DocumentLoader, load_registry};
use pretty_assertions::assert_eq;
use serde_json::json;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/configs")
        .join(name)
}

#[test]
fn test_valid_fixture_resolves_with_defaults() {
    let registry = load_registry(
        &fixture("valid"),
        Environment::new(),
        ResolutionOptions::default(),
    )
    .unwrap();

    assert_eq!(
        registry.names(EntityKind::Model),
        vec!["standard-assistant", "fast-assistant", "local-llama"]
    );
    assert_eq!(
        registry.names(EntityKind::Agent),
        vec!["analyst", "reviewer"]
    );

    let standard = registry.model("standard-assistant").unwrap();
    assert_eq!(standard.endpoint, "https://contoso.openai.azure.com/openai");
    assert_eq!(standard.display_name(), "Standard Assistant");
    assert_eq!(standard.config_value("api_key"), Some(&json!("")));

    let fast = registry.model("fast-assistant").unwrap();
    assert_eq!(fast.endpoint, standard.endpoint);
    assert_eq!(fast.parameter("temperature"), Some(&json!(0.2)));

    assert_eq!(registry.model_for("reviewer").unwrap().name, "fast-assistant");
    let analyst = registry.agent("analyst").unwrap();
    assert!(analyst.has_tool("code-interpreter"));
    assert_eq!(
        analyst.system_prompt.as_ref().map(|p| p.path.as_str()),
        Some("prompts/analyst.md")
    );
    assert_eq!(registry.tools_by_type(IntegrationType::AiFoundry).len(), 1);
}

#[test]
fn test_valid_fixture_honours_environment() {
    let env = Environment::from_pairs([
        ("AZURE_OPENAI_HOST", "fabrikam.openai.azure.com"),
        ("REVIEWER_MODEL", "local-llama"),
    ]);
    let registry = load_registry(&fixture("valid"), env, ResolutionOptions::default()).unwrap();

    assert_eq!(
        registry.model("fast-assistant").unwrap().endpoint,
        "https://fabrikam.openai.azure.com/openai"
    );
    assert_eq!(registry.model_for("reviewer").unwrap().name, "local-llama");
}

#[test]
fn test_broken_fixture_reports_everything() {
    let err = load_registry(
        &fixture("broken"),
        Environment::new(),
        ResolutionOptions::default(),
    )
    .unwrap_err();
    let errors = err.config_errors().unwrap();

    let kinds: Vec<ConfigErrorKind> = errors.iter().map(ConfigError::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ConfigErrorKind::PlaceholderSyntax,
            ConfigErrorKind::MissingEnvironmentVariable,
            ConfigErrorKind::CyclicReference,
            ConfigErrorKind::Schema,
            ConfigErrorKind::Schema,
            ConfigErrorKind::CrossReference,
            ConfigErrorKind::CrossReference,
            ConfigErrorKind::CrossReference,
        ]
    );

    let rendered = errors.to_string();
    let cycle = errors
        .iter()
        .find(|e| e.kind() == ConfigErrorKind::CyclicReference)
        .unwrap()
        .to_string();
    assert!(cycle.contains("models.primary.endpoint"));
    assert!(cycle.contains("models.secondary.endpoint"));
    assert!(rendered.contains("did you mean \"parameters\""));
    assert!(rendered.contains("unknown integration type 'grpc'"));
    assert!(rendered.contains("(agents/agents.yaml)"));
}

#[test]
fn test_combined_fixture() {
    let documents = DocumentLoader::new().load_path(&fixture("combined.yaml")).unwrap();
    assert_eq!(documents.len(), 3);

    let registry = load_registry(
        &fixture("combined.yaml"),
        Environment::new(),
        ResolutionOptions::default(),
    )
    .unwrap();
    let tools: Vec<&str> = registry
        .tools_for("analyst")
        .unwrap()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(tools, vec!["web-search"]);
    assert_eq!(
        registry.source_of(EntityKind::Agent, "analyst").unwrap(),
        "combined.yaml"
    );
}
