//! End-to-end resolution runs over the public API.

use agentcfg_core::{
    ConfigError, ConfigErrorKind, EntityKind, Environment, Error, ErrorList, IntegrationType,
    RawDocument, RegistryHandle, ResolutionContext, ResolutionOptions, ResolvedConfig,
};
use agentcfg_test_utils::fixtures::{self, agent, model, tool};
use pretty_assertions::assert_eq;
use serde_json::json;

fn resolve(documents: Vec<RawDocument>, env: Environment) -> Result<agentcfg_core::ConfigRegistry, ErrorList> {
    match ResolutionContext::new(documents, env).resolve() {
        Ok(registry) => Ok(registry),
        Err(Error::Load(errors)) => Err(errors),
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_valid_set_without_placeholders() {
    let registry = resolve(fixtures::valid_documents(), Environment::new()).unwrap();

    let analyst = registry.get(EntityKind::Agent, "analyst").unwrap();
    let ResolvedConfig::Agent(analyst) = analyst else {
        panic!("expected an agent");
    };
    let model = registry.get(EntityKind::Model, &analyst.model).unwrap();
    assert_eq!(model.name(), analyst.model);
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_listing_follows_load_order() {
    let models = RawDocument::new(EntityKind::Model, "models.yaml")
        .with_entity("zeta", model("https://z"))
        .with_entity("alpha", model("https://a"));
    let registry = resolve(vec![models], Environment::new()).unwrap();
    assert_eq!(registry.names(EntityKind::Model), vec!["zeta", "alpha"]);
}

#[test]
fn test_env_placeholder_set() {
    let models = RawDocument::new(EntityKind::Model, "models.yaml")
        .with_entity("m", model("${env:FOO}"));
    let env = Environment::from_pairs([("FOO", "bar")]);
    let registry = resolve(vec![models], env).unwrap();
    assert_eq!(registry.model("m").unwrap().endpoint, "bar");
}

#[test]
fn test_env_placeholder_default() {
    let models = RawDocument::new(EntityKind::Model, "models.yaml")
        .with_entity("m", model("${env:FOO:baz}"));
    let registry = resolve(vec![models], Environment::new()).unwrap();
    assert_eq!(registry.model("m").unwrap().endpoint, "baz");
}

#[test]
fn test_env_placeholder_missing() {
    let models = RawDocument::new(EntityKind::Model, "models.yaml")
        .with_entity("m", model("${env:FOO}"));
    let errors = resolve(vec![models], Environment::new()).unwrap_err();
    assert_eq!(errors.len(), 1);
    match errors.iter().next().unwrap() {
        ConfigError::MissingEnvironmentVariable { name, location } => {
            assert_eq!(name, "FOO");
            assert_eq!(location.path.to_string(), "models.m.endpoint");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_reference_to_substituted_value() {
    let models = RawDocument::new(EntityKind::Model, "models.yaml")
        .with_entity("standard-assistant", model("https://${env:HOST}/openai"))
        .with_entity("mirror", model("${ref:models.standard-assistant.endpoint}"));
    let env = Environment::from_pairs([("HOST", "example.com")]);
    let registry = resolve(vec![models], env).unwrap();
    assert_eq!(
        registry.model("mirror").unwrap().endpoint,
        "https://example.com/openai"
    );
}

#[test]
fn test_reference_keeps_value_type() {
    let models = RawDocument::new(EntityKind::Model, "models.yaml")
        .with_entity("base", model("https://base"))
        .with_entity(
            "derived",
            json!({
                "provider": "azure_openai",
                "endpoint": "https://derived",
                "parameters": {"temperature": "${ref:models.base.parameters.temperature}"},
            }),
        );
    let registry = resolve(vec![models], Environment::new()).unwrap();
    assert_eq!(
        registry.model("derived").unwrap().parameter("temperature"),
        Some(&json!(0.2))
    );
}

#[test]
fn test_cycle_names_both_models() {
    let models = RawDocument::new(EntityKind::Model, "models.yaml")
        .with_entity("a", model("${ref:models.b.endpoint}"))
        .with_entity("b", model("${ref:models.a.endpoint}"));
    let errors = resolve(vec![models], Environment::new()).unwrap_err();

    assert_eq!(errors.count(ConfigErrorKind::CyclicReference), 1);
    let message = errors.iter().next().unwrap().to_string();
    assert!(message.contains("models.a.endpoint"), "{message}");
    assert!(message.contains("models.b.endpoint"), "{message}");
}

#[test]
fn test_missing_reference_target() {
    let agents = RawDocument::new(EntityKind::Agent, "agents.yaml").with_entity(
        "analyst",
        agent("${ref:models.nonexistent-model.name}", &[]),
    );
    let errors = resolve(vec![fixtures::valid_models(), agents], Environment::new()).unwrap_err();
    assert_eq!(errors.len(), 1);
    let message = errors.iter().next().unwrap().to_string();
    assert!(message.starts_with("Reference path 'models.nonexistent-model.name' not found"));
}

#[test]
fn test_cross_reference_error_aggregates_with_schema_error() {
    let tools = RawDocument::new(EntityKind::Tool, "tools.yaml")
        .with_entity("broken", json!({"integration_type": "openapi"}));
    let agents = RawDocument::new(EntityKind::Agent, "agents.yaml")
        .with_entity("analyst", agent("nonexistent-model", &[]));
    let errors = resolve(
        vec![fixtures::valid_models(), tools, agents],
        Environment::new(),
    )
    .unwrap_err();

    assert!(errors.len() >= 2);
    assert!(errors.contains(ConfigErrorKind::CrossReference));
    assert!(errors.contains(ConfigErrorKind::Schema));
}

#[test]
fn test_duplicate_model_names() {
    let docs = vec![
        RawDocument::new(EntityKind::Model, "a.yaml").with_entity("standard-assistant", model("${env:UNSET}")),
        RawDocument::new(EntityKind::Model, "b.yaml").with_entity("standard-assistant", model("https://b")),
    ];
    let errors = resolve(docs, Environment::new()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.count(ConfigErrorKind::DuplicateName), 1);
}

#[test]
fn test_model_name_produced_by_substitution() {
    let agents = RawDocument::new(EntityKind::Agent, "agents.yaml")
        .with_entity("analyst", agent("${env:AGENT_MODEL}", &["web-search"]));
    let env = Environment::from_pairs([("AGENT_MODEL", "standard-assistant")]);
    let registry = resolve(
        vec![fixtures::valid_models(), fixtures::valid_tools(), agents],
        env,
    )
    .unwrap();
    assert_eq!(registry.model_for("analyst").unwrap().name, "standard-assistant");
}

#[test]
fn test_tools_by_type() {
    let tools = RawDocument::new(EntityKind::Tool, "tools.yaml")
        .with_entity("search", tool("openapi"))
        .with_entity("interpreter", tool("ai_foundry"))
        .with_entity("lookup", tool("openapi"));
    let registry = resolve(vec![tools], Environment::new()).unwrap();
    let names: Vec<&str> = registry
        .tools_by_type(IntegrationType::OpenApi)
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["search", "lookup"]);
}

#[test]
fn test_non_converging_run_respects_option() {
    let models = RawDocument::new(EntityKind::Model, "models.yaml")
        .with_entity("m", model("${env:LOOP}"));
    let env = Environment::from_pairs([("LOOP", "x${env:LOOP}")]);
    let result = ResolutionContext::new(vec![models], env)
        .with_options(ResolutionOptions::default().with_max_passes(2))
        .resolve();
    let errors = result.unwrap_err();
    let errors = errors.errors().unwrap();
    assert_eq!(errors.count(ConfigErrorKind::ResolutionDidNotConverge), 1);
}

#[test]
fn test_reload_swaps_registry() {
    let handle = RegistryHandle::new(resolve(fixtures::valid_documents(), Environment::new()).unwrap());
    let snapshot = handle.current();

    let models = RawDocument::new(EntityKind::Model, "models.yaml")
        .with_entity("only", model("https://only"));
    handle.replace(resolve(vec![models], Environment::new()).unwrap());

    assert!(snapshot.agent("analyst").is_ok());
    assert!(handle.current().agent("analyst").is_err());
}

#[test]
fn test_independent_runs_in_parallel() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let models = RawDocument::new(EntityKind::Model, "models.yaml")
                    .with_entity("m", model("${env:URL}"));
                let env = Environment::from_pairs([("URL", format!("https://host-{i}"))]);
                let registry = resolve(vec![models], env).unwrap();
                registry.model("m").unwrap().endpoint.clone()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("https://host-{i}"));
    }
}

#[test]
fn test_error_report_snapshot() {
    let models = RawDocument::new(EntityKind::Model, "models.yaml")
        .with_entity("m", json!({"provider": "azure_openai", "endpoint": "${env:ENDPOINT}"}));
    let agents = RawDocument::new(EntityKind::Agent, "agents.yaml")
        .with_entity("analyst", agent("nonexistent-model", &["calculator"]));
    let errors = resolve(vec![models, agents], Environment::new()).unwrap_err();

    insta::assert_snapshot!(errors.to_string(), @r###"
    Configuration validation failed with 3 errors
      1. Environment variable 'ENDPOINT' is not set (required by models.m.endpoint (models.yaml))
      2. Agent 'analyst' field 'model' names unknown model 'nonexistent-model' (agents.yaml)
      3. Agent 'analyst' field 'tools' names unknown tool 'calculator' (agents.yaml)
    "###);
}
