//! End-to-end tests for the agentcfg binary

use agentcfg_test_utils::TestConfigDir;
use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Get a Command for the agentcfg binary
fn agentcfg_cmd() -> Command {
    let mut cmd = Command::cargo_bin("agentcfg").expect("Failed to find agentcfg binary");
    cmd.env_remove("AGENTCFG_MAX_PASSES").env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_valid_directory() {
    let dir = TestConfigDir::with_valid_layout();
    agentcfg_cmd()
        .arg("check")
        .arg(dir.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("1 model, 2 tools, 1 agent"));
}

#[test]
fn test_check_reports_every_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("models/m.yaml")
        .write_str("m:\n  provider: p\n  endpoint: ${env:ENDPOINT}\n")
        .unwrap();
    temp.child("agents/a.yaml")
        .write_str("analyst:\n  description: d\n  model: nonexistent-model\n  tols: []\n")
        .unwrap();

    agentcfg_cmd()
        .arg("check")
        .arg(temp.path())
        .arg("--no-process-env")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration validation failed with 2 errors"))
        .stderr(predicate::str::contains("Environment variable 'ENDPOINT' is not set"))
        .stderr(predicate::str::contains("did you mean \"tools\""));
}

#[test]
fn test_check_with_set_override() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("agentcfg.yaml")
        .write_str("models:\n  m:\n    provider: p\n    endpoint: ${env:ENDPOINT}\n")
        .unwrap();

    agentcfg_cmd()
        .arg("check")
        .arg(temp.child("agentcfg.yaml").path())
        .args(["--no-process-env", "--set", "ENDPOINT=https://example.com"])
        .assert()
        .success();
}

#[test]
fn test_check_max_passes_from_env() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("agentcfg.yaml")
        .write_str("models:\n  m:\n    provider: p\n    endpoint: ${env:LOOP}\n")
        .unwrap();

    agentcfg_cmd()
        .env("AGENTCFG_MAX_PASSES", "2")
        .arg("check")
        .arg(temp.child("agentcfg.yaml").path())
        .args(["--no-process-env", "--set", "LOOP=${env:LOOP}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not converge after 2 passes"));
}

#[test]
fn test_check_missing_path() {
    agentcfg_cmd()
        .args(["check", "/definitely/not/here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_all_kinds() {
    let dir = TestConfigDir::with_valid_layout();
    agentcfg_cmd()
        .arg("list")
        .arg(dir.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("models"))
        .stdout(predicate::str::contains("standard-assistant"))
        .stdout(predicate::str::contains("calculator"))
        .stdout(predicate::str::contains("analyst"));
}

#[test]
fn test_list_one_kind() {
    let dir = TestConfigDir::with_valid_layout();
    agentcfg_cmd()
        .arg("list")
        .arg(dir.root())
        .args(["--kind", "tool"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web-search"))
        .stdout(predicate::str::contains("analyst").not());
}

// ============================================================================
// show
// ============================================================================

#[test]
fn test_show_json() {
    let dir = TestConfigDir::with_combined("agentcfg.yaml");
    let output = agentcfg_cmd()
        .arg("show")
        .arg(dir.root())
        .args(["agent", "analyst", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["kind"], "agent");
    assert_eq!(value["model"], "standard-assistant");
    assert_eq!(value["tools"], serde_json::json!(["web-search", "calculator"]));
}

#[test]
fn test_show_yaml() {
    let dir = TestConfigDir::with_valid_layout();
    agentcfg_cmd()
        .arg("show")
        .arg(dir.root())
        .args(["model", "standard-assistant"])
        .assert()
        .success()
        .stdout(predicate::str::contains("provider: azure_openai"))
        .stdout(predicate::str::contains("models/azure.yaml"));
}

#[test]
fn test_show_unknown_entity() {
    let dir = TestConfigDir::with_valid_layout();
    agentcfg_cmd()
        .arg("show")
        .arg(dir.root())
        .args(["tool", "browser"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tool not found: browser"));
}

// ============================================================================
// env
// ============================================================================

#[test]
fn test_env_lists_status_without_values() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("models/m.yaml")
        .write_str(
            "m:\n  provider: p\n  endpoint: ${env:ENDPOINT}\n  config:\n    key: ${env:API_KEY}\n    region: ${env:REGION:eastus}\n",
        )
        .unwrap();

    agentcfg_cmd()
        .arg("env")
        .arg(temp.path())
        .args(["--no-process-env", "--set", "ENDPOINT=super-secret-value"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ENDPOINT"))
        .stdout(predicate::str::contains("API_KEY"))
        .stdout(predicate::str::contains("REGION"))
        .stdout(predicate::str::contains("3 variables referenced, 1 missing"))
        .stdout(predicate::str::contains("super-secret-value").not());
}

// ============================================================================
// init
// ============================================================================

#[rstest::rstest]
#[case("yaml", "agentcfg.yaml")]
#[case("toml", "agentcfg.toml")]
#[case("json", "agentcfg.json")]
fn test_init_output_passes_check(#[case] format: &str, #[case] file: &str) {
    let temp = assert_fs::TempDir::new().unwrap();

    agentcfg_cmd()
        .arg("init")
        .arg(temp.path())
        .args(["--format", format])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    temp.child(file).assert(predicate::path::is_file());

    agentcfg_cmd()
        .arg("check")
        .arg(temp.child(file).path())
        .arg("--no-process-env")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 models, 1 tool, 1 agent"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("config/demo.toml");
    target.write_str("# keep me\n").unwrap();

    agentcfg_cmd()
        .arg("init")
        .arg(target.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    target.assert("# keep me\n");

    agentcfg_cmd()
        .arg("init")
        .arg(target.path())
        .arg("--force")
        .assert()
        .success();
    target.assert(predicate::str::contains("demo-agent"));
}
