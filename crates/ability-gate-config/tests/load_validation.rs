//! Config load validation tests for ability-gate-config.
// crates/ability-gate-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use ability_gate_config::AbilityGateConfig;
use ability_gate_config::ConfigError;
use tempfile::NamedTempFile;

mod common;

use common::TestResult;
use common::assert_invalid;

/// Writes `content` to a temporary file.
fn temp_config(content: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(
        AbilityGateConfig::load(Some(Path::new(&long_path))),
        "config path exceeds max length",
    )
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        AbilityGateConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = temp_config(&vec![b'#'; 1_048_577])?;
    assert_invalid(AbilityGateConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = temp_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(AbilityGateConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_reports_missing_file_as_io() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    match AbilityGateConfig::load(Some(&dir.path().join("absent.toml"))) {
        Err(ConfigError::Io(_)) => Ok(()),
        _ => Err("expected an io error".to_string()),
    }
}

#[test]
fn load_reports_malformed_toml_as_parse() -> TestResult {
    let file = temp_config(b"[engine\nmax_delegation_depth = 2")?;
    match AbilityGateConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(_)) => Ok(()),
        _ => Err("expected a parse error".to_string()),
    }
}

#[test]
fn load_rejects_unknown_sections() -> TestResult {
    let file = temp_config(b"[server]\nbind = \"127.0.0.1:0\"\n")?;
    match AbilityGateConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(message)) if message.contains("unknown field") => Ok(()),
        _ => Err("unknown sections must be rejected".to_string()),
    }
}

#[test]
fn load_accepts_full_file() -> TestResult {
    let file = temp_config(
        br#"
[instance]
saas = true
default_project_deletion_protection = true

[licenses]
features = ["custom_roles", "security_dashboard"]

[licenses.namespaces."100"]
features = ["ai_chat"]

[feature_flags.global]
duo_chat_on_saas = true

[feature_flags.projects."10"]
allow_push_repository_for_job_token = false

[engine]
max_delegation_depth = 1
cache_decisions = false

[audit]
sink = "stderr"
"#,
    )?;
    let config = AbilityGateConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if !config.instance.saas || !config.instance.default_project_deletion_protection {
        return Err("instance settings not loaded".to_string());
    }
    if config.engine.max_delegation_depth != 1 || config.engine.cache_decisions {
        return Err("engine options not loaded".to_string());
    }
    Ok(())
}
