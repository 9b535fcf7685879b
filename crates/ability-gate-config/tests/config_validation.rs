//! Config validation and conversion tests for ability-gate-config.
// crates/ability-gate-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Cross-field checks and conversion into engine collaborators.
// Purpose: Ensure every section fails closed and converts faithfully.
// =============================================================================

use ability_gate_config::AuditSinkKind;
use ability_gate_core::Ability;
use ability_gate_core::AbilityRegistry;
use ability_gate_core::Actor;
use ability_gate_core::FeatureFlag;
use ability_gate_core::GlobalPolicy;
use ability_gate_core::GroupId;
use ability_gate_core::LicensedFeature;
use ability_gate_core::PolicySession;
use ability_gate_core::ProjectId;
use ability_gate_core::UserActor;
use ability_gate_core::UserId;
use ability_gate_core::interfaces::Collaborators;
use ability_gate_core::interfaces::FeatureFlagService;
use ability_gate_core::interfaces::FlagTarget;
use ability_gate_core::interfaces::LicenseSnapshot;
use ability_gate_core::interfaces::memory::InMemoryDirectory;

mod common;

use common::TestResult;
use common::assert_invalid;
use common::config_from_toml;

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = config_from_toml("").map_err(|err| err.to_string())?;
    if config.engine.max_delegation_depth != 2 || !config.engine.cache_decisions {
        return Err("engine defaults changed".to_string());
    }
    if config.audit.sink != AuditSinkKind::None {
        return Err("audit must default to none".to_string());
    }
    if !config.instance.top_level_group_creation_enabled {
        return Err("group creation defaults to enabled".to_string());
    }
    Ok(())
}

#[test]
fn delegation_depth_must_stay_in_range() -> TestResult {
    for depth in [0, 3] {
        assert_invalid(
            config_from_toml(&format!("[engine]\nmax_delegation_depth = {depth}\n")),
            "engine.max_delegation_depth must be between 1 and 2",
        )?;
    }
    Ok(())
}

#[test]
fn file_sink_requires_a_path() -> TestResult {
    assert_invalid(
        config_from_toml("[audit]\nsink = \"file\"\n"),
        "audit.path is required for the file sink",
    )?;
    assert_invalid(
        config_from_toml("[audit]\nsink = \"file\"\npath = \"  \"\n"),
        "audit.path must be non-empty",
    )?;
    assert_invalid(
        config_from_toml("[audit]\nsink = \"stderr\"\npath = \"audit.log\"\n"),
        "audit.path is only valid for the file sink",
    )
}

#[test]
fn unknown_flags_are_rejected() -> TestResult {
    assert_invalid(
        config_from_toml("[feature_flags.global]\nnot_a_flag = true\n"),
        "unknown feature flag not_a_flag",
    )
}

#[test]
fn scope_keys_must_be_non_zero_ids() -> TestResult {
    assert_invalid(
        config_from_toml("[licenses.namespaces.\"0\"]\nfeatures = []\n"),
        "licenses.namespaces ids must be non-zero",
    )?;
    assert_invalid(
        config_from_toml("[feature_flags.projects.web]\nmodel_registry = false\n"),
        "feature_flags.projects keys must be numeric ids",
    )
}

#[test]
fn licenses_convert_with_namespace_plans() -> TestResult {
    let config = config_from_toml(concat!(
        "[licenses]\nfeatures = [\"custom_roles\"]\n\n",
        "[licenses.namespaces.\"100\"]\nfeatures = [\"ai_chat\"]\n",
    ))
    .map_err(|err| err.to_string())?;
    let licenses = config.license_snapshot().map_err(|err| err.to_string())?;
    let root = GroupId::from_raw(100).ok_or("group id")?;
    let other = GroupId::from_raw(200).ok_or("group id")?;
    let check = |feature, root| licenses.licensed(feature, root).map_err(|err| err.to_string());
    if !check(LicensedFeature::AiChat, Some(root))? {
        return Err("namespace plan grants ai_chat".to_string());
    }
    if check(LicensedFeature::CustomRoles, Some(root))? {
        return Err("namespace plan replaces the instance license".to_string());
    }
    if !check(LicensedFeature::CustomRoles, Some(other))? {
        return Err("other namespaces fall back to the instance license".to_string());
    }
    Ok(())
}

#[test]
fn flags_convert_per_scope() -> TestResult {
    let config = config_from_toml(concat!(
        "[feature_flags.global]\nmodel_registry = false\n\n",
        "[feature_flags.projects.\"10\"]\nmodel_registry = true\n\n",
        "[feature_flags.users.\"3\"]\nduo_chat_on_saas = true\n",
    ))
    .map_err(|err| err.to_string())?;
    let flags = config.flag_overrides().map_err(|err| err.to_string())?;
    let project = ProjectId::from_raw(10).ok_or("project id")?;
    let user = UserId::from_raw(3).ok_or("user id")?;
    let lookup = |flag, target| flags.lookup(flag, target).map_err(|err| err.to_string());
    if lookup(FeatureFlag::ModelRegistry, FlagTarget::Instance)? != Some(false) {
        return Err("global override missing".to_string());
    }
    if lookup(FeatureFlag::ModelRegistry, FlagTarget::Project(project))? != Some(true) {
        return Err("project override missing".to_string());
    }
    if lookup(FeatureFlag::DuoChatOnSaas, FlagTarget::User(user))? != Some(true) {
        return Err("user override missing".to_string());
    }
    Ok(())
}

#[test]
fn file_sink_opens_the_log() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("decisions.log");
    let config = config_from_toml(&format!(
        "[audit]\nsink = \"file\"\npath = \"{}\"\n",
        path.display().to_string().replace('\\', "\\\\")
    ))
    .map_err(|err| err.to_string())?;
    config.audit.build_sink().map_err(|err| err.to_string())?;
    if path.exists() { Ok(()) } else { Err("audit log was not created".to_string()) }
}

#[test]
fn configured_session_follows_the_file() -> TestResult {
    let config = config_from_toml(
        "[instance]\nsaas = true\n\n[feature_flags.global]\nduo_chat_on_saas = true\n",
    )
    .map_err(|err| err.to_string())?;
    let registry = AbilityRegistry::standard().map_err(|err| err.to_string())?;
    let directory = InMemoryDirectory::new();
    let licenses = config.license_snapshot().map_err(|err| err.to_string())?;
    let flags = config.flag_overrides().map_err(|err| err.to_string())?;
    let audit = config.audit.build_sink().map_err(|err| err.to_string())?;
    let user = UserId::from_raw(1).ok_or("user id")?;
    let session = PolicySession::new(
        &registry,
        Collaborators::with_directory(&directory, &licenses, &flags),
        Actor::User(UserActor::regular(user)),
    )
    .with_settings(config.instance_settings())
    .with_options(config.engine_options())
    .with_audit(audit.as_ref());
    let allowed =
        GlobalPolicy::new(&session).allowed(Ability::AccessDuoChat).map_err(|err| err.to_string())?;
    if allowed { Ok(()) } else { Err("SaaS rollout from config grants chat".to_string()) }
}
