// crates/ability-gate-config/src/config.rs
// ============================================================================
// Module: Ability Gate Configuration
// Description: Configuration loading and validation for Ability Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: ability-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. A validated config converts
//! into the engine's in-memory license snapshot, flag overrides, instance
//! settings, engine options, and audit sink.
//!
//! ```toml
//! [instance]
//! saas = true
//!
//! [licenses]
//! features = ["custom_roles"]
//!
//! [licenses.namespaces."100"]
//! features = ["security_dashboard"]
//!
//! [feature_flags.global]
//! duo_chat_on_saas = true
//!
//! [engine]
//! max_delegation_depth = 2
//!
//! [audit]
//! sink = "file"
//! path = "decisions.log"
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ability_gate_core::EngineOptions;
use ability_gate_core::FeatureFlag;
use ability_gate_core::FileAuditSink;
use ability_gate_core::GroupId;
use ability_gate_core::InstanceSettings;
use ability_gate_core::LicensedFeature;
use ability_gate_core::NoopAuditSink;
use ability_gate_core::PolicyAuditSink;
use ability_gate_core::ProjectId;
use ability_gate_core::StderrAuditSink;
use ability_gate_core::UserId;
use ability_gate_core::interfaces::FlagTarget;
use ability_gate_core::interfaces::memory::ScopedFeatureFlags;
use ability_gate_core::interfaces::memory::StaticLicenses;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "ability-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "ABILITY_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of entries in any per-scope table.
pub(crate) const MAX_SCOPED_ENTRIES: usize = 4096;
/// Smallest accepted delegation depth.
pub(crate) const MIN_DELEGATION_DEPTH: usize = 1;
/// Largest accepted delegation depth.
pub(crate) const MAX_DELEGATION_DEPTH: usize = 2;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Ability Gate configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AbilityGateConfig {
    /// Instance-wide settings consulted by rules.
    #[serde(default)]
    pub instance: InstanceSettings,
    /// License entitlements.
    #[serde(default)]
    pub licenses: LicenseConfig,
    /// Feature flag overrides.
    #[serde(default)]
    pub feature_flags: FeatureFlagConfig,
    /// Engine limits.
    #[serde(default)]
    pub engine: EngineOptions,
    /// Decision audit output.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl AbilityGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_engine(&self.engine)?;
        self.licenses.validate()?;
        self.feature_flags.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Builds the license snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a namespace key is not a group id.
    pub fn license_snapshot(&self) -> Result<StaticLicenses, ConfigError> {
        self.licenses.snapshot()
    }

    /// Builds the feature flag overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unknown flags or malformed ids.
    pub fn flag_overrides(&self) -> Result<ScopedFeatureFlags, ConfigError> {
        self.feature_flags.overrides()
    }

    /// Returns the instance settings snapshot.
    #[must_use]
    pub fn instance_settings(&self) -> InstanceSettings {
        self.instance.clone()
    }

    /// Returns the engine options.
    #[must_use]
    pub const fn engine_options(&self) -> EngineOptions {
        self.engine
    }
}

/// Rejects delegation depths outside the supported range.
fn validate_engine(engine: &EngineOptions) -> Result<(), ConfigError> {
    if !(MIN_DELEGATION_DEPTH..=MAX_DELEGATION_DEPTH).contains(&engine.max_delegation_depth) {
        return Err(ConfigError::Invalid(format!(
            "engine.max_delegation_depth must be between {MIN_DELEGATION_DEPTH} and \
             {MAX_DELEGATION_DEPTH}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Licenses
// ============================================================================

/// License entitlements.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicenseConfig {
    /// Instance-wide licensed features.
    #[serde(default)]
    pub features: BTreeSet<LicensedFeature>,
    /// Per root group plans, keyed by group id.
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceLicenseConfig>,
}

/// License of one root group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceLicenseConfig {
    /// Licensed features.
    #[serde(default)]
    pub features: BTreeSet<LicensedFeature>,
}

impl LicenseConfig {
    /// Validates namespace keys and table size.
    fn validate(&self) -> Result<(), ConfigError> {
        check_entry_count("licenses.namespaces", self.namespaces.len())?;
        for key in self.namespaces.keys() {
            parse_group("licenses.namespaces", key)?;
        }
        Ok(())
    }

    /// Converts into the engine's license snapshot.
    fn snapshot(&self) -> Result<StaticLicenses, ConfigError> {
        let features: Vec<LicensedFeature> = self.features.iter().copied().collect();
        let mut licenses = StaticLicenses::instance(&features);
        for (key, entry) in &self.namespaces {
            let root = parse_group("licenses.namespaces", key)?;
            let features: Vec<LicensedFeature> = entry.features.iter().copied().collect();
            licenses = licenses.with_namespace(root, &features);
        }
        Ok(licenses)
    }
}

// ============================================================================
// SECTION: Feature Flags
// ============================================================================

/// Flag values by name.
pub type FlagTable = BTreeMap<String, bool>;

/// Feature flag overrides, most specific scope wins at lookup time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureFlagConfig {
    /// Instance-wide values.
    #[serde(default)]
    pub global: FlagTable,
    /// Per user overrides, keyed by user id.
    #[serde(default)]
    pub users: BTreeMap<String, FlagTable>,
    /// Per group overrides, keyed by group id.
    #[serde(default)]
    pub namespaces: BTreeMap<String, FlagTable>,
    /// Per project overrides, keyed by project id.
    #[serde(default)]
    pub projects: BTreeMap<String, FlagTable>,
}

impl FeatureFlagConfig {
    /// Validates flag names, ids, and table sizes.
    fn validate(&self) -> Result<(), ConfigError> {
        self.overrides().map(|_| ())
    }

    /// Converts into the engine's override table.
    fn overrides(&self) -> Result<ScopedFeatureFlags, ConfigError> {
        let mut flags = ScopedFeatureFlags::new();
        push_table(&mut flags, "feature_flags.global", FlagTarget::Instance, &self.global)?;
        for (section, scoped) in [
            ("feature_flags.users", &self.users),
            ("feature_flags.namespaces", &self.namespaces),
            ("feature_flags.projects", &self.projects),
        ] {
            check_entry_count(section, scoped.len())?;
            for (key, table) in scoped {
                let target = scoped_target(section, key)?;
                push_table(&mut flags, section, target, table)?;
            }
        }
        Ok(flags)
    }
}

/// Resolves the override target named by `key` within `section`.
fn scoped_target(section: &str, key: &str) -> Result<FlagTarget, ConfigError> {
    match section {
        "feature_flags.users" => {
            let raw = parse_raw_id(section, key)?;
            UserId::from_raw(raw)
                .map(FlagTarget::User)
                .ok_or_else(|| ConfigError::Invalid(format!("{section} ids must be non-zero")))
        }
        "feature_flags.namespaces" => parse_group(section, key).map(FlagTarget::Group),
        _ => parse_project(section, key).map(FlagTarget::Project),
    }
}

/// Adds every entry of `table` as an override on `target`.
fn push_table(
    flags: &mut ScopedFeatureFlags,
    section: &str,
    target: FlagTarget,
    table: &FlagTable,
) -> Result<(), ConfigError> {
    for (name, enabled) in table {
        let flag = FeatureFlag::ALL
            .into_iter()
            .find(|flag| flag.as_str() == name.as_str())
            .ok_or_else(|| ConfigError::Invalid(format!("{section}: unknown feature flag {name}")))?;
        flags.set(flag, target, *enabled);
    }
    Ok(())
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Destination for decision audit events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
}

/// Decision audit configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates sink settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }

    /// Opens the configured sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the log file cannot be opened.
    pub fn build_sink(&self) -> Result<Box<dyn PolicyAuditSink>, ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::None, _) => Ok(Box::new(NoopAuditSink)),
            (AuditSinkKind::Stderr, _) => Ok(Box::new(StderrAuditSink)),
            (AuditSinkKind::File, Some(path)) => FileAuditSink::new(Path::new(path.trim()))
                .map(|sink| Box::new(sink) as Box<dyn PolicyAuditSink>)
                .map_err(|err| ConfigError::Io(err.to_string())),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Rejects oversized per-scope tables.
fn check_entry_count(field: &str, count: usize) -> Result<(), ConfigError> {
    if count > MAX_SCOPED_ENTRIES {
        return Err(ConfigError::Invalid(format!(
            "{field} exceeds {MAX_SCOPED_ENTRIES} entries"
        )));
    }
    Ok(())
}

/// Parses a table key as a numeric identifier.
fn parse_raw_id(field: &str, key: &str) -> Result<u64, ConfigError> {
    key.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(format!("{field} keys must be numeric ids, got {key}")))
}

/// Parses a table key as a group id.
fn parse_group(field: &str, key: &str) -> Result<GroupId, ConfigError> {
    GroupId::from_raw(parse_raw_id(field, key)?)
        .ok_or_else(|| ConfigError::Invalid(format!("{field} ids must be non-zero")))
}

/// Parses a table key as a project id.
fn parse_project(field: &str, key: &str) -> Result<ProjectId, ConfigError> {
    ProjectId::from_raw(parse_raw_id(field, key)?)
        .ok_or_else(|| ConfigError::Invalid(format!("{field} ids must be non-zero")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
