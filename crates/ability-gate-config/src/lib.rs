// crates/ability-gate-config/src/lib.rs
// ============================================================================
// Module: Ability Gate Config Library
// Description: Canonical config model and validation for ability-gate.toml.
// Purpose: Turn a TOML file into the licenses, flags, settings, and options the engine needs.
// Dependencies: ability-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `ability-gate-config` loads `ability-gate.toml`, validates it fail-closed,
//! and converts it into the in-memory collaborators and options consumed by
//! [`ability_gate_core::PolicySession`].
//!
//! Security posture: config inputs are untrusted. Size, path, and identifier
//! checks run before anything reaches the engine.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AbilityGateConfig;
pub use config::AuditConfig;
pub use config::AuditSinkKind;
pub use config::ConfigError;
pub use config::FeatureFlagConfig;
pub use config::FlagTable;
pub use config::LicenseConfig;
pub use config::NamespaceLicenseConfig;
