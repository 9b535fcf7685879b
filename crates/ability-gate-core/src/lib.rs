// crates/ability-gate-core/src/lib.rs
// ============================================================================
// Module: Ability Gate Core
// Description: Ability evaluation engine for projects, groups, and their content.
// Purpose: Decide whether an actor holds a named ability on a resource.
// Dependencies: ability-logic, ipnetwork, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `ability-gate-core` answers one question: may this actor do this to that
//! resource? Policy tables ([`policies`]) are compiled once into an
//! [`AbilityRegistry`]. Each request then opens a [`PolicySession`] for the
//! acting identity, which interprets the tables against resource snapshots
//! and the host's collaborators ([`interfaces`]).
//!
//! ```text
//! let registry = AbilityRegistry::standard()?;
//! let session = PolicySession::new(&registry, collaborators, actor);
//! ProjectPolicy::new(&session, &project).allowed(Ability::PushCode)?;
//! ```
//!
//! Security posture: decisions fail closed only by explicit rule. A failing
//! collaborator surfaces as [`PolicyError`], never as a silent deny.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod facade;
pub mod interfaces;
pub mod policies;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::MemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::PolicyAuditEvent;
pub use audit::PolicyAuditSink;
pub use audit::StderrAuditSink;
pub use crate::core::Ability;
pub use crate::core::AbilityCategory;
pub use crate::core::AccessLevel;
pub use crate::core::Actor;
pub use crate::core::ActorKind;
pub use crate::core::ActorRef;
pub use crate::core::BotActor;
pub use crate::core::BotKind;
pub use crate::core::CiJobActor;
pub use crate::core::CustomPermission;
pub use crate::core::DeployKeyActor;
pub use crate::core::DeployTokenActor;
pub use crate::core::FeatureFlag;
pub use crate::core::GroupId;
pub use crate::core::GroupSnapshot;
pub use crate::core::InstanceSettings;
pub use crate::core::IssueSnapshot;
pub use crate::core::LicensedFeature;
pub use crate::core::MemberRole;
pub use crate::core::NamespaceSnapshot;
pub use crate::core::ProjectFeature;
pub use crate::core::ProjectId;
pub use crate::core::ProjectSnapshot;
pub use crate::core::RequestContext;
pub use crate::core::Resource;
pub use crate::core::ResourceKind;
pub use crate::core::ResourceRef;
pub use crate::core::ResourceSnapshot;
pub use crate::core::UserActor;
pub use crate::core::UserId;
pub use crate::core::Visibility;
pub use crate::core::VulnerabilitySnapshot;
pub use crate::core::WorkItemSnapshot;
pub use facade::GlobalPolicy;
pub use facade::GroupPolicy;
pub use facade::IssuePolicy;
pub use facade::ProjectPolicy;
pub use facade::ResourcePolicy;
pub use facade::VulnerabilityPolicy;
pub use facade::WorkItemPolicy;
pub use interfaces::CollaboratorError;
pub use interfaces::Collaborators;
pub use runtime::AbilityRegistry;
pub use runtime::Condition;
pub use runtime::DecisionStep;
pub use runtime::EngineOptions;
pub use runtime::PolicyDecision;
pub use runtime::PolicyError;
pub use runtime::PolicySession;
pub use runtime::RegistryError;

// ============================================================================
// SECTION: Standard Registry
// ============================================================================

impl AbilityRegistry {
    /// Compiles the built-in policy tables.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a table is malformed.
    pub fn standard() -> Result<Self, RegistryError> {
        policies::standard_registry()
    }
}
