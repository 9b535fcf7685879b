// crates/ability-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Ability Gate Interfaces
// Description: Collaborator contracts consulted while deciding abilities.
// Purpose: Keep membership, license, flag, ban, custom role, and job token
//          storage behind backend-agnostic traits.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The engine never talks to storage directly. Everything that is not part of
//! the request snapshot is fetched through one of the traits below. Lookups
//! are synchronous and fallible; a failed lookup aborts the decision with an
//! error rather than being read as "no".
//!
//! [`memory`] provides in-memory implementations suitable for tests, fixtures,
//! and the CLI.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::FeatureFlag;
use crate::core::GroupId;
use crate::core::LicensedFeature;
use crate::core::MemberRole;
use crate::core::MembershipTarget;
use crate::core::ProjectId;
use crate::core::UserId;
use crate::core::role::AccessLevel;

pub mod memory;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Collaborator lookup failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// Membership lookup failed.
    #[error("membership lookup failed: {0}")]
    Membership(String),
    /// License lookup failed.
    #[error("license lookup failed: {0}")]
    License(String),
    /// Feature flag lookup failed.
    #[error("feature flag lookup failed: {0}")]
    FeatureFlag(String),
    /// Namespace ban lookup failed.
    #[error("namespace ban lookup failed: {0}")]
    Ban(String),
    /// Custom role lookup failed.
    #[error("custom role lookup failed: {0}")]
    CustomRole(String),
    /// Job token allowlist lookup failed.
    #[error("job token scope lookup failed: {0}")]
    JobTokenScope(String),
}

// ============================================================================
// SECTION: Membership
// ============================================================================

/// Direct membership on a project or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Membership {
    /// Granted access level.
    pub access_level: AccessLevel,
    /// Pending invitations and access requests confer nothing.
    #[serde(default)]
    pub pending: bool,
}

impl Membership {
    /// Creates an active membership.
    #[must_use]
    pub const fn active(access_level: AccessLevel) -> Self {
        Self {
            access_level,
            pending: false,
        }
    }
}

/// Resolves direct memberships.
///
/// Inheritance is not the resolver's concern; the engine walks the
/// containment chain and takes the highest active level.
pub trait MembershipResolver: Send + Sync {
    /// Returns the direct membership of `user` on `target`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Membership`] when the lookup fails.
    fn membership(
        &self,
        user: UserId,
        target: MembershipTarget,
    ) -> Result<Option<Membership>, CollaboratorError>;
}

// ============================================================================
// SECTION: Licenses
// ============================================================================

/// Answers license entitlement questions.
pub trait LicenseSnapshot: Send + Sync {
    /// Returns true when `feature` is licensed for `root` (or the instance
    /// when `root` is `None`).
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::License`] when the lookup fails.
    fn licensed(
        &self,
        feature: LicensedFeature,
        root: Option<GroupId>,
    ) -> Result<bool, CollaboratorError>;
}

// ============================================================================
// SECTION: Feature Flags
// ============================================================================

/// Actor or resource a flag override is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum FlagTarget {
    /// Instance-wide value.
    Instance,
    /// Override for a user.
    User(UserId),
    /// Override for a group.
    Group(GroupId),
    /// Override for a project.
    Project(ProjectId),
}

/// Looks up feature flag overrides.
pub trait FeatureFlagService: Send + Sync {
    /// Returns the override configured for `flag` at exactly `target`.
    ///
    /// `None` means "no override here"; the engine falls back to the next
    /// broader scope and finally to the flag's built-in default.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::FeatureFlag`] when the lookup fails.
    fn lookup(&self, flag: FeatureFlag, target: FlagTarget)
    -> Result<Option<bool>, CollaboratorError>;
}

// ============================================================================
// SECTION: Namespace Bans
// ============================================================================

/// Reports users banned from a root namespace.
pub trait NamespaceBanRegistry: Send + Sync {
    /// Returns true when `user` is banned from `root`.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::Ban`] when the lookup fails.
    fn banned(&self, user: UserId, root: GroupId) -> Result<bool, CollaboratorError>;
}

// ============================================================================
// SECTION: Custom Roles
// ============================================================================

/// Resolves custom member roles attached to memberships.
pub trait CustomRoleStore: Send + Sync {
    /// Returns the custom roles attached to `user`'s membership on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::CustomRole`] when the lookup fails.
    fn roles_for(
        &self,
        user: UserId,
        target: MembershipTarget,
    ) -> Result<Vec<MemberRole>, CollaboratorError>;
}

// ============================================================================
// SECTION: Job Token Scope
// ============================================================================

/// Entry on a project's inbound job token allowlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum JobTokenSource {
    /// Jobs from this project.
    Project(ProjectId),
    /// Jobs from any project inside this group.
    Group(GroupId),
}

/// Exposes CI job token allowlists.
pub trait JobTokenScopeStore: Send + Sync {
    /// Returns the sources allowed to reach `target` with a job token.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::JobTokenScope`] when the lookup fails.
    fn inbound_allowlist(&self, target: ProjectId)
    -> Result<Vec<JobTokenSource>, CollaboratorError>;

    /// Returns the projects jobs from `origin` may reach when its outbound
    /// scope is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::JobTokenScope`] when the lookup fails.
    fn outbound_allowlist(&self, origin: ProjectId) -> Result<Vec<ProjectId>, CollaboratorError>;
}

// ============================================================================
// SECTION: Collaborator Bundle
// ============================================================================

/// Borrowed set of collaborators a session consults.
#[derive(Clone, Copy)]
pub struct Collaborators<'c> {
    /// Membership lookups.
    pub memberships: &'c dyn MembershipResolver,
    /// License lookups.
    pub licenses: &'c dyn LicenseSnapshot,
    /// Feature flag lookups.
    pub flags: &'c dyn FeatureFlagService,
    /// Namespace ban lookups.
    pub bans: &'c dyn NamespaceBanRegistry,
    /// Custom role lookups.
    pub custom_roles: &'c dyn CustomRoleStore,
    /// Job token allowlist lookups.
    pub job_tokens: &'c dyn JobTokenScopeStore,
}

impl<'c> Collaborators<'c> {
    /// Bundles a directory that serves memberships, bans, custom roles, and
    /// job token allowlists with separate license and flag sources.
    #[must_use]
    pub fn with_directory<D>(
        directory: &'c D,
        licenses: &'c dyn LicenseSnapshot,
        flags: &'c dyn FeatureFlagService,
    ) -> Self
    where
        D: MembershipResolver + NamespaceBanRegistry + CustomRoleStore + JobTokenScopeStore,
    {
        Self {
            memberships: directory,
            licenses,
            flags,
            bans: directory,
            custom_roles: directory,
            job_tokens: directory,
        }
    }
}

impl std::fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
