// crates/ability-gate-core/src/interfaces/memory.rs
// ============================================================================
// Module: In-Memory Collaborators
// Description: Plain-data implementations of every collaborator trait.
// Purpose: Back tests, fixtures, and the CLI without external storage.
// Dependencies: crate::core, crate::interfaces, serde
// ============================================================================

//! ## Overview
//! These collaborators hold their data in vectors and answer lookups with
//! linear scans. They deserialize from the same JSON layout the CLI world
//! fixtures use, so a fixture file is a complete, reproducible decision
//! environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::FeatureFlag;
use crate::core::GroupId;
use crate::core::LicensedFeature;
use crate::core::MemberRole;
use crate::core::MemberRoleId;
use crate::core::MembershipTarget;
use crate::core::ProjectId;
use crate::core::UserId;
use crate::core::role::AccessLevel;
use crate::interfaces::CollaboratorError;
use crate::interfaces::CustomRoleStore;
use crate::interfaces::FeatureFlagService;
use crate::interfaces::FlagTarget;
use crate::interfaces::JobTokenScopeStore;
use crate::interfaces::JobTokenSource;
use crate::interfaces::LicenseSnapshot;
use crate::interfaces::Membership;
use crate::interfaces::MembershipResolver;
use crate::interfaces::NamespaceBanRegistry;

// ============================================================================
// SECTION: Directory
// ============================================================================

/// Stored membership row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MembershipRecord {
    /// Member.
    pub user: UserId,
    /// Project or group the membership is on.
    pub target: MembershipTarget,
    /// Granted access level.
    pub access_level: AccessLevel,
    /// Invitation or access request not yet accepted.
    #[serde(default)]
    pub pending: bool,
    /// Custom role attached to the membership.
    #[serde(default)]
    pub member_role: Option<MemberRoleId>,
}

/// Stored namespace ban.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceBan {
    /// Banned user.
    pub user: UserId,
    /// Root group the ban applies to.
    pub root: GroupId,
}

/// Inbound job token allowlist row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InboundAllowlistEntry {
    /// Project being reached.
    pub target: ProjectId,
    /// Allowed source.
    pub source: JobTokenSource,
}

/// Outbound job token allowlist row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutboundAllowlistEntry {
    /// Project the job runs in.
    pub origin: ProjectId,
    /// Project the job may reach.
    pub target: ProjectId,
}

/// In-memory membership, ban, custom role, and job token directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InMemoryDirectory {
    /// Membership rows.
    #[serde(default)]
    pub memberships: Vec<MembershipRecord>,
    /// Custom role definitions.
    #[serde(default)]
    pub member_roles: Vec<MemberRole>,
    /// Namespace bans.
    #[serde(default)]
    pub bans: Vec<NamespaceBan>,
    /// Inbound job token allowlist.
    #[serde(default)]
    pub job_token_inbound: Vec<InboundAllowlistEntry>,
    /// Outbound job token allowlist.
    #[serde(default)]
    pub job_token_outbound: Vec<OutboundAllowlistEntry>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memberships: Vec::new(),
            member_roles: Vec::new(),
            bans: Vec::new(),
            job_token_inbound: Vec::new(),
            job_token_outbound: Vec::new(),
        }
    }

    /// Adds (or replaces) an active membership.
    pub fn add_member(&mut self, user: UserId, target: MembershipTarget, level: AccessLevel) {
        self.upsert(MembershipRecord {
            user,
            target,
            access_level: level,
            pending: false,
            member_role: None,
        });
    }

    /// Adds (or replaces) a pending membership.
    pub fn add_pending_member(
        &mut self,
        user: UserId,
        target: MembershipTarget,
        level: AccessLevel,
    ) {
        self.upsert(MembershipRecord {
            user,
            target,
            access_level: level,
            pending: true,
            member_role: None,
        });
    }

    /// Registers a custom role and attaches it to `user`'s membership on
    /// `target`, creating a membership at the role's base level if needed.
    pub fn assign_member_role(&mut self, user: UserId, target: MembershipTarget, role: MemberRole) {
        let role_id = role.id;
        let base = role.base_access_level;
        if !self.member_roles.iter().any(|existing| existing.id == role_id) {
            self.member_roles.push(role);
        }
        match self.record_mut(user, target) {
            Some(record) => record.member_role = Some(role_id),
            None => self.memberships.push(MembershipRecord {
                user,
                target,
                access_level: base,
                pending: false,
                member_role: Some(role_id),
            }),
        }
    }

    /// Bans `user` from the hierarchy under `root`.
    pub fn ban(&mut self, user: UserId, root: GroupId) {
        self.bans.push(NamespaceBan {
            user,
            root,
        });
    }

    /// Allows jobs from `source` to reach `target`.
    pub fn allow_inbound(&mut self, target: ProjectId, source: JobTokenSource) {
        self.job_token_inbound.push(InboundAllowlistEntry {
            target,
            source,
        });
    }

    /// Allows jobs from `origin` to reach `target` when outbound scope is on.
    pub fn allow_outbound(&mut self, origin: ProjectId, target: ProjectId) {
        self.job_token_outbound.push(OutboundAllowlistEntry {
            origin,
            target,
        });
    }

    /// Inserts or replaces the row for `record.user` on `record.target`.
    fn upsert(&mut self, record: MembershipRecord) {
        match self.record_mut(record.user, record.target) {
            Some(existing) => {
                let member_role = existing.member_role;
                *existing = MembershipRecord {
                    member_role,
                    ..record
                };
            }
            None => self.memberships.push(record),
        }
    }

    /// Returns the mutable row for `user` on `target`.
    fn record_mut(&mut self, user: UserId, target: MembershipTarget) -> Option<&mut MembershipRecord> {
        self.memberships.iter_mut().find(|record| record.user == user && record.target == target)
    }
}

impl MembershipResolver for InMemoryDirectory {
    fn membership(
        &self,
        user: UserId,
        target: MembershipTarget,
    ) -> Result<Option<Membership>, CollaboratorError> {
        Ok(self.memberships.iter().find(|record| record.user == user && record.target == target).map(
            |record| Membership {
                access_level: record.access_level,
                pending: record.pending,
            },
        ))
    }
}

impl NamespaceBanRegistry for InMemoryDirectory {
    fn banned(&self, user: UserId, root: GroupId) -> Result<bool, CollaboratorError> {
        Ok(self.bans.iter().any(|ban| ban.user == user && ban.root == root))
    }
}

impl CustomRoleStore for InMemoryDirectory {
    fn roles_for(
        &self,
        user: UserId,
        target: MembershipTarget,
    ) -> Result<Vec<MemberRole>, CollaboratorError> {
        let mut roles = Vec::new();
        for record in &self.memberships {
            if record.user != user || record.target != target {
                continue;
            }
            let Some(role_id) = record.member_role else {
                continue;
            };
            let role = self.member_roles.iter().find(|role| role.id == role_id).ok_or_else(|| {
                CollaboratorError::CustomRole(format!("member role {role_id} is not defined"))
            })?;
            roles.push(role.clone());
        }
        Ok(roles)
    }
}

impl JobTokenScopeStore for InMemoryDirectory {
    fn inbound_allowlist(
        &self,
        target: ProjectId,
    ) -> Result<Vec<JobTokenSource>, CollaboratorError> {
        Ok(self
            .job_token_inbound
            .iter()
            .filter(|entry| entry.target == target)
            .map(|entry| entry.source)
            .collect())
    }

    fn outbound_allowlist(&self, origin: ProjectId) -> Result<Vec<ProjectId>, CollaboratorError> {
        Ok(self
            .job_token_outbound
            .iter()
            .filter(|entry| entry.origin == origin)
            .map(|entry| entry.target)
            .collect())
    }
}

// ============================================================================
// SECTION: Licenses
// ============================================================================

/// License entitlements of a single root group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceLicense {
    /// Root group.
    pub root: GroupId,
    /// Licensed features.
    #[serde(default)]
    pub features: BTreeSet<LicensedFeature>,
}

/// Fixed license entitlements.
///
/// A root group with its own entry uses only that entry; every other lookup
/// falls back to the instance license.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticLicenses {
    /// Instance-wide license.
    #[serde(default)]
    pub instance: BTreeSet<LicensedFeature>,
    /// Per root group licenses.
    #[serde(default)]
    pub namespaces: Vec<NamespaceLicense>,
}

impl StaticLicenses {
    /// License with nothing enabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            instance: BTreeSet::new(),
            namespaces: Vec::new(),
        }
    }

    /// Instance license with every feature enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            instance: LicensedFeature::ALL.into_iter().collect(),
            namespaces: Vec::new(),
        }
    }

    /// Instance license with exactly `features` enabled.
    #[must_use]
    pub fn instance(features: &[LicensedFeature]) -> Self {
        Self {
            instance: features.iter().copied().collect(),
            namespaces: Vec::new(),
        }
    }

    /// Adds a root group license.
    #[must_use]
    pub fn with_namespace(mut self, root: GroupId, features: &[LicensedFeature]) -> Self {
        self.namespaces.push(NamespaceLicense {
            root,
            features: features.iter().copied().collect(),
        });
        self
    }
}

impl LicenseSnapshot for StaticLicenses {
    fn licensed(
        &self,
        feature: LicensedFeature,
        root: Option<GroupId>,
    ) -> Result<bool, CollaboratorError> {
        let scoped = root.and_then(|root| self.namespaces.iter().find(|entry| entry.root == root));
        Ok(scoped.map_or_else(
            || self.instance.contains(&feature),
            |entry| entry.features.contains(&feature),
        ))
    }
}

// ============================================================================
// SECTION: Feature Flags
// ============================================================================

/// Single flag override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagOverride {
    /// Flag being overridden.
    pub flag: FeatureFlag,
    /// Scope of the override.
    pub target: FlagTarget,
    /// Overridden value.
    pub enabled: bool,
}

/// Flag overrides keyed by exact scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopedFeatureFlags {
    /// Configured overrides; later entries win.
    #[serde(default)]
    pub overrides: Vec<FlagOverride>,
}

impl ScopedFeatureFlags {
    /// Creates a service where every flag uses its default.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            overrides: Vec::new(),
        }
    }

    /// Sets an override.
    pub fn set(&mut self, flag: FeatureFlag, target: FlagTarget, enabled: bool) {
        self.overrides.push(FlagOverride {
            flag,
            target,
            enabled,
        });
    }

    /// Builder form of [`ScopedFeatureFlags::set`].
    #[must_use]
    pub fn with(mut self, flag: FeatureFlag, target: FlagTarget, enabled: bool) -> Self {
        self.set(flag, target, enabled);
        self
    }
}

impl FeatureFlagService for ScopedFeatureFlags {
    fn lookup(
        &self,
        flag: FeatureFlag,
        target: FlagTarget,
    ) -> Result<Option<bool>, CollaboratorError> {
        Ok(self
            .overrides
            .iter()
            .rev()
            .find(|entry| entry.flag == flag && entry.target == target)
            .map(|entry| entry.enabled))
    }
}
