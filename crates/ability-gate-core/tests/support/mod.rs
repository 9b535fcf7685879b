// crates/ability-gate-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared fixtures for ability-gate-core integration tests.
// Purpose: Build worlds (registry, directory, licenses, flags) and snapshots.
// Dependencies: ability-gate-core
// ============================================================================

//! Shared fixtures for ability-gate-core integration tests.

#![allow(
    dead_code,
    clippy::expect_used,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    reason = "Test-only helpers shared across integration test binaries."
)]

use ability_gate_core::AbilityRegistry;
use ability_gate_core::AccessLevel;
use ability_gate_core::Actor;
use ability_gate_core::CustomPermission;
use ability_gate_core::GroupId;
use ability_gate_core::GroupSnapshot;
use ability_gate_core::InstanceSettings;
use ability_gate_core::MemberRole;
use ability_gate_core::PolicySession;
use ability_gate_core::ProjectId;
use ability_gate_core::ProjectSnapshot;
use ability_gate_core::RequestContext;
use ability_gate_core::UserActor;
use ability_gate_core::UserId;
use ability_gate_core::Visibility;
use ability_gate_core::core::MemberRoleId;
use ability_gate_core::core::MembershipTarget;
use ability_gate_core::interfaces::Collaborators;
use ability_gate_core::interfaces::memory::InMemoryDirectory;
use ability_gate_core::interfaces::memory::ScopedFeatureFlags;
use ability_gate_core::interfaces::memory::StaticLicenses;

/// Result type used by integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Returns an error when `condition` is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into().into()) }
}

/// Root group used by most fixtures.
pub const ROOT_GROUP: u64 = 100;
/// Project used by most fixtures.
pub const PROJECT: u64 = 10;

/// Builds a user id.
pub fn user_id(raw: u64) -> UserId {
    UserId::from_raw(raw).expect("non-zero user id")
}

/// Builds a group id.
pub fn group_id(raw: u64) -> GroupId {
    GroupId::from_raw(raw).expect("non-zero group id")
}

/// Builds a project id.
pub fn project_id(raw: u64) -> ProjectId {
    ProjectId::from_raw(raw).expect("non-zero project id")
}

/// Regular signed-in user.
pub fn user(raw: u64) -> Actor {
    Actor::User(UserActor::regular(user_id(raw)))
}

/// Administrator with admin mode on or off.
pub fn admin(raw: u64, admin_mode: bool) -> Actor {
    Actor::User(UserActor {
        admin: true,
        admin_mode,
        ..UserActor::regular(user_id(raw))
    })
}

/// Auditor account.
pub fn auditor(raw: u64) -> Actor {
    Actor::User(UserActor {
        auditor: true,
        ..UserActor::regular(user_id(raw))
    })
}

/// External user.
pub fn external(raw: u64) -> Actor {
    Actor::User(UserActor {
        external: true,
        ..UserActor::regular(user_id(raw))
    })
}

/// Project inside the fixture root group.
pub fn project(visibility: Visibility) -> ProjectSnapshot {
    let mut project = ProjectSnapshot::new(project_id(PROJECT));
    project.visibility = visibility;
    project.namespace.ancestors = vec![group_id(ROOT_GROUP)];
    project
}

/// The fixture root group.
pub fn root_group(visibility: Visibility) -> GroupSnapshot {
    let mut group = GroupSnapshot::new(group_id(ROOT_GROUP));
    group.visibility = visibility;
    group
}

/// Instance-wide custom role with the given permissions.
pub fn member_role(id: u64, base: AccessLevel, permissions: &[CustomPermission]) -> MemberRole {
    MemberRole {
        id: MemberRoleId::from_raw(id).expect("non-zero role id"),
        name: format!("role-{id}"),
        namespace: None,
        base_access_level: base,
        permissions: permissions.iter().copied().collect(),
    }
}

/// Everything a session borrows.
pub struct World {
    /// Compiled policy tables.
    pub registry: AbilityRegistry,
    /// Memberships, bans, custom roles, job token allowlists.
    pub directory: InMemoryDirectory,
    /// License state.
    pub licenses: StaticLicenses,
    /// Flag overrides.
    pub flags: ScopedFeatureFlags,
    /// Instance settings.
    pub settings: InstanceSettings,
    /// Request facts.
    pub request: RequestContext,
}

impl World {
    /// Fully licensed world with no memberships.
    pub fn new() -> Self {
        Self {
            registry: AbilityRegistry::standard().expect("standard registry"),
            directory: InMemoryDirectory::new(),
            licenses: StaticLicenses::all(),
            flags: ScopedFeatureFlags::new(),
            settings: InstanceSettings::default(),
            request: RequestContext::default(),
        }
    }

    /// Unlicensed world with no memberships.
    pub fn unlicensed() -> Self {
        Self {
            licenses: StaticLicenses::none(),
            ..Self::new()
        }
    }

    /// Adds a project membership on the fixture project.
    pub fn project_member(&mut self, user: u64, level: AccessLevel) {
        self.directory.add_member(
            user_id(user),
            MembershipTarget::Project(project_id(PROJECT)),
            level,
        );
    }

    /// Adds a membership on the fixture root group.
    pub fn group_member(&mut self, user: u64, level: AccessLevel) {
        self.directory.add_member(
            user_id(user),
            MembershipTarget::Group(group_id(ROOT_GROUP)),
            level,
        );
    }

    /// Bundles the collaborators.
    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators::with_directory(&self.directory, &self.licenses, &self.flags)
    }

    /// Opens a session for `actor`.
    pub fn session(&self, actor: Actor) -> PolicySession<'_> {
        PolicySession::new(&self.registry, self.collaborators(), actor)
            .with_settings(self.settings.clone())
            .with_request(self.request.clone())
    }
}
