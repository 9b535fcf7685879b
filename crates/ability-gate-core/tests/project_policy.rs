// crates/ability-gate-core/tests/project_policy.rs
// ============================================================================
// Module: Project Policy Tests
// Description: Role, visibility, and feature-level decisions on projects.
// Purpose: Pin the project rule table against known scenarios.
// Dependencies: ability-gate-core
// ============================================================================

//! Project policy decision tests.

#![allow(clippy::use_debug, reason = "Test failure messages print fixture values.")]

mod support;

use ability_gate_core::Ability;
use ability_gate_core::AccessLevel;
use ability_gate_core::Actor;
use ability_gate_core::CustomPermission;
use ability_gate_core::ProjectFeature;
use ability_gate_core::ProjectPolicy;
use ability_gate_core::Visibility;
use ability_gate_core::core::CiCancellationRestriction;
use ability_gate_core::core::DeployKeyActor;
use ability_gate_core::core::DeployKeyId;
use ability_gate_core::core::DeployKeyLink;
use ability_gate_core::core::DeployTokenActor;
use ability_gate_core::core::DeployTokenId;
use ability_gate_core::core::DeployTokenScope;
use ability_gate_core::core::DeployTokenTarget;
use ability_gate_core::core::FeatureAccessLevel;
use ability_gate_core::core::MembershipTarget;
use support::PROJECT;
use support::ROOT_GROUP;
use support::TestResult;
use support::World;
use support::admin;
use support::auditor;
use support::ensure;
use support::external;
use support::group_id;
use support::member_role;
use support::project;
use support::project_id;
use support::user;
use support::user_id;

#[test]
fn anonymous_reads_public_projects_only() -> TestResult {
    let world = World::new();
    let session = world.session(Actor::Anonymous);

    let private = project(Visibility::Private);
    let public = project(Visibility::Public);
    ensure(
        ProjectPolicy::new(&session, &private).disallowed(Ability::ReadProject)?,
        "anonymous must not read a private project",
    )?;
    ensure(
        ProjectPolicy::new(&session, &public).allowed(Ability::ReadProject)?,
        "anonymous reads a public project",
    )
}

#[test]
fn internal_projects_exclude_external_users() -> TestResult {
    let world = World::new();
    let internal = project(Visibility::Internal);

    let regular = world.session(user(1));
    ensure(
        ProjectPolicy::new(&regular, &internal).allowed(Ability::ReadProject)?,
        "signed-in users read internal projects",
    )?;
    let outsider = world.session(external(2));
    ensure(
        ProjectPolicy::new(&outsider, &internal).disallowed(Ability::ReadProject)?,
        "external users need a membership for internal projects",
    )
}

#[test]
fn environment_access_follows_feature_level_table() -> TestResult {
    let cases = [
        (Visibility::Public, FeatureAccessLevel::Enabled, None, true),
        (Visibility::Public, FeatureAccessLevel::Enabled, Some(AccessLevel::Guest), true),
        (Visibility::Public, FeatureAccessLevel::Private, Some(AccessLevel::Guest), false),
        (Visibility::Public, FeatureAccessLevel::Private, None, false),
        (Visibility::Public, FeatureAccessLevel::Private, Some(AccessLevel::Reporter), true),
        (Visibility::Private, FeatureAccessLevel::Enabled, Some(AccessLevel::Guest), false),
        (Visibility::Private, FeatureAccessLevel::Enabled, Some(AccessLevel::Reporter), true),
        (Visibility::Private, FeatureAccessLevel::Private, Some(AccessLevel::Developer), true),
        (Visibility::Private, FeatureAccessLevel::Disabled, Some(AccessLevel::Owner), false),
    ];
    for (visibility, level, role, expected) in cases {
        let mut world = World::new();
        if let Some(role) = role {
            world.project_member(1, role);
        }
        let actor = if role.is_some() { user(1) } else { Actor::Anonymous };
        let mut snapshot = project(visibility);
        snapshot.features.set(ProjectFeature::Environments, level);
        let session = world.session(actor);
        let allowed = ProjectPolicy::new(&session, &snapshot).allowed(Ability::ReadEnvironment)?;
        ensure(
            allowed == expected,
            format!("{visibility:?}/{level:?}/{role:?}: expected {expected}, got {allowed}"),
        )?;
    }
    Ok(())
}

#[test]
fn environment_writes_require_developer_and_admin_requires_maintainer() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Reporter);
    world.project_member(2, AccessLevel::Developer);
    world.project_member(3, AccessLevel::Maintainer);
    let snapshot = project(Visibility::Private);

    let reporter = world.session(user(1));
    let developer = world.session(user(2));
    let maintainer = world.session(user(3));
    ensure(
        ProjectPolicy::new(&reporter, &snapshot).disallowed(Ability::CreateEnvironment)?,
        "reporters cannot create environments",
    )?;
    ensure(
        ProjectPolicy::new(&developer, &snapshot).allowed(Ability::DestroyEnvironment)?,
        "developers destroy environments",
    )?;
    ensure(
        ProjectPolicy::new(&developer, &snapshot).disallowed(Ability::AdminEnvironment)?,
        "developers cannot administer environments",
    )?;
    ensure(
        ProjectPolicy::new(&maintainer, &snapshot).allowed(Ability::AdminEnvironment)?,
        "maintainers administer environments",
    )
}

#[test]
fn disabled_merge_requests_deny_even_maintainers() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Maintainer);
    let mut snapshot = project(Visibility::Private);
    snapshot.features.set(ProjectFeature::MergeRequests, FeatureAccessLevel::Disabled);

    let session = world.session(user(1));
    let policy = ProjectPolicy::new(&session, &snapshot);
    ensure(policy.disallowed(Ability::ReadMergeRequest)?, "merge requests are disabled")?;
    ensure(policy.disallowed(Ability::AdminMergeRequest)?, "disabled feature blocks admin too")?;
    ensure(policy.allowed(Ability::AdminProject)?, "other maintainer abilities remain")
}

#[test]
fn disabled_feature_dominates_custom_role_grants() -> TestResult {
    let mut world = World::new();
    world.directory.assign_member_role(
        user_id(1),
        MembershipTarget::Group(group_id(ROOT_GROUP)),
        member_role(1, AccessLevel::Guest, &[CustomPermission::AdminMergeRequest]),
    );
    let mut snapshot = project(Visibility::Private);
    let session = world.session(user(1));
    ensure(
        ProjectPolicy::new(&session, &snapshot).allowed(Ability::ReadMergeRequest)?,
        "custom role grants read_merge_request",
    )?;

    snapshot.features.set(ProjectFeature::MergeRequests, FeatureAccessLevel::Disabled);
    let session = world.session(user(1));
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::ReadMergeRequest)?,
        "disabled merge requests win over the custom role",
    )
}

#[test]
fn guest_with_read_vulnerability_custom_role_reads_vulnerabilities() -> TestResult {
    let mut world = World::new();
    world.directory.assign_member_role(
        user_id(1),
        MembershipTarget::Project(project_id(PROJECT)),
        member_role(7, AccessLevel::Guest, &[CustomPermission::ReadVulnerability]),
    );
    let snapshot = project(Visibility::Private);
    let session = world.session(user(1));
    let policy = ProjectPolicy::new(&session, &snapshot);
    ensure(policy.allowed(Ability::ReadVulnerability)?, "custom role grants read_vulnerability")?;
    ensure(
        policy.allowed(Ability::AccessSecurityAndCompliance)?,
        "custom role opens the security area",
    )?;
    ensure(policy.disallowed(Ability::AdminVulnerability)?, "custom role grants nothing more")?;
    ensure(policy.allowed(Ability::ReadProject)?, "base role still applies")
}

#[test]
fn custom_roles_require_the_license() -> TestResult {
    let mut world = World::unlicensed();
    world.directory.assign_member_role(
        user_id(1),
        MembershipTarget::Project(project_id(PROJECT)),
        member_role(7, AccessLevel::Guest, &[CustomPermission::ReadCode]),
    );
    let snapshot = project(Visibility::Private);
    let session = world.session(user(1));
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::ReadCode)?,
        "unlicensed custom roles grant nothing",
    )
}

#[test]
fn custom_roles_from_other_namespaces_do_not_apply() -> TestResult {
    let mut world = World::new();
    let mut role = member_role(7, AccessLevel::Guest, &[CustomPermission::ReadCode]);
    role.namespace = Some(group_id(999));
    world.directory.assign_member_role(
        user_id(1),
        MembershipTarget::Project(project_id(PROJECT)),
        role,
    );
    let snapshot = project(Visibility::Private);
    let session = world.session(user(1));
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::ReadCode)?,
        "role scoped to another root group is ignored",
    )
}

#[test]
fn admin_powers_require_admin_mode() -> TestResult {
    let world = World::new();
    let snapshot = project(Visibility::Private);

    let without_mode = world.session(admin(1, false));
    ensure(
        ProjectPolicy::new(&without_mode, &snapshot).disallowed(Ability::AdminProject)?,
        "admin without admin mode is a regular user",
    )?;
    let with_mode = world.session(admin(1, true));
    let policy = ProjectPolicy::new(&with_mode, &snapshot);
    ensure(policy.allowed(Ability::AdminProject)?, "admin mode grants admin_project")?;
    ensure(
        policy.allowed(Ability::AccessSecurityAndCompliance)?,
        "admin mode opens the security area",
    )
}

#[test]
fn auditors_read_but_never_write() -> TestResult {
    let world = World::new();
    let snapshot = project(Visibility::Private);
    let session = world.session(auditor(1));
    let policy = ProjectPolicy::new(&session, &snapshot);
    ensure(policy.allowed(Ability::ReadProject)?, "auditors read every project")?;
    ensure(policy.allowed(Ability::DownloadCode)?, "auditors read private features")?;
    ensure(policy.allowed(Ability::ReadVulnerability)?, "auditors read vulnerabilities")?;
    ensure(policy.disallowed(Ability::PushCode)?, "auditors never push")
}

#[test]
fn pending_memberships_resolve_as_non_member() -> TestResult {
    let mut world = World::new();
    world.directory.add_pending_member(
        user_id(1),
        MembershipTarget::Project(project_id(PROJECT)),
        AccessLevel::Developer,
    );
    let snapshot = project(Visibility::Private);
    let session = world.session(user(1));
    let policy = ProjectPolicy::new(&session, &snapshot);
    ensure(policy.effective_role()? == AccessLevel::NoAccess, "pending role is ignored")?;
    ensure(policy.disallowed(Ability::ReadProject)?, "pending member cannot read")
}

#[test]
fn inherited_group_role_applies_to_projects() -> TestResult {
    let mut world = World::new();
    world.group_member(1, AccessLevel::Maintainer);
    world.project_member(1, AccessLevel::Guest);
    let snapshot = project(Visibility::Private);
    let session = world.session(user(1));
    let policy = ProjectPolicy::new(&session, &snapshot);
    ensure(policy.effective_role()? == AccessLevel::Maintainer, "highest role wins")?;
    ensure(policy.allowed(Ability::AdminProject)?, "group maintainer administers the project")
}

#[test]
fn pipeline_cancellation_restriction() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Developer);
    world.project_member(2, AccessLevel::Maintainer);
    let mut snapshot = project(Visibility::Private);
    snapshot.settings.ci_cancellation = CiCancellationRestriction::Maintainer;

    let developer = world.session(user(1));
    let maintainer = world.session(user(2));
    ensure(
        ProjectPolicy::new(&developer, &snapshot).disallowed(Ability::CancelPipeline)?,
        "developers cannot cancel when restricted to maintainers",
    )?;
    ensure(
        ProjectPolicy::new(&maintainer, &snapshot).allowed(Ability::CancelPipeline)?,
        "maintainers cancel",
    )?;

    snapshot.settings.ci_cancellation = CiCancellationRestriction::NoOne;
    let maintainer = world.session(user(2));
    ensure(
        ProjectPolicy::new(&maintainer, &snapshot).disallowed(Ability::CancelBuild)?,
        "nobody cancels",
    )
}

#[test]
fn archived_projects_refuse_content_changes() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Owner);
    let mut snapshot = project(Visibility::Private);
    snapshot.archived = true;
    let session = world.session(user(1));
    let policy = ProjectPolicy::new(&session, &snapshot);
    ensure(policy.disallowed(Ability::PushCode)?, "archived projects refuse pushes")?;
    ensure(policy.disallowed(Ability::CreateIssue)?, "archived projects refuse new issues")?;
    ensure(policy.allowed(Ability::DownloadCode)?, "archived projects stay readable")?;
    ensure(policy.allowed(Ability::ArchiveProject)?, "owners can unarchive")
}

#[test]
fn hidden_projects_serve_no_code() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Owner);
    let mut snapshot = project(Visibility::Public);
    snapshot.hidden = true;
    let session = world.session(user(1));
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::DownloadCode)?,
        "hidden projects serve no code",
    )
}

#[test]
fn deletion_protection_reserves_removal_for_admins() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Owner);
    world.settings.default_project_deletion_protection = true;
    let snapshot = project(Visibility::Private);

    let owner = world.session(user(1));
    ensure(
        ProjectPolicy::new(&owner, &snapshot).disallowed(Ability::RemoveProject)?,
        "owners cannot remove protected projects",
    )?;
    let admin = world.session(admin(2, true));
    ensure(
        ProjectPolicy::new(&admin, &snapshot).allowed(Ability::RemoveProject)?,
        "admins still remove protected projects",
    )
}

#[test]
fn deploy_credentials_get_only_their_scopes() -> TestResult {
    let world = World::new();
    let snapshot = project(Visibility::Private);

    let token = Actor::DeployToken(DeployTokenActor {
        id: DeployTokenId::from_raw(1).ok_or("deploy token id")?,
        target: DeployTokenTarget::Group(group_id(ROOT_GROUP)),
        scopes: [DeployTokenScope::ReadRegistry].into_iter().collect(),
        revoked: false,
    });
    let session = world.session(token);
    let policy = ProjectPolicy::new(&session, &snapshot);
    ensure(policy.allowed(Ability::ReadContainerImage)?, "registry scope reads images")?;
    ensure(policy.disallowed(Ability::DownloadCode)?, "registry scope cannot clone")?;
    ensure(policy.disallowed(Ability::ReadProject)?, "tokens never read project pages")?;

    let key = Actor::DeployKey(DeployKeyActor {
        id: DeployKeyId::from_raw(1).ok_or("deploy key id")?,
        links: vec![DeployKeyLink {
            project: project_id(PROJECT),
            can_push: false,
        }],
    });
    let session = world.session(key);
    let policy = ProjectPolicy::new(&session, &snapshot);
    ensure(policy.allowed(Ability::DownloadCode)?, "linked deploy key clones")?;
    ensure(policy.disallowed(Ability::PushCode)?, "read-only deploy key cannot push")
}

#[test]
fn revoked_deploy_tokens_grant_nothing() -> TestResult {
    let world = World::new();
    let snapshot = project(Visibility::Private);
    let token = Actor::DeployToken(DeployTokenActor {
        id: DeployTokenId::from_raw(1).ok_or("deploy token id")?,
        target: DeployTokenTarget::Project(project_id(PROJECT)),
        scopes: [DeployTokenScope::ReadRepository].into_iter().collect(),
        revoked: true,
    });
    let session = world.session(token);
    ensure(
        ProjectPolicy::new(&session, &snapshot).collect_abilities()?.is_empty(),
        "revoked token holds no abilities",
    )
}

#[test]
fn security_abilities_follow_license() -> TestResult {
    let mut world = World::unlicensed();
    world.project_member(1, AccessLevel::Developer);
    let snapshot = project(Visibility::Private);
    let session = world.session(user(1));
    let policy = ProjectPolicy::new(&session, &snapshot);
    ensure(policy.allowed(Ability::AccessSecurityAndCompliance)?, "area is open to developers")?;
    ensure(policy.disallowed(Ability::ReadVulnerability)?, "dashboard needs a license")
}

#[test]
fn collect_abilities_matches_individual_checks() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Reporter);
    let snapshot = project(Visibility::Internal);
    let session = world.session(user(1));
    let policy = ProjectPolicy::new(&session, &snapshot);
    let collected = policy.collect_abilities()?;
    for ability in [Ability::ReadProject, Ability::ReadIssue, Ability::CreateIncident] {
        ensure(collected.contains(&ability), format!("{ability} should be collected"))?;
    }
    ensure(!collected.contains(&Ability::PushCode), "reporters do not push")?;
    ensure(!collected.contains(&Ability::ReadGroup), "group abilities are not collected")
}
