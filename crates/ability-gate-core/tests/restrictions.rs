// crates/ability-gate-core/tests/restrictions.rs
// ============================================================================
// Module: Namespace Restriction Tests
// Description: Read-only namespaces, bans, IP allowlists, and enforced SSO.
// Purpose: Ensure restrictions deny regardless of role.
// Dependencies: ability-gate-core
// ============================================================================

//! Namespace restriction tests.

mod support;

use std::net::IpAddr;
use std::net::Ipv4Addr;

use ability_gate_core::Ability;
use ability_gate_core::AbilityCategory;
use ability_gate_core::AccessLevel;
use ability_gate_core::CustomPermission;
use ability_gate_core::GroupPolicy;
use ability_gate_core::ProjectPolicy;
use ability_gate_core::Visibility;
use ability_gate_core::core::MembershipTarget;
use ipnetwork::IpNetwork;
use support::ROOT_GROUP;
use support::TestResult;
use support::World;
use support::admin;
use support::auditor;
use support::ensure;
use support::group_id;
use support::member_role;
use support::project;
use support::root_group;
use support::user;
use support::user_id;

#[test]
fn read_only_namespace_denies_owner_writes() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Owner);
    let mut snapshot = project(Visibility::Private);
    snapshot.namespace.read_only = true;
    let session = world.session(user(1));
    let policy = ProjectPolicy::new(&session, &snapshot);

    let collected = policy.collect_abilities()?;
    for ability in &collected {
        ensure(
            !matches!(
                ability.category(),
                AbilityCategory::Create | AbilityCategory::Update | AbilityCategory::Admin
            ),
            format!("{ability} must be denied in a read-only namespace"),
        )?;
    }
    ensure(collected.contains(&Ability::ReadProject), "reads still work")?;
    ensure(collected.contains(&Ability::DownloadCode), "clones still work")?;
    ensure(!collected.contains(&Ability::PushCode), "pushes are refused")
}

#[test]
fn read_only_namespace_denies_group_writes() -> TestResult {
    let mut world = World::new();
    world.group_member(1, AccessLevel::Owner);
    let mut group = root_group(Visibility::Private);
    group.namespace.read_only = true;
    let session = world.session(user(1));
    let policy = GroupPolicy::new(&session, &group);
    ensure(policy.disallowed(Ability::CreateSubgroup)?, "subgroups are refused")?;
    ensure(policy.disallowed(Ability::CreateEpic)?, "epics are refused")?;
    ensure(policy.allowed(Ability::ReadGroup)?, "reads still work")
}

#[test]
fn banned_users_lose_everything_but_admins_do_not() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Maintainer);
    world.directory.ban(user_id(1), group_id(ROOT_GROUP));
    world.directory.ban(user_id(2), group_id(ROOT_GROUP));
    let snapshot = project(Visibility::Public);

    let banned = world.session(user(1));
    ensure(
        ProjectPolicy::new(&banned, &snapshot).collect_abilities()?.is_empty(),
        "banned member holds nothing, not even public reads",
    )?;
    let banned_admin = world.session(admin(2, true));
    ensure(
        ProjectPolicy::new(&banned_admin, &snapshot).allowed(Ability::AdminProject)?,
        "admins are exempt from namespace bans",
    )
}

#[test]
fn ip_restriction_blocks_members_outside_the_allowlist() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Developer);
    let mut snapshot = project(Visibility::Private);
    snapshot.namespace.ip_restrictions = vec!["10.0.0.0/8".parse::<IpNetwork>()?];

    world.request.ip = Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5)));
    let outside = world.session(user(1));
    let policy = ProjectPolicy::new(&outside, &snapshot);
    ensure(!policy.ip_allowed()?, "address is outside the allowlist")?;
    ensure(policy.disallowed(Ability::ReadProject)?, "outside address is refused")?;

    let outside_auditor = world.session(auditor(2));
    ensure(
        ProjectPolicy::new(&outside_auditor, &snapshot).allowed(Ability::ReadProject)?,
        "auditors bypass IP enforcement",
    )?;

    world.request.ip = Some(IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3)));
    let inside = world.session(user(1));
    let policy = ProjectPolicy::new(&inside, &snapshot);
    ensure(policy.ip_allowed()?, "address is inside the allowlist")?;
    ensure(policy.allowed(Ability::PushCode)?, "inside address keeps role abilities")
}

#[test]
fn ip_allowed_reports_admin_and_auditor_bypass() -> TestResult {
    let mut world = World::new();
    let mut snapshot = project(Visibility::Private);
    snapshot.namespace.ip_restrictions = vec!["10.0.0.0/8".parse::<IpNetwork>()?];
    world.request.ip = Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5)));

    let session = world.session(admin(2, true));
    let policy = ProjectPolicy::new(&session, &snapshot);
    ensure(policy.ip_allowed()?, "active admin is never IP blocked")?;
    ensure(policy.allowed(Ability::ReadProject)?, "active admin reads outside the allowlist")?;

    let session = world.session(auditor(3));
    ensure(
        ProjectPolicy::new(&session, &snapshot).ip_allowed()?,
        "auditor is never IP blocked",
    )?;

    let session = world.session(admin(2, false));
    ensure(
        !ProjectPolicy::new(&session, &snapshot).ip_allowed()?,
        "admin without admin mode is checked like anyone else",
    )
}

#[test]
fn unknown_address_is_outside_every_allowlist() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Developer);
    let mut snapshot = project(Visibility::Private);
    snapshot.namespace.ip_restrictions = vec!["10.0.0.0/8".parse::<IpNetwork>()?];
    let session = world.session(user(1));
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::ReadProject)?,
        "missing client address is refused",
    )
}

#[test]
fn enforced_sso_requires_a_session_for_the_root_group() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Developer);
    let mut snapshot = project(Visibility::Private);
    snapshot.namespace.sso.enabled = true;
    snapshot.namespace.sso.enforced = true;

    let without = world.session(user(1));
    let policy = ProjectPolicy::new(&without, &snapshot);
    ensure(!policy.sso_session_valid()?, "no SSO session yet")?;
    ensure(policy.disallowed(Ability::ReadProject)?, "read_project needs the SSO session")?;

    let admin_session = world.session(admin(2, true));
    ensure(
        ProjectPolicy::new(&admin_session, &snapshot).sso_session_valid()?,
        "admin mode bypasses SSO enforcement",
    )?;

    world.request.sso_sessions.insert(group_id(ROOT_GROUP));
    let with = world.session(user(1));
    let policy = ProjectPolicy::new(&with, &snapshot);
    ensure(policy.sso_session_valid()?, "session is active")?;
    ensure(policy.allowed(Ability::ReadProject)?, "member reads with a session")
}

#[test]
fn missing_sso_session_collapses_role_abilities() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Developer);
    world.group_member(2, AccessLevel::Maintainer);
    world.directory.assign_member_role(
        user_id(3),
        MembershipTarget::Group(group_id(ROOT_GROUP)),
        member_role(9, AccessLevel::Guest, &[CustomPermission::AdminMergeRequest]),
    );
    let mut snapshot = project(Visibility::Private);
    snapshot.namespace.sso.enabled = true;
    snapshot.namespace.sso.enforced = true;

    let developer = world.session(user(1));
    let policy = ProjectPolicy::new(&developer, &snapshot);
    ensure(policy.disallowed(Ability::PushCode)?, "developer cannot push without a session")?;
    ensure(
        policy.disallowed(Ability::CreatePipeline)?,
        "developer cannot run pipelines without a session",
    )?;

    let maintainer = world.session(user(2));
    let policy = ProjectPolicy::new(&maintainer, &snapshot);
    ensure(policy.disallowed(Ability::AdminProject)?, "maintainer cannot administer")?;
    ensure(
        policy.effective_role()? == AccessLevel::NoAccess,
        "membership does not count without a session",
    )?;

    let custom = world.session(user(3));
    ensure(
        ProjectPolicy::new(&custom, &snapshot).disallowed(Ability::AdminMergeRequest)?,
        "custom role grants need the session too",
    )?;

    world.request.sso_sessions.insert(group_id(ROOT_GROUP));
    let developer = world.session(user(1));
    let policy = ProjectPolicy::new(&developer, &snapshot);
    ensure(policy.allowed(Ability::PushCode)?, "developer pushes once signed in")?;
    ensure(policy.allowed(Ability::CreatePipeline)?, "developer runs pipelines once signed in")?;
    let maintainer = world.session(user(2));
    ensure(
        ProjectPolicy::new(&maintainer, &snapshot).allowed(Ability::AdminProject)?,
        "maintainer administers once signed in",
    )?;
    let custom = world.session(user(3));
    ensure(
        ProjectPolicy::new(&custom, &snapshot).allowed(Ability::AdminMergeRequest)?,
        "custom role applies once signed in",
    )
}

#[test]
fn missing_sso_session_collapses_group_roles() -> TestResult {
    let mut world = World::new();
    world.group_member(1, AccessLevel::Owner);
    let mut snapshot = root_group(Visibility::Private);
    snapshot.namespace.sso.enabled = true;
    snapshot.namespace.sso.enforced = true;

    let without = world.session(user(1));
    let policy = GroupPolicy::new(&without, &snapshot);
    ensure(policy.disallowed(Ability::AdminGroup)?, "owner cannot administer without a session")?;
    ensure(policy.disallowed(Ability::ReadGroup)?, "owner cannot read without a session")?;

    world.request.sso_sessions.insert(group_id(ROOT_GROUP));
    let with = world.session(user(1));
    ensure(
        GroupPolicy::new(&with, &snapshot).allowed(Ability::AdminGroup)?,
        "owner administers once signed in",
    )
}

#[test]
fn sso_that_is_not_enforced_is_ignored() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Guest);
    let mut snapshot = project(Visibility::Private);
    snapshot.namespace.sso.enabled = true;
    let session = world.session(user(1));
    ensure(
        ProjectPolicy::new(&session, &snapshot).allowed(Ability::ReadProject)?,
        "SSO without enforcement does not block",
    )
}

#[test]
fn personal_namespaces_carry_no_restrictions() -> TestResult {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Owner);
    let mut snapshot = project(Visibility::Private);
    snapshot.namespace.ancestors.clear();
    snapshot.namespace.sso.enabled = true;
    snapshot.namespace.sso.enforced = true;
    let session = world.session(user(1));
    ensure(
        ProjectPolicy::new(&session, &snapshot).allowed(Ability::ReadProject)?,
        "no root group means no SSO enforcement",
    )
}
