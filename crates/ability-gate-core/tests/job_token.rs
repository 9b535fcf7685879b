// crates/ability-gate-core/tests/job_token.rs
// ============================================================================
// Module: CI Job Token Tests
// Description: Job token scope and job-only abilities.
// Purpose: Ensure job principals never reach beyond their token scope.
// Dependencies: ability-gate-core
// ============================================================================

//! CI job token scope tests.

mod support;

use ability_gate_core::Ability;
use ability_gate_core::AccessLevel;
use ability_gate_core::Actor;
use ability_gate_core::CiJobActor;
use ability_gate_core::FeatureFlag;
use ability_gate_core::GroupPolicy;
use ability_gate_core::ProjectPolicy;
use ability_gate_core::ProjectSnapshot;
use ability_gate_core::UserActor;
use ability_gate_core::Visibility;
use ability_gate_core::core::JobId;
use ability_gate_core::core::MembershipTarget;
use ability_gate_core::interfaces::FlagTarget;
use ability_gate_core::interfaces::JobTokenSource;
use support::PROJECT;
use support::TestResult;
use support::World;
use support::ensure;
use support::group_id;
use support::project;
use support::project_id;
use support::root_group;
use support::user;
use support::user_id;

/// Project the job runs in when it is not the fixture project.
const ORIGIN: u64 = 20;
/// Group containing [`ORIGIN`].
const ORIGIN_GROUP: u64 = 200;

/// Job run by user 1 in `origin`.
fn job(origin: u64, outbound_scope_enabled: bool) -> TestResult<Actor> {
    Ok(Actor::CiJob(CiJobActor {
        job: JobId::from_raw(1).ok_or("job id")?,
        user: UserActor::regular(user_id(1)),
        origin: project_id(origin),
        origin_namespace: vec![group_id(ORIGIN_GROUP)],
        outbound_scope_enabled,
    }))
}

/// World where user 1 is a developer of the fixture project.
fn developer_world() -> World {
    let mut world = World::new();
    world.project_member(1, AccessLevel::Developer);
    world
}

#[test]
fn build_push_code_needs_project_setting_and_same_project() -> TestResult {
    let world = developer_world();
    let mut snapshot = project(Visibility::Private);

    let session = world.session(job(PROJECT, false)?);
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::BuildPushCode)?,
        "pushing with the job token is off by default",
    )?;

    snapshot.settings.push_repository_for_job_token_allowed = true;
    let session = world.session(job(PROJECT, false)?);
    ensure(
        ProjectPolicy::new(&session, &snapshot).allowed(Ability::BuildPushCode)?,
        "self-referential job pushes once allowed",
    )?;

    let session = world.session(user(1));
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::BuildPushCode)?,
        "users outside a job never hold build_push_code",
    )
}

#[test]
fn jobs_are_exempt_from_enforced_sso() -> TestResult {
    let world = developer_world();
    let mut snapshot = project(Visibility::Private);
    snapshot.namespace.sso.enabled = true;
    snapshot.namespace.sso.enforced = true;

    let session = world.session(job(PROJECT, false)?);
    let policy = ProjectPolicy::new(&session, &snapshot);
    ensure(policy.sso_session_valid()?, "jobs carry no browser session to renew")?;
    ensure(policy.allowed(Ability::ReadProject)?, "job keeps its user's read access")?;
    ensure(policy.allowed(Ability::BuildReadProject)?, "job reads through its token")?;
    ensure(policy.allowed(Ability::BuildDownloadCode)?, "job clones through its token")?;

    let session = world.session(user(1));
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::ReadProject)?,
        "the same user signing in directly still needs a session",
    )
}

#[test]
fn build_push_code_follows_feature_flag() -> TestResult {
    let mut world = developer_world();
    world.flags.set(
        FeatureFlag::AllowPushRepositoryForJobToken,
        FlagTarget::Project(project_id(PROJECT)),
        false,
    );
    let mut snapshot = project(Visibility::Private);
    snapshot.settings.push_repository_for_job_token_allowed = true;
    let session = world.session(job(PROJECT, false)?);
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::BuildPushCode)?,
        "project-level flag override disables token pushes",
    )
}

#[test]
fn inbound_allowlist_gates_cross_project_jobs() -> TestResult {
    let mut world = developer_world();
    let snapshot = project(Visibility::Private);

    let session = world.session(job(ORIGIN, false)?);
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::BuildDownloadCode)?,
        "origin is not on the inbound allowlist",
    )?;

    world.directory.allow_inbound(project_id(PROJECT), JobTokenSource::Project(project_id(ORIGIN)));
    let session = world.session(job(ORIGIN, false)?);
    ensure(
        ProjectPolicy::new(&session, &snapshot).allowed(Ability::BuildDownloadCode)?,
        "allowlisted origin clones",
    )?;
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::BuildPushCode)?,
        "cross-project jobs never push",
    )
}

#[test]
fn inbound_allowlist_accepts_origin_groups() -> TestResult {
    let mut world = developer_world();
    world.directory.allow_inbound(project_id(PROJECT), JobTokenSource::Group(group_id(ORIGIN_GROUP)));
    let snapshot = project(Visibility::Private);
    let session = world.session(job(ORIGIN, false)?);
    ensure(
        ProjectPolicy::new(&session, &snapshot).allowed(Ability::BuildReadProject)?,
        "jobs from an allowlisted group reach the project",
    )
}

#[test]
fn disabled_inbound_scope_admits_any_job() -> TestResult {
    let world = developer_world();
    let mut snapshot = project(Visibility::Private);
    snapshot.settings.inbound_job_token_scope_enabled = false;
    let session = world.session(job(ORIGIN, false)?);
    ensure(
        ProjectPolicy::new(&session, &snapshot).allowed(Ability::BuildDownloadCode)?,
        "inbound scope off admits the job",
    )
}

#[test]
fn outbound_scope_must_list_the_target() -> TestResult {
    let mut world = developer_world();
    let mut snapshot = project(Visibility::Private);
    snapshot.settings.inbound_job_token_scope_enabled = false;

    let session = world.session(job(ORIGIN, true)?);
    ensure(
        ProjectPolicy::new(&session, &snapshot).disallowed(Ability::BuildDownloadCode)?,
        "target is missing from the outbound allowlist",
    )?;

    world.directory.allow_outbound(project_id(ORIGIN), project_id(PROJECT));
    let session = world.session(job(ORIGIN, true)?);
    ensure(
        ProjectPolicy::new(&session, &snapshot).allowed(Ability::BuildDownloadCode)?,
        "outbound allowlist admits the target",
    )
}

#[test]
fn out_of_scope_jobs_lose_role_abilities() -> TestResult {
    let mut world = developer_world();
    world.directory.add_member(
        user_id(1),
        MembershipTarget::Project(project_id(ORIGIN)),
        AccessLevel::Developer,
    );
    let snapshot = project(Visibility::Private);
    let session = world.session(job(ORIGIN, false)?);
    ensure(
        ProjectPolicy::new(&session, &snapshot).collect_abilities()?.is_empty(),
        "out-of-scope job holds nothing even though its user is a developer",
    )?;

    let mut origin = ProjectSnapshot::new(project_id(ORIGIN));
    origin.namespace.ancestors = vec![group_id(ORIGIN_GROUP)];
    ensure(
        ProjectPolicy::new(&session, &origin).allowed(Ability::PushCode)?,
        "job keeps its user's role in its own project",
    )
}

#[test]
fn groups_are_outside_every_job_scope() -> TestResult {
    let mut world = developer_world();
    world.group_member(1, AccessLevel::Owner);
    let group = root_group(Visibility::Public);
    let session = world.session(job(PROJECT, false)?);
    ensure(
        GroupPolicy::new(&session, &group).disallowed(Ability::ReadGroup)?,
        "job tokens do not reach groups",
    )
}
