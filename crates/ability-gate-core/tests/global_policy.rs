// crates/ability-gate-core/tests/global_policy.rs
// ============================================================================
// Module: Global Policy Tests
// Description: Instance-wide abilities.
// Purpose: Cover administration, group creation, and licensed features.
// Dependencies: ability-gate-core
// ============================================================================

//! Instance-level ability tests.

mod support;

use ability_gate_core::Ability;
use ability_gate_core::Actor;
use ability_gate_core::BotActor;
use ability_gate_core::BotKind;
use ability_gate_core::FeatureFlag;
use ability_gate_core::GlobalPolicy;
use ability_gate_core::LicensedFeature;
use ability_gate_core::interfaces::FlagTarget;
use ability_gate_core::interfaces::memory::StaticLicenses;
use support::TestResult;
use support::World;
use support::admin;
use support::auditor;
use support::ensure;
use support::external;
use support::user;
use support::user_id;

#[test]
fn admins_manage_the_instance_in_admin_mode() -> TestResult {
    let world = World::new();
    let session = world.session(admin(1, true));
    let policy = GlobalPolicy::new(&session);
    ensure(policy.allowed(Ability::ReadLicenses)?, "admin reads licenses")?;
    ensure(policy.allowed(Ability::AdminMemberRole)?, "licensed admin manages member roles")?;
    ensure(policy.allowed(Ability::AdminServiceAccounts)?, "licensed admin manages service accounts")?;

    let session = world.session(admin(1, false));
    ensure(
        GlobalPolicy::new(&session).disallowed(Ability::ReadLicenses)?,
        "admin outside admin mode is a regular user",
    )
}

#[test]
fn member_role_administration_needs_license() -> TestResult {
    let world = World::unlicensed();
    let session = world.session(admin(1, true));
    let policy = GlobalPolicy::new(&session);
    ensure(policy.allowed(Ability::AdminAllResources)?, "admin keeps unlicensed abilities")?;
    ensure(policy.disallowed(Ability::AdminMemberRole)?, "member roles need the license")
}

#[test]
fn auditors_read_everything_and_change_nothing() -> TestResult {
    let world = World::new();
    let session = world.session(auditor(1));
    let policy = GlobalPolicy::new(&session);
    ensure(policy.allowed(Ability::ReadAllResources)?, "auditor reads everything")?;
    ensure(policy.disallowed(Ability::AdminAllResources)?, "auditor administers nothing")
}

#[test]
fn group_creation_follows_account_and_setting() -> TestResult {
    let mut world = World::new();
    let session = world.session(user(1));
    let policy = GlobalPolicy::new(&session);
    ensure(policy.allowed(Ability::CreateGroup)?, "regular users create groups")?;
    ensure(policy.allowed(Ability::CreateGroupViaApi)?, "and may do so through the API")?;

    let session = world.session(external(2));
    ensure(
        GlobalPolicy::new(&session).disallowed(Ability::CreateGroup)?,
        "external users cannot create groups",
    )?;

    world.settings.top_level_group_creation_enabled = false;
    let session = world.session(user(1));
    let policy = GlobalPolicy::new(&session);
    ensure(policy.allowed(Ability::CreateGroup)?, "UI creation survives the setting")?;
    ensure(policy.disallowed(Ability::CreateGroupViaApi)?, "API creation follows the setting")
}

#[test]
fn anonymous_visitors_hold_nothing() -> TestResult {
    let world = World::new();
    let session = world.session(Actor::Anonymous);
    ensure(
        GlobalPolicy::new(&session).collect_abilities()?.is_empty(),
        "anonymous visitors hold no instance abilities",
    )
}

#[test]
fn security_policy_bot_uses_git() -> TestResult {
    let world = World::new();
    let session = world.session(Actor::Bot(BotActor {
        id: user_id(5),
        bot: BotKind::SecurityPolicyBot,
        external: false,
    }));
    ensure(GlobalPolicy::new(&session).allowed(Ability::AccessGit)?, "policy bot pushes")
}

#[test]
fn duo_chat_needs_license_or_saas_rollout() -> TestResult {
    let mut world = World::unlicensed();
    let session = world.session(user(1));
    ensure(
        GlobalPolicy::new(&session).disallowed(Ability::AccessDuoChat)?,
        "self-managed without the license",
    )?;

    world.licenses = StaticLicenses::instance(&[LicensedFeature::AiChat]);
    let session = world.session(user(1));
    ensure(
        GlobalPolicy::new(&session).allowed(Ability::AccessDuoChat)?,
        "licensed self-managed instance",
    )?;

    world.licenses = StaticLicenses::none();
    world.settings.saas = true;
    let session = world.session(user(1));
    ensure(
        GlobalPolicy::new(&session).disallowed(Ability::AccessDuoChat)?,
        "SaaS rollout flag starts off",
    )?;

    world.flags.set(FeatureFlag::DuoChatOnSaas, FlagTarget::User(user_id(1)), true);
    let session = world.session(user(1));
    ensure(
        GlobalPolicy::new(&session).allowed(Ability::AccessDuoChat)?,
        "rolled out to this user",
    )?;
    let session = world.session(user(2));
    ensure(
        GlobalPolicy::new(&session).disallowed(Ability::AccessDuoChat)?,
        "other users wait for the rollout",
    )
}
