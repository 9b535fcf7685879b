// crates/ability-gate-core/src/runtime/condition.rs
// ============================================================================
// Module: Policy Conditions
// Description: Named predicates that form the leaves of policy rules.
// Purpose: Define every fact a rule may test and how it is computed.
// Dependencies: ability-logic, ipnetwork, serde
// ============================================================================

//! ## Overview
//! A [`Condition`] is a typed predicate over the actor, the resource, and the
//! collaborator state of the current session. Conditions are pure with
//! respect to a session: the same condition on the same resource yields the
//! same answer, so results are memoized per session.
//!
//! Conditions that inspect an aspect a resource does not have (a namespace
//! on the instance, a feature on a group without one, the root group of a
//! personal project) evaluate to false rather than failing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ability_logic::ConditionEval;
use serde::Deserialize;
use serde::Serialize;

use crate::core::Ability;
use crate::core::AccessLevel;
use crate::core::Actor;
use crate::core::BotKind;
use crate::core::CiCancellationRestriction;
use crate::core::DeployTokenScope;
use crate::core::DeployTokenTarget;
use crate::core::FeatureAccessLevel;
use crate::core::FeatureFlag;
use crate::core::FlagScope;
use crate::core::InstanceSetting;
use crate::core::LicensedFeature;
use crate::core::ProjectFeature;
use crate::core::RequestContext;
use crate::core::Resource;
use crate::core::Visibility;
use crate::runtime::PolicyError;
use crate::runtime::scope::EvaluationScope;

// ============================================================================
// SECTION: Condition Vocabulary
// ============================================================================

/// Predicate evaluated against an [`EvaluationScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    // Actor identity.
    /// No credential presented.
    Anonymous,
    /// A user account is acting (humans, bots, and jobs on behalf of users).
    Registered,
    /// Administrator with admin mode active.
    Admin,
    /// Auditor account.
    Auditor,
    /// External account.
    External,
    /// Bot of the given kind.
    Bot(BotKind),
    /// Any CI job token.
    CiJob,
    /// CI job running in the project under evaluation.
    CiJobSelfReferential,
    /// Live deploy token bound to this resource carrying the scope.
    DeployToken(DeployTokenScope),
    /// Deploy key enabled for this project.
    DeployKey,
    /// Deploy key enabled for this project with push access.
    DeployKeyCanPush,

    // Membership.
    /// Effective role is at least the given level.
    RoleAtLeast(AccessLevel),
    /// Acting user authored the issue or work item.
    IssueAuthor,
    /// Acting user is assigned to the issue or work item.
    IssueAssignee,

    // Resource state.
    /// Visibility alone grants read access to this actor.
    PublicAccess,
    /// Resource has exactly this visibility.
    Visibility(Visibility),
    /// Feature is visible to this actor.
    FeatureVisible(ProjectFeature),
    /// Feature is disabled for everyone.
    FeatureDisabled(ProjectFeature),
    /// Project is archived.
    Archived,
    /// Project is hidden.
    Hidden,
    /// Issue or work item is confidential.
    Confidential,
    /// Project accepts service desk issues.
    ServiceDeskEnabled,
    /// Group has a parent group.
    HasParent,
    /// Namespace is read-only.
    ReadOnlyNamespace,
    /// Pipeline cancellation is restricted to this level.
    CiCancellation(CiCancellationRestriction),
    /// Project lets its own jobs push with their token.
    JobTokenPushAllowed,

    // Environment.
    /// Feature is licensed for the root group (or the instance).
    Licensed(LicensedFeature),
    /// Feature flag is enabled, resolved from the given scope outward.
    FlagEnabled(FeatureFlag, FlagScope),
    /// Running as the SaaS offering.
    OnSaas,
    /// Instance setting is on.
    Setting(InstanceSetting),
    /// Root group enforces SSO and the actor has no active session.
    NeedsNewSsoSession,
    /// Root group restricts IPs and the request address is not allowed.
    IpEnforcementPreventsAccess,
    /// Acting user is banned from the root group.
    BannedFromNamespace,

    // Composition.
    /// Ability holds on the same resource.
    Can(Ability),
    /// Ability holds on the containing resource.
    ContainerCan(Ability),
}

impl Condition {
    /// Returns true for conditions that recurse into the engine.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Can(_) | Self::ContainerCan(_))
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

impl ConditionEval for Condition {
    type Scope<'a> = EvaluationScope<'a>;
    type Error = PolicyError;

    fn eval_condition(&self, scope: &EvaluationScope<'_>) -> Result<bool, PolicyError> {
        match *self {
            Self::Can(ability) => scope.can(ability),
            Self::ContainerCan(ability) => scope.container_can(ability),
            condition => scope.memoized(condition, || evaluate_leaf(condition, scope)),
        }
    }
}

/// Computes a non-composite condition.
fn evaluate_leaf(condition: Condition, scope: &EvaluationScope<'_>) -> Result<bool, PolicyError> {
    let actor = scope.actor();
    let resource = scope.resource();
    match condition {
        Condition::Anonymous => Ok(actor.is_anonymous()),
        Condition::Registered => Ok(actor.subject_user().is_some()),
        Condition::Admin => Ok(actor.is_admin()),
        Condition::Auditor => Ok(actor.is_auditor()),
        Condition::External => Ok(actor.is_external()),
        Condition::Bot(kind) => Ok(matches!(actor, Actor::Bot(bot) if bot.bot == kind)),
        Condition::CiJob => Ok(matches!(actor, Actor::CiJob(_))),
        Condition::CiJobSelfReferential => Ok(match (actor, resource.project()) {
            (Actor::CiJob(job), Some(project)) => job.origin == project.id,
            _ => false,
        }),
        Condition::DeployToken(required) => Ok(deploy_token_matches(scope, required)),
        Condition::DeployKey => Ok(deploy_key_link(scope).is_some()),
        Condition::DeployKeyCanPush => Ok(deploy_key_link(scope).is_some_and(|can_push| can_push)),
        Condition::RoleAtLeast(floor) => {
            if floor == AccessLevel::NoAccess {
                return Ok(true);
            }
            Ok(scope.effective_role()? >= floor)
        }
        Condition::IssueAuthor => Ok(match (actor.subject_user(), resource.participants()) {
            (Some(user), Some((author, _))) => author == Some(user),
            _ => false,
        }),
        Condition::IssueAssignee => Ok(match (actor.subject_user(), resource.participants()) {
            (Some(user), Some((_, assignees))) => assignees.contains(&user),
            _ => false,
        }),
        Condition::PublicAccess => Ok(public_access(scope)),
        Condition::Visibility(expected) => Ok(resource.visibility() == Some(expected)),
        Condition::FeatureVisible(feature) => feature_visible(scope, feature),
        Condition::FeatureDisabled(feature) => Ok(resource
            .features()
            .is_some_and(|features| features.level(feature) == FeatureAccessLevel::Disabled)),
        Condition::Archived => Ok(resource.project().is_some_and(|project| project.archived)),
        Condition::Hidden => Ok(resource.project().is_some_and(|project| project.hidden)),
        Condition::Confidential => Ok(resource.confidential()),
        Condition::ServiceDeskEnabled => {
            Ok(resource.project().is_some_and(|project| project.settings.service_desk_enabled))
        }
        Condition::HasParent => Ok(resource.group().is_some_and(|group| group.has_parent())),
        Condition::ReadOnlyNamespace => {
            Ok(resource.namespace().is_some_and(|namespace| namespace.read_only))
        }
        Condition::CiCancellation(expected) => Ok(resource
            .project()
            .is_some_and(|project| project.settings.ci_cancellation == expected)),
        Condition::JobTokenPushAllowed => Ok(resource
            .project()
            .is_some_and(|project| project.settings.push_repository_for_job_token_allowed)),
        Condition::Licensed(feature) => scope.licensed(feature),
        Condition::FlagEnabled(flag, flag_scope) => scope.flag_enabled(flag, flag_scope),
        Condition::OnSaas => Ok(scope.settings().saas),
        Condition::Setting(setting) => Ok(scope.settings().enabled(setting)),
        Condition::NeedsNewSsoSession => Ok(needs_new_sso_session(scope)),
        Condition::IpEnforcementPreventsAccess => Ok(ip_enforcement_prevents_access(scope)),
        Condition::BannedFromNamespace => scope.banned(),
        Condition::Can(ability) => scope.can(ability),
        Condition::ContainerCan(ability) => scope.container_can(ability),
    }
}

// ============================================================================
// SECTION: Leaf Helpers
// ============================================================================

/// Visibility-based read access: public for everyone, internal for signed-in
/// non-external users.
fn public_access(scope: &EvaluationScope<'_>) -> bool {
    let actor = scope.actor();
    match scope.resource().visibility() {
        Some(Visibility::Public) => true,
        Some(Visibility::Internal) => actor.subject_user().is_some() && !actor.is_external(),
        Some(Visibility::Private) | None => false,
    }
}

/// Feature visibility for the acting user.
fn feature_visible(scope: &EvaluationScope<'_>, feature: ProjectFeature) -> Result<bool, PolicyError> {
    let resource = scope.resource();
    let (Some(features), Some(visibility)) = (resource.features(), resource.visibility()) else {
        return Ok(false);
    };
    let actor = scope.actor();
    let elevated = actor.is_admin() || actor.is_auditor();
    match features.level(feature) {
        FeatureAccessLevel::Disabled => Ok(false),
        FeatureAccessLevel::Enabled if public_access(scope) || elevated => Ok(true),
        FeatureAccessLevel::Private if elevated => Ok(true),
        FeatureAccessLevel::Enabled | FeatureAccessLevel::Private => {
            Ok(scope.effective_role()? >= feature.member_floor(visibility))
        }
    }
}

/// Deploy token bound to this resource's project or one of its groups.
fn deploy_token_matches(scope: &EvaluationScope<'_>, required: DeployTokenScope) -> bool {
    let Actor::DeployToken(token) = scope.actor() else {
        return false;
    };
    if token.revoked || !token.scopes.contains(&required) {
        return false;
    }
    let resource = scope.resource();
    match token.target {
        DeployTokenTarget::Project(id) => resource.project().is_some_and(|project| project.id == id),
        DeployTokenTarget::Group(id) => {
            resource.group().is_some_and(|group| group.id == id)
                || resource.namespace().is_some_and(|namespace| namespace.ancestors.contains(&id))
        }
    }
}

/// Returns the push flag of the deploy key link for this project.
fn deploy_key_link(scope: &EvaluationScope<'_>) -> Option<bool> {
    let Actor::DeployKey(key) = scope.actor() else {
        return None;
    };
    let project = scope.resource().project()?;
    key.link(project.id).map(|link| link.can_push)
}

/// Enforced SSO without an active session for the root group.
fn needs_new_sso_session(scope: &EvaluationScope<'_>) -> bool {
    sso_session_required(scope.actor(), scope.resource(), scope.request())
}

/// Returns true when `actor` must start a new SSO session before any
/// membership on `resource` counts.
///
/// Auditors, active administrators and CI jobs are exempt, as are bots and
/// credentials that do not act as a signed-in person.
pub(crate) fn sso_session_required(
    actor: &Actor,
    resource: Resource<'_>,
    request: &RequestContext,
) -> bool {
    let (Some(namespace), Some(root)) = (resource.namespace(), resource.root_group()) else {
        return false;
    };
    if !(namespace.sso.enabled && namespace.sso.enforced) {
        return false;
    }
    if matches!(actor, Actor::CiJob(_)) || actor.human().is_none() {
        return false;
    }
    if actor.is_admin() || actor.is_auditor() {
        return false;
    }
    !request.sso_sessions.contains(&root)
}

/// IP allowlist configured and the request address unknown or outside it.
fn ip_enforcement_prevents_access(scope: &EvaluationScope<'_>) -> bool {
    let Some(namespace) = scope.resource().namespace() else {
        return false;
    };
    if namespace.ip_restrictions.is_empty() {
        return false;
    }
    scope
        .request()
        .ip
        .is_none_or(|ip| !namespace.ip_restrictions.iter().any(|network| network.contains(ip)))
}
