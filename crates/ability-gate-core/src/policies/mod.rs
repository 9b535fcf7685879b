// crates/ability-gate-core/src/policies/mod.rs
// ============================================================================
// Module: Policy Tables
// Description: Rule tables for every resource kind, plus the rule DSL.
// Purpose: Declare who may do what, separately from how rules are evaluated.
// Dependencies: ability-logic, crate::{core, runtime}
// ============================================================================

//! ## Overview
//! Each submodule builds the [`PolicyDefinition`] for one resource kind with
//! [`PolicyBuilder`]. The helpers in [`dsl`] keep tables readable:
//!
//! ```text
//! policy.rule(can(ReadProject) & feature_visible(Issues)).enable(&[ReadIssue]);
//! policy.rule(feature_disabled(Issues)).prevent(&[ReadIssue]);
//! ```
//!
//! [`standard_registry`] compiles every table into an [`AbilityRegistry`].
//!
//! [`PolicyDefinition`]: crate::runtime::PolicyDefinition
//! [`PolicyBuilder`]: crate::runtime::PolicyBuilder

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod global;
pub mod group;
pub mod issue;
pub mod project;
pub mod vulnerability;
pub mod work_item;

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Ability;
use crate::core::AbilityCategory;
use crate::runtime::AbilityRegistry;
use crate::runtime::RegistryError;

// ============================================================================
// SECTION: Registry Assembly
// ============================================================================

/// Compiles every built-in policy table.
///
/// # Errors
///
/// Returns [`RegistryError`] when a table is malformed.
pub fn standard_registry() -> Result<AbilityRegistry, RegistryError> {
    AbilityRegistry::from_policies([
        global::policy()?,
        project::policy()?,
        group::policy()?,
        issue::policy()?,
        work_item::policy()?,
        vulnerability::policy()?,
    ])
}

/// Returns true for abilities a read-only namespace must refuse.
pub(crate) fn mutates_content(ability: Ability) -> bool {
    matches!(
        ability.category(),
        AbilityCategory::Create | AbilityCategory::Update | AbilityCategory::Admin
    )
}

// ============================================================================
// SECTION: Rule DSL
// ============================================================================

/// Constructors for rule expressions used by the policy tables.
pub mod dsl {
    use ability_logic::RuleExpr;

    use crate::core::Ability;
    use crate::core::AccessLevel;
    use crate::core::BotKind;
    use crate::core::CiCancellationRestriction;
    use crate::core::DeployTokenScope;
    use crate::core::FeatureFlag;
    use crate::core::FlagScope;
    use crate::core::InstanceSetting;
    use crate::core::LicensedFeature;
    use crate::core::ProjectFeature;
    use crate::runtime::Condition;
    use crate::runtime::PolicyExpr;

    /// Wraps a condition.
    #[must_use]
    pub const fn cond(condition: Condition) -> PolicyExpr {
        RuleExpr::condition(condition)
    }

    /// Unauthenticated visitor.
    #[must_use]
    pub const fn anonymous() -> PolicyExpr {
        cond(Condition::Anonymous)
    }

    /// Any user account.
    #[must_use]
    pub const fn registered() -> PolicyExpr {
        cond(Condition::Registered)
    }

    /// Administrator in admin mode.
    #[must_use]
    pub const fn admin() -> PolicyExpr {
        cond(Condition::Admin)
    }

    /// Auditor.
    #[must_use]
    pub const fn auditor() -> PolicyExpr {
        cond(Condition::Auditor)
    }

    /// External user.
    #[must_use]
    pub const fn external() -> PolicyExpr {
        cond(Condition::External)
    }

    /// Bot of `kind`.
    #[must_use]
    pub const fn bot(kind: BotKind) -> PolicyExpr {
        cond(Condition::Bot(kind))
    }

    /// CI job token.
    #[must_use]
    pub const fn ci_job() -> PolicyExpr {
        cond(Condition::CiJob)
    }

    /// CI job running in this project.
    #[must_use]
    pub const fn ci_job_self_referential() -> PolicyExpr {
        cond(Condition::CiJobSelfReferential)
    }

    /// Deploy token with `scope`.
    #[must_use]
    pub const fn deploy_token(scope: DeployTokenScope) -> PolicyExpr {
        cond(Condition::DeployToken(scope))
    }

    /// Deploy key for this project.
    #[must_use]
    pub const fn deploy_key() -> PolicyExpr {
        cond(Condition::DeployKey)
    }

    /// Deploy key with push access.
    #[must_use]
    pub const fn deploy_key_can_push() -> PolicyExpr {
        cond(Condition::DeployKeyCanPush)
    }

    /// Membership role at least `level`.
    #[must_use]
    pub const fn role(level: AccessLevel) -> PolicyExpr {
        cond(Condition::RoleAtLeast(level))
    }

    /// Role at least `level`, or an administrator.
    #[must_use]
    pub fn tier(level: AccessLevel) -> PolicyExpr {
        role(level) | admin()
    }

    /// Guest tier.
    #[must_use]
    pub fn guest() -> PolicyExpr {
        tier(AccessLevel::Guest)
    }

    /// Planner tier.
    #[must_use]
    pub fn planner() -> PolicyExpr {
        tier(AccessLevel::Planner)
    }

    /// Reporter tier.
    #[must_use]
    pub fn reporter() -> PolicyExpr {
        tier(AccessLevel::Reporter)
    }

    /// Developer tier.
    #[must_use]
    pub fn developer() -> PolicyExpr {
        tier(AccessLevel::Developer)
    }

    /// Maintainer tier.
    #[must_use]
    pub fn maintainer() -> PolicyExpr {
        tier(AccessLevel::Maintainer)
    }

    /// Owner tier.
    #[must_use]
    pub fn owner() -> PolicyExpr {
        tier(AccessLevel::Owner)
    }

    /// Author of the issue or work item.
    #[must_use]
    pub const fn issue_author() -> PolicyExpr {
        cond(Condition::IssueAuthor)
    }

    /// Assignee of the issue or work item.
    #[must_use]
    pub const fn issue_assignee() -> PolicyExpr {
        cond(Condition::IssueAssignee)
    }

    /// Visibility alone grants read access.
    #[must_use]
    pub const fn public_access() -> PolicyExpr {
        cond(Condition::PublicAccess)
    }

    /// Feature visible to the actor.
    #[must_use]
    pub const fn feature_visible(feature: ProjectFeature) -> PolicyExpr {
        cond(Condition::FeatureVisible(feature))
    }

    /// Feature disabled.
    #[must_use]
    pub const fn feature_disabled(feature: ProjectFeature) -> PolicyExpr {
        cond(Condition::FeatureDisabled(feature))
    }

    /// Project archived.
    #[must_use]
    pub const fn archived() -> PolicyExpr {
        cond(Condition::Archived)
    }

    /// Project hidden.
    #[must_use]
    pub const fn hidden() -> PolicyExpr {
        cond(Condition::Hidden)
    }

    /// Issue or work item confidential.
    #[must_use]
    pub const fn confidential() -> PolicyExpr {
        cond(Condition::Confidential)
    }

    /// Service desk enabled.
    #[must_use]
    pub const fn service_desk_enabled() -> PolicyExpr {
        cond(Condition::ServiceDeskEnabled)
    }

    /// Group has a parent.
    #[must_use]
    pub const fn has_parent() -> PolicyExpr {
        cond(Condition::HasParent)
    }

    /// Namespace read-only.
    #[must_use]
    pub const fn read_only() -> PolicyExpr {
        cond(Condition::ReadOnlyNamespace)
    }

    /// Pipeline cancellation restricted to `restriction`.
    #[must_use]
    pub const fn ci_cancellation(restriction: CiCancellationRestriction) -> PolicyExpr {
        cond(Condition::CiCancellation(restriction))
    }

    /// Project lets its jobs push with their token.
    #[must_use]
    pub const fn job_token_push_allowed() -> PolicyExpr {
        cond(Condition::JobTokenPushAllowed)
    }

    /// Feature licensed.
    #[must_use]
    pub const fn licensed(feature: LicensedFeature) -> PolicyExpr {
        cond(Condition::Licensed(feature))
    }

    /// Flag enabled from `scope` outward.
    #[must_use]
    pub const fn flag(flag: FeatureFlag, scope: FlagScope) -> PolicyExpr {
        cond(Condition::FlagEnabled(flag, scope))
    }

    /// Running on SaaS.
    #[must_use]
    pub const fn on_saas() -> PolicyExpr {
        cond(Condition::OnSaas)
    }

    /// Instance setting on.
    #[must_use]
    pub const fn setting(setting: InstanceSetting) -> PolicyExpr {
        cond(Condition::Setting(setting))
    }

    /// Enforced SSO without an active session.
    #[must_use]
    pub const fn needs_new_sso_session() -> PolicyExpr {
        cond(Condition::NeedsNewSsoSession)
    }

    /// IP restriction blocks the request.
    #[must_use]
    pub const fn ip_enforcement_prevents_access() -> PolicyExpr {
        cond(Condition::IpEnforcementPreventsAccess)
    }

    /// Actor banned from the root group.
    #[must_use]
    pub const fn banned() -> PolicyExpr {
        cond(Condition::BannedFromNamespace)
    }

    /// Ability on the same resource.
    #[must_use]
    pub const fn can(ability: Ability) -> PolicyExpr {
        cond(Condition::Can(ability))
    }

    /// Ability on the container.
    #[must_use]
    pub const fn container_can(ability: Ability) -> PolicyExpr {
        cond(Condition::ContainerCan(ability))
    }
}
