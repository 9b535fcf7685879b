// crates/ability-gate-core/src/policies/global.rs
// ============================================================================
// Module: Global Policy
// Description: Rule table for instance-wide abilities.
// Purpose: Decide abilities that are not tied to a project or group.
// Dependencies: crate::{core, runtime, policies::dsl}
// ============================================================================

//! ## Overview
//! Global abilities are evaluated against [`ResourceKind::Global`]. Licenses
//! resolve against the instance license because there is no root group.

use crate::core::Ability as A;
use crate::core::BotKind;
use crate::core::FeatureFlag;
use crate::core::FlagScope;
use crate::core::InstanceSetting;
use crate::core::LicensedFeature as L;
use crate::core::ResourceKind;
use crate::policies::dsl::admin;
use crate::policies::dsl::anonymous;
use crate::policies::dsl::auditor;
use crate::policies::dsl::bot;
use crate::policies::dsl::can;
use crate::policies::dsl::external;
use crate::policies::dsl::flag;
use crate::policies::dsl::licensed;
use crate::policies::dsl::on_saas;
use crate::policies::dsl::registered;
use crate::policies::dsl::setting;
use crate::runtime::PolicyBuilder;
use crate::runtime::PolicyDefinition;
use crate::runtime::RegistryError;

/// Builds the global policy.
///
/// # Errors
///
/// Returns [`RegistryError`] when the table is malformed.
pub fn policy() -> Result<PolicyDefinition, RegistryError> {
    let mut policy = PolicyBuilder::new(ResourceKind::Global);

    policy.rule(admin()).enable(&[
        A::ReadLicenses,
        A::DestroyLicenses,
        A::ReadAllResources,
        A::AdminAllResources,
        A::ManageSubscription,
    ]);
    policy.rule(auditor()).enable(&[A::ReadAllResources]);
    policy.rule(admin() & licensed(L::CustomRoles)).enable(&[A::ReadMemberRole, A::AdminMemberRole]);
    policy.rule(admin() & licensed(L::ServiceAccounts)).enable(&[A::AdminServiceAccounts]);

    policy.rule(!anonymous()).enable(&[A::ViewProductivityAnalytics]);
    policy.rule(!anonymous() & licensed(L::OperationsDashboard)).enable(&[A::ReadOperationsDashboard]);
    policy.rule(!anonymous() & licensed(L::RemoteDevelopment)).enable(&[A::AccessWorkspacesFeature]);
    policy.rule(registered() | bot(BotKind::SecurityPolicyBot)).enable(&[A::AccessGit]);

    policy.rule(registered() & !external()).enable(&[A::CreateGroup]);
    policy.rule(can(A::CreateGroup)).enable(&[A::CreateGroupViaApi]);
    policy
        .rule(!setting(InstanceSetting::TopLevelGroupCreationEnabled))
        .prevent(&[A::CreateGroupViaApi]);

    policy
        .rule(
            !anonymous()
                & ((on_saas() & flag(FeatureFlag::DuoChatOnSaas, FlagScope::Actor))
                    | licensed(L::AiChat)),
        )
        .enable(&[A::AccessDuoChat]);

    policy.build()
}
