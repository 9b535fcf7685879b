// crates/ability-gate-core/src/policies/group.rs
// ============================================================================
// Module: Group Policy
// Description: Rule table for group abilities.
// Purpose: Map group roles and licensed features to group abilities.
// Dependencies: crate::{core, runtime, policies::dsl}
// ============================================================================

//! ## Overview
//! Group rules mirror the project tiers. Licensed features (epics, iterations,
//! security dashboards, custom roles) are gated on the license of the group's
//! root, and namespace restrictions prevent across the board.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Ability as A;
use crate::core::CustomPermission as P;
use crate::core::LicensedFeature as L;
use crate::core::ProjectFeature;
use crate::core::ResourceKind;
use crate::policies::dsl::admin;
use crate::policies::dsl::auditor;
use crate::policies::dsl::banned;
use crate::policies::dsl::can;
use crate::policies::dsl::developer;
use crate::policies::dsl::feature_disabled;
use crate::policies::dsl::feature_visible;
use crate::policies::dsl::guest;
use crate::policies::dsl::has_parent;
use crate::policies::dsl::ip_enforcement_prevents_access;
use crate::policies::dsl::licensed;
use crate::policies::dsl::maintainer;
use crate::policies::dsl::needs_new_sso_session;
use crate::policies::dsl::owner;
use crate::policies::dsl::planner;
use crate::policies::dsl::public_access;
use crate::policies::dsl::read_only;
use crate::policies::dsl::reporter;
use crate::policies::mutates_content;
use crate::runtime::PolicyBuilder;
use crate::runtime::PolicyDefinition;
use crate::runtime::RegistryError;

// ============================================================================
// SECTION: Ability Groups
// ============================================================================

/// Group reads refused from outside the IP allowlist.
const GROUP_READS: &[A] = &[
    A::ReadGroup,
    A::ReadGroupMember,
    A::ReadWorkItem,
    A::ReadEpic,
    A::ReadIteration,
    A::ReadWiki,
    A::DownloadWikiCode,
    A::ReadGroupRunners,
    A::ReadCluster,
    A::ReadGroupAuditEvents,
    A::ReadGroupSecurityDashboard,
    A::ReadVulnerability,
    A::ReadDependency,
    A::ReadCycleAnalytics,
];

/// Group settings administered by owners.
const OWNER_ADMINISTRATION: &[A] = &[
    A::AdminGroup,
    A::RemoveGroup,
    A::ChangeVisibilityLevel,
    A::AdminGroupMember,
    A::UpdateGroupMember,
    A::DestroyGroupMember,
    A::ReadBillableMember,
    A::AdminRunner,
    A::AdminCicdVariables,
    A::AdminIntegrations,
    A::ManageMergeRequestSettings,
    A::ManageDeployTokens,
    A::ReadDeployToken,
    A::CreateDeployToken,
    A::DestroyDeployToken,
    A::ReadResourceAccessTokens,
    A::CreateResourceAccessTokens,
    A::DestroyResourceAccessTokens,
    A::ManageResourceAccessTokens,
];

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Builds the group policy.
///
/// # Errors
///
/// Returns [`RegistryError`] when the table is malformed.
pub fn policy() -> Result<PolicyDefinition, RegistryError> {
    let mut policy = PolicyBuilder::new(ResourceKind::Group);

    policy.rule(guest()).enable(&[A::GuestAccess]);
    policy.rule(planner()).enable(&[A::PlannerAccess]);
    policy.rule(reporter()).enable(&[A::ReporterAccess]);
    policy.rule(developer()).enable(&[A::DeveloperAccess]);
    policy.rule(maintainer()).enable(&[A::MaintainerAccess]);
    policy.rule(owner()).enable(&[A::OwnerAccess]);

    policy.rule(public_access() | guest() | auditor()).enable(&[A::ReadGroup]);
    policy.rule(can(A::ReadGroup)).enable(&[A::ReadGroupMember, A::ReadWorkItem]);
    policy.rule(planner()).enable(&[A::ReadConfidentialIssues, A::AdminIssueBoardList]);
    policy.rule(reporter()).enable(&[A::ReadCycleAnalytics, A::ReadCrmContact]);
    policy.rule(reporter() & licensed(L::Dora4Analytics)).enable(&[A::ReadDora4Analytics]);

    work_planning(&mut policy);
    administration(&mut policy);
    security(&mut policy);
    restrictions(&mut policy);
    custom_roles(&mut policy);
    policy.build()
}

/// Epics, iterations, and the group wiki.
fn work_planning(policy: &mut PolicyBuilder) {
    policy.rule(can(A::ReadGroup) & licensed(L::Epics)).enable(&[A::ReadEpic]);
    policy.rule(planner() & licensed(L::Epics)).enable(&[
        A::CreateEpic,
        A::UpdateEpic,
        A::AdminEpic,
        A::ReadConfidentialEpic,
    ]);
    policy.rule(owner() & licensed(L::Epics)).enable(&[A::DestroyEpic]);

    policy.rule(can(A::ReadGroup) & licensed(L::Iterations)).enable(&[A::ReadIteration]);
    policy.rule(reporter() & licensed(L::Iterations)).enable(&[A::CreateIteration, A::AdminIteration]);

    policy
        .rule(can(A::ReadGroup) & feature_visible(ProjectFeature::Wiki))
        .enable(&[A::ReadWiki, A::DownloadWikiCode]);
    policy.rule(developer()).enable(&[A::CreateWiki]);
    policy.rule(maintainer()).enable(&[A::AdminWiki]);
    policy.rule(feature_disabled(ProjectFeature::Wiki)).prevent(&[
        A::ReadWiki,
        A::DownloadWikiCode,
        A::CreateWiki,
        A::AdminWiki,
    ]);
}

/// Projects, subgroups, runners, clusters, and membership.
fn administration(policy: &mut PolicyBuilder) {
    policy.rule(developer()).enable(&[A::CreateProjects, A::CreatePackage]);
    policy.rule(developer() | auditor()).enable(&[A::ReadGroupAuditEvents]);
    policy.rule(maintainer()).enable(&[
        A::CreateSubgroup,
        A::ReadGroupRunners,
        A::RegisterGroupRunners,
        A::CreateRunner,
        A::ReadCluster,
        A::AddCluster,
        A::CreateCluster,
        A::UpdateCluster,
        A::AdminCluster,
    ]);
    policy.rule(maintainer() & licensed(L::PushRules)).enable(&[A::AdminPushRules]);
    policy.rule(owner()).enable(OWNER_ADMINISTRATION);
    policy.rule(owner() & licensed(L::ComplianceFramework)).enable(&[A::AdminComplianceFramework]);

    policy.rule(guest() & licensed(L::CustomRoles)).enable(&[A::ReadMemberRole]);
    policy
        .rule((owner() | can(A::AdminGroupMember)) & licensed(L::CustomRoles))
        .enable(&[A::AdminMemberRole]);

    policy
        .rule(
            can(A::AdminGroup)
                | can(A::AdminComplianceFramework)
                | can(A::ManageDeployTokens)
                | can(A::ManageMergeRequestSettings)
                | can(A::AdminCicdVariables),
        )
        .enable(&[A::ViewEditPage]);
}

/// Group security dashboard and security policies.
fn security(policy: &mut PolicyBuilder) {
    policy
        .rule((developer() | auditor()) & licensed(L::SecurityDashboard))
        .enable(&[A::ReadVulnerability, A::ReadDependency]);
    policy.rule(maintainer() & licensed(L::SecurityDashboard)).enable(&[A::AdminVulnerability]);
    policy.rule(can(A::AdminVulnerability)).enable(&[A::ReadVulnerability]);
    policy.rule(can(A::ReadVulnerability)).enable(&[
        A::ReadGroupSecurityDashboard,
        A::CreateVulnerabilityExport,
        A::ReadSecurityResource,
    ]);
    policy
        .rule(developer() & licensed(L::SecurityOrchestrationPolicies))
        .enable(&[A::ReadSecurityOrchestrationPolicies]);
    policy.rule(owner() & licensed(L::SecurityOrchestrationPolicies)).enable(&[
        A::ReadSecurityOrchestrationPolicyProject,
        A::UpdateSecurityOrchestrationPolicyProject,
    ]);
}

/// Restrictions that apply regardless of role.
fn restrictions(policy: &mut PolicyBuilder) {
    policy.rule(!has_parent() & !owner()).prevent(&[A::RemoveGroup]);
    policy.rule(needs_new_sso_session()).prevent(&[A::ReadGroup]);
    policy.rule(ip_enforcement_prevents_access() & !owner() & !auditor()).prevent(GROUP_READS);
    policy.rule(banned() & !admin()).prevent_all();
    policy.rule(read_only()).prevent_matching(mutates_content);
}

/// Custom role permission table.
fn custom_roles(policy: &mut PolicyBuilder) {
    policy.overlay(P::ReadVulnerability, None, &[
        A::ReadVulnerability,
        A::ReadGroupSecurityDashboard,
        A::ReadSecurityResource,
        A::CreateVulnerabilityExport,
    ]);
    policy.overlay(P::AdminVulnerability, None, &[A::AdminVulnerability]);
    policy.overlay(P::ReadDependency, Some(L::DependencyScanning), &[A::ReadDependency]);
    policy.overlay(P::AdminRunners, None, &[
        A::ReadGroupRunners,
        A::RegisterGroupRunners,
        A::CreateRunner,
        A::AdminRunner,
    ]);
    policy.overlay(P::AdminCicdVariables, None, &[A::AdminCicdVariables]);
    policy.overlay(P::AdminPushRules, Some(L::PushRules), &[A::AdminPushRules]);
    policy.overlay(P::AdminIntegrations, None, &[A::AdminIntegrations]);
    policy.overlay(P::AdminGroupMember, None, &[
        A::AdminGroupMember,
        A::UpdateGroupMember,
        A::DestroyGroupMember,
    ]);
    policy.overlay(P::ManageDeployTokens, None, &[
        A::ManageDeployTokens,
        A::ReadDeployToken,
        A::CreateDeployToken,
        A::DestroyDeployToken,
    ]);
    policy.overlay(P::ManageGroupAccessTokens, None, &[
        A::ReadResourceAccessTokens,
        A::CreateResourceAccessTokens,
        A::DestroyResourceAccessTokens,
        A::ManageResourceAccessTokens,
    ]);
    policy.overlay(P::ManageMergeRequestSettings, None, &[A::ManageMergeRequestSettings]);
    policy.overlay(P::AdminComplianceFramework, Some(L::ComplianceFramework), &[
        A::AdminComplianceFramework,
    ]);
    policy.overlay(P::ManageSecurityPolicyLink, Some(L::SecurityOrchestrationPolicies), &[
        A::ReadSecurityOrchestrationPolicies,
        A::ReadSecurityOrchestrationPolicyProject,
        A::UpdateSecurityOrchestrationPolicyProject,
    ]);
    policy.overlay(P::RemoveGroup, None, &[A::RemoveGroup]);
    policy.overlay(P::ReadCrmContact, None, &[A::ReadCrmContact]);
}
