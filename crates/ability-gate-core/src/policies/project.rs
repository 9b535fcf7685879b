// crates/ability-gate-core/src/policies/project.rs
// ============================================================================
// Module: Project Policy
// Description: Rule table for project abilities.
// Purpose: Map roles, feature access levels, licenses, and credentials to
//          project abilities, and apply project-wide restrictions.
// Dependencies: crate::{core, runtime, policies::dsl}
// ============================================================================

//! ## Overview
//! Project rules come in three layers:
//!
//! - role tiers and feature rules grant abilities (`reporter()` is "reporter
//!   or higher, or an active administrator");
//! - feature switches prevent everything a disabled feature covers;
//! - namespace restrictions (bans, IP allowlists, SSO, read-only storage,
//!   archival) prevent regardless of role.
//!
//! Read access to a feature goes through [`feature_visible`], which combines
//! the feature's access level, the project visibility, and the feature's
//! member floor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Ability as A;
use crate::core::BotKind;
use crate::core::CiCancellationRestriction;
use crate::core::CustomPermission as P;
use crate::core::DeployTokenScope;
use crate::core::FeatureFlag;
use crate::core::FlagScope;
use crate::core::InstanceSetting;
use crate::core::LicensedFeature as L;
use crate::core::ProjectFeature as F;
use crate::core::ResourceKind;
use crate::policies::dsl::admin;
use crate::policies::dsl::archived;
use crate::policies::dsl::auditor;
use crate::policies::dsl::banned;
use crate::policies::dsl::bot;
use crate::policies::dsl::can;
use crate::policies::dsl::ci_cancellation;
use crate::policies::dsl::ci_job_self_referential;
use crate::policies::dsl::deploy_key;
use crate::policies::dsl::deploy_key_can_push;
use crate::policies::dsl::deploy_token;
use crate::policies::dsl::developer;
use crate::policies::dsl::external;
use crate::policies::dsl::feature_disabled;
use crate::policies::dsl::feature_visible;
use crate::policies::dsl::flag;
use crate::policies::dsl::guest;
use crate::policies::dsl::hidden;
use crate::policies::dsl::ip_enforcement_prevents_access;
use crate::policies::dsl::job_token_push_allowed;
use crate::policies::dsl::licensed;
use crate::policies::dsl::maintainer;
use crate::policies::dsl::needs_new_sso_session;
use crate::policies::dsl::on_saas;
use crate::policies::dsl::owner;
use crate::policies::dsl::planner;
use crate::policies::dsl::public_access;
use crate::policies::dsl::read_only;
use crate::policies::dsl::registered;
use crate::policies::dsl::reporter;
use crate::policies::dsl::service_desk_enabled;
use crate::policies::dsl::setting;
use crate::policies::mutates_content;
use crate::runtime::PolicyBuilder;
use crate::runtime::PolicyDefinition;
use crate::runtime::RegistryError;

// ============================================================================
// SECTION: Ability Groups
// ============================================================================

/// Issue tracker reads.
const ISSUE_READS: &[A] =
    &[A::ReadIssue, A::ReadIssueIid, A::ReadWorkItem, A::ReadIssueBoard, A::ReadIssueBoardList];

/// Issue tracker writes open to guests.
const ISSUE_GUEST_WRITES: &[A] = &[A::CreateIssue, A::CreateWorkItem, A::CreateTask];

/// Issue tracker writes for planners and above.
const ISSUE_PLANNER_WRITES: &[A] = &[
    A::UpdateIssue,
    A::AdminIssue,
    A::ReadConfidentialIssues,
    A::CreateBoard,
    A::UpdateBoard,
    A::CreateList,
    A::UpdateList,
    A::AdminIssueBoardList,
];

/// Merge request abilities.
const MERGE_REQUEST_ABILITIES: &[A] = &[
    A::ReadMergeRequest,
    A::CreateMergeRequestIn,
    A::CreateMergeRequestFrom,
    A::UpdateMergeRequest,
    A::AdminMergeRequest,
];

/// Build abilities.
const BUILD_ABILITIES: &[A] = &[
    A::ReadBuild,
    A::ReadPipeline,
    A::ReadJobArtifacts,
    A::CreatePipeline,
    A::UpdatePipeline,
    A::CancelPipeline,
    A::UpdateBuild,
    A::CancelBuild,
    A::AdminPipeline,
    A::DestroyPipeline,
    A::AdminBuild,
    A::ReadCiCdAnalytics,
];

/// Environment abilities.
const ENVIRONMENT_ABILITIES: &[A] = &[
    A::ReadEnvironment,
    A::ReadDeployment,
    A::CreateEnvironment,
    A::CreateDeployment,
    A::UpdateEnvironment,
    A::UpdateDeployment,
    A::DestroyEnvironment,
    A::AdminEnvironment,
    A::AdminDeployment,
];

/// Monitor abilities.
const MONITOR_ABILITIES: &[A] = &[
    A::ReadSentryIssue,
    A::ReadAlertManagementAlert,
    A::MetricsDashboard,
    A::UpdateSentryIssue,
    A::UpdateAlertManagementAlert,
];

/// Feature flag abilities.
const FEATURE_FLAG_ABILITIES: &[A] = &[
    A::ReadFeatureFlag,
    A::CreateFeatureFlag,
    A::UpdateFeatureFlag,
    A::DestroyFeatureFlag,
    A::AdminFeatureFlag,
    A::AdminFeatureFlagsUserLists,
    A::AdminFeatureFlagsClient,
];

/// Release abilities.
const RELEASE_ABILITIES: &[A] =
    &[A::ReadRelease, A::CreateRelease, A::UpdateRelease, A::DestroyRelease];

/// Infrastructure abilities.
const INFRASTRUCTURE_ABILITIES: &[A] = &[
    A::ReadTerraformState,
    A::ReadPodLogs,
    A::ReadPrometheus,
    A::ReadCluster,
    A::AddCluster,
    A::CreateCluster,
    A::UpdateCluster,
    A::AdminCluster,
    A::AdminTerraformState,
    A::AdminProjectGoogleCloud,
];

/// Container registry abilities.
const CONTAINER_REGISTRY_ABILITIES: &[A] = &[
    A::ReadContainerImage,
    A::CreateContainerImage,
    A::UpdateContainerImage,
    A::DestroyContainerImage,
    A::AdminContainerImage,
    A::BuildReadContainerImage,
];

/// Package registry abilities.
const PACKAGE_ABILITIES: &[A] =
    &[A::ReadPackage, A::CreatePackage, A::DestroyPackage, A::AdminPackage];

/// Wiki abilities.
const WIKI_ABILITIES: &[A] = &[A::ReadWiki, A::DownloadWikiCode, A::CreateWiki, A::AdminWiki];

/// Repository abilities.
const REPOSITORY_ABILITIES: &[A] = &[
    A::DownloadCode,
    A::ReadCode,
    A::ReadCommitStatus,
    A::PushCode,
    A::PushCodeToProtectedBranches,
    A::PushToDeleteProtectedBranch,
    A::AdminProtectedBranch,
    A::ForkProject,
    A::BuildDownloadCode,
    A::BuildPushCode,
];

/// Security and compliance abilities.
const SECURITY_ABILITIES: &[A] = &[
    A::AccessSecurityAndCompliance,
    A::ReadVulnerability,
    A::AdminVulnerability,
    A::ReadDependency,
    A::ReadSecurityResource,
    A::CreateVulnerabilityExport,
    A::ReadVulnerabilityScanner,
    A::ReadVulnerabilityFeedback,
    A::CreateVulnerabilityFeedback,
    A::UpdateVulnerabilityFeedback,
    A::DestroyVulnerabilityFeedback,
    A::ReadSecurityOrchestrationPolicies,
];

/// Analytics abilities.
const ANALYTICS_ABILITIES: &[A] =
    &[A::ReadCycleAnalytics, A::ReadDora4Analytics, A::ReadCiCdAnalytics];

/// Model registry abilities.
const MODEL_REGISTRY_ABILITIES: &[A] = &[A::ReadModelRegistry, A::WriteModelRegistry];

/// Project settings administered by maintainers.
const MAINTAINER_ADMINISTRATION: &[A] = &[
    A::AdminProject,
    A::AdminProjectMember,
    A::ReadWebHook,
    A::AdminWebHook,
    A::AdminIntegrations,
    A::ReadRunner,
    A::CreateRunner,
    A::UpdateRunner,
    A::AdminRunner,
    A::DestroyRunner,
    A::RegisterProjectRunners,
    A::AdminCicdVariables,
    A::ManageDeployTokens,
    A::ReadDeployToken,
    A::CreateDeployToken,
    A::DestroyDeployToken,
    A::ReadResourceAccessTokens,
    A::CreateResourceAccessTokens,
    A::DestroyResourceAccessTokens,
    A::ManageResourceAccessTokens,
    A::PushCodeToProtectedBranches,
    A::PushToDeleteProtectedBranch,
    A::AdminProtectedBranch,
    A::ManageMergeRequestSettings,
    A::EditApprovalRule,
    A::ModifyApproversRules,
    A::ModifyMergeRequestAuthorSetting,
    A::ModifyMergeRequestCommitterSetting,
];

/// Project lifecycle actions reserved for owners.
const OWNER_ADMINISTRATION: &[A] = &[
    A::RemoveProject,
    A::ArchiveProject,
    A::ChangeVisibilityLevel,
    A::ChangeNamespace,
    A::RenameProject,
];

/// Content changes refused on archived projects.
const ARCHIVED_WRITES: &[A] = &[
    A::CreateIssue,
    A::CreateWorkItem,
    A::CreateTask,
    A::CreateIncident,
    A::UpdateIssue,
    A::AdminIssue,
    A::CreateBoard,
    A::UpdateBoard,
    A::CreateList,
    A::UpdateList,
    A::CreateMergeRequestIn,
    A::CreateMergeRequestFrom,
    A::UpdateMergeRequest,
    A::PushCode,
    A::PushCodeToProtectedBranches,
    A::BuildPushCode,
    A::CreatePipeline,
    A::UpdatePipeline,
    A::UpdateBuild,
    A::CreateEnvironment,
    A::CreateDeployment,
    A::UpdateEnvironment,
    A::UpdateDeployment,
    A::CreateRelease,
    A::UpdateRelease,
    A::CreateWiki,
    A::CreateContainerImage,
    A::UpdateContainerImage,
    A::CreatePackage,
    A::CreateFeatureFlag,
    A::UpdateFeatureFlag,
    A::CreateVulnerabilityFeedback,
    A::UpdateVulnerabilityFeedback,
    A::WriteModelRegistry,
];

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Builds the project policy.
///
/// # Errors
///
/// Returns [`RegistryError`] when the table is malformed.
pub fn policy() -> Result<PolicyDefinition, RegistryError> {
    let mut policy = PolicyBuilder::new(ResourceKind::Project);
    tiers(&mut policy);
    membership(&mut policy);
    repository(&mut policy);
    issues(&mut policy);
    merge_requests(&mut policy);
    builds(&mut policy);
    deployments(&mut policy);
    registries(&mut policy);
    security(&mut policy);
    analytics(&mut policy);
    job_token(&mut policy);
    saas(&mut policy);
    restrictions(&mut policy);
    custom_roles(&mut policy);
    policy.build()
}

/// Role tier pseudo-abilities.
fn tiers(policy: &mut PolicyBuilder) {
    policy.rule(guest()).enable(&[A::GuestAccess]);
    policy.rule(planner()).enable(&[A::PlannerAccess]);
    policy.rule(reporter()).enable(&[A::ReporterAccess]);
    policy.rule(developer()).enable(&[A::DeveloperAccess]);
    policy.rule(maintainer()).enable(&[A::MaintainerAccess]);
    policy.rule(owner()).enable(&[A::OwnerAccess]);
}

/// Project visibility, members, and administration.
fn membership(policy: &mut PolicyBuilder) {
    policy.rule(public_access() | guest() | auditor()).enable(&[A::ReadProject]);
    policy.rule(can(A::ReadProject)).enable(&[A::ReadProjectMetadata, A::ReadProjectMember]);
    policy.rule(bot(BotKind::SupportBot) & service_desk_enabled()).enable(&[
        A::ReadProject,
        A::GuestAccess,
        A::ReadIssue,
        A::ReadWorkItem,
        A::CreateIssue,
    ]);
    policy.rule(maintainer()).enable(MAINTAINER_ADMINISTRATION);
    policy.rule(maintainer() & licensed(L::PushRules)).enable(&[A::AdminPushRules]);
    policy.rule(owner()).enable(OWNER_ADMINISTRATION);
    policy.rule(owner() & licensed(L::ComplianceFramework)).enable(&[A::AdminComplianceFramework]);
    policy
        .rule(
            can(A::AdminProject)
                | can(A::ManageDeployTokens)
                | can(A::ManageMergeRequestSettings)
                | can(A::AdminComplianceFramework)
                | can(A::AdminPushRules)
                | can(A::AdminCicdVariables),
        )
        .enable(&[A::ViewEditPage]);
}

/// Source repository.
fn repository(policy: &mut PolicyBuilder) {
    policy.rule(can(A::ReadProject) & feature_visible(F::Repository)).enable(&[A::DownloadCode, A::ReadCode]);
    policy.rule(deploy_token(DeployTokenScope::ReadRepository) | deploy_key()).enable(&[A::DownloadCode]);
    policy.rule(registered() & can(A::DownloadCode)).enable(&[A::ForkProject]);
    policy.rule(reporter()).enable(&[A::ReadCommitStatus]);
    policy.rule(developer()).enable(&[A::PushCode]);
    policy.rule(deploy_key_can_push()).enable(&[A::PushCode]);
    policy.rule(feature_disabled(F::Repository)).prevent(REPOSITORY_ABILITIES);
    policy.rule(hidden()).prevent(&[A::DownloadCode, A::BuildDownloadCode, A::ForkProject]);
}

/// Issue tracker and wiki.
fn issues(policy: &mut PolicyBuilder) {
    policy.rule(can(A::ReadProject) & feature_visible(F::Issues)).enable(ISSUE_READS);
    policy.rule(guest()).enable(ISSUE_GUEST_WRITES);
    policy.rule(registered() & !external() & can(A::ReadIssue)).enable(&[A::CreateIssue, A::CreateWorkItem]);
    policy.rule(planner()).enable(ISSUE_PLANNER_WRITES);
    policy.rule(reporter()).enable(&[A::CreateIncident]);
    policy.rule(feature_disabled(F::Issues)).prevent(ISSUE_READS);
    policy.rule(feature_disabled(F::Issues)).prevent(ISSUE_GUEST_WRITES);
    policy.rule(feature_disabled(F::Issues)).prevent(ISSUE_PLANNER_WRITES);
    policy.rule(feature_disabled(F::Issues)).prevent(&[A::CreateIncident]);

    policy.rule(can(A::ReadProject) & feature_visible(F::Wiki)).enable(&[A::ReadWiki, A::DownloadWikiCode]);
    policy.rule(developer()).enable(&[A::CreateWiki]);
    policy.rule(maintainer()).enable(&[A::AdminWiki]);
    policy.rule(feature_disabled(F::Wiki)).prevent(WIKI_ABILITIES);
}

/// Merge requests.
fn merge_requests(policy: &mut PolicyBuilder) {
    policy.rule(can(A::ReadProject) & feature_visible(F::MergeRequests)).enable(&[A::ReadMergeRequest]);
    policy.rule(registered() & can(A::ReadMergeRequest)).enable(&[A::CreateMergeRequestIn]);
    policy.rule(developer()).enable(&[
        A::CreateMergeRequestFrom,
        A::UpdateMergeRequest,
        A::AdminMergeRequest,
    ]);
    policy.rule(feature_disabled(F::MergeRequests)).prevent(MERGE_REQUEST_ABILITIES);
}

/// CI builds and pipelines.
fn builds(policy: &mut PolicyBuilder) {
    policy.rule(can(A::ReadProject) & feature_visible(F::Builds)).enable(&[
        A::ReadBuild,
        A::ReadPipeline,
        A::ReadJobArtifacts,
    ]);
    policy.rule(reporter()).enable(&[A::ReadCiCdAnalytics]);
    policy.rule(developer()).enable(&[
        A::CreatePipeline,
        A::UpdatePipeline,
        A::CancelPipeline,
        A::UpdateBuild,
        A::CancelBuild,
    ]);
    policy.rule(maintainer()).enable(&[A::AdminPipeline, A::DestroyPipeline, A::AdminBuild]);
    policy
        .rule(ci_cancellation(CiCancellationRestriction::Maintainer) & !maintainer())
        .prevent(&[A::CancelPipeline, A::CancelBuild]);
    policy
        .rule(ci_cancellation(CiCancellationRestriction::NoOne))
        .prevent(&[A::CancelPipeline, A::CancelBuild]);
    policy.rule(feature_disabled(F::Builds)).prevent(BUILD_ABILITIES);
}

/// Environments, monitoring, feature flags, releases, and infrastructure.
fn deployments(policy: &mut PolicyBuilder) {
    policy.rule(can(A::ReadProject) & feature_visible(F::Environments)).enable(&[
        A::ReadEnvironment,
        A::ReadDeployment,
    ]);
    policy.rule(developer()).enable(&[
        A::CreateEnvironment,
        A::CreateDeployment,
        A::UpdateEnvironment,
        A::UpdateDeployment,
        A::DestroyEnvironment,
    ]);
    policy.rule(maintainer()).enable(&[A::AdminEnvironment, A::AdminDeployment]);
    policy.rule(feature_disabled(F::Environments)).prevent(ENVIRONMENT_ABILITIES);

    policy.rule(reporter()).enable(&[A::MetricsDashboard]);
    policy.rule(developer()).enable(&[
        A::ReadSentryIssue,
        A::ReadAlertManagementAlert,
        A::UpdateSentryIssue,
        A::UpdateAlertManagementAlert,
    ]);
    policy.rule(feature_disabled(F::Monitor)).prevent(MONITOR_ABILITIES);

    policy.rule(developer()).enable(&[
        A::ReadFeatureFlag,
        A::CreateFeatureFlag,
        A::UpdateFeatureFlag,
        A::DestroyFeatureFlag,
        A::AdminFeatureFlag,
        A::AdminFeatureFlagsUserLists,
    ]);
    policy.rule(maintainer()).enable(&[A::AdminFeatureFlagsClient]);
    policy.rule(feature_disabled(F::FeatureFlags)).prevent(FEATURE_FLAG_ABILITIES);

    policy.rule(can(A::ReadProject) & feature_visible(F::Releases)).enable(&[A::ReadRelease]);
    policy.rule(developer()).enable(&[A::CreateRelease, A::UpdateRelease, A::DestroyRelease]);
    policy.rule(feature_disabled(F::Releases)).prevent(RELEASE_ABILITIES);

    policy.rule(developer()).enable(&[A::ReadTerraformState, A::ReadPodLogs, A::ReadPrometheus]);
    policy.rule(maintainer()).enable(&[
        A::ReadCluster,
        A::AddCluster,
        A::CreateCluster,
        A::UpdateCluster,
        A::AdminCluster,
        A::AdminTerraformState,
        A::AdminProjectGoogleCloud,
    ]);
    policy.rule(feature_disabled(F::Infrastructure)).prevent(INFRASTRUCTURE_ABILITIES);
}

/// Container and package registries.
fn registries(policy: &mut PolicyBuilder) {
    policy
        .rule(can(A::ReadProject) & feature_visible(F::ContainerRegistry))
        .enable(&[A::ReadContainerImage]);
    policy.rule(deploy_token(DeployTokenScope::ReadRegistry)).enable(&[A::ReadContainerImage]);
    policy.rule(deploy_token(DeployTokenScope::WriteRegistry)).enable(&[A::CreateContainerImage]);
    policy.rule(developer()).enable(&[A::CreateContainerImage, A::UpdateContainerImage]);
    policy.rule(maintainer()).enable(&[A::DestroyContainerImage, A::AdminContainerImage]);
    policy.rule(feature_disabled(F::ContainerRegistry)).prevent(CONTAINER_REGISTRY_ABILITIES);

    policy.rule(can(A::ReadProject) & feature_visible(F::PackageRegistry)).enable(&[A::ReadPackage]);
    policy.rule(deploy_token(DeployTokenScope::ReadPackageRegistry)).enable(&[A::ReadPackage]);
    policy.rule(deploy_token(DeployTokenScope::WritePackageRegistry)).enable(&[A::CreatePackage]);
    policy.rule(developer()).enable(&[A::CreatePackage]);
    policy.rule(maintainer()).enable(&[A::DestroyPackage, A::AdminPackage]);
    policy.rule(feature_disabled(F::PackageRegistry)).prevent(PACKAGE_ABILITIES);
}

/// Security dashboards, vulnerabilities, and security policies.
fn security(policy: &mut PolicyBuilder) {
    policy.rule(developer() | auditor()).enable(&[A::AccessSecurityAndCompliance]);
    policy.rule((developer() | auditor()) & licensed(L::SecurityDashboard)).enable(&[
        A::ReadVulnerability,
        A::ReadDependency,
        A::ReadSecurityResource,
        A::CreateVulnerabilityExport,
        A::ReadVulnerabilityScanner,
    ]);
    policy.rule(maintainer() & licensed(L::SecurityDashboard)).enable(&[A::AdminVulnerability]);
    policy.rule(can(A::AdminVulnerability)).enable(&[
        A::ReadVulnerability,
        A::CreateVulnerabilityFeedback,
        A::UpdateVulnerabilityFeedback,
        A::DestroyVulnerabilityFeedback,
    ]);
    policy.rule(can(A::ReadVulnerability)).enable(&[A::ReadVulnerabilityFeedback]);
    policy
        .rule(developer() & licensed(L::SecurityOrchestrationPolicies))
        .enable(&[A::ReadSecurityOrchestrationPolicies]);
    policy.rule(owner() & licensed(L::SecurityOrchestrationPolicies)).enable(&[
        A::ReadSecurityOrchestrationPolicyProject,
        A::UpdateSecurityOrchestrationPolicyProject,
    ]);
    policy.rule(feature_disabled(F::SecurityAndCompliance)).prevent(SECURITY_ABILITIES);
}

/// Analytics and model registry.
fn analytics(policy: &mut PolicyBuilder) {
    policy.rule(can(A::ReadProject) & feature_visible(F::Analytics)).enable(&[A::ReadCycleAnalytics]);
    policy.rule(reporter() & licensed(L::Dora4Analytics)).enable(&[A::ReadDora4Analytics]);
    policy.rule(feature_disabled(F::Analytics)).prevent(ANALYTICS_ABILITIES);
    policy
        .rule(feature_disabled(F::Issues) & feature_disabled(F::MergeRequests))
        .prevent(&[A::ReadCycleAnalytics]);

    let model_registry_flag = flag(FeatureFlag::ModelRegistry, FlagScope::Resource);
    policy
        .rule(can(A::ReadProject) & feature_visible(F::ModelRegistry) & model_registry_flag.clone())
        .enable(&[A::ReadModelRegistry]);
    policy.rule(developer() & model_registry_flag).enable(&[A::WriteModelRegistry]);
    policy.rule(feature_disabled(F::ModelRegistry)).prevent(MODEL_REGISTRY_ABILITIES);
}

/// Abilities checked when a CI job authenticates with its token.
fn job_token(policy: &mut PolicyBuilder) {
    policy.rule(reporter() | public_access()).enable(&[A::BuildReadProject]);
    policy.rule(can(A::DownloadCode)).enable(&[A::BuildDownloadCode]);
    policy.rule(can(A::ReadContainerImage)).enable(&[A::BuildReadContainerImage]);
    policy
        .rule(
            developer()
                & ci_job_self_referential()
                & job_token_push_allowed()
                & flag(FeatureFlag::AllowPushRepositoryForJobToken, FlagScope::Resource),
        )
        .enable(&[A::BuildPushCode]);
}

/// Integrations only offered on SaaS.
fn saas(policy: &mut PolicyBuilder) {
    let cloud = on_saas() & flag(FeatureFlag::GoogleCloudSupport, FlagScope::Global);
    policy.rule(cloud.clone() & maintainer()).enable(&[
        A::ReadRunnerCloudProvisioningInfo,
        A::ProvisionCloudRunner,
        A::AdminGoogleCloudArtifactRegistry,
    ]);
    policy.rule(cloud & reporter()).enable(&[A::ReadGoogleCloudArtifactRegistry]);
}

/// Restrictions that apply regardless of role.
fn restrictions(policy: &mut PolicyBuilder) {
    policy.rule(archived()).prevent(ARCHIVED_WRITES);
    policy
        .rule(!admin() & owner() & setting(InstanceSetting::DefaultProjectDeletionProtection))
        .prevent(&[A::RemoveProject]);
    policy.rule(needs_new_sso_session()).prevent(&[A::ReadProject]);
    policy.rule(ip_enforcement_prevents_access() & !admin() & !auditor()).prevent_all();
    policy.rule(banned() & !admin()).prevent_all();
    policy.rule(read_only()).prevent_matching(mutates_content);
}

/// Custom role permission table.
fn custom_roles(policy: &mut PolicyBuilder) {
    policy.overlay(P::ReadCode, None, &[A::ReadCode]);
    policy.overlay(P::ReadVulnerability, None, &[
        A::AccessSecurityAndCompliance,
        A::ReadVulnerability,
        A::ReadSecurityResource,
        A::CreateVulnerabilityExport,
    ]);
    policy.overlay(P::AdminVulnerability, None, &[A::AdminVulnerability]);
    policy.overlay(P::ReadDependency, Some(L::DependencyScanning), &[
        A::AccessSecurityAndCompliance,
        A::ReadDependency,
    ]);
    policy.overlay(P::AdminMergeRequest, None, &[
        A::DownloadCode,
        A::ReadMergeRequest,
        A::CreateMergeRequestFrom,
        A::AdminMergeRequest,
    ]);
    policy.overlay(P::AdminTerraformState, None, &[A::ReadTerraformState, A::AdminTerraformState]);
    policy.overlay(P::AdminRunners, None, &[
        A::ReadRunner,
        A::CreateRunner,
        A::UpdateRunner,
        A::AdminRunner,
        A::DestroyRunner,
    ]);
    policy.overlay(P::AdminCicdVariables, None, &[A::AdminCicdVariables]);
    policy.overlay(P::AdminPushRules, Some(L::PushRules), &[A::AdminPushRules]);
    policy.overlay(P::AdminIntegrations, None, &[A::AdminIntegrations]);
    policy.overlay(P::AdminWebHook, None, &[A::ReadWebHook, A::AdminWebHook]);
    policy.overlay(P::ManageDeployTokens, None, &[
        A::ManageDeployTokens,
        A::ReadDeployToken,
        A::CreateDeployToken,
        A::DestroyDeployToken,
    ]);
    policy.overlay(P::ManageProjectAccessTokens, None, &[
        A::ReadResourceAccessTokens,
        A::CreateResourceAccessTokens,
        A::DestroyResourceAccessTokens,
        A::ManageResourceAccessTokens,
    ]);
    policy.overlay(P::ManageMergeRequestSettings, None, &[
        A::ManageMergeRequestSettings,
        A::EditApprovalRule,
        A::ModifyApproversRules,
        A::ModifyMergeRequestAuthorSetting,
        A::ModifyMergeRequestCommitterSetting,
    ]);
    policy.overlay(P::AdminComplianceFramework, Some(L::ComplianceFramework), &[
        A::AdminComplianceFramework,
    ]);
    policy.overlay(P::ManageSecurityPolicyLink, Some(L::SecurityOrchestrationPolicies), &[
        A::AccessSecurityAndCompliance,
        A::ReadSecurityOrchestrationPolicies,
        A::ReadSecurityOrchestrationPolicyProject,
        A::UpdateSecurityOrchestrationPolicyProject,
    ]);
    policy.overlay(P::ArchiveProject, None, &[A::ArchiveProject]);
    policy.overlay(P::RemoveProject, None, &[A::RemoveProject]);
}
