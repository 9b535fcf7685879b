// crates/ability-gate-core/src/core/ability.rs
// ============================================================================
// Module: Ability Vocabulary
// Description: Closed set of named permissions the engine can decide.
// Purpose: Make every ability a typed value with a stable snake_case name.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Abilities are named permissions such as `read_issue` or `admin_project`.
//! The vocabulary is closed: callers holding an [`Ability`] can never ask
//! about an undeclared name, and the string boundary ([`Ability::from_name`])
//! rejects unknown names instead of silently denying them.
//!
//! Each ability also has a coarse [`AbilityCategory`] derived from its name.
//! Namespace-wide restrictions (read-only storage, archival) prevent whole
//! categories at once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

// ============================================================================
// SECTION: Categories
// ============================================================================

/// Coarse classification of an ability by the kind of operation it guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityCategory {
    /// Reads content or metadata.
    Read,
    /// Creates new records.
    Create,
    /// Changes existing records, including pushes.
    Update,
    /// Removes records.
    Destroy,
    /// Administers settings or memberships.
    Admin,
    /// Role tiers and other markers.
    Other,
}

/// Name prefixes mapped to categories; first match wins.
const CATEGORY_PREFIXES: &[(&str, AbilityCategory)] = &[
    ("build_push_", AbilityCategory::Update),
    ("build_read_", AbilityCategory::Read),
    ("build_download_", AbilityCategory::Read),
    ("read_", AbilityCategory::Read),
    ("download_", AbilityCategory::Read),
    ("view_", AbilityCategory::Read),
    ("access_", AbilityCategory::Read),
    ("create_", AbilityCategory::Create),
    ("add_", AbilityCategory::Create),
    ("register_", AbilityCategory::Create),
    ("provision_", AbilityCategory::Create),
    ("fork_", AbilityCategory::Create),
    ("update_", AbilityCategory::Update),
    ("edit_", AbilityCategory::Update),
    ("modify_", AbilityCategory::Update),
    ("change_", AbilityCategory::Update),
    ("rename_", AbilityCategory::Update),
    ("push_", AbilityCategory::Update),
    ("write_", AbilityCategory::Update),
    ("cancel_", AbilityCategory::Update),
    ("reopen_", AbilityCategory::Update),
    ("archive_", AbilityCategory::Update),
    ("admin_", AbilityCategory::Admin),
    ("manage_", AbilityCategory::Admin),
    ("destroy_", AbilityCategory::Destroy),
    ("remove_", AbilityCategory::Destroy),
];

// ============================================================================
// SECTION: Ability Enum
// ============================================================================

macro_rules! define_abilities {
    ($( $(#[$meta:meta])* $variant:ident => $name:literal, )+) => {
        /// Named permission.
        ///
        /// # Invariants
        /// - Every variant has a unique snake_case name; names round-trip
        ///   through [`Ability::name`] and [`Ability::from_name`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Ability {
            $(
                $(#[$meta])*
                #[doc = concat!("`", $name, "`")]
                $variant,
            )+
        }

        impl Ability {
            /// Every ability in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Returns the stable snake_case name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Parses a snake_case name; unknown names yield `None`.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

define_abilities! {
    // Role tiers.
    GuestAccess => "guest_access",
    PlannerAccess => "planner_access",
    ReporterAccess => "reporter_access",
    DeveloperAccess => "developer_access",
    MaintainerAccess => "maintainer_access",
    OwnerAccess => "owner_access",

    // Project basics.
    ReadProject => "read_project",
    ReadProjectMetadata => "read_project_metadata",
    ReadProjectMember => "read_project_member",
    AdminProject => "admin_project",
    AdminProjectMember => "admin_project_member",
    ChangeVisibilityLevel => "change_visibility_level",
    ChangeNamespace => "change_namespace",
    RenameProject => "rename_project",
    RemoveProject => "remove_project",
    ArchiveProject => "archive_project",
    ViewEditPage => "view_edit_page",

    // Repository.
    DownloadCode => "download_code",
    ReadCode => "read_code",
    ReadCommitStatus => "read_commit_status",
    PushCode => "push_code",
    PushCodeToProtectedBranches => "push_code_to_protected_branches",
    PushToDeleteProtectedBranch => "push_to_delete_protected_branch",
    AdminProtectedBranch => "admin_protected_branch",
    ForkProject => "fork_project",

    // Issues and boards.
    ReadIssue => "read_issue",
    ReadIssueIid => "read_issue_iid",
    ReadWorkItem => "read_work_item",
    ReadIssueBoard => "read_issue_board",
    ReadIssueBoardList => "read_issue_board_list",
    CreateIssue => "create_issue",
    CreateWorkItem => "create_work_item",
    CreateTask => "create_task",
    CreateIncident => "create_incident",
    UpdateIssue => "update_issue",
    UpdateWorkItem => "update_work_item",
    AdminIssue => "admin_issue",
    AdminWorkItem => "admin_work_item",
    ReopenIssue => "reopen_issue",
    ReadConfidentialIssues => "read_confidential_issues",
    CreateBoard => "create_board",
    UpdateBoard => "update_board",
    CreateList => "create_list",
    UpdateList => "update_list",
    AdminIssueBoardList => "admin_issue_board_list",
    AdminIssueRelation => "admin_issue_relation",
    CreateNote => "create_note",
    ReadInternalNote => "read_internal_note",
    SummarizeComments => "summarize_comments",

    // Merge requests.
    ReadMergeRequest => "read_merge_request",
    CreateMergeRequestIn => "create_merge_request_in",
    CreateMergeRequestFrom => "create_merge_request_from",
    UpdateMergeRequest => "update_merge_request",
    AdminMergeRequest => "admin_merge_request",

    // Builds and pipelines.
    ReadBuild => "read_build",
    ReadPipeline => "read_pipeline",
    ReadJobArtifacts => "read_job_artifacts",
    CreatePipeline => "create_pipeline",
    UpdatePipeline => "update_pipeline",
    CancelPipeline => "cancel_pipeline",
    UpdateBuild => "update_build",
    CancelBuild => "cancel_build",
    AdminPipeline => "admin_pipeline",
    DestroyPipeline => "destroy_pipeline",
    AdminBuild => "admin_build",
    ReadCiCdAnalytics => "read_ci_cd_analytics",

    // Environments.
    ReadEnvironment => "read_environment",
    ReadDeployment => "read_deployment",
    CreateEnvironment => "create_environment",
    CreateDeployment => "create_deployment",
    UpdateEnvironment => "update_environment",
    UpdateDeployment => "update_deployment",
    DestroyEnvironment => "destroy_environment",
    AdminEnvironment => "admin_environment",
    AdminDeployment => "admin_deployment",

    // Monitor.
    ReadSentryIssue => "read_sentry_issue",
    ReadAlertManagementAlert => "read_alert_management_alert",
    MetricsDashboard => "metrics_dashboard",
    UpdateSentryIssue => "update_sentry_issue",
    UpdateAlertManagementAlert => "update_alert_management_alert",

    // Feature flags.
    ReadFeatureFlag => "read_feature_flag",
    CreateFeatureFlag => "create_feature_flag",
    UpdateFeatureFlag => "update_feature_flag",
    DestroyFeatureFlag => "destroy_feature_flag",
    AdminFeatureFlag => "admin_feature_flag",
    AdminFeatureFlagsUserLists => "admin_feature_flags_user_lists",
    AdminFeatureFlagsClient => "admin_feature_flags_client",

    // Releases.
    ReadRelease => "read_release",
    CreateRelease => "create_release",
    UpdateRelease => "update_release",
    DestroyRelease => "destroy_release",

    // Infrastructure.
    ReadTerraformState => "read_terraform_state",
    AdminTerraformState => "admin_terraform_state",
    ReadPodLogs => "read_pod_logs",
    ReadPrometheus => "read_prometheus",
    ReadCluster => "read_cluster",
    AddCluster => "add_cluster",
    CreateCluster => "create_cluster",
    UpdateCluster => "update_cluster",
    AdminCluster => "admin_cluster",
    AdminProjectGoogleCloud => "admin_project_google_cloud",

    // Container registry.
    ReadContainerImage => "read_container_image",
    CreateContainerImage => "create_container_image",
    UpdateContainerImage => "update_container_image",
    DestroyContainerImage => "destroy_container_image",
    AdminContainerImage => "admin_container_image",

    // Package registry.
    ReadPackage => "read_package",
    CreatePackage => "create_package",
    DestroyPackage => "destroy_package",
    AdminPackage => "admin_package",

    // Wiki.
    ReadWiki => "read_wiki",
    DownloadWikiCode => "download_wiki_code",
    CreateWiki => "create_wiki",
    AdminWiki => "admin_wiki",

    // Security and compliance.
    AccessSecurityAndCompliance => "access_security_and_compliance",
    ReadVulnerability => "read_vulnerability",
    AdminVulnerability => "admin_vulnerability",
    ReadDependency => "read_dependency",
    ReadSecurityResource => "read_security_resource",
    CreateVulnerabilityExport => "create_vulnerability_export",
    ReadVulnerabilityScanner => "read_vulnerability_scanner",
    ReadVulnerabilityFeedback => "read_vulnerability_feedback",
    CreateVulnerabilityFeedback => "create_vulnerability_feedback",
    UpdateVulnerabilityFeedback => "update_vulnerability_feedback",
    DestroyVulnerabilityFeedback => "destroy_vulnerability_feedback",
    ReadSecurityOrchestrationPolicies => "read_security_orchestration_policies",
    ReadSecurityOrchestrationPolicyProject => "read_security_orchestration_policy_project",
    UpdateSecurityOrchestrationPolicyProject => "update_security_orchestration_policy_project",
    ReadGroupSecurityDashboard => "read_group_security_dashboard",
    AdminComplianceFramework => "admin_compliance_framework",

    // Analytics.
    ReadCycleAnalytics => "read_cycle_analytics",
    ReadDora4Analytics => "read_dora4_analytics",

    // Model registry.
    ReadModelRegistry => "read_model_registry",
    WriteModelRegistry => "write_model_registry",

    // Maintainer administration.
    ReadWebHook => "read_web_hook",
    AdminWebHook => "admin_web_hook",
    AdminIntegrations => "admin_integrations",
    ReadRunner => "read_runner",
    CreateRunner => "create_runner",
    UpdateRunner => "update_runner",
    AdminRunner => "admin_runner",
    DestroyRunner => "destroy_runner",
    RegisterProjectRunners => "register_project_runners",
    AdminCicdVariables => "admin_cicd_variables",
    ManageDeployTokens => "manage_deploy_tokens",
    ReadDeployToken => "read_deploy_token",
    CreateDeployToken => "create_deploy_token",
    DestroyDeployToken => "destroy_deploy_token",
    ReadResourceAccessTokens => "read_resource_access_tokens",
    CreateResourceAccessTokens => "create_resource_access_tokens",
    DestroyResourceAccessTokens => "destroy_resource_access_tokens",
    ManageResourceAccessTokens => "manage_resource_access_tokens",
    AdminPushRules => "admin_push_rules",
    ManageMergeRequestSettings => "manage_merge_request_settings",
    EditApprovalRule => "edit_approval_rule",
    ModifyApproversRules => "modify_approvers_rules",
    ModifyMergeRequestAuthorSetting => "modify_merge_request_author_setting",
    ModifyMergeRequestCommitterSetting => "modify_merge_request_committer_setting",

    // CI job token.
    BuildReadProject => "build_read_project",
    BuildDownloadCode => "build_download_code",
    BuildReadContainerImage => "build_read_container_image",
    BuildPushCode => "build_push_code",

    // SaaS integrations.
    ReadRunnerCloudProvisioningInfo => "read_runner_cloud_provisioning_info",
    ProvisionCloudRunner => "provision_cloud_runner",
    ReadGoogleCloudArtifactRegistry => "read_google_cloud_artifact_registry",
    AdminGoogleCloudArtifactRegistry => "admin_google_cloud_artifact_registry",

    // Groups.
    ReadGroup => "read_group",
    ReadGroupMember => "read_group_member",
    AdminGroup => "admin_group",
    RemoveGroup => "remove_group",
    CreateProjects => "create_projects",
    CreateSubgroup => "create_subgroup",
    AdminGroupMember => "admin_group_member",
    UpdateGroupMember => "update_group_member",
    DestroyGroupMember => "destroy_group_member",
    ReadBillableMember => "read_billable_member",
    ReadGroupAuditEvents => "read_group_audit_events",
    ReadGroupRunners => "read_group_runners",
    RegisterGroupRunners => "register_group_runners",
    ReadEpic => "read_epic",
    CreateEpic => "create_epic",
    UpdateEpic => "update_epic",
    AdminEpic => "admin_epic",
    DestroyEpic => "destroy_epic",
    ReadConfidentialEpic => "read_confidential_epic",
    ReadIteration => "read_iteration",
    CreateIteration => "create_iteration",
    AdminIteration => "admin_iteration",
    ReadMemberRole => "read_member_role",
    AdminMemberRole => "admin_member_role",
    ReadCrmContact => "read_crm_contact",

    // Instance.
    ReadLicenses => "read_licenses",
    DestroyLicenses => "destroy_licenses",
    ReadAllResources => "read_all_resources",
    AdminAllResources => "admin_all_resources",
    ManageSubscription => "manage_subscription",
    ViewProductivityAnalytics => "view_productivity_analytics",
    ReadOperationsDashboard => "read_operations_dashboard",
    AccessWorkspacesFeature => "access_workspaces_feature",
    AccessGit => "access_git",
    CreateGroup => "create_group",
    CreateGroupViaApi => "create_group_via_api",
    AccessDuoChat => "access_duo_chat",
    AdminServiceAccounts => "admin_service_accounts",
}

impl Ability {
    /// Returns the category derived from the ability name.
    #[must_use]
    pub fn category(self) -> AbilityCategory {
        let name = self.name();
        CATEGORY_PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map_or(AbilityCategory::Other, |(_, category)| *category)
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SECTION: Serialization
// ============================================================================

impl Serialize for Ability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Ability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown ability: {name}")))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::Ability;
    use super::AbilityCategory;

    #[test]
    fn names_round_trip_and_are_unique() {
        let mut seen = std::collections::BTreeSet::new();
        for ability in Ability::ALL {
            assert_eq!(Ability::from_name(ability.name()), Some(*ability));
            assert!(seen.insert(ability.name()), "duplicate name {}", ability.name());
        }
    }

    #[test]
    fn categories_follow_name_prefixes() {
        assert_eq!(Ability::ReadIssue.category(), AbilityCategory::Read);
        assert_eq!(Ability::CreateEpic.category(), AbilityCategory::Create);
        assert_eq!(Ability::PushCode.category(), AbilityCategory::Update);
        assert_eq!(Ability::BuildPushCode.category(), AbilityCategory::Update);
        assert_eq!(Ability::BuildReadProject.category(), AbilityCategory::Read);
        assert_eq!(Ability::ManageDeployTokens.category(), AbilityCategory::Admin);
        assert_eq!(Ability::RemoveProject.category(), AbilityCategory::Destroy);
        assert_eq!(Ability::GuestAccess.category(), AbilityCategory::Other);
        assert_eq!(Ability::MetricsDashboard.category(), AbilityCategory::Other);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(Ability::from_name("read_everything"), None);
        let parsed: Result<Ability, _> = serde_json::from_str("\"read_everything\"");
        assert!(parsed.is_err());
    }
}
