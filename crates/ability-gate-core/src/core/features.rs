// crates/ability-gate-core/src/core/features.rs
// ============================================================================
// Module: Features, Licenses, Flags, and Settings
// Description: Vocabulary for the non-membership inputs of a decision.
// Purpose: Name toggleable project features, licensed features, feature flags,
//          instance settings, and per-request context.
// Dependencies: ipnetwork, serde
// ============================================================================

//! ## Overview
//! Besides roles, decisions depend on four kinds of switches: per-project
//! feature access levels, license entitlements, feature flags with scoped
//! overrides, and instance-wide settings. This module defines their closed
//! vocabularies so rule tables can only reference switches that exist.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::net::IpAddr;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::GroupId;
use crate::core::role::AccessLevel;

// ============================================================================
// SECTION: Visibility
// ============================================================================

/// Resource visibility.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to members only.
    #[default]
    Private,
    /// Visible to any signed-in, non-external user.
    Internal,
    /// Visible to everyone, including anonymous visitors.
    Public,
}

// ============================================================================
// SECTION: Project Features
// ============================================================================

/// Access level configured for a toggleable feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureAccessLevel {
    /// Feature is off for everyone.
    Disabled,
    /// Feature is visible to members at or above the feature floor.
    Private,
    /// Feature follows the resource's visibility.
    Enabled,
}

/// Toggleable feature of a project (or, for the wiki, a group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectFeature {
    /// Issue tracker.
    Issues,
    /// Wiki.
    Wiki,
    /// Source repository.
    Repository,
    /// Merge requests.
    MergeRequests,
    /// CI builds and pipelines.
    Builds,
    /// Environments and deployments.
    Environments,
    /// Error tracking and alerting.
    Monitor,
    /// Feature flags.
    FeatureFlags,
    /// Releases.
    Releases,
    /// Clusters and infrastructure state.
    Infrastructure,
    /// Container registry.
    ContainerRegistry,
    /// Package registry.
    PackageRegistry,
    /// Security and compliance dashboards.
    SecurityAndCompliance,
    /// Analytics.
    Analytics,
    /// Model registry.
    ModelRegistry,
}

impl ProjectFeature {
    /// All features in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Issues,
        Self::Wiki,
        Self::Repository,
        Self::MergeRequests,
        Self::Builds,
        Self::Environments,
        Self::Monitor,
        Self::FeatureFlags,
        Self::Releases,
        Self::Infrastructure,
        Self::ContainerRegistry,
        Self::PackageRegistry,
        Self::SecurityAndCompliance,
        Self::Analytics,
        Self::ModelRegistry,
    ];

    /// Minimum membership role that sees the feature when it is not public.
    ///
    /// The repository floor drops to guest on non-private resources because
    /// guests of internal and public projects can already read the code.
    #[must_use]
    pub const fn member_floor(self, visibility: Visibility) -> AccessLevel {
        match self {
            Self::Issues | Self::Wiki => AccessLevel::Guest,
            Self::Repository => match visibility {
                Visibility::Private => AccessLevel::Reporter,
                Visibility::Internal | Visibility::Public => AccessLevel::Guest,
            },
            Self::MergeRequests
            | Self::Builds
            | Self::Environments
            | Self::Monitor
            | Self::FeatureFlags
            | Self::Releases
            | Self::Infrastructure
            | Self::ContainerRegistry
            | Self::PackageRegistry
            | Self::SecurityAndCompliance
            | Self::Analytics
            | Self::ModelRegistry => AccessLevel::Reporter,
        }
    }

    /// Access level assumed when a resource does not configure the feature.
    #[must_use]
    pub const fn default_level(self) -> FeatureAccessLevel {
        match self {
            Self::SecurityAndCompliance => FeatureAccessLevel::Private,
            _ => FeatureAccessLevel::Enabled,
        }
    }
}

/// Configured feature levels; unset features fall back to their default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureLevels(BTreeMap<ProjectFeature, FeatureAccessLevel>);

impl FeatureLevels {
    /// Creates an empty set where every feature uses its default level.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the effective level for `feature`.
    #[must_use]
    pub fn level(&self, feature: ProjectFeature) -> FeatureAccessLevel {
        self.0.get(&feature).copied().unwrap_or_else(|| feature.default_level())
    }

    /// Sets the level for `feature`.
    pub fn set(&mut self, feature: ProjectFeature, level: FeatureAccessLevel) {
        self.0.insert(feature, level);
    }

    /// Builder form of [`FeatureLevels::set`].
    #[must_use]
    pub fn with(mut self, feature: ProjectFeature, level: FeatureAccessLevel) -> Self {
        self.set(feature, level);
        self
    }
}

// ============================================================================
// SECTION: Licensed Features
// ============================================================================

/// Feature that requires a paid license entitlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicensedFeature {
    /// Custom member roles.
    CustomRoles,
    /// Security dashboards and vulnerability management.
    SecurityDashboard,
    /// Dependency scanning and the dependency list.
    DependencyScanning,
    /// Security orchestration policies.
    SecurityOrchestrationPolicies,
    /// Compliance frameworks.
    ComplianceFramework,
    /// Push rules.
    PushRules,
    /// Epics.
    Epics,
    /// Iterations.
    Iterations,
    /// DORA metrics.
    Dora4Analytics,
    /// Operations dashboard.
    OperationsDashboard,
    /// Remote development workspaces.
    RemoteDevelopment,
    /// Service accounts.
    ServiceAccounts,
    /// AI chat assistant.
    AiChat,
    /// AI comment summaries.
    SummarizeComments,
}

impl LicensedFeature {
    /// All licensed features in declaration order.
    pub const ALL: [Self; 14] = [
        Self::CustomRoles,
        Self::SecurityDashboard,
        Self::DependencyScanning,
        Self::SecurityOrchestrationPolicies,
        Self::ComplianceFramework,
        Self::PushRules,
        Self::Epics,
        Self::Iterations,
        Self::Dora4Analytics,
        Self::OperationsDashboard,
        Self::RemoteDevelopment,
        Self::ServiceAccounts,
        Self::AiChat,
        Self::SummarizeComments,
    ];
}

// ============================================================================
// SECTION: Feature Flags
// ============================================================================

/// Runtime feature flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFlag {
    /// Allows CI job tokens to push to their own repository.
    AllowPushRepositoryForJobToken,
    /// Lets non-members link issues to epics.
    EpicRelationsForNonMembers,
    /// AI summaries of issue notes.
    SummarizeNotes,
    /// Model registry.
    ModelRegistry,
    /// Google Cloud integrations on SaaS.
    GoogleCloudSupport,
    /// AI chat assistant on SaaS.
    DuoChatOnSaas,
}

impl FeatureFlag {
    /// All flags in declaration order.
    pub const ALL: [Self; 6] = [
        Self::AllowPushRepositoryForJobToken,
        Self::EpicRelationsForNonMembers,
        Self::SummarizeNotes,
        Self::ModelRegistry,
        Self::GoogleCloudSupport,
        Self::DuoChatOnSaas,
    ];

    /// Value used when no override exists at any scope.
    #[must_use]
    pub const fn default_enabled(self) -> bool {
        match self {
            Self::AllowPushRepositoryForJobToken
            | Self::EpicRelationsForNonMembers
            | Self::SummarizeNotes
            | Self::ModelRegistry
            | Self::GoogleCloudSupport => true,
            Self::DuoChatOnSaas => false,
        }
    }

    /// Returns the stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllowPushRepositoryForJobToken => "allow_push_repository_for_job_token",
            Self::EpicRelationsForNonMembers => "epic_relations_for_non_members",
            Self::SummarizeNotes => "summarize_notes",
            Self::ModelRegistry => "model_registry",
            Self::GoogleCloudSupport => "google_cloud_support",
            Self::DuoChatOnSaas => "duo_chat_on_saas",
        }
    }
}

/// Most specific scope a flag lookup starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagScope {
    /// Instance-wide value only.
    Global,
    /// Root namespace override, then instance.
    RootNamespace,
    /// Resource override, then root namespace, then instance.
    Resource,
    /// Acting user override, then instance.
    Actor,
}

// ============================================================================
// SECTION: Instance Settings
// ============================================================================

/// Boolean instance setting consulted by rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceSetting {
    /// Project owners cannot delete projects; only administrators can.
    DefaultProjectDeletionProtection,
    /// Users may create top-level groups.
    TopLevelGroupCreationEnabled,
}

/// Instance-wide configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceSettings {
    /// True when running as the multi-tenant SaaS offering.
    #[serde(default)]
    pub saas: bool,
    /// Only administrators may delete projects.
    #[serde(default)]
    pub default_project_deletion_protection: bool,
    /// Users may create top-level groups.
    #[serde(default = "default_true")]
    pub top_level_group_creation_enabled: bool,
}

impl Default for InstanceSettings {
    fn default() -> Self {
        Self {
            saas: false,
            default_project_deletion_protection: false,
            top_level_group_creation_enabled: true,
        }
    }
}

impl InstanceSettings {
    /// Returns the value of a boolean setting.
    #[must_use]
    pub const fn enabled(&self, setting: InstanceSetting) -> bool {
        match setting {
            InstanceSetting::DefaultProjectDeletionProtection => {
                self.default_project_deletion_protection
            }
            InstanceSetting::TopLevelGroupCreationEnabled => self.top_level_group_creation_enabled,
        }
    }
}

/// Serde default for settings that start enabled.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Facts about the request being authorized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestContext {
    /// Client address, when known.
    #[serde(default)]
    pub ip: Option<IpAddr>,
    /// Root groups with an active single sign-on session.
    #[serde(default)]
    pub sso_sessions: BTreeSet<GroupId>,
}
