// crates/ability-gate-core/src/core/custom_role.rs
// ============================================================================
// Module: Custom Member Roles
// Description: Administrator-defined roles that add named abilities to a base role.
// Purpose: Describe custom role definitions independently of how they are stored.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A custom member role layers extra permission flags on top of a base
//! access level. Flags are coarse ("read vulnerabilities", "manage deploy
//! tokens"); each resource policy maps a flag to the concrete abilities it
//! grants. A role defined for one root group never applies inside another.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::GroupId;
use crate::core::identifiers::MemberRoleId;
use crate::core::role::AccessLevel;

/// Permission flag a custom role can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomPermission {
    /// Read repository code.
    ReadCode,
    /// Read vulnerabilities and security reports.
    ReadVulnerability,
    /// Triage and resolve vulnerabilities.
    AdminVulnerability,
    /// Read the dependency list.
    ReadDependency,
    /// Approve and administer merge requests.
    AdminMergeRequest,
    /// Manage infrastructure state files.
    AdminTerraformState,
    /// Manage runners.
    AdminRunners,
    /// Manage CI/CD variables.
    AdminCicdVariables,
    /// Manage push rules.
    AdminPushRules,
    /// Manage integrations.
    AdminIntegrations,
    /// Manage web hooks.
    AdminWebHook,
    /// Manage deploy tokens.
    ManageDeployTokens,
    /// Manage project access tokens.
    ManageProjectAccessTokens,
    /// Manage group access tokens.
    ManageGroupAccessTokens,
    /// Manage merge request settings.
    ManageMergeRequestSettings,
    /// Apply compliance frameworks.
    AdminComplianceFramework,
    /// Link security policy projects.
    ManageSecurityPolicyLink,
    /// Archive projects.
    ArchiveProject,
    /// Delete projects.
    RemoveProject,
    /// Delete subgroups.
    RemoveGroup,
    /// Manage group members.
    AdminGroupMember,
    /// Read customer relations contacts.
    ReadCrmContact,
}

/// Custom member role definition.
///
/// # Invariants
/// - `namespace` of `None` means an instance-wide role usable in any root group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberRole {
    /// Role identifier.
    pub id: MemberRoleId,
    /// Display name.
    pub name: String,
    /// Root group the role belongs to, or `None` for instance-wide roles.
    #[serde(default)]
    pub namespace: Option<GroupId>,
    /// Base role the custom role extends.
    pub base_access_level: AccessLevel,
    /// Enabled permission flags.
    #[serde(default)]
    pub permissions: BTreeSet<CustomPermission>,
}

impl MemberRole {
    /// Returns true when the role may be used inside `root`.
    #[must_use]
    pub fn applies_to(&self, root: Option<GroupId>) -> bool {
        self.namespace.is_none_or(|namespace| Some(namespace) == root)
    }
}
