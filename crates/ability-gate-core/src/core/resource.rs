// crates/ability-gate-core/src/core/resource.rs
// ============================================================================
// Module: Resources
// Description: Snapshots of the subjects abilities are checked against.
// Purpose: Capture everything rules read about a resource at request start.
// Dependencies: ipnetwork, serde
// ============================================================================

//! ## Overview
//! Resources are immutable snapshots: a project, a group, an issue, a work
//! item, a vulnerability, or the instance itself (`Global`). Snapshots carry
//! their containment chain so the engine can delegate to the container and
//! walk inherited memberships without calling back into storage.
//!
//! The borrowed [`Resource`] view is what the engine evaluates against; the
//! owned [`ResourceSnapshot`] is the serializable form used by fixtures.
//! Accessors return `None` where a resource has no such aspect (a personal
//! project has no root group, the instance has no namespace) and conditions
//! treat `None` as false.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use ipnetwork::IpNetwork;
use serde::Deserialize;
use serde::Serialize;

use crate::core::features::FeatureLevels;
use crate::core::features::Visibility;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::IssueId;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::UserId;
use crate::core::identifiers::VulnerabilityId;
use crate::core::identifiers::WorkItemId;

// ============================================================================
// SECTION: Namespace
// ============================================================================

/// Single sign-on configuration of a root group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SsoSettings {
    /// SAML single sign-on is configured.
    #[serde(default)]
    pub enabled: bool,
    /// Members must hold an active SSO session to access content.
    #[serde(default)]
    pub enforced: bool,
}

/// Namespace facts shared by everything inside a group hierarchy.
///
/// # Invariants
/// - `ancestors` is ordered nearest first; the last entry is the root group.
/// - An empty `ancestors` list means a personal namespace (no root group),
///   except for a group's own namespace where the group itself is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceSnapshot {
    /// Enclosing groups, nearest first.
    #[serde(default)]
    pub ancestors: Vec<GroupId>,
    /// Namespace is read-only (storage limit exceeded or similar).
    #[serde(default)]
    pub read_only: bool,
    /// Root group SSO configuration.
    #[serde(default)]
    pub sso: SsoSettings,
    /// Root group IP allowlist; empty means unrestricted.
    #[serde(default)]
    pub ip_restrictions: Vec<IpNetwork>,
}

impl NamespaceSnapshot {
    /// Returns the outermost enclosing group, if any.
    #[must_use]
    pub fn root(&self) -> Option<GroupId> {
        self.ancestors.last().copied()
    }
}

// ============================================================================
// SECTION: Project
// ============================================================================

/// Who may cancel pipelines and jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiCancellationRestriction {
    /// Developers and above.
    #[default]
    Developer,
    /// Maintainers and above.
    Maintainer,
    /// Nobody.
    NoOne,
}

/// Project settings consulted by rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSettings {
    /// Minimum role allowed to cancel pipelines.
    #[serde(default)]
    pub ci_cancellation: CiCancellationRestriction,
    /// Only allowlisted projects may reach this project with job tokens.
    #[serde(default = "default_true")]
    pub inbound_job_token_scope_enabled: bool,
    /// Jobs from this project may push to its repository with their token.
    #[serde(default)]
    pub push_repository_for_job_token_allowed: bool,
    /// Service desk accepts issues by email.
    #[serde(default)]
    pub service_desk_enabled: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            ci_cancellation: CiCancellationRestriction::Developer,
            inbound_job_token_scope_enabled: true,
            push_repository_for_job_token_allowed: false,
            service_desk_enabled: false,
        }
    }
}

/// Serde default for settings that start enabled.
const fn default_true() -> bool {
    true
}

/// Project snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSnapshot {
    /// Project identifier.
    pub id: ProjectId,
    /// Project visibility.
    #[serde(default)]
    pub visibility: Visibility,
    /// Enclosing namespace; empty ancestors for personal projects.
    #[serde(default)]
    pub namespace: NamespaceSnapshot,
    /// Feature access levels.
    #[serde(default)]
    pub features: FeatureLevels,
    /// Archived projects are read-only for content changes.
    #[serde(default)]
    pub archived: bool,
    /// Hidden projects serve no repository content.
    #[serde(default)]
    pub hidden: bool,
    /// Project settings.
    #[serde(default)]
    pub settings: ProjectSettings,
}

impl ProjectSnapshot {
    /// Creates a private project with default features in a personal namespace.
    #[must_use]
    pub fn new(id: ProjectId) -> Self {
        Self {
            id,
            visibility: Visibility::Private,
            namespace: NamespaceSnapshot::default(),
            features: FeatureLevels::new(),
            archived: false,
            hidden: false,
            settings: ProjectSettings::default(),
        }
    }
}

// ============================================================================
// SECTION: Group
// ============================================================================

/// Group snapshot.
///
/// # Invariants
/// - `namespace.ancestors` lists parent groups only; the group itself is
///   never included. A top-level group has no ancestors and is its own root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSnapshot {
    /// Group identifier.
    pub id: GroupId,
    /// Group visibility.
    #[serde(default)]
    pub visibility: Visibility,
    /// Parent chain and root group settings.
    #[serde(default)]
    pub namespace: NamespaceSnapshot,
    /// Group-level feature access levels (wiki).
    #[serde(default)]
    pub features: FeatureLevels,
}

impl GroupSnapshot {
    /// Creates a private top-level group.
    #[must_use]
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            visibility: Visibility::Private,
            namespace: NamespaceSnapshot::default(),
            features: FeatureLevels::new(),
        }
    }

    /// Returns the root group of this hierarchy.
    #[must_use]
    pub fn root(&self) -> GroupId {
        self.namespace.root().unwrap_or(self.id)
    }

    /// Returns true when the group has a parent.
    #[must_use]
    pub const fn has_parent(&self) -> bool {
        !self.namespace.ancestors.is_empty()
    }
}

// ============================================================================
// SECTION: Issues, Work Items, Vulnerabilities
// ============================================================================

/// Issue snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssueSnapshot {
    /// Issue identifier.
    pub id: IssueId,
    /// Containing project.
    pub project: ProjectSnapshot,
    /// Author, if the account still exists.
    #[serde(default)]
    pub author: Option<UserId>,
    /// Assigned users.
    #[serde(default)]
    pub assignees: Vec<UserId>,
    /// Confidential issues are hidden from guests.
    #[serde(default)]
    pub confidential: bool,
}

/// Work item container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "snapshot", rename_all = "snake_case")]
pub enum WorkItemContainer {
    /// Project-level work item.
    Project(ProjectSnapshot),
    /// Group-level work item.
    Group(GroupSnapshot),
}

/// Work item type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemType {
    /// Issue.
    #[default]
    Issue,
    /// Task.
    Task,
    /// Incident.
    Incident,
    /// Epic.
    Epic,
}

/// Work item snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkItemSnapshot {
    /// Work item identifier.
    pub id: WorkItemId,
    /// Containing project or group.
    pub container: WorkItemContainer,
    /// Work item type.
    #[serde(default)]
    pub work_item_type: WorkItemType,
    /// Author, if the account still exists.
    #[serde(default)]
    pub author: Option<UserId>,
    /// Assigned users.
    #[serde(default)]
    pub assignees: Vec<UserId>,
    /// Confidential work items are hidden from guests.
    #[serde(default)]
    pub confidential: bool,
}

/// Vulnerability snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VulnerabilitySnapshot {
    /// Vulnerability identifier.
    pub id: VulnerabilityId,
    /// Project the finding belongs to.
    pub project: ProjectSnapshot,
}

// ============================================================================
// SECTION: Resource Kinds
// ============================================================================

/// Resource category; each kind has exactly one policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// The instance itself.
    Global,
    /// Project.
    Project,
    /// Group.
    Group,
    /// Issue.
    Issue,
    /// Work item.
    WorkItem,
    /// Vulnerability.
    Vulnerability,
}

impl ResourceKind {
    /// All kinds in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Global,
        Self::Project,
        Self::Group,
        Self::Issue,
        Self::WorkItem,
        Self::Vulnerability,
    ];

    /// Returns the stable snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Project => "project",
            Self::Group => "group",
            Self::Issue => "issue",
            Self::WorkItem => "work_item",
            Self::Vulnerability => "vulnerability",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable resource reference: kind plus identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Identifier; absent for the instance.
    pub id: Option<u64>,
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}:{id}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Entity a membership can be held on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MembershipTarget {
    /// Direct project membership.
    Project(ProjectId),
    /// Group membership, inherited by everything below the group.
    Group(GroupId),
}

// ============================================================================
// SECTION: Resource View
// ============================================================================

/// Borrowed view of the resource under evaluation.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// The instance itself.
    Global,
    /// Project.
    Project(&'a ProjectSnapshot),
    /// Group.
    Group(&'a GroupSnapshot),
    /// Issue.
    Issue(&'a IssueSnapshot),
    /// Work item.
    WorkItem(&'a WorkItemSnapshot),
    /// Vulnerability.
    Vulnerability(&'a VulnerabilitySnapshot),
}

impl<'a> Resource<'a> {
    /// Returns the resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match *self {
            Self::Global => ResourceKind::Global,
            Self::Project(_) => ResourceKind::Project,
            Self::Group(_) => ResourceKind::Group,
            Self::Issue(_) => ResourceKind::Issue,
            Self::WorkItem(_) => ResourceKind::WorkItem,
            Self::Vulnerability(_) => ResourceKind::Vulnerability,
        }
    }

    /// Returns the serializable reference.
    #[must_use]
    pub const fn reference(&self) -> ResourceRef {
        let id = match *self {
            Self::Global => None,
            Self::Project(project) => Some(project.id.get()),
            Self::Group(group) => Some(group.id.get()),
            Self::Issue(issue) => Some(issue.id.get()),
            Self::WorkItem(item) => Some(item.id.get()),
            Self::Vulnerability(vulnerability) => Some(vulnerability.id.get()),
        };
        ResourceRef {
            kind: self.kind(),
            id,
        }
    }

    /// Returns the immediate container abilities may be delegated to.
    #[must_use]
    pub const fn container(&self) -> Option<Self> {
        match *self {
            Self::Global | Self::Project(_) | Self::Group(_) => None,
            Self::Issue(issue) => Some(Self::Project(&issue.project)),
            Self::WorkItem(item) => match &item.container {
                WorkItemContainer::Project(project) => Some(Self::Project(project)),
                WorkItemContainer::Group(group) => Some(Self::Group(group)),
            },
            Self::Vulnerability(vulnerability) => Some(Self::Project(&vulnerability.project)),
        }
    }

    /// Returns the project this resource lives in, if any.
    #[must_use]
    pub const fn project(&self) -> Option<&'a ProjectSnapshot> {
        match *self {
            Self::Project(project) => Some(project),
            Self::Issue(issue) => Some(&issue.project),
            Self::WorkItem(item) => match &item.container {
                WorkItemContainer::Project(project) => Some(project),
                WorkItemContainer::Group(_) => None,
            },
            Self::Vulnerability(vulnerability) => Some(&vulnerability.project),
            Self::Global | Self::Group(_) => None,
        }
    }

    /// Returns the group this resource is, or directly lives in as a work item.
    #[must_use]
    pub const fn group(&self) -> Option<&'a GroupSnapshot> {
        match *self {
            Self::Group(group) => Some(group),
            Self::WorkItem(item) => match &item.container {
                WorkItemContainer::Group(group) => Some(group),
                WorkItemContainer::Project(_) => None,
            },
            _ => None,
        }
    }

    /// Returns the namespace snapshot governing this resource.
    #[must_use]
    pub fn namespace(&self) -> Option<&'a NamespaceSnapshot> {
        self.project()
            .map(|project| &project.namespace)
            .or_else(|| self.group().map(|group| &group.namespace))
    }

    /// Returns the root group, or `None` for personal namespaces and the instance.
    #[must_use]
    pub fn root_group(&self) -> Option<GroupId> {
        match self.project() {
            Some(project) => project.namespace.root(),
            None => self.group().map(GroupSnapshot::root),
        }
    }

    /// Returns the visibility governing public access to this resource.
    #[must_use]
    pub fn visibility(&self) -> Option<Visibility> {
        self.project()
            .map(|project| project.visibility)
            .or_else(|| self.group().map(|group| group.visibility))
    }

    /// Returns the feature levels governing this resource.
    #[must_use]
    pub fn features(&self) -> Option<&'a FeatureLevels> {
        self.project()
            .map(|project| &project.features)
            .or_else(|| self.group().map(|group| &group.features))
    }

    /// Returns membership targets whose roles apply here, nearest first.
    #[must_use]
    pub fn membership_chain(&self) -> Vec<MembershipTarget> {
        if let Some(project) = self.project() {
            let mut chain = Vec::with_capacity(project.namespace.ancestors.len() + 1);
            chain.push(MembershipTarget::Project(project.id));
            chain.extend(project.namespace.ancestors.iter().copied().map(MembershipTarget::Group));
            return chain;
        }
        if let Some(group) = self.group() {
            let mut chain = Vec::with_capacity(group.namespace.ancestors.len() + 1);
            chain.push(MembershipTarget::Group(group.id));
            chain.extend(group.namespace.ancestors.iter().copied().map(MembershipTarget::Group));
            return chain;
        }
        Vec::new()
    }

    /// Returns the author and assignees of an issue-like resource.
    #[must_use]
    pub fn participants(&self) -> Option<(Option<UserId>, &'a [UserId])> {
        match *self {
            Self::Issue(issue) => Some((issue.author, issue.assignees.as_slice())),
            Self::WorkItem(item) => Some((item.author, item.assignees.as_slice())),
            _ => None,
        }
    }

    /// Returns true for confidential issue-like resources.
    #[must_use]
    pub const fn confidential(&self) -> bool {
        match *self {
            Self::Issue(issue) => issue.confidential,
            Self::WorkItem(item) => item.confidential,
            _ => false,
        }
    }
}

// ============================================================================
// SECTION: Owned Snapshots
// ============================================================================

/// Owned, serializable resource snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceSnapshot {
    /// The instance itself.
    Global,
    /// Project.
    Project(ProjectSnapshot),
    /// Group.
    Group(GroupSnapshot),
    /// Issue.
    Issue(IssueSnapshot),
    /// Work item.
    WorkItem(WorkItemSnapshot),
    /// Vulnerability.
    Vulnerability(VulnerabilitySnapshot),
}

impl ResourceSnapshot {
    /// Borrows the snapshot as an evaluation view.
    #[must_use]
    pub const fn as_resource(&self) -> Resource<'_> {
        match self {
            Self::Global => Resource::Global,
            Self::Project(project) => Resource::Project(project),
            Self::Group(group) => Resource::Group(group),
            Self::Issue(issue) => Resource::Issue(issue),
            Self::WorkItem(item) => Resource::WorkItem(item),
            Self::Vulnerability(vulnerability) => Resource::Vulnerability(vulnerability),
        }
    }
}
