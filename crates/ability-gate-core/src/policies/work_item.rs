// crates/ability-gate-core/src/policies/work_item.rs
// ============================================================================
// Module: Work Item Policy
// Description: Rule table for work items in projects and groups.
// Purpose: Apply issue-style rules to work items whose container may be a
//          project or a group.
// Dependencies: crate::{core, runtime, policies::dsl}
// ============================================================================

//! ## Overview
//! Work items follow the issue table, but their container is either a project
//! or a group. Tier checks go through the container, so a group-level work
//! item sees the group roles and a project-level one sees the project roles.

use crate::core::Ability as A;
use crate::core::FeatureFlag;
use crate::core::FlagScope;
use crate::core::LicensedFeature;
use crate::core::ResourceKind;
use crate::policies::dsl::archived;
use crate::policies::dsl::can;
use crate::policies::dsl::confidential;
use crate::policies::dsl::container_can;
use crate::policies::dsl::flag;
use crate::policies::dsl::issue_assignee;
use crate::policies::dsl::issue_author;
use crate::policies::dsl::licensed;
use crate::policies::dsl::read_only;
use crate::policies::dsl::registered;
use crate::policies::mutates_content;
use crate::runtime::PolicyBuilder;
use crate::runtime::PolicyDefinition;
use crate::runtime::RegistryError;

/// Abilities answered by the container.
const DELEGATED: &[A] = &[
    A::GuestAccess,
    A::PlannerAccess,
    A::ReporterAccess,
    A::DeveloperAccess,
    A::MaintainerAccess,
    A::OwnerAccess,
    A::ReadConfidentialIssues,
];

/// Work item changes refused on archived projects.
const ARCHIVED_WRITES: &[A] = &[
    A::UpdateWorkItem,
    A::UpdateIssue,
    A::ReopenIssue,
    A::AdminWorkItem,
    A::CreateNote,
    A::AdminIssueRelation,
];

/// Builds the work item policy.
///
/// # Errors
///
/// Returns [`RegistryError`] when the table is malformed.
pub fn policy() -> Result<PolicyDefinition, RegistryError> {
    let mut policy = PolicyBuilder::new(ResourceKind::WorkItem);
    policy.delegate(DELEGATED);

    let participant = issue_author() | issue_assignee();
    policy
        .rule(
            container_can(A::ReadWorkItem)
                & (!confidential() | can(A::ReadConfidentialIssues) | participant.clone()),
        )
        .enable(&[A::ReadWorkItem]);
    policy.rule(can(A::ReadWorkItem)).enable(&[A::ReadIssue, A::ReadIssueIid]);
    policy
        .rule(can(A::ReadWorkItem) & (can(A::PlannerAccess) | participant))
        .enable(&[A::UpdateWorkItem, A::UpdateIssue]);
    policy
        .rule(can(A::ReadWorkItem) & can(A::ReporterAccess))
        .enable(&[A::ReopenIssue, A::AdminWorkItem, A::ReadInternalNote]);
    policy.rule(can(A::ReadWorkItem) & registered()).enable(&[A::CreateNote]);

    policy.rule(can(A::ReadWorkItem) & can(A::GuestAccess)).enable(&[A::AdminIssueRelation]);
    policy
        .rule(
            can(A::ReadWorkItem)
                & registered()
                & !flag(FeatureFlag::EpicRelationsForNonMembers, FlagScope::RootNamespace),
        )
        .enable(&[A::AdminIssueRelation]);
    policy
        .rule(
            can(A::ReadWorkItem)
                & registered()
                & licensed(LicensedFeature::SummarizeComments)
                & flag(FeatureFlag::SummarizeNotes, FlagScope::RootNamespace),
        )
        .enable(&[A::SummarizeComments]);

    policy.rule(!(container_can(A::ReadProject) | container_can(A::ReadGroup))).prevent_all();
    policy.rule(archived()).prevent(ARCHIVED_WRITES);
    policy.rule(read_only()).prevent_matching(mutates_content);
    policy.build()
}
