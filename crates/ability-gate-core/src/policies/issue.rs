// crates/ability-gate-core/src/policies/issue.rs
// ============================================================================
// Module: Issue Policy
// Description: Rule table for project issues.
// Purpose: Narrow project issue abilities by confidentiality and participation.
// Dependencies: crate::{core, runtime, policies::dsl}
// ============================================================================

//! ## Overview
//! An issue never grants more than its project: every rule starts from a
//! project ability through `container_can`. Authors and assignees may read and
//! update confidential issues they participate in.

use crate::core::Ability as A;
use crate::core::BotKind;
use crate::core::FeatureFlag;
use crate::core::FlagScope;
use crate::core::LicensedFeature;
use crate::core::ResourceKind;
use crate::policies::dsl::archived;
use crate::policies::dsl::bot;
use crate::policies::dsl::can;
use crate::policies::dsl::confidential;
use crate::policies::dsl::container_can;
use crate::policies::dsl::flag;
use crate::policies::dsl::issue_assignee;
use crate::policies::dsl::issue_author;
use crate::policies::dsl::licensed;
use crate::policies::dsl::read_only;
use crate::policies::dsl::registered;
use crate::policies::dsl::service_desk_enabled;
use crate::policies::mutates_content;
use crate::runtime::PolicyBuilder;
use crate::runtime::PolicyDefinition;
use crate::runtime::RegistryError;

/// Abilities answered by the project.
const DELEGATED: &[A] = &[
    A::GuestAccess,
    A::PlannerAccess,
    A::ReporterAccess,
    A::DeveloperAccess,
    A::MaintainerAccess,
    A::OwnerAccess,
    A::ReadProject,
    A::ReadConfidentialIssues,
];

/// Issue changes refused on archived projects.
const ARCHIVED_WRITES: &[A] =
    &[A::UpdateIssue, A::ReopenIssue, A::AdminIssue, A::CreateNote, A::AdminIssueRelation];

/// Builds the issue policy.
///
/// # Errors
///
/// Returns [`RegistryError`] when the table is malformed.
pub fn policy() -> Result<PolicyDefinition, RegistryError> {
    let mut policy = PolicyBuilder::new(ResourceKind::Issue);
    policy.delegate(DELEGATED);

    let participant = issue_author() | issue_assignee();
    policy
        .rule(
            container_can(A::ReadIssue)
                & (!confidential() | can(A::ReadConfidentialIssues) | participant.clone()),
        )
        .enable(&[A::ReadIssue]);
    policy.rule(can(A::ReadIssue)).enable(&[A::ReadIssueIid]);
    policy
        .rule(can(A::ReadIssue) & (container_can(A::UpdateIssue) | participant))
        .enable(&[A::UpdateIssue, A::ReopenIssue]);
    policy.rule(can(A::ReadIssue) & container_can(A::AdminIssue)).enable(&[A::AdminIssue]);
    policy.rule(can(A::ReadIssue) & registered()).enable(&[A::CreateNote]);
    policy.rule(can(A::ReadIssue) & can(A::ReporterAccess)).enable(&[A::ReadInternalNote]);

    policy.rule(can(A::ReadIssue) & can(A::GuestAccess)).enable(&[A::AdminIssueRelation]);
    policy
        .rule(
            can(A::ReadIssue)
                & registered()
                & !flag(FeatureFlag::EpicRelationsForNonMembers, FlagScope::RootNamespace),
        )
        .enable(&[A::AdminIssueRelation]);
    policy
        .rule(bot(BotKind::SupportBot) & service_desk_enabled())
        .enable(&[A::AdminIssueRelation]);

    policy
        .rule(
            can(A::ReadIssue)
                & registered()
                & licensed(LicensedFeature::SummarizeComments)
                & flag(FeatureFlag::SummarizeNotes, FlagScope::RootNamespace),
        )
        .enable(&[A::SummarizeComments]);

    policy.rule(!container_can(A::ReadProject)).prevent_all();
    policy.rule(archived()).prevent(ARCHIVED_WRITES);
    policy.rule(read_only()).prevent_matching(mutates_content);
    policy.build()
}
