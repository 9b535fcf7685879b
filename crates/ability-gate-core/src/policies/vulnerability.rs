// crates/ability-gate-core/src/policies/vulnerability.rs
// ============================================================================
// Module: Vulnerability Policy
// Description: Rule table for project vulnerabilities.
// Purpose: Answer vulnerability abilities from the owning project.
// Dependencies: crate::{core, runtime, policies::dsl}
// ============================================================================

//! ## Overview
//! Vulnerabilities hold no roles of their own; their abilities are answered
//! by the project, including custom role grants made there.

use crate::core::Ability as A;
use crate::core::ResourceKind;
use crate::policies::dsl::archived;
use crate::policies::dsl::can;
use crate::policies::dsl::container_can;
use crate::policies::dsl::read_only;
use crate::policies::dsl::registered;
use crate::policies::mutates_content;
use crate::runtime::PolicyBuilder;
use crate::runtime::PolicyDefinition;
use crate::runtime::RegistryError;

/// Builds the vulnerability policy.
///
/// # Errors
///
/// Returns [`RegistryError`] when the table is malformed.
pub fn policy() -> Result<PolicyDefinition, RegistryError> {
    let mut policy = PolicyBuilder::new(ResourceKind::Vulnerability);
    policy.delegate(&[
        A::ReadProject,
        A::ReadVulnerability,
        A::AdminVulnerability,
        A::ReadVulnerabilityFeedback,
        A::CreateVulnerabilityFeedback,
        A::UpdateVulnerabilityFeedback,
        A::DestroyVulnerabilityFeedback,
        A::ReadSecurityResource,
    ]);
    policy.rule(can(A::ReadVulnerability) & registered()).enable(&[A::CreateNote]);

    policy.rule(!container_can(A::ReadProject)).prevent_all();
    policy.rule(archived()).prevent(&[
        A::AdminVulnerability,
        A::CreateVulnerabilityFeedback,
        A::UpdateVulnerabilityFeedback,
        A::DestroyVulnerabilityFeedback,
        A::CreateNote,
    ]);
    policy.rule(read_only()).prevent_matching(mutates_content);
    policy.build()
}
