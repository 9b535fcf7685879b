// crates/ability-gate-core/src/runtime/job_token.rs
// ============================================================================
// Module: CI Job Token Scope
// Description: Reachability check for job tokens across projects.
// Purpose: Restrict what a CI job may touch, independent of its user's roles.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A job token always reaches the project its job runs in. Reaching any other
//! project requires both ends to agree:
//!
//! - inbound: the target has its allowlist disabled, or lists the origin
//!   project or a group containing it;
//! - outbound: the origin has its outbound scope disabled, or lists the target.
//!
//! Only projects (and resources inside them) are reachable; groups and the
//! instance are always out of scope for job tokens.

use crate::core::CiJobActor;
use crate::core::ProjectSnapshot;
use crate::interfaces::CollaboratorError;
use crate::interfaces::JobTokenScopeStore;
use crate::interfaces::JobTokenSource;

/// Job token reachability check backed by an allowlist store.
pub struct JobTokenScopeGuard<'a> {
    /// Allowlist store.
    store: &'a dyn JobTokenScopeStore,
}

impl<'a> JobTokenScopeGuard<'a> {
    /// Creates a guard over `store`.
    #[must_use]
    pub const fn new(store: &'a dyn JobTokenScopeStore) -> Self {
        Self {
            store,
        }
    }

    /// Returns true when `job` may reach `target`.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError::JobTokenScope`] when an allowlist lookup fails.
    pub fn in_scope(
        &self,
        job: &CiJobActor,
        target: &ProjectSnapshot,
    ) -> Result<bool, CollaboratorError> {
        if job.origin == target.id {
            return Ok(true);
        }
        Ok(self.inbound_allows(job, target)? && self.outbound_allows(job, target)?)
    }

    /// Target-side allowlist check.
    fn inbound_allows(
        &self,
        job: &CiJobActor,
        target: &ProjectSnapshot,
    ) -> Result<bool, CollaboratorError> {
        if !target.settings.inbound_job_token_scope_enabled {
            return Ok(true);
        }
        let allowlist = self.store.inbound_allowlist(target.id)?;
        Ok(allowlist.iter().any(|source| match source {
            JobTokenSource::Project(project) => *project == job.origin,
            JobTokenSource::Group(group) => job.origin_namespace.contains(group),
        }))
    }

    /// Origin-side allowlist check.
    fn outbound_allows(
        &self,
        job: &CiJobActor,
        target: &ProjectSnapshot,
    ) -> Result<bool, CollaboratorError> {
        if !job.outbound_scope_enabled {
            return Ok(true);
        }
        Ok(self.store.outbound_allowlist(job.origin)?.contains(&target.id))
    }
}
