// crates/ability-gate-core/src/runtime/scope.rs
// ============================================================================
// Module: Evaluation Scope
// Description: The per-rule view of a session, resource, and delegation depth.
// Purpose: Give condition leaves everything they need without exposing the engine.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! An [`EvaluationScope`] pins a session to one resource and one delegation
//! depth. Conditions read facts through it; composite conditions re-enter the
//! engine through [`EvaluationScope::can`] and
//! [`EvaluationScope::container_can`], which enforce the delegation limit.

use crate::core::Ability;
use crate::core::AccessLevel;
use crate::core::Actor;
use crate::core::FeatureFlag;
use crate::core::FlagScope;
use crate::core::InstanceSettings;
use crate::core::LicensedFeature;
use crate::core::RequestContext;
use crate::core::Resource;
use crate::runtime::PolicyError;
use crate::runtime::condition::Condition;
use crate::runtime::session::PolicySession;

/// Session view bound to a resource.
#[derive(Clone, Copy)]
pub struct EvaluationScope<'a> {
    /// Owning session.
    session: &'a PolicySession<'a>,
    /// Resource under evaluation.
    resource: Resource<'a>,
    /// Number of container hops taken to reach `resource`.
    depth: usize,
}

impl<'a> EvaluationScope<'a> {
    /// Creates a scope for `resource` reached after `depth` delegation hops.
    pub(crate) const fn new(
        session: &'a PolicySession<'a>,
        resource: Resource<'a>,
        depth: usize,
    ) -> Self {
        Self {
            session,
            resource,
            depth,
        }
    }

    /// Returns the acting identity.
    #[must_use]
    pub fn actor(&self) -> &'a Actor {
        self.session.actor()
    }

    /// Returns the resource under evaluation.
    #[must_use]
    pub const fn resource(&self) -> Resource<'a> {
        self.resource
    }

    /// Returns the delegation depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns instance settings.
    #[must_use]
    pub fn settings(&self) -> &'a InstanceSettings {
        self.session.settings()
    }

    /// Returns request facts.
    #[must_use]
    pub fn request(&self) -> &'a RequestContext {
        self.session.request()
    }

    /// Returns the actor's effective role on the resource.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Collaborator`] when a membership lookup fails.
    pub fn effective_role(&self) -> Result<AccessLevel, PolicyError> {
        self.session.effective_role(self.resource)
    }

    /// Returns true when `feature` is licensed for the resource's root group.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Collaborator`] when the license lookup fails.
    pub fn licensed(&self, feature: LicensedFeature) -> Result<bool, PolicyError> {
        self.session.licensed(feature, self.resource.root_group())
    }

    /// Resolves a feature flag from `scope` outward.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Collaborator`] when a flag lookup fails.
    pub fn flag_enabled(&self, flag: FeatureFlag, scope: FlagScope) -> Result<bool, PolicyError> {
        self.session.flag_enabled(flag, scope, self.resource)
    }

    /// Returns true when the acting user is banned from the root group.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Collaborator`] when the ban lookup fails.
    pub fn banned(&self) -> Result<bool, PolicyError> {
        let (Some(user), Some(root)) = (self.actor().subject_user(), self.resource.root_group())
        else {
            return Ok(false);
        };
        self.session.banned(user, root)
    }

    /// Evaluates `ability` on the same resource.
    ///
    /// # Errors
    ///
    /// Propagates any error from the nested decision.
    pub fn can(&self, ability: Ability) -> Result<bool, PolicyError> {
        self.session.evaluate_nested(ability, self.resource, self.depth)
    }

    /// Evaluates `ability` on the containing resource; false when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DelegationDepthExceeded`] when the hop would
    /// exceed the configured limit, or any error from the nested decision.
    pub fn container_can(&self, ability: Ability) -> Result<bool, PolicyError> {
        let Some(container) = self.resource.container() else {
            return Ok(false);
        };
        let depth = self.session.delegation_depth(self.depth)?;
        self.session.evaluate_nested(ability, container, depth)
    }

    /// Returns the memoized result of `condition`, computing it once.
    pub(crate) fn memoized<F>(&self, condition: Condition, compute: F) -> Result<bool, PolicyError>
    where
        F: FnOnce() -> Result<bool, PolicyError>,
    {
        self.session.memoized_condition(self.resource, condition, compute)
    }
}
