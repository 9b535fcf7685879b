// crates/ability-gate-core/src/facade.rs
// ============================================================================
// Module: Policy Facades
// Description: Per-resource query objects over a policy session.
// Purpose: Offer `allowed`/`disallowed` checks bound to one resource, plus the
//          resource-specific predicates callers render in the UI.
// Dependencies: crate::{core, runtime}
// ============================================================================

//! ## Overview
//! A facade pairs a [`PolicySession`] with one resource so call sites read as
//! `project.allowed(Ability::PushCode)`. Facades hold no state of their own;
//! every check goes through the session and shares its memo tables.
//!
//! Typed facades ([`ProjectPolicy`], [`GroupPolicy`], ...) dereference to
//! [`ResourcePolicy`] and add predicates that only make sense for their kind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::ops::Deref;

use crate::core::Ability;
use crate::core::AccessLevel;
use crate::core::GroupSnapshot;
use crate::core::IssueSnapshot;
use crate::core::ProjectSnapshot;
use crate::core::Resource;
use crate::core::Visibility;
use crate::core::VulnerabilitySnapshot;
use crate::core::WorkItemSnapshot;
use crate::runtime::Condition;
use crate::runtime::PolicyDecision;
use crate::runtime::PolicyError;
use crate::runtime::PolicySession;

// ============================================================================
// SECTION: Resource Policy
// ============================================================================

/// Session checks bound to one resource.
#[derive(Debug, Clone, Copy)]
pub struct ResourcePolicy<'s, 'c> {
    /// Session answering the checks.
    session: &'s PolicySession<'c>,
    /// Resource the checks are about.
    resource: Resource<'s>,
}

impl<'s, 'c> ResourcePolicy<'s, 'c> {
    /// Binds `session` to `resource`.
    #[must_use]
    pub const fn new(session: &'s PolicySession<'c>, resource: Resource<'s>) -> Self {
        Self {
            session,
            resource,
        }
    }

    /// Returns the bound resource.
    #[must_use]
    pub const fn resource(&self) -> Resource<'s> {
        self.resource
    }

    /// Returns the underlying session.
    #[must_use]
    pub const fn session(&self) -> &'s PolicySession<'c> {
        self.session
    }

    /// Returns true when the actor holds `ability`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a collaborator fails.
    pub fn allowed(&self, ability: Ability) -> Result<bool, PolicyError> {
        self.session.allowed(ability, self.resource)
    }

    /// Returns true when the actor lacks `ability`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a collaborator fails.
    pub fn disallowed(&self, ability: Ability) -> Result<bool, PolicyError> {
        self.session.disallowed(ability, self.resource)
    }

    /// Checks an ability by name.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownAbility`] for names outside the
    /// vocabulary.
    pub fn allowed_by_name(&self, name: &str) -> Result<bool, PolicyError> {
        self.session.allowed_by_name(name, self.resource)
    }

    /// Returns every ability the actor holds.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a collaborator fails.
    pub fn collect_abilities(&self) -> Result<BTreeSet<Ability>, PolicyError> {
        self.session.collect_abilities(self.resource)
    }

    /// Explains the decision for `ability`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a collaborator fails.
    pub fn explain(&self, ability: Ability) -> Result<PolicyDecision, PolicyError> {
        self.session.explain(ability, self.resource)
    }

    /// Returns the actor's effective role.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a membership lookup fails.
    pub fn effective_role(&self) -> Result<AccessLevel, PolicyError> {
        self.session.effective_role(self.resource)
    }

    /// Returns abilities granted through custom roles.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a lookup fails.
    pub fn custom_role_grants(&self) -> Result<BTreeSet<Ability>, PolicyError> {
        self.session.custom_role_grants(self.resource)
    }

    /// Evaluates one condition against the bound resource.
    fn holds(&self, condition: Condition) -> Result<bool, PolicyError> {
        self.session.condition_holds(condition, self.resource)
    }
}

// ============================================================================
// SECTION: Typed Facades
// ============================================================================

/// Declares a facade bound to one snapshot type.
macro_rules! resource_facade {
    ($(#[$meta:meta])* $name:ident, $snapshot:ty, $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'s, 'c> {
            /// Shared checks.
            inner: ResourcePolicy<'s, 'c>,
        }

        impl<'s, 'c> $name<'s, 'c> {
            /// Binds `session` to `snapshot`.
            #[must_use]
            pub const fn new(session: &'s PolicySession<'c>, snapshot: &'s $snapshot) -> Self {
                Self {
                    inner: ResourcePolicy::new(session, Resource::$variant(snapshot)),
                }
            }
        }

        impl<'s, 'c> Deref for $name<'s, 'c> {
            type Target = ResourcePolicy<'s, 'c>;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }
    };
}

resource_facade!(
    /// Checks against a project.
    ProjectPolicy,
    ProjectSnapshot,
    Project
);
resource_facade!(
    /// Checks against a group.
    GroupPolicy,
    GroupSnapshot,
    Group
);
resource_facade!(
    /// Checks against a project issue.
    IssuePolicy,
    IssueSnapshot,
    Issue
);
resource_facade!(
    /// Checks against a work item.
    WorkItemPolicy,
    WorkItemSnapshot,
    WorkItem
);
resource_facade!(
    /// Checks against a vulnerability.
    VulnerabilityPolicy,
    VulnerabilitySnapshot,
    Vulnerability
);

/// Predicates shared by projects and groups.
macro_rules! namespace_predicates {
    ($name:ident) => {
        impl $name<'_, '_> {
            /// Returns false when enforced SSO requires the actor to sign in
            /// again.
            ///
            /// # Errors
            ///
            /// Returns [`PolicyError`] when a lookup fails.
            pub fn sso_session_valid(&self) -> Result<bool, PolicyError> {
                self.holds(Condition::NeedsNewSsoSession).map(|needs| !needs)
            }

            /// Returns false when the request address is outside the root
            /// group's allowlist.
            ///
            /// Active administrators and auditors are never blocked.
            ///
            /// # Errors
            ///
            /// Returns [`PolicyError`] when a lookup fails.
            pub fn ip_allowed(&self) -> Result<bool, PolicyError> {
                let actor = self.session.actor();
                if actor.is_admin() || actor.is_auditor() {
                    return Ok(true);
                }
                self.holds(Condition::IpEnforcementPreventsAccess).map(|blocked| !blocked)
            }

            /// Returns the visibility level.
            #[must_use]
            pub fn visibility(&self) -> Option<Visibility> {
                self.resource().visibility()
            }
        }
    };
}

namespace_predicates!(ProjectPolicy);
namespace_predicates!(GroupPolicy);

/// Checks against the instance.
#[derive(Debug, Clone, Copy)]
pub struct GlobalPolicy<'s, 'c> {
    /// Shared checks.
    inner: ResourcePolicy<'s, 'c>,
}

impl<'s, 'c> GlobalPolicy<'s, 'c> {
    /// Binds `session` to the instance.
    #[must_use]
    pub const fn new(session: &'s PolicySession<'c>) -> Self {
        Self {
            inner: ResourcePolicy::new(session, Resource::Global),
        }
    }
}

impl<'s, 'c> Deref for GlobalPolicy<'s, 'c> {
    type Target = ResourcePolicy<'s, 'c>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
