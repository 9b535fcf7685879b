// crates/ability-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Ability Gate Runtime
// Description: Rule interpretation, decision sessions, and supporting lookups.
// Purpose: Turn compiled policy tables into decisions for one actor at a time.
// Dependencies: ability-logic, crate::{core, interfaces}, serde, thiserror
// ============================================================================

//! ## Overview
//! The runtime interprets [`registry::PolicyDefinition`] tables. A
//! [`PolicySession`] evaluates rules whose leaves are [`Condition`] values,
//! consulting collaborators through an [`EvaluationScope`] and memoizing
//! everything for the lifetime of the request.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cache;
pub mod condition;
pub mod decision;
pub mod flags;
pub mod job_token;
pub mod overlay;
pub mod registry;
pub mod scope;
pub mod session;

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::interfaces::CollaboratorError;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::CacheStats;
pub use condition::Condition;
pub use decision::DecisionStep;
pub use decision::PolicyDecision;
pub use decision::RuleOutcome;
pub use job_token::JobTokenScopeGuard;
pub use registry::AbilityDefinition;
pub use registry::AbilityOnKind;
pub use registry::AbilityRegistry;
pub use registry::OverlayGrant;
pub use registry::PolicyBuilder;
pub use registry::PolicyDefinition;
pub use registry::PolicyExpr;
pub use registry::PolicyRule;
pub use registry::RegistryError;
pub use registry::RoleFloor;
pub use registry::RuleEffect;
pub use scope::EvaluationScope;
pub use session::PolicySession;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Default limit on container hops per decision.
pub const DEFAULT_MAX_DELEGATION_DEPTH: usize = 2;

/// Engine limits and switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineOptions {
    /// Maximum number of container hops a decision may take.
    #[serde(default = "default_max_delegation_depth")]
    pub max_delegation_depth: usize,
    /// Memoize decisions for the session lifetime.
    #[serde(default = "default_cache_decisions")]
    pub cache_decisions: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_delegation_depth: DEFAULT_MAX_DELEGATION_DEPTH,
            cache_decisions: true,
        }
    }
}

/// Serde default for [`EngineOptions::max_delegation_depth`].
const fn default_max_delegation_depth() -> usize {
    DEFAULT_MAX_DELEGATION_DEPTH
}

/// Serde default for [`EngineOptions::cache_decisions`].
const fn default_cache_decisions() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Decision failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A collaborator lookup failed.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    /// A decision needed more container hops than allowed.
    #[error("delegation depth limit of {max} exceeded")]
    DelegationDepthExceeded {
        /// Configured limit.
        max: usize,
    },
    /// An ability name is not part of the vocabulary.
    #[error("unknown ability: {0}")]
    UnknownAbility(String),
}
