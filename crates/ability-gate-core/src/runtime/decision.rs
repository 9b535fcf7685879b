// crates/ability-gate-core/src/runtime/decision.rs
// ============================================================================
// Module: Decision Explanations
// Description: Structured record of how a decision was reached.
// Purpose: Explain grants and denials step by step for debugging and audit.
// Dependencies: ability-logic, serde
// ============================================================================

//! ## Overview
//! An explained decision lists every step the engine took at the top level:
//! rules evaluated (with the condition leaves that were actually consulted),
//! delegation to the container, custom role grants, and the job token scope
//! check. Nested `can` lookups appear as single condition entries.

use ability_logic::TraceEntry;
use serde::Serialize;

use crate::core::Ability;
use crate::core::ActorRef;
use crate::core::ResourceKind;
use crate::core::ResourceRef;
use crate::runtime::condition::Condition;
use crate::runtime::registry::RuleEffect;

/// Outcome of one evaluated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    /// Policy the rule belongs to.
    pub policy: ResourceKind,
    /// Rule position in the policy.
    pub index: usize,
    /// Rule effect.
    pub effect: RuleEffect,
    /// Whether the rule held.
    pub matched: bool,
    /// Leaves consulted, in evaluation order.
    pub conditions: Vec<TraceEntry<Condition>>,
}

/// One step of an explained decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum DecisionStep {
    /// The resource's policy does not declare the ability.
    NotDeclared {
        /// Policy consulted.
        policy: ResourceKind,
    },
    /// A rule was evaluated.
    Rule(RuleOutcome),
    /// The ability was answered by the container.
    Delegated {
        /// Container consulted.
        container: ResourceRef,
        /// Container decision.
        allowed: bool,
    },
    /// The custom role overlay was consulted.
    CustomRole {
        /// Whether an active custom role grants the ability.
        granted: bool,
    },
    /// The CI job token scope was checked.
    JobTokenScope {
        /// Whether the job may reach the resource.
        in_scope: bool,
    },
}

impl DecisionStep {
    /// Returns true when this step on its own settled the outcome.
    #[must_use]
    pub const fn is_decisive(&self) -> bool {
        match self {
            Self::NotDeclared {
                ..
            } => true,
            Self::Rule(outcome) => outcome.matched,
            Self::Delegated {
                allowed, ..
            } => *allowed,
            Self::CustomRole {
                granted,
            } => *granted,
            Self::JobTokenScope {
                in_scope,
            } => !*in_scope,
        }
    }
}

/// Explained decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDecision {
    /// Actor the decision was made for.
    pub actor: ActorRef,
    /// Resource the decision was made on.
    pub resource: ResourceRef,
    /// Ability decided.
    pub ability: Ability,
    /// Final outcome.
    pub allowed: bool,
    /// Steps in evaluation order.
    pub steps: Vec<DecisionStep>,
}

impl PolicyDecision {
    /// Returns the last step that settled the outcome, if any.
    #[must_use]
    pub fn decisive_step(&self) -> Option<&DecisionStep> {
        self.steps.iter().rev().find(|step| step.is_decisive())
    }
}
