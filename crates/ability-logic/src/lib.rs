// crates/ability-logic/src/lib.rs
// ============================================================================
// Module: Ability Logic Root
// Description: Public API surface for declarative rule expressions.
// Purpose: Wire together rule trees, evaluation traits, trace hooks, and errors.
// Dependencies: crate::{error, rule, trace, traits}
// ============================================================================

//! ## Overview
//! `ability-logic` is the domain-agnostic half of the ability engine: a small
//! Boolean algebra ([`RuleExpr`]) whose leaves are evaluated through
//! [`ConditionEval`]. Policy tables in `ability-gate-core` are built from
//! these trees once at startup and interpreted on every request.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod error;
pub mod rule;
pub mod trace;
pub mod traits;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::RuleError;
pub use error::RuleResult;
pub use rule::MAX_RULE_DEPTH;
pub use rule::RuleExpr;
pub use trace::NoopTrace;
pub use trace::RecordingTrace;
pub use trace::RuleTrace;
pub use trace::TraceEntry;
pub use traits::ConditionEval;

// ============================================================================
// SECTION: Convenience DSL
// ============================================================================

/// Convenience functions for creating rules without operators
pub mod convenience {
    use super::RuleExpr;

    /// Creates a rule requiring all of the given rules
    #[must_use]
    pub fn all<C>(rules: Vec<RuleExpr<C>>) -> RuleExpr<C> {
        RuleExpr::all(rules)
    }

    /// Creates a rule requiring any of the given rules
    #[must_use]
    pub fn any<C>(rules: Vec<RuleExpr<C>>) -> RuleExpr<C> {
        RuleExpr::any(rules)
    }

    /// Creates a rule that inverts another rule
    #[must_use]
    pub fn not<C>(rule: RuleExpr<C>) -> RuleExpr<C> {
        RuleExpr::negate(rule)
    }

    /// Creates a rule requiring at least N of the given rules
    #[must_use]
    pub fn at_least<C>(min: u8, rules: Vec<RuleExpr<C>>) -> RuleExpr<C> {
        RuleExpr::at_least(min, rules)
    }

    /// Creates a rule from a condition
    #[must_use]
    pub const fn cond<C>(condition: C) -> RuleExpr<C> {
        RuleExpr::condition(condition)
    }
}
