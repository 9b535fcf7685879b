// crates/ability-logic/src/traits.rs
// ============================================================================
// Module: Rule Evaluation Traits
// Description: Contracts binding rule leaves to a domain evaluation scope.
// Purpose: Let rule trees stay domain-agnostic while leaves consult live state.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Rule trees only know how to combine boolean results. The [`ConditionEval`]
//! trait is the seam where a domain supplies the meaning of a leaf condition
//! and the scope it is evaluated against.

// ============================================================================
// SECTION: Condition Trait
// ============================================================================

/// Core trait for evaluating a single leaf condition
///
/// Conditions evaluate against a domain scope that bundles whatever state the
/// leaf needs (actor, subject, collaborators). Evaluation is fallible because
/// leaves may consult external collaborators; errors propagate out of the rule
/// tree unchanged and are never folded into `false`.
pub trait ConditionEval {
    /// Domain scope the condition is evaluated against
    type Scope<'a>;

    /// Error raised when the condition cannot be determined
    type Error;

    /// Evaluates the condition within the provided scope
    ///
    /// # Errors
    ///
    /// Returns the domain error when a collaborator backing the condition fails.
    fn eval_condition(&self, scope: &Self::Scope<'_>) -> Result<bool, Self::Error>;
}
