// crates/ability-logic/src/trace.rs
// ============================================================================
// Module: Rule Trace Hooks
// Description: Observation hooks fired as rule leaves are evaluated.
// Purpose: Support decision explanations without slowing the fast path.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Trace hooks observe each leaf evaluation in the order the evaluator visits
//! them. Short-circuited leaves are never reported, so a recorded trace is the
//! exact set of facts that determined the outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Trace Hook
// ============================================================================

/// Trace hook for rule evaluation
pub trait RuleTrace<C> {
    /// Called whenever a condition leaf is evaluated
    fn on_condition_evaluated(&mut self, condition: &C, result: bool);
}

/// No-op trace hook for fast paths
///
/// # Invariants
/// - Zero-sized marker type; carries no state.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrace;

impl<C> RuleTrace<C> for NoopTrace {
    fn on_condition_evaluated(&mut self, _condition: &C, _result: bool) {}
}

// ============================================================================
// SECTION: Recording Trace
// ============================================================================

/// One observed leaf evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry<C> {
    /// Condition that was evaluated
    pub condition: C,
    /// Result of the evaluation
    pub result: bool,
}

/// Trace hook that records every evaluated leaf in visit order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingTrace<C> {
    /// Entries in evaluation order
    entries: Vec<TraceEntry<C>>,
}

impl<C> Default for RecordingTrace<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C> RecordingTrace<C> {
    /// Creates an empty recording trace
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the recorded entries
    #[must_use]
    pub fn entries(&self) -> &[TraceEntry<C>] {
        &self.entries
    }

    /// Consumes the trace and returns its entries
    #[must_use]
    pub fn into_entries(self) -> Vec<TraceEntry<C>> {
        self.entries
    }

    /// Returns true when nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Clone> RuleTrace<C> for RecordingTrace<C> {
    fn on_condition_evaluated(&mut self, condition: &C, result: bool) {
        self.entries.push(TraceEntry {
            condition: condition.clone(),
            result,
        });
    }
}
