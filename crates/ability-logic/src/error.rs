// crates/ability-logic/src/error.rs
// ============================================================================
// Module: Rule Error Definitions
// Description: Structural diagnostics for rule expression trees.
// Purpose: Reject malformed rule trees before they are installed.
// Dependencies: serde::{Serialize, Deserialize}, std::fmt
// ============================================================================

//! ## Overview
//! Rule trees are built once at startup. Structural problems (impossible
//! thresholds, runaway nesting) are reported here so they surface when the
//! rule table is assembled rather than during a request.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Errors detected while validating a rule expression tree
///
/// # Invariants
/// - None. Variants capture structural validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleError {
    /// An `AtLeast` node requires more children than it has
    ThresholdUnreachable {
        /// Minimum number of children that must hold
        min: u8,
        /// Number of children available
        available: usize,
    },

    /// Rule tree nesting exceeds the supported depth
    TooDeep {
        /// Maximum allowed nesting depth
        max_depth: usize,
        /// Depth encountered while validating
        actual_depth: usize,
    },
}

// ============================================================================
// SECTION: Display Implementation
// ============================================================================

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThresholdUnreachable {
                min,
                available,
            } => {
                write!(f, "threshold of {min} cannot be met by {available} sub-rules")
            }
            Self::TooDeep {
                max_depth,
                actual_depth,
            } => {
                write!(f, "rule nesting depth {actual_depth} exceeds maximum {max_depth}")
            }
        }
    }
}

impl std::error::Error for RuleError {}

/// Result alias for rule validation
pub type RuleResult<T> = Result<T, RuleError>;
