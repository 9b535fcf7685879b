// crates/ability-logic/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers and fact fixtures for rule tests.
// ============================================================================
//! ## Overview
//! Shared test helpers for Result-based assertions plus a tiny condition
//! domain whose leaves read booleans from a fact table.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::cell::Cell;
use std::error::Error;
use std::fmt;

use ability_logic::ConditionEval;
use serde::Deserialize;
use serde::Serialize;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across rule integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition {
        Ok(())
    } else {
        Err(Box::new(TestError {
            message: message.into(),
        }))
    }
}

// ========================================================================
// Fact Domain
// ========================================================================

/// Leaf conditions used by the tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fact {
    /// Reads fact slot A.
    A,
    /// Reads fact slot B.
    B,
    /// Reads fact slot C.
    C,
    /// Always fails with a lookup error.
    Broken,
}

/// Error raised by the `Broken` fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailed;

/// Fact table with an evaluation counter.
#[derive(Debug, Default)]
pub struct Facts {
    /// Slot values for A, B, C.
    pub values: [bool; 3],
    /// Number of leaf evaluations performed.
    pub evaluations: Cell<usize>,
}

impl Facts {
    /// Builds a fact table from slot values.
    pub fn new(a: bool, b: bool, c: bool) -> Self {
        Self {
            values: [a, b, c],
            evaluations: Cell::new(0),
        }
    }
}

impl ConditionEval for Fact {
    type Error = LookupFailed;
    type Scope<'a> = Facts;

    fn eval_condition(&self, scope: &Facts) -> Result<bool, LookupFailed> {
        scope.evaluations.set(scope.evaluations.get() + 1);
        match self {
            Self::A => Ok(scope.values[0]),
            Self::B => Ok(scope.values[1]),
            Self::C => Ok(scope.values[2]),
            Self::Broken => Err(LookupFailed),
        }
    }
}
