// crates/ability-logic/tests/rule_expr.rs
// ============================================================================
// Module: Rule Expression Tests
// Description: Evaluation, operator, and analysis tests for rule trees.
// ============================================================================
//! ## Overview
//! Integration tests for `RuleExpr` evaluation semantics, short-circuiting,
//! error propagation, and structural validation.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use ability_logic::MAX_RULE_DEPTH;
use ability_logic::RuleError;
use ability_logic::RuleExpr;
use ability_logic::convenience::at_least;
use ability_logic::convenience::cond;
use support::Fact;
use support::Facts;
use support::LookupFailed;
use support::TestResult;
use support::ensure;

// ============================================================================
// SECTION: Combinators
// ============================================================================

#[test]
fn and_operator_requires_both_sides() -> TestResult {
    let rule = cond(Fact::A) & cond(Fact::B);
    ensure(rule.eval(&Facts::new(true, true, false)) == Ok(true), "both true")?;
    ensure(rule.eval(&Facts::new(true, false, false)) == Ok(false), "right false")?;
    ensure(rule.eval(&Facts::new(false, true, false)) == Ok(false), "left false")
}

#[test]
fn or_operator_accepts_either_side() -> TestResult {
    let rule = cond(Fact::A) | cond(Fact::B);
    ensure(rule.eval(&Facts::new(false, true, false)) == Ok(true), "right true")?;
    ensure(rule.eval(&Facts::new(false, false, true)) == Ok(false), "neither")
}

#[test]
fn not_operator_inverts_and_collapses_double_negation() -> TestResult {
    let rule = !cond(Fact::A);
    ensure(rule.eval(&Facts::new(false, false, false)) == Ok(true), "inverted")?;
    let double = !!cond(Fact::A);
    ensure(double == cond(Fact::A), "double negation collapses to the leaf")
}

#[test]
fn chained_and_flattens_into_one_node() -> TestResult {
    let rule = cond(Fact::A) & cond(Fact::B) & cond(Fact::C);
    match &rule {
        RuleExpr::All(children) => ensure(children.len() == 3, "three children"),
        other => Err(format!("expected flat All, got {other:?}").into()),
    }
}

#[test]
fn empty_all_holds_and_empty_any_fails() -> TestResult {
    let facts = Facts::new(false, false, false);
    ensure(RuleExpr::<Fact>::all(Vec::new()).eval(&facts) == Ok(true), "empty all")?;
    ensure(RuleExpr::<Fact>::any(Vec::new()).eval(&facts) == Ok(false), "empty any")?;
    ensure(RuleExpr::<Fact>::default().eval(&facts) == Ok(true), "default is empty all")
}

#[test]
fn at_least_counts_satisfied_children() -> TestResult {
    let rule = at_least(2, vec![cond(Fact::A), cond(Fact::B), cond(Fact::C)]);
    ensure(rule.eval(&Facts::new(true, false, true)) == Ok(true), "two of three")?;
    ensure(rule.eval(&Facts::new(true, false, false)) == Ok(false), "one of three")?;
    let zero = at_least(0, vec![cond(Fact::Broken)]);
    ensure(zero.eval(&Facts::default()) == Ok(true), "zero threshold never evaluates leaves")
}

// ============================================================================
// SECTION: Short-Circuiting and Errors
// ============================================================================

#[test]
fn all_stops_at_first_failure() -> TestResult {
    let facts = Facts::new(false, true, true);
    let rule = cond(Fact::A) & cond(Fact::Broken);
    ensure(rule.eval(&facts) == Ok(false), "short-circuits before the broken leaf")?;
    ensure(facts.evaluations.get() == 1, "only one leaf evaluated")
}

#[test]
fn any_stops_at_first_success() -> TestResult {
    let facts = Facts::new(true, false, false);
    let rule = cond(Fact::A) | cond(Fact::Broken);
    ensure(rule.eval(&facts) == Ok(true), "short-circuits before the broken leaf")?;
    ensure(facts.evaluations.get() == 1, "only one leaf evaluated")
}

#[test]
fn at_least_exits_once_threshold_is_unreachable() -> TestResult {
    let facts = Facts::new(false, false, true);
    let rule = at_least(3, vec![cond(Fact::A), cond(Fact::B), cond(Fact::C)]);
    ensure(rule.eval(&facts) == Ok(false), "unreachable")?;
    ensure(facts.evaluations.get() == 1, "stops after the first miss")
}

#[test]
fn condition_errors_propagate_instead_of_denying() -> TestResult {
    let rule = cond(Fact::A) & cond(Fact::Broken);
    ensure(rule.eval(&Facts::new(true, false, false)) == Err(LookupFailed), "error surfaces")?;
    let negated = !cond(Fact::Broken);
    ensure(negated.eval(&Facts::default()) == Err(LookupFailed), "negation keeps the error")
}

// ============================================================================
// SECTION: Analysis
// ============================================================================

#[test]
fn trivial_satisfaction_analysis() -> TestResult {
    let always = RuleExpr::<Fact>::all(Vec::new());
    let never = RuleExpr::<Fact>::any(Vec::new());
    ensure(always.is_trivially_satisfied(), "empty all")?;
    ensure(never.is_trivially_unsatisfiable(), "empty any")?;
    ensure((!never.clone()).is_trivially_satisfied(), "negated never")?;
    ensure(!cond(Fact::A).is_trivially_satisfied(), "leaf is not trivial")?;
    ensure((cond(Fact::A) & never).is_trivially_unsatisfiable(), "and with never")
}

#[test]
fn complexity_and_depth_count_nodes() -> TestResult {
    let rule = cond(Fact::A) & (cond(Fact::B) | !cond(Fact::C));
    ensure(rule.complexity() == 6, format!("complexity was {}", rule.complexity()))?;
    ensure(rule.depth() == 4, format!("depth was {}", rule.depth()))
}

#[test]
fn conditions_are_listed_in_evaluation_order() -> TestResult {
    let rule = cond(Fact::C) | (cond(Fact::A) & cond(Fact::B));
    let listed: Vec<Fact> = rule.conditions().into_iter().copied().collect();
    ensure(listed == vec![Fact::C, Fact::A, Fact::B], format!("listed {listed:?}"))
}

#[test]
fn map_conditions_preserves_shape() -> TestResult {
    let rule = cond(Fact::A) & !cond(Fact::B);
    let mapped: RuleExpr<u8> = rule.map_conditions(&mut |fact| match fact {
        Fact::A => 1,
        Fact::B => 2,
        Fact::C | Fact::Broken => 0,
    });
    ensure(mapped.conditions() == vec![&1, &2], "leaves mapped in order")?;
    ensure(mapped.complexity() == 4, "shape preserved")
}

#[test]
fn validate_rejects_unreachable_threshold() -> TestResult {
    let rule = at_least(3, vec![cond(Fact::A), cond(Fact::B)]);
    ensure(
        rule.validate()
            == Err(RuleError::ThresholdUnreachable {
                min: 3,
                available: 2,
            }),
        "threshold error",
    )
}

#[test]
fn validate_rejects_runaway_nesting() -> TestResult {
    let mut rule = cond(Fact::A);
    for _ in 0..MAX_RULE_DEPTH {
        rule = RuleExpr::negate(RuleExpr::all(vec![rule]));
    }
    match rule.validate() {
        Err(RuleError::TooDeep {
            max_depth, ..
        }) => ensure(max_depth == MAX_RULE_DEPTH, "reports the limit"),
        other => Err(format!("expected TooDeep, got {other:?}").into()),
    }
}

#[test]
fn rules_round_trip_through_json() -> TestResult {
    let rule = cond(Fact::A) & !cond(Fact::B);
    let json = serde_json::to_string(&rule)?;
    let back: RuleExpr<Fact> = serde_json::from_str(&json)?;
    ensure(back == rule, "json round trip")
}
