// crates/ability-logic/tests/proptest_rule_expr.rs
// ============================================================================
// Module: Rule Expression Property Tests
// Description: Algebraic laws checked over random fact assignments.
// ============================================================================
//! ## Overview
//! Property tests for De Morgan duality and threshold equivalences.

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

use ability_logic::convenience::at_least;
use ability_logic::convenience::cond;
use proptest::prelude::*;
use support::Fact;
use support::Facts;

proptest! {
    #[test]
    fn de_morgan_holds(a in any::<bool>(), b in any::<bool>()) {
        let facts = Facts::new(a, b, false);
        let left = !(cond(Fact::A) & cond(Fact::B));
        let right = !cond(Fact::A) | !cond(Fact::B);
        prop_assert_eq!(left.eval(&facts), right.eval(&facts));
    }

    #[test]
    fn at_least_one_matches_any(a in any::<bool>(), b in any::<bool>(), c in any::<bool>()) {
        let facts = Facts::new(a, b, c);
        let group = at_least(1, vec![cond(Fact::A), cond(Fact::B), cond(Fact::C)]);
        let any = cond(Fact::A) | cond(Fact::B) | cond(Fact::C);
        prop_assert_eq!(group.eval(&facts), any.eval(&facts));
    }

    #[test]
    fn at_least_all_matches_all(a in any::<bool>(), b in any::<bool>(), c in any::<bool>()) {
        let facts = Facts::new(a, b, c);
        let group = at_least(3, vec![cond(Fact::A), cond(Fact::B), cond(Fact::C)]);
        let all = cond(Fact::A) & cond(Fact::B) & cond(Fact::C);
        prop_assert_eq!(group.eval(&facts), all.eval(&facts));
    }
}
