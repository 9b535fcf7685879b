// crates/ability-logic/src/rule.rs
// ============================================================================
// Module: Rule Expression Trees
// Description: Boolean algebra over typed condition leaves.
// Purpose: Define `RuleExpr` with short-circuit evaluation, operators, and
// structural analysis helpers.
// Dependencies: serde::{Deserialize, Serialize}, smallvec::SmallVec
// ============================================================================

//! ## Overview
//! A [`RuleExpr`] is the body of a declarative rule such as
//! `developer & ~archived`. The combinators are universal; the
//! [`RuleExpr::Condition`] leaf is where a domain injects meaning through
//! [`ConditionEval`]. Evaluation short-circuits left to right, which keeps
//! expensive leaves (collaborator lookups) behind cheap ones when rule
//! authors order them that way.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ops::BitAnd;
use std::ops::BitOr;
use std::ops::Not;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;
use smallvec::smallvec;

use crate::error::RuleError;
use crate::error::RuleResult;
use crate::trace::NoopTrace;
use crate::trace::RuleTrace;
use crate::traits::ConditionEval;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum nesting depth accepted by [`RuleExpr::validate`].
pub const MAX_RULE_DEPTH: usize = 32;

// ============================================================================
// SECTION: Rule Definition
// ============================================================================

/// Rule expression tree with domain-specific leaves
///
/// # Invariants
/// - Empty `All` is satisfied; empty `Any` is unsatisfied.
/// - `AtLeast { min: 0, .. }` is always satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleExpr<C> {
    /// Every sub-rule must hold; stops at the first failure.
    All(SmallVec<[Box<Self>; 4]>),

    /// At least one sub-rule must hold; stops at the first success.
    Any(SmallVec<[Box<Self>; 4]>),

    /// Inverts the sub-rule.
    Not(Box<Self>),

    /// At least `min` of the sub-rules must hold.
    AtLeast {
        /// Minimum number of sub-rules that must hold
        min: u8,
        /// Candidate sub-rules
        rules: SmallVec<[Box<Self>; 8]>,
    },

    /// Domain condition leaf.
    Condition(C),
}

impl<C> Default for RuleExpr<C> {
    fn default() -> Self {
        Self::All(SmallVec::new())
    }
}

// ============================================================================
// SECTION: Constructors
// ============================================================================

impl<C> RuleExpr<C> {
    /// Creates a rule requiring every sub-rule
    #[must_use]
    pub fn all(rules: Vec<Self>) -> Self {
        Self::All(rules.into_iter().map(Box::new).collect())
    }

    /// Creates a rule requiring any sub-rule
    #[must_use]
    pub fn any(rules: Vec<Self>) -> Self {
        Self::Any(rules.into_iter().map(Box::new).collect())
    }

    /// Creates a rule inverting another rule
    #[must_use]
    pub fn negate(rule: Self) -> Self {
        Self::Not(Box::new(rule))
    }

    /// Creates a rule requiring at least `min` of the sub-rules
    #[must_use]
    pub fn at_least(min: u8, rules: Vec<Self>) -> Self {
        Self::AtLeast {
            min,
            rules: rules.into_iter().map(Box::new).collect(),
        }
    }

    /// Creates a rule from a single condition
    #[must_use]
    pub const fn condition(condition: C) -> Self {
        Self::Condition(condition)
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

impl<C: ConditionEval> RuleExpr<C> {
    /// Evaluates the rule with short-circuiting
    ///
    /// # Errors
    ///
    /// Returns the first condition error encountered.
    pub fn eval(&self, scope: &C::Scope<'_>) -> Result<bool, C::Error> {
        self.eval_with_trace(scope, &mut NoopTrace)
    }

    /// Evaluates the rule and reports each evaluated leaf to `trace`
    ///
    /// # Errors
    ///
    /// Returns the first condition error encountered.
    pub fn eval_with_trace<T>(&self, scope: &C::Scope<'_>, trace: &mut T) -> Result<bool, C::Error>
    where
        T: RuleTrace<C>,
    {
        match self {
            Self::Condition(condition) => {
                let result = condition.eval_condition(scope)?;
                trace.on_condition_evaluated(condition, result);
                Ok(result)
            }
            Self::Not(rule) => Ok(!rule.eval_with_trace(scope, trace)?),
            Self::All(rules) => {
                for rule in rules {
                    if !rule.eval_with_trace(scope, trace)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Any(rules) => {
                for rule in rules {
                    if rule.eval_with_trace(scope, trace)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::AtLeast {
                min,
                rules,
            } => {
                let required = usize::from(*min);
                let mut satisfied = 0usize;
                let mut remaining = rules.len();
                if required == 0 {
                    return Ok(true);
                }
                for rule in rules {
                    if rule.eval_with_trace(scope, trace)? {
                        satisfied += 1;
                        if satisfied >= required {
                            return Ok(true);
                        }
                    }
                    remaining = remaining.saturating_sub(1);
                    if satisfied + remaining < required {
                        return Ok(false);
                    }
                }
                Ok(satisfied >= required)
            }
        }
    }
}

// ============================================================================
// SECTION: Analysis
// ============================================================================

impl<C> RuleExpr<C> {
    /// Returns true when the rule holds regardless of its leaves
    #[must_use]
    pub fn is_trivially_satisfied(&self) -> bool {
        match self {
            Self::All(rules) => rules.iter().all(|rule| rule.is_trivially_satisfied()),
            Self::Any(rules) => rules.iter().any(|rule| rule.is_trivially_satisfied()),
            Self::Not(rule) => rule.is_trivially_unsatisfiable(),
            Self::AtLeast {
                min,
                rules,
            } => {
                let satisfied = rules.iter().filter(|rule| rule.is_trivially_satisfied()).count();
                satisfied >= usize::from(*min)
            }
            Self::Condition(_) => false,
        }
    }

    /// Returns true when the rule can never hold
    #[must_use]
    pub fn is_trivially_unsatisfiable(&self) -> bool {
        match self {
            Self::All(rules) => rules.iter().any(|rule| rule.is_trivially_unsatisfiable()),
            Self::Any(rules) => rules.iter().all(|rule| rule.is_trivially_unsatisfiable()),
            Self::Not(rule) => rule.is_trivially_satisfied(),
            Self::AtLeast {
                min,
                rules,
            } => {
                let possible = rules.iter().filter(|rule| !rule.is_trivially_unsatisfiable()).count();
                possible < usize::from(*min)
            }
            Self::Condition(_) => false,
        }
    }

    /// Counts the nodes in the tree
    #[must_use]
    pub fn complexity(&self) -> usize {
        match self {
            Self::All(rules) | Self::Any(rules) => {
                1 + rules.iter().map(|rule| rule.complexity()).sum::<usize>()
            }
            Self::AtLeast {
                rules, ..
            } => 1 + rules.iter().map(|rule| rule.complexity()).sum::<usize>(),
            Self::Not(rule) => 1 + rule.complexity(),
            Self::Condition(_) => 1,
        }
    }

    /// Returns the nesting depth of the tree (a single leaf has depth 1)
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::All(rules) | Self::Any(rules) => {
                1 + rules.iter().map(|rule| rule.depth()).max().unwrap_or(0)
            }
            Self::AtLeast {
                rules, ..
            } => 1 + rules.iter().map(|rule| rule.depth()).max().unwrap_or(0),
            Self::Not(rule) => 1 + rule.depth(),
            Self::Condition(_) => 1,
        }
    }

    /// Visits every condition leaf in evaluation order
    pub fn for_each_condition<F>(&self, visit: &mut F)
    where
        F: FnMut(&C),
    {
        match self {
            Self::All(rules) | Self::Any(rules) => {
                for rule in rules {
                    rule.for_each_condition(visit);
                }
            }
            Self::AtLeast {
                rules, ..
            } => {
                for rule in rules {
                    rule.for_each_condition(visit);
                }
            }
            Self::Not(rule) => rule.for_each_condition(visit),
            Self::Condition(condition) => visit(condition),
        }
    }

    /// Collects references to every condition leaf in evaluation order
    #[must_use]
    pub fn conditions(&self) -> Vec<&C> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    /// Appends leaf references to `out`
    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a C>) {
        match self {
            Self::All(rules) | Self::Any(rules) => {
                for rule in rules {
                    rule.collect_conditions(out);
                }
            }
            Self::AtLeast {
                rules, ..
            } => {
                for rule in rules {
                    rule.collect_conditions(out);
                }
            }
            Self::Not(rule) => rule.collect_conditions(out),
            Self::Condition(condition) => out.push(condition),
        }
    }

    /// Checks structural limits
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::TooDeep`] when nesting exceeds [`MAX_RULE_DEPTH`]
    /// and [`RuleError::ThresholdUnreachable`] when an `AtLeast` node asks for
    /// more sub-rules than it holds.
    pub fn validate(&self) -> RuleResult<()> {
        let depth = self.depth();
        if depth > MAX_RULE_DEPTH {
            return Err(RuleError::TooDeep {
                max_depth: MAX_RULE_DEPTH,
                actual_depth: depth,
            });
        }
        self.validate_thresholds()
    }

    /// Recursively checks `AtLeast` thresholds
    fn validate_thresholds(&self) -> RuleResult<()> {
        match self {
            Self::All(rules) | Self::Any(rules) => {
                rules.iter().try_for_each(|rule| rule.validate_thresholds())
            }
            Self::AtLeast {
                min,
                rules,
            } => {
                if usize::from(*min) > rules.len() {
                    return Err(RuleError::ThresholdUnreachable {
                        min: *min,
                        available: rules.len(),
                    });
                }
                rules.iter().try_for_each(|rule| rule.validate_thresholds())
            }
            Self::Not(rule) => rule.validate_thresholds(),
            Self::Condition(_) => Ok(()),
        }
    }

    /// Maps every leaf into a different condition type
    #[must_use]
    pub fn map_conditions<D, F>(self, map: &mut F) -> RuleExpr<D>
    where
        F: FnMut(C) -> D,
    {
        match self {
            Self::All(rules) => {
                RuleExpr::All(rules.into_iter().map(|rule| Box::new(rule.map_conditions(map))).collect())
            }
            Self::Any(rules) => {
                RuleExpr::Any(rules.into_iter().map(|rule| Box::new(rule.map_conditions(map))).collect())
            }
            Self::AtLeast {
                min,
                rules,
            } => RuleExpr::AtLeast {
                min,
                rules: rules.into_iter().map(|rule| Box::new(rule.map_conditions(map))).collect(),
            },
            Self::Not(rule) => RuleExpr::Not(Box::new(rule.map_conditions(map))),
            Self::Condition(condition) => RuleExpr::Condition(map(condition)),
        }
    }
}

// ============================================================================
// SECTION: Operators
// ============================================================================

impl<C> BitAnd for RuleExpr<C> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        match self {
            Self::All(mut rules) => {
                rules.push(Box::new(rhs));
                Self::All(rules)
            }
            other => Self::All(smallvec![Box::new(other), Box::new(rhs)]),
        }
    }
}

impl<C> BitOr for RuleExpr<C> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        match self {
            Self::Any(mut rules) => {
                rules.push(Box::new(rhs));
                Self::Any(rules)
            }
            other => Self::Any(smallvec![Box::new(other), Box::new(rhs)]),
        }
    }
}

impl<C> Not for RuleExpr<C> {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

impl<C> From<C> for RuleExpr<C> {
    fn from(condition: C) -> Self {
        Self::Condition(condition)
    }
}
