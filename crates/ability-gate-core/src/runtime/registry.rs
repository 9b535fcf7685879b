// crates/ability-gate-core/src/runtime/registry.rs
// ============================================================================
// Module: Ability Registry
// Description: Compiled policy tables and per-ability metadata.
// Purpose: Build immutable rule tables once, reject malformed tables at
//          startup, and answer metadata queries about abilities.
// Dependencies: ability-logic, serde, thiserror
// ============================================================================

//! ## Overview
//! Each resource kind has one [`PolicyDefinition`]: an ordered list of rules
//! (each rule is a boolean expression plus the abilities it enables or
//! prevents), the abilities delegated to the container, and the custom role
//! overlay table. Definitions are assembled with [`PolicyBuilder`]:
//!
//! ```text
//! policy.rule(reporter() & feature_visible(Builds)).enable(&[ReadBuild]);
//! policy.rule(archived()).prevent(&[PushCode]);
//! policy.rule(banned()).prevent_all();
//! ```
//!
//! Building validates rule structure, rejects `can` references to abilities
//! the policy never declares, and rejects `can` cycles that would recurse
//! forever at evaluation time. The [`AbilityRegistry`] owns every definition
//! and is shared read-only across sessions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;

use ability_logic::RuleError;
use ability_logic::RuleExpr;
use serde::Serialize;
use thiserror::Error;

use crate::core::Ability;
use crate::core::AbilityCategory;
use crate::core::AccessLevel;
use crate::core::CustomPermission;
use crate::core::LicensedFeature;
use crate::core::ResourceKind;
use crate::runtime::condition::Condition;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Rule expression over policy conditions.
pub type PolicyExpr = RuleExpr<Condition>;

/// What a matching rule does to its abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleEffect {
    /// Grants the listed abilities.
    Enable,
    /// Denies the listed abilities, overriding every grant.
    Prevent,
    /// Denies every ability the policy declares.
    PreventAll,
}

/// Compiled policy rule.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyRule {
    /// Position in declaration order.
    pub index: usize,
    /// Rule effect.
    pub effect: RuleEffect,
    /// Rule expression.
    pub expr: PolicyExpr,
    /// Abilities the rule applies to, after expansion.
    pub abilities: Vec<Ability>,
}

/// Custom role permission mapped to the abilities it grants on a resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayGrant {
    /// Permission flag.
    pub permission: CustomPermission,
    /// License the grant additionally requires.
    pub requires: Option<LicensedFeature>,
    /// Granted abilities.
    pub abilities: Vec<Ability>,
}

/// Registry construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A rule expression is structurally invalid.
    #[error("{kind} policy rule {index} is invalid: {source}")]
    InvalidRule {
        /// Policy kind.
        kind: ResourceKind,
        /// Rule position.
        index: usize,
        /// Structural error.
        source: RuleError,
    },
    /// A `can` reference names an ability the policy never declares.
    #[error("{kind} policy rule for {ability} references undeclared ability {referenced}")]
    UnknownReference {
        /// Policy kind.
        kind: ResourceKind,
        /// Ability whose rule holds the reference.
        ability: Ability,
        /// Undeclared ability.
        referenced: Ability,
    },
    /// `can` references form a cycle.
    #[error("{kind} policy has a cyclic ability reference: {}", format_cycle(.cycle))]
    CyclicReference {
        /// Policy kind.
        kind: ResourceKind,
        /// Abilities along the cycle, first repeated last.
        cycle: Vec<Ability>,
    },
    /// Two definitions were supplied for the same kind.
    #[error("duplicate policy for {0}")]
    DuplicatePolicy(ResourceKind),
}

/// Renders a cycle as `a -> b -> a`.
fn format_cycle(cycle: &[Ability]) -> String {
    cycle.iter().map(|ability| ability.name()).collect::<Vec<_>>().join(" -> ")
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Abilities a pending rule applies to.
#[derive(Debug, Clone)]
enum RuleTarget {
    /// Explicit list.
    Abilities(Vec<Ability>),
    /// Every declared ability.
    All,
    /// Every declared ability accepted by the filter.
    Matching(fn(Ability) -> bool),
}

/// Rule awaiting expansion.
#[derive(Debug, Clone)]
struct PendingRule {
    /// Effect.
    effect: RuleEffect,
    /// Expression.
    expr: PolicyExpr,
    /// Target abilities.
    target: RuleTarget,
}

/// Incrementally assembles a [`PolicyDefinition`].
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    /// Kind the policy governs.
    kind: ResourceKind,
    /// Rules in declaration order.
    rules: Vec<PendingRule>,
    /// Abilities answered by the container.
    delegated: BTreeSet<Ability>,
    /// Custom role overlay table.
    overlay: Vec<OverlayGrant>,
}

/// Rule under construction; finish it with an effect.
#[must_use = "a rule does nothing until enable or prevent is called"]
pub struct RuleHandle<'b> {
    /// Owning builder.
    builder: &'b mut PolicyBuilder,
    /// Rule expression.
    expr: PolicyExpr,
}

impl RuleHandle<'_> {
    /// Grants `abilities` when the rule holds.
    pub fn enable(self, abilities: &[Ability]) {
        self.push(RuleEffect::Enable, RuleTarget::Abilities(abilities.to_vec()));
    }

    /// Denies `abilities` when the rule holds.
    pub fn prevent(self, abilities: &[Ability]) {
        self.push(RuleEffect::Prevent, RuleTarget::Abilities(abilities.to_vec()));
    }

    /// Denies every ability of the policy when the rule holds.
    pub fn prevent_all(self) {
        self.push(RuleEffect::PreventAll, RuleTarget::All);
    }

    /// Denies every declared ability accepted by `filter` when the rule holds.
    pub fn prevent_matching(self, filter: fn(Ability) -> bool) {
        self.push(RuleEffect::Prevent, RuleTarget::Matching(filter));
    }

    /// Records the finished rule.
    fn push(self, effect: RuleEffect, target: RuleTarget) {
        self.builder.rules.push(PendingRule {
            effect,
            expr: self.expr,
            target,
        });
    }
}

impl PolicyBuilder {
    /// Starts an empty policy for `kind`.
    #[must_use]
    pub const fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            rules: Vec::new(),
            delegated: BTreeSet::new(),
            overlay: Vec::new(),
        }
    }

    /// Starts a rule guarded by `expr`.
    pub fn rule(&mut self, expr: PolicyExpr) -> RuleHandle<'_> {
        RuleHandle {
            builder: self,
            expr,
        }
    }

    /// Answers `abilities` from the container when no local rule grants them.
    pub fn delegate(&mut self, abilities: &[Ability]) {
        self.delegated.extend(abilities.iter().copied());
    }

    /// Maps a custom role permission to abilities on this kind.
    pub fn overlay(
        &mut self,
        permission: CustomPermission,
        requires: Option<LicensedFeature>,
        abilities: &[Ability],
    ) {
        self.overlay.push(OverlayGrant {
            permission,
            requires,
            abilities: abilities.to_vec(),
        });
    }

    /// Validates and compiles the policy.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a rule is structurally invalid, a `can`
    /// reference names an undeclared ability, or `can` references are cyclic.
    pub fn build(self) -> Result<PolicyDefinition, RegistryError> {
        let kind = self.kind;
        for (index, pending) in self.rules.iter().enumerate() {
            pending.expr.validate().map_err(|source| RegistryError::InvalidRule {
                kind,
                index,
                source,
            })?;
        }

        let mut declared = self.delegated.clone();
        for pending in &self.rules {
            if let RuleTarget::Abilities(abilities) = &pending.target {
                declared.extend(abilities.iter().copied());
            }
        }
        for grant in &self.overlay {
            declared.extend(grant.abilities.iter().copied());
        }

        let mut rules = Vec::with_capacity(self.rules.len());
        let mut enables: HashMap<Ability, Vec<usize>> = HashMap::new();
        let mut prevents: HashMap<Ability, Vec<usize>> = HashMap::new();
        for (index, pending) in self.rules.into_iter().enumerate() {
            let abilities: Vec<Ability> = match pending.target {
                RuleTarget::Abilities(abilities) => abilities,
                RuleTarget::All => declared.iter().copied().collect(),
                RuleTarget::Matching(filter) => {
                    declared.iter().copied().filter(|ability| filter(*ability)).collect()
                }
            };
            let index_map = match pending.effect {
                RuleEffect::Enable => &mut enables,
                RuleEffect::Prevent | RuleEffect::PreventAll => &mut prevents,
            };
            for ability in &abilities {
                index_map.entry(*ability).or_default().push(index);
            }
            rules.push(PolicyRule {
                index,
                effect: pending.effect,
                expr: pending.expr,
                abilities,
            });
        }

        let definition = PolicyDefinition {
            kind,
            rules,
            enables,
            prevents,
            delegated: self.delegated,
            overlay: self.overlay,
            declared,
        };
        definition.check_references()?;
        Ok(definition)
    }
}

// ============================================================================
// SECTION: Policy Definition
// ============================================================================

/// Compiled, immutable policy for one resource kind.
#[derive(Debug, Clone)]
pub struct PolicyDefinition {
    /// Kind the policy governs.
    kind: ResourceKind,
    /// Rules in declaration order.
    rules: Vec<PolicyRule>,
    /// Enable rule indices per ability.
    enables: HashMap<Ability, Vec<usize>>,
    /// Prevent and prevent-all rule indices per ability, in declaration order.
    prevents: HashMap<Ability, Vec<usize>>,
    /// Abilities answered by the container.
    delegated: BTreeSet<Ability>,
    /// Custom role overlay table.
    overlay: Vec<OverlayGrant>,
    /// Every ability this policy can decide.
    declared: BTreeSet<Ability>,
}

impl PolicyDefinition {
    /// Returns the governed kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns every rule in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// Returns true when the policy can decide `ability`.
    #[must_use]
    pub fn declares(&self, ability: Ability) -> bool {
        self.declared.contains(&ability)
    }

    /// Returns every declared ability.
    #[must_use]
    pub const fn declared(&self) -> &BTreeSet<Ability> {
        &self.declared
    }

    /// Returns true when `ability` falls back to the container.
    #[must_use]
    pub fn delegates(&self, ability: Ability) -> bool {
        self.delegated.contains(&ability)
    }

    /// Returns the custom role overlay table.
    #[must_use]
    pub fn overlay(&self) -> &[OverlayGrant] {
        &self.overlay
    }

    /// Returns enable rules for `ability` in declaration order.
    pub fn enable_rules(&self, ability: Ability) -> impl Iterator<Item = &PolicyRule> {
        self.rules_at(self.enables.get(&ability).map(Vec::as_slice))
    }

    /// Returns prevent rules (including prevent-all) for `ability` in
    /// declaration order.
    pub fn prevent_rules(&self, ability: Ability) -> impl Iterator<Item = &PolicyRule> {
        self.rules_at(self.prevents.get(&ability).map(Vec::as_slice))
    }

    /// Resolves an index list into rules.
    fn rules_at<'p>(
        &'p self,
        indices: Option<&'p [usize]>,
    ) -> impl Iterator<Item = &'p PolicyRule> {
        indices.unwrap_or_default().iter().filter_map(|index| self.rules.get(*index))
    }

    /// Returns abilities referenced through `can` by rules for `ability`.
    #[must_use]
    pub fn dependencies(&self, ability: Ability) -> BTreeSet<Ability> {
        let mut out = BTreeSet::new();
        for rule in self.enable_rules(ability).chain(self.prevent_rules(ability)) {
            rule.expr.for_each_condition(&mut |condition: &Condition| {
                if let Condition::Can(referenced) = condition {
                    out.insert(*referenced);
                }
            });
        }
        out
    }

    /// Returns abilities referenced through `container_can` by rules for `ability`.
    #[must_use]
    pub fn container_dependencies(&self, ability: Ability) -> BTreeSet<Ability> {
        let mut out = BTreeSet::new();
        if self.delegates(ability) {
            out.insert(ability);
        }
        for rule in self.enable_rules(ability).chain(self.prevent_rules(ability)) {
            rule.expr.for_each_condition(&mut |condition: &Condition| {
                if let Condition::ContainerCan(referenced) = condition {
                    out.insert(*referenced);
                }
            });
        }
        out
    }

    /// Returns the role floor regular users need for `ability`.
    #[must_use]
    pub fn role_floor(&self, ability: Ability) -> RoleFloor {
        let floors = self.enable_rules(ability).map(|rule| floor_of(&rule.expr));
        let combined = floors.fold(Floor::Never, Floor::either);
        match combined {
            Floor::Never => RoleFloor::ElevatedOnly,
            Floor::Role(level) => RoleFloor::AtLeast(level),
            Floor::Free => RoleFloor::Unbounded,
        }
    }

    /// Rejects undeclared and cyclic `can` references.
    fn check_references(&self) -> Result<(), RegistryError> {
        let mut graph: BTreeMap<Ability, BTreeSet<Ability>> = BTreeMap::new();
        for ability in &self.declared {
            let dependencies = self.dependencies(*ability);
            if let Some(referenced) =
                dependencies.iter().find(|referenced| !self.declared.contains(referenced))
            {
                return Err(RegistryError::UnknownReference {
                    kind: self.kind,
                    ability: *ability,
                    referenced: *referenced,
                });
            }
            graph.insert(*ability, dependencies);
        }

        let mut state: BTreeMap<Ability, Visit> = BTreeMap::new();
        for ability in &self.declared {
            let mut path = Vec::new();
            if let Some(cycle) = find_cycle(*ability, &graph, &mut state, &mut path) {
                return Err(RegistryError::CyclicReference {
                    kind: self.kind,
                    cycle,
                });
            }
        }
        Ok(())
    }
}

/// Depth-first search marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// On the current path.
    Active,
    /// Fully explored.
    Done,
}

/// Returns the first cycle reachable from `node`.
fn find_cycle(
    node: Ability,
    graph: &BTreeMap<Ability, BTreeSet<Ability>>,
    state: &mut BTreeMap<Ability, Visit>,
    path: &mut Vec<Ability>,
) -> Option<Vec<Ability>> {
    match state.get(&node) {
        Some(Visit::Done) => return None,
        Some(Visit::Active) => {
            let start = path.iter().position(|entry| *entry == node).unwrap_or(0);
            let mut cycle = path.get(start ..).map(<[Ability]>::to_vec).unwrap_or_default();
            cycle.push(node);
            return Some(cycle);
        }
        None => {}
    }
    state.insert(node, Visit::Active);
    path.push(node);
    if let Some(edges) = graph.get(&node) {
        for next in edges {
            if let Some(cycle) = find_cycle(*next, graph, state, path) {
                return Some(cycle);
            }
        }
    }
    path.pop();
    state.insert(node, Visit::Done);
    None
}

// ============================================================================
// SECTION: Role Floor Analysis
// ============================================================================

/// Minimum role a regular user needs before any enable rule can hold.
///
/// "Regular" excludes administrators, auditors, bots, deploy credentials,
/// and jobs; those identities satisfy rules through other conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "level", rename_all = "snake_case")]
pub enum RoleFloor {
    /// Every enable rule requires at least this role.
    AtLeast(AccessLevel),
    /// Some enable rule holds without a role requirement.
    Unbounded,
    /// No enable rule can hold for a regular user.
    ElevatedOnly,
}

/// Three-valued floor lattice used while folding expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Floor {
    /// Cannot hold for regular users.
    Never,
    /// Requires at least this role.
    Role(AccessLevel),
    /// Holds without a role requirement.
    Free,
}

impl Floor {
    /// Floor of a disjunction.
    fn either(self, other: Self) -> Self {
        match (self, other) {
            (Self::Free, _) | (_, Self::Free) => Self::Free,
            (Self::Never, floor) | (floor, Self::Never) => floor,
            (Self::Role(left), Self::Role(right)) => Self::Role(left.min(right)),
        }
    }

    /// Floor of a conjunction.
    fn both(self, other: Self) -> Self {
        match (self, other) {
            (Self::Never, _) | (_, Self::Never) => Self::Never,
            (Self::Free, floor) | (floor, Self::Free) => floor,
            (Self::Role(left), Self::Role(right)) => Self::Role(left.max(right)),
        }
    }
}

/// Computes the floor of an expression; negations and thresholds are
/// treated as unconstrained.
fn floor_of(expr: &PolicyExpr) -> Floor {
    match expr {
        RuleExpr::All(rules) => {
            rules.iter().map(|rule| floor_of(rule)).fold(Floor::Free, Floor::both)
        }
        RuleExpr::Any(rules) => {
            rules.iter().map(|rule| floor_of(rule)).fold(Floor::Never, Floor::either)
        }
        RuleExpr::Not(_) | RuleExpr::AtLeast {
            ..
        } => Floor::Free,
        RuleExpr::Condition(condition) => match condition {
            Condition::RoleAtLeast(AccessLevel::NoAccess) => Floor::Free,
            Condition::RoleAtLeast(level) => Floor::Role(*level),
            Condition::Anonymous
            | Condition::Admin
            | Condition::Auditor
            | Condition::Bot(_)
            | Condition::CiJob
            | Condition::CiJobSelfReferential
            | Condition::DeployToken(_)
            | Condition::DeployKey
            | Condition::DeployKeyCanPush => Floor::Never,
            _ => Floor::Free,
        },
    }
}

// ============================================================================
// SECTION: Ability Registry
// ============================================================================

/// Metadata about an ability on one resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityOnKind {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Role floor for regular users.
    pub floor: RoleFloor,
    /// Falls back to the container.
    pub delegated: bool,
    /// Grantable through a custom role permission.
    pub custom_role_grantable: bool,
}

/// Registry metadata for one ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityDefinition {
    /// Ability.
    pub ability: Ability,
    /// Category derived from the name.
    pub category: AbilityCategory,
    /// Kinds whose policy declares the ability.
    pub kinds: Vec<AbilityOnKind>,
    /// Abilities referenced through `can` on any kind.
    pub depends_on: Vec<Ability>,
    /// Abilities referenced through `container_can` or delegation.
    pub container_depends_on: Vec<Ability>,
}

impl AbilityDefinition {
    /// Returns true when the ability applies to `kind`.
    #[must_use]
    pub fn applies_to(&self, kind: ResourceKind) -> bool {
        self.kinds.iter().any(|entry| entry.kind == kind)
    }
}

/// Immutable set of policy definitions, one per resource kind.
#[derive(Debug, Clone, Default)]
pub struct AbilityRegistry {
    /// Definitions by kind.
    policies: BTreeMap<ResourceKind, PolicyDefinition>,
}

impl AbilityRegistry {
    /// Assembles a registry from compiled definitions.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicatePolicy`] when two definitions govern
    /// the same kind.
    pub fn from_policies(
        definitions: impl IntoIterator<Item = PolicyDefinition>,
    ) -> Result<Self, RegistryError> {
        let mut policies = BTreeMap::new();
        for definition in definitions {
            let kind = definition.kind();
            if policies.insert(kind, definition).is_some() {
                return Err(RegistryError::DuplicatePolicy(kind));
            }
        }
        Ok(Self {
            policies,
        })
    }

    /// Returns the definition for `kind`.
    #[must_use]
    pub fn policy(&self, kind: ResourceKind) -> Option<&PolicyDefinition> {
        self.policies.get(&kind)
    }

    /// Returns every definition ordered by kind.
    pub fn policies(&self) -> impl Iterator<Item = &PolicyDefinition> {
        self.policies.values()
    }

    /// Returns true when `ability` is declared for `kind`.
    #[must_use]
    pub fn declares(&self, kind: ResourceKind, ability: Ability) -> bool {
        self.policy(kind).is_some_and(|policy| policy.declares(ability))
    }

    /// Looks up an ability by name; `None` for unknown or undeclared names.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<AbilityDefinition> {
        Ability::from_name(name).and_then(|ability| self.definition(ability))
    }

    /// Returns metadata for `ability`; `None` when no policy declares it.
    #[must_use]
    pub fn definition(&self, ability: Ability) -> Option<AbilityDefinition> {
        let mut kinds = Vec::new();
        let mut depends_on = BTreeSet::new();
        let mut container_depends_on = BTreeSet::new();
        for policy in self.policies.values() {
            if !policy.declares(ability) {
                continue;
            }
            kinds.push(AbilityOnKind {
                kind: policy.kind(),
                floor: policy.role_floor(ability),
                delegated: policy.delegates(ability),
                custom_role_grantable: policy
                    .overlay()
                    .iter()
                    .any(|grant| grant.abilities.contains(&ability)),
            });
            depends_on.extend(policy.dependencies(ability));
            container_depends_on.extend(policy.container_dependencies(ability));
        }
        if kinds.is_empty() {
            return None;
        }
        Some(AbilityDefinition {
            ability,
            category: ability.category(),
            kinds,
            depends_on: depends_on.into_iter().collect(),
            container_depends_on: container_depends_on.into_iter().collect(),
        })
    }

    /// Returns metadata for every declared ability in vocabulary order.
    #[must_use]
    pub fn definitions(&self) -> Vec<AbilityDefinition> {
        Ability::ALL.iter().filter_map(|ability| self.definition(*ability)).collect()
    }
}
