// crates/ability-gate-core/src/runtime/cache.rs
// ============================================================================
// Module: Session Cache
// Description: Per-session memo tables for decisions and collaborator answers.
// Purpose: Make repeated checks within one request cheap and consistent.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A session answers every question at most once. Decisions are keyed by
//! resource reference and ability, conditions by resource and condition, and
//! collaborator answers by their lookup arguments. The cache lives exactly as
//! long as its session; nothing is shared across requests.
//!
//! Resources are keyed by kind and identifier, so one session must not be
//! given two different snapshots of the same resource.

use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::core::Ability;
use crate::core::AccessLevel;
use crate::core::FeatureFlag;
use crate::core::GroupId;
use crate::core::LicensedFeature;
use crate::core::ResourceRef;
use crate::core::UserId;
use crate::interfaces::FlagTarget;
use crate::runtime::condition::Condition;

/// Hit and miss counters for decision lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Decisions answered from the cache.
    pub hits: u64,
    /// Decisions computed.
    pub misses: u64,
}

/// Memo tables owned by one session.
#[derive(Debug, Default)]
pub struct SessionCache {
    /// Final decisions.
    decisions: HashMap<(ResourceRef, Ability), bool>,
    /// Leaf condition results.
    conditions: HashMap<(ResourceRef, Condition), bool>,
    /// Effective roles.
    roles: HashMap<ResourceRef, AccessLevel>,
    /// Custom role grants.
    grants: HashMap<ResourceRef, BTreeSet<Ability>>,
    /// License answers.
    licenses: HashMap<(LicensedFeature, Option<GroupId>), bool>,
    /// Flag overrides, `None` meaning no override at that target.
    flags: HashMap<(FeatureFlag, FlagTarget), Option<bool>>,
    /// Ban answers.
    bans: HashMap<(UserId, GroupId), bool>,
    /// Decision counters.
    stats: CacheStats,
}

impl SessionCache {
    /// Returns a cached decision and counts the lookup.
    pub fn decision(&mut self, resource: ResourceRef, ability: Ability) -> Option<bool> {
        let hit = self.decisions.get(&(resource, ability)).copied();
        if hit.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        hit
    }

    /// Stores a decision.
    pub fn store_decision(&mut self, resource: ResourceRef, ability: Ability, allowed: bool) {
        self.decisions.insert((resource, ability), allowed);
    }

    /// Returns a cached condition result.
    #[must_use]
    pub fn condition(&self, resource: ResourceRef, condition: Condition) -> Option<bool> {
        self.conditions.get(&(resource, condition)).copied()
    }

    /// Stores a condition result.
    pub fn store_condition(&mut self, resource: ResourceRef, condition: Condition, value: bool) {
        self.conditions.insert((resource, condition), value);
    }

    /// Returns a cached effective role.
    #[must_use]
    pub fn role(&self, resource: ResourceRef) -> Option<AccessLevel> {
        self.roles.get(&resource).copied()
    }

    /// Stores an effective role.
    pub fn store_role(&mut self, resource: ResourceRef, level: AccessLevel) {
        self.roles.insert(resource, level);
    }

    /// Returns cached custom role grants.
    #[must_use]
    pub fn grants(&self, resource: ResourceRef) -> Option<&BTreeSet<Ability>> {
        self.grants.get(&resource)
    }

    /// Stores custom role grants.
    pub fn store_grants(&mut self, resource: ResourceRef, grants: BTreeSet<Ability>) {
        self.grants.insert(resource, grants);
    }

    /// Returns a cached license answer.
    #[must_use]
    pub fn license(&self, feature: LicensedFeature, root: Option<GroupId>) -> Option<bool> {
        self.licenses.get(&(feature, root)).copied()
    }

    /// Stores a license answer.
    pub fn store_license(&mut self, feature: LicensedFeature, root: Option<GroupId>, value: bool) {
        self.licenses.insert((feature, root), value);
    }

    /// Returns a cached flag override lookup.
    #[must_use]
    pub fn flag(&self, flag: FeatureFlag, target: FlagTarget) -> Option<Option<bool>> {
        self.flags.get(&(flag, target)).copied()
    }

    /// Stores a flag override lookup.
    pub fn store_flag(&mut self, flag: FeatureFlag, target: FlagTarget, value: Option<bool>) {
        self.flags.insert((flag, target), value);
    }

    /// Returns a cached ban answer.
    #[must_use]
    pub fn ban(&self, user: UserId, root: GroupId) -> Option<bool> {
        self.bans.get(&(user, root)).copied()
    }

    /// Stores a ban answer.
    pub fn store_ban(&mut self, user: UserId, root: GroupId, value: bool) {
        self.bans.insert((user, root), value);
    }

    /// Returns decision counters.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}
