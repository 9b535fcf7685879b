// crates/ability-gate-core/src/runtime/session.rs
// ============================================================================
// Module: Policy Session
// Description: Request-scoped decision engine with memoization.
// Purpose: Evaluate abilities for one actor against any number of resources.
// Dependencies: ability-logic, crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! A [`PolicySession`] is created per request for a single actor. It borrows
//! the shared [`AbilityRegistry`] and collaborators and owns a memo table, so
//! repeated checks inside the request never re-run a rule or re-query a
//! collaborator.
//!
//! Deciding `ability` on a resource proceeds in a fixed order:
//!
//! 1. If the resource's policy does not declare the ability, deny.
//! 2. If any prevent rule holds, deny. Prevents always win.
//! 3. If any enable rule holds, grant.
//! 4. Otherwise, if the ability is delegated, ask the container.
//! 5. Otherwise, grant if an active custom role maps to the ability.
//! 6. A grant to a CI job is withdrawn when the resource is outside the
//!    job token scope.
//!
//! Sessions use interior mutability for their cache and are therefore not
//! `Sync`; create one per request (or per thread).
//!
//! Security posture: collaborator failures abort the decision with an error;
//! they are never folded into a deny or a grant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::RefCell;
use std::collections::BTreeSet;

use ability_logic::ConditionEval;
use ability_logic::RecordingTrace;

use crate::audit::NoopAuditSink;
use crate::audit::PolicyAuditEvent;
use crate::audit::PolicyAuditEventParams;
use crate::audit::PolicyAuditSink;
use crate::core::Ability;
use crate::core::AccessLevel;
use crate::core::Actor;
use crate::core::CiJobActor;
use crate::core::FeatureFlag;
use crate::core::FlagScope;
use crate::core::GroupId;
use crate::core::InstanceSettings;
use crate::core::LicensedFeature;
use crate::core::RequestContext;
use crate::core::Resource;
use crate::core::UserId;
use crate::interfaces::Collaborators;
use crate::runtime::EngineOptions;
use crate::runtime::PolicyError;
use crate::runtime::cache::CacheStats;
use crate::runtime::cache::SessionCache;
use crate::runtime::condition::Condition;
use crate::runtime::condition::sso_session_required;
use crate::runtime::decision::DecisionStep;
use crate::runtime::decision::PolicyDecision;
use crate::runtime::decision::RuleOutcome;
use crate::runtime::flags::resolution_chain;
use crate::runtime::job_token::JobTokenScopeGuard;
use crate::runtime::overlay::resolve_grants;
use crate::runtime::registry::AbilityRegistry;
use crate::runtime::registry::PolicyDefinition;
use crate::runtime::registry::PolicyRule;
use crate::runtime::scope::EvaluationScope;

/// Sink used when a session is not given one.
static NOOP_AUDIT: NoopAuditSink = NoopAuditSink;

// ============================================================================
// SECTION: Session
// ============================================================================

/// Request-scoped decision engine for one actor.
pub struct PolicySession<'c> {
    /// Compiled policy tables.
    registry: &'c AbilityRegistry,
    /// External lookups.
    collaborators: Collaborators<'c>,
    /// Acting identity.
    actor: Actor,
    /// Instance settings snapshot.
    settings: InstanceSettings,
    /// Request facts.
    request: RequestContext,
    /// Engine limits.
    options: EngineOptions,
    /// Decision audit sink.
    audit: &'c dyn PolicyAuditSink,
    /// Per-session memo tables.
    cache: RefCell<SessionCache>,
}

impl<'c> PolicySession<'c> {
    /// Creates a session for `actor` with default settings and options.
    #[must_use]
    pub fn new(
        registry: &'c AbilityRegistry,
        collaborators: Collaborators<'c>,
        actor: Actor,
    ) -> Self {
        Self {
            registry,
            collaborators,
            actor,
            settings: InstanceSettings::default(),
            request: RequestContext::default(),
            options: EngineOptions::default(),
            audit: &NOOP_AUDIT,
            cache: RefCell::new(SessionCache::default()),
        }
    }

    /// Replaces the instance settings snapshot.
    #[must_use]
    pub fn with_settings(mut self, settings: InstanceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the request facts.
    #[must_use]
    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = request;
        self
    }

    /// Replaces the engine options.
    #[must_use]
    pub const fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Routes top-level decisions to `audit`.
    #[must_use]
    pub fn with_audit(mut self, audit: &'c dyn PolicyAuditSink) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the acting identity.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Returns the shared registry.
    #[must_use]
    pub const fn registry(&self) -> &'c AbilityRegistry {
        self.registry
    }

    /// Returns the collaborators.
    #[must_use]
    pub const fn collaborators(&self) -> Collaborators<'c> {
        self.collaborators
    }

    /// Returns the instance settings snapshot.
    #[must_use]
    pub const fn settings(&self) -> &InstanceSettings {
        &self.settings
    }

    /// Returns the request facts.
    #[must_use]
    pub const fn request(&self) -> &RequestContext {
        &self.request
    }

    /// Returns the engine options.
    #[must_use]
    pub const fn options(&self) -> EngineOptions {
        self.options
    }

    /// Returns decision cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    // ------------------------------------------------------------------------
    // Top-level checks
    // ------------------------------------------------------------------------

    /// Returns true when the actor holds `ability` on `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a collaborator fails or delegation
    /// exceeds the configured depth.
    pub fn allowed(&self, ability: Ability, resource: Resource<'_>) -> Result<bool, PolicyError> {
        let (allowed, cached) = self.decide(ability, resource, 0, None)?;
        self.record_audit(ability, resource, allowed, cached, false);
        Ok(allowed)
    }

    /// Negation of [`PolicySession::allowed`].
    ///
    /// # Errors
    ///
    /// Same as [`PolicySession::allowed`].
    pub fn disallowed(&self, ability: Ability, resource: Resource<'_>) -> Result<bool, PolicyError> {
        self.allowed(ability, resource).map(|allowed| !allowed)
    }

    /// Checks an ability given by name.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownAbility`] for names outside the
    /// vocabulary, otherwise the same errors as [`PolicySession::allowed`].
    pub fn allowed_by_name(&self, name: &str, resource: Resource<'_>) -> Result<bool, PolicyError> {
        let ability =
            Ability::from_name(name).ok_or_else(|| PolicyError::UnknownAbility(name.to_string()))?;
        self.allowed(ability, resource)
    }

    /// Returns every ability the actor holds on `resource`.
    ///
    /// Bulk collection is not audited per ability.
    ///
    /// # Errors
    ///
    /// Same as [`PolicySession::allowed`].
    pub fn collect_abilities(&self, resource: Resource<'_>) -> Result<BTreeSet<Ability>, PolicyError> {
        let Some(policy) = self.registry.policy(resource.kind()) else {
            return Ok(BTreeSet::new());
        };
        let mut granted = BTreeSet::new();
        for ability in policy.declared() {
            if self.decide(*ability, resource, 0, None)?.0 {
                granted.insert(*ability);
            }
        }
        Ok(granted)
    }

    /// Decides `ability` and records every top-level step taken.
    ///
    /// The top-level decision is always recomputed; nested lookups may still
    /// be served from the cache.
    ///
    /// # Errors
    ///
    /// Same as [`PolicySession::allowed`].
    pub fn explain(
        &self,
        ability: Ability,
        resource: Resource<'_>,
    ) -> Result<PolicyDecision, PolicyError> {
        let mut steps = Vec::new();
        let (allowed, _) = self.decide(ability, resource, 0, Some(&mut steps))?;
        self.record_audit(ability, resource, allowed, false, true);
        Ok(PolicyDecision {
            actor: self.actor.reference(),
            resource: resource.reference(),
            ability,
            allowed,
            steps,
        })
    }

    /// Returns the actor's highest active role along the resource's
    /// membership chain.
    ///
    /// Memberships do not count while enforced SSO requires a new session.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Collaborator`] when a membership lookup fails.
    pub fn effective_role(&self, resource: Resource<'_>) -> Result<AccessLevel, PolicyError> {
        let Some(user) = self.actor.subject_user() else {
            return Ok(AccessLevel::NoAccess);
        };
        if sso_session_required(&self.actor, resource, &self.request) {
            return Ok(AccessLevel::NoAccess);
        }
        let key = resource.reference();
        let cached = self.cache.borrow().role(key);
        if let Some(level) = cached {
            return Ok(level);
        }
        let mut level = AccessLevel::NoAccess;
        for target in resource.membership_chain() {
            if let Some(membership) = self.collaborators.memberships.membership(user, target)?
                && !membership.pending
            {
                level = level.max(membership.access_level);
            }
        }
        self.cache.borrow_mut().store_role(key, level);
        Ok(level)
    }

    /// Returns the abilities active custom roles grant on `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Collaborator`] when a lookup fails.
    pub fn custom_role_grants(&self, resource: Resource<'_>) -> Result<BTreeSet<Ability>, PolicyError> {
        match self.registry.policy(resource.kind()) {
            Some(policy) => self.cached_grants(policy, resource),
            None => Ok(BTreeSet::new()),
        }
    }

    /// Evaluates a single leaf condition against `resource`.
    ///
    /// Composite conditions re-enter the engine exactly as they would inside
    /// a rule.
    ///
    /// # Errors
    ///
    /// Same as [`PolicySession::allowed`].
    pub fn condition_holds(
        &self,
        condition: Condition,
        resource: Resource<'_>,
    ) -> Result<bool, PolicyError> {
        condition.eval_condition(&EvaluationScope::new(self, resource, 0))
    }

    // ------------------------------------------------------------------------
    // Engine internals
    // ------------------------------------------------------------------------

    /// Decides `ability`, returning the outcome and whether it was cached.
    fn decide(
        &self,
        ability: Ability,
        resource: Resource<'_>,
        depth: usize,
        steps: Option<&mut Vec<DecisionStep>>,
    ) -> Result<(bool, bool), PolicyError> {
        let kind = resource.kind();
        let Some(policy) = self.registry.policy(kind).filter(|policy| policy.declares(ability))
        else {
            if let Some(steps) = steps {
                steps.push(DecisionStep::NotDeclared {
                    policy: kind,
                });
            }
            return Ok((false, false));
        };
        let key = resource.reference();
        if self.options.cache_decisions && steps.is_none() {
            let cached = self.cache.borrow_mut().decision(key, ability);
            if let Some(allowed) = cached {
                return Ok((allowed, true));
            }
        }
        let allowed = self.compute(policy, ability, resource, depth, steps)?;
        if self.options.cache_decisions {
            self.cache.borrow_mut().store_decision(key, ability, allowed);
        }
        Ok((allowed, false))
    }

    /// Runs the decision pipeline without consulting the decision cache.
    fn compute(
        &self,
        policy: &PolicyDefinition,
        ability: Ability,
        resource: Resource<'_>,
        depth: usize,
        mut steps: Option<&mut Vec<DecisionStep>>,
    ) -> Result<bool, PolicyError> {
        let scope = EvaluationScope::new(self, resource, depth);
        for rule in policy.prevent_rules(ability) {
            if run_rule(policy, rule, &scope, steps.as_deref_mut())? {
                return Ok(false);
            }
        }

        let mut granted = false;
        for rule in policy.enable_rules(ability) {
            if run_rule(policy, rule, &scope, steps.as_deref_mut())? {
                granted = true;
                break;
            }
        }

        if !granted
            && policy.delegates(ability)
            && let Some(container) = resource.container()
        {
            let next = self.delegation_depth(depth)?;
            granted = self.evaluate_nested(ability, container, next)?;
            if let Some(steps) = steps.as_deref_mut() {
                steps.push(DecisionStep::Delegated {
                    container: container.reference(),
                    allowed: granted,
                });
            }
        }

        if !granted && !policy.overlay().is_empty() {
            granted = self.cached_grants(policy, resource)?.contains(&ability);
            if let Some(steps) = steps.as_deref_mut() {
                steps.push(DecisionStep::CustomRole {
                    granted,
                });
            }
        }

        if granted && let Actor::CiJob(job) = &self.actor {
            let in_scope = self.job_in_scope(job, resource)?;
            if let Some(steps) = steps.as_deref_mut() {
                steps.push(DecisionStep::JobTokenScope {
                    in_scope,
                });
            }
            granted = in_scope;
        }
        Ok(granted)
    }

    /// Evaluates a nested `can` lookup.
    pub(crate) fn evaluate_nested(
        &self,
        ability: Ability,
        resource: Resource<'_>,
        depth: usize,
    ) -> Result<bool, PolicyError> {
        self.decide(ability, resource, depth, None).map(|(allowed, _)| allowed)
    }

    /// Returns the depth after one more container hop, or an error past the limit.
    pub(crate) const fn delegation_depth(&self, depth: usize) -> Result<usize, PolicyError> {
        let next = depth + 1;
        if next > self.options.max_delegation_depth {
            return Err(PolicyError::DelegationDepthExceeded {
                max: self.options.max_delegation_depth,
            });
        }
        Ok(next)
    }

    /// Returns the memoized value of a leaf condition.
    pub(crate) fn memoized_condition<F>(
        &self,
        resource: Resource<'_>,
        condition: Condition,
        compute: F,
    ) -> Result<bool, PolicyError>
    where
        F: FnOnce() -> Result<bool, PolicyError>,
    {
        let key = resource.reference();
        let cached = self.cache.borrow().condition(key, condition);
        if let Some(value) = cached {
            return Ok(value);
        }
        let value = compute()?;
        self.cache.borrow_mut().store_condition(key, condition, value);
        Ok(value)
    }

    /// Returns the license answer for `feature` under `root`.
    pub(crate) fn licensed(
        &self,
        feature: LicensedFeature,
        root: Option<GroupId>,
    ) -> Result<bool, PolicyError> {
        let cached = self.cache.borrow().license(feature, root);
        if let Some(value) = cached {
            return Ok(value);
        }
        let value = self.collaborators.licenses.licensed(feature, root)?;
        self.cache.borrow_mut().store_license(feature, root, value);
        Ok(value)
    }

    /// Resolves `flag` from `scope` outward for `resource`.
    pub(crate) fn flag_enabled(
        &self,
        flag: FeatureFlag,
        scope: FlagScope,
        resource: Resource<'_>,
    ) -> Result<bool, PolicyError> {
        for target in resolution_chain(scope, &self.actor, resource) {
            let cached = self.cache.borrow().flag(flag, target);
            let value = match cached {
                Some(value) => value,
                None => {
                    let value = self.collaborators.flags.lookup(flag, target)?;
                    self.cache.borrow_mut().store_flag(flag, target, value);
                    value
                }
            };
            if let Some(enabled) = value {
                return Ok(enabled);
            }
        }
        Ok(flag.default_enabled())
    }

    /// Returns the ban answer for `user` under `root`.
    pub(crate) fn banned(&self, user: UserId, root: GroupId) -> Result<bool, PolicyError> {
        let cached = self.cache.borrow().ban(user, root);
        if let Some(value) = cached {
            return Ok(value);
        }
        let value = self.collaborators.bans.banned(user, root)?;
        self.cache.borrow_mut().store_ban(user, root, value);
        Ok(value)
    }

    /// Returns custom role grants for `resource`, computing them once.
    fn cached_grants(
        &self,
        policy: &PolicyDefinition,
        resource: Resource<'_>,
    ) -> Result<BTreeSet<Ability>, PolicyError> {
        if sso_session_required(&self.actor, resource, &self.request) {
            return Ok(BTreeSet::new());
        }
        let key = resource.reference();
        let cached = self.cache.borrow().grants(key).cloned();
        if let Some(grants) = cached {
            return Ok(grants);
        }
        let grants = resolve_grants(self, policy, resource)?;
        self.cache.borrow_mut().store_grants(key, grants.clone());
        Ok(grants)
    }

    /// Returns true when `job` may reach `resource`.
    fn job_in_scope(&self, job: &CiJobActor, resource: Resource<'_>) -> Result<bool, PolicyError> {
        let Some(project) = resource.project() else {
            return Ok(false);
        };
        Ok(JobTokenScopeGuard::new(self.collaborators.job_tokens).in_scope(job, project)?)
    }

    /// Emits one audit event for a top-level decision.
    fn record_audit(
        &self,
        ability: Ability,
        resource: Resource<'_>,
        allowed: bool,
        cached: bool,
        explained: bool,
    ) {
        self.audit.record(&PolicyAuditEvent::new(PolicyAuditEventParams {
            actor: self.actor.reference(),
            resource: resource.reference(),
            ability,
            allowed,
            cached,
            explained,
        }));
    }
}

impl std::fmt::Debug for PolicySession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicySession")
            .field("actor", &self.actor.reference())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Rule Execution
// ============================================================================

/// Evaluates one rule, recording its trace when explaining.
fn run_rule(
    policy: &PolicyDefinition,
    rule: &PolicyRule,
    scope: &EvaluationScope<'_>,
    steps: Option<&mut Vec<DecisionStep>>,
) -> Result<bool, PolicyError> {
    let Some(steps) = steps else {
        return rule.expr.eval(scope);
    };
    let mut trace = RecordingTrace::new();
    let matched = rule.expr.eval_with_trace(scope, &mut trace)?;
    steps.push(DecisionStep::Rule(RuleOutcome {
        policy: policy.kind(),
        index: rule.index,
        effect: rule.effect,
        matched,
        conditions: trace.into_entries(),
    }));
    Ok(matched)
}
