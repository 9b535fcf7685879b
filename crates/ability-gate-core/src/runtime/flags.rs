// crates/ability-gate-core/src/runtime/flags.rs
// ============================================================================
// Module: Feature Flag Resolution
// Description: Most-specific-wins lookup order for scoped flag overrides.
// Purpose: Decide which override targets a flag check consults, and in what order.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A flag check names the narrowest scope it cares about. Resolution walks
//! from that scope outward (resource, root namespace, instance) and the first
//! explicit override wins. With no override anywhere the flag's built-in
//! default applies.

use crate::core::Actor;
use crate::core::FlagScope;
use crate::core::Resource;
use crate::interfaces::FlagTarget;

/// Returns override targets for `scope`, most specific first.
#[must_use]
pub fn resolution_chain(scope: FlagScope, actor: &Actor, resource: Resource<'_>) -> Vec<FlagTarget> {
    let mut chain = Vec::with_capacity(3);
    match scope {
        FlagScope::Global => {}
        FlagScope::Actor => {
            if let Some(user) = actor.subject_user() {
                chain.push(FlagTarget::User(user));
            }
        }
        FlagScope::RootNamespace => {
            if let Some(root) = resource.root_group() {
                chain.push(FlagTarget::Group(root));
            }
        }
        FlagScope::Resource => {
            if let Some(project) = resource.project() {
                chain.push(FlagTarget::Project(project.id));
            } else if let Some(group) = resource.group() {
                chain.push(FlagTarget::Group(group.id));
            }
            if let Some(root) = resource.root_group() {
                let target = FlagTarget::Group(root);
                if !chain.contains(&target) {
                    chain.push(target);
                }
            }
        }
    }
    chain.push(FlagTarget::Instance);
    chain
}
