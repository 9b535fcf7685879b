// crates/ability-gate-core/src/runtime/overlay.rs
// ============================================================================
// Module: Custom Role Overlay
// Description: Resolution of custom member role permissions into abilities.
// Purpose: Add licensed, namespace-scoped grants on top of base role rules.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! Custom roles only count when all of the following hold: the root group is
//! licensed for custom roles, the membership carrying the role is active (not
//! a pending invitation), and the role was defined for this root group or for
//! the whole instance. Surviving permission flags are mapped through the
//! resource policy's overlay table; entries that need an extra license are
//! skipped when that license is missing.

use std::collections::BTreeSet;

use crate::core::Ability;
use crate::core::CustomPermission;
use crate::core::LicensedFeature;
use crate::core::Resource;
use crate::runtime::PolicyError;
use crate::runtime::registry::PolicyDefinition;
use crate::runtime::session::PolicySession;

/// Resolves the abilities active custom roles grant on `resource`.
///
/// # Errors
///
/// Returns [`PolicyError::Collaborator`] when a license, membership, or
/// custom role lookup fails.
pub fn resolve_grants(
    session: &PolicySession<'_>,
    policy: &PolicyDefinition,
    resource: Resource<'_>,
) -> Result<BTreeSet<Ability>, PolicyError> {
    let mut grants = BTreeSet::new();
    if policy.overlay().is_empty() {
        return Ok(grants);
    }
    let Some(user) = session.actor().subject_user() else {
        return Ok(grants);
    };
    let root = resource.root_group();
    if root.is_none() || !session.licensed(LicensedFeature::CustomRoles, root)? {
        return Ok(grants);
    }

    let collaborators = session.collaborators();
    let mut permissions: BTreeSet<CustomPermission> = BTreeSet::new();
    for target in resource.membership_chain() {
        let active = collaborators
            .memberships
            .membership(user, target)?
            .is_some_and(|membership| !membership.pending);
        if !active {
            continue;
        }
        for role in collaborators.custom_roles.roles_for(user, target)? {
            if role.applies_to(root) {
                permissions.extend(role.permissions.iter().copied());
            }
        }
    }

    for grant in policy.overlay() {
        if !permissions.contains(&grant.permission) {
            continue;
        }
        if let Some(required) = grant.requires
            && !session.licensed(required, root)?
        {
            continue;
        }
        grants.extend(grant.abilities.iter().copied());
    }
    Ok(grants)
}
