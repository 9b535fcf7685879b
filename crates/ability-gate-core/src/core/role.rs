// crates/ability-gate-core/src/core/role.rs
// ============================================================================
// Module: Access Levels
// Description: Totally ordered membership roles.
// Purpose: Give every role comparison a single, numeric source of truth.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Membership roles form a total order. Rule tables compare against a floor
//! ("reporter or higher") instead of enumerating roles, so ordering must match
//! the numeric access level exactly.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Membership access level.
///
/// # Invariants
/// - Ordering follows the numeric level: `NoAccess < MinimalAccess < Guest <
///   Planner < Reporter < Developer < Maintainer < Owner`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Not a member.
    #[default]
    NoAccess,
    /// Minimal access; membership without content access.
    MinimalAccess,
    /// Guest.
    Guest,
    /// Planner.
    Planner,
    /// Reporter.
    Reporter,
    /// Developer.
    Developer,
    /// Maintainer.
    Maintainer,
    /// Owner.
    Owner,
}

impl AccessLevel {
    /// All levels in ascending order.
    pub const ALL: [Self; 8] = [
        Self::NoAccess,
        Self::MinimalAccess,
        Self::Guest,
        Self::Planner,
        Self::Reporter,
        Self::Developer,
        Self::Maintainer,
        Self::Owner,
    ];

    /// Returns the numeric access level used on the wire by the source system.
    #[must_use]
    pub const fn numeric(self) -> u8 {
        match self {
            Self::NoAccess => 0,
            Self::MinimalAccess => 5,
            Self::Guest => 10,
            Self::Planner => 15,
            Self::Reporter => 20,
            Self::Developer => 30,
            Self::Maintainer => 40,
            Self::Owner => 50,
        }
    }

    /// Maps a numeric access level back to a role.
    #[must_use]
    pub const fn from_numeric(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::NoAccess),
            5 => Some(Self::MinimalAccess),
            10 => Some(Self::Guest),
            15 => Some(Self::Planner),
            20 => Some(Self::Reporter),
            30 => Some(Self::Developer),
            40 => Some(Self::Maintainer),
            50 => Some(Self::Owner),
            _ => None,
        }
    }

    /// Returns the stable snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAccess => "no_access",
            Self::MinimalAccess => "minimal_access",
            Self::Guest => "guest",
            Self::Planner => "planner",
            Self::Reporter => "reporter",
            Self::Developer => "developer",
            Self::Maintainer => "maintainer",
            Self::Owner => "owner",
        }
    }

    /// Returns true when this level meets or exceeds `floor`.
    #[must_use]
    pub fn at_least(self, floor: Self) -> bool {
        self >= floor
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
