// crates/ability-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Ability Gate Identifiers
// Description: Opaque numeric identifiers for users, projects, groups, and records.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every entity the policy engine reasons about is addressed by a numeric
//! identifier. Identifiers are opaque, serialize as bare numbers, and enforce
//! the non-zero, 1-based invariant at every construction boundary (including
//! deserialization).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Raised when a raw value cannot become an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} must be non-zero")]
pub struct InvalidIdentifier {
    /// Identifier type that rejected the value.
    pub kind: &'static str,
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

macro_rules! numeric_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        ///
        /// # Invariants
        /// - Always >= 1 (non-zero, 1-based).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Creates the identifier from a non-zero value.
            #[must_use]
            pub const fn new(id: NonZeroU64) -> Self {
                Self(id)
            }

            /// Creates the identifier from a raw value (returns `None` if zero).
            #[must_use]
            pub fn from_raw(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map(Self)
            }

            /// Returns the raw identifier value (always >= 1).
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0.get()
            }
        }

        impl TryFrom<u64> for $name {
            type Error = InvalidIdentifier;

            fn try_from(raw: u64) -> Result<Self, Self::Error> {
                Self::from_raw(raw).ok_or(InvalidIdentifier {
                    kind: $label,
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.get().fmt(f)
            }
        }
    };
}

numeric_identifier!(
    /// User account identifier. Bots and service accounts are users too.
    UserId,
    "user id"
);
numeric_identifier!(
    /// Project identifier.
    ProjectId,
    "project id"
);
numeric_identifier!(
    /// Group (namespace) identifier.
    GroupId,
    "group id"
);
numeric_identifier!(
    /// Issue identifier.
    IssueId,
    "issue id"
);
numeric_identifier!(
    /// Work item identifier.
    WorkItemId,
    "work item id"
);
numeric_identifier!(
    /// Vulnerability identifier.
    VulnerabilityId,
    "vulnerability id"
);
numeric_identifier!(
    /// Custom member role identifier.
    MemberRoleId,
    "member role id"
);
numeric_identifier!(
    /// CI job identifier.
    JobId,
    "job id"
);
numeric_identifier!(
    /// Deploy token identifier.
    DeployTokenId,
    "deploy token id"
);
numeric_identifier!(
    /// Deploy key identifier.
    DeployKeyId,
    "deploy key id"
);
