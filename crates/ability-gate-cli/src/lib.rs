// crates/ability-gate-cli/src/lib.rs
// ============================================================================
// Module: Ability Gate CLI Library
// Description: Shared helpers for the ability-gate binary.
// Purpose: Expose the message catalog to the binary and its tests.
// Dependencies: crate::messages
// ============================================================================

//! ## Overview
//! The CLI keeps its user-facing strings in [`messages`]; the binary formats
//! them through the [`t!`](crate::t) macro.

pub mod messages;
