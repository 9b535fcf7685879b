// crates/ability-gate-cli/src/messages.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: User-facing strings for the ability-gate CLI.
// Purpose: Keep output wording in one table with named placeholders.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! Every line the CLI prints comes from [`CATALOG`] through the
//! [`t!`](crate::t) macro. Unknown keys render as the key itself so a missing
//! entry is visible rather than silent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageArg {
    /// Placeholder name without braces.
    pub key: &'static str,
    /// Preformatted value.
    pub value: String,
}

impl MessageArg {
    /// Creates a new message argument.
    #[must_use]
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Message templates keyed by stable identifiers.
const CATALOG: &[(&str, &str)] = &[
    ("main.version", "ability-gate {version}"),
    ("check.allowed", "allowed: {ability} on {resource}"),
    ("check.denied", "denied: {ability} on {resource}"),
    ("ability.unknown", "Unknown ability: {name}"),
    ("decision.failed", "Decision failed: {error}"),
    ("registry.build_failed", "Failed to compile policy tables: {error}"),
    ("registry.not_found", "Ability {name} is not declared by any policy"),
    ("world.read_failed", "Failed to read world fixture at {path}: {error}"),
    ("world.too_large", "World fixture at {path} exceeds {limit} bytes (size {size})"),
    ("world.parse_failed", "Failed to parse world fixture at {path}: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("audit.open_failed", "Failed to open audit sink: {error}"),
    ("output.serialize_failed", "Failed to serialize output: {error}"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
];

/// Returns the catalog as a lookup table.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG_MAP.get_or_init(|| CATALOG.iter().copied().collect())
}

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Renders `key` with `args` substituted into its placeholders.
#[must_use]
pub fn render(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::messages::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::messages::render($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::CATALOG;
    use super::MessageArg;
    use super::render;

    #[test]
    fn placeholders_are_substituted() {
        let message = render("check.allowed", vec![
            MessageArg::new("ability", "push_code"),
            MessageArg::new("resource", "project:10"),
        ]);
        assert_eq!(message, "allowed: push_code on project:10");
    }

    #[test]
    fn unknown_keys_render_as_themselves() {
        assert_eq!(render("missing.key", Vec::new()), "missing.key");
    }

    #[test]
    fn catalog_keys_are_unique() {
        let mut keys: Vec<&str> = CATALOG.iter().map(|(key, _)| *key).collect();
        keys.sort_unstable();
        let before = keys.len();
        keys.dedup();
        assert_eq!(before, keys.len());
    }
}
