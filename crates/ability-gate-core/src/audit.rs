// crates/ability-gate-core/src/audit.rs
// ============================================================================
// Module: Decision Audit Logging
// Description: Structured audit events for top-level ability decisions.
// Purpose: Emit JSON-line decision records without a logging framework.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every top-level check a session answers produces one
//! [`PolicyAuditEvent`]. Nested `can` lookups made while evaluating rules are
//! not recorded. Sinks are deliberately small so deployments can route
//! events into whatever pipeline they already run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::Ability;
use crate::core::ActorRef;
use crate::core::ResourceRef;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Decision audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Actor the decision was made for.
    pub actor: ActorRef,
    /// Resource the decision was made on.
    pub resource: ResourceRef,
    /// Ability decided.
    pub ability: Ability,
    /// Final outcome.
    pub allowed: bool,
    /// Answered from the session cache.
    pub cached: bool,
    /// Decision was requested with an explanation.
    pub explained: bool,
}

/// Inputs required to construct an audit event.
pub struct PolicyAuditEventParams {
    /// Actor the decision was made for.
    pub actor: ActorRef,
    /// Resource the decision was made on.
    pub resource: ResourceRef,
    /// Ability decided.
    pub ability: Ability,
    /// Final outcome.
    pub allowed: bool,
    /// Answered from the session cache.
    pub cached: bool,
    /// Decision was requested with an explanation.
    pub explained: bool,
}

impl PolicyAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: PolicyAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "policy_decision",
            timestamp_ms,
            actor: params.actor,
            resource: params.resource,
            ability: params.ability,
            allowed: params.allowed,
            cached: params.cached,
            explained: params.explained,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for decision events.
pub trait PolicyAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &PolicyAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl PolicyAuditSink for StderrAuditSink {
    fn record(&self, event: &PolicyAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// Output file guarded for concurrent writers.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens (or creates) an audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl PolicyAuditSink for FileAuditSink {
    fn record(&self, event: &PolicyAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Recorded events.
    events: Mutex<Vec<PolicyAuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<PolicyAuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl PolicyAuditSink for MemoryAuditSink {
    fn record(&self, event: &PolicyAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl PolicyAuditSink for NoopAuditSink {
    fn record(&self, _event: &PolicyAuditEvent) {}
}
