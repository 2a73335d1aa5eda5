// crates/cek-core/src/audit.rs
// ============================================================================
// Module: CEK Gateway Audit Logging
// Description: Structured audit events for inbound request handling.
// Purpose: Emit redacted JSON-lines audit logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every gateway call records one [`GatewayAuditEvent`]. Events carry only
//! classification data; signatures, bodies, session attributes, and access
//! tokens are never logged. Deployments route events by choosing a sink.

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

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of a gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Request accepted and returned to the caller.
    Accept,
    /// Request rejected.
    Reject,
}

/// Gateway audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request outcome.
    pub outcome: AuditOutcome,
    /// Normalized error kind label on rejection.
    pub error_kind: Option<&'static str>,
    /// Request discriminator when decoding got that far.
    pub request_type: Option<&'static str>,
    /// Application identifier the gateway expects.
    pub application_id: String,
    /// Whether the signature was checked (false in debug mode).
    pub signature_checked: bool,
    /// Request body size in bytes.
    pub request_bytes: usize,
}

/// Inputs for [`GatewayAuditEvent::new`].
pub struct GatewayAuditEventParams<'a> {
    /// Request outcome.
    pub outcome: AuditOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Request discriminator, if known.
    pub request_type: Option<&'static str>,
    /// Expected application identifier.
    pub application_id: &'a str,
    /// Whether the signature was checked.
    pub signature_checked: bool,
    /// Request body size in bytes.
    pub request_bytes: usize,
}

impl GatewayAuditEvent {
    /// Builds an event stamped with the current time.
    #[must_use]
    pub fn new(params: GatewayAuditEventParams<'_>) -> Self {
        Self {
            event: "cek_request",
            timestamp_ms: now_ms(),
            outcome: params.outcome,
            error_kind: params.error_kind,
            request_type: params.request_type,
            application_id: params.application_id.to_string(),
            signature_checked: params.signature_checked,
            request_bytes: params.request_bytes,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for gateway events.
pub trait GatewayAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &GatewayAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl GatewayAuditSink for StderrAuditSink {
    fn record(&self, event: &GatewayAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl GatewayAuditSink for FileAuditSink {
    fn record(&self, event: &GatewayAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl GatewayAuditSink for NoopAuditSink {
    fn record(&self, _event: &GatewayAuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current wall-clock time in milliseconds since epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|duration| duration.as_millis()).unwrap_or(0)
}
