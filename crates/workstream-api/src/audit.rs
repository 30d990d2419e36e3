// workstream-api/src/audit.rs
// ============================================================================
// Module: API Audit Logging
// Description: Structured audit events for companies API request handling.
// Purpose: Emit one JSON line per handled request without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the request audit payload and its sinks. Events carry
//! request metadata only: method, route, status, caller subject, and byte
//! counts. Request bodies and bearer tokens are never logged.

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

/// Classified request outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiOutcome {
    /// Request succeeded.
    Ok,
    /// Referenced company does not exist.
    NotFound,
    /// Attribute validation failed.
    Invalid,
    /// Request body or headers were malformed or oversized.
    BadRequest,
    /// Header validation failed.
    Unauthenticated,
    /// Store or serialization failure.
    Error,
}

/// API audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ApiAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method.
    pub method: String,
    /// Route template.
    pub route: &'static str,
    /// Raw company id path segment when present.
    pub company_id: Option<String>,
    /// HTTP status code returned.
    pub status: u16,
    /// Request outcome.
    pub outcome: ApiOutcome,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
    /// Authenticated caller subject.
    pub subject: Option<String>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

/// Inputs required to construct an audit event.
pub struct ApiAuditEventParams {
    /// HTTP method.
    pub method: String,
    /// Route template.
    pub route: &'static str,
    /// Raw company id path segment when present.
    pub company_id: Option<String>,
    /// HTTP status code returned.
    pub status: u16,
    /// Request outcome.
    pub outcome: ApiOutcome,
    /// Peer IP address if known.
    pub peer_ip: Option<String>,
    /// Authenticated caller subject.
    pub subject: Option<String>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

impl ApiAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ApiAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "api_request",
            timestamp_ms,
            method: params.method,
            route: params.route,
            company_id: params.company_id,
            status: params.status,
            outcome: params.outcome,
            peer_ip: params.peer_ip,
            subject: params.subject,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for API request events.
pub trait ApiAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &ApiAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct ApiStderrAuditSink;

impl ApiAuditSink for ApiStderrAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct ApiFileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl ApiFileAuditSink {
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

impl ApiAuditSink for ApiFileAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct ApiNoopAuditSink;

impl ApiAuditSink for ApiNoopAuditSink {
    fn record(&self, _event: &ApiAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
