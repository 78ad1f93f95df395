// crates/opencpx-http/src/audit.rs
// ============================================================================
// Module: Endpoint Audit Logging
// Description: Structured audit events for posture requests.
// Purpose: Emit one JSON-line record per request without a global logger.
// Dependencies: opencpx-config, serde, serde_json
// ============================================================================

//! ## Overview
//! Every request to the posture endpoint produces exactly one
//! [`CpxAuditEvent`]. Sinks serialize events as JSON lines to stderr or an
//! append-only file; the no-op sink discards them. Provider failure
//! messages appear here and nowhere in the HTTP response.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use opencpx_config::AuditConfig;
use opencpx_config::AuditSinkKind;
use serde::Serialize;

use crate::format::ResponseFormat;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CpxOutcome {
    /// Posture served.
    Ok,
    /// Request rejected or failed.
    Error,
}

/// Posture request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct CpxAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Endpoint path.
    pub path: String,
    /// HTTP method of the request.
    pub method: String,
    /// Resolved response format, when the query was accepted.
    pub format: Option<ResponseFormat>,
    /// HTTP status code returned.
    pub status: u16,
    /// Request outcome.
    pub outcome: CpxOutcome,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Internal failure detail, never sent to clients.
    pub error_message: Option<String>,
}

/// Inputs required to construct an audit event.
pub struct CpxAuditEventParams {
    /// Endpoint path.
    pub path: String,
    /// HTTP method of the request.
    pub method: String,
    /// Resolved response format.
    pub format: Option<ResponseFormat>,
    /// HTTP status code returned.
    pub status: u16,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Internal failure detail.
    pub error_message: Option<String>,
}

impl CpxAuditEvent {
    /// Creates a new audit event stamped with the current time.
    #[must_use]
    pub fn new(params: CpxAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        let outcome = if params.error_kind.is_some() { CpxOutcome::Error } else { CpxOutcome::Ok };
        Self {
            event: "cpx_request",
            timestamp_ms,
            path: params.path,
            method: params.method,
            format: params.format,
            status: params.status,
            outcome,
            response_bytes: params.response_bytes,
            error_kind: params.error_kind,
            error_message: params.error_message,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for posture request events.
pub trait CpxAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &CpxAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct CpxStderrAuditSink;

impl CpxAuditSink for CpxStderrAuditSink {
    fn record(&self, event: &CpxAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct CpxFileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl CpxFileAuditSink {
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

impl CpxAuditSink for CpxFileAuditSink {
    fn record(&self, event: &CpxAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct CpxNoopAuditSink;

impl CpxAuditSink for CpxNoopAuditSink {
    fn record(&self, _event: &CpxAuditEvent) {}
}

/// Builds the sink selected by the audit configuration.
///
/// # Errors
///
/// Returns an error when the file sink cannot open its log, or when the
/// file sink has no path.
pub fn sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn CpxAuditSink>> {
    match config.sink {
        AuditSinkKind::Stderr => Ok(Arc::new(CpxStderrAuditSink)),
        AuditSinkKind::Disabled => Ok(Arc::new(CpxNoopAuditSink)),
        AuditSinkKind::File => {
            let path = config.path.as_deref().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "audit.path is required")
            })?;
            Ok(Arc::new(CpxFileAuditSink::new(Path::new(path.trim()))?))
        }
    }
}
