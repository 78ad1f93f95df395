// crates/opencpx-http/src/endpoint.rs
// ============================================================================
// Module: Posture Endpoint
// Description: Axum route serving the posture document.
// Purpose: Map provider results onto HTTP responses and audit records.
// Dependencies: axum, opencpx-config, opencpx-core, serde, thiserror, tokio
// ============================================================================

//! ## Overview
//! [`CpxEndpoint`] mounts a single `GET` route (default `/cpx`). Each request
//! calls the provider, renders the posture, and returns it with
//! `X-CPX-Version: v1`. Provider and rendering failures collapse into a fixed
//! `500 {"error": "Internal server error"}` body. Other methods get `405`.
//! The provider runs on the blocking pool, so slow or panicking providers
//! never stall or tear down the async workers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::ALLOW;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::any;
use opencpx_config::RESERVED_PATH_CHARS;
use opencpx_core::EncodedPosture;
use opencpx_core::SCHEMA_VERSION;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::audit::CpxAuditEvent;
use crate::audit::CpxAuditEventParams;
use crate::audit::CpxAuditSink;
use crate::audit::CpxNoopAuditSink;
use crate::format::ResponseFormat;
use crate::format::render;
use crate::provider::PostureProvider;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default mount path of the posture endpoint.
pub const DEFAULT_PATH: &str = "/cpx";
/// Response header carrying the document schema version.
pub const CPX_VERSION_HEADER: &str = "x-cpx-version";
/// Client-facing body for every internal failure.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
/// Client-facing body for rejected formats.
const UNSUPPORTED_FORMAT_MESSAGE: &str = "Unsupported format";
/// Client-facing body for non-GET requests.
const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

// ============================================================================
// SECTION: Paths
// ============================================================================

/// Mount path rejected before it reaches the router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid endpoint path {path}: {reason}")]
pub struct InvalidPath {
    /// Rejected path.
    pub path: String,
    /// Rule the path breaks.
    pub reason: &'static str,
}

/// Checks that `path` is a literal absolute route.
///
/// # Errors
///
/// Returns [`InvalidPath`] when the path does not start with `/`, or contains
/// whitespace or a reserved character.
pub fn validate_path(path: &str) -> Result<(), InvalidPath> {
    let reason = if !path.starts_with('/') {
        "must start with '/'"
    } else if path.chars().any(|ch| ch.is_whitespace() || RESERVED_PATH_CHARS.contains(&ch)) {
        "must not contain whitespace or any of ? # { } : *"
    } else {
        return Ok(());
    };
    Err(InvalidPath {
        path: path.to_string(),
        reason,
    })
}

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Configurable posture endpoint.
pub struct CpxEndpoint {
    /// Builds the posture for each request.
    provider: Arc<dyn PostureProvider>,
    /// Mount path.
    path: String,
    /// Request audit sink.
    audit: Arc<dyn CpxAuditSink>,
    /// Emit indented JSON.
    pretty: bool,
    /// Accept `?format=yaml`.
    allow_yaml: bool,
}

impl CpxEndpoint {
    /// Creates an endpoint at [`DEFAULT_PATH`] with compact JSON, YAML
    /// enabled, and auditing disabled.
    #[must_use]
    pub fn new(provider: impl PostureProvider + 'static) -> Self {
        Self::from_shared(Arc::new(provider))
    }

    /// Creates an endpoint from an already shared provider.
    #[must_use]
    pub fn from_shared(provider: Arc<dyn PostureProvider>) -> Self {
        Self {
            provider,
            path: DEFAULT_PATH.to_string(),
            audit: Arc::new(CpxNoopAuditSink),
            pretty: false,
            allow_yaml: true,
        }
    }

    /// Sets the mount path, e.g. `/cts`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`] when the path is not a literal absolute route.
    pub fn with_path(mut self, path: impl Into<String>) -> Result<Self, InvalidPath> {
        let path = path.into();
        validate_path(&path)?;
        self.path = path;
        Ok(self)
    }

    /// Sets the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn CpxAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Enables or disables indented JSON.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Enables or disables the YAML rendering.
    #[must_use]
    pub const fn with_yaml(mut self, allow_yaml: bool) -> Self {
        self.allow_yaml = allow_yaml;
        self
    }

    /// Returns the mount path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Builds a router serving only the posture endpoint.
    #[must_use]
    pub fn router(self) -> Router {
        let path = self.path.clone();
        let state = Arc::new(EndpointState {
            provider: self.provider,
            path: self.path,
            audit: self.audit,
            pretty: self.pretty,
            allow_yaml: self.allow_yaml,
        });
        Router::new().route(&path, any(handle_posture)).with_state(state)
    }

    /// Mounts the endpoint on an existing router, leaving its other routes intact.
    #[must_use]
    pub fn merge_into(self, router: Router) -> Router {
        router.merge(self.router())
    }
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Shared state for the posture handler.
struct EndpointState {
    /// Builds the posture for each request.
    provider: Arc<dyn PostureProvider>,
    /// Mount path, for audit records.
    path: String,
    /// Request audit sink.
    audit: Arc<dyn CpxAuditSink>,
    /// Emit indented JSON.
    pretty: bool,
    /// Accept `?format=yaml`.
    allow_yaml: bool,
}

/// Query parameters understood by the endpoint.
#[derive(Debug, Default, Deserialize)]
struct FormatQuery {
    /// Requested rendering.
    format: Option<String>,
}

/// Client-facing error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Fixed error message.
    error: &'static str,
}

/// Outcome of a single posture request before it becomes a response.
struct Handled {
    /// HTTP response.
    response: Response,
    /// Audit record inputs.
    audit: CpxAuditEventParams,
}

/// Serves the posture document and records one audit event.
async fn handle_posture(
    State(state): State<Arc<EndpointState>>,
    method: Method,
    uri: Uri,
) -> Response {
    let handled = respond(&state, &method, &uri).await;
    let audit = Arc::clone(&state.audit);
    let event = CpxAuditEvent::new(handled.audit);
    let _ = tokio::task::spawn_blocking(move || audit.record(&event)).await;
    handled.response
}

/// Resolves a request into a response and its audit record.
async fn respond(state: &EndpointState, method: &Method, uri: &Uri) -> Handled {
    let record = |status: StatusCode,
                  format: Option<ResponseFormat>,
                  response_bytes: usize,
                  error_kind: Option<&'static str>,
                  error_message: Option<String>| CpxAuditEventParams {
        path: state.path.clone(),
        method: method.as_str().to_string(),
        format,
        status: status.as_u16(),
        response_bytes,
        error_kind,
        error_message,
    };

    if *method != Method::GET {
        let status = StatusCode::METHOD_NOT_ALLOWED;
        let (mut response, bytes) = error_response(status, METHOD_NOT_ALLOWED_MESSAGE);
        response.headers_mut().insert(ALLOW, HeaderValue::from_static("GET"));
        return Handled {
            response,
            audit: record(status, None, bytes, Some("method_not_allowed"), None),
        };
    }

    let format = Query::<FormatQuery>::try_from_uri(uri)
        .map_err(|err| err.body_text())
        .and_then(|Query(query)| {
            ResponseFormat::from_query(query.format.as_deref(), state.allow_yaml)
                .map_err(|err| err.to_string())
        });
    let format = match format {
        Ok(format) => format,
        Err(message) => {
            let status = StatusCode::BAD_REQUEST;
            let (response, bytes) = error_response(status, UNSUPPORTED_FORMAT_MESSAGE);
            return Handled {
                response,
                audit: record(status, None, bytes, Some("unsupported_format"), Some(message)),
            };
        }
    };

    let provider = Arc::clone(&state.provider);
    let pretty = state.pretty;
    let rendered =
        tokio::task::spawn_blocking(move || build_body(provider.as_ref(), format, pretty))
            .await
            .unwrap_or_else(|err| Err(("provider", format!("posture provider join failed: {err}"))));
    match rendered {
        Ok(encoded) => {
            let status = StatusCode::OK;
            let bytes = encoded.bytes.len();
            let response = (
                status,
                [
                    (CONTENT_TYPE, HeaderValue::from_static(encoded.content_type)),
                    (
                        HeaderName::from_static(CPX_VERSION_HEADER),
                        HeaderValue::from_static(SCHEMA_VERSION),
                    ),
                ],
                encoded.bytes,
            )
                .into_response();
            Handled {
                response,
                audit: record(status, Some(format), bytes, None, None),
            }
        }
        Err((kind, message)) => {
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            let (response, bytes) = error_response(status, INTERNAL_ERROR_MESSAGE);
            Handled {
                response,
                audit: record(status, Some(format), bytes, Some(kind), Some(message)),
            }
        }
    }
}

/// Calls the provider and renders its posture, labelling the failing stage.
fn build_body(
    provider: &dyn PostureProvider,
    format: ResponseFormat,
    pretty: bool,
) -> Result<EncodedPosture, (&'static str, String)> {
    let posture = provider.posture().map_err(|err| ("provider", err.message().to_string()))?;
    render(&posture, format, pretty).map_err(|err| ("render", err.to_string()))
}

/// Builds a JSON error response and reports its body size.
fn error_response(status: StatusCode, message: &'static str) -> (Response, usize) {
    let body = ErrorBody {
        error: message,
    };
    let bytes = serde_json::to_vec(&body).map(|bytes| bytes.len()).unwrap_or_default();
    ((status, Json(body)).into_response(), bytes)
}
