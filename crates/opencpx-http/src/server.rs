// crates/opencpx-http/src/server.rs
// ============================================================================
// Module: Posture Server
// Description: Standalone HTTP server hosting the posture endpoint.
// Purpose: Bind the configured address and serve until the listener fails.
// Dependencies: axum, opencpx-config, tokio
// ============================================================================

//! ## Overview
//! [`serve`] turns a validated [`CpxConfig`] and a provider into a running
//! server. Hosts embedding the endpoint in their own router use
//! [`endpoint_from_config`] with [`CpxEndpoint::merge_into`] instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use opencpx_config::CpxConfig;
use thiserror::Error;

use crate::audit::sink_from_config;
use crate::endpoint::CpxEndpoint;
use crate::provider::PostureProvider;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Posture server errors.
#[derive(Debug, Error)]
pub enum CpxServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Audit sink initialization errors.
    #[error("audit error: {0}")]
    Audit(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Builds an endpoint configured from the `[server]` and `[audit]` sections.
///
/// # Errors
///
/// Returns [`CpxServerError`] when the configuration is invalid or the audit
/// sink cannot be opened.
pub fn endpoint_from_config(
    config: &CpxConfig,
    provider: Arc<dyn PostureProvider>,
) -> Result<CpxEndpoint, CpxServerError> {
    config.validate().map_err(|err| CpxServerError::Config(err.to_string()))?;
    let audit =
        sink_from_config(&config.audit).map_err(|err| CpxServerError::Audit(err.to_string()))?;
    Ok(CpxEndpoint::from_shared(provider)
        .with_path(config.server.path.clone())
        .map_err(|err| CpxServerError::Config(err.to_string()))?
        .with_pretty(config.server.pretty)
        .with_yaml(config.server.allow_yaml)
        .with_audit_sink(audit))
}

/// Serves the posture endpoint on the configured bind address.
///
/// # Errors
///
/// Returns [`CpxServerError`] when configuration, binding, or serving fails.
pub async fn serve(
    config: CpxConfig,
    provider: Arc<dyn PostureProvider>,
) -> Result<(), CpxServerError> {
    let addr = config.server.bind_addr().map_err(|err| CpxServerError::Config(err.to_string()))?;
    let app = endpoint_from_config(&config, provider)?.router();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| CpxServerError::Transport(format!("http bind failed: {err}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|err| CpxServerError::Transport(format!("http server failed: {err}")))
}
