// crates/opencpx-http/src/lib.rs
// ============================================================================
// Module: OpenCPX HTTP Library
// Description: Axum transport adapter for posture documents.
// Purpose: Serve a provider-built posture at a configurable path.
// Dependencies: axum, opencpx-config, opencpx-core, serde_yaml, tokio
// ============================================================================

//! ## Overview
//! `opencpx-http` exposes a posture document over HTTP. A hosting
//! application supplies a [`PostureProvider`]; [`CpxEndpoint`] turns it into
//! an axum router that can run standalone via [`serve`] or be merged into an
//! existing application router.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod endpoint;
pub mod format;
pub mod provider;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::CpxAuditEvent;
pub use audit::CpxAuditEventParams;
pub use audit::CpxAuditSink;
pub use audit::CpxFileAuditSink;
pub use audit::CpxNoopAuditSink;
pub use audit::CpxOutcome;
pub use audit::CpxStderrAuditSink;
pub use audit::sink_from_config;
pub use endpoint::CPX_VERSION_HEADER;
pub use endpoint::CpxEndpoint;
pub use endpoint::DEFAULT_PATH;
pub use endpoint::InvalidPath;
pub use endpoint::validate_path;
pub use format::RenderError;
pub use format::ResponseFormat;
pub use format::UnsupportedFormat;
pub use format::YAML_CONTENT_TYPE;
pub use format::render;
pub use provider::PostureProvider;
pub use provider::ProviderError;
pub use server::CpxServerError;
pub use server::endpoint_from_config;
pub use server::serve;
