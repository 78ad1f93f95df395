// crates/opencpx-cli/src/lib.rs
// ============================================================================
// Module: OpenCPX CLI Library
// Description: Shared helpers for the opencpx command-line interface.
// Purpose: Keep document loading and summaries testable outside the binary.
// Dependencies: crate::document
// ============================================================================

//! ## Overview
//! The `opencpx` binary reads posture documents from disk, reports on them,
//! and serves them over HTTP. Document handling lives here so integration
//! tests can exercise it without spawning the binary.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Bounded document loading, file-backed providers, and summaries.
pub mod document;

pub use document::DocumentError;
pub use document::FilePostureProvider;
pub use document::MAX_DOCUMENT_BYTES;
pub use document::PostureSummary;
pub use document::StatusCounts;
pub use document::read_document;
