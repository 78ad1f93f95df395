// crates/opencpx-config/src/lib.rs
// ============================================================================
// Module: OpenCPX Config Library
// Description: Configuration model and validation for OpenCPX services.
// Purpose: Single source of truth for opencpx.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `opencpx-config` loads and validates `opencpx.toml`: the HTTP bind
//! address and endpoint path, the audit sink, and the posture document
//! source served by the CLI. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
