// crates/opencpx-core/src/model/mod.rs
// ============================================================================
// Module: OpenCPX Document Model
// Description: Posture, framework, control, organization, and evidence entities.
// Purpose: Provide validating builders for the posture document tree.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The posture document is a strict tree rooted at [`Posture`]. Every entity
//! validates its invariants when it is constructed or mutated, so a value
//! that exists is always encodable. Fields the model does not recognize are
//! kept in [`UnknownFields`] and written back out unchanged.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod control;
pub mod evidence;
pub mod framework;
pub mod organization;
pub mod posture;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use control::Control;
pub use evidence::EvidenceRef;
pub use evidence::EvidenceReference;
pub use framework::Framework;
pub use organization::Organization;
pub use posture::Posture;
pub use posture::SCHEMA_VERSION;
pub use posture::is_conventional_extension_key;

// ============================================================================
// SECTION: Shared Types
// ============================================================================

/// Wire fields not recognized by the model, kept in key order.
pub type UnknownFields = std::collections::BTreeMap<String, serde_json::Value>;

/// Normalizes an optional descriptive string; empty text means unset.
pub(crate) fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.is_empty() { None } else { Some(value) }
}
