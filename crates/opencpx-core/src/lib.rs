// crates/opencpx-core/src/lib.rs
// ============================================================================
// Module: OpenCPX Core Library
// Description: Public API surface for the OpenCPX document model.
// Purpose: Expose posture types, aggregation, and the wire codec.
// Dependencies: crate::{aggregation, codec, error, hashing, interfaces, model, status, time}
// ============================================================================

//! ## Overview
//! OpenCPX core models the compliance posture document: a versioned JSON
//! tree rooted at [`Posture`]. It provides validating builders, the posture
//! aggregation rollup, and the canonical JSON encode/decode contract shared
//! by every transport adapter. The core performs no I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod aggregation;
pub mod codec;
mod decode;
pub mod error;
pub mod hashing;
pub mod interfaces;
pub mod model;
pub mod status;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use aggregation::aggregate;
pub use aggregation::aggregate_statuses;
pub use codec::EncodedPosture;
pub use codec::JSON_CONTENT_TYPE;
pub use codec::decode;
pub use codec::decode_value;
pub use codec::encode;
pub use codec::encode_pretty;
pub use error::DecodeError;
pub use error::EncodeError;
pub use error::ValidationError;
pub use hashing::EvidenceHash;
pub use interfaces::EvidenceUrlSigner;
pub use interfaces::SignedUrl;
pub use interfaces::SignerError;
pub use model::Control;
pub use model::EvidenceRef;
pub use model::EvidenceReference;
pub use model::Framework;
pub use model::Organization;
pub use model::Posture;
pub use model::SCHEMA_VERSION;
pub use model::UnknownFields;
pub use model::is_conventional_extension_key;
pub use status::CompliancePosture;
pub use status::ControlStatus;
pub use status::FrameworkStatus;
pub use status::UnknownStatus;
pub use time::Timestamp;
