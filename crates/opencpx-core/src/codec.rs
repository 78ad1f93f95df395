// crates/opencpx-core/src/codec.rs
// ============================================================================
// Module: OpenCPX Wire Codec
// Description: JSON encode/decode for posture documents.
// Purpose: Provide the single serialization contract shared by transports.
// Dependencies: crate::{decode, error, model}, serde_json
// ============================================================================

//! ## Overview
//! Encoding renders a [`Posture`] as UTF-8 JSON with snake_case field names,
//! the effective overall posture, and optional fields omitted when absent.
//! Encoding is deterministic: the same posture always yields the same bytes.
//! Decoding is strict about required fields and enum values, and lenient
//! about unrecognized fields, which are preserved for re-encoding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::error::DecodeError;
use crate::error::EncodeError;
use crate::model::Posture;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Media type of encoded posture documents.
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Encoded Output
// ============================================================================

/// Encoded posture payload with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPosture {
    /// UTF-8 JSON bytes.
    pub bytes: Vec<u8>,
    /// Media type of `bytes`.
    pub content_type: &'static str,
}

impl EncodedPosture {
    /// Returns the payload as text.
    ///
    /// # Errors
    ///
    /// Returns [`std::str::Utf8Error`] if the payload is not UTF-8.
    pub fn as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.bytes)
    }
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Encodes a posture as compact JSON.
///
/// # Errors
///
/// Returns [`EncodeError`] when the timestamp cannot be rendered or JSON
/// serialization fails.
pub fn encode(posture: &Posture) -> Result<EncodedPosture, EncodeError> {
    check_timestamp(posture)?;
    let bytes = serde_json::to_vec(posture).map_err(|err| EncodeError::Json(err.to_string()))?;
    Ok(EncodedPosture {
        bytes,
        content_type: JSON_CONTENT_TYPE,
    })
}

/// Encodes a posture as indented JSON for human readers.
///
/// # Errors
///
/// Returns [`EncodeError`] when the timestamp cannot be rendered or JSON
/// serialization fails.
pub fn encode_pretty(posture: &Posture) -> Result<EncodedPosture, EncodeError> {
    check_timestamp(posture)?;
    let bytes =
        serde_json::to_vec_pretty(posture).map_err(|err| EncodeError::Json(err.to_string()))?;
    Ok(EncodedPosture {
        bytes,
        content_type: JSON_CONTENT_TYPE,
    })
}

/// Surfaces timestamp rendering failures as a typed error.
fn check_timestamp(posture: &Posture) -> Result<(), EncodeError> {
    posture.generated_at().to_rfc3339()?;
    Ok(())
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes a posture from JSON bytes.
///
/// # Errors
///
/// Returns [`DecodeError::Json`] for malformed input and a field-specific
/// [`DecodeError`] for schema violations.
pub fn decode(bytes: &[u8]) -> Result<Posture, DecodeError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|err| DecodeError::Json(err.to_string()))?;
    decode_value(&value)
}

/// Decodes a posture from an already parsed JSON value.
///
/// # Errors
///
/// Returns a field-specific [`DecodeError`] for schema violations.
pub fn decode_value(value: &Value) -> Result<Posture, DecodeError> {
    crate::decode::posture(value)
}
