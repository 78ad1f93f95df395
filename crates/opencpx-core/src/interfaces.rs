// crates/opencpx-core/src/interfaces.rs
// ============================================================================
// Module: OpenCPX Interfaces
// Description: Host-supplied capabilities consumed by document producers.
// Purpose: Define the evidence URL signing boundary.
// Dependencies: crate::time, thiserror
// ============================================================================

//! ## Overview
//! Evidence storage belongs to the hosting application. Producers that need
//! time-limited evidence links call an [`EvidenceUrlSigner`] supplied by the
//! host and wrap the result with
//! [`EvidenceReference::from_signed`](crate::model::EvidenceReference::from_signed).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

use crate::time::Timestamp;

// ============================================================================
// SECTION: Evidence URL Signing
// ============================================================================

/// Signed, time-limited evidence URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    /// Presigned URL.
    pub url: String,
    /// Instant after which the URL stops working.
    pub expires: Timestamp,
}

/// Evidence signer errors.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The evidence key does not exist in the host store.
    #[error("evidence key not found: {0}")]
    NotFound(String),
    /// The host store rejected the signing request.
    #[error("evidence signer error: {0}")]
    Signer(String),
}

/// Host capability that presigns evidence keys.
pub trait EvidenceUrlSigner {
    /// Returns a URL for `key` that stays valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError`] when the key cannot be signed.
    fn sign(&self, key: &str, ttl: Duration) -> Result<SignedUrl, SignerError>;
}
