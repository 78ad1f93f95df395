// crates/opencpx-core/src/hashing.rs
// ============================================================================
// Module: OpenCPX Evidence Hashing
// Description: Content-addressed integrity tokens for evidence files.
// Purpose: Compute and validate `sha256:<hex>` evidence hashes.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! Evidence references may carry a `hash` token of the form
//! `sha256:<64 lowercase hex digits>`. This module computes the token for
//! raw evidence bytes and validates tokens read from documents. Producers
//! that write uppercase hex are accepted; the token is lowercased on read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::error::ValidationError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix identifying a SHA-256 evidence hash.
pub const SHA256_PREFIX: &str = "sha256:";
/// Hex length of a SHA-256 digest.
const SHA256_HEX_LEN: usize = 64;

// ============================================================================
// SECTION: Evidence Hash
// ============================================================================

/// Validated evidence hash token.
///
/// # Invariants
/// - Always `sha256:` followed by 64 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EvidenceHash(String);

impl EvidenceHash {
    /// Hashes raw evidence bytes with SHA-256.
    #[must_use]
    pub fn sha256_of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        Self(format!("{SHA256_PREFIX}{}", hex_encode(&digest)))
    }

    /// Validates an existing hash token. Hex digits of either case are
    /// accepted and stored lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHash`] when the token is malformed.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let digest = value.strip_prefix(SHA256_PREFIX).ok_or_else(|| invalid(value))?;
        let well_formed =
            digest.len() == SHA256_HEX_LEN && digest.bytes().all(|byte| byte.is_ascii_hexdigit());
        if !well_formed {
            return Err(invalid(value));
        }
        Ok(Self(format!("{SHA256_PREFIX}{}", digest.to_ascii_lowercase())))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the token matches the hash of `bytes`.
    #[must_use]
    pub fn matches(&self, bytes: &[u8]) -> bool {
        *self == Self::sha256_of(bytes)
    }
}

impl fmt::Display for EvidenceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EvidenceHash {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EvidenceHash> for String {
    fn from(value: EvidenceHash) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the invalid-hash error for a token.
fn invalid(value: &str) -> ValidationError {
    ValidationError::InvalidHash {
        value: value.to_string(),
    }
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        reason = "Test-only assertions."
    )]

    use super::EvidenceHash;

    #[test]
    fn sha256_of_empty_input_matches_known_digest() {
        let hash = EvidenceHash::sha256_of(b"");
        assert_eq!(
            hash.as_str(),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(hash.matches(b""));
        assert!(!hash.matches(b"x"));
    }

    #[test]
    fn parse_accepts_computed_tokens() {
        let hash = EvidenceHash::sha256_of(b"evidence.zip");
        assert_eq!(EvidenceHash::parse(hash.as_str()).unwrap(), hash);
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        assert!(EvidenceHash::parse("md5:abcd").is_err());
        assert!(EvidenceHash::parse("sha256:abcd").is_err());
        assert!(EvidenceHash::parse(&format!("sha256:{}", "g".repeat(64))).is_err());
        assert!(EvidenceHash::parse(&format!("SHA256:{}", "a".repeat(64))).is_err());
    }

    #[test]
    fn parse_lowercases_uppercase_hex() {
        let hash = EvidenceHash::sha256_of(b"evidence.zip");
        let upper = format!("sha256:{}", hash.as_str()["sha256:".len()..].to_uppercase());
        let parsed = EvidenceHash::parse(&upper).unwrap();
        assert_eq!(parsed, hash);
        assert!(parsed.matches(b"evidence.zip"));
    }
}
