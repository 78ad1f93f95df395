// crates/opencpx-core/src/model/evidence.rs
// ============================================================================
// Module: OpenCPX Evidence References
// Description: Root-level evidence pointers in plain or detailed form.
// Purpose: Point at supporting documentation without embedding it.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Root-level `evidence_refs` entries are either a bare URL string or a
//! detailed object carrying type, expiry, and integrity metadata. Control
//! evidence stays plain strings; only the root accepts the detailed form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::error::ValidationError;
use crate::hashing::EvidenceHash;
use crate::interfaces::SignedUrl;
use crate::model::UnknownFields;
use crate::model::non_empty;
use crate::time::Timestamp;

// ============================================================================
// SECTION: Evidence Reference
// ============================================================================

/// Detailed pointer to an evidence artifact.
///
/// # Invariants
/// - `url` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceReference {
    /// Evidence category, e.g. `audit_report`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Location of the artifact.
    url: String,
    /// Expiry of a time-limited URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    expires: Option<Timestamp>,
    /// Content hash of the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<EvidenceHash>,
    /// Artifact size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    /// Unrecognized wire fields.
    #[serde(flatten)]
    unknown: UnknownFields,
}

impl EvidenceReference {
    /// Creates a detailed reference for a URL.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyUrl`] when `url` is blank.
    pub fn new(url: impl Into<String>) -> Result<Self, ValidationError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(ValidationError::EmptyUrl {
                entity: "evidence reference",
            });
        }
        Ok(Self {
            kind: None,
            description: None,
            url,
            expires: None,
            hash: None,
            size_bytes: None,
            unknown: UnknownFields::new(),
        })
    }

    /// Creates a reference from a signed, time-limited URL.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyUrl`] when the signer produced an empty URL.
    pub fn from_signed(signed: SignedUrl) -> Result<Self, ValidationError> {
        Ok(Self::new(signed.url)?.with_expires(signed.expires))
    }

    /// Sets the evidence type.
    #[must_use]
    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = non_empty(kind);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description);
        self
    }

    /// Sets the URL expiry.
    #[must_use]
    pub fn with_expires(mut self, expires: Timestamp) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Sets the content hash.
    #[must_use]
    pub fn with_hash(mut self, hash: EvidenceHash) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Sets the artifact size.
    #[must_use]
    pub fn with_size_bytes(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Returns the URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the evidence type when set.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Returns the description when set.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the expiry when set.
    #[must_use]
    pub const fn expires(&self) -> Option<Timestamp> {
        self.expires
    }

    /// Returns the content hash when set.
    #[must_use]
    pub const fn hash(&self) -> Option<&EvidenceHash> {
        self.hash.as_ref()
    }

    /// Returns the artifact size when set.
    #[must_use]
    pub const fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    /// Returns true when the reference has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// Returns fields preserved from a newer producer.
    #[must_use]
    pub const fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown
    }

    /// Replaces the preserved unknown fields.
    pub(crate) fn set_unknown_fields(&mut self, unknown: UnknownFields) {
        self.unknown = unknown;
    }
}

// ============================================================================
// SECTION: Evidence Ref
// ============================================================================

/// Root-level evidence entry: a bare URL or a detailed reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EvidenceRef {
    /// Bare URL string.
    Url(String),
    /// Detailed reference object.
    Detailed(EvidenceReference),
}

impl EvidenceRef {
    /// Creates a bare URL entry.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyUrl`] when `url` is blank.
    pub fn url(url: impl Into<String>) -> Result<Self, ValidationError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(ValidationError::EmptyUrl {
                entity: "evidence",
            });
        }
        Ok(Self::Url(url))
    }

    /// Returns the URL regardless of form.
    #[must_use]
    pub fn location(&self) -> &str {
        match self {
            Self::Url(url) => url,
            Self::Detailed(reference) => reference.url(),
        }
    }

    /// Checks the entry invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyUrl`] when the URL is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.location().trim().is_empty() {
            return Err(ValidationError::EmptyUrl {
                entity: "evidence",
            });
        }
        Ok(())
    }
}

impl From<EvidenceReference> for EvidenceRef {
    fn from(value: EvidenceReference) -> Self {
        Self::Detailed(value)
    }
}
