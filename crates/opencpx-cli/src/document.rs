// crates/opencpx-cli/src/document.rs
// ============================================================================
// Module: Document Files
// Description: Bounded loading and reporting for posture documents on disk.
// Purpose: Back the check, aggregate, convert, and serve commands.
// Dependencies: opencpx-core, opencpx-http, thiserror
// ============================================================================

//! ## Overview
//! Documents are read with a hard size cap before decoding. The
//! [`FilePostureProvider`] re-reads its file on every request so edits are
//! visible to a running server without a restart.
//!
//! Security posture: document files are untrusted input; reads are bounded
//! and decoding fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use opencpx_core::CompliancePosture;
use opencpx_core::DecodeError;
use opencpx_core::EvidenceRef;
use opencpx_core::FrameworkStatus;
use opencpx_core::Posture;
use opencpx_core::Timestamp;
use opencpx_core::decode;
use opencpx_http::PostureProvider;
use opencpx_http::ProviderError;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a posture document file in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while loading a posture document from disk.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Document path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// File exceeds [`MAX_DOCUMENT_BYTES`].
    #[error("document {path} is too large ({size} bytes, limit {limit})")]
    TooLarge {
        /// Document path.
        path: String,
        /// Observed size in bytes.
        size: u64,
        /// Allowed size in bytes.
        limit: usize,
    },
    /// File contents are not a valid posture document.
    #[error("invalid document {path}: {source}")]
    Decode {
        /// Document path.
        path: String,
        /// Decoder failure.
        source: DecodeError,
    },
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Reads and decodes a posture document.
///
/// # Errors
///
/// Returns [`DocumentError`] when the file is unreadable, oversized, or not a
/// valid document.
pub fn read_document(path: &Path) -> Result<Posture, DocumentError> {
    let bytes = read_bytes_with_limit(path, MAX_DOCUMENT_BYTES)?;
    decode(&bytes).map_err(|source| DocumentError::Decode {
        path: path.display().to_string(),
        source,
    })
}

/// Reads a file while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, DocumentError> {
    let io_error = |source| DocumentError::Io {
        path: path.display().to_string(),
        source,
    };
    let too_large = |size| DocumentError::TooLarge {
        path: path.display().to_string(),
        size,
        limit: max_bytes,
    };

    let file = File::open(path).map_err(io_error)?;
    let size = file.metadata().map_err(io_error)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| too_large(size))?;
    if size > limit {
        return Err(too_large(size));
    }

    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(io_error)?;
    if bytes.len() > max_bytes {
        return Err(too_large(u64::try_from(bytes.len()).unwrap_or(u64::MAX)));
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: File Provider
// ============================================================================

/// Posture provider that decodes a document file on every request.
#[derive(Debug, Clone)]
pub struct FilePostureProvider {
    /// Document path.
    path: PathBuf,
}

impl FilePostureProvider {
    /// Creates a provider for the given document path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Returns the document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PostureProvider for FilePostureProvider {
    fn posture(&self) -> Result<Posture, ProviderError> {
        read_document(&self.path).map_err(|err| ProviderError::new(err.to_string()))
    }
}

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Framework counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Frameworks reported compliant.
    pub compliant: usize,
    /// Frameworks reported partial.
    pub partial: usize,
    /// Frameworks reported non-compliant.
    pub non_compliant: usize,
}

/// Report on a decoded posture document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostureSummary {
    /// Schema version.
    pub version: String,
    /// Organization name, when present.
    pub organization: Option<String>,
    /// Posture the document would be served with.
    pub effective: CompliancePosture,
    /// Posture stated in the document, when set explicitly.
    pub declared: Option<CompliancePosture>,
    /// Posture recomputed from the frameworks.
    pub aggregated: CompliancePosture,
    /// Framework counts per status.
    pub frameworks: StatusCounts,
    /// Controls across all frameworks.
    pub controls: usize,
    /// Root evidence entries.
    pub evidence: usize,
    /// Detailed root evidence entries expired at the summary time.
    pub expired_evidence: usize,
}

impl PostureSummary {
    /// Summarizes a posture, judging evidence expiry against `now`.
    #[must_use]
    pub fn new(posture: &Posture, now: Timestamp) -> Self {
        let mut frameworks = StatusCounts::default();
        for framework in posture.frameworks() {
            match framework.status() {
                FrameworkStatus::Compliant => frameworks.compliant += 1,
                FrameworkStatus::Partial => frameworks.partial += 1,
                FrameworkStatus::NonCompliant => frameworks.non_compliant += 1,
            }
        }
        let expired_evidence = posture
            .evidence_refs()
            .iter()
            .filter(|entry| match entry {
                EvidenceRef::Detailed(reference) => reference.is_expired_at(now),
                EvidenceRef::Url(_) => false,
            })
            .count();
        Self {
            version: posture.version().to_string(),
            organization: posture.organization().map(|org| org.name().to_string()),
            effective: posture.overall_posture(),
            declared: posture.explicit_overall_posture(),
            aggregated: posture.calculate_overall_posture(),
            frameworks,
            controls: posture.frameworks().iter().map(|framework| framework.controls().len()).sum(),
            evidence: posture.evidence_refs().len(),
            expired_evidence,
        }
    }

    /// Returns true when the declared posture is absent or equals the
    /// aggregation result.
    #[must_use]
    pub fn declared_matches(&self) -> bool {
        self.declared.is_none_or(|declared| declared == self.aggregated)
    }
}

impl fmt::Display for PostureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version: {}", self.version)?;
        if let Some(organization) = &self.organization {
            writeln!(f, "organization: {organization}")?;
        }
        writeln!(f, "compliance_posture: {}", self.effective)?;
        writeln!(
            f,
            "frameworks: {} (compliant {}, partial {}, non_compliant {})",
            self.frameworks.compliant + self.frameworks.partial + self.frameworks.non_compliant,
            self.frameworks.compliant,
            self.frameworks.partial,
            self.frameworks.non_compliant,
        )?;
        writeln!(f, "controls: {}", self.controls)?;
        write!(f, "evidence_refs: {} ({} expired)", self.evidence, self.expired_evidence)
    }
}
