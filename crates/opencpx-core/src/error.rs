// crates/opencpx-core/src/error.rs
// ============================================================================
// Module: OpenCPX Errors
// Description: Validation, decode, and encode error taxonomy.
// Purpose: Distinguish construction-time from parse-time failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`ValidationError`] is raised when a builder or decoder sees a value that
//! breaks an entity invariant. [`DecodeError`] is raised for malformed wire
//! input and always names the offending field path. Neither is retried; both
//! indicate bad caller input rather than a transient condition.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::time::TimestampError;

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Entity invariant violations detected at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required name is empty or whitespace.
    #[error("{entity} name must not be empty")]
    EmptyName {
        /// Entity kind carrying the name.
        entity: &'static str,
    },
    /// The document schema version is empty.
    #[error("schema version must not be empty")]
    EmptyVersion,
    /// Framework score is NaN or infinite.
    #[error("framework {framework} score must be a finite number")]
    NonFiniteScore {
        /// Framework name.
        framework: String,
    },
    /// Framework score lies outside [0.0, 1.0].
    #[error("framework {framework} score {score} is outside [0.0, 1.0]")]
    ScoreOutOfRange {
        /// Framework name.
        framework: String,
        /// Offending score.
        score: f64,
    },
    /// Control identifier is empty.
    #[error("control id must not be empty")]
    EmptyControlId,
    /// Control identifier repeats within a framework.
    #[error("duplicate control id {id} in framework {framework}")]
    DuplicateControlId {
        /// Framework name.
        framework: String,
        /// Repeated control identifier.
        id: String,
    },
    /// Evidence URL is empty.
    #[error("{entity} url must not be empty")]
    EmptyUrl {
        /// Entity kind carrying the URL.
        entity: &'static str,
    },
    /// Evidence hash does not match `sha256:<hex>`.
    #[error("invalid evidence hash: {value}")]
    InvalidHash {
        /// Offending hash token.
        value: String,
    },
}

// ============================================================================
// SECTION: Decode Errors
// ============================================================================

/// Failures raised while parsing a wire document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Input is not well-formed JSON.
    #[error("malformed json: {0}")]
    Json(String),
    /// A required field is absent.
    #[error("missing required field: {field}")]
    MissingField {
        /// Dotted path of the missing field.
        field: String,
    },
    /// A field holds the wrong JSON type.
    #[error("field {field} must be {expected}")]
    InvalidType {
        /// Dotted path of the field.
        field: String,
        /// Expected JSON type description.
        expected: &'static str,
    },
    /// An enum field holds an unrecognized string.
    #[error("field {field} has invalid value: {value}")]
    InvalidEnum {
        /// Dotted path of the field.
        field: String,
        /// Offending value.
        value: String,
    },
    /// A timestamp is malformed or lacks a timezone offset.
    #[error("field {field} has invalid timestamp: {value}")]
    InvalidTimestamp {
        /// Dotted path of the field.
        field: String,
        /// Offending value.
        value: String,
    },
    /// A decoded value breaks an entity invariant.
    #[error("field {field} failed validation: {source}")]
    Validation {
        /// Dotted path of the entity that failed.
        field: String,
        /// Underlying validation failure.
        #[source]
        source: ValidationError,
    },
}

impl DecodeError {
    /// Returns the field path the error refers to, when it names one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::MissingField {
                field,
            }
            | Self::InvalidType {
                field, ..
            }
            | Self::InvalidEnum {
                field, ..
            }
            | Self::InvalidTimestamp {
                field, ..
            }
            | Self::Validation {
                field, ..
            } => Some(field),
        }
    }

    /// Returns the validation failure when the error wraps one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation {
                source, ..
            } => Some(source),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Encode Errors
// ============================================================================

/// Failures raised while rendering a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// JSON serialization failed.
    #[error("json encoding failed: {0}")]
    Json(String),
    /// A timestamp could not be rendered.
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}
