// crates/opencpx-core/src/model/framework.rs
// ============================================================================
// Module: OpenCPX Framework
// Description: One compliance framework's evaluation.
// Purpose: Model framework status, score, audit metadata, and controls.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A framework carries a status from the framework vocabulary and a score in
//! the closed range [0.0, 1.0]. Out-of-range or non-finite scores are
//! rejected at construction, never clamped. Framework names are free-form
//! and compared case-sensitively.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::error::ValidationError;
use crate::model::Control;
use crate::model::UnknownFields;
use crate::model::non_empty;
use crate::status::FrameworkStatus;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Lowest accepted framework score.
pub const MIN_SCORE: f64 = 0.0;
/// Highest accepted framework score.
pub const MAX_SCORE: f64 = 1.0;

// ============================================================================
// SECTION: Framework
// ============================================================================

/// One compliance framework's evaluation.
///
/// # Invariants
/// - `name` is never empty.
/// - `score` is finite and within [`MIN_SCORE`, `MAX_SCORE`].
/// - Control identifiers are unique within `controls`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Framework {
    /// Framework name, e.g. `SOC2`.
    name: String,
    /// Framework revision, e.g. `Type II`.
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    /// Framework status.
    status: FrameworkStatus,
    /// Compliance score in [0.0, 1.0].
    score: f64,
    /// Date of the last audit.
    #[serde(skip_serializing_if = "Option::is_none")]
    last_audit: Option<String>,
    /// Auditing firm.
    #[serde(skip_serializing_if = "Option::is_none")]
    auditor: Option<String>,
    /// Reference to the audit report.
    #[serde(skip_serializing_if = "Option::is_none")]
    report_ref: Option<String>,
    /// Reference to the issued certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    certificate_ref: Option<String>,
    /// Controls in insertion order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    controls: Vec<Control>,
    /// Unrecognized wire fields.
    #[serde(flatten)]
    unknown: UnknownFields,
}

impl Framework {
    /// Creates a framework with its required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the name is blank or the score is out of range.
    pub fn new(
        name: impl Into<String>,
        status: FrameworkStatus,
        score: f64,
    ) -> Result<Self, ValidationError> {
        let framework = Self {
            name: name.into(),
            version: None,
            status,
            score,
            last_audit: None,
            auditor: None,
            report_ref: None,
            certificate_ref: None,
            controls: Vec::new(),
            unknown: UnknownFields::new(),
        };
        framework.validate()?;
        Ok(framework)
    }

    /// Sets the framework revision.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = non_empty(version);
        self
    }

    /// Sets the last audit date.
    #[must_use]
    pub fn with_last_audit(mut self, last_audit: impl Into<String>) -> Self {
        self.last_audit = non_empty(last_audit);
        self
    }

    /// Sets the auditor.
    #[must_use]
    pub fn with_auditor(mut self, auditor: impl Into<String>) -> Self {
        self.auditor = non_empty(auditor);
        self
    }

    /// Sets the audit report reference.
    #[must_use]
    pub fn with_report_ref(mut self, report_ref: impl Into<String>) -> Self {
        self.report_ref = non_empty(report_ref);
        self
    }

    /// Sets the certificate reference.
    #[must_use]
    pub fn with_certificate_ref(mut self, certificate_ref: impl Into<String>) -> Self {
        self.certificate_ref = non_empty(certificate_ref);
        self
    }

    /// Appends a control, consuming and returning the framework.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateControlId`] when the id is already present.
    pub fn with_control(mut self, control: Control) -> Result<Self, ValidationError> {
        self.add_control(control)?;
        Ok(self)
    }

    /// Appends a control in place.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateControlId`] when the id is already present.
    pub fn add_control(&mut self, control: Control) -> Result<&mut Self, ValidationError> {
        if self.controls.iter().any(|existing| existing.id() == control.id()) {
            return Err(ValidationError::DuplicateControlId {
                framework: self.name.clone(),
                id: control.id().to_string(),
            });
        }
        self.controls.push(control);
        Ok(self)
    }

    /// Checks the framework invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] describing the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName {
                entity: "framework",
            });
        }
        if !self.score.is_finite() {
            return Err(ValidationError::NonFiniteScore {
                framework: self.name.clone(),
            });
        }
        if !(MIN_SCORE ..= MAX_SCORE).contains(&self.score) {
            return Err(ValidationError::ScoreOutOfRange {
                framework: self.name.clone(),
                score: self.score,
            });
        }
        Ok(())
    }

    /// Returns the framework name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the framework status.
    #[must_use]
    pub const fn status(&self) -> FrameworkStatus {
        self.status
    }

    /// Returns the score.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Returns the revision when set.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the last audit date when set.
    #[must_use]
    pub fn last_audit(&self) -> Option<&str> {
        self.last_audit.as_deref()
    }

    /// Returns the auditor when set.
    #[must_use]
    pub fn auditor(&self) -> Option<&str> {
        self.auditor.as_deref()
    }

    /// Returns the report reference when set.
    #[must_use]
    pub fn report_ref(&self) -> Option<&str> {
        self.report_ref.as_deref()
    }

    /// Returns the certificate reference when set.
    #[must_use]
    pub fn certificate_ref(&self) -> Option<&str> {
        self.certificate_ref.as_deref()
    }

    /// Returns the controls in insertion order.
    #[must_use]
    pub fn controls(&self) -> &[Control] {
        &self.controls
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
