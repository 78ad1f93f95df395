// crates/opencpx-core/src/model/control.rs
// ============================================================================
// Module: OpenCPX Control
// Description: A single checked requirement within a framework.
// Purpose: Model control status, remediation notes, and evidence links.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A control is one individually checked requirement inside a framework. Its
//! id is required and unique within the owning framework. Evidence links on
//! a control are plain URL strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::error::ValidationError;
use crate::model::UnknownFields;
use crate::model::non_empty;
use crate::status::ControlStatus;

// ============================================================================
// SECTION: Control
// ============================================================================

/// One requirement within a framework.
///
/// # Invariants
/// - `id` is never empty.
/// - `evidence_refs` holds plain URL strings only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    /// Control identifier, unique within its framework.
    id: String,
    /// Human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    /// Control status.
    status: ControlStatus,
    /// Explanation for a non-compliant or partial status.
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    /// Planned remediation date.
    #[serde(skip_serializing_if = "Option::is_none")]
    remediation_date: Option<String>,
    /// Evidence URLs supporting the status.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    evidence_refs: Vec<String>,
    /// Unrecognized wire fields.
    #[serde(flatten)]
    unknown: UnknownFields,
}

impl Control {
    /// Creates a control with its required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyControlId`] when `id` is blank.
    pub fn new(id: impl Into<String>, status: ControlStatus) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyControlId);
        }
        Ok(Self {
            id,
            title: None,
            status,
            reason: None,
            remediation_date: None,
            evidence_refs: Vec::new(),
            unknown: UnknownFields::new(),
        })
    }

    /// Sets the control title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title);
        self
    }

    /// Sets the status reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = non_empty(reason);
        self
    }

    /// Sets the remediation date.
    #[must_use]
    pub fn with_remediation_date(mut self, date: impl Into<String>) -> Self {
        self.remediation_date = non_empty(date);
        self
    }

    /// Appends an evidence URL; empty strings are ignored.
    #[must_use]
    pub fn with_evidence_ref(mut self, url: impl Into<String>) -> Self {
        self.add_evidence_ref(url);
        self
    }

    /// Appends an evidence URL in place; empty strings are ignored.
    pub fn add_evidence_ref(&mut self, url: impl Into<String>) -> &mut Self {
        if let Some(url) = non_empty(url) {
            self.evidence_refs.push(url);
        }
        self
    }

    /// Returns the control identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the control status.
    #[must_use]
    pub const fn status(&self) -> ControlStatus {
        self.status
    }

    /// Returns the title when set.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the reason when set.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the remediation date when set.
    #[must_use]
    pub fn remediation_date(&self) -> Option<&str> {
        self.remediation_date.as_deref()
    }

    /// Returns the evidence URLs.
    #[must_use]
    pub fn evidence_refs(&self) -> &[String] {
        &self.evidence_refs
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
