// crates/opencpx-core/src/model/organization.rs
// ============================================================================
// Module: OpenCPX Organization
// Description: Organization identity attached to a posture.
// Purpose: Carry the publishing organization's name and contact details.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The organization block names the publisher of a posture. Only the name is
//! required; domain and contact are optional and omitted when unset.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::error::ValidationError;
use crate::model::UnknownFields;
use crate::model::non_empty;

// ============================================================================
// SECTION: Organization
// ============================================================================

/// Organization publishing the posture.
///
/// # Invariants
/// - `name` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    /// Organization display name.
    name: String,
    /// Primary domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
    /// Security contact address.
    #[serde(skip_serializing_if = "Option::is_none")]
    contact: Option<String>,
    /// Unrecognized wire fields.
    #[serde(flatten)]
    unknown: UnknownFields,
}

impl Organization {
    /// Creates an organization with the required name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName {
                entity: "organization",
            });
        }
        Ok(Self {
            name,
            domain: None,
            contact: None,
            unknown: UnknownFields::new(),
        })
    }

    /// Sets the organization domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = non_empty(domain);
        self
    }

    /// Sets the security contact.
    #[must_use]
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = non_empty(contact);
        self
    }

    /// Returns the organization name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the domain when set.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Returns the contact when set.
    #[must_use]
    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref()
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
