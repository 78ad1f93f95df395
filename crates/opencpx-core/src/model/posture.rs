// crates/opencpx-core/src/model/posture.rs
// ============================================================================
// Module: OpenCPX Posture
// Description: Root posture document and its builder operations.
// Purpose: Assemble a posture per request and hand it to the codec.
// Dependencies: crate::{aggregation, model, status, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Posture`] is built once per request: create it, set the organization,
//! add frameworks and evidence, then encode it. The timestamp is captured at
//! creation and never regenerated. When no overall posture is set
//! explicitly, the effective value is the aggregation over the current
//! frameworks, so the field can also carry an externally supplied rollup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;

use crate::aggregation::aggregate;
use crate::error::ValidationError;
use crate::model::EvidenceRef;
use crate::model::Framework;
use crate::model::Organization;
use crate::model::UnknownFields;
use crate::status::CompliancePosture;
use crate::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Schema version literal written by this crate.
pub const SCHEMA_VERSION: &str = "v1";

// ============================================================================
// SECTION: Posture
// ============================================================================

/// Root compliance posture document.
///
/// # Invariants
/// - `version` is never empty.
/// - Every framework and evidence entry passed validation when added.
#[derive(Debug, Clone)]
pub struct Posture {
    /// Schema version tag.
    version: String,
    /// Construction instant.
    generated_at: Timestamp,
    /// Explicitly set overall posture; `None` means derived.
    overall_posture: Option<CompliancePosture>,
    /// Publishing organization.
    organization: Option<Organization>,
    /// Frameworks in insertion order.
    frameworks: Vec<Framework>,
    /// Root evidence entries.
    evidence_refs: Vec<EvidenceRef>,
    /// Vendor extensions keyed by name.
    extensions: BTreeMap<String, Value>,
    /// Unrecognized wire fields.
    unknown: UnknownFields,
}

impl Posture {
    /// Creates an empty `v1` posture stamped with the current UTC time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: Timestamp::now(),
            overall_posture: None,
            organization: None,
            frameworks: Vec::new(),
            evidence_refs: Vec::new(),
            extensions: BTreeMap::new(),
            unknown: UnknownFields::new(),
        }
    }

    /// Replaces the construction timestamp.
    #[must_use]
    pub fn with_generated_at(mut self, generated_at: Timestamp) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Sets the overall posture explicitly; last write wins.
    pub fn set_overall_posture(&mut self, posture: CompliancePosture) -> &mut Self {
        self.overall_posture = Some(posture);
        self
    }

    /// Drops any explicit overall posture so the derived value applies.
    pub fn clear_overall_posture(&mut self) -> &mut Self {
        self.overall_posture = None;
        self
    }

    /// Sets the publishing organization; last write wins.
    pub fn set_organization(&mut self, organization: Organization) -> &mut Self {
        self.organization = Some(organization);
        self
    }

    /// Appends a framework after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] and leaves the posture unchanged when the
    /// framework name is blank or its score is out of range.
    pub fn add_framework(&mut self, framework: Framework) -> Result<&mut Self, ValidationError> {
        framework.validate()?;
        self.frameworks.push(framework);
        Ok(self)
    }

    /// Appends a root evidence entry after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyUrl`] and leaves the posture unchanged
    /// when the entry has no URL.
    pub fn add_evidence_ref(
        &mut self,
        evidence: impl Into<EvidenceRef>,
    ) -> Result<&mut Self, ValidationError> {
        let evidence = evidence.into();
        evidence.validate()?;
        self.evidence_refs.push(evidence);
        Ok(self)
    }

    /// Inserts or overwrites a vendor extension.
    pub fn add_extension(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Computes the aggregation over the current frameworks without mutating.
    #[must_use]
    pub fn calculate_overall_posture(&self) -> CompliancePosture {
        aggregate(&self.frameworks)
    }

    /// Returns the effective overall posture: explicit when set, derived otherwise.
    #[must_use]
    pub fn overall_posture(&self) -> CompliancePosture {
        self.overall_posture.unwrap_or_else(|| self.calculate_overall_posture())
    }

    /// Returns the explicitly set overall posture, if any.
    #[must_use]
    pub const fn explicit_overall_posture(&self) -> Option<CompliancePosture> {
        self.overall_posture
    }

    /// Returns the schema version tag.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the construction timestamp.
    #[must_use]
    pub const fn generated_at(&self) -> Timestamp {
        self.generated_at
    }

    /// Returns the organization when set.
    #[must_use]
    pub const fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    /// Returns the frameworks in insertion order.
    #[must_use]
    pub fn frameworks(&self) -> &[Framework] {
        &self.frameworks
    }

    /// Returns the root evidence entries.
    #[must_use]
    pub fn evidence_refs(&self) -> &[EvidenceRef] {
        &self.evidence_refs
    }

    /// Returns the vendor extensions.
    #[must_use]
    pub const fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    /// Returns fields preserved from a newer producer.
    #[must_use]
    pub const fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown
    }

    /// Sets a decoded schema version.
    pub(crate) fn set_version(&mut self, version: String) -> Result<(), ValidationError> {
        if version.trim().is_empty() {
            return Err(ValidationError::EmptyVersion);
        }
        self.version = version;
        Ok(())
    }

    /// Replaces the preserved unknown fields.
    pub(crate) fn set_unknown_fields(&mut self, unknown: UnknownFields) {
        self.unknown = unknown;
    }
}

impl Default for Posture {
    fn default() -> Self {
        Self::new()
    }
}

/// Field-wise equality on the wire view: the overall posture compares by its
/// effective value, so a derived posture equals its decoded explicit form.
impl PartialEq for Posture {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.generated_at == other.generated_at
            && self.overall_posture() == other.overall_posture()
            && self.organization == other.organization
            && self.frameworks == other.frameworks
            && self.evidence_refs == other.evidence_refs
            && self.extensions == other.extensions
            && self.unknown == other.unknown
    }
}

// ============================================================================
// SECTION: Serde
// ============================================================================

/// Borrowed wire view of a posture.
#[derive(Serialize)]
struct PostureWire<'a> {
    /// Schema version tag.
    version: &'a str,
    /// Construction instant.
    timestamp: Timestamp,
    /// Effective overall posture.
    compliance_posture: CompliancePosture,
    /// Publishing organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<&'a Organization>,
    /// Frameworks, always present.
    frameworks: &'a [Framework],
    /// Root evidence entries.
    #[serde(skip_serializing_if = "is_empty_slice")]
    evidence_refs: &'a [EvidenceRef],
    /// Vendor extensions.
    #[serde(skip_serializing_if = "is_empty_map")]
    extensions: &'a BTreeMap<String, Value>,
    /// Unrecognized wire fields.
    #[serde(flatten)]
    unknown: &'a UnknownFields,
}

/// Returns true for an empty borrowed slice.
fn is_empty_slice<T>(value: &&[T]) -> bool {
    value.is_empty()
}

/// Returns true for an empty borrowed map.
fn is_empty_map<K, V>(value: &&BTreeMap<K, V>) -> bool {
    value.is_empty()
}

impl Serialize for Posture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PostureWire {
            version: &self.version,
            timestamp: self.generated_at,
            compliance_posture: self.overall_posture(),
            organization: self.organization.as_ref(),
            frameworks: &self.frameworks,
            evidence_refs: &self.evidence_refs,
            extensions: &self.extensions,
            unknown: &self.unknown,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Posture {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        crate::decode::posture(&value).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Extension Keys
// ============================================================================

/// Returns true when `key` follows the `x-{vendor}-{field}` convention.
///
/// Vendor and field segments are non-empty and use `[a-z0-9_]`; the field
/// may itself contain further `-` separated segments. The model accepts any
/// key; this check is advisory.
#[must_use]
pub fn is_conventional_extension_key(key: &str) -> bool {
    let Some(rest) = key.strip_prefix("x-") else {
        return false;
    };
    let Some((vendor, field)) = rest.split_once('-') else {
        return false;
    };
    is_key_segment(vendor) && field.split('-').all(is_key_segment)
}

/// Checks a single extension key segment.
fn is_key_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_')
}
