// crates/opencpx-core/src/decode.rs
// ============================================================================
// Module: OpenCPX Wire Decoder
// Description: Strict conversion from JSON values into posture entities.
// Purpose: Report the exact field path of every decode failure.
// Dependencies: crate::{error, hashing, model, status, time}, serde_json
// ============================================================================

//! ## Overview
//! The decoder walks a parsed JSON tree field by field so every failure can
//! name its dotted path (`frameworks[1].status`). Entities are rebuilt
//! through their validating constructors, so decoded documents satisfy the
//! same invariants as built ones. Fields the model does not know are copied
//! into each entity's unknown-field map. A `null` optional field reads as
//! absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::Map;
use serde_json::Value;

use crate::error::DecodeError;
use crate::error::ValidationError;
use crate::hashing::EvidenceHash;
use crate::model::Control;
use crate::model::EvidenceRef;
use crate::model::EvidenceReference;
use crate::model::Framework;
use crate::model::Organization;
use crate::model::Posture;
use crate::model::UnknownFields;
use crate::status::CompliancePosture;
use crate::status::ControlStatus;
use crate::status::FrameworkStatus;
use crate::status::UnknownStatus;
use crate::time::Timestamp;

// ============================================================================
// SECTION: Known Fields
// ============================================================================

/// Posture fields understood by the model.
const POSTURE_FIELDS: &[&str] = &[
    "version",
    "timestamp",
    "compliance_posture",
    "organization",
    "frameworks",
    "evidence_refs",
    "extensions",
];
/// Organization fields understood by the model.
const ORGANIZATION_FIELDS: &[&str] = &["name", "domain", "contact"];
/// Framework fields understood by the model.
const FRAMEWORK_FIELDS: &[&str] = &[
    "name",
    "version",
    "status",
    "score",
    "last_audit",
    "auditor",
    "report_ref",
    "certificate_ref",
    "controls",
];
/// Control fields understood by the model.
const CONTROL_FIELDS: &[&str] =
    &["id", "title", "status", "reason", "remediation_date", "evidence_refs"];
/// Evidence reference fields understood by the model.
const EVIDENCE_FIELDS: &[&str] = &["type", "description", "url", "expires", "hash", "size_bytes"];

// ============================================================================
// SECTION: Entity Decoders
// ============================================================================

/// Decodes the root posture document.
pub(crate) fn posture(value: &Value) -> Result<Posture, DecodeError> {
    let map = object(value, "")?;

    let version = required_str(map, "", "version")?;
    let generated_at = required_timestamp(map, "", "timestamp")?;
    let compliance: CompliancePosture = required_enum(map, "", "compliance_posture")?;

    let mut posture = Posture::new().with_generated_at(generated_at);
    posture
        .set_version(version.to_string())
        .map_err(|source| validation_at("", source))?;
    posture.set_overall_posture(compliance);

    if let Some(value) = optional(map, "organization") {
        posture.set_organization(organization(value, "organization")?);
    }

    let frameworks = required(map, "", "frameworks")?;
    for (index, item) in array(frameworks, "frameworks")?.iter().enumerate() {
        let path = format!("frameworks[{index}]");
        let framework = framework(item, &path)?;
        posture.add_framework(framework).map_err(|source| validation_at(&path, source))?;
    }

    if let Some(value) = optional(map, "evidence_refs") {
        for (index, item) in array(value, "evidence_refs")?.iter().enumerate() {
            let path = format!("evidence_refs[{index}]");
            let evidence = root_evidence(item, &path)?;
            posture.add_evidence_ref(evidence).map_err(|source| validation_at(&path, source))?;
        }
    }

    if let Some(value) = optional(map, "extensions") {
        for (key, entry) in object(value, "extensions")? {
            posture.add_extension(key.clone(), entry.clone());
        }
    }

    posture.set_unknown_fields(unknown_fields(map, POSTURE_FIELDS));
    Ok(posture)
}

/// Decodes an organization object.
fn organization(value: &Value, path: &str) -> Result<Organization, DecodeError> {
    let map = object(value, path)?;
    let name = required_str(map, path, "name")?;
    let mut organization =
        Organization::new(name).map_err(|source| validation_at(path, source))?;
    if let Some(domain) = optional_str(map, path, "domain")? {
        organization = organization.with_domain(domain);
    }
    if let Some(contact) = optional_str(map, path, "contact")? {
        organization = organization.with_contact(contact);
    }
    organization.set_unknown_fields(unknown_fields(map, ORGANIZATION_FIELDS));
    Ok(organization)
}

/// Decodes a framework object.
fn framework(value: &Value, path: &str) -> Result<Framework, DecodeError> {
    let map = object(value, path)?;
    let name = required_str(map, path, "name")?;
    let status: FrameworkStatus = required_enum(map, path, "status")?;
    let score = required_number(map, path, "score")?;

    let mut framework =
        Framework::new(name, status, score).map_err(|source| validation_at(path, source))?;
    if let Some(version) = optional_str(map, path, "version")? {
        framework = framework.with_version(version);
    }
    if let Some(last_audit) = optional_str(map, path, "last_audit")? {
        framework = framework.with_last_audit(last_audit);
    }
    if let Some(auditor) = optional_str(map, path, "auditor")? {
        framework = framework.with_auditor(auditor);
    }
    if let Some(report_ref) = optional_str(map, path, "report_ref")? {
        framework = framework.with_report_ref(report_ref);
    }
    if let Some(certificate_ref) = optional_str(map, path, "certificate_ref")? {
        framework = framework.with_certificate_ref(certificate_ref);
    }

    if let Some(value) = optional(map, "controls") {
        let controls_path = join(path, "controls");
        for (index, item) in array(value, &controls_path)?.iter().enumerate() {
            let control_path = format!("{controls_path}[{index}]");
            let control = control(item, &control_path)?;
            framework.add_control(control).map_err(|source| validation_at(&control_path, source))?;
        }
    }

    framework.set_unknown_fields(unknown_fields(map, FRAMEWORK_FIELDS));
    Ok(framework)
}

/// Decodes a control object.
fn control(value: &Value, path: &str) -> Result<Control, DecodeError> {
    let map = object(value, path)?;
    let id = required_str(map, path, "id")?;
    let status: ControlStatus = required_enum(map, path, "status")?;

    let mut control = Control::new(id, status).map_err(|source| validation_at(path, source))?;
    if let Some(title) = optional_str(map, path, "title")? {
        control = control.with_title(title);
    }
    if let Some(reason) = optional_str(map, path, "reason")? {
        control = control.with_reason(reason);
    }
    if let Some(date) = optional_str(map, path, "remediation_date")? {
        control = control.with_remediation_date(date);
    }
    if let Some(value) = optional(map, "evidence_refs") {
        let refs_path = join(path, "evidence_refs");
        for (index, item) in array(value, &refs_path)?.iter().enumerate() {
            let Value::String(url) = item else {
                return Err(DecodeError::InvalidType {
                    field: format!("{refs_path}[{index}]"),
                    expected: "a string",
                });
            };
            control.add_evidence_ref(url.clone());
        }
    }

    control.set_unknown_fields(unknown_fields(map, CONTROL_FIELDS));
    Ok(control)
}

/// Decodes a root evidence entry in either plain or detailed form.
fn root_evidence(value: &Value, path: &str) -> Result<EvidenceRef, DecodeError> {
    match value {
        Value::String(url) => EvidenceRef::url(url.clone()).map_err(|source| validation_at(path, source)),
        Value::Object(_) => evidence_reference(value, path).map(EvidenceRef::Detailed),
        _ => Err(DecodeError::InvalidType {
            field: path.to_string(),
            expected: "a string or an object",
        }),
    }
}

/// Decodes a detailed evidence reference object.
fn evidence_reference(value: &Value, path: &str) -> Result<EvidenceReference, DecodeError> {
    let map = object(value, path)?;
    let url = required_str(map, path, "url")?;

    let mut reference = EvidenceReference::new(url).map_err(|source| validation_at(path, source))?;
    if let Some(kind) = optional_str(map, path, "type")? {
        reference = reference.with_type(kind);
    }
    if let Some(description) = optional_str(map, path, "description")? {
        reference = reference.with_description(description);
    }
    if let Some(expires) = optional_timestamp(map, path, "expires")? {
        reference = reference.with_expires(expires);
    }
    if let Some(hash) = optional_str(map, path, "hash")? {
        let hash = EvidenceHash::parse(hash).map_err(|source| validation_at(path, source))?;
        reference = reference.with_hash(hash);
    }
    if let Some(value) = optional(map, "size_bytes") {
        let size = value.as_u64().ok_or_else(|| DecodeError::InvalidType {
            field: join(path, "size_bytes"),
            expected: "a non-negative integer",
        })?;
        reference = reference.with_size_bytes(size);
    }

    reference.set_unknown_fields(unknown_fields(map, EVIDENCE_FIELDS));
    Ok(reference)
}

// ============================================================================
// SECTION: Field Helpers
// ============================================================================

/// Joins a parent path and a field name.
fn join(parent: &str, field: &str) -> String {
    if parent.is_empty() { field.to_string() } else { format!("{parent}.{field}") }
}

/// Requires `value` to be a JSON object.
fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, DecodeError> {
    value.as_object().ok_or_else(|| DecodeError::InvalidType {
        field: if path.is_empty() { "$".to_string() } else { path.to_string() },
        expected: "an object",
    })
}

/// Requires `value` to be a JSON array.
fn array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, DecodeError> {
    value.as_array().ok_or_else(|| DecodeError::InvalidType {
        field: path.to_string(),
        expected: "an array",
    })
}

/// Returns a present, non-null field.
fn optional<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

/// Returns a required field or a missing-field error.
fn required<'a>(
    map: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<&'a Value, DecodeError> {
    optional(map, key).ok_or_else(|| DecodeError::MissingField {
        field: join(path, key),
    })
}

/// Reads a required string field.
fn required_str<'a>(
    map: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<&'a str, DecodeError> {
    required(map, path, key)?.as_str().ok_or_else(|| DecodeError::InvalidType {
        field: join(path, key),
        expected: "a string",
    })
}

/// Reads an optional string field.
fn optional_str<'a>(
    map: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<Option<&'a str>, DecodeError> {
    optional(map, key)
        .map(|value| {
            value.as_str().ok_or_else(|| DecodeError::InvalidType {
                field: join(path, key),
                expected: "a string",
            })
        })
        .transpose()
}

/// Reads a required numeric field as `f64`.
fn required_number(map: &Map<String, Value>, path: &str, key: &str) -> Result<f64, DecodeError> {
    required(map, path, key)?.as_f64().ok_or_else(|| DecodeError::InvalidType {
        field: join(path, key),
        expected: "a number",
    })
}

/// Reads a required enum field from its wire string.
fn required_enum<T>(map: &Map<String, Value>, path: &str, key: &str) -> Result<T, DecodeError>
where
    T: FromStr<Err = UnknownStatus>,
{
    let text = required_str(map, path, key)?;
    text.parse().map_err(|err: UnknownStatus| DecodeError::InvalidEnum {
        field: join(path, key),
        value: err.value,
    })
}

/// Reads a required RFC3339 timestamp field.
fn required_timestamp(
    map: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<Timestamp, DecodeError> {
    let text = required_str(map, path, key)?;
    parse_timestamp(text, path, key)
}

/// Reads an optional RFC3339 timestamp field.
fn optional_timestamp(
    map: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<Option<Timestamp>, DecodeError> {
    optional_str(map, path, key)?.map(|text| parse_timestamp(text, path, key)).transpose()
}

/// Parses timestamp text, attributing failures to the field path.
fn parse_timestamp(text: &str, path: &str, key: &str) -> Result<Timestamp, DecodeError> {
    Timestamp::parse(text).map_err(|_| DecodeError::InvalidTimestamp {
        field: join(path, key),
        value: text.to_string(),
    })
}

/// Copies every field not listed in `known`.
fn unknown_fields(map: &Map<String, Value>, known: &[&str]) -> UnknownFields {
    map.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect::<BTreeMap<_, _>>()
}

/// Wraps a validation failure with the path of the field that caused it.
fn validation_at(path: &str, source: ValidationError) -> DecodeError {
    let field = match &source {
        ValidationError::EmptyName {
            ..
        } => join(path, "name"),
        ValidationError::EmptyVersion => join(path, "version"),
        ValidationError::NonFiniteScore {
            ..
        }
        | ValidationError::ScoreOutOfRange {
            ..
        } => join(path, "score"),
        ValidationError::EmptyControlId
        | ValidationError::DuplicateControlId {
            ..
        } => join(path, "id"),
        ValidationError::EmptyUrl {
            ..
        } => {
            if path.starts_with("evidence_refs[") && !path.contains('.') {
                path.to_string()
            } else {
                join(path, "url")
            }
        }
        ValidationError::InvalidHash {
            ..
        } => join(path, "hash"),
    };
    DecodeError::Validation {
        field,
        source,
    }
}
