// crates/opencpx-cli/tests/document.rs
// ============================================================================
// Module: Document File Tests
// Description: Loading, provider, and summary tests for document files.
// Purpose: Ensure document reads are bounded and summaries are accurate.
// ============================================================================

//! Library-level tests for posture document files.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;
use std::io::Write;

use opencpx_cli::DocumentError;
use opencpx_cli::FilePostureProvider;
use opencpx_cli::MAX_DOCUMENT_BYTES;
use opencpx_cli::PostureSummary;
use opencpx_cli::StatusCounts;
use opencpx_cli::read_document;
use opencpx_core::CompliancePosture;
use opencpx_core::DecodeError;
use opencpx_core::Timestamp;
use opencpx_http::PostureProvider;
use serde_json::Value;
use serde_json::json;
use tempfile::NamedTempFile;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn sample_document() -> Value {
    json!({
        "version": "v1",
        "timestamp": "2025-10-16T12:00:00Z",
        "compliance_posture": "partially_compliant",
        "organization": { "name": "Acme Corp" },
        "frameworks": [
            { "name": "SOC2", "status": "compliant", "score": 1.0 },
            {
                "name": "ISO27001",
                "status": "partial",
                "score": 0.85,
                "controls": [
                    { "id": "A.5.1", "status": "compliant" },
                    { "id": "A.8.2", "status": "non_compliant" }
                ]
            }
        ],
        "evidence_refs": [
            "https://evidence.example/soc2.pdf",
            { "url": "https://evidence.example/old.pdf", "expires": "2025-01-01T00:00:00Z" },
            { "url": "https://evidence.example/new.pdf", "expires": "2030-01-01T00:00:00Z" }
        ]
    })
}

fn write_document(value: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&serde_json::to_vec(value).unwrap()).unwrap();
    file
}

fn now() -> Timestamp {
    Timestamp::parse("2026-01-01T00:00:00Z").unwrap()
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn read_document_decodes_a_valid_file() {
    let file = write_document(&sample_document());
    let posture = read_document(file.path()).unwrap();
    assert_eq!(posture.frameworks().len(), 2);
    assert_eq!(posture.overall_posture(), CompliancePosture::PartiallyCompliant);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_document(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, DocumentError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn oversized_file_is_rejected_before_decoding() {
    let file = NamedTempFile::new().unwrap();
    file.as_file().set_len(u64::try_from(MAX_DOCUMENT_BYTES).unwrap() + 1).unwrap();
    let err = read_document(file.path()).unwrap_err();
    assert!(matches!(err, DocumentError::TooLarge { limit, .. } if limit == MAX_DOCUMENT_BYTES));
}

#[test]
fn invalid_document_reports_the_decoder_error() {
    let mut document = sample_document();
    document["frameworks"][1]["status"] = json!("mostly");
    let file = write_document(&document);
    match read_document(file.path()).unwrap_err() {
        DocumentError::Decode {
            source: DecodeError::InvalidEnum {
                field,
                value,
            },
            ..
        } => {
            assert_eq!(field, "frameworks[1].status");
            assert_eq!(value, "mostly");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// SECTION: Provider
// ============================================================================

#[test]
fn file_provider_sees_edits_between_requests() {
    let file = write_document(&sample_document());
    let provider = FilePostureProvider::new(file.path());
    assert_eq!(provider.posture().unwrap().frameworks().len(), 2);

    let mut document = sample_document();
    document["frameworks"].as_array_mut().unwrap().pop();
    fs::write(file.path(), serde_json::to_vec(&document).unwrap()).unwrap();
    assert_eq!(provider.posture().unwrap().frameworks().len(), 1);
}

#[test]
fn file_provider_failure_carries_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FilePostureProvider::new(dir.path().join("gone.json"));
    let err = provider.posture().unwrap_err();
    assert!(err.message().contains("gone.json"));
}

// ============================================================================
// SECTION: Summary
// ============================================================================

#[test]
fn summary_counts_frameworks_controls_and_evidence() {
    let file = write_document(&sample_document());
    let summary = PostureSummary::new(&read_document(file.path()).unwrap(), now());
    assert_eq!(summary.version, "v1");
    assert_eq!(summary.organization.as_deref(), Some("Acme Corp"));
    assert_eq!(
        summary.frameworks,
        StatusCounts {
            compliant: 1,
            partial: 1,
            non_compliant: 0,
        }
    );
    assert_eq!(summary.controls, 2);
    assert_eq!(summary.evidence, 3);
    assert_eq!(summary.expired_evidence, 1);
    assert!(summary.declared_matches());
}

#[test]
fn summary_flags_a_declared_posture_that_disagrees() {
    let mut document = sample_document();
    document["compliance_posture"] = json!("compliant");
    let file = write_document(&document);
    let summary = PostureSummary::new(&read_document(file.path()).unwrap(), now());
    assert_eq!(summary.effective, CompliancePosture::Compliant);
    assert_eq!(summary.declared, Some(CompliancePosture::Compliant));
    assert_eq!(summary.aggregated, CompliancePosture::PartiallyCompliant);
    assert!(!summary.declared_matches());
}

#[test]
fn summary_display_lists_the_effective_posture() {
    let file = write_document(&sample_document());
    let text = PostureSummary::new(&read_document(file.path()).unwrap(), now()).to_string();
    assert!(text.contains("compliance_posture: partially_compliant"));
    assert!(text.contains("frameworks: 2 (compliant 1, partial 1, non_compliant 0)"));
    assert!(text.contains("evidence_refs: 3 (1 expired)"));
}
