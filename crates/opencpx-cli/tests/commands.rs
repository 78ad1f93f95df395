// crates/opencpx-cli/tests/commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests running the opencpx binary.
// Purpose: Ensure commands report results and fail closed on bad input.
// Dependencies: opencpx binary
// ============================================================================

//! ## Overview
//! Runs the `opencpx` binary against temporary documents and checks exit
//! codes and output.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn opencpx_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_opencpx"))
}

fn write_document(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_vec(value).expect("encode fixture")).expect("write fixture");
    path
}

fn run(args: &[&str], file: &Path) -> Output {
    Command::new(opencpx_bin())
        .args(args)
        .arg(file)
        .output()
        .expect("run opencpx")
}

fn sample_document(declared: &str) -> Value {
    json!({
        "version": "v1",
        "timestamp": "2025-10-16T12:00:00Z",
        "compliance_posture": declared,
        "frameworks": [
            { "name": "SOC2", "status": "compliant", "score": 1.0 },
            { "name": "ISO27001", "status": "partial", "score": 0.85 }
        ]
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies `check` prints the effective posture for a valid document.
#[test]
fn check_prints_summary() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_document(&dir, "posture.json", &sample_document("partially_compliant"));

    let output = run(&["check"], &path);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("compliance_posture: partially_compliant"), "{stdout}");
}

/// Verifies `check` fails closed with the decoder's field path.
#[test]
fn check_rejects_invalid_document() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut document = sample_document("partially_compliant");
    document["frameworks"][0]["score"] = json!(1.5);
    let path = write_document(&dir, "posture.json", &document);

    let output = run(&["check"], &path);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("frameworks[0].score"), "{stderr}");
}

/// Verifies `aggregate` reports agreement with the declared posture.
#[test]
fn aggregate_reports_match() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_document(&dir, "posture.json", &sample_document("partially_compliant"));

    let output = run(&["aggregate", "--strict"], &path);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aggregated: partially_compliant"), "{stdout}");
    assert!(stdout.contains("matches: true"), "{stdout}");
}

/// Verifies `aggregate --strict` fails when the declared posture disagrees.
#[test]
fn aggregate_strict_fails_on_mismatch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_document(&dir, "posture.json", &sample_document("compliant"));

    let lenient = run(&["aggregate"], &path);
    assert!(lenient.status.success());
    assert!(String::from_utf8_lossy(&lenient.stdout).contains("matches: false"));

    let strict = run(&["aggregate", "--strict"], &path);
    assert!(!strict.status.success());
}

/// Verifies `convert` emits JSON that decodes to the same tree.
#[test]
fn convert_json_round_trips() {
    let dir = tempfile::tempdir().expect("temp dir");
    let document = sample_document("partially_compliant");
    let path = write_document(&dir, "posture.json", &document);

    let output = run(&["convert", "--format", "json"], &path);
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value, document);
}

/// Verifies `convert --format yaml` emits YAML keys.
#[test]
fn convert_yaml_emits_yaml() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_document(&dir, "posture.json", &sample_document("partially_compliant"));

    let output = run(&["convert", "--format", "yaml"], &path);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("compliance_posture: partially_compliant"), "{stdout}");
    assert!(!stdout.trim_start().starts_with('{'));
}

/// Verifies `serve` fails closed without a document source.
#[test]
fn serve_requires_a_document() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config_path = dir.path().join("opencpx.toml");
    fs::write(&config_path, "[server]\nbind = \"127.0.0.1:0\"\n").expect("write config");

    let output = Command::new(opencpx_bin())
        .args(["serve", "--config"])
        .arg(&config_path)
        .output()
        .expect("run opencpx");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no document to serve"), "{stderr}");
}
