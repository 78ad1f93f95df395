//! Config load validation tests for opencpx-config.
// crates/opencpx-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards and section defaults.
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use opencpx_config::AuditSinkKind;
use opencpx_config::ConfigError;
use opencpx_config::CpxConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<CpxConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let file = write_config("")?;
    let config = CpxConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.server.bind != "127.0.0.1:8080" || config.server.path != "/cpx" {
        return Err(format!("unexpected server defaults: {:?}", config.server));
    }
    if !config.server.pretty || !config.server.allow_yaml {
        return Err("pretty and allow_yaml should default to true".to_string());
    }
    if config.audit.sink != AuditSinkKind::Stderr {
        return Err("audit sink should default to stderr".to_string());
    }
    if config.document.source.is_some() {
        return Err("document source should default to unset".to_string());
    }
    Ok(())
}

#[test]
fn full_config_parses() -> TestResult {
    let file = write_config(
        r#"
[server]
bind = "0.0.0.0:9090"
path = "/cts"
pretty = false
allow_yaml = false

[audit]
sink = "file"
path = "/var/log/opencpx/audit.jsonl"

[document]
source = "posture.json"
"#,
    )?;
    let config = CpxConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let addr = config.server.bind_addr().map_err(|err| err.to_string())?;
    if addr.port() != 9090 || config.server.path != "/cts" || config.server.pretty {
        return Err(format!("unexpected server config: {:?}", config.server));
    }
    if config.audit.sink != AuditSinkKind::File {
        return Err("audit sink should be file".to_string());
    }
    if config.document.source.as_deref() != Some("posture.json") {
        return Err("document source mismatch".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let path = Path::new("definitely/not/here/opencpx.toml");
    assert_invalid(CpxConfig::load(Some(path)), "config io error")
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(CpxConfig::load(Some(Path::new(&long_path))), "config path exceeds max length")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'#'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(CpxConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(CpxConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config("[server\nbind = ")?;
    assert_invalid(CpxConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn rejects_invalid_bind_address() -> TestResult {
    assert_invalid(CpxConfig::from_toml_str("[server]\nbind = \"localhost\""), "server.bind")
}

#[test]
fn rejects_relative_endpoint_path() -> TestResult {
    assert_invalid(CpxConfig::from_toml_str("[server]\npath = \"cpx\""), "server.path")
}

#[test]
fn rejects_endpoint_path_with_query() -> TestResult {
    assert_invalid(CpxConfig::from_toml_str("[server]\npath = \"/cpx?x=1\""), "server.path")
}

#[test]
fn rejects_endpoint_path_with_route_syntax() -> TestResult {
    for path in ["/cpx/{id}", "/cpx/:id", "/cpx/*rest"] {
        let toml = format!("[server]\npath = \"{path}\"");
        assert_invalid(CpxConfig::from_toml_str(&toml), "server.path")?;
    }
    Ok(())
}

#[test]
fn file_sink_requires_path() -> TestResult {
    assert_invalid(CpxConfig::from_toml_str("[audit]\nsink = \"file\""), "audit.path")
}

#[test]
fn rejects_unknown_sink() -> TestResult {
    assert_invalid(CpxConfig::from_toml_str("[audit]\nsink = \"syslog\""), "config parse error")
}

#[test]
fn rejects_empty_document_source() -> TestResult {
    assert_invalid(
        CpxConfig::from_toml_str("[document]\nsource = \"  \""),
        "document.source must be non-empty",
    )
}

#[test]
fn none_sink_needs_no_path() -> TestResult {
    let config =
        CpxConfig::from_toml_str("[audit]\nsink = \"none\"").map_err(|err| err.to_string())?;
    if config.audit.sink == AuditSinkKind::Disabled { Ok(()) } else { Err("expected none sink".to_string()) }
}
