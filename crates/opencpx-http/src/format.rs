// crates/opencpx-http/src/format.rs
// ============================================================================
// Module: Response Formats
// Description: Query-selected renderings of a posture document.
// Purpose: Render JSON through the core codec and YAML through serde_yaml.
// Dependencies: opencpx-core, serde, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! `?format=json` (or no `format` parameter) selects the canonical JSON
//! encoding. `?format=yaml` renders the same document tree as YAML when the
//! endpoint allows it. Any other value is rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use opencpx_core::EncodeError;
use opencpx_core::EncodedPosture;
use opencpx_core::Posture;
use opencpx_core::encode;
use opencpx_core::encode_pretty;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Media type of YAML renderings.
pub const YAML_CONTENT_TYPE: &str = "application/yaml";

// ============================================================================
// SECTION: Formats
// ============================================================================

/// Response rendering selected by the `format` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Canonical JSON encoding.
    Json,
    /// YAML rendering of the same document.
    Yaml,
}

impl ResponseFormat {
    /// Resolves the format from an optional query value.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`] for unknown values, and for `yaml` when
    /// YAML is disabled.
    pub fn from_query(value: Option<&str>, allow_yaml: bool) -> Result<Self, UnsupportedFormat> {
        match value {
            None | Some("json") => Ok(Self::Json),
            Some("yaml") if allow_yaml => Ok(Self::Yaml),
            Some(other) => Err(UnsupportedFormat(other.to_string())),
        }
    }

    /// Returns the query label for the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Requested format is unknown or disabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported format: {0}")]
pub struct UnsupportedFormat(pub String);

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Failures while rendering a posture for a response.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Canonical JSON encoding failed.
    #[error(transparent)]
    Json(#[from] EncodeError),
    /// YAML rendering failed.
    #[error("yaml encoding failed: {0}")]
    Yaml(String),
}

/// Renders a posture in the requested format.
///
/// # Errors
///
/// Returns [`RenderError`] when serialization fails.
pub fn render(
    posture: &Posture,
    format: ResponseFormat,
    pretty: bool,
) -> Result<EncodedPosture, RenderError> {
    match format {
        ResponseFormat::Json if pretty => Ok(encode_pretty(posture)?),
        ResponseFormat::Json => Ok(encode(posture)?),
        ResponseFormat::Yaml => {
            let text =
                serde_yaml::to_string(posture).map_err(|err| RenderError::Yaml(err.to_string()))?;
            Ok(EncodedPosture {
                bytes: text.into_bytes(),
                content_type: YAML_CONTENT_TYPE,
            })
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        reason = "Test-only assertions."
    )]

    use super::*;

    #[test]
    fn absent_and_json_select_json() {
        assert_eq!(ResponseFormat::from_query(None, false), Ok(ResponseFormat::Json));
        assert_eq!(ResponseFormat::from_query(Some("json"), false), Ok(ResponseFormat::Json));
    }

    #[test]
    fn yaml_requires_opt_in() {
        assert_eq!(ResponseFormat::from_query(Some("yaml"), true), Ok(ResponseFormat::Yaml));
        assert!(ResponseFormat::from_query(Some("yaml"), false).is_err());
    }

    #[test]
    fn unknown_and_differently_cased_formats_are_rejected() {
        for value in ["xml", "JSON", "", "yml"] {
            assert!(ResponseFormat::from_query(Some(value), true).is_err(), "{value}");
        }
    }
}
