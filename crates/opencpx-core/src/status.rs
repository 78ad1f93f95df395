// crates/opencpx-core/src/status.rs
// ============================================================================
// Module: OpenCPX Status Vocabulary
// Description: Closed status enums for postures, frameworks, and controls.
// Purpose: Keep the root and framework vocabularies distinct at the type level.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! OpenCPX uses three overlapping status vocabularies. The root posture adds
//! `unknown` and spells the middle state `partially_compliant`, while
//! frameworks and controls use `partial`. Each vocabulary is its own enum so
//! a framework status can never be written where a posture is expected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Raised when a wire string does not name a known status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {vocabulary} value: {value}")]
pub struct UnknownStatus {
    /// Vocabulary the value was checked against.
    pub vocabulary: &'static str,
    /// Offending input value.
    pub value: String,
}

// ============================================================================
// SECTION: Compliance Posture
// ============================================================================

/// Overall compliance posture of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompliancePosture {
    /// Every framework is compliant.
    Compliant,
    /// At least one framework is compliant, but not all.
    PartiallyCompliant,
    /// No framework is compliant.
    NonCompliant,
    /// No frameworks were evaluated.
    #[default]
    Unknown,
}

impl CompliancePosture {
    /// Every posture value in wire order.
    pub const ALL: [Self; 4] =
        [Self::Compliant, Self::PartiallyCompliant, Self::NonCompliant, Self::Unknown];

    /// Returns the wire string for the posture.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::PartiallyCompliant => "partially_compliant",
            Self::NonCompliant => "non_compliant",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CompliancePosture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompliancePosture {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|posture| posture.as_str() == value).ok_or_else(|| {
            UnknownStatus {
                vocabulary: "compliance posture",
                value: value.to_string(),
            }
        })
    }
}

// ============================================================================
// SECTION: Framework Status
// ============================================================================

/// Evaluation status of a single framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkStatus {
    /// Framework requirements are met.
    Compliant,
    /// Framework requirements are partly met.
    Partial,
    /// Framework requirements are not met.
    NonCompliant,
}

impl FrameworkStatus {
    /// Every framework status in wire order.
    pub const ALL: [Self; 3] = [Self::Compliant, Self::Partial, Self::NonCompliant];

    /// Returns the wire string for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::Partial => "partial",
            Self::NonCompliant => "non_compliant",
        }
    }
}

impl fmt::Display for FrameworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameworkStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|status| status.as_str() == value).ok_or_else(|| {
            UnknownStatus {
                vocabulary: "framework status",
                value: value.to_string(),
            }
        })
    }
}

// ============================================================================
// SECTION: Control Status
// ============================================================================

/// Evaluation status of a single control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    /// Control is satisfied.
    Compliant,
    /// Control is partly satisfied.
    Partial,
    /// Control is not satisfied.
    NonCompliant,
}

impl ControlStatus {
    /// Every control status in wire order.
    pub const ALL: [Self; 3] = [Self::Compliant, Self::Partial, Self::NonCompliant];

    /// Returns the wire string for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::Partial => "partial",
            Self::NonCompliant => "non_compliant",
        }
    }
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|status| status.as_str() == value).ok_or_else(|| {
            UnknownStatus {
                vocabulary: "control status",
                value: value.to_string(),
            }
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
