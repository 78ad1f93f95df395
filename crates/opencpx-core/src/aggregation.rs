// crates/opencpx-core/src/aggregation.rs
// ============================================================================
// Module: OpenCPX Posture Aggregation
// Description: Rollup of framework statuses into an overall posture.
// Purpose: Derive the default `compliance_posture` of a document.
// Dependencies: crate::{model, status}
// ============================================================================

//! ## Overview
//! Aggregation only distinguishes `compliant` from everything else:
//! - no frameworks: `unknown`
//! - every framework compliant: `compliant`
//! - at least one compliant: `partially_compliant`
//! - otherwise: `non_compliant`
//!
//! A list made only of `partial` frameworks therefore rolls up to
//! `non_compliant`. Existing consumers depend on this rollup, so `partial`
//! carries no weight of its own here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::model::Framework;
use crate::status::CompliancePosture;
use crate::status::FrameworkStatus;

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Computes the overall posture from an ordered framework list.
#[must_use]
pub fn aggregate(frameworks: &[Framework]) -> CompliancePosture {
    aggregate_statuses(frameworks.iter().map(Framework::status))
}

/// Computes the overall posture from bare framework statuses.
#[must_use]
pub fn aggregate_statuses<I>(statuses: I) -> CompliancePosture
where
    I: IntoIterator<Item = FrameworkStatus>,
{
    let mut seen_any = false;
    let mut all_compliant = true;
    let mut any_compliant = false;
    for status in statuses {
        seen_any = true;
        if status == FrameworkStatus::Compliant {
            any_compliant = true;
        } else {
            all_compliant = false;
        }
    }
    if !seen_any {
        return CompliancePosture::Unknown;
    }
    if all_compliant {
        CompliancePosture::Compliant
    } else if any_compliant {
        CompliancePosture::PartiallyCompliant
    } else {
        CompliancePosture::NonCompliant
    }
}
