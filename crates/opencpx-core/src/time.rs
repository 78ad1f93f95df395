// crates/opencpx-core/src/time.rs
// ============================================================================
// Module: OpenCPX Time Model
// Description: UTC timestamps with RFC3339 wire rendering.
// Purpose: Give every document timestamp one canonical form.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Document timestamps are UTC instants rendered as RFC3339 with a `Z`
//! designator. Parsing accepts `Z` or any explicit offset and normalizes to
//! UTC; strings without an offset are rejected. The wall clock is read only
//! by [`Timestamp::now`], which the posture builder calls once at creation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;
use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when converting timestamps to or from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// Input is not an RFC3339 timestamp with an explicit offset.
    #[error("invalid rfc3339 timestamp: {0}")]
    Parse(String),
    /// Timestamp cannot be rendered as RFC3339.
    #[error("timestamp cannot be formatted: {0}")]
    Format(String),
    /// Unix time is outside the representable range.
    #[error("unix time out of range: {0}")]
    OutOfRange(i128),
}

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// UTC instant used for `timestamp` and evidence expiry fields.
///
/// # Invariants
/// - The stored offset is always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Captures the current wall-clock time in UTC.
    #[must_use]
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Wraps an existing date-time, converting it to UTC.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::OutOfRange`] when the UTC instant falls
    /// outside the supported year range.
    pub fn from_offset_date_time(value: OffsetDateTime) -> Result<Self, TimestampError> {
        value
            .checked_to_offset(UtcOffset::UTC)
            .map(Self)
            .ok_or_else(|| TimestampError::OutOfRange(value.unix_timestamp_nanos() / 1_000_000))
    }

    /// Builds a timestamp from unix epoch milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::OutOfRange`] when the value cannot be represented.
    pub fn from_unix_millis(millis: i64) -> Result<Self, TimestampError> {
        let nanos = i128::from(millis) * 1_000_000;
        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map(Self)
            .map_err(|_| TimestampError::OutOfRange(i128::from(millis)))
    }

    /// Parses an RFC3339 string that carries an explicit offset.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::Parse`] when the input is malformed, lacks an
    /// offset, or normalizes to an instant outside the supported range.
    pub fn parse(value: &str) -> Result<Self, TimestampError> {
        OffsetDateTime::parse(value, &Rfc3339)
            .ok()
            .and_then(|parsed| Self::from_offset_date_time(parsed).ok())
            .ok_or_else(|| TimestampError::Parse(value.to_string()))
    }

    /// Renders the timestamp as RFC3339 with a `Z` designator.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::Format`] when the year falls outside RFC3339 range.
    pub fn to_rfc3339(&self) -> Result<String, TimestampError> {
        self.0.format(&Rfc3339).map_err(|err| TimestampError::Format(err.to_string()))
    }

    /// Returns the underlying UTC date-time.
    #[must_use]
    pub const fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }

    /// Returns unix epoch milliseconds, truncating sub-millisecond precision.
    #[must_use]
    pub fn unix_millis(&self) -> i128 {
        self.0.unix_timestamp_nanos() / 1_000_000
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.to_rfc3339().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
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

    use super::Timestamp;

    #[test]
    fn z_and_explicit_utc_offset_are_equivalent() {
        let zulu = Timestamp::parse("2025-10-16T12:00:00Z").unwrap();
        let offset = Timestamp::parse("2025-10-16T12:00:00+00:00").unwrap();
        assert_eq!(zulu, offset);
    }

    #[test]
    fn non_utc_offsets_normalize_to_utc() {
        let shifted = Timestamp::parse("2025-10-16T14:00:00+02:00").unwrap();
        assert_eq!(shifted.to_rfc3339().unwrap(), "2025-10-16T12:00:00Z");
    }

    #[test]
    fn missing_offset_is_rejected() {
        assert!(Timestamp::parse("2025-10-16T12:00:00").is_err());
        assert!(Timestamp::parse("2025-10-16").is_err());
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn offset_pushing_past_year_range_is_rejected() {
        assert!(Timestamp::parse("9999-12-31T23:30:00-01:00").is_err());
        assert!(Timestamp::parse("-9999-01-01T00:30:00+01:00").is_err());
        assert!(Timestamp::parse("9999-12-31T23:30:00+01:00").is_ok());
    }

    #[test]
    fn renders_with_zulu_designator() {
        let ts = Timestamp::from_unix_millis(1_760_616_000_000).unwrap();
        assert_eq!(ts.to_rfc3339().unwrap(), "2025-10-16T12:00:00Z");
    }

    #[test]
    fn subsecond_precision_survives_text_round_trip() {
        let ts = Timestamp::parse("2025-10-16T12:00:00.123456789Z").unwrap();
        let again = Timestamp::parse(&ts.to_rfc3339().unwrap()).unwrap();
        assert_eq!(ts, again);
    }
}
