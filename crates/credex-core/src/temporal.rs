//! # Temporal Types
//!
//! UTC-only timestamp type for credex. All timestamps are held in UTC with
//! second-level precision and render with a `Z` suffix.
//!
//! Offer tokens carry their expiry as an RFC 3339 string inside a URL, and
//! the redemption boundary is inclusive to the second, so sub-second
//! precision is truncated at construction.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A UTC timestamp with second-level precision.
///
/// Serializes to `YYYY-MM-DDTHH:MM:SSZ` (e.g. `2024-01-01T00:15:00Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current UTC time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating
    /// sub-second precision.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(0))
    }

    /// Parse an RFC 3339 string. Non-UTC offsets are converted to UTC.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| Self::from_datetime(dt.with_timezone(&Utc)))
            .map_err(|e| ValidationError::InvalidTimestamp {
                value: value.to_string(),
                reason: e.to_string(),
            })
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The timestamp shifted forward by `duration`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TimestampOverflow`] if the result lies
    /// outside the representable range.
    pub fn plus(&self, duration: Duration) -> Result<Self, ValidationError> {
        self.0
            .checked_add_signed(duration)
            .map(Self::from_datetime)
            .ok_or_else(|| ValidationError::TimestampOverflow {
                value: self.to_canonical_string(),
                seconds: duration.num_seconds(),
            })
    }

    /// Whether `now` lies strictly after this timestamp.
    ///
    /// Equality is not "after": a token is still valid during the second
    /// named by its `expires`.
    pub fn is_passed_at(&self, now: &DateTime<Utc>) -> bool {
        *now > self.0
    }

    /// Return the timestamp as an RFC 3339 string with Z suffix,
    /// truncated to seconds.
    pub fn to_canonical_string(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    #[test]
    fn canonical_string_has_z_suffix() {
        let ts = Timestamp::from_datetime(at(0, 15, 0));
        assert_eq!(ts.to_canonical_string(), "2024-01-01T00:15:00Z");
    }

    #[test]
    fn subseconds_are_truncated() {
        let dt = at(0, 0, 0) + Duration::milliseconds(750);
        assert_eq!(Timestamp::from_datetime(dt), Timestamp::from_datetime(at(0, 0, 0)));
    }

    #[test]
    fn parse_converts_offsets_to_utc() {
        let ts = Timestamp::parse("2024-01-01T02:15:00+02:00").unwrap();
        assert_eq!(ts.to_canonical_string(), "2024-01-01T00:15:00Z");
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = Timestamp::parse("tomorrow").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimestamp { .. }));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let expires = Timestamp::from_datetime(at(0, 15, 0));
        assert!(!expires.is_passed_at(&at(0, 14, 59)));
        assert!(!expires.is_passed_at(&at(0, 15, 0)));
        assert!(expires.is_passed_at(&at(0, 15, 1)));
    }

    #[test]
    fn plus_fifteen_minutes() {
        let start = Timestamp::from_datetime(at(0, 0, 0));
        assert_eq!(
            start.plus(Duration::minutes(15)).unwrap().to_canonical_string(),
            "2024-01-01T00:15:00Z"
        );
    }

    #[test]
    fn plus_out_of_range_is_an_error() {
        let start = Timestamp::from_datetime(at(0, 0, 0));
        let err = start.plus(Duration::seconds(9_000_000_000_000)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TimestampOverflow {
                value: "2024-01-01T00:00:00Z".into(),
                seconds: 9_000_000_000_000,
            }
        );
    }

    #[test]
    fn serde_uses_canonical_form() {
        let ts = Timestamp::from_datetime(at(12, 0, 0));
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-01-01T12:00:00Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
