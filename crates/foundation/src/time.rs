//! Time primitives.
//!
//! Dataset providers deliver acquisition/publication dates in whatever shape
//! their catalog happens to use: ISO dates, full timestamps, or raw epoch
//! milliseconds. Everything is normalized to [`EpochMillis`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Milliseconds since the Unix epoch (UTC).
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EpochMillis(pub i64);

impl EpochMillis {
    pub const EPOCH: EpochMillis = EpochMillis(0);

    /// Parse a textual date. Offset-less values are interpreted as UTC.
    pub fn parse(text: &str) -> Result<Self, TimeParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TimeParseError::Empty);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self(dt.timestamp_millis()));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
            return Ok(Self(dt.timestamp_millis()));
        }
        for fmt in NAIVE_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                return Ok(Self(dt.and_utc().timestamp_millis()));
            }
        }
        for fmt in NAIVE_DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
                return Ok(Self::from_date(d));
            }
        }

        // Partial dates: "2021-06" and "2021".
        if let Some((y, m)) = text.split_once('-')
            && let (Ok(y), Ok(m)) = (y.parse::<i32>(), m.parse::<u32>())
            && let Some(d) = NaiveDate::from_ymd_opt(y, m, 1)
        {
            return Ok(Self::from_date(d));
        }
        if text.len() == 4
            && let Ok(y) = text.parse::<i32>()
            && let Some(d) = NaiveDate::from_ymd_opt(y, 1, 1)
        {
            return Ok(Self::from_date(d));
        }

        Err(TimeParseError::Unrecognized(text.to_string()))
    }

    fn from_date(d: NaiveDate) -> Self {
        Self(
            d.and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis())
                .unwrap_or(0),
        )
    }
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("empty date value")]
    Empty,
    #[error("unrecognized date value: {0}")]
    Unrecognized(String),
    #[error("date value is not a string or number")]
    NotDateLike,
}

/// A date-like value as found in provider metadata.
///
/// Deserialization never fails: anything that is neither a number nor a string
/// lands in [`DateLike::Other`] and is treated as unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateLike {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
    Other(serde_json::Value),
}

impl DateLike {
    pub fn to_epoch_millis(&self) -> Result<EpochMillis, TimeParseError> {
        match self {
            DateLike::Millis(ms) => Ok(EpochMillis(*ms)),
            DateLike::FractionalMillis(ms) if ms.is_finite() => Ok(EpochMillis(ms.trunc() as i64)),
            DateLike::FractionalMillis(_) => Err(TimeParseError::NotDateLike),
            DateLike::Text(text) => EpochMillis::parse(text),
            DateLike::Other(_) => Err(TimeParseError::NotDateLike),
        }
    }

    /// Whether the value counts as "present" for alias fallback purposes.
    /// Empty strings, zero and non-date JSON values do not.
    pub fn is_present(&self) -> bool {
        match self {
            DateLike::Millis(ms) => *ms != 0,
            DateLike::FractionalMillis(ms) => *ms != 0.0 && !ms.is_nan(),
            DateLike::Text(text) => !text.is_empty(),
            DateLike::Other(v) => match v {
                serde_json::Value::Null => false,
                serde_json::Value::Bool(b) => *b,
                _ => true,
            },
        }
    }
}

impl From<&str> for DateLike {
    fn from(text: &str) -> Self {
        DateLike::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{DateLike, EpochMillis, TimeParseError};
    use pretty_assertions::assert_eq;

    #[test]
    fn iso_date_is_midnight_utc() {
        assert_eq!(EpochMillis::parse("1970-01-02").unwrap(), EpochMillis(86_400_000));
    }

    #[test]
    fn full_timestamps_respect_offsets() {
        let utc = EpochMillis::parse("2021-01-01T00:00:00Z").unwrap();
        let plus_one = EpochMillis::parse("2021-01-01T01:00:00+01:00").unwrap();
        assert_eq!(utc, plus_one);
        assert_eq!(EpochMillis::parse("2021-01-01T00:00:00").unwrap(), utc);
        assert_eq!(EpochMillis::parse("2021-01-01").unwrap(), utc);
    }

    #[test]
    fn partial_dates_resolve_to_first_day() {
        assert_eq!(
            EpochMillis::parse("2021").unwrap(),
            EpochMillis::parse("2021-01-01").unwrap()
        );
        assert_eq!(
            EpochMillis::parse("2021-06").unwrap(),
            EpochMillis::parse("2021-06-01").unwrap()
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(EpochMillis::parse("   "), Err(TimeParseError::Empty));
        assert!(matches!(
            EpochMillis::parse("sometime last spring"),
            Err(TimeParseError::Unrecognized(_))
        ));
    }

    #[test]
    fn date_like_deserializes_any_json() {
        let values: Vec<DateLike> =
            serde_json::from_str(r#"[1609459200000, 1.5, "2021-01-01", true, null, {"a": 1}]"#)
                .unwrap();
        assert_eq!(values[0], DateLike::Millis(1_609_459_200_000));
        assert_eq!(values[1], DateLike::FractionalMillis(1.5));
        assert_eq!(values[2], DateLike::from("2021-01-01"));
        assert!(matches!(values[3], DateLike::Other(_)));
        assert!(matches!(values[4], DateLike::Other(_)));
        assert_eq!(
            values[2].to_epoch_millis().unwrap(),
            values[0].to_epoch_millis().unwrap()
        );
        assert_eq!(values[5].to_epoch_millis(), Err(TimeParseError::NotDateLike));
    }

    #[test]
    fn presence_mirrors_falsy_values() {
        assert!(!DateLike::from("").is_present());
        assert!(!DateLike::Millis(0).is_present());
        assert!(DateLike::from("garbage").is_present());
        assert!(DateLike::Millis(1).is_present());
    }
}
