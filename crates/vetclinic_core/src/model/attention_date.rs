//! Attention date/time normalization for medical records.
//!
//! # Responsibility
//! - Accept structured or textual date/time input from callers.
//! - Produce the canonical local-time form persisted in `medical_records`.
//!
//! # Invariants
//! - Canonical text is zero-padded `YYYY-MM-DD HH:MM:SS` in local time.
//! - Sub-second precision is truncated, never rounded.
//! - Unparsable input is rejected before anything is written.

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// `strftime` pattern of the persisted attention date.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

/// Rejected date input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateError {
    input: String,
}

impl InvalidDateError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Display for InvalidDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid date `{}`", self.input)
    }
}

impl Error for InvalidDateError {}

/// Local wall-clock attention date with whole-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttentionDate(NaiveDateTime);

impl AttentionDate {
    /// Current local time, truncated to the second.
    pub fn now() -> Self {
        Self::from_naive(Local::now().naive_local())
    }

    /// Treats `value` as local wall-clock time.
    pub fn from_naive(value: NaiveDateTime) -> Self {
        Self(value.trunc_subsecs(0))
    }

    /// Converts a zoned instant into local wall-clock time.
    pub fn from_zoned<Tz: TimeZone>(value: &DateTime<Tz>) -> Self {
        Self::from_naive(value.with_timezone(&Local).naive_local())
    }

    /// Parses any accepted textual form.
    ///
    /// Accepted: RFC 3339 with offset or `Z` (converted to local time),
    /// `YYYY-MM-DD[T ]HH:MM[:SS[.fff]]` (taken as local time), and
    /// `YYYY-MM-DD` (local midnight).
    pub fn parse(text: &str) -> Result<Self, InvalidDateError> {
        parse_date_text(text)
            .map(Self::from_naive)
            .ok_or_else(|| InvalidDateError {
                input: text.to_string(),
            })
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn to_canonical(&self) -> String {
        self.to_string()
    }
}

impl Display for AttentionDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(CANONICAL_FORMAT))
    }
}

impl FromStr for AttentionDate {
    type Err = InvalidDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AttentionDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AttentionDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Date value as supplied by a caller, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DateInput {
    /// Local wall-clock time.
    Naive(NaiveDateTime),
    /// An instant with a known offset; converted to local time.
    Zoned(DateTime<FixedOffset>),
    Text(String),
}

impl DateInput {
    /// Resolves the input to its canonical attention date.
    pub fn normalize(&self) -> Result<AttentionDate, InvalidDateError> {
        match self {
            Self::Naive(value) => Ok(AttentionDate::from_naive(*value)),
            Self::Zoned(value) => Ok(AttentionDate::from_zoned(value)),
            Self::Text(text) => AttentionDate::parse(text),
        }
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::Naive(value)
    }
}

impl From<DateTime<FixedOffset>> for DateInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Zoned(value)
    }
}

impl From<DateTime<Local>> for DateInput {
    fn from(value: DateTime<Local>) -> Self {
        Self::Zoned(value.fixed_offset())
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Zoned(value.fixed_offset())
    }
}

impl From<AttentionDate> for DateInput {
    fn from(value: AttentionDate) -> Self {
        Self::Naive(value.as_naive())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

fn parse_date_text(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
        return Some(zoned.with_timezone(&Local).naive_local());
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
            return Some(value);
        }
    }

    NaiveDate::parse_from_str(text, DATE_ONLY_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::{AttentionDate, DateInput};
    use chrono::{Local, NaiveDate, TimeZone, Utc};

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn iso_text_and_structured_value_share_canonical_form() {
        let from_text = DateInput::from("2024-03-05T14:30:00").normalize().unwrap();
        let from_value = DateInput::from(naive(2024, 3, 5, 14, 30, 0))
            .normalize()
            .unwrap();

        assert_eq!(from_text.to_canonical(), "2024-03-05 14:30:00");
        assert_eq!(from_value.to_canonical(), "2024-03-05 14:30:00");
    }

    #[test]
    fn accepts_space_separator_minutes_and_fractions() {
        assert_eq!(
            AttentionDate::parse("2024-03-05 14:30:07").unwrap().to_string(),
            "2024-03-05 14:30:07"
        );
        assert_eq!(
            AttentionDate::parse("2024-03-05T14:30").unwrap().to_string(),
            "2024-03-05 14:30:00"
        );
        assert_eq!(
            AttentionDate::parse(" 2024-03-05T14:30:07.999 ").unwrap().to_string(),
            "2024-03-05 14:30:07"
        );
    }

    #[test]
    fn date_only_text_is_local_midnight() {
        assert_eq!(
            AttentionDate::parse("2024-12-01").unwrap().to_string(),
            "2024-12-01 00:00:00"
        );
    }

    #[test]
    fn zoned_text_is_converted_to_local_time() {
        let expected = Utc
            .with_ymd_and_hms(2024, 3, 5, 14, 30, 0)
            .unwrap()
            .with_timezone(&Local)
            .naive_local()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        let parsed = AttentionDate::parse("2024-03-05T14:30:00Z").unwrap();
        assert_eq!(parsed.to_string(), expected);

        let structured = DateInput::from(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap())
            .normalize()
            .unwrap();
        assert_eq!(structured, parsed);
    }

    #[test]
    fn pads_single_digit_components() {
        let value = AttentionDate::from_naive(naive(987, 1, 2, 3, 4, 5));
        assert_eq!(value.to_string(), "0987-01-02 03:04:05");
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        for input in ["not-a-date", "", "   ", "2024-02-30", "2024-13-01 10:00:00", "14:30"] {
            let err = AttentionDate::parse(input).unwrap_err();
            assert_eq!(err.input(), input);
        }
    }

    #[test]
    fn serializes_as_canonical_text() {
        let value = AttentionDate::from_naive(naive(2024, 3, 5, 9, 0, 0));
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            "\"2024-03-05 09:00:00\""
        );
        let back: AttentionDate = serde_json::from_str("\"2024-03-05 09:00:00\"").unwrap();
        assert_eq!(back, value);
    }
}
