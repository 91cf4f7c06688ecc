//! Packed Timestamp Normalization
//!
//! The raw export stores time as a `YYYYMMDDHHMM` number which spreadsheet
//! round trips sometimes render in float or scientific notation
//! (`2.02510011230E+11`).

use crate::EngineError;
use chrono::{NaiveDate, NaiveTime};
use common::zero_pad;

/// Width of the packed timestamp
pub const PACKED_TIME_LEN: usize = 12;

/// Date rendering used in reports and as grouping label
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Clock time rendering
pub const TIME_FORMAT: &str = "%H:%M";

const MAX_PACKED: f64 = 999_999_999_999.0;

/// Calendar date and clock time of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    date: NaiveDate,
    time: NaiveTime,
}

impl Timestamp {
    /// Parse a packed `YYYYMMDDHHMM` value
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        let packed = normalize_packed(raw)?;
        let field = |range: std::ops::Range<usize>| -> Result<u32, EngineError> {
            packed[range]
                .parse::<u32>()
                .map_err(|e| EngineError::timestamp(raw, e.to_string()))
        };

        let year = field(0..4)?;
        let month = field(4..6)?;
        let day = field(6..8)?;
        let hour = field(8..10)?;
        let minute = field(10..12)?;

        if year == 0 {
            return Err(EngineError::timestamp(raw, "year 0000 is out of range"));
        }
        let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(|| {
            EngineError::timestamp(raw, format!("invalid date {:04}-{:02}-{:02}", year, month, day))
        })?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            EngineError::timestamp(raw, format!("invalid time {:02}:{:02}", hour, minute))
        })?;

        Ok(Self { date, time })
    }

    /// Calendar date (the daily grouping key)
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Clock time
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Date rendered as `MM/DD/YYYY`
    pub fn date_label(&self) -> String {
        format_date(self.date)
    }

    /// Time rendered as `HH:MM`
    pub fn time_label(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }
}

/// Render a grouping date as `MM/DD/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Coerce a packed timestamp to a 12-digit zero-padded string
pub fn normalize_packed(raw: &str) -> Result<String, EngineError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(EngineError::timestamp(raw, "empty timestamp"));
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        if text.len() > PACKED_TIME_LEN {
            return Err(EngineError::timestamp(raw, "more than 12 digits"));
        }
        return Ok(zero_pad(text, PACKED_TIME_LEN));
    }

    let value: f64 = text
        .parse()
        .map_err(|_| EngineError::timestamp(raw, "not a number"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::timestamp(raw, "not a non-negative finite number"));
    }
    let whole = value.trunc();
    if whole > MAX_PACKED {
        return Err(EngineError::timestamp(raw, "more than 12 digits"));
    }
    Ok(format!("{:012}", whole as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_digits() {
        let ts = Timestamp::parse("202510011230").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(ts.date_label(), "10/01/2025");
        assert_eq!(ts.time_label(), "12:30");
    }

    #[test]
    fn test_parse_scientific_notation() {
        let ts = Timestamp::parse("2.0251001123E+11").unwrap();
        assert_eq!(ts.date_label(), "10/01/2025");
        assert_eq!(ts.time_label(), "12:30");
    }

    #[test]
    fn test_parse_float_rendering() {
        let ts = Timestamp::parse("202512312359.0").unwrap();
        assert_eq!(ts.date_label(), "12/31/2025");
        assert_eq!(ts.time_label(), "23:59");
    }

    #[test]
    fn test_normalize_pads_short_values() {
        assert_eq!(normalize_packed("1").unwrap(), "000000000001");
        assert_eq!(normalize_packed("1.0E+3").unwrap(), "000000001000");
    }

    #[test]
    fn test_invalid_calendar_values() {
        // Truncated scientific rendering lands on day 00
        assert!(Timestamp::parse("2.0251E+11").is_err());
        assert!(Timestamp::parse("202513011230").is_err());
        assert!(Timestamp::parse("202502301230").is_err());
        assert!(Timestamp::parse("202510012460").is_err());
        // 11 digits pad to year 0202, month 51
        assert!(Timestamp::parse("20251001123").is_err());
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(matches!(
            Timestamp::parse("yesterday"),
            Err(EngineError::InvalidTimestamp { .. })
        ));
        assert!(Timestamp::parse("").is_err());
        assert!(Timestamp::parse("-202510011230").is_err());
        assert!(Timestamp::parse("2025100112300").is_err());
    }

    #[test]
    fn test_ordering_follows_calendar() {
        let earlier = Timestamp::parse("202412312359").unwrap();
        let later = Timestamp::parse("202501010000").unwrap();
        assert!(earlier < later);
    }
}
