//! Common Utilities
//!
//! Numeric parsing and rounding helpers used across the KQI crates

use thiserror::Error;
use tracing::trace;

/// Largest integer an f64 represents exactly
pub const MAX_EXACT_F64: f64 = 9_007_199_254_740_992.0;

/// Errors raised while parsing numeric cell values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("not a number: {0:?}")]
    NotANumber(String),

    #[error("negative value: {0:?}")]
    Negative(String),

    #[error("value out of range: {0:?}")]
    OutOfRange(String),
}

/// Round half to even (banker's rounding) to an integral value
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Round to `places` decimals by scaling, rounding half to even and unscaling
pub fn round_half_even_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    let rounded = (value * scale).round_ties_even() / scale;
    trace!("Rounded {} to {} ({} places)", value, rounded, places);
    rounded
}

/// Parse a summed counter cell
///
/// Empty cells count as zero. Any finite non-negative number is accepted,
/// fractional sums included.
pub fn parse_counter(raw: &str) -> Result<f64, ValueError> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(0.0);
    }
    let value: f64 = text
        .parse()
        .map_err(|_| ValueError::NotANumber(text.to_string()))?;
    if !value.is_finite() {
        return Err(ValueError::NotANumber(text.to_string()));
    }
    if value < 0.0 {
        return Err(ValueError::Negative(text.to_string()));
    }
    Ok(value)
}

/// Parse a number and keep its integral part (`"123.0"` and `"1.5"` give 123 and 1)
pub fn parse_integral(raw: &str) -> Result<u64, ValueError> {
    let text = raw.trim();
    let value: f64 = text
        .parse()
        .map_err(|_| ValueError::NotANumber(text.to_string()))?;
    if !value.is_finite() {
        return Err(ValueError::NotANumber(text.to_string()));
    }
    let whole = value.trunc();
    if whole < 0.0 {
        return Err(ValueError::Negative(text.to_string()));
    }
    if whole > MAX_EXACT_F64 {
        return Err(ValueError::OutOfRange(text.to_string()));
    }
    Ok(whole as u64)
}

/// Parse an optional float cell; empty cells are `None`
pub fn parse_optional_f64(raw: &str) -> Result<Option<f64>, ValueError> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| ValueError::NotANumber(text.to_string()))
}

/// Left-pad with zeros to `width` characters
pub fn zero_pad(text: &str, width: usize) -> String {
    format!("{:0>width$}", text, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_even_integers() {
        assert_eq!(round_half_even(0.5), 0.0);
        assert_eq!(round_half_even(1.5), 2.0);
        assert_eq!(round_half_even(2.5), 2.0);
        assert_eq!(round_half_even(3.5), 4.0);
        assert_eq!(round_half_even(-2.5), -2.0);
        assert_eq!(round_half_even(10.4), 10.0);
        assert_eq!(round_half_even(10.6), 11.0);
    }

    #[test]
    fn test_round_half_even_two_places() {
        // 0.125 and 0.375 are exact in binary, so these are true ties
        assert_eq!(round_half_even_to(0.125, 2), 0.12);
        assert_eq!(round_half_even_to(0.375, 2), 0.38);
        assert_eq!(round_half_even_to(33.333333, 2), 33.33);
        assert_eq!(round_half_even_to(0.0, 2), 0.0);
        assert_eq!(round_half_even_to(0.625, 2), 0.62);
        // 2.675 * 100 is exactly 267.5 once scaled, so it ties to 268
        assert_eq!(round_half_even_to(2.675, 2), 2.68);
    }

    #[test]
    fn test_parse_counter() {
        assert_eq!(parse_counter("42"), Ok(42.0));
        assert_eq!(parse_counter(" 7 "), Ok(7.0));
        assert_eq!(parse_counter(""), Ok(0.0));
        assert_eq!(parse_counter("12.0"), Ok(12.0));
        assert_eq!(parse_counter("1.2E+3"), Ok(1200.0));
    }

    #[test]
    fn test_parse_counter_keeps_fractions() {
        assert_eq!(parse_counter("100.5"), Ok(100.5));
        assert_eq!(parse_counter("0.25"), Ok(0.25));
    }

    #[test]
    fn test_parse_counter_rejects_bad_values() {
        assert!(matches!(parse_counter("-3"), Err(ValueError::Negative(_))));
        assert!(matches!(parse_counter("-0.5"), Err(ValueError::Negative(_))));
        assert!(matches!(parse_counter("abc"), Err(ValueError::NotANumber(_))));
        assert!(matches!(parse_counter("NaN"), Err(ValueError::NotANumber(_))));
        assert!(matches!(parse_counter("inf"), Err(ValueError::NotANumber(_))));
    }

    #[test]
    fn test_parse_integral_truncates() {
        assert_eq!(parse_integral("123"), Ok(123));
        assert_eq!(parse_integral("123.0"), Ok(123));
        assert_eq!(parse_integral("1.5"), Ok(1));
        assert_eq!(parse_integral("7.9E+1"), Ok(79));
        assert!(matches!(parse_integral(""), Err(ValueError::NotANumber(_))));
        assert!(matches!(parse_integral("-2"), Err(ValueError::Negative(_))));
        assert!(matches!(
            parse_integral("1e300"),
            Err(ValueError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_optional_f64() {
        assert_eq!(parse_optional_f64(""), Ok(None));
        assert_eq!(parse_optional_f64("0.25"), Ok(Some(0.25)));
        assert!(parse_optional_f64("x").is_err());
    }

    #[test]
    fn test_zero_pad() {
        assert_eq!(zero_pad("12345", 12), "000000012345");
        assert_eq!(zero_pad("510101234501", 12), "510101234501");
    }
}
