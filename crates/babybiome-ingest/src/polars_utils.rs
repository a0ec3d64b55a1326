//! Polars AnyValue utility functions.
//!
//! Helpers for rendering and parsing `AnyValue`s the same way the sheet
//! cells are rendered, so frame values and raw cells compare equal.

use chrono::{Datelike, NaiveDate};
use polars::prelude::AnyValue;

/// Days from 0001-01-01 to the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null, formats floats without trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "True" } else { "False" }.to_string(),
        AnyValue::Date(days) => days_to_date(days)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Converts AnyValue to String, returning None if the result is empty.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Converts an AnyValue to f64, returning None for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Converts an AnyValue to i64, returning None for non-integer or null values.
pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        AnyValue::Float32(v) => Some(v as i64),
        AnyValue::Float64(v) => Some(v as i64),
        AnyValue::String(s) => parse_i64(s),
        AnyValue::StringOwned(s) => parse_i64(&s),
        _ => None,
    }
}

/// Converts an AnyValue to bool. Accepts canonical `True`/`False` strings.
pub fn any_to_bool(value: AnyValue<'_>) -> Option<bool> {
    match value {
        AnyValue::Boolean(b) => Some(b),
        AnyValue::String(s) => parse_bool(s),
        AnyValue::StringOwned(s) => parse_bool(&s),
        _ => None,
    }
}

/// Converts an AnyValue to a calendar date.
pub fn any_to_date(value: AnyValue<'_>) -> Option<NaiveDate> {
    match value {
        AnyValue::Date(days) => days_to_date(days),
        AnyValue::String(s) => parse_date(s),
        AnyValue::StringOwned(s) => parse_date(&s),
        _ => None,
    }
}

/// Whether `value` is a plain decimal number: optional sign, digits without
/// a leading zero, optional fraction and exponent. Identifiers such as
/// `007` and tokens such as `NaN` or `inf` are not.
pub fn is_decimal_literal(value: &str) -> bool {
    fn digits(part: &str) -> bool {
        !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
    }
    let unsigned = value.strip_prefix(['-', '+']).unwrap_or(value);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(index) => (&unsigned[..index], Some(&unsigned[index + 1..])),
        None => (unsigned, None),
    };
    let (integer, fraction) = match mantissa.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (mantissa, None),
    };
    if !digits(integer) || fraction.is_some_and(|fraction| !digits(fraction)) {
        return false;
    }
    if integer.len() > 1 && integer.starts_with('0') {
        return false;
    }
    exponent.is_none_or(|exponent| {
        digits(exponent.strip_prefix(['-', '+']).unwrap_or(exponent))
    })
}

/// Parses a decimal literal as f64, returning None for anything else.
pub fn parse_f64(value: &str) -> Option<f64> {
    let value = value.trim();
    if !is_decimal_literal(value) {
        return None;
    }
    value.parse::<f64>().ok()
}

/// Parses a decimal integer literal as i64, returning None for anything else.
pub fn parse_i64(value: &str) -> Option<i64> {
    let value = value.trim();
    if !is_decimal_literal(value) {
        return None;
    }
    value.parse::<i64>().ok()
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "True" => Some(true),
        "False" => Some(false),
        _ => None,
    }
}

/// Parses `YYYY-MM-DD`, also accepting a midnight time part.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value
        .strip_suffix(" 00:00:00")
        .or_else(|| value.strip_suffix("T00:00:00"))
        .unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Days since the Unix epoch, as stored by Polars `Date`, to a date.
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// Inverse of [`days_to_date`].
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_numeric_keeps_integer_zeros() {
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(75.0), "75");
        assert_eq!(format_numeric(3.250), "3.25");
    }

    #[test]
    fn epoch_days_round_trip() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        assert_eq!(date_to_days(date), 1);
        assert_eq!(days_to_date(1), Some(date));
    }

    #[test]
    fn parses_dates_and_bools() {
        assert_eq!(
            parse_date("2021-05-01 00:00:00"),
            NaiveDate::from_ymd_opt(2021, 5, 1)
        );
        assert_eq!(parse_date("01.05.2021"), None);
        assert_eq!(any_to_bool(AnyValue::String("True")), Some(true));
        assert_eq!(any_to_bool(AnyValue::String("ja")), None);
    }

    #[test]
    fn numbers_must_be_plain_decimals() {
        assert_eq!(parse_i64("75"), Some(75));
        assert_eq!(parse_i64("0"), Some(0));
        assert_eq!(parse_i64("007"), None);
        assert_eq!(parse_f64("0.5"), Some(0.5));
        assert_eq!(parse_f64("-3.25"), Some(-3.25));
        assert_eq!(parse_f64("1e3"), Some(1000.0));
        assert_eq!(parse_f64("012.5"), None);
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("inf"), None);
        assert_eq!(parse_f64("1."), None);
        assert_eq!(parse_f64(".5"), None);
    }
}
