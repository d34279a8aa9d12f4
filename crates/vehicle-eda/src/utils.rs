//! Shared per-value helpers for the listings pipeline.
//!
//! These functions decide what a single cell means: a number, a boolean,
//! a date, or nothing at all. They never fail; anything they cannot read
//! is reported as `None` and the caller substitutes a null or sentinel.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Common missing value markers in listing exports.
pub const ERROR_MARKERS: [&str; 9] = [
    "error", "unknown", "n/a", "na", "nan", "null", "missing", "none", "#n/a",
];

/// Check if a string is a missing value marker.
pub fn is_error_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    ERROR_MARKERS.iter().any(|&marker| lower == marker)
}

/// Check if a cell carries no value: null, blank, or a missing marker.
pub fn is_missing(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(s) => s.trim().is_empty() || is_error_marker(s),
    }
}

/// Try to parse a string as a finite numeric value.
///
/// Surrounding whitespace is ignored; anything else that is not a plain
/// number (including `inf` and `NaN`) yields `None`.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Boolean Utilities
// =============================================================================

/// Common boolean true representations.
pub const BOOLEAN_TRUE_VALUES: [&str; 6] = ["true", "yes", "t", "y", "on", "enabled"];

/// Common boolean false representations.
pub const BOOLEAN_FALSE_VALUES: [&str; 6] = ["false", "no", "f", "n", "off", "disabled"];

/// Check if a string represents a boolean true value.
pub fn is_boolean_true(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    BOOLEAN_TRUE_VALUES.iter().any(|&v| v == lower)
}

/// Check if a string represents a boolean false value.
pub fn is_boolean_false(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    BOOLEAN_FALSE_VALUES.iter().any(|&v| v == lower)
}

/// Interpret a cell as a flag. Missing cells are false, numbers are true
/// when non-zero, and other non-empty text follows its truthiness.
pub fn parse_truthy(value: Option<&str>) -> bool {
    if is_missing(value) {
        return false;
    }
    let s = value.unwrap_or_default();
    if let Some(num) = parse_numeric_string(s) {
        return num != 0.0;
    }
    if is_boolean_false(s) {
        return false;
    }
    true
}

// =============================================================================
// Date Utilities
// =============================================================================

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a posting date. Time components are discarded.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
pub fn date_to_epoch_days(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

/// Inverse of [`date_to_epoch_days`].
pub fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    unix_epoch().checked_add_signed(chrono::Duration::days(i64::from(days)))
}

// =============================================================================
// Text and Number Utilities
// =============================================================================

/// First whitespace-delimited token of a free-text field.
pub fn first_token(s: &str) -> Option<&str> {
    s.split_whitespace().next()
}

/// Round to a fixed number of decimals, ties to even.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

/// Round every value of the named Float64 columns in place.
pub fn round_float_columns(df: &mut DataFrame, columns: &[&str], decimals: u32) -> PolarsResult<()> {
    for name in columns {
        let rounded = df
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?
            .f64()?
            .apply(|v| v.map(|val| round_to(val, decimals)))
            .into_series();
        df.replace(name, rounded)?;
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(None));
        assert!(is_missing(Some("")));
        assert!(is_missing(Some("   ")));
        assert!(is_missing(Some("NaN")));
        assert!(is_missing(Some("N/A")));
        assert!(!is_missing(Some("sedan")));
        assert!(!is_missing(Some("0")));
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string(" 2011.0 "), Some(2011.0));
        assert_eq!(parse_numeric_string("-100"), Some(-100.0));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("abc"), None);
        assert_eq!(parse_numeric_string("inf"), None);
        assert_eq!(parse_numeric_string("NaN"), None);
    }

    #[test]
    fn test_parse_truthy() {
        assert!(parse_truthy(Some("1.0")));
        assert!(parse_truthy(Some("True")));
        assert!(parse_truthy(Some("yes")));
        assert!(!parse_truthy(Some("0")));
        assert!(!parse_truthy(Some("false")));
        assert!(!parse_truthy(Some("")));
        assert!(!parse_truthy(None));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2018, 6, 23);
        assert_eq!(parse_date("2018-06-23"), expected);
        assert_eq!(parse_date("06/23/2018"), expected);
        assert_eq!(parse_date("2018-06-23 14:05:00"), expected);
        assert_eq!(parse_date("2018-06-23T14:05:00"), expected);
        assert_eq!(parse_date("23rd of June"), None);
        assert_eq!(parse_date("2018-13-45"), None);
    }

    #[test]
    fn test_epoch_days_round_trip_anchor() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 11).unwrap();
        assert_eq!(date_to_epoch_days(date), 10);
        assert_eq!(epoch_days_to_date(10), Some(date));
    }

    #[test]
    fn test_first_token() {
        assert_eq!(first_token("ford f-150"), Some("ford"));
        assert_eq!(first_token("  toyota   camry le"), Some("toyota"));
        assert_eq!(first_token("   "), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(15000.04, 1), 15000.0);
        assert_eq!(round_to(12.25, 1), 12.2);
        assert_eq!(round_to(12.75, 1), 12.8);
        assert_eq!(round_to(-1.25, 1), -1.2);
        assert_eq!(round_to(10000.25, 1), 10000.2);
    }

    #[test]
    fn test_round_float_columns() {
        let mut df = df![
            "avg_price" => [Some(1.26), None, Some(3.0)],
        ]
        .unwrap();

        round_float_columns(&mut df, &["avg_price"], 1).unwrap();

        let col = df.column("avg_price").unwrap();
        assert_eq!(col.get(0).unwrap().try_extract::<f64>().unwrap(), 1.3);
        assert_eq!(col.null_count(), 1);
    }
}
