//! Column converters used by the cleaner.
//!
//! Each converter accepts either the raw text column or an already typed
//! column, so cleaning a cleaned table changes nothing. Alongside the
//! converted series they report how many cells were substituted.

use crate::utils::{
    date_to_epoch_days, is_missing, is_numeric_dtype, parse_date, parse_numeric_string,
    parse_truthy,
};
use polars::prelude::*;

/// Convert a column to Float64. Present text that is not a number becomes
/// null; the returned count is the number of such cells.
pub(crate) fn to_float(series: &Series) -> PolarsResult<(Series, usize)> {
    if is_numeric_dtype(series.dtype()) {
        return Ok((series.cast(&DataType::Float64)?, 0));
    }

    let text = series.cast(&DataType::String)?;
    let str_series = text.str()?;
    let mut result_vec: Vec<Option<f64>> = Vec::with_capacity(str_series.len());
    let mut nulled = 0;

    for opt_val in str_series.into_iter() {
        if is_missing(opt_val) {
            result_vec.push(None);
            continue;
        }
        match opt_val.and_then(parse_numeric_string) {
            Some(v) => result_vec.push(Some(v)),
            None => {
                nulled += 1;
                result_vec.push(None);
            }
        }
    }

    Ok((Series::new(series.name().clone(), result_vec), nulled))
}

/// Truncate a Float64 column toward zero into Int64. Nulls stay null.
pub(crate) fn float_to_int(series: &Series) -> PolarsResult<Series> {
    series.cast(&DataType::Int64)
}

/// Normalize a flag column to Boolean. Missing cells become false; the
/// returned count is the number of cells defaulted that way.
pub(crate) fn to_flag(series: &Series) -> PolarsResult<(Series, usize)> {
    let defaulted = series.null_count();

    let values: Vec<bool> = match series.dtype() {
        DataType::Boolean => series.bool()?.into_iter().map(|v| v.unwrap_or(false)).collect(),
        dtype if is_numeric_dtype(dtype) => {
            let floats = series.cast(&DataType::Float64)?;
            floats
                .f64()?
                .into_iter()
                .map(|v| v.map(|x| x != 0.0).unwrap_or(false))
                .collect()
        }
        _ => {
            let text = series.cast(&DataType::String)?;
            text.str()?.into_iter().map(parse_truthy).collect()
        }
    };

    Ok((Series::new(series.name().clone(), values), defaulted))
}

/// Replace null or blank cells of a categorical column with `sentinel`.
/// The returned count is the number of cells filled.
pub(crate) fn fill_categorical(series: &Series, sentinel: &str) -> PolarsResult<(Series, usize)> {
    let text = series.cast(&DataType::String)?;
    let str_series = text.str()?;
    let mut filled = 0;

    let result_vec: Vec<String> = str_series
        .into_iter()
        .map(|opt_val| match opt_val {
            Some(val) if !val.trim().is_empty() => val.to_string(),
            _ => {
                filled += 1;
                sentinel.to_string()
            }
        })
        .collect();

    Ok((Series::new(series.name().clone(), result_vec), filled))
}

/// Ensure a categorical column is text, keeping nulls.
pub(crate) fn to_text(series: &Series) -> PolarsResult<Series> {
    series.cast(&DataType::String)
}

/// Render a Float64 cylinders column as categorical text, using `sentinel`
/// for gaps. Whole numbers print without a fractional part.
pub(crate) fn cylinders_to_categorical(
    series: &Series,
    sentinel: &str,
) -> PolarsResult<(Series, usize)> {
    let mut filled = 0;
    let result_vec: Vec<String> = series
        .f64()?
        .into_iter()
        .map(|opt_val| match opt_val {
            Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
            Some(v) => v.to_string(),
            None => {
                filled += 1;
                sentinel.to_string()
            }
        })
        .collect();

    Ok((Series::new(series.name().clone(), result_vec), filled))
}

/// Parse a date column into polars `Date`. Unparsable text becomes null;
/// the returned count is the number of such cells.
pub(crate) fn to_date(series: &Series) -> PolarsResult<(Series, usize)> {
    if series.dtype() == &DataType::Date {
        return Ok((series.clone(), 0));
    }

    let text = series.cast(&DataType::String)?;
    let str_series = text.str()?;
    let mut unparsable = 0;
    let mut days: Vec<Option<i32>> = Vec::with_capacity(str_series.len());

    for opt_val in str_series.into_iter() {
        if is_missing(opt_val) {
            days.push(None);
            continue;
        }
        match opt_val.and_then(parse_date) {
            Some(date) => days.push(Some(date_to_epoch_days(date))),
            None => {
                unparsable += 1;
                days.push(None);
            }
        }
    }

    let dates = Series::new(series.name().clone(), days).cast(&DataType::Date)?;
    Ok((dates, unparsable))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_float_parses_text_and_counts_failures() {
        let series = Series::new(
            "odometer".into(),
            &[Some("145000.0"), Some("lots"), None, Some(""), Some("88")],
        );
        let (floats, nulled) = to_float(&series).unwrap();

        assert_eq!(floats.dtype(), &DataType::Float64);
        assert_eq!(nulled, 1);
        assert_eq!(floats.null_count(), 3);
        assert_eq!(floats.get(0).unwrap().try_extract::<f64>().unwrap(), 145000.0);
        assert_eq!(floats.get(4).unwrap().try_extract::<f64>().unwrap(), 88.0);
    }

    #[test]
    fn test_to_float_accepts_typed_column() {
        let series = Series::new("price".into(), &[Some(9400i64), None]);
        let (floats, nulled) = to_float(&series).unwrap();
        assert_eq!(nulled, 0);
        assert_eq!(floats.get(0).unwrap().try_extract::<f64>().unwrap(), 9400.0);
    }

    #[test]
    fn test_float_to_int_truncates() {
        let series = Series::new("model_year".into(), &[Some(2011.0), Some(2.5), None]);
        let ints = float_to_int(&series).unwrap();

        assert_eq!(ints.dtype(), &DataType::Int64);
        assert_eq!(ints.get(0).unwrap().try_extract::<i64>().unwrap(), 2011);
        assert_eq!(ints.get(1).unwrap().try_extract::<i64>().unwrap(), 2);
        assert_eq!(ints.null_count(), 1);
    }

    #[test]
    fn test_to_flag_from_text() {
        let series = Series::new("is_4wd".into(), &[Some("1.0"), None, Some("0"), Some("true")]);
        let (flags, defaulted) = to_flag(&series).unwrap();

        assert_eq!(flags.dtype(), &DataType::Boolean);
        assert_eq!(defaulted, 1);
        let values: Vec<Option<bool>> = flags.bool().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(true), Some(false), Some(false), Some(true)]);
    }

    #[test]
    fn test_to_flag_is_stable_on_booleans() {
        let series = Series::new("is_4wd".into(), &[true, false]);
        let (flags, defaulted) = to_flag(&series).unwrap();
        assert_eq!(defaulted, 0);
        assert!(flags.equals(&series));
    }

    #[test]
    fn test_fill_categorical() {
        let series = Series::new("paint_color".into(), &[Some("white"), None, Some(" ")]);
        let (filled, count) = fill_categorical(&series, "unknown").unwrap();

        assert_eq!(count, 2);
        assert_eq!(filled.null_count(), 0);
        let values: Vec<Option<&str>> = filled.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("white"), Some("unknown"), Some("unknown")]);
    }

    #[test]
    fn test_cylinders_to_categorical() {
        let series = Series::new("cylinders".into(), &[Some(6.0), None, Some(4.5)]);
        let (text, filled) = cylinders_to_categorical(&series, "unknown").unwrap();

        assert_eq!(filled, 1);
        let values: Vec<Option<&str>> = text.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("6"), Some("unknown"), Some("4.5")]);
    }

    #[test]
    fn test_to_date() {
        let series = Series::new(
            "date_posted".into(),
            &[Some("2018-06-23"), Some("not a date"), None],
        );
        let (dates, unparsable) = to_date(&series).unwrap();

        assert_eq!(dates.dtype(), &DataType::Date);
        assert_eq!(unparsable, 1);
        assert_eq!(dates.null_count(), 2);

        let (again, unparsable_again) = to_date(&dates).unwrap();
        assert_eq!(unparsable_again, 0);
        assert!(again.equals_missing(&dates));
    }
}
