//! Cleaning of the raw listings table.
//!
//! The cleaner turns the all-text table from the loader into a typed one:
//! - numeric columns are parsed, invalid text silently becoming null
//! - `model_year`, `odometer` and `cylinders` gaps are filled with the
//!   median of the same vehicle type
//! - numeric columns are truncated to integers
//! - `is_4wd` becomes a boolean, missing meaning false
//! - `paint_color` gaps get the unknown sentinel
//! - `date_posted` is parsed, unparsable text becoming null
//!
//! Nothing here drops a row or raises for a bad cell.

mod converters;

use crate::config::{CylindersPolicy, DashboardConfig};
use crate::error::Result;
use crate::imputers::GroupedMedianImputer;
use crate::schema::{
    CONDITION, CYLINDERS, DATE_POSTED, DAYS_LISTED, FUEL, IMPUTED_COLUMNS, INTEGER_COLUMNS,
    IS_4WD, MODEL, MODEL_YEAR, ODOMETER, PAINT_COLOR, PRICE, TRANSMISSION, TYPE,
};
use crate::types::CleaningSummary;
use converters::{
    cylinders_to_categorical, fill_categorical, float_to_int, to_date, to_flag, to_float, to_text,
};
use polars::prelude::*;
use tracing::{debug, info};

/// Categorical columns kept as text without a fill value.
const PLAIN_CATEGORICAL_COLUMNS: [&str; 5] = [MODEL, CONDITION, FUEL, TRANSMISSION, TYPE];

/// Cleaner for the listings table.
pub struct ListingCleaner<'a> {
    config: &'a DashboardConfig,
}

impl<'a> ListingCleaner<'a> {
    pub fn new(config: &'a DashboardConfig) -> Self {
        Self { config }
    }

    /// Clean a loaded table. Accepts raw text or an already cleaned table;
    /// cleaning twice yields the same frame.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningSummary)> {
        let mut df = df;
        let mut summary = CleaningSummary::default();

        info!("Cleaning {} listings...", df.height());

        // 1. Parse numeric text to floats
        for name in [MODEL_YEAR, ODOMETER, CYLINDERS, PRICE, DAYS_LISTED] {
            let (floats, nulled) = to_float(df.column(name)?.as_materialized_series())?;
            df.replace(name, floats)?;
            if nulled > 0 {
                debug!("Coerced {} invalid '{}' values to null", nulled, name);
                summary.coerced_to_null.insert(name.to_string(), nulled);
            }
        }

        // 2. Per-type median imputation
        let imputer = GroupedMedianImputer::new(TYPE);
        for name in IMPUTED_COLUMNS {
            if name == CYLINDERS && self.config.cylinders_policy == CylindersPolicy::UnknownSentinel
            {
                continue;
            }
            let outcome = imputer.impute(&mut df, name)?;
            if outcome.filled > 0 {
                summary.imputed.insert(name.to_string(), outcome.filled);
            }
            if outcome.unresolved > 0 {
                summary.unresolved.insert(name.to_string(), outcome.unresolved);
            }
        }

        // 3. Integer casts
        for name in INTEGER_COLUMNS {
            let ints = float_to_int(df.column(name)?.as_materialized_series())?;
            df.replace(name, ints)?;
        }
        match self.config.cylinders_policy {
            CylindersPolicy::GroupMedian => {
                let ints = float_to_int(df.column(CYLINDERS)?.as_materialized_series())?;
                df.replace(CYLINDERS, ints)?;
            }
            CylindersPolicy::UnknownSentinel => {
                let (text, filled) = cylinders_to_categorical(
                    df.column(CYLINDERS)?.as_materialized_series(),
                    &self.config.unknown_sentinel,
                )?;
                df.replace(CYLINDERS, text)?;
                if filled > 0 {
                    summary.sentinel_filled.insert(CYLINDERS.to_string(), filled);
                }
            }
        }

        // 4. Boolean flag
        let (flags, defaulted) = to_flag(df.column(IS_4WD)?.as_materialized_series())?;
        df.replace(IS_4WD, flags)?;
        summary.flags_defaulted = defaulted;

        // 5. Categorical columns
        for name in PLAIN_CATEGORICAL_COLUMNS {
            let text = to_text(df.column(name)?.as_materialized_series())?;
            df.replace(name, text)?;
        }
        let (colors, filled) = fill_categorical(
            df.column(PAINT_COLOR)?.as_materialized_series(),
            &self.config.unknown_sentinel,
        )?;
        df.replace(PAINT_COLOR, colors)?;
        if filled > 0 {
            summary.sentinel_filled.insert(PAINT_COLOR.to_string(), filled);
        }

        // 6. Dates
        let (dates, unparsable) = to_date(df.column(DATE_POSTED)?.as_materialized_series())?;
        df.replace(DATE_POSTED, dates)?;
        summary.unparsable_dates = unparsable;

        info!(
            "Cleaning complete: {} substitutions across {} rows",
            summary.total_substitutions(),
            df.height()
        );

        Ok((df, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        df![
            PRICE => [Some("9400"), Some("25500"), Some("5500"), Some("abc")],
            MODEL_YEAR => [Some("2011.0"), None, Some("2013.0"), Some("2003.0")],
            MODEL => [Some("bmw x5"), Some("ford f-150"), Some("hyundai sonata"), Some("ford f-150")],
            CONDITION => [Some("good"), Some("good"), Some("like new"), Some("fair")],
            CYLINDERS => [Some("6.0"), Some("6.0"), None, Some("8.0")],
            FUEL => [Some("gas"), Some("gas"), Some("gas"), Some("gas")],
            ODOMETER => [Some("145000.0"), Some("88705.0"), Some("110000.0"), None],
            TRANSMISSION => [Some("automatic"), Some("automatic"), Some("automatic"), Some("automatic")],
            TYPE => [Some("SUV"), Some("pickup"), Some("sedan"), Some("pickup")],
            PAINT_COLOR => [None, Some("white"), Some("red"), None],
            IS_4WD => [Some("1.0"), Some("1.0"), None, None],
            DATE_POSTED => [Some("2018-06-23"), Some("2018-10-19"), Some("2019-02-07"), Some("someday")],
            DAYS_LISTED => [Some("19"), Some("50"), Some("79"), Some("9")],
        ]
        .unwrap()
    }

    fn int_values(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_clean_types_columns() {
        let config = DashboardConfig::default();
        let (df, _) = ListingCleaner::new(&config).clean(raw_frame()).unwrap();

        for name in [PRICE, MODEL_YEAR, ODOMETER, CYLINDERS, DAYS_LISTED] {
            assert_eq!(df.column(name).unwrap().dtype(), &DataType::Int64, "{name}");
        }
        assert_eq!(df.column(IS_4WD).unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column(DATE_POSTED).unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column(PAINT_COLOR).unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_clean_imputes_by_type_median() {
        let config = DashboardConfig::default();
        let (df, summary) = ListingCleaner::new(&config).clean(raw_frame()).unwrap();

        // pickup model years: [missing, 2003] -> 2003
        assert_eq!(int_values(&df, MODEL_YEAR)[1], Some(2003));
        // pickup odometers: [88705, missing] -> 88705
        assert_eq!(int_values(&df, ODOMETER)[3], Some(88705));
        // the only sedan has no cylinders observed
        assert_eq!(int_values(&df, CYLINDERS)[2], None);

        assert_eq!(summary.imputed.get(MODEL_YEAR), Some(&1));
        assert_eq!(summary.imputed.get(ODOMETER), Some(&1));
        assert_eq!(summary.unresolved.get(CYLINDERS), Some(&1));
    }

    #[test]
    fn test_clean_nulls_invalid_numeric_text_without_dropping_rows() {
        let config = DashboardConfig::default();
        let (df, summary) = ListingCleaner::new(&config).clean(raw_frame()).unwrap();

        assert_eq!(df.height(), 4);
        assert_eq!(int_values(&df, PRICE)[3], None);
        assert_eq!(summary.coerced_to_null.get(PRICE), Some(&1));
    }

    #[test]
    fn test_clean_flags_colors_and_dates() {
        let config = DashboardConfig::default();
        let (df, summary) = ListingCleaner::new(&config).clean(raw_frame()).unwrap();

        let flags: Vec<Option<bool>> = df.column(IS_4WD).unwrap().as_materialized_series().bool().unwrap().into_iter().collect();
        assert_eq!(flags, vec![Some(true), Some(true), Some(false), Some(false)]);
        assert_eq!(summary.flags_defaulted, 2);

        let colors: Vec<Option<&str>> =
            df.column(PAINT_COLOR).unwrap().as_materialized_series().str().unwrap().into_iter().collect();
        assert_eq!(colors, vec![Some("unknown"), Some("white"), Some("red"), Some("unknown")]);

        assert_eq!(df.column(DATE_POSTED).unwrap().null_count(), 1);
        assert_eq!(summary.unparsable_dates, 1);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let config = DashboardConfig::default();
        let cleaner = ListingCleaner::new(&config);
        let (once, _) = cleaner.clean(raw_frame()).unwrap();
        let (twice, summary) = cleaner.clean(once.clone()).unwrap();

        assert!(once.equals_missing(&twice));
        assert!(summary.imputed.is_empty());
        assert_eq!(summary.flags_defaulted, 0);
    }

    #[test]
    fn test_clean_unknown_sentinel_policy() {
        let config = DashboardConfig::builder()
            .cylinders_policy(CylindersPolicy::UnknownSentinel)
            .build()
            .unwrap();
        let cleaner = ListingCleaner::new(&config);
        let (df, summary) = cleaner.clean(raw_frame()).unwrap();

        let cylinders: Vec<Option<&str>> =
            df.column(CYLINDERS).unwrap().as_materialized_series().str().unwrap().into_iter().collect();
        assert_eq!(cylinders, vec![Some("6"), Some("6"), Some("unknown"), Some("8")]);
        assert_eq!(summary.sentinel_filled.get(CYLINDERS), Some(&1));
        assert!(!summary.imputed.contains_key(CYLINDERS));

        let (again, _) = cleaner.clean(df.clone()).unwrap();
        assert!(again.equals_missing(&df));
    }
}
