//! Outlier handling module.
//!
//! Builds the filtered view the charts and tables are computed from: the
//! excluded vehicle type is always removed, and each of the three outlier
//! bands applies unless its toggle includes that class of listings.

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::schema::{MODEL_YEAR, ODOMETER, PRICE, TYPE};
use crate::types::OutlierFlags;
use polars::prelude::*;
use tracing::{debug, info};

/// Applies the type exclusion and the toggleable outlier bands.
pub struct OutlierFilter<'a> {
    config: &'a DashboardConfig,
}

impl<'a> OutlierFilter<'a> {
    pub fn new(config: &'a DashboardConfig) -> Self {
        Self { config }
    }

    /// Row predicate for the given toggles.
    ///
    /// Rows whose `type` is null are kept by the type exclusion. A null in a
    /// banded column fails that band.
    pub fn predicate(&self, flags: &OutlierFlags) -> Expr {
        let mut predicate = col(TYPE)
            .neq(lit(self.config.excluded_type.as_str()))
            .or(col(TYPE).is_null());

        if !flags.include_expensive {
            predicate = predicate.and(col(PRICE).lt_eq(lit(self.config.expensive_price_limit)));
        }
        if !flags.include_old {
            predicate = predicate.and(col(MODEL_YEAR).gt_eq(lit(self.config.oldest_model_year)));
        }
        if !flags.include_high_mileage {
            predicate = predicate.and(col(ODOMETER).lt_eq(lit(self.config.max_odometer)));
        }

        predicate
    }

    /// Filter the enriched table. Never fails on an empty result.
    pub fn apply(&self, df: &DataFrame, flags: &OutlierFlags) -> Result<DataFrame> {
        debug!("Applying outlier filters: {:?}", flags);

        let filtered = df.clone().lazy().filter(self.predicate(flags)).collect()?;

        info!(
            "Outlier filters kept {} of {} listings",
            filtered.height(),
            df.height()
        );

        Ok(filtered)
    }
}

/// Filter `df` with a one-off [`OutlierFilter`].
pub fn apply_filters(
    df: &DataFrame,
    flags: &OutlierFlags,
    config: &DashboardConfig,
) -> Result<DataFrame> {
    OutlierFilter::new(config).apply(df, flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings() -> DataFrame {
        df![
            PRICE => [Some(500000i64), Some(50000), Some(90000), Some(10000)],
            MODEL_YEAR => [Some(2015i64), Some(2015), Some(2015), Some(2015)],
            ODOMETER => [Some(1000i64), Some(1000), Some(1000), Some(1000)],
            TYPE => [Some("truck"), Some("sedan"), Some("suv"), Some("coupe")],
        ]
        .unwrap()
    }

    fn prices(df: &DataFrame) -> Vec<Option<i64>> {
        df.column(PRICE)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_expensive_listings_excluded_by_default() {
        let config = DashboardConfig::default();
        let filtered = apply_filters(&listings(), &OutlierFlags::default(), &config).unwrap();

        assert_eq!(prices(&filtered), vec![Some(50000), Some(10000)]);
    }

    #[test]
    fn test_include_expensive_keeps_all_prices() {
        let config = DashboardConfig::default();
        let flags = OutlierFlags {
            include_expensive: true,
            ..Default::default()
        };
        let filtered = apply_filters(&listings(), &flags, &config).unwrap();

        assert_eq!(filtered.height(), 4);
    }

    #[test]
    fn test_excluded_type_always_removed_and_null_type_kept() {
        let config = DashboardConfig::default();
        let df = df![
            PRICE => [1000i64, 2000, 3000],
            MODEL_YEAR => [2010i64, 2010, 2010],
            ODOMETER => [10i64, 10, 10],
            TYPE => [Some("other"), None, Some("van")],
        ]
        .unwrap();

        let filtered = apply_filters(&df, &OutlierFlags::include_all(), &config).unwrap();
        assert_eq!(prices(&filtered), vec![Some(2000), Some(3000)]);
    }

    #[test]
    fn test_old_and_high_mileage_bands() {
        let config = DashboardConfig::default();
        let df = df![
            PRICE => [1000i64, 2000, 3000, 4000],
            MODEL_YEAR => [1979i64, 1980, 2000, 2000],
            ODOMETER => [10i64, 10, 400000, 400001],
            TYPE => ["van", "van", "van", "van"],
        ]
        .unwrap();

        let strict = apply_filters(&df, &OutlierFlags::default(), &config).unwrap();
        assert_eq!(prices(&strict), vec![Some(2000), Some(3000)]);

        let old = OutlierFlags {
            include_old: true,
            ..Default::default()
        };
        assert_eq!(prices(&apply_filters(&df, &old, &config).unwrap()).len(), 3);

        let high = OutlierFlags {
            include_high_mileage: true,
            ..Default::default()
        };
        assert_eq!(
            prices(&apply_filters(&df, &high, &config).unwrap()),
            vec![Some(2000), Some(3000), Some(4000)]
        );
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let config = DashboardConfig::builder()
            .expensive_price_limit(0)
            .build()
            .unwrap();
        let filtered = apply_filters(&listings(), &OutlierFlags::default(), &config).unwrap();

        assert_eq!(filtered.height(), 0);
        assert_eq!(filtered.width(), 4);
    }
}
