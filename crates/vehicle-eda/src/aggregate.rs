//! Per-group statistics of the filtered listings.
//!
//! Each grouping produces one row per observed key with the listing count,
//! the mean price, odometer and days listed, and the scaled 4WD share.
//! Rows with a null key belong to no group and are left out.

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::schema::{
    AVG_DAYS_LISTED, AVG_ODOMETER, AVG_PRICE, COUNT, DAYS_LISTED, FOUR_WD_LABEL, IS_4WD, MAKE,
    ODOMETER, PERCENT_OF_4WD, PRICE, TYPE,
};
use crate::utils::round_float_columns;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Statistic columns of every aggregate table, in output order.
pub const STAT_COLUMNS: [&str; 4] = [AVG_PRICE, AVG_ODOMETER, PERCENT_OF_4WD, AVG_DAYS_LISTED];

/// Label of the `4WD` column for 4WD rows.
pub const FOUR_WD: &str = "4WD";
/// Label of the `4WD` column for the remaining rows.
pub const NOT_FOUR_WD: &str = "Not 4WD";

/// Key columns an aggregate table is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    Type,
    Make,
    MakeType,
}

impl Grouping {
    /// Key columns, outermost first.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Self::Type => &[TYPE],
            Self::Make => &[MAKE],
            Self::MakeType => &[MAKE, TYPE],
        }
    }

    /// Only the two-key table has its statistics rounded to one decimal.
    pub fn rounds_statistics(&self) -> bool {
        matches!(self, Self::MakeType)
    }
}

fn key_exprs(keys: &[&str]) -> Vec<Expr> {
    keys.iter().map(|k| col(*k)).collect()
}

fn keys_present(keys: &[&str]) -> Expr {
    keys.iter()
        .map(|k| col(*k).is_not_null())
        .reduce(|acc, e| acc.and(e))
        .unwrap_or_else(|| lit(true))
}

/// Compute the statistics table of one grouping, sorted by key ascending.
pub fn aggregate(df: &DataFrame, grouping: Grouping, config: &DashboardConfig) -> Result<DataFrame> {
    let keys = grouping.keys();

    let mut table = df
        .clone()
        .lazy()
        .filter(keys_present(keys))
        .group_by(key_exprs(keys))
        .agg([
            len().cast(DataType::Int64).alias(COUNT),
            col(PRICE).cast(DataType::Float64).mean().alias(AVG_PRICE),
            col(ODOMETER).cast(DataType::Float64).mean().alias(AVG_ODOMETER),
            (col(IS_4WD).cast(DataType::Float64).mean() * lit(config.four_wd_scale))
                .alias(PERCENT_OF_4WD),
            col(DAYS_LISTED)
                .cast(DataType::Float64)
                .mean()
                .alias(AVG_DAYS_LISTED),
        ])
        .sort_by_exprs(
            key_exprs(keys),
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;

    if grouping.rounds_statistics() {
        round_float_columns(&mut table, &STAT_COLUMNS, 1)?;
    }

    debug!("Aggregated {:?}: {} groups", grouping, table.height());
    Ok(table)
}

/// Count listings per `key` split by `is_4wd`, with a `4WD` label column
/// reading "4WD" or "Not 4WD". Sorted by key, then non-4WD first.
pub fn four_wd_split(df: &DataFrame, key: &str) -> Result<DataFrame> {
    let table = df
        .clone()
        .lazy()
        .filter(col(key).is_not_null())
        .group_by([col(key), col(IS_4WD)])
        .agg([len().cast(DataType::Int64).alias(COUNT)])
        .sort_by_exprs(
            vec![col(key), col(IS_4WD)],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .with_column(
            when(col(IS_4WD))
                .then(lit(FOUR_WD))
                .otherwise(lit(NOT_FOUR_WD))
                .alias(FOUR_WD_LABEL),
        )
        .collect()?;

    debug!("4WD split by '{}': {} rows", key, table.height());
    Ok(table)
}

/// Every aggregate table of one filtered snapshot.
#[derive(Debug, Clone)]
pub struct Aggregates {
    pub by_type: DataFrame,
    pub by_make: DataFrame,
    pub by_make_type: DataFrame,
    pub four_wd_by_type: DataFrame,
    pub four_wd_by_make: DataFrame,
}

impl Aggregates {
    pub fn compute(filtered: &DataFrame, config: &DashboardConfig) -> Result<Self> {
        Ok(Self {
            by_type: aggregate(filtered, Grouping::Type, config)?,
            by_make: aggregate(filtered, Grouping::Make, config)?,
            by_make_type: aggregate(filtered, Grouping::MakeType, config)?,
            four_wd_by_type: four_wd_split(filtered, TYPE)?,
            four_wd_by_make: four_wd_split(filtered, MAKE)?,
        })
    }

    /// Statistics table of a grouping.
    pub fn table(&self, grouping: Grouping) -> &DataFrame {
        match grouping {
            Grouping::Type => &self.by_type,
            Grouping::Make => &self.by_make,
            Grouping::MakeType => &self.by_make_type,
        }
    }
}
