//! Top and bottom rankings of vehicle types and makes.
//!
//! Frequency rankings count rows of the filtered table directly. Price
//! rankings read the aggregate table of the same snapshot, so both always
//! describe the same listings.

use crate::aggregate::{Aggregates, Grouping};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::schema::{AVG_PRICE, COUNT};
use crate::utils::round_float_columns;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which end of which measure a ranked table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankKind {
    MostListed,
    LeastListed,
    MostExpensive,
    LeastExpensive,
}

impl RankKind {
    pub const ALL: [RankKind; 4] = [
        Self::MostListed,
        Self::LeastListed,
        Self::MostExpensive,
        Self::LeastExpensive,
    ];

    /// Value column of tables of this kind.
    pub fn value_column(&self) -> &'static str {
        match self {
            Self::MostListed | Self::LeastListed => COUNT,
            Self::MostExpensive | Self::LeastExpensive => AVG_PRICE,
        }
    }
}

fn single_key(grouping: Grouping) -> Result<&'static str> {
    match grouping.keys() {
        [key] => Ok(*key),
        _ => Err(DashboardError::InvalidConfig(format!(
            "{:?} cannot be ranked on a single key",
            grouping
        ))),
    }
}

/// Row count per non-null `key`, most frequent first. Equal counts keep
/// the order in which their keys first appear in `df`.
pub fn value_counts(df: &DataFrame, key: &str) -> Result<DataFrame> {
    let counts = df
        .clone()
        .lazy()
        .filter(col(key).is_not_null())
        .group_by_stable([col(key)])
        .agg([len().cast(DataType::Int64).alias(COUNT)])
        .sort_by_exprs(
            vec![col(COUNT)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;
    Ok(counts)
}

/// The `n` most frequent keys, descending.
pub fn top_listed(df: &DataFrame, key: &str, n: usize) -> Result<DataFrame> {
    Ok(value_counts(df, key)?.head(Some(n)))
}

/// The `n` least frequent keys other than `excluded`, ascending by count.
/// Equal counts keep their frequency-table order.
pub fn bottom_listed(df: &DataFrame, key: &str, n: usize, excluded: &str) -> Result<DataFrame> {
    let counts = value_counts(df, key)?;
    let tail = counts
        .lazy()
        .filter(col(key).neq(lit(excluded)))
        .collect()?
        .tail(Some(n));

    let ranked = tail
        .lazy()
        .sort_by_exprs(
            vec![col(COUNT)],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;
    Ok(ranked)
}

/// The `n` keys of an aggregate table with the highest (`descending`) or
/// lowest mean price, rounded to one decimal. Ties keep table order.
pub fn by_avg_price(
    aggregate: &DataFrame,
    key: &str,
    n: usize,
    descending: bool,
) -> Result<DataFrame> {
    let mut ranked = aggregate
        .clone()
        .lazy()
        .select([col(key), col(AVG_PRICE)])
        .sort_by_exprs(
            vec![col(AVG_PRICE)],
            SortMultipleOptions::default()
                .with_order_descending(descending)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?
        .head(Some(n));

    round_float_columns(&mut ranked, &[AVG_PRICE], 1)?;
    Ok(ranked)
}

/// One ranked table.
#[derive(Debug, Clone)]
pub struct Ranking {
    pub grouping: Grouping,
    pub kind: RankKind,
    pub table: DataFrame,
}

/// Compute the four rankings of `grouping` from one filtered snapshot and
/// its aggregates.
pub fn rank(
    filtered: &DataFrame,
    aggregates: &Aggregates,
    grouping: Grouping,
    config: &DashboardConfig,
) -> Result<Vec<Ranking>> {
    let key = single_key(grouping)?;
    let n = config.rank_size;
    let aggregate = aggregates.table(grouping);

    let mut rankings = Vec::with_capacity(RankKind::ALL.len());
    for kind in RankKind::ALL {
        let table = match kind {
            RankKind::MostListed => top_listed(filtered, key, n)?,
            RankKind::LeastListed => bottom_listed(filtered, key, n, &config.excluded_type)?,
            RankKind::MostExpensive => by_avg_price(aggregate, key, n, true)?,
            RankKind::LeastExpensive => by_avg_price(aggregate, key, n, false)?,
        };
        debug!("Ranked {:?} {:?}: {} rows", grouping, kind, table.height());
        rankings.push(Ranking {
            grouping,
            kind,
            table,
        });
    }

    Ok(rankings)
}
