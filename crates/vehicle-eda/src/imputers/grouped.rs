//! Per-group median imputation.

use polars::prelude::*;
use tracing::debug;

const MEDIAN_COLUMN: &str = "__group_median";
const ROW_INDEX_COLUMN: &str = "__row_index";

/// Outcome of imputing one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImputationOutcome {
    /// Cells that received a group median.
    pub filled: usize,
    /// Cells left null because their group had no observed value or their
    /// group key itself was null.
    pub unresolved: usize,
}

/// Fills missing numeric values with the median of rows sharing a key.
pub struct GroupedMedianImputer<'a> {
    group_column: &'a str,
}

impl<'a> GroupedMedianImputer<'a> {
    /// Create an imputer grouping on `group_column`.
    pub fn new(group_column: &'a str) -> Self {
        Self { group_column }
    }

    /// Median of `value_column` per non-null group key with at least one
    /// observed value, sorted by key. Columns: the group key and
    /// `__group_median`.
    pub fn group_medians(&self, df: &DataFrame, value_column: &str) -> PolarsResult<DataFrame> {
        self.median_frame(df, value_column)?
            .sort_by_exprs(
                vec![col(self.group_column)],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()
    }

    fn median_frame(&self, df: &DataFrame, value_column: &str) -> PolarsResult<LazyFrame> {
        Ok(df
            .clone()
            .lazy()
            .select([
                col(self.group_column).cast(DataType::String),
                col(value_column).cast(DataType::Float64),
            ])
            .filter(
                col(self.group_column)
                    .is_not_null()
                    .and(col(value_column).is_not_null()),
            )
            .group_by([col(self.group_column)])
            .agg([col(value_column).median().alias(MEDIAN_COLUMN)]))
    }

    /// Replace nulls of the Float64 column `value_column` in place with the
    /// median of their group. Present values are never changed.
    pub fn impute(&self, df: &mut DataFrame, value_column: &str) -> PolarsResult<ImputationOutcome> {
        let nulls_before = df.column(value_column)?.null_count();
        let medians = self.median_frame(df, value_column)?;

        let imputed = df
            .clone()
            .lazy()
            .select([
                col(self.group_column).cast(DataType::String),
                col(value_column).cast(DataType::Float64),
            ])
            .with_row_index(ROW_INDEX_COLUMN, None)
            .join(
                medians,
                [col(self.group_column)],
                [col(self.group_column)],
                JoinArgs::new(JoinType::Left),
            )
            .sort_by_exprs(vec![col(ROW_INDEX_COLUMN)], SortMultipleOptions::default())
            .select([col(value_column)
                .fill_null(col(MEDIAN_COLUMN))
                .alias(value_column)])
            .collect()?;

        let filled_column = imputed.column(value_column)?.as_materialized_series().clone();
        let nulls_after = filled_column.null_count();
        df.replace(value_column, filled_column)?;

        let outcome = ImputationOutcome {
            filled: nulls_before - nulls_after,
            unresolved: nulls_after,
        };

        debug!(
            "Imputed '{}' by '{}' median: {} filled, {} unresolved",
            value_column, self.group_column, outcome.filled, outcome.unresolved
        );

        Ok(outcome)
    }
}
