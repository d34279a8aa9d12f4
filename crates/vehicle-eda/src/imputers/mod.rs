//! Imputation of missing numeric values.
//!
//! Listings are repaired with the median of their own vehicle type rather
//! than a dataset-wide statistic.

mod grouped;

pub use grouped::{GroupedMedianImputer, ImputationOutcome};
