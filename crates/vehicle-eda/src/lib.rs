//! Vehicle Listings Dashboard Library
//!
//! The data pipeline behind an exploratory dashboard of used-vehicle
//! listings, built on Polars.
//!
//! # Overview
//!
//! A render goes through these stages, each a function over an immutable
//! table snapshot:
//!
//! - **Loading**: the CSV source is read once, every column as text
//! - **Cleaning**: numeric columns are typed, gaps in model year, odometer and
//!   cylinders get the median of the same vehicle type, flags and dates are
//!   normalized
//! - **Enriching**: `make` is derived from `model` and a fixed price band is
//!   applied
//! - **Filtering**: the excluded type is removed and three toggleable outlier
//!   bands applied
//! - **Aggregating**: per type, per make and per make/type statistics
//! - **Ranking**: top and bottom types and makes by listings and mean price
//! - **Presenting**: chart and table specs for a renderer
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vehicle_eda::{Dashboard, OutlierFlags};
//!
//! let dashboard = Dashboard::builder()
//!     .source_path("vehicles_us.csv")
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?;
//!
//! // Default toggles exclude every outlier class
//! let report = dashboard.render(&OutlierFlags::default())?;
//!
//! // Re-render when a toggle changes; the source is not reloaded
//! let report = dashboard.render(&OutlierFlags {
//!     include_expensive: true,
//!     ..Default::default()
//! })?;
//!
//! for table in &report.ranked_tables {
//!     println!("{}\n{}", table.caption, table.data);
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`DashboardConfig`] to change the thresholds:
//!
//! ```rust,ignore
//! use vehicle_eda::config::*;
//!
//! let config = DashboardConfig::builder()
//!     .price_band(500, 250_000)
//!     .expensive_price_limit(60_000)
//!     .rank_size(5)
//!     .cylinders_policy(CylindersPolicy::UnknownSentinel)
//!     .build()?;
//! ```

pub mod aggregate;
pub mod cleaner;
pub mod config;
pub mod enricher;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod ranking;
pub mod reporting;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregate::{Aggregates, Grouping, aggregate, four_wd_split};
pub use cleaner::ListingCleaner;
pub use config::{
    ConfigValidationError, CylindersPolicy, DashboardConfig, DashboardConfigBuilder,
};
pub use enricher::{derive_make, enrich};
pub use error::{DashboardError, Result as DashboardResult, ResultExt};
pub use imputers::{GroupedMedianImputer, ImputationOutcome};
pub use loader::{load_listings, load_listings_from_str};
pub use pipeline::{
    ClosureProgressReporter, Dashboard, DashboardBuilder, DashboardReport, OutlierFilter,
    PipelineStage, ProgressReporter, ProgressUpdate, apply_filters, render,
};
pub use ranking::{RankKind, Ranking, bottom_listed, by_avg_price, rank, top_listed, value_counts};
pub use reporting::{
    ChartKind, ChartSpec, RankedTable, ReportDocument, ReportGenerator, build_charts,
    build_ranked_tables,
};
pub use types::{CleaningSummary, OutlierFlags, RunSummary};
pub use utils::{is_error_marker, is_numeric_dtype, parse_date, parse_numeric_string, parse_truthy};
