//! Pipeline module.
//!
//! Composes the stages into a single render over the cached source table.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{Dashboard, DashboardBuilder, DashboardReport, render};
pub use outliers::{OutlierFilter, apply_filters};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
