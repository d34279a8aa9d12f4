//! Report generation module.
//!
//! [`charts`] describes what the page shows; [`ReportGenerator`] turns a
//! rendered dashboard into a JSON document and exports the filtered
//! listings.
//!
//! # Example
//!
//! ```rust,ignore
//! use vehicle_eda::reporting::ReportGenerator;
//!
//! let report = dashboard.render(&flags)?;
//! let document = ReportGenerator::build_report(&report, dashboard.config(), None)?;
//! println!("{}", serde_json::to_string_pretty(&document)?);
//!
//! let generator = ReportGenerator::new(PathBuf::from("output"), None);
//! generator.write_report_to_file(&document, "vehicles_us")?;
//! ```

pub mod charts;
mod generator;

pub use charts::{
    BarMode, ChartKind, ChartSpec, RankedTable, build_charts, build_ranked_tables,
};
pub use generator::{
    ChartReport, ReportDocument, ReportGenerator, TableReport, dataframe_to_rows,
};
