//! The dashboard: a cached source table and the render over it.
//!
//! The source is loaded once when the dashboard is built. Every call to
//! [`Dashboard::render`] runs the whole pipeline (clean, enrich, filter,
//! aggregate, rank, present) from that raw snapshot, so a render depends
//! only on the raw table, the configuration and the toggles.

use crate::aggregate::{Aggregates, Grouping};
use crate::cleaner::ListingCleaner;
use crate::config::DashboardConfig;
use crate::enricher::enrich;
use crate::error::{DashboardError, Result, ResultExt};
use crate::loader::load_listings;
use crate::pipeline::outliers::OutlierFilter;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::ranking::rank;
use crate::reporting::{ChartSpec, RankedTable, build_charts, build_ranked_tables};
use crate::types::{CleaningSummary, OutlierFlags, RunSummary};
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Everything one render produces.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    /// Toggles the render used.
    pub flags: OutlierFlags,
    /// The filtered listings every chart and table is derived from.
    pub filtered: DataFrame,
    pub aggregates: Aggregates,
    /// Charts in page order.
    pub charts: Vec<ChartSpec>,
    /// The eight ranked tables, types first.
    pub ranked_tables: Vec<RankedTable>,
    pub summary: RunSummary,
    /// Human-readable log of what the render did.
    pub processing_steps: Vec<String>,
}

/// Listings dashboard over a cached source table.
///
/// Use [`Dashboard::builder()`] to load a source and configure the run.
///
/// # Example
///
/// ```rust,ignore
/// use vehicle_eda::{Dashboard, OutlierFlags};
///
/// let dashboard = Dashboard::builder()
///     .source_path("vehicles_us.csv")
///     .build()?;
///
/// let report = dashboard.render(&OutlierFlags::default())?;
/// for table in &report.ranked_tables {
///     println!("{}\n{}", table.caption, table.data);
/// }
/// ```
pub struct Dashboard {
    config: DashboardConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    raw: DataFrame,
    source: Option<PathBuf>,
}

// A front end may share one dashboard across request handlers.
static_assertions::assert_impl_all!(Dashboard: Send, Sync);

impl Dashboard {
    /// Create a new dashboard builder.
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::default()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// The source table as loaded.
    pub fn raw(&self) -> &DataFrame {
        &self.raw
    }

    /// Path the source was loaded from, if it came from a file.
    pub fn source(&self) -> Option<&PathBuf> {
        self.source.as_ref()
    }

    /// Clean and enrich the raw table without filtering.
    pub fn prepare(&self) -> Result<(DataFrame, CleaningSummary)> {
        let (cleaned, summary) = ListingCleaner::new(&self.config).clean(self.raw.clone())?;
        Ok((enrich(cleaned, &self.config)?, summary))
    }

    /// Run the whole pipeline for the given toggles.
    pub fn render(&self, flags: &OutlierFlags) -> Result<DashboardReport> {
        let reporter = self.progress_reporter.as_deref();
        match render_with(&self.raw, flags, &self.config, reporter) {
            Ok(report) => {
                report_progress(reporter, ProgressUpdate::complete("Dashboard rendered"));
                Ok(report)
            }
            Err(e) => {
                report_progress(reporter, ProgressUpdate::failed(e.to_string()));
                error!("Render failed: {}", e);
                Err(e)
            }
        }
    }
}

fn report_progress(reporter: Option<&dyn ProgressReporter>, update: ProgressUpdate) {
    if let Some(reporter) = reporter {
        reporter.report(update);
    }
}

/// Render a raw listings table. The input is not modified.
pub fn render(
    raw: &DataFrame,
    flags: &OutlierFlags,
    config: &DashboardConfig,
) -> Result<DashboardReport> {
    render_with(raw, flags, config, None)
}

fn render_with(
    raw: &DataFrame,
    flags: &OutlierFlags,
    config: &DashboardConfig,
    reporter: Option<&dyn ProgressReporter>,
) -> Result<DashboardReport> {
    let start_time = Instant::now();
    let mut processing_steps: Vec<String> = Vec::new();
    let mut summary = RunSummary {
        rows_loaded: raw.height(),
        ..Default::default()
    };

    info!("Rendering dashboard for {} listings...", raw.height());

    report_progress(
        reporter,
        ProgressUpdate::new(PipelineStage::Cleaning, "Cleaning listings..."),
    );
    let (cleaned, cleaning) = ListingCleaner::new(config)
        .clean(raw.clone())
        .context("Cleaning listings")?;
    processing_steps.push(format!(
        "Cleaned {} listings with {} substituted values",
        cleaned.height(),
        cleaning.total_substitutions()
    ));
    for (column, filled) in &cleaning.imputed {
        processing_steps.push(format!(
            "Imputed {} missing '{}' values with the vehicle type median",
            filled, column
        ));
    }
    summary.cleaning = cleaning;

    report_progress(
        reporter,
        ProgressUpdate::new(PipelineStage::Enriching, "Deriving make and applying price band..."),
    );
    let enriched = enrich(cleaned, config).context("Enriching listings")?;
    summary.rows_after_price_band = enriched.height();
    processing_steps.push(format!(
        "Kept {} of {} listings priced between ${} and ${}",
        enriched.height(),
        raw.height(),
        config.min_price,
        config.max_price
    ));

    report_progress(
        reporter,
        ProgressUpdate::new(PipelineStage::Filtering, "Applying outlier filters..."),
    );
    let filtered = OutlierFilter::new(config)
        .apply(&enriched, flags)
        .context("Filtering listings")?;
    summary.rows_after_filters = filtered.height();
    processing_steps.push(describe_filters(flags, config, enriched.height(), filtered.height()));

    report_progress(
        reporter,
        ProgressUpdate::new(PipelineStage::Aggregating, "Aggregating by type and make..."),
    );
    let aggregates = Aggregates::compute(&filtered, config).context("Aggregating listings")?;
    processing_steps.push(format!(
        "Aggregated {} types, {} makes and {} make/type pairs",
        aggregates.by_type.height(),
        aggregates.by_make.height(),
        aggregates.by_make_type.height()
    ));

    report_progress(
        reporter,
        ProgressUpdate::new(PipelineStage::Ranking, "Ranking types and makes..."),
    );
    let mut rankings = rank(&filtered, &aggregates, Grouping::Type, config)?;
    rankings.extend(rank(&filtered, &aggregates, Grouping::Make, config)?);

    report_progress(
        reporter,
        ProgressUpdate::new(PipelineStage::Presenting, "Building charts and tables..."),
    );
    let charts = build_charts(&filtered, &aggregates, config)?;
    let ranked_tables = build_ranked_tables(&rankings, config)?;
    processing_steps.push(format!(
        "Built {} charts and {} ranked tables",
        charts.len(),
        ranked_tables.len()
    ));

    summary.duration_ms = start_time.elapsed().as_millis() as u64;
    info!(
        "Dashboard rendered in {}ms: {} of {} listings shown",
        summary.duration_ms, summary.rows_after_filters, summary.rows_loaded
    );

    Ok(DashboardReport {
        flags: *flags,
        filtered,
        aggregates,
        charts,
        ranked_tables,
        summary,
        processing_steps,
    })
}

fn describe_filters(
    flags: &OutlierFlags,
    config: &DashboardConfig,
    before: usize,
    after: usize,
) -> String {
    let mut rules = vec![format!("type '{}' removed", config.excluded_type)];
    if !flags.include_expensive {
        rules.push(format!("price <= {}", config.expensive_price_limit));
    }
    if !flags.include_old {
        rules.push(format!("model year >= {}", config.oldest_model_year));
    }
    if !flags.include_high_mileage {
        rules.push(format!("odometer <= {}", config.max_odometer));
    }
    format!(
        "Filtered to {} of {} listings ({})",
        after,
        before,
        rules.join("; ")
    )
}

/// Builder for [`Dashboard`].
#[derive(Default)]
pub struct DashboardBuilder {
    config: Option<DashboardConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    source_path: Option<PathBuf>,
    raw: Option<DataFrame>,
}

impl DashboardBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: DashboardConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load listings from a CSV file when the dashboard is built.
    pub fn source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Use an already loaded raw table instead of a file.
    pub fn raw_frame(mut self, df: DataFrame) -> Self {
        self.raw = Some(df);
        self
    }

    /// Set a progress reporter for receiving stage updates.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Validate the configuration and load the source.
    ///
    /// Fails if the configuration is invalid, if no source was given, or if
    /// the source cannot be loaded.
    pub fn build(self) -> Result<Dashboard> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let reporter = self.progress_reporter.as_deref();

        let (raw, source) = match (self.raw, self.source_path) {
            (Some(df), _) => (df, None),
            (None, Some(path)) => {
                report_progress(
                    reporter,
                    ProgressUpdate::new(
                        PipelineStage::Loading,
                        format!("Loading {}...", path.display()),
                    ),
                );
                (load_listings(&path)?, Some(path))
            }
            (None, None) => {
                return Err(DashboardError::InvalidConfig(
                    "no listings source was provided".to_string(),
                ));
            }
        };

        Ok(Dashboard {
            config,
            progress_reporter: self.progress_reporter,
            raw,
            source,
        })
    }
}
