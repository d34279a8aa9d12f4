//! CLI entry point for the vehicle listings dashboard.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use vehicle_eda::reporting::charts::{
    HEADER, INTRO, SUMMARY_HEADING, include_expensive_label, include_high_mileage_label,
    include_old_label, outlier_notes, summary_bullets,
};
use vehicle_eda::{Dashboard, DashboardConfig, DashboardReport, OutlierFlags, ReportGenerator};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory dashboard over used-vehicle listings",
    long_about = "Cleans a used-vehicle listings CSV, applies the outlier toggles and \
                  prints the dashboard's ranked tables.\n\n\
                  EXAMPLES:\n  \
                  # Default view (all outliers excluded)\n  \
                  vehicle-eda -i vehicles_us.csv\n\n  \
                  # Keep expensive and old vehicles\n  \
                  vehicle-eda -i vehicles_us.csv --include-expensive --include-old\n\n  \
                  # Write the JSON report and the filtered listings\n  \
                  vehicle-eda -i vehicles_us.csv -o results/ --emit-report --export-filtered"
)]
struct Args {
    /// Path to the listings CSV file
    #[arg(short, long, default_value = "vehicles_us.csv")]
    input: PathBuf,

    /// Include vehicles above the expensive price limit
    #[arg(long)]
    include_expensive: bool,

    /// Include vehicles older than the oldest model year
    #[arg(long)]
    include_old: bool,

    /// Include vehicles above the odometer limit
    #[arg(long)]
    include_high_mileage: bool,

    /// JSON file with a dashboard configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for written files
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Write the filtered listings as CSV to the output directory
    #[arg(long)]
    export_filtered: bool,

    /// Output JSON to stdout instead of the text dashboard
    ///
    /// Disables all logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and the dashboard)
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn flags(&self) -> OutlierFlags {
        OutlierFlags {
            include_expensive: self.include_expensive,
            include_old: self.include_old,
            include_high_mileage: self.include_high_mileage,
        }
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            DashboardConfig::from_json(&json)
                .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))
        }
        None => Ok(DashboardConfig::default()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = load_config(args.config.as_deref())?;

    info!("Loading listings from: {}", args.input.display());
    let dashboard = Dashboard::builder()
        .config(config)
        .source_path(args.input.clone())
        .build()
        .map_err(|e| {
            error!("Startup failed: {}", e);
            anyhow!("{}", e)
        })?;

    let report = dashboard
        .render(&args.flags())
        .map_err(|e| anyhow!("Render failed: {}", e))?;

    handle_output(&dashboard, &report, &args)
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

fn handle_output(dashboard: &Dashboard, report: &DashboardReport, args: &Args) -> Result<()> {
    let input_stem = extract_file_stem(&args.input);
    let document =
        ReportGenerator::build_report(report, dashboard.config(), Some(args.input.as_path()))?;
    let generator = ReportGenerator::new(args.output.clone(), None);

    if args.emit_report {
        let report_path = generator.write_report_to_file(&document, &input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.export_filtered {
        let csv_path = generator.export_filtered(&report.filtered, &input_stem)?;
        info!("Filtered listings written to: {}", csv_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    print_dashboard(report, dashboard.config(), args);
    Ok(())
}

fn checkbox(checked: bool, label: &str) -> String {
    format!("[{}] {}", if checked { "x" } else { " " }, label)
}

/// Print the text rendition of the dashboard page.
fn print_dashboard(report: &DashboardReport, config: &DashboardConfig, args: &Args) {
    let summary = &report.summary;
    let flags = &report.flags;

    println!();
    println!("{}", "=".repeat(80));
    println!("{}", HEADER.to_uppercase());
    println!("{}", "=".repeat(80));
    println!();
    println!("{}", INTRO);
    println!("  {}", checkbox(flags.include_expensive, &include_expensive_label(config)));
    println!("  {}", checkbox(flags.include_old, &include_old_label(config)));
    println!(
        "  {}",
        checkbox(flags.include_high_mileage, &include_high_mileage_label(config))
    );
    println!();
    for note in outlier_notes(config) {
        println!("{}", note);
    }
    println!();

    println!("Input: {}", args.input.display());
    println!("  Listings loaded:         {}", summary.rows_loaded);
    println!("  After price band:        {}", summary.rows_after_price_band);
    println!("  After outlier filters:   {}", summary.rows_after_filters);
    println!("  Duration:                {}ms", summary.duration_ms);
    println!();

    println!("Charts:");
    for chart in &report.charts {
        println!("  - {} ({} rows)", chart.title, chart.rows());
    }
    println!();

    for table in &report.ranked_tables {
        println!("{}", table.caption);
        println!("{}", table.data);
        println!();
    }

    println!("{}", SUMMARY_HEADING);
    for bullet in summary_bullets(config) {
        println!("- {}", bullet);
    }
    println!();
}
