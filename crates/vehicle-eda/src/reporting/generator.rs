use crate::config::DashboardConfig;
use crate::error::Result;
use crate::pipeline::DashboardReport;
use crate::reporting::charts::{ChartKind, HEADER};
use crate::types::{OutlierFlags, RunSummary};
use crate::utils::epoch_days_to_date;
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Serializable form of a rendered dashboard.
///
/// Use this for both JSON output (`--json`) and file writing (`--emit-report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the source file, when the listings came from one
    pub input_file: Option<String>,
    pub header: String,
    pub flags: OutlierFlags,
    pub config: DashboardConfig,
    pub summary: RunSummary,
    pub processing_steps: Vec<String>,
    pub charts: Vec<ChartReport>,
    pub ranked_tables: Vec<TableReport>,
    /// Per-type statistics rows
    pub by_type: Vec<Map<String, Value>>,
    /// Per-make statistics rows
    pub by_make: Vec<Map<String, Value>>,
}

/// Chart metadata without its data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartReport {
    pub id: String,
    pub kind: ChartKind,
    pub title: String,
    /// Rows the chart plots
    pub rows: usize,
}

/// A ranked table as JSON rows keyed by its presentation headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub caption: String,
    pub headers: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),
        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),
        // NaN/Infinity becomes null
        AnyValue::Float32(f) => Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Date(days) => epoch_days_to_date(days)
            .map(|d| Value::String(d.to_string()))
            .unwrap_or(Value::Null),
        _ => Value::String(format!("{}", value)),
    }
}

/// Convert a frame into one JSON object per row, keyed by column name.
pub fn dataframe_to_rows(df: &DataFrame) -> Result<Vec<Map<String, Value>>> {
    let columns = df.get_columns();
    let mut rows = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let mut row = Map::with_capacity(columns.len());
        for column in columns {
            row.insert(column.name().to_string(), any_value_to_json(column.get(i)?));
        }
        rows.push(row);
    }

    Ok(rows)
}

// ============================================================================
// Generator
// ============================================================================

/// Writes rendered dashboards to disk.
pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: Option<String>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
            output_name: None,
        }
    }
}

impl ReportGenerator {
    /// Create a new ReportGenerator with custom output settings.
    pub fn new(output_dir: PathBuf, output_name: Option<String>) -> Self {
        Self {
            output_dir,
            output_name,
        }
    }

    /// Build the serializable document of a render.
    pub fn build_report(
        report: &DashboardReport,
        config: &DashboardConfig,
        input_file: Option<&Path>,
    ) -> Result<ReportDocument> {
        let charts = report
            .charts
            .iter()
            .map(|chart| ChartReport {
                id: chart.id.to_string(),
                kind: chart.kind,
                title: chart.title.clone(),
                rows: chart.rows(),
            })
            .collect();

        let ranked_tables = report
            .ranked_tables
            .iter()
            .map(|table| {
                Ok(TableReport {
                    caption: table.caption.clone(),
                    headers: table.headers.clone(),
                    rows: dataframe_to_rows(&table.data)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ReportDocument {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.map(|p| p.display().to_string()),
            header: HEADER.to_string(),
            flags: report.flags,
            config: config.clone(),
            summary: report.summary.clone(),
            processing_steps: report.processing_steps.clone(),
            charts,
            ranked_tables,
            by_type: dataframe_to_rows(&report.aggregates.by_type)?,
            by_make: dataframe_to_rows(&report.aggregates.by_make)?,
        })
    }

    /// Write a report to `<output_dir>/<base_name>_report.json`.
    pub fn write_report_to_file(
        &self,
        report: &ReportDocument,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Export the filtered listings as CSV. The file is named after the
    /// configured output name, or `<base_name>_filtered.csv`.
    pub fn export_filtered(&self, filtered: &DataFrame, base_name: &str) -> Result<PathBuf> {
        let file_name = self
            .output_name
            .clone()
            .unwrap_or_else(|| format!("{}_filtered", base_name));

        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(format!("{}.csv", file_name));
        let mut file = File::create(&output_path)?;

        let mut df = filtered.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut df)?;

        info!("Filtered listings saved: {}", output_path.display());

        Ok(output_path)
    }
}
