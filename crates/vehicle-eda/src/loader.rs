//! Source loading.
//!
//! The whole file is read into memory with every column typed as text;
//! typing is the cleaner's job. A missing file, a file polars cannot parse as
//! delimited text, or a header without the required columns aborts the run.

use crate::error::{DashboardError, Result};
use crate::schema::REQUIRED_COLUMNS;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Load the listings CSV at `path` as an all-text table.
pub fn load_listings(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DashboardError::SourceNotFound(path.to_path_buf()));
    }

    info!("Loading listings from: {}", path.display());

    let df = text_csv_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| DashboardError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    ensure_required_columns(&df)?;
    info!("Listings loaded: {:?}", df.shape());
    Ok(df)
}

/// Load listings from in-memory CSV text. Used by tests and by front ends
/// that receive the file as an upload.
pub fn load_listings_from_str(csv: &str) -> Result<DataFrame> {
    let df = text_csv_options()
        .into_reader_with_file_handle(Cursor::new(csv.to_string()))
        .finish()
        .map_err(|e| DashboardError::SourceUnreadable {
            path: "<memory>".into(),
            reason: e.to_string(),
        })?;

    ensure_required_columns(&df)?;
    debug!("Listings parsed from memory: {:?}", df.shape());
    Ok(df)
}

/// Header row, comma separated, schema inference disabled so every column
/// is read as `String`. Empty fields become null.
fn text_csv_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
}

fn ensure_required_columns(df: &DataFrame) -> Result<()> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !present.iter().any(|p| p == *name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::MissingColumns(missing))
    }
}
