//! Error types for the listings pipeline.
//!
//! Only the loader can fail for data reasons: a missing or unparsable source
//! aborts the run. Cell-level problems never surface as errors; they are
//! absorbed as nulls or sentinels by the cleaner.
//!
//! Errors serialize as `{code, message}` so a front end can display them.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the dashboard pipeline.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The source file does not exist.
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The source exists but is not delimited text polars can read.
    #[error("Failed to read '{}' as delimited text: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    /// The header lacks columns the pipeline depends on.
    #[error("Source is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Column was not found in a derived table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DashboardError>,
    },
}

impl DashboardError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DashboardError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            Self::SourceUnreadable { .. } => "SOURCE_UNREADABLE",
            Self::MissingColumns(_) => "MISSING_COLUMNS",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether this error belongs to the startup tier: the source could not
    /// be turned into a table and no output may be produced.
    pub fn is_fatal_source_error(&self) -> bool {
        match self {
            Self::SourceNotFound(_) | Self::SourceUnreadable { .. } | Self::MissingColumns(_) => {
                true
            }
            Self::WithContext { source, .. } => source.is_fatal_source_error(),
            _ => false,
        }
    }
}

impl From<ConfigValidationError> for DashboardError {
    fn from(err: ConfigValidationError) -> Self {
        DashboardError::InvalidConfig(err.to_string())
    }
}

impl Serialize for DashboardError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DashboardError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| DashboardError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            DashboardError::SourceNotFound(PathBuf::from("vehicles_us.csv")).error_code(),
            "SOURCE_NOT_FOUND"
        );
        assert_eq!(
            DashboardError::MissingColumns(vec!["price".to_string()]).error_code(),
            "MISSING_COLUMNS"
        );
    }

    #[test]
    fn test_fatal_tier() {
        assert!(DashboardError::SourceNotFound(PathBuf::from("x.csv")).is_fatal_source_error());
        assert!(
            DashboardError::SourceUnreadable {
                path: PathBuf::from("x.csv"),
                reason: "bad".to_string(),
            }
            .is_fatal_source_error()
        );
        assert!(!DashboardError::InvalidConfig("bad".to_string()).is_fatal_source_error());
    }

    #[test]
    fn test_missing_columns_message_lists_columns() {
        let error = DashboardError::MissingColumns(vec!["price".into(), "type".into()]);
        assert_eq!(
            error.to_string(),
            "Source is missing required columns: price, type"
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = DashboardError::ColumnNotFound("make".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("make"));
    }

    #[test]
    fn test_with_context_preserves_code_and_tier() {
        let error = DashboardError::SourceNotFound(PathBuf::from("x.csv"))
            .with_context("Loading listings");
        assert!(error.to_string().contains("Loading listings"));
        assert_eq!(error.error_code(), "SOURCE_NOT_FOUND");
        assert!(error.is_fatal_source_error());
    }
}
