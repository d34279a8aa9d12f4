//! Progress reporting for the dashboard pipeline.
//!
//! A front end registers a [`ProgressReporter`] to hear about each stage of
//! a render. Runs are short and synchronous, so there is no cancellation.
//!
//! # Example
//!
//! ```rust,ignore
//! use vehicle_eda::Dashboard;
//!
//! let dashboard = Dashboard::builder()
//!     .source_path("vehicles_us.csv")
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of a dashboard run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the source file
    Loading,
    /// Typing columns and imputing gaps
    Cleaning,
    /// Deriving make and applying the price band
    Enriching,
    /// Applying the type exclusion and outlier toggles
    Filtering,
    /// Computing per-group statistics
    Aggregating,
    /// Computing the ranked tables
    Ranking,
    /// Assembling chart and table specs
    Presenting,
    /// Run completed successfully
    Complete,
    /// Run failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Listings",
            Self::Cleaning => "Cleaning Data",
            Self::Enriching => "Enriching Data",
            Self::Filtering => "Filtering Outliers",
            Self::Aggregating => "Aggregating Groups",
            Self::Ranking => "Ranking Groups",
            Self::Presenting => "Building Charts",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Cleaning => 0.20,
            Self::Enriching => 0.50,
            Self::Filtering => 0.60,
            Self::Aggregating => 0.70,
            Self::Ranking => 0.80,
            Self::Presenting => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A stage notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates an update marking the start of `stage`.
    pub fn new(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: stage.base_progress(),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Complete, message)
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Failed, message)
    }
}

/// Trait for receiving progress updates.
///
/// Implementations must be `Send + Sync` so a dashboard holding one can be
/// shared by a front end serving several requests.
pub trait ProgressReporter: Send + Sync {
    /// Called at every stage boundary. Implementations should not block.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
