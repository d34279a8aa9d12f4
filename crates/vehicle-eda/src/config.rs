//! Configuration for the listings pipeline.
//!
//! Every constant the cleaning, filtering and ranking stages use lives here.
//! The defaults reproduce the published dashboard; the builder exists so a
//! front end can load an alternative from JSON.

use serde::{Deserialize, Serialize};

/// How missing `cylinders` values are repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CylindersPolicy {
    /// Fill with the median of the same vehicle type and store as integers.
    #[default]
    GroupMedian,
    /// Keep cylinders categorical and fill gaps with the unknown sentinel.
    UnknownSentinel,
}

/// Configuration for the dashboard pipeline.
///
/// Use [`DashboardConfig::builder()`] for a fluent, validated setup.
///
/// # Example
///
/// ```rust,ignore
/// use vehicle_eda::config::DashboardConfig;
///
/// let config = DashboardConfig::builder()
///     .expensive_price_limit(60_000)
///     .rank_size(5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Lowest price kept by the unconditional price band.
    /// Default: 1000
    pub min_price: i64,

    /// Highest price kept by the unconditional price band.
    /// Default: 200000
    pub max_price: i64,

    /// Upper price bound applied unless "include expensive" is set.
    /// Default: 75000
    pub expensive_price_limit: i64,

    /// Oldest model year kept unless "include old" is set.
    /// Default: 1980
    pub oldest_model_year: i64,

    /// Highest odometer reading kept unless "include high-mileage" is set.
    /// Default: 400000
    pub max_odometer: i64,

    /// Vehicle type removed from every filtered view and from bottom rankings.
    /// Default: "other"
    pub excluded_type: String,

    /// Number of rows in each ranked table.
    /// Default: 4
    pub rank_size: usize,

    /// Multiplier applied to the 4WD fraction of each group.
    /// Default: 75.0
    pub four_wd_scale: f64,

    /// Bin count requested for the price histogram.
    /// Default: 40
    pub histogram_bins: usize,

    /// Placeholder written into missing categorical cells.
    /// Default: "unknown"
    pub unknown_sentinel: String,

    /// How missing cylinders are repaired.
    /// Default: GroupMedian
    pub cylinders_policy: CylindersPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            min_price: 1_000,
            max_price: 200_000,
            expensive_price_limit: 75_000,
            oldest_model_year: 1980,
            max_odometer: 400_000,
            excluded_type: "other".to_string(),
            rank_size: 4,
            four_wd_scale: 75.0,
            histogram_bins: 40,
            unknown_sentinel: "unknown".to_string(),
            cylinders_policy: CylindersPolicy::default(),
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder.
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Parse a configuration from JSON and validate it. Missing fields take
    /// their defaults.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let config: DashboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.min_price > self.max_price {
            return Err(ConfigValidationError::InvalidPriceBand {
                min: self.min_price,
                max: self.max_price,
            });
        }

        if self.rank_size == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "rank_size".to_string(),
            });
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "histogram_bins".to_string(),
            });
        }

        if !self.four_wd_scale.is_finite() || self.four_wd_scale <= 0.0 {
            return Err(ConfigValidationError::InvalidScale(self.four_wd_scale));
        }

        if self.unknown_sentinel.trim().is_empty() {
            return Err(ConfigValidationError::EmptySentinel);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid price band: min {min} is greater than max {max}")]
    InvalidPriceBand { min: i64, max: i64 },

    #[error("Invalid value for '{field}': must be at least 1")]
    InvalidCount { field: String },

    #[error("Invalid 4WD scale: {0} (must be a positive finite number)")]
    InvalidScale(f64),

    #[error("Unknown sentinel must not be empty")]
    EmptySentinel,
}

/// Builder for [`DashboardConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    min_price: Option<i64>,
    max_price: Option<i64>,
    expensive_price_limit: Option<i64>,
    oldest_model_year: Option<i64>,
    max_odometer: Option<i64>,
    excluded_type: Option<String>,
    rank_size: Option<usize>,
    four_wd_scale: Option<f64>,
    histogram_bins: Option<usize>,
    unknown_sentinel: Option<String>,
    cylinders_policy: Option<CylindersPolicy>,
}

impl DashboardConfigBuilder {
    /// Set the unconditional price band.
    pub fn price_band(mut self, min: i64, max: i64) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    /// Set the price bound of the "include expensive" toggle.
    pub fn expensive_price_limit(mut self, limit: i64) -> Self {
        self.expensive_price_limit = Some(limit);
        self
    }

    /// Set the model year bound of the "include old" toggle.
    pub fn oldest_model_year(mut self, year: i64) -> Self {
        self.oldest_model_year = Some(year);
        self
    }

    /// Set the odometer bound of the "include high-mileage" toggle.
    pub fn max_odometer(mut self, miles: i64) -> Self {
        self.max_odometer = Some(miles);
        self
    }

    /// Set the vehicle type excluded from filtered views.
    pub fn excluded_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.excluded_type = Some(vehicle_type.into());
        self
    }

    /// Set how many rows each ranked table holds.
    pub fn rank_size(mut self, n: usize) -> Self {
        self.rank_size = Some(n);
        self
    }

    /// Set the multiplier of the 4WD aggregate.
    pub fn four_wd_scale(mut self, scale: f64) -> Self {
        self.four_wd_scale = Some(scale);
        self
    }

    /// Set the histogram bin count.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the placeholder for missing categorical values.
    pub fn unknown_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.unknown_sentinel = Some(sentinel.into());
        self
    }

    /// Set the cylinders repair policy.
    pub fn cylinders_policy(mut self, policy: CylindersPolicy) -> Self {
        self.cylinders_policy = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `DashboardConfig` or an error if validation fails.
    pub fn build(self) -> Result<DashboardConfig, ConfigValidationError> {
        let defaults = DashboardConfig::default();
        let config = DashboardConfig {
            min_price: self.min_price.unwrap_or(defaults.min_price),
            max_price: self.max_price.unwrap_or(defaults.max_price),
            expensive_price_limit: self
                .expensive_price_limit
                .unwrap_or(defaults.expensive_price_limit),
            oldest_model_year: self.oldest_model_year.unwrap_or(defaults.oldest_model_year),
            max_odometer: self.max_odometer.unwrap_or(defaults.max_odometer),
            excluded_type: self.excluded_type.unwrap_or(defaults.excluded_type),
            rank_size: self.rank_size.unwrap_or(defaults.rank_size),
            four_wd_scale: self.four_wd_scale.unwrap_or(defaults.four_wd_scale),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            unknown_sentinel: self.unknown_sentinel.unwrap_or(defaults.unknown_sentinel),
            cylinders_policy: self.cylinders_policy.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
