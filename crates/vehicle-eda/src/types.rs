use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The three outlier toggles supplied by the presentation layer.
///
/// Each flag *includes* a class of outliers; the default (all false) keeps
/// every outlier filter active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutlierFlags {
    /// Keep listings priced above the expensive limit.
    pub include_expensive: bool,
    /// Keep listings older than the oldest model year.
    pub include_old: bool,
    /// Keep listings above the odometer limit.
    pub include_high_mileage: bool,
}

impl OutlierFlags {
    /// All filters active.
    pub fn exclude_all() -> Self {
        Self::default()
    }

    /// All filters disabled.
    pub fn include_all() -> Self {
        Self {
            include_expensive: true,
            include_old: true,
            include_high_mileage: true,
        }
    }
}

/// Counts of the silent substitutions the cleaner made.
///
/// None of these are shown to the end user; they exist for logs and for
/// the JSON report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Cells filled with their type-group median, per column.
    pub imputed: BTreeMap<String, usize>,
    /// Cells still null after imputation, per column.
    pub unresolved: BTreeMap<String, usize>,
    /// Present numeric text that failed to parse and became null, per column.
    pub coerced_to_null: BTreeMap<String, usize>,
    /// Categorical cells replaced by the sentinel, per column.
    pub sentinel_filled: BTreeMap<String, usize>,
    /// Missing `is_4wd` cells defaulted to false.
    pub flags_defaulted: usize,
    /// Present `date_posted` text that could not be parsed.
    pub unparsable_dates: usize,
}

impl CleaningSummary {
    /// Total number of cells the cleaner substituted.
    pub fn total_substitutions(&self) -> usize {
        self.imputed.values().sum::<usize>()
            + self.coerced_to_null.values().sum::<usize>()
            + self.sentinel_filled.values().sum::<usize>()
            + self.flags_defaulted
            + self.unparsable_dates
    }
}

/// Row counts and timing of one `render` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Rows in the raw source table.
    pub rows_loaded: usize,
    /// Rows left after the unconditional price band.
    pub rows_after_price_band: usize,
    /// Rows left after the type exclusion and the outlier toggles.
    pub rows_after_filters: usize,
    /// Substitutions made while cleaning.
    pub cleaning: CleaningSummary,
    /// Wall time of the run in milliseconds.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_default_excludes_outliers() {
        let flags = OutlierFlags::default();
        assert_eq!(flags, OutlierFlags::exclude_all());
        assert!(!flags.include_expensive);
        assert!(!flags.include_old);
        assert!(!flags.include_high_mileage);
    }

    #[test]
    fn test_total_substitutions() {
        let mut summary = CleaningSummary::default();
        summary.imputed.insert("odometer".into(), 3);
        summary.sentinel_filled.insert("paint_color".into(), 2);
        summary.flags_defaulted = 4;
        summary.unparsable_dates = 1;
        assert_eq!(summary.total_substitutions(), 10);
    }

    #[test]
    fn test_flags_deserialize_from_front_end() {
        let flags: OutlierFlags =
            serde_json::from_str(r#"{"include_expensive":true,"include_old":false,"include_high_mileage":true}"#)
                .unwrap();
        assert!(flags.include_expensive);
        assert!(!flags.include_old);
        assert!(flags.include_high_mileage);
    }
}
