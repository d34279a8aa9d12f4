//! Chart and table catalog of the dashboard page.
//!
//! Nothing here draws. Each chart is described by a [`ChartSpec`] holding
//! the frame it plots plus the titles and axis labels a renderer needs, and
//! each ranked table by a [`RankedTable`] with presentation headers. Fixed
//! page text is exposed as constants; text that quotes a threshold is
//! formatted from the [`DashboardConfig`] in use.

use crate::aggregate::{Aggregates, Grouping};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::ranking::{RankKind, Ranking};
use crate::schema::{AVG_PRICE, COUNT, FOUR_WD_LABEL, MAKE, MODEL_YEAR, ODOMETER, PRICE, TYPE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Page text
// ============================================================================

pub const HEADER: &str = "Vehicle Listings Analysis";
pub const INTRO: &str = "Use the checkboxes below to include outliers in the analysis.";

pub const SUMMARY_HEADING: &str = "Exploratory Data Analysis Summary:";

/// `75000` -> `"75,000"`.
fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 { format!("-{grouped}") } else { grouped }
}

/// `75000` -> `"75k"`; amounts that are not whole thousands keep every digit.
fn short_amount(n: i64) -> String {
    if n != 0 && n % 1000 == 0 {
        format!("{}k", n / 1000)
    } else {
        thousands(n)
    }
}

/// Price scope appended to chart titles and table captions, e.g.
/// "($75k and under)".
pub fn price_scope(config: &DashboardConfig) -> String {
    format!("(${} and under)", short_amount(config.expensive_price_limit))
}

pub fn include_expensive_label(config: &DashboardConfig) -> String {
    format!("Include vehicles > ${}", thousands(config.expensive_price_limit))
}

pub fn include_old_label(config: &DashboardConfig) -> String {
    format!("Include vehicles older than {}", config.oldest_model_year)
}

pub fn include_high_mileage_label(config: &DashboardConfig) -> String {
    format!("Include vehicles > {} miles", short_amount(config.max_odometer))
}

pub fn outlier_notes(config: &DashboardConfig) -> [String; 2] {
    [
        format!(
            "Initial review of the dataset has discovered several outliers for vehicle listings priced above ${}, model years older than {}, and odometer readings over {} miles.",
            thousands(config.expensive_price_limit),
            config.oldest_model_year,
            short_amount(config.max_odometer)
        ),
        "These findings are consistent throughout different vehicle types and makes, allowing the analysis to safely exclude these outliers.".to_string(),
    ]
}

pub fn summary_bullets(config: &DashboardConfig) -> [String; 6] {
    [
        "The dataset contains vehicle listings with details including price, model year, make, model, etc.".to_string(),
        "Data cleaning involved filling missing values, converting data types, and removing outliers.".to_string(),
        format!(
            "The outliers removed were vehicles priced over ${}, older than year {} and odometer readings over {} miles.",
            thousands(config.expensive_price_limit),
            config.oldest_model_year,
            thousands(config.max_odometer)
        ),
        "Relationship between vehicle attributes are as expected, where price and miles shows a negative correlation, while price and model year shows a positive correlation.".to_string(),
        "Majority of vehicles are automatic transmission, with gas fuel being the most common type.".to_string(),
        "The dataset of vehicles having AWD is split nearly 50/50, but the split of 4WD vehicles by type and make varies significantly.".to_string(),
    ]
}

const PRICE_LABEL: &str = "Price ($)";
const LISTINGS_LABEL: &str = "Listings";
const VEHICLE_TYPE_LABEL: &str = "Vehicle Type";
const MAKE_LABEL: &str = "Make";
const VEHICLE_MAKE_LABEL: &str = "Vehicle Make";
const AVERAGE_PRICE_LABEL: &str = "Average Price ($)";

// ============================================================================
// Chart specs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Scatter,
    Histogram,
    Bar,
    Box,
}

/// How bars sharing an x value are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    Relative,
    Stack,
}

/// Description of one chart of the page.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    /// Stable identifier, e.g. `price_vs_miles`.
    pub id: &'static str,
    pub kind: ChartKind,
    pub title: String,
    pub x: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    /// Display label per field name. An empty label hides the legend title.
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbins: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_mode: Option<BarMode>,
    /// Text shown under the chart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<&'static str>,
    #[serde(skip)]
    pub data: DataFrame,
}

impl ChartSpec {
    fn new(id: &'static str, kind: ChartKind, title: &str, x: &'static str, data: DataFrame) -> Self {
        Self {
            id,
            kind,
            title: title.to_string(),
            x,
            y: None,
            color: None,
            labels: BTreeMap::new(),
            y_axis_title: None,
            nbins: None,
            bar_mode: None,
            caption: None,
            data,
        }
    }

    fn y(mut self, field: &'static str) -> Self {
        self.y = Some(field);
        self
    }

    fn color(mut self, field: &'static str) -> Self {
        self.color = Some(field);
        self
    }

    fn labels(mut self, pairs: &[(&str, &str)]) -> Self {
        self.labels = pairs
            .iter()
            .map(|(field, label)| (field.to_string(), label.to_string()))
            .collect();
        self
    }

    fn caption(mut self, text: &'static str) -> Self {
        self.caption = Some(text);
        self
    }

    /// Rows plotted.
    pub fn rows(&self) -> usize {
        self.data.height()
    }
}

fn columns(df: &DataFrame, names: &[&str]) -> Result<DataFrame> {
    Ok(df.select(names.iter().copied())?)
}

/// Build every chart of the page, in page order.
pub fn build_charts(
    filtered: &DataFrame,
    aggregates: &Aggregates,
    config: &DashboardConfig,
) -> Result<Vec<ChartSpec>> {
    let scope = price_scope(config);
    let mut charts = Vec::with_capacity(10);

    charts.push(
        ChartSpec::new(
            "price_vs_miles",
            ChartKind::Scatter,
            "Vehicle Price vs Miles",
            ODOMETER,
            columns(filtered, &[ODOMETER, PRICE])?,
        )
        .y(PRICE)
        .labels(&[(ODOMETER, "Miles"), (PRICE, PRICE_LABEL)])
        .caption("Miles have a negative correlation with price, indicating that as the odometer reading increases, the price tends to decrease."),
    );

    charts.push(
        ChartSpec::new(
            "price_vs_model_year",
            ChartKind::Scatter,
            "Vehicle Price vs Model Year",
            MODEL_YEAR,
            columns(filtered, &[MODEL_YEAR, PRICE])?,
        )
        .y(PRICE)
        .labels(&[(MODEL_YEAR, "Model Year"), (PRICE, PRICE_LABEL)])
        .caption("Model year has a positive correlation with price, indicating that newer vehicles tend to be priced higher than older vehicles."),
    );

    let mut histogram = ChartSpec::new(
        "price_distribution",
        ChartKind::Histogram,
        &format!("Distribution of Vehicle Prices {scope}"),
        PRICE,
        columns(filtered, &[PRICE])?,
    )
    .labels(&[(PRICE, PRICE_LABEL)]);
    histogram.nbins = Some(config.histogram_bins);
    histogram.y_axis_title = Some(LISTINGS_LABEL.to_string());
    charts.push(histogram);

    charts.push(
        ChartSpec::new(
            "listings_by_type",
            ChartKind::Bar,
            &format!("Vehicle Listings by Type {scope}"),
            TYPE,
            aggregates.by_type.clone(),
        )
        .y(COUNT)
        .labels(&[(TYPE, VEHICLE_TYPE_LABEL), (COUNT, LISTINGS_LABEL)]),
    );

    charts.push(
        ChartSpec::new(
            "prices_by_type",
            ChartKind::Box,
            &format!("Vehicle Prices by Type {scope}"),
            TYPE,
            columns(filtered, &[TYPE, PRICE])?,
        )
        .y(PRICE)
        .labels(&[(TYPE, VEHICLE_TYPE_LABEL), (PRICE, PRICE_LABEL)]),
    );

    charts.push(
        ChartSpec::new(
            "listings_by_make",
            ChartKind::Bar,
            &format!("Vehicle Listings by Make {scope}"),
            MAKE,
            aggregates.by_make.clone(),
        )
        .y(COUNT)
        .labels(&[(MAKE, MAKE_LABEL), (COUNT, LISTINGS_LABEL)]),
    );

    charts.push(
        ChartSpec::new(
            "prices_by_make",
            ChartKind::Box,
            &format!("Vehicle Prices by Make {scope}"),
            MAKE,
            columns(filtered, &[MAKE, PRICE])?,
        )
        .y(PRICE)
        .labels(&[(MAKE, MAKE_LABEL), (PRICE, PRICE_LABEL)]),
    );

    let mut by_make_type = ChartSpec::new(
        "listings_by_make_and_type",
        ChartKind::Bar,
        &format!("Vehicle Listings by Make and Type {scope}"),
        MAKE,
        aggregates.by_make_type.clone(),
    )
    .y(COUNT)
    .color(TYPE)
    .labels(&[(MAKE, VEHICLE_MAKE_LABEL), (COUNT, LISTINGS_LABEL)]);
    by_make_type.bar_mode = Some(BarMode::Relative);
    charts.push(by_make_type);

    for (id, title, key, label, data) in [
        (
            "four_wd_by_type",
            format!("Distribution of 4WD Vehicles by Type {scope}"),
            TYPE,
            VEHICLE_TYPE_LABEL,
            &aggregates.four_wd_by_type,
        ),
        (
            "four_wd_by_make",
            format!("Distribution of 4WD Vehicles by Make {scope}"),
            MAKE,
            VEHICLE_MAKE_LABEL,
            &aggregates.four_wd_by_make,
        ),
    ] {
        let mut chart = ChartSpec::new(id, ChartKind::Bar, &title, key, data.clone())
            .y(COUNT)
            .color(FOUR_WD_LABEL)
            .labels(&[(key, label), (COUNT, LISTINGS_LABEL), (FOUR_WD_LABEL, "")]);
        chart.bar_mode = Some(BarMode::Stack);
        charts.push(chart);
    }

    Ok(charts)
}

// ============================================================================
// Ranked tables
// ============================================================================

/// A ranked table ready for display, with renamed columns.
#[derive(Debug, Clone, Serialize)]
pub struct RankedTable {
    pub caption: String,
    pub grouping: Grouping,
    pub kind: RankKind,
    pub headers: Vec<String>,
    #[serde(skip)]
    pub data: DataFrame,
}

fn subject(grouping: Grouping) -> (&'static str, &'static str) {
    match grouping {
        Grouping::Make => ("vehicle makes", MAKE_LABEL),
        _ => ("vehicle types", VEHICLE_TYPE_LABEL),
    }
}

/// Caption shown above a ranked table.
pub fn ranked_caption(grouping: Grouping, kind: RankKind, config: &DashboardConfig) -> String {
    let (noun, _) = subject(grouping);
    let n = config.rank_size;
    let scope = price_scope(config);
    match kind {
        RankKind::MostListed => format!("Top {n} most listed {noun} {scope}:"),
        RankKind::LeastListed => format!("Top {n} least listed {noun} {scope}:"),
        RankKind::MostExpensive => {
            format!("Top {n} most expensive {noun} by average price {scope}:")
        }
        RankKind::LeastExpensive => {
            format!("Top {n} least expensive {noun} by average price {scope}:")
        }
    }
}

impl RankedTable {
    pub fn from_ranking(ranking: &Ranking, config: &DashboardConfig) -> Result<Self> {
        let (_, key_header) = subject(ranking.grouping);
        let value_header = match ranking.kind.value_column() {
            AVG_PRICE => AVERAGE_PRICE_LABEL,
            _ => LISTINGS_LABEL,
        };
        let key = ranking.grouping.keys()[0];

        let data = ranking
            .table
            .clone()
            .lazy()
            .select([
                col(key).alias(key_header),
                col(ranking.kind.value_column()).alias(value_header),
            ])
            .collect()?;

        Ok(Self {
            caption: ranked_caption(ranking.grouping, ranking.kind, config),
            grouping: ranking.grouping,
            kind: ranking.kind,
            headers: vec![key_header.to_string(), value_header.to_string()],
            data,
        })
    }
}

/// Present every ranking, keeping its order.
pub fn build_ranked_tables(
    rankings: &[Ranking],
    config: &DashboardConfig,
) -> Result<Vec<RankedTable>> {
    rankings
        .iter()
        .map(|ranking| RankedTable::from_ranking(ranking, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::rank;
    use crate::schema::{DAYS_LISTED, IS_4WD};

    fn filtered() -> DataFrame {
        df![
            PRICE => [10000i64, 20000, 30000, 12000],
            MODEL_YEAR => [2010i64, 2012, 2018, 2011],
            MAKE => ["honda", "toyota", "ford", "ford"],
            ODOMETER => [100000i64, 80000, 20000, 90000],
            TYPE => ["sedan", "sedan", "truck", "sedan"],
            IS_4WD => [false, false, true, false],
            DAYS_LISTED => [10i64, 21, 5, 3],
        ]
        .unwrap()
    }

    #[test]
    fn test_build_charts_catalog() {
        let config = DashboardConfig::default();
        let df = filtered();
        let aggregates = Aggregates::compute(&df, &config).unwrap();
        let charts = build_charts(&df, &aggregates, &config).unwrap();

        assert_eq!(charts.len(), 10);
        assert_eq!(charts[0].title, "Vehicle Price vs Miles");
        assert_eq!(charts[0].labels.get(ODOMETER).map(String::as_str), Some("Miles"));
        assert_eq!(charts[0].rows(), 4);

        let histogram = charts.iter().find(|c| c.kind == ChartKind::Histogram).unwrap();
        assert_eq!(histogram.nbins, Some(40));
        assert_eq!(histogram.y_axis_title.as_deref(), Some("Listings"));

        let stacked: Vec<&ChartSpec> = charts
            .iter()
            .filter(|c| c.bar_mode == Some(BarMode::Stack))
            .collect();
        assert_eq!(stacked.len(), 2);
        assert!(stacked.iter().all(|c| c.color == Some(FOUR_WD_LABEL)));

        let by_type = charts.iter().find(|c| c.id == "listings_by_type").unwrap();
        assert_eq!(by_type.rows(), 2);
    }

    #[test]
    fn test_chart_serializes_without_data() {
        let config = DashboardConfig::default();
        let df = filtered();
        let aggregates = Aggregates::compute(&df, &config).unwrap();
        let charts = build_charts(&df, &aggregates, &config).unwrap();

        let json = serde_json::to_value(&charts[2]).unwrap();
        assert_eq!(json["kind"], "histogram");
        assert_eq!(json["nbins"], 40);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_ranked_tables_headers_and_captions() {
        let config = DashboardConfig::default();
        let df = filtered();
        let aggregates = Aggregates::compute(&df, &config).unwrap();
        let rankings = rank(&df, &aggregates, Grouping::Make, &config).unwrap();
        let tables = build_ranked_tables(&rankings, &config).unwrap();

        assert_eq!(tables.len(), 4);
        assert_eq!(tables[0].caption, "Top 4 most listed vehicle makes ($75k and under):");
        assert_eq!(tables[0].headers, vec!["Make", "Listings"]);
        assert!(tables[0].data.column("Make").is_ok());
        assert_eq!(
            tables[2].caption,
            "Top 4 most expensive vehicle makes by average price ($75k and under):"
        );
        assert_eq!(tables[2].headers, vec!["Make", "Average Price ($)"]);
    }

    #[test]
    fn test_ranked_caption_for_types() {
        assert_eq!(
            ranked_caption(Grouping::Type, RankKind::LeastListed, &DashboardConfig::default()),
            "Top 4 least listed vehicle types ($75k and under):"
        );
    }

    // ========================================================================
    // Page text
    // ========================================================================

    #[test]
    fn test_default_page_text() {
        let config = DashboardConfig::default();
        assert_eq!(include_expensive_label(&config), "Include vehicles > $75,000");
        assert_eq!(include_old_label(&config), "Include vehicles older than 1980");
        assert_eq!(include_high_mileage_label(&config), "Include vehicles > 400k miles");
        assert!(outlier_notes(&config)[0].contains("priced above $75,000"));
        assert!(summary_bullets(&config)[2].contains("odometer readings over 400,000 miles"));
    }

    #[test]
    fn test_page_text_follows_config() {
        let config = DashboardConfig::builder()
            .expensive_price_limit(60_500)
            .oldest_model_year(1990)
            .max_odometer(250_000)
            .rank_size(5)
            .build()
            .unwrap();

        assert_eq!(include_expensive_label(&config), "Include vehicles > $60,500");
        assert_eq!(include_old_label(&config), "Include vehicles older than 1990");
        assert_eq!(include_high_mileage_label(&config), "Include vehicles > 250k miles");
        assert_eq!(price_scope(&config), "($60,500 and under)");
        assert_eq!(
            ranked_caption(Grouping::Make, RankKind::MostExpensive, &config),
            "Top 5 most expensive vehicle makes by average price ($60,500 and under):"
        );

        let df = filtered();
        let aggregates = Aggregates::compute(&df, &config).unwrap();
        let charts = build_charts(&df, &aggregates, &config).unwrap();
        assert_eq!(charts[2].title, "Distribution of Vehicle Prices ($60,500 and under)");
        assert!(charts.iter().skip(2).all(|c| c.title.ends_with("($60,500 and under)")));
    }
}
