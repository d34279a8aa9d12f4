//! Enrichment of the cleaned table: the derived `make` column, the canonical
//! column order, and the unconditional price band.

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::schema::{CANONICAL_ORDER, MAKE, MODEL, PRICE};
use crate::utils::first_token;
use polars::prelude::*;
use tracing::{debug, info};

/// Derive `make` from the first whitespace-delimited token of `model`.
/// A null or blank model yields a null make. An existing `make` column is
/// replaced.
pub fn derive_make(df: &DataFrame) -> Result<Series> {
    let models = df
        .column(MODEL)
        .map_err(|_| DashboardError::ColumnNotFound(MODEL.to_string()))?
        .as_materialized_series()
        .cast(&DataType::String)?;

    let makes: Vec<Option<&str>> = models
        .str()?
        .into_iter()
        .map(|model| model.and_then(first_token))
        .collect();

    Ok(Series::new(MAKE.into(), makes))
}

/// Add `make`, reorder to the canonical column order, and drop rows priced
/// outside `[min_price, max_price]`. Rows with a null price are dropped too.
pub fn enrich(df: DataFrame, config: &DashboardConfig) -> Result<DataFrame> {
    let mut df = df;

    let makes = derive_make(&df)?;
    df.with_column(makes)?;

    let df = df.select(CANONICAL_ORDER)?;
    debug!("Columns reordered: {:?}", df.get_column_names());

    let before = df.height();
    let df = df
        .lazy()
        .filter(
            col(PRICE)
                .gt_eq(lit(config.min_price))
                .and(col(PRICE).lt_eq(lit(config.max_price))),
        )
        .collect()?;

    info!(
        "Price band [{}, {}] kept {} of {} listings",
        config.min_price,
        config.max_price,
        df.height(),
        before
    );

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::ListingCleaner;
    use crate::loader::load_listings_from_str;

    const CSV: &str = "\
price,model_year,model,condition,cylinders,fuel,odometer,transmission,type,paint_color,is_4wd,date_posted,days_listed
500,2010,toyota camry,good,4,gas,100000,automatic,sedan,white,,2018-06-23,10
1500,2012,ford f150,good,8,gas,120000,automatic,truck,,1.0,2018-06-24,20
200000,2019,ram 3500,new,8,diesel,10,automatic,truck,black,1.0,2018-06-25,30
200001,2019,ram 3500,new,8,diesel,10,automatic,truck,black,1.0,2018-06-26,40
,2019,ram 2500,new,8,diesel,10,automatic,truck,black,1.0,2018-06-27,50
";

    fn cleaned() -> DataFrame {
        let config = DashboardConfig::default();
        let raw = load_listings_from_str(CSV).unwrap();
        ListingCleaner::new(&config).clean(raw).unwrap().0
    }

    #[test]
    fn test_derive_make_first_token() {
        let df = df![
            MODEL => [Some("chevrolet silverado 1500"), Some("  honda civic"), None, Some(" ")],
        ]
        .unwrap();

        let makes = derive_make(&df).unwrap();
        let values: Vec<Option<&str>> = makes.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("chevrolet"), Some("honda"), None, None]);
    }

    #[test]
    fn test_derive_make_requires_model() {
        let df = df![PRICE => [1000i64]].unwrap();
        assert!(matches!(
            derive_make(&df),
            Err(DashboardError::ColumnNotFound(name)) if name == MODEL
        ));
    }

    #[test]
    fn test_enrich_reorders_columns() {
        let df = enrich(cleaned(), &DashboardConfig::default()).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, CANONICAL_ORDER.map(String::from).to_vec());
    }

    #[test]
    fn test_enrich_applies_inclusive_price_band() {
        let df = enrich(cleaned(), &DashboardConfig::default()).unwrap();

        let prices: Vec<Option<i64>> = df
            .column(PRICE)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(prices, vec![Some(1500), Some(200000)]);
    }

    #[test]
    fn test_enrich_is_stable_on_enriched_input() {
        let config = DashboardConfig::default();
        let once = enrich(cleaned(), &config).unwrap();
        let (recleaned, _) = ListingCleaner::new(&config).clean(once.clone()).unwrap();
        let twice = enrich(recleaned, &config).unwrap();

        assert!(once.equals_missing(&twice));
    }
}
