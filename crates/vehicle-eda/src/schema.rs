//! Column names of the listings table.
//!
//! Every stage addresses columns through these constants so a renamed
//! header only has to change here.

pub const PRICE: &str = "price";
pub const MODEL_YEAR: &str = "model_year";
pub const MAKE: &str = "make";
pub const MODEL: &str = "model";
pub const CONDITION: &str = "condition";
pub const CYLINDERS: &str = "cylinders";
pub const FUEL: &str = "fuel";
pub const ODOMETER: &str = "odometer";
pub const TRANSMISSION: &str = "transmission";
pub const TYPE: &str = "type";
pub const PAINT_COLOR: &str = "paint_color";
pub const IS_4WD: &str = "is_4wd";
pub const DATE_POSTED: &str = "date_posted";
pub const DAYS_LISTED: &str = "days_listed";

/// Columns the source file must provide.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    PRICE,
    MODEL_YEAR,
    MODEL,
    CONDITION,
    CYLINDERS,
    FUEL,
    ODOMETER,
    TRANSMISSION,
    TYPE,
    PAINT_COLOR,
    IS_4WD,
    DATE_POSTED,
    DAYS_LISTED,
];

/// Column order of the enriched table.
pub const CANONICAL_ORDER: [&str; 14] = [
    PRICE,
    MODEL_YEAR,
    MAKE,
    MODEL,
    CONDITION,
    CYLINDERS,
    FUEL,
    ODOMETER,
    TRANSMISSION,
    TYPE,
    PAINT_COLOR,
    IS_4WD,
    DATE_POSTED,
    DAYS_LISTED,
];

/// Integer columns of the cleaned table. `cylinders` is only integer under
/// the group-median policy.
pub const INTEGER_COLUMNS: [&str; 4] = [MODEL_YEAR, ODOMETER, PRICE, DAYS_LISTED];

/// Columns filled by the per-type median.
pub const IMPUTED_COLUMNS: [&str; 3] = [MODEL_YEAR, ODOMETER, CYLINDERS];

// Aggregate and ranking output columns.
pub const COUNT: &str = "count";
pub const AVG_PRICE: &str = "avg_price";
pub const AVG_ODOMETER: &str = "avg_odometer";
pub const PERCENT_OF_4WD: &str = "percent_of_4wd";
pub const AVG_DAYS_LISTED: &str = "avg_days_listed";
pub const FOUR_WD_LABEL: &str = "4WD";
