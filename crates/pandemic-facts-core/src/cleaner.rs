use polars::prelude::*;

use crate::error::Result;

/// iso_code prefix the source uses for continent and world rollups.
pub const AGGREGATE_REGION_PREFIX: &str = "OWID";

pub const DAILY_RECORD_COLUMNS: [&str; 9] = [
    "iso_code",
    "country",
    "continent",
    "date",
    "year",
    "month",
    "new_cases",
    "new_deaths",
    "population",
];

/// Drops aggregate-region rows, zero-fills missing counts and derives the
/// `country`, `year` and `month` keys.
pub fn clean_time_series(raw: &DataFrame) -> Result<DataFrame> {
    let cleaned = raw
        .clone()
        .lazy()
        .filter(
            col("iso_code")
                .str()
                .starts_with(lit(AGGREGATE_REGION_PREFIX))
                .fill_null(lit(false))
                .not(),
        )
        .with_columns([
            zero_filled("new_cases"),
            zero_filled("new_deaths"),
            col("location")
                .str()
                .strip_chars(lit(NULL))
                .alias("country"),
            col("date").dt().year().alias("year"),
            col("date").dt().strftime("%Y-%m").alias("month"),
        ])
        .select(DAILY_RECORD_COLUMNS.map(col))
        .collect()?;

    Ok(cleaned)
}

fn zero_filled(name: &str) -> Expr {
    col(name)
        .fill_null(lit(0.0))
        .fill_nan(lit(0.0))
        .alias(name)
}
