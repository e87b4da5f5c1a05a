use std::collections::HashSet;

use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Collapses daily records into one row per (country, continent, year).
///
/// Population takes the maximum reported value within the year so that
/// mid-year estimate revisions do not produce duplicate rows.
pub fn yearly_country_facts(daily: &DataFrame) -> Result<DataFrame> {
    let yearly = daily
        .clone()
        .lazy()
        .filter(
            col("country")
                .is_not_null()
                .and(col("continent").is_not_null())
                .and(col("year").is_not_null()),
        )
        .group_by([col("country"), col("continent"), col("year")])
        .agg([
            col("new_cases").sum().alias("new_cases_year"),
            col("new_deaths").sum().alias("new_deaths_year"),
            col("population").max().alias("population"),
        ])
        .sort(["country", "year"], SortMultipleOptions::default())
        .collect()?;

    ensure_unique_country_years(&yearly)?;
    Ok(yearly)
}

/// Sums daily counts per (continent, month).
pub fn continent_month_facts(daily: &DataFrame) -> Result<DataFrame> {
    let monthly = daily
        .clone()
        .lazy()
        .filter(col("continent").is_not_null().and(col("month").is_not_null()))
        .group_by([col("continent"), col("month")])
        .agg([
            col("new_cases").sum().alias("new_cases"),
            col("new_deaths").sum().alias("new_deaths"),
        ])
        .sort(["continent", "month"], SortMultipleOptions::default())
        .collect()?;

    Ok(monthly)
}

fn ensure_unique_country_years(yearly: &DataFrame) -> Result<()> {
    let countries = yearly.column("country")?.str()?;
    let years = yearly.column("year")?.i32()?;

    let mut seen = HashSet::with_capacity(yearly.height());
    for idx in 0..yearly.height() {
        let key = (countries.get(idx), years.get(idx));
        if !seen.insert(key) {
            return Err(PipelineError::Validation(format!(
                "country {} appears under more than one continent in {}",
                key.0.unwrap_or("<null>"),
                key.1.map(|y| y.to_string()).unwrap_or_else(|| "<null>".into()),
            )));
        }
    }
    Ok(())
}
