use std::collections::HashSet;
use std::hash::Hash;

use polars::prelude::*;
use tracing::warn;

use crate::error::{PipelineError, Result};
use crate::loader::IncomeGroups;

const PER_100K: f64 = 100_000.0;
const RATE_DECIMALS: i32 = 3;

/// Left-joins yearly facts with the GDP, education and (when available)
/// income-group tables, then appends the per-100k rate columns.
///
/// The result has exactly one row per row of `yearly`.
pub fn build_master_facts(
    yearly: &DataFrame,
    gdp: &DataFrame,
    education: &DataFrame,
    income: &IncomeGroups,
) -> Result<DataFrame> {
    let gdp = first_per_country_year(gdp, "gdp_per_capita")?;
    let education = first_per_country_year(education, "education_index")?;

    let mut master = yearly
        .clone()
        .lazy()
        .join(
            gdp.lazy(),
            [col("country"), col("year")],
            [col("country"), col("year")],
            left_join(),
        )
        .join(
            education.lazy(),
            [col("country"), col("year")],
            [col("country"), col("year")],
            left_join(),
        );

    if let Some(groups) = income.joinable() {
        let groups = first_per_country(groups)?;
        master = master.join(groups.lazy(), [col("country")], [col("country")], left_join());
    }

    let joined = master
        .sort(["country", "year"], SortMultipleOptions::default())
        .collect()?;

    if joined.height() != yearly.height() {
        return Err(PipelineError::Validation(format!(
            "master facts has {} rows but yearly facts has {}",
            joined.height(),
            yearly.height()
        )));
    }

    append_rates(&joined)
}

/// Adds `cases_per_100k` and `deaths_per_100k`, left null where population
/// is missing or not positive.
pub fn append_rates(df: &DataFrame) -> Result<DataFrame> {
    let cases = df.column("new_cases_year")?.f64()?;
    let deaths = df.column("new_deaths_year")?.f64()?;
    let population = df.column("population")?.f64()?;

    let mut cases_rate = Vec::with_capacity(df.height());
    let mut deaths_rate = Vec::with_capacity(df.height());

    for idx in 0..df.height() {
        let pop = population.get(idx);
        cases_rate.push(per_100k(cases.get(idx), pop));
        deaths_rate.push(per_100k(deaths.get(idx), pop));
    }

    let mut output = df.clone();
    output.hstack_mut(&[
        Series::new("cases_per_100k".into(), cases_rate).into(),
        Series::new("deaths_per_100k".into(), deaths_rate).into(),
    ])?;

    Ok(output)
}

pub fn per_100k(count: Option<f64>, population: Option<f64>) -> Option<f64> {
    match (count, population) {
        (Some(count), Some(population)) if population > 0.0 => {
            let rate = count / population * PER_100K;
            rate.is_finite().then(|| round_half_even(rate, RATE_DECIMALS))
        }
        _ => None,
    }
}

fn round_half_even(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

fn left_join() -> JoinArgs {
    JoinArgs::new(JoinType::Left)
}

fn first_per_country_year(df: &DataFrame, table: &'static str) -> Result<DataFrame> {
    let countries = df.column("country")?.str()?;
    let years = df.column("year")?.i32()?;
    let keys = (0..df.height()).map(|idx| (countries.get(idx), years.get(idx)));
    keep_first_occurrence(df, keys, table)
}

fn first_per_country(df: &DataFrame) -> Result<DataFrame> {
    let countries = df.column("country")?.str()?;
    let keys = (0..df.height()).map(|idx| countries.get(idx));
    keep_first_occurrence(df, keys, "income_group")
}

fn keep_first_occurrence<K: Eq + Hash>(
    df: &DataFrame,
    keys: impl Iterator<Item = K>,
    table: &'static str,
) -> Result<DataFrame> {
    let mut seen = HashSet::with_capacity(df.height());
    let mask: Vec<bool> = keys.map(|key| seen.insert(key)).collect();
    let dropped = mask.iter().filter(|keep| !**keep).count();
    if dropped == 0 {
        return Ok(df.clone());
    }

    warn!(table, dropped, "dropping duplicate reference rows before join");
    let mask = BooleanChunked::from_slice("first_occurrence".into(), &mask);
    Ok(df.filter(&mask)?)
}
