use std::collections::BTreeMap;

use polars::prelude::*;

use crate::error::Result;

/// One row per country: the earliest-year continent and income group, plus
/// the latest year present in the master table.
///
/// "Earliest" means the first non-null value in ascending year order. When
/// master facts carry no `income_group` column the output column is all null.
pub fn derive_country_attributes(master: &DataFrame) -> Result<DataFrame> {
    let countries = master.column("country")?.str()?;
    let continents = master.column("continent")?.str()?;
    let years = master.column("year")?.i32()?;
    let income = match master.column("income_group") {
        Ok(column) => Some(column.str()?),
        Err(_) => None,
    };

    let mut rows_by_country: BTreeMap<&str, Vec<(Option<i32>, usize)>> = BTreeMap::new();
    for idx in 0..master.height() {
        if let Some(country) = countries.get(idx) {
            rows_by_country
                .entry(country)
                .or_default()
                .push((years.get(idx), idx));
        }
    }

    let mut country_col = Vec::with_capacity(rows_by_country.len());
    let mut continent_col = Vec::with_capacity(rows_by_country.len());
    let mut latest_year_col = Vec::with_capacity(rows_by_country.len());
    let mut income_col = Vec::with_capacity(rows_by_country.len());

    for (country, mut rows) in rows_by_country {
        // Null years sort first.
        rows.sort_by_key(|(year, _)| *year);

        let continent = rows.iter().find_map(|(_, idx)| continents.get(*idx));
        let latest_year = rows.iter().filter_map(|(year, _)| *year).max();
        let income_group = income
            .and_then(|groups| rows.iter().find_map(|(_, idx)| groups.get(*idx)));

        country_col.push(country);
        continent_col.push(continent);
        latest_year_col.push(latest_year);
        income_col.push(income_group);
    }

    let attributes = DataFrame::new(vec![
        Series::new("country".into(), country_col).into(),
        Series::new("continent".into(), continent_col).into(),
        Series::new("latest_year".into(), latest_year_col).into(),
        Series::new("income_group".into(), income_col).into(),
    ])?;

    Ok(attributes)
}
