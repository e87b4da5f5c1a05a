mod common;

use anyhow::Result;
use common::Workspace;
use pandemic_facts_core::loader::{
    load_income_groups, load_indicator, load_inputs, load_time_series, IncomeGroups,
    TIME_SERIES_COLUMNS,
};
use pandemic_facts_core::PipelineError;
use polars::prelude::*;

#[test]
fn time_series_keeps_only_expected_columns_and_parses_dates() -> Result<()> {
    let workspace = Workspace::new();
    let path = workspace.write_raw("owid-covid-data.csv", common::TIME_SERIES);

    let df = load_time_series(&path)?;

    assert_eq!(df.height(), 7);
    assert_eq!(common::column_names(&df), TIME_SERIES_COLUMNS.to_vec());
    assert_eq!(df.column("date")?.dtype(), &DataType::Date);
    assert_eq!(df.column("new_cases")?.dtype(), &DataType::Float64);
    assert_eq!(df.column("population")?.dtype(), &DataType::Float64);
    Ok(())
}

#[test]
fn indicator_headers_are_trimmed_and_lowercased() -> Result<()> {
    let workspace = Workspace::new();
    let path = workspace.write_raw("gdp_per_capita.csv", common::GDP);

    let df = load_indicator(&path, "gdp_per_capita")?;

    assert_eq!(
        common::column_names(&df),
        vec!["country", "year", "gdp_per_capita"]
    );
    assert_eq!(df.column("year")?.dtype(), &DataType::Int32);
    assert_eq!(df.column("gdp_per_capita")?.f64()?.get(0), Some(42000.5));
    Ok(())
}

#[test]
fn missing_required_file_is_reported_with_its_path() {
    let workspace = Workspace::new();
    let path = workspace.config.raw_dir.join("education_index.csv");

    let err = load_indicator(&path, "education_index").unwrap_err();

    match err {
        PipelineError::MissingInput { path: reported } => assert_eq!(reported, path),
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

#[test]
fn missing_column_is_a_load_error() {
    let workspace = Workspace::new();
    let path = workspace.write_raw("education_index.csv", "country,year,hdi\nTestland,2021,0.9\n");

    let err = load_indicator(&path, "education_index").unwrap_err();

    match err {
        PipelineError::MissingColumn { table, column } => {
            assert_eq!(table, "education_index");
            assert_eq!(column, "education_index");
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn time_series_without_population_is_rejected() {
    let workspace = Workspace::new();
    let path = workspace.write_raw(
        "owid-covid-data.csv",
        "iso_code,continent,location,date,new_cases,new_deaths\nTST,Europe,Testland,2021-01-05,1,0\n",
    );

    let err = load_time_series(&path).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MissingColumn { table: "time_series", ref column } if column == "population"
    ));
}

#[test]
fn absent_income_file_is_an_empty_relation() -> Result<()> {
    let workspace = Workspace::new();

    let groups = load_income_groups(&workspace.config.income_path())?;
    assert!(matches!(groups, IncomeGroups::Absent));
    assert!(groups.joinable().is_none());

    let relation = groups.into_relation();
    assert_eq!(relation.height(), 0);
    assert_eq!(
        common::column_names(&relation),
        vec!["country", "income_group"]
    );
    Ok(())
}

#[test]
fn present_income_file_is_normalized() -> Result<()> {
    let workspace = Workspace::new();
    workspace.write_raw("country_income_groups.csv", common::INCOME);

    let groups = load_income_groups(&workspace.config.income_path())?;
    let relation = groups.joinable().expect("income groups should be joinable");

    assert_eq!(
        common::column_names(relation),
        vec!["country", "income_group"]
    );
    assert_eq!(relation.column("income_group")?.str()?.get(0), Some("High income"));
    Ok(())
}

#[test]
fn header_only_income_file_is_not_joinable() -> Result<()> {
    let workspace = Workspace::new();
    workspace.write_raw("country_income_groups.csv", "country,income_group\n");

    let groups = load_income_groups(&workspace.config.income_path())?;
    assert!(matches!(groups, IncomeGroups::Present(_)));
    assert!(groups.joinable().is_none());
    Ok(())
}

#[test]
fn load_inputs_reads_all_sources() -> Result<()> {
    let workspace = Workspace::seeded(true);

    let inputs = load_inputs(&workspace.config)?;

    assert_eq!(inputs.time_series.height(), 7);
    assert_eq!(inputs.gdp.height(), 3);
    assert_eq!(inputs.education.height(), 1);
    assert!(inputs.income.joinable().is_some());
    Ok(())
}
