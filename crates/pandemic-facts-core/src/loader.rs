use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

pub const TIME_SERIES_COLUMNS: [&str; 7] = [
    "iso_code",
    "location",
    "date",
    "continent",
    "new_cases",
    "new_deaths",
    "population",
];

/// Income-group reference data. The source file is optional.
#[derive(Debug, Clone)]
pub enum IncomeGroups {
    Present(DataFrame),
    Absent,
}

impl IncomeGroups {
    /// The `{country, income_group}` relation with no rows.
    pub fn empty_relation() -> DataFrame {
        DataFrame::new(vec![
            Series::new_empty("country".into(), &DataType::String).into(),
            Series::new_empty("income_group".into(), &DataType::String).into(),
        ])
        .unwrap_or_default()
    }

    /// Returns the relation only when there is something to join against.
    pub fn joinable(&self) -> Option<&DataFrame> {
        match self {
            IncomeGroups::Present(df) if df.height() > 0 => Some(df),
            _ => None,
        }
    }

    pub fn into_relation(self) -> DataFrame {
        match self {
            IncomeGroups::Present(df) => df,
            IncomeGroups::Absent => Self::empty_relation(),
        }
    }
}

/// All four raw sources, read and typed but otherwise untouched.
#[derive(Debug, Clone)]
pub struct RawInputs {
    pub time_series: DataFrame,
    pub gdp: DataFrame,
    pub education: DataFrame,
    pub income: IncomeGroups,
}

pub fn load_inputs(config: &PipelineConfig) -> Result<RawInputs> {
    Ok(RawInputs {
        time_series: load_time_series(&config.time_series_path())?,
        gdp: load_indicator(&config.gdp_path(), "gdp_per_capita")?,
        education: load_indicator(&config.education_path(), "education_index")?,
        income: load_income_groups(&config.income_path())?,
    })
}

/// Reads the daily case/death extract, keeping only the columns the pipeline uses.
pub fn load_time_series(path: &Path) -> Result<DataFrame> {
    let df = read_csv(path)?;
    require_columns(&df, "time_series", &TIME_SERIES_COLUMNS)?;

    let df = df
        .lazy()
        .select([
            col("iso_code").cast(DataType::String),
            col("location").cast(DataType::String),
            col("date")
                .cast(DataType::String)
                .str()
                .to_date(StrptimeOptions {
                    format: Some("%Y-%m-%d".into()),
                    ..Default::default()
                }),
            col("continent").cast(DataType::String),
            col("new_cases").cast(DataType::Float64),
            col("new_deaths").cast(DataType::Float64),
            col("population").cast(DataType::Float64),
        ])
        .collect()?;

    debug!(path = %path.display(), rows = df.height(), "loaded time series");
    Ok(df)
}

/// Reads a `{country, year, <value_column>}` table with case/whitespace-insensitive headers.
pub fn load_indicator(path: &Path, value_column: &'static str) -> Result<DataFrame> {
    let mut df = read_csv(path)?;
    normalize_headers(&mut df)?;
    require_columns(&df, value_column, &["country", "year", value_column])?;

    let df = df
        .lazy()
        .select([
            col("country").cast(DataType::String),
            col("year").cast(DataType::Int32),
            col(value_column).cast(DataType::Float64),
        ])
        .collect()?;

    debug!(path = %path.display(), rows = df.height(), "loaded {value_column}");
    Ok(df)
}

pub fn load_income_groups(path: &Path) -> Result<IncomeGroups> {
    if !path.exists() {
        debug!(path = %path.display(), "income groups not provided");
        return Ok(IncomeGroups::Absent);
    }

    let mut df = read_csv(path)?;
    normalize_headers(&mut df)?;
    require_columns(&df, "income_group", &["country", "income_group"])?;

    let df = df
        .lazy()
        .select([
            col("country").cast(DataType::String),
            col("income_group").cast(DataType::String),
        ])
        .collect()?;

    debug!(path = %path.display(), rows = df.height(), "loaded income groups");
    Ok(IncomeGroups::Present(df))
}

/// Trims and lowercases every column name in place.
pub fn normalize_headers(df: &mut DataFrame) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str().trim().to_lowercase())
        .collect();
    df.set_column_names(names.iter().map(|s| s.as_str()))?;
    Ok(())
}

fn require_columns(df: &DataFrame, table: &'static str, columns: &[&str]) -> Result<()> {
    let present = df.get_column_names();
    for column in columns {
        if !present.iter().any(|name| name.as_str() == *column) {
            return Err(PipelineError::MissingColumn {
                table,
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::MissingInput {
            path: path.to_path_buf(),
        },
        _ => PipelineError::Io(e),
    })?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(file)
        .finish()?;
    Ok(df)
}
