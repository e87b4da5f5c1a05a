use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::error::{PipelineError, Result};

pub const MASTER_FACTS: &str = "master_facts";
pub const CONTINENT_MONTH: &str = "covid_by_continent_month";
pub const COUNTRY_ATTRIBUTES: &str = "country_attributes";

/// Where a table was written and how many rows it held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub table: &'static str,
    pub path: PathBuf,
    pub rows: usize,
}

pub fn output_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}.csv"))
}

/// Writes `df` as `<dir>/<table>.csv` with a header row and no index column.
pub fn export_table(df: &mut DataFrame, dir: &Path, table: &'static str) -> Result<ExportReport> {
    let path = output_path(dir, table);
    let mut file = File::create(&path).map_err(|source| PipelineError::Output {
        path: path.clone(),
        source,
    })?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)?;

    info!(table, path = %path.display(), rows = df.height(), "exported table");

    Ok(ExportReport {
        table,
        path,
        rows: df.height(),
    })
}
