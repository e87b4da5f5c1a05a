#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use pandemic_facts_core::PipelineConfig;
use polars::prelude::*;
use tempfile::TempDir;

pub const TIME_SERIES: &str = "\
iso_code,continent,location,date,total_cases,new_cases,new_deaths,population
TST,Europe,Testland,2021-01-05,100,100,1,1000000
TST,Europe,Testland,2021-02-10,150,50,,1000000
TST,Europe,Testland,2022-03-01,160,10,0,1000000
ZRO,Africa,\" Zeroland \",2020-04-02,,10,2,0
ZRO,Africa,\" Zeroland \",2020-04-20,,20,,0
OWID_AFR,,Africa,2020-04-02,,999,99,
OWID_WRL,,World,2021-01-05,,5000,50,8000000000
";

pub const GDP: &str = "\
 Country , YEAR ,GDP_Per_Capita
Testland,2021,42000.5
Testland,2022,43000
Nowhere,2021,1
";

pub const EDUCATION: &str = "\
country,year,Education_Index
Testland,2021,0.9
";

pub const INCOME: &str = "\
Country,Income_Group
Testland,High income
";

/// Raw and processed directories inside a temporary workspace.
pub struct Workspace {
    pub dir: TempDir,
    pub config: PipelineConfig,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = PipelineConfig::with_data_dir(dir.path());
        fs::create_dir_all(&config.raw_dir).expect("create raw dir");
        fs::create_dir_all(&config.processed_dir).expect("create processed dir");
        Self { dir, config }
    }

    /// Workspace seeded with every fixture, optionally without the income file.
    pub fn seeded(with_income: bool) -> Self {
        let workspace = Self::new();
        workspace.write_raw("owid-covid-data.csv", TIME_SERIES);
        workspace.write_raw("gdp_per_capita.csv", GDP);
        workspace.write_raw("education_index.csv", EDUCATION);
        if with_income {
            workspace.write_raw("country_income_groups.csv", INCOME);
        }
        workspace
    }

    pub fn write_raw(&self, name: &str, content: &str) -> PathBuf {
        let path = self.config.raw_dir.join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.config.processed_dir.join(name)
    }
}

pub fn read_csv(path: &Path) -> DataFrame {
    let file = File::open(path).expect("open csv");
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(file)
        .finish()
        .expect("read csv")
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Reads a numeric column back as f64 regardless of how the CSV reader inferred it.
pub fn f64_column(df: &DataFrame, name: &str) -> Float64Chunked {
    df.column(name)
        .expect("column present")
        .cast(&DataType::Float64)
        .expect("cast to f64")
        .f64()
        .expect("f64 column")
        .clone()
}

pub fn i64_column(df: &DataFrame, name: &str) -> Int64Chunked {
    df.column(name)
        .expect("column present")
        .cast(&DataType::Int64)
        .expect("cast to i64")
        .i64()
        .expect("i64 column")
        .clone()
}
