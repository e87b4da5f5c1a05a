use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PipelineError, Result};

const TIME_SERIES_FILE: &str = "owid-covid-data.csv";
const GDP_FILE: &str = "gdp_per_capita.csv";
const EDUCATION_FILE: &str = "education_index.csv";
const INCOME_FILE: &str = "country_income_groups.csv";

const DEFAULT_DATA_DIR: &str = "data";

/// Locations of the raw inputs and processed outputs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    raw_dir: Option<PathBuf>,
    processed_dir: Option<PathBuf>,
}

impl PipelineConfig {
    /// Lays out `raw/` and `processed/` under a single data directory.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            raw_dir: data_dir.join("raw"),
            processed_dir: data_dir.join("processed"),
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match env::var("PANDEMIC_FACTS_CONFIG") {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) => Self::with_data_dir(
                env::var("PANDEMIC_FACTS_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
            ),
        };

        if let Ok(raw_dir) = env::var("PANDEMIC_FACTS_RAW_DIR") {
            config.raw_dir = PathBuf::from(raw_dir);
        }
        if let Ok(processed_dir) = env::var("PANDEMIC_FACTS_PROCESSED_DIR") {
            config.processed_dir = PathBuf::from(processed_dir);
        }

        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| PipelineError::Config(e.to_string()))?;
        let defaults = Self::with_data_dir(DEFAULT_DATA_DIR);
        Ok(Self {
            raw_dir: file.raw_dir.unwrap_or(defaults.raw_dir),
            processed_dir: file.processed_dir.unwrap_or(defaults.processed_dir),
        })
    }

    pub fn time_series_path(&self) -> PathBuf {
        self.raw_dir.join(TIME_SERIES_FILE)
    }

    pub fn gdp_path(&self) -> PathBuf {
        self.raw_dir.join(GDP_FILE)
    }

    pub fn education_path(&self) -> PathBuf {
        self.raw_dir.join(EDUCATION_FILE)
    }

    pub fn income_path(&self) -> PathBuf {
        self.raw_dir.join(INCOME_FILE)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_data_dir(DEFAULT_DATA_DIR)
    }
}
