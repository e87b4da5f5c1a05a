use std::path::Path;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::{
    aggregator, cleaner,
    config::PipelineConfig,
    country_attributes,
    error::Result,
    exporter::{self, ExportReport},
    joiner,
    loader::{self, IncomeGroups, RawInputs},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Loaded,
    Cleaned,
    Aggregated,
    Joined,
    Exported,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Loaded => "loaded",
            PipelineStage::Cleaned => "cleaned",
            PipelineStage::Aggregated => "aggregated",
            PipelineStage::Joined => "joined",
            PipelineStage::Exported => "exported",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub time_series_rows: usize,
    pub daily_rows: usize,
    pub income_groups_present: bool,
    pub exports: Vec<ExportReport>,
}

#[derive(Debug, Clone)]
struct ReferenceTables {
    gdp: DataFrame,
    education: DataFrame,
    income: IncomeGroups,
}

#[derive(Debug)]
pub struct Loaded {
    inputs: RawInputs,
}

#[derive(Debug)]
pub struct Cleaned {
    time_series_rows: usize,
    daily: DataFrame,
    references: ReferenceTables,
}

#[derive(Debug)]
pub struct Aggregated {
    time_series_rows: usize,
    daily_rows: usize,
    yearly: DataFrame,
    continent_month: DataFrame,
    references: ReferenceTables,
}

#[derive(Debug)]
pub struct Joined {
    time_series_rows: usize,
    daily_rows: usize,
    income_groups_present: bool,
    master: DataFrame,
    continent_month: DataFrame,
    attributes: DataFrame,
}

#[derive(Debug)]
pub struct Exported {
    summary: PipelineSummary,
}

/// Runs every stage in order and writes the three output tables.
pub fn run(config: &PipelineConfig) -> Result<PipelineSummary> {
    let exported = Loaded::load(config)?
        .clean()?
        .aggregate()?
        .join()?
        .export(&config.processed_dir)?;
    Ok(exported.into_summary())
}

impl Loaded {
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        let inputs = loader::load_inputs(config)?;
        info!(
            stage = PipelineStage::Loaded.as_str(),
            time_series_rows = inputs.time_series.height(),
            gdp_rows = inputs.gdp.height(),
            education_rows = inputs.education.height(),
            income_groups_present = matches!(inputs.income, IncomeGroups::Present(_)),
            "inputs loaded"
        );
        Ok(Self { inputs })
    }

    pub fn from_inputs(inputs: RawInputs) -> Self {
        Self { inputs }
    }

    pub fn clean(self) -> Result<Cleaned> {
        let RawInputs {
            time_series,
            gdp,
            education,
            income,
        } = self.inputs;

        let daily = cleaner::clean_time_series(&time_series)?;
        info!(
            stage = PipelineStage::Cleaned.as_str(),
            dropped = time_series.height() - daily.height(),
            rows = daily.height(),
            "time series cleaned"
        );

        Ok(Cleaned {
            time_series_rows: time_series.height(),
            daily,
            references: ReferenceTables {
                gdp,
                education,
                income,
            },
        })
    }
}

impl Cleaned {
    pub fn daily(&self) -> &DataFrame {
        &self.daily
    }

    pub fn aggregate(self) -> Result<Aggregated> {
        let yearly = aggregator::yearly_country_facts(&self.daily)?;
        let continent_month = aggregator::continent_month_facts(&self.daily)?;
        info!(
            stage = PipelineStage::Aggregated.as_str(),
            yearly_rows = yearly.height(),
            continent_month_rows = continent_month.height(),
            "daily records aggregated"
        );

        Ok(Aggregated {
            time_series_rows: self.time_series_rows,
            daily_rows: self.daily.height(),
            yearly,
            continent_month,
            references: self.references,
        })
    }
}

impl Aggregated {
    pub fn yearly(&self) -> &DataFrame {
        &self.yearly
    }

    pub fn join(self) -> Result<Joined> {
        let ReferenceTables {
            gdp,
            education,
            income,
        } = self.references;

        let master = joiner::build_master_facts(&self.yearly, &gdp, &education, &income)?;
        let attributes = country_attributes::derive_country_attributes(&master)?;
        info!(
            stage = PipelineStage::Joined.as_str(),
            master_rows = master.height(),
            countries = attributes.height(),
            "reference tables joined"
        );

        Ok(Joined {
            time_series_rows: self.time_series_rows,
            daily_rows: self.daily_rows,
            income_groups_present: matches!(income, IncomeGroups::Present(_)),
            master,
            continent_month: self.continent_month,
            attributes,
        })
    }
}

impl Joined {
    pub fn master(&self) -> &DataFrame {
        &self.master
    }

    pub fn attributes(&self) -> &DataFrame {
        &self.attributes
    }

    pub fn export(mut self, dir: &Path) -> Result<Exported> {
        let exports = vec![
            exporter::export_table(&mut self.master, dir, exporter::MASTER_FACTS)?,
            exporter::export_table(&mut self.continent_month, dir, exporter::CONTINENT_MONTH)?,
            exporter::export_table(&mut self.attributes, dir, exporter::COUNTRY_ATTRIBUTES)?,
        ];
        info!(
            stage = PipelineStage::Exported.as_str(),
            tables = exports.len(),
            "outputs written"
        );

        Ok(Exported {
            summary: PipelineSummary {
                time_series_rows: self.time_series_rows,
                daily_rows: self.daily_rows,
                income_groups_present: self.income_groups_present,
                exports,
            },
        })
    }
}

impl Exported {
    pub fn summary(&self) -> &PipelineSummary {
        &self.summary
    }

    pub fn into_summary(self) -> PipelineSummary {
        self.summary
    }
}
