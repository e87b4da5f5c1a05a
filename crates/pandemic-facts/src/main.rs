use anyhow::{Context, Result};
use clap::Parser;
use pandemic_facts_core::{pipeline, PipelineConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Build yearly country and monthly continent summary tables from raw pandemic, GDP and education extracts",
    long_about = None
)]
struct Cli {}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let _cli = Cli::parse();

    let config = PipelineConfig::from_env().context("failed to resolve pipeline configuration")?;
    info!(
        raw_dir = %config.raw_dir.display(),
        processed_dir = %config.processed_dir.display(),
        "starting pipeline"
    );

    let summary = pipeline::run(&config).context("pipeline run failed")?;

    for export in &summary.exports {
        println!("Saved: {} rows={}", export.path.display(), export.rows);
    }

    info!(summary = %serde_json::to_string(&summary)?, "pipeline finished");
    Ok(())
}
