pub mod aggregator;
pub mod cleaner;
pub mod config;
pub mod country_attributes;
pub mod error;
pub mod exporter;
pub mod joiner;
pub mod loader;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{run, PipelineSummary};
