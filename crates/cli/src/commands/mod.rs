//! Command implementations.

mod emit;
mod info;
mod pipe;
mod validate;

pub use emit::run_emit;
pub use info::run_info;
pub use pipe::run_pipe;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::MultiplexerConfig;
use multiplexer::Multiplexer;
use observability::DeliveryAggregator;
use std::path::Path;
use tracing::info;

use crate::error::CliError;

fn load_config(path: &Path) -> Result<MultiplexerConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

fn build_multiplexer(path: &Path) -> Result<Multiplexer> {
    info!(config = %path.display(), "Loading configuration");
    let config = load_config(path)?;
    let multiplexer =
        multiplexer::create_multiplexer(&config).context("Failed to create sinks")?;
    observability::record_sink_count(multiplexer.len());
    Ok(multiplexer)
}

/// Close sinks, publish their counters and fold them into `aggregator`
fn finish(multiplexer: &Multiplexer, aggregator: &mut DeliveryAggregator) {
    multiplexer.close();
    for (sink, snapshot) in multiplexer.metrics() {
        observability::record_delivery(&sink, &snapshot);
        aggregator.update(&sink, snapshot);
    }
}
