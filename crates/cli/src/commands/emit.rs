//! `emit` command implementation.

use anyhow::{Context, Result};
use observability::DeliveryAggregator;
use std::time::Instant;
use tracing::info;

use super::{build_multiplexer, finish};
use crate::cli::EmitArgs;

/// Execute the `emit` command
pub fn run_emit(args: &EmitArgs) -> Result<()> {
    let multiplexer = build_multiplexer(&args.config)?;

    let started = Instant::now();
    let result = multiplexer.add(
        args.severity,
        Some(&args.message),
        args.progname.as_deref(),
        None,
    );
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
    observability::record_write_latency_ms(latency_ms);

    let mut aggregator = DeliveryAggregator::new();
    aggregator.record_call(latency_ms, result.is_ok());
    finish(&multiplexer, &mut aggregator);

    if args.stats {
        print!("{}", aggregator.summary());
    }

    result.context("Failed to deliver record")?;
    info!(severity = %args.severity, sinks = multiplexer.len(), "Record emitted");
    Ok(())
}
