//! `pipe` command implementation.

use anyhow::Result;
use contracts::Severity;
use multiplexer::Multiplexer;
use observability::DeliveryAggregator;
use std::io::BufRead;
use std::time::Instant;
use tracing::{info, warn};

use super::{build_multiplexer, finish};
use crate::cli::PipeArgs;
use crate::error::CliError;

/// Execute the `pipe` command
pub fn run_pipe(args: &PipeArgs) -> Result<()> {
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let multiplexer = build_multiplexer(&args.config)?;
    let mut aggregator = DeliveryAggregator::new();

    let stdin = std::io::stdin();
    let pumped = pump(
        stdin.lock(),
        &multiplexer,
        args.severity,
        args.fail_fast,
        &mut aggregator,
    );
    finish(&multiplexer, &mut aggregator);

    if args.stats {
        print!("{}", aggregator.summary());
    }

    let summary = aggregator.summary();
    info!(
        lines = summary.calls,
        failed = summary.failed_calls,
        "Input drained"
    );
    pumped?;
    if summary.failed_calls > 0 {
        return Err(CliError::delivery(summary.failed_calls, summary.calls).into());
    }
    Ok(())
}

/// Deliver every line of `input`
///
/// Lines are written raw (newline restored) unless a severity is given.
fn pump(
    input: impl BufRead,
    multiplexer: &Multiplexer,
    severity: Option<Severity>,
    fail_fast: bool,
    aggregator: &mut DeliveryAggregator,
) -> Result<()> {
    for (lineno, line) in input.lines().enumerate() {
        let line = line?;

        let started = Instant::now();
        let result = match severity {
            Some(severity) => multiplexer
                .add(severity, Some(&line), None, None)
                .map(|_| ()),
            None => multiplexer.write(&format!("{line}\n")),
        };
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        observability::record_write_latency_ms(latency_ms);
        aggregator.record_call(latency_ms, result.is_ok());

        if let Err(e) = result {
            warn!(line = lineno + 1, error = %e, "Delivery failed");
            if fail_fast {
                return Err(e.into());
            }
        }
    }
    Ok(())
}
