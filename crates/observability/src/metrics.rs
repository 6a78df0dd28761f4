//! Delivery metrics
//!
//! Publishes per-sink delivery counters and aggregates them for summaries.

use std::collections::BTreeMap;

use contracts::DeliverySnapshot;
use metrics::{counter, gauge, histogram};

/// Publish a sink's delivery snapshot
///
/// Snapshots are cumulative, so counters are set with `absolute`.
///
/// # Example
///
/// ```ignore
/// for (sink, snapshot) in multiplexer.metrics() {
///     observability::metrics::record_delivery(&sink, &snapshot);
/// }
/// ```
pub fn record_delivery(sink: &str, snapshot: &DeliverySnapshot) {
    let sink = sink.to_string();
    counter!("logmux_records_delegated_total", "sink" => sink.clone())
        .absolute(snapshot.delegated);
    counter!("logmux_records_posted_total", "sink" => sink.clone()).absolute(snapshot.posted);
    counter!("logmux_records_skipped_total", "sink" => sink.clone()).absolute(snapshot.skipped);
    counter!("logmux_records_failed_total", "sink" => sink).absolute(snapshot.failed);
}

/// Record how long one multiplexed call took
pub fn record_write_latency_ms(latency_ms: f64) {
    histogram!("logmux_write_latency_ms").record(latency_ms);
}

/// Record the number of registered sinks
pub fn record_sink_count(count: usize) {
    gauge!("logmux_sinks").set(count as f64);
}

/// In-memory aggregation of delivery snapshots and call latency
#[derive(Debug, Clone, Default)]
pub struct DeliveryAggregator {
    /// Latest snapshot per sink
    pub sinks: BTreeMap<String, DeliverySnapshot>,

    /// Latency of multiplexed calls (ms)
    pub latency_stats: RunningStats,

    /// Calls that returned an error
    pub failed_calls: u64,
}

impl DeliveryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored snapshot for `sink`
    pub fn update(&mut self, sink: &str, snapshot: DeliverySnapshot) {
        self.sinks.insert(sink.to_string(), snapshot);
    }

    /// Record one multiplexed call
    pub fn record_call(&mut self, latency_ms: f64, ok: bool) {
        self.latency_stats.push(latency_ms);
        if !ok {
            self.failed_calls += 1;
        }
    }

    pub fn totals(&self) -> DeliverySnapshot {
        self.sinks
            .values()
            .fold(DeliverySnapshot::default(), |acc, s| DeliverySnapshot {
                delegated: acc.delegated + s.delegated,
                posted: acc.posted + s.posted,
                skipped: acc.skipped + s.skipped,
                failed: acc.failed + s.failed,
            })
    }

    pub fn summary(&self) -> DeliverySummary {
        let totals = self.totals();
        let attempted = totals.attempted();
        DeliverySummary {
            calls: self.latency_stats.count(),
            failed_calls: self.failed_calls,
            totals,
            failure_rate: if attempted > 0 {
                totals.failed as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            per_sink: self.sinks.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Delivery summary
#[derive(Debug, Clone, Default)]
pub struct DeliverySummary {
    pub calls: u64,
    pub failed_calls: u64,
    pub totals: DeliverySnapshot,
    pub failure_rate: f64,
    pub latency_ms: StatsSummary,
    pub per_sink: BTreeMap<String, DeliverySnapshot>,
}

impl std::fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Delivery Summary ===")?;
        writeln!(f, "Calls: {} ({} failed)", self.calls, self.failed_calls)?;
        writeln!(
            f,
            "Delegated: {}, posted: {}, skipped: {}",
            self.totals.delegated, self.totals.posted, self.totals.skipped
        )?;
        writeln!(
            f,
            "Failed deliveries: {} ({:.2}%)",
            self.totals.failed, self.failure_rate
        )?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;

        if !self.per_sink.is_empty() {
            writeln!(f, "Per sink:")?;
            for (sink, s) in &self.per_sink {
                writeln!(
                    f,
                    "  {}: delegated={} posted={} skipped={} failed={}",
                    sink, s.delegated, s.posted, s.skipped, s.failed
                )?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
