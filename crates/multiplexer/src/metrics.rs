//! Sink metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::DeliverySnapshot;

/// Delivery counters for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Calls delegated directly
    delegated: AtomicU64,
    /// Calls delivered via tag posting
    posted: AtomicU64,
    /// Calls skipped for lack of capability
    skipped: AtomicU64,
    /// Calls that failed inside the sink
    failed: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delegated(&self) -> u64 {
        self.delegated.load(Ordering::Relaxed)
    }

    pub fn inc_delegated(&self) {
        self.delegated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn posted(&self) -> u64 {
        self.posted.load(Ordering::Relaxed)
    }

    pub fn inc_posted(&self) {
        self.posted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn inc_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> DeliverySnapshot {
        DeliverySnapshot {
            delegated: self.delegated(),
            posted: self.posted(),
            skipped: self.skipped(),
            failed: self.failed(),
        }
    }
}
