//! DeliverySnapshot - per-sink delivery counters

use serde::{Deserialize, Serialize};

/// Snapshot of one sink's delivery counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySnapshot {
    /// Calls delegated directly (`add` / raw write)
    pub delegated: u64,
    /// Calls delivered through the tag-poster fallback
    pub posted: u64,
    /// Calls skipped because the sink lacks the capability
    pub skipped: u64,
    /// Calls that returned an error
    pub failed: u64,
}

impl DeliverySnapshot {
    /// Calls that reached the sink, successfully or not
    pub fn attempted(&self) -> u64 {
        self.delegated + self.posted + self.failed
    }
}
