use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing gateway write activity.
#[derive(Default)]
pub struct GatewayMetrics {
    records_created: AtomicU64,
    records_updated: AtomicU64,
    records_deleted: AtomicU64,
    seeds_completed: AtomicU64,
    store_failures: AtomicU64,
}

impl GatewayMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful insert.
    pub fn record_created(&self) {
        self.records_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an update that matched a document.
    pub fn record_updated(&self) {
        self.records_updated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a delete that removed a document.
    pub fn record_deleted(&self) {
        self.records_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed seed run.
    pub fn record_seed(&self) {
        self.seeds_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed document store call.
    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_created: self.records_created.load(Ordering::Relaxed),
            records_updated: self.records_updated.load(Ordering::Relaxed),
            records_deleted: self.records_deleted.load(Ordering::Relaxed),
            seeds_completed: self.seeds_completed.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of gateway counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents inserted through `POST` since startup.
    pub records_created: u64,
    /// Updates that matched an existing document.
    pub records_updated: u64,
    /// Deletes that removed an existing document.
    pub records_deleted: u64,
    /// Seed runs that finished without error.
    pub seeds_completed: u64,
    /// Store calls that returned an error.
    pub store_failures: u64,
}
