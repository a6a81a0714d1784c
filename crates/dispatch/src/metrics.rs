//! Engine metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single dispatch engine
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Last observed worker queue length
    queue_len: AtomicUsize,
    /// Batches accepted onto a worker queue
    enqueued: AtomicU64,
    /// Batches whose handler completed successfully
    processed: AtomicU64,
    /// Batches whose handler returned an error
    failed: AtomicU64,
    /// Batches rejected at enqueue (full queue or wrong state)
    rejected: AtomicU64,
}

impl EngineMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get last observed queue length
    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    /// Set last observed queue length
    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get enqueued batch count
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Increment enqueued batch count
    pub fn inc_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processed batch count
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Increment processed batch count
    pub fn inc_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failed batch count
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Increment failed batch count
    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get rejected batch count
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Increment rejected batch count
    pub fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            queue_len: self.queue_len(),
            enqueued: self.enqueued(),
            processed: self.processed(),
            failed: self.failed(),
            rejected: self.rejected(),
        }
    }
}

/// Snapshot of engine metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct EngineMetricsSnapshot {
    pub queue_len: usize,
    pub enqueued: u64,
    pub processed: u64,
    pub failed: u64,
    pub rejected: u64,
}
