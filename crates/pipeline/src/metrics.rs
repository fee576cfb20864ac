//! Per-stage metrics
//!
//! Lock-free counters updated on the hot path, read via snapshots.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one stage node
#[derive(Debug, Default)]
pub struct StageMetrics {
    /// Messages that entered the sync step
    pub processed: AtomicU64,

    /// Messages forwarded to next stages
    pub forwarded: AtomicU64,

    /// Messages enqueued for async processing
    pub enqueued: AtomicU64,

    /// Messages discarded because the queue was full
    pub discarded: AtomicU64,

    /// Batches handed to the async step
    pub batches: AtomicU64,

    /// Messages drained into async batches
    pub drained: AtomicU64,

    /// Sync or async step errors (logged, not propagated)
    pub errors: AtomicU64,
}

impl StageMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            processed: AtomicU64::new(0),
            forwarded: AtomicU64::new(0),
            enqueued: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            drained: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    /// Get snapshot of metrics
    pub fn snapshot(&self) -> StageSnapshot {
        StageSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            drained: self.drained.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of stage metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSnapshot {
    pub processed: u64,
    pub forwarded: u64,
    pub enqueued: u64,
    pub discarded: u64,
    pub batches: u64,
    pub drained: u64,
    pub errors: u64,
}
