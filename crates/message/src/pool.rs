//! Lock-free message pool
//!
//! Pre-allocates message objects and recycles them through a lock-free queue
//! so the steady-state write path allocates nothing. A message is handed out
//! exclusively for population, then published as a shared `PooledMessage`
//! handle; the handle's final drop returns the object for the next
//! acquisition (fields are overwritten on next use, not cleared).

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::queue::ArrayQueue;

use crate::message::LogMessage;

/// Lock-free pool of reusable log messages
///
/// When the pool is exhausted, messages are allocated on demand (recorded as
/// a miss) and can still be recycled afterwards.
pub struct MessagePool {
    /// Recycled message objects
    slots: ArrayQueue<LogMessage>,

    /// Metrics
    metrics: PoolMetrics,
}

/// Metrics for pool monitoring
#[derive(Debug, Default)]
pub struct PoolMetrics {
    /// Acquisitions served from the pool
    pub hits: AtomicU64,

    /// Acquisitions that had to allocate
    pub misses: AtomicU64,

    /// Messages returned to the pool
    pub returns: AtomicU64,

    /// Messages dropped because the pool was full
    pub drops: AtomicU64,
}

impl PoolMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            returns: AtomicU64::new(0),
            drops: AtomicU64::new(0),
        }
    }

    /// Get snapshot of metrics
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of pool metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub returns: u64,
    pub drops: u64,
}

impl MessagePool {
    /// Create a pool with `capacity` pre-allocated messages
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let slots = ArrayQueue::new(capacity.max(1));
        for _ in 0..capacity {
            // Filling an empty queue cannot fail
            let _ = slots.push(LogMessage::default());
        }
        Self {
            slots,
            metrics: PoolMetrics::new(),
        }
    }

    /// Acquire a message, populate it, and publish it as a shared handle
    ///
    /// The closure runs while the message is exclusively owned; the returned
    /// handle is read-only. Previous field contents are overwritten by the
    /// populating call, not cleared by the pool.
    pub fn acquire(self: &Arc<Self>, populate: impl FnOnce(&mut LogMessage)) -> PooledMessage {
        let mut msg = match self.slots.pop() {
            Some(msg) => {
                self.metrics.hits.fetch_add(1, Ordering::Relaxed);
                msg
            }
            None => {
                self.metrics.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("pool exhausted, allocating a fresh message");
                LogMessage::default()
            }
        };

        populate(&mut msg);

        PooledMessage {
            msg: Some(Arc::new(msg)),
            pool: Arc::clone(self),
        }
    }

    /// Return a message object to the pool
    fn recycle(&self, msg: LogMessage) {
        match self.slots.push(msg) {
            Ok(()) => {
                self.metrics.returns.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                // Pool full: the object came from a miss allocation
                self.metrics.drops.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("pool full, dropping a surplus message");
            }
        }
    }

    /// Number of messages currently available
    #[inline]
    pub fn available(&self) -> usize {
        self.slots.len()
    }

    /// Pool capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Get reference to metrics
    #[inline]
    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }
}

/// Shared read-only handle to a pooled message
///
/// Clone takes a reference, drop releases it. The drop that brings the count
/// to zero returns the message object to its pool. Because only `Deref` is
/// exposed, a shared message can never be mutated.
pub struct PooledMessage {
    /// Always `Some` until drop
    msg: Option<Arc<LogMessage>>,
    pool: Arc<MessagePool>,
}

impl PooledMessage {
    /// Current reference count (observable for tests and diagnostics)
    pub fn ref_count(&self) -> usize {
        self.msg.as_ref().map_or(0, Arc::strong_count)
    }
}

impl Deref for PooledMessage {
    type Target = LogMessage;

    #[inline]
    fn deref(&self) -> &LogMessage {
        // Invariant: msg is Some until drop
        self.msg.as_ref().expect("message taken")
    }
}

impl Clone for PooledMessage {
    fn clone(&self) -> Self {
        Self {
            msg: self.msg.clone(),
            pool: Arc::clone(&self.pool),
        }
    }
}

impl Drop for PooledMessage {
    fn drop(&mut self) {
        if let Some(arc) = self.msg.take() {
            // The handle that observes count == 1 recycles the object;
            // concurrent droppers race safely inside try_unwrap.
            if let Ok(msg) = Arc::try_unwrap(arc) {
                self.pool.recycle(msg);
            }
        }
    }
}

impl std::fmt::Debug for PooledMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledMessage")
            .field("writer", &self.writer)
            .field("level", &self.level)
            .field("refs", &self.ref_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;
