//! Null sink
//!
//! Drains and drops. Useful for measuring pipeline overhead and as a
//! placeholder in wiring tests.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use scribe_message::{LogMessage, PooledMessage};
use scribe_pipeline::{Result, Stage, SyncDecision};

/// Terminal stage that discards everything it drains
pub struct NullSink {
    name: String,
    drained: AtomicU64,
}

impl NullSink {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            drained: AtomicU64::new(0),
        }
    }

    /// Messages drained and dropped so far
    pub fn drained(&self) -> u64 {
        self.drained.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Stage for NullSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_async(&self) -> bool {
        true
    }

    fn process_sync(&self, _msg: &LogMessage) -> Result<SyncDecision> {
        Ok(SyncDecision::ENQUEUE)
    }

    async fn process_async(
        &self,
        batch: &[PooledMessage],
        _cancel: &CancellationToken,
    ) -> Result<()> {
        self.drained.fetch_add(batch.len() as u64, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use scribe_message::MessagePool;

    #[tokio::test]
    async fn test_counts_and_drops() {
        let pool = Arc::new(MessagePool::new(4));
        let sink = NullSink::new("null");
        let cancel = CancellationToken::new();

        let batch: Vec<_> = (0..3).map(|_| pool.acquire(|m| m.text = "x".into())).collect();
        sink.process_async(&batch, &cancel).await.unwrap();
        drop(batch);

        assert_eq!(sink.drained(), 3);
        assert_eq!(pool.available(), 4);
    }
}
