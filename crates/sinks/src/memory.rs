//! Memory sink
//!
//! Captures messages for tests, demos and diagnostics. Bounded: once full,
//! the oldest captured message is evicted.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use scribe_message::{LogMessage, PooledMessage};
use scribe_pipeline::{Result, Stage, SyncDecision};

const DEFAULT_CAPACITY: usize = 1024;

/// Terminal stage keeping captured messages in memory
pub struct MemorySink {
    name: String,
    capacity: usize,
    captured: Mutex<VecDeque<LogMessage>>,
}

impl MemorySink {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::with_capacity(name, DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(name: &str, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            capacity: capacity.max(1),
            captured: Mutex::new(VecDeque::new()),
        }
    }

    /// Copies of everything captured so far, oldest first
    pub fn messages(&self) -> Vec<LogMessage> {
        self.captured.lock().iter().cloned().collect()
    }

    /// Just the message texts, oldest first
    pub fn texts(&self) -> Vec<String> {
        self.captured.lock().iter().map(|m| m.text.clone()).collect()
    }

    /// Number of captured messages
    pub fn len(&self) -> usize {
        self.captured.lock().len()
    }

    /// Whether nothing was captured
    pub fn is_empty(&self) -> bool {
        self.captured.lock().is_empty()
    }

    /// Drop everything captured
    pub fn clear(&self) {
        self.captured.lock().clear();
    }
}

#[async_trait]
impl Stage for MemorySink {
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
        let mut captured = self.captured.lock();
        for msg in batch {
            if captured.len() == self.capacity {
                captured.pop_front();
            }
            captured.push_back((**msg).clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use scribe_message::MessagePool;

    #[tokio::test]
    async fn test_capture_and_accessors() {
        let pool = Arc::new(MessagePool::new(4));
        let sink = MemorySink::new("mem");
        let cancel = CancellationToken::new();

        let batch = vec![
            pool.acquire(|m| m.text = "one".into()),
            pool.acquire(|m| m.text = "two".into()),
        ];
        sink.process_async(&batch, &cancel).await.unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.texts(), vec!["one", "two"]);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let pool = Arc::new(MessagePool::new(8));
        let sink = MemorySink::with_capacity("mem", 2);
        let cancel = CancellationToken::new();

        let batch: Vec<_> = (0..4)
            .map(|i| pool.acquire(|m| m.text = format!("m{i}")))
            .collect();
        sink.process_async(&batch, &cancel).await.unwrap();

        assert_eq!(sink.texts(), vec!["m2", "m3"]);
    }
}
