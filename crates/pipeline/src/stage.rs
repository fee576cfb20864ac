//! Stage contract
//!
//! A stage is the unit of pipeline logic: it sees every message that reaches
//! its node, decides synchronously what happens next, and optionally does
//! background work on an async worker owned by the node.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use scribe_levels::LogLevel;
use scribe_message::{LogMessage, PooledMessage};

use crate::error::Result;

/// Outcome of the synchronous step
///
/// The two decisions are independent: a stage can forward without enqueuing
/// (pure filter), enqueue without forwarding (terminal sink), do both
/// (tee), or neither (drop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncDecision {
    /// Pass the message on to this node's next stages
    pub forward: bool,

    /// Queue the message for this stage's own async worker
    pub enqueue: bool,
}

impl SyncDecision {
    /// Forward downstream, no async work
    pub const FORWARD: Self = Self {
        forward: true,
        enqueue: false,
    };

    /// Queue for async work and also forward downstream
    pub const FORWARD_AND_ENQUEUE: Self = Self {
        forward: true,
        enqueue: true,
    };

    /// Queue for async work, do not forward
    pub const ENQUEUE: Self = Self {
        forward: false,
        enqueue: true,
    };

    /// Drop the message here
    pub const DROP: Self = Self {
        forward: false,
        enqueue: false,
    };
}

/// Runtime notifications delivered to stages
///
/// Events reach sync stages on one-shot tasks, never on the notifying
/// thread, and async stages through the same queue path as messages, so an
/// async stage observes an event only after every message enqueued before
/// it.
#[derive(Debug, Clone)]
pub enum StageEvent {
    /// The live settings store was swapped
    SettingsChanged,

    /// A custom level was registered after initialization
    LevelAdded(LogLevel),

    /// A writer with the given name was created
    WriterAdded(String),
}

/// Pipeline stage logic
///
/// Implementations hold their own state; the owning [`StageNode`] provides
/// topology, lifecycle and the async engine. `process_sync` runs on the
/// producer thread under the node lock and must stay cheap; anything slow
/// belongs in `process_async`.
///
/// [`StageNode`]: crate::StageNode
#[async_trait]
pub trait Stage: Send + Sync + 'static {
    /// Stage name, unique among siblings
    fn name(&self) -> &str;

    /// Whether this stage wants an async worker
    ///
    /// Queried once at initialization. Stages returning `false` never see
    /// `process_async`.
    fn is_async(&self) -> bool {
        false
    }

    /// One-time setup, called during the initialization cascade
    ///
    /// An error here aborts the cascade and rolls back the subtree.
    async fn on_initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Teardown, called during shutdown after the async worker (if any)
    /// has drained and stopped
    async fn on_shutdown(&self) {}

    /// Synchronous step, runs on the producer thread
    ///
    /// Errors are logged at the node boundary and treated as
    /// [`SyncDecision::FORWARD`], so a broken filter never silently drops
    /// messages; they never reach the caller of `write`.
    fn process_sync(&self, msg: &LogMessage) -> Result<SyncDecision>;

    /// Background step, runs on this stage's worker task
    ///
    /// Receives the batch drained from the queue; within one producer the
    /// batch preserves write order, across producers the order is
    /// unspecified. The token
    /// is cancelled when shutdown gives up waiting; long operations should
    /// poll it. Errors are logged and the batch is considered consumed.
    async fn process_async(
        &self,
        batch: &[PooledMessage],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let _ = (batch, cancel);
        Ok(())
    }

    /// Runtime notification
    ///
    /// Sync stages get this on a one-shot task, off the broadcasting
    /// thread; async stages get it on their worker, ordered against their
    /// queue.
    fn on_event(&self, event: &StageEvent) {
        let _ = event;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_constants() {
        assert!(SyncDecision::FORWARD.forward);
        assert!(!SyncDecision::FORWARD.enqueue);
        assert!(SyncDecision::FORWARD_AND_ENQUEUE.forward);
        assert!(SyncDecision::FORWARD_AND_ENQUEUE.enqueue);
        assert!(!SyncDecision::ENQUEUE.forward);
        assert!(SyncDecision::ENQUEUE.enqueue);
        assert!(!SyncDecision::DROP.forward);
        assert!(!SyncDecision::DROP.enqueue);
    }
}
