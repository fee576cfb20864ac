//! Async processing engine
//!
//! One engine per async stage: a bounded lock-free queue fed from producer
//! threads and a single worker task that bulk-drains it. Control events ride
//! a separate unbounded queue drained after each message batch, so an async
//! stage never observes an event before a message enqueued ahead of it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::queue::{ArrayQueue, SegQueue};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use scribe_message::PooledMessage;

use crate::metrics::StageMetrics;
use crate::stage::{Stage, StageEvent};

/// How long a blocked producer sleeps before retrying a full queue
const FULL_RETRY_SLEEP: Duration = Duration::from_millis(1);

/// Grace period after cancellation before the worker is aborted
const CANCEL_GRACE: Duration = Duration::from_secs(1);

/// Tunables for one stage's async engine
///
/// Fixed once the engine starts; changing them on a running node is a state
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsyncOptions {
    /// Bounded queue capacity in messages
    pub queue_size: usize,

    /// Full-queue policy: discard the message instead of blocking the
    /// producer
    pub discard_if_full: bool,

    /// How long shutdown waits for the worker to drain before cancelling
    pub shutdown_timeout: Duration,
}

impl Default for AsyncOptions {
    fn default() -> Self {
        Self {
            queue_size: 500,
            discard_if_full: false,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

/// State shared between producers and the worker task
struct Shared {
    /// Message hand-off queue
    queue: ArrayQueue<PooledMessage>,

    /// Control events, drained before messages on each wakeup
    events: SegQueue<StageEvent>,

    /// Wakes the worker when either queue gains an item
    notify: Notify,

    /// Set once by shutdown; the worker exits after draining
    stopping: AtomicBool,

    /// Cancelled when shutdown gives up waiting for the drain
    cancel: CancellationToken,
}

/// Point-in-time view of an engine's queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSnapshot {
    /// Messages currently queued
    pub queue_len: usize,

    /// Queue capacity
    pub queue_capacity: usize,
}

/// Per-stage async worker
///
/// Created during initialization for stages reporting `is_async()`, torn
/// down during shutdown.
pub(crate) struct AsyncEngine {
    shared: Arc<Shared>,
    options: AsyncOptions,

    /// Taken by `shutdown`
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncEngine {
    /// Start a worker task for `stage`
    pub(crate) fn start(
        stage: Arc<dyn Stage>,
        metrics: Arc<StageMetrics>,
        options: AsyncOptions,
    ) -> Self {
        let shared = Arc::new(Shared {
            queue: ArrayQueue::new(options.queue_size.max(1)),
            events: SegQueue::new(),
            notify: Notify::new(),
            stopping: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        });

        let handle = tokio::spawn(worker_loop(Arc::clone(&shared), stage, metrics));

        Self {
            shared,
            options,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Hand a message to the worker
    ///
    /// Returns `false` when the message was discarded under the
    /// discard-if-full policy. With the blocking policy this spins with a
    /// short sleep until a slot frees up, applying backpressure to the
    /// producer thread.
    pub(crate) fn enqueue(&self, msg: PooledMessage) -> bool {
        let mut msg = msg;
        loop {
            match self.shared.queue.push(msg) {
                Ok(()) => {
                    self.shared.notify.notify_one();
                    return true;
                }
                Err(rejected) => {
                    if self.options.discard_if_full
                        || self.shared.stopping.load(Ordering::Acquire)
                    {
                        // Dropping the handle releases its reference
                        drop(rejected);
                        return false;
                    }
                    msg = rejected;
                    std::thread::sleep(FULL_RETRY_SLEEP);
                }
            }
        }
    }

    /// Deliver a control event, ordered behind already-queued messages
    pub(crate) fn post_event(&self, event: StageEvent) {
        self.shared.events.push(event);
        self.shared.notify.notify_one();
    }

    /// Current queue occupancy
    pub(crate) fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            queue_len: self.shared.queue.len(),
            queue_capacity: self.shared.queue.capacity(),
        }
    }

    /// Drain and stop the worker
    ///
    /// Waits up to `shutdown_timeout` for a clean drain, then cancels the
    /// token and gives the stage a grace period before aborting the task.
    pub(crate) async fn shutdown(&self, stage_name: &str) {
        self.shared.stopping.store(true, Ordering::Release);
        self.shared.notify.notify_one();

        let Some(mut handle) = self.handle.lock().take() else {
            return;
        };

        if tokio::time::timeout(self.options.shutdown_timeout, &mut handle)
            .await
            .is_ok()
        {
            return;
        }

        tracing::warn!(
            stage = stage_name,
            timeout_ms = self.options.shutdown_timeout.as_millis() as u64,
            "async engine did not drain in time, cancelling"
        );
        self.shared.cancel.cancel();

        if tokio::time::timeout(CANCEL_GRACE, &mut handle).await.is_err() {
            tracing::error!(stage = stage_name, "async worker ignored cancellation, aborting");
            handle.abort();
        }
    }
}

/// Worker task body
///
/// Drains events, then bulk-drains messages into a batch for
/// `process_async`. Exits when stopping is set and both queues are empty.
async fn worker_loop(shared: Arc<Shared>, stage: Arc<dyn Stage>, metrics: Arc<StageMetrics>) {
    let mut batch: Vec<PooledMessage> = Vec::new();

    loop {
        while let Some(msg) = shared.queue.pop() {
            batch.push(msg);
        }

        if !batch.is_empty() {
            metrics.batches.fetch_add(1, Ordering::Relaxed);
            metrics.drained.fetch_add(batch.len() as u64, Ordering::Relaxed);
            if let Err(err) = stage.process_async(&batch, &shared.cancel).await {
                metrics.errors.fetch_add(1, Ordering::Relaxed);
                tracing::error!(stage = stage.name(), error = %err, "async processing failed");
            }
            // References release here whether processing succeeded or not
            batch.clear();
        }

        // Events after the drained batch: a stage never sees an event
        // before a message that was enqueued ahead of it
        while let Some(event) = shared.events.pop() {
            stage.on_event(&event);
        }

        if shared.stopping.load(Ordering::Acquire)
            && shared.queue.is_empty()
            && shared.events.is_empty()
        {
            break;
        }

        if shared.queue.is_empty() && shared.events.is_empty() {
            tokio::select! {
                _ = shared.notify.notified() => {}
                _ = shared.cancel.cancelled() => break,
            }
        }
    }
}

#[cfg(test)]
#[path = "async_engine_test.rs"]
mod async_engine_test;
