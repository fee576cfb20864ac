//! Stage graph nodes
//!
//! A [`StageNode`] owns one [`Stage`] and its place in the tree: the list of
//! next stages, the async engine (for async stages), lifecycle state and
//! metrics. Nodes are cheap handles; cloning shares the underlying node.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use scribe_message::PooledMessage;

use crate::async_engine::{AsyncEngine, AsyncOptions, EngineSnapshot};
use crate::error::{PipelineError, Result};
use crate::metrics::{StageMetrics, StageSnapshot};
use crate::stage::{Stage, StageEvent, SyncDecision};

/// A node in the stage graph
///
/// The graph is a tree: a node must not be wired under two parents. The
/// initialization cascade treats an already-initialized node as a wiring
/// mistake.
#[derive(Clone)]
pub struct StageNode {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    logic: Arc<dyn Stage>,
    metrics: Arc<StageMetrics>,
    state: Mutex<NodeState>,
}

struct NodeState {
    initialized: bool,
    /// Set while `on_initialize` is in flight, so a racing initialize fails
    /// fast instead of running the hook twice
    initializing: bool,
    next: Vec<StageNode>,
    options: AsyncOptions,
    engine: Option<Arc<AsyncEngine>>,
}

impl StageNode {
    /// Wrap a stage in a node
    pub fn new(stage: impl Stage) -> Self {
        Self::from_arc(Arc::new(stage))
    }

    /// Wrap an already-shared stage in a node
    pub fn from_arc(stage: Arc<dyn Stage>) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                logic: stage,
                metrics: Arc::new(StageMetrics::new()),
                state: Mutex::new(NodeState {
                    initialized: false,
                    initializing: false,
                    next: Vec::new(),
                    options: AsyncOptions::default(),
                    engine: None,
                }),
            }),
        }
    }

    /// Stage name
    #[inline]
    pub fn name(&self) -> &str {
        self.inner.logic.name()
    }

    /// Whether the node has been initialized
    pub fn is_initialized(&self) -> bool {
        self.inner.state.lock().initialized
    }

    /// Snapshot of this node's counters
    pub fn metrics(&self) -> StageSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Queue occupancy of the async engine, if one is running
    pub fn engine_snapshot(&self) -> Option<EngineSnapshot> {
        self.inner
            .state
            .lock()
            .engine
            .as_ref()
            .map(|engine| engine.snapshot())
    }

    /// Wire `child` as a next stage
    ///
    /// On an initialized parent the child subtree is initialized first and
    /// only then attached; if that fails the child is shut down again and
    /// the next-stage list is left untouched. A sibling with the same name
    /// is rejected either way.
    pub async fn add_next_stage(&self, child: StageNode) -> Result<()> {
        let parent_initialized = {
            let state = self.inner.state.lock();
            if state.next.iter().any(|n| n.name() == child.name()) {
                return Err(PipelineError::DuplicateStage {
                    name: child.name().to_string(),
                });
            }
            state.initialized
        };

        if parent_initialized {
            child.initialize().await?;
        }

        let duplicate = {
            let mut state = self.inner.state.lock();
            if state.next.iter().any(|n| n.name() == child.name()) {
                true
            } else {
                state.next.push(child.clone());
                false
            }
        };
        if duplicate {
            if parent_initialized {
                child.shutdown().await;
            }
            return Err(PipelineError::DuplicateStage {
                name: child.name().to_string(),
            });
        }
        Ok(())
    }

    /// Set the async queue capacity
    pub fn set_queue_size(&self, queue_size: usize) -> Result<()> {
        self.update_options(|opts| opts.queue_size = queue_size)
    }

    /// Set the full-queue policy
    pub fn set_discard_if_full(&self, discard: bool) -> Result<()> {
        self.update_options(|opts| opts.discard_if_full = discard)
    }

    /// Set the drain timeout used at shutdown
    pub fn set_shutdown_timeout(&self, timeout: Duration) -> Result<()> {
        self.update_options(|opts| opts.shutdown_timeout = timeout)
    }

    /// Replace all async tunables at once
    pub fn set_options(&self, options: AsyncOptions) -> Result<()> {
        self.update_options(|opts| *opts = options)
    }

    /// Current async tunables
    pub fn options(&self) -> AsyncOptions {
        self.inner.state.lock().options
    }

    fn update_options(&self, apply: impl FnOnce(&mut AsyncOptions)) -> Result<()> {
        let mut state = self.inner.state.lock();
        if state.initialized || state.initializing {
            return Err(PipelineError::invalid_state(
                self.name(),
                "async options are immutable once initialization begins",
            ));
        }
        apply(&mut state.options);
        Ok(())
    }

    /// Initialize this node and its whole subtree
    ///
    /// Cascades depth-first in wiring order. On any failure every node that
    /// was initialized by this call is shut down again, in reverse order,
    /// and the original error is returned unchanged.
    pub async fn initialize(&self) -> Result<()> {
        let order = self.all_stages();
        let mut done: Vec<StageNode> = Vec::with_capacity(order.len());

        for node in order {
            if let Err(err) = node.initialize_single().await {
                for rolled in done.iter().rev() {
                    rolled.shutdown_single().await;
                }
                return Err(err);
            }
            done.push(node);
        }
        Ok(())
    }

    /// Shut down this node and its whole subtree
    ///
    /// Total: every node is torn down even if a stage misbehaves. Deeper
    /// nodes go first so parents outlive the stages they feed.
    pub async fn shutdown(&self) {
        let order = self.all_stages();
        for node in order.iter().rev() {
            node.shutdown_single().await;
        }
    }

    /// Run one message through this node and, on forward, its next stages
    ///
    /// Runs on the producer thread under the node lock, so messages from a
    /// single producer traverse the subtree in write order. A stage error
    /// is logged, counted, and treated as forward-without-enqueue so a
    /// broken stage never silently swallows traffic. Only a dead node
    /// fails.
    pub fn process(&self, msg: &PooledMessage) -> Result<()> {
        let state = self.inner.state.lock();
        if !state.initialized {
            return Err(PipelineError::NotInitialized {
                stage: self.name().to_string(),
            });
        }

        self.inner
            .metrics
            .processed
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let decision = match self.inner.logic.process_sync(msg) {
            Ok(decision) => decision,
            Err(err) => {
                self.inner
                    .metrics
                    .errors
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                tracing::error!(stage = self.name(), error = %err, "sync processing failed");
                SyncDecision::FORWARD
            }
        };

        if decision.enqueue {
            if let Some(engine) = state.engine.as_ref() {
                if engine.enqueue(msg.clone()) {
                    self.inner
                        .metrics
                        .enqueued
                        .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                } else {
                    self.inner
                        .metrics
                        .discarded
                        .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                }
            }
        }

        if decision.forward {
            self.inner
                .metrics
                .forwarded
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            for child in &state.next {
                // A dead child is a wiring problem, not the producer's
                if let Err(err) = child.process(msg) {
                    tracing::warn!(stage = child.name(), error = %err, "next stage rejected message");
                }
            }
        }
        Ok(())
    }

    /// Deliver a runtime event to this node and its subtree
    ///
    /// Async stages receive it on their worker, ordered behind the messages
    /// already queued. Sync stages receive it on a one-shot task, or a
    /// one-shot thread when the notifying thread has no runtime, so the
    /// notifying thread never runs stage callbacks itself. The node lock is
    /// released before any callback can run.
    pub fn post_event(&self, event: &StageEvent) {
        let (engine, next) = {
            let state = self.inner.state.lock();
            (state.engine.clone(), state.next.clone())
        };
        match engine {
            Some(engine) => engine.post_event(event.clone()),
            None => {
                let logic = Arc::clone(&self.inner.logic);
                let event = event.clone();
                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        handle.spawn(async move { logic.on_event(&event) });
                    }
                    Err(_) => {
                        std::thread::spawn(move || logic.on_event(&event));
                    }
                }
            }
        }
        for child in &next {
            child.post_event(event);
        }
    }

    /// Every node of the subtree in depth-first wiring order, self first
    pub fn all_stages(&self) -> Vec<StageNode> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            let next = node.inner.state.lock().next.clone();
            out.push(node);
            // Reversed so wiring order comes off the stack first
            for child in next.into_iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Initialize just this node
    ///
    /// Two racing calls resolve to one winner: the loser gets
    /// `AlreadyInitialized` while the winner's `on_initialize` is still in
    /// flight, never a second hook run or a second engine.
    async fn initialize_single(&self) -> Result<()> {
        {
            let mut state = self.inner.state.lock();
            if state.initialized || state.initializing {
                return Err(PipelineError::AlreadyInitialized {
                    stage: self.name().to_string(),
                });
            }
            state.initializing = true;
        }

        if let Err(err) = self.inner.logic.on_initialize().await {
            self.inner.state.lock().initializing = false;
            return Err(match err {
                err @ PipelineError::Stage { .. } => err,
                other => PipelineError::stage(self.name(), other.to_string()),
            });
        }

        let mut state = self.inner.state.lock();
        if self.inner.logic.is_async() {
            state.engine = Some(Arc::new(AsyncEngine::start(
                Arc::clone(&self.inner.logic),
                Arc::clone(&self.inner.metrics),
                state.options,
            )));
        }
        state.initializing = false;
        state.initialized = true;
        tracing::debug!(stage = self.name(), "stage initialized");
        Ok(())
    }

    /// Shut down just this node
    async fn shutdown_single(&self) {
        let engine = {
            let mut state = self.inner.state.lock();
            if !state.initialized {
                return;
            }
            state.initialized = false;
            state.engine.take()
        };

        if let Some(engine) = engine {
            engine.shutdown(self.name()).await;
        }
        self.inner.logic.on_shutdown().await;
        tracing::debug!(stage = self.name(), "stage shut down");
    }
}

impl std::fmt::Debug for StageNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("StageNode")
            .field("name", &self.name())
            .field("initialized", &state.initialized)
            .field("next", &state.next.iter().map(|n| n.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
