//! Scribe - Pipeline
//!
//! The message processing pipeline: a tree of stages that synchronously
//! filter/forward log messages and optionally divert them into their own
//! async worker for background work.
//!
//! # Architecture
//!
//! ```text
//! [LogWriter]          [Stage Graph]                    [Async Engines]
//!   mask test ──→ root.process ──→ next stages ──┐
//!   (O(1) gate)     sync step       sync step     ├──→ bounded queue ──→ worker task
//!                   on producer     on producer   │      (per stage)      process_async
//!                   thread          thread        └──→ bounded queue ──→ worker task
//! ```
//!
//! # Key Design
//!
//! - **Two-outcome sync step**: `process_sync` independently decides whether
//!   to forward downstream and whether to enqueue for this stage's own
//!   background work
//! - **One worker per async stage**: no shared pool on the hot path; the
//!   worker bulk-drains its bounded queue and hands the batch to
//!   `process_async` with a cancellation token
//! - **Backpressure**: a full queue either blocks the producer with a short
//!   retry sleep (default) or discards the message, releasing its reference
//! - **Atomic lifecycle**: `initialize()` cascades depth-first and rolls the
//!   whole subtree back on any failure; `shutdown()` is total and cascades
//!   children first
//! - **Best effort, never fatal**: runtime stage errors end at the stage
//!   boundary in the diagnostic log; a log call never throws into the caller
//!
//! # Example
//!
//! ```ignore
//! use scribe_pipeline::{Pipeline, StageNode};
//!
//! let pipeline = Pipeline::builder()
//!     .application("demo")
//!     .build();
//! pipeline.add_root(StageNode::new(my_sink))?;
//! pipeline.initialize().await?;
//!
//! let writer = pipeline.writer("Storage", &["io"]);
//! writer.write(scribe_levels::predefined::NOTICE, "volume mounted");
//!
//! pipeline.shutdown().await;
//! ```

mod async_engine;
mod engine;
mod error;
mod metrics;
mod node;
mod stage;
mod writer;

pub use async_engine::{AsyncOptions, EngineSnapshot};
pub use engine::{Pipeline, PipelineBuilder};
pub use error::{PipelineError, Result};
pub use metrics::{StageMetrics, StageSnapshot};
pub use node::StageNode;
pub use stage::{Stage, StageEvent, SyncDecision};
pub use writer::LogWriter;

// Re-export the types that appear in the `Stage` contract
pub use scribe_levels::{predefined, LevelId, LevelMask, LogLevel, WriterEntry, WriterEntrySet};
pub use scribe_message::{LogMessage, PooledMessage};
pub use tokio_util::sync::CancellationToken;
