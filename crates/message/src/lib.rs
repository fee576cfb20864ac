//! Scribe - Message
//!
//! The pooled log message that flows through the pipeline.
//!
//! # Key Design
//!
//! - **Pooled**: message objects are recycled through a lock-free queue so
//!   steady-state logging performs no per-message heap allocation
//! - **Shared handles**: `PooledMessage` is a cheap clonable handle; cloning
//!   takes a reference, dropping releases it, and the final drop returns the
//!   object to the pool
//! - **Immutable after publish**: a message is populated while exclusively
//!   owned and is read-only once it becomes shareable
//!
//! # Example
//!
//! ```
//! use scribe_message::{LogMessage, MessagePool};
//! use scribe_levels::predefined;
//! use std::sync::Arc;
//!
//! let pool = Arc::new(MessagePool::new(16));
//! let msg = pool.acquire(|m| {
//!     m.writer = "Example".into();
//!     m.level = predefined::NOTICE;
//!     m.text = "hello".into();
//! });
//!
//! let for_sink = msg.clone(); // add_ref
//! assert_eq!(msg.ref_count(), 2);
//! drop(for_sink);             // release
//! drop(msg);                  // final release - back to the pool
//! assert_eq!(pool.available(), 16);
//! ```

mod message;
mod pool;

pub use message::LogMessage;
pub use pool::{MessagePool, PoolMetrics, PoolSnapshot, PooledMessage};
