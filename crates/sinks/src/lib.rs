//! Scribe - Sinks
//!
//! Boundary stages that move messages out of the pipeline: console, memory
//! and null sinks, plus the line formatting they share. All sinks are async
//! stages; the synchronous step only enqueues, and the actual output work
//! happens on each sink's worker.

mod console;
mod format;
mod memory;
mod null;

pub use console::ConsoleSink;
pub use format::{LineFormatter, TextFormatter};
pub use memory::MemorySink;
pub use null::NullSink;
