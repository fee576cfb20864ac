//! Scribe - Levels
//!
//! The level registry, pattern matching and the level-activation engine.
//!
//! # Architecture
//!
//! ```text
//! [WriterEntrySet]            [LevelRegistry]
//!   ordered rules   ──┐         names → dense ids (append-only)
//!                     ├──→ mask_for(writer, tags) ──→ [LevelMask]
//!   default rule    ──┘                                 one bit per level id
//! ```
//!
//! # Key Design
//!
//! - **Dense ids**: levels get small contiguous ids, severity-ordered
//!   (lower id = more severe), so activation is a single bit test
//! - **Append-only registry**: ids are stable for the process lifetime;
//!   aspect levels are assigned the next free id on first registration
//! - **Compiled patterns**: wildcard and regex patterns are compiled once
//!   when a rule set is built - matching allocates nothing
//! - **Derived masks**: a mask is recomputed only when a writer is first
//!   seen or a configuration generation changes; the write path only tests
//!   a bit
//!
//! # Example
//!
//! ```
//! use scribe_levels::{LevelRegistry, Pattern, WriterEntry, WriterEntrySet};
//!
//! let registry = LevelRegistry::new();
//! let mut set = WriterEntrySet::new();
//! set.push(
//!     WriterEntry::new("Notice")
//!         .name_pattern(Pattern::wildcard("App*").unwrap())
//!         .include("Trace"),
//! )
//! .unwrap();
//!
//! let mask = set.mask_for("AppServer", &[], &registry);
//! assert!(mask.is_active(scribe_levels::predefined::ERROR));
//! ```

mod entry;
mod error;
mod level;
mod mask;
mod pattern;
mod registry;

pub use entry::{WriterEntry, WriterEntrySet};
pub use error::{LevelError, Result};
pub use level::{predefined, LevelId, LogLevel, LEVEL_ALL, LEVEL_NONE};
pub use mask::LevelMask;
pub use pattern::{Pattern, PatternKind};
pub use registry::{LevelRegistry, MAX_LEVELS};
