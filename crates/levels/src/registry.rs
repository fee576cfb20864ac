//! Process-wide level registry
//!
//! Append-only table mapping level names to dense ids. Predefined levels are
//! seeded at construction; aspect levels receive the next free id on first
//! registration. Ids never change and are never reused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::{LevelError, Result};
use crate::level::{predefined, LevelId, LogLevel, LEVEL_ALL, LEVEL_NONE};

/// Maximum number of levels (predefined + aspect), fixed by the mask width
pub const MAX_LEVELS: usize = 32;

/// Append-only registry of log levels
///
/// The lock is held only for short name/id lookups and registrations; the
/// write path never touches it (writers test a cached mask instead).
pub struct LevelRegistry {
    inner: RwLock<Inner>,

    /// Bumped on every successful registration so cached masks recompute
    generation: AtomicU64,
}

struct Inner {
    levels: Vec<LogLevel>,
    by_name: HashMap<String, LevelId>,
}

impl LevelRegistry {
    /// Create a registry seeded with the predefined severity ladder
    #[must_use]
    pub fn new() -> Self {
        let mut levels = Vec::with_capacity(MAX_LEVELS);
        let mut by_name = HashMap::with_capacity(MAX_LEVELS);

        for (i, name) in predefined::NAMES.iter().enumerate() {
            let id = LevelId::new(i as u8);
            levels.push(LogLevel::new(id, *name));
            by_name.insert((*name).to_string(), id);
        }

        Self {
            inner: RwLock::new(Inner { levels, by_name }),
            generation: AtomicU64::new(0),
        }
    }

    /// Register an aspect level, or return the existing one for a known name
    ///
    /// # Errors
    ///
    /// - `ReservedName` for the `All`/`None` sentinels
    /// - `RegistryFull` once all mask bits are taken
    pub fn register_aspect(&self, name: &str) -> Result<LogLevel> {
        if name == LEVEL_ALL || name == LEVEL_NONE {
            return Err(LevelError::ReservedName { name: name.into() });
        }

        let mut inner = self.inner.write();
        if let Some(&id) = inner.by_name.get(name) {
            // Idempotent: a name keeps its id for the process lifetime
            return Ok(inner.levels[id.as_usize()].clone());
        }

        if inner.levels.len() >= MAX_LEVELS {
            return Err(LevelError::RegistryFull {
                name: name.into(),
                capacity: MAX_LEVELS,
            });
        }

        let id = LevelId::new(inner.levels.len() as u8);
        let level = LogLevel::new(id, name);
        inner.levels.push(level.clone());
        inner.by_name.insert(name.to_string(), id);
        drop(inner);

        self.generation.fetch_add(1, Ordering::Release);
        tracing::debug!(level = %level, "registered aspect level");
        Ok(level)
    }

    /// Resolve a level name to its id
    pub fn resolve(&self, name: &str) -> Option<LevelId> {
        self.inner.read().by_name.get(name).copied()
    }

    /// Look up a level by id
    pub fn level(&self, id: LevelId) -> Option<LogLevel> {
        self.inner.read().levels.get(id.as_usize()).cloned()
    }

    /// Get the level name for an id, or `"?"` for an unknown id
    pub fn name_of(&self, id: LevelId) -> String {
        self.level(id)
            .map(|l| l.name)
            .unwrap_or_else(|| "?".to_string())
    }

    /// Snapshot of every registered level, in id order
    pub fn levels(&self) -> Vec<LogLevel> {
        self.inner.read().levels.clone()
    }

    /// Number of registered levels
    pub fn len(&self) -> usize {
        self.inner.read().levels.len()
    }

    /// A registry always carries the predefined ladder
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Current registration generation
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
