//! Log writers
//!
//! A [`LogWriter`] is the application-facing handle: named, tagged, and
//! gated by a cached activation mask so an inactive `write` costs one
//! atomic load and one bit test.

use std::sync::Arc;

use parking_lot::Mutex;

use scribe_levels::{LevelId, LevelMask};

use crate::engine::EngineCore;

/// Cached activation state, rebuilt when configuration or the level
/// registry changes
#[derive(Clone, Copy)]
struct CachedMask {
    mask: LevelMask,
    config_generation: u64,
    registry_generation: u64,
}

/// Named producer handle
///
/// Cheap to clone and safe to share; every `write` call re-validates the
/// cached mask against the engine's configuration generation, so a
/// configuration swap takes effect on the next call.
#[derive(Clone)]
pub struct LogWriter {
    core: Arc<EngineCore>,
    name: Arc<str>,
    tags: Arc<[String]>,
    cache: Arc<Mutex<CachedMask>>,
}

impl LogWriter {
    pub(crate) fn new(core: Arc<EngineCore>, name: &str, tags: &[&str]) -> Self {
        let tags: Arc<[String]> = tags.iter().map(|t| t.to_string()).collect();
        let writer = Self {
            core,
            name: Arc::from(name),
            tags,
            cache: Arc::new(Mutex::new(CachedMask {
                mask: LevelMask::NONE,
                config_generation: u64::MAX,
                registry_generation: u64::MAX,
            })),
        };
        writer.refresh_mask();
        writer
    }

    /// Writer name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Writer tags
    #[inline]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether `level` currently passes this writer's mask
    ///
    /// Use to skip expensive message construction entirely.
    #[inline]
    pub fn is_active(&self, level: LevelId) -> bool {
        self.current_mask().is_active(level)
    }

    /// The writer's current activation mask
    pub fn mask(&self) -> LevelMask {
        self.current_mask()
    }

    /// Emit a message at `level`
    ///
    /// Returns immediately when the level is inactive. Never fails: pipeline
    /// problems are reported through the diagnostic log, not to the caller.
    pub fn write(&self, level: LevelId, text: impl Into<String>) {
        self.write_tagged(level, &[], text);
    }

    /// Emit a message carrying extra per-call tags
    pub fn write_tagged(&self, level: LevelId, extra_tags: &[&str], text: impl Into<String>) {
        if !self.current_mask().is_active(level) {
            return;
        }

        let text = text.into();
        self.core.dispatch(&self.name, &self.tags, extra_tags, level, text);
    }

    fn current_mask(&self) -> LevelMask {
        let config_generation = self.core.config_generation();
        let registry_generation = self.core.registry().generation();
        {
            let cache = self.cache.lock();
            if cache.config_generation == config_generation
                && cache.registry_generation == registry_generation
            {
                return cache.mask;
            }
        }
        self.refresh_with(config_generation, registry_generation)
    }

    fn refresh_mask(&self) -> LevelMask {
        self.refresh_with(
            self.core.config_generation(),
            self.core.registry().generation(),
        )
    }

    fn refresh_with(&self, config_generation: u64, registry_generation: u64) -> LevelMask {
        let mask = self.core.mask_for(&self.name, &self.tags);
        *self.cache.lock() = CachedMask {
            mask,
            config_generation,
            registry_generation,
        };
        tracing::debug!(writer = %self.name, mask = %mask, "writer mask refreshed");
        mask
    }
}

impl std::fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWriter")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("mask", &self.cache.lock().mask)
            .finish()
    }
}
