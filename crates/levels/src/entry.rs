//! Writer configuration entries and the activation engine
//!
//! A `WriterEntrySet` is the ordered list of configuration rules that decide
//! which levels a named writer emits. Selection is first-structural-match
//! wins; the entry marked default catches writers no other entry matches.
//!
//! Mask computation (per selected entry):
//!
//! 1. resolve the base level: `All` sets every bit, `None` clears every bit,
//!    anything else sets bits `0..=id` (that severity and everything more
//!    severe)
//! 2. each include sets its level's bit
//! 3. each exclude clears its level's bit - excludes always win

use crate::error::{LevelError, Result};
use crate::level::{LEVEL_ALL, LEVEL_NONE};
use crate::mask::LevelMask;
use crate::pattern::Pattern;
use crate::registry::LevelRegistry;

/// One writer configuration rule
#[derive(Debug, Clone)]
pub struct WriterEntry {
    /// Name patterns; an entry with no name patterns matches any writer name
    pub name_patterns: Vec<Pattern>,

    /// Tag patterns; when present, at least one writer tag must match
    pub tag_patterns: Vec<Pattern>,

    /// Base severity threshold (`All` / `None` / a level name)
    pub base_level: String,

    /// Level names enabled on top of the base threshold
    pub includes: Vec<String>,

    /// Level names disabled last, overriding base and includes
    pub excludes: Vec<String>,

    /// Fallback entry used when nothing else matches structurally
    pub is_default: bool,
}

impl WriterEntry {
    /// Create an entry with the given base level and no patterns
    pub fn new(base_level: impl Into<String>) -> Self {
        Self {
            name_patterns: Vec::new(),
            tag_patterns: Vec::new(),
            base_level: base_level.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
            is_default: false,
        }
    }

    /// Add a name pattern
    #[must_use]
    pub fn name_pattern(mut self, pattern: Pattern) -> Self {
        self.name_patterns.push(pattern);
        self
    }

    /// Add a tag pattern
    #[must_use]
    pub fn tag_pattern(mut self, pattern: Pattern) -> Self {
        self.tag_patterns.push(pattern);
        self
    }

    /// Enable a single level on top of the base
    #[must_use]
    pub fn include(mut self, level: impl Into<String>) -> Self {
        self.includes.push(level.into());
        self
    }

    /// Disable a single level, overriding base and includes
    #[must_use]
    pub fn exclude(mut self, level: impl Into<String>) -> Self {
        self.excludes.push(level.into());
        self
    }

    /// Mark this entry as the default fallback
    #[must_use]
    pub fn default_entry(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Structural match: name patterns, then tag patterns if present
    fn matches(&self, name: &str, tags: &[String]) -> bool {
        if !self.name_patterns.is_empty()
            && !self.name_patterns.iter().any(|p| p.matches(name))
        {
            return false;
        }
        if !self.tag_patterns.is_empty() {
            return self
                .tag_patterns
                .iter()
                .any(|p| tags.iter().any(|t| p.matches(t)));
        }
        true
    }

    /// Compute the activation mask for this entry against a registry
    pub fn mask(&self, registry: &LevelRegistry) -> LevelMask {
        let mut mask = match self.base_level.as_str() {
            LEVEL_ALL => LevelMask::ALL,
            LEVEL_NONE => LevelMask::NONE,
            name => match registry.resolve(name) {
                Some(id) => LevelMask::up_to(id),
                None => {
                    tracing::warn!(level = name, "unknown base level, writer silenced");
                    LevelMask::NONE
                }
            },
        };

        for name in &self.includes {
            match registry.resolve(name) {
                Some(id) => mask.set(id),
                None => tracing::warn!(level = %name, "unknown include level, skipped"),
            }
        }

        // Applied last: excludes win over base and includes
        for name in &self.excludes {
            match registry.resolve(name) {
                Some(id) => mask.clear(id),
                None => tracing::warn!(level = %name, "unknown exclude level, skipped"),
            }
        }

        mask
    }
}

/// Ordered set of writer entries with at most one default
#[derive(Debug, Clone, Default)]
pub struct WriterEntrySet {
    entries: Vec<WriterEntry>,
    default_index: Option<usize>,
}

impl WriterEntrySet {
    /// Create an empty entry set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, preserving insertion order
    ///
    /// # Errors
    ///
    /// Returns `DuplicateDefault` if a default entry already exists.
    pub fn push(&mut self, entry: WriterEntry) -> Result<()> {
        if entry.is_default {
            if self.default_index.is_some() {
                return Err(LevelError::DuplicateDefault);
            }
            self.default_index = Some(self.entries.len());
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check for no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in insertion order
    pub fn entries(&self) -> &[WriterEntry] {
        &self.entries
    }

    /// Select the entry governing a writer
    ///
    /// First structural match wins; the default entry is the fallback.
    pub fn select(&self, name: &str, tags: &[String]) -> Option<&WriterEntry> {
        self.entries
            .iter()
            .find(|e| e.matches(name, tags))
            .or_else(|| self.default_index.map(|i| &self.entries[i]))
    }

    /// Compute the activation mask for a writer
    ///
    /// A writer no entry governs is fully silenced (all-zero mask).
    pub fn mask_for(&self, name: &str, tags: &[String], registry: &LevelRegistry) -> LevelMask {
        match self.select(name, tags) {
            Some(entry) => entry.mask(registry),
            None => LevelMask::NONE,
        }
    }
}

#[cfg(test)]
#[path = "entry_test.rs"]
mod entry_test;
