//! Settings store
//!
//! A [`SettingStore`] is an immutable snapshot of section/key/value
//! settings. Runtime reconfiguration swaps the whole store behind
//! [`SharedSettings`]; readers hold a consistent snapshot for as long as
//! they keep the handle, and a generation counter lets cached consumers
//! detect the swap.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

/// Immutable section/key/value settings snapshot
///
/// All values are stored as strings; typed access parses on read.
#[derive(Debug, Default, Clone)]
pub struct SettingStore {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SettingStore {
    /// An empty store
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a store
    #[must_use]
    pub fn builder() -> SettingStoreBuilder {
        SettingStoreBuilder::default()
    }

    /// Raw value lookup
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
    }

    /// Typed value lookup
    ///
    /// A present but unparseable value is reported and treated as absent.
    pub fn get_parsed<T: FromStr>(&self, section: &str, key: &str) -> Option<T> {
        let raw = self.get(section, key)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(section, key, value = raw, "setting value failed to parse");
                None
            }
        }
    }

    /// Whether a section exists
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Section names, unordered
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// All keys of a section, unordered
    pub fn keys(&self, section: &str) -> Vec<&str> {
        self.sections
            .get(section)
            .map(|keys| keys.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Builder for [`SettingStore`]
#[derive(Debug, Default)]
pub struct SettingStoreBuilder {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SettingStoreBuilder {
    /// Set one value
    #[must_use]
    pub fn set(
        mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Freeze into an immutable store
    #[must_use]
    pub fn build(self) -> SettingStore {
        SettingStore {
            sections: self.sections,
        }
    }
}

/// Shared handle to the live settings store
///
/// Clones observe the same store; `swap` replaces it atomically and bumps
/// the generation so proxy caches re-read on their next access.
#[derive(Debug, Clone)]
pub struct SharedSettings {
    store: Arc<ArcSwap<SettingStore>>,
    generation: Arc<AtomicU64>,
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedSettings {
    /// Create a handle holding an empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(ArcSwap::from_pointee(SettingStore::empty())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The current store snapshot
    pub fn load(&self) -> Arc<SettingStore> {
        self.store.load_full()
    }

    /// Replace the store
    pub fn swap(&self, store: SettingStore) {
        self.store.store(Arc::new(store));
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Swap generation, bumped on every `swap`
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
