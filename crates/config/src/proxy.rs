//! Typed setting access
//!
//! A [`SettingProxy`] binds one (section, key) pair to a typed default and
//! caches the parsed value until the settings store is swapped. Stages hold
//! proxies for the lifetime of the process; the proxy identity never
//! changes, only the value it yields.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use parking_lot::Mutex;

use crate::error::{ConfigError, Result};
use crate::settings::SharedSettings;

/// Typed view of one setting
///
/// `get` is cheap in the steady state: one atomic generation load and a
/// cache hit. A missing or unparseable value yields the default.
#[derive(Debug)]
pub struct SettingProxy<T> {
    settings: SharedSettings,
    section: String,
    key: String,
    default: T,
    cache: Mutex<Option<(u64, T)>>,
}

impl<T: FromStr + Clone> SettingProxy<T> {
    /// Bind a proxy to `section.key` with a fallback default
    pub fn new(
        settings: SharedSettings,
        section: impl Into<String>,
        key: impl Into<String>,
        default: T,
    ) -> Self {
        Self {
            settings,
            section: section.into(),
            key: key.into(),
            default,
            cache: Mutex::new(None),
        }
    }

    /// The current value
    pub fn get(&self) -> T {
        let generation = self.settings.generation();
        {
            let cache = self.cache.lock();
            if let Some((cached_generation, value)) = cache.as_ref() {
                if *cached_generation == generation {
                    return value.clone();
                }
            }
        }

        let value = self
            .settings
            .load()
            .get_parsed::<T>(&self.section, &self.key)
            .unwrap_or_else(|| self.default.clone());

        *self.cache.lock() = Some((generation, value.clone()));
        value
    }

    /// The compiled-in default
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Section this proxy reads from
    #[inline]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Key this proxy reads
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Registry of bound settings
///
/// Guards against two call sites binding the same setting with different
/// defaults, which would make the effective fallback depend on call order.
pub struct SettingRegistry {
    settings: SharedSettings,
    registered: Mutex<HashMap<(String, String), String>>,
}

impl SettingRegistry {
    /// Create a registry over a settings handle
    #[must_use]
    pub fn new(settings: SharedSettings) -> Self {
        Self {
            settings,
            registered: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying settings handle
    #[inline]
    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    /// Bind a typed proxy, recording its default
    ///
    /// Re-registering the same setting with the same default is fine and
    /// yields a fresh proxy; a conflicting default is an error.
    pub fn register<T>(
        &self,
        section: impl Into<String>,
        key: impl Into<String>,
        default: T,
    ) -> Result<SettingProxy<T>>
    where
        T: FromStr + Clone + Display,
    {
        let section = section.into();
        let key = key.into();
        let repr = default.to_string();

        let mut registered = self.registered.lock();
        match registered.get(&(section.clone(), key.clone())) {
            Some(existing) if *existing != repr => {
                return Err(ConfigError::DuplicateDefault { section, key });
            }
            Some(_) => {}
            None => {
                registered.insert((section.clone(), key.clone()), repr);
            }
        }
        drop(registered);

        Ok(SettingProxy::new(self.settings.clone(), section, key, default))
    }
}
