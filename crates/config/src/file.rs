//! Configuration file model
//!
//! TOML layout:
//!
//! ```toml
//! application = "frontend"
//! pool_size = 2000
//!
//! [[writers]]
//! name = "Storage*"          # bare = wildcard; "exact:..." and "regex:..." also accepted
//! tags = ["io"]
//! level = "Notice"
//! include = ["SqlQueries"]
//! exclude = ["Warning"]
//!
//! [[writers]]
//! level = "Error"
//! default = true
//!
//! [stages.file]
//! queue_size = 1000
//! path = "/var/log/frontend.log"
//! ```
//!
//! Writer rules compile into a `WriterEntrySet`; every `[stages.*]` table
//! flattens into the settings store under the stage's name, so stage code
//! reads its own keys through setting proxies without this crate knowing
//! them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use scribe_levels::{Pattern, WriterEntry, WriterEntrySet};

use crate::error::Result;
use crate::settings::{SettingStore, SettingStoreBuilder};

/// Root configuration document
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name stamped into every message
    pub application: Option<String>,

    /// Process name override
    pub process_name: Option<String>,

    /// Message pool capacity
    pub pool_size: Option<usize>,

    /// Writer rules, order significant
    pub writers: Vec<WriterRule>,

    /// Per-stage settings tables, opaque to this crate
    pub stages: BTreeMap<String, BTreeMap<String, toml::Value>>,
}

/// One `[[writers]]` rule
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WriterRule {
    /// Writer name pattern; absent means the rule matches any name
    pub name: Option<String>,

    /// Tag patterns; when present at least one writer tag must match
    pub tags: Vec<String>,

    /// Base severity threshold (`All`, `None` or a level name)
    pub level: String,

    /// Levels enabled on top of the base
    pub include: Vec<String>,

    /// Levels disabled last
    pub exclude: Vec<String>,

    /// Fallback rule for writers nothing else matches
    pub default: bool,
}

impl Default for WriterRule {
    fn default() -> Self {
        Self {
            name: None,
            tags: Vec::new(),
            level: "Info".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            default: false,
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Compile the writer rules into an entry set
    ///
    /// Order is preserved; pattern and duplicate-default problems surface
    /// here, before the set goes live.
    pub fn build_entry_set(&self) -> Result<WriterEntrySet> {
        let mut set = WriterEntrySet::new();
        for rule in &self.writers {
            let mut entry = WriterEntry::new(rule.level.clone());
            if let Some(name) = &rule.name {
                entry = entry.name_pattern(Pattern::parse(name)?);
            }
            for tag in &rule.tags {
                entry = entry.tag_pattern(Pattern::parse(tag)?);
            }
            for level in &rule.include {
                entry = entry.include(level.clone());
            }
            for level in &rule.exclude {
                entry = entry.exclude(level.clone());
            }
            if rule.default {
                entry = entry.default_entry();
            }
            set.push(entry)?;
        }
        Ok(set)
    }

    /// Flatten the `[stages.*]` tables into a settings store
    pub fn setting_store(&self) -> SettingStore {
        let mut builder = SettingStoreBuilder::default();
        for (stage, table) in &self.stages {
            for (key, value) in table {
                builder = builder.set(stage.clone(), key.clone(), stringify(value));
            }
        }
        builder.build()
    }
}

/// TOML value to setting string, without quoting plain strings
fn stringify(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod file_test;
