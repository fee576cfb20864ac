//! Pipeline engine
//!
//! [`Pipeline`] owns the stage graph roots, the level registry, the message
//! pool and the live writer configuration. Configuration is swapped
//! atomically; writers observe the swap through a generation counter on
//! their next call.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::Utc;
use parking_lot::Mutex;

use scribe_config::{Config, SettingProxy, SettingRegistry, SharedSettings};
use scribe_levels::{LevelId, LevelMask, LevelRegistry, LogLevel, WriterEntry, WriterEntrySet};
use scribe_message::MessagePool;

use crate::async_engine::AsyncOptions;
use crate::error::{PipelineError, Result};
use crate::node::StageNode;
use crate::stage::StageEvent;
use crate::writer::LogWriter;

/// Default message pool capacity
const DEFAULT_POOL_SIZE: usize = 1000;

/// Setting proxies behind one stage's engine tunables
///
/// Bound with the node's programmatic options as defaults; every store swap
/// re-resolves through the proxies' generation check.
struct StageTunables {
    queue_size: SettingProxy<usize>,
    discard_if_full: SettingProxy<bool>,
    shutdown_timeout_ms: SettingProxy<u64>,
}

/// Shared engine state, referenced by every writer
pub(crate) struct EngineCore {
    application: String,
    process_name: String,
    process_id: u32,

    registry: Arc<LevelRegistry>,
    pool: Arc<MessagePool>,

    /// Live writer rules, swapped whole on configuration change
    entries: ArcSwap<WriterEntrySet>,

    /// Bumped on every entry-set swap; writers re-derive their mask when it
    /// moves
    config_generation: AtomicU64,

    settings: SharedSettings,

    /// Duplicate-default guard for the tunables bound below
    tunable_registry: SettingRegistry,

    /// Tunable proxies, bound once per stage on first resolution
    tunables: Mutex<HashMap<String, StageTunables>>,

    /// Stage graph roots, fixed set once running
    roots: ArcSwap<Vec<StageNode>>,

    /// True between a successful `initialize` and `shutdown`
    running: AtomicBool,

    /// High-resolution stamp origin
    epoch: std::time::Instant,
}

impl EngineCore {
    #[inline]
    pub(crate) fn registry(&self) -> &LevelRegistry {
        &self.registry
    }

    #[inline]
    pub(crate) fn config_generation(&self) -> u64 {
        self.config_generation.load(Ordering::Acquire)
    }

    pub(crate) fn mask_for(&self, name: &str, tags: &[String]) -> LevelMask {
        self.entries.load().mask_for(name, tags, &self.registry)
    }

    /// Build a pooled message and run it through every root
    ///
    /// The caller has already passed the mask gate. Runs entirely on the
    /// producer thread.
    pub(crate) fn dispatch(
        &self,
        writer: &str,
        tags: &[String],
        extra_tags: &[&str],
        level: LevelId,
        text: String,
    ) {
        if !self.running.load(Ordering::Acquire) {
            return;
        }
        let roots = self.roots.load();
        if roots.is_empty() {
            return;
        }

        let msg = self.pool.acquire(|m| {
            m.timestamp = Utc::now();
            m.nanos = self.epoch.elapsed().as_nanos() as u64;
            m.writer.clear();
            m.writer.push_str(writer);
            m.level = level;
            m.level_name = self.registry.name_of(level);
            m.tags.clear();
            m.tags.extend(tags.iter().cloned());
            m.tags.extend(extra_tags.iter().map(|t| t.to_string()));
            m.application.clear();
            m.application.push_str(&self.application);
            m.process_name.clear();
            m.process_name.push_str(&self.process_name);
            m.process_id = self.process_id;
            m.text = text;
        });

        for root in roots.iter() {
            if let Err(err) = root.process(&msg) {
                tracing::warn!(stage = root.name(), error = %err, "root rejected message");
            }
        }
    }
}

/// The logging pipeline
///
/// Construction order: build, wire roots and their subtrees, optionally
/// apply a configuration, then `initialize`. Writers can be created at any
/// time; writes before `initialize` are dropped at the gate.
pub struct Pipeline {
    core: Arc<EngineCore>,

    /// Serializes initialize/shutdown
    lifecycle: tokio::sync::Mutex<()>,

    /// Guards root wiring
    topology: Mutex<()>,
}

impl Pipeline {
    /// Start building a pipeline
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The level registry
    #[inline]
    pub fn registry(&self) -> &Arc<LevelRegistry> {
        &self.core.registry
    }

    /// The message pool
    #[inline]
    pub fn pool(&self) -> &Arc<MessagePool> {
        &self.core.pool
    }

    /// The live settings store handle
    #[inline]
    pub fn settings(&self) -> &SharedSettings {
        &self.core.settings
    }

    /// Whether the pipeline is initialized and accepting messages
    pub fn is_running(&self) -> bool {
        self.core.running.load(Ordering::Acquire)
    }

    /// Wire a root stage node
    ///
    /// Rejected while the pipeline is running and when a root with the same
    /// name exists.
    pub fn add_root(&self, node: StageNode) -> Result<()> {
        let _guard = self.topology.lock();
        if self.is_running() {
            return Err(PipelineError::invalid_state(
                node.name(),
                "roots cannot be added while the pipeline is running",
            ));
        }
        let current = self.core.roots.load();
        if current.iter().any(|r| r.name() == node.name()) {
            return Err(PipelineError::DuplicateStage {
                name: node.name().to_string(),
            });
        }
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(node);
        self.core.roots.store(Arc::new(next));
        Ok(())
    }

    /// The root nodes in wiring order
    pub fn roots(&self) -> Vec<StageNode> {
        self.core.roots.load().as_ref().clone()
    }

    /// Find a stage node by name anywhere in the graph
    pub fn stage(&self, name: &str) -> Option<StageNode> {
        self.core
            .roots
            .load()
            .iter()
            .flat_map(|root| root.all_stages())
            .find(|node| node.name() == name)
    }

    /// Initialize every root subtree
    ///
    /// Atomic across the whole graph: if any stage fails, everything
    /// initialized by this call is shut down again and the original error is
    /// returned.
    pub async fn initialize(&self) -> Result<()> {
        let _guard = self.lifecycle.lock().await;

        // Tunables resolve from the live settings right before the engines
        // start; after this they are fixed
        self.apply_stage_tunables();

        let roots = self.core.roots.load_full();

        let mut done: Vec<StageNode> = Vec::with_capacity(roots.len());
        for root in roots.iter() {
            if let Err(err) = root.initialize().await {
                for rolled in done.iter().rev() {
                    rolled.shutdown().await;
                }
                return Err(err);
            }
            done.push(root.clone());
        }

        self.core.running.store(true, Ordering::Release);
        tracing::info!(roots = roots.len(), "pipeline initialized");
        Ok(())
    }

    /// Shut the whole pipeline down
    ///
    /// New writes are gated off first, then roots are torn down in reverse
    /// wiring order. Total: every stage is shut down even if one misbehaves.
    pub async fn shutdown(&self) {
        let _guard = self.lifecycle.lock().await;
        self.core.running.store(false, Ordering::Release);

        let roots = self.core.roots.load_full();
        for root in roots.iter().rev() {
            root.shutdown().await;
        }
        tracing::info!("pipeline shut down");
    }

    /// Create a writer handle
    ///
    /// The handle caches its activation mask and re-derives it when
    /// configuration or the level registry changes. Stages are notified so
    /// routing stages can track the writer population.
    pub fn writer(&self, name: &str, tags: &[&str]) -> LogWriter {
        let writer = LogWriter::new(Arc::clone(&self.core), name, tags);
        self.broadcast(StageEvent::WriterAdded(name.to_string()));
        writer
    }

    /// Register a custom aspect level
    ///
    /// Idempotent for an already-known name. Stages are notified; writer
    /// masks refresh through the registry generation.
    pub fn register_aspect_level(&self, name: &str) -> Result<LogLevel> {
        let level = self.core.registry.register_aspect(name)?;
        self.broadcast(StageEvent::LevelAdded(level.clone()));
        Ok(level)
    }

    /// Replace the writer rules programmatically
    pub fn set_entries(&self, entries: WriterEntrySet) {
        self.core.entries.store(Arc::new(entries));
        self.core.config_generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Apply a parsed configuration
    ///
    /// Swaps the writer rules and the settings store atomically (each), then
    /// notifies every stage. Stage tunables (`queue_size`,
    /// `discard_if_full`, `shutdown_timeout_ms`) resolve through per-stage
    /// setting proxies onto matching nodes; running nodes are skipped since
    /// their tunables are fixed at initialization.
    pub fn apply_config(&self, config: &Config) -> Result<()> {
        let entries = config.build_entry_set()?;
        self.core.entries.store(Arc::new(entries));
        self.core.config_generation.fetch_add(1, Ordering::AcqRel);

        self.core.settings.swap(config.setting_store());
        self.broadcast(StageEvent::SettingsChanged);

        self.apply_stage_tunables();
        tracing::info!(
            writers = config.writers.len(),
            generation = self.core.config_generation(),
            "configuration applied"
        );
        Ok(())
    }

    /// Deliver an event to every stage in the graph
    pub fn broadcast(&self, event: StageEvent) {
        for root in self.core.roots.load().iter() {
            root.post_event(&event);
        }
    }

    /// Resolve stage tunables from the live settings through their proxies
    ///
    /// Nodes without a configured section keep their programmatic options;
    /// running nodes are skipped since their engines fixed the options at
    /// initialization.
    fn apply_stage_tunables(&self) {
        let store = self.core.settings.load();
        let mut bound = self.core.tunables.lock();
        for root in self.core.roots.load().iter() {
            for node in root.all_stages() {
                if node.is_initialized() || !store.has_section(node.name()) {
                    continue;
                }
                let tunables = match bound.entry(node.name().to_string()) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        let bind = Self::bind_tunables(
                            &self.core.tunable_registry,
                            entry.key(),
                            node.options(),
                        );
                        match bind {
                            Ok(tunables) => entry.insert(tunables),
                            Err(err) => {
                                tracing::warn!(stage = node.name(), error = %err, "tunables not bound");
                                continue;
                            }
                        }
                    }
                };
                let options = AsyncOptions {
                    queue_size: tunables.queue_size.get(),
                    discard_if_full: tunables.discard_if_full.get(),
                    shutdown_timeout: Duration::from_millis(tunables.shutdown_timeout_ms.get()),
                };
                if let Err(err) = node.set_options(options) {
                    tracing::warn!(stage = node.name(), error = %err, "tunables not applied");
                }
            }
        }
    }

    fn bind_tunables(
        registry: &SettingRegistry,
        stage: &str,
        defaults: AsyncOptions,
    ) -> scribe_config::Result<StageTunables> {
        Ok(StageTunables {
            queue_size: registry.register(stage, "queue_size", defaults.queue_size)?,
            discard_if_full: registry.register(stage, "discard_if_full", defaults.discard_if_full)?,
            shutdown_timeout_ms: registry.register(
                stage,
                "shutdown_timeout_ms",
                defaults.shutdown_timeout.as_millis() as u64,
            )?,
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("application", &self.core.application)
            .field("running", &self.is_running())
            .field(
                "roots",
                &self
                    .core
                    .roots
                    .load()
                    .iter()
                    .map(|r| r.name().to_string())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for [`Pipeline`]
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    application: Option<String>,
    process_name: Option<String>,
    pool_size: Option<usize>,
    entries: Option<WriterEntrySet>,
}

impl PipelineBuilder {
    /// Set the application name stamped into every message
    #[must_use]
    pub fn application(mut self, name: impl Into<String>) -> Self {
        self.application = Some(name.into());
        self
    }

    /// Override the process name (defaults to the executable name)
    #[must_use]
    pub fn process_name(mut self, name: impl Into<String>) -> Self {
        self.process_name = Some(name.into());
        self
    }

    /// Set the message pool capacity
    #[must_use]
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = Some(size);
        self
    }

    /// Start with a programmatic writer rule set
    #[must_use]
    pub fn entries(mut self, entries: WriterEntrySet) -> Self {
        self.entries = Some(entries);
        self
    }

    /// Start with a single rule governing every writer
    ///
    /// Convenience for the common case of one base level for the whole
    /// process.
    #[must_use]
    pub fn default_level(mut self, base_level: impl Into<String>) -> Self {
        let mut set = WriterEntrySet::new();
        // A fresh set cannot already hold a default
        let _ = set.push(WriterEntry::new(base_level).default_entry());
        self.entries = Some(set);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        let process_name = self.process_name.unwrap_or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_default()
        });

        let settings = SharedSettings::new();
        let core = Arc::new(EngineCore {
            application: self.application.unwrap_or_default(),
            process_name,
            process_id: std::process::id(),
            registry: Arc::new(LevelRegistry::new()),
            pool: Arc::new(MessagePool::new(self.pool_size.unwrap_or(DEFAULT_POOL_SIZE))),
            entries: ArcSwap::from_pointee(self.entries.unwrap_or_default()),
            config_generation: AtomicU64::new(0),
            settings: settings.clone(),
            tunable_registry: SettingRegistry::new(settings),
            tunables: Mutex::new(HashMap::new()),
            roots: ArcSwap::from_pointee(Vec::new()),
            running: AtomicBool::new(false),
            epoch: std::time::Instant::now(),
        });

        Pipeline {
            core,
            lifecycle: tokio::sync::Mutex::new(()),
            topology: Mutex::new(()),
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
