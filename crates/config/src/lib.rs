//! Scribe - Configuration
//!
//! TOML configuration loading, the immutable settings store and typed
//! setting proxies.
//!
//! # Key Design
//!
//! - **Immutable snapshots**: a [`SettingStore`] never changes after it is
//!   built; reconfiguration swaps the whole store behind [`SharedSettings`]
//! - **Generation-tracked caching**: [`SettingProxy`] caches its parsed
//!   value and re-reads only when the store generation moves
//! - **Opaque stage settings**: `[stages.*]` tables flatten into the store
//!   as strings; stage code owns its keys and their types
//!
//! # Example
//!
//! ```
//! use scribe_config::{Config, SharedSettings, SettingProxy};
//!
//! let config = Config::from_toml(r#"
//!     [stages.file]
//!     queue_size = 250
//! "#).unwrap();
//!
//! let settings = SharedSettings::new();
//! settings.swap(config.setting_store());
//!
//! let queue_size = SettingProxy::new(settings.clone(), "file", "queue_size", 500usize);
//! assert_eq!(queue_size.get(), 250);
//! ```

mod error;
mod file;
mod proxy;
mod settings;

pub use error::{ConfigError, Result};
pub use file::{Config, WriterRule};
pub use proxy::{SettingProxy, SettingRegistry};
pub use settings::{SettingStore, SettingStoreBuilder, SharedSettings};
