//! Configuration loading and management
//!
//! Handles parsing of `config.toml` in the taskdesk data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::stats::UpcomingPolicy;
use crate::storage::{validate_slot_name, DEFAULT_SLOT};
use crate::task::{Category, Priority};

/// File name of the configuration inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Durable slot settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Field defaults for new tasks
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Stats settings
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Durable slot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Slot name; the collection is stored in `<slot>.json`
    #[serde(default = "default_slot")]
    pub slot: String,

    /// How long to wait for the slot lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_slot() -> String {
    DEFAULT_SLOT.to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            slot: default_slot(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Defaults applied when a new task leaves a field unset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default = "default_priority")]
    pub priority: String,
}

fn default_category() -> String {
    "personal".to_string()
}

fn default_priority() -> String {
    "medium".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            category: default_category(),
            priority: default_priority(),
        }
    }
}

/// Stats configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// List completed tasks among upcoming deadlines
    #[serde(default = "default_true")]
    pub upcoming_include_completed: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            upcoming_include_completed: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.toml` from the data directory. A missing file yields
    /// defaults; an unreadable or invalid one is `InvalidConfig`.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&config_path).map_err(|err| match err {
            Error::InvalidConfig(msg) => {
                Error::InvalidConfig(format!("{}: {msg}", config_path.display()))
            }
            other => Error::InvalidConfig(format!("{}: {other}", config_path.display())),
        })
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_category(&self) -> Result<Category> {
        self.defaults
            .category
            .parse()
            .map_err(|err| Error::InvalidConfig(format!("defaults.category: {err}")))
    }

    pub fn default_priority(&self) -> Result<Priority> {
        self.defaults
            .priority
            .parse()
            .map_err(|err| Error::InvalidConfig(format!("defaults.priority: {err}")))
    }

    pub fn upcoming_policy(&self) -> UpcomingPolicy {
        UpcomingPolicy::from_include_completed(self.stats.upcoming_include_completed)
    }

    fn validate(&self) -> Result<()> {
        validate_slot_name(&self.storage.slot)?;
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        self.default_category()?;
        self.default_priority()?;
        Ok(())
    }
}

/// Resolve the data directory: explicit flag/env value, then the platform
/// data dir, then `./.taskdesk`.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    directories::ProjectDirs::from("", "", "taskdesk")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".taskdesk"))
}
