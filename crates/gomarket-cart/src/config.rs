//! # Cart Configuration
//!
//! Configuration for the cart service and its backing store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKET_DB_PATH=/data/cart.db                                     │
//! │     GOMARKET_STORAGE_KEY=@gomarketplace:products                       │
//! │     GOMARKET_COMMAND_BUFFER=64                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarket/gomarket.toml (Linux)                           │
//! │     ~/Library/Application Support/com.gomarket.cart/gomarket.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! database_path = "/var/lib/gomarket/cart.db"
//! key = "@gomarketplace:products"
//! max_connections = 2
//!
//! [service]
//! command_buffer = 64
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use gomarket_core::DEFAULT_STORAGE_KEY;
use gomarket_storage::DbConfig;

use crate::error::{CartError, CartResult};

const CONFIG_FILE_NAME: &str = "gomarket.toml";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "gomarket", "cart")
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where and under which key the cart is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file holding the key-value store.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Storage key of the cart blob.
    #[serde(default = "default_storage_key")]
    pub key: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("cart.db"))
        .unwrap_or_else(|| PathBuf::from("gomarket-cart.db"))
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_max_connections() -> u32 {
    2
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: default_database_path(),
            key: default_storage_key(),
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Service Settings
// =============================================================================

/// Cart service tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Capacity of the mutation queue. Callers wait when it is full.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

fn default_command_buffer() -> usize {
    64
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            command_buffer: default_command_buffer(),
        }
    }
}

// =============================================================================
// Cart Config
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub service: ServiceSettings,
}

impl CartConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (gomarket.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a config file without applying overrides.
    pub fn from_file(path: &Path) -> CartResult<Self> {
        info!(?path, "Loading cart config from file");
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CartError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.storage.key.trim().is_empty() {
            return Err(CartError::InvalidConfig("storage.key must not be empty".into()));
        }

        if self.storage.database_path.as_os_str().is_empty() {
            return Err(CartError::InvalidConfig(
                "storage.database_path must not be empty".into(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(CartError::InvalidConfig(
                "storage.max_connections must be greater than 0".into(),
            ));
        }

        if self.service.command_buffer == 0 {
            return Err(CartError::InvalidConfig(
                "service.command_buffer must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `GOMARKET_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("GOMARKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = PathBuf::from(path);
        }

        if let Some(key) = lookup("GOMARKET_STORAGE_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Some(buffer) = lookup("GOMARKET_COMMAND_BUFFER") {
            match buffer.parse::<usize>() {
                Ok(b) => self.service.command_buffer = b,
                Err(_) => warn!(value = %buffer, "Ignoring non-numeric GOMARKET_COMMAND_BUFFER"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Database settings for the configured SQLite file.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.storage.database_path).max_connections(self.storage.max_connections)
    }
}
