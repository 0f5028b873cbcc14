//! Store configuration
//!
//! Settings are read from TOML. Every section is optional and falls back to
//! the defaults below.

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::{log_info, log_warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Column observer settings
    pub observers: ObserverConfig,

    /// Value index settings
    pub index: IndexConfig,

    /// Graph view settings
    pub view: ViewConfig,

    /// Metrics settings
    pub metrics: MetricsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Column observer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Allow column observers; read once per column at creation
    pub enabled: bool,
}

/// Value index configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Maintain value indices for indexed node columns
    pub nodes: bool,

    /// Maintain value indices for indexed edge columns
    pub edges: bool,
}

/// Graph view configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Geometric growth factor applied to view bit sets
    pub growing_factor: f64,

    /// Initial length of the per-type edge counters
    pub default_type_count: usize,
}

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Register Prometheus collectors for the store
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used by `init_logging`
    pub filter: String,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { nodes: true, edges: true }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            growing_factor: default_growing_factor(),
            default_type_count: default_type_count(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "warn".to_string() }
    }
}

fn default_growing_factor() -> f64 { 1.1 }
fn default_type_count() -> usize { 1 }

impl StoreConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the store cannot honour
    pub fn validate(&self) -> Result<()> {
        if !(self.view.growing_factor >= 1.0) {
            return Err(Error::config(format!(
                "view.growing_factor must be >= 1.0, got {}",
                self.view.growing_factor
            )));
        }
        if self.view.default_type_count == 0 {
            return Err(Error::config("view.default_type_count must be at least 1"));
        }
        Ok(())
    }
}

/// Load configuration from file
pub fn load_config(path: &str) -> Result<StoreConfig> {
    let config_str = std::fs::read_to_string(path)?;
    StoreConfig::from_toml_str(&config_str)
}

/// Load configuration from file or use defaults
pub fn load_config_or_default(path: Option<&str>) -> StoreConfig {
    match path {
        Some(path) => match load_config(path) {
            Ok(config) => {
                log_info!("Loaded store configuration from: {}", path);
                config
            }
            Err(e) => {
                log_warn!("Failed to load config from {}: {}. Using defaults.", path, e);
                StoreConfig::default()
            }
        },
        None => {
            log_info!("No config file specified, using defaults");
            StoreConfig::default()
        }
    }
}
