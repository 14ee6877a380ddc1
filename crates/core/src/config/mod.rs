//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (REELGEAR_*)
//! 2. TOML config file (if REELGEAR_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (REELGEAR_*)
/// 2. TOML config file (if REELGEAR_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite catalog database.
    ///
    /// Set via REELGEAR_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Path of the persisted catalog snapshot.
    ///
    /// Set via REELGEAR_CACHE_FILE environment variable.
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,

    /// Local hour of day (0-23) of the daily catalog refresh.
    ///
    /// Set via REELGEAR_REFRESH_HOUR environment variable.
    #[serde(default = "default_refresh_hour")]
    pub refresh_hour: u32,

    /// Age after which the snapshot is reported as stale.
    ///
    /// Set via REELGEAR_MAX_STALENESS_HOURS environment variable.
    #[serde(default = "default_max_staleness_hours")]
    pub max_staleness_hours: u64,

    /// Whether to rewarm from the database right after startup.
    ///
    /// Set via REELGEAR_WARM_ON_STARTUP environment variable.
    #[serde(default = "default_true")]
    pub warm_on_startup: bool,

    /// Shared secret for the administrative refresh.
    ///
    /// Set via REELGEAR_ADMIN_TOKEN environment variable.
    /// When unset, manual refresh is disabled.
    #[serde(default)]
    pub admin_token: Option<String>,

    /// JSON catalog seed imported into the database at startup.
    ///
    /// Set via REELGEAR_SEED_FILE environment variable.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./reelgear.sqlite")
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("./data/catalog_cache.json")
}

fn default_refresh_hour() -> u32 {
    3
}

fn default_max_staleness_hours() -> u64 {
    25 // one daily cycle plus an hour of grace
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_file: default_cache_file(),
            refresh_hour: default_refresh_hour(),
            max_staleness_hours: default_max_staleness_hours(),
            warm_on_startup: true,
            admin_token: None,
            seed_file: None,
        }
    }
}

impl AppConfig {
    /// Maximum staleness as a Duration.
    pub fn max_staleness(&self) -> Duration {
        Duration::from_secs(self.max_staleness_hours * 3600)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `REELGEAR_`
    /// 2. TOML file from `REELGEAR_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("REELGEAR_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("REELGEAR_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The admin token, for the refresh operation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no admin token is configured.
    pub fn require_admin_token(&self) -> Result<&str, ConfigError> {
        self.admin_token.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "admin_token".into(),
            hint: "Set REELGEAR_ADMIN_TOKEN environment variable".into(),
        })
    }
}
