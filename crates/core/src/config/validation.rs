//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `refresh_hour` is not an hour of the day
    /// - `max_staleness_hours` is 0 or exceeds one week
    /// - `cache_file` or `db_path` is empty
    /// - `admin_token` is set but empty
    /// - `seed_file` is set but empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_hour > 23 {
            return Err(ConfigError::Invalid { field: "refresh_hour".into(), reason: "must be between 0 and 23".into() });
        }

        if self.max_staleness_hours == 0 {
            return Err(ConfigError::Invalid {
                field: "max_staleness_hours".into(),
                reason: "must be at least 1 hour".into(),
            });
        }
        if self.max_staleness_hours > 168 {
            return Err(ConfigError::Invalid {
                field: "max_staleness_hours".into(),
                reason: "must not exceed one week (168h)".into(),
            });
        }

        if self.cache_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "cache_file".into(), reason: "must not be empty".into() });
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "db_path".into(), reason: "must not be empty".into() });
        }

        if self.admin_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid { field: "admin_token".into(), reason: "must not be blank when set".into() });
        }

        if self.seed_file.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid { field: "seed_file".into(), reason: "must not be empty when set".into() });
        }

        if self.admin_token.is_none() {
            tracing::warn!("admin_token is not set; manual catalog refresh is disabled");
        }

        Ok(())
    }
}
