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
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent`, `raw_host`, `display_host` or `cache_namespace` is empty
    /// - a host contains a scheme or path separator
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        let required = [
            ("user_agent", &self.user_agent),
            ("raw_host", &self.raw_host),
            ("display_host", &self.display_host),
            ("cache_namespace", &self.cache_namespace),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must not be empty".into() });
            }
        }

        for (field, host) in [("raw_host", &self.raw_host), ("display_host", &self.display_host)] {
            if host.contains('/') || host.contains(char::is_whitespace) {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: "must be a bare host name without scheme or path".into(),
                });
            }
        }

        Ok(())
    }
}
