//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (GHSNIP_*)
//! 2. TOML config file (if GHSNIP_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::reference::{DEFAULT_DISPLAY_HOST, DEFAULT_RAW_HOST, Hosts};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (GHSNIP_*)
/// 2. TOML config file (if GHSNIP_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via GHSNIP_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via GHSNIP_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via GHSNIP_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via GHSNIP_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Host serving raw file contents.
    ///
    /// Set via GHSNIP_RAW_HOST environment variable.
    #[serde(default = "default_raw_host")]
    pub raw_host: String,

    /// Host serving blob pages; locators must point here.
    ///
    /// Set via GHSNIP_DISPLAY_HOST environment variable.
    #[serde(default = "default_display_host")]
    pub display_host: String,

    /// Suffix mixed into every cache key.
    ///
    /// Set via GHSNIP_CACHE_NAMESPACE environment variable.
    #[serde(default = "default_cache_namespace")]
    pub cache_namespace: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./ghsnip-cache.sqlite")
}

fn default_user_agent() -> String {
    "ghsnip/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_raw_host() -> String {
    DEFAULT_RAW_HOST.into()
}

fn default_display_host() -> String {
    DEFAULT_DISPLAY_HOST.into()
}

fn default_cache_namespace() -> String {
    ".ghplugin".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            raw_host: default_raw_host(),
            display_host: default_display_host(),
            cache_namespace: default_cache_namespace(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Display and raw-content hosts.
    pub fn hosts(&self) -> Hosts {
        Hosts { display: self.display_host.clone(), raw: self.raw_host.clone() }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `GHSNIP_`
    /// 2. TOML file from `GHSNIP_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("GHSNIP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("GHSNIP_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
