//! Configuration management
//!
//! This module handles loading the binv configuration file.
//! The configuration file is stored in TOML format at
//! `$BINV_CONFIG_DIR/config.toml`, falling back to `~/.config/binv/config.toml`.
//!
//! Changes to schema_version require migration support.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::inventory::{FailurePolicy, InventoryOptions};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "BINV_CONFIG_DIR";

/// Default output format
const DEFAULT_OUTPUT: &str = "human";

/// Default color setting
const DEFAULT_COLOR: &str = "auto";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// How to reach the storage account
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Inventory run settings
    #[serde(default)]
    pub inventory: InventoryConfig,
}

/// Default settings for CLI behavior
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    /// Output format: "human" or "json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode: "auto", "always", or "never"
    #[serde(default = "default_color")]
    pub color: String,

    /// Show progress spinner
    #[serde(default = "default_true")]
    pub progress: bool,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            progress: true,
        }
    }
}

/// Retry configuration for backend requests
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

/// Timeout configuration for backend requests
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,

    /// Read timeout in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_ms: u64,
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_read_timeout() -> u64 {
    30000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            read_ms: default_read_timeout(),
        }
    }
}

/// Connection settings for the storage account
///
/// Unset fields fall through to the AWS SDK's own resolution
/// (environment, shared config files, instance metadata).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionConfig {
    /// Named profile from the shared AWS config files
    #[serde(default)]
    pub profile: Option<String>,

    /// Region
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint URL for S3-compatible services
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[serde(default)]
    pub force_path_style: bool,

    /// Static access key ID
    #[serde(default)]
    pub access_key: Option<String>,

    /// Static secret access key
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Retry configuration
    #[serde(default)]
    pub retry: Option<RetryConfig>,

    /// Timeout configuration
    #[serde(default)]
    pub timeout: Option<TimeoutConfig>,
}

impl ConnectionConfig {
    /// Get the effective retry configuration
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    /// Get the effective timeout configuration
    pub fn timeout_config(&self) -> TimeoutConfig {
        self.timeout.clone().unwrap_or_default()
    }

    /// Static credentials, when both halves are configured
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key, &self.secret_key) {
            (Some(access), Some(secret)) => Some((access.as_str(), secret.as_str())),
            _ => None,
        }
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.endpoint_url {
            let url = url::Url::parse(endpoint)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "Endpoint URL must use http or https: {endpoint}"
                )));
            }
        }

        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(Error::Config(
                "access_key and secret_key must be set together".into(),
            ));
        }

        if self.retry.as_ref().is_some_and(|r| r.max_attempts == 0) {
            return Err(Error::Config("retry.max_attempts must be at least 1".into()));
        }

        Ok(())
    }
}

/// Inventory run settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryConfig {
    /// Keys requested per listing page
    #[serde(default)]
    pub page_size: Option<i32>,

    /// Abort the run on the first bucket that fails
    #[serde(default)]
    pub fail_fast: bool,
}

impl InventoryConfig {
    /// Convert into options for an inventory run
    pub fn to_options(&self) -> Result<InventoryOptions> {
        if let Some(size) = self.page_size
            && !(1..=1000).contains(&size)
        {
            return Err(Error::Config(format!(
                "page_size must be between 1 and 1000, got {size}"
            )));
        }

        Ok(InventoryOptions {
            page_size: self.page_size,
            failure_policy: if self.fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::Continue
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            connection: ConnectionConfig::default(),
            inventory: InventoryConfig::default(),
        }
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("binv"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    /// Connection settings are not validated here; callers validate once
    /// their own overrides are applied.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade binv.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }
}
