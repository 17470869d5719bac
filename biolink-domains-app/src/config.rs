//! Application configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file)
//! gives a working development setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use biolink_domains_core::error::{CoreError, CoreResult};
use biolink_domains_core::types::DomainSettings;
use biolink_domains_doh::DEFAULT_DOH_ENDPOINT;

/// Environment variable holding an explicit config file path
pub const CONFIG_PATH_ENV: &str = "BIOLINK_DOMAINS_CONFIG";

/// File looked up in the working directory when the variable is unset
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Platform domain settings
    pub domains: DomainSettings,
    /// DNS-over-HTTPS resolver
    pub doh: DohConfig,
    /// Auto-verification polling
    pub polling: PollingConfig,
    /// SQLite storage
    pub database: DatabaseConfig,
    /// HTTP listener
    pub server: ServerConfig,
    /// Logging
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DohConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Issue an extra A query when no CNAME is found, for better messages
    pub a_record_diagnostics: bool,
}

impl Default for DohConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_DOH_ENDPOINT.to_string(),
            timeout_secs: 5,
            a_record_diagnostics: true,
        }
    }
}

impl DohConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            max_attempts: 120,
        }
    }
}

impl PollingConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/biolink-domains.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. Path in `BIOLINK_DOMAINS_CONFIG`
    /// 3. `config.toml` in the working directory
    /// 4. Defaults
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let config = match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ValidationError(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> CoreResult<Self> {
        toml::from_str(contents)
            .map_err(|e| CoreError::ValidationError(format!("Failed to parse config: {e}")))
    }

    /// Reject values that cannot work at runtime.
    pub fn validate(&self) -> CoreResult<()> {
        if self.domains.app_domain.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "domains.app_domain must not be empty".to_string(),
            ));
        }
        if self.domains.cname_target.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "domains.cname_target must not be empty".to_string(),
            ));
        }
        if !self.domains.profile_fallback_path.starts_with('/') {
            return Err(CoreError::ValidationError(format!(
                "domains.profile_fallback_path must start with '/' (got '{}')",
                self.domains.profile_fallback_path
            )));
        }
        if self.doh.timeout_secs == 0 {
            return Err(CoreError::ValidationError(
                "doh.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.polling.interval_secs == 0 {
            return Err(CoreError::ValidationError(
                "polling.interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
