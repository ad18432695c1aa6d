//! Configuration management for Crosspost

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Maximum accepted image size (10 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub publishing: PublishingConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "~/.local/share/crosspost/crosspost.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishingConfig {
    /// Simulated per-platform latency
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
    pub max_image_bytes: usize,
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accept identity claims directly on `/api/auth/login`
    pub dev_login: bool,
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,
    pub cookie_name: String,
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            dev_login: true,
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            cookie_name: "crosspost.sid".to_string(),
            secure_cookies: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Database path with `~` expanded
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.database.path).to_string())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CROSSPOST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("crosspost").join("config.toml"))
}
