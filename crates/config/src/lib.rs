#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for protoloc
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/protoloc/config.toml)
//! - Environment variables
//! - CLI flags
//!
//! It also parses the toolchain descriptor file that names the compiler and
//! plugins a generation step needs.

pub mod descriptors;
pub mod resources_semaphore;

pub use descriptors::{load_descriptors, parse_descriptors};
pub use resources_semaphore::{acquire_semaphore_permit, create_semaphore};

use protoloc_errors::{ConfigError, Error};
use protoloc_types::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Maven Central, used when no remote repository is configured
pub const MAVEN_CENTRAL: &str = "https://repo.maven.apache.org/maven2";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub repositories: RepositoryConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub default_output: OutputFormat,
    /// Upper bound on descriptors resolved at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Never contact remote repositories
    #[serde(default)]
    pub offline: bool,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub local_repository: Option<PathBuf>,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
}

/// Remote repositories, consulted in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_remotes")]
    pub remote: Vec<String>,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Plain,
            concurrency: default_concurrency(),
            offline: false,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            remote: default_remotes(),
        }
    }
}

// Default value functions for serde
fn default_concurrency() -> usize {
    4
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1 // 1 second
}

fn default_remotes() -> Vec<String> {
    vec![MAVEN_CENTRAL.to_string()]
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("protoloc").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if fs::try_exists(&config_path).await.unwrap_or(false) {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // PROTOLOC_CONCURRENCY
        if let Ok(concurrency) = std::env::var("PROTOLOC_CONCURRENCY") {
            self.general.concurrency =
                concurrency.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "PROTOLOC_CONCURRENCY".to_string(),
                    value: concurrency,
                })?;
        }

        // PROTOLOC_LOCAL_REPOSITORY
        if let Ok(local) = std::env::var("PROTOLOC_LOCAL_REPOSITORY") {
            if !local.is_empty() {
                self.paths.local_repository = Some(PathBuf::from(local));
            }
        }

        // PROTOLOC_OFFLINE
        if let Ok(offline) = std::env::var("PROTOLOC_OFFLINE") {
            self.general.offline = match offline.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "PROTOLOC_OFFLINE".to_string(),
                        value: offline,
                    }
                    .into())
                }
            };
        }

        // PROTOLOC_RETRIES
        if let Ok(retries) = std::env::var("PROTOLOC_RETRIES") {
            self.network.retries = retries.parse().map_err(|_| ConfigError::InvalidValue {
                field: "PROTOLOC_RETRIES".to_string(),
                value: retries,
            })?;
        }

        self.validate()
    }

    /// Reject values that would make resolution impossible
    ///
    /// # Errors
    ///
    /// Returns an error when the concurrency limit is zero.
    pub fn validate(&self) -> Result<(), Error> {
        if self.general.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.concurrency".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Get the local repository path (with default)
    #[must_use]
    pub fn local_repository(&self) -> PathBuf {
        self.paths.local_repository.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".m2")
                .join("repository")
        })
    }
}
