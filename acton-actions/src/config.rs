//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `ACTON_`, nesting separator `__`,
//!    e.g. `ACTON_ACTIONS__SHOW_VIEW=detail`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/acton-actions/{service_name}/config.toml
//! 4. System directory: /etc/acton-actions/{service_name}/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

const CONFIG_PREFIX: &str = "acton-actions";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Action template configuration
    #[serde(default)]
    pub actions: ActionsConfig,

    /// Local job queue configuration
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum request body size in megabytes
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            port: default_port(),
            log_level: default_log_level(),
            timeout_secs: default_timeout(),
            body_limit_mb: default_body_limit_mb(),
        }
    }
}

impl ServiceConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Body limit in bytes
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }
}

/// Texts and defaults used by the action templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// View used by `show` when the request names none
    #[serde(default = "default_show_view")]
    pub show_view: String,

    /// Message returned when an operation is queued
    #[serde(default = "default_queued_message")]
    pub queued_message: String,

    /// Message returned after a record is destroyed
    #[serde(default = "default_destroyed_message")]
    pub destroyed_message: String,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            show_view: default_show_view(),
            queued_message: default_queued_message(),
            destroyed_message: default_destroyed_message(),
        }
    }
}

/// Local job queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Channel capacity; enqueueing beyond it fails
    #[serde(default = "default_job_capacity")]
    pub capacity: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            capacity: default_job_capacity(),
        }
    }
}

fn default_service_name() -> String {
    CONFIG_PREFIX.to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_body_limit_mb() -> usize {
    10 // 10 MB
}

fn default_show_view() -> String {
    "full".to_string()
}

fn default_queued_message() -> String {
    "Operation queued.".to_string()
}

fn default_destroyed_message() -> String {
    "destroyed".to_string()
}

fn default_job_capacity() -> usize {
    1024
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is inferred from the binary name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(default_service_name);

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut defaults = Config::default();
        defaults.service.name = service_name.to_string();
        let mut figment = Figment::new().merge(Serialized::defaults(defaults));

        // Lowest priority first so later files override earlier ones
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        let config = figment.merge(Self::env()).extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the XDG and system directories. Environment variables still
    /// override the file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Self::env())
            .extract()?;

        Ok(config)
    }

    fn env() -> Env {
        Env::prefixed("ACTON_").split("__")
    }

    /// Candidate config files, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_PREFIX);
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Some(path) = xdg_dirs.find_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(CONFIG_PREFIX)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}
