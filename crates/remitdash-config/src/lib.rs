//! Configuration management for remitdash
//!
//! This module handles loading, validation, and management of
//! remitdash configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Dashboard server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed to read the JSON API cross-origin; none when empty
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:5000/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// JSON file holding the `token` and `user` keys; in-memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Role scoping rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Region prefix visible to regional admins
    #[serde(default = "default_regional_prefix")]
    pub regional_prefix: String,
    /// Fallback home region for regional admins without one
    #[serde(default)]
    pub home_region: Option<String>,
    /// Marker matched against audit log emails for regional admins
    #[serde(default)]
    pub regional_domain: Option<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            regional_prefix: default_regional_prefix(),
            home_region: None,
            regional_domain: None,
        }
    }
}

fn default_regional_prefix() -> String {
    "US".to_string()
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_transactions_per_page")]
    pub transactions_per_page: usize,
    #[serde(default = "default_audit_logs_per_page")]
    pub audit_logs_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            transactions_per_page: default_transactions_per_page(),
            audit_logs_per_page: default_audit_logs_per_page(),
        }
    }
}

fn default_transactions_per_page() -> usize {
    5
}

fn default_audit_logs_per_page() -> usize {
    6
}

/// Rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Delay before a search keystroke triggers a refresh
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    /// Number of page links shown around the current page
    #[serde(default = "default_page_window")]
    pub page_window: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce_ms(),
            page_window: default_page_window(),
        }
    }
}

fn default_search_debounce_ms() -> u64 {
    200
}

fn default_page_window() -> usize {
    5
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError,
        })?;

        Self::from_yaml(&content)
    }

    /// Load configuration, falling back to defaults when the file is absent
    ///
    /// Callers report the fallback themselves, typically once logging is up.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| {
            log::debug!("YAML parse failure: {}", e);
            ConfigError::InvalidYaml
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "api.base_url".to_string(),
            });
        }

        if self.access.regional_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "access.regional_prefix".to_string(),
                reason: "Regional prefix must not be empty".to_string(),
            });
        }

        for (field, size) in [
            ("pagination.transactions_per_page", self.pagination.transactions_per_page),
            ("pagination.audit_logs_per_page", self.pagination.audit_logs_per_page),
        ] {
            if size == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "Page size must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }

    /// The bundled default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the dashboard binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
