//! Error types for remitdash-config

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid YAML format")]
    InvalidYaml,

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field value: {field} - {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("IO error occurred")]
    IoError,
}

impl ConfigError {
    /// Stable code for log lines
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ConfigError::InvalidYaml => "INVALID_YAML",
            ConfigError::MissingField { .. } => "MISSING_FIELD",
            ConfigError::InvalidValue { .. } => "INVALID_VALUE",
            ConfigError::IoError => "IO_ERROR",
        }
    }

    /// Hints printed next to the error at startup
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            ConfigError::FileNotFound { .. } => vec![
                "Use --config to point at the config file.".to_string(),
                "Run with --print-default-config to get a starting point.".to_string(),
            ],
            ConfigError::InvalidYaml => vec![
                "Check indentation and quoting in the config file.".to_string(),
            ],
            ConfigError::MissingField { field } => vec![format!(
                "Add the '{}' field to your config file.",
                field
            )],
            ConfigError::InvalidValue { reason, .. } => vec![reason.clone()],
            ConfigError::IoError => vec!["Ensure the config file is readable.".to_string()],
        }
    }
}

/// Result type with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
