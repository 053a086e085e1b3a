//! Error types for remitdash-core
//!
//! Every failure the dashboard can hit maps to a stable code, a severity and
//! a short message that is safe to show to the signed-in user.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use remitdash_config::error::ConfigError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No records have been fetched yet
    NotLoaded,
    /// Rejected filter or pagination input
    ValidationError,
    /// The records API could not be reached
    Unreachable,
    /// Missing, expired or rejected token
    Unauthorized,
    /// Token valid but access denied
    Forbidden,
    /// Unexpected status from the records API
    UpstreamError,
    /// Response body could not be decoded
    InvalidFormat,
    /// Login rejected by the records API
    LoginFailed,
    /// Session store could not be read or written
    SessionError,
    /// Configuration error
    ConfigError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            ErrorCode::NotLoaded => "NOT_LOADED",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Unreachable => "UNREACHABLE",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::LoginFailed => "LOGIN_FAILED",
            ErrorCode::SessionError => "SESSION_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", code)
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Debug => write!(f, "debug"),
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for remitdash-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Records not loaded")]
    NotLoaded,

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Records API unreachable: {message}")]
    Unreachable { message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access denied: {message}")]
    Forbidden { message: String },

    #[error("Records API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid response format: {message}")]
    InvalidFormat { message: String },

    #[error("{message}")]
    LoginFailed { message: String },

    #[error("Session error: {message}")]
    SessionError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NotLoaded => ErrorCode::NotLoaded,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::Unreachable { .. } => ErrorCode::Unreachable,
            CoreError::Unauthorized => ErrorCode::Unauthorized,
            CoreError::Forbidden { .. } => ErrorCode::Forbidden,
            CoreError::Upstream { .. } => ErrorCode::UpstreamError,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::LoginFailed { .. } => ErrorCode::LoginFailed,
            CoreError::SessionError { .. } => ErrorCode::SessionError,
            CoreError::ConfigError { .. } => ErrorCode::ConfigError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::NotLoaded => ErrorSeverity::Info,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::Unreachable { .. } => ErrorSeverity::Error,
            CoreError::Unauthorized => ErrorSeverity::Warning,
            CoreError::Forbidden { .. } => ErrorSeverity::Warning,
            CoreError::Upstream { .. } => ErrorSeverity::Error,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::LoginFailed { .. } => ErrorSeverity::Info,
            CoreError::SessionError { .. } => ErrorSeverity::Error,
            CoreError::ConfigError { .. } => ErrorSeverity::Critical,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Whether the session must be dropped and the user sent back to login
    pub fn requires_login(&self) -> bool {
        matches!(self, CoreError::Unauthorized)
    }

    /// Short text for the page banner
    pub fn user_message(&self) -> String {
        match self {
            CoreError::NotLoaded => "No records loaded yet.".to_string(),
            CoreError::ValidationError { message } => message.clone(),
            CoreError::Unreachable { .. } => {
                "The records service is offline. Showing the last loaded data.".to_string()
            }
            CoreError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            CoreError::Forbidden { .. } => {
                "Access denied. Your role cannot view these records.".to_string()
            }
            CoreError::Upstream { status, .. } => {
                format!("The records service returned an error ({}).", status)
            }
            CoreError::InvalidFormat { .. } => {
                "The records service sent data that could not be read.".to_string()
            }
            CoreError::LoginFailed { message } => message.clone(),
            CoreError::SessionError { .. } => "Your session could not be loaded.".to_string(),
            CoreError::ConfigError { .. } | CoreError::InternalError { .. } => {
                "Something went wrong.".to_string()
            }
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::ValidationError { message } => {
                details = details
                    .with_detail(serde_json::json!({ "validation_message": message }))
                    .with_suggestion("Use \"All\" or one of Approved, Pending, Rejected for status.");
            }
            CoreError::Unreachable { .. } => {
                details = details
                    .with_suggestion("Check that the records API is running.")
                    .with_suggestion("Verify api.base_url in the configuration file.");
            }
            CoreError::Unauthorized => {
                details = details.with_suggestion("Sign in again at /login.");
            }
            CoreError::Upstream { status, .. } => {
                details = details.with_detail(serde_json::json!({ "status": status }));
            }
            CoreError::InvalidFormat { message } => {
                details = details.with_detail(serde_json::json!({ "decode_message": message }));
            }
            CoreError::SessionError { .. } => {
                details = details.with_suggestion("Check that session.path is writable.");
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<ConfigError> for CoreError {
    fn from(error: ConfigError) -> Self {
        CoreError::ConfigError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::InvalidFormat {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub request_id: Option<String>,
    /// Email of the signed-in user, if any
    pub user: Option<String>,
    pub operation: String,
    pub data: serde_json::Value,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: None,
            user: None,
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    fn log_warning(&self, message: &str, context: &ErrorContext);
    fn log_debug(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Debug | ErrorSeverity::Info => log::info!(
                target: "remitdash::error",
                "[{}] {} - Operation: {} - Request: {:?}",
                error.code(),
                error,
                context.operation,
                context.request_id
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "remitdash::error",
                "[{}] {} - Operation: {} - Request: {:?}",
                error.code(),
                error,
                context.operation,
                context.request_id
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => log::error!(
                target: "remitdash::error",
                "ERROR [{}] {} - Operation: {} - Request: {:?} - User: {:?}",
                error.code(),
                error.to_details(),
                context.operation,
                context.request_id,
                context.user
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "remitdash::error",
            "WARNING: {} - Operation: {} - Request: {:?}",
            message,
            context.operation,
            context.request_id
        );
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(
            target: "remitdash::error",
            "DEBUG: {} - Operation: {} - Request: {:?}",
            message,
            context.operation,
            context.request_id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::NotLoaded.to_string(), "NOT_LOADED");
        assert_eq!(ErrorCode::Unreachable.to_string(), "UNREACHABLE");
        assert_eq!(ErrorCode::UpstreamError.to_string(), "UPSTREAM_ERROR");
    }

    #[test]
    fn test_error_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::LoginFailed).unwrap();
        assert_eq!(json, "\"LOGIN_FAILED\"");
    }

    #[test]
    fn test_core_error_severity() {
        assert_eq!(CoreError::Unauthorized.severity(), ErrorSeverity::Warning);
        assert_eq!(
            CoreError::Unreachable { message: "refused".into() }.severity(),
            ErrorSeverity::Error
        );
        assert_eq!(
            CoreError::ConfigError { message: "bad".into() }.severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_only_unauthorized_requires_login() {
        assert!(CoreError::Unauthorized.requires_login());
        assert!(!CoreError::Forbidden { message: "no".into() }.requires_login());
        assert!(!CoreError::Upstream { status: 500, message: "boom".into() }.requires_login());
    }

    #[test]
    fn test_user_messages() {
        assert!(CoreError::Forbidden { message: "x".into() }
            .user_message()
            .starts_with("Access denied"));
        assert!(CoreError::Unreachable { message: "x".into() }
            .user_message()
            .contains("offline"));
        assert_eq!(
            CoreError::LoginFailed { message: "Invalid credentials".into() }.user_message(),
            "Invalid credentials"
        );
        assert!(CoreError::Upstream { status: 502, message: "x".into() }
            .user_message()
            .contains("502"));
    }

    #[test]
    fn test_validation_details() {
        let error = CoreError::ValidationError { message: "Unknown status: settled".into() };
        let details = error.to_details();
        assert_eq!(details.code, ErrorCode::ValidationError);
        assert!(details.details.is_some());
        assert!(!details.suggestions.is_empty());
        assert!(details.to_string().contains("settled"));
    }

    #[test]
    fn test_from_config_error() {
        let error: CoreError = ConfigError::MissingField { field: "api.base_url".into() }.into();
        assert_eq!(error.code(), ErrorCode::ConfigError);
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: CoreError = json_err.into();
        assert_eq!(error.code(), ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("fetch_transactions")
            .with_request_id("req-123")
            .with_user("ana@acme.io")
            .with_data("page", serde_json::json!(2));

        assert_eq!(context.operation, "fetch_transactions");
        assert_eq!(context.request_id.as_deref(), Some("req-123"));
        assert_eq!(context.user.as_deref(), Some("ana@acme.io"));
        assert_eq!(context.data["page"], 2);
    }
}
