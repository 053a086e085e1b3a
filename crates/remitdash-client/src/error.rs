//! Error types for remitdash-client

use remitdash_core::CoreError;
use thiserror::Error;

/// Failures talking to the transactions API or the session file
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection refused, DNS failure, timeout
    #[error("Request failed: {0}")]
    RequestError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    LoginFailed(String),

    #[error("HTTP {0}: {1}")]
    HttpError(u16, String),

    #[error("Failed to parse response: {0}")]
    DeserializationError(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl From<ClientError> for CoreError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::RequestError(message) => CoreError::Unreachable { message },
            ClientError::Unauthorized(_) => CoreError::Unauthorized,
            ClientError::Forbidden(message) => CoreError::Forbidden { message },
            ClientError::LoginFailed(message) => CoreError::LoginFailed { message },
            ClientError::HttpError(status, message) => CoreError::Upstream { status, message },
            ClientError::DeserializationError(message) => CoreError::InvalidFormat { message },
            ClientError::InvalidHeader(message) => CoreError::InternalError { message },
            ClientError::Storage(message) => CoreError::SessionError { message },
        }
    }
}
