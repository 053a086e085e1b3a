//! Error types for remitdash-api

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use thiserror::Error;

use remitdash_core::error::{DefaultErrorLogger, ErrorContext, ErrorLogger};
use remitdash_core::{CoreError, ErrorCode};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// JSON routes without a stored token
    #[error("Unauthorized")]
    Unauthorized,

    /// Page routes without a stored token
    #[error("Login required")]
    LoginRequired { htmx: bool },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::LoginRequired { .. } => StatusCode::SEE_OTHER,
            ApiError::Core(error) => status_for(error.code()),
        }
    }

    /// Log through the core error logger with the failing operation
    pub fn log(self, operation: &str) -> Self {
        if let ApiError::Core(ref error) = self {
            let context = ErrorContext::new(operation).with_request_id(remitdash_utils::generate_id());
            DefaultErrorLogger.log_error(error, &context);
        }
        self
    }
}

/// HTTP status for a core error code
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized | ErrorCode::LoginFailed => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotLoaded => StatusCode::NOT_FOUND,
        ErrorCode::Unreachable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::UpstreamError | ErrorCode::InvalidFormat => StatusCode::BAD_GATEWAY,
        ErrorCode::SessionError | ErrorCode::ConfigError | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Send the browser to the login page
///
/// HTMX requests get an `HX-Redirect` header so the whole page navigates
/// instead of swapping the login form into a table.
pub fn login_redirect(htmx: bool) -> Response {
    if htmx {
        let mut response = StatusCode::OK.into_response();
        response
            .headers_mut()
            .insert("HX-Redirect", HeaderValue::from_static("/login"));
        response
    } else {
        Redirect::to("/login").into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let details = match &self {
            ApiError::LoginRequired { htmx } => return login_redirect(*htmx),
            ApiError::BadRequest { message } => {
                CoreError::ValidationError { message: message.clone() }.to_details()
            }
            ApiError::Unauthorized => CoreError::Unauthorized.to_details(),
            ApiError::Core(error) => error.to_details(),
        };

        let body = serde_json::json!({ "success": false, "error": details });
        (self.status(), Json(body)).into_response()
    }
}
