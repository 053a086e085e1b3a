//! Transactions API client

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use remitdash_config::ApiConfig;
use remitdash_core::{AuditLog, Session, Transaction, User};

use crate::error::ClientError;

const LOGIN_FAILED: &str = "Login failed";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Body returned by `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Option<User>,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Session::new(response.token, response.user)
    }
}

/// HTTP client for login, transactions and audit logs
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: HttpClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        Self::with_base_url(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::RequestError(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn create_headers(token: &str) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    /// `message` field of a JSON error body, if any
    fn error_message(body: &str) -> Option<String> {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .get("message")?
            .as_str()
            .map(str::to_string)
    }

    async fn handle_error_response(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = Self::error_message(&body).unwrap_or(body);

        match status {
            401 => ClientError::Unauthorized(message),
            403 => ClientError::Forbidden(message),
            500..=599 => {
                log::warn!("Server error {}: {}", status, message);
                ClientError::HttpError(status, message)
            }
            _ => ClientError::HttpError(status, message),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        log::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .headers(Self::create_headers(token)?)
            .send()
            .await
            .map_err(|e| ClientError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::DeserializationError(e.to_string()))
    }

    /// POST /auth/login
    ///
    /// A rejected login carries the server's `message`, or "Login failed".
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let url = self.url("auth/login");
        log::debug!("POST {} as {}", url, email);

        let response = self
            .http_client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| ClientError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            log::info!("Login rejected for {} with status {}", email, status);
            let message = Self::error_message(&body).unwrap_or_else(|| LOGIN_FAILED.to_string());
            return Err(ClientError::LoginFailed(message));
        }

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| ClientError::DeserializationError(e.to_string()))
    }

    /// GET /transactions/mine
    pub async fn fetch_transactions(&self, token: &str) -> Result<Vec<Transaction>, ClientError> {
        self.get_json("transactions/mine", token).await
    }

    /// GET /audit-logs
    pub async fn fetch_audit_logs(&self, token: &str) -> Result<Vec<AuditLog>, ClientError> {
        self.get_json("audit-logs", token).await
    }
}
