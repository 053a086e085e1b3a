//! Current session (JSON)

use axum::Json;
use serde_json::{json, Value};

use crate::{require_api_session, ApiError, AppState};

/// API: Signed-in user, role and loaded snapshot sizes
///
/// The token itself is never returned.
pub async fn api_session(state: axum::extract::State<AppState>) -> Result<Json<Value>, ApiError> {
    let session = require_api_session(&state).await?;
    let dashboard = state.dashboard.read().await;
    Ok(Json(json!({
        "authenticated": true,
        "user": session.user,
        "role": session.role(),
        "snapshots": {
            "transactions": dashboard.transaction_count(),
            "audit_logs": dashboard.audit_log_count(),
        },
    })))
}
