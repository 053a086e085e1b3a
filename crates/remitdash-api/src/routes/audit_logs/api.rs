//! Audit log API - JSON and HTMX endpoints

use axum::extract::Query;
use axum::http::HeaderMap;
use axum::response::Html;
use axum::Json;
use std::collections::HashMap;

use remitdash_core::{AuditLogFilters, AuditLogView};

use super::page::render_audit_logs_content;
use crate::{
    ensure_snapshot, is_htmx_request, require_api_session, require_session, requested_page,
    sync_snapshot, ApiError, AppState, SnapshotKind,
};

/// API: Filtered, paginated audit logs for the signed-in role
pub async fn api_audit_logs(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<AuditLogView>, ApiError> {
    let session = require_api_session(&state).await?;
    let filters = AuditLogFilters::from_params(&params);
    ensure_snapshot(&state, &session, SnapshotKind::AuditLogs).await?;

    let dashboard = state.dashboard.read().await;
    Ok(Json(dashboard.audit_log_view(&session, &filters, requested_page(&params))))
}

/// HTMX: Audit log table
pub async fn htmx_audit_logs_list(
    state: axum::extract::State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let filters = AuditLogFilters::from_params(&params);

    let banner = sync_snapshot(
        &state,
        &session,
        SnapshotKind::AuditLogs,
        false,
        is_htmx_request(&headers),
    )
    .await?;
    let view = state
        .dashboard
        .read()
        .await
        .audit_log_view(&session, &filters, requested_page(&params));

    Ok(Html(format!(
        "{}{}",
        banner,
        render_audit_logs_content(&view, &filters, state.config.dashboard.page_window)
    )))
}
