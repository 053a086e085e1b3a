//! Transactions API - JSON and HTMX endpoints
//!
//! Endpoints:
//! - api_transactions: JSON view of one filtered page
//! - htmx_transactions_list: Table partial for filter and page changes

use axum::extract::Query;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::collections::HashMap;

use remitdash_core::{TransactionFilters, TransactionView};

use super::page::render_transactions_content;
use crate::{
    ensure_snapshot, error_banner, is_htmx_request, require_api_session, require_session,
    requested_page, sync_snapshot, validation_status, ApiError, AppState, SnapshotKind,
};

/// API: Filtered, paginated transactions for the signed-in role
pub async fn api_transactions(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<TransactionView>, ApiError> {
    let session = require_api_session(&state).await?;
    let filters = TransactionFilters::from_params(&params).map_err(|e| ApiError::BadRequest {
        message: e.user_message(),
    })?;
    ensure_snapshot(&state, &session, SnapshotKind::Transactions).await?;

    let dashboard = state.dashboard.read().await;
    Ok(Json(dashboard.transaction_view(&session, &filters, requested_page(&params))))
}

/// HTMX: Transaction table - Returns the table with pagination controls
pub async fn htmx_transactions_list(
    state: axum::extract::State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let htmx = is_htmx_request(&headers);
    let session = require_session(&state, &headers).await?;

    let filters = match TransactionFilters::from_params(&params) {
        Ok(filters) => filters,
        Err(e) => return Ok((validation_status(&headers), Html(error_banner(&e))).into_response()),
    };

    let banner = sync_snapshot(&state, &session, SnapshotKind::Transactions, false, htmx).await?;
    let view = state
        .dashboard
        .read()
        .await
        .transaction_view(&session, &filters, requested_page(&params));

    let html = format!(
        "{}{}",
        banner,
        render_transactions_content(&view, &filters, state.config.dashboard.page_window)
    );
    Ok(Html(html).into_response())
}
