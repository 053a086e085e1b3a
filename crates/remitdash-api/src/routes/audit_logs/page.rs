//! Audit log page rendering

use axum::extract::Query;
use axum::http::HeaderMap;
use axum::response::Html;
use std::collections::HashMap;

use remitdash_core::{AuditLog, AuditLogFilters, AuditLogView};
use remitdash_utils::escape_html;

use crate::{
    format_timestamp, is_htmx_request, page_response, pagination_controls, reload_script,
    require_session, requested_page, select_options, sync_snapshot, ApiError, AppState,
    SnapshotKind,
};

const LIST_PATH: &str = "/audit-logs/list";
const TARGET: &str = "#audit-logs-content";

/// Action keywords offered in the filter; matched as substrings
const ACTION_KEYWORDS: [&str; 6] = ["Login", "Create", "Update", "Delete", "Approve", "Reject"];

/// Audit logs page - Fetches a fresh snapshot and renders filters and table
pub async fn page_audit_logs(
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
        true,
        is_htmx_request(&headers),
    )
    .await?;

    let dashboard = state.dashboard.read().await;
    let view = dashboard.audit_log_view(&session, &filters, requested_page(&params));
    let updated = dashboard
        .audit_logs_fetched_at()
        .map(|at| format!("Updated {}", format_timestamp(Some(at), "")))
        .unwrap_or_default();
    drop(dashboard);

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-4'>
            <div>
                <h2 class='text-2xl font-bold'>Audit Logs</h2>
                <p class='text-sm text-gray-500'>{}</p>
            </div>
            <button onclick='reloadDashboard()' class='px-4 py-2 bg-gray-100 text-gray-700 rounded-lg hover:bg-gray-200' title='Fetch the latest records'>
                Reload
            </button>
        </div>
        {}
        {}
        <div id='audit-logs-content' class='bg-white rounded-xl shadow-sm p-6'>
            {}
        </div>
        {}"#,
        updated,
        banner,
        render_filter_bar(&view, &filters, state.config.dashboard.search_debounce_ms),
        render_audit_logs_content(&view, &filters, state.config.dashboard.page_window),
        reload_script()
    );

    Ok(Html(page_response(&headers, "Audit Logs", "/audit-logs", &session, &inner_content)))
}

fn render_filter_bar(view: &AuditLogView, filters: &AuditLogFilters, debounce_ms: u64) -> String {
    let actions = ACTION_KEYWORDS.iter().map(|a| a.to_string());

    format!(
        r#"<form id='audit-log-filters' class='flex flex-wrap gap-3 mb-4' onsubmit='return false'>
            <input type='text' name='q' value='{}' placeholder='Search by user or action...'
                hx-get='{}' hx-target='{}' hx-include='#audit-log-filters' hx-trigger='keyup changed delay:{}ms'
                class='px-4 py-2 border rounded-lg w-72'>
            <select name='user' hx-get='{}' hx-target='{}' hx-include='#audit-log-filters' hx-trigger='change'
                class='px-4 py-2 border rounded-lg'>{}</select>
            <select name='action' hx-get='{}' hx-target='{}' hx-include='#audit-log-filters' hx-trigger='change'
                class='px-4 py-2 border rounded-lg'>{}</select>
        </form>"#,
        escape_html(&filters.search),
        LIST_PATH,
        TARGET,
        debounce_ms,
        LIST_PATH,
        TARGET,
        select_options(view.users.iter().cloned(), filters.user.value().map(String::as_str)),
        LIST_PATH,
        TARGET,
        select_options(actions, filters.action.value().map(String::as_str)),
    )
}

pub fn render_audit_logs_content(view: &AuditLogView, filters: &AuditLogFilters, page_window: usize) -> String {
    if !view.loaded {
        return "<p class='text-gray-500 text-center py-8'>Audit logs have not been loaded yet.</p>"
            .to_string();
    }
    if view.page.is_empty() {
        return "<p class='text-gray-500 text-center py-8'>No audit logs match the current filters.</p>"
            .to_string();
    }

    format!(
        "{}{}",
        render_audit_log_table(&view.page.items),
        pagination_controls(&view.page, LIST_PATH, &filters.to_query(), TARGET, page_window)
    )
}

/// Badge color by action keyword
pub fn action_class(action: &str) -> &'static str {
    let action = action.to_lowercase();
    if action.contains("login") {
        "bg-blue-100 text-blue-800"
    } else if action.contains("delete") {
        "bg-red-100 text-red-800"
    } else if action.contains("create") {
        "bg-green-100 text-green-800"
    } else {
        "bg-gray-100 text-gray-800"
    }
}

fn render_audit_log_table(items: &[AuditLog]) -> String {
    let rows: String = items
        .iter()
        .map(|log| {
            format!(
                r#"<tr class='border-t hover:bg-gray-50'>
                <td class='px-4 py-2'><span class='px-2 py-0.5 rounded-full text-xs font-medium {}'>{}</span></td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2 font-mono text-sm'>{}</td>
                <td class='px-4 py-2 text-sm text-gray-500'>{}</td>
            </tr>"#,
                action_class(&log.action),
                escape_html(&log.action),
                escape_html(&log.user_email),
                escape_html(log.region.as_deref().unwrap_or("-")),
                escape_html(log.ip.as_deref().unwrap_or("-")),
                format_timestamp(log.timestamp_parsed(), &log.timestamp)
            )
        })
        .collect();

    format!(
        r#"<table class='w-full text-left'>
            <thead class='text-sm text-gray-500'>
                <tr>
                    <th class='px-4 py-2'>Action</th>
                    <th class='px-4 py-2'>User</th>
                    <th class='px-4 py-2'>Region</th>
                    <th class='px-4 py-2'>IP</th>
                    <th class='px-4 py-2'>Timestamp</th>
                </tr>
            </thead>
            <tbody>{}</tbody>
        </table>"#,
        rows
    )
}
