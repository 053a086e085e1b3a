//! Transactions page rendering - Full page endpoint
//!
//! Endpoints:
//! - page_transactions: Main transactions page with filter bar
//!
//! Helper functions:
//! - render_transactions_content: Table plus pagination, shared with the partial
//! - render_transaction_table: Table with role-dependent columns
//! - render_rate_card: USD to USDC rate over the visible records
//! - status_badge: Colored status label

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use std::collections::HashMap;

use rust_decimal::Decimal;

use remitdash_core::{Transaction, TransactionFilters, TransactionStatus, TransactionView};
use remitdash_utils::{escape_html, format_number};

use crate::{
    error_banner, format_timestamp, is_htmx_request, page_response, pagination_controls,
    reload_script, require_session, requested_page, select_options, sync_snapshot,
    validation_status, ApiError, AppState, SnapshotKind,
};

const LIST_PATH: &str = "/transactions/list";
const TARGET: &str = "#transactions-content";

/// Transactions page - Fetches a fresh snapshot and renders filters and table
pub async fn page_transactions(
    state: axum::extract::State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let htmx = is_htmx_request(&headers);
    let session = require_session(&state, &headers).await?;

    let (filters, status, mut banner) = match TransactionFilters::from_params(&params) {
        Ok(filters) => (filters, StatusCode::OK, String::new()),
        Err(e) => (TransactionFilters::default(), validation_status(&headers), error_banner(&e)),
    };

    banner.push_str(&sync_snapshot(&state, &session, SnapshotKind::Transactions, true, htmx).await?);

    let dashboard = state.dashboard.read().await;
    let view = dashboard.transaction_view(&session, &filters, requested_page(&params));
    let updated = dashboard
        .transactions_fetched_at()
        .map(|at| format!("Updated {}", format_timestamp(Some(at), "")))
        .unwrap_or_default();
    drop(dashboard);

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-4'>
            <div>
                <h2 class='text-2xl font-bold'>Transactions</h2>
                <p class='text-sm text-gray-500'>{}</p>
            </div>
            <button onclick='reloadDashboard()' class='px-4 py-2 bg-gray-100 text-gray-700 rounded-lg hover:bg-gray-200' title='Fetch the latest records'>
                Reload
            </button>
        </div>
        {}
        {}
        {}
        <div id='transactions-content' class='bg-white rounded-xl shadow-sm p-6'>
            {}
        </div>
        {}"#,
        updated,
        banner,
        render_rate_card(&view),
        render_filter_bar(&view, &filters, state.config.dashboard.search_debounce_ms),
        render_transactions_content(&view, &filters, state.config.dashboard.page_window),
        reload_script()
    );

    let html = page_response(&headers, "Transactions", "/transactions", &session, &inner_content);
    Ok((status, Html(html)).into_response())
}

/// Status, region and search inputs; every change reloads the first page
fn render_filter_bar(view: &TransactionView, filters: &TransactionFilters, debounce_ms: u64) -> String {
    let status_selected = filters.status.value().map(|s| s.to_string());
    let statuses = TransactionStatus::ALL.iter().map(|s| s.to_string());

    format!(
        r#"<form id='transaction-filters' class='flex flex-wrap gap-3 mb-4' onsubmit='return false'>
            <input type='text' name='q' value='{}' placeholder='Search by ID, sender or receiver...'
                hx-get='{}' hx-target='{}' hx-include='#transaction-filters' hx-trigger='keyup changed delay:{}ms'
                class='px-4 py-2 border rounded-lg w-72'>
            <select name='status' hx-get='{}' hx-target='{}' hx-include='#transaction-filters' hx-trigger='change'
                class='px-4 py-2 border rounded-lg'>{}</select>
            <select name='region' hx-get='{}' hx-target='{}' hx-include='#transaction-filters' hx-trigger='change'
                class='px-4 py-2 border rounded-lg'>{}</select>
        </form>"#,
        escape_html(&filters.search),
        LIST_PATH,
        TARGET,
        debounce_ms,
        LIST_PATH,
        TARGET,
        select_options(statuses, status_selected.as_deref()),
        LIST_PATH,
        TARGET,
        select_options(view.regions.iter().cloned(), filters.region.value().map(String::as_str)),
    )
}

/// Conversion rate card; omitted until there is something to average
pub fn render_rate_card(view: &TransactionView) -> String {
    match view.rate {
        Some(rate) => format!(
            r#"<div class='bg-white rounded-xl shadow-sm p-4 mb-4 w-64'>
            <p class='text-sm text-gray-500'>USD to USDC Rate</p>
            <p class='text-2xl font-bold text-indigo-600'>{:.4}</p>
            <p class='text-xs text-gray-400'>Across {} transactions</p>
        </div>"#,
            rate, view.rate_basis
        ),
        None => String::new(),
    }
}

/// Dollar amount with two decimals and thousands separators
fn format_usd(amount: Decimal) -> String {
    format!("${}", format_number(&format!("{:.2}", amount)))
}

/// Table and pagination controls for one view
pub fn render_transactions_content(
    view: &TransactionView,
    filters: &TransactionFilters,
    page_window: usize,
) -> String {
    if !view.loaded {
        return "<p class='text-gray-500 text-center py-8'>Transactions have not been loaded yet.</p>"
            .to_string();
    }
    if view.page.is_empty() {
        return "<p class='text-gray-500 text-center py-8'>No transactions match the current filters.</p>"
            .to_string();
    }

    format!(
        "{}{}",
        render_transaction_table(&view.page.items, view.show_counterparties),
        pagination_controls(&view.page, LIST_PATH, &filters.to_query(), TARGET, page_window)
    )
}

pub fn status_badge(status: TransactionStatus) -> String {
    let class = match status {
        TransactionStatus::Approved => "bg-green-100 text-green-800",
        TransactionStatus::Pending => "bg-yellow-100 text-yellow-800",
        TransactionStatus::Rejected => "bg-red-100 text-red-800",
    };
    format!(
        "<span class='px-2 py-0.5 rounded-full text-xs font-medium {}'>{}</span>",
        class, status
    )
}

/// Transaction table; sender and receiver columns only for admins
pub fn render_transaction_table(items: &[Transaction], show_counterparties: bool) -> String {
    let counterparty_headers = if show_counterparties {
        "<th class='px-4 py-2'>Sender</th><th class='px-4 py-2'>Receiver</th>"
    } else {
        ""
    };

    let mut rows = String::new();
    for tx in items {
        let counterparties = if show_counterparties {
            format!(
                "<td class='px-4 py-2'>{}</td><td class='px-4 py-2'>{}</td>",
                escape_html(tx.sender.as_deref().unwrap_or("-")),
                escape_html(tx.receiver.as_deref().unwrap_or("-"))
            )
        } else {
            String::new()
        };

        rows.push_str(&format!(
            r#"<tr class='border-t hover:bg-gray-50'>
                <td class='px-4 py-2 font-mono text-sm'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                {}
                <td class='px-4 py-2 text-sm text-gray-500'>{}</td>
            </tr>"#,
            escape_html(&tx.id),
            format_usd(tx.amount_usd),
            format_usd(tx.amount_usdc),
            status_badge(tx.status),
            escape_html(&tx.region),
            counterparties,
            format_timestamp(tx.timestamp_parsed(), &tx.timestamp)
        ));
    }

    format!(
        r#"<table class='w-full text-left'>
            <thead class='text-sm text-gray-500'>
                <tr>
                    <th class='px-4 py-2'>Transaction ID</th>
                    <th class='px-4 py-2'>Amount (USD)</th>
                    <th class='px-4 py-2'>Amount (USDC)</th>
                    <th class='px-4 py-2'>Status</th>
                    <th class='px-4 py-2'>Region</th>
                    {}
                    <th class='px-4 py-2'>Timestamp</th>
                </tr>
            </thead>
            <tbody>{}</tbody>
        </table>"#,
        counterparty_headers, rows
    )
}
