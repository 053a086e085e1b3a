//! HTTP dashboard server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::auth: Login and logout
//! - routes::transactions: Transaction table, filters, pagination
//! - routes::audit_logs: Audit log table, filters, pagination
//! - routes::session: Current session (JSON)

pub mod error;
pub mod routes;

use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

use remitdash_client::ApiClient;
use remitdash_config::Config;
use remitdash_core::session::{clear_session, load_session};
use remitdash_core::{
    refresh_audit_logs, refresh_transactions, CoreError, CoreResult, Page, Session,
    SessionStoreRef, SharedDashboard,
};
use remitdash_utils::escape_html;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: SharedDashboard,
    pub config: Arc<Config>,
    pub sessions: SessionStoreRef,
    pub client: ApiClient,
}

impl AppState {
    pub fn new(
        config: Config,
        dashboard: SharedDashboard,
        sessions: SessionStoreRef,
        client: ApiClient,
    ) -> Self {
        Self {
            dashboard,
            config: Arc::new(config),
            sessions,
            client,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::audit_logs::{api_audit_logs, htmx_audit_logs_list, page_audit_logs};
    use routes::auth::{login_submit, logout, page_login};
    use routes::session::api_session;
    use routes::transactions::{api_transactions, htmx_transactions_list, page_transactions};

    let api = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/session", get(api_session))
        .route("/api/transactions", get(api_transactions))
        .route("/api/audit-logs", get(api_audit_logs))
        .route("/api/reload", post(api_reload));
    let api = match cors_layer(&state.config.server.cors_origins) {
        Some(layer) => api.layer(layer),
        None => api,
    };

    Router::new()
        .route("/", get(index_page))
        .route("/login", get(page_login).post(login_submit))
        .route("/logout", get(logout).post(logout))
        .route("/transactions", get(page_transactions))
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/audit-logs", get(page_audit_logs))
        .route("/audit-logs/list", get(htmx_audit_logs_list))
        .merge(api)
        .with_state(state)
}

/// CORS for the JSON API, limited to the configured origins
///
/// The session is shared by every client of the server, so any origin let
/// in here can read the signed-in user's records.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::POST]),
    )
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn index_page() -> Redirect {
    Redirect::to("/transactions")
}

// ==================== Session Guards ====================

/// Check if request is from HTMX (partial page update)
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Status for a page rendered with a validation banner
///
/// HTMX leaves the target untouched on 4xx, so partial updates get 200.
pub fn validation_status(headers: &HeaderMap) -> StatusCode {
    if is_htmx_request(headers) {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    }
}

/// Stored session for page routes; redirects to login when absent
pub async fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    load_session(state.sessions.as_ref())
        .await?
        .ok_or(ApiError::LoginRequired {
            htmx: is_htmx_request(headers),
        })
}

/// Stored session for JSON routes; 401 when absent
pub async fn require_api_session(state: &AppState) -> Result<Session, ApiError> {
    load_session(state.sessions.as_ref())
        .await?
        .ok_or(ApiError::Unauthorized)
}

/// Drop the stored session and every snapshot fetched with it
pub async fn end_session(state: &AppState) -> Result<(), ApiError> {
    clear_session(state.sessions.as_ref()).await?;
    state.dashboard.write().await.clear();
    Ok(())
}

/// Snapshot a handler renders from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Transactions,
    AuditLogs,
}

impl SnapshotKind {
    fn operation(self) -> &'static str {
        match self {
            SnapshotKind::Transactions => "refresh_transactions",
            SnapshotKind::AuditLogs => "refresh_audit_logs",
        }
    }

    async fn is_loaded(self, state: &AppState, session: &Session) -> bool {
        let dashboard = state.dashboard.read().await;
        match self {
            SnapshotKind::Transactions => dashboard.has_transactions_for(session),
            SnapshotKind::AuditLogs => dashboard.has_audit_logs_for(session),
        }
    }

    async fn refresh(self, state: &AppState, session: &Session) -> CoreResult<usize> {
        match self {
            SnapshotKind::Transactions => refresh_transactions(&state.dashboard, session).await,
            SnapshotKind::AuditLogs => refresh_audit_logs(&state.dashboard, session).await,
        }
    }
}

/// Turn a failed fetch into a page banner
///
/// An expired token ends the session and sends the user back to login.
/// Anything else is logged and shown above the last loaded data.
pub async fn fetch_failure(
    state: &AppState,
    error: CoreError,
    operation: &str,
    htmx: bool,
) -> Result<String, ApiError> {
    if error.requires_login() {
        log::info!("Token rejected during {}, ending session", operation);
        end_session(state).await?;
        return Err(ApiError::LoginRequired { htmx });
    }

    let banner = error_banner(&error);
    ApiError::from(error).log(operation);
    Ok(banner)
}

/// Fetch a snapshot for an HTML view
///
/// Full page loads pass `force`; partial updates only fetch when nothing is
/// loaded yet. Returns the banner to show above the table, empty on success.
pub async fn sync_snapshot(
    state: &AppState,
    session: &Session,
    kind: SnapshotKind,
    force: bool,
    htmx: bool,
) -> Result<String, ApiError> {
    if !force && kind.is_loaded(state, session).await {
        return Ok(String::new());
    }
    match kind.refresh(state, session).await {
        Ok(_) => Ok(String::new()),
        Err(e) => fetch_failure(state, e, kind.operation(), htmx).await,
    }
}

/// Fetch a snapshot for a JSON view when nothing is loaded yet
pub async fn ensure_snapshot(
    state: &AppState,
    session: &Session,
    kind: SnapshotKind,
) -> Result<(), ApiError> {
    if kind.is_loaded(state, session).await {
        return Ok(());
    }
    match kind.refresh(state, session).await {
        Ok(_) => Ok(()),
        Err(e) => Err(json_fetch_failure(state, e, kind.operation()).await),
    }
}

/// Reload both snapshots (JSON API)
async fn api_reload(state: axum::extract::State<AppState>) -> Result<Response, ApiError> {
    let session = require_api_session(&state).await?;

    let result = async {
        let transactions = SnapshotKind::Transactions.refresh(&state, &session).await?;
        let audit_logs = SnapshotKind::AuditLogs.refresh(&state, &session).await?;
        Ok::<_, CoreError>((transactions, audit_logs))
    }
    .await;

    match result {
        Ok((transactions, audit_logs)) => Ok(Json(serde_json::json!({
            "success": true,
            "transactions": transactions,
            "audit_logs": audit_logs,
        }))
        .into_response()),
        Err(e) => Err(json_fetch_failure(&state, e, "api_reload").await),
    }
}

/// Error for a failed fetch on a JSON route; an expired token also ends the session
async fn json_fetch_failure(state: &AppState, error: CoreError, operation: &str) -> ApiError {
    if error.requires_login() {
        if let Err(e) = end_session(state).await {
            return e.log("end_session");
        }
        return ApiError::Core(error);
    }
    ApiError::Core(error).log(operation)
}

/// Timestamp as shown in tables; unparseable values are shown as sent
pub fn format_timestamp(parsed: Option<DateTime<Utc>>, raw: &str) -> String {
    match parsed {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => escape_html(raw),
    }
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Remitdash</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Navigation sidebar with the signed-in user
pub fn nav_sidebar(current_path: &str, session: &Session) -> String {
    let links = [
        ("/transactions", "Transactions", "💸"),
        ("/audit-logs", "Audit Logs", "🛡️"),
    ];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Remitdash</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, icon) in &links {
        let active_class = if current_path.starts_with(path) {
            "bg-indigo-50 text-indigo-600"
        } else {
            "text-gray-600 hover:bg-gray-50"
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }

    let (name, email) = match &session.user {
        Some(user) => (escape_html(user.display_name()), escape_html(&user.email)),
        None => ("Unknown user".to_string(), String::new()),
    };
    nav.push_str(&format!(
        r#"</ul>
        <div class='p-4 border-t text-sm'>
            <p class='font-medium'>{}</p>
            <p class='text-gray-500 truncate'>{}</p>
            <p class='text-xs text-indigo-600 mt-1'>{}</p>
            <form method='post' action='/logout' class='mt-3'>
                <button type='submit' class='w-full px-3 py-1.5 border rounded-lg hover:bg-gray-50'>Log out</button>
            </form>
        </div></div>"#,
        name,
        email,
        escape_html(&session.role().to_string())
    ));
    nav
}

/// Wrap content for full page or HTMX partial
pub fn page_response(
    headers: &HeaderMap,
    title: &str,
    current_path: &str,
    session: &Session,
    inner_content: &str,
) -> String {
    if is_htmx_request(headers) {
        inner_content.to_string()
    } else {
        base_html(
            title,
            &format!(
                r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
                nav_sidebar(current_path, session),
                inner_content
            ),
        )
    }
}

/// Banner for a failed fetch; offline and access denied look different
pub fn error_banner(error: &CoreError) -> String {
    let class = match error {
        CoreError::Unreachable { .. } => "bg-amber-50 border-amber-200 text-amber-800",
        CoreError::Forbidden { .. } => "bg-red-50 border-red-200 text-red-800",
        _ => "bg-gray-50 border-gray-200 text-gray-800",
    };
    format!(
        "<div class='mb-4 p-3 rounded-lg border {}' role='alert'>{}</div>",
        class,
        escape_html(&error.user_message())
    )
}

/// Client-side call to `POST /api/reload`, shared by both table pages
pub fn reload_script() -> &'static str {
    r#"<script>
        function reloadDashboard() {
            fetch('/api/reload', {method: 'POST'})
                .then(r => {
                    if (r.status === 401) { window.location.href = '/login'; return null; }
                    return r.json();
                })
                .then(data => {
                    if (!data) return;
                    if (data.success) {
                        window.location.reload();
                    } else {
                        alert('Reload failed: ' + data.error.message);
                    }
                })
                .catch(e => alert('Reload failed: ' + e));
        }
        </script>"#
}

/// `<option>` list with a leading "All" entry
pub fn select_options(values: impl IntoIterator<Item = String>, selected: Option<&str>) -> String {
    let mut html = format!(
        "<option value='All'{}>All</option>",
        if selected.is_none() { " selected" } else { "" }
    );
    for value in values {
        let escaped = escape_html(&value);
        let mark = if selected == Some(value.as_str()) { " selected" } else { "" };
        html.push_str(&format!("<option value='{}'{}>{}</option>", escaped, mark, escaped));
    }
    html
}

/// Requested page number; anything unparseable means the first page
pub fn requested_page(params: &std::collections::HashMap<String, String>) -> usize {
    params
        .get("page")
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(1)
}

/// Previous/next links plus a window of page numbers, or nothing for a single page
pub fn pagination_controls<T>(
    page: &Page<T>,
    list_path: &str,
    query: &str,
    target: &str,
    window: usize,
) -> String {
    if !page.has_controls() {
        return String::new();
    }

    let link = |index: usize, label: &str, active: bool| {
        let class = if active {
            "px-3 py-1 border rounded bg-indigo-600 text-white"
        } else {
            "px-3 py-1 border rounded hover:bg-gray-100"
        };
        format!(
            r#"<button hx-get='{}?{}&page={}' hx-target='{}' class='{}'>{}</button>"#,
            list_path, query, index, target, class, label
        )
    };

    let mut html = String::from("<div class='mt-6 flex items-center justify-between flex-wrap gap-4'>");
    html.push_str(&format!(
        "<span class='text-sm text-gray-500'>{} records, page {} of {}</span><div class='flex items-center gap-2'>",
        page.total_count, page.page_index, page.total_pages
    ));

    match page.previous_page() {
        Some(prev) => html.push_str(&link(prev, "Previous", false)),
        None => html.push_str("<button disabled class='px-3 py-1 border rounded text-gray-300'>Previous</button>"),
    }
    for index in page.page_numbers(window) {
        html.push_str(&link(index, &index.to_string(), index == page.page_index));
    }
    match page.next_page() {
        Some(next) => html.push_str(&link(next, "Next", false)),
        None => html.push_str("<button disabled class='px-3 py-1 border rounded text-gray-300'>Next</button>"),
    }

    html.push_str("</div></div>");
    html
}

/// Start the HTTP server
///
/// Creates the router, binds to the configured address and serves until
/// Ctrl-C is received.
pub async fn start_server(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config.bind_address();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Remitdash on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /login (Sign in)");
    log::info!("  - /transactions (Transaction table)");
    log::info!("  - /audit-logs (Audit log table)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}


#[cfg(test)]
mod tests {
    use super::test_support::{get, get_htmx, send, state};
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use remitdash_core::Paginator;

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = get(state(None).await, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_index_redirects_to_transactions() {
        let (status, headers, _) = get(state(None).await, "/").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers["location"], "/transactions");
    }

    #[tokio::test]
    async fn test_pages_require_login() {
        for uri in ["/transactions", "/audit-logs", "/transactions/list"] {
            let (status, headers, _) = get(state(None).await, uri).await;
            assert_eq!(status, StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(headers["location"], "/login");
        }

        let (status, headers, _) = get_htmx(state(None).await, "/audit-logs/list").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["hx-redirect"], "/login");
    }

    #[tokio::test]
    async fn test_json_routes_answer_401() {
        for uri in ["/api/transactions", "/api/audit-logs", "/api/session"] {
            let (status, _, body) = get(state(None).await, uri).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
            assert!(body.contains("UNAUTHORIZED"));
        }
    }

    #[tokio::test]
    async fn test_reload_counts_records() {
        let request = Request::post("/api/reload").body(Body::empty()).unwrap();
        let (status, _, body) = send(state(Some("global-admin")).await, request).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["transactions"], 7);
        assert_eq!(json["audit_logs"], 4);
    }

    fn cross_origin_get(uri: &str, origin: &str) -> Request<Body> {
        Request::get(uri).header("origin", origin).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_foreign_origin_gets_no_cors_header() {
        let request = cross_origin_get("/api/transactions", "https://evil.example");
        let (status, headers, _) = send(state(Some("global-admin")).await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers.get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_configured_origin_is_allowed() {
        let mut app = state(Some("global-admin")).await;
        let mut config = (*app.config).clone();
        config.server.cors_origins = vec!["https://ops.acme.io".to_string(), "bad\norigin".to_string()];
        app.config = Arc::new(config);

        let request = cross_origin_get("/api/transactions", "https://ops.acme.io");
        let (_, headers, _) = send(app.clone(), request).await;
        assert_eq!(headers["access-control-allow-origin"], "https://ops.acme.io");

        let request = cross_origin_get("/api/transactions", "https://evil.example");
        let (_, headers, _) = send(app, request).await;
        assert!(headers.get("access-control-allow-origin").is_none());
    }

    #[test]
    fn test_pagination_controls_hidden_for_single_page() {
        let page = Paginator::new(5).unwrap().paginate(&[1, 2, 3], 1);
        assert!(pagination_controls(&page, "/transactions/list", "q=", "#t", 5).is_empty());
    }

    #[test]
    fn test_pagination_controls_links() {
        let records: Vec<u32> = (0..12).collect();
        let page = Paginator::new(5).unwrap().paginate(&records, 2);
        let html = pagination_controls(&page, "/transactions/list", "status=All", "#t", 5);
        assert!(html.contains("/transactions/list?status=All&page=1"));
        assert!(html.contains("/transactions/list?status=All&page=3"));
        assert!(html.contains("page 2 of 3"));
    }

    #[test]
    fn test_requested_page() {
        let mut params = std::collections::HashMap::new();
        assert_eq!(requested_page(&params), 1);
        params.insert("page".to_string(), "4".to_string());
        assert_eq!(requested_page(&params), 4);
        params.insert("page".to_string(), "-2".to_string());
        assert_eq!(requested_page(&params), 1);
    }

    #[test]
    fn test_error_banners_differ() {
        let offline = error_banner(&CoreError::Unreachable { message: "x".into() });
        let denied = error_banner(&CoreError::Forbidden { message: "x".into() });
        assert!(offline.contains("offline"));
        assert!(denied.contains("Access denied"));
        assert_ne!(offline, denied);
    }
}
