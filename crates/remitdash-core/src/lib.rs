//! Role-scoped record views for the remittance dashboard
//!
//! Records are fetched once per page load into an in-memory snapshot. Role
//! scope, attribute filters and pagination then run synchronously over that
//! snapshot.

pub mod error;
pub mod filters;
pub mod models;
pub mod pagination;
pub mod pipeline;
pub mod scope;
pub mod session;
pub mod source;
pub mod types;

use chrono::{DateTime, Utc};
use remitdash_config::{AccessConfig, Config};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use filters::{AuditLogFilters, RecordFilter, TransactionFilters};
pub use models::{AuditLog, Transaction, User};
pub use pagination::{Page, Paginator};
pub use scope::{includes, ScopeContext, Scoped};
pub use session::{Session, SessionStore, SessionStoreRef};
pub use source::{RecordSource, SourceRef};
pub use types::{Role, Selection, TransactionStatus};

/// Dashboard shared between request handlers
pub type SharedDashboard = Arc<RwLock<Dashboard>>;

/// Records from one fetch, tied to the token they were fetched with
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
    pub records: Vec<R>,
    pub fetched_at: DateTime<Utc>,
    token: String,
}

impl<R> Snapshot<R> {
    fn new(records: Vec<R>, session: &Session) -> Self {
        Self {
            records,
            fetched_at: Utc::now(),
            token: session.token.clone(),
        }
    }

    fn belongs_to(&self, session: &Session) -> bool {
        self.token == session.token
    }
}

/// One page of transactions prepared for rendering
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub role: Role,
    pub page: Page<Transaction>,
    /// Distinct regions among the role-scoped records, first-seen order
    pub regions: Vec<String>,
    /// Sender and receiver columns are shown to admins only
    pub show_counterparties: bool,
    /// USDC received per USD sent across the role-scoped records
    pub rate: Option<Decimal>,
    /// Number of records the rate is computed over
    pub rate_basis: usize,
    /// False until a snapshot has been fetched
    pub loaded: bool,
}

/// One page of audit logs prepared for rendering
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogView {
    pub role: Role,
    pub page: Page<AuditLog>,
    /// Distinct acting users among the role-scoped records, first-seen order
    pub users: Vec<String>,
    pub loaded: bool,
}

/// In-memory snapshot holder producing paginated views
pub struct Dashboard {
    access: AccessConfig,
    transaction_pages: Paginator,
    audit_log_pages: Paginator,
    source: SourceRef,
    transactions: Option<Snapshot<Transaction>>,
    audit_logs: Option<Snapshot<AuditLog>>,
    /// Bumped by `clear` so in-flight refreshes can tell they are stale
    generation: u64,
}

impl Dashboard {
    /// Create an empty dashboard with config and record source
    pub fn new(config: &Config, source: SourceRef) -> CoreResult<Self> {
        Ok(Self {
            access: config.access.clone(),
            transaction_pages: Paginator::new(config.pagination.transactions_per_page)?,
            audit_log_pages: Paginator::new(config.pagination.audit_logs_per_page)?,
            source,
            transactions: None,
            audit_logs: None,
            generation: 0,
        })
    }

    pub fn shared(self) -> SharedDashboard {
        Arc::new(RwLock::new(self))
    }

    pub fn source(&self) -> SourceRef {
        Arc::clone(&self.source)
    }

    /// Scope inputs for the session's user
    pub fn scope_for(&self, session: &Session) -> ScopeContext {
        ScopeContext::for_user(&self.access, session.user.as_ref())
    }

    /// Replace the transaction snapshot
    ///
    /// Records with inconsistent amounts are kept for display.
    pub fn store_transactions(&mut self, session: &Session, records: Vec<Transaction>) {
        for tx in records.iter().filter(|tx| !tx.is_consistent()) {
            log::warn!(
                "Transaction {} has inconsistent amounts: {} USD / {} USDC",
                tx.id, tx.amount_usd, tx.amount_usdc
            );
        }
        log::info!("Stored snapshot of {} transactions", records.len());
        self.transactions = Some(Snapshot::new(records, session));
    }

    pub fn store_audit_logs(&mut self, session: &Session, records: Vec<AuditLog>) {
        log::info!("Stored snapshot of {} audit logs", records.len());
        self.audit_logs = Some(Snapshot::new(records, session));
    }

    /// Drop both snapshots, e.g. on logout
    pub fn clear(&mut self) {
        self.transactions = None;
        self.audit_logs = None;
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a transaction snapshot was fetched with this session's token
    pub fn has_transactions_for(&self, session: &Session) -> bool {
        self.transactions_for(session).is_some()
    }

    pub fn has_audit_logs_for(&self, session: &Session) -> bool {
        self.audit_logs_for(session).is_some()
    }

    fn transactions_for(&self, session: &Session) -> Option<&Snapshot<Transaction>> {
        self.transactions.as_ref().filter(|s| s.belongs_to(session))
    }

    fn audit_logs_for(&self, session: &Session) -> Option<&Snapshot<AuditLog>> {
        self.audit_logs.as_ref().filter(|s| s.belongs_to(session))
    }

    pub fn transactions_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.transactions.as_ref().map(|s| s.fetched_at)
    }

    pub fn audit_logs_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.audit_logs.as_ref().map(|s| s.fetched_at)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.as_ref().map_or(0, |s| s.records.len())
    }

    pub fn audit_log_count(&self) -> usize {
        self.audit_logs.as_ref().map_or(0, |s| s.records.len())
    }

    /// Filtered, paginated transactions for the session
    pub fn transaction_view(
        &self,
        session: &Session,
        filters: &TransactionFilters,
        page: usize,
    ) -> TransactionView {
        let role = session.role();
        let ctx = self.scope_for(session);
        let snapshot = self.transactions_for(session);
        let records = snapshot.map(|s| s.records.as_slice()).unwrap_or_default();

        let scoped = if role.is_recognized() {
            pipeline::scoped(records, &role, &ctx)
        } else {
            Vec::new()
        };
        let regions = distinct(scoped.iter().map(|tx| tx.region.as_str()));
        let filtered = pipeline::apply(records, &role, &ctx, filters);

        TransactionView {
            show_counterparties: role.sees_counterparties(),
            page: self.transaction_pages.paginate(&filtered, page),
            regions,
            rate: conversion_rate(&scoped),
            rate_basis: scoped.len(),
            loaded: snapshot.is_some(),
            role,
        }
    }

    /// Filtered, paginated audit logs for the session
    pub fn audit_log_view(
        &self,
        session: &Session,
        filters: &AuditLogFilters,
        page: usize,
    ) -> AuditLogView {
        let role = session.role();
        let ctx = self.scope_for(session);
        let snapshot = self.audit_logs_for(session);
        let records = snapshot.map(|s| s.records.as_slice()).unwrap_or_default();

        let users = if role.is_recognized() {
            distinct(pipeline::scoped(records, &role, &ctx).iter().map(|log| log.user_email.as_str()))
        } else {
            Vec::new()
        };
        let filtered = pipeline::apply(records, &role, &ctx, filters);

        AuditLogView {
            page: self.audit_log_pages.paginate(&filtered, page),
            users,
            loaded: snapshot.is_some(),
            role,
        }
    }
}

/// Total USDC over total USD; `None` when nothing was sent
fn conversion_rate(records: &[Transaction]) -> Option<Decimal> {
    let usd: Decimal = records.iter().map(|tx| tx.amount_usd).sum();
    let usdc: Decimal = records.iter().map(|tx| tx.amount_usdc).sum();
    usdc.checked_div(usd).map(|rate| rate.round_dp(4))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.iter().any(|v| v == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Fetch a fresh transaction snapshot for the session
///
/// The fetch runs without holding the lock. On failure the previous snapshot
/// is left untouched. Records arriving after a `clear` are discarded and the
/// stored count is 0.
pub async fn refresh_transactions(dashboard: &SharedDashboard, session: &Session) -> CoreResult<usize> {
    let (source, generation) = {
        let d = dashboard.read().await;
        (d.source(), d.generation())
    };
    let records = source.fetch_transactions(session).await?;

    let mut d = dashboard.write().await;
    if d.generation() != generation {
        log::info!("Discarding {} transactions fetched before the session ended", records.len());
        return Ok(0);
    }
    let count = records.len();
    d.store_transactions(session, records);
    Ok(count)
}

/// Fetch a fresh audit log snapshot for the session
pub async fn refresh_audit_logs(dashboard: &SharedDashboard, session: &Session) -> CoreResult<usize> {
    let (source, generation) = {
        let d = dashboard.read().await;
        (d.source(), d.generation())
    };
    let records = source.fetch_audit_logs(session).await?;

    let mut d = dashboard.write().await;
    if d.generation() != generation {
        log::info!("Discarding {} audit logs fetched before the session ended", records.len());
        return Ok(0);
    }
    let count = records.len();
    d.store_audit_logs(session, records);
    Ok(count)
}

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal::Decimal;

    use crate::models::{AuditLog, Transaction, User};
    use crate::types::TransactionStatus;

    pub fn transaction(id: &str, status: TransactionStatus, region: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            sender: None,
            receiver: None,
            amount_usd: Decimal::new(10000, 2),
            amount_usdc: Decimal::new(9980, 2),
            status,
            region: region.to_string(),
            timestamp: "2024-01-15T14:30:00Z".to_string(),
            created_at: None,
        }
    }

    pub fn audit_log(id: &str, email: &str, action: &str, region: Option<&str>) -> AuditLog {
        AuditLog {
            id: id.to_string(),
            user_email: email.to_string(),
            action: action.to_string(),
            timestamp: "2024-01-15T14:10:00Z".to_string(),
            ip: None,
            region: region.map(str::to_string),
        }
    }

    pub fn user(email: &str, role: &str) -> User {
        User {
            id: "u1".to_string(),
            username: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            role: role.to_string(),
            region: String::new(),
        }
    }

    /// Five transactions, two of them Approved
    pub fn sample_transactions() -> Vec<Transaction> {
        let mut records = vec![
            transaction("TXN-001", TransactionStatus::Approved, "US-East"),
            transaction("TXN-002", TransactionStatus::Pending, "EU-West"),
            transaction("TXN-003", TransactionStatus::Rejected, "APAC"),
            transaction("TXN-004", TransactionStatus::Approved, "US-West"),
            transaction("TXN-005", TransactionStatus::Pending, "EU-Central"),
        ];
        records[0].sender = Some("John Doe".to_string());
        records[0].receiver = Some("Maria Garcia".to_string());
        records[1].sender = Some("Jane Smith".to_string());
        records
    }
}
