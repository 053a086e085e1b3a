//! Attribute filters layered on top of role scope
//!
//! Every filter has a wildcard state in which it accepts everything. Search
//! is a case-insensitive substring match; missing optional fields simply do
//! not match.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::models::{AuditLog, Transaction};
use crate::types::{Selection, TransactionStatus};

/// A user-adjustable predicate over one record type
pub trait RecordFilter<R> {
    fn accepts(&self, record: &R) -> bool;

    /// True when no attribute filter is active
    fn is_inactive(&self) -> bool;
}

/// Lowercased search needle; `None` for an empty or blank term
fn search_needle(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Case-insensitive substring match across optional fields
pub fn matches_search<'a>(term: &str, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
    match search_needle(term) {
        None => true,
        Some(needle) => fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle)),
    }
}

/// Filters for the transactions table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilters {
    pub status: Selection<TransactionStatus>,
    /// Exact region match
    pub region: Selection<String>,
    /// Matched against id, sender and receiver
    pub search: String,
}

impl TransactionFilters {
    /// Build from query parameters (`status`, `region`, `q`)
    pub fn from_params(params: &HashMap<String, String>) -> CoreResult<Self> {
        let status = Selection::parse(params.get("status").map(String::as_str))
            .map_err(|message| CoreError::ValidationError { message })?;
        let region = Selection::parse(params.get("region").map(String::as_str))
            .unwrap_or_default();

        Ok(Self {
            status,
            region,
            search: params.get("q").cloned().unwrap_or_default(),
        })
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Selection::Only(status);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Selection::Only(region.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Query string that reproduces these filters (without `page`)
    pub fn to_query(&self) -> String {
        format!(
            "status={}&region={}&q={}",
            urlencoding::encode(&self.status.to_string()),
            urlencoding::encode(&self.region.to_string()),
            urlencoding::encode(&self.search)
        )
    }
}

impl RecordFilter<Transaction> for TransactionFilters {
    fn accepts(&self, tx: &Transaction) -> bool {
        self.status.accepts(|s| tx.status == *s)
            && self.region.accepts(|r| tx.region == *r)
            && matches_search(&self.search, tx.search_fields())
    }

    fn is_inactive(&self) -> bool {
        self.status.is_all() && self.region.is_all() && search_needle(&self.search).is_none()
    }
}

/// Filters for the audit log table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditLogFilters {
    /// Substring of the acting user's email
    pub user: Selection<String>,
    /// Substring of the action, e.g. "transaction" or "login"
    pub action: Selection<String>,
    /// Matched against user email and action
    pub search: String,
}

impl AuditLogFilters {
    /// Build from query parameters (`user`, `action`, `q`)
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            user: Selection::parse(params.get("user").map(String::as_str)).unwrap_or_default(),
            action: Selection::parse(params.get("action").map(String::as_str)).unwrap_or_default(),
            search: params.get("q").cloned().unwrap_or_default(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Selection::Only(user.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Selection::Only(action.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn to_query(&self) -> String {
        format!(
            "user={}&action={}&q={}",
            urlencoding::encode(&self.user.to_string()),
            urlencoding::encode(&self.action.to_string()),
            urlencoding::encode(&self.search)
        )
    }
}

impl RecordFilter<AuditLog> for AuditLogFilters {
    fn accepts(&self, log: &AuditLog) -> bool {
        self.user.accepts(|u| matches_search(u, [Some(log.user_email.as_str())]))
            && self.action.accepts(|a| matches_search(a, [Some(log.action.as_str())]))
            && matches_search(&self.search, log.search_fields())
    }

    fn is_inactive(&self) -> bool {
        self.user.is_all() && self.action.is_all() && search_needle(&self.search).is_none()
    }
}
