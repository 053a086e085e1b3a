//! Record source abstraction

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::CoreResult;
use crate::models::{AuditLog, Transaction};
use crate::session::Session;

/// Supplies raw records for the signed-in session, in server order
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_transactions(&self, session: &Session) -> CoreResult<Vec<Transaction>>;

    async fn fetch_audit_logs(&self, session: &Session) -> CoreResult<Vec<AuditLog>>;
}

/// Record source reference type
pub type SourceRef = Arc<dyn RecordSource>;

/// Fixed in-memory records, used in tests and demos
#[derive(Debug, Clone, Default)]
pub struct StaticRecordSource {
    pub transactions: Vec<Transaction>,
    pub audit_logs: Vec<AuditLog>,
}

impl StaticRecordSource {
    pub fn new(transactions: Vec<Transaction>, audit_logs: Vec<AuditLog>) -> Self {
        Self {
            transactions,
            audit_logs,
        }
    }
}

#[async_trait]
impl RecordSource for StaticRecordSource {
    async fn fetch_transactions(&self, _session: &Session) -> CoreResult<Vec<Transaction>> {
        Ok(self.transactions.clone())
    }

    async fn fetch_audit_logs(&self, _session: &Session) -> CoreResult<Vec<AuditLog>> {
        Ok(self.audit_logs.clone())
    }
}
