//! Record source backed by the transactions API

use async_trait::async_trait;

use remitdash_core::{AuditLog, CoreResult, RecordSource, Session, Transaction};

use crate::client::ApiClient;

/// Fetches records with the session's bearer token
#[derive(Debug, Clone)]
pub struct ApiRecordSource {
    client: ApiClient,
}

impl ApiRecordSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSource for ApiRecordSource {
    async fn fetch_transactions(&self, session: &Session) -> CoreResult<Vec<Transaction>> {
        let records = self.client.fetch_transactions(&session.token).await?;
        log::debug!("Fetched {} transactions", records.len());
        Ok(records)
    }

    async fn fetch_audit_logs(&self, session: &Session) -> CoreResult<Vec<AuditLog>> {
        let records = self.client.fetch_audit_logs(&session.token).await?;
        log::debug!("Fetched {} audit logs", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_upstream::{spawn_upstream, GOOD_TOKEN};
    use remitdash_core::CoreError;
    use std::time::Duration;

    fn source(base: &str) -> ApiRecordSource {
        ApiRecordSource::new(ApiClient::with_base_url(base, Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_through_trait() {
        let base = spawn_upstream().await;
        let session = Session::new(GOOD_TOKEN, None);

        let txs = source(&base).fetch_transactions(&session).await.unwrap();
        assert_eq!(txs.len(), 3);
    }

    #[tokio::test]
    async fn test_errors_map_to_core() {
        let base = spawn_upstream().await;

        let expired = Session::new("expired", None);
        let err = source(&base).fetch_transactions(&expired).await.unwrap_err();
        assert_eq!(err, CoreError::Unauthorized);

        let partner = Session::new("partner-token", None);
        let err = source(&base).fetch_audit_logs(&partner).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
    }
}
