//! Core data models for the dashboard

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{Role, TransactionStatus};

/// Parse an API timestamp: RFC 3339, or `YYYY-MM-DD HH:MM:SS` taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Cross-border transfer as returned by `GET /transactions/mine`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique transaction identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Sending party display name
    #[serde(default)]
    pub sender: Option<String>,
    /// Receiving party display name
    #[serde(default)]
    pub receiver: Option<String>,
    /// Amount sent
    #[serde(rename = "amountUSD")]
    pub amount_usd: Decimal,
    /// Amount delivered after conversion fees
    #[serde(rename = "amountUSDC")]
    pub amount_usdc: Decimal,
    pub status: TransactionStatus,
    /// Free-text region code or name
    pub region: String,
    /// Creation time as sent by the API
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Transaction {
    /// Conversion fee retained between USD and USDC
    pub fn fee(&self) -> Decimal {
        self.amount_usd - self.amount_usdc
    }

    /// Amounts are non-negative and the converted amount never exceeds the source
    pub fn is_consistent(&self) -> bool {
        self.amount_usd >= Decimal::ZERO
            && self.amount_usdc >= Decimal::ZERO
            && self.amount_usdc <= self.amount_usd
    }

    pub fn timestamp_parsed(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    /// Fields matched by free-text search
    pub fn search_fields(&self) -> [Option<&str>; 3] {
        [
            Some(self.id.as_str()),
            self.sender.as_deref(),
            self.receiver.as_deref(),
        ]
    }
}

/// Audit trail entry as returned by `GET /audit-logs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Acting user
    pub user_email: String,
    /// Free-text action category, e.g. "Transaction Approved"
    pub action: String,
    pub timestamp: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl AuditLog {
    pub fn timestamp_parsed(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    pub fn search_fields(&self) -> [Option<&str>; 2] {
        [Some(self.user_email.as_str()), Some(self.action.as_str())]
    }

    /// Domain part of the acting user's email, lowercased
    pub fn user_domain(&self) -> Option<String> {
        email_domain(&self.user_email)
    }
}

/// Signed-in user as returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    /// Role slug, e.g. "regional-admin"
    pub role: String,
    #[serde(default)]
    pub region: String,
}

impl User {
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }

    pub fn email_domain(&self) -> Option<String> {
        email_domain(&self.email)
    }

    /// Name shown in the page header
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            &self.email
        } else {
            &self.username
        }
    }
}

/// Lowercased domain of an email address; `None` when there is no `@domain`
pub fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_transaction_from_api_json() {
        let json = r#"{
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "sender": "John Doe",
            "amountUSD": 1000.00,
            "amountUSDC": 999.80,
            "status": "Approved",
            "region": "US-East",
            "createdAt": "2024-01-15T14:30:00.000Z",
            "timestamp": "2024-01-15T14:30:00.000Z"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(tx.id, "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(tx.sender.as_deref(), Some("John Doe"));
        assert!(tx.receiver.is_none());
        assert_eq!(tx.status, TransactionStatus::Approved);
        assert_eq!(tx.fee(), Decimal::new(20, 2));
        assert!(tx.is_consistent());
        assert_eq!(tx.timestamp_parsed().unwrap().day(), 15);
    }

    #[test]
    fn test_transaction_id_alias() {
        let json = r#"{"id":"TXN-001","amountUSD":10,"amountUSDC":9.5,"status":"Pending","region":"EU-West","timestamp":"2024-01-15 14:30:00"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, "TXN-001");
        assert_eq!(tx.timestamp_parsed().unwrap().hour(), 14);
    }

    #[test]
    fn test_transaction_inconsistent_amounts() {
        let json = r#"{"_id":"T","amountUSD":10,"amountUSDC":11,"status":"Pending","region":"EU","timestamp":"x"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert!(!tx.is_consistent());
        assert!(tx.timestamp_parsed().is_none());
    }

    #[test]
    fn test_audit_log_from_api_json() {
        let json = r#"{
            "_id": "log-1",
            "userEmail": "Partner@FinTech.com",
            "action": "LOGIN",
            "timestamp": "2024-01-15T14:10:00Z"
        }"#;
        let log: AuditLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.user_domain(), Some("fintech.com".to_string()));
        assert!(log.ip.is_none());
        assert!(log.region.is_none());
    }

    #[test]
    fn test_user_role_and_domain() {
        let json = r#"{"_id":"u1","username":"ana","email":"ana@acme.io","role":"partner-sender","region":"EU-West"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role(), Role::SendingPartner);
        assert_eq!(user.email_domain(), Some("acme.io".to_string()));
        assert_eq!(user.display_name(), "ana");
    }

    #[test]
    fn test_email_domain_edge_cases() {
        assert_eq!(email_domain("no-at-sign"), None);
        assert_eq!(email_domain("trailing@"), None);
        assert_eq!(email_domain("a@b@Example.ORG"), Some("example.org".to_string()));
    }
}
