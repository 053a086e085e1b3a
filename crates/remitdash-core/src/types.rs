//! Basic types for the core dashboard module

use serde::{Deserialize, Serialize};

/// Transaction status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Awaiting a decision
    Pending,
    /// Accepted (terminal)
    Approved,
    /// Declined (terminal)
    Rejected,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 3] = [
        TransactionStatus::Pending,
        TransactionStatus::Approved,
        TransactionStatus::Rejected,
    ];

    /// Approved and Rejected never change again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "approved" => Ok(TransactionStatus::Approved),
            "rejected" => Ok(TransactionStatus::Rejected),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "Pending"),
            TransactionStatus::Approved => write!(f, "Approved"),
            TransactionStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Session role
///
/// Parsing never fails: anything outside the four known roles is kept as
/// `Unrecognized` and is denied every record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    GlobalAdmin,
    RegionalAdmin,
    SendingPartner,
    ReceivingPartner,
    Unrecognized(String),
}

impl Role {
    /// Parse a display name ("Regional Admin") or an API slug ("regional-admin")
    pub fn parse(raw: &str) -> Role {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();

        match normalized.as_str() {
            "global-admin" => Role::GlobalAdmin,
            "regional-admin" => Role::RegionalAdmin,
            "sending-partner" | "partner-sender" => Role::SendingPartner,
            "receiving-partner" | "partner-receiver" => Role::ReceivingPartner,
            _ => Role::Unrecognized(raw.to_string()),
        }
    }

    /// Whether the sender and receiver columns are shown
    pub fn sees_counterparties(&self) -> bool {
        matches!(self, Role::GlobalAdmin | Role::RegionalAdmin)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Role::Unrecognized(_))
    }

    pub fn is_partner(&self) -> bool {
        matches!(self, Role::SendingPartner | Role::ReceivingPartner)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::GlobalAdmin => write!(f, "Global Admin"),
            Role::RegionalAdmin => write!(f, "Regional Admin"),
            Role::SendingPartner => write!(f, "Sending Partner"),
            Role::ReceivingPartner => write!(f, "Receiving Partner"),
            Role::Unrecognized(raw) => write!(f, "Unrecognized ({})", raw),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Wildcard-aware filter value
///
/// `All` switches the attribute filter off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T> Selection<T> {
    /// The wildcard sentinel as it appears in query strings
    pub const WILDCARD: &'static str = "All";

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }

    /// Evaluate the predicate only when the filter is active
    pub fn accepts(&self, predicate: impl FnOnce(&T) -> bool) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(v) => predicate(v),
        }
    }
}

impl<T: std::str::FromStr> Selection<T> {
    /// Parse an optional raw value; absent, empty and "All" mean no filter
    pub fn parse(raw: Option<&str>) -> Result<Self, T::Err> {
        match raw.map(str::trim) {
            None => Ok(Selection::All),
            Some(v) if v.is_empty() || v.eq_ignore_ascii_case(Self::WILDCARD) => Ok(Selection::All),
            Some(v) => v.parse().map(Selection::Only),
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::All => write!(f, "{}", Self::WILDCARD),
            Selection::Only(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_display_names() {
        assert_eq!(Role::parse("Global Admin"), Role::GlobalAdmin);
        assert_eq!(Role::parse("Regional Admin"), Role::RegionalAdmin);
        assert_eq!(Role::parse("Sending Partner"), Role::SendingPartner);
        assert_eq!(Role::parse("Receiving Partner"), Role::ReceivingPartner);
    }

    #[test]
    fn test_role_parse_slugs() {
        assert_eq!(Role::parse("global-admin"), Role::GlobalAdmin);
        assert_eq!(Role::parse("regional-admin"), Role::RegionalAdmin);
        assert_eq!(Role::parse("partner-sender"), Role::SendingPartner);
        assert_eq!(Role::parse("PARTNER_RECEIVER"), Role::ReceivingPartner);
    }

    #[test]
    fn test_role_parse_unrecognized() {
        let role = Role::parse("superuser");
        assert_eq!(role, Role::Unrecognized("superuser".to_string()));
        assert!(!role.is_recognized());
        assert!(!role.sees_counterparties());
    }

    #[test]
    fn test_role_columns() {
        assert!(Role::GlobalAdmin.sees_counterparties());
        assert!(Role::RegionalAdmin.sees_counterparties());
        assert!(!Role::SendingPartner.sees_counterparties());
        assert!(!Role::ReceivingPartner.sees_counterparties());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("approved".parse::<TransactionStatus>().unwrap(), TransactionStatus::Approved);
        assert_eq!("Pending".parse::<TransactionStatus>().unwrap(), TransactionStatus::Pending);
        assert_eq!("REJECTED".parse::<TransactionStatus>().unwrap(), TransactionStatus::Rejected);
        assert!("cancelled".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn test_status_terminal() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Approved.is_terminal());
        assert!(TransactionStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_selection_parse() {
        assert_eq!(Selection::<TransactionStatus>::parse(None).unwrap(), Selection::All);
        assert_eq!(Selection::<TransactionStatus>::parse(Some("All")).unwrap(), Selection::All);
        assert_eq!(Selection::<TransactionStatus>::parse(Some("all")).unwrap(), Selection::All);
        assert_eq!(Selection::<TransactionStatus>::parse(Some(" ")).unwrap(), Selection::All);
        assert_eq!(
            Selection::<TransactionStatus>::parse(Some("approved")).unwrap(),
            Selection::Only(TransactionStatus::Approved)
        );
        assert!(Selection::<TransactionStatus>::parse(Some("unknown")).is_err());
    }

    #[test]
    fn test_selection_accepts() {
        let all: Selection<String> = Selection::All;
        assert!(all.accepts(|_| false));

        let only = Selection::Only("EU-West".to_string());
        assert!(only.accepts(|v| v == "EU-West"));
        assert!(!only.accepts(|v| v == "US-East"));
        assert_eq!(only.to_string(), "EU-West");
        assert_eq!(all.to_string(), "All");
    }
}
