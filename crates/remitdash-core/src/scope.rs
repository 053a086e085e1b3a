//! Role scope rules: which records a role may see at all
//!
//! Each role maps to a pure predicate per record type. Unrecognized roles
//! are denied everything.

use remitdash_config::AccessConfig;

use crate::models::{email_domain, AuditLog, Transaction, User};
use crate::types::{Role, TransactionStatus};

/// Inputs the scope rules need beyond the role itself
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScopeContext {
    /// Regions starting with this prefix belong to the regional admin
    pub regional_prefix: String,
    /// Region the regional admin also owns by exact match
    pub home_region: Option<String>,
    /// Marker matched against audit log emails for regional admins
    pub regional_domain: Option<String>,
    /// Email domain of the signed-in user
    pub own_domain: Option<String>,
}

impl ScopeContext {
    pub fn new(regional_prefix: impl Into<String>) -> Self {
        Self {
            regional_prefix: regional_prefix.into(),
            ..Self::default()
        }
    }

    /// Build the context for a signed-in user
    ///
    /// The user's own region wins over the configured fallback home region.
    pub fn for_user(access: &AccessConfig, user: Option<&User>) -> Self {
        let user_region = user
            .map(|u| u.region.trim())
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        Self {
            regional_prefix: access.regional_prefix.clone(),
            home_region: user_region.or_else(|| access.home_region.clone()),
            regional_domain: access.regional_domain.clone(),
            own_domain: user.and_then(User::email_domain),
        }
    }

    pub fn with_home_region(mut self, region: impl Into<String>) -> Self {
        self.home_region = Some(region.into());
        self
    }

    pub fn with_regional_domain(mut self, domain: impl Into<String>) -> Self {
        self.regional_domain = Some(domain.into());
        self
    }

    pub fn with_own_domain(mut self, domain: impl Into<String>) -> Self {
        self.own_domain = Some(domain.into().to_lowercase());
        self
    }

    /// Region rule shared by transactions and audit logs
    pub fn region_in_scope(&self, region: &str) -> bool {
        let prefixed = !self.regional_prefix.is_empty() && region.starts_with(&self.regional_prefix);
        let home = self
            .home_region
            .as_deref()
            .map_or(false, |home| home.eq_ignore_ascii_case(region.trim()));
        prefixed || home
    }

    fn email_in_regional_domain(&self, email: &str) -> bool {
        match self.regional_domain.as_deref() {
            Some(marker) if !marker.is_empty() => {
                email.to_lowercase().contains(&marker.to_lowercase())
            }
            _ => false,
        }
    }

    fn owns_email(&self, email: &str) -> bool {
        match (self.own_domain.as_deref(), email_domain(email)) {
            (Some(own), Some(theirs)) => own == theirs,
            _ => false,
        }
    }
}

/// A record type that role scope rules apply to
pub trait Scoped {
    /// Whether `role` may see this record at all
    fn visible_to(&self, role: &Role, ctx: &ScopeContext) -> bool;
}

impl Scoped for Transaction {
    fn visible_to(&self, role: &Role, ctx: &ScopeContext) -> bool {
        match role {
            Role::GlobalAdmin => true,
            Role::RegionalAdmin => ctx.region_in_scope(&self.region),
            Role::SendingPartner => self.status != TransactionStatus::Rejected,
            Role::ReceivingPartner => self.status == TransactionStatus::Approved,
            Role::Unrecognized(_) => false,
        }
    }
}

impl Scoped for AuditLog {
    fn visible_to(&self, role: &Role, ctx: &ScopeContext) -> bool {
        match role {
            Role::GlobalAdmin => true,
            Role::RegionalAdmin => {
                self.region.as_deref().map_or(false, |r| ctx.region_in_scope(r))
                    || ctx.email_in_regional_domain(&self.user_email)
            }
            Role::SendingPartner | Role::ReceivingPartner => ctx.owns_email(&self.user_email),
            Role::Unrecognized(_) => false,
        }
    }
}

/// `includes(role, record)`: the role scope decision for one record
pub fn includes<R: Scoped>(role: &Role, record: &R, ctx: &ScopeContext) -> bool {
    record.visible_to(role, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{audit_log, transaction};

    fn all_roles() -> Vec<Role> {
        vec![
            Role::GlobalAdmin,
            Role::RegionalAdmin,
            Role::SendingPartner,
            Role::ReceivingPartner,
            Role::Unrecognized("auditor".to_string()),
        ]
    }

    #[test]
    fn test_transaction_rules_per_role() {
        let ctx = ScopeContext::new("US");
        let approved = transaction("T1", TransactionStatus::Approved, "EU-West");
        let pending = transaction("T2", TransactionStatus::Pending, "US-East");
        let rejected = transaction("T3", TransactionStatus::Rejected, "APAC");

        assert!(includes(&Role::GlobalAdmin, &rejected, &ctx));

        assert!(!includes(&Role::RegionalAdmin, &approved, &ctx));
        assert!(includes(&Role::RegionalAdmin, &pending, &ctx));

        assert!(includes(&Role::SendingPartner, &approved, &ctx));
        assert!(includes(&Role::SendingPartner, &pending, &ctx));
        assert!(!includes(&Role::SendingPartner, &rejected, &ctx));

        assert!(includes(&Role::ReceivingPartner, &approved, &ctx));
        assert!(!includes(&Role::ReceivingPartner, &pending, &ctx));
        assert!(!includes(&Role::ReceivingPartner, &rejected, &ctx));
    }

    #[test]
    fn test_unrecognized_role_fails_closed() {
        let ctx = ScopeContext::new("US")
            .with_own_domain("fintech.com")
            .with_regional_domain("regional");
        let role = Role::parse("root");
        let tx = transaction("T1", TransactionStatus::Approved, "US-East");
        let log = audit_log("L1", "root@fintech.com", "Login", Some("US-East"));

        assert!(!includes(&role, &tx, &ctx));
        assert!(!includes(&role, &log, &ctx));
    }

    #[test]
    fn test_regional_home_region_match() {
        let ctx = ScopeContext::new("US").with_home_region("North America");
        let tx = transaction("T1", TransactionStatus::Approved, "north america");
        let other = transaction("T2", TransactionStatus::Approved, "Europe");

        assert!(includes(&Role::RegionalAdmin, &tx, &ctx));
        assert!(!includes(&Role::RegionalAdmin, &other, &ctx));
    }

    #[test]
    fn test_regional_prefix_is_case_sensitive() {
        let ctx = ScopeContext::new("US");
        let tx = transaction("T1", TransactionStatus::Approved, "us-east");
        assert!(!includes(&Role::RegionalAdmin, &tx, &ctx));
    }

    #[test]
    fn test_audit_regional_admin() {
        let ctx = ScopeContext::new("US").with_regional_domain("regional");
        let by_region = audit_log("L1", "ops@fintech.com", "Settings Modified", Some("US-West"));
        let by_email = audit_log("L2", "regional@fintech.com", "Login", None);
        let foreign = audit_log("L3", "admin@fintech.com", "User Role Updated", Some("EU-West"));
        let no_region = audit_log("L4", "system@fintech.com", "Auto-Compliance Check", None);

        assert!(includes(&Role::RegionalAdmin, &by_region, &ctx));
        assert!(includes(&Role::RegionalAdmin, &by_email, &ctx));
        assert!(!includes(&Role::RegionalAdmin, &foreign, &ctx));
        assert!(!includes(&Role::RegionalAdmin, &no_region, &ctx));
    }

    #[test]
    fn test_audit_partner_own_domain_only() {
        let ctx = ScopeContext::new("US").with_own_domain("Acme.io");
        let own = audit_log("L1", "ana@acme.io", "Transaction Created", None);
        let own_upper = audit_log("L2", "Bob@ACME.IO", "Login", None);
        let lookalike = audit_log("L3", "eve@notacme.io", "Login", None);
        let other = audit_log("L4", "admin@fintech.com", "Login", None);

        for role in [Role::SendingPartner, Role::ReceivingPartner] {
            assert!(includes(&role, &own, &ctx));
            assert!(includes(&role, &own_upper, &ctx));
            assert!(!includes(&role, &lookalike, &ctx));
            assert!(!includes(&role, &other, &ctx));
        }
    }

    #[test]
    fn test_audit_partner_without_domain_sees_nothing() {
        let ctx = ScopeContext::new("US");
        let log = audit_log("L1", "ana@acme.io", "Login", None);
        assert!(!includes(&Role::SendingPartner, &log, &ctx));
    }

    #[test]
    fn test_global_admin_sees_all_audit_logs() {
        let ctx = ScopeContext::default();
        let log = audit_log("L1", "anyone@anywhere.org", "Delete", None);
        assert!(includes(&Role::GlobalAdmin, &log, &ctx));
    }

    #[test]
    fn test_for_user_context() {
        let access = AccessConfig {
            regional_prefix: "US".to_string(),
            home_region: Some("North America".to_string()),
            regional_domain: Some("regional".to_string()),
        };
        let user = User {
            id: "u1".to_string(),
            username: "ra".to_string(),
            email: "ra@FinTech.com".to_string(),
            role: "regional-admin".to_string(),
            region: "".to_string(),
        };

        let ctx = ScopeContext::for_user(&access, Some(&user));
        assert_eq!(ctx.home_region.as_deref(), Some("North America"));
        assert_eq!(ctx.own_domain.as_deref(), Some("fintech.com"));

        let with_region = User { region: "LATAM".to_string(), ..user };
        let ctx = ScopeContext::for_user(&access, Some(&with_region));
        assert_eq!(ctx.home_region.as_deref(), Some("LATAM"));

        let anonymous = ScopeContext::for_user(&access, None);
        assert!(anonymous.own_domain.is_none());
    }

    #[test]
    fn test_rules_are_deterministic() {
        let ctx = ScopeContext::new("US").with_own_domain("acme.io");
        let tx = transaction("T1", TransactionStatus::Pending, "US-East");
        for role in all_roles() {
            assert_eq!(includes(&role, &tx, &ctx), includes(&role, &tx, &ctx));
        }
    }
}
