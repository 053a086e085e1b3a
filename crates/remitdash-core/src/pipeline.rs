//! Filter pipeline: role scope AND every active attribute filter
//!
//! The output keeps the input order. Scope is checked first and evaluation
//! stops at the first rejecting predicate.

use crate::filters::RecordFilter;
use crate::scope::{ScopeContext, Scoped};
use crate::types::Role;

/// Whether a single record survives the pipeline
pub fn passes<R, F>(record: &R, role: &Role, ctx: &ScopeContext, filters: &F) -> bool
where
    R: Scoped,
    F: RecordFilter<R>,
{
    record.visible_to(role, ctx) && filters.accepts(record)
}

/// `apply(records, role, filters)`: stable filter over a snapshot
pub fn apply<R, F>(records: &[R], role: &Role, ctx: &ScopeContext, filters: &F) -> Vec<R>
where
    R: Scoped + Clone,
    F: RecordFilter<R>,
{
    if !role.is_recognized() {
        log::debug!("Denying all records to unrecognized role {}", role);
        return Vec::new();
    }

    records
        .iter()
        .filter(|record| passes(*record, role, ctx, filters))
        .cloned()
        .collect()
}

/// Records visible to the role before any attribute filter
pub fn scoped<R>(records: &[R], role: &Role, ctx: &ScopeContext) -> Vec<R>
where
    R: Scoped + Clone,
{
    records
        .iter()
        .filter(|record| record.visible_to(role, ctx))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{AuditLogFilters, TransactionFilters};
    use crate::models::Transaction;
    use crate::test_support::{audit_log, sample_transactions, transaction};
    use crate::types::TransactionStatus;

    fn roles() -> Vec<Role> {
        vec![
            Role::GlobalAdmin,
            Role::RegionalAdmin,
            Role::SendingPartner,
            Role::ReceivingPartner,
            Role::Unrecognized("guest".to_string()),
        ]
    }

    fn mixed_transactions() -> Vec<Transaction> {
        let regions = ["US-East", "EU-West", "APAC", "US-West", "EU-Central"];
        let statuses = [
            TransactionStatus::Approved,
            TransactionStatus::Pending,
            TransactionStatus::Rejected,
        ];
        (0..30)
            .map(|i| {
                let mut tx = transaction(
                    &format!("TXN-{:03}", i),
                    statuses[i % 3],
                    regions[i % 5],
                );
                if i % 4 == 0 {
                    tx.sender = Some(format!("Sender {}", i));
                }
                tx
            })
            .collect()
    }

    #[test]
    fn test_no_filters_yields_role_scoped_subset() {
        let ctx = ScopeContext::new("US");
        let records = mixed_transactions();
        let none = TransactionFilters::default();

        for role in roles() {
            let result = apply(&records, &role, &ctx, &none);
            assert!(result.iter().all(|tx| records.contains(tx)));
            assert!(result.iter().all(|tx| tx.visible_to(&role, &ctx)));
            assert_eq!(result, scoped(&records, &role, &ctx));
        }
    }

    #[test]
    fn test_receiving_partner_never_sees_non_approved() {
        let ctx = ScopeContext::new("US");
        let result = apply(
            &mixed_transactions(),
            &Role::ReceivingPartner,
            &ctx,
            &TransactionFilters::default(),
        );
        assert!(!result.is_empty());
        assert!(result.iter().all(|tx| tx.status == TransactionStatus::Approved));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let ctx = ScopeContext::new("US").with_own_domain("acme.io");
        let records = mixed_transactions();
        let filter_sets = vec![
            TransactionFilters::default(),
            TransactionFilters::default().with_status(TransactionStatus::Pending),
            TransactionFilters::default().with_region("US-West").with_search("txn-0"),
            TransactionFilters::default().with_search("sender"),
        ];

        for role in roles() {
            for filters in &filter_sets {
                let once = apply(&records, &role, &ctx, filters);
                let twice = apply(&once, &role, &ctx, filters);
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_output_preserves_input_order() {
        let ctx = ScopeContext::new("US");
        let records = mixed_transactions();
        let result = apply(&records, &Role::SendingPartner, &ctx, &TransactionFilters::default());

        let positions: Vec<usize> = result
            .iter()
            .map(|tx| records.iter().position(|r| r.id == tx.id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_regional_admin_sample_regions() {
        let ctx = ScopeContext::new("US");
        let records: Vec<Transaction> = ["US-East", "EU-West", "APAC", "US-West", "EU-Central"]
            .iter()
            .enumerate()
            .map(|(i, region)| transaction(&format!("T{}", i), TransactionStatus::Pending, region))
            .collect();

        let result = apply(&records, &Role::RegionalAdmin, &ctx, &TransactionFilters::default());
        let regions: Vec<&str> = result.iter().map(|tx| tx.region.as_str()).collect();
        assert_eq!(regions, vec!["US-East", "US-West"]);

        let narrowed = apply(
            &records,
            &Role::RegionalAdmin,
            &ctx,
            &TransactionFilters::default().with_region("EU-West"),
        );
        assert!(narrowed.is_empty());
    }

    #[test]
    fn test_receiving_partner_sample() {
        let ctx = ScopeContext::new("US");
        let result = apply(
            &sample_transactions(),
            &Role::ReceivingPartner,
            &ctx,
            &TransactionFilters::default(),
        );
        let ids: Vec<&str> = result.iter().map(|tx| tx.id.as_str()).collect();
        assert_eq!(ids, vec!["TXN-001", "TXN-004"]);
    }

    #[test]
    fn test_scope_and_attribute_filters_combine() {
        let ctx = ScopeContext::new("US");
        let filters = TransactionFilters::default().with_status(TransactionStatus::Rejected);
        let result = apply(&sample_transactions(), &Role::SendingPartner, &ctx, &filters);
        assert!(result.is_empty());
    }

    #[test]
    fn test_audit_pipeline() {
        let ctx = ScopeContext::new("US").with_own_domain("fintech.com");
        let logs = vec![
            audit_log("L1", "john.doe@fintech.com", "Transaction Approved", Some("US-East")),
            audit_log("L2", "admin@other.org", "User Role Updated", None),
            audit_log("L3", "partner@fintech.com", "Failed Login Attempt", None),
        ];

        let mine = apply(&logs, &Role::SendingPartner, &ctx, &AuditLogFilters::default());
        assert_eq!(mine.len(), 2);

        let logins = apply(
            &logs,
            &Role::SendingPartner,
            &ctx,
            &AuditLogFilters::default().with_action("login"),
        );
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].id, "L3");

        let denied = apply(&logs, &Role::parse("intern"), &ctx, &AuditLogFilters::default());
        assert!(denied.is_empty());
    }
}
