//! Audit log routes - Audit trail table, filters, pagination
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{api_audit_logs, htmx_audit_logs_list};
pub use page::page_audit_logs;
