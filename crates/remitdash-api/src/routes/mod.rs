//! Route modules for the dashboard server
//!
//! - auth: Login form and logout
//! - session: Current session (JSON)
//! - transactions: Transaction table, filters, pagination
//! - audit_logs: Audit log table, filters, pagination
//!
//! Table modules share one layout:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API and HTMX partial endpoints
//! - page.rs: Full page rendering

pub mod audit_logs;
pub mod auth;
pub mod session;
pub mod transactions;
