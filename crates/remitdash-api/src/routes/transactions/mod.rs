//! Transaction routes - Transaction table, filters, pagination
//!
//! Features:
//! - Role-scoped table with status, region and free-text filters
//! - Sender and receiver columns for admins only
//! - HTMX partial page updates
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{api_transactions, htmx_transactions_list};
pub use page::page_transactions;
