//! Transactions API client and session persistence
//!
//! - client: login and record fetches with bearer authentication
//! - source: `RecordSource` implementation over the client
//! - store: `SessionStore` implementation over a JSON file

pub mod client;
pub mod error;
pub mod source;
pub mod store;

use std::sync::Arc;

use remitdash_config::SessionConfig;
use remitdash_core::session::MemorySessionStore;
use remitdash_core::SessionStoreRef;

pub use client::{ApiClient, LoginResponse};
pub use error::ClientError;
pub use source::ApiRecordSource;
pub use store::FileSessionStore;

/// File-backed store when a path is configured, in-memory otherwise
pub fn session_store(config: &SessionConfig) -> SessionStoreRef {
    match &config.path {
        Some(path) => {
            log::info!("Persisting session to {}", path.display());
            Arc::new(FileSessionStore::new(path.clone()))
        }
        None => {
            log::info!("Keeping session in memory only");
            Arc::new(MemorySessionStore::new())
        }
    }
}
