//! Explicit session object and its key-value storage
//!
//! The stored token is the only authentication gate. The user object is kept
//! next to it as JSON under a separate key.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::models::User;
use crate::types::Role;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Signed-in session: opaque bearer token plus the user returned by login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: Option<User>) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// Role of the session; a session without a user gets no access
    pub fn role(&self) -> Role {
        match &self.user {
            Some(user) => user.role(),
            None => Role::Unrecognized(String::new()),
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.email.as_str())
    }
}

/// Key-value storage for the session
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> CoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    async fn remove(&self, key: &str) -> CoreResult<()>;
}

/// Session store reference type
pub type SessionStoreRef = Arc<dyn SessionStore>;

/// Read the stored session, if a token is present
///
/// An unreadable user entry is dropped rather than failing the load; the
/// session then resolves to an unrecognized role.
pub async fn load_session(store: &dyn SessionStore) -> CoreResult<Option<Session>> {
    let token = match store.get(TOKEN_KEY).await? {
        Some(token) if !token.trim().is_empty() => token,
        _ => return Ok(None),
    };

    let user = match store.get(USER_KEY).await? {
        Some(raw) => match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("Stored user is unreadable, ignoring it: {}", e);
                None
            }
        },
        None => None,
    };

    Ok(Some(Session { token, user }))
}

pub async fn save_session(store: &dyn SessionStore, session: &Session) -> CoreResult<()> {
    store.set(TOKEN_KEY, &session.token).await?;
    match &session.user {
        Some(user) => {
            let raw = serde_json::to_string(user).map_err(|e| CoreError::SessionError {
                message: e.to_string(),
            })?;
            store.set(USER_KEY, &raw).await
        }
        None => store.remove(USER_KEY).await,
    }
}

/// Remove both the token and the user
pub async fn clear_session(store: &dyn SessionStore) -> CoreResult<()> {
    store.remove(TOKEN_KEY).await?;
    store.remove(USER_KEY).await
}

/// In-process session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
