//! Pluggable remote entry store and authentication.
//!
//! A backend stores each user's entries keyed by `ts` and offers the same
//! upsert / fetch / delete-by-identity / clear-all contract as local storage.
//! Every call needs a [`Session`] obtained from [`AuthProvider::sign_in`].

mod http;
mod memory;

pub use http::HttpRemote;
pub use memory::MemoryRemote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::RemoteError;

/// Signed-in user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque user identity assigned by the backend.
    pub user_id: String,
    pub email: String,
    /// Bearer token presented on every call.
    pub token: String,
}

impl Session {
    /// Fail fast on a session without an identity.
    pub fn ensure_valid(&self) -> Result<(), RemoteError> {
        if self.user_id.is_empty() || self.token.is_empty() {
            return Err(RemoteError::NotAuthenticated);
        }
        Ok(())
    }
}

/// Email/password authentication.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), RemoteError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError>;

    async fn sign_out(&self, session: &Session) -> Result<(), RemoteError>;
}

/// Per-user entry collection keyed by `ts`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upsert every entry by its `ts`.
    async fn upload(&self, session: &Session, entries: &[Entry]) -> Result<(), RemoteError>;

    async fn fetch_all(&self, session: &Session) -> Result<Vec<Entry>, RemoteError>;

    /// Delete one entry. Deleting an absent entry succeeds.
    async fn delete_one(&self, session: &Session, ts: i64) -> Result<(), RemoteError>;

    async fn delete_all(&self, session: &Session) -> Result<(), RemoteError>;
}

/// A full backend: authentication plus storage.
pub trait RemoteBackend: AuthProvider + RemoteStore {}

impl<T: AuthProvider + RemoteStore> RemoteBackend for T {}
