//! In-process remote backend.
//!
//! Behaves like a real per-user document store, including token checks.
//! Clones share state, so a test can keep a handle while the tracker owns
//! another. `fail_next` and `fail_after` inject a failure to exercise error
//! paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{AuthProvider, RemoteStore, Session};
use crate::entry::Entry;
use crate::error::RemoteError;

#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// email -> (password, user id)
    accounts: HashMap<String, (String, String)>,
    /// token -> user id
    tokens: HashMap<String, String>,
    /// user id -> entries by ts
    entries: HashMap<String, BTreeMap<i64, Entry>>,
    next_id: u64,
    /// Calls to let through, then the failure message.
    fail_next: Option<(usize, String)>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next backend call fail with `message`.
    pub fn fail_next(&self, message: &str) {
        self.fail_after(0, message);
    }

    /// Let `calls` backend calls succeed, then fail the one after with
    /// `message`.
    pub fn fail_after(&self, calls: usize, message: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_next = Some((calls, message.to_string()));
        }
    }

    /// Entries stored for `user_id`, newest first.
    pub fn entries_of(&self, user_id: &str) -> Vec<Entry> {
        self.state
            .lock()
            .map(|state| {
                state
                    .entries
                    .get(user_id)
                    .map(|m| m.values().rev().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Store `entries` for `user_id` directly, bypassing auth.
    pub fn seed(&self, user_id: &str, entries: &[Entry]) {
        if let Ok(mut state) = self.state.lock() {
            let stored = state.entries.entry(user_id.to_string()).or_default();
            for entry in entries {
                stored.insert(entry.ts, entry.clone());
            }
        }
    }

    /// Lock state, consuming a pending injected failure.
    fn begin(&self) -> Result<MutexGuard<'_, MemoryState>, RemoteError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| RemoteError::Backend("memory remote poisoned".into()))?;
        let due = match state.fail_next.as_mut() {
            Some((0, _)) => true,
            Some((calls, _)) => {
                *calls -= 1;
                false
            }
            None => false,
        };
        if due {
            if let Some((_, message)) = state.fail_next.take() {
                return Err(RemoteError::Backend(message));
            }
        }
        Ok(state)
    }

    /// Resolve the session's user id, checking its token.
    fn authorize(state: &MemoryState, session: &Session) -> Result<String, RemoteError> {
        session.ensure_valid()?;
        match state.tokens.get(&session.token) {
            Some(uid) if *uid == session.user_id => Ok(uid.clone()),
            _ => Err(RemoteError::NotAuthenticated),
        }
    }
}

#[async_trait]
impl AuthProvider for MemoryRemote {
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), RemoteError> {
        let mut state = self.begin()?;
        if email.trim().is_empty() || password.is_empty() {
            return Err(RemoteError::AuthFailed("email and password are required".into()));
        }
        if state.accounts.contains_key(email) {
            return Err(RemoteError::AuthFailed(format!("{email} is already registered")));
        }
        state.next_id += 1;
        let user_id = format!("user-{}", state.next_id);
        state
            .accounts
            .insert(email.to_string(), (password.to_string(), user_id));
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let mut state = self.begin()?;
        let user_id = match state.accounts.get(email) {
            Some((stored, user_id)) if stored == password => user_id.clone(),
            _ => return Err(RemoteError::AuthFailed("invalid email or password".into())),
        };
        state.next_id += 1;
        let token = format!("token-{}", state.next_id);
        state.tokens.insert(token.clone(), user_id.clone());
        Ok(Session {
            user_id,
            email: email.to_string(),
            token,
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<(), RemoteError> {
        let mut state = self.begin()?;
        Self::authorize(&state, session)?;
        state.tokens.remove(&session.token);
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn upload(&self, session: &Session, entries: &[Entry]) -> Result<(), RemoteError> {
        let mut state = self.begin()?;
        let uid = Self::authorize(&state, session)?;
        let stored = state.entries.entry(uid).or_default();
        for entry in entries {
            stored.insert(entry.ts, entry.clone());
        }
        Ok(())
    }

    async fn fetch_all(&self, session: &Session) -> Result<Vec<Entry>, RemoteError> {
        let state = self.begin()?;
        let uid = Self::authorize(&state, session)?;
        Ok(state
            .entries
            .get(&uid)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_one(&self, session: &Session, ts: i64) -> Result<(), RemoteError> {
        let mut state = self.begin()?;
        let uid = Self::authorize(&state, session)?;
        if let Some(stored) = state.entries.get_mut(&uid) {
            stored.remove(&ts);
        }
        Ok(())
    }

    async fn delete_all(&self, session: &Session) -> Result<(), RemoteError> {
        let mut state = self.begin()?;
        let uid = Self::authorize(&state, session)?;
        state.entries.remove(&uid);
        Ok(())
    }
}
