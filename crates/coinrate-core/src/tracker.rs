//! Application state controller.
//!
//! [`Tracker`] owns the entry collection, the most recent calculation and the
//! optional remote session. Every operation that commits a change to the
//! collection writes it back to the key-value store before returning.
//! Remote-backed operations talk to the backend first and only touch local
//! state once it has succeeded.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::calculator::{compute_rate, BonusOrder, Modifiers, RateResult};
use crate::clock::{Clock, SystemClock};
use crate::entry::Entry;
use crate::error::{RemoteError, Result};
use crate::events::{Event, MergeSource};
use crate::merge::merge;
use crate::ranking::{aggregate, RankRow};
use crate::remote::{RemoteBackend, Session};
use crate::storage::{load_entries, save_entries, KvStore};
use crate::store::{AddPolicy, EntryStore};
use crate::transfer::{export_json, parse_import};

/// What [`Tracker::sign_in_and_sync`] does besides the pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignInSync {
    /// Upload local entries before pulling.
    pub upload_local: bool,
    /// Drop the local copy after a successful upload.
    pub clear_local: bool,
}

pub struct Tracker<K: KvStore, C: Clock = SystemClock> {
    kv: K,
    clock: C,
    store: EntryStore,
    policy: AddPolicy,
    bonus_order: BonusOrder,
    last_result: Option<RateResult>,
    remote: Option<Box<dyn RemoteBackend>>,
    session: Option<Session>,
}

impl<K: KvStore> Tracker<K, SystemClock> {
    /// Load saved entries from `kv`, using the system clock.
    pub fn open(kv: K) -> Self {
        Self::with_clock(kv, SystemClock)
    }
}

impl<K: KvStore, C: Clock> Tracker<K, C> {
    pub fn with_clock(kv: K, clock: C) -> Self {
        let store = EntryStore::from_entries(load_entries(&kv));
        Self {
            kv,
            clock,
            store,
            policy: AddPolicy::default(),
            bonus_order: BonusOrder::default(),
            last_result: None,
            remote: None,
            session: None,
        }
    }

    pub fn with_policy(mut self, policy: AddPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_bonus_order(mut self, order: BonusOrder) -> Self {
        self.bonus_order = order;
        self
    }

    pub fn with_remote(mut self, remote: Box<dyn RemoteBackend>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Resume a session saved by a previous run.
    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn entries(&self) -> &[Entry] {
        self.store.entries()
    }

    pub fn ranking(&self) -> Vec<RankRow> {
        aggregate(self.store.entries())
    }

    pub fn last_result(&self) -> Option<&RateResult> {
        self.last_result.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn export(&self) -> Result<String> {
        Ok(export_json(self.store.entries())?)
    }

    // ── Calculation ──────────────────────────────────────────────────

    /// Compute a rate and remember it as the candidate for [`Tracker::save`].
    pub fn calculate(&mut self, time: &str, coins: f64, modifiers: &Modifiers) -> RateResult {
        let result = compute_rate(time, coins, modifiers, self.bonus_order);
        self.last_result = Some(result);
        result
    }

    /// Restore a result calculated by a previous run.
    pub fn set_last_result(&mut self, result: Option<RateResult>) {
        self.last_result = result;
    }

    // ── Local mutations ──────────────────────────────────────────────

    /// Commit the last calculated rate for `character` at `skill`.
    pub fn save(&mut self, character: &str, skill: i64) -> Result<Event> {
        let cpm = self.last_result.map(|r| r.cpm);
        let now = self.clock.now_ms() as i64;
        let entry = self
            .store
            .add(character, skill, cpm, now, self.policy)?
            .clone();
        debug!(ts = entry.ts, character = %entry.character, "entry saved");
        let persisted = self.persist();
        Ok(Event::EntrySaved {
            entry,
            persisted,
            at: Utc::now(),
        })
    }

    /// Delete the entry `ts`. Missing entries are a no-op and return `None`.
    ///
    /// When signed in, the remote copy is deleted first; if that fails the
    /// local entry is kept.
    pub async fn delete(&mut self, ts: i64) -> Result<Option<Event>> {
        if self.store.get(ts).is_none() {
            debug!(ts, "delete of unknown entry ignored");
            return Ok(None);
        }
        if let (Some(remote), Some(session)) = (self.remote.as_deref(), self.session.as_ref()) {
            remote.delete_one(session, ts).await.inspect_err(|e| {
                warn!(ts, error = %e, "remote delete failed, keeping local entry");
            })?;
        }
        self.store.remove(ts);
        let persisted = self.persist();
        Ok(Some(Event::EntryDeleted {
            ts,
            persisted,
            at: Utc::now(),
        }))
    }

    /// Remove every entry, remotely first when signed in.
    pub async fn clear_all(&mut self) -> Result<Event> {
        if let (Some(remote), Some(session)) = (self.remote.as_deref(), self.session.as_ref()) {
            remote.delete_all(session).await.inspect_err(|e| {
                warn!(error = %e, "remote clear failed, keeping local entries");
            })?;
        }
        Ok(self.clear_local())
    }

    /// Remove every local entry, leaving any remote copy alone.
    pub fn clear_local(&mut self) -> Event {
        let removed = self.store.clear();
        let persisted = self.persist();
        Event::EntriesCleared {
            removed,
            persisted,
            at: Utc::now(),
        }
    }

    /// Merge an import file into the collection; the file wins collisions.
    pub fn import(&mut self, text: &str) -> Result<Event> {
        let imported = parse_import(text, self.clock.now_ms() as i64)?;
        Ok(self.merge_in(imported, MergeSource::Import))
    }

    // ── Remote ───────────────────────────────────────────────────────

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let remote = self.remote.as_deref().ok_or(RemoteError::NotConfigured)?;
        remote.sign_up(email, password).await?;
        Ok(())
    }

    /// Authenticate and keep the session. Does not sync; follow with
    /// [`Tracker::pull`] (and optionally [`Tracker::upload`]).
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Event> {
        let remote = self.remote.as_deref().ok_or(RemoteError::NotConfigured)?;
        let session = remote.sign_in(email, password).await?;
        info!(user_id = %session.user_id, "signed in");
        let event = Event::SignedIn {
            user_id: session.user_id.clone(),
            email: session.email.clone(),
            at: Utc::now(),
        };
        self.session = Some(session);
        Ok(event)
    }

    /// Sign in, then pull.
    ///
    /// With `upload_local`, local entries (if any) are uploaded before the
    /// pull. With `clear_local` as well, the local copy is dropped once the
    /// upload has succeeded. The session is kept even if a later step
    /// fails; the error is returned and the local collection is left as it
    /// was before that step.
    pub async fn sign_in_and_sync(
        &mut self,
        email: &str,
        password: &str,
        options: SignInSync,
    ) -> Result<Vec<Event>> {
        let mut events = vec![self.sign_in(email, password).await?];
        if options.upload_local && !self.store.is_empty() {
            events.push(self.upload().await?);
            if options.clear_local {
                events.push(self.clear_local());
            }
        }
        events.push(self.pull().await?);
        Ok(events)
    }

    /// Forget the session. A backend failure is logged, not returned.
    pub async fn sign_out(&mut self) -> Event {
        if let (Some(remote), Some(session)) = (self.remote.as_deref(), self.session.as_ref()) {
            if let Err(e) = remote.sign_out(session).await {
                warn!(error = %e, "remote sign-out failed");
            }
        }
        self.session = None;
        Event::SignedOut { at: Utc::now() }
    }

    /// Upsert every local entry into the remote store.
    pub async fn upload(&self) -> Result<Event> {
        let (remote, session) = self.remote_session()?;
        let entries = self.store.entries();
        remote.upload(session, entries).await?;
        Ok(Event::EntriesUploaded {
            count: entries.len(),
            at: Utc::now(),
        })
    }

    /// Fetch remote entries and merge them in; the remote wins collisions.
    /// On failure nothing local changes.
    pub async fn pull(&mut self) -> Result<Event> {
        let (remote, session) = self.remote_session()?;
        let fetched = remote.fetch_all(session).await?;
        Ok(self.merge_in(fetched, MergeSource::Remote))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn remote_session(&self) -> Result<(&dyn RemoteBackend, &Session), RemoteError> {
        let remote = self.remote.as_deref().ok_or(RemoteError::NotConfigured)?;
        let session = self.session.as_ref().ok_or(RemoteError::NotAuthenticated)?;
        Ok((remote, session))
    }

    fn merge_in(&mut self, incoming: Vec<Entry>, source: MergeSource) -> Event {
        let merged = merge(self.store.entries(), &incoming);
        let total = merged.len();
        self.store.replace(merged);
        let persisted = self.persist();
        info!(?source, incoming = incoming.len(), total, "entries merged");
        Event::EntriesMerged {
            source,
            incoming: incoming.len(),
            total,
            persisted,
            at: Utc::now(),
        }
    }

    /// Write the collection out. Failures are logged and reported as
    /// `false`; the in-memory change stands.
    fn persist(&self) -> bool {
        match save_entries(&self.kv, self.store.entries()) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to save entries");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Modifier;
    use crate::clock::ManualClock;
    use crate::error::StorageError;
    use crate::storage::{Database, ENTRIES_KEY};

    fn tracker() -> Tracker<Database, ManualClock> {
        Tracker::with_clock(Database::open_memory().unwrap(), ManualClock::new(1_000))
    }

    #[test]
    fn save_requires_a_calculation() {
        let mut t = tracker();
        assert!(t.save("Mario", 3).is_err());
        assert!(t.entries().is_empty());
    }

    #[test]
    fn calculate_then_save_persists() {
        let mut t = tracker();
        let m = Modifiers::from_items([Modifier::CoinBonus]);
        let r = t.calculate("02:00", 10_000.0, &m);
        t.save("Mario", 3).unwrap();
        assert_eq!(t.entries()[0].cpm, r.cpm);
        assert_eq!(t.entries()[0].ts, 1_000);
        assert_eq!(load_entries(t.kv()), t.entries());
    }

    #[test]
    fn nan_result_blocks_save() {
        let mut t = tracker();
        t.calculate("xx", 1_000.0, &Modifiers::default());
        assert!(t.save("Mario", 3).is_err());
        assert!(t.kv().kv_get(ENTRIES_KEY).unwrap().is_none());
    }

    #[test]
    fn bonus_order_is_applied() {
        let mut t = tracker().with_bonus_order(BonusOrder::BonusThenDeduct);
        let m = Modifiers::from_items([Modifier::CoinBonus]);
        assert!((t.calculate("02:00", 10_000.0, &m).cpm - 6_250.0).abs() < 1e-9);
    }

    /// Reads fine, refuses every write.
    struct ReadOnlyKv(Database);

    impl KvStore for ReadOnlyKv {
        fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.kv_get(key)
        }
        fn kv_set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Locked)
        }
        fn kv_remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Locked)
        }
    }

    #[tokio::test]
    async fn failed_writes_are_reported_on_events() {
        let kv = ReadOnlyKv(Database::open_memory().unwrap());
        let mut t = Tracker::with_clock(kv, ManualClock::new(1_000));
        t.calculate("01:00", 100.0, &Modifiers::default());

        let saved = t.save("A", 1).unwrap();
        assert!(matches!(saved, Event::EntrySaved { persisted: false, .. }));
        assert!(!saved.persisted());
        assert_eq!(t.entries().len(), 1);

        let merged = t.import(r#"[{"character":"B","ts":5}]"#).unwrap();
        assert!(!merged.persisted());
        let deleted = t.delete(5).await.unwrap().unwrap();
        assert!(!deleted.persisted());
        assert!(!t.clear_all().await.unwrap().persisted());
    }

    #[test]
    fn successful_writes_are_reported_on_events() {
        let mut t = tracker();
        t.calculate("01:00", 100.0, &Modifiers::default());
        assert!(t.save("A", 1).unwrap().persisted());
        assert!(t.clear_local().persisted());
    }

    #[tokio::test]
    async fn deleting_unknown_entry_is_noop() {
        let mut t = tracker();
        t.calculate("01:00", 100.0, &Modifiers::default());
        t.save("A", 1).unwrap();
        let before = t.kv().kv_get(ENTRIES_KEY).unwrap();
        assert!(t.delete(12345).await.unwrap().is_none());
        assert_eq!(t.kv().kv_get(ENTRIES_KEY).unwrap(), before);
    }

    #[tokio::test]
    async fn remote_calls_need_configuration_and_session() {
        let mut t = tracker();
        assert!(t.pull().await.is_err());
        assert!(t.sign_in("a@example.com", "pw").await.is_err());
        let t = tracker().with_remote(Box::new(crate::remote::MemoryRemote::new()));
        let err = t.upload().await.unwrap_err();
        assert!(err.to_string().contains("not signed in"));
    }
}
