use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::stopwatch::StopwatchState;

/// Which side of a merge won identity collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeSource {
    Remote,
    Import,
}

/// Every state change in the system produces an Event.
/// The CLI prints them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    StopwatchStarted {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchPaused {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchReset {
        at: DateTime<Utc>,
    },
    StopwatchSnapshot {
        state: StopwatchState,
        elapsed_ms: u64,
        display: String,
        at: DateTime<Utc>,
    },
    EntrySaved {
        entry: Entry,
        /// False when the change could not be written to storage.
        persisted: bool,
        at: DateTime<Utc>,
    },
    EntryDeleted {
        ts: i64,
        /// False when the change could not be written to storage.
        persisted: bool,
        at: DateTime<Utc>,
    },
    EntriesCleared {
        removed: usize,
        /// False when the change could not be written to storage.
        persisted: bool,
        at: DateTime<Utc>,
    },
    EntriesMerged {
        source: MergeSource,
        incoming: usize,
        total: usize,
        /// False when the change could not be written to storage.
        persisted: bool,
        at: DateTime<Utc>,
    },
    EntriesUploaded {
        count: usize,
        at: DateTime<Utc>,
    },
    SignedIn {
        user_id: String,
        email: String,
        at: DateTime<Utc>,
    },
    SignedOut {
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether the change this event reports reached storage. Events that
    /// do not touch the entry collection always report `true`.
    pub fn persisted(&self) -> bool {
        match self {
            Event::EntrySaved { persisted, .. }
            | Event::EntryDeleted { persisted, .. }
            | Event::EntriesCleared { persisted, .. }
            | Event::EntriesMerged { persisted, .. } => *persisted,
            _ => true,
        }
    }
}
