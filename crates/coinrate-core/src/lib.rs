//! # Coinrate Core Library
//!
//! Business logic for the Coinrate coins-per-minute calculator and ranking
//! tracker. The `coinrate` CLI is a thin front end over this crate.
//!
//! ## Architecture
//!
//! - **Calculator**: pure rate formula over time, coins and item modifiers
//! - **Stopwatch**: wall-clock count-up state machine plus a cancellable tick
//! - **Store**: ordered entry collection persisted to a SQLite key-value table
//! - **Ranking**: per character and skill averages, recomputed on demand
//! - **Merge / Transfer**: identity-keyed reconciliation for import and sync
//! - **Remote**: pluggable per-user entry store with email/password auth
//!
//! ## Key Components
//!
//! - [`Tracker`]: application state controller
//! - [`Stopwatch`]: elapsed-time state machine
//! - [`Database`]: key-value persistence
//! - [`Config`]: application configuration management

pub mod calculator;
pub mod clock;
pub mod entry;
pub mod error;
pub mod events;
pub mod merge;
pub mod ranking;
pub mod remote;
pub mod stopwatch;
pub mod storage;
pub mod store;
pub mod tracker;
pub mod transfer;

pub use calculator::{compute_rate, BonusOrder, Modifier, Modifiers, RateResult};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::Entry;
pub use error::{ConfigError, CoreError, ImportError, RemoteError, StorageError, ValidationError};
pub use events::{Event, MergeSource};
pub use merge::merge;
pub use ranking::{aggregate, RankRow};
pub use remote::{AuthProvider, HttpRemote, MemoryRemote, RemoteBackend, RemoteStore, Session};
pub use stopwatch::{Stopwatch, StopwatchState, Ticker};
pub use storage::{Config, Database, KvStore};
pub use store::{AddPolicy, EntryStore};
pub use tracker::{SignInSync, Tracker};
