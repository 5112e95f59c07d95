pub mod calc;
pub mod config;
pub mod data;
pub mod entry;
pub mod ranking;
pub mod remote;
pub mod stopwatch;

use std::error::Error;
use std::io::{BufRead, Write};

use coinrate_core::{Config, Database, Event, HttpRemote, KvStore, RateResult, Session, Tracker};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn Error>>;

pub const LAST_RESULT_KEY: &str = "last_result";
pub const CALC_TIME_KEY: &str = "calc_time";
pub const SESSION_KEY: &str = "remote_session";

/// Read a JSON value stored under `key`. Missing or unreadable values are
/// treated as absent.
pub fn load_json<T: DeserializeOwned>(kv: &impl KvStore, key: &str) -> Option<T> {
    match kv.kv_get(key) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring malformed stored value");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read stored value");
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(kv: &impl KvStore, key: &str, value: &T) -> CmdResult {
    let json = serde_json::to_string(value)?;
    kv.kv_set(key, &json)?;
    Ok(())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an event, warning on stderr when its change did not reach disk.
pub fn print_event(event: &Event) -> CmdResult {
    print_json(event)?;
    if !event.persisted() {
        eprintln!("warning: change applied but could not be saved; it will be lost on exit");
    }
    Ok(())
}

/// Build a tracker over the on-disk database, restoring the last calculation
/// and, when a remote is configured, the saved session.
pub fn open_tracker(config: &Config) -> Result<Tracker<Database>, Box<dyn Error>> {
    let db = Database::open()?;
    let last_result = load_json::<RateResult>(&db, LAST_RESULT_KEY);
    let session = load_json::<Session>(&db, SESSION_KEY);

    let mut tracker = Tracker::open(db)
        .with_policy(config.add_policy())
        .with_bonus_order(config.calculator.bonus_order);
    if let Some(url) = config.remote_url() {
        tracker = tracker
            .with_remote(Box::new(HttpRemote::new(url)?))
            .with_session(session);
    }
    tracker.set_last_result(last_result);
    Ok(tracker)
}

/// Ask `question` on stderr and read a y/N answer. `--yes` skips the prompt.
pub fn confirm(question: &str, yes: bool) -> Result<bool, std::io::Error> {
    if yes {
        return Ok(true);
    }
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
