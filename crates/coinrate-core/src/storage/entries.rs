//! Entry collection persistence under a single key.

use tracing::{debug, error, warn};

use super::database::KvStore;
use crate::entry::Entry;
use crate::error::StorageError;

/// Key holding the JSON array of entries.
pub const ENTRIES_KEY: &str = "cpm_entries";

/// Load the saved entries.
///
/// A missing key is an empty collection. Unreadable or malformed content is
/// logged and also treated as empty; loading never fails.
pub fn load_entries(kv: &impl KvStore) -> Vec<Entry> {
    let raw = match kv.kv_get(ENTRIES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            error!(error = %e, "failed to read saved entries");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<Entry>>(&raw) {
        Ok(entries) => {
            debug!(count = entries.len(), "loaded entries");
            entries
        }
        Err(e) => {
            warn!(error = %e, "saved entries are malformed, starting empty");
            Vec::new()
        }
    }
}

/// Write the full collection.
pub fn save_entries(kv: &impl KvStore, entries: &[Entry]) -> Result<(), StorageError> {
    let json = serde_json::to_string(entries).map_err(|e| StorageError::Malformed {
        key: ENTRIES_KEY.to_string(),
        message: e.to_string(),
    })?;
    kv.kv_set(ENTRIES_KEY, &json)
}
