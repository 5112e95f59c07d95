mod config;
pub mod database;
pub mod entries;

pub use config::{CalculatorConfig, Config, RemoteConfig, StopwatchConfig, ValidationConfig};
pub use database::{Database, KvStore};
pub use entries::{load_entries, save_entries, ENTRIES_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the Coinrate data directory, creating it if needed.
///
/// `COINRATE_DATA_DIR` wins when set. Otherwise `~/.config/coinrate[-dev]/`
/// based on `COINRATE_ENV` (set `COINRATE_ENV=dev` for a development copy).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("COINRATE_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("COINRATE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("coinrate-dev")
            } else {
                base_dir.join("coinrate")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
