//! Core error types for coinrate-core.
//!
//! Every failure is caught at its boundary: validation and import errors abort
//! the operation without touching state, storage errors are logged by the
//! caller, remote errors carry the backend's message back to the user.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for coinrate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Remote store and authentication errors
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Local durable storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored value could not be (de)serialized
    #[error("Malformed value under '{key}': {message}")]
    Malformed { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// User input rejected before any state change.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("character name must not be empty")]
    EmptyCharacter,

    /// No result has been calculated yet, or it is NaN
    #[error("calculate a result before saving")]
    MissingResult,

    /// JSON cannot represent infinities
    #[error("result {0} is not a finite number and cannot be saved")]
    NonFiniteResult(f64),

    #[error("skill level {0} is outside 1..=6")]
    SkillOutOfRange(i64),
}

/// Import file rejected as a whole.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("import file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("import file must contain a JSON array, found {0}")]
    NotAnArray(&'static str),
}

/// Remote store and authentication errors.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// No signed-in session
    #[error("not signed in")]
    NotAuthenticated,

    /// No remote backend configured
    #[error("remote backend not configured")]
    NotConfigured,

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Backend answered with a non-success status
    #[error("remote store error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid remote URL: {0}")]
    Url(#[from] url::ParseError),

    /// Generic backend failure
    #[error("{0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if e.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StorageError::Locked
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
