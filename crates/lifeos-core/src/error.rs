//! Core error types for lifeos-core.
//!
//! Validation failures are rejected before anything is stored, advisory
//! failures are recoverable and reported to the user, and operations on a
//! vanished record surface as `NotFound` (the timer boundary swallows them).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lifeos-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input rejected before reaching the store
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Advisory service failures
    #[error("Advisory error: {0}")]
    Advisory(#[from] AdvisoryError),

    /// No record with the given id
    #[error("Record not found: {id}")]
    NotFound { id: String },

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

impl CoreError {
    pub fn not_found(id: impl ToString) -> Self {
        CoreError::NotFound { id: id.to_string() }
    }
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Text must not be empty")]
    EmptyText,

    #[error("{field} must be between 1 and 5, got {value}")]
    RatingOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be a multiple of 0.5, got {value}")]
    RatingStep { field: &'static str, value: f64 },

    #[error("Duration must be a positive number of minutes, got {0}")]
    InvalidDuration(i64),

    #[error("Events require a date")]
    MissingEventDate,

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Field '{field}' does not apply to {kind} records")]
    FieldNotApplicable {
        field: &'static str,
        kind: &'static str,
    },

    #[error("Record {0} is completed and can no longer be changed")]
    RecordCompleted(String),

    #[error("XP amount must be positive, got {0}")]
    NonPositiveXp(i64),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Failures of the external advisory service.
#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("Advisory credentials are not configured")]
    MissingCredentials,

    #[error("Rate limit exceeded. Please wait a moment.")]
    RateLimited,

    #[error("Advisory service returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Malformed advisory response: {0}")]
    Malformed(String),

    #[error("Advisory request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
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

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Stored row could not be decoded into a record
    #[error("Corrupt row for record {id}: {message}")]
    CorruptRow { id: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
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

    /// Home directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
