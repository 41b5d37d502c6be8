//! Error types for the levelup_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for levelup_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot bytes do not decode to a valid save state
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A referenced quest or record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The quest was already completed
    #[error("Already completed: {0}")]
    AlreadyCompleted(String),

    /// Settings would break an engine invariant
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// An activity record is structurally invalid (negative or non-finite values)
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// The gain would push a counter past what a save can hold
    #[error("Progress overflow: {0}")]
    Overflow(String),
}
