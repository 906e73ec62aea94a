//! Error types for the heavyduty_core library.

use chrono::NaiveDate;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for heavyduty_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
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

    /// A date falls before the training start date
    #[error("Invalid date: {date} is before the start date {start}")]
    InvalidDate { date: NaiveDate, start: NaiveDate },

    /// Missing or out-of-range user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Lookup miss (catalog id, meal index, ...)
    #[error("Not found: {0}")]
    NotFound(String),

    /// A persisted document failed to parse or validate
    #[error("Corrupt state in {source_name}: {reason}")]
    CorruptState { source_name: String, reason: String },
}

impl Error {
    pub(crate) fn corrupt(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::CorruptState {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// True for the failure class that callers may recover from by starting fresh
    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, Error::CorruptState { .. })
    }
}
