//! Error types for seat-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A single `start,end` entry of a booking chart could not be parsed.
    #[error("Malformed interval '{entry}': {reason}")]
    MalformedInterval { entry: String, reason: String },

    #[error("Snapshot parse error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
