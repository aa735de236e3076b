// ================================================================
// File: flyscore-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    /// A user-entered `mm:ss` value could not be parsed.
    #[error("Invalid time format: '{0}' (expected mm:ss)")]
    InvalidFormat(String),

    #[error("Timer {0} is running; stop it first")]
    TimerRunning(usize),

    #[error("No {kind} at index {index} (have {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("No free port in {start}..={end} on 127.0.0.1 or 0.0.0.0")]
    BindFailure { start: u16, end: u16 },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, Error>;
