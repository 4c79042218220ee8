//! Error types for thread persistence.

use thiserror::Error;

/// Errors from the thread store.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Reading or writing a thread file failed.
    #[error("Thread file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A thread file held JSON that matches no known schema version.
    #[error("Thread file parse error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The requested thread does not exist for this user.
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
