//! Error types for barbo.

use thiserror::Error;

/// Result type alias using barbo's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for barbo operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bookmark (or folder) no longer exists in the host bookmark store
    #[error("Bookmark not found: {0}")]
    BookmarkNotFound(String),

    /// Operation is not valid for the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Input could not be parsed (e.g. an unparsable URL)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Underlying persistence is unavailable or rejected the operation
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error means the referenced bookmark or record is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::BookmarkNotFound(_))
    }

    /// Whether the error comes from persistence rather than the item itself.
    /// Such errors abort an operation instead of becoming a failed outcome.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Error::Store(_) | Error::Serialization(_) | Error::Io(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
