//! Unified error types for reelgear.
//!
//! Every variant carries a stable code prefix so log lines and tool errors
//! can be grepped by category.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the catalog subsystem.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty item id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The requested catalog entity does not exist.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Caller is not allowed to perform an administrative operation.
    #[error("UNAUTHORIZED: {0}")]
    Unauthorized(String),

    /// Catalog store operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Reading or writing the persisted snapshot failed.
    #[error("PERSIST_ERROR: {0}")]
    Persist(#[from] std::io::Error),

    /// Snapshot (de)serialization failed.
    #[error("SERIALIZATION_ERROR: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::NotFound(msg) => (-32001, msg.clone()),
            Error::Unauthorized(msg) => (-32003, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::Persist(e) => (-32004, e.to_string()),
            Error::Serialization(e) => (-32005, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
