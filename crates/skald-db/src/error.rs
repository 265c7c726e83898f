//! Error types for save-file operations.

use thiserror::Error;

/// Errors that can occur while touching the save file.
#[derive(Debug, Error)]
pub enum Error {
    /// Native DB error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for save-file operations.
pub type Result<T> = std::result::Result<T, Error>;
