//! Error types for engine assembly

use thiserror::Error;

/// Engine construction and configuration error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("content error: {0}")]
    Content(#[from] skald_script::Error),

    #[error("save file error: {0}")]
    Save(#[from] skald_db::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
