//! Error types for skald-script

use thiserror::Error;

/// Content loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Duplicate {kind} definition: {id}")]
    DuplicateDefinition { kind: &'static str, id: u32 },

    #[error(transparent)]
    Registry(#[from] skald_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
