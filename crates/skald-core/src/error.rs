//! Error types for skald-core

use thiserror::Error;

use crate::ids::ScriptId;

/// Core error type
///
/// Runtime faults inside a stream are not errors: the interpreter logs
/// and continues. Only loading can fail hard.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Duplicate script id: {0}")]
    DuplicateScript(ScriptId),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
