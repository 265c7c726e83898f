//! Script definition schema

use serde::{Deserialize, Serialize};
use skald_core::ScriptId;

/// Definition of one instruction stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptDef {
    /// Unique identifier for this script
    pub id: ScriptId,
    /// Run automatically when a session starts
    #[serde(default)]
    pub autorun: bool,
    /// Raw instruction text, one line per instruction
    pub source: String,
}

impl ScriptDef {
    /// Create a new script definition
    pub fn new(id: ScriptId, source: impl Into<String>) -> Self {
        Self {
            id,
            autorun: false,
            source: source.into(),
        }
    }
}
