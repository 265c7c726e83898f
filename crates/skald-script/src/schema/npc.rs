//! NPC and dialog schema

use serde::{Deserialize, Serialize};
use skald_core::NpcId;

/// Definition of an NPC template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcDef {
    /// Unique identifier for this template
    pub id: NpcId,
    /// Display name
    pub name: String,
    /// Dialog pages, shown starting from the first
    #[serde(default)]
    pub dialogs: Vec<DialogPageDef>,
}

/// One page of NPC dialog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogPageDef {
    /// Text spoken on this page
    pub text: String,
    /// Choices offered to the player
    #[serde(default)]
    pub buttons: Vec<DialogButtonDef>,
}

/// A choice button on a dialog page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogButtonDef {
    /// Button label
    pub label: String,
    /// Instruction lines executed when pressed
    #[serde(default)]
    pub lines: Vec<String>,
    /// Dialog page to show next; `None` keeps the current page
    #[serde(default)]
    pub next: Option<usize>,
}

impl NpcDef {
    /// Create a new NPC template
    pub fn new(id: NpcId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            dialogs: Vec::new(),
        }
    }
}

impl DialogPageDef {
    /// Create a new dialog page
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }
}

impl DialogButtonDef {
    /// Create a new dialog button
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            lines: Vec::new(),
            next: None,
        }
    }
}
