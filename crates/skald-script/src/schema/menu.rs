//! Menu definition schema

use serde::{Deserialize, Serialize};
use skald_core::MenuId;

/// Definition of an interface menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDef {
    /// Unique identifier for this menu
    pub id: MenuId,
    /// Title shown at the top
    pub title: String,
    /// Buttons in display order
    #[serde(default)]
    pub buttons: Vec<MenuButtonDef>,
}

/// A pressable menu button
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuButtonDef {
    /// Button label
    pub label: String,
    /// Instruction lines executed when pressed
    #[serde(default)]
    pub lines: Vec<String>,
    /// Ticks the button stays locked after a press
    #[serde(default = "default_cooldown_ticks")]
    pub cooldown_ticks: u32,
}

fn default_cooldown_ticks() -> u32 {
    10
}

impl MenuDef {
    /// Create a new menu definition
    pub fn new(id: MenuId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            buttons: Vec::new(),
        }
    }
}

impl MenuButtonDef {
    /// Create a new menu button
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            lines: Vec::new(),
            cooldown_ticks: 10,
        }
    }
}
