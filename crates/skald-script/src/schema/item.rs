//! Item definition schema

use serde::{Deserialize, Serialize};
use skald_core::ItemId;

/// Definition of an inventory item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    /// Unique identifier for this item
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Damage dealt when used as a weapon
    #[serde(default)]
    pub damage: f64,
    /// Health restored when consumed
    #[serde(default)]
    pub heal: f64,
}

impl ItemDef {
    /// Create a new item definition
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            damage: 0.0,
            heal: 0.0,
        }
    }
}
