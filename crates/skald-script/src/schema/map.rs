//! Map definition schema

use serde::{Deserialize, Serialize};
use skald_core::MapId;

/// Definition of a playable map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDef {
    /// Unique identifier for this map
    pub id: MapId,
    /// Display name
    pub name: String,
    /// Impassable regions in tile coordinates
    #[serde(default)]
    pub blockers: Vec<BlockerDef>,
}

/// An axis-aligned impassable rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerDef {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl MapDef {
    /// Create a new map definition
    pub fn new(id: MapId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            blockers: Vec::new(),
        }
    }
}
