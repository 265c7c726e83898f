//! Quest definition schema

use serde::{Deserialize, Serialize};
use skald_core::{EnemyId, ItemId, QuestId};

/// Definition of a quest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestDef {
    /// Unique identifier for this quest
    pub id: QuestId,
    /// Display name
    pub name: String,
    /// Description shown in the quest log
    #[serde(default)]
    pub description: String,
    /// Tasks that must all be completed
    #[serde(default)]
    pub tasks: Vec<QuestTaskDef>,
    /// Rewards granted once on completion
    #[serde(default)]
    pub rewards: Vec<QuestRewardDef>,
}

/// A single quest task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuestTaskDef {
    /// Kill a number of instances of one enemy template
    KillEnemies { enemy: EnemyId, count: u32 },
}

/// A reward granted when a quest completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuestRewardDef {
    /// Raise the player's maximum health
    AddMaxHealth(f64),
    /// Place an item into the first free inventory slot
    GiveItem(ItemId),
}

impl QuestDef {
    /// Create a new quest definition
    pub fn new(id: QuestId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            tasks: Vec::new(),
            rewards: Vec::new(),
        }
    }
}
