//! Collaborator contracts and the world bundle the interpreter drives
//!
//! The interpreter never owns gameplay rules: item placement, spawning,
//! quest bookkeeping, map switching, and UI state live behind these traits,
//! implemented in `skald-engine`. Everything is injected at construction
//! into a `World`, so a command can never fire against an unwired
//! collaborator. Boolean returns mean "request honored" and feed
//! diagnostics only; the interpreter does not branch on them beyond
//! logging.

use crate::command::SlotArg;
use crate::cooldown::CooldownStore;
use crate::ids::{EnemyId, EntityHandle, ItemId, MapId, MenuId, NpcId, QuestId, SlotIndex};
use crate::values::ValueStore;

/// Item placement into the player's slots
pub trait Inventory {
    /// Place an item at a fixed slot or the first free one; false when the
    /// slot is out of range or no slot is free
    fn give_item(&mut self, item: ItemId, slot: SlotArg) -> bool;

    /// Item currently in a slot, if any
    fn item_at(&self, slot: SlotIndex) -> Option<ItemId>;
}

/// Enemy spawning from templates
pub trait EnemyRegistry {
    /// Spawn from a template; `initialize: false` records a placeholder.
    /// None when the template id is unknown.
    fn spawn(&mut self, template: EnemyId, x: i32, y: i32, initialize: bool)
        -> Option<EntityHandle>;
}

/// NPC spawning and dialog sessions
pub trait NpcRegistry {
    /// Spawn an NPC; same placeholder semantics as enemies
    fn spawn(&mut self, npc: NpcId, x: i32, y: i32, initialize: bool) -> Option<EntityHandle>;

    /// Begin a dialog with a spawned NPC; false when it is not present
    fn start_dialog(&mut self, npc: NpcId) -> bool;

    /// End the active dialog session, if any
    fn close_dialog(&mut self);
}

/// Quest lifecycle
pub trait QuestRegistry {
    /// Offer a quest; false when unknown, already active, or completed
    fn give(&mut self, quest: QuestId) -> bool;

    /// Cancel an active quest; false when it is not active
    fn cancel(&mut self, quest: QuestId) -> bool;
}

/// Active-map selection
pub trait MapRegistry {
    /// Switch the active map and rebuild collision objects; false when the
    /// id is unknown
    fn set_active(&mut self, map: MapId) -> bool;
}

/// Menu UI state
pub trait MenuRegistry {
    /// Open a menu; false when the id is unknown
    fn open(&mut self, menu: MenuId) -> bool;

    /// Close the open menu, if any
    fn close(&mut self);
}

/// Every collaborator the interpreter dispatches into, plus the two stores
///
/// Owned by the interpreter; the driver reaches game state through it
/// between ticks.
pub struct World {
    pub inventory: Box<dyn Inventory>,
    pub enemies: Box<dyn EnemyRegistry>,
    pub npcs: Box<dyn NpcRegistry>,
    pub quests: Box<dyn QuestRegistry>,
    pub maps: Box<dyn MapRegistry>,
    pub menus: Box<dyn MenuRegistry>,
    pub values: ValueStore,
    pub cooldowns: CooldownStore,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("values", &self.values)
            .field("cooldowns", &self.cooldowns)
            .finish_non_exhaustive()
    }
}
