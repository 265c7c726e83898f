//! Schema definitions for RON content files

pub mod enemy;
pub mod item;
pub mod map;
pub mod menu;
pub mod npc;
pub mod quest;
pub mod script;

pub use enemy::EnemyDef;
pub use item::ItemDef;
pub use map::{BlockerDef, MapDef};
pub use menu::{MenuButtonDef, MenuDef};
pub use npc::{DialogButtonDef, DialogPageDef, NpcDef};
pub use quest::{QuestDef, QuestRewardDef, QuestTaskDef};
pub use script::ScriptDef;
