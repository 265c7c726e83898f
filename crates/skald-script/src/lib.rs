//! Skald Script - instruction parser and RON content loader
//!
//! Turns content files into runnable form:
//! - Instruction-line parser for script sources and button bodies
//! - Schema definitions for items, enemies, NPCs, quests, maps and menus
//! - A loader that merges `.ron` files into one content set

mod error;
mod loader;
pub mod parse;
mod schema;

pub use error::{Error, Result};
pub use loader::{ContentSet, Loader};
pub use schema::{
    BlockerDef, DialogButtonDef, DialogPageDef, EnemyDef, ItemDef, MapDef, MenuButtonDef, MenuDef,
    NpcDef, QuestDef, QuestRewardDef, QuestTaskDef, ScriptDef,
};
