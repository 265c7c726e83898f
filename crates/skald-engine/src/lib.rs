//! Skald Engine - tick-driven session host for the script interpreter
//!
//! Assembles the interpreter, the world collaborators and the save file
//! into one [`Engine`] that a driver ticks at a fixed rate. Collaborators
//! live behind [`Shared`] handles so the interpreter reaches them through
//! the world traits while the driver keeps direct accessors for rendering.

mod config;
mod engine;
mod entities;
mod error;
mod health;
mod inventory;
mod maps;
mod menus;
mod npc;
mod quests;

/// Single-threaded shared handle wiring one collaborator into both the
/// interpreter's world and the engine's accessors
pub type Shared<T> = std::rc::Rc<std::cell::RefCell<T>>;

/// Local wrapper carrying a [`Shared`] collaborator into the world traits;
/// the orphan rule forbids implementing them on `Rc` directly
pub(crate) struct WorldHandle<T>(pub(crate) Shared<T>);

pub use config::EngineConfig;
pub use engine::Engine;
pub use entities::{EnemyTemplate, EnemyWorld, SpawnState, SpawnedEnemy};
pub use error::{Error, Result};
pub use health::Health;
pub use inventory::{Bag, BAG_SLOTS};
pub use maps::{MapDirectory, MapPlan, Rect};
pub use menus::{MenuBoard, MenuButton, MenuPlan, MenuSnapshot};
pub use npc::{DialogButton, DialogPage, DialogSnapshot, NpcTemplate, NpcWorld, SpawnedNpc};
pub use quests::{CompletedQuest, QuestLog, QuestProgress, QuestTemplate};
