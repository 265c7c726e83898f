//! Skald Core - script interpreter and state stores for a tick-driven RPG
//!
//! This crate provides the execution half of the skald engine:
//! - Typed instruction variants (`Command`) and conditional guards
//! - The `Interpreter`: a cooperative state machine with non-blocking
//!   delays, conditional skip regions, and a call stack of cursors
//! - `ValueStore` and `CooldownStore`: clamped, write-through persisted
//!   game state
//! - `ScriptRegistry`: loaded instruction streams plus first-run
//!   bookkeeping
//! - Collaborator traits (`world`) the interpreter dispatches into
//!
//! Everything here runs on the simulation thread: the driver calls
//! `Interpreter::tick` once per frame and drains the `LogSink` afterward.
//! Parsing instruction text into `Command`s lives in `skald-script`;
//! durable persistence lives in `skald-db`.

mod command;
mod cooldown;
mod error;
mod ids;
pub mod interp;
mod log;
pub mod persist;
mod script;
mod time;
mod values;
pub mod world;

pub use command::{Command, Condition, ModifyOp, SlotArg};
pub use cooldown::CooldownStore;
pub use error::{Error, Result};
pub use ids::{
    EnemyId, EntityHandle, ItemId, MapId, MenuId, NpcId, QuestId, ScriptId, SlotIndex, ValueId,
};
pub use interp::{Interpreter, RunState};
pub use log::{LogColor, LogLine, LogSink};
pub use persist::{CooldownPersistence, MemoryPersistence, PersistError, ValuePersistence};
pub use script::{LineKind, Script, ScriptLine, ScriptRegistry};
pub use time::{Clock, Tick};
pub use values::{ValueSeed, ValueSlot, ValueStore};
pub use world::{
    EnemyRegistry, Inventory, MapRegistry, MenuRegistry, NpcRegistry, QuestRegistry, World,
};
