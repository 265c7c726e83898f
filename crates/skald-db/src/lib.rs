//! Skald DB - save-file layer using native_db
//!
//! Stores the state that outlives a session:
//! - Value slots, rewritten in full on every mutation
//! - Menu button cooldowns, one row per locked slot

mod error;
mod models;
mod persist;
mod store;

pub use error::{Error, Result};
pub use persist::{CooldownTable, ValueTable};
pub use store::SaveStore;
