//! Stored cooldown rows.

use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use skald_core::SlotIndex;

/// Stored cooldown entry for one menu button slot.
///
/// Rows exist only while a cooldown is live; an expired slot has its row
/// deleted rather than zeroed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct CooldownRecord {
    /// Primary key - slot position.
    #[primary_key]
    pub slot: u32,
    /// Ticks left before the slot unlocks.
    pub remaining: u32,
}

impl CooldownRecord {
    /// Create a new cooldown row.
    pub fn new(slot: SlotIndex, remaining: u32) -> Self {
        Self {
            slot: slot.0,
            remaining,
        }
    }
}
