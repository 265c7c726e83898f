//! Stored value table rows.

use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use skald_core::{ValueId, ValueSlot};

/// Stored row of the value table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct SlotValueRecord {
    /// Primary key - value slot id.
    #[primary_key]
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Current value.
    pub value: f64,
    /// Lower clamp bound.
    pub min: f64,
    /// Upper clamp bound.
    pub max: f64,
}

impl SlotValueRecord {
    /// Create from a live value slot.
    pub fn from_slot(slot: &ValueSlot) -> Self {
        Self {
            id: slot.id.0,
            name: slot.name.clone(),
            value: slot.value,
            min: slot.min,
            max: slot.max,
        }
    }

    /// Convert to a live value slot.
    pub fn to_slot(&self) -> ValueSlot {
        ValueSlot {
            id: ValueId(self.id),
            name: self.name.clone(),
            value: self.value,
            min: self.min,
            max: self.max,
        }
    }
}
