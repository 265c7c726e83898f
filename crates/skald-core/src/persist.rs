//! Persistence seams for the value and cooldown stores
//!
//! The stores write through on every mutation, but what they write *to*
//! is injected: the durable implementation lives in `skald-db`, and the
//! in-memory one here backs tests and save-less sessions. Backend failures
//! never propagate out of a store; they are logged and the in-memory state
//! stays authoritative for the rest of the session.

use crate::ids::SlotIndex;
use crate::values::ValueSlot;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Error reported by a persistence backend
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct PersistError(pub String);

impl PersistError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Backend for the value table: the full table is written on every mutation
pub trait ValuePersistence {
    /// Replace the persisted table with `slots`
    fn save_all(&mut self, slots: &[ValueSlot]) -> Result<(), PersistError>;

    /// Read every persisted slot record
    fn load_all(&mut self) -> Result<Vec<ValueSlot>, PersistError>;
}

/// Backend for cooldown entries: one record per slot, individually removable
pub trait CooldownPersistence {
    /// Write one slot's remaining ticks
    fn save(&mut self, slot: SlotIndex, remaining: u32) -> Result<(), PersistError>;

    /// Delete one slot's record; absent records are not an error
    fn remove(&mut self, slot: SlotIndex) -> Result<(), PersistError>;

    /// Read every persisted cooldown record
    fn load_all(&mut self) -> Result<Vec<(SlotIndex, u32)>, PersistError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    values: Vec<ValueSlot>,
    cooldowns: IndexMap<SlotIndex, u32>,
}

/// In-memory backend implementing both persistence traits
///
/// Clones share one buffer, so a test can keep a handle and inspect what
/// the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the persisted value rows
    pub fn value_rows(&self) -> Vec<ValueSlot> {
        self.state.borrow().values.clone()
    }

    /// Snapshot of the persisted cooldown rows
    pub fn cooldown_rows(&self) -> Vec<(SlotIndex, u32)> {
        self.state
            .borrow()
            .cooldowns
            .iter()
            .map(|(slot, remaining)| (*slot, *remaining))
            .collect()
    }
}

impl ValuePersistence for MemoryPersistence {
    fn save_all(&mut self, slots: &[ValueSlot]) -> Result<(), PersistError> {
        self.state.borrow_mut().values = slots.to_vec();
        Ok(())
    }

    fn load_all(&mut self) -> Result<Vec<ValueSlot>, PersistError> {
        Ok(self.state.borrow().values.clone())
    }
}

impl CooldownPersistence for MemoryPersistence {
    fn save(&mut self, slot: SlotIndex, remaining: u32) -> Result<(), PersistError> {
        self.state.borrow_mut().cooldowns.insert(slot, remaining);
        Ok(())
    }

    fn remove(&mut self, slot: SlotIndex) -> Result<(), PersistError> {
        self.state.borrow_mut().cooldowns.shift_remove(&slot);
        Ok(())
    }

    fn load_all(&mut self) -> Result<Vec<(SlotIndex, u32)>, PersistError> {
        Ok(self
            .state
            .borrow()
            .cooldowns
            .iter()
            .map(|(slot, remaining)| (*slot, *remaining))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ValueId;

    #[test]
    fn test_memory_value_rows_round_trip() {
        let mut backend = MemoryPersistence::new();
        let rows = vec![ValueSlot {
            id: ValueId(0),
            name: "gold".to_string(),
            value: 50.0,
            min: 0.0,
            max: 100.0,
        }];
        backend.save_all(&rows).unwrap();
        assert_eq!(ValuePersistence::load_all(&mut backend).unwrap(), rows);
    }

    #[test]
    fn test_memory_cooldowns_share_state_across_clones() {
        let mut backend = MemoryPersistence::new();
        let view = backend.clone();
        backend.save(SlotIndex(2), 10).unwrap();
        assert_eq!(view.cooldown_rows(), vec![(SlotIndex(2), 10)]);

        backend.remove(SlotIndex(2)).unwrap();
        assert!(view.cooldown_rows().is_empty());
    }
}
