//! Persistence trait implementations over a shared save store.
//!
//! The value and cooldown stores each hold a boxed backend, so the save
//! file hands out thin table handles that share one `SaveStore` through
//! an `Rc`.

use std::rc::Rc;

use skald_core::{CooldownPersistence, PersistError, SlotIndex, ValuePersistence, ValueSlot};

use crate::error::Error;
use crate::store::SaveStore;

/// Value-table backend over a shared save store
#[derive(Clone)]
pub struct ValueTable {
    store: Rc<SaveStore>,
}

impl ValueTable {
    pub fn new(store: Rc<SaveStore>) -> Self {
        Self { store }
    }
}

impl ValuePersistence for ValueTable {
    fn save_all(&mut self, slots: &[ValueSlot]) -> Result<(), PersistError> {
        self.store.save_values(slots).map_err(Into::into)
    }

    fn load_all(&mut self) -> Result<Vec<ValueSlot>, PersistError> {
        self.store.load_values().map_err(Into::into)
    }
}

/// Cooldown-table backend over a shared save store
#[derive(Clone)]
pub struct CooldownTable {
    store: Rc<SaveStore>,
}

impl CooldownTable {
    pub fn new(store: Rc<SaveStore>) -> Self {
        Self { store }
    }
}

impl CooldownPersistence for CooldownTable {
    fn save(&mut self, slot: SlotIndex, remaining: u32) -> Result<(), PersistError> {
        self.store
            .save_cooldown(slot, remaining)
            .map_err(Into::into)
    }

    fn remove(&mut self, slot: SlotIndex) -> Result<(), PersistError> {
        self.store.remove_cooldown(slot).map_err(Into::into)
    }

    fn load_all(&mut self) -> Result<Vec<(SlotIndex, u32)>, PersistError> {
        self.store.load_cooldowns().map_err(Into::into)
    }
}

impl From<Error> for PersistError {
    fn from(err: Error) -> Self {
        PersistError::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skald_core::{ValueId, ValueSlot};

    #[test]
    fn test_tables_share_one_store() {
        let store = Rc::new(SaveStore::in_memory().unwrap());
        let mut values = ValueTable::new(Rc::clone(&store));
        let mut cooldowns = CooldownTable::new(Rc::clone(&store));

        values
            .save_all(&[ValueSlot {
                id: ValueId(0),
                name: "gold".to_string(),
                value: 17.0,
                min: 0.0,
                max: 100.0,
            }])
            .unwrap();
        cooldowns.save(SlotIndex(1), 5).unwrap();

        assert_eq!(values.load_all().unwrap()[0].value, 17.0);
        assert_eq!(store.load_cooldowns().unwrap(), vec![(SlotIndex(1), 5)]);
    }
}
