//! Player inventory: nine fixed slots

use crate::WorldHandle;
use indexmap::IndexSet;
use skald_core::{Inventory, ItemId, SlotArg, SlotIndex};

/// Number of inventory slots
pub const BAG_SLOTS: usize = 9;

/// The player's item slots
///
/// Items are identified by catalog id only; a slot holds at most one.
/// Placement into a fixed slot overwrites whatever was there, matching
/// how equipment swaps behave.
#[derive(Debug, Clone)]
pub struct Bag {
    catalog: IndexSet<ItemId>,
    slots: [Option<ItemId>; BAG_SLOTS],
}

impl Bag {
    /// Create an empty bag accepting the given item catalog
    pub fn new(catalog: IndexSet<ItemId>) -> Self {
        Self {
            catalog,
            slots: [None; BAG_SLOTS],
        }
    }

    /// Place an item, returning the slot used
    ///
    /// `FirstFree` scans upward from slot 0. Fails when the item is not in
    /// the catalog, a fixed slot is out of range, or no slot is free.
    pub fn place(&mut self, item: ItemId, slot: SlotArg) -> Option<SlotIndex> {
        if !self.catalog.contains(&item) {
            return None;
        }
        match slot {
            SlotArg::Fixed(slot) => {
                let index = slot.index();
                if index >= BAG_SLOTS {
                    return None;
                }
                self.slots[index] = Some(item);
                Some(slot)
            }
            SlotArg::FirstFree => {
                let index = self.slots.iter().position(Option::is_none)?;
                self.slots[index] = Some(item);
                Some(SlotIndex(index as u32))
            }
        }
    }

    /// Item occupying a slot, if any
    pub fn get(&self, slot: SlotIndex) -> Option<ItemId> {
        self.slots.get(slot.index()).copied().flatten()
    }

    /// Remove and return the item in a slot
    pub fn take(&mut self, slot: SlotIndex) -> Option<ItemId> {
        self.slots.get_mut(slot.index()).and_then(Option::take)
    }

    /// Snapshot of all slots in order
    pub fn slots(&self) -> [Option<ItemId>; BAG_SLOTS] {
        self.slots
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}

impl Inventory for WorldHandle<Bag> {
    fn give_item(&mut self, item: ItemId, slot: SlotArg) -> bool {
        self.0.borrow_mut().place(item, slot).is_some()
    }

    fn item_at(&self, slot: SlotIndex) -> Option<ItemId> {
        self.0.borrow().get(slot)
    }
}
