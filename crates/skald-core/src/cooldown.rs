//! Per-slot countdown timers, persisted across interruptions
//!
//! A cooldown blocks a repeat action until its counter reaches zero. The
//! driver calls `tick` exactly once per simulation frame; an entry that
//! reaches zero is removed from memory and from the persisted set in that
//! same tick, so a restarted session never sees a dead cooldown.

use crate::ids::SlotIndex;
use crate::log::LogSink;
use crate::persist::CooldownPersistence;
use indexmap::IndexMap;

/// Active cooldowns plus their persistence backend
pub struct CooldownStore {
    entries: IndexMap<SlotIndex, u32>,
    backend: Box<dyn CooldownPersistence>,
    log: LogSink,
}

impl CooldownStore {
    /// Load persisted entries; a backend read failure degrades to empty
    pub fn open(mut backend: Box<dyn CooldownPersistence>, log: LogSink) -> Self {
        let mut entries = IndexMap::new();
        match backend.load_all() {
            Ok(rows) => {
                for (slot, remaining) in rows {
                    if remaining > 0 {
                        entries.insert(slot, remaining);
                    }
                }
            }
            Err(err) => log.warn(format!("cooldown load failed: {}", err)),
        }
        Self {
            entries,
            backend,
            log,
        }
    }

    /// Start or overwrite a cooldown; zero ticks clears instead
    pub fn save(&mut self, slot: SlotIndex, remaining: u32) {
        if remaining == 0 {
            self.clear(slot);
            return;
        }
        self.entries.insert(slot, remaining);
        if let Err(err) = self.backend.save(slot, remaining) {
            self.log
                .warn(format!("cooldown save failed for slot {}: {}", slot, err));
        }
    }

    /// Remaining ticks for a slot; absent entries read as 0
    pub fn get(&self, slot: SlotIndex) -> u32 {
        self.entries.get(&slot).copied().unwrap_or(0)
    }

    /// True while the slot still counts down
    pub fn is_active(&self, slot: SlotIndex) -> bool {
        self.get(slot) > 0
    }

    /// Remove a slot's entry from memory and the persisted set
    pub fn clear(&mut self, slot: SlotIndex) {
        self.entries.shift_remove(&slot);
        if let Err(err) = self.backend.remove(slot) {
            self.log
                .warn(format!("cooldown delete failed for slot {}: {}", slot, err));
        }
    }

    /// Decrement every entry by one tick; expired entries are cleared
    ///
    /// Called exactly once per simulation frame by the driver.
    pub fn tick(&mut self) {
        let slots: Vec<SlotIndex> = self.entries.keys().copied().collect();
        for slot in slots {
            let remaining = match self.entries.get_mut(&slot) {
                Some(entry) => {
                    *entry = entry.saturating_sub(1);
                    *entry
                }
                None => continue,
            };
            if remaining == 0 {
                self.entries.shift_remove(&slot);
                if let Err(err) = self.backend.remove(slot) {
                    self.log
                        .warn(format!("cooldown delete failed for slot {}: {}", slot, err));
                }
            } else if let Err(err) = self.backend.save(slot, remaining) {
                self.log
                    .warn(format!("cooldown save failed for slot {}: {}", slot, err));
            }
        }
    }

    /// Number of active cooldowns
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for CooldownStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownStore")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}
