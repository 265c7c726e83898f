//! Save-file store wrapper.

use crate::error::{Error, Result};
use crate::models::*;
use native_db::*;
use skald_core::{SlotIndex, ValueSlot};
use std::path::Path;
use std::sync::LazyLock;

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<SlotValueRecord>().unwrap();
    models.define::<CooldownRecord>().unwrap();
    models
});

/// Save-file store for state that outlives a session.
pub struct SaveStore {
    db: Database<'static>,
}

impl SaveStore {
    /// Open or create a save file at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create an in-memory save, for tests and save-less sessions.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Replace the stored value table.
    pub fn save_values(&self, slots: &[ValueSlot]) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        for slot in slots {
            rw.upsert(SlotValueRecord::from_slot(slot))?;
        }
        rw.commit()?;
        Ok(())
    }

    /// Load every stored value slot, in id order.
    pub fn load_values(&self) -> Result<Vec<ValueSlot>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<SlotValueRecord>()?;
        let iter = scan.all()?;
        let rows: std::result::Result<Vec<SlotValueRecord>, _> = iter.collect();
        let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.iter().map(SlotValueRecord::to_slot).collect())
    }

    /// Write one cooldown entry.
    pub fn save_cooldown(&self, slot: SlotIndex, remaining: u32) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.upsert(CooldownRecord::new(slot, remaining))?;
        rw.commit()?;
        Ok(())
    }

    /// Delete one cooldown entry; absent entries are not an error.
    pub fn remove_cooldown(&self, slot: SlotIndex) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<CooldownRecord> = rw.get().primary(slot.0)?;
        if let Some(record) = stored {
            rw.remove(record)?;
        }
        rw.commit()?;
        Ok(())
    }

    /// Load every stored cooldown entry.
    pub fn load_cooldowns(&self) -> Result<Vec<(SlotIndex, u32)>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<CooldownRecord>()?;
        let iter = scan.all()?;
        let rows: std::result::Result<Vec<CooldownRecord>, _> = iter.collect();
        let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|record| (SlotIndex(record.slot), record.remaining))
            .collect())
    }
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Database(err.to_string())
    }
}
