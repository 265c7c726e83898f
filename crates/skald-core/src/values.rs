//! Named numeric registers with clamped mutation and write-through saves
//!
//! Value slots are the script language's only variables. Every mutation
//! clamps to the slot's inclusive bounds and synchronously persists the
//! whole table; a crash can only lose the mutation currently in flight.

use crate::command::ModifyOp;
use crate::ids::ValueId;
use crate::log::LogSink;
use crate::persist::ValuePersistence;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One persisted value slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSlot {
    pub id: ValueId,
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Defaults-file form of a slot, used only when no persisted table exists
///
/// The initial value is deliberately named `start`, not `value`: once a
/// table has been persisted, only the persisted `value` field is ever read
/// again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSeed {
    pub id: ValueId,
    pub name: String,
    pub start: f64,
    pub min: f64,
    pub max: f64,
}

impl ValueSeed {
    /// Slot form of this seed, with the start value clamped into bounds
    pub fn to_slot(&self) -> ValueSlot {
        ValueSlot {
            id: self.id,
            name: self.name.clone(),
            value: self.start.min(self.max).max(self.min),
            min: self.min,
            max: self.max,
        }
    }
}

/// The value table plus its persistence backend
pub struct ValueStore {
    slots: IndexMap<ValueId, ValueSlot>,
    backend: Box<dyn ValuePersistence>,
    log: LogSink,
}

impl ValueStore {
    /// Load the persisted table, or seed it from defaults when empty
    ///
    /// A freshly seeded table is persisted immediately, so later sessions
    /// read the persisted form only. A backend read failure degrades to
    /// the seeded table with a warning.
    pub fn open(
        mut backend: Box<dyn ValuePersistence>,
        seeds: &[ValueSeed],
        log: LogSink,
    ) -> Self {
        let rows = backend.load_all().unwrap_or_else(|err| {
            log.warn(format!("value table load failed: {}", err));
            Vec::new()
        });

        let mut slots = IndexMap::new();
        let seeded = rows.is_empty();
        if seeded {
            for seed in seeds {
                slots.insert(seed.id, seed.to_slot());
            }
        } else {
            for row in rows {
                slots.insert(row.id, row);
            }
        }

        let mut store = Self { slots, backend, log };
        if seeded && !store.slots.is_empty() {
            store.persist();
        }
        store
    }

    /// Current value of a slot; unknown ids read as 0
    pub fn get(&self, id: ValueId) -> f64 {
        self.slots.get(&id).map(|slot| slot.value).unwrap_or(0.0)
    }

    /// Full record of a slot, if defined
    pub fn slot(&self, id: ValueId) -> Option<&ValueSlot> {
        self.slots.get(&id)
    }

    /// Slots in load order
    pub fn iter(&self) -> impl Iterator<Item = &ValueSlot> {
        self.slots.values()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Set a slot to a value, clamped
    pub fn set(&mut self, id: ValueId, value: f64) {
        self.apply(id, ModifyOp::Set, value);
    }

    /// Add a (possibly negative) delta; this is the general mutation
    pub fn add(&mut self, id: ValueId, delta: f64) {
        self.apply(id, ModifyOp::Add, delta);
    }

    /// Subtraction is addition of the negated amount
    pub fn subtract(&mut self, id: ValueId, amount: f64) {
        self.apply(id, ModifyOp::Sub, amount);
    }

    /// Apply one mutation, clamp to bounds, and write the table through
    ///
    /// Mutating an id with no slot record is ignored with a warning: there
    /// are no bounds to clamp against.
    pub fn apply(&mut self, id: ValueId, op: ModifyOp, amount: f64) {
        let Some(slot) = self.slots.get_mut(&id) else {
            self.log
                .warn(format!("value slot {} not defined; mutation ignored", id));
            return;
        };
        let next = op.apply(slot.value, amount);
        // lower bound wins if a slot is misconfigured with min > max
        slot.value = next.min(slot.max).max(slot.min);
        self.persist();
    }

    /// Substitute `%N.v` references in `text` with current slot values
    pub fn format_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];
            let digits = tail.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits > 0 {
                if let Some(after) = tail[digits..].strip_prefix(".v") {
                    if let Ok(id) = tail[..digits].parse::<u32>() {
                        out.push_str(&format_value(self.get(ValueId(id))));
                        rest = after;
                        continue;
                    }
                }
            }
            out.push('%');
            rest = tail;
        }
        out.push_str(rest);
        out
    }

    fn persist(&mut self) {
        let rows: Vec<ValueSlot> = self.slots.values().cloned().collect();
        if let Err(err) = self.backend.save_all(&rows) {
            self.log
                .warn(format!("value table save failed: {}", err));
        }
    }
}

impl std::fmt::Debug for ValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueStore")
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

/// Render a value the way content text expects: integral values without a
/// trailing `.0`
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{MemoryPersistence, PersistError};

    fn seeds() -> Vec<ValueSeed> {
        vec![
            ValueSeed {
                id: ValueId(0),
                name: "gold".to_string(),
                start: 50.0,
                min: 0.0,
                max: 100.0,
            },
            ValueSeed {
                id: ValueId(1),
                name: "reputation".to_string(),
                start: 0.0,
                min: -10.0,
                max: 10.0,
            },
        ]
    }

    fn open_seeded() -> (ValueStore, MemoryPersistence, LogSink) {
        let backend = MemoryPersistence::new();
        let log = LogSink::new();
        let store = ValueStore::open(Box::new(backend.clone()), &seeds(), log.clone());
        (store, backend, log)
    }

    #[test]
    fn test_unknown_id_reads_zero() {
        let (store, _, _) = open_seeded();
        assert_eq!(store.get(ValueId(42)), 0.0);
    }

    #[test]
    fn test_seeding_persists_immediately() {
        let (_, backend, _) = open_seeded();
        let rows = backend.value_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "gold");
        assert_eq!(rows[0].value, 50.0);
    }

    #[test]
    fn test_reopen_prefers_persisted_over_seeds() {
        let (mut store, backend, log) = open_seeded();
        store.set(ValueId(0), 75.0);
        drop(store);

        // same backend, fresh store: seeds must not overwrite saved state
        let store = ValueStore::open(Box::new(backend), &seeds(), log);
        assert_eq!(store.get(ValueId(0)), 75.0);
    }

    #[test]
    fn test_mutations_always_clamped() {
        let (mut store, _, _) = open_seeded();
        let deltas = [
            -5.0, -1000.0, 3.5, 99999.0, -0.25, -99999.0, 42.0, 7.0, -7.0, 1e12,
        ];
        for delta in deltas {
            store.add(ValueId(0), delta);
            let value = store.get(ValueId(0));
            assert!((0.0..=100.0).contains(&value), "escaped bounds: {}", value);
        }
    }

    #[test]
    fn test_subtract_is_negated_add() {
        let (mut store, _, _) = open_seeded();
        store.subtract(ValueId(0), 20.0);
        assert_eq!(store.get(ValueId(0)), 30.0);
        store.subtract(ValueId(0), -20.0);
        assert_eq!(store.get(ValueId(0)), 50.0);
    }

    #[test]
    fn test_every_mutation_writes_through() {
        let (mut store, backend, _) = open_seeded();
        store.set(ValueId(1), 3.0);
        assert_eq!(backend.value_rows()[1].value, 3.0);
        store.subtract(ValueId(1), 1.0);
        assert_eq!(backend.value_rows()[1].value, 2.0);
    }

    #[test]
    fn test_unknown_mutation_warns_and_ignores() {
        let (mut store, backend, log) = open_seeded();
        store.add(ValueId(42), 5.0);
        assert_eq!(store.get(ValueId(42)), 0.0);
        assert_eq!(backend.value_rows().len(), 2);
        assert!(log.drain().iter().any(|l| l.text.contains("42")));
    }

    #[test]
    fn test_save_failure_keeps_memory_state() {
        struct FailingBackend;
        impl ValuePersistence for FailingBackend {
            fn save_all(&mut self, _slots: &[ValueSlot]) -> Result<(), PersistError> {
                Err(PersistError::new("disk full"))
            }
            fn load_all(&mut self) -> Result<Vec<ValueSlot>, PersistError> {
                Ok(Vec::new())
            }
        }

        let log = LogSink::new();
        let mut store = ValueStore::open(Box::new(FailingBackend), &seeds(), log.clone());
        log.drain();

        store.set(ValueId(0), 10.0);
        assert_eq!(store.get(ValueId(0)), 10.0);
        assert!(log.drain().iter().any(|l| l.text.contains("save failed")));
    }

    #[test]
    fn test_format_text_substitutes_references() {
        let (mut store, _, _) = open_seeded();
        store.set(ValueId(0), 75.0);
        assert_eq!(
            store.format_text("gold: %0.v, rep: %1.v"),
            "gold: 75, rep: 0"
        );
        // unknown slots read as zero; stray percents pass through
        assert_eq!(store.format_text("%9.v% done"), "0% done");
        assert_eq!(store.format_text("50% off"), "50% off");
    }
}
