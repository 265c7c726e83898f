//! Typed instruction variants
//!
//! Commands are what instruction text parses into: one variant per
//! instruction kind with typed fields. The text format itself lives at the
//! loading boundary (`skald-script`); nothing past the parser ever looks at
//! raw instruction strings again.

use crate::ids::{EnemyId, ItemId, MapId, MenuId, NpcId, QuestId, ScriptId, ValueId};
use crate::log::LogColor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An operation to modify a stored numeric value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ModifyOp {
    /// Set to the value
    Set,
    /// Add the value
    Add,
    /// Subtract the value
    Sub,
}

impl ModifyOp {
    /// Apply this operation to a current value
    pub fn apply(&self, current: f64, operand: f64) -> f64 {
        match self {
            ModifyOp::Set => operand,
            ModifyOp::Add => current + operand,
            ModifyOp::Sub => current - operand,
        }
    }
}

/// Inventory slot argument: a literal position or "first free"
///
/// The text format writes the literal token `false` for the automatic
/// form, overloading the boolean spelling with slot-selection meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotArg {
    /// Place into this exact slot
    Fixed(crate::ids::SlotIndex),
    /// Place into the first unoccupied slot
    FirstFree,
}

impl fmt::Display for SlotArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotArg::Fixed(slot) => write!(f, "{}", slot),
            SlotArg::FirstFree => write!(f, "false"),
        }
    }
}

/// A conditional-region guard, evaluated once when the region opens
///
/// The only supported comparison is strictly-greater-than against a value
/// slot, written `&<slot>.v><literal>:`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub slot: ValueId,
    pub threshold: f64,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.v > {}", self.slot, self.threshold)
    }
}

/// One executable instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    // === Diagnostics ===
    /// Emit a colored log line; `%N.v` references in the text are
    /// substituted with current slot values at execution time
    Log {
        color: LogColor,
        message: String,
    },

    // === World State ===
    /// Place an item into an inventory slot
    GiveItem {
        item: ItemId,
        slot: SlotArg,
    },
    /// Request an enemy spawn; `initialize: false` records a placeholder
    SpawnEnemy {
        template: EnemyId,
        x: i32,
        y: i32,
        initialize: bool,
    },
    /// Request an NPC spawn; same placeholder semantics as enemies
    SpawnNpc {
        npc: NpcId,
        x: i32,
        y: i32,
        initialize: bool,
    },
    /// Begin a dialog session with a spawned NPC
    StartDialog(NpcId),
    /// Switch the active map, rebuilding its collision objects
    SetMap(MapId),

    // === Quests ===
    /// Offer a quest; the boolean outcome is echoed to diagnostics
    GiveQuest(QuestId),
    /// Cancel a quest; the boolean outcome is echoed to diagnostics
    CancelQuest(QuestId),

    // === Flow Control ===
    /// Run another stream to completion (or its suspension), marking it
    /// executed
    CallScript(ScriptId),
    /// Run another stream without first-run bookkeeping
    RecallScript(ScriptId),
    /// Suspend the stream for this many seconds of simulated time
    Delay {
        seconds: f64,
    },
    /// Open a conditional region; a false guard skips until conditional
    /// nesting returns to depth zero
    OpenIf(Condition),
    /// Close the innermost conditional region
    EndIf,

    // === Values ===
    /// Mutate a value slot, clamped to its bounds
    AdjustValue {
        slot: ValueId,
        op: ModifyOp,
        amount: f64,
    },

    // === UI ===
    /// Open a menu
    OpenMenu(MenuId),
    /// Close the open menu
    CloseMenu,
    /// End the active NPC dialog session
    CloseDialog,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modify_op_apply() {
        assert_eq!(ModifyOp::Set.apply(10.0, 3.0), 3.0);
        assert_eq!(ModifyOp::Add.apply(10.0, 3.0), 13.0);
        assert_eq!(ModifyOp::Sub.apply(10.0, 3.0), 7.0);
    }

    #[test]
    fn test_condition_display() {
        let cond = Condition {
            slot: ValueId(0),
            threshold: 10.0,
        };
        assert_eq!(format!("{}", cond), "0.v > 10");
    }

}
