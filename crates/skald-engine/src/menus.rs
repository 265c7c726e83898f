//! Interface menus and button cooldowns
//!
//! One menu may be open at a time. Pressing a button locks its slot in
//! the cooldown store for the button's configured ticks; a press on a
//! locked slot is refused with a warning instead of queueing anything.

use crate::WorldHandle;
use indexmap::IndexMap;
use skald_core::{CooldownStore, LogSink, MenuId, MenuRegistry, ScriptLine, SlotIndex};
use skald_script::{parse, MenuDef};

/// A pressable button and its instruction body
#[derive(Debug, Clone)]
pub struct MenuButton {
    pub label: String,
    /// Parsed instruction lines run when pressed
    pub lines: Vec<ScriptLine>,
    /// Ticks the slot stays locked after a press
    pub cooldown_ticks: u32,
}

/// Static shape of one menu
#[derive(Debug, Clone)]
pub struct MenuPlan {
    pub title: String,
    pub buttons: Vec<MenuButton>,
}

/// Owned snapshot of the open menu, for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSnapshot {
    pub title: String,
    /// Button labels with remaining cooldown ticks
    pub buttons: Vec<(String, u32)>,
}

/// All known menus and which one is open
#[derive(Debug)]
pub struct MenuBoard {
    menus: IndexMap<MenuId, MenuPlan>,
    current: Option<MenuId>,
    log: LogSink,
}

impl MenuBoard {
    pub fn from_defs<'a>(defs: impl IntoIterator<Item = &'a MenuDef>, log: LogSink) -> Self {
        let menus = defs
            .into_iter()
            .map(|def| {
                (
                    def.id,
                    MenuPlan {
                        title: def.title.clone(),
                        buttons: def
                            .buttons
                            .iter()
                            .map(|button| MenuButton {
                                label: button.label.clone(),
                                lines: parse::parse_lines(&button.lines),
                                cooldown_ticks: button.cooldown_ticks,
                            })
                            .collect(),
                    },
                )
            })
            .collect();
        Self {
            menus,
            current: None,
            log,
        }
    }

    /// Open a menu; false for unknown ids
    pub fn open_menu(&mut self, menu: MenuId) -> bool {
        if !self.menus.contains_key(&menu) {
            return false;
        }
        self.current = Some(menu);
        true
    }

    pub fn close_menu(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<MenuId> {
        self.current
    }

    /// Snapshot of the open menu with per-button cooldown ticks
    pub fn snapshot(&self, cooldowns: &CooldownStore) -> Option<MenuSnapshot> {
        let id = self.current?;
        let plan = self.menus.get(&id)?;
        Some(MenuSnapshot {
            title: plan.title.clone(),
            buttons: plan
                .buttons
                .iter()
                .enumerate()
                .map(|(i, button)| (button.label.clone(), cooldowns.get(SlotIndex(i as u32))))
                .collect(),
        })
    }

    /// Press a button on the open menu, returning its instruction lines
    ///
    /// Starts the button's cooldown on success. Returns `None` with a
    /// warning when no menu is open, the index is out of range, or the
    /// slot is still cooling down.
    pub fn press(&mut self, index: usize, cooldowns: &mut CooldownStore) -> Option<Vec<ScriptLine>> {
        let Some(id) = self.current else {
            self.log.warn("button press with no menu open");
            return None;
        };
        let Some(button) = self.menus.get(&id).and_then(|plan| plan.buttons.get(index)) else {
            self.log
                .warn(format!("menu {} has no button {}", id, index));
            return None;
        };
        let slot = SlotIndex(index as u32);
        if cooldowns.is_active(slot) {
            self.log.warn(format!(
                "`{}` is cooling down: {} ticks left",
                button.label,
                cooldowns.get(slot)
            ));
            return None;
        }
        cooldowns.save(slot, button.cooldown_ticks);
        Some(button.lines.clone())
    }
}

impl MenuRegistry for WorldHandle<MenuBoard> {
    fn open(&mut self, menu: MenuId) -> bool {
        self.0.borrow_mut().open_menu(menu)
    }

    fn close(&mut self) {
        self.0.borrow_mut().close_menu();
    }
}
