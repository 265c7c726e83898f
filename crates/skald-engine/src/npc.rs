//! Spawned NPCs and dialog sessions
//!
//! NPCs spawn like enemies, placeholders included. At most one dialog
//! session is live at a time; its pages and buttons come from the NPC's
//! template, and button bodies are instruction lines parsed at load time.

use crate::WorldHandle;
use indexmap::IndexMap;
use skald_core::{EntityHandle, LogSink, NpcId, NpcRegistry, ScriptLine};
use skald_script::{parse, NpcDef};

/// Dialog pages and identity stamped onto spawned instances
#[derive(Debug, Clone)]
pub struct NpcTemplate {
    pub name: String,
    pub pages: Vec<DialogPage>,
}

/// One page of dialog
#[derive(Debug, Clone)]
pub struct DialogPage {
    pub text: String,
    pub buttons: Vec<DialogButton>,
}

/// A choice on a dialog page
#[derive(Debug, Clone)]
pub struct DialogButton {
    pub label: String,
    /// Parsed instruction lines run when pressed
    pub lines: Vec<ScriptLine>,
    /// Page shown after pressing; `None` stays on the current page
    pub next: Option<usize>,
}

/// One spawned NPC
#[derive(Debug, Clone)]
pub struct SpawnedNpc {
    pub handle: EntityHandle,
    pub npc: NpcId,
    pub x: i32,
    pub y: i32,
    /// False until the first world pass after a lazy spawn
    pub initialized: bool,
}

/// Owned snapshot of the live dialog, for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct DialogSnapshot {
    pub speaker: String,
    pub text: String,
    pub buttons: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct DialogSession {
    npc: NpcId,
    page: usize,
}

/// All spawned NPCs and the single dialog session
#[derive(Debug)]
pub struct NpcWorld {
    templates: IndexMap<NpcId, NpcTemplate>,
    spawned: Vec<SpawnedNpc>,
    next_handle: u64,
    session: Option<DialogSession>,
    log: LogSink,
}

impl NpcWorld {
    pub fn from_defs<'a>(defs: impl IntoIterator<Item = &'a NpcDef>, log: LogSink) -> Self {
        let templates = defs
            .into_iter()
            .map(|def| {
                let pages = def
                    .dialogs
                    .iter()
                    .map(|page| DialogPage {
                        text: page.text.clone(),
                        buttons: page
                            .buttons
                            .iter()
                            .map(|button| DialogButton {
                                label: button.label.clone(),
                                lines: parse::parse_lines(&button.lines),
                                next: button.next,
                            })
                            .collect(),
                    })
                    .collect();
                (
                    def.id,
                    NpcTemplate {
                        name: def.name.clone(),
                        pages,
                    },
                )
            })
            .collect();
        Self {
            templates,
            spawned: Vec::new(),
            next_handle: 0,
            session: None,
            log,
        }
    }

    pub fn template(&self, id: NpcId) -> Option<&NpcTemplate> {
        self.templates.get(&id)
    }

    pub fn spawned(&self) -> &[SpawnedNpc] {
        &self.spawned
    }

    /// Create an instance of a template; `None` for unknown templates
    pub fn spawn(&mut self, npc: NpcId, x: i32, y: i32, initialize: bool) -> Option<EntityHandle> {
        if !self.templates.contains_key(&npc) {
            return None;
        }
        self.next_handle += 1;
        let handle = EntityHandle::new(self.next_handle);
        self.spawned.push(SpawnedNpc {
            handle,
            npc,
            x,
            y,
            initialized: initialize,
        });
        Some(handle)
    }

    /// Open a dialog at its first page; false when the NPC is unknown or mute
    pub fn start_dialog(&mut self, npc: NpcId) -> bool {
        match self.templates.get(&npc) {
            Some(template) if !template.pages.is_empty() => {
                self.session = Some(DialogSession { npc, page: 0 });
                true
            }
            _ => false,
        }
    }

    pub fn close_dialog(&mut self) {
        self.session = None;
    }

    pub fn dialog_open(&self) -> bool {
        self.session.is_some()
    }

    /// Snapshot of the live dialog page
    pub fn dialog(&self) -> Option<DialogSnapshot> {
        let session = self.session?;
        let template = self.templates.get(&session.npc)?;
        let page = template.pages.get(session.page)?;
        Some(DialogSnapshot {
            speaker: template.name.clone(),
            text: page.text.clone(),
            buttons: page.buttons.iter().map(|b| b.label.clone()).collect(),
        })
    }

    /// Press a button on the current page, returning its instruction lines
    ///
    /// The page transition applies immediately; a `next` pointing past the
    /// last page closes the dialog with a warning.
    pub fn choose(&mut self, index: usize) -> Option<Vec<ScriptLine>> {
        let session = self.session.as_mut()?;
        let template = self.templates.get(&session.npc)?;
        let page = template.pages.get(session.page)?;
        let button = page.buttons.get(index)?;
        let lines = button.lines.clone();
        match button.next {
            Some(next) if next < template.pages.len() => session.page = next,
            Some(next) => {
                self.log
                    .warn(format!("dialog page {} does not exist; closing", next));
                self.session = None;
            }
            None => {}
        }
        Some(lines)
    }

    /// One world pass: initialize lazily spawned instances
    pub fn tick(&mut self) {
        for npc in &mut self.spawned {
            npc.initialized = true;
        }
    }
}

impl NpcRegistry for WorldHandle<NpcWorld> {
    fn spawn(&mut self, npc: NpcId, x: i32, y: i32, initialize: bool) -> Option<EntityHandle> {
        self.0.borrow_mut().spawn(npc, x, y, initialize)
    }

    fn start_dialog(&mut self, npc: NpcId) -> bool {
        self.0.borrow_mut().start_dialog(npc)
    }

    fn close_dialog(&mut self) {
        self.0.borrow_mut().close_dialog();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skald_script::{DialogButtonDef, DialogPageDef};

    fn innkeep() -> NpcDef {
        let mut def = NpcDef::new(NpcId(4), "Innkeep");
        let mut greeting = DialogPageDef::new("Welcome in.");
        let mut work = DialogButtonDef::new("Any work?");
        work.next = Some(1);
        let mut farewell = DialogButtonDef::new("Goodbye");
        farewell.lines = vec!["@close".to_string()];
        greeting.buttons = vec![work, farewell];
        let cellar = DialogPageDef::new("Rats in the cellar, actually.");
        def.dialogs = vec![greeting, cellar];
        def
    }

    fn world() -> NpcWorld {
        NpcWorld::from_defs([&innkeep()], LogSink::new())
    }

    #[test]
    fn test_dialog_requires_pages() {
        let silent = NpcDef::new(NpcId(9), "Statue");
        let mut world = NpcWorld::from_defs([&innkeep(), &silent], LogSink::new());
        assert!(world.start_dialog(NpcId(4)));
        assert!(!world.start_dialog(NpcId(9)));
        assert!(!world.start_dialog(NpcId(77)));
    }

    #[test]
    fn test_choose_follows_next_page() {
        let mut world = world();
        world.start_dialog(NpcId(4));
        assert_eq!(world.dialog().unwrap().text, "Welcome in.");

        let lines = world.choose(0).unwrap();
        assert!(lines.is_empty());
        assert_eq!(
            world.dialog().unwrap().text,
            "Rats in the cellar, actually."
        );
    }

    #[test]
    fn test_choose_returns_button_lines() {
        let mut world = world();
        world.start_dialog(NpcId(4));

        let lines = world.choose(1).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].raw, "@close");
        // Still open; the line closes it only once executed.
        assert!(world.dialog_open());
    }

    #[test]
    fn test_choose_out_of_range_is_none() {
        let mut world = world();
        world.start_dialog(NpcId(4));
        assert!(world.choose(7).is_none());
        assert!(world.choose(0).is_some());
    }

    #[test]
    fn test_lazy_spawn_initializes_on_tick() {
        let mut world = world();
        let handle = world.spawn(NpcId(4), 2, 3, false).unwrap();
        assert!(!world.spawned()[0].initialized);

        world.tick();
        let npc = world.spawned().iter().find(|n| n.handle == handle).unwrap();
        assert!(npc.initialized);
    }
}
