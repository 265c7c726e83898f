//! Engine assembly and the per-frame tick
//!
//! `Engine::new` wires every collaborator together from loaded content:
//! the bag, the spawn tables, the quest log, maps and menus go behind
//! [`Shared`] handles, cloned once into the interpreter's world and kept
//! once on the engine for direct access between ticks. `Engine::tick`
//! then drives one frame: stores and spawn tables first, the interpreter
//! after them, quest settlement last.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use indexmap::IndexMap;
use skald_core::{
    Clock, CooldownPersistence, CooldownStore, EnemyId, EntityHandle, Interpreter, ItemId,
    LogColor, LogLine, LogSink, MapId, MemoryPersistence, NpcId, RunState, ScriptId,
    ScriptRegistry, SlotArg, SlotIndex, ValuePersistence, ValueStore, World,
};
use skald_db::{CooldownTable, SaveStore, ValueTable};
use skald_script::{ContentSet, ItemDef, Loader, QuestRewardDef, QuestTaskDef};

use crate::config::EngineConfig;
use crate::entities::{EnemyWorld, SpawnedEnemy};
use crate::error::Result;
use crate::health::Health;
use crate::inventory::{Bag, BAG_SLOTS};
use crate::maps::MapDirectory;
use crate::menus::{MenuBoard, MenuSnapshot};
use crate::npc::{DialogSnapshot, NpcWorld, SpawnedNpc};
use crate::quests::QuestLog;
use crate::{Shared, WorldHandle};

/// One loaded game session: interpreter, world and player state
pub struct Engine {
    config: EngineConfig,
    clock: Clock,
    interp: Interpreter,
    bag: Shared<Bag>,
    enemies: Shared<EnemyWorld>,
    npcs: Shared<NpcWorld>,
    quests: Shared<QuestLog>,
    maps: Shared<MapDirectory>,
    menus: Shared<MenuBoard>,
    items: IndexMap<ItemId, ItemDef>,
    health: Health,
    log: LogSink,
}

impl Engine {
    /// Load content from the configured directory and assemble a session
    ///
    /// A missing content directory is not an error: the engine starts
    /// empty and logs a warning the driver sees on its first tick.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let log = LogSink::new();
        if !config.content_dir.is_dir() {
            log.warn(format!(
                "content directory `{}` missing; starting empty",
                config.content_dir.display()
            ));
        }
        let mut loader = Loader::new();
        loader.load_directory(&config.content_dir)?;
        Self::assemble(config, loader.finish(), log)
    }

    /// Assemble a session from an already built content set
    pub fn with_content(config: EngineConfig, content: ContentSet) -> Result<Self> {
        Self::assemble(config, content, LogSink::new())
    }

    fn assemble(config: EngineConfig, content: ContentSet, log: LogSink) -> Result<Self> {
        let (value_backend, cooldown_backend): (
            Box<dyn ValuePersistence>,
            Box<dyn CooldownPersistence>,
        ) = match &config.save_path {
            Some(path) => {
                let store = Rc::new(SaveStore::open(path)?);
                (
                    Box::new(ValueTable::new(Rc::clone(&store))),
                    Box::new(CooldownTable::new(store)),
                )
            }
            None => {
                let memory = MemoryPersistence::new();
                (Box::new(memory.clone()), Box::new(memory))
            }
        };

        let values = ValueStore::open(value_backend, &content.values, log.clone());
        let cooldowns = CooldownStore::open(cooldown_backend, log.clone());

        let bag = Rc::new(RefCell::new(Bag::new(
            content.items.keys().copied().collect(),
        )));
        let items = content.items;
        let enemies = Rc::new(RefCell::new(EnemyWorld::from_defs(content.enemies.values())));
        let npcs = Rc::new(RefCell::new(NpcWorld::from_defs(
            content.npcs.values(),
            log.clone(),
        )));
        let quests = Rc::new(RefCell::new(QuestLog::from_defs(content.quests.values())));
        let maps = Rc::new(RefCell::new(MapDirectory::from_defs(content.maps.values())));
        let menus = Rc::new(RefCell::new(MenuBoard::from_defs(
            content.menus.values(),
            log.clone(),
        )));

        let world = World {
            inventory: Box::new(WorldHandle(Rc::clone(&bag))),
            enemies: Box::new(WorldHandle(Rc::clone(&enemies))),
            npcs: Box::new(WorldHandle(Rc::clone(&npcs))),
            quests: Box::new(WorldHandle(Rc::clone(&quests))),
            maps: Box::new(WorldHandle(Rc::clone(&maps))),
            menus: Box::new(WorldHandle(Rc::clone(&menus))),
            values,
            cooldowns,
        };

        let mut interp = Interpreter::new(content.scripts, world, log.clone());
        let autorun = interp.registry().autorun_ids();
        for id in autorun {
            interp.invoke(id);
        }

        let health = Health::new(config.max_health);
        Ok(Self {
            config,
            clock: Clock::new(),
            interp,
            bag,
            enemies,
            npcs,
            quests,
            maps,
            menus,
            items,
            health,
            log,
        })
    }

    /// Advance one frame and return everything logged during it
    ///
    /// Spawn tables run before the interpreter, so an enemy or NPC
    /// spawned lazily this frame stays a placeholder until the next one.
    pub fn tick(&mut self, dt: Duration) -> Vec<LogLine> {
        self.clock.advance(dt);
        self.interp.world_mut().cooldowns.tick();
        self.enemies.borrow_mut().tick(&self.clock);
        self.npcs.borrow_mut().tick();
        self.interp.tick(&self.clock);
        self.settle_quests();
        self.log.drain()
    }

    fn settle_quests(&mut self) {
        let completions = self.quests.borrow_mut().take_completions();
        for quest in completions {
            self.log.push(
                LogColor::Green,
                format!("quest {} complete: {}", quest.id, quest.name),
            );
            for reward in quest.rewards {
                match reward {
                    QuestRewardDef::AddMaxHealth(amount) => {
                        self.health.add_max(amount);
                        self.log
                            .push(LogColor::Green, format!("max health raised by {}", amount));
                    }
                    QuestRewardDef::GiveItem(item) => {
                        let world = self.interp.world_mut();
                        if !world.inventory.give_item(item, SlotArg::FirstFree) {
                            self.log
                                .warn(format!("reward item {} lost; no free slot", item));
                        }
                    }
                }
            }
        }
    }

    // === Script control ===

    /// Queue a script run, first-run bookkeeping included
    pub fn invoke_script(&mut self, id: ScriptId) {
        self.interp.invoke(id);
    }

    /// Queue a script run without touching first-run bookkeeping
    pub fn recall_script(&mut self, id: ScriptId) {
        self.interp.recall(id);
    }

    pub fn run_state(&self) -> RunState {
        self.interp.state()
    }

    pub fn is_idle(&self) -> bool {
        self.interp.is_idle()
    }

    pub fn registry(&self) -> &ScriptRegistry {
        self.interp.registry()
    }

    // === World access ===

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn world(&self) -> &World {
        self.interp.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.interp.world_mut()
    }

    /// Snapshot of the inventory slots
    pub fn inventory(&self) -> [Option<ItemId>; BAG_SLOTS] {
        self.bag.borrow().slots()
    }

    pub fn enemies(&self) -> Vec<SpawnedEnemy> {
        self.enemies.borrow().spawned().to_vec()
    }

    pub fn npcs(&self) -> Vec<SpawnedNpc> {
        self.npcs.borrow().spawned().to_vec()
    }

    pub fn active_map(&self) -> Option<MapId> {
        self.maps.borrow().active()
    }

    pub fn active_map_name(&self) -> Option<String> {
        self.maps.borrow().active_name().map(str::to_string)
    }

    pub fn blocked_at(&self, x: i32, y: i32) -> bool {
        self.maps.borrow().blocked_at(x, y)
    }

    /// Apply damage to a spawned enemy, crediting quest kills on death
    ///
    /// A survivor answers the blow with its template damage.
    pub fn damage_enemy(&mut self, handle: EntityHandle, amount: f64) {
        let killed = self
            .enemies
            .borrow_mut()
            .damage(handle, amount, &self.clock);
        match killed {
            Some(enemy) => {
                let name = self
                    .enemy_name(enemy)
                    .unwrap_or_else(|| format!("enemy {}", enemy));
                self.log.push(LogColor::White, format!("{} dies", name));
                self.quests.borrow_mut().record_kill(enemy);
            }
            None => self.retaliate(handle),
        }
    }

    fn retaliate(&mut self, handle: EntityHandle) {
        let strike = {
            let enemies = self.enemies.borrow();
            enemies
                .get(handle)
                .filter(|enemy| enemy.is_alive())
                .and_then(|enemy| enemies.template(enemy.template))
                .map(|template| (template.name.clone(), template.damage))
        };
        let Some((name, damage)) = strike else {
            return;
        };
        if damage <= 0.0 {
            return;
        }
        self.health.damage(damage);
        self.log
            .push(LogColor::Red, format!("{} hits you for {:.0}", name, damage));
        if self.health.is_dead() {
            self.log.push(LogColor::Red, "everything goes dark");
        }
    }

    /// Consume the item in a bag slot; healing items restore health
    ///
    /// The slot is emptied only when the item was actually used.
    pub fn use_item(&mut self, slot: usize) -> bool {
        let slot = SlotIndex(slot as u32);
        let Some(item) = self.interp.world().inventory.item_at(slot) else {
            return false;
        };
        let Some(def) = self.items.get(&item) else {
            return false;
        };
        if def.heal <= 0.0 {
            self.log.warn(format!("{} is of no use right now", def.name));
            return false;
        }
        let name = def.name.clone();
        let heal = def.heal;
        self.bag.borrow_mut().take(slot);
        self.health.heal(heal);
        self.log.push(
            LogColor::Green,
            format!("{} restores {:.0} health", name, heal),
        );
        true
    }

    // === Display names ===

    pub fn item_name(&self, item: ItemId) -> Option<&str> {
        self.items.get(&item).map(|def| def.name.as_str())
    }

    pub fn enemy_name(&self, enemy: EnemyId) -> Option<String> {
        self.enemies
            .borrow()
            .template(enemy)
            .map(|template| template.name.clone())
    }

    pub fn npc_name(&self, npc: NpcId) -> Option<String> {
        self.npcs
            .borrow()
            .template(npc)
            .map(|template| template.name.clone())
    }

    /// Active quest names with kill progress, for display
    pub fn quest_lines(&self) -> Vec<String> {
        let quests = self.quests.borrow();
        quests
            .active_ids()
            .into_iter()
            .filter_map(|id| {
                let template = quests.template(id)?;
                let progress = quests.progress(id)?;
                let tasks: Vec<String> = template
                    .tasks
                    .iter()
                    .map(|task| {
                        let QuestTaskDef::KillEnemies { enemy, count } = task;
                        format!(
                            "{}/{} of enemy {}",
                            progress.kills(*enemy).min(*count),
                            count,
                            enemy
                        )
                    })
                    .collect();
                Some(if tasks.is_empty() {
                    template.name.clone()
                } else {
                    format!("{} ({})", template.name, tasks.join(", "))
                })
            })
            .collect()
    }

    // === Dialog ===

    /// Snapshot of the open dialog, if any
    pub fn dialog(&self) -> Option<DialogSnapshot> {
        self.npcs.borrow().dialog()
    }

    /// Press a dialog button; its lines queue behind any running stream
    pub fn choose_dialog_button(&mut self, index: usize) {
        let lines = self.npcs.borrow_mut().choose(index);
        match lines {
            Some(lines) if !lines.is_empty() => self.interp.invoke_inline(lines),
            Some(_) => {}
            None => self.log.warn(format!("dialog choice {} ignored", index)),
        }
    }

    pub fn close_dialog(&mut self) {
        self.npcs.borrow_mut().close_dialog();
    }

    // === Menus ===

    /// Snapshot of the open menu with per-button cooldown ticks
    pub fn menu(&self) -> Option<MenuSnapshot> {
        self.menus.borrow().snapshot(&self.interp.world().cooldowns)
    }

    /// Press a menu button; refused presses only warn
    pub fn press_menu_button(&mut self, index: usize) {
        let world = self.interp.world_mut();
        let lines = self.menus.borrow_mut().press(index, &mut world.cooldowns);
        if let Some(lines) = lines {
            if !lines.is_empty() {
                self.interp.invoke_inline(lines);
            }
        }
    }

    pub fn close_menu(&mut self) {
        self.menus.borrow_mut().close_menu();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skald_core::ValueId;
    use std::path::PathBuf;

    fn content(text: &str) -> ContentSet {
        let mut loader = Loader::new();
        loader.load_str(text).unwrap();
        loader.finish()
    }

    fn engine(text: &str) -> Engine {
        Engine::with_content(EngineConfig::default(), content(text)).unwrap()
    }

    fn step(engine: &mut Engine) -> Vec<String> {
        engine
            .tick(Duration::from_millis(16))
            .into_iter()
            .map(|line| line.text)
            .collect()
    }

    fn step_secs(engine: &mut Engine, seconds: f64) -> Vec<String> {
        engine
            .tick(Duration::from_secs_f64(seconds))
            .into_iter()
            .map(|line| line.text)
            .collect()
    }

    #[test]
    fn test_autorun_script_runs_on_first_tick() {
        let mut engine =
            engine(r#"(scripts: [(id: 1, autorun: true, source: "$log.green('boot')")])"#);
        assert_eq!(step(&mut engine), vec!["boot"]);
        assert!(step(&mut engine).is_empty());
    }

    #[test]
    fn test_give_item_false_takes_first_free_slot() {
        let mut engine = engine(
            r#"(
                scripts: [(id: 1, source: "$inventory.GiveItem(1, 0)\n$inventory.GiveItem(2, 1)\n$inventory.GiveItem(3, 2)\n$inventory.GiveItem(5, false)")],
                items: [
                    (id: 1, name: "Bread"),
                    (id: 2, name: "Cheese"),
                    (id: 3, name: "Rope"),
                    (id: 5, name: "Lantern"),
                ],
            )"#,
        );
        engine.invoke_script(ScriptId(1));
        step(&mut engine);
        assert_eq!(engine.inventory()[3], Some(ItemId(5)));
    }

    #[test]
    fn test_conditional_runs_only_above_threshold() {
        let text = r#"(
            scripts: [(id: 1, source: "&0.v>10:\n$log.green('rich')\n&end\n$log.white('done')")],
            values: [(id: 0, name: "gold", start: 5, min: 0, max: 100)],
        )"#;
        let mut engine = engine(text);

        engine.invoke_script(ScriptId(1));
        assert_eq!(step(&mut engine), vec!["done"]);

        engine.world_mut().values.set(ValueId(0), 15.0);
        engine.invoke_script(ScriptId(1));
        assert_eq!(step(&mut engine), vec!["rich", "done"]);
    }

    #[test]
    fn test_called_script_delay_parks_the_caller() {
        let text = r#"(
            scripts: [
                (id: 1, source: "$call.script(7)\n$log.white('after')"),
                (id: 7, source: "!delay(1)\n$log.green('done')"),
            ],
        )"#;
        let mut engine = engine(text);
        engine.invoke_script(ScriptId(1));

        // first tick runs up to the delay; wake lands at 1.5s elapsed
        assert!(step_secs(&mut engine, 0.5).is_empty());
        assert!(step_secs(&mut engine, 0.9).is_empty());
        assert_eq!(step_secs(&mut engine, 0.1), vec!["done", "after"]);
        assert!(engine.is_idle());
    }

    #[test]
    fn test_value_mutation_clamps_and_substitutes() {
        let text = r#"(
            scripts: [(id: 1, source: "%0.v -= 500\n$log.white('gold: %0.v')")],
            values: [(id: 0, name: "gold", start: 50, min: 0, max: 100)],
        )"#;
        let mut engine = engine(text);
        engine.invoke_script(ScriptId(1));
        assert_eq!(step(&mut engine), vec!["gold: 0"]);
        assert_eq!(engine.world().values.get(ValueId(0)), 0.0);
    }

    #[test]
    fn test_lazy_spawn_waits_for_next_frame() {
        let text = r#"(
            scripts: [(id: 1, source: "$enemy.spawn(3, 0, 0, false)")],
            enemies: [(id: 3, name: "Cellar Rat")],
        )"#;
        let mut engine = engine(text);
        engine.invoke_script(ScriptId(1));

        step(&mut engine);
        assert!(!engine.enemies()[0].is_alive());
        step(&mut engine);
        assert!(engine.enemies()[0].is_alive());
    }

    #[test]
    fn test_quest_completion_grants_rewards() {
        let text = r#"(
            scripts: [(id: 1, source: "$enemy.spawn(3, 0, 0, true)\n$enemy.spawn(3, 1, 0, true)\n$quest.Give(1)")],
            items: [(id: 5, name: "Lantern")],
            enemies: [(id: 3, name: "Cellar Rat", health: 4.0)],
            quests: [(id: 1, name: "Cellar Rats",
                tasks: [KillEnemies(enemy: 3, count: 2)],
                rewards: [AddMaxHealth(10.0), GiveItem(5)],
            )],
        )"#;
        let mut engine = engine(text);
        engine.invoke_script(ScriptId(1));
        let logs = step(&mut engine);
        assert!(logs.iter().any(|l| l == "quest 1 given: true"));

        let handles: Vec<EntityHandle> =
            engine.enemies().iter().map(|enemy| enemy.handle).collect();
        assert_eq!(handles.len(), 2);
        for handle in handles {
            engine.damage_enemy(handle, 10.0);
        }

        let logs = step(&mut engine);
        assert!(logs.iter().any(|l| l.contains("quest 1 complete")));
        assert_eq!(engine.health().max(), 110.0);
        assert!(engine.inventory().contains(&Some(ItemId(5))));
    }

    #[test]
    fn test_dialog_button_runs_lines_and_closes() {
        let text = r#"(
            scripts: [(id: 1, source: "$npc.spawn(4, 0, 0, true)\n$npc.dialog(4)")],
            npcs: [(id: 4, name: "Innkeep", dialogs: [
                (text: "Welcome in.", buttons: [
                    (label: "Goodbye", lines: ["$log.white('farewell')", "@close"]),
                ]),
            ])],
        )"#;
        let mut engine = engine(text);
        engine.invoke_script(ScriptId(1));
        step(&mut engine);
        assert_eq!(engine.dialog().unwrap().speaker, "Innkeep");

        engine.choose_dialog_button(0);
        assert_eq!(step(&mut engine), vec!["farewell"]);
        assert!(engine.dialog().is_none());
    }

    #[test]
    fn test_menu_button_cooldown_blocks_repeat_press() {
        let text = r#"(
            scripts: [(id: 1, source: "@open.menu(2)")],
            menus: [(id: 2, title: "Actions", buttons: [
                (label: "Wave", lines: ["$log.white('you wave')"], cooldown_ticks: 2),
            ])],
        )"#;
        let mut engine = engine(text);
        engine.invoke_script(ScriptId(1));
        step(&mut engine);
        assert_eq!(engine.menu().unwrap().title, "Actions");

        engine.press_menu_button(0);
        assert_eq!(step(&mut engine), vec!["you wave"]);

        engine.press_menu_button(0);
        let logs = step(&mut engine);
        assert!(logs.iter().any(|l| l.contains("cooling down")));

        // that tick also expired the cooldown, so the next press lands
        engine.press_menu_button(0);
        assert_eq!(step(&mut engine), vec!["you wave"]);
    }

    #[test]
    fn test_set_map_rebuilds_collision() {
        let text = r#"(
            scripts: [(id: 1, source: "$map.set(1)")],
            maps: [(id: 1, name: "Town", blockers: [(x: 0, y: 0, w: 2, h: 2)])],
        )"#;
        let mut engine = engine(text);
        engine.invoke_script(ScriptId(1));
        step(&mut engine);

        assert_eq!(engine.active_map(), Some(MapId(1)));
        assert!(engine.blocked_at(1, 1));
        assert!(!engine.blocked_at(3, 3));
    }

    #[test]
    fn test_recall_skips_first_run_bookkeeping() {
        let mut engine = engine(r#"(scripts: [(id: 1, source: "$log.white('ran')")])"#);

        engine.recall_script(ScriptId(1));
        assert_eq!(step(&mut engine), vec!["ran"]);
        assert!(!engine.registry().was_executed(ScriptId(1)));

        engine.invoke_script(ScriptId(1));
        assert_eq!(step(&mut engine), vec!["ran"]);
        assert!(engine.registry().was_executed(ScriptId(1)));
    }

    #[test]
    fn test_missing_content_directory_warns_and_starts_empty() {
        let config = EngineConfig {
            content_dir: PathBuf::from("/definitely/not/here"),
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config).unwrap();
        let logs = step(&mut engine);
        assert!(logs.iter().any(|l| l.contains("missing")));
        assert!(engine.is_idle());
    }

    #[test]
    fn test_quest_lines_report_progress() {
        let text = r#"(
            scripts: [(id: 1, source: "$enemy.spawn(3, 0, 0, true)\n$quest.Give(1)")],
            enemies: [(id: 3, name: "Cellar Rat", health: 4.0)],
            quests: [(id: 1, name: "Cellar Rats",
                tasks: [KillEnemies(enemy: 3, count: 2)],
            )],
        )"#;
        let mut engine = engine(text);
        engine.invoke_script(ScriptId(1));
        step(&mut engine);

        assert_eq!(engine.quest_lines(), vec!["Cellar Rats (0/2 of enemy 3)"]);

        let handle = engine.enemies()[0].handle;
        engine.damage_enemy(handle, 10.0);
        assert_eq!(engine.quest_lines(), vec!["Cellar Rats (1/2 of enemy 3)"]);
    }

    #[test]
    fn test_surviving_enemy_strikes_back() {
        let text = r#"(
            scripts: [(id: 1, source: "$enemy.spawn(3, 0, 0, true)")],
            enemies: [(id: 3, name: "Cellar Rat", health: 6.0, damage: 1.0)],
        )"#;
        let mut engine = engine(text);
        engine.invoke_script(ScriptId(1));
        step(&mut engine);

        let handle = engine.enemies()[0].handle;
        engine.damage_enemy(handle, 2.0);
        let logs = step(&mut engine);
        assert!(logs.iter().any(|l| l.contains("Cellar Rat hits you for 1")));
        assert_eq!(engine.health().current(), 99.0);

        // the killing blow goes unanswered
        engine.damage_enemy(handle, 10.0);
        let logs = step(&mut engine);
        assert!(logs.iter().any(|l| l.contains("Cellar Rat dies")));
        assert_eq!(engine.health().current(), 99.0);
    }

    #[test]
    fn test_use_healing_item_restores_and_empties_slot() {
        let text = r#"(
            scripts: [(id: 1, source: "$enemy.spawn(3, 0, 0, true)\n$inventory.GiveItem(1, 0)")],
            items: [(id: 1, name: "Bread", heal: 5.0)],
            enemies: [(id: 3, name: "Cellar Rat", health: 6.0, damage: 3.0)],
        )"#;
        let mut engine = engine(text);
        engine.invoke_script(ScriptId(1));
        step(&mut engine);

        let handle = engine.enemies()[0].handle;
        engine.damage_enemy(handle, 1.0);
        step(&mut engine);
        assert_eq!(engine.health().current(), 97.0);

        assert!(engine.use_item(0));
        let logs = step(&mut engine);
        assert!(logs.iter().any(|l| l.contains("Bread restores 5 health")));
        assert_eq!(engine.health().current(), 100.0);
        assert_eq!(engine.inventory()[0], None);
    }

    #[test]
    fn test_use_item_refuses_non_consumables() {
        let text = r#"(
            scripts: [(id: 1, source: "$inventory.GiveItem(3, 0)")],
            items: [(id: 3, name: "Rope")],
        )"#;
        let mut engine = engine(text);
        engine.invoke_script(ScriptId(1));
        step(&mut engine);

        assert!(!engine.use_item(0));
        let logs = step(&mut engine);
        assert!(logs.iter().any(|l| l.contains("no use")));
        assert_eq!(engine.inventory()[0], Some(ItemId(3)));

        assert!(!engine.use_item(5));
    }
}
