//! RON content file loader
//!
//! Content ships as `.ron` files, each holding any mix of sections:
//! scripts, values, items, enemies, npcs, quests, maps, menus. The loader
//! merges every file into one [`ContentSet`], rejecting duplicate ids
//! across the whole load. Script sources are parsed into instruction
//! streams as they arrive, so a finished set is ready to execute.

use std::fs;
use std::hash::Hash;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use skald_core::{EnemyId, ItemId, MapId, MenuId, NpcId, QuestId, Script, ScriptRegistry, ValueSeed};

use crate::error::{Error, Result};
use crate::parse;
use crate::schema::{EnemyDef, ItemDef, MapDef, MenuDef, NpcDef, QuestDef, ScriptDef};

/// Everything a loaded content directory defines
#[derive(Debug, Default)]
pub struct ContentSet {
    /// Parsed instruction streams
    pub scripts: ScriptRegistry,
    /// Default value slots, in declaration order
    pub values: Vec<ValueSeed>,
    pub items: IndexMap<ItemId, ItemDef>,
    pub enemies: IndexMap<EnemyId, EnemyDef>,
    pub npcs: IndexMap<NpcId, NpcDef>,
    pub quests: IndexMap<QuestId, QuestDef>,
    pub maps: IndexMap<MapId, MapDef>,
    pub menus: IndexMap<MenuId, MenuDef>,
}

/// One RON content file; every section is optional
#[derive(Debug, Default, Deserialize)]
struct ContentFile {
    #[serde(default)]
    scripts: Vec<ScriptDef>,
    #[serde(default)]
    values: Vec<ValueSeed>,
    #[serde(default)]
    items: Vec<ItemDef>,
    #[serde(default)]
    enemies: Vec<EnemyDef>,
    #[serde(default)]
    npcs: Vec<NpcDef>,
    #[serde(default)]
    quests: Vec<QuestDef>,
    #[serde(default)]
    maps: Vec<MapDef>,
    #[serde(default)]
    menus: Vec<MenuDef>,
}

/// Loads content definitions from RON files
#[derive(Debug, Default)]
pub struct Loader {
    content: ContentSet,
}

impl Loader {
    /// Create a new empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one content file from a string
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        let file: ContentFile = ron::from_str(text)?;
        self.merge(file)
    }

    /// Load one content file from disk
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = fs::read_to_string(path)?;
        self.load_str(&text)
    }

    /// Load every `.ron` file under a directory, recursively.
    ///
    /// A missing directory loads nothing; the caller decides whether that
    /// is worth reporting. Files are visited in path order so definition
    /// order is stable across platforms.
    pub fn load_directory(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Ok(());
        }
        let mut entries: Vec<_> = fs::read_dir(dir)?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .collect();
        entries.sort();
        for path in entries {
            if path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&path)?;
            } else if path.is_dir() {
                self.load_directory(&path)?;
            }
        }
        Ok(())
    }

    /// Access the content loaded so far
    pub fn content(&self) -> &ContentSet {
        &self.content
    }

    /// Consume the loader and return the merged content
    pub fn finish(self) -> ContentSet {
        self.content
    }

    fn merge(&mut self, file: ContentFile) -> Result<()> {
        for def in file.scripts {
            let script = Script::new(def.id, def.autorun, parse::parse_source(&def.source));
            self.content.scripts.insert(script)?;
        }
        for seed in file.values {
            if self.content.values.iter().any(|s| s.id == seed.id) {
                return Err(Error::DuplicateDefinition {
                    kind: "value",
                    id: seed.id.0,
                });
            }
            self.content.values.push(seed);
        }
        for def in file.items {
            insert_unique(&mut self.content.items, "item", def.id.0, def.id, def)?;
        }
        for def in file.enemies {
            insert_unique(&mut self.content.enemies, "enemy", def.id.0, def.id, def)?;
        }
        for def in file.npcs {
            insert_unique(&mut self.content.npcs, "npc", def.id.0, def.id, def)?;
        }
        for def in file.quests {
            insert_unique(&mut self.content.quests, "quest", def.id.0, def.id, def)?;
        }
        for def in file.maps {
            insert_unique(&mut self.content.maps, "map", def.id.0, def.id, def)?;
        }
        for def in file.menus {
            insert_unique(&mut self.content.menus, "menu", def.id.0, def.id, def)?;
        }
        Ok(())
    }
}

fn insert_unique<K: Hash + Eq, V>(
    table: &mut IndexMap<K, V>,
    kind: &'static str,
    raw_id: u32,
    key: K,
    def: V,
) -> Result<()> {
    if table.contains_key(&key) {
        return Err(Error::DuplicateDefinition { kind, id: raw_id });
    }
    table.insert(key, def);
    Ok(())
}
