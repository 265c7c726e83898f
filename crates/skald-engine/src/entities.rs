//! Spawned enemy instances
//!
//! Spawn requests come from scripts; instances live here. A spawn with
//! `initialize: false` enters as a placeholder and is stamped from its
//! template on the next world pass, so a stream can lay out a whole
//! encounter before anything becomes live.

use crate::WorldHandle;
use indexmap::IndexMap;
use skald_core::{Clock, EnemyId, EnemyRegistry, EntityHandle};
use skald_script::EnemyDef;
use std::time::Duration;

/// Template a spawned instance is stamped from
#[derive(Debug, Clone)]
pub struct EnemyTemplate {
    pub name: String,
    pub health: f64,
    pub damage: f64,
    /// Zero disables respawn
    pub respawn_secs: f64,
}

/// Lifecycle state of one spawned instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnState {
    /// Requested lazily; becomes live on the next world pass
    Placeholder,
    Alive { health: f64 },
    /// `respawn_at: None` means the corpse stays down
    Dead { respawn_at: Option<Duration> },
}

/// One spawned enemy
#[derive(Debug, Clone)]
pub struct SpawnedEnemy {
    pub handle: EntityHandle,
    pub template: EnemyId,
    pub x: i32,
    pub y: i32,
    pub state: SpawnState,
}

impl SpawnedEnemy {
    pub fn is_alive(&self) -> bool {
        matches!(self.state, SpawnState::Alive { .. })
    }
}

/// All spawned enemies and the templates they come from
#[derive(Debug, Default)]
pub struct EnemyWorld {
    templates: IndexMap<EnemyId, EnemyTemplate>,
    spawned: Vec<SpawnedEnemy>,
    next_handle: u64,
}

impl EnemyWorld {
    pub fn from_defs<'a>(defs: impl IntoIterator<Item = &'a EnemyDef>) -> Self {
        let templates = defs
            .into_iter()
            .map(|def| {
                (
                    def.id,
                    EnemyTemplate {
                        name: def.name.clone(),
                        health: def.health,
                        damage: def.damage,
                        respawn_secs: def.respawn_secs,
                    },
                )
            })
            .collect();
        Self {
            templates,
            spawned: Vec::new(),
            next_handle: 0,
        }
    }

    pub fn template(&self, id: EnemyId) -> Option<&EnemyTemplate> {
        self.templates.get(&id)
    }

    pub fn spawned(&self) -> &[SpawnedEnemy] {
        &self.spawned
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&SpawnedEnemy> {
        self.spawned.iter().find(|e| e.handle == handle)
    }

    pub fn alive_count(&self) -> usize {
        self.spawned.iter().filter(|e| e.is_alive()).count()
    }

    /// Create an instance of a template; `None` for unknown templates
    pub fn spawn(
        &mut self,
        template: EnemyId,
        x: i32,
        y: i32,
        initialize: bool,
    ) -> Option<EntityHandle> {
        let base = self.templates.get(&template)?;
        let state = if initialize {
            SpawnState::Alive {
                health: base.health,
            }
        } else {
            SpawnState::Placeholder
        };
        self.next_handle += 1;
        let handle = EntityHandle::new(self.next_handle);
        self.spawned.push(SpawnedEnemy {
            handle,
            template,
            x,
            y,
            state,
        });
        Some(handle)
    }

    /// Apply damage; returns the template id when this blow killed
    pub fn damage(
        &mut self,
        handle: EntityHandle,
        amount: f64,
        clock: &Clock,
    ) -> Option<EnemyId> {
        let enemy = self.spawned.iter_mut().find(|e| e.handle == handle)?;
        let SpawnState::Alive { health } = &mut enemy.state else {
            return None;
        };
        *health -= amount;
        if *health > 0.0 {
            return None;
        }
        let template = enemy.template;
        let respawn_secs = self
            .templates
            .get(&template)
            .map(|t| t.respawn_secs)
            .unwrap_or(0.0);
        let respawn_at = if respawn_secs > 0.0 {
            Some(clock.deadline_in(respawn_secs))
        } else {
            None
        };
        enemy.state = SpawnState::Dead { respawn_at };
        Some(template)
    }

    /// One world pass: materialize placeholders and bring back the dead
    pub fn tick(&mut self, clock: &Clock) {
        for enemy in &mut self.spawned {
            match enemy.state {
                SpawnState::Placeholder => {
                    let health = self
                        .templates
                        .get(&enemy.template)
                        .map(|t| t.health)
                        .unwrap_or(1.0);
                    enemy.state = SpawnState::Alive { health };
                }
                SpawnState::Dead {
                    respawn_at: Some(deadline),
                } if clock.has_reached(deadline) => {
                    let health = self
                        .templates
                        .get(&enemy.template)
                        .map(|t| t.health)
                        .unwrap_or(1.0);
                    enemy.state = SpawnState::Alive { health };
                }
                _ => {}
            }
        }
    }
}

impl EnemyRegistry for WorldHandle<EnemyWorld> {
    fn spawn(&mut self, template: EnemyId, x: i32, y: i32, initialize: bool) -> Option<EntityHandle> {
        self.0.borrow_mut().spawn(template, x, y, initialize)
    }
}
