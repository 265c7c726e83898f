//! Quest log: active quests, kill progress, and completion rewards

use crate::WorldHandle;
use indexmap::{IndexMap, IndexSet};
use skald_core::{EnemyId, QuestId, QuestRegistry};
use skald_script::{QuestDef, QuestRewardDef, QuestTaskDef};

/// Static shape of a quest
#[derive(Debug, Clone)]
pub struct QuestTemplate {
    pub name: String,
    pub description: String,
    pub tasks: Vec<QuestTaskDef>,
    pub rewards: Vec<QuestRewardDef>,
}

/// Progress against one active quest
#[derive(Debug, Clone, Default)]
pub struct QuestProgress {
    kills: IndexMap<EnemyId, u32>,
}

impl QuestProgress {
    pub fn kills(&self, enemy: EnemyId) -> u32 {
        self.kills.get(&enemy).copied().unwrap_or(0)
    }
}

/// A quest that just finished, with its rewards to hand out
#[derive(Debug, Clone)]
pub struct CompletedQuest {
    pub id: QuestId,
    pub name: String,
    pub rewards: Vec<QuestRewardDef>,
}

/// Tracks which quests are active, done, or still on offer
///
/// A quest can be held once: giving an active or completed quest is
/// refused, so rewards are handed out at most one time.
#[derive(Debug, Default)]
pub struct QuestLog {
    defs: IndexMap<QuestId, QuestTemplate>,
    active: IndexMap<QuestId, QuestProgress>,
    completed: IndexSet<QuestId>,
}

impl QuestLog {
    pub fn from_defs<'a>(defs: impl IntoIterator<Item = &'a QuestDef>) -> Self {
        let defs = defs
            .into_iter()
            .map(|def| {
                (
                    def.id,
                    QuestTemplate {
                        name: def.name.clone(),
                        description: def.description.clone(),
                        tasks: def.tasks.clone(),
                        rewards: def.rewards.clone(),
                    },
                )
            })
            .collect();
        Self {
            defs,
            active: IndexMap::new(),
            completed: IndexSet::new(),
        }
    }

    pub fn template(&self, id: QuestId) -> Option<&QuestTemplate> {
        self.defs.get(&id)
    }

    pub fn is_active(&self, id: QuestId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn is_completed(&self, id: QuestId) -> bool {
        self.completed.contains(&id)
    }

    /// Ids of active quests, in the order they were taken
    pub fn active_ids(&self) -> Vec<QuestId> {
        self.active.keys().copied().collect()
    }

    pub fn progress(&self, id: QuestId) -> Option<&QuestProgress> {
        self.active.get(&id)
    }

    /// Accept a quest; refused when unknown, already held, or already done
    pub fn give(&mut self, quest: QuestId) -> bool {
        if !self.defs.contains_key(&quest)
            || self.active.contains_key(&quest)
            || self.completed.contains(&quest)
        {
            return false;
        }
        self.active.insert(quest, QuestProgress::default());
        true
    }

    /// Abandon an active quest, discarding its progress
    pub fn cancel(&mut self, quest: QuestId) -> bool {
        self.active.shift_remove(&quest).is_some()
    }

    /// Credit one kill toward every active quest hunting this template
    pub fn record_kill(&mut self, enemy: EnemyId) {
        for (id, progress) in &mut self.active {
            let Some(template) = self.defs.get(id) else {
                continue;
            };
            for task in &template.tasks {
                let QuestTaskDef::KillEnemies { enemy: target, .. } = task;
                if *target == enemy {
                    *progress.kills.entry(enemy).or_insert(0) += 1;
                }
            }
        }
    }

    /// Move every satisfied quest to completed and return its rewards
    pub fn take_completions(&mut self) -> Vec<CompletedQuest> {
        let mut done = Vec::new();
        for (id, progress) in &self.active {
            let Some(template) = self.defs.get(id) else {
                continue;
            };
            if is_complete(template, progress) {
                done.push(CompletedQuest {
                    id: *id,
                    name: template.name.clone(),
                    rewards: template.rewards.clone(),
                });
            }
        }
        for quest in &done {
            self.active.shift_remove(&quest.id);
            self.completed.insert(quest.id);
        }
        done
    }
}

fn is_complete(template: &QuestTemplate, progress: &QuestProgress) -> bool {
    template.tasks.iter().all(|task| {
        let QuestTaskDef::KillEnemies { enemy, count } = task;
        progress.kills(*enemy) >= *count
    })
}

impl QuestRegistry for WorldHandle<QuestLog> {
    fn give(&mut self, quest: QuestId) -> bool {
        self.0.borrow_mut().give(quest)
    }

    fn cancel(&mut self, quest: QuestId) -> bool {
        self.0.borrow_mut().cancel(quest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat_quest() -> QuestDef {
        let mut def = QuestDef::new(QuestId(1), "Cellar Rats");
        def.tasks = vec![QuestTaskDef::KillEnemies {
            enemy: EnemyId(3),
            count: 2,
        }];
        def.rewards = vec![QuestRewardDef::AddMaxHealth(10.0)];
        def
    }

    fn log() -> QuestLog {
        QuestLog::from_defs([&rat_quest()])
    }

    #[test]
    fn test_give_refuses_unknown_active_and_completed() {
        let mut log = log();
        assert!(!log.give(QuestId(9)));
        assert!(log.give(QuestId(1)));
        assert!(!log.give(QuestId(1)));

        log.record_kill(EnemyId(3));
        log.record_kill(EnemyId(3));
        assert_eq!(log.take_completions().len(), 1);
        assert!(!log.give(QuestId(1)));
    }

    #[test]
    fn test_cancel_discards_progress() {
        let mut log = log();
        log.give(QuestId(1));
        log.record_kill(EnemyId(3));
        assert!(log.cancel(QuestId(1)));
        assert!(!log.cancel(QuestId(1)));

        // Taking it again starts from zero.
        log.give(QuestId(1));
        assert_eq!(log.progress(QuestId(1)).unwrap().kills(EnemyId(3)), 0);
    }

    #[test]
    fn test_kills_only_count_toward_matching_tasks() {
        let mut log = log();
        log.give(QuestId(1));
        log.record_kill(EnemyId(4));
        log.record_kill(EnemyId(3));
        assert_eq!(log.progress(QuestId(1)).unwrap().kills(EnemyId(3)), 1);
        assert!(log.take_completions().is_empty());
    }

    #[test]
    fn test_completion_fires_once() {
        let mut log = log();
        log.give(QuestId(1));
        log.record_kill(EnemyId(3));
        log.record_kill(EnemyId(3));

        let done = log.take_completions();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].rewards, vec![QuestRewardDef::AddMaxHealth(10.0)]);
        assert!(log.take_completions().is_empty());
        assert!(log.is_completed(QuestId(1)));
        assert!(!log.is_active(QuestId(1)));
    }
}
