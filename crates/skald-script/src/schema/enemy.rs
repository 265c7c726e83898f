//! Enemy template schema

use serde::{Deserialize, Serialize};
use skald_core::EnemyId;

/// Definition of an enemy template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDef {
    /// Unique identifier for this template
    pub id: EnemyId,
    /// Display name
    pub name: String,
    /// Starting health of a spawned instance
    #[serde(default = "default_health")]
    pub health: f64,
    /// Damage dealt per attack
    #[serde(default)]
    pub damage: f64,
    /// Seconds until a killed instance returns; zero disables respawn
    #[serde(default)]
    pub respawn_secs: f64,
}

fn default_health() -> f64 {
    10.0
}

impl EnemyDef {
    /// Create a new enemy template
    pub fn new(id: EnemyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            health: 10.0,
            damage: 0.0,
            respawn_secs: 0.0,
        }
    }
}
