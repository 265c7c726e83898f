//! Engine configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for an engine session
///
/// # Example
///
/// ```
/// use skald_engine::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.tick_hz, 60);
/// assert!(config.save_path.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory scanned recursively for `.ron` content files
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
    /// Save file location; `None` keeps session state in memory
    #[serde(default)]
    pub save_path: Option<PathBuf>,
    /// Fixed update rate the driver should run at
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    /// Player starting maximum health
    #[serde(default = "default_max_health")]
    pub max_health: f64,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_tick_hz() -> u32 {
    60
}

fn default_max_health() -> f64 {
    100.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            save_path: None,
            tick_hz: default_tick_hz(),
            max_health: default_max_health(),
        }
    }
}

impl EngineConfig {
    /// Read a configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(ron::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_ron_with_defaults() {
        let config: EngineConfig =
            ron::from_str(r#"(content_dir: "data", tick_hz: 30)"#).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("data"));
        assert_eq!(config.tick_hz, 30);
        assert!(config.save_path.is_none());
        assert_eq!(config.max_health, 100.0);
    }
}
