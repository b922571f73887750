//! Encounter configuration (JSON, serde)
//!
//! Всё задаётся один раз при setup; пропущенные поля берутся из `Default`.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spawning::{SpawnMode, Spawner};

/// Ошибки загрузки конфигурации (единственная fallible поверхность crate)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub position: Vec3,
    pub max_health: f32,
    pub invulnerable: bool,
    /// Тег, по которому AI ищет цель
    pub tag: String,
    pub collider_radius: f32,
    pub collider_half_height: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            max_health: 100.0,
            invulnerable: false,
            tag: "Player".to_string(),
            collider_radius: 0.4,
            collider_half_height: 0.9,
        }
    }
}

/// Плоская земля (box), верхняя грань на `top`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub half_extents: Vec3,
    pub top: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(50.0, 0.5, 50.0),
            top: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerSetup {
    pub position: Vec3,
    pub spawner: Spawner,
}

impl Default for SpawnerSetup {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 15.0),
            spawner: Spawner {
                mode: SpawnMode::waves(4, 3.0, 3),
                max_enemies: 6,
                ..default()
            },
        }
    }
}

/// Конфигурация уровня
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    pub seed: u64,
    pub target_kills: u32,
    /// Лимит тиков headless прогона
    pub max_ticks: u32,
    pub player: PlayerConfig,
    pub ground: Option<GroundConfig>,
    pub spawners: Vec<SpawnerSetup>,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            target_kills: 10,
            max_ticks: 64 * 120,
            player: PlayerConfig::default(),
            ground: Some(GroundConfig::default()),
            spawners: vec![SpawnerSetup::default()],
        }
    }
}

impl EncounterConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Прочитать JSON конфигурацию с диска
pub fn load_config(path: impl AsRef<Path>) -> Result<EncounterConfig, ConfigError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    EncounterConfig::from_json(&json)
}
