//! Spawner components, enemy template and scheduler state.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use super::placement::SpawnPlacement;
use crate::ai::AIConfig;
use crate::combat::{Damageable, DeathSettings};
use crate::reaction::{attach_reaction_rig, ReactionProfile, RigLayout};
use crate::scheduling::{Continuation, ContinuationQueue, TimerHandle};

/// Режим спавна (взаимоисключающие)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnMode {
    /// Каждые `spawn_interval` секунд, пока не упёрлись в cap
    Continuous,
    /// `enemies_per_wave` за волну, пауза `wave_delay`, всего `max_waves`
    Waved {
        enemies_per_wave: u32,
        wave_delay: f32,
        max_waves: u32,
    },
}

impl SpawnMode {
    pub fn waves(enemies_per_wave: u32, wave_delay: f32, max_waves: u32) -> Self {
        Self::Waved {
            enemies_per_wave,
            wave_delay,
            max_waves,
        }
    }
}

impl Default for SpawnMode {
    fn default() -> Self {
        Self::Continuous
    }
}

/// Шаблон врага: всё, что нужно, чтобы собрать entity при спавне
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTemplate {
    pub max_health: f32,
    pub death: DeathSettings,
    pub ai: AIConfig,
    pub reaction: ReactionProfile,
    pub rig: RigLayout,
    pub collider_radius: f32,
    pub collider_half_height: f32,
}

impl Default for EnemyTemplate {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            death: DeathSettings::default(),
            ai: AIConfig::default(),
            reaction: ReactionProfile::ragdoll(),
            rig: RigLayout::humanoid(),
            collider_radius: 0.4,
            collider_half_height: 0.5,
        }
    }
}

/// Собрать врага по шаблону (корень kinematic, rig в покое).
pub fn spawn_enemy(commands: &mut Commands, template: &EnemyTemplate, position: Vec3) -> Entity {
    let transform = Transform::from_translation(position);

    let enemy = commands
        .spawn((
            Name::new("Enemy"),
            transform,
            Damageable::new(template.max_health),
            template.death.clone(),
            template.ai.clone(),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(template.collider_half_height, template.collider_radius),
            crate::layers::enemy_groups(),
        ))
        .id();

    attach_reaction_rig(commands, enemy, &transform, template.reaction.clone(), &template.rig);

    enemy
}

/// Спавнер (конфигурация, задаётся один раз внешним setup кодом)
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[require(SpawnerState, Transform)]
#[serde(default)]
pub struct Spawner {
    pub template: EnemyTemplate,
    pub placement: SpawnPlacement,
    pub mode: SpawnMode,
    /// Секунды между спавнами
    pub spawn_interval: f32,
    /// Cap на число живых заспавненных
    pub max_enemies: usize,
    pub spawn_on_start: bool,
}

impl Default for Spawner {
    fn default() -> Self {
        Self {
            template: EnemyTemplate::default(),
            placement: SpawnPlacement::default(),
            mode: SpawnMode::Continuous,
            spawn_interval: 2.0,
            max_enemies: 10,
            spawn_on_start: true,
        }
    }
}

/// Runtime состояние спавнера
///
/// `active` меняют только спавн (insert) и обработчик смерти (remove),
/// оба в потоке симуляции.
#[derive(Component, Debug, Clone, Default)]
pub struct SpawnerState {
    running: bool,
    pub active: Vec<Entity>,
    /// 1-based; 0 до первой волны
    pub current_wave: u32,
    pub spawned_in_wave: u32,
    pub total_spawned: u32,
    waves_complete: bool,
    pending: Option<TimerHandle>,
}

impl SpawnerState {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn waves_complete(&self) -> bool {
        self.waves_complete
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Запустить планирование. No-op если уже запущен или волны исчерпаны.
    pub fn start(&mut self, owner: Entity, queue: &mut ContinuationQueue) -> bool {
        if self.running || self.waves_complete {
            return false;
        }

        self.running = true;
        self.pending = Some(queue.schedule(owner, 0.0, Continuation::SpawnTick));
        true
    }

    /// Остановить и отменить запланированный шаг. Живых врагов не трогает.
    pub fn stop(&mut self, queue: &mut ContinuationQueue) -> bool {
        if !self.running {
            return false;
        }

        self.running = false;
        if let Some(handle) = self.pending.take() {
            queue.cancel(handle);
        }
        true
    }

    pub(crate) fn set_pending(&mut self, handle: TimerHandle) {
        self.pending = Some(handle);
    }

    pub(crate) fn finish_waves(&mut self) {
        self.running = false;
        self.waves_complete = true;
        self.pending = None;
    }

    pub(crate) fn register(&mut self, enemy: Entity) {
        self.active.push(enemy);
        self.spawned_in_wave += 1;
        self.total_spawned += 1;
    }

    /// true если entity был в active.
    pub(crate) fn forget(&mut self, enemy: Entity) -> bool {
        let before = self.active.len();
        self.active.retain(|&e| e != enemy);
        self.active.len() != before
    }
}

/// Какой спавнер создал врага
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnedBy(pub Entity);
