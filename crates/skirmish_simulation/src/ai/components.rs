//! FSM AI components (state, config, pursuit, attack timing, wander).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// AI FSM состояния
///
/// Смерть здесь не моделируется: мёртвый враг получает маркер `Dead`
/// и просто выпадает из всех AI запросов.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum AIState {
    /// Стоим, ждём цель
    #[default]
    Idle,
    /// Бродим вокруг точки спавна
    Wandering,
    /// Преследуем цель
    Chasing,
    /// Удар нанесён, ждём attack_recovery
    Attacking,
}

/// Параметры AI
///
/// `AIConfig` тянет за собой остальные AI компоненты (required components),
/// начальное состояние выставляет `ai_initial_state`.
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[require(AIState, Pursuit, AttackClock, WanderState)]
#[serde(default)]
pub struct AIConfig {
    pub move_speed: f32,
    /// Скорость поворота (slerp factor в секунду)
    pub rotation_speed: f32,
    /// Радиус обнаружения (метры, евклидово расстояние)
    pub detection_range: f32,
    pub attack_range: f32,
    /// Секунды между ударами
    pub attack_cooldown: f32,
    pub attack_damage: f32,
    /// Секунды в Attacking после удара
    pub attack_recovery: f32,
    pub wander_radius: f32,
    pub wander_interval: f32,
    pub wander_speed_factor: f32,
    pub can_wander: bool,
    pub can_attack: bool,
    /// Преследовать найденную цель на любом расстоянии
    pub always_chase: bool,
    pub target_tag: String,
    /// Rapier group bits для fallback поиска цели
    pub target_layer: u32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            rotation_speed: 5.0,
            detection_range: 10.0,
            attack_range: 2.0,
            attack_cooldown: 2.0,
            attack_damage: 10.0,
            attack_recovery: 0.5,
            wander_radius: 5.0,
            wander_interval: 3.0,
            wander_speed_factor: 0.5,
            can_wander: true,
            can_attack: true,
            always_chase: false,
            target_tag: "Player".to_string(),
            target_layer: crate::layers::PLAYER.bits(),
        }
    }
}

impl AIConfig {
    /// Wandering если бродить разрешено, иначе Idle.
    pub fn initial_state(&self) -> AIState {
        if self.can_wander {
            AIState::Wandering
        } else {
            AIState::Idle
        }
    }
}

/// Текущая цель (обновляется perception каждый тик)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Pursuit {
    pub target: Option<Entity>,
    /// Позиция цели на этом тике
    pub target_position: Option<Vec3>,
    pub distance: Option<f32>,
}

impl Pursuit {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Время ударов (секунды симуляции)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct AttackClock {
    pub last_attack: Option<f32>,
    /// Момент входа в Attacking
    pub attack_started: Option<f32>,
    /// Удар ещё не нанесён (выставляется при входе в Attacking)
    pub strike_pending: bool,
}

impl AttackClock {
    /// Первый удар доступен сразу.
    pub fn cooldown_ready(&self, now: f32, cooldown: f32) -> bool {
        self.last_attack.is_none_or(|last| now >= last + cooldown)
    }

    pub fn recovery_elapsed(&self, now: f32, recovery: f32) -> bool {
        self.attack_started.is_some_and(|started| now >= started + recovery)
    }

    pub fn begin_attack(&mut self, now: f32) {
        self.last_attack = Some(now);
        self.attack_started = Some(now);
        self.strike_pending = true;
    }
}

/// Состояние блуждания вокруг точки спавна
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct WanderState {
    /// Точка спавна (фиксируется на первом тике)
    pub origin: Option<Vec3>,
    pub goal: Option<Vec3>,
    /// Когда выбрать новую точку
    pub next_pick: f32,
}

/// Абстракция навигации: если есть, AI выставляет destination вместо прямого движения
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PathfindingAgent {
    pub destination: Option<Vec3>,
    pub speed: f32,
}

impl PathfindingAgent {
    pub fn stop(&mut self) {
        self.destination = None;
    }
}
