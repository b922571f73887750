//! Damageable component: health pool с однократной смертью.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Результат применения урона.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Урон отброшен (entity мертв или неуязвим)
    Ignored,
    /// Здоровье уменьшилось, entity жив
    Damaged { health: f32 },
    /// Этот удар убил entity (ровно один раз за жизнь)
    Killed,
}

/// Health pool
///
/// Инварианты:
/// - `0 <= current <= max`
/// - `dead` переходит false → true ровно один раз и больше не меняется
/// - мёртвый entity игнорирует урон и лечение
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Damageable {
    current: f32,
    max: f32,
    invulnerable: bool,
    dead: bool,
}

impl Damageable {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            invulnerable: false,
            dead: false,
        }
    }

    /// Стартовое здоровье меньше максимума (clamp в [0, max]).
    pub fn with_current(mut self, current: f32) -> Self {
        self.current = current.clamp(0.0, self.max);
        self
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead || self.invulnerable {
            return DamageOutcome::Ignored;
        }

        self.current = (self.current - amount.max(0.0)).max(0.0);

        if self.current <= 0.0 {
            self.dead = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Damaged {
                health: self.current,
            }
        }
    }

    /// Лечение (clamp к max). None если entity мёртв.
    pub fn heal(&mut self, amount: f32) -> Option<f32> {
        if self.dead {
            return None;
        }

        self.current = (self.current + amount.max(0.0)).min(self.max);
        Some(self.current)
    }

    /// Принудительная смерть. true только при первом переходе.
    pub fn die(&mut self) -> bool {
        if self.dead {
            return false;
        }

        self.current = 0.0;
        self.dead = true;
        true
    }

    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.invulnerable = invulnerable;
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// current / max, 0 при max == 0.
    pub fn health_fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

impl Default for Damageable {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Настройки смерти и реакции на урон
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathSettings {
    /// Множитель силы смертельного удара
    pub death_multiplier: f32,
    pub react_on_damage: bool,
    pub react_on_death: bool,
    pub destroy_on_death: bool,
    /// Секунды до удаления тела
    pub destroy_delay: f32,
}

impl Default for DeathSettings {
    fn default() -> Self {
        Self {
            death_multiplier: 2.0,
            react_on_damage: true,
            react_on_death: true,
            destroy_on_death: true,
            destroy_delay: 5.0,
        }
    }
}

impl DeathSettings {
    /// Игрок: без реакции и без удаления.
    pub fn player() -> Self {
        Self {
            react_on_damage: false,
            react_on_death: false,
            destroy_on_death: false,
            ..default()
        }
    }
}

/// Маркер: entity мёртв (AI и спавнер его больше не трогают)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// Маркер игрока (смерть игрока = GameOver)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Тег для поиска цели AI ("Player" по умолчанию).
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
pub struct TargetTag(pub String);

impl TargetTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.0 == tag
    }
}
