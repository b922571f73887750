//! Kill ledger: счётчик убийств с edge-triggered порогом.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Счётчик убийств уровня
///
/// Инварианты:
/// - `current` только растёт (кроме явных `reset` / `set_kills`)
/// - "target reached" срабатывает один раз, пока не будет `reset`
/// - смена цели после срабатывания не перевзводит сигнал
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillLedger {
    current: u32,
    target: u32,
    reached_fired: bool,
}

impl KillLedger {
    pub fn new(target: u32) -> Self {
        Self {
            current: 0,
            target,
            reached_fired: false,
        }
    }

    /// +1. Возвращает true ровно на том вызове, где порог впервые достигнут.
    pub fn add_kill(&mut self) -> bool {
        self.add_kills(1)
    }

    pub fn add_kills(&mut self, amount: u32) -> bool {
        self.current = self.current.saturating_add(amount);
        self.check_threshold()
    }

    /// Перезаписать счётчик (debug/admin). Тот же edge-trigger, что и у add.
    pub fn set_kills(&mut self, kills: u32) -> bool {
        self.current = kills;
        self.check_threshold()
    }

    /// Обнулить счётчик и перевзвести сигнал
    pub fn reset(&mut self) {
        self.current = 0;
        self.reached_fired = false;
    }

    /// Не перевзводит сигнал (только `reset`)
    pub fn set_target(&mut self, target: u32) {
        self.target = target;
    }

    fn check_threshold(&mut self) -> bool {
        if self.reached_fired || self.current < self.target {
            return false;
        }
        self.reached_fired = true;
        true
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn remaining(&self) -> u32 {
        self.target.saturating_sub(self.current)
    }

    /// current / target в [0, 1]
    pub fn progress(&self) -> f32 {
        if self.target == 0 {
            return 1.0;
        }
        (self.current as f32 / self.target as f32).min(1.0)
    }

    pub fn is_target_reached(&self) -> bool {
        self.current >= self.target
    }

    /// Сигнал уже отправлен в текущем цикле
    pub fn has_fired(&self) -> bool {
        self.reached_fired
    }
}

impl Default for KillLedger {
    fn default() -> Self {
        Self::new(10)
    }
}
