//! AI events

use bevy::prelude::*;

/// Event: агент начал преследование
#[derive(Event, Debug, Clone, Copy)]
pub struct TargetDetected {
    pub agent: Entity,
    pub target: Entity,
}

/// Event: цель потеряна (вышла из радиуса, умерла или удалена)
#[derive(Event, Debug, Clone, Copy)]
pub struct TargetLost {
    pub agent: Entity,
    pub target: Option<Entity>,
}

/// Event: удар нанесён (damage request отправлен)
#[derive(Event, Debug, Clone, Copy)]
pub struct AttackPerformed {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: f32,
}
