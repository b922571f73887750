//! Combat events (requests in, notifications out).

use bevy::prelude::*;

use crate::reaction::ImpactEvent;

/// Request: нанести урон
///
/// Любой внешний источник урона (оружие, AI атака) передаёт точку,
/// направление и силу удара. Без `impact` реакция использует fallback
/// (позиция цели, forward, `amount * 5`).
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: f32,
    pub impact: Option<ImpactEvent>,
    pub source: Option<Entity>,
}

impl DamageRequest {
    pub fn new(target: Entity, amount: f32) -> Self {
        Self {
            target,
            amount,
            impact: None,
            source: None,
        }
    }

    /// Урон с ударом: `hit_force` = направление × сила.
    pub fn hit(target: Entity, point: Vec3, hit_force: Vec3, amount: f32) -> Self {
        Self {
            impact: Some(ImpactEvent::new(point, hit_force, hit_force.length())),
            ..Self::new(target, amount)
        }
    }

    pub fn with_impact(mut self, impact: ImpactEvent) -> Self {
        self.impact = Some(impact);
        self
    }

    pub fn from_source(mut self, source: Entity) -> Self {
        self.source = Some(source);
        self
    }
}

#[derive(Event, Debug, Clone, Copy)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: f32,
}

/// Request: убить немедленно (без удара, реакция со случайным направлением)
#[derive(Event, Debug, Clone, Copy)]
pub struct KillRequest {
    pub target: Entity,
    pub killer: Option<Entity>,
}

/// Event: здоровье изменилось (урон или лечение)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: f32,
    pub max: f32,
}

/// Event: урон принят (в том числе смертельный, до `EntityDied`)
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageTaken {
    pub entity: Entity,
    pub amount: f32,
    pub source: Option<Entity>,
}

/// Event: entity умер (ровно один раз на entity)
#[derive(Event, Debug, Clone, Copy)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}
