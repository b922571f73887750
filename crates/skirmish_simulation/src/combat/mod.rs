//! Combat module: health, damage intake, death
//!
//! ECS ответственность:
//! - Damageable: health pool, однократная смерть, неуязвимость
//! - Requests: DamageRequest, HealRequest, KillRequest
//! - Notifications: HealthChanged, DamageTaken, EntityDied
//!
//! Физическая реакция не здесь: combat только пишет `ImpactRequest`,
//! reaction engine применяет его в `SimSet::Reaction`.

use bevy::prelude::*;

pub mod damageable;
pub mod events;
pub mod systems;


// Re-export основных типов
pub use damageable::{DamageOutcome, Damageable, Dead, DeathSettings, Player, TargetTag};
pub use events::{DamageRequest, DamageTaken, EntityDied, HealRequest, HealthChanged, KillRequest};
pub use systems::FALLBACK_FORCE_PER_DAMAGE;

/// Combat Plugin
///
/// Порядок выполнения (SimSet::Combat):
/// 1. apply_damage_requests: урон, hit/death impacts
/// 2. apply_heal_requests
/// 3. apply_kill_requests: принудительная смерть
///
/// SimSet::Bookkeeping: despawn_on_continuation: отложенное удаление трупов
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<DamageRequest>()
            .add_event::<HealRequest>()
            .add_event::<KillRequest>()
            .add_event::<HealthChanged>()
            .add_event::<DamageTaken>()
            .add_event::<EntityDied>();

        app.add_systems(
            FixedUpdate,
            (
                systems::apply_damage_requests,
                systems::apply_heal_requests,
                systems::apply_kill_requests,
            )
                .chain()
                .in_set(crate::SimSet::Combat),
        )
        .add_systems(
            FixedUpdate,
            systems::despawn_on_continuation.in_set(crate::SimSet::Bookkeeping),
        );
    }
}
