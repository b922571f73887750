//! Skirmish Simulation Core
//!
//! ECS-симуляция боевого ядра на Bevy 0.16:
//! - combat: health pool, однократная смерть
//! - reaction: физический отклик врага на удар (ragdoll / chaotic)
//! - ai: Idle → Wandering → Chasing → Attacking
//! - spawning: непрерывный спавн и волны
//! - encounter: счётчик убийств и условие завершения уровня
//!
//! Всё выполняется в одном потоке симуляции внутри `FixedUpdate`;
//! отложенные действия: записи в `ContinuationQueue`, а не корутины.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod config;
pub mod encounter;
pub mod layers;
pub mod logger;
pub mod reaction;
pub mod scheduling;
pub mod spawning;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export базовых типов для удобства
pub use ai::{AIConfig, AIPlugin, AIState};
pub use combat::{
    CombatPlugin, DamageRequest, Damageable, Dead, DeathSettings, EntityDied, HealRequest, KillRequest, Player,
    TargetTag,
};
pub use config::{load_config, ConfigError, EncounterConfig};
pub use encounter::{spawn_encounter, EncounterPlugin, KillLedger};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use reaction::{ImpactEvent, ImpactRequest, ReactionPlugin, ReactionProfile, ReactionRig};
pub use scheduling::{Continuation, ContinuationQueue, SchedulingPlugin, TimerHandle};
pub use spawning::{Spawner, SpawnerState, SpawningPlugin};

/// Шаг симуляции: 64 Hz (15.625 ms: точная двоичная дробь,
/// поэтому 0.5s = ровно 32 тика и дедлайны не дрейфуют)
pub const SIM_TICK: Duration = Duration::from_micros(15_625);

/// Фазы одного тика в `FixedUpdate` (строго последовательно)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Созревшие continuation'ы → `ContinuationFired`
    Timers,
    Spawning,
    Ai,
    Combat,
    Reaction,
    /// Учёт смертей (спавнеры, счётчик) и удаление трупов
    Bookkeeping,
    Encounter,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed из create_headless_app не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.insert_resource(Time::<Fixed>::from_duration(SIM_TICK))
            .configure_sets(
                FixedUpdate,
                (
                    SimSet::Timers,
                    SimSet::Spawning,
                    SimSet::Ai,
                    SimSet::Combat,
                    SimSet::Reaction,
                    SimSet::Bookkeeping,
                    SimSet::Encounter,
                )
                    .chain(),
            )
            // Подсистемы
            .add_plugins((
                SchedulingPlugin,
                CombatPlugin,
                ReactionPlugin,
                AIPlugin,
                SpawningPlugin,
                EncounterPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время ручное: каждый `app.update()` (кроме первого) = ровно один `SIM_TICK`.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_duration(SIM_TICK))
        .insert_resource(TimeUpdateStrategy::ManualDuration(SIM_TICK));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
