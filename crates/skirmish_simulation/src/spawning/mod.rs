//! Spawn & wave scheduler
//!
//! Держит популяцию живых врагов ниже cap, спавнит непрерывно или волнами.
//! Позиция: точки → area → радиус вокруг спавнера, затем посадка на землю.
//!
//! Все паузы (interval, wave delay): continuation'ы в `ContinuationQueue`;
//! Stop отменяет запланированный шаг, не трогая уже живых врагов.

use bevy::prelude::*;

pub mod placement;
pub mod spawner;
pub mod systems;


pub use placement::{resolve_spawn_position, snap_to_ground, GroundProbe, SpawnArea, SpawnPlacement};
pub use spawner::{spawn_enemy, EnemyTemplate, SpawnMode, SpawnedBy, Spawner, SpawnerState};

/// Request: запустить/остановить спавнер (идемпотентно)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnerCommand {
    Start(Entity),
    Stop(Entity),
}

impl SpawnerCommand {
    pub fn spawner(&self) -> Entity {
        match self {
            Self::Start(entity) | Self::Stop(entity) => *entity,
        }
    }
}

#[derive(Event, Debug, Clone, Copy)]
pub struct EnemySpawned {
    pub spawner: Entity,
    pub enemy: Entity,
    pub position: Vec3,
}

/// Event: последняя волна отыграна (ровно один раз на спавнер)
#[derive(Event, Debug, Clone, Copy)]
pub struct AllWavesComplete {
    pub spawner: Entity,
}

/// Spawning Plugin
///
/// SimSet::Spawning: start_new_spawners → apply_spawner_commands → run_spawn_continuations
/// SimSet::Bookkeeping: track_spawned_deaths → prune_vanished_enemies
pub struct SpawningPlugin;

impl Plugin for SpawningPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SpawnerCommand>()
            .add_event::<EnemySpawned>()
            .add_event::<AllWavesComplete>();

        app.add_systems(
            FixedUpdate,
            (
                systems::start_new_spawners,
                systems::apply_spawner_commands,
                systems::run_spawn_continuations,
            )
                .chain()
                .in_set(crate::SimSet::Spawning),
        )
        .add_systems(
            FixedUpdate,
            (systems::track_spawned_deaths, systems::prune_vanished_enemies)
                .chain()
                .in_set(crate::SimSet::Bookkeeping),
        );
    }
}
