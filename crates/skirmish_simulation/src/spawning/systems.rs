//! Spawn scheduling systems.

use bevy::ecs::entity::Entities;
use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, CollisionGroups};

use super::placement::{resolve_spawn_position, snap_to_ground};
use super::spawner::{spawn_enemy, SpawnMode, SpawnedBy, Spawner, SpawnerState};
use super::{AllWavesComplete, EnemySpawned, SpawnerCommand};
use crate::combat::EntityDied;
use crate::encounter::AddKills;
use crate::scheduling::{Continuation, ContinuationFired, ContinuationQueue};
use crate::DeterministicRng;

/// Система: `spawn_on_start` для только что созданных спавнеров.
pub fn start_new_spawners(
    mut spawners: Query<(Entity, &Spawner, &mut SpawnerState), Added<Spawner>>,
    mut queue: ResMut<ContinuationQueue>,
) {
    for (entity, spawner, mut state) in spawners.iter_mut() {
        if spawner.spawn_on_start && state.start(entity, &mut queue) {
            crate::log_info(&format!("🏭 Spawner {:?} started on creation", entity));
        }
    }
}

/// Система: Start/Stop команды (обе идемпотентны)
pub fn apply_spawner_commands(
    mut commands_in: EventReader<SpawnerCommand>,
    mut spawners: Query<&mut SpawnerState>,
    mut queue: ResMut<ContinuationQueue>,
) {
    for command in commands_in.read() {
        let Ok(mut state) = spawners.get_mut(command.spawner()) else {
            crate::log_warning(&format!("{:?} targets a missing spawner", command));
            continue;
        };

        let changed = match command {
            SpawnerCommand::Start(entity) => state.start(*entity, &mut queue),
            SpawnerCommand::Stop(_) => state.stop(&mut queue),
        };

        if changed {
            crate::log_info(&format!("🏭 {:?} applied", command));
        }
    }
}

/// Система: созревшие шаги спавнера
///
/// Continuous: спавн (если ниже cap) и следующий шаг через `spawn_interval`.
/// Waved:
/// - волна не добрана → спавн (если ниже cap), следующий шаг через `spawn_interval`
/// - волна добрана → `AdvanceWave` или (последняя волна) `FinishWaves` через `wave_delay`
/// - `FinishWaves` → `AllWavesComplete` один раз, спавнер останавливается навсегда
#[allow(clippy::too_many_arguments)]
pub fn run_spawn_continuations(
    mut fired: EventReader<ContinuationFired>,
    mut spawners: Query<(&Spawner, &mut SpawnerState, &Transform)>,
    grounds: Query<(&Collider, &Transform, &CollisionGroups)>,
    mut commands: Commands,
    mut queue: ResMut<ContinuationQueue>,
    mut rng: ResMut<DeterministicRng>,
    mut spawned_events: EventWriter<EnemySpawned>,
    mut complete_events: EventWriter<AllWavesComplete>,
) {
    for event in fired.read() {
        let owner = event.owner;
        let Ok((spawner, mut state, spawner_transform)) = spawners.get_mut(owner) else {
            continue;
        };

        if !state.is_running() {
            continue;
        }

        match (event.continuation, spawner.mode) {
            (Continuation::SpawnTick, SpawnMode::Continuous) => {
                try_spawn(
                    owner,
                    spawner,
                    &mut state,
                    spawner_transform.translation,
                    &grounds,
                    &mut commands,
                    &mut rng,
                    &mut spawned_events,
                );
                state.set_pending(queue.schedule(owner, spawner.spawn_interval, Continuation::SpawnTick));
            }

            (
                Continuation::SpawnTick,
                SpawnMode::Waved {
                    enemies_per_wave,
                    wave_delay,
                    max_waves,
                },
            ) => {
                if max_waves == 0 {
                    state.set_pending(queue.schedule(owner, 0.0, Continuation::FinishWaves));
                    continue;
                }

                if state.current_wave == 0 {
                    state.current_wave = 1;
                    crate::log_info(&format!("🌊 Spawner {:?}: wave 1/{}", owner, max_waves));
                }

                if state.spawned_in_wave < enemies_per_wave {
                    try_spawn(
                        owner,
                        spawner,
                        &mut state,
                        spawner_transform.translation,
                        &grounds,
                        &mut commands,
                        &mut rng,
                        &mut spawned_events,
                    );
                }

                let next = if state.spawned_in_wave < enemies_per_wave {
                    queue.schedule(owner, spawner.spawn_interval, Continuation::SpawnTick)
                } else if state.current_wave < max_waves {
                    queue.schedule(owner, wave_delay, Continuation::AdvanceWave)
                } else {
                    queue.schedule(owner, wave_delay, Continuation::FinishWaves)
                };
                state.set_pending(next);
            }

            (Continuation::AdvanceWave, SpawnMode::Waved { max_waves, .. }) => {
                state.current_wave += 1;
                state.spawned_in_wave = 0;
                crate::log_info(&format!(
                    "🌊 Spawner {:?}: wave {}/{}",
                    owner, state.current_wave, max_waves
                ));
                state.set_pending(queue.schedule(owner, 0.0, Continuation::SpawnTick));
            }

            (Continuation::FinishWaves, SpawnMode::Waved { .. }) => {
                state.finish_waves();
                crate::log_info(&format!(
                    "🏁 Spawner {:?}: all waves complete ({} spawned)",
                    owner, state.total_spawned
                ));
                complete_events.write(AllWavesComplete { spawner: owner });
            }

            _ => {}
        }
    }
}

/// Один спавн с проверкой cap. Пропуск при заполненном cap: не ошибка.
#[allow(clippy::too_many_arguments)]
fn try_spawn(
    owner: Entity,
    spawner: &Spawner,
    state: &mut SpawnerState,
    spawner_position: Vec3,
    grounds: &Query<(&Collider, &Transform, &CollisionGroups)>,
    commands: &mut Commands,
    rng: &mut DeterministicRng,
    spawned_events: &mut EventWriter<EnemySpawned>,
) -> Option<Entity> {
    if state.active_count() >= spawner.max_enemies {
        return None;
    }

    let mut position = resolve_spawn_position(&spawner.placement, spawner_position, &mut rng.rng);
    if let Some(probe) = &spawner.placement.ground {
        position = snap_to_ground(position, probe, grounds.iter());
    }

    let enemy = spawn_enemy(commands, &spawner.template, position);
    commands.entity(enemy).insert(SpawnedBy(owner));
    state.register(enemy);

    crate::log(&format!(
        "👾 Spawner {:?} spawned {:?} at {:?} ({}/{} active)",
        owner,
        enemy,
        position,
        state.active_count(),
        spawner.max_enemies
    ));

    spawned_events.write(EnemySpawned {
        spawner: owner,
        enemy,
        position,
    });

    Some(enemy)
}

/// Система: смерть заспавненного врага → убрать из active, +1 в счётчик убийств.
pub fn track_spawned_deaths(
    mut deaths: EventReader<EntityDied>,
    spawned: Query<&SpawnedBy>,
    mut spawners: Query<&mut SpawnerState>,
    mut kills: EventWriter<AddKills>,
) {
    for death in deaths.read() {
        let Ok(spawned_by) = spawned.get(death.entity) else {
            continue;
        };

        if let Ok(mut state) = spawners.get_mut(spawned_by.0) {
            state.forget(death.entity);
        }

        kills.write(AddKills { amount: 1 });
    }
}

/// Система: враг исчез без смерти → убрать из active без засчитанного убийства.
pub fn prune_vanished_enemies(mut spawners: Query<&mut SpawnerState>, entities: &Entities) {
    for mut state in spawners.iter_mut() {
        if state.active.iter().any(|&e| !entities.contains(e)) {
            state.active.retain(|&e| entities.contains(e));
        }
    }
}
