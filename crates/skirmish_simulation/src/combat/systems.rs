//! Damage, heal and death systems.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::damageable::{DamageOutcome, Damageable, Dead, DeathSettings};
use super::events::{DamageRequest, DamageTaken, EntityDied, HealRequest, HealthChanged, KillRequest};
use crate::reaction::{random_in_unit_sphere, ImpactEvent, ImpactKind, ImpactRequest};
use crate::scheduling::{Continuation, ContinuationFired, ContinuationQueue};
use crate::DeterministicRng;

/// Множитель fallback-удара, когда источник урона не передал точку/силу
pub const FALLBACK_FORCE_PER_DAMAGE: f32 = 5.0;

/// Общие побочные эффекты смерти (для damage и kill систем)
#[derive(SystemParam)]
pub struct DeathEffects<'w, 's> {
    commands: Commands<'w, 's>,
    queue: ResMut<'w, ContinuationQueue>,
    rng: ResMut<'w, DeterministicRng>,
    impacts: EventWriter<'w, ImpactRequest>,
    died: EventWriter<'w, EntityDied>,
}

impl DeathEffects<'_, '_> {
    /// Смертельный переход уже произошёл в `Damageable`, здесь только последствия:
    /// 1. death impact (удар × multiplier или случайное направление)
    /// 2. `EntityDied` + маркер `Dead`
    /// 3. отложенное удаление
    fn on_death(
        &mut self,
        entity: Entity,
        killer: Option<Entity>,
        impact: Option<ImpactEvent>,
        settings: &DeathSettings,
        max_health: f32,
        position: Vec3,
    ) {
        if settings.react_on_death {
            let impact = match impact {
                Some(impact) => impact.amplified(settings.death_multiplier),
                None => {
                    let direction = random_in_unit_sphere(&mut self.rng.rng)
                        .try_normalize()
                        .unwrap_or(Vec3::Y);
                    ImpactEvent::new(position, direction, max_health * settings.death_multiplier)
                }
            };

            self.impacts.write(ImpactRequest {
                entity,
                impact,
                kind: ImpactKind::Death,
            });
        }

        self.died.write(EntityDied { entity, killer });
        self.commands.entity(entity).try_insert(Dead);

        if settings.destroy_on_death {
            self.queue
                .schedule(entity, settings.destroy_delay, Continuation::Despawn);
        }

        crate::log_info(&format!("💀 Entity {:?} died (killer: {:?})", entity, killer));
    }
}

/// Система: применить DamageRequest
///
/// Выжил → `HealthChanged` + `DamageTaken` + hit impact (если `react_on_damage`).
/// Умер → `HealthChanged` + `DamageTaken` + death flow (ровно один раз).
/// Мёртвые и неуязвимые цели молча игнорируют урон.
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<(&mut Damageable, Option<&DeathSettings>, Option<&Transform>)>,
    mut health_changed: EventWriter<HealthChanged>,
    mut damage_taken: EventWriter<DamageTaken>,
    mut effects: DeathEffects,
) {
    for request in requests.read() {
        let Ok((mut damageable, settings, transform)) = targets.get_mut(request.target) else {
            crate::log_warning(&format!(
                "DamageRequest for {:?} without Damageable, ignored",
                request.target
            ));
            continue;
        };

        let settings = settings.cloned().unwrap_or_default();
        let position = transform.map(|t| t.translation).unwrap_or(Vec3::ZERO);

        match damageable.take_damage(request.amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Damaged { health } => {
                health_changed.write(HealthChanged {
                    entity: request.target,
                    current: health,
                    max: damageable.max(),
                });
                damage_taken.write(DamageTaken {
                    entity: request.target,
                    amount: request.amount,
                    source: request.source,
                });

                if settings.react_on_damage {
                    let impact = match request.impact {
                        Some(impact) if impact.magnitude > 0.0 => impact,
                        _ => {
                            let forward = transform.map(|t| t.forward().as_vec3()).unwrap_or(Vec3::NEG_Z);
                            ImpactEvent::new(position, forward, request.amount * FALLBACK_FORCE_PER_DAMAGE)
                        }
                    };

                    effects.impacts.write(ImpactRequest {
                        entity: request.target,
                        impact,
                        kind: ImpactKind::Hit,
                    });
                }
            }
            DamageOutcome::Killed => {
                health_changed.write(HealthChanged {
                    entity: request.target,
                    current: 0.0,
                    max: damageable.max(),
                });
                damage_taken.write(DamageTaken {
                    entity: request.target,
                    amount: request.amount,
                    source: request.source,
                });
                effects.on_death(
                    request.target,
                    request.source,
                    request.impact,
                    &settings,
                    damageable.max(),
                    position,
                );
            }
        }
    }
}

/// Система: лечение (мёртвые не лечатся)
pub fn apply_heal_requests(
    mut requests: EventReader<HealRequest>,
    mut targets: Query<&mut Damageable>,
    mut health_changed: EventWriter<HealthChanged>,
) {
    for request in requests.read() {
        let Ok(mut damageable) = targets.get_mut(request.target) else {
            continue;
        };

        if let Some(current) = damageable.heal(request.amount) {
            health_changed.write(HealthChanged {
                entity: request.target,
                current,
                max: damageable.max(),
            });
        }
    }
}

/// Система: принудительная смерть (no-op для уже мёртвых)
pub fn apply_kill_requests(
    mut requests: EventReader<KillRequest>,
    mut targets: Query<(&mut Damageable, Option<&DeathSettings>, Option<&Transform>)>,
    mut health_changed: EventWriter<HealthChanged>,
    mut effects: DeathEffects,
) {
    for request in requests.read() {
        let Ok((mut damageable, settings, transform)) = targets.get_mut(request.target) else {
            continue;
        };

        if !damageable.die() {
            continue;
        }

        let settings = settings.cloned().unwrap_or_default();
        let position = transform.map(|t| t.translation).unwrap_or(Vec3::ZERO);

        health_changed.write(HealthChanged {
            entity: request.target,
            current: 0.0,
            max: damageable.max(),
        });
        effects.on_death(
            request.target,
            request.killer,
            None,
            &settings,
            damageable.max(),
            position,
        );
    }
}

/// Система: отложенное удаление мёртвых (continuation `Despawn`)
///
/// Тела rig'а удаляет observer в reaction, continuation'ы владельца: observer в scheduling.
pub fn despawn_on_continuation(mut fired: EventReader<ContinuationFired>, mut commands: Commands) {
    for event in fired.read() {
        if event.continuation != Continuation::Despawn {
            continue;
        }

        if let Ok(mut entity_commands) = commands.get_entity(event.owner) {
            crate::log(&format!("⚰️ Despawning entity {:?} (timeout)", event.owner));
            entity_commands.try_despawn();
        }
    }
}
