//! Reaction systems: impact → импульсы, остаточная серия, восстановление.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::model::{plan_impulses, plan_residual, BodySample};
use super::rig::{Limp, ReactionBody, ReactionRig};
use super::{ImpactApplied, ImpactRequest, RigActivated, RigRecovered};
use crate::combat::Damageable;
use crate::scheduling::{Continuation, ContinuationFired, ContinuationQueue};
use crate::DeterministicRng;

/// Система: применить все ImpactRequest этого тика
///
/// 1. Первый удар переводит все тела rig'а в Dynamic (`RigActivated` + `Limp`)
/// 2. Импульсы из `plan_impulses` добавляются в `ExternalImpulse`
/// 3. Остаточная серия и таймер восстановления уходят в `ContinuationQueue`
///
/// Повторный удар перезапускает таймер восстановления.
pub fn apply_impact_requests(
    mut requests: EventReader<ImpactRequest>,
    mut rigs: Query<&mut ReactionRig>,
    mut bodies: Query<(&Transform, &mut RigidBody, &mut ExternalImpulse), With<ReactionBody>>,
    mut rng: ResMut<DeterministicRng>,
    mut queue: ResMut<ContinuationQueue>,
    mut applied: EventWriter<ImpactApplied>,
    mut activated: EventWriter<RigActivated>,
    mut commands: Commands,
) {
    for request in requests.read() {
        let Ok(mut rig) = rigs.get_mut(request.entity) else {
            crate::log_warning(&format!(
                "No reaction rig on {:?}, {:?} impact ignored",
                request.entity, request.kind
            ));
            continue;
        };

        if rig.bodies.is_empty() {
            crate::log_warning(&format!(
                "Reaction rig on {:?} has no bodies, impact ignored",
                request.entity
            ));
            continue;
        }

        if rig.activate() {
            for &body in &rig.bodies {
                if let Ok((_, mut rigid_body, _)) = bodies.get_mut(body) {
                    *rigid_body = RigidBody::Dynamic;
                }
            }
            commands.entity(request.entity).try_insert(Limp);
            activated.write(RigActivated {
                entity: request.entity,
            });
        }

        let samples: Vec<BodySample> = rig
            .bodies
            .iter()
            .filter_map(|&entity| {
                bodies.get(entity).ok().map(|(transform, _, _)| BodySample {
                    entity,
                    position: transform.translation,
                })
            })
            .collect();

        let plan = plan_impulses(&rig.profile, &request.impact, &samples, &mut rng.rng);
        for step in &plan {
            if let Ok((_, _, mut external)) = bodies.get_mut(step.entity) {
                external.impulse += step.impulse;
                external.torque_impulse += step.torque;
            }
        }

        if let Some(residual) = rig.profile.residual {
            for tick in 1..=residual.ticks {
                queue.schedule(
                    request.entity,
                    residual.spacing * tick as f32,
                    Continuation::ResidualImpulse {
                        magnitude: request.impact.magnitude,
                    },
                );
            }
        }

        if rig.profile.auto_recover {
            let handle = queue.schedule(request.entity, rig.profile.recovery_time, Continuation::RecoverRig);
            if let Some(previous) = rig.replace_recovery(Some(handle)) {
                queue.cancel(previous);
            }
        }

        crate::log(&format!(
            "💥 {:?} impact on {:?}: magnitude {:.1}, {} bodies",
            request.kind,
            request.entity,
            request.impact.magnitude,
            plan.len()
        ));

        applied.write(ImpactApplied {
            entity: request.entity,
            impact: request.impact,
            kind: request.kind,
            bodies: plan.len(),
        });
    }
}

/// Система: один шаг остаточной серии (chaotic профиль)
///
/// Пропускается, если rig уже успел восстановиться.
pub fn apply_residual_impulses(
    mut fired: EventReader<ContinuationFired>,
    rigs: Query<&ReactionRig>,
    mut bodies: Query<&mut ExternalImpulse, With<ReactionBody>>,
    mut rng: ResMut<DeterministicRng>,
) {
    for event in fired.read() {
        let Continuation::ResidualImpulse { magnitude } = event.continuation else {
            continue;
        };

        let Ok(rig) = rigs.get(event.owner) else {
            continue;
        };

        let Some(sequence) = rig.profile.residual else {
            continue;
        };

        if !rig.is_active() {
            continue;
        }

        for step in plan_residual(&sequence, magnitude, &rig.bodies, &mut rng.rng) {
            if let Ok(mut external) = bodies.get_mut(step.entity) {
                external.impulse += step.impulse;
                external.torque_impulse += step.torque;
            }
        }
    }
}

/// Система: таймер восстановления истёк → тела снова kinematic
///
/// Мёртвый владелец остаётся обмякшим навсегда.
pub fn recover_rigs(
    mut fired: EventReader<ContinuationFired>,
    mut rigs: Query<&mut ReactionRig>,
    mut bodies: Query<&mut RigidBody, With<ReactionBody>>,
    damageables: Query<&Damageable>,
    mut recovered: EventWriter<RigRecovered>,
    mut commands: Commands,
) {
    for event in fired.read() {
        if event.continuation != Continuation::RecoverRig {
            continue;
        }

        let Ok(mut rig) = rigs.get_mut(event.owner) else {
            continue;
        };

        if damageables.get(event.owner).is_ok_and(|d| d.is_dead()) {
            rig.replace_recovery(None);
            crate::log(&format!("🪦 {:?} is dead, rig stays limp", event.owner));
            continue;
        }

        rig.settle();
        for &body in &rig.bodies {
            if let Ok(mut rigid_body) = bodies.get_mut(body) {
                *rigid_body = RigidBody::KinematicPositionBased;
            }
        }

        commands.entity(event.owner).try_remove::<Limp>();

        crate::log(&format!("🧍 Rig recovered on {:?}", event.owner));
        recovered.write(RigRecovered { entity: event.owner });
    }
}

/// Система: пока rig неактивен, отдельные тела повторяют позу владельца.
pub fn follow_owner_while_kinematic(
    owners: Query<(&Transform, &ReactionRig), Without<ReactionBody>>,
    mut bodies: Query<(&mut Transform, &ReactionBody)>,
) {
    for (mut transform, body) in bodies.iter_mut() {
        let Ok((owner_transform, rig)) = owners.get(body.owner) else {
            continue;
        };

        if rig.is_active() {
            continue;
        }

        transform.translation = owner_transform.translation + owner_transform.rotation * body.rest_offset;
        transform.rotation = owner_transform.rotation;
    }
}

/// Observer: владелец rig'а удалён → удалить отдельные тела.
pub fn despawn_rig_bodies(
    trigger: Trigger<OnRemove, ReactionRig>,
    rigs: Query<&ReactionRig>,
    mut commands: Commands,
) {
    let owner = trigger.target();
    let Ok(rig) = rigs.get(owner) else {
        return;
    };

    for &body in rig.bodies.iter().filter(|&&b| b != owner) {
        if let Ok(mut entity_commands) = commands.get_entity(body) {
            entity_commands.try_despawn();
        }
    }
}
