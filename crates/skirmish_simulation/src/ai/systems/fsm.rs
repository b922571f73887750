//! AI FSM systems: initial state, transitions, attack execution.

use bevy::prelude::*;

use crate::ai::transitions::evaluate_transition;
use crate::ai::{AIConfig, AIState, AttackClock, AttackPerformed, PathfindingAgent, Pursuit, TargetDetected, TargetLost};
use crate::combat::{DamageRequest, Damageable, Dead};
use crate::reaction::Limp;

/// Система: выставить начальное состояние новым агентам.
pub fn ai_initial_state(mut agents: Query<(&AIConfig, &mut AIState), Added<AIConfig>>) {
    for (config, mut state) in agents.iter_mut() {
        *state = config.initial_state();
    }
}

/// Система: AI FSM transitions
///
/// Обновляет AIState по расстоянию до цели и таймерам удара.
/// Вход в Attacking фиксирует время удара (сам удар: `ai_attack_execution`).
/// Обмякший (`Limp`) агент замирает в текущем состоянии.
pub fn ai_fsm_transitions(
    mut agents: Query<
        (Entity, &AIConfig, &Pursuit, &mut AttackClock, &mut AIState),
        (Without<Dead>, Without<Limp>),
    >,
    mut detected_events: EventWriter<TargetDetected>,
    mut lost_events: EventWriter<TargetLost>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();

    for (entity, config, pursuit, mut clock, mut state) in agents.iter_mut() {
        let current = *state;
        let next = evaluate_transition(current, config, pursuit.distance, &clock, now);

        if next == current {
            continue;
        }

        match (current, next) {
            (AIState::Idle | AIState::Wandering, AIState::Chasing) => {
                if let Some(target) = pursuit.target {
                    detected_events.write(TargetDetected { agent: entity, target });
                }
            }
            (AIState::Chasing | AIState::Attacking, AIState::Idle | AIState::Wandering) => {
                lost_events.write(TargetLost {
                    agent: entity,
                    target: pursuit.target,
                });
            }
            (_, AIState::Attacking) => clock.begin_attack(now),
            _ => {}
        }

        crate::log(&format!("🤖 AI {:?}: {:?} → {:?}", entity, current, next));
        *state = next;
    }
}

/// Система: AI attack execution
///
/// Один удар на вход в Attacking: агент останавливается, и если цель
/// всё ещё в attack_range и умеет принимать урон: отправляется DamageRequest.
/// Цель без `Damageable`: тихий no-op. Удар, пришедшийся на `Limp`, сгорает.
pub fn ai_attack_execution(
    mut agents: Query<
        (
            Entity,
            &Transform,
            &AIConfig,
            &AIState,
            &Pursuit,
            &mut AttackClock,
            Option<&mut PathfindingAgent>,
            Has<Limp>,
        ),
        Without<Dead>,
    >,
    damageables: Query<(), With<Damageable>>,
    mut damage_requests: EventWriter<DamageRequest>,
    mut performed: EventWriter<AttackPerformed>,
) {
    for (entity, transform, config, state, pursuit, mut clock, agent, limp) in agents.iter_mut() {
        if *state != AIState::Attacking || !clock.strike_pending {
            continue;
        }
        clock.strike_pending = false;

        if let Some(mut agent) = agent {
            agent.stop();
        }

        if limp {
            continue;
        }

        let (Some(target), Some(target_position), Some(distance)) =
            (pursuit.target, pursuit.target_position, pursuit.distance)
        else {
            continue;
        };

        if distance > config.attack_range || damageables.get(target).is_err() {
            continue;
        }

        let direction = (target_position - transform.translation).normalize_or_zero();
        damage_requests.write(
            DamageRequest::hit(target, target_position, direction * config.attack_damage, config.attack_damage)
                .from_source(entity),
        );
        performed.write(AttackPerformed {
            attacker: entity,
            target,
            damage: config.attack_damage,
        });

        crate::log(&format!(
            "⚔️ AI {:?} attacked {:?} for {} damage",
            entity, target, config.attack_damage
        ));
    }
}
