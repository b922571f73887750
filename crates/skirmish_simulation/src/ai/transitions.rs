//! Чистая функция переходов FSM (без ECS, тестируется напрямую).

use super::components::{AIConfig, AIState, AttackClock};

/// Цель в радиусе обнаружения (или "always chase" и цель вообще есть).
pub fn target_detected(config: &AIConfig, target_distance: Option<f32>) -> bool {
    match target_distance {
        Some(_) if config.always_chase => true,
        Some(distance) => distance <= config.detection_range,
        None => false,
    }
}

/// Один шаг FSM:
/// - Idle/Wandering → Chasing: цель обнаружена
/// - Chasing → Attacking: цель в attack_range и cooldown прошёл
/// - Attacking → Chasing: через attack_recovery после удара
/// - Chasing/Attacking → начальное состояние: цель потеряна
pub fn evaluate_transition(
    state: AIState,
    config: &AIConfig,
    target_distance: Option<f32>,
    clock: &AttackClock,
    now: f32,
) -> AIState {
    let detected = target_detected(config, target_distance);

    match state {
        AIState::Idle | AIState::Wandering => {
            if detected {
                AIState::Chasing
            } else {
                state
            }
        }

        AIState::Chasing => {
            if !detected {
                return config.initial_state();
            }

            let in_range = target_distance.is_some_and(|d| d <= config.attack_range);
            if config.can_attack && in_range && clock.cooldown_ready(now, config.attack_cooldown) {
                AIState::Attacking
            } else {
                AIState::Chasing
            }
        }

        AIState::Attacking => {
            if !detected {
                config.initial_state()
            } else if clock.recovery_elapsed(now, config.attack_recovery) {
                AIState::Chasing
            } else {
                AIState::Attacking
            }
        }
    }
}
