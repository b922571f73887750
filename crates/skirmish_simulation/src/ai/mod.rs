//! AI decision-making module
//!
//! Perception/pursuit/attack FSM для врагов:
//! Idle/Wandering → Chasing → Attacking → Chasing → ...
//!
//! Смерть не часть FSM: мёртвый враг помечается `Dead` и выпадает из запросов.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;
pub mod transitions;

#[cfg(test)]
mod systems_tests;

// Re-export основных типов
pub use components::{AIConfig, AIState, AttackClock, PathfindingAgent, Pursuit, WanderState};
pub use events::{AttackPerformed, TargetDetected, TargetLost};
pub use transitions::{evaluate_transition, target_detected};

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate (SimSet::Ai).
/// Порядок выполнения:
/// 1. ai_initial_state: Wandering/Idle для новых агентов
/// 2. acquire_targets: поиск/удержание цели
/// 3. ai_fsm_transitions: обновление FSM state
/// 4. ai_attack_execution: DamageRequest при входе в Attacking
/// 5. ai_movement_from_state: движение к цели / wander точке
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TargetDetected>()
            .add_event::<TargetLost>()
            .add_event::<AttackPerformed>();

        app.add_systems(
            FixedUpdate,
            (
                systems::ai_initial_state,
                systems::acquire_targets,
                systems::ai_fsm_transitions,
                systems::ai_attack_execution,
                systems::ai_movement_from_state,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(crate::SimSet::Ai),
        );
    }
}
