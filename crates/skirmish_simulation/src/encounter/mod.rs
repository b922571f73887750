//! Encounter: kill ledger + orchestrator уровня
//!
//! Поток: смерть заспавненного врага → `AddKills` (spawning) → `KillLedger`
//! → `TargetReached` (edge-triggered) → остановка спавнеров → `LevelComplete`.
//! Смерть игрока до победы → `GameOver`.

use bevy::prelude::*;

pub mod ledger;
pub mod orchestrator;
pub mod setup;


pub use ledger::KillLedger;
pub use orchestrator::Encounter;
pub use setup::spawn_encounter;

/// Request: +amount убийств
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddKills {
    pub amount: u32,
}

/// Request: обнулить счётчик и перевзвести "target reached"
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ResetKills;

/// Request: сменить цель (сигнал не перевзводится)
#[derive(Event, Debug, Clone, Copy)]
pub struct SetTargetKills {
    pub target: u32,
}

/// Request: перезаписать счётчик
#[derive(Event, Debug, Clone, Copy)]
pub struct SetKills {
    pub kills: u32,
}

/// Event: счётчик вырос (total после прибавления)
#[derive(Event, Debug, Clone, Copy)]
pub struct KillAdded {
    pub total: u32,
}

/// Event: цель достигнута (один раз до `ResetKills`)
#[derive(Event, Debug, Clone, Copy)]
pub struct TargetReached {
    pub total: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct LevelComplete {
    pub kills: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct GameOver {
    pub player: Entity,
    pub kills: u32,
}

/// Encounter Plugin
///
/// SimSet::Encounter: apply_ledger_requests → complete_level_on_target → game_over_on_player_death
pub struct EncounterPlugin;

impl Plugin for EncounterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KillLedger>()
            .init_resource::<Encounter>()
            .add_event::<AddKills>()
            .add_event::<ResetKills>()
            .add_event::<SetTargetKills>()
            .add_event::<SetKills>()
            .add_event::<KillAdded>()
            .add_event::<TargetReached>()
            .add_event::<LevelComplete>()
            .add_event::<GameOver>();

        app.add_systems(
            FixedUpdate,
            (
                orchestrator::apply_ledger_requests,
                orchestrator::complete_level_on_target,
                orchestrator::game_over_on_player_death,
            )
                .chain()
                .in_set(crate::SimSet::Encounter),
        );
    }
}
