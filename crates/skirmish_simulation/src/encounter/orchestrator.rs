//! Encounter orchestrator: ledger requests, level complete, game over.

use bevy::prelude::*;

use super::ledger::KillLedger;
use super::{AddKills, GameOver, KillAdded, LevelComplete, ResetKills, SetKills, SetTargetKills, TargetReached};
use crate::combat::{EntityDied, Player};
use crate::scheduling::ContinuationQueue;
use crate::spawning::SpawnerState;

/// Состояние уровня + спавнеры, которыми он управляет
///
/// Ссылки явные (заполняет `spawn_encounter` или setup код), без поиска по миру.
#[derive(Resource, Debug, Clone, Default)]
pub struct Encounter {
    pub spawners: Vec<Entity>,
    pub player: Option<Entity>,
    level_complete: bool,
    game_over: bool,
}

impl Encounter {
    pub fn new(spawners: Vec<Entity>, player: Option<Entity>) -> Self {
        Self {
            spawners,
            player,
            level_complete: false,
            game_over: false,
        }
    }

    pub fn is_level_complete(&self) -> bool {
        self.level_complete
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Уровень ещё идёт (ни победы, ни поражения)
    pub fn is_running(&self) -> bool {
        !self.level_complete && !self.game_over
    }
}

/// Система: запросы к ledger
///
/// Порядок внутри тика: reset → target → set → add.
pub fn apply_ledger_requests(
    mut resets: EventReader<ResetKills>,
    mut targets: EventReader<SetTargetKills>,
    mut sets: EventReader<SetKills>,
    mut adds: EventReader<AddKills>,
    mut ledger: ResMut<KillLedger>,
    mut added_events: EventWriter<KillAdded>,
    mut reached_events: EventWriter<TargetReached>,
) {
    for _ in resets.read() {
        ledger.reset();
        crate::log("🔄 Kill ledger reset");
    }

    for request in targets.read() {
        ledger.set_target(request.target);
        crate::log(&format!("🎯 Kill target set to {}", request.target));
    }

    let mut crossed = false;

    for request in sets.read() {
        crossed |= ledger.set_kills(request.kills);
        crate::log(&format!("Kills set to {}/{}", ledger.current(), ledger.target()));
    }

    for request in adds.read() {
        crossed |= ledger.add_kills(request.amount);
        crate::log(&format!("☠️ Kill added: {}/{}", ledger.current(), ledger.target()));
        added_events.write(KillAdded {
            total: ledger.current(),
        });
    }

    if crossed {
        crate::log_info(&format!(
            "🎯 Kill target reached ({}/{})",
            ledger.current(),
            ledger.target()
        ));
        reached_events.write(TargetReached {
            total: ledger.current(),
        });
    }
}

/// Система: target reached → остановить спавнеры, LevelComplete (один раз)
pub fn complete_level_on_target(
    mut reached: EventReader<TargetReached>,
    mut encounter: ResMut<Encounter>,
    mut spawners: Query<&mut SpawnerState>,
    mut queue: ResMut<ContinuationQueue>,
    mut complete_events: EventWriter<LevelComplete>,
) {
    for event in reached.read() {
        if !encounter.is_running() {
            continue;
        }

        encounter.level_complete = true;
        stop_spawners(&encounter.spawners, &mut spawners, &mut queue);

        crate::log_info(&format!("🏆 Level complete ({} kills)", event.total));
        complete_events.write(LevelComplete { kills: event.total });
    }
}

/// Система: смерть игрока до победы → остановить спавнеры, GameOver (один раз)
pub fn game_over_on_player_death(
    mut deaths: EventReader<EntityDied>,
    players: Query<(), With<Player>>,
    mut encounter: ResMut<Encounter>,
    mut spawners: Query<&mut SpawnerState>,
    mut queue: ResMut<ContinuationQueue>,
    ledger: Res<KillLedger>,
    mut over_events: EventWriter<GameOver>,
) {
    for death in deaths.read() {
        if !players.contains(death.entity) || !encounter.is_running() {
            continue;
        }

        encounter.game_over = true;
        stop_spawners(&encounter.spawners, &mut spawners, &mut queue);

        crate::log_info(&format!(
            "💀 Game over: player {:?} died ({}/{} kills)",
            death.entity,
            ledger.current(),
            ledger.target()
        ));
        over_events.write(GameOver {
            player: death.entity,
            kills: ledger.current(),
        });
    }
}

fn stop_spawners(controlled: &[Entity], spawners: &mut Query<&mut SpawnerState>, queue: &mut ContinuationQueue) {
    for &entity in controlled {
        match spawners.get_mut(entity) {
            Ok(mut state) => {
                state.stop(queue);
            }
            Err(_) => crate::log_warning(&format!("Encounter spawner {:?} no longer exists", entity)),
        }
    }
}
