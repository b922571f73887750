//! Headless прогон уровня
//!
//! `skirmish_simulation [encounter.json]`, без аргумента берётся конфигурация по умолчанию.
//! Стрельба игрока здесь заменена простой турелью (ближайший враг, фиксированный темп).

use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_rapier3d::prelude::*;

use skirmish_simulation::encounter::Encounter;
use skirmish_simulation::{
    create_headless_app, load_config, log_info, spawn_encounter, AIConfig, ConfigError, DamageRequest, Dead,
    EncounterConfig, KillLedger, Player, SimSet, SimulationPlugin, SIM_TICK,
};

const TURRET_INTERVAL: f32 = 0.4;
const TURRET_DAMAGE: f32 = 35.0;
const TURRET_FORCE: f32 = 40.0;
const TURRET_RANGE: f32 = 25.0;

#[derive(Resource, Default)]
struct Turret {
    last_shot: Option<f32>,
}

fn player_turret(
    time: Res<Time<Fixed>>,
    mut turret: ResMut<Turret>,
    players: Query<(Entity, &Transform), (With<Player>, Without<Dead>)>,
    enemies: Query<(Entity, &Transform), (With<AIConfig>, Without<Dead>)>,
    mut damage: EventWriter<DamageRequest>,
) {
    let now = time.elapsed_secs();
    if turret.last_shot.is_some_and(|last| now - last < TURRET_INTERVAL) {
        return;
    }

    let Ok((player, origin)) = players.single() else {
        return;
    };

    let nearest = enemies
        .iter()
        .map(|(entity, transform)| (entity, transform.translation, origin.translation.distance(transform.translation)))
        .filter(|(_, _, distance)| *distance <= TURRET_RANGE)
        .min_by(|a, b| a.2.total_cmp(&b.2));

    let Some((target, position, _)) = nearest else {
        return;
    };

    let direction = (position - origin.translation).normalize_or_zero();
    damage.write(
        DamageRequest::hit(target, position + Vec3::Y, direction * TURRET_FORCE, TURRET_DAMAGE).from_source(player),
    );
    turret.last_shot = Some(now);
}

fn main() -> Result<(), ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(path)?,
        None => EncounterConfig::default(),
    };

    let mut app = create_headless_app(config.seed);
    app.add_plugins((
        TransformPlugin,
        RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule(),
        SimulationPlugin,
    ))
    .insert_resource(TimestepMode::Fixed {
        dt: SIM_TICK.as_secs_f32(),
        substeps: 1,
    })
    .init_resource::<Turret>()
    .add_systems(FixedUpdate, player_turret.in_set(SimSet::Ai));

    {
        let mut commands = app.world_mut().commands();
        spawn_encounter(&mut commands, &config);
    }
    app.world_mut().flush();

    log_info(&format!(
        "Starting skirmish headless simulation (seed: {}, max ticks: {})",
        config.seed, config.max_ticks
    ));

    for tick in 0..config.max_ticks {
        app.update();

        if tick % 320 == 0 {
            let ledger = app.world().resource::<KillLedger>();
            log_info(&format!(
                "Tick {}: {} entities, kills {}/{}",
                tick,
                app.world().entities().len(),
                ledger.current(),
                ledger.target()
            ));
        }

        let encounter = app.world().resource::<Encounter>();
        if !encounter.is_running() {
            break;
        }
    }

    let encounter = app.world().resource::<Encounter>();
    let ledger = app.world().resource::<KillLedger>();
    let outcome = if encounter.is_level_complete() {
        "level complete"
    } else if encounter.is_game_over() {
        "game over"
    } else {
        "time limit"
    };

    log_info(&format!(
        "Simulation finished: {} ({}/{} kills)",
        outcome,
        ledger.current(),
        ledger.target()
    ));

    Ok(())
}
