//! Encounter integration test
//!
//! Headless уровень целиком:
//! - квота убийств → LevelComplete, спавнеры остановлены
//! - смерть игрока → GameOver
//! - смертельный удар: одна смерть, усиленный death impact

use bevy::prelude::*;
use skirmish_simulation::combat::DeathSettings;
use skirmish_simulation::config::{PlayerConfig, SpawnerSetup};
use skirmish_simulation::encounter::{Encounter, GameOver, LevelComplete};
use skirmish_simulation::reaction::ImpactKind;
use skirmish_simulation::spawning::{SpawnMode, SpawnPlacement, Spawner, SpawnerState};
use skirmish_simulation::*;

/// Сколько раз сработали уведомления уровня
#[derive(Resource, Default)]
struct Outcomes {
    deaths: Vec<Entity>,
    impacts: Vec<ImpactRequest>,
    level_complete: usize,
    game_over: usize,
}

fn collect_outcomes(
    mut outcomes: ResMut<Outcomes>,
    mut deaths: EventReader<EntityDied>,
    mut impacts: EventReader<ImpactRequest>,
    mut complete: EventReader<LevelComplete>,
    mut over: EventReader<GameOver>,
) {
    outcomes.deaths.extend(deaths.read().map(|d| d.entity));
    outcomes.impacts.extend(impacts.read().copied());
    outcomes.level_complete += complete.read().count();
    outcomes.game_over += over.read().count();
}

/// Игрок "стреляет" по ближайшему врагу раз в 16 тиков
fn sharpshooter(
    mut tick: Local<u32>,
    players: Query<(Entity, &Transform), With<Player>>,
    enemies: Query<(Entity, &Transform), (With<AIConfig>, Without<Dead>)>,
    mut damage: EventWriter<DamageRequest>,
) {
    *tick += 1;
    if *tick % 16 != 0 {
        return;
    }

    let Ok((player, origin)) = players.single() else {
        return;
    };

    let nearest = enemies.iter().min_by(|a, b| {
        origin
            .translation
            .distance(a.1.translation)
            .total_cmp(&origin.translation.distance(b.1.translation))
    });

    if let Some((enemy, transform)) = nearest {
        let direction = (transform.translation - origin.translation).normalize_or_zero();
        damage.write(
            DamageRequest::hit(enemy, transform.translation, direction * 40.0, 60.0).from_source(player),
        );
    }
}

fn create_encounter_app(config: &EncounterConfig, shooting: bool) -> App {
    let mut app = create_headless_app(config.seed);
    app.add_plugins(SimulationPlugin)
        .init_resource::<Outcomes>()
        .add_systems(FixedPostUpdate, collect_outcomes);

    if shooting {
        app.add_systems(FixedUpdate, sharpshooter.in_set(SimSet::Ai));
    }

    {
        let mut commands = app.world_mut().commands();
        spawn_encounter(&mut commands, config);
    }
    app.world_mut().flush();
    app
}

fn run_until_decided(app: &mut App, max_ticks: usize) -> usize {
    for tick in 0..max_ticks {
        app.update();
        if !app.world().resource::<Encounter>().is_running() {
            return tick;
        }
    }
    max_ticks
}

fn close_spawner(mode: SpawnMode) -> SpawnerSetup {
    SpawnerSetup {
        position: Vec3::new(0.0, 0.0, 6.0),
        spawner: Spawner {
            placement: SpawnPlacement {
                points: vec![Vec3::new(0.0, 0.0, 6.0), Vec3::new(3.0, 0.0, 5.0)],
                ..default()
            },
            mode,
            spawn_interval: 0.3,
            max_enemies: 3,
            ..default()
        },
    }
}

/// Test: квота 5 убийств закрывает уровень
#[test]
fn test_kill_quota_completes_level() {
    let config = EncounterConfig {
        target_kills: 5,
        player: PlayerConfig {
            invulnerable: true,
            ..default()
        },
        spawners: vec![close_spawner(SpawnMode::Continuous)],
        ..default()
    };
    let mut app = create_encounter_app(&config, true);

    let ticks = run_until_decided(&mut app, 64 * 60);
    assert!(ticks < 64 * 60, "Уровень не завершился за 60 секунд");

    let encounter = app.world().resource::<Encounter>().clone();
    assert!(encounter.is_level_complete());
    assert!(!encounter.is_game_over());

    let ledger = app.world().resource::<KillLedger>();
    assert!(ledger.current() >= 5);
    assert!(ledger.is_target_reached());

    for &spawner in &encounter.spawners {
        let state = app.world().get::<SpawnerState>(spawner).unwrap();
        assert!(!state.is_running());
    }

    // Дальше ничего не меняется: ни новых спавнов, ни повторного сигнала
    let spawned: u32 = encounter
        .spawners
        .iter()
        .map(|&s| app.world().get::<SpawnerState>(s).unwrap().total_spawned)
        .sum();
    for _ in 0..200 {
        app.update();
    }
    let spawned_after: u32 = encounter
        .spawners
        .iter()
        .map(|&s| app.world().get::<SpawnerState>(s).unwrap().total_spawned)
        .sum();

    assert_eq!(spawned, spawned_after);
    assert_eq!(app.world().resource::<Outcomes>().level_complete, 1);

    // Каждая смерть уникальна
    let deaths = &app.world().resource::<Outcomes>().deaths;
    let mut unique = deaths.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), deaths.len());
}

/// Test: беззащитный игрок погибает → GameOver, спавн остановлен
#[test]
fn test_player_death_ends_encounter() {
    let config = EncounterConfig {
        target_kills: 50,
        player: PlayerConfig {
            max_health: 20.0,
            ..default()
        },
        spawners: vec![close_spawner(SpawnMode::waves(2, 1.0, 10))],
        ..default()
    };
    let mut app = create_encounter_app(&config, false);

    let ticks = run_until_decided(&mut app, 64 * 30);
    assert!(ticks < 64 * 30, "Игрок не погиб за 30 секунд");

    let encounter = app.world().resource::<Encounter>().clone();
    assert!(encounter.is_game_over());
    assert!(!encounter.is_level_complete());

    let player = encounter.player.unwrap();
    let health = app.world().get::<Damageable>(player).unwrap();
    assert!(health.is_dead());
    assert_eq!(health.current(), 0.0);

    for _ in 0..100 {
        app.update();
    }

    let outcomes = app.world().resource::<Outcomes>();
    assert_eq!(outcomes.game_over, 1);
    assert_eq!(outcomes.level_complete, 0);
    for &spawner in &encounter.spawners {
        assert!(!app.world().get::<SpawnerState>(spawner).unwrap().is_running());
    }
}

/// Test: смертельный удар по раненому врагу
#[test]
fn test_lethal_hit_kills_once_with_amplified_impact() {
    let mut app = create_headless_app(42);
    app.add_plugins(SimulationPlugin)
        .init_resource::<Outcomes>()
        .add_systems(FixedPostUpdate, collect_outcomes);
    app.update();

    let enemy = app
        .world_mut()
        .spawn((
            Transform::default(),
            Damageable::new(100.0).with_current(15.0),
            DeathSettings::default(),
        ))
        .id();

    for _ in 0..3 {
        app.world_mut().send_event(DamageRequest::hit(
            enemy,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 50.0),
            20.0,
        ));
    }
    app.update();
    app.update();

    let outcomes = app.world().resource::<Outcomes>();
    assert_eq!(outcomes.deaths, vec![enemy]);

    let death_impacts: Vec<_> = outcomes
        .impacts
        .iter()
        .filter(|request| request.kind == ImpactKind::Death)
        .collect();
    assert_eq!(death_impacts.len(), 1);
    assert!((death_impacts[0].impact.magnitude - 100.0).abs() < 1e-4);

    let health = app.world().get::<Damageable>(enemy).unwrap();
    assert!(health.is_dead());
    assert_eq!(health.current(), 0.0);
}
