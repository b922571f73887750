//! Tests for AI systems (полный App, враг + игрок).

use bevy::prelude::*;

use super::*;
use crate::combat::{Damageable, DeathSettings, KillRequest, Player, TargetTag};
use crate::reaction::{attach_reaction_rig, ImpactRequest, Limp, ReactionProfile, RigLayout};
use crate::test_support::{record_events, recorded, run_ticks, sim_app};

/// Стоячий враг: расстояние меняем, двигая игрока
fn stationary() -> AIConfig {
    AIConfig {
        move_speed: 0.0,
        ..default()
    }
}

fn spawn_enemy(app: &mut App, position: Vec3, config: AIConfig) -> Entity {
    app.world_mut()
        .spawn((Transform::from_translation(position), config))
        .id()
}

fn spawn_player(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            TargetTag::new("Player"),
            Damageable::new(100.0),
            DeathSettings::player(),
            Player,
        ))
        .id()
}

/// Враг с гуманоидным rig'ом, восстанавливается через 0.5s
fn spawn_rigged_enemy(app: &mut App, position: Vec3, config: AIConfig) -> Entity {
    let transform = Transform::from_translation(position);
    let enemy = app.world_mut().spawn((transform, config)).id();

    let profile = ReactionProfile {
        recovery_time: 0.5,
        ..ReactionProfile::ragdoll()
    };
    {
        let mut commands = app.world_mut().commands();
        attach_reaction_rig(&mut commands, enemy, &transform, profile, &RigLayout::humanoid());
    }
    app.world_mut().flush();
    enemy
}

fn knock_down(app: &mut App, enemy: Entity) {
    app.world_mut()
        .send_event(ImpactRequest::external(enemy, Vec3::Y, Vec3::Z, 50.0));
}

fn x_of(app: &App, entity: Entity) -> f32 {
    app.world().get::<Transform>(entity).map(|t| t.translation.x).unwrap_or_default()
}

fn move_to(app: &mut App, entity: Entity, position: Vec3) {
    if let Some(mut transform) = app.world_mut().get_mut::<Transform>(entity) {
        transform.translation = position;
    }
}

fn state_of(app: &App, entity: Entity) -> Option<AIState> {
    app.world().get::<AIState>(entity).copied()
}

#[test]
fn test_state_cycle_wander_chase_attack_chase() {
    let mut app = sim_app(42);
    record_events::<TargetDetected>(&mut app);
    record_events::<AttackPerformed>(&mut app);

    let enemy = spawn_enemy(&mut app, Vec3::ZERO, stationary());
    let player = spawn_player(&mut app, Vec3::new(15.0, 0.0, 0.0));

    app.update();
    assert_eq!(state_of(&app, enemy), Some(AIState::Wandering));

    move_to(&mut app, player, Vec3::new(10.0, 0.0, 0.0));
    app.update();
    assert_eq!(state_of(&app, enemy), Some(AIState::Chasing));
    assert_eq!(recorded::<TargetDetected>(&app).len(), 1);

    move_to(&mut app, player, Vec3::new(2.0, 0.0, 0.0));
    app.update();
    assert_eq!(state_of(&app, enemy), Some(AIState::Attacking));
    assert_eq!(recorded::<AttackPerformed>(&app).len(), 1);
    assert_eq!(app.world().get::<Damageable>(player).map(|d| d.current()), Some(90.0));

    // attack_recovery = 0.5s = 32 тика
    run_ticks(&mut app, 30);
    assert_eq!(state_of(&app, enemy), Some(AIState::Attacking));

    run_ticks(&mut app, 3);
    assert_eq!(state_of(&app, enemy), Some(AIState::Chasing));

    // Cooldown 2s ещё не прошёл: второго удара нет
    assert_eq!(recorded::<AttackPerformed>(&app).len(), 1);
}

#[test]
fn test_second_attack_waits_for_cooldown() {
    let mut app = sim_app(42);
    record_events::<AttackPerformed>(&mut app);

    spawn_enemy(&mut app, Vec3::ZERO, stationary());
    let player = spawn_player(&mut app, Vec3::new(1.5, 0.0, 0.0));

    // 2s cooldown = 128 тиков; к 140-му тику ровно два удара
    run_ticks(&mut app, 140);

    assert_eq!(recorded::<AttackPerformed>(&app).len(), 2);
    assert_eq!(app.world().get::<Damageable>(player).map(|d| d.current()), Some(80.0));
}

#[test]
fn test_dead_target_is_dropped() {
    let mut app = sim_app(42);
    record_events::<TargetLost>(&mut app);

    let enemy = spawn_enemy(&mut app, Vec3::ZERO, stationary());
    let player = spawn_player(&mut app, Vec3::new(5.0, 0.0, 0.0));

    app.update();
    assert_eq!(state_of(&app, enemy), Some(AIState::Chasing));

    app.world_mut().send_event(KillRequest {
        target: player,
        killer: None,
    });
    run_ticks(&mut app, 2);

    assert_eq!(state_of(&app, enemy), Some(AIState::Wandering));
    assert_eq!(recorded::<TargetLost>(&app).len(), 1);
    assert!(app.world().get::<Pursuit>(enemy).is_some_and(|p| p.target.is_none()));
}

#[test]
fn test_layer_fallback_respects_detection_range() {
    let mut app = sim_app(42);

    let near_enemy = spawn_enemy(&mut app, Vec3::ZERO, stationary());
    let far_enemy = spawn_enemy(&mut app, Vec3::new(0.0, 0.0, 40.0), stationary());
    let target = app
        .world_mut()
        .spawn((Transform::from_xyz(8.0, 0.0, 0.0), crate::layers::player_groups()))
        .id();

    app.update();

    assert_eq!(app.world().get::<Pursuit>(near_enemy).and_then(|p| p.target), Some(target));
    assert_eq!(state_of(&app, near_enemy), Some(AIState::Chasing));
    assert_eq!(app.world().get::<Pursuit>(far_enemy).and_then(|p| p.target), None);
    assert_eq!(state_of(&app, far_enemy), Some(AIState::Wandering));
}

#[test]
fn test_pathfinding_agent_gets_destination() {
    let mut app = sim_app(42);

    let enemy = app
        .world_mut()
        .spawn((Transform::default(), AIConfig::default(), PathfindingAgent::default()))
        .id();
    spawn_player(&mut app, Vec3::new(6.0, 0.0, 0.0));

    run_ticks(&mut app, 2);

    let agent = app.world().get::<PathfindingAgent>(enemy).copied();
    assert_eq!(agent.and_then(|a| a.destination), Some(Vec3::new(6.0, 0.0, 0.0)));
    assert_eq!(agent.map(|a| a.speed), Some(3.0));
    assert_eq!(app.world().get::<Transform>(enemy).map(|t| t.translation), Some(Vec3::ZERO));
}

#[test]
fn test_chasing_closes_distance() {
    let mut app = sim_app(42);

    let enemy = spawn_enemy(&mut app, Vec3::ZERO, AIConfig::default());
    spawn_player(&mut app, Vec3::new(8.0, 0.0, 0.0));

    // 1 секунда при 3 м/с
    run_ticks(&mut app, 65);

    let x = app.world().get::<Transform>(enemy).map(|t| t.translation.x).unwrap_or_default();
    assert!(x > 2.5 && x < 3.5, "x = {}", x);
}

#[test]
fn test_wandering_stays_near_origin() {
    let mut app = sim_app(9);
    let origin = Vec3::new(3.0, 0.0, -2.0);
    let enemy = spawn_enemy(&mut app, origin, AIConfig::default());

    for _ in 0..12 {
        run_ticks(&mut app, 50);
        let position = app.world().get::<Transform>(enemy).map(|t| t.translation).unwrap_or(origin);
        assert!(position.distance(origin) <= 5.0 + 1e-3);
        assert_eq!(state_of(&app, enemy), Some(AIState::Wandering));
    }
}

#[test]
fn test_attack_on_target_without_damageable_is_silent() {
    let mut app = sim_app(42);
    record_events::<AttackPerformed>(&mut app);

    let enemy = spawn_enemy(&mut app, Vec3::ZERO, stationary());
    app.world_mut()
        .spawn((Transform::from_xyz(1.0, 0.0, 0.0), TargetTag::new("Player")));

    // Wandering → Chasing → Attacking (один переход за тик)
    run_ticks(&mut app, 2);

    assert_eq!(state_of(&app, enemy), Some(AIState::Attacking));
    assert!(recorded::<AttackPerformed>(&app).is_empty());
}

#[test]
fn test_limp_enemy_stops_chasing_until_recovered() {
    let mut app = sim_app(42);

    let enemy = spawn_rigged_enemy(&mut app, Vec3::ZERO, AIConfig::default());
    spawn_player(&mut app, Vec3::new(8.0, 0.0, 0.0));

    knock_down(&mut app, enemy);
    app.update();
    assert!(app.world().get::<Limp>(enemy).is_some());

    // Обмяк: ни шага, хотя игрок в detection_range
    let knocked_at = x_of(&app, enemy);
    run_ticks(&mut app, 20);
    assert_eq!(x_of(&app, enemy), knocked_at);

    // Восстановился (0.5s) и снова догоняет
    run_ticks(&mut app, 60);
    assert!(app.world().get::<Limp>(enemy).is_none());
    assert!(x_of(&app, enemy) > knocked_at + 1.0, "x = {}", x_of(&app, enemy));
}

#[test]
fn test_limp_enemy_does_not_strike() {
    let mut app = sim_app(42);
    record_events::<AttackPerformed>(&mut app);

    let enemy = spawn_rigged_enemy(&mut app, Vec3::ZERO, stationary());
    spawn_player(&mut app, Vec3::new(1.0, 0.0, 0.0));

    knock_down(&mut app, enemy);
    run_ticks(&mut app, 20);

    assert_ne!(state_of(&app, enemy), Some(AIState::Attacking));
    assert!(recorded::<AttackPerformed>(&app).is_empty());

    run_ticks(&mut app, 60);
    assert!(!recorded::<AttackPerformed>(&app).is_empty());
}
