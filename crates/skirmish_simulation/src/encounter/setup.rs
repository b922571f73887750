//! Сборка уровня из `EncounterConfig`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::ledger::KillLedger;
use super::orchestrator::Encounter;
use crate::combat::{Damageable, DeathSettings, Player, TargetTag};
use crate::config::EncounterConfig;

/// Создать землю, игрока, спавнеры и ресурсы уровня.
///
/// `Encounter` получает прямые ссылки на спавнеры и игрока,
/// `KillLedger` получает цель из конфигурации.
pub fn spawn_encounter(commands: &mut Commands, config: &EncounterConfig) -> Encounter {
    if let Some(ground) = config.ground {
        commands.spawn((
            Name::new("Ground"),
            Transform::from_xyz(0.0, ground.top - ground.half_extents.y, 0.0),
            RigidBody::Fixed,
            Collider::cuboid(ground.half_extents.x, ground.half_extents.y, ground.half_extents.z),
            crate::layers::ground_groups(),
        ));
    }

    let player_config = &config.player;
    let mut health = Damageable::new(player_config.max_health);
    health.set_invulnerable(player_config.invulnerable);

    let player = commands
        .spawn((
            Name::new("Player"),
            Player,
            TargetTag::new(player_config.tag.clone()),
            Transform::from_translation(player_config.position),
            health,
            DeathSettings::player(),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(player_config.collider_half_height, player_config.collider_radius),
            crate::layers::player_groups(),
        ))
        .id();

    let spawners: Vec<Entity> = config
        .spawners
        .iter()
        .enumerate()
        .map(|(index, setup)| {
            commands
                .spawn((
                    Name::new(format!("Spawner {}", index)),
                    Transform::from_translation(setup.position),
                    setup.spawner.clone(),
                ))
                .id()
        })
        .collect();

    let encounter = Encounter::new(spawners, Some(player));

    commands.insert_resource(KillLedger::new(config.target_kills));
    commands.insert_resource(encounter.clone());

    crate::log_info(&format!(
        "🗺️ Encounter ready: player {:?}, {} spawner(s), target {} kills",
        player,
        encounter.spawners.len(),
        config.target_kills
    ));

    encounter
}
