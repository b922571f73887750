//! AI perception: поиск и удержание цели.

use bevy::prelude::*;
use bevy_rapier3d::prelude::CollisionGroups;

use crate::ai::{AIConfig, Pursuit};
use crate::combat::{Damageable, Dead, TargetTag};
use crate::layers::group_from_bits;

type CandidateItem<'a> = (
    Entity,
    &'a Transform,
    Option<&'a TargetTag>,
    Option<&'a CollisionGroups>,
    Option<&'a Damageable>,
);

fn is_alive(damageable: Option<&Damageable>) -> bool {
    damageable.is_none_or(|d| d.is_alive())
}

/// Система: обновить `Pursuit` каждого агента
///
/// 1. Текущая цель удерживается, пока существует и жива
/// 2. Иначе ближайшая живая цель с тегом `target_tag` (на любом расстоянии)
/// 3. Иначе ближайший живой объект на `target_layer` в радиусе обнаружения
///
/// Без цели `Pursuit` очищается и поиск повторяется на следующем тике.
pub fn acquire_targets(
    mut agents: Query<(Entity, &Transform, &AIConfig, &mut Pursuit), Without<Dead>>,
    candidates: Query<CandidateItem, Without<Dead>>,
) {
    for (agent, transform, config, mut pursuit) in agents.iter_mut() {
        let position = transform.translation;

        let current = pursuit
            .target
            .and_then(|target| candidates.get(target).ok())
            .filter(|(_, _, _, _, damageable)| is_alive(*damageable))
            .map(|(entity, t, _, _, _)| (entity, t.translation));

        let found = current
            .or_else(|| find_tagged(agent, position, &config.target_tag, &candidates))
            .or_else(|| find_on_layer(agent, position, config, &candidates));

        match found {
            Some((target, target_position)) => {
                pursuit.target = Some(target);
                pursuit.target_position = Some(target_position);
                pursuit.distance = Some(position.distance(target_position));
            }
            None => pursuit.clear(),
        }
    }
}

fn find_tagged(
    agent: Entity,
    position: Vec3,
    tag: &str,
    candidates: &Query<CandidateItem, Without<Dead>>,
) -> Option<(Entity, Vec3)> {
    if tag.is_empty() {
        return None;
    }

    candidates
        .iter()
        .filter(|(entity, _, target_tag, _, damageable)| {
            *entity != agent && target_tag.is_some_and(|t| t.matches(tag)) && is_alive(*damageable)
        })
        .map(|(entity, t, _, _, _)| (entity, t.translation))
        .min_by(|(_, a), (_, b)| position.distance_squared(*a).total_cmp(&position.distance_squared(*b)))
}

fn find_on_layer(
    agent: Entity,
    position: Vec3,
    config: &AIConfig,
    candidates: &Query<CandidateItem, Without<Dead>>,
) -> Option<(Entity, Vec3)> {
    let layer = group_from_bits(config.target_layer);
    if layer.is_empty() {
        return None;
    }

    candidates
        .iter()
        .filter(|(entity, t, _, groups, damageable)| {
            *entity != agent
                && groups.is_some_and(|g| g.memberships.intersects(layer))
                && is_alive(*damageable)
                && position.distance(t.translation) <= config.detection_range
        })
        .map(|(entity, t, _, _, _)| (entity, t.translation))
        .min_by(|(_, a), (_, b)| position.distance_squared(*a).total_cmp(&position.distance_squared(*b)))
}
