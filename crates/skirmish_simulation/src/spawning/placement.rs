//! Spawn position resolution + ground projection.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, CollisionGroups};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::layers::group_from_bits;
use crate::reaction::random_in_unit_disc;

/// Box для спавна (center ± size/2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnArea {
    pub center: Vec3,
    pub size: Vec3,
}

/// Луч вниз для посадки на землю
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundProbe {
    /// Rapier group bits земли
    pub layer: u32,
    /// Луч стартует на этой высоте над точкой и идёт на 2× вниз
    pub check_height: f32,
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self {
            layer: crate::layers::GROUND.bits(),
            check_height: 10.0,
        }
    }
}

/// Где спавнить: первый доступный способ выигрывает
/// (точки → area → радиус вокруг спавнера)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPlacement {
    pub points: Vec<Vec3>,
    pub area: Option<SpawnArea>,
    pub radius: f32,
    pub ground: Option<GroundProbe>,
}

impl Default for SpawnPlacement {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            area: None,
            radius: 10.0,
            ground: Some(GroundProbe::default()),
        }
    }
}

pub fn resolve_spawn_position<R: Rng + ?Sized>(
    placement: &SpawnPlacement,
    spawner_position: Vec3,
    rng: &mut R,
) -> Vec3 {
    if !placement.points.is_empty() {
        let index = rng.gen_range(0..placement.points.len());
        return placement.points[index];
    }

    if let Some(area) = placement.area {
        let unit = Vec3::new(
            rng.gen_range(-0.5..=0.5),
            rng.gen_range(-0.5..=0.5),
            rng.gen_range(-0.5..=0.5),
        );
        return area.center + unit * area.size;
    }

    let offset = random_in_unit_disc(rng) * placement.radius;
    spawner_position + Vec3::new(offset.x, 0.0, offset.y)
}

/// Посадить точку на ближайшую землю под ней.
///
/// Без попадания высота остаётся прежней.
pub fn snap_to_ground<'a>(
    position: Vec3,
    probe: &GroundProbe,
    grounds: impl IntoIterator<Item = (&'a Collider, &'a Transform, &'a CollisionGroups)>,
) -> Vec3 {
    let layer = group_from_bits(probe.layer);
    let origin = position + Vec3::Y * probe.check_height;
    let max_distance = probe.check_height * 2.0;

    let hit = grounds
        .into_iter()
        .filter(|(_, _, groups)| groups.memberships.intersects(layer))
        .filter_map(|(collider, transform, _)| {
            collider.cast_ray(
                transform.translation,
                transform.rotation,
                origin,
                Vec3::NEG_Y,
                max_distance,
                true,
            )
        })
        .min_by(f32::total_cmp);

    match hit {
        Some(distance) => Vec3::new(position.x, origin.y - distance, position.z),
        None => position,
    }
}
