//! Reaction rig: набор физических тел, которые "обмякают" при ударе.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use super::model::ReactionProfile;
use crate::scheduling::TimerHandle;

/// Component на владельце (враг): список тел и состояние реакции.
///
/// Пока `active == false` все тела kinematic и следуют за владельцем.
/// Агрегатный rig (chaotic) содержит ровно одно тело: самого владельца.
#[derive(Component, Debug, Clone)]
pub struct ReactionRig {
    pub profile: ReactionProfile,
    pub bodies: Vec<Entity>,
    active: bool,
    recovery: Option<TimerHandle>,
}

impl ReactionRig {
    pub fn new(profile: ReactionProfile, bodies: Vec<Entity>) -> Self {
        Self {
            profile,
            bodies,
            active: false,
            recovery: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// true если rig только что перешёл в dynamic.
    pub(crate) fn activate(&mut self) -> bool {
        let was_active = self.active;
        self.active = true;
        !was_active
    }

    pub(crate) fn settle(&mut self) {
        self.active = false;
        self.recovery = None;
    }

    /// Заменить таймер восстановления, вернуть старый для отмены.
    pub(crate) fn replace_recovery(&mut self, handle: Option<TimerHandle>) -> Option<TimerHandle> {
        std::mem::replace(&mut self.recovery, handle)
    }
}

/// Marker: rig владельца обмяк, владелец не управляет собой до восстановления.
///
/// Ставится вместе с `RigActivated`, снимается вместе с `RigRecovered`.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
pub struct Limp;

/// Component на каждом теле rig'а.
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct ReactionBody {
    pub owner: Entity,
    /// Смещение в локальных координатах владельца (для kinematic follow)
    pub rest_offset: Vec3,
    pub mass: f32,
}

/// Описание одного тела в layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigBodySpec {
    pub name: String,
    pub offset: Vec3,
    pub half_extents: Vec3,
    pub mass: f32,
}

impl RigBodySpec {
    fn new(name: &str, offset: Vec3, half_extents: Vec3, mass: f32) -> Self {
        Self {
            name: name.to_string(),
            offset,
            half_extents,
            mass,
        }
    }
}

/// Layout тел rig'а. Пустой список = агрегатный rig на самом владельце.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RigLayout {
    pub bodies: Vec<RigBodySpec>,
    /// Масса агрегатного тела
    pub aggregate_mass: f32,
}

impl RigLayout {
    pub fn aggregate(mass: f32) -> Self {
        Self {
            bodies: Vec::new(),
            aggregate_mass: mass,
        }
    }

    /// Упрощённый гуманоид (таз, торс, голова, руки, ноги), ~70 kg.
    pub fn humanoid() -> Self {
        Self {
            bodies: vec![
                RigBodySpec::new("pelvis", Vec3::new(0.0, 0.9, 0.0), Vec3::new(0.18, 0.1, 0.12), 15.0),
                RigBodySpec::new("spine", Vec3::new(0.0, 1.25, 0.0), Vec3::new(0.2, 0.22, 0.12), 20.0),
                RigBodySpec::new("head", Vec3::new(0.0, 1.65, 0.0), Vec3::new(0.1, 0.12, 0.1), 5.0),
                RigBodySpec::new("arm_l", Vec3::new(-0.35, 1.3, 0.0), Vec3::new(0.06, 0.28, 0.06), 4.0),
                RigBodySpec::new("arm_r", Vec3::new(0.35, 1.3, 0.0), Vec3::new(0.06, 0.28, 0.06), 4.0),
                RigBodySpec::new("leg_l", Vec3::new(-0.12, 0.45, 0.0), Vec3::new(0.08, 0.42, 0.08), 11.0),
                RigBodySpec::new("leg_r", Vec3::new(0.12, 0.45, 0.0), Vec3::new(0.08, 0.42, 0.08), 11.0),
            ],
            aggregate_mass: 70.0,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Helper: создать тела rig'а и повесить `ReactionRig` на владельца.
///
/// Тела стартуют kinematic (completely passive) в позах из layout.
pub fn attach_reaction_rig(
    commands: &mut Commands,
    owner: Entity,
    owner_transform: &Transform,
    profile: ReactionProfile,
    layout: &RigLayout,
) -> Vec<Entity> {
    let bodies = if layout.is_aggregate() {
        commands.entity(owner).insert((
            ReactionBody {
                owner,
                rest_offset: Vec3::ZERO,
                mass: layout.aggregate_mass,
            },
            RigidBody::KinematicPositionBased,
            ExternalImpulse::default(),
            ColliderMassProperties::Mass(layout.aggregate_mass),
        ));
        vec![owner]
    } else {
        layout
            .bodies
            .iter()
            .map(|spec| {
                let transform = Transform {
                    translation: owner_transform.translation + owner_transform.rotation * spec.offset,
                    rotation: owner_transform.rotation,
                    ..default()
                };

                commands
                    .spawn((
                        Name::new(spec.name.clone()),
                        ReactionBody {
                            owner,
                            rest_offset: spec.offset,
                            mass: spec.mass,
                        },
                        transform,
                        RigidBody::KinematicPositionBased,
                        Collider::cuboid(spec.half_extents.x, spec.half_extents.y, spec.half_extents.z),
                        ColliderMassProperties::Mass(spec.mass),
                        crate::layers::reaction_body_groups(),
                        ExternalImpulse::default(),
                    ))
                    .id()
            })
            .collect()
    };

    commands
        .entity(owner)
        .insert(ReactionRig::new(profile, bodies.clone()));

    bodies
}
