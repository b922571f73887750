//! Impact reaction engine
//!
//! Превращает удар (точка, направление, сила) в физический отклик тел врага.
//! Оба режима (многотельный ragdoll и хаотичное агрегатное тело): одна модель,
//! различаются только `ReactionProfile`.
//!
//! Вход: `ImpactRequest` (пишет combat при уроне/смерти или внешний код напрямую).
//! Выход: `ImpactApplied`, `RigActivated`, `RigRecovered`.

use bevy::prelude::*;

pub mod model;
pub mod rig;
pub mod systems;


pub use model::{
    explosion_falloff, falloff_force, plan_impulses, plan_residual, random_in_unit_disc, random_in_unit_sphere,
    BodyImpulse, BodySample, ExplosionForce, ImpactEvent, ReactionProfile, ResidualSequence, ScatterForces,
};
pub use rig::{attach_reaction_rig, Limp, ReactionBody, ReactionRig, RigBodySpec, RigLayout};

/// Источник удара (для логов и подписчиков).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ImpactKind {
    /// Несмертельный урон
    Hit,
    /// Смертельный удар (сила уже умножена на death multiplier)
    Death,
    /// Внешний вызов движка реакции без урона
    External,
}

/// Event: применить удар к rig'у entity.
#[derive(Event, Debug, Clone, Copy)]
pub struct ImpactRequest {
    pub entity: Entity,
    pub impact: ImpactEvent,
    pub kind: ImpactKind,
}

impl ImpactRequest {
    pub fn external(entity: Entity, point: Vec3, direction: Vec3, magnitude: f32) -> Self {
        Self {
            entity,
            impact: ImpactEvent::new(point, direction, magnitude),
            kind: ImpactKind::External,
        }
    }
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ImpactApplied {
    pub entity: Entity,
    pub impact: ImpactEvent,
    pub kind: ImpactKind,
    pub bodies: usize,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct RigActivated {
    pub entity: Entity,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct RigRecovered {
    pub entity: Entity,
}

/// Reaction Plugin
///
/// Порядок в `SimSet::Reaction` (после combat, который пишет `ImpactRequest`):
/// 1. apply_impact_requests
/// 2. apply_residual_impulses
/// 3. recover_rigs
/// 4. follow_owner_while_kinematic
pub struct ReactionPlugin;

impl Plugin for ReactionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ImpactRequest>()
            .add_event::<ImpactApplied>()
            .add_event::<RigActivated>()
            .add_event::<RigRecovered>()
            .add_observer(systems::despawn_rig_bodies);

        app.add_systems(
            FixedUpdate,
            (
                systems::apply_impact_requests,
                systems::apply_residual_impulses,
                systems::recover_rigs,
                systems::follow_owner_while_kinematic,
            )
                .chain()
                .in_set(crate::SimSet::Reaction),
        );
    }
}
