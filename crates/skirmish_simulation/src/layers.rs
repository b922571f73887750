//! Collision layers (rapier `Group` bits)
//!
//! Используются для ground probing при спавне и для fallback поиска цели AI.

use bevy_rapier3d::prelude::{CollisionGroups, Group};

pub const GROUND: Group = Group::GROUP_1;
pub const PLAYER: Group = Group::GROUP_2;
pub const ENEMY: Group = Group::GROUP_3;
pub const REACTION_BODY: Group = Group::GROUP_4;

/// Group из сырых бит конфигурации (лишние биты отбрасываются).
pub fn group_from_bits(bits: u32) -> Group {
    Group::from_bits_truncate(bits)
}

pub fn player_groups() -> CollisionGroups {
    CollisionGroups::new(PLAYER, Group::ALL)
}

pub fn enemy_groups() -> CollisionGroups {
    CollisionGroups::new(ENEMY, Group::ALL)
}

/// Части ragdoll не сталкиваются друг с другом и с владельцем.
pub fn reaction_body_groups() -> CollisionGroups {
    CollisionGroups::new(REACTION_BODY, GROUND | PLAYER)
}

pub fn ground_groups() -> CollisionGroups {
    CollisionGroups::new(GROUND, Group::ALL)
}
