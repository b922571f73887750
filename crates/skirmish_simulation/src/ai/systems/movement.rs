//! AI movement systems.

use bevy::prelude::*;

use crate::ai::{AIConfig, AIState, PathfindingAgent, Pursuit, WanderState};
use crate::combat::Dead;
use crate::reaction::Limp;
use crate::reaction::random_in_unit_disc;
use crate::DeterministicRng;

/// Ближе этого wander-точка считается достигнутой
pub const ARRIVE_DISTANCE: f32 = 0.5;

/// Шаг по горизонтали к `goal` без перелёта + плавный поворот к направлению движения.
pub fn step_towards(transform: &mut Transform, goal: Vec3, speed: f32, rotation_speed: f32, dt: f32) {
    let mut to_goal = goal - transform.translation;
    to_goal.y = 0.0;

    let distance = to_goal.length();
    if distance <= f32::EPSILON {
        return;
    }

    let direction = to_goal / distance;
    transform.translation += direction * (speed * dt).min(distance);

    let heading = Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation;
    transform.rotation = transform
        .rotation
        .slerp(heading, (rotation_speed * dt).clamp(0.0, 1.0));
}

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Система: AI movement from state
///
/// - Chasing: к цели, пока она дальше attack_range
/// - Wandering: к случайной точке в диске `wander_radius` вокруг точки спавна,
///   новая точка по прибытии или каждые `wander_interval` секунд
/// - Idle/Attacking: стоим
/// - `Limp`: стоим в любом состоянии, тела rig'а двигает физика
///
/// С `PathfindingAgent` выставляется destination, иначе Transform двигается напрямую.
pub fn ai_movement_from_state(
    mut agents: Query<
        (
            &AIState,
            &AIConfig,
            &Pursuit,
            &mut WanderState,
            &mut Transform,
            Option<&mut PathfindingAgent>,
            Has<Limp>,
        ),
        Without<Dead>,
    >,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let now = time.elapsed_secs();

    for (state, config, pursuit, mut wander, mut transform, agent, limp) in agents.iter_mut() {
        if limp {
            if let Some(mut agent) = agent {
                agent.stop();
            }
            continue;
        }

        let position = transform.translation;
        let origin = *wander.origin.get_or_insert(position);

        let goal = match state {
            AIState::Chasing => match (pursuit.target_position, pursuit.distance) {
                (Some(target), Some(distance)) if distance > config.attack_range => {
                    Some((target, config.move_speed))
                }
                _ => None,
            },

            AIState::Wandering => {
                let arrived = wander
                    .goal
                    .is_none_or(|goal| horizontal_distance(goal, position) < ARRIVE_DISTANCE);

                if arrived || now >= wander.next_pick {
                    let offset = random_in_unit_disc(&mut rng.rng) * config.wander_radius;
                    wander.goal = Some(origin + Vec3::new(offset.x, 0.0, offset.y));
                    wander.next_pick = now + config.wander_interval;
                }

                wander
                    .goal
                    .map(|goal| (goal, config.move_speed * config.wander_speed_factor))
            }

            AIState::Idle | AIState::Attacking => None,
        };

        let Some((goal, speed)) = goal else {
            if let Some(mut agent) = agent {
                agent.stop();
            }
            continue;
        };

        if let Some(mut agent) = agent {
            agent.destination = Some(goal);
            agent.speed = speed;
            continue;
        }

        step_towards(&mut transform, goal, speed, config.rotation_speed, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_moves_horizontally_without_overshoot() {
        let mut transform = Transform::from_xyz(0.0, 1.0, 0.0);
        step_towards(&mut transform, Vec3::new(3.0, 5.0, 4.0), 2.0, 5.0, 1.0);

        // 2 метра из 5 по направлению (0.6, 0, 0.8), высота не меняется
        assert!((transform.translation - Vec3::new(1.2, 1.0, 1.6)).length() < 1e-4);

        step_towards(&mut transform, Vec3::new(3.0, 5.0, 4.0), 100.0, 5.0, 1.0);
        assert!((transform.translation - Vec3::new(3.0, 1.0, 4.0)).length() < 1e-4);
    }

    #[test]
    fn test_rotation_turns_towards_heading() {
        let mut transform = Transform::default();
        for _ in 0..200 {
            step_towards(&mut transform, Vec3::new(100.0, 0.0, 0.0), 0.0, 5.0, 1.0 / 64.0);
        }

        let forward = transform.forward().as_vec3();
        assert!(forward.dot(Vec3::X) > 0.99, "forward = {:?}", forward);
    }
}
