//! Impact reaction model (pure math, без ECS)
//!
//! Одна модель на оба режима:
//! - "ragdoll": много тел, импульс распределяется с falloff `1 / (1 + d)`
//! - "chaotic": одно агрегатное тело, пять категорий сил + остаточная серия импульсов
//!
//! Режим задаётся набором включённых категорий в `ReactionProfile`.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Удар: точка, направление (нормализуется движком), сила.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ImpactEvent {
    pub point: Vec3,
    pub direction: Vec3,
    pub magnitude: f32,
}

impl ImpactEvent {
    pub fn new(point: Vec3, direction: Vec3, magnitude: f32) -> Self {
        Self {
            point,
            direction,
            magnitude: magnitude.max(0.0),
        }
    }

    /// Тот же удар с умноженной силой (death multiplier).
    pub fn amplified(self, factor: f32) -> Self {
        Self::new(self.point, self.direction, self.magnitude * factor)
    }

    pub fn unit_direction(&self) -> Vec3 {
        self.direction.normalize_or_zero()
    }
}

/// Радиальный импульс от точки удара, ноль за пределами радиуса.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ExplosionForce {
    pub strength: f32,
    pub radius: f32,
    /// Смещение центра вниз для направления (подбрасывает тела)
    pub upward_modifier: f32,
}

/// N импульсов в случайных точках вокруг удара.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ScatterForces {
    pub count: u32,
    pub radius: f32,
    pub min: f32,
    pub max: f32,
}

/// Серия маленьких импульсов после удара (5 × 0.1s по умолчанию).
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ResidualSequence {
    pub ticks: u32,
    pub spacing: f32,
    pub impulse_factor: f32,
    pub torque_factor: f32,
}

impl Default for ResidualSequence {
    fn default() -> Self {
        Self {
            ticks: 5,
            spacing: 0.1,
            impulse_factor: 0.05,
            torque_factor: 0.02,
        }
    }
}

/// Параметры реакции на удар
///
/// Коэффициенты категорий (upward/spin/bounce/scatter) уже включают масштаб 0.1:
/// итоговый импульс = coefficient × force_multiplier × magnitude.
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionProfile {
    pub force_multiplier: f32,
    /// Per-body falloff `magnitude * multiplier / (1 + distance)`
    pub distributed: bool,
    /// Доля случайного torque от distributed силы (≤ 0.1 × force)
    pub torque_jitter: f32,
    pub explosion: Option<ExplosionForce>,
    pub upward_force: f32,
    pub spin_force: f32,
    pub bounce_force: f32,
    pub scatter: Option<ScatterForces>,
    pub residual: Option<ResidualSequence>,
    pub auto_recover: bool,
    pub recovery_time: f32,
}

impl Default for ReactionProfile {
    fn default() -> Self {
        Self::ragdoll()
    }
}

impl ReactionProfile {
    /// Многотельный ragdoll: falloff + радиальный импульс, восстановление через 3s.
    pub fn ragdoll() -> Self {
        Self {
            force_multiplier: 1.0,
            distributed: true,
            torque_jitter: 0.1,
            explosion: Some(ExplosionForce {
                strength: 1.0,
                radius: 2.0,
                upward_modifier: 0.0,
            }),
            upward_force: 0.0,
            spin_force: 0.0,
            bounce_force: 0.0,
            scatter: None,
            residual: None,
            auto_recover: true,
            recovery_time: 3.0,
        }
    }

    /// Одно агрегатное тело: все пять категорий + остаточная серия.
    pub fn chaotic() -> Self {
        Self {
            force_multiplier: 1.0,
            distributed: false,
            torque_jitter: 0.0,
            explosion: Some(ExplosionForce {
                strength: 1.5,
                radius: 3.0,
                upward_modifier: 0.5,
            }),
            upward_force: 0.5,
            spin_force: 1.0,
            bounce_force: 0.8,
            scatter: Some(ScatterForces {
                count: 3,
                radius: 2.0,
                min: 0.5,
                max: 1.5,
            }),
            residual: Some(ResidualSequence::default()),
            auto_recover: false,
            recovery_time: 3.0,
        }
    }

    /// Умножить общую интенсивность (единая ручка вместо двух реализаций).
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.force_multiplier *= intensity.max(0.0);
        self
    }
}

/// Позиция тела в момент удара.
#[derive(Debug, Clone, Copy)]
pub struct BodySample {
    pub entity: Entity,
    pub position: Vec3,
}

/// Импульс и torque для одного тела.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyImpulse {
    pub entity: Entity,
    pub impulse: Vec3,
    pub torque: Vec3,
}

impl BodyImpulse {
    fn zero(entity: Entity) -> Self {
        Self {
            entity,
            impulse: Vec3::ZERO,
            torque: Vec3::ZERO,
        }
    }
}

/// Inverse-distance falloff (не inverse-square: нет сингулярности в d = 0).
pub fn falloff_force(magnitude: f32, multiplier: f32, distance: f32) -> f32 {
    magnitude * multiplier / (1.0 + distance.max(0.0))
}

/// Линейный falloff радиального импульса, 0 на радиусе и дальше.
pub fn explosion_falloff(force: f32, radius: f32, distance: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    force * (1.0 - distance / radius)
}

pub fn random_in_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}

pub fn random_in_unit_disc<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    loop {
        let v = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}

fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Рассчитать импульсы для всех тел от одного удара.
pub fn plan_impulses<R: Rng + ?Sized>(
    profile: &ReactionProfile,
    impact: &ImpactEvent,
    bodies: &[BodySample],
    rng: &mut R,
) -> Vec<BodyImpulse> {
    let heading = impact.unit_direction();
    let scale = profile.force_multiplier * impact.magnitude;

    bodies
        .iter()
        .map(|body| {
            let mut out = BodyImpulse::zero(body.entity);
            let offset = body.position - impact.point;
            let distance = offset.length();

            if profile.distributed {
                // Тело в самой точке удара толкаем по направлению удара
                let push_dir = offset.try_normalize().unwrap_or(heading);
                let force = falloff_force(impact.magnitude, profile.force_multiplier, distance);
                out.impulse += push_dir * force;
                out.torque += random_in_unit_sphere(rng) * force * profile.torque_jitter;
            }

            if let Some(explosion) = profile.explosion {
                let center = impact.point - Vec3::Y * explosion.upward_modifier;
                let push_dir = (body.position - center).try_normalize().unwrap_or(Vec3::Y);
                let force = explosion_falloff(explosion.strength * scale, explosion.radius, distance);
                out.impulse += push_dir * force;
            }

            if profile.upward_force > 0.0 {
                let up = Vec3::Y + random_in_unit_sphere(rng) * 0.3;
                out.impulse += up * profile.upward_force * scale;
            }

            if profile.spin_force > 0.0 {
                let axis = heading.cross(random_in_unit_sphere(rng)).normalize_or_zero();
                out.torque += axis * profile.spin_force * scale;
            }

            if profile.bounce_force > 0.0 {
                let bounce = (reflect(heading, Vec3::Y) + random_in_unit_sphere(rng) * 0.5).normalize_or_zero();
                out.impulse += bounce * profile.bounce_force * scale;
            }

            if let Some(scatter) = profile.scatter {
                for _ in 0..scatter.count {
                    let point = impact.point + random_in_unit_sphere(rng) * scatter.radius;
                    let dir = (point - impact.point).normalize_or_zero();
                    let strength = if scatter.max > scatter.min {
                        rng.gen_range(scatter.min..scatter.max)
                    } else {
                        scatter.min
                    };
                    let impulse = dir * strength * scale;
                    out.impulse += impulse;
                    // Импульс не в центре масс → крутящий момент
                    out.torque += (point - body.position).cross(impulse);
                }
            }

            out
        })
        .collect()
}

/// Один шаг остаточной серии для всех тел.
pub fn plan_residual<R: Rng + ?Sized>(
    sequence: &ResidualSequence,
    magnitude: f32,
    bodies: &[Entity],
    rng: &mut R,
) -> Vec<BodyImpulse> {
    bodies
        .iter()
        .map(|&entity| BodyImpulse {
            entity,
            impulse: random_in_unit_sphere(rng) * magnitude * sequence.impulse_factor,
            torque: random_in_unit_sphere(rng) * magnitude * sequence.torque_factor,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn body(index: u32, position: Vec3) -> BodySample {
        BodySample {
            entity: Entity::from_raw(index),
            position,
        }
    }

    fn falloff_only() -> ReactionProfile {
        ReactionProfile {
            explosion: None,
            torque_jitter: 0.0,
            ..ReactionProfile::ragdoll()
        }
    }

    #[test]
    fn test_falloff_is_monotonic_in_distance() {
        let mut previous = f32::INFINITY;
        for step in 0..50 {
            let force = falloff_force(100.0, 1.5, step as f32 * 0.25);
            assert!(force <= previous, "falloff grew at step {}", step);
            previous = force;
        }
        // Нет сингулярности в нуле
        assert_eq!(falloff_force(100.0, 1.0, 0.0), 100.0);
        assert_eq!(falloff_force(100.0, 1.0, 1.0), 50.0);
    }

    #[test]
    fn test_explosion_is_zero_beyond_radius() {
        assert_eq!(explosion_falloff(10.0, 2.0, 0.0), 10.0);
        assert_eq!(explosion_falloff(10.0, 2.0, 1.0), 5.0);
        assert_eq!(explosion_falloff(10.0, 2.0, 2.0), 0.0);
        assert_eq!(explosion_falloff(10.0, 2.0, 7.5), 0.0);
        assert_eq!(explosion_falloff(10.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_distributed_impulses_point_away_and_fall_off() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let impact = ImpactEvent::new(Vec3::ZERO, Vec3::Z, 30.0);
        let bodies = [body(1, Vec3::new(1.0, 0.0, 0.0)), body(2, Vec3::new(0.0, 3.0, 0.0))];

        let plan = plan_impulses(&falloff_only(), &impact, &bodies, &mut rng);

        assert_eq!(plan.len(), 2);
        assert!((plan[0].impulse - Vec3::new(15.0, 0.0, 0.0)).length() < 1e-4);
        assert!((plan[1].impulse - Vec3::new(0.0, 7.5, 0.0)).length() < 1e-4);
        assert!(plan[0].impulse.length() >= plan[1].impulse.length());
    }

    #[test]
    fn test_body_at_impact_point_uses_impact_direction() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let impact = ImpactEvent::new(Vec3::ONE, Vec3::new(0.0, 0.0, 4.0), 10.0);

        let plan = plan_impulses(&falloff_only(), &impact, &[body(1, Vec3::ONE)], &mut rng);

        assert!((plan[0].impulse - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn test_torque_jitter_is_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let profile = ReactionProfile {
            explosion: None,
            ..ReactionProfile::ragdoll()
        };
        let impact = ImpactEvent::new(Vec3::ZERO, Vec3::X, 40.0);
        let bodies: Vec<BodySample> = (0..32)
            .map(|i| body(i, Vec3::new(i as f32 * 0.3, 1.0, 0.0)))
            .collect();

        for planned in plan_impulses(&profile, &impact, &bodies, &mut rng) {
            let force = planned.impulse.length();
            assert!(planned.torque.length() <= 0.1 * force + 1e-4);
        }
    }

    #[test]
    fn test_explosion_adds_force_only_inside_radius() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let profile = ReactionProfile {
            distributed: false,
            ..ReactionProfile::ragdoll()
        };
        let impact = ImpactEvent::new(Vec3::ZERO, Vec3::X, 10.0);
        let bodies = [body(1, Vec3::new(1.0, 0.0, 0.0)), body(2, Vec3::new(5.0, 0.0, 0.0))];

        let plan = plan_impulses(&profile, &impact, &bodies, &mut rng);

        assert!((plan[0].impulse - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-4);
        assert_eq!(plan[1].impulse, Vec3::ZERO);
    }

    #[test]
    fn test_chaotic_profile_moves_single_body() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let impact = ImpactEvent::new(Vec3::new(0.0, 1.0, -0.5), Vec3::Z, 50.0);

        let plan = plan_impulses(&ReactionProfile::chaotic(), &impact, &[body(1, Vec3::new(0.0, 1.0, 0.0))], &mut rng);

        assert_eq!(plan.len(), 1);
        assert!(plan[0].impulse.length() > 0.0);
        assert!(plan[0].torque.length() > 0.0);
        // upward + explosion с upward_modifier → тело подбрасывает
        assert!(plan[0].impulse.y > 0.0);
    }

    #[test]
    fn test_zero_magnitude_produces_no_motion() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let impact = ImpactEvent::new(Vec3::ZERO, Vec3::X, 0.0);

        let plan = plan_impulses(&ReactionProfile::chaotic(), &impact, &[body(1, Vec3::Y)], &mut rng);

        assert_eq!(plan[0].impulse.length(), 0.0);
        assert_eq!(plan[0].torque.length(), 0.0);
    }

    #[test]
    fn test_residual_step_scales_with_magnitude() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let sequence = ResidualSequence::default();
        let bodies = [Entity::from_raw(1), Entity::from_raw(2)];

        for step in plan_residual(&sequence, 40.0, &bodies, &mut rng) {
            assert!(step.impulse.length() <= 40.0 * 0.05 + 1e-4);
            assert!(step.torque.length() <= 40.0 * 0.02 + 1e-4);
        }
    }

    #[test]
    fn test_negative_magnitude_is_clamped() {
        let impact = ImpactEvent::new(Vec3::ZERO, Vec3::X, -5.0);
        assert_eq!(impact.magnitude, 0.0);
        assert_eq!(ImpactEvent::new(Vec3::ZERO, Vec3::X, 4.0).amplified(2.0).magnitude, 8.0);
    }
}
