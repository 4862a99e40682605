//! Asteroids: tiers, jagged silhouettes and splitting

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Circle, GeometryError, Polygon, Region};
use super::sprite::{Entity, Sprite, z_order};
use crate::tuning::{TierTuning, Tuning};

/// Number of randomized radii around an asteroid
pub const ASTEROID_RADII: usize = 11;
/// Each radius is drawn as two outline vertices
pub const OUTLINE_VERTICES: usize = ASTEROID_RADII * 2;

/// Asteroid size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsteroidTier {
    Large,
    Medium,
    Small,
}

impl AsteroidTier {
    /// Tier a fragment of this asteroid belongs to
    pub fn smaller(self) -> Option<AsteroidTier> {
        match self {
            AsteroidTier::Large => Some(AsteroidTier::Medium),
            AsteroidTier::Medium => Some(AsteroidTier::Small),
            AsteroidTier::Small => None,
        }
    }
}

/// Asteroid payload
#[derive(Debug, Clone, PartialEq)]
pub struct Asteroid {
    pub tier: AsteroidTier,
    radii: Vec<f32>,
}

impl Asteroid {
    pub fn new(tier: AsteroidTier, radii: Vec<f32>) -> Self {
        Self { tier, radii }
    }

    /// Jagged silhouette: every radius falls in [size/2, size]
    pub fn random<R: Rng>(tier: AsteroidTier, size: f32, rng: &mut R) -> Self {
        let radii = (0..ASTEROID_RADII)
            .map(|_| (1.0 - rng.random::<f32>() * 0.5) * size)
            .collect();
        Self::new(tier, radii)
    }

    /// Local-space outline, two vertices per radius, clockwise from just
    /// past the bottom of the rock
    pub fn outline(&self) -> Vec<Vec2> {
        let step = TAU / (self.radii.len() * 2) as f32;
        self.radii
            .iter()
            .flat_map(|&r| [r, r])
            .enumerate()
            .map(|(k, r)| Vec2::from_angle((k + 1) as f32 * step).rotate(Vec2::new(0.0, r)))
            .collect()
    }
}

/// Build an asteroid sprite. Bounding regions fan the outline into
/// triangles since the silhouette is not convex.
pub fn spawn(
    pos: Vec2,
    vel: Vec2,
    rpm: f32,
    asteroid: Asteroid,
    tier: &TierTuning,
) -> Result<Sprite, GeometryError> {
    let fan = Polygon::triangle_fan(Vec2::ZERO, &asteroid.outline())?;
    let hit = Circle::new(pos, tier.radius)?;
    Ok(Sprite::new(
        pos,
        Entity::Asteroid(asteroid),
        z_order::ASTEROID,
        tier.radius,
        Region::Circle(hit),
        fan.into_iter().map(Region::Polygon).collect(),
    )
    .with_velocity(vel)
    .with_rpm(rpm))
}

/// Velocity for a fresh wave asteroid: random heading, speed within the tier range
pub fn random_velocity<R: Rng>(tier: &TierTuning, rng: &mut R) -> Vec2 {
    let speed = if tier.max_speed > tier.min_speed {
        rng.random_range(tier.min_speed..tier.max_speed)
    } else {
        tier.min_speed
    };
    Vec2::from_angle(rng.random::<f32>() * TAU) * speed
}

/// Random spin in ±`max_rpm`
pub fn random_rpm<R: Rng>(max_rpm: f32, rng: &mut R) -> f32 {
    (rng.random::<f32>() * 2.0 - 1.0) * max_rpm
}

/// Velocities for the fragments of a destroyed asteroid.
///
/// Fragments fan out around the parent's direction of travel, alternating
/// sides, each offset by up to `split_spread` radians, at the parent's speed
/// times `split_speed_fraction` times the child tier's multiplier. A
/// stationary parent sends them in random directions at the child's
/// `min_speed`.
pub fn split_velocities<R: Rng>(
    parent_vel: Vec2,
    child: &TierTuning,
    count: u32,
    tuning: &Tuning,
    rng: &mut R,
) -> Vec<Vec2> {
    let parent_speed = parent_vel.length();
    let speed = if parent_speed > f32::EPSILON {
        parent_speed * tuning.split_speed_fraction * child.speed_multiplier
    } else {
        child.min_speed
    };

    (0..count)
        .map(|i| {
            let direction = if parent_speed > f32::EPSILON {
                let side = if i % 2 == 0 { -1.0 } else { 1.0 };
                let offset = tuning.split_spread * rng.random_range(0.5..=1.0);
                parent_vel.y.atan2(parent_vel.x) + side * offset
            } else {
                rng.random::<f32>() * TAU
            };
            Vec2::from_angle(direction) * speed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::test_overlap;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_tier_chain() {
        assert_eq!(AsteroidTier::Large.smaller(), Some(AsteroidTier::Medium));
        assert_eq!(AsteroidTier::Medium.smaller(), Some(AsteroidTier::Small));
        assert_eq!(AsteroidTier::Small.smaller(), None);
    }

    #[test]
    fn test_random_radii_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let a = Asteroid::random(AsteroidTier::Large, 230.0, &mut rng);
        let outline = a.outline();
        assert_eq!(outline.len(), OUTLINE_VERTICES);
        assert!(outline.iter().all(|p| (115.0 - 1e-3..=230.0 + 1e-3).contains(&p.length())));
        // Vertices come in pairs sharing one radius
        assert!((outline[0].length() - outline[1].length()).abs() < 1e-3);
    }

    #[test]
    fn test_outline_shape() {
        let a = Asteroid::new(AsteroidTier::Small, vec![10.0; ASTEROID_RADII]);
        let outline = a.outline();
        assert_eq!(outline.len(), OUTLINE_VERTICES);
        assert!(outline.iter().all(|p| (p.length() - 10.0).abs() < 1e-4));
        // Last vertex closes the circle back at the bottom
        assert!((outline[OUTLINE_VERTICES - 1] - Vec2::new(0.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn test_spawn_regions_inside_hit_circle() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let rock = Asteroid::random(AsteroidTier::Medium, tuning.medium.radius, &mut rng);
        let mut sprite = spawn(Vec2::new(400.0, 300.0), Vec2::ZERO, 1.0, rock, &tuning.medium).unwrap();
        sprite.sync_regions_to_pose();

        assert_eq!(sprite.bounding_regions().len(), OUTLINE_VERTICES);
        for region in sprite.bounding_regions() {
            let Region::Polygon(triangle) = region else {
                panic!("asteroid bounding regions are polygons");
            };
            for p in triangle.world_points() {
                assert!(p.distance(Vec2::new(400.0, 300.0)) <= tuning.medium.radius + 1e-3);
            }
        }
        // Just off the center of the rock is solid
        let center = Region::Point(Vec2::new(403.0, 301.5));
        assert!(sprite.bounding_regions().iter().any(|r| test_overlap(r, &center)));
    }

    #[test]
    fn test_split_follows_parent_heading() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let parent = Vec2::new(150.0, 0.0);
        let vels = split_velocities(parent, &tuning.medium, 2, &tuning, &mut rng);
        assert_eq!(vels.len(), 2);

        let expected_speed = 150.0 * 0.75 * 1.6;
        for (i, v) in vels.iter().enumerate() {
            assert!((v.length() - expected_speed).abs() < 1e-3);
            let angle = v.y.atan2(v.x);
            assert!(angle.abs() >= tuning.split_spread * 0.5 - 1e-5);
            assert!(angle.abs() <= tuning.split_spread + 1e-5);
            // Fragments break to opposite sides
            assert_eq!(angle < 0.0, i % 2 == 0);
        }
    }

    #[test]
    fn test_split_keeps_slow_parent_speed() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(13);
        // 60 × 0.75 × 1.6 sits below the medium tier's wave minimum of 100
        let vels = split_velocities(Vec2::new(60.0, 0.0), &tuning.medium, 2, &tuning, &mut rng);
        assert!(vels.iter().all(|v| (v.length() - 72.0).abs() < 1e-3));
    }

    #[test]
    fn test_split_from_stationary_parent_uses_min_speed() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let vels = split_velocities(Vec2::ZERO, &tuning.small, 2, &tuning, &mut rng);
        assert!(vels.iter().all(|v| (v.length() - tuning.small.min_speed).abs() < 1e-3));
    }
}
