//! Bullets
//!
//! A bullet's collision shape is the segment it sweeps in one reference
//! frame, trailing behind it, so fast shots cannot tunnel through thin rock
//! between frames.

use glam::Vec2;

use super::geometry::{Circle, GeometryError, Polygon, Region};
use super::sprite::{Entity, Sprite, z_order};
use crate::consts::{REFERENCE_DELTA_TIME, VELOCITY_FACTOR};
use crate::heading;
use crate::tuning::Tuning;

/// Distance a bullet covers in one reference frame
pub fn tail_length(speed: f32) -> f32 {
    speed * VELOCITY_FACTOR * REFERENCE_DELTA_TIME
}

/// Fire a bullet from `muzzle` along `rotation`
pub fn spawn(muzzle: Vec2, rotation: f32, tuning: &Tuning) -> Result<Sprite, GeometryError> {
    let tail = tail_length(tuning.bullet_speed);
    // Local +y is behind the bullet once rotated to its heading
    let segment = Polygon::new(vec![Vec2::ZERO, Vec2::new(0.0, tail)])?;
    let hit = Circle::new(muzzle, tail)?;

    Ok(Sprite::new(
        muzzle,
        Entity::Bullet,
        z_order::BULLET,
        1.0,
        Region::Circle(hit),
        vec![Region::Polygon(segment)],
    )
    .with_rotation(rotation)
    .with_velocity(heading(rotation) * tuning.bullet_speed)
    .with_ttl(tuning.bullet_ttl_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::sprite::{Kind, Lifecycle};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_tail_length_is_one_reference_frame() {
        assert!((tail_length(2000.0) - 33.333_336).abs() < 1e-3);
    }

    #[test]
    fn test_spawn_heads_along_rotation() {
        let tuning = Tuning::default();
        let b = spawn(Vec2::new(1000.0, 1000.0), FRAC_PI_2, &tuning).unwrap();
        assert_eq!(b.kind(), Kind::Bullet);
        assert_eq!(b.z, z_order::BULLET);
        assert_eq!(b.ttl, Some(1200.0));
        assert!((b.vel - Vec2::new(2000.0, 0.0)).length() < 1e-2);
    }

    #[test]
    fn test_tail_trails_behind() {
        let tuning = Tuning::default();
        let mut b = spawn(Vec2::new(1000.0, 1000.0), FRAC_PI_2, &tuning).unwrap();
        b.sync_regions_to_pose();
        let Region::Polygon(segment) = &b.bounding_regions()[0] else {
            panic!("bullet bounding region is a segment");
        };
        let tip = segment.world_points()[1];
        // Heading is +x, so the tail end lies toward -x
        assert!((tip - Vec2::new(1000.0 - tail_length(2000.0), 1000.0)).length() < 1e-2);
    }

    #[test]
    fn test_lives_for_ttl() {
        let tuning = Tuning::default();
        let mut b = spawn(Vec2::new(10.0, 10.0), 0.0, &tuning).unwrap();
        for _ in 0..74 {
            assert_eq!(b.update(16.0), Lifecycle::Active);
        }
        // 1184 ms elapsed
        assert_eq!(b.update(15.0), Lifecycle::Active);
        assert_eq!(b.update(1.0), Lifecycle::Expired);
    }
}
