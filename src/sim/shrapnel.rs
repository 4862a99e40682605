//! Cosmetic explosion particles

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::geometry::Region;
use super::sprite::{Entity, Sprite, z_order};
use crate::tuning::Tuning;

/// Particles flung out of an explosion at `pos`
pub fn burst<R: Rng>(pos: Vec2, tuning: &Tuning, rng: &mut R) -> Vec<Sprite> {
    (0..tuning.shrapnel_count)
        .map(|_| {
            let direction = rng.random::<f32>() * TAU;
            let speed = tuning.shrapnel_max_speed * (rng.random::<f32>() * 0.75 + 0.25);
            Sprite::new(pos, Entity::Shrapnel, z_order::SHRAPNEL, 1.0, Region::Point(pos), Vec::new())
                .with_velocity(Vec2::from_angle(direction) * speed)
                .with_ttl(tuning.shrapnel_ttl_ms)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::sprite::Kind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        let pieces = burst(Vec2::new(50.0, 60.0), &tuning, &mut rng);

        assert_eq!(pieces.len(), 10);
        for p in &pieces {
            assert_eq!(p.kind(), Kind::Shrapnel);
            assert_eq!(p.ttl, Some(400.0));
            assert_eq!(p.pos, Vec2::new(50.0, 60.0));
            let speed = p.speed();
            assert!((124.9..=500.1).contains(&speed), "speed {speed}");
            assert!(p.bounding_regions().is_empty());
        }
    }
}
