//! Vector silhouettes in sprite-local field units

use glam::Vec2;

use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};

/// Ship outline at radius 80: wings, nose, and the notch at the tail
const HULL: [Vec2; 4] = [
    Vec2::new(-40.0, 40.0),
    Vec2::new(0.0, -80.0),
    Vec2::new(40.0, 40.0),
    Vec2::new(0.0, 20.0),
];

/// Ship outline scaled to `radius`
pub fn ship_hull(radius: f32) -> [Vec2; 4] {
    HULL.map(|p| p * (radius / 80.0))
}

/// Thrust flame; `length` in [0, 1) stretches it from 60 to 100 units
pub fn flame(radius: f32, length: f32) -> [Vec2; 3] {
    let scale = radius / 80.0;
    [
        Vec2::new(-20.0, 30.0) * scale,
        Vec2::new(0.0, length * 40.0 + 60.0) * scale,
        Vec2::new(20.0, 30.0) * scale,
    ]
}

/// Rotate local points by `rotation` and move them to `pos`
pub fn transform(points: &[Vec2], pos: Vec2, rotation: f32) -> Vec<Vec2> {
    let r = Vec2::from_angle(rotation);
    points.iter().map(|&p| pos + r.rotate(p)).collect()
}

/// Offset of the second copy for a sprite hanging over a field edge.
///
/// Both axes may contribute, giving a diagonal copy near a corner.
pub fn wrap_offset(pos: Vec2, radius: f32) -> Option<Vec2> {
    let mut offset = Vec2::ZERO;
    if pos.x - radius < 0.0 {
        offset.x = FIELD_WIDTH;
    } else if pos.x + radius > FIELD_WIDTH {
        offset.x = -FIELD_WIDTH;
    }
    if pos.y - radius < 0.0 {
        offset.y = FIELD_HEIGHT;
    } else if pos.y + radius > FIELD_HEIGHT {
        offset.y = -FIELD_HEIGHT;
    }
    (offset != Vec2::ZERO).then_some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_hull_scales() {
        let hull = ship_hull(40.0);
        assert_eq!(hull[1], Vec2::new(0.0, -40.0));
    }

    #[test]
    fn test_flame_length() {
        assert_eq!(flame(80.0, 0.0)[1], Vec2::new(0.0, 60.0));
        assert_eq!(flame(80.0, 0.5)[1], Vec2::new(0.0, 80.0));
    }

    #[test]
    fn test_transform_turns_nose() {
        let pts = transform(&ship_hull(80.0), Vec2::new(100.0, 100.0), PI);
        // Nose points down the field after half a turn
        assert!((pts[1] - Vec2::new(100.0, 180.0)).length() < 1e-3);
    }

    #[test]
    fn test_wrap_offset() {
        assert_eq!(wrap_offset(Vec2::new(2000.0, 1500.0), 80.0), None);
        assert_eq!(
            wrap_offset(Vec2::new(10.0, 1500.0), 80.0),
            Some(Vec2::new(FIELD_WIDTH, 0.0))
        );
        assert_eq!(
            wrap_offset(Vec2::new(FIELD_WIDTH - 10.0, FIELD_HEIGHT - 10.0), 80.0),
            Some(Vec2::new(-FIELD_WIDTH, -FIELD_HEIGHT))
        );
    }
}
