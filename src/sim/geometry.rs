//! Overlap testing between hit and bounding regions
//!
//! Three region shapes exist: a bare point, a circle, and a convex polygon.
//! Polygons keep their vertices in local space and cache the world-space
//! projection for the current offset/angle, so a sprite can re-pose its
//! regions once per tick and every overlap test afterwards reads the cache.
//!
//! Polygon overlap uses the separating-axis theorem: two convex shapes are
//! disjoint iff some edge normal of either one separates their projections.
//! Touching counts as overlap.

use glam::Vec2;
use thiserror::Error;

/// Invalid region construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon needs at least 2 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("polygon vertex {index} is not finite")]
    NonFiniteVertex { index: usize },
    #[error("circle radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),
}

/// A circle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Result<Self, GeometryError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(GeometryError::InvalidRadius(radius));
        }
        Ok(Self { center, radius })
    }

    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Projection interval onto a unit axis
    #[inline]
    fn project(&self, axis: Vec2) -> (f32, f32) {
        let c = self.center.dot(axis);
        (c - self.radius, c + self.radius)
    }
}

/// A convex polygon (a 2-vertex polygon is a line segment)
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    local: Vec<Vec2>,
    offset: Vec2,
    angle: f32,
    world: Vec<Vec2>,
    normals: Vec<Vec2>,
}

impl Polygon {
    /// Build from local-space vertices, posed at the origin with no rotation
    pub fn new(points: Vec<Vec2>) -> Result<Self, GeometryError> {
        if points.len() < 2 {
            return Err(GeometryError::TooFewVertices(points.len()));
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(GeometryError::NonFiniteVertex { index });
        }

        let mut polygon = Self {
            world: points.clone(),
            normals: Vec::with_capacity(points.len()),
            local: points,
            offset: Vec2::ZERO,
            angle: 0.0,
        };
        polygon.recompute();
        Ok(polygon)
    }

    /// Split a star-shaped outline into convex triangles fanned around `hub`
    pub fn triangle_fan(hub: Vec2, rim: &[Vec2]) -> Result<Vec<Polygon>, GeometryError> {
        if rim.len() < 2 {
            return Err(GeometryError::TooFewVertices(rim.len()));
        }
        (0..rim.len())
            .map(|i| Polygon::new(vec![hub, rim[i], rim[(i + 1) % rim.len()]]))
            .collect()
    }

    /// Pose the polygon at `offset`, rotated by `angle` radians
    pub fn update_transform(&mut self, offset: Vec2, angle: f32) {
        self.offset = offset;
        self.angle = angle;
        self.recompute();
    }

    fn recompute(&mut self) {
        let rotation = Vec2::from_angle(self.angle);
        self.world.clear();
        self.world
            .extend(self.local.iter().map(|&p| self.offset + rotation.rotate(p)));

        self.normals.clear();
        let n = self.world.len();
        for i in 0..n {
            let edge = self.world[(i + 1) % n] - self.world[i];
            self.normals.push(edge.perp().normalize_or_zero());
        }
    }

    pub fn local_points(&self) -> &[Vec2] {
        &self.local
    }

    pub fn world_points(&self) -> &[Vec2] {
        &self.world
    }

    /// Projection interval onto an axis
    fn project(&self, axis: Vec2) -> (f32, f32) {
        self.world
            .iter()
            .map(|p| p.dot(axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            })
    }

    /// Even-odd crossing test against the world-space outline
    pub fn contains_point(&self, point: Vec2) -> bool {
        let n = self.world.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (self.world[i], self.world[j]);
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
                if point.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Vertex nearest to a point
    fn closest_vertex(&self, point: Vec2) -> Vec2 {
        self.world
            .iter()
            .copied()
            .min_by(|a, b| a.distance_squared(point).total_cmp(&b.distance_squared(point)))
            .unwrap_or(self.offset)
    }
}

/// Any shape a sprite can use for hit testing
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    Point(Vec2),
    Circle(Circle),
    Polygon(Polygon),
}

impl Region {
    /// Move the region to a sprite pose (points and circles ignore rotation)
    pub fn update_transform(&mut self, pos: Vec2, rotation: f32) {
        match self {
            Region::Point(p) => *p = pos,
            Region::Circle(c) => c.center = pos,
            Region::Polygon(poly) => poly.update_transform(pos, rotation),
        }
    }
}

#[inline]
fn separated((min_a, max_a): (f32, f32), (min_b, max_b): (f32, f32)) -> bool {
    min_a > max_b || min_b > max_a
}

/// Circle-circle: centers closer than the radius sum
pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    let reach = a.radius + b.radius;
    a.center.distance_squared(b.center) <= reach * reach
}

/// Circle-polygon SAT: polygon edge normals plus the axis to the nearest vertex
pub fn circle_polygon_overlap(circle: &Circle, polygon: &Polygon) -> bool {
    for &axis in &polygon.normals {
        if separated(polygon.project(axis), circle.project(axis)) {
            return false;
        }
    }

    let axis = (circle.center - polygon.closest_vertex(circle.center)).normalize_or_zero();
    if axis != Vec2::ZERO && separated(polygon.project(axis), circle.project(axis)) {
        return false;
    }

    true
}

/// Polygon-polygon SAT across the edge normals of both
pub fn polygons_overlap(a: &Polygon, b: &Polygon) -> bool {
    a.normals
        .iter()
        .chain(b.normals.iter())
        .all(|&axis| !separated(a.project(axis), b.project(axis)))
}

/// Decide whether two regions intersect.
///
/// The match is exhaustive, so there is no runtime path for an unsupported
/// pairing.
pub fn test_overlap(a: &Region, b: &Region) -> bool {
    match (a, b) {
        (Region::Circle(a), Region::Circle(b)) => circles_overlap(a, b),
        (Region::Circle(c), Region::Polygon(p)) | (Region::Polygon(p), Region::Circle(c)) => {
            circle_polygon_overlap(c, p)
        }
        (Region::Polygon(a), Region::Polygon(b)) => polygons_overlap(a, b),
        (Region::Point(pt), Region::Circle(c)) | (Region::Circle(c), Region::Point(pt)) => {
            c.contains_point(*pt)
        }
        (Region::Point(pt), Region::Polygon(p)) | (Region::Polygon(p), Region::Point(pt)) => {
            p.contains_point(*pt)
        }
        (Region::Point(a), Region::Point(b)) => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

    fn square(half: f32) -> Polygon {
        Polygon::new(vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ])
        .unwrap()
    }

    fn circle(x: f32, y: f32, r: f32) -> Region {
        Region::Circle(Circle::new(Vec2::new(x, y), r).unwrap())
    }

    #[test]
    fn test_rejects_degenerate_shapes() {
        assert_eq!(
            Polygon::new(vec![Vec2::ZERO]).unwrap_err(),
            GeometryError::TooFewVertices(1)
        );
        assert_eq!(
            Polygon::new(vec![Vec2::ZERO, Vec2::new(f32::NAN, 1.0)]).unwrap_err(),
            GeometryError::NonFiniteVertex { index: 1 }
        );
        assert!(Circle::new(Vec2::ZERO, -1.0).is_err());
    }

    #[test]
    fn test_update_transform_rotates_and_offsets() {
        let mut p = Polygon::new(vec![Vec2::new(0.0, -10.0), Vec2::new(5.0, 0.0)]).unwrap();
        p.update_transform(Vec2::new(100.0, 100.0), FRAC_PI_2);
        let w = p.world_points();
        assert!((w[0] - Vec2::new(110.0, 100.0)).length() < 1e-4);
        assert!((w[1] - Vec2::new(100.0, 105.0)).length() < 1e-4);
        assert_eq!(p.local_points()[0], Vec2::new(0.0, -10.0));
    }

    #[test]
    fn test_circle_circle() {
        assert!(test_overlap(&circle(0.0, 0.0, 10.0), &circle(15.0, 0.0, 5.0)));
        assert!(!test_overlap(&circle(0.0, 0.0, 10.0), &circle(15.1, 0.0, 5.0)));
    }

    #[test]
    fn test_circle_polygon_corner_region() {
        let mut sq = square(10.0);
        sq.update_transform(Vec2::ZERO, 0.0);
        let sq = Region::Polygon(sq);
        // Outside the corner diagonally: edge normals alone would not separate
        assert!(!test_overlap(&circle(14.0, 14.0, 5.0), &sq));
        assert!(test_overlap(&circle(13.0, 13.0, 5.0), &sq));
        assert!(test_overlap(&sq, &circle(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_polygon_polygon() {
        let a = square(10.0);
        let mut b = square(10.0);
        b.update_transform(Vec2::new(25.0, 0.0), 0.0);
        assert!(!test_overlap(&Region::Polygon(a.clone()), &Region::Polygon(b.clone())));

        b.update_transform(Vec2::new(25.0, 0.0), FRAC_PI_4);
        // Rotated square reaches 10 * sqrt(2) ≈ 14.1 toward `a`
        assert!(test_overlap(&Region::Polygon(a), &Region::Polygon(b)));
    }

    #[test]
    fn test_segment_against_polygon() {
        let sq = Region::Polygon(square(10.0));
        let crossing = Polygon::new(vec![Vec2::new(-20.0, 0.0), Vec2::new(20.0, 0.0)]).unwrap();
        let beside = Polygon::new(vec![Vec2::new(11.0, -20.0), Vec2::new(11.0, 20.0)]).unwrap();
        assert!(test_overlap(&sq, &Region::Polygon(crossing)));
        assert!(!test_overlap(&sq, &Region::Polygon(beside)));
    }

    #[test]
    fn test_point_regions() {
        let sq = Region::Polygon(square(10.0));
        assert!(test_overlap(&Region::Point(Vec2::new(3.0, -4.0)), &sq));
        assert!(!test_overlap(&sq, &Region::Point(Vec2::new(30.0, 0.0))));
        assert!(test_overlap(&Region::Point(Vec2::new(3.0, 4.0)), &circle(0.0, 0.0, 5.0)));
        assert!(!test_overlap(&circle(0.0, 0.0, 4.9), &Region::Point(Vec2::new(3.0, 4.0))));
        assert!(test_overlap(
            &Region::Point(Vec2::new(1.0, 1.0)),
            &Region::Point(Vec2::new(1.0, 1.0))
        ));
        assert!(!test_overlap(
            &Region::Point(Vec2::new(1.0, 1.0)),
            &Region::Point(Vec2::new(1.0, 2.0))
        ));
    }

    #[test]
    fn test_triangle_fan_covers_star_outline() {
        let rim: Vec<Vec2> = (0..8)
            .map(|i| {
                let r = if i % 2 == 0 { 10.0 } else { 5.0 };
                Vec2::from_angle(i as f32 * TAU / 8.0) * r
            })
            .collect();
        let fan = Polygon::triangle_fan(Vec2::ZERO, &rim).unwrap();
        assert_eq!(fan.len(), 8);
        // Tip of a spike is covered, the notch between spikes is not
        let tip = Region::Point(Vec2::new(9.5, 0.0));
        let notch = Region::Point(Vec2::from_angle(TAU / 16.0) * 7.0);
        assert!(fan.iter().any(|t| test_overlap(&Region::Polygon(t.clone()), &tip)));
        assert!(!fan.iter().any(|t| test_overlap(&Region::Polygon(t.clone()), &notch)));
    }

    fn polygon_in_circle(radius: f32, radii: &[f32], angle: f32) -> Polygon {
        let n = radii.len();
        let rim: Vec<Vec2> = radii
            .iter()
            .enumerate()
            .map(|(i, f)| Vec2::from_angle(i as f32 * TAU / n as f32) * radius * f)
            .collect();
        let mut p = Polygon::new(rim).unwrap();
        p.update_transform(Vec2::ZERO, angle);
        p
    }

    proptest! {
        // Any polygon inscribed in its hit circle can only overlap another
        // such polygon when the hit circles overlap too.
        #[test]
        fn circle_precheck_never_hides_a_polygon_hit(
            ra in 10.0f32..200.0,
            rb in 10.0f32..200.0,
            fa in proptest::collection::vec(0.3f32..1.0, 3),
            fb in proptest::collection::vec(0.3f32..1.0, 3),
            angle_a in 0.0f32..TAU,
            angle_b in 0.0f32..TAU,
            bx in -600.0f32..600.0,
            by in -600.0f32..600.0,
        ) {
            let a = polygon_in_circle(ra, &fa, angle_a);
            let mut b = polygon_in_circle(rb, &fb, angle_b);
            b.update_transform(Vec2::new(bx, by), angle_b);

            let ca = Circle::new(Vec2::ZERO, ra).unwrap();
            let cb = Circle::new(Vec2::new(bx, by), rb).unwrap();
            if polygons_overlap(&a, &b) {
                prop_assert!(circles_overlap(&ca, &cb));
            }
        }

        #[test]
        fn overlap_is_symmetric(
            cx in -50.0f32..50.0,
            cy in -50.0f32..50.0,
            r in 0.0f32..30.0,
            angle in 0.0f32..TAU,
        ) {
            let mut sq = square(10.0);
            sq.update_transform(Vec2::ZERO, angle);
            let sq = Region::Polygon(sq);
            let c = circle(cx, cy, r);
            prop_assert_eq!(test_overlap(&sq, &c), test_overlap(&c, &sq));
        }
    }
}
