//! Vector line rendering
//!
//! The world is drawn in field units onto an abstract [`Surface`]; the
//! surface's pixel size sets the scale. Sprites arrive already in paint
//! order, so the pass is a single walk over [`World::sprites`].

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod shapes;

use glam::Vec2;
use rand::Rng;

use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};
use crate::sim::geometry::{Polygon, Region};
use crate::sim::sprite::{Entity, Sprite};
use crate::sim::world::World;

/// CSS colors
pub mod colors {
    pub const BACKGROUND: &str = "black";
    pub const LINE: &str = "white";
    pub const STAR: &str = "white";
    pub const BULLET: &str = "white";
    pub const SHRAPNEL: &str = "#eeeeee";
    pub const DEBUG: &str = "#BB0000";
    pub const CONTACT: &str = "#FFAA00";
}

/// Pixel size of a bullet and a shrapnel fleck
const BULLET_PIXELS: f32 = 2.0;
const SHRAPNEL_PIXELS: f32 = 1.0;

/// A 2D drawing target in pixels
pub trait Surface {
    /// Width and height in pixels
    fn size(&self) -> (f32, f32);
    fn clear(&mut self, color: &str);
    /// Outline through `points`, closing back to the start when `closed`
    fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: &str);
    /// Filled and outlined closed shape
    fn fill_polygon(&mut self, points: &[Vec2], fill: &str, stroke: &str);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: &str);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: &str);
}

/// Drawing switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub draw_debug: bool,
    pub starfield: bool,
}

/// Field-to-pixel mapping for a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldScale {
    pub x: f32,
    pub y: f32,
}

impl FieldScale {
    pub fn for_size(width: f32, height: f32) -> Self {
        Self {
            x: width / FIELD_WIDTH,
            y: height / FIELD_HEIGHT,
        }
    }

    #[inline]
    pub fn point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x * self.x, p.y * self.y)
    }

    pub fn points(&self, pts: &[Vec2]) -> Vec<Vec2> {
        pts.iter().map(|&p| self.point(p)).collect()
    }

    /// Lengths use the vertical scale
    #[inline]
    pub fn length(&self, l: f32) -> f32 {
        l * self.y
    }
}

/// Largest 4:3 size that fits in 90% of the window
pub fn fit_to_window(window_width: f32, window_height: f32) -> (u32, u32) {
    let mut width = window_width * 0.9;
    let mut height = width * 3.0 / 4.0;
    if height > window_height * 0.9 {
        height = window_height * 0.9;
        width = height * 4.0 / 3.0;
    }
    (width.floor().max(0.0) as u32, height.floor().max(0.0) as u32)
}

/// Static background stars in field units
#[derive(Debug, Clone)]
pub struct Starfield {
    stars: Vec<Vec2>,
}

impl Starfield {
    pub fn new<R: Rng>(count: usize, rng: &mut R) -> Self {
        let stars = (0..count)
            .map(|_| {
                Vec2::new(
                    rng.random::<f32>() * FIELD_WIDTH,
                    rng.random::<f32>() * FIELD_HEIGHT,
                )
            })
            .collect();
        Self { stars }
    }

    pub fn stars(&self) -> &[Vec2] {
        &self.stars
    }
}

/// Draw one frame: background, stars, sprites in z order, debug overlays
pub fn draw_world<S: Surface>(
    surface: &mut S,
    world: &World,
    stars: Option<&Starfield>,
    options: RenderOptions,
) {
    let (w, h) = surface.size();
    let scale = FieldScale::for_size(w, h);

    surface.clear(colors::BACKGROUND);

    if options.starfield {
        if let Some(stars) = stars {
            for &star in stars.stars() {
                surface.fill_rect(scale.point(star).floor(), Vec2::ONE, colors::STAR);
            }
        }
    }

    for sprite in world.sprites() {
        if sprite.is_hidden() {
            continue;
        }
        draw_sprite(surface, &scale, sprite, Vec2::ZERO, options);
        if let Some(offset) = shapes::wrap_offset(sprite.pos, sprite.radius) {
            draw_sprite(surface, &scale, sprite, offset, options);
        }
    }

    if options.draw_debug {
        for contact in world.contacts() {
            if let (Some(a), Some(b)) = (world.sprite(contact.a), world.sprite(contact.b)) {
                surface.stroke_path(&[scale.point(a.pos), scale.point(b.pos)], false, colors::CONTACT);
            }
        }
    }
}

fn draw_sprite<S: Surface>(
    surface: &mut S,
    scale: &FieldScale,
    sprite: &Sprite,
    offset: Vec2,
    options: RenderOptions,
) {
    let pos = sprite.pos + offset;
    match &sprite.entity {
        Entity::Ship(ship) => {
            let hull = shapes::transform(&shapes::ship_hull(sprite.radius), pos, sprite.rotation);
            surface.fill_polygon(&scale.points(&hull), colors::BACKGROUND, colors::LINE);
            if let Some(length) = ship.flame() {
                let flame = shapes::transform(&shapes::flame(sprite.radius, length), pos, sprite.rotation);
                surface.stroke_path(&scale.points(&flame), false, colors::LINE);
            }
        }
        Entity::Asteroid(asteroid) => {
            let outline = shapes::transform(&asteroid.outline(), pos, sprite.rotation);
            let outline = scale.points(&outline);
            surface.fill_polygon(&outline, colors::BACKGROUND, colors::LINE);
            if options.draw_debug {
                let center = scale.point(pos);
                for &rim in &outline {
                    surface.stroke_path(&[center, rim], false, colors::DEBUG);
                }
            }
        }
        Entity::Bullet => {
            surface.fill_rect(scale.point(pos).floor(), Vec2::splat(BULLET_PIXELS), colors::BULLET);
        }
        Entity::Shrapnel => {
            surface.fill_rect(
                scale.point(pos).floor(),
                Vec2::splat(SHRAPNEL_PIXELS),
                colors::SHRAPNEL,
            );
        }
    }

    if options.draw_debug {
        draw_regions(surface, scale, sprite, pos);
    }
}

/// Extent circle, hit region and bounding polygons at the sprite's pose
fn draw_regions<S: Surface>(surface: &mut S, scale: &FieldScale, sprite: &Sprite, pos: Vec2) {
    let center = scale.point(pos);
    surface.stroke_circle(center, scale.length(sprite.radius), colors::DEBUG);

    if let Region::Circle(hit) = sprite.hit_region() {
        if hit.radius != sprite.radius {
            surface.stroke_circle(center, scale.length(hit.radius), colors::DEBUG);
        }
    }
    for region in sprite.bounding_regions() {
        if let Region::Polygon(polygon) = region {
            surface.stroke_path(&posed(scale, polygon, pos, sprite.rotation), true, colors::DEBUG);
        }
    }
}

fn posed(scale: &FieldScale, polygon: &Polygon, pos: Vec2, rotation: f32) -> Vec<Vec2> {
    scale.points(&shapes::transform(polygon.local_points(), pos, rotation))
}

/// One-line telemetry for the debug readout
pub fn debug_readout(world: &World, fps: f32) -> String {
    let mut line = format!("FPS: {fps:.1}");
    if let Some(ship) = world.ship() {
        line.push_str(&format!(
            "  pos: ({:.0}, {:.0})  v: ({:.0}, {:.0}) |{:.0}|  \u{3b8}: {:.0}\u{b0}",
            ship.pos.x,
            ship.pos.y,
            ship.vel.x,
            ship.vel.y,
            ship.speed(),
            ship.rotation.to_degrees()
        ));
    }
    line.push_str(&format!("  sprites: {}", world.sprites().len()));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::asteroid::{self, Asteroid, AsteroidTier, ASTEROID_RADII};
    use crate::sim::bullet;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        Path { closed: bool, color: String, len: usize },
        Polygon { len: usize },
        Rect { color: String },
        Circle { color: String },
    }

    struct RecordingSurface {
        ops: Vec<Op>,
    }

    impl RecordingSurface {
        fn new() -> Self {
            Self { ops: Vec::new() }
        }

        fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
            self.ops.iter().filter(|op| pred(op)).count()
        }
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> (f32, f32) {
            (800.0, 600.0)
        }
        fn clear(&mut self, _color: &str) {
            self.ops.push(Op::Clear);
        }
        fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: &str) {
            self.ops.push(Op::Path {
                closed,
                color: color.to_string(),
                len: points.len(),
            });
        }
        fn fill_polygon(&mut self, points: &[Vec2], _fill: &str, _stroke: &str) {
            self.ops.push(Op::Polygon { len: points.len() });
        }
        fn fill_rect(&mut self, _origin: Vec2, _size: Vec2, color: &str) {
            self.ops.push(Op::Rect {
                color: color.to_string(),
            });
        }
        fn stroke_circle(&mut self, _center: Vec2, _radius: f32, color: &str) {
            self.ops.push(Op::Circle {
                color: color.to_string(),
            });
        }
    }

    fn add_rock(world: &mut World, pos: Vec2) {
        let tuning = Tuning::default();
        let rock = Asteroid::new(AsteroidTier::Small, vec![50.0; ASTEROID_RADII]);
        let sprite = asteroid::spawn(pos, Vec2::ZERO, 0.0, rock, &tuning.small).unwrap();
        world.add_sprite(sprite);
    }

    #[test]
    fn test_fit_to_window() {
        assert_eq!(fit_to_window(1000.0, 1000.0), (900, 675));
        assert_eq!(fit_to_window(2000.0, 800.0), (960, 720));
    }

    #[test]
    fn test_field_scale() {
        let s = FieldScale::for_size(800.0, 600.0);
        assert_eq!(s.point(Vec2::new(4000.0, 3000.0)), Vec2::new(800.0, 600.0));
        assert_eq!(s.length(100.0), 20.0);
    }

    #[test]
    fn test_paints_in_z_order() {
        let mut world = World::new(1, Tuning::default());
        world.start_new_game();
        world.add_sprite(bullet::spawn(Vec2::new(300.0, 300.0), 0.0, &Tuning::default()).unwrap());
        add_rock(&mut world, Vec2::new(1000.0, 1000.0));

        let mut surface = RecordingSurface::new();
        draw_world(&mut surface, &world, None, RenderOptions::default());

        assert_eq!(surface.ops[0], Op::Clear);
        // Asteroid outline, then ship hull, then the bullet
        assert_eq!(surface.ops[1], Op::Polygon { len: 22 });
        assert_eq!(surface.ops[2], Op::Polygon { len: 4 });
        assert_eq!(
            surface.ops[3],
            Op::Rect {
                color: colors::BULLET.to_string()
            }
        );
        assert_eq!(surface.count(|op| matches!(op, Op::Circle { .. })), 0);
    }

    #[test]
    fn test_edge_sprites_drawn_twice() {
        let mut world = World::new(2, Tuning::default());
        add_rock(&mut world, Vec2::new(20.0, 1500.0));
        let mut surface = RecordingSurface::new();
        draw_world(&mut surface, &world, None, RenderOptions::default());
        assert_eq!(surface.count(|op| matches!(op, Op::Polygon { .. })), 2);
    }

    #[test]
    fn test_hidden_ship_not_drawn() {
        let mut world = World::new(3, Tuning::default());
        world.start_new_game();
        world.initiate_hyperspace();
        let mut surface = RecordingSurface::new();
        draw_world(&mut surface, &world, None, RenderOptions::default());
        assert_eq!(surface.ops, vec![Op::Clear]);
    }

    #[test]
    fn test_debug_overlays() {
        let mut world = World::new(4, Tuning::default());
        add_rock(&mut world, Vec2::new(1000.0, 1000.0));
        let options = RenderOptions {
            draw_debug: true,
            starfield: false,
        };
        let mut surface = RecordingSurface::new();
        draw_world(&mut surface, &world, None, options);

        let debug = colors::DEBUG.to_string();
        // One extent circle, 22 spokes, 22 fan triangles
        assert_eq!(surface.count(|op| *op == Op::Circle { color: debug.clone() }), 1);
        assert_eq!(
            surface.count(|op| matches!(op, Op::Path { closed: false, color, len: 2 } if *color == debug)),
            22
        );
        assert_eq!(
            surface.count(|op| matches!(op, Op::Path { closed: true, len: 3, .. })),
            22
        );
    }

    #[test]
    fn test_starfield() {
        let mut rng = Pcg32::seed_from_u64(5);
        let stars = Starfield::new(15, &mut rng);
        assert_eq!(stars.stars().len(), 15);

        let world = World::new(5, Tuning::default());
        let mut surface = RecordingSurface::new();
        let options = RenderOptions {
            draw_debug: false,
            starfield: true,
        };
        draw_world(&mut surface, &world, Some(&stars), options);
        assert_eq!(surface.count(|op| matches!(op, Op::Rect { .. })), 15);
    }

    #[test]
    fn test_debug_readout() {
        let mut world = World::new(6, Tuning::default());
        assert!(debug_readout(&world, 60.0).starts_with("FPS: 60.0"));
        world.start_new_game();
        let line = debug_readout(&world, 59.94);
        assert!(line.contains("pos: (2000, 1500)"));
        assert!(line.contains("v: (0, 0) |0|"));
        assert!(line.contains("sprites: 1"));
    }
}
