//! Sprite base: pose, motion integration, lifetime and collision regions
//!
//! Every world object is a [`Sprite`] carrying an [`Entity`] payload for its
//! kind-specific state. Kind-specific behaviour is a `match` on the payload,
//! and which kinds may touch is a fixed [`Kind`] × [`Kind`] table.

use glam::Vec2;

use super::asteroid::Asteroid;
use super::geometry::{Region, test_overlap};
use super::ship::Ship;
use crate::consts::*;
use crate::{normalize_rotation, wrap_position};

/// Stable identifier assigned when a sprite joins the world
pub type EntityId = u32;

/// Entity kind, used for collision compatibility and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Ship,
    Bullet,
    Asteroid,
    Shrapnel,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Ship, Kind::Bullet, Kind::Asteroid, Kind::Shrapnel];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// `COLLIDES[a][b]`: a sprite of kind `a` reacts to touching kind `b`
const COLLIDES: [[bool; 4]; 4] = [
    // Ship     Bullet  Asteroid Shrapnel
    [false, false, true, false], // Ship
    [false, false, true, false], // Bullet
    [true, true, false, false],  // Asteroid
    [false, false, false, false], // Shrapnel
];

/// Whether kind `a` reacts to touching kind `b`
#[inline]
pub fn can_collide(a: Kind, b: Kind) -> bool {
    COLLIDES[a.index()][b.index()]
}

/// Paint order (higher draws later)
pub mod z_order {
    pub const ASTEROID: i32 = 0;
    pub const SHIP: i32 = 10;
    pub const SHRAPNEL: i32 = 50;
    pub const BULLET: i32 = 99;
}

/// Kind-specific sprite state
#[derive(Debug, Clone)]
pub enum Entity {
    Ship(Ship),
    Bullet,
    Asteroid(Asteroid),
    Shrapnel,
}

impl Entity {
    pub fn kind(&self) -> Kind {
        match self {
            Entity::Ship(_) => Kind::Ship,
            Entity::Bullet => Kind::Bullet,
            Entity::Asteroid(_) => Kind::Asteroid,
            Entity::Shrapnel => Kind::Shrapnel,
        }
    }
}

/// Result of a sprite's own per-tick update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    /// Time-to-live ran out; the sprite must leave the world
    Expired,
}

/// What a collision did to the sprite that received it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Nothing beyond the sprite's own state
    None,
    /// The sprite was consumed (bullet spent)
    Spent,
    /// An asteroid was shot and must break apart
    AsteroidShot,
    /// The ship was wrecked
    ShipWrecked,
}

/// A world object
#[derive(Debug, Clone)]
pub struct Sprite {
    pub id: EntityId,
    pub pos: Vec2,
    /// Units per second
    pub vel: Vec2,
    /// Radians in [0, 2π), 0 facing up the field
    pub rotation: f32,
    /// Signed spin in rotations per minute
    pub rpm: f32,
    /// Remaining lifetime in ms, if the sprite is short-lived
    pub ttl: Option<f32>,
    pub z: i32,
    /// Extent used for wraparound drawing and the debug circle
    pub radius: f32,
    pub entity: Entity,
    hit_region: Region,
    bounding_regions: Vec<Region>,
    regions_synced: bool,
    removed: bool,
}

impl Sprite {
    /// Build a sprite; the id is assigned when it joins the world
    pub fn new(
        pos: Vec2,
        entity: Entity,
        z: i32,
        radius: f32,
        hit_region: Region,
        bounding_regions: Vec<Region>,
    ) -> Self {
        Self {
            id: 0,
            pos: wrap_position(pos),
            vel: Vec2::ZERO,
            rotation: 0.0,
            rpm: 0.0,
            ttl: None,
            z,
            radius,
            entity,
            hit_region,
            bounding_regions,
            regions_synced: false,
            removed: false,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = normalize_rotation(rotation);
        self.regions_synced = false;
        self
    }

    pub fn with_rpm(mut self, rpm: f32) -> Self {
        self.rpm = rpm;
        self
    }

    pub fn with_ttl(mut self, ttl_ms: f32) -> Self {
        self.ttl = Some(ttl_ms);
        self
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.entity.kind()
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn as_ship(&self) -> Option<&Ship> {
        match &self.entity {
            Entity::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_ship_mut(&mut self) -> Option<&mut Ship> {
        match &mut self.entity {
            Entity::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_asteroid(&self) -> Option<&Asteroid> {
        match &self.entity {
            Entity::Asteroid(asteroid) => Some(asteroid),
            _ => None,
        }
    }

    /// Hidden sprites are neither drawn nor collided with
    pub fn is_hidden(&self) -> bool {
        self.as_ship().is_some_and(Ship::in_hyperspace)
    }

    /// Advance lifetime, spin and position by `dt` ms
    pub fn update(&mut self, dt: f32) -> Lifecycle {
        if let Some(ttl) = self.ttl.as_mut() {
            *ttl -= dt;
            if *ttl <= 0.0 {
                return Lifecycle::Expired;
            }
        }

        self.rotation = normalize_rotation(self.rotation + self.rpm * dt * ROTATION_PER_MILLISECOND);
        self.pos = wrap_position(self.pos + self.vel * VELOCITY_FACTOR * dt);
        self.regions_synced = false;
        Lifecycle::Active
    }

    /// Re-pose the hit and bounding regions, at most once per pose change
    pub fn sync_regions_to_pose(&mut self) {
        if self.regions_synced {
            return;
        }
        self.hit_region.update_transform(self.pos, self.rotation);
        for region in &mut self.bounding_regions {
            region.update_transform(self.pos, self.rotation);
        }
        self.regions_synced = true;
    }

    /// Mark the pose changed outside of `update` (teleports, respawns)
    pub fn invalidate_regions(&mut self) {
        self.regions_synced = false;
    }

    pub fn hit_region(&self) -> &Region {
        &self.hit_region
    }

    pub fn bounding_regions(&self) -> &[Region] {
        &self.bounding_regions
    }

    /// Whether this sprite reacts to touching `other`
    pub fn can_collide_with(&self, other: &Sprite) -> bool {
        self.is_tangible() && other.is_tangible() && can_collide(self.kind(), other.kind())
    }

    /// Present in the world and not hidden
    #[inline]
    fn is_tangible(&self) -> bool {
        !self.removed && !self.is_hidden()
    }

    /// Two-tier overlap test: hit regions first, then bounding regions
    pub fn is_colliding(&mut self, other: &mut Sprite) -> bool {
        self.sync_regions_to_pose();
        other.sync_regions_to_pose();

        if !test_overlap(&self.hit_region, &other.hit_region) {
            return false;
        }
        self.bounding_regions
            .iter()
            .any(|mine| other.bounding_regions.iter().any(|theirs| test_overlap(mine, theirs)))
    }

    /// React to touching a sprite of kind `other`
    pub fn collision_detected(&mut self, other: Kind) -> Reaction {
        match (&self.entity, other) {
            (Entity::Bullet, Kind::Asteroid) => {
                self.remove();
                Reaction::Spent
            }
            (Entity::Asteroid(_), Kind::Bullet) => {
                self.remove();
                Reaction::AsteroidShot
            }
            (Entity::Ship(_), Kind::Asteroid) => {
                self.remove();
                Reaction::ShipWrecked
            }
            _ => Reaction::None,
        }
    }

    pub fn remove(&mut self) {
        self.removed = true;
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}
