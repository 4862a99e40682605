//! The player's ship
//!
//! Controls arrive as plain method calls on [`Ship`]; the world turns them
//! into motion with [`steer`] before the base sprite update runs.

use glam::Vec2;
use rand::Rng;

use super::geometry::{Circle, GeometryError, Polygon, Region};
use super::sprite::{Entity, Sprite, z_order};
use crate::consts::REFERENCE_DELTA_TIME;
use crate::heading;
use crate::tuning::Tuning;

/// Nose-up hull in ship units at radius 80
const HULL: [Vec2; 3] = [
    Vec2::new(-40.0, 40.0),
    Vec2::new(0.0, -80.0),
    Vec2::new(40.0, 40.0),
];
const HULL_RADIUS: f32 = 80.0;

/// Chance the thrust flame is drawn on frames after the first
const FLAME_FLICKER_CHANCE: f32 = 0.3;

/// A jump in progress
#[derive(Debug, Clone, Copy, PartialEq)]
struct Hyperspace {
    remaining_ms: f32,
    destination: Vec2,
}

/// Ship payload: control state plus transient effects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ship {
    turn_left: bool,
    turn_right: bool,
    thrust: bool,
    shot_taken: bool,
    jump_requested: bool,
    hyperspace: Option<Hyperspace>,
    flame_chance: f32,
    /// Flame length in [0, 1) when the flame shows this frame
    flame: Option<f32>,
}

/// What the ship asked of the world this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SteerOutcome {
    /// A shot was requested; the world enforces the bullet cap
    pub fire: bool,
    /// The ship dropped out of hyperspace
    pub reappeared: bool,
}

impl Ship {
    pub fn set_turn_left(&mut self, turn: bool) {
        self.turn_left = turn;
    }

    pub fn set_turn_right(&mut self, turn: bool) {
        self.turn_right = turn;
    }

    pub fn set_thrust(&mut self, thrust: bool) {
        if thrust && !self.thrust {
            self.flame_chance = 1.0;
        }
        self.thrust = thrust;
    }

    /// Request a shot on the next update
    pub fn shoot(&mut self) {
        self.shot_taken = true;
    }

    /// Request a hyperspace jump on the next update
    pub fn request_hyperspace(&mut self) {
        self.jump_requested = true;
    }

    /// Consume a pending jump request
    pub fn take_hyperspace_request(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }

    pub fn in_hyperspace(&self) -> bool {
        self.hyperspace.is_some()
    }

    /// Spin while turning; both keys held cancel out
    pub fn turning_rpm(&self, ship_rpm: f32) -> f32 {
        (self.turn_right as i32 - self.turn_left as i32) as f32 * ship_rpm
    }

    pub fn flame(&self) -> Option<f32> {
        self.flame
    }
}

/// Build the ship sprite, nose up
pub fn spawn(pos: Vec2, tuning: &Tuning) -> Result<Sprite, GeometryError> {
    let scale = tuning.ship_radius / HULL_RADIUS;
    let hull = Polygon::new(HULL.iter().map(|&p| p * scale).collect())?;
    let hit = Circle::new(pos, tuning.ship_radius)?;
    Ok(Sprite::new(
        pos,
        Entity::Ship(Ship::default()),
        z_order::SHIP,
        tuning.ship_radius,
        Region::Circle(hit),
        vec![Region::Polygon(hull)],
    ))
}

/// Jump to `destination`, vanishing for the configured time.
///
/// Returns false when the sprite is not a ship or is already jumping.
pub fn enter_hyperspace(sprite: &mut Sprite, destination: Vec2, tuning: &Tuning) -> bool {
    let Some(ship) = sprite.as_ship_mut() else {
        return false;
    };
    if ship.in_hyperspace() {
        return false;
    }
    ship.hyperspace = Some(Hyperspace {
        remaining_ms: tuning.hyperspace_ms,
        destination,
    });
    ship.shot_taken = false;
    ship.flame = None;
    sprite.vel = Vec2::ZERO;
    sprite.rpm = 0.0;
    true
}

/// Apply turning, thrust, drag and hyperspace ahead of the base update
pub fn steer<R: Rng>(sprite: &mut Sprite, dt: f32, tuning: &Tuning, rng: &mut R) -> SteerOutcome {
    let rotation = sprite.rotation;
    let Sprite {
        entity: Entity::Ship(ship),
        pos,
        vel,
        rpm,
        ..
    } = sprite
    else {
        return SteerOutcome::default();
    };

    if let Some(jump) = ship.hyperspace.as_mut() {
        jump.remaining_ms -= dt;
        ship.shot_taken = false;
        if jump.remaining_ms > 0.0 {
            return SteerOutcome::default();
        }
        *pos = jump.destination;
        *vel = Vec2::ZERO;
        ship.hyperspace = None;
        sprite.invalidate_regions();
        return SteerOutcome {
            fire: false,
            reappeared: true,
        };
    }

    let time_units = dt / REFERENCE_DELTA_TIME;
    *rpm = ship.turning_rpm(tuning.ship_rpm);
    if ship.thrust {
        *vel += heading(rotation) * tuning.ship_thrust * time_units;
    } else {
        *vel *= tuning.ship_deceleration.powf(time_units);
    }

    ship.flame = None;
    if ship.thrust && rng.random::<f32>() < ship.flame_chance {
        ship.flame_chance = FLAME_FLICKER_CHANCE;
        ship.flame = Some(rng.random());
    }

    SteerOutcome {
        fire: std::mem::take(&mut ship.shot_taken),
        reappeared: false,
    }
}
