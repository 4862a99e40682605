//! Per-frame simulation entry point
//!
//! The front end calls [`tick`] once per display refresh with the wall-clock
//! delta and the intents gathered since the previous frame.

use super::world::World;
use crate::consts::MAX_DELTA_TIME;

/// Intents for a single frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held while the turn key is down
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
    /// Edge: one shot
    pub shoot: bool,
    /// Edge: jump to a random spot
    pub hyperspace: bool,
    /// Edge: toggle pause
    pub pause: bool,
    /// Edge: abandon the session and start over
    pub new_game: bool,
}

/// What a frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Simulation time moved; redraw
    Advanced,
    /// Paused: nothing moved
    Paused,
    /// The delta was out of range and the frame was dropped
    Skipped,
}

/// Whether a frame delta (ms) may be integrated
#[inline]
pub fn accepts_delta(dt: f32) -> bool {
    dt > 0.0 && dt <= MAX_DELTA_TIME
}

/// Apply intents and advance the world by `dt` ms
pub fn tick(world: &mut World, input: &TickInput, dt: f32) -> TickOutcome {
    if input.new_game {
        world.start_new_game();
    }
    if input.pause {
        world.toggle_paused();
    }

    if let Some(ship) = world.ship_controls() {
        ship.set_turn_left(input.turn_left);
        ship.set_turn_right(input.turn_right);
        ship.set_thrust(input.thrust);
    }

    if world.is_paused() {
        return TickOutcome::Paused;
    }

    if let Some(ship) = world.ship_controls() {
        if input.shoot {
            ship.shoot();
        }
        if input.hyperspace {
            ship.request_hyperspace();
        }
    }

    if !accepts_delta(dt) {
        log::trace!("Skipping frame with dt {dt}");
        return TickOutcome::Skipped;
    }

    world.step(dt);
    TickOutcome::Advanced
}
