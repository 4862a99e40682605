//! Vector Asteroids - a wrapping-field arcade shooter
//!
//! Core modules:
//! - `sim`: Simulation core (sprites, collision, scheduler, game loop)
//! - `render`: Vector line drawing onto an abstract surface
//! - `input`: Keyboard bindings mapped to ship intents
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod input;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::{ConfigError, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical field dimensions (all simulation coordinates are field units)
    pub const FIELD_WIDTH: f32 = 4000.0;
    pub const FIELD_HEIGHT: f32 = 3000.0;

    /// Ticks with a larger delta (ms) are discarded instead of integrated
    pub const MAX_DELTA_TIME: f32 = 160.0;
    /// Nominal frame time (ms) at 60 Hz; per-frame physics constants use this unit
    pub const REFERENCE_DELTA_TIME: f32 = 1000.0 / 60.0;

    /// Velocities are units/second while dt is milliseconds
    pub const VELOCITY_FACTOR: f32 = 1.0 / 1000.0;
    /// Radians turned in one millisecond at one rotation per minute
    pub const ROTATION_PER_MILLISECOND: f32 = std::f32::consts::TAU / 60_000.0;
}

/// Wrap a value into [0, extent)
#[inline]
pub fn wrap_into(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid rounds tiny negatives up to exactly `extent`
    if wrapped >= extent { 0.0 } else { wrapped }
}

/// Normalize a rotation to [0, 2π)
#[inline]
pub fn normalize_rotation(angle: f32) -> f32 {
    wrap_into(angle, std::f32::consts::TAU)
}

/// Wrap a position onto the toroidal field
#[inline]
pub fn wrap_position(pos: Vec2) -> Vec2 {
    Vec2::new(
        wrap_into(pos.x, consts::FIELD_WIDTH),
        wrap_into(pos.y, consts::FIELD_HEIGHT),
    )
}

/// Unit vector a sprite with the given rotation points along.
///
/// Rotation 0 faces up the screen (negative y); positive rotation turns clockwise.
#[inline]
pub fn heading(rotation: f32) -> Vec2 {
    Vec2::new(rotation.sin(), -rotation.cos())
}
