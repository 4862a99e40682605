//! Simulation core
//!
//! All gameplay logic lives here, free of rendering and platform code:
//! - Time only moves through [`tick`]/[`World::step`]
//! - Randomness comes from the world's seeded RNG
//! - Sprites are visited in paint (z) order

pub mod asteroid;
pub mod bullet;
pub mod geometry;
pub mod scheduler;
pub mod ship;
pub mod shrapnel;
pub mod sprite;
pub mod state;
pub mod tick;
pub mod world;

pub use asteroid::{Asteroid, AsteroidTier};
pub use geometry::{Circle, GeometryError, Polygon, Region, test_overlap};
pub use scheduler::Scheduler;
pub use ship::Ship;
pub use sprite::{Entity, EntityId, Kind, Sprite};
pub use state::{GameEvent, Player, RoundPhase, SoundId, Task};
pub use tick::{TickInput, TickOutcome, tick};
pub use world::{Contact, World};
