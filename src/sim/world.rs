//! The game world
//!
//! Owns every sprite, the player record, the round state machine and the task
//! scheduler. [`World::step`] runs one fixed pipeline:
//!
//! 1. fire due scheduler tasks
//! 2. steer the ship, then update every sprite (expired ones are marked)
//! 3. launch requested bullets
//! 4. pairwise collision sweep, then resolve the reactions
//! 5. add sprites spawned during the tick, drop removed ones
//! 6. check whether the field was cleared
//!
//! Sprites are kept sorted by ascending z so the render pass paints in order.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::asteroid::{self, Asteroid, AsteroidTier};
use super::bullet;
use super::geometry::GeometryError;
use super::scheduler::Scheduler;
use super::ship::{self, Ship};
use super::shrapnel;
use super::sprite::{EntityId, Kind, Lifecycle, Reaction, Sprite};
use super::state::{GameEvent, Player, RoundPhase, Task};
use crate::consts::*;
use crate::heading;
use crate::tuning::Tuning;

/// Delay before retrying a respawn blocked by rock at the spawn point
const RESPAWN_RETRY_MS: f32 = 250.0;
/// Attempts at placing a wave asteroid away from the ship
const PLACEMENT_ATTEMPTS: usize = 32;

/// A pair that touched during the last advanced tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
}

pub struct World {
    tuning: Tuning,
    sprites: Vec<Sprite>,
    /// Spawned mid-tick; joins the world once the sweep is done
    spawned: Vec<Sprite>,
    player: Player,
    phase: RoundPhase,
    scheduler: Scheduler<Task>,
    rng: Pcg32,
    ship: Option<EntityId>,
    paused: bool,
    events: Vec<GameEvent>,
    contacts: Vec<Contact>,
    next_id: EntityId,
}

impl World {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            player: Player::new(tuning.starting_lives),
            tuning,
            sprites: Vec::new(),
            spawned: Vec::new(),
            phase: RoundPhase::Idle,
            scheduler: Scheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            ship: None,
            paused: false,
            events: Vec::new(),
            contacts: Vec::new(),
            next_id: 1,
        }
    }

    /// Throw away the current session and start over at level 1
    pub fn start_new_game(&mut self) {
        log::info!("New game ({} lives)", self.tuning.starting_lives);

        self.player = Player::new(self.tuning.starting_lives);
        self.sprites.clear();
        self.spawned.clear();
        self.contacts.clear();
        // A fresh scheduler so nothing queued by the old session can fire
        self.scheduler = Scheduler::new();
        self.ship = None;
        self.paused = false;

        self.spawn_ship();
        self.phase = RoundPhase::Spawning;
        self.scheduler
            .schedule(Task::SpawnWave, self.tuning.first_wave_delay_ms);

        self.events.push(GameEvent::GameStarted);
        self.events.push(GameEvent::ScoreboardChanged);
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Sprites in paint order
    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprite(&self, id: EntityId) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.id == id)
    }

    fn sprite_mut(&mut self, id: EntityId) -> Option<&mut Sprite> {
        self.sprites.iter_mut().find(|s| s.id == id)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Game-clock time in ms
    pub fn clock(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = (&Task, f32)> {
        self.scheduler.pending()
    }

    /// The ship sprite, absent between a crash and the respawn
    pub fn ship(&self) -> Option<&Sprite> {
        self.ship.and_then(|id| self.sprite(id))
    }

    /// Ship controls, if there is a ship to control
    pub fn ship_controls(&mut self) -> Option<&mut Ship> {
        let id = self.ship?;
        self.sprite_mut(id).and_then(Sprite::as_ship_mut)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_paused(&mut self) {
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
        self.events.push(if self.paused {
            GameEvent::Paused
        } else {
            GameEvent::Resumed
        });
    }

    /// Live sprites of a kind, including ones spawned this tick
    pub fn count(&self, kind: Kind) -> usize {
        self.sprites
            .iter()
            .chain(self.spawned.iter())
            .filter(|s| !s.is_removed() && s.kind() == kind)
            .count()
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pairs that touched during the last advanced tick
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Insert a sprite in z order and give it an id
    pub fn add_sprite(&mut self, mut sprite: Sprite) -> EntityId {
        sprite.id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let index = self.sprites.partition_point(|s| s.z <= sprite.z);
        let id = sprite.id;
        self.sprites.insert(index, sprite);
        id
    }

    /// Mark a sprite for removal at the end of the next tick
    pub fn remove_sprite(&mut self, id: EntityId) -> bool {
        match self.sprite_mut(id) {
            Some(sprite) => {
                sprite.remove();
                true
            }
            None => false,
        }
    }

    /// Send the ship into hyperspace toward a random spot
    pub fn initiate_hyperspace(&mut self) -> bool {
        let Some(id) = self.ship else {
            return false;
        };
        let destination = Vec2::new(
            self.rng.random::<f32>() * FIELD_WIDTH,
            self.rng.random::<f32>() * FIELD_HEIGHT,
        );
        let tuning = &self.tuning;
        let Some(sprite) = self.sprites.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        if !ship::enter_hyperspace(sprite, destination, tuning) {
            return false;
        }
        log::debug!("Hyperspace to ({:.0}, {:.0})", destination.x, destination.y);
        self.events.push(GameEvent::HyperspaceEntered);
        true
    }

    /// Advance the simulation by `dt` ms. Callers validate `dt`.
    pub fn step(&mut self, dt: f32) {
        self.contacts.clear();

        for task in self.scheduler.advance_time(dt) {
            self.run_task(task);
        }
        if self.ship_controls().is_some_and(Ship::take_hyperspace_request) {
            self.initiate_hyperspace();
        }

        let shots = self.update_sprites(dt);
        for (muzzle, rotation) in shots {
            self.fire(muzzle, rotation);
        }

        let reactions = self.sweep();
        for (id, reaction) in reactions {
            self.resolve(id, reaction);
        }

        for sprite in std::mem::take(&mut self.spawned) {
            self.add_sprite(sprite);
        }
        self.sprites.retain(|s| !s.is_removed());
        if self.ship.is_some_and(|id| self.sprite(id).is_none()) {
            self.ship = None;
        }

        if self.phase == RoundPhase::InProgress && self.count(Kind::Asteroid) == 0 {
            log::info!("Level {} cleared", self.player.level);
            self.phase = RoundPhase::Cleared;
            self.scheduler
                .schedule(Task::NextLevel, self.tuning.level_transition_delay_ms);
        }
    }

    /// Move everything; returns the shots the ship asked for
    fn update_sprites(&mut self, dt: f32) -> Vec<(Vec2, f32)> {
        let mut shots = Vec::new();
        for sprite in &mut self.sprites {
            if sprite.is_removed() {
                continue;
            }
            if sprite.kind() == Kind::Ship {
                let outcome = ship::steer(sprite, dt, &self.tuning, &mut self.rng);
                if outcome.fire {
                    let muzzle = sprite.pos + heading(sprite.rotation) * self.tuning.ship_radius;
                    shots.push((muzzle, sprite.rotation));
                }
                if outcome.reappeared {
                    log::debug!("Ship back from hyperspace");
                }
            }
            if sprite.update(dt) == Lifecycle::Expired {
                sprite.remove();
            }
        }
        shots
    }

    fn fire(&mut self, muzzle: Vec2, rotation: f32) {
        if self.count(Kind::Bullet) >= self.tuning.max_bullets {
            return;
        }
        match bullet::spawn(muzzle, rotation, &self.tuning) {
            Ok(sprite) => {
                self.add_sprite(sprite);
                self.events.push(GameEvent::BulletFired);
            }
            Err(err) => log::warn!("Bullet not fired: {err}"),
        }
    }

    /// Test every pair once; each side of a touching pair reacts
    fn sweep(&mut self) -> Vec<(EntityId, Reaction)> {
        let mut reactions = Vec::new();
        for i in 0..self.sprites.len() {
            let (head, tail) = self.sprites.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                if !(a.can_collide_with(b) || b.can_collide_with(a)) {
                    continue;
                }
                if !a.is_colliding(b) {
                    continue;
                }
                log::debug!("Contact {:?}#{} x {:?}#{}", a.kind(), a.id, b.kind(), b.id);
                self.contacts.push(Contact { a: a.id, b: b.id });
                let (kind_a, kind_b) = (a.kind(), b.kind());
                reactions.push((a.id, a.collision_detected(kind_b)));
                reactions.push((b.id, b.collision_detected(kind_a)));
            }
        }
        reactions
    }

    fn resolve(&mut self, id: EntityId, reaction: Reaction) {
        match reaction {
            Reaction::None | Reaction::Spent => {}
            Reaction::AsteroidShot => self.destroy_asteroid(id),
            Reaction::ShipWrecked => self.destroy_ship(id),
        }
    }

    fn destroy_asteroid(&mut self, id: EntityId) {
        let Some((pos, vel, tier)) = self
            .sprite(id)
            .and_then(|s| s.as_asteroid().map(|a| (s.pos, s.vel, a.tier)))
        else {
            return;
        };

        let parent = *self.tuning.tier(tier);
        self.player.award(parent.points);
        self.events.push(GameEvent::AsteroidDestroyed(tier));
        self.events.push(GameEvent::ScoreboardChanged);

        let burst = shrapnel::burst(pos, &self.tuning, &mut self.rng);
        self.spawned.extend(burst);

        if let Some(child_tier) = tier.smaller() {
            let child = *self.tuning.tier(child_tier);
            let vels = asteroid::split_velocities(vel, &child, parent.children, &self.tuning, &mut self.rng);
            for v in vels {
                match self.make_asteroid(child_tier, pos, v) {
                    Ok(sprite) => self.spawned.push(sprite),
                    Err(err) => log::warn!("Fragment dropped: {err}"),
                }
            }
        }
        log::debug!(
            "{tier:?} asteroid destroyed, score {}",
            self.player.score
        );
    }

    fn destroy_ship(&mut self, id: EntityId) {
        let Some(pos) = self.sprite(id).map(|s| s.pos) else {
            return;
        };
        self.ship = None;
        let burst = shrapnel::burst(pos, &self.tuning, &mut self.rng);
        self.spawned.extend(burst);
        self.events.push(GameEvent::ShipDestroyed);

        if self.player.lose_life() {
            log::info!(
                "Game over at level {} with {} points",
                self.player.level,
                self.player.score
            );
            self.phase = RoundPhase::GameOver;
            self.events.push(GameEvent::GameOver);
        } else {
            log::info!("Ship destroyed, {} lives left", self.player.lives);
            self.scheduler
                .schedule(Task::RespawnShip, self.tuning.ship_respawn_delay_ms);
        }
        self.events.push(GameEvent::ScoreboardChanged);
    }

    fn run_task(&mut self, task: Task) {
        if self.phase == RoundPhase::GameOver {
            log::debug!("Dropping {task:?} after game over");
            return;
        }
        match task {
            Task::SpawnWave => self.spawn_wave(),
            Task::NextLevel => {
                self.player.level += 1;
                self.events.push(GameEvent::ScoreboardChanged);
                self.phase = RoundPhase::Spawning;
                self.spawn_wave();
            }
            Task::RespawnShip => {
                if self.ship.is_some() {
                    return;
                }
                if self.spawn_point_blocked() {
                    self.scheduler.schedule(Task::RespawnShip, RESPAWN_RETRY_MS);
                    return;
                }
                self.spawn_ship();
                self.events.push(GameEvent::ShipRespawned);
            }
        }
    }

    fn field_center() -> Vec2 {
        Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0)
    }

    fn spawn_ship(&mut self) {
        match ship::spawn(Self::field_center(), &self.tuning) {
            Ok(sprite) => {
                let id = self.add_sprite(sprite);
                self.ship = Some(id);
                log::debug!("Ship spawned #{id}");
            }
            Err(err) => log::warn!("Ship not spawned: {err}"),
        }
    }

    /// Rock within two ship radii of the spawn point
    fn spawn_point_blocked(&self) -> bool {
        let center = Self::field_center();
        let reach = self.tuning.ship_radius * 2.0;
        self.sprites
            .iter()
            .filter(|s| !s.is_removed() && s.kind() == Kind::Asteroid)
            .any(|s| toroidal_distance(s.pos, center) < reach + s.radius)
    }

    fn spawn_wave(&mut self) {
        let count = self.tuning.wave_size(self.player.level);
        log::info!("Level {}: {} asteroids", self.player.level, count);

        let keep_clear = self.ship().map_or(Self::field_center(), |s| s.pos);
        for _ in 0..count {
            let pos = self.random_clear_position(keep_clear);
            let large = self.tuning.large;
            let vel = asteroid::random_velocity(&large, &mut self.rng);
            match self.make_asteroid(AsteroidTier::Large, pos, vel) {
                Ok(sprite) => {
                    self.add_sprite(sprite);
                }
                Err(err) => log::warn!("Asteroid dropped: {err}"),
            }
        }

        self.phase = RoundPhase::InProgress;
        self.events.push(GameEvent::LevelStarted(self.player.level));
    }

    fn random_clear_position(&mut self, avoid: Vec2) -> Vec2 {
        let mut pos = avoid;
        for _ in 0..PLACEMENT_ATTEMPTS {
            pos = Vec2::new(
                self.rng.random::<f32>() * FIELD_WIDTH,
                self.rng.random::<f32>() * FIELD_HEIGHT,
            );
            if toroidal_distance(pos, avoid) >= self.tuning.asteroid_spawn_clearance {
                return pos;
            }
        }
        pos
    }

    fn make_asteroid(&mut self, tier: AsteroidTier, pos: Vec2, vel: Vec2) -> Result<Sprite, GeometryError> {
        let tt = *self.tuning.tier(tier);
        let rock = Asteroid::random(tier, tt.radius, &mut self.rng);
        let rpm = asteroid::random_rpm(self.tuning.asteroid_max_rpm, &mut self.rng);
        asteroid::spawn(pos, vel, rpm, rock, &tt)
    }
}

/// Shortest distance on the wrapping field
fn toroidal_distance(a: Vec2, b: Vec2) -> f32 {
    let d = (a - b).abs();
    Vec2::new(d.x.min(FIELD_WIDTH - d.x), d.y.min(FIELD_HEIGHT - d.y)).length()
}
