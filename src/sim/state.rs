//! Session state: player record, round phase, scheduled tasks and events

use super::asteroid::AsteroidTier;

/// Score, lives and level for one game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub score: u32,
    pub lives: u8,
    pub level: u32,
}

impl Player {
    pub fn new(lives: u8) -> Self {
        Self {
            score: 0,
            lives,
            level: 1,
        }
    }

    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Take a life away; returns true when none remain
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.lives == 0
    }
}

/// Level progression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// No game started yet
    Idle,
    /// Waiting for the wave to appear
    Spawning,
    /// Asteroids remain
    InProgress,
    /// Field cleared, next level pending
    Cleared,
    /// Out of lives
    GameOver,
}

/// Deferred work run by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Put the current level's wave on the field
    SpawnWave,
    /// Advance the level and spawn its wave
    NextLevel,
    /// Bring a fresh ship back after a crash
    RespawnShip,
}

/// Named sound cues for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    Fire,
    BangLarge,
    BangMedium,
    BangSmall,
    ShipExplode,
    Hyperspace,
    Pause,
    Resume,
}

/// Notifications for the front end (audio, HUD)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    GameStarted,
    BulletFired,
    AsteroidDestroyed(AsteroidTier),
    ShipDestroyed,
    ShipRespawned,
    HyperspaceEntered,
    LevelStarted(u32),
    /// Score, lives or level changed; the HUD should redraw
    ScoreboardChanged,
    GameOver,
    Paused,
    Resumed,
}

impl GameEvent {
    /// Sound that accompanies this event, if any
    pub fn sound(self) -> Option<SoundId> {
        match self {
            GameEvent::BulletFired => Some(SoundId::Fire),
            GameEvent::AsteroidDestroyed(AsteroidTier::Large) => Some(SoundId::BangLarge),
            GameEvent::AsteroidDestroyed(AsteroidTier::Medium) => Some(SoundId::BangMedium),
            GameEvent::AsteroidDestroyed(AsteroidTier::Small) => Some(SoundId::BangSmall),
            GameEvent::ShipDestroyed => Some(SoundId::ShipExplode),
            GameEvent::HyperspaceEntered => Some(SoundId::Hyperspace),
            GameEvent::Paused => Some(SoundId::Pause),
            GameEvent::Resumed => Some(SoundId::Resume),
            _ => None,
        }
    }
}
