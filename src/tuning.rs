//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives here, so a JSON blob can
//! rebalance a session without a rebuild. Defaults reproduce the classic feel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::AsteroidTier;

/// Errors raised while loading tuning or settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config value `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Balance for one asteroid size class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierTuning {
    /// Bounding radius (silhouette radii are drawn from [radius/2, radius])
    pub radius: f32,
    /// Points awarded when destroyed
    pub points: u32,
    /// Fragments of the next-smaller tier spawned on destruction
    pub children: u32,
    /// Multiplier on inherited parent speed when spawned as a fragment
    pub speed_multiplier: f32,
    /// Speed range (units/s) for fresh wave spawns; a fragment of a stationary
    /// parent moves at `min_speed`
    pub min_speed: f32,
    pub max_speed: f32,
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub starting_lives: u8,

    pub ship_radius: f32,
    /// Turning rate while a turn key is held (rotations per minute)
    pub ship_rpm: f32,
    /// Speed (units/s) gained per reference frame of thrust
    pub ship_thrust: f32,
    /// Velocity retained per reference frame while not thrusting
    pub ship_deceleration: f32,
    pub hyperspace_ms: f32,
    pub ship_respawn_delay_ms: f32,

    pub max_bullets: usize,
    pub bullet_speed: f32,
    pub bullet_ttl_ms: f32,

    pub first_wave_delay_ms: f32,
    pub level_transition_delay_ms: f32,
    /// Upper bound on the number of large asteroids in a wave
    pub max_wave_size: u32,
    /// Minimum distance between a fresh asteroid and the ship
    pub asteroid_spawn_clearance: f32,
    /// Fresh asteroids spin at up to ± this many RPM
    pub asteroid_max_rpm: f32,
    /// Max angular offset (radians) of a fragment from its parent's heading
    pub split_spread: f32,
    /// Fraction of parent speed a fragment inherits before its tier multiplier
    pub split_speed_fraction: f32,

    pub shrapnel_count: u32,
    pub shrapnel_max_speed: f32,
    pub shrapnel_ttl_ms: f32,

    pub large: TierTuning,
    pub medium: TierTuning,
    pub small: TierTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_lives: 3,

            ship_radius: 80.0,
            ship_rpm: 23.0,
            ship_thrust: 5.0,
            ship_deceleration: 1.0 - 1.0 / 400.0,
            hyperspace_ms: 1000.0,
            ship_respawn_delay_ms: 3000.0,

            max_bullets: 4,
            bullet_speed: 2000.0,
            bullet_ttl_ms: 1200.0,

            first_wave_delay_ms: 3000.0,
            level_transition_delay_ms: 2000.0,
            max_wave_size: 14,
            asteroid_spawn_clearance: 800.0,
            asteroid_max_rpm: 3.0,
            split_spread: 0.6,
            split_speed_fraction: 0.75,

            shrapnel_count: 10,
            shrapnel_max_speed: 500.0,
            shrapnel_ttl_ms: 400.0,

            large: TierTuning {
                radius: 230.0,
                points: 20,
                children: 2,
                speed_multiplier: 1.0,
                min_speed: 60.0,
                max_speed: 160.0,
            },
            medium: TierTuning {
                radius: 120.0,
                points: 50,
                children: 2,
                speed_multiplier: 1.6,
                min_speed: 100.0,
                max_speed: 240.0,
            },
            small: TierTuning {
                radius: 60.0,
                points: 100,
                children: 0,
                speed_multiplier: 2.0,
                min_speed: 150.0,
                max_speed: 320.0,
            },
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning blob; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange { field, value })
            }
        }
        fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange { field, value })
            }
        }

        if self.starting_lives == 0 {
            return Err(ConfigError::OutOfRange {
                field: "starting_lives",
                value: 0.0,
            });
        }
        positive("ship_radius", self.ship_radius)?;
        non_negative("ship_rpm", self.ship_rpm)?;
        non_negative("ship_thrust", self.ship_thrust)?;
        if !(self.ship_deceleration > 0.0 && self.ship_deceleration <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "ship_deceleration",
                value: self.ship_deceleration,
            });
        }
        non_negative("hyperspace_ms", self.hyperspace_ms)?;
        non_negative("ship_respawn_delay_ms", self.ship_respawn_delay_ms)?;
        positive("bullet_speed", self.bullet_speed)?;
        positive("bullet_ttl_ms", self.bullet_ttl_ms)?;
        non_negative("first_wave_delay_ms", self.first_wave_delay_ms)?;
        non_negative("level_transition_delay_ms", self.level_transition_delay_ms)?;
        if self.max_wave_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_wave_size",
                value: 0.0,
            });
        }
        non_negative("asteroid_spawn_clearance", self.asteroid_spawn_clearance)?;
        non_negative("asteroid_max_rpm", self.asteroid_max_rpm)?;
        non_negative("split_spread", self.split_spread)?;
        non_negative("split_speed_fraction", self.split_speed_fraction)?;
        non_negative("shrapnel_max_speed", self.shrapnel_max_speed)?;
        positive("shrapnel_ttl_ms", self.shrapnel_ttl_ms)?;

        for (field, tier) in [
            ("large.radius", &self.large),
            ("medium.radius", &self.medium),
            ("small.radius", &self.small),
        ] {
            positive(field, tier.radius)?;
            if !(tier.min_speed >= 0.0 && tier.min_speed <= tier.max_speed) {
                return Err(ConfigError::OutOfRange {
                    field: "min_speed",
                    value: tier.min_speed,
                });
            }
        }

        Ok(())
    }

    /// Balance for an asteroid tier
    pub fn tier(&self, tier: AsteroidTier) -> &TierTuning {
        match tier {
            AsteroidTier::Large => &self.large,
            AsteroidTier::Medium => &self.medium,
            AsteroidTier::Small => &self.small,
        }
    }

    /// Number of large asteroids spawned at the start of a level
    pub fn wave_size(&self, level: u32) -> u32 {
        level
            .saturating_add(1)
            .saturating_mul(2)
            .min(self.max_wave_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_wave_size_caps() {
        let tuning = Tuning::default();
        assert_eq!(tuning.wave_size(1), 4);
        assert_eq!(tuning.wave_size(2), 6);
        assert_eq!(tuning.wave_size(6), 14);
        assert_eq!(tuning.wave_size(40), 14);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "starting_lives": 5, "bullet_ttl_ms": 1500 }"#)
            .expect("valid tuning");
        assert_eq!(tuning.starting_lives, 5);
        assert_eq!(tuning.bullet_ttl_ms, 1500.0);
        assert_eq!(tuning.ship_rpm, 23.0);
        assert_eq!(tuning.large.points, 20);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "ship_deceleration": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "ship_deceleration",
                ..
            }
        ));

        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_tier_lookup() {
        let tuning = Tuning::default();
        assert_eq!(tuning.tier(AsteroidTier::Large).children, 2);
        assert_eq!(tuning.tier(AsteroidTier::Small).children, 0);
        assert_eq!(tuning.tier(AsteroidTier::Medium).radius, 120.0);
    }
}
