//! Player preferences
//!
//! Front-end options that never affect the simulation: volumes, focus
//! handling and the debug overlays. The page may embed them as JSON.

use serde::{Deserialize, Serialize};

use crate::render::RenderOptions;
use crate::tuning::ConfigError;

/// Preferences for one browser session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    /// Pause when the window loses focus
    pub pause_on_blur: bool,

    // === Debug ===
    /// FPS and ship telemetry readout
    pub show_debug: bool,
    /// Outline hit circles, bounding polygons and contacts
    pub draw_debug: bool,

    // === Background ===
    pub starfield: bool,
    pub star_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            pause_on_blur: true,

            show_debug: false,
            draw_debug: false,

            starfield: true,
            star_count: 15,
        }
    }
}

impl Settings {
    /// Parse and validate; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("master_volume", self.master_volume),
            ("sfx_volume", self.sfx_volume),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Gain applied to sound effects (0 when muted)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn toggle_show_debug(&mut self) {
        self.show_debug = !self.show_debug;
    }

    pub fn toggle_draw_debug(&mut self) {
        self.draw_debug = !self.draw_debug;
    }

    pub fn toggle_muted(&mut self) {
        self.muted = !self.muted;
    }

    /// Drawing switches for the render pass
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            draw_debug: self.draw_debug,
            starfield: self.starfield,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert!((s.effective_sfx_volume() - 0.8).abs() < 1e-6);
        assert!(!s.render_options().draw_debug);
    }

    #[test]
    fn test_partial_json() {
        let s = Settings::from_json(r#"{ "muted": true, "star_count": 40 }"#).unwrap();
        assert!(s.muted);
        assert_eq!(s.star_count, 40);
        assert_eq!(s.effective_sfx_volume(), 0.0);
        assert!(s.pause_on_blur);
    }

    #[test]
    fn test_volume_out_of_range() {
        let err = Settings::from_json(r#"{ "sfx_volume": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "sfx_volume", .. }));
    }

    #[test]
    fn test_toggles() {
        let mut s = Settings::default();
        s.toggle_draw_debug();
        s.toggle_show_debug();
        assert!(s.render_options().draw_debug);
        assert!(s.show_debug);
        s.toggle_draw_debug();
        assert!(!s.draw_debug);
    }

    #[test]
    fn test_toggle_muted_silences_effects() {
        let mut s = Settings::default();
        s.toggle_muted();
        assert!(s.muted);
        assert_eq!(s.effective_sfx_volume(), 0.0);
        s.toggle_muted();
        assert!((s.effective_sfx_volume() - 0.8).abs() < 1e-6);
    }
}
