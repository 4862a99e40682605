//! Audio system using Web Audio API
//!
//! Cues are synthesized from oscillators, so the page ships no sound files.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::SoundId;

/// Plays the simulation's sound cues
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Fails outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: settings.effective_sfx_volume(),
        }
    }

    /// Pick up volume or mute changes
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.effective_sfx_volume();
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn play(&self, sound: SoundId) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match sound {
            SoundId::Fire => self.play_fire(ctx, vol),
            SoundId::BangLarge => self.play_bang(ctx, vol, 55.0, 0.7),
            SoundId::BangMedium => self.play_bang(ctx, vol * 0.8, 80.0, 0.5),
            SoundId::BangSmall => self.play_bang(ctx, vol * 0.6, 120.0, 0.3),
            SoundId::ShipExplode => self.play_ship_explode(ctx, vol),
            SoundId::Hyperspace => self.play_hyperspace(ctx, vol),
            SoundId::Pause => self.play_chime(ctx, vol, &[660.0, 440.0]),
            SoundId::Resume => self.play_chime(ctx, vol, &[440.0, 660.0]),
        }
    }

    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Short falling zap
    fn play_fire(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 1200.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(1200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(300.0, t + 0.12)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Rock breaking; bigger rocks sound lower and longer
    fn play_bang(&self, ctx: &AudioContext, vol: f32, freq: f32, length: f64) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            osc.frequency().set_value_at_time(freq, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(freq * 0.4, t + length)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }

        // Gritty crack on top
        if let Some((osc, gain)) = self.create_osc(ctx, freq * 12.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.12, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.frequency().set_value_at_time(freq * 12.0, t).ok();
            osc.frequency().set_value_at_time(freq * 5.0, t + 0.02).ok();
            osc.frequency().set_value_at_time(freq * 9.0, t + 0.04).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }
    }

    /// Long rumble with a descending whine
    fn play_ship_explode(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 90.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.6, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 1.0)
                .ok();
            osc.frequency().set_value_at_time(90.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(25.0, t + 1.0)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 1.1).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Triangle) {
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(100.0, t + 0.6)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.7).ok();
        }
    }

    /// Rising then falling sweep
    fn play_hyperspace(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.01, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.3, t + 0.1)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();
        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(1600.0, t + 0.2)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(150.0, t + 0.5)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.55).ok();
    }

    /// Two-note blip
    fn play_chime(&self, ctx: &AudioContext, vol: f32, notes: &[f32]) {
        for (i, freq) in notes.iter().enumerate() {
            let delay = i as f64 * 0.09;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.15).ok();
            }
        }
    }
}
