//! Audio system using Web Audio API
//!
//! Procedurally generated cues and background music - no external files needed!

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::audio::{AudioSink, Cue, Music};
use crate::settings::Settings;

/// Notes of the background drone (C major triad, low octave)
const MUSIC_CHORD: [f32; 3] = [130.81, 164.81, 196.0];

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    sfx_volume: f32,
    music_volume: f32,
    /// Running background voices and their shared gain
    music: Option<(Vec<OscillatorNode>, GainNode)>,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            sfx_volume: settings.effective_sfx_volume(),
            music_volume: settings.effective_music_volume(),
            music: None,
        }
    }

    /// Pick up volume/mute changes
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_volume = settings.effective_sfx_volume();
        self.music_volume = settings.effective_music_volume();
        if let Some((_, gain)) = &self.music {
            gain.gain().set_value(self.music_volume * 0.2);
        }
    }

    /// Resume context if suspended (browsers require user gesture)
    fn ready_context(&self) -> Option<&AudioContext> {
        let ctx = self.ctx.as_ref()?;
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some(ctx)
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
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

    /// Short run of notes, `spacing` seconds apart
    fn arpeggio(ctx: &AudioContext, vol: f32, notes: &[f32], spacing: f64, len: f64, osc_type: OscillatorType) {
        for (i, freq) in notes.iter().enumerate() {
            let delay = i as f64 * spacing;
            if let Some((osc, gain)) = Self::create_osc(ctx, *freq, osc_type) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + len)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + len + 0.05).ok();
            }
        }
    }

    /// Correct - bright two-note chime
    fn play_correct(ctx: &AudioContext, vol: f32) {
        Self::arpeggio(ctx, vol * 0.3, &[660.0, 880.0], 0.08, 0.2, OscillatorType::Triangle);
    }

    /// Wrong - low buzzy slide down
    fn play_wrong(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, 220.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.35)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(110.0, t + 0.3)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.4).ok();
    }

    /// Combo - quick rising sparkle
    fn play_combo(ctx: &AudioContext, vol: f32) {
        Self::arpeggio(
            ctx,
            vol * 0.25,
            &[660.0, 880.0, 1100.0, 1320.0],
            0.05,
            0.15,
            OscillatorType::Triangle,
        );
    }

    /// Level up - triumphant fanfare
    fn play_level_up(ctx: &AudioContext, vol: f32) {
        Self::arpeggio(
            ctx,
            vol * 0.3,
            &[400.0, 500.0, 600.0, 800.0],
            0.1,
            0.4,
            OscillatorType::Triangle,
        );
    }

    fn start_music(&mut self) {
        self.stop_music();
        let vol = self.music_volume;
        let Some(ctx) = self.ready_context() else { return };
        let Ok(gain) = ctx.create_gain() else { return };
        if gain.connect_with_audio_node(&ctx.destination()).is_err() {
            return;
        }
        gain.gain().set_value(vol * 0.2);

        let voices: Vec<OscillatorNode> = MUSIC_CHORD
            .iter()
            .filter_map(|freq| {
                let osc = ctx.create_oscillator().ok()?;
                osc.set_type(OscillatorType::Sine);
                osc.frequency().set_value(*freq);
                osc.connect_with_audio_node(&gain).ok()?;
                osc.start().ok()?;
                Some(osc)
            })
            .collect();
        self.music = Some((voices, gain));
    }

    fn stop_music(&mut self) {
        if let Some((voices, gain)) = self.music.take() {
            for osc in voices {
                osc.stop().ok();
            }
            let _ = gain.disconnect();
        }
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self, cue: Cue) {
        let vol = self.sfx_volume;
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = self.ready_context() else { return };

        match cue {
            Cue::Correct => Self::play_correct(ctx, vol),
            Cue::Wrong => Self::play_wrong(ctx, vol),
            Cue::Combo => Self::play_combo(ctx, vol),
            Cue::LevelUp => Self::play_level_up(ctx, vol),
        }
    }

    fn music(&mut self, music: Music) {
        match music {
            Music::Play => self.start_music(),
            Music::Stop => self.stop_music(),
        }
    }
}
