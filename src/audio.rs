//! Audio interface
//!
//! The quiz only signals *what* should be heard. Playback is fire-and-forget
//! and never blocks a state transition. The browser implementation lives in
//! `web_audio` and synthesises everything procedurally.

use serde::{Deserialize, Serialize};

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Correct answer without a streak
    Correct,
    Wrong,
    /// Correct answer extending a streak of 2+
    Combo,
    /// Level increase (also played on game start)
    LevelUp,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Correct => "correct",
            Cue::Wrong => "wrong",
            Cue::Combo => "combo",
            Cue::LevelUp => "levelup",
        }
    }
}

/// Background music loop control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Music {
    /// Restart the loop from the beginning
    Play,
    /// Stop and rewind
    Stop,
}

/// Anything that can play cues and music
pub trait AudioSink {
    fn play(&mut self, cue: Cue);
    fn music(&mut self, music: Music);
}

/// Discards everything (native builds, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, cue: Cue) {
        log::trace!("cue {}", cue.as_str());
    }

    fn music(&mut self, music: Music) {
        log::trace!("music {:?}", music);
    }
}

/// Remembers every request, in order
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub cues: Vec<Cue>,
    pub music: Vec<Music>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    fn music(&mut self, music: Music) {
        self.music.push(music);
    }
}
