//! Math Fun Kids - a timed multiple-choice arithmetic quiz
//!
//! Core modules:
//! - `quiz`: Question generation, scoring and the session state machine
//! - `controller`: Drives the state machine and carries out its effects
//! - `storage`: Key-value persistence (LocalStorage on web)
//! - `audio`: Cue and music interface (Web Audio on web)
//! - `view`: Render-ready snapshot of the quiz

pub mod audio;
pub mod best_score;
pub mod controller;
pub mod settings;
pub mod storage;
pub mod quiz;
pub mod view;

#[cfg(target_arch = "wasm32")]
pub mod web_audio;

pub use best_score::BestScore;
pub use controller::Controller;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Questions per session
    pub const TOTAL_QUESTIONS: u32 = 10;
    /// Seconds allowed per question
    pub const TIME_LIMIT_SECS: u32 = 10;
    /// Correct answers with at least this many seconds left count as fast
    pub const FAST_ANSWER_SECS: u32 = 7;
    /// Choices shown for every question
    pub const CHOICE_COUNT: usize = 4;

    /// Difficulty levels
    pub const MIN_LEVEL: u32 = 1;
    pub const MAX_LEVEL: u32 = 10;
    /// A correct answer on every Nth question raises the level
    pub const LEVEL_UP_EVERY: u32 = 3;

    /// Badge thresholds
    pub const CHAMPION_PERCENT: u32 = 70;
    pub const COMBO_MASTER_THRESHOLD: u32 = 5;
    pub const SPEEDSTER_THRESHOLD: u32 = 3;

    /// Banner display durations (ms)
    pub const LEVEL_UP_NOTICE_MS: u32 = 1200;
    pub const COMBO_NOTICE_MS: u32 = 900;
    pub const NEW_BEST_NOTICE_MS: u32 = 2000;

    /// Countdown tick interval (ms)
    pub const TICK_MS: u32 = 1000;
}
