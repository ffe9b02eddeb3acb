//! Quiz logic
//!
//! Everything that decides what the player sees lives here. This module is
//! pure and deterministic given its RNG:
//! - Seeded RNG only, passed in by the caller
//! - No clock: the countdown advances only on `Event::Tick`
//! - No storage, audio or DOM access (those are returned as `Effect`s)

pub mod category;
pub mod level;
pub mod question;
pub mod scoring;
pub mod state;
pub mod step;
pub mod value;

pub use category::Category;
pub use level::{LevelParams, level_params};
pub use question::{Question, build_choices, generate_question};
pub use scoring::{Badge, FinalTally, Mood, MoodInput, Verdict, character_mood, evaluate_badges};
pub use state::{Countdown, Notices, Outcome, Phase, QuizState, RoundToken, SessionState};
pub use step::{Effect, Event, Rules, step};
pub use value::Value;
