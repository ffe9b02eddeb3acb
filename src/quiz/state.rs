//! Session state
//!
//! Everything the state machine mutates lives here, so a render only needs a
//! `&QuizState`. Nothing in this module touches the clock, storage or audio.

use serde::{Deserialize, Serialize};

use super::scoring::{Badge, FinalTally};
use super::{Category, Question};
use crate::consts::{MIN_LEVEL, TIME_LIMIT_SECS};

/// Where the player is in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Category menu, no session yet
    #[default]
    NotStarted,
    /// Question shown, countdown running
    AwaitingAnswer,
    /// Answer judged, waiting for "next"
    ShowingFeedback,
    /// Ten questions done
    GameOver,
}

impl Phase {
    pub fn in_round(&self) -> bool {
        matches!(self, Phase::AwaitingAnswer | Phase::ShowingFeedback)
    }
}

/// How the last question ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Wrong,
    Timeout,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Correct => "correct",
            Outcome::Wrong => "wrong",
            Outcome::Timeout => "timeout",
        }
    }
}

/// Identifies one armed countdown; ticks carrying any other token are stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundToken(pub u64);

/// The single per-question countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    /// Active token, `None` while disarmed
    pub token: Option<RoundToken>,
    pub remaining_secs: u32,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            token: None,
            remaining_secs: TIME_LIMIT_SECS,
        }
    }
}

impl Countdown {
    pub fn is_armed(&self) -> bool {
        self.token.is_some()
    }

    /// Fraction of the time limit left (1.0 = full bar)
    pub fn fraction(&self) -> f32 {
        self.remaining_secs as f32 / TIME_LIMIT_SECS as f32
    }
}

/// Per-session counters, reset by every new game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub category: Category,
    pub score: u32,
    pub level: u32,
    /// 1-based index of the current question
    pub question_index: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub fast_answers: u32,
    pub correct_answers: u32,
    pub outcome: Option<Outcome>,
}

impl SessionState {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            score: 0,
            level: MIN_LEVEL,
            question_index: 1,
            combo: 0,
            max_combo: 0,
            fast_answers: 0,
            correct_answers: 0,
            outcome: None,
        }
    }

    pub fn tally(&self) -> FinalTally {
        FinalTally {
            score: self.score,
            correct: self.correct_answers,
            max_combo: self.max_combo,
            fast_answers: self.fast_answers,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Category::default())
    }
}

/// Short-lived banners, cleared as wall-clock time elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Notices {
    pub level_up_ms: u32,
    pub combo_ms: u32,
    pub new_best_ms: u32,
}

impl Notices {
    pub fn level_up(&self) -> bool {
        self.level_up_ms > 0
    }

    pub fn combo(&self) -> bool {
        self.combo_ms > 0
    }

    pub fn new_best(&self) -> bool {
        self.new_best_ms > 0
    }

    /// Count every banner down by `ms`
    pub fn decay(&mut self, ms: u32) {
        self.level_up_ms = self.level_up_ms.saturating_sub(ms);
        self.combo_ms = self.combo_ms.saturating_sub(ms);
        self.new_best_ms = self.new_best_ms.saturating_sub(ms);
    }
}

/// Complete quiz state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizState {
    pub phase: Phase,
    pub session: SessionState,
    /// `None` until the first game starts
    pub question: Option<Question>,
    pub countdown: Countdown,
    /// Quit confirmation overlay is open
    pub quit_prompt: bool,
    pub notices: Notices,
    /// Reaction for the last outcome
    pub feedback_emoji: Option<String>,
    /// Flair for the combo banner, set while a streak of 2+ is running
    pub combo_emoji: Option<String>,
    /// Filled in on entering `GameOver`
    pub badges: Vec<Badge>,
    pub best_score: u32,
    /// Source of fresh round tokens
    next_token: u64,
}

impl QuizState {
    /// Fresh state with the persisted best score
    pub fn new(best_score: u32) -> Self {
        Self {
            best_score,
            ..Default::default()
        }
    }

    /// Arm a new countdown with `secs` left, invalidating any previous token
    pub fn arm_countdown(&mut self, secs: u32) -> RoundToken {
        self.next_token += 1;
        let token = RoundToken(self.next_token);
        self.countdown = Countdown {
            token: Some(token),
            remaining_secs: secs,
        };
        token
    }

    /// Disarm the countdown, keeping the remaining time for display
    pub fn disarm_countdown(&mut self) -> Option<RoundToken> {
        self.countdown.token.take()
    }

    /// True when `token` belongs to the countdown that is running right now
    pub fn is_live_token(&self, token: RoundToken) -> bool {
        self.phase == Phase::AwaitingAnswer && !self.quit_prompt && self.countdown.token == Some(token)
    }
}
