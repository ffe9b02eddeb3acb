//! Scoring, badges and character reactions
//!
//! Pure functions of the session counters; the state machine calls them and the
//! view layer renders whatever they return.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::Outcome;
use crate::consts::{
    CHAMPION_PERCENT, COMBO_MASTER_THRESHOLD, FAST_ANSWER_SECS, SPEEDSTER_THRESHOLD, TOTAL_QUESTIONS,
};

/// Points for a correct answer given the combo *before* this answer
///
/// A streak already in progress doubles the award.
pub fn points_for_correct(previous_combo: u32) -> u32 {
    if previous_combo >= 1 { 2 } else { 1 }
}

/// Whether a correct answer with `remaining_secs` left counts as fast
pub fn is_fast_answer(remaining_secs: u32) -> bool {
    remaining_secs >= FAST_ANSWER_SECS
}

/// Minimum score for the champion badge (70% of the question count, rounded down)
pub fn champion_score() -> u32 {
    TOTAL_QUESTIONS * CHAMPION_PERCENT / 100
}

/// End-of-game achievements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Badge {
    /// Every question answered correctly
    Perfect,
    Champion,
    ComboMaster,
    Speedster,
}

impl Badge {
    pub fn emoji(&self) -> &'static str {
        match self {
            Badge::Perfect => "🥇",
            Badge::Champion => "🥈",
            Badge::ComboMaster => "🏅",
            Badge::Speedster => "⚡",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Badge::Perfect => "Math Genius",
            Badge::Champion => "Math Champion",
            Badge::ComboMaster => "Combo Master",
            Badge::Speedster => "Speed Quiz King",
        }
    }
}

/// Final counters a badge decision is made from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalTally {
    pub score: u32,
    pub correct: u32,
    pub max_combo: u32,
    pub fast_answers: u32,
}

impl FinalTally {
    /// Every question answered correctly. A streak-free 10 points is not perfect.
    pub fn is_perfect(&self) -> bool {
        self.correct >= TOTAL_QUESTIONS
    }

    pub fn is_champion(&self) -> bool {
        self.score >= champion_score()
    }
}

/// Badges earned, in display order (possibly empty)
pub fn evaluate_badges(tally: &FinalTally) -> Vec<Badge> {
    let mut badges = Vec::new();
    if tally.is_perfect() {
        badges.push(Badge::Perfect);
    }
    if tally.is_champion() {
        badges.push(Badge::Champion);
    }
    if tally.max_combo >= COMBO_MASTER_THRESHOLD {
        badges.push(Badge::ComboMaster);
    }
    if tally.fast_answers >= SPEEDSTER_THRESHOLD {
        badges.push(Badge::Speedster);
    }
    badges
}

/// Closing message tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Perfect,
    Great,
    KeepPractising,
}

impl Verdict {
    pub fn from_tally(tally: &FinalTally) -> Self {
        if tally.is_perfect() {
            Verdict::Perfect
        } else if tally.is_champion() {
            Verdict::Great
        } else {
            Verdict::KeepPractising
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Perfect => "Perfect! You're a math genius!",
            Verdict::Great => "Great job! Awesome!",
            Verdict::KeepPractising => "Shall we practise a little more?",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Verdict::Perfect => "🏆🥇🎉",
            Verdict::Great => "👏😃",
            Verdict::KeepPractising => "👍😊",
        }
    }
}

/// The rabbit mascot's expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Neutral,
    Laughing,
    Sad,
    OnFire,
    LevelUp,
    Trophy,
    Happy,
    Content,
}

impl Mood {
    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Neutral => "🐰",
            Mood::Laughing => "🐰😆",
            Mood::Sad => "🐰😢",
            Mood::OnFire => "🐰🔥",
            Mood::LevelUp => "🐰🚀",
            Mood::Trophy => "🐰🏆",
            Mood::Happy => "🐰😃",
            Mood::Content => "🐰😊",
        }
    }
}

/// Inputs for the mascot expression
#[derive(Debug, Clone, Copy)]
pub struct MoodInput {
    pub outcome: Option<Outcome>,
    pub combo: u32,
    pub level_up: bool,
    /// Present once the game is over
    pub final_tally: Option<FinalTally>,
}

/// Pick the mascot expression; earlier rules win
pub fn character_mood(input: &MoodInput) -> Mood {
    if let Some(tally) = input.final_tally {
        return match Verdict::from_tally(&tally) {
            Verdict::Perfect => Mood::Trophy,
            Verdict::Great => Mood::Happy,
            Verdict::KeepPractising => Mood::Content,
        };
    }
    if input.level_up {
        return Mood::LevelUp;
    }
    if input.combo >= 3 {
        return Mood::OnFire;
    }
    match input.outcome {
        Some(Outcome::Correct) => Mood::Laughing,
        Some(Outcome::Wrong) | Some(Outcome::Timeout) => Mood::Sad,
        None => Mood::Neutral,
    }
}

const CORRECT_EMOJI: &[&str] = &["⭐", "🎉", "🎆", "💖", "👏", "🥳"];
const WRONG_EMOJI: &[&str] = &["😢", "🐻", "🐱", "🙈", "😅", "🦊"];
const TIMEOUT_EMOJI: &[&str] = &["⏰", "⌛", "🕒", "😮"];
const COMBO_EMOJI: &[&str] = &["🔥", "⚡", "💥", "🌟", "🚀", "🎇"];

/// Random reaction emoji for an answer outcome
pub fn feedback_emoji<R: Rng + ?Sized>(outcome: Outcome, rng: &mut R) -> &'static str {
    let pool = match outcome {
        Outcome::Correct => CORRECT_EMOJI,
        Outcome::Wrong => WRONG_EMOJI,
        Outcome::Timeout => TIMEOUT_EMOJI,
    };
    pool.choose(rng).copied().unwrap_or("")
}

/// Random flair for the combo banner
pub fn combo_emoji<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    COMBO_EMOJI.choose(rng).copied().unwrap_or("")
}
