//! Render-ready snapshot
//!
//! Everything the presentation layer needs for one frame, derived from a
//! `&QuizState`. Serializable so it can be handed to JS as JSON.

use serde::Serialize;

use crate::consts::TOTAL_QUESTIONS;
use crate::quiz::{
    Badge, Category, MoodInput, Outcome, Phase, QuizState, Verdict, character_mood,
};

/// Seconds left at which the timer turns red
pub const DANGER_SECS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceView {
    pub label: String,
    /// Revealed once feedback is showing
    pub is_answer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeView {
    pub emoji: &'static str,
    pub label: &'static str,
}

impl From<Badge> for BadgeView {
    fn from(badge: Badge) -> Self {
        Self {
            emoji: badge.emoji(),
            label: badge.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizView {
    pub phase: Phase,
    pub category: Category,
    pub mood: &'static str,
    pub score: u32,
    pub total_questions: u32,
    pub best_score: u32,
    pub new_best: bool,
    pub level: u32,
    pub level_up: bool,
    pub question_index: u32,
    pub combo: u32,
    /// Combo banner text, present for streaks of 2+
    pub combo_banner: Option<String>,
    pub combo_pulse: bool,
    pub max_combo: u32,
    pub time_left: u32,
    pub timer_fraction: f32,
    pub timer_danger: bool,
    pub prompt: Option<String>,
    pub hint: Option<String>,
    pub choices: Vec<ChoiceView>,
    pub outcome: Option<Outcome>,
    pub feedback_emoji: Option<String>,
    /// Correct answer, shown after a wrong answer or timeout
    pub reveal: Option<String>,
    pub show_next: bool,
    pub quit_prompt: bool,
    pub badges: Vec<BadgeView>,
    pub verdict: Option<&'static str>,
    pub verdict_emoji: Option<&'static str>,
}

impl QuizView {
    pub fn from_state(state: &QuizState) -> Self {
        let session = &state.session;
        let game_over = state.phase == Phase::GameOver;
        let tally = game_over.then(|| session.tally());
        let verdict = tally.as_ref().map(Verdict::from_tally);
        let revealed = session.outcome.is_some();

        let mood = character_mood(&MoodInput {
            outcome: session.outcome,
            combo: session.combo,
            level_up: state.notices.level_up(),
            final_tally: tally,
        });

        let question = state.question.as_ref().filter(|_| state.phase.in_round());
        let choices = question
            .map(|q| {
                q.choices
                    .iter()
                    .map(|c| ChoiceView {
                        label: c.to_string(),
                        is_answer: revealed && *c == q.answer,
                    })
                    .collect()
            })
            .unwrap_or_default();
        let reveal = match (question, session.outcome) {
            (Some(q), Some(Outcome::Wrong | Outcome::Timeout)) => Some(q.answer.to_string()),
            _ => None,
        };
        let combo_banner = (session.combo >= 2).then(|| {
            format!(
                "{} {} combo!",
                state.combo_emoji.as_deref().unwrap_or(""),
                session.combo
            )
            .trim_start()
            .to_string()
        });

        Self {
            phase: state.phase,
            category: session.category,
            mood: mood.emoji(),
            score: session.score,
            total_questions: TOTAL_QUESTIONS,
            best_score: state.best_score,
            new_best: state.notices.new_best(),
            level: session.level,
            level_up: state.notices.level_up(),
            question_index: session.question_index,
            combo: session.combo,
            combo_banner,
            combo_pulse: state.notices.combo(),
            max_combo: session.max_combo,
            time_left: state.countdown.remaining_secs,
            timer_fraction: state.countdown.fraction(),
            timer_danger: state.countdown.remaining_secs <= DANGER_SECS,
            prompt: question.map(|q| q.prompt.clone()),
            hint: question.and_then(|q| q.hint.clone()),
            choices,
            outcome: session.outcome,
            feedback_emoji: state.feedback_emoji.clone(),
            reveal,
            show_next: state.phase == Phase::ShowingFeedback,
            quit_prompt: state.quit_prompt,
            badges: state.badges.iter().copied().map(BadgeView::from).collect(),
            verdict: verdict.map(|v| v.message()),
            verdict_emoji: verdict.map(|v| v.emoji()),
        }
    }
}
