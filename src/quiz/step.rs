//! Quiz state machine
//!
//! `step` applies one event to a [`QuizState`] and returns the side effects the
//! host must carry out (arm/cancel the countdown, play cues, persist a new best).
//! Events that make no sense in the current phase are no-ops with no effects.

use rand::Rng;

use super::scoring::{self, evaluate_badges, points_for_correct};
use super::state::{Notices, Outcome, Phase, QuizState, RoundToken, SessionState};
use super::{Category, Value, generate_question};
use crate::audio::{Cue, Music};
use crate::consts::*;

/// Something that happened to the quiz
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Start (or restart) a session
    StartGame(Category),
    /// Player picked an answer
    SelectChoice(Value),
    /// One second of the countdown identified by the token elapsed
    Tick(RoundToken),
    /// "Next" pressed after feedback
    Advance,
    /// Quit requested during a round
    Quit,
    ConfirmQuit,
    CancelQuit,
    /// Wall-clock time passed (decays banners)
    Elapsed { ms: u32 },
}

/// Work for the host after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Replace any running interval with one that ticks this token every second
    ArmTimer(RoundToken),
    /// Stop the running interval
    CancelTimer,
    Cue(Cue),
    Music(Music),
    /// Write the new best score to storage
    PersistBest(u32),
}

/// Behaviour switches taken from settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rules {
    /// Ask before quitting a round
    pub confirm_quit: bool,
    /// Treat a timeout like a wrong answer for the combo
    pub reset_combo_on_timeout: bool,
}

/// Apply `event` to `state`
pub fn step<R: Rng + ?Sized>(
    state: &mut QuizState,
    event: Event,
    rules: &Rules,
    rng: &mut R,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    match event {
        Event::StartGame(category) => start_game(state, category, rng, &mut effects),
        Event::SelectChoice(choice) => select_choice(state, choice, rng, &mut effects),
        Event::Tick(token) => tick(state, token, rules, rng, &mut effects),
        Event::Advance => advance(state, rng, &mut effects),
        Event::Quit => quit(state, rules, &mut effects),
        Event::ConfirmQuit => {
            if state.quit_prompt {
                back_to_menu(state, &mut effects);
            }
        }
        Event::CancelQuit => cancel_quit(state, &mut effects),
        Event::Elapsed { ms } => state.notices.decay(ms),
    }
    effects
}

fn start_game<R: Rng + ?Sized>(
    state: &mut QuizState,
    category: Category,
    rng: &mut R,
    effects: &mut Vec<Effect>,
) {
    state.session = SessionState::new(category);
    state.question = Some(generate_question(category, MIN_LEVEL, rng));
    state.phase = Phase::AwaitingAnswer;
    state.quit_prompt = false;
    state.notices = Notices::default();
    state.feedback_emoji = None;
    state.combo_emoji = None;
    state.badges.clear();

    let token = state.arm_countdown(TIME_LIMIT_SECS);
    effects.push(Effect::ArmTimer(token));
    effects.push(Effect::Cue(Cue::LevelUp));
    effects.push(Effect::Music(Music::Play));

    log::info!("New {} session started", category.as_str());
}

fn select_choice<R: Rng + ?Sized>(
    state: &mut QuizState,
    choice: Value,
    rng: &mut R,
    effects: &mut Vec<Effect>,
) {
    if state.phase != Phase::AwaitingAnswer || state.quit_prompt || state.session.outcome.is_some() {
        return;
    }
    let Some(question) = &state.question else {
        return;
    };

    let outcome = if question.is_correct(choice) {
        let remaining = state.countdown.remaining_secs;
        let s = &mut state.session;

        let previous_combo = s.combo;
        s.combo += 1;
        s.max_combo = s.max_combo.max(s.combo);
        s.score += points_for_correct(previous_combo);
        s.correct_answers += 1;
        if scoring::is_fast_answer(remaining) {
            s.fast_answers += 1;
        }

        if s.combo >= 2 {
            state.notices.combo_ms = COMBO_NOTICE_MS;
            state.combo_emoji = Some(scoring::combo_emoji(rng).to_string());
            effects.push(Effect::Cue(Cue::Combo));
        } else {
            effects.push(Effect::Cue(Cue::Correct));
        }

        let s = &mut state.session;
        if s.question_index % LEVEL_UP_EVERY == 0 && s.level < MAX_LEVEL {
            s.level += 1;
            state.notices.level_up_ms = LEVEL_UP_NOTICE_MS;
            effects.push(Effect::Cue(Cue::LevelUp));
            log::debug!("Level up to {}", s.level);
        }
        Outcome::Correct
    } else {
        state.session.combo = 0;
        state.combo_emoji = None;
        effects.push(Effect::Cue(Cue::Wrong));
        Outcome::Wrong
    };

    log::debug!(
        "Q{} answered {} (score {}, combo {})",
        state.session.question_index,
        outcome.as_str(),
        state.session.score,
        state.session.combo
    );
    show_feedback(state, outcome, rng, effects);
}

fn tick<R: Rng + ?Sized>(
    state: &mut QuizState,
    token: RoundToken,
    rules: &Rules,
    rng: &mut R,
    effects: &mut Vec<Effect>,
) {
    if !state.is_live_token(token) {
        log::debug!("Ignoring stale tick {:?}", token);
        return;
    }

    state.countdown.remaining_secs = state.countdown.remaining_secs.saturating_sub(1);
    if state.countdown.remaining_secs > 0 {
        return;
    }

    if rules.reset_combo_on_timeout {
        state.session.combo = 0;
        state.combo_emoji = None;
    }
    log::debug!("Q{} timed out", state.session.question_index);
    show_feedback(state, Outcome::Timeout, rng, effects);
}

/// Common exit from `AwaitingAnswer`
fn show_feedback<R: Rng + ?Sized>(
    state: &mut QuizState,
    outcome: Outcome,
    rng: &mut R,
    effects: &mut Vec<Effect>,
) {
    state.session.outcome = Some(outcome);
    state.feedback_emoji = Some(scoring::feedback_emoji(outcome, rng).to_string());
    state.phase = Phase::ShowingFeedback;
    if state.disarm_countdown().is_some() {
        effects.push(Effect::CancelTimer);
    }
}

fn advance<R: Rng + ?Sized>(state: &mut QuizState, rng: &mut R, effects: &mut Vec<Effect>) {
    if state.phase != Phase::ShowingFeedback || state.quit_prompt {
        return;
    }

    if state.session.question_index >= TOTAL_QUESTIONS {
        game_over(state, effects);
        return;
    }

    let s = &mut state.session;
    state.question = Some(generate_question(s.category, s.level, rng));
    s.outcome = None;
    s.question_index += 1;
    state.feedback_emoji = None;
    state.phase = Phase::AwaitingAnswer;

    let token = state.arm_countdown(TIME_LIMIT_SECS);
    effects.push(Effect::ArmTimer(token));
}

fn game_over(state: &mut QuizState, effects: &mut Vec<Effect>) {
    state.phase = Phase::GameOver;
    if state.disarm_countdown().is_some() {
        effects.push(Effect::CancelTimer);
    }
    state.badges = evaluate_badges(&state.session.tally());
    effects.push(Effect::Music(Music::Stop));

    let score = state.session.score;
    log::info!(
        "Game over: score {} (best {}), {} badge(s)",
        score,
        state.best_score,
        state.badges.len()
    );

    if score > state.best_score {
        state.best_score = score;
        state.notices.new_best_ms = NEW_BEST_NOTICE_MS;
        effects.push(Effect::PersistBest(score));
        log::info!("New best score: {}", score);
    }
}

fn quit(state: &mut QuizState, rules: &Rules, effects: &mut Vec<Effect>) {
    if !state.phase.in_round() || state.quit_prompt {
        return;
    }

    if rules.confirm_quit {
        state.quit_prompt = true;
        // Countdown pauses under the overlay
        if state.disarm_countdown().is_some() {
            effects.push(Effect::CancelTimer);
        }
        return;
    }
    back_to_menu(state, effects);
}

fn cancel_quit(state: &mut QuizState, effects: &mut Vec<Effect>) {
    if !state.quit_prompt {
        return;
    }
    state.quit_prompt = false;
    if state.phase == Phase::AwaitingAnswer {
        let remaining = state.countdown.remaining_secs;
        let token = state.arm_countdown(remaining);
        effects.push(Effect::ArmTimer(token));
    }
}

fn back_to_menu(state: &mut QuizState, effects: &mut Vec<Effect>) {
    let category = state.session.category;
    if state.disarm_countdown().is_some() {
        effects.push(Effect::CancelTimer);
    }
    state.phase = Phase::NotStarted;
    state.quit_prompt = false;
    state.session = SessionState::new(category);
    state.question = None;
    state.feedback_emoji = None;
    state.combo_emoji = None;
    state.notices = Notices::default();
    effects.push(Effect::Music(Music::Stop));
    log::info!("Session quit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Badge;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn started(category: Category) -> (QuizState, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut state = QuizState::new(0);
        step(&mut state, Event::StartGame(category), &Rules::default(), &mut rng);
        (state, rng)
    }

    fn answer(state: &QuizState) -> Value {
        state.question.as_ref().unwrap().answer
    }

    fn wrong_choice(state: &QuizState) -> Value {
        let q = state.question.as_ref().unwrap();
        *q.choices.iter().find(|c| **c != q.answer).unwrap()
    }

    fn live_token(state: &QuizState) -> RoundToken {
        state.countdown.token.unwrap()
    }

    fn run(state: &mut QuizState, rng: &mut Pcg32, event: Event) -> Vec<Effect> {
        step(state, event, &Rules::default(), rng)
    }

    #[test]
    fn test_start_game_resets_and_arms() {
        let (state, _) = started(Category::Addition);
        assert_eq!(state.phase, Phase::AwaitingAnswer);
        assert_eq!(state.session.question_index, 1);
        assert_eq!(state.session.level, 1);
        assert_eq!(state.countdown.remaining_secs, TIME_LIMIT_SECS);
        assert!(state.countdown.is_armed());
        assert!(state.question.is_some());
    }

    #[test]
    fn test_start_game_effects() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = QuizState::new(0);
        let effects = step(
            &mut state,
            Event::StartGame(Category::Units),
            &Rules::default(),
            &mut rng,
        );
        assert!(matches!(effects[0], Effect::ArmTimer(_)));
        assert!(effects.contains(&Effect::Cue(Cue::LevelUp)));
        assert!(effects.contains(&Effect::Music(Music::Play)));
    }

    #[test]
    fn test_correct_then_streak_scores_one_then_two() {
        let (mut state, mut rng) = started(Category::Addition);

        let a = answer(&state);
        let effects = run(&mut state, &mut rng, Event::SelectChoice(a));
        assert_eq!(state.session.score, 1);
        assert_eq!(state.session.combo, 1);
        assert_eq!(state.session.outcome, Some(Outcome::Correct));
        assert!(effects.contains(&Effect::Cue(Cue::Correct)));
        assert!(effects.contains(&Effect::CancelTimer));

        run(&mut state, &mut rng, Event::Advance);
        let a = answer(&state);
        let effects = run(&mut state, &mut rng, Event::SelectChoice(a));
        assert_eq!(state.session.score, 3);
        assert_eq!(state.session.combo, 2);
        assert!(effects.contains(&Effect::Cue(Cue::Combo)));
        assert!(state.notices.combo());
        assert!(state.combo_emoji.is_some());
    }

    #[test]
    fn test_wrong_answer_resets_combo() {
        let (mut state, mut rng) = started(Category::Multiplication);
        let a = answer(&state);
        run(&mut state, &mut rng, Event::SelectChoice(a));
        run(&mut state, &mut rng, Event::Advance);

        let w = wrong_choice(&state);
        let effects = run(&mut state, &mut rng, Event::SelectChoice(w));
        assert_eq!(state.session.combo, 0);
        assert_eq!(state.session.max_combo, 1);
        assert_eq!(state.session.score, 1);
        assert_eq!(state.session.outcome, Some(Outcome::Wrong));
        assert_eq!(state.phase, Phase::ShowingFeedback);
        assert!(effects.contains(&Effect::Cue(Cue::Wrong)));

        // A correct answer after a reset is worth one point again
        run(&mut state, &mut rng, Event::Advance);
        let a = answer(&state);
        run(&mut state, &mut rng, Event::SelectChoice(a));
        assert_eq!(state.session.score, 2);
    }

    #[test]
    fn test_second_selection_is_noop() {
        let (mut state, mut rng) = started(Category::Addition);
        let w = wrong_choice(&state);
        run(&mut state, &mut rng, Event::SelectChoice(w));
        let before = state.session.clone();

        let a = answer(&state);
        let effects = run(&mut state, &mut rng, Event::SelectChoice(a));
        assert!(effects.is_empty());
        assert_eq!(state.session, before);
    }

    #[test]
    fn test_fast_answer_counted_only_with_seven_seconds() {
        let (mut state, mut rng) = started(Category::Addition);
        for _ in 0..3 {
            let token = live_token(&state);
            run(&mut state, &mut rng, Event::Tick(token));
        }
        assert_eq!(state.countdown.remaining_secs, 7);
        let a = answer(&state);
        run(&mut state, &mut rng, Event::SelectChoice(a));
        assert_eq!(state.session.fast_answers, 1);

        run(&mut state, &mut rng, Event::Advance);
        for _ in 0..4 {
            let token = live_token(&state);
            run(&mut state, &mut rng, Event::Tick(token));
        }
        let a = answer(&state);
        run(&mut state, &mut rng, Event::SelectChoice(a));
        assert_eq!(state.session.fast_answers, 1);
    }

    #[test]
    fn test_level_up_on_questions_three_six_nine() {
        let (mut state, mut rng) = started(Category::Subtraction);
        let mut levels = Vec::new();
        for _ in 0..TOTAL_QUESTIONS {
            let a = answer(&state);
            let effects = run(&mut state, &mut rng, Event::SelectChoice(a));
            let index = state.session.question_index;
            assert_eq!(
                effects.contains(&Effect::Cue(Cue::LevelUp)),
                index % 3 == 0,
                "question {index}"
            );
            levels.push(state.session.level);
            run(&mut state, &mut rng, Event::Advance);
        }
        assert_eq!(levels, vec![1, 1, 2, 2, 2, 3, 3, 3, 4, 4]);
    }

    #[test]
    fn test_no_level_up_when_third_question_is_wrong() {
        let (mut state, mut rng) = started(Category::Addition);
        for _ in 0..2 {
            let a = answer(&state);
            run(&mut state, &mut rng, Event::SelectChoice(a));
            run(&mut state, &mut rng, Event::Advance);
        }
        let w = wrong_choice(&state);
        run(&mut state, &mut rng, Event::SelectChoice(w));
        assert_eq!(state.session.level, 1);
    }

    #[test]
    fn test_level_capped_at_max() {
        let (mut state, mut rng) = started(Category::Addition);
        state.session.level = MAX_LEVEL;
        state.session.question_index = 3;
        let a = answer(&state);
        let effects = run(&mut state, &mut rng, Event::SelectChoice(a));
        assert_eq!(state.session.level, MAX_LEVEL);
        assert!(!effects.contains(&Effect::Cue(Cue::LevelUp)));
    }

    #[test]
    fn test_timeout_keeps_combo_by_default() {
        let (mut state, mut rng) = started(Category::Addition);
        let a = answer(&state);
        run(&mut state, &mut rng, Event::SelectChoice(a));
        run(&mut state, &mut rng, Event::Advance);

        let mut last = Vec::new();
        for _ in 0..TIME_LIMIT_SECS {
            let token = live_token(&state);
            last = run(&mut state, &mut rng, Event::Tick(token));
        }
        assert_eq!(state.session.outcome, Some(Outcome::Timeout));
        assert_eq!(state.phase, Phase::ShowingFeedback);
        assert_eq!(state.countdown.remaining_secs, 0);
        assert_eq!(state.session.combo, 1);
        assert!(last.contains(&Effect::CancelTimer));
        assert!(!state.countdown.is_armed());

        run(&mut state, &mut rng, Event::Advance);
        assert_eq!(state.phase, Phase::AwaitingAnswer);
        assert_eq!(state.session.question_index, 3);
        assert_eq!(state.countdown.remaining_secs, TIME_LIMIT_SECS);
    }

    #[test]
    fn test_timeout_resets_combo_when_configured() {
        let rules = Rules {
            reset_combo_on_timeout: true,
            ..Default::default()
        };
        let (mut state, mut rng) = started(Category::Addition);
        let a = answer(&state);
        step(&mut state, Event::SelectChoice(a), &rules, &mut rng);
        step(&mut state, Event::Advance, &rules, &mut rng);
        for _ in 0..TIME_LIMIT_SECS {
            let token = live_token(&state);
            step(&mut state, Event::Tick(token), &rules, &mut rng);
        }
        assert_eq!(state.session.outcome, Some(Outcome::Timeout));
        assert_eq!(state.session.combo, 0);
        assert_eq!(state.session.max_combo, 1);
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let (mut state, mut rng) = started(Category::Addition);
        let old = live_token(&state);
        let a = answer(&state);
        run(&mut state, &mut rng, Event::SelectChoice(a));
        run(&mut state, &mut rng, Event::Advance);

        let effects = run(&mut state, &mut rng, Event::Tick(old));
        assert!(effects.is_empty());
        assert_eq!(state.countdown.remaining_secs, TIME_LIMIT_SECS);
        assert_ne!(live_token(&state), old);
    }

    #[test]
    fn test_tick_after_feedback_is_ignored() {
        let (mut state, mut rng) = started(Category::Addition);
        let token = live_token(&state);
        let a = answer(&state);
        run(&mut state, &mut rng, Event::SelectChoice(a));
        let effects = run(&mut state, &mut rng, Event::Tick(token));
        assert!(effects.is_empty());
        assert_eq!(state.session.outcome, Some(Outcome::Correct));
    }

    #[test]
    fn test_advance_only_from_feedback() {
        let (mut state, mut rng) = started(Category::Addition);
        let effects = run(&mut state, &mut rng, Event::Advance);
        assert!(effects.is_empty());
        assert_eq!(state.session.question_index, 1);
    }

    #[test]
    fn test_perfect_fast_game() {
        let (mut state, mut rng) = started(Category::Addition);
        let mut effects = Vec::new();
        for _ in 0..TOTAL_QUESTIONS {
            let a = answer(&state);
            run(&mut state, &mut rng, Event::SelectChoice(a));
            effects = run(&mut state, &mut rng, Event::Advance);
        }
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.session.score, 19);
        assert_eq!(state.session.max_combo, 10);
        assert_eq!(state.session.fast_answers, 10);
        assert_eq!(
            state.badges,
            vec![Badge::Perfect, Badge::Champion, Badge::ComboMaster, Badge::Speedster]
        );
        assert!(effects.contains(&Effect::Music(Music::Stop)));
        assert!(effects.contains(&Effect::PersistBest(19)));
        assert_eq!(state.best_score, 19);
        assert!(state.notices.new_best());
    }

    #[test]
    fn test_all_wrong_game_has_no_badges() {
        let (mut state, mut rng) = started(Category::Division);
        for _ in 0..TOTAL_QUESTIONS {
            let w = wrong_choice(&state);
            run(&mut state, &mut rng, Event::SelectChoice(w));
            run(&mut state, &mut rng, Event::Advance);
        }
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.session.score, 0);
        assert!(state.badges.is_empty());
        assert_eq!(state.best_score, 0);
        assert!(!state.notices.new_best());
    }

    #[test]
    fn test_best_score_only_updates_when_beaten() {
        for (best, final_score, expect_persist) in [(5, 5, false), (5, 6, true)] {
            let (mut state, mut rng) = started(Category::Addition);
            state.best_score = best;
            state.session.question_index = TOTAL_QUESTIONS;
            state.session.score = final_score - 1;
            let a = answer(&state);
            // combo 0 -> +1 point
            run(&mut state, &mut rng, Event::SelectChoice(a));
            let effects = run(&mut state, &mut rng, Event::Advance);
            assert_eq!(state.session.score, final_score);
            assert_eq!(
                effects.contains(&Effect::PersistBest(final_score)),
                expect_persist
            );
            assert_eq!(state.best_score, best.max(final_score));
        }
    }

    #[test]
    fn test_new_best_notice_clears() {
        let (mut state, mut rng) = started(Category::Addition);
        state.session.question_index = TOTAL_QUESTIONS;
        let a = answer(&state);
        run(&mut state, &mut rng, Event::SelectChoice(a));
        run(&mut state, &mut rng, Event::Advance);
        assert!(state.notices.new_best());
        run(&mut state, &mut rng, Event::Elapsed { ms: 1999 });
        assert!(state.notices.new_best());
        run(&mut state, &mut rng, Event::Elapsed { ms: 1 });
        assert!(!state.notices.new_best());
    }

    #[test]
    fn test_restart_after_game_over() {
        let (mut state, mut rng) = started(Category::Addition);
        state.session.question_index = TOTAL_QUESTIONS;
        let a = answer(&state);
        run(&mut state, &mut rng, Event::SelectChoice(a));
        run(&mut state, &mut rng, Event::Advance);
        assert_eq!(state.phase, Phase::GameOver);

        run(&mut state, &mut rng, Event::StartGame(Category::Time));
        assert_eq!(state.phase, Phase::AwaitingAnswer);
        assert_eq!(state.session, SessionState::new(Category::Time));
        assert!(state.badges.is_empty());
        assert_eq!(state.best_score, 1);
    }

    #[test]
    fn test_quit_without_confirmation() {
        let (mut state, mut rng) = started(Category::Fractions);
        let effects = run(&mut state, &mut rng, Event::Quit);
        assert_eq!(state.phase, Phase::NotStarted);
        assert!(effects.contains(&Effect::CancelTimer));
        assert!(effects.contains(&Effect::Music(Music::Stop)));
        assert!(!state.countdown.is_armed());
        assert_eq!(state.session.category, Category::Fractions);
    }

    #[test]
    fn test_quit_with_confirmation_pauses_and_resumes() {
        let rules = Rules {
            confirm_quit: true,
            ..Default::default()
        };
        let (mut state, mut rng) = started(Category::Addition);
        let token = live_token(&state);
        step(&mut state, Event::Tick(token), &rules, &mut rng);

        let effects = step(&mut state, Event::Quit, &rules, &mut rng);
        assert!(state.quit_prompt);
        assert_eq!(state.phase, Phase::AwaitingAnswer);
        assert_eq!(effects, vec![Effect::CancelTimer]);

        // Answers and ticks are blocked under the overlay
        let a = answer(&state);
        assert!(step(&mut state, Event::SelectChoice(a), &rules, &mut rng).is_empty());
        assert!(step(&mut state, Event::Tick(token), &rules, &mut rng).is_empty());

        let effects = step(&mut state, Event::CancelQuit, &rules, &mut rng);
        assert!(!state.quit_prompt);
        assert_eq!(state.countdown.remaining_secs, TIME_LIMIT_SECS - 1);
        let resumed = live_token(&state);
        assert_ne!(resumed, token);
        assert_eq!(effects, vec![Effect::ArmTimer(resumed)]);

        step(&mut state, Event::Quit, &rules, &mut rng);
        step(&mut state, Event::ConfirmQuit, &rules, &mut rng);
        assert_eq!(state.phase, Phase::NotStarted);
        assert!(!state.quit_prompt);
    }

    #[test]
    fn test_quit_outside_round_is_noop() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut state = QuizState::new(3);
        assert!(run(&mut state, &mut rng, Event::Quit).is_empty());
        assert!(run(&mut state, &mut rng, Event::ConfirmQuit).is_empty());
        assert!(run(&mut state, &mut rng, Event::CancelQuit).is_empty());
        assert_eq!(state.phase, Phase::NotStarted);
    }
}
