//! Game controller
//!
//! Owns the quiz state, RNG, settings and the injected storage/audio backends.
//! Each input is turned into an [`Event`], run through [`step`], and the
//! resulting effects are carried out here. Timer effects are handed back to
//! the caller, which owns the real interval.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::AudioSink;
use crate::best_score::BestScore;
use crate::quiz::{Category, Effect, Event, QuizState, RoundToken, Value, step};
use crate::settings::Settings;
use crate::storage::KeyValueStore;
use crate::view::QuizView;

/// What the host should do with its interval after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerChange {
    /// Clear any running interval and start one ticking this token
    Arm(RoundToken),
    /// Clear the running interval
    Cancel,
}

/// The host's single countdown interval
///
/// Holds at most one running handle `H` together with the token it ticks.
/// Applying a [`TimerChange`] hands back the displaced handle so the host can
/// drop it, which is where the real interval and its callback are released.
#[derive(Debug)]
pub struct IntervalSlot<H> {
    active: Option<(RoundToken, H)>,
}

impl<H> Default for IntervalSlot<H> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<H> IntervalSlot<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token the running interval ticks
    pub fn token(&self) -> Option<RoundToken> {
        self.active.as_ref().map(|(token, _)| *token)
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Replace or clear the running interval. `start` is only called for
    /// [`TimerChange::Arm`]; returning `None` leaves the slot empty.
    pub fn apply(
        &mut self,
        change: TimerChange,
        start: impl FnOnce(RoundToken) -> Option<H>,
    ) -> Option<H> {
        let displaced = self.active.take().map(|(_, handle)| handle);
        if let TimerChange::Arm(token) = change {
            self.active = start(token).map(|handle| (token, handle));
        }
        displaced
    }
}

pub struct Controller<S: KeyValueStore, A: AudioSink> {
    state: QuizState,
    rng: Pcg32,
    settings: Settings,
    best: BestScore,
    store: S,
    audio: A,
}

impl<S: KeyValueStore, A: AudioSink> Controller<S, A> {
    /// Load best score and settings from `store` and seed the RNG
    pub fn new(store: S, audio: A, seed: u64) -> Self {
        let best = BestScore::load(&store);
        let settings = Settings::load(&store);
        log::info!("Controller ready (seed {}, best {})", seed, best.value);
        Self {
            state: QuizState::new(best.value),
            rng: Pcg32::seed_from_u64(seed),
            settings,
            best,
            store,
            audio,
        }
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn best_score(&self) -> u32 {
        self.best.value
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    /// Token of the countdown that should be ticking, if any
    pub fn active_timer(&self) -> Option<RoundToken> {
        self.state.countdown.token
    }

    pub fn view(&self) -> QuizView {
        QuizView::from_state(&self.state)
    }

    /// Replace settings and persist them
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings.normalized();
        if let Err(e) = self.settings.save(&mut self.store) {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    /// Category to preselect on the menu
    pub fn preferred_category(&self) -> Option<Category> {
        self.settings.last_category
    }

    pub fn start_game(&mut self, category: Category) -> Option<TimerChange> {
        if self.settings.last_category != Some(category) {
            let settings = Settings {
                last_category: Some(category),
                ..self.settings.clone()
            };
            self.update_settings(settings);
        }
        self.dispatch(Event::StartGame(category))
    }

    pub fn select_choice(&mut self, choice: Value) -> Option<TimerChange> {
        self.dispatch(Event::SelectChoice(choice))
    }

    /// Select by button position; out-of-range indices are ignored
    pub fn select_index(&mut self, index: usize) -> Option<TimerChange> {
        let choice = self
            .state
            .question
            .as_ref()
            .and_then(|q| q.choices.get(index).copied())?;
        self.select_choice(choice)
    }

    /// One second elapsed on the interval armed for `token`
    pub fn tick(&mut self, token: RoundToken) -> Option<TimerChange> {
        self.dispatch(Event::Tick(token))
    }

    pub fn advance(&mut self) -> Option<TimerChange> {
        self.dispatch(Event::Advance)
    }

    pub fn quit(&mut self) -> Option<TimerChange> {
        self.dispatch(Event::Quit)
    }

    pub fn confirm_quit(&mut self) -> Option<TimerChange> {
        self.dispatch(Event::ConfirmQuit)
    }

    pub fn cancel_quit(&mut self) -> Option<TimerChange> {
        self.dispatch(Event::CancelQuit)
    }

    /// Wall-clock time passed; decays banners
    pub fn elapsed(&mut self, ms: u32) {
        self.dispatch(Event::Elapsed { ms });
    }

    /// Run one event and carry out its effects. Returns the last timer change.
    pub fn dispatch(&mut self, event: Event) -> Option<TimerChange> {
        let rules = self.settings.rules();
        let effects = step(&mut self.state, event, &rules, &mut self.rng);

        let mut timer = None;
        for effect in effects {
            match effect {
                Effect::ArmTimer(token) => timer = Some(TimerChange::Arm(token)),
                Effect::CancelTimer => timer = Some(TimerChange::Cancel),
                Effect::Cue(cue) => self.audio.play(cue),
                Effect::Music(music) => self.audio.music(music),
                Effect::PersistBest(score) => self.persist_best(score),
            }
        }
        timer
    }

    fn persist_best(&mut self, score: u32) {
        if !self.best.record(score) {
            return;
        }
        if let Err(e) = self.best.save(&mut self.store) {
            log::warn!("Failed to save best score: {}", e);
        }
    }
}
