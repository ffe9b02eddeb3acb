//! Math Fun Kids entry point
//!
//! Handles platform-specific initialization. On the web this wires the DOM to
//! the controller; natively it plays a seeded demo session and logs it.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, KeyboardEvent, MouseEvent};

    use math_fun_kids::consts::*;
    use math_fun_kids::controller::{Controller, IntervalSlot, TimerChange};
    use math_fun_kids::quiz::{Category, Phase, RoundToken};
    use math_fun_kids::storage::{KeyValueStore, LocalStorage, MemoryStore};
    use math_fun_kids::view::QuizView;
    use math_fun_kids::web_audio::AudioManager;

    type WebController = Controller<Box<dyn KeyValueStore>, AudioManager>;

    /// Game instance holding all state
    struct Game {
        controller: WebController,
        /// Category highlighted on the menu
        selected: Option<Category>,
        /// Running countdown interval
        interval: IntervalSlot<Interval>,
        last_time: f64,
        /// Accumulated ms not yet passed to the controller
        pending_ms: f64,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let store: Box<dyn KeyValueStore> = match LocalStorage::open() {
                Ok(storage) => Box::new(storage),
                Err(e) => {
                    log::warn!("LocalStorage unavailable ({}), progress won't be saved", e);
                    Box::new(MemoryStore::new())
                }
            };
            let settings = math_fun_kids::Settings::load(&store);
            let audio = AudioManager::new(&settings);
            let controller = Controller::new(store, audio, seed);
            let selected = category_from_url().or_else(|| controller.preferred_category());
            Self {
                controller,
                selected,
                interval: IntervalSlot::new(),
                last_time: 0.0,
                pending_ms: 0.0,
            }
        }

        /// Feed wall-clock time to the controller in whole milliseconds
        fn update(&mut self, time: f64) {
            if self.last_time > 0.0 {
                self.pending_ms += (time - self.last_time).max(0.0);
            }
            self.last_time = time;

            let whole = self.pending_ms.floor();
            if whole >= 1.0 {
                self.pending_ms -= whole;
                self.controller.elapsed(whole as u32);
            }
        }
    }

    /// Category preselected by a `?category=` query parameter
    fn category_from_url() -> Option<Category> {
        let search = web_sys::window()?.location().search().ok()?;
        let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
        let raw = params.get("category")?;
        let category = Category::parse(&raw);
        if category.is_none() {
            log::warn!("Unknown category in URL: {}", raw);
        }
        category
    }

    /// Run an input against the game, then sync the countdown interval
    fn handle(game: &Rc<RefCell<Game>>, f: impl FnOnce(&mut Game) -> Option<TimerChange>) {
        let change = f(&mut game.borrow_mut());
        if let Some(change) = change {
            apply_timer(game, change);
        }
    }

    /// A `setInterval` registration and the callback it calls.
    /// Dropping it clears the interval and frees the callback.
    struct Interval {
        handle: i32,
        _tick: Closure<dyn FnMut()>,
    }

    impl Interval {
        fn start(game: Rc<RefCell<Game>>, token: RoundToken) -> Option<Self> {
            let window = web_sys::window()?;
            let tick = Closure::<dyn FnMut()>::new(move || {
                // Stale tokens are ignored by the controller
                handle(&game, |g| g.controller.tick(token));
            });
            match window.set_interval_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                TICK_MS as i32,
            ) {
                Ok(handle) => Some(Self { handle, _tick: tick }),
                Err(e) => {
                    log::error!("Failed to start countdown: {:?}", e);
                    None
                }
            }
        }
    }

    impl Drop for Interval {
        fn drop(&mut self) {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(self.handle);
            }
        }
    }

    /// Replace (or clear) the countdown interval
    fn apply_timer(game: &Rc<RefCell<Game>>, change: TimerChange) {
        let tick_game = game.clone();
        let displaced = game
            .borrow_mut()
            .interval
            .apply(change, |token| Interval::start(tick_game, token));
        // Released outside the borrow; may be the callback that is running now
        drop(displaced);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Math Fun Kids starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document - cannot start");
            return;
        };

        // Hide loading indicator
        set_hidden(&document, "loading", true);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        setup_menu(&document, game.clone());
        setup_round_buttons(&document, game.clone());
        setup_keyboard(game.clone());

        request_animation_frame(game);

        log::info!("Math Fun Kids running!");
    }

    fn on_click(document: &Document, id: &str, mut f: impl FnMut() + 'static) {
        if let Some(el) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| f());
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu(document: &Document, game: Rc<RefCell<Game>>) {
        for category in Category::ALL {
            let game = game.clone();
            on_click(document, &format!("cat-{}", category.as_str()), move || {
                game.borrow_mut().selected = Some(category);
            });
        }

        // Start and restart both begin a new session with the selected category
        for id in ["start-btn", "restart-btn"] {
            let game = game.clone();
            on_click(document, id, move || {
                handle(&game, |g| {
                    let category = g.selected.unwrap_or_default();
                    g.controller.start_game(category)
                });
            });
        }
    }

    fn setup_round_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for index in 0..CHOICE_COUNT {
            let game = game.clone();
            on_click(document, &format!("choice-{}", index), move || {
                handle(&game, |g| g.controller.select_index(index));
            });
        }

        let g = game.clone();
        on_click(document, "next-btn", move || handle(&g, |g| g.controller.advance()));
        let g = game.clone();
        on_click(document, "quit-btn", move || handle(&g, |g| g.controller.quit()));
        let g = game.clone();
        on_click(document, "quit-yes", move || handle(&g, |g| g.controller.confirm_quit()));
        on_click(document, "quit-no", move || handle(&game, |g| g.controller.cancel_quit()));
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let phase = game.borrow().controller.state().phase;
            let quit_prompt = game.borrow().controller.state().quit_prompt;
            match event.key().as_str() {
                key @ ("1" | "2" | "3" | "4") => {
                    let index = key.parse::<usize>().unwrap_or(1) - 1;
                    handle(&game, |g| g.controller.select_index(index));
                }
                "Enter" | " " => match phase {
                    Phase::ShowingFeedback => handle(&game, |g| g.controller.advance()),
                    Phase::NotStarted | Phase::GameOver => handle(&game, |g| {
                        let category = g.selected.unwrap_or_default();
                        g.controller.start_game(category)
                    }),
                    Phase::AwaitingAnswer => {}
                },
                "Escape" if quit_prompt => handle(&game, |g| g.controller.cancel_quit()),
                "Escape" => handle(&game, |g| g.controller.quit()),
                "m" | "M" => {
                    let mut g = game.borrow_mut();
                    let mut settings = g.controller.settings().clone();
                    settings.muted = !settings.muted;
                    g.controller.update_settings(settings);
                    let settings = g.controller.settings().clone();
                    g.controller.audio_mut().apply_settings(&settings);
                    log::info!("Sound {}", if settings.muted { "off" } else { "on" });
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                render(&document, &g.controller.view(), g.selected);
            }
        }

        request_animation_frame(game);
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn set_class(el: &Element, class: &str, on: bool) {
        let _ = el.class_list().toggle_with_force(class, on);
    }

    /// Update DOM from the view
    fn render(document: &Document, view: &QuizView, selected: Option<Category>) {
        let in_round = matches!(view.phase, Phase::AwaitingAnswer | Phase::ShowingFeedback);

        set_text(document, "mood", view.mood);
        set_text(document, "best-score", &view.best_score.to_string());
        set_hidden(document, "new-best", !view.new_best);

        // Menu
        set_hidden(document, "menu", view.phase != Phase::NotStarted);
        for category in Category::ALL {
            if let Some(el) = document.get_element_by_id(&format!("cat-{}", category.as_str())) {
                set_class(&el, "selected", selected == Some(category));
            }
        }
        if let Some(btn) = document.get_element_by_id("start-btn") {
            if selected.is_none() {
                let _ = btn.set_attribute("disabled", "");
            } else {
                let _ = btn.remove_attribute("disabled");
            }
        }

        // Round
        set_hidden(document, "game", !in_round);
        if in_round {
            set_text(
                document,
                "score",
                &format!("{} / {}", view.score, view.total_questions),
            );
            set_text(document, "level", &format!("Lv.{}", view.level));
            set_hidden(document, "levelup-msg", !view.level_up);
            set_text(document, "combo", view.combo_banner.as_deref().unwrap_or(""));
            if let Some(el) = document.get_element_by_id("combo") {
                set_class(&el, "combo-anim", view.combo_pulse);
            }

            if let Some(el) = document.get_element_by_id("timer-inner") {
                let _ = el.set_attribute(
                    "style",
                    &format!("width: {:.0}%", view.timer_fraction * 100.0),
                );
            }
            set_text(document, "timer-text", &format!("⏰ {}s", view.time_left));
            if let Some(el) = document.get_element_by_id("timer-text") {
                set_class(&el, "danger", view.timer_danger);
            }

            set_text(
                document,
                "question",
                &format!(
                    "Q{}. {} = ?",
                    view.question_index,
                    view.prompt.as_deref().unwrap_or("")
                ),
            );
            set_text(document, "hint", view.hint.as_deref().unwrap_or(""));

            for (i, choice) in view.choices.iter().enumerate() {
                let id = format!("choice-{}", i);
                set_text(document, &id, &choice.label);
                if let Some(el) = document.get_element_by_id(&id) {
                    set_class(&el, "correct", choice.is_answer);
                    if view.outcome.is_some() {
                        let _ = el.set_attribute("disabled", "");
                    } else {
                        let _ = el.remove_attribute("disabled");
                    }
                }
            }

            let feedback = match (view.outcome, &view.reveal) {
                (Some(outcome), reveal) => {
                    let lead = match outcome {
                        math_fun_kids::quiz::Outcome::Correct => "Correct!",
                        math_fun_kids::quiz::Outcome::Wrong => "So close!",
                        math_fun_kids::quiz::Outcome::Timeout => "Time's up!",
                    };
                    let emoji = view.feedback_emoji.as_deref().unwrap_or("");
                    match reveal {
                        Some(answer) => format!("{} {} The answer is {}", lead, emoji, answer),
                        None => format!("{} {}", lead, emoji),
                    }
                }
                (None, _) => String::new(),
            };
            set_text(document, "feedback", &feedback);
            set_hidden(document, "next-btn", !view.show_next);
            set_hidden(document, "quit-prompt", !view.quit_prompt);
        }

        // Game over
        set_hidden(document, "game-over", view.phase != Phase::GameOver);
        if view.phase == Phase::GameOver {
            set_text(
                document,
                "final-score",
                &format!("{} / {}", view.score, view.total_questions),
            );
            set_text(document, "final-emoji", view.verdict_emoji.unwrap_or(""));
            set_text(document, "final-msg", view.verdict.unwrap_or(""));
            let badges = if view.badges.is_empty() {
                "No badges yet - give it another go!".to_string()
            } else {
                view.badges
                    .iter()
                    .map(|b| format!("{} {}", b.emoji, b.label))
                    .collect::<Vec<_>>()
                    .join("  ")
            };
            set_text(document, "badges", &badges);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Math Fun Kids (native) starting...");
    log::info!("The game runs in the browser - run with `trunk serve` for the web version");

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let only = std::env::args().nth(1).and_then(|arg| {
        let category = math_fun_kids::quiz::Category::parse(&arg);
        if category.is_none() {
            log::warn!("Unknown category {:?}, playing all of them", arg);
        }
        category
    });
    demo::run(seed, only);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Self-play demo: one session per category (or just the one named on the
/// command line) with a bot that is right most of the time and sometimes lets
/// the clock run out.
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use math_fun_kids::audio::SilentAudio;
    use math_fun_kids::consts::TIME_LIMIT_SECS;
    use math_fun_kids::controller::Controller;
    use math_fun_kids::quiz::{Category, Phase};
    use math_fun_kids::storage::MemoryStore;

    pub fn run(seed: u64, only: Option<Category>) {
        let mut bot = Pcg32::seed_from_u64(seed ^ 0x5eed);
        let mut controller = Controller::new(MemoryStore::new(), SilentAudio, seed);
        let categories: Vec<Category> = match only {
            Some(category) => vec![category],
            None => Category::ALL.to_vec(),
        };

        log::info!("Playing {} session(s) with seed {}", categories.len(), seed);
        for category in categories {
            controller.start_game(category);
            while controller.state().phase != Phase::GameOver {
                if bot.random_bool(0.1) {
                    if let Some(token) = controller.active_timer() {
                        for _ in 0..TIME_LIMIT_SECS {
                            controller.tick(token);
                        }
                    }
                } else if let Some(q) = controller.state().question.clone() {
                    let index = if bot.random_bool(0.8) {
                        q.answer_index().unwrap_or(0)
                    } else {
                        bot.random_range(0..q.choices.len())
                    };
                    log::debug!("{} = ? picked {}", q.prompt, q.choices[index]);
                    controller.select_index(index);
                }
                controller.advance();
            }

            let view = controller.view();
            let badges: Vec<_> = view.badges.iter().map(|b| b.label).collect();
            log::info!(
                "{:>15}: score {:>2}, max combo {:>2}, badges {:?}",
                category.label(),
                view.score,
                view.max_combo,
                badges
            );
        }
        log::info!("Best score: {}", controller.best_score());
    }
}
