//! Vector Asteroids entry point
//!
//! The browser build wires the canvas, keyboard and HUD around the simulation.
//! The native build plays a headless autopilot session and logs how it went.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent};

    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use vector_asteroids::audio::AudioManager;
    use vector_asteroids::consts::REFERENCE_DELTA_TIME;
    use vector_asteroids::input::{InputManager, Modifiers, UiCommand};
    use vector_asteroids::render::canvas::CanvasSurface;
    use vector_asteroids::render::{self, Starfield};
    use vector_asteroids::sim::{GameEvent, RoundPhase, World, tick};
    use vector_asteroids::{Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        world: World,
        input: InputManager,
        settings: Settings,
        audio: AudioManager,
        stars: Starfield,
        canvas: HtmlCanvasElement,
        surface: CanvasSurface,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: f32,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time) as f32
            } else {
                REFERENCE_DELTA_TIME
            };
            self.last_time = time;
            self.track_fps(time);

            for command in self.input.take_ui_commands() {
                self.apply_command(command);
            }

            let input = self.input.take_tick_input();
            tick(&mut self.world, &input, dt);
            self.handle_events();

            render::draw_world(
                &mut self.surface,
                &self.world,
                Some(&self.stars),
                self.settings.render_options(),
            );
            self.update_debug();
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % self.frame_times.len();

            // Oldest sample sits at the slot about to be overwritten
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 && time > oldest {
                self.fps = (self.frame_times.len() as f64 * 1000.0 / (time - oldest)) as f32;
            }
        }

        fn handle_events(&mut self) {
            for event in self.world.drain_events() {
                if let Some(sound) = event.sound() {
                    self.audio.play(sound);
                }
                match event {
                    GameEvent::ScoreboardChanged => self.update_hud(),
                    GameEvent::GameStarted => {
                        set_visible("title", false);
                        set_visible("game-over", false);
                        set_visible("pause-banner", false);
                    }
                    GameEvent::GameOver => set_visible("game-over", true),
                    GameEvent::Paused => set_visible("pause-banner", true),
                    GameEvent::Resumed => set_visible("pause-banner", false),
                    _ => {}
                }
            }
        }

        fn apply_command(&mut self, command: UiCommand) {
            match command {
                UiCommand::ToggleShowDebug => {
                    self.settings.toggle_show_debug();
                    set_visible("debug", self.settings.show_debug);
                }
                UiCommand::ToggleDrawDebug => self.settings.toggle_draw_debug(),
                UiCommand::RequestFullScreen => {
                    if let Err(e) = self.canvas.request_fullscreen() {
                        log::warn!("Full screen refused: {:?}", e);
                    }
                }
                UiCommand::ToggleMute => {
                    self.settings.toggle_muted();
                    self.audio.apply_settings(&self.settings);
                    log::info!("Sound {}", if self.settings.muted { "off" } else { "on" });
                }
            }
        }

        /// Pause when focus is lost mid-game
        fn auto_pause(&mut self, reason: &str) {
            let playing = matches!(
                self.world.phase(),
                RoundPhase::Spawning | RoundPhase::InProgress | RoundPhase::Cleared
            );
            if self.settings.pause_on_blur && playing && !self.world.is_paused() {
                self.input.request_pause();
                log::info!("Auto-paused ({reason})");
            }
        }

        fn resize(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let inner = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let (width, height) = render::fit_to_window(
                inner(window.inner_width()) as f32,
                inner(window.inner_height()) as f32,
            );
            self.surface.resize(width, height);
            log::debug!("Canvas resized to {}x{}", width, height);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = document() else { return };
            let player = self.world.player();

            for (selector, value) in [
                ("#hud-score .hud-value", player.score.to_string()),
                ("#hud-lives .hud-value", player.lives.to_string()),
                ("#hud-level .hud-value", player.level.to_string()),
            ] {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(&value));
                }
            }
        }

        fn update_debug(&self) {
            if !self.settings.show_debug {
                return;
            }
            if let Some(el) = document().and_then(|d| d.get_element_by_id("debug")) {
                el.set_text_content(Some(&render::debug_readout(&self.world, self.fps)));
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Text of an embedded JSON block, e.g. `<script id="tuning" type="application/json">`
    fn json_block(document: &Document, id: &str) -> Option<String> {
        document.get_element_by_id(id)?.text_content()
    }

    fn load_tuning(document: &Document) -> Tuning {
        let Some(json) = json_block(document, "tuning") else {
            return Tuning::default();
        };
        Tuning::from_json(&json).unwrap_or_else(|e| {
            log::warn!("Ignoring tuning block: {e}");
            Tuning::default()
        })
    }

    fn load_settings(document: &Document) -> Settings {
        let Some(json) = json_block(document, "settings") else {
            return Settings::default();
        };
        Settings::from_json(&json).unwrap_or_else(|e| {
            log::warn!("Ignoring settings block: {e}");
            Settings::default()
        })
    }

    fn modifiers(event: &KeyboardEvent) -> Modifiers {
        Modifiers {
            alt: event.alt_key(),
            ctrl: event.ctrl_key(),
            meta: event.meta_key(),
            shift: event.shift_key(),
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Vector Asteroids starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let tuning = load_tuning(&document);
        let settings = load_settings(&document);

        let seed = js_sys::Date::now() as u64;
        let mut star_rng = Pcg32::seed_from_u64(seed.rotate_left(32));
        let stars = Starfield::new(settings.star_count, &mut star_rng);
        let audio = AudioManager::new(&settings);

        let game = Rc::new(RefCell::new(Game {
            world: World::new(seed, tuning),
            input: InputManager::new(),
            settings,
            audio,
            stars,
            canvas: canvas.clone(),
            surface: CanvasSurface::new(canvas, ctx),
            last_time: 0.0,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0.0,
        }));
        log::info!("Game initialized with seed: {}", seed);

        {
            let mut g = game.borrow_mut();
            g.resize();
            g.update_hud();
            set_visible("debug", g.settings.show_debug);
        }
        set_visible("title", true);

        setup_keyboard(game.clone());
        setup_resize(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);
        log::info!("Vector Asteroids running!");
        Ok(())
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                // Browsers only allow audio after a gesture
                g.audio.resume();
                if g.input.key_down(&event.key(), modifiers(&event)) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if g.input.key_up(&event.key(), modifiers(&event)) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().resize();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().auto_pause("tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur: keys released elsewhere never reach us
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.input.clear_keys_down();
                g.auto_pause("window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::f32::consts::{PI, TAU};

    use vector_asteroids::Tuning;
    use vector_asteroids::consts::REFERENCE_DELTA_TIME;
    use vector_asteroids::sim::{GameEvent, Kind, RoundPhase, TickInput, World, tick};

    /// Ten minutes at 60 Hz
    const MAX_FRAMES: u64 = 60 * 60 * 10;

    /// Play one session with the autopilot; returns (level, score)
    pub fn run(seed: u64, tuning: Tuning) -> (u32, u32) {
        let mut world = World::new(seed, tuning);
        world.start_new_game();

        for frame in 0..MAX_FRAMES {
            let input = autopilot(&world, frame);
            tick(&mut world, &input, REFERENCE_DELTA_TIME);

            for event in world.drain_events() {
                match event {
                    GameEvent::LevelStarted(level) => {
                        log::info!("Level {} at {:.1}s", level, world.clock() / 1000.0)
                    }
                    GameEvent::ShipDestroyed => {
                        log::info!("Ship lost, {} lives left", world.player().lives)
                    }
                    _ => {}
                }
            }
            if world.phase() == RoundPhase::GameOver {
                break;
            }
        }

        let player = world.player();
        (player.level, player.score)
    }

    /// Turn toward the nearest rock and fire when roughly lined up
    fn autopilot(world: &World, frame: u64) -> TickInput {
        let mut input = TickInput::default();
        let Some(ship) = world.ship() else {
            return input;
        };
        let target = world
            .sprites()
            .iter()
            .filter(|s| s.kind() == Kind::Asteroid)
            .min_by(|a, b| {
                a.pos
                    .distance_squared(ship.pos)
                    .total_cmp(&b.pos.distance_squared(ship.pos))
            });
        let Some(target) = target else {
            return input;
        };

        let to = target.pos - ship.pos;
        let wanted = to.x.atan2(-to.y);
        let error = (wanted - ship.rotation + PI).rem_euclid(TAU) - PI;
        input.turn_right = error > 0.05;
        input.turn_left = error < -0.05;
        input.shoot = error.abs() < 0.2 && frame % 8 == 0;
        input
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Vector Asteroids (native) starting...");
    log::info!("The playable build targets wasm32 - run with `trunk serve`");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => load_tuning(&path),
        None => vector_asteroids::Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5EED);

    let (level, score) = headless::run(seed, tuning);
    println!("Autopilot session (seed {seed}): reached level {level} with {score} points");
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> vector_asteroids::Tuning {
    use vector_asteroids::Tuning;

    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Cannot read tuning file {path}: {e}");
            return Tuning::default();
        }
    };
    Tuning::from_json(&json).unwrap_or_else(|e| {
        log::warn!("Ignoring tuning file {path}: {e}");
        Tuning::default()
    })
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
