//! Liquid Slosh entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        DeviceOrientationEvent, HtmlCanvasElement, HtmlElement, HtmlInputElement, KeyboardEvent,
        PointerEvent,
    };

    use liquid_slosh::Settings;
    use liquid_slosh::audio::AudioManager;
    use liquid_slosh::platform::input::is_arrow_key;
    use liquid_slosh::platform::orientation::request_orientation_permission;
    use liquid_slosh::platform::ControlMode;
    use liquid_slosh::renderer::{RenderState, Rgb, shapes};
    use liquid_slosh::session::{Session, frame_dt};

    /// Running bottle plus its page elements
    struct Game {
        session: Session<AudioManager>,
        render_state: Option<RenderState>,
        canvas: HtmlCanvasElement,
        bottle: HtmlElement,
        liquid: Rgb,
        last_time: f64,
        shown_mode: Option<ControlMode>,
    }

    impl Game {
        fn new(seed: u64, canvas: HtmlCanvasElement, bottle: HtmlElement) -> Self {
            let settings = Settings::load();
            let liquid = Rgb::from_hex(&settings.liquid_color).unwrap_or(Rgb::new(0x3a, 0xa0, 0xff));
            let mut session = Session::new(seed, settings, AudioManager::new());
            session.sink.set_master_volume(session.settings.master_volume);
            Self {
                session,
                render_state: None,
                canvas,
                bottle,
                liquid,
                last_time: 0.0,
                shown_mode: None,
            }
        }

        /// Fraction of the bottle rectangle under a client position
        fn bottle_fraction(&self, client_x: f64, client_y: f64) -> (f32, f32) {
            let rect = self.bottle.get_bounding_client_rect();
            let w = rect.width().max(1.0);
            let h = rect.height().max(1.0);
            (
                ((client_x - rect.left()) / w) as f32,
                ((client_y - rect.top()) / h) as f32,
            )
        }

        /// Size the canvas backbuffer to the bottle rectangle times the pixel ratio
        fn resize(&mut self) {
            let Some(window) = web_sys::window() else { return };
            let dpr = window.device_pixel_ratio();
            let rect = self.bottle.get_bounding_client_rect();
            let width = (rect.width() * dpr).floor() as u32;
            let height = (rect.height() * dpr).floor() as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            let style = self.canvas.style();
            let _ = style.set_property("width", &format!("{}px", rect.width()));
            let _ = style.set_property("height", &format!("{}px", rect.height()));

            let logical = (rect.width() as f32, rect.height() as f32);
            self.session.resize(logical.0, logical.1);
            if let Some(render_state) = self.render_state.as_mut() {
                render_state.resize(width, height, logical);
            }
        }

        /// Advance one animation frame
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                frame_dt(time, self.last_time)
            } else {
                0.0
            };
            self.last_time = time;

            self.session.frame(dt, time);
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let view = self.session.view(time);
            let vertices = shapes::frame(&view, self.liquid);
            match render_state.render(&vertices) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => render_state.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update the mode label when the control mode changes
        fn update_hud(&mut self) {
            let mode = self.session.input.mode();
            if self.shown_mode == Some(mode) {
                return;
            }
            self.shown_mode = Some(mode);
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("modeLabel") {
                el.set_text_content(Some(mode.label()));
            }
        }

        /// Pull every control panel value into the settings
        fn read_controls(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let slider = |id: &str| -> Option<f32> {
                let el: HtmlInputElement = document.get_element_by_id(id)?.dyn_into().ok()?;
                el.value().parse().ok()
            };
            let settings = &mut self.session.settings;
            if let Some(v) = slider("strength") {
                settings.strength = v;
            }
            if let Some(v) = slider("fill") {
                settings.fill = v;
            }
            if let Some(v) = slider("sens") {
                settings.sensitivity = v;
            }
            if let Some(el) = document
                .get_element_by_id("color")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                if let Some(rgb) = Rgb::from_hex(&el.value()) {
                    settings.liquid_color = el.value();
                    self.liquid = rgb;
                }
            }
            *settings = settings.sanitized();
            settings.save();
        }

        /// Push the loaded settings into the control panel
        fn write_controls(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let s = &self.session.settings;
            let values = [
                ("strength", s.strength.to_string()),
                ("fill", s.fill.to_string()),
                ("sens", s.sensitivity.to_string()),
                ("color", s.liquid_color.clone()),
            ];
            for (id, value) in values {
                if let Some(el) = document
                    .get_element_by_id(id)
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                {
                    el.set_value(&value);
                }
            }
        }
    }

    /// Create the wgpu surface and device for the canvas
    async fn init_renderer(canvas: &HtmlCanvasElement, logical: (f32, f32)) -> Option<RenderState> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return None;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return None;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, canvas.width(), canvas.height(), logical).await {
            Ok(render_state) => Some(render_state),
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                None
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Liquid Slosh starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let bottle: HtmlElement = document
            .get_element_by_id("bottle")
            .expect("no bottle")
            .dyn_into()
            .expect("bottle is not an element");
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("c")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, canvas.clone(), bottle.clone())));
        {
            let mut g = game.borrow_mut();
            g.resize();
            g.write_controls();
            g.update_hud();
        }
        log::info!("Session initialized with seed: {}", seed);

        let logical = {
            let g = game.borrow();
            (g.session.state.container.width, g.session.state.container.height)
        };
        let render_state = init_renderer(&canvas, logical).await;
        if render_state.is_none() {
            log::warn!("Rendering unavailable; simulation runs without drawing");
        }
        game.borrow_mut().render_state = render_state;

        setup_input_handlers(&bottle, game.clone());
        setup_controls(game.clone());
        setup_window_handlers(game.clone());

        request_animation_frame(game);

        log::info!("Liquid Slosh running!");
    }

    fn setup_input_handlers(bottle: &HtmlElement, game: Rc<RefCell<Game>>) {
        // Pointer down - take over steering
        {
            let game = game.clone();
            let bottle_clone = bottle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let _ = bottle_clone.set_pointer_capture(event.pointer_id());
                let mut g = game.borrow_mut();
                let (fx, fy) = g.bottle_fraction(event.client_x() as f64, event.client_y() as f64);
                g.session.input.pointer_down(fx, fy, event.time_stamp());
            });
            let _ = bottle
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let (fx, fy) = g.bottle_fraction(event.client_x() as f64, event.client_y() as f64);
                g.session.input.pointer_move(fx, fy, event.time_stamp());
            });
            let _ = bottle
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let Some(window) = web_sys::window() else { return };

        // Device orientation
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
                game.borrow_mut()
                    .session
                    .input
                    .device_orientation(event.gamma(), event.beta());
            });
            let _ = window.add_event_listener_with_callback(
                "deviceorientation",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if is_arrow_key(&key) {
                    event.prevent_default();
                }
                game.borrow_mut().session.input.key_down(&key);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().session.input.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_controls(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        // Sliders and color picker
        for id in ["strength", "fill", "sens", "color"] {
            if let Some(el) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    game.borrow_mut().read_controls();
                });
                let _ = el.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Device tilt permission (needs the click's user activation)
        if let Some(btn) = document.get_element_by_id("enableTilt") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                {
                    let mut g = game.borrow_mut();
                    if g.session.input.device_tilt_enabled() {
                        g.session.input.set_mode(ControlMode::Device);
                        return;
                    }
                }
                let game = game.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let permission = request_orientation_permission().await;
                    if permission.allows_device_tilt() {
                        game.borrow_mut().session.input.set_device_tilt_enabled(true);
                    } else {
                        log::warn!("Device tilt not permitted: {:?}", permission);
                    }
                });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard <-> pointer
        if let Some(btn) = document.get_element_by_id("tiltMode") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().session.input.toggle_keyboard_mode();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Sound
        if let Some(btn) = document.get_element_by_id("enableSound") {
            let label = btn.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if g.session.sink.is_enabled() {
                    g.session.sink.resume();
                } else if !g.session.sink.enable() {
                    label.set_text_content(Some("Sound unavailable"));
                    return;
                }
                label.set_text_content(Some("Sound on"));
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Held keys never see their keyup once focus leaves
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().session.input.release_all_keys();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            frame_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Liquid Slosh (native) starting...");
    log::info!("Native mode runs a scripted headless session - build for wasm32 to play");

    let tuning = std::env::args().nth(1).and_then(|path| {
        match std::fs::read_to_string(&path) {
            Ok(json) => liquid_slosh::Tuning::from_json(&json),
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path, e);
                None
            }
        }
    });

    headless::run(tuning.unwrap_or_default());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use liquid_slosh::consts::MAX_FRAME_DT;
    use liquid_slosh::session::{ImpactSink, Session};
    use liquid_slosh::{Settings, Tuning};

    /// Tallies impacts instead of playing them
    #[derive(Default)]
    struct ImpactCounter {
        count: u64,
        loudest: f32,
    }

    impl ImpactSink for ImpactCounter {
        fn play_impact(&mut self, power: f32) {
            self.count += 1;
            self.loudest = self.loudest.max(power);
        }
    }

    /// Frames per simulated second
    const FPS: u32 = 60;
    /// Scripted session length in seconds
    const SECONDS: u32 = 8;

    /// Shake the bottle with key presses, then let it settle, logging once a second
    pub fn run(tuning: Tuning) {
        let mut session = Session::with_tuning(1, Settings::default(), tuning, ImpactCounter::default());
        session.input.toggle_keyboard_mode();

        let dt = (1.0 / FPS as f32).min(MAX_FRAME_DT);
        let frame_ms = 1000.0 / FPS as f64;
        let mut spawned = 0usize;
        let mut held: Option<&str> = None;

        for frame in 0..FPS * SECONDS {
            let second = frame / FPS;
            // Alternate left/right every half second for three seconds, then release
            let want = if second < 3 {
                Some(if (frame / (FPS / 2)) % 2 == 0 { "ArrowRight" } else { "ArrowLeft" })
            } else {
                None
            };
            if want != held {
                if let Some(key) = held {
                    session.input.key_up(key);
                }
                if let Some(key) = want {
                    session.input.key_down(key);
                }
                held = want;
            }

            let now = frame as f64 * frame_ms;
            let report = session.frame(dt, now);
            spawned += report.spawned;

            if (frame + 1) % FPS == 0 {
                let state = &session.state;
                log::info!(
                    "t={:>4.1}s tilt={:>6.2}deg max|h|={:.3} droplets={:>2} spawned={} impacts={} loudest={:.2}",
                    state.time,
                    state.tilt.angle_deg,
                    state.surface.max_abs_height(),
                    state.droplets.len(),
                    spawned,
                    session.sink.count,
                    session.sink.loudest,
                );
            }
        }

        let view = session.view(SECONDS as f64 * 1000.0);
        log::info!(
            "Done: {} frames, {} surface points, activity {:.2}",
            session.state.frame,
            view.points.len(),
            view.activity
        );
    }
}
