//! Skyraster: flight simulator on a software rasterizer
//!
//! No 3D API is used. Each frame the world triangles are:
//! - Ordered far-to-near (painter's algorithm)
//! - Projected onto the camera's render plane
//! - Scanline-filled with flat lighting and distance fog
//!
//! The finished framebuffer is uploaded to a texture and blitted by macroquad.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod clock;
mod flight;
mod rasterizer;
mod world;

use std::path::PathBuf;
use std::sync::OnceLock;
use macroquad::prelude::*;
use clock::Ticker;
use flight::{Airplane, ControlState, FlightUpdate};
use rasterizer::{FrameSnapshot, Framebuffer, Renderer};
use world::{load_config, KeyBindings, LoadedScene, SimConfig};

static CONFIG: OnceLock<SimConfig> = OnceLock::new();

/// Logging is set up here because the window config is needed first
fn config() -> &'static SimConfig {
    CONFIG.get_or_init(|| {
        use env_logger::{Builder, Env};

        Builder::from_env(Env::default().default_filter_or("info")).init();

        match std::env::args().nth(1).map(PathBuf::from) {
            Some(path) => match load_config(&path) {
                Ok(cfg) => {
                    log::info!("loaded config {}", path.display());
                    cfg
                }
                Err(e) => {
                    log::error!("failed to load config {}: {}, using defaults", path.display(), e);
                    SimConfig::default()
                }
            },
            None => SimConfig::default(),
        }
    })
}

fn window_conf() -> Conf {
    let cfg = config();
    Conf {
        window_title: format!("{} v{}", cfg.window.title, VERSION),
        window_width: cfg.window.width as i32,
        window_height: cfg.window.height as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Map a binding name onto a macroquad key
fn key_code(name: &str) -> Option<KeyCode> {
    let code = match name {
        "A" => KeyCode::A,
        "B" => KeyCode::B,
        "C" => KeyCode::C,
        "D" => KeyCode::D,
        "E" => KeyCode::E,
        "F" => KeyCode::F,
        "G" => KeyCode::G,
        "H" => KeyCode::H,
        "I" => KeyCode::I,
        "J" => KeyCode::J,
        "K" => KeyCode::K,
        "L" => KeyCode::L,
        "M" => KeyCode::M,
        "N" => KeyCode::N,
        "O" => KeyCode::O,
        "P" => KeyCode::P,
        "Q" => KeyCode::Q,
        "R" => KeyCode::R,
        "S" => KeyCode::S,
        "T" => KeyCode::T,
        "U" => KeyCode::U,
        "V" => KeyCode::V,
        "W" => KeyCode::W,
        "X" => KeyCode::X,
        "Y" => KeyCode::Y,
        "Z" => KeyCode::Z,
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Space" => KeyCode::Space,
        "LeftShift" => KeyCode::LeftShift,
        "RightShift" => KeyCode::RightShift,
        "LeftControl" => KeyCode::LeftControl,
        "RightControl" => KeyCode::RightControl,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "F1" => KeyCode::F1,
        "F2" => KeyCode::F2,
        "F11" => KeyCode::F11,
        "F12" => KeyCode::F12,
        _ => return None,
    };
    Some(code)
}

/// Bindings resolved to key codes; unknown names stay unbound
struct Keys {
    throttle_up: Option<KeyCode>,
    throttle_down: Option<KeyCode>,
    pitch_up: Option<KeyCode>,
    pitch_down: Option<KeyCode>,
    roll_left: Option<KeyCode>,
    roll_right: Option<KeyCode>,
    yaw_left: Option<KeyCode>,
    yaw_right: Option<KeyCode>,
    brakes: Option<KeyCode>,
    toggle_fog: Option<KeyCode>,
    screenshot: Option<KeyCode>,
    nudge_forward: Option<KeyCode>,
    nudge_backward: Option<KeyCode>,
    nudge_left: Option<KeyCode>,
    nudge_right: Option<KeyCode>,
}

impl Keys {
    fn new(bindings: &KeyBindings) -> Self {
        let resolve = |name: &str| {
            let code = key_code(name);
            if code.is_none() {
                log::warn!("unknown key name {:?}, leaving it unbound", name);
            }
            code
        };
        Self {
            throttle_up: resolve(&bindings.throttle_up),
            throttle_down: resolve(&bindings.throttle_down),
            pitch_up: resolve(&bindings.pitch_up),
            pitch_down: resolve(&bindings.pitch_down),
            roll_left: resolve(&bindings.roll_left),
            roll_right: resolve(&bindings.roll_right),
            yaw_left: resolve(&bindings.yaw_left),
            yaw_right: resolve(&bindings.yaw_right),
            brakes: resolve(&bindings.brakes),
            toggle_fog: resolve(&bindings.toggle_fog),
            screenshot: resolve(&bindings.screenshot),
            nudge_forward: resolve(&bindings.nudge_forward),
            nudge_backward: resolve(&bindings.nudge_backward),
            nudge_left: resolve(&bindings.nudge_left),
            nudge_right: resolve(&bindings.nudge_right),
        }
    }

    /// Held state of every flight control
    fn poll(&self) -> ControlState {
        let down = |k: Option<KeyCode>| k.map(is_key_down).unwrap_or(false);
        ControlState {
            throttle_up: down(self.throttle_up),
            throttle_down: down(self.throttle_down),
            pitch_up: down(self.pitch_up),
            pitch_down: down(self.pitch_down),
            roll_left: down(self.roll_left),
            roll_right: down(self.roll_right),
            yaw_left: down(self.yaw_left),
            yaw_right: down(self.yaw_right),
            brakes: down(self.brakes),
        }
    }

    fn pressed(k: Option<KeyCode>) -> bool {
        k.map(is_key_pressed).unwrap_or(false)
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let cfg = config();
    println!("=== Skyraster v{} ===", VERSION);

    let LoadedScene { mut scene, airplane: airplane_index, props } = cfg.build_scene();
    if airplane_index.is_none() {
        log::warn!("airplane mesh missing, flying without a visible model");
    }

    let mut airplane = Airplane::new(cfg.airplane.params, cfg.airplane.physics, cfg.airplane.object.position);
    let mut camera = cfg.camera.build();
    let mut orbit = cfg.camera.follow.then(|| cfg.orbit.clone());
    if let Some(orbit) = &orbit {
        orbit.track(&mut camera, airplane.physics.position);
    }

    let mut renderer = Renderer::new(cfg.render_settings());
    let mut fb = Framebuffer::new(cfg.window.width.max(1), cfg.window.height.max(1));
    let mut snapshot = FrameSnapshot::default();
    let keys = Keys::new(&cfg.keys);

    let mut control_ticks = Ticker::new(cfg.timing.controls_ms, cfg.timing.max_catch_up);
    let mut physics_ticks = Ticker::new(cfg.timing.physics_ms, cfg.timing.max_catch_up);
    let mut render_ticks = Ticker::new(cfg.timing.render_ms, cfg.timing.max_catch_up);

    let mut texture: Option<Texture2D> = None;
    let mut last_update: Option<FlightUpdate> = None;
    let mut last_mouse = mouse_position();
    let mut screenshots = 0u32;
    let mut frames = 0u64;

    loop {
        let delta = get_frame_time() as f64;

        if Keys::pressed(keys.toggle_fog) {
            let on = renderer.toggle_fog();
            log::info!("fog {}", if on { "on" } else { "off" });
        }

        // Mouse drag orbits, wheel zooms
        let mouse = mouse_position();
        if let Some(orbit) = orbit.as_mut() {
            if is_mouse_button_down(MouseButton::Left) {
                orbit.rotate((mouse.0 - last_mouse.0) as f64, (mouse.1 - last_mouse.1) as f64);
            }
            let wheel = mouse_wheel().1;
            if wheel != 0.0 {
                orbit.zoom(wheel.signum() as f64);
            }
        }
        last_mouse = mouse;

        // Debug moves for the first prop
        if let Some(obj) = props.first().and_then(|&i| scene.object_mut(i)) {
            let before = obj.position();
            if Keys::pressed(keys.nudge_forward) {
                obj.forward_control();
            }
            if Keys::pressed(keys.nudge_backward) {
                obj.backward_control();
            }
            if Keys::pressed(keys.nudge_left) {
                obj.left_control();
            }
            if Keys::pressed(keys.nudge_right) {
                obj.right_control();
            }
            if obj.position() != before {
                log::debug!("{} moved to {:?}", obj.name, obj.position());
            }
        }

        let controls = keys.poll();
        for _ in 0..control_ticks.advance(delta) {
            airplane.apply_controls(&controls);
        }

        for _ in 0..physics_ticks.advance(delta) {
            let update = airplane.tick();
            if let Some(index) = airplane_index {
                scene.set_transform(index, update.position, update.rotation);
            }
            if let Some(orbit) = &orbit {
                orbit.track(&mut camera, update.position);
            }
            last_update = Some(update);
        }

        // Render ticks due in the same display frame would produce the same image
        if render_ticks.advance(delta) > 0 || texture.is_none() {
            scene.snapshot_into(&mut snapshot);
            let stats = renderer.render(&mut fb, &snapshot, &camera);
            frames += 1;
            log::trace!("frame {}: {:?}", frames, stats);

            let tex = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.to_rgba8());
            tex.set_filter(FilterMode::Nearest);
            texture = Some(tex);
        }

        if Keys::pressed(keys.screenshot) {
            screenshots += 1;
            let path = PathBuf::from(format!("skyraster_{:03}.png", screenshots));
            match fb.save_png(&path) {
                Ok(()) => log::info!("saved {}", path.display()),
                Err(e) => log::error!("screenshot failed: {}", e),
            }
        }

        clear_background(BLACK);
        if let Some(tex) = &texture {
            draw_texture_ex(
                tex,
                0.0,
                0.0,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(Vec2::new(screen_width(), screen_height())),
                    ..Default::default()
                },
            );
        }

        if let Some(update) = &last_update {
            let speed = update.velocity.len();
            let altitude = update.position.y - cfg.airplane.physics.ground_level;
            draw_text(
                &format!(
                    "Throttle: {:.0}% | Altitude: {:.0} | Speed: {:.1}{}",
                    update.throttle,
                    altitude,
                    speed,
                    if update.grounded { " | On ground" } else { "" }
                ),
                10.0,
                20.0,
                20.0,
                Color::from_rgba(20, 20, 40, 255),
            );
        }

        next_frame().await;
    }
}
