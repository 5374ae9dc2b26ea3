//! Input normalization
//!
//! Pointer drags, device orientation and keyboard tilt are reduced to one
//! [`SteeringVector`]. Only the active [`ControlMode`] writes the vector; the
//! keyboard vector keeps smoothing in the background so switching modes does
//! not jump.

use std::collections::HashSet;

use crate::consts::{IDLE_DECAY, IDLE_DELAY_MS};
use crate::sim::SteeringVector;

/// Gamma (left/right, degrees) mapped to full steering
pub const GAMMA_RANGE_DEG: f32 = 35.0;
/// Beta (front/back, degrees) mapped to full steering
pub const BETA_RANGE_DEG: f32 = 45.0;
/// Per-frame approach rate of the keyboard vector toward its target
pub const KEYBOARD_SMOOTHING: f32 = 0.18;

/// Which source currently steers the bottle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    #[default]
    Pointer,
    Device,
    Keyboard,
}

impl ControlMode {
    /// Text for the mode label in the control panel
    pub fn label(&self) -> &'static str {
        match self {
            ControlMode::Pointer => "Mode: Pointer",
            ControlMode::Device => "Mode: Device Tilt",
            ControlMode::Keyboard => "Mode: Keyboard Tilt",
        }
    }
}

/// Direction a key contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyDir {
    Left,
    Right,
    Up,
    Down,
}

/// Arrow keys and WASD in either case
fn key_dir(key: &str) -> Option<KeyDir> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(KeyDir::Left),
        "ArrowRight" | "d" | "D" => Some(KeyDir::Right),
        "ArrowUp" | "w" | "W" => Some(KeyDir::Up),
        "ArrowDown" | "s" | "S" => Some(KeyDir::Down),
        _ => None,
    }
}

/// Whether the browser default for `key` (page scrolling) should be suppressed
pub fn is_arrow_key(key: &str) -> bool {
    matches!(key, "ArrowLeft" | "ArrowRight" | "ArrowUp" | "ArrowDown")
}

/// Reduces every input source to one steering vector
#[derive(Debug, Clone, Default)]
pub struct InputNormalizer {
    mode: ControlMode,
    /// Current steering before sensitivity
    steering: SteeringVector,
    /// Timestamp of the last pointer event (ms)
    last_pointer_ms: f64,
    device_tilt_enabled: bool,
    /// Keys currently held, by their `KeyboardEvent.key` value
    keys: HashSet<String>,
    /// Smoothed keyboard vector
    keyboard: SteeringVector,
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn steering(&self) -> SteeringVector {
        self.steering
    }

    pub fn device_tilt_enabled(&self) -> bool {
        self.device_tilt_enabled
    }

    pub fn set_mode(&mut self, mode: ControlMode) {
        if self.mode != mode {
            log::info!("{}", mode.label());
        }
        self.mode = mode;
    }

    fn set_from_pointer(&mut self, fx: f32, fy: f32, now_ms: f64) {
        self.steering = SteeringVector::new(fx * 2.0 - 1.0, fy * 2.0 - 1.0);
        self.last_pointer_ms = now_ms;
    }

    /// Pointer pressed at (`fx`, `fy`), fractions of the bottle rectangle.
    ///
    /// Always takes over steering.
    pub fn pointer_down(&mut self, fx: f32, fy: f32, now_ms: f64) {
        self.set_mode(ControlMode::Pointer);
        self.set_from_pointer(fx, fy, now_ms);
    }

    /// Pointer moved; ignored unless in pointer mode
    pub fn pointer_move(&mut self, fx: f32, fy: f32, now_ms: f64) {
        if self.mode != ControlMode::Pointer {
            return;
        }
        self.set_from_pointer(fx, fy, now_ms);
    }

    /// Device orientation reading in degrees; missing axes count as level
    pub fn device_orientation(&mut self, gamma: Option<f64>, beta: Option<f64>) {
        if !self.device_tilt_enabled || self.mode != ControlMode::Device {
            return;
        }
        let g = gamma.unwrap_or(0.0) as f32 / GAMMA_RANGE_DEG;
        let b = beta.unwrap_or(0.0) as f32 / BETA_RANGE_DEG;
        self.steering = SteeringVector::new(g, b);
    }

    /// Record a negotiated orientation permission; enabling switches to device mode
    pub fn set_device_tilt_enabled(&mut self, enabled: bool) {
        self.device_tilt_enabled = enabled;
        if enabled {
            self.set_mode(ControlMode::Device);
        }
    }

    pub fn key_down(&mut self, key: &str) {
        self.keys.insert(key.to_string());
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.remove(key);
    }

    /// Drop every held key (focus lost)
    pub fn release_all_keys(&mut self) {
        self.keys.clear();
    }

    /// Tilt-mode button: keyboard <-> pointer
    pub fn toggle_keyboard_mode(&mut self) {
        let next = if self.mode == ControlMode::Keyboard {
            ControlMode::Pointer
        } else {
            ControlMode::Keyboard
        };
        self.set_mode(next);
    }

    /// Target the held keys point to, each axis in {-1, 0, 1}
    fn keyboard_target(&self) -> SteeringVector {
        let held = |dir: KeyDir| self.keys.iter().any(|k| key_dir(k) == Some(dir));
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
        SteeringVector {
            x: axis(held(KeyDir::Right), held(KeyDir::Left)),
            y: axis(held(KeyDir::Down), held(KeyDir::Up)),
        }
    }

    /// Per-frame update: idle return-to-centre, keyboard smoothing.
    ///
    /// Returns the steering vector to feed the stepper this frame.
    pub fn resolve(&mut self, now_ms: f64) -> SteeringVector {
        if self.mode == ControlMode::Pointer && now_ms - self.last_pointer_ms > IDLE_DELAY_MS {
            self.steering.x *= IDLE_DECAY;
            self.steering.y *= IDLE_DECAY;
        }

        let target = self.keyboard_target();
        self.keyboard.x += (target.x - self.keyboard.x) * KEYBOARD_SMOOTHING;
        self.keyboard.y += (target.y - self.keyboard.y) * KEYBOARD_SMOOTHING;
        if self.mode == ControlMode::Keyboard {
            self.steering = self.keyboard;
        }

        self.steering = self.steering.clamped();
        self.steering
    }
}
