//! Liquid Slosh - liquid in a bottle that sloshes, ripples and splashes
//!
//! Core modules:
//! - `sim`: Slosh simulation (surface field, tilt dynamics, droplets)
//! - `session`: Input → step → audio routing for one running bottle
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Input normalization and browser permissions
//! - `audio`: Web Audio splash voices
//! - `settings`: User preferences
//! - `tuning`: Data-driven simulation constants

pub mod audio;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use session::{ImpactSink, NullSink, Session};
pub use settings::Settings;
pub use tuning::Tuning;

/// Simulation configuration constants
pub mod consts {
    /// Surface field sample count
    pub const SURFACE_POINTS: usize = 64;
    /// Droplet pool capacity
    pub const MAX_DROPLETS: usize = 40;

    /// Longest step taken per frame (seconds); longer gaps are dropped
    pub const MAX_FRAME_DT: f32 = 0.033;

    /// Pointer idle time before steering starts drifting back to centre (ms)
    pub const IDLE_DELAY_MS: f64 = 180.0;
    /// Per-frame steering decay once idle
    pub const IDLE_DECAY: f32 = 0.94;

    /// Container size used until the host reports one (CSS px)
    pub const DEFAULT_CONTAINER_WIDTH: f32 = 320.0;
    pub const DEFAULT_CONTAINER_HEIGHT: f32 = 480.0;
}
