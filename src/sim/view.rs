//! Read-only snapshot of a completed step for drawing

use glam::Vec2;

use super::state::{Controls, SimulationState};

/// Velocity-stretched droplet ellipse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropletSprite {
    pub pos: Vec2,
    pub radius: f32,
    /// 0..1, from speed
    pub stretch: f32,
    /// Semi-axis along the direction of travel
    pub length: f32,
    /// Semi-axis across it
    pub width: f32,
    /// Direction of travel (radians)
    pub angle: f32,
}

impl DropletSprite {
    /// Speed at which a droplet reaches full stretch (px/s)
    pub const FULL_STRETCH_SPEED: f32 = 900.0;

    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        let stretch = (vel.length() / Self::FULL_STRETCH_SPEED).clamp(0.0, 1.0);
        Self {
            pos,
            radius,
            stretch,
            length: radius * (1.0 + 2.2 * stretch),
            width: radius * (1.0 - 0.25 * stretch),
            angle: vel.y.atan2(vel.x),
        }
    }
}

/// Everything the renderer needs for one frame, in container pixels
#[derive(Debug, Clone, Default)]
pub struct FrameView {
    pub width: f32,
    pub height: f32,
    /// Rest line of the liquid
    pub base_y: f32,
    /// One point per surface sample, left to right
    pub points: Vec<Vec2>,
    pub droplets: Vec<DropletSprite>,
    /// Crest activity (0..1)
    pub activity: f32,
}

impl FrameView {
    /// Amplitude of the cosmetic travelling ripple at full activity (px)
    pub const RIPPLE_AMPLITUDE: f32 = 1.4;

    /// Build the view. `time_ms` only drives the cosmetic ripple.
    pub fn capture(state: &SimulationState, controls: &Controls, time_ms: f64) -> Self {
        let controls = controls.clamped();
        let line = state.surface_line(&controls);
        let activity = line.shape().activity;
        let n = state.surface.len();
        let width = state.container.width;
        // Wrap the clock so the phase keeps f32 precision in long sessions
        let phase = ((time_ms * 0.01) % std::f64::consts::TAU) as f32;

        let points = (0..n)
            .map(|i| {
                let f = i as f32 / (n - 1) as f32;
                let ripple = (f * 6.0 * std::f32::consts::PI + phase).sin()
                    * Self::RIPPLE_AMPLITUDE
                    * activity;
                Vec2::new(f * width, line.y_at_sample(i) + ripple)
            })
            .collect();

        let droplets = state
            .droplets
            .iter()
            .map(|d| DropletSprite::new(d.pos, d.vel, d.radius))
            .collect();

        Self {
            width,
            height: state.container.height,
            base_y: line.base_y,
            points,
            droplets,
            activity,
        }
    }
}
