//! Simulation state and the types shared across the step
//!
//! Everything the stepper mutates lives in [`SimulationState`]; rendering and
//! audio only ever see it through shared references after a step completes.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::droplet::DropletPool;
use super::surface::{CrestShape, SurfaceField};
use super::tilt::TiltState;
use crate::consts::*;
use crate::tuning::Tuning;

/// Bottle interior in CSS pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub width: f32,
    pub height: f32,
}

impl Container {
    /// Non-finite or negative sizes collapse to zero
    pub fn new(width: f32, height: f32) -> Self {
        let fix = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            width: fix(width),
            height: fix(height),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_WIDTH, DEFAULT_CONTAINER_HEIGHT)
    }
}

/// Per-frame live parameters, already normalized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    /// Slosh strength (0..1)
    pub strength: f32,
    /// Fill level (0..1 of the container height)
    pub fill: f32,
    /// Steering gain (0.5..2.5)
    pub sensitivity: f32,
}

impl Controls {
    /// Clamp every field into its range; NaN falls back to the default
    pub fn clamped(self) -> Self {
        let d = Self::default();
        let fix = |v: f32, lo: f32, hi: f32, fallback: f32| {
            if v.is_nan() { fallback } else { v.clamp(lo, hi) }
        };
        Self {
            strength: fix(self.strength, 0.0, 1.0, d.strength),
            fill: fix(self.fill, 0.0, 1.0, d.fill),
            sensitivity: fix(self.sensitivity, 0.5, 2.5, d.sensitivity),
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            strength: 0.6,
            fill: 0.55,
            sensitivity: 1.0,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub surface: SurfaceField,
    pub tilt: TiltState,
    pub droplets: DropletPool,
    pub container: Container,
    pub tuning: Tuning,
    /// Spawn and impulse randomness
    pub rng: Pcg32,
    /// Simulated seconds
    pub time: f32,
    /// Completed steps
    pub frame: u64,
}

impl SimulationState {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            surface: SurfaceField::new(SURFACE_POINTS),
            tilt: TiltState::default(),
            droplets: DropletPool::new(tuning.droplets.max_droplets),
            container: Container::default(),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            frame: 0,
        }
    }

    /// Update the container size; surface samples keep their count
    pub fn resize(&mut self, width: f32, height: f32) {
        self.container = Container::new(width, height);
    }

    /// Crest shape for the current tilt activity and strength
    pub fn crest_shape(&self, controls: &Controls) -> CrestShape {
        crest_shape(&self.tilt, &self.tuning, controls)
    }

    /// Rest line of the liquid (px from the top of the container)
    pub fn base_y(&self, controls: &Controls) -> f32 {
        rest_y(self.container, &self.tilt, controls)
    }

    /// Surface line for the current state
    pub fn surface_line(&self, controls: &Controls) -> SurfaceLine<'_> {
        SurfaceLine::new(
            &self.surface,
            &self.tilt,
            &self.tuning,
            self.container,
            controls,
        )
    }

    /// Surface line at `fraction` of the width, in container pixels
    pub fn surface_y(&self, fraction: f32, controls: &Controls) -> f32 {
        self.surface_line(controls).y_at(fraction)
    }
}

fn rest_y(container: Container, tilt: &TiltState, controls: &Controls) -> f32 {
    container.height * (1.0 - controls.fill) + tilt.level_offset
}

fn crest_shape(tilt: &TiltState, tuning: &Tuning, controls: &Controls) -> CrestShape {
    CrestShape {
        amplitude: tuning.surface.amplitude_for(controls.strength),
        activity: tilt.activity(&tuning.tilt),
        exponent: tuning.surface.crest_exponent,
    }
}

/// The tilted, crest-shaped liquid line in container pixels.
///
/// Built from individual state fields so the droplet pool can be stepped
/// against it while the rest of the state is borrowed.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceLine<'a> {
    field: &'a SurfaceField,
    shape: CrestShape,
    /// Rest line y
    pub base_y: f32,
    /// Vertical drop across the full width due to tilt
    pub span: f32,
}

impl<'a> SurfaceLine<'a> {
    pub fn new(
        field: &'a SurfaceField,
        tilt: &TiltState,
        tuning: &Tuning,
        container: Container,
        controls: &Controls,
    ) -> Self {
        Self {
            field,
            shape: crest_shape(tilt, tuning, controls),
            base_y: rest_y(container, tilt, controls),
            span: container.width * tilt.slope() * tuning.tilt.slope_factor,
        }
    }

    #[inline]
    pub fn shape(&self) -> CrestShape {
        self.shape
    }

    /// Tilt contribution at `fraction`, zero at the centre
    #[inline]
    pub fn slope_offset(&self, fraction: f32) -> f32 {
        (fraction - 0.5) * self.span
    }

    /// y of the line at `fraction` of the width
    pub fn y_at(&self, fraction: f32) -> f32 {
        self.base_y + self.slope_offset(fraction) + self.field.height_at(fraction, self.shape)
    }

    /// y of the line above sample `index` (drawing path)
    pub fn y_at_sample(&self, index: usize) -> f32 {
        let n = self.field.len();
        let fraction = index.min(n - 1) as f32 / (n - 1) as f32;
        self.base_y + self.slope_offset(fraction) + self.field.sample_height(index, self.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_at_rest() {
        let state = SimulationState::new(42);
        assert_eq!(state.surface.len(), SURFACE_POINTS);
        assert_eq!(state.droplets.capacity(), MAX_DROPLETS);
        assert!(state.droplets.is_empty());
        assert_eq!(state.tilt, TiltState::default());
        assert_eq!(state.frame, 0);
    }

    #[test]
    fn test_base_y_tracks_fill_and_level() {
        let mut state = SimulationState::new(1);
        state.resize(200.0, 400.0);
        let controls = Controls {
            fill: 0.25,
            ..Controls::default()
        };
        assert_eq!(state.base_y(&controls), 300.0);
        state.tilt.level_offset = -4.0;
        assert_eq!(state.base_y(&controls), 296.0);
        // Spawning and collision read the same rest line
        assert_eq!(state.surface_line(&controls).base_y, state.base_y(&controls));
    }

    #[test]
    fn test_surface_y_flat_at_rest() {
        let mut state = SimulationState::new(1);
        state.resize(200.0, 400.0);
        let controls = Controls::default();
        let base = state.base_y(&controls);
        for f in [0.0, 0.3, 0.5, 1.0] {
            assert_eq!(state.surface_y(f, &controls), base);
        }
    }

    #[test]
    fn test_surface_y_slopes_with_tilt() {
        let mut state = SimulationState::new(1);
        state.resize(200.0, 400.0);
        state.tilt.angle_deg = 10.0;
        let controls = Controls::default();
        let left = state.surface_y(0.0, &controls);
        let right = state.surface_y(1.0, &controls);
        let expected = 200.0 * 10f32.to_radians().tan() * 0.34;
        assert!(right > left);
        assert!((right - left - expected).abs() < 1e-3);
        assert_eq!(state.surface_y(0.5, &controls), state.base_y(&controls));
    }

    #[test]
    fn test_controls_clamped() {
        let c = Controls {
            strength: 3.0,
            fill: -1.0,
            sensitivity: f32::NAN,
        }
        .clamped();
        assert_eq!(c.strength, 1.0);
        assert_eq!(c.fill, 0.0);
        assert_eq!(c.sensitivity, 1.0);
    }

    #[test]
    fn test_container_rejects_bad_sizes() {
        let c = Container::new(f32::INFINITY, -5.0);
        assert_eq!(c.width, 0.0);
        assert_eq!(c.height, 0.0);
    }
}
