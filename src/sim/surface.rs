//! Liquid free surface as a 1-D damped spring network
//!
//! Each sample point carries a height (displacement from the rest line, screen
//! down is positive) and a vertical velocity. Sample 0 sits on the left wall and
//! sample N-1 on the right wall; the walls are where tilt forcing enters.

use rand::Rng;

use crate::tuning::SurfaceTuning;

/// Shape parameters for height queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrestShape {
    /// Multiplier applied to the interpolated height
    pub amplitude: f32,
    /// 0 = undistorted, 1 = fully crest-shaped
    pub activity: f32,
    /// Shaping exponent (< 1 fattens crests)
    pub exponent: f32,
}

impl CrestShape {
    /// Undistorted, unscaled heights
    pub const FLAT: CrestShape = CrestShape {
        amplitude: 1.0,
        activity: 0.0,
        exponent: 1.0,
    };
}

/// Exaggerate crests in proportion to `activity`.
///
/// Odd in `value`, so mirrored surfaces stay mirrored.
#[inline]
pub fn crest(value: f32, activity: f32, exponent: f32) -> f32 {
    let a = value.abs();
    if a == 0.0 {
        return 0.0;
    }
    let shaped = a.powf(exponent);
    (a + (shaped - a) * activity).copysign(value)
}

/// Height/velocity samples evenly spaced across the container
#[derive(Debug, Clone)]
pub struct SurfaceField {
    heights: Vec<f32>,
    velocities: Vec<f32>,
}

impl SurfaceField {
    /// Create a flat field with `points` samples (at least 2)
    pub fn new(points: usize) -> Self {
        let points = if points < 2 {
            log::warn!("Surface field needs at least 2 points, got {}", points);
            2
        } else {
            points
        };
        Self {
            heights: vec![0.0; points],
            velocities: vec![0.0; points],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Always false; a field has at least two samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    /// Largest |height| across the field
    pub fn max_abs_height(&self) -> f32 {
        self.heights.iter().fold(0.0, |m, h| m.max(h.abs()))
    }

    /// Largest |velocity| across the field
    pub fn max_abs_velocity(&self) -> f32 {
        self.velocities.iter().fold(0.0, |m, v| m.max(v.abs()))
    }

    /// Advance the field by `dt` seconds.
    ///
    /// `edge_force` is injected anti-symmetrically: pushed into the left wall
    /// sample and pulled out of the right one. `damping` is the velocity decay
    /// rate (1/s); the exponential decay keeps large `dt * damping` stable.
    pub fn advance(&mut self, dt: f32, edge_force: f32, damping: f32, tuning: &SurfaceTuning) {
        let n = self.len();

        self.velocities[0] += edge_force * dt;
        self.velocities[n - 1] -= edge_force * dt;

        let decay = (-damping * dt).exp();
        for (h, v) in self.heights.iter_mut().zip(self.velocities.iter_mut()) {
            *v += -*h * tuning.tension * dt;
            *v *= decay;
            *h += *v * dt;
        }

        // Neighbour coupling; heights are fixed across passes, each pass adds
        // another round of velocity transfer.
        for _ in 0..tuning.diffusion_passes {
            for i in 1..n {
                let delta = (self.heights[i] - self.heights[i - 1]) * tuning.coupling * dt;
                self.velocities[i - 1] += delta;
                self.velocities[i] -= delta;
            }
        }
    }

    /// Fractional sample index for a position in [0, 1] (clamped)
    #[inline]
    fn index_for(&self, fraction: f32) -> f32 {
        let f = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        f * (self.len() - 1) as f32
    }

    /// Linearly interpolated raw height at `fraction` of the width
    pub fn raw_height_at(&self, fraction: f32) -> f32 {
        let idx = self.index_for(fraction);
        let i0 = (idx.floor() as usize).min(self.len() - 1);
        let i1 = (i0 + 1).min(self.len() - 1);
        let t = idx - i0 as f32;
        self.heights[i0] * (1.0 - t) + self.heights[i1] * t
    }

    /// Interpolated, amplitude-scaled, crest-shaped height at `fraction`.
    ///
    /// Pure query; both droplet collision and drawing go through it.
    pub fn height_at(&self, fraction: f32, shape: CrestShape) -> f32 {
        let disp = self.raw_height_at(fraction) * shape.amplitude;
        crest(disp, shape.activity, shape.exponent)
    }

    /// Shaped height of sample `index` (used to draw the curve point by point)
    pub fn sample_height(&self, index: usize, shape: CrestShape) -> f32 {
        let h = self.heights[index.min(self.len() - 1)] * shape.amplitude;
        crest(h, shape.activity, shape.exponent)
    }

    /// Kick the samples around `fraction` with randomly signed velocity.
    ///
    /// Power is clamped into the tuning range; non-positive power does nothing.
    pub fn inject_impulse<R: Rng + ?Sized>(
        &mut self,
        fraction: f32,
        power: f32,
        tuning: &SurfaceTuning,
        rng: &mut R,
    ) {
        if power.is_nan() || power <= 0.0 {
            return;
        }
        let p = power.clamp(tuning.impulse_min_power, tuning.impulse_max_power);
        let center = self.index_for(fraction).round() as isize;
        let radius = tuning.impulse_radius as isize;
        let span = (radius + 1) as f32;

        for k in -radius..=radius {
            let i = center + k;
            if i < 0 || i >= self.len() as isize {
                continue;
            }
            let falloff = 1.0 - k.abs() as f32 / span;
            let sign = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
            self.velocities[i as usize] += p * falloff * sign;
        }
    }

    /// Overwrite a sample (test and debug helper)
    pub fn set_sample(&mut self, index: usize, height: f32, velocity: f32) {
        if index < self.len() {
            self.heights[index] = height;
            self.velocities[index] = velocity;
        }
    }
}
