//! Data-driven simulation constants
//!
//! The tension, damping and coupling values were tuned by eye for a plausible
//! slosh, not derived from a physical model. They live here so they can be
//! adjusted (and checked against the stability tests) without touching the
//! integrators.

use serde::{Deserialize, Serialize};

/// Surface field spring network constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceTuning {
    /// Restoring spring constant pulling each sample back to rest
    pub tension: f32,
    /// Velocity decay rate (1/s) at zero strength
    pub base_damping: f32,
    /// How much full strength reduces the decay rate
    pub strength_damping_relief: f32,
    /// Neighbour coupling constant for the diffusion passes
    pub coupling: f32,
    /// Number of diffusion passes per step
    pub diffusion_passes: u32,
    /// Exponent used by crest shaping (< 1 fattens crests)
    pub crest_exponent: f32,
    /// Base visual amplitude multiplier
    pub base_amplitude: f32,
    /// Raw strength (0-100) divided by this is added to the amplitude
    pub amplitude_strength_divisor: f32,
    /// Impact impulse power range
    pub impulse_min_power: f32,
    pub impulse_max_power: f32,
    /// Impulse spreads to +/- this many neighbouring samples
    pub impulse_radius: usize,
}

impl Default for SurfaceTuning {
    fn default() -> Self {
        Self {
            tension: 95.0,
            base_damping: 5.1,
            strength_damping_relief: 1.2,
            coupling: 20.0,
            diffusion_passes: 2,
            crest_exponent: 0.85,
            base_amplitude: 0.85,
            amplitude_strength_divisor: 120.0,
            impulse_min_power: 0.6,
            impulse_max_power: 4.0,
            impulse_radius: 2,
        }
    }
}

impl SurfaceTuning {
    /// Effective damping rate for a strength in 0..1
    #[inline]
    pub fn damping_for(&self, strength: f32) -> f32 {
        (self.base_damping - strength * self.strength_damping_relief).max(0.0)
    }

    /// Visual amplitude multiplier for a strength in 0..1
    #[inline]
    pub fn amplitude_for(&self, strength: f32) -> f32 {
        self.base_amplitude + strength * 100.0 / self.amplitude_strength_divisor
    }
}

/// Container tilt oscillator constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltTuning {
    /// Spring constant toward the target angle
    pub stiffness: f32,
    /// Angular velocity damping
    pub damping: f32,
    /// Degrees of tilt per unit of steering at zero strength offset
    pub degrees_per_unit: f32,
    /// Strength offset added before scaling the target angle
    pub strength_offset: f32,
    /// Target tilt clamp (degrees)
    pub max_angle_deg: f32,
    /// Level offset (px) at full vertical steering
    pub level_range: f32,
    /// First-order relaxation rate of the level offset (1/s)
    pub level_rate: f32,
    /// Jerk clamp
    pub max_jerk: f32,
    /// Drive contribution per unit of angular velocity
    pub drive_per_angle_velocity: f32,
    /// Drive contribution per unit of jerk
    pub drive_per_jerk: f32,
    /// Drive clamp
    pub max_drive: f32,
    /// Edge force per unit of drive (before the strength factor)
    pub edge_force_gain: f32,
    /// Crest activity per unit of angular velocity
    pub activity_per_angle_velocity: f32,
    /// Slope factor applied to tan(angle) when projecting the surface
    pub slope_factor: f32,
}

impl Default for TiltTuning {
    fn default() -> Self {
        Self {
            stiffness: 9.5,
            damping: 2.9,
            degrees_per_unit: 16.0,
            strength_offset: 0.25,
            max_angle_deg: 20.0,
            level_range: 6.0,
            level_rate: 1.0,
            max_jerk: 14.0,
            drive_per_angle_velocity: 0.06,
            drive_per_jerk: 0.012,
            max_drive: 1.8,
            edge_force_gain: 30.0,
            activity_per_angle_velocity: 0.07,
            slope_factor: 0.34,
        }
    }
}

/// Droplet spawning and ballistic constants (pixels, seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropletTuning {
    /// Pool capacity
    pub max_droplets: usize,
    /// |jerk| above this may trigger a burst
    pub jerk_threshold: f32,
    /// Chance a qualifying frame actually spawns
    pub spawn_chance: f64,
    /// Burst size is floor(|jerk| - offset), capped at max_burst
    pub burst_offset: f32,
    pub max_burst: usize,
    /// Spawn inset from the wall (px)
    pub wall_inset: f32,
    /// Random vertical jitter above the surface at spawn (px)
    pub spawn_jitter: f32,
    /// Horizontal launch speed range (px/s) before the strength factor.
    ///
    /// Launch speeds, gravity and drag are all per-second forms of a 60 Hz
    /// per-frame model, so a droplet's arc does not depend on the frame rate.
    pub launch_vx_min: f32,
    pub launch_vx_range: f32,
    /// Vertical launch speed range (px/s) before the strength factor
    pub launch_vy_min: f32,
    pub launch_vy_range: f32,
    /// Radius range (px)
    pub radius_min: f32,
    pub radius_range: f32,
    /// Downward acceleration (px/s^2)
    pub gravity: f32,
    /// Velocity retained per 1/60 s
    pub air_drag: f32,
    /// Life lost per second
    pub life_decay: f32,
    /// Out-of-bounds margin (px)
    pub bounds_margin: f32,
    /// Impact speed divisor and power range
    pub impact_speed_scale: f32,
    pub impact_min_power: f32,
    pub impact_max_power: f32,
}

impl Default for DropletTuning {
    fn default() -> Self {
        Self {
            max_droplets: crate::consts::MAX_DROPLETS,
            jerk_threshold: 6.2,
            spawn_chance: 0.70,
            burst_offset: 5.5,
            max_burst: 4,
            wall_inset: 10.0,
            spawn_jitter: 10.0,
            launch_vx_min: 144.0,
            launch_vx_range: 192.0,
            launch_vy_min: 252.0,
            launch_vy_range: 276.0,
            radius_min: 2.1,
            radius_range: 1.3,
            gravity: 1550.0 * 60.0,
            air_drag: 0.985,
            life_decay: 0.45,
            bounds_margin: 40.0,
            impact_speed_scale: 700.0,
            impact_min_power: 0.8,
            impact_max_power: 3.2,
        }
    }
}

impl DropletTuning {
    /// Burst size for a jerk magnitude (0 when below threshold)
    pub fn burst_size(&self, jerk: f32) -> usize {
        let trigger = jerk.abs();
        if trigger <= self.jerk_threshold {
            return 0;
        }
        ((trigger - self.burst_offset).floor().max(0.0) as usize).min(self.max_burst)
    }
}

/// All simulation tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub surface: SurfaceTuning,
    pub tilt: TiltTuning,
    pub droplets: DropletTuning,
}

impl Tuning {
    /// Parse tuning overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(tuning) => Some(tuning),
            Err(e) => {
                log::warn!("Ignoring invalid tuning: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damping_reduced_by_strength() {
        let t = SurfaceTuning::default();
        assert!((t.damping_for(0.0) - 5.1).abs() < 1e-6);
        assert!((t.damping_for(1.0) - 3.9).abs() < 1e-5);
    }

    #[test]
    fn test_amplitude_tracks_raw_strength() {
        let t = SurfaceTuning::default();
        assert!((t.amplitude_for(0.0) - 0.85).abs() < 1e-6);
        assert!((t.amplitude_for(0.6) - (0.85 + 60.0 / 120.0)).abs() < 1e-5);
    }

    #[test]
    fn test_burst_size() {
        let t = DropletTuning::default();
        assert_eq!(t.burst_size(6.0), 0);
        assert_eq!(t.burst_size(6.2), 0);
        assert_eq!(t.burst_size(6.4), 0); // floor(0.9)
        assert_eq!(t.burst_size(-7.0), 1);
        assert_eq!(t.burst_size(8.6), 3);
        assert_eq!(t.burst_size(14.0), 4);
    }

    #[test]
    fn test_partial_overrides_keep_defaults() {
        let tuning = Tuning::from_json(r#"{"surface": {"diffusion_passes": 3}}"#).unwrap();
        assert_eq!(tuning.surface.diffusion_passes, 3);
        assert_eq!(tuning.surface.tension, 95.0);
        assert_eq!(tuning.tilt, TiltTuning::default());
        assert!(Tuning::from_json("not json").is_none());
    }
}
