//! Container tilt and fill-level dynamics
//!
//! A damped second-order oscillator chases a target tilt angle derived from the
//! steering vector, so the bottle overshoots briefly and settles like a held
//! object. The same step produces the lateral jerk that drives edge forcing and
//! droplet ejection.

use serde::{Deserialize, Serialize};

use crate::tuning::TiltTuning;

/// Normalized steering input, both axes in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SteeringVector {
    pub x: f32,
    pub y: f32,
}

impl SteeringVector {
    pub const ZERO: SteeringVector = SteeringVector { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }.clamped()
    }

    /// Clamp both axes to [-1, 1]; non-finite components become 0
    pub fn clamped(self) -> Self {
        let fix = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        Self {
            x: fix(self.x),
            y: fix(self.y),
        }
    }

    /// Mirror across the vertical axis
    pub fn mirrored(self) -> Self {
        Self {
            x: -self.x,
            y: self.y,
        }
    }
}

/// Forcing terms produced by one tilt step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TiltOutput {
    /// Clamped edge forcing drive (before the strength factor)
    pub drive: f32,
    /// Clamped rate of change of steering x (1/s)
    pub jerk: f32,
}

/// Tilt angle, its rate, and the apparent fill-line offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TiltState {
    /// Container tilt (degrees, positive = clockwise on screen)
    pub angle_deg: f32,
    /// Degrees per second
    pub angle_velocity: f32,
    /// Fill line offset in pixels (screen down is positive)
    pub level_offset: f32,
    /// Scaled steering x from the previous step, for jerk
    pub previous_steering_x: f32,
}

impl TiltState {
    /// Advance one step.
    ///
    /// `strength` is 0..1 and `sensitivity` is the steering gain (0.5..2.5).
    pub fn advance(
        &mut self,
        dt: f32,
        steering: SteeringVector,
        strength: f32,
        sensitivity: f32,
        tuning: &TiltTuning,
    ) -> TiltOutput {
        let steering = steering.clamped();
        let x = (steering.x * sensitivity).clamp(-1.0, 1.0);
        let y = (steering.y * sensitivity).clamp(-1.0, 1.0);

        let target = (x * (tuning.strength_offset + strength) * tuning.degrees_per_unit)
            .clamp(-tuning.max_angle_deg, tuning.max_angle_deg);

        self.angle_velocity += ((target - self.angle_deg) * tuning.stiffness
            - self.angle_velocity * tuning.damping)
            * dt;
        self.angle_deg += self.angle_velocity * dt;

        let level_target = -y * tuning.level_range;
        self.level_offset += (level_target - self.level_offset) * (tuning.level_rate * dt);

        let jerk = ((x - self.previous_steering_x) / dt.max(0.001))
            .clamp(-tuning.max_jerk, tuning.max_jerk);
        self.previous_steering_x = x;

        let drive = (self.angle_velocity * tuning.drive_per_angle_velocity
            + jerk * tuning.drive_per_jerk)
            .clamp(-tuning.max_drive, tuning.max_drive);

        TiltOutput { drive, jerk }
    }

    /// Crest-shaping activity in [0, 1]
    #[inline]
    pub fn activity(&self, tuning: &TiltTuning) -> f32 {
        (self.angle_velocity.abs() * tuning.activity_per_angle_velocity).clamp(0.0, 1.0)
    }

    /// tan of the tilt angle
    #[inline]
    pub fn slope(&self) -> f32 {
        self.angle_deg.to_radians().tan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.016;

    #[test]
    fn test_steering_clamped() {
        let s = SteeringVector::new(3.0, -2.0);
        assert_eq!(s, SteeringVector { x: 1.0, y: -1.0 });
        let s = SteeringVector { x: f32::NAN, y: 0.5 }.clamped();
        assert_eq!(s, SteeringVector { x: 0.0, y: 0.5 });
    }

    #[test]
    fn test_tilt_overshoots_then_settles() {
        let tuning = TiltTuning::default();
        let mut tilt = TiltState::default();
        let steer = SteeringVector::new(1.0, 0.0);

        // strength 1.0 -> 1.25 * 16 = 20 degrees, right at the clamp
        let mut peak: f32 = 0.0;
        for _ in 0..(2.0 / DT) as usize {
            tilt.advance(DT, steer, 1.0, 1.0, &tuning);
            peak = peak.max(tilt.angle_deg);
        }
        assert!(peak > 20.0, "expected overshoot, peak = {}", peak);

        for _ in 0..(10.0 / DT) as usize {
            tilt.advance(DT, steer, 1.0, 1.0, &tuning);
        }
        assert!((tilt.angle_deg - 20.0).abs() < 0.05, "angle = {}", tilt.angle_deg);
        assert!(tilt.angle_velocity.abs() < 0.05);
    }

    #[test]
    fn test_target_angle_clamped() {
        let tuning = TiltTuning::default();
        let mut tilt = TiltState::default();
        // Huge sensitivity still cannot push past 20 degrees at rest
        for _ in 0..2000 {
            tilt.advance(DT, SteeringVector::new(-1.0, 0.0), 1.0, 2.5, &tuning);
        }
        assert!((tilt.angle_deg + 20.0).abs() < 0.01);
    }

    #[test]
    fn test_jerk_clamped_and_tracked() {
        let tuning = TiltTuning::default();
        let mut tilt = TiltState::default();
        let out = tilt.advance(DT, SteeringVector::new(1.0, 0.0), 0.5, 1.0, &tuning);
        assert_eq!(out.jerk, 14.0);
        assert_eq!(tilt.previous_steering_x, 1.0);

        let out = tilt.advance(DT, SteeringVector::new(1.0, 0.0), 0.5, 1.0, &tuning);
        assert_eq!(out.jerk, 0.0);

        let out = tilt.advance(DT, SteeringVector::new(0.9, 0.0), 0.5, 1.0, &tuning);
        assert!((out.jerk - (-0.1 / DT)).abs() < 1e-3);
    }

    #[test]
    fn test_zero_dt_does_not_divide_by_zero() {
        let tuning = TiltTuning::default();
        let mut tilt = TiltState::default();
        let out = tilt.advance(0.0, SteeringVector::new(0.5, 0.0), 0.5, 1.0, &tuning);
        assert!(out.jerk.is_finite());
        assert_eq!(out.jerk, 14.0);
    }

    #[test]
    fn test_drive_clamped() {
        let tuning = TiltTuning::default();
        let mut tilt = TiltState {
            angle_velocity: 500.0,
            ..Default::default()
        };
        let out = tilt.advance(DT, SteeringVector::new(1.0, 0.0), 1.0, 1.0, &tuning);
        assert_eq!(out.drive, 1.8);
    }

    #[test]
    fn test_level_relaxes_toward_vertical_steering() {
        let tuning = TiltTuning::default();
        let mut tilt = TiltState::default();
        for _ in 0..(10.0 / DT) as usize {
            tilt.advance(DT, SteeringVector::new(0.0, 1.0), 0.5, 1.0, &tuning);
        }
        assert!((tilt.level_offset + 6.0).abs() < 0.01);

        for _ in 0..(20.0 / DT) as usize {
            tilt.advance(DT, SteeringVector::ZERO, 0.5, 1.0, &tuning);
        }
        assert!(tilt.level_offset.abs() < 1e-3);
    }

    #[test]
    fn test_mirror_symmetry() {
        let tuning = TiltTuning::default();
        let mut a = TiltState::default();
        let mut b = TiltState::default();
        for i in 0..200 {
            let x = ((i as f32) * 0.13).sin();
            let sa = SteeringVector::new(x, 0.2);
            let oa = a.advance(DT, sa, 0.7, 1.3, &tuning);
            let ob = b.advance(DT, sa.mirrored(), 0.7, 1.3, &tuning);
            assert_eq!(oa.drive, -ob.drive);
            assert_eq!(oa.jerk, -ob.jerk);
            assert_eq!(a.angle_deg, -b.angle_deg);
            assert_eq!(a.angle_velocity, -b.angle_velocity);
            assert_eq!(a.level_offset, b.level_offset);
        }
    }

    #[test]
    fn test_activity_tracks_angle_velocity() {
        let tuning = TiltTuning::default();
        let tilt = TiltState {
            angle_velocity: -5.0,
            ..Default::default()
        };
        assert!((tilt.activity(&tuning) - 0.35).abs() < 1e-6);
        let fast = TiltState {
            angle_velocity: 100.0,
            ..Default::default()
        };
        assert_eq!(fast.activity(&tuning), 1.0);
    }
}
