//! Frame stepper
//!
//! Advances tilt, surface and droplets by one variable timestep, in that
//! order. Impacts are fed back into the surface inside the step and also
//! returned so the caller can route them to audio.

use rand::Rng;

use super::droplet::{ImpactEvent, Side};
use super::state::{Controls, SimulationState, SurfaceLine};
use super::tilt::SteeringVector;

/// Input for a single step
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Resolved steering (already idle-decayed)
    pub steering: SteeringVector,
    /// Live controls for this frame
    pub controls: Controls,
}

/// What happened during one step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Droplet/surface impacts, in pool order
    pub impacts: Vec<ImpactEvent>,
    /// Droplets admitted by a spawn burst this step
    pub spawned: usize,
    /// Clamped jerk seen by the tilt dynamics
    pub jerk: f32,
}

/// Advance the simulation by `dt` seconds.
///
/// Callers clamp `dt` to the frame cap; non-positive or non-finite values are
/// ignored and produce an empty report.
pub fn step(state: &mut SimulationState, input: &TickInput, dt: f32) -> StepReport {
    let mut report = StepReport::default();
    if !dt.is_finite() || dt <= 0.0 {
        return report;
    }
    let controls = input.controls.clamped();
    let strength = controls.strength;

    // Tilt/level
    let tilt_out = state.tilt.advance(
        dt,
        input.steering,
        strength,
        controls.sensitivity,
        &state.tuning.tilt,
    );
    report.jerk = tilt_out.jerk;

    // Surface, forced at the walls
    let edge_force = tilt_out.drive
        * state.tuning.tilt.edge_force_gain
        * (state.tuning.tilt.strength_offset + strength);
    let damping = state.tuning.surface.damping_for(strength);
    state
        .surface
        .advance(dt, edge_force, damping, &state.tuning.surface);

    // Post-advance surface line, shared by spawning and collision
    let line = SurfaceLine::new(
        &state.surface,
        &state.tilt,
        &state.tuning,
        state.container,
        &controls,
    );

    // Spawn trigger
    let burst = state.tuning.droplets.burst_size(tilt_out.jerk);
    if burst > 0 {
        if state.rng.random_bool(state.tuning.droplets.spawn_chance.clamp(0.0, 1.0)) {
            let side = Side::from_jerk(tilt_out.jerk);
            report.spawned = state.droplets.spawn(
                burst,
                side,
                line.base_y,
                state.container,
                strength,
                &state.tuning.droplets,
                &mut state.rng,
            );
            log::debug!(
                "Droplet burst: jerk={:.2} side={:?} admitted={}/{}",
                tilt_out.jerk,
                side,
                report.spawned,
                burst
            );
        }
    }

    report.impacts =
        state
            .droplets
            .advance(dt, state.container, &state.tuning.droplets, |f| line.y_at(f));

    for impact in &report.impacts {
        state.surface.inject_impulse(
            impact.fraction,
            impact.power,
            &state.tuning.surface,
            &mut state.rng,
        );
    }

    state.time += dt;
    state.frame += 1;
    report
}
