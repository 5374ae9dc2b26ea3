//! Property-based tests for the slosh simulation using proptest
//!
//! These tests verify invariants hold across random frame timings and
//! steering sequences:
//! - No NaN values in the surface field or tilt state
//! - Surface heights stay bounded
//! - Droplet pool never exceeds its capacity
//! - Droplets stay inside the container

use liquid_slosh::consts::{MAX_DROPLETS, MAX_FRAME_DT};
use liquid_slosh::sim::{Controls, SimulationState, SteeringVector, TickInput, step};
use proptest::prelude::*;

// Generous ceiling; the forced surface settles well below this
const MAX_EXPECTED_HEIGHT: f32 = 50.0;

fn frame_strategy() -> impl Strategy<Value = (f32, f32, f32)> {
    (0.001f32..=MAX_FRAME_DT, -1.0f32..=1.0, -1.0f32..=1.0)
}

fn controls_strategy() -> impl Strategy<Value = Controls> {
    (0.0f32..=1.0, 0.0f32..=1.0, 0.5f32..=2.5).prop_map(|(strength, fill, sensitivity)| Controls {
        strength,
        fill,
        sensitivity,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_surface_stays_bounded(
        seed in any::<u64>(),
        controls in controls_strategy(),
        frames in prop::collection::vec(frame_strategy(), 1..600),
    ) {
        let mut state = SimulationState::new(seed);
        for (dt, sx, sy) in frames {
            let input = TickInput {
                steering: SteeringVector::new(sx, sy),
                controls,
            };
            step(&mut state, &input, dt);

            for h in state.surface.heights() {
                prop_assert!(h.is_finite(), "non-finite height at frame {}", state.frame);
                prop_assert!(
                    h.abs() < MAX_EXPECTED_HEIGHT,
                    "height {} exceeded bound at frame {}",
                    h,
                    state.frame
                );
            }
            prop_assert!(state.surface.velocities().iter().all(|v| v.is_finite()));
            prop_assert!(state.tilt.angle_deg.is_finite());
            prop_assert!(state.tilt.angle_velocity.is_finite());
        }
    }

    #[test]
    fn prop_droplets_capped_and_contained(
        seed in any::<u64>(),
        frames in prop::collection::vec(frame_strategy(), 1..400),
    ) {
        let mut state = SimulationState::new(seed);
        let controls = Controls { strength: 1.0, ..Controls::default() };
        // Hard left/right flicks force bursts
        for (i, (dt, _, sy)) in frames.into_iter().enumerate() {
            let sx = if i % 6 < 3 { 1.0 } else { -1.0 };
            let input = TickInput {
                steering: SteeringVector::new(sx, sy),
                controls,
            };
            step(&mut state, &input, dt);

            prop_assert!(state.droplets.len() <= MAX_DROPLETS);
            let margin = state.tuning.droplets.bounds_margin;
            let width = state.container.width;
            let height = state.container.height;
            for d in state.droplets.iter() {
                prop_assert!(d.pos.is_finite() && d.vel.is_finite());
                prop_assert!(d.life > 0.0 && d.life <= 1.0);
                prop_assert!(d.pos.x >= -margin && d.pos.x <= width + margin);
                prop_assert!(d.pos.y <= height + margin);
            }
        }
    }

    #[test]
    fn prop_degenerate_controls_do_not_diverge(
        seed in any::<u64>(),
        strength in prop_oneof![Just(0.0f32), Just(1.0f32), Just(f32::NAN)],
        sensitivity in prop_oneof![Just(0.0f32), Just(2.5f32), Just(1000.0f32)],
    ) {
        let mut state = SimulationState::new(seed);
        let controls = Controls { strength, fill: 0.5, sensitivity };
        for i in 0..300 {
            let sx = if (i / 20) % 2 == 0 { 1.0 } else { -1.0 };
            let input = TickInput {
                steering: SteeringVector::new(sx, 0.0),
                controls,
            };
            step(&mut state, &input, MAX_FRAME_DT);
        }
        prop_assert!(state.surface.max_abs_height().is_finite());
        prop_assert!(state.surface.max_abs_height() < MAX_EXPECTED_HEIGHT);
    }
}
