//! Slosh simulation
//!
//! All liquid behaviour lives here. This module must stay free of platform
//! and rendering dependencies:
//! - Explicitly owned state, no globals
//! - Seeded RNG only, so a seed replays the same run
//! - Every external parameter clamped on entry

pub mod droplet;
pub mod state;
pub mod surface;
pub mod tick;
pub mod tilt;
pub mod view;

pub use droplet::{Droplet, DropletPool, ImpactEvent, Side};
pub use state::{Container, Controls, SimulationState, SurfaceLine};
pub use surface::{CrestShape, SurfaceField, crest};
pub use tick::{StepReport, TickInput, step};
pub use tilt::{SteeringVector, TiltOutput, TiltState};
pub use view::{DropletSprite, FrameView};
