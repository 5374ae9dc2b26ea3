//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (pointer, device orientation, keyboard)
//! - Device orientation permission

pub mod input;
pub mod orientation;

pub use input::{ControlMode, InputNormalizer};
pub use orientation::OrientationPermission;
