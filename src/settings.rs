//! User-facing slosh settings
//!
//! Mirrors the control panel sliders. Persisted in LocalStorage; simulation
//! state never is. The sound toggle lives on the audio sink, since browsers
//! need a fresh gesture to start audio on every visit.

use serde::{Deserialize, Serialize};

use crate::sim::Controls;

/// Live user parameters (slider units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Slosh strength (0 - 100)
    pub strength: f32,
    /// Fill level (0 - 100 percent of the bottle)
    pub fill: f32,
    /// Steering sensitivity (0 - 100, maps to a 0.5x - 2.5x gain)
    pub sensitivity: f32,
    /// Liquid colour as `#rrggbb`
    pub liquid_color: String,

    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strength: 60.0,
            fill: 55.0,
            sensitivity: 25.0,
            liquid_color: "#3aa0ff".to_string(),
            master_volume: 1.0,
        }
    }
}

impl Settings {
    /// Steering gain at the bottom of the sensitivity slider
    pub const MIN_SENSITIVITY_GAIN: f32 = 0.5;
    /// Steering gain at the top of the sensitivity slider
    pub const MAX_SENSITIVITY_GAIN: f32 = 2.5;

    /// Clamp every value into its slider range.
    ///
    /// NaN falls back to the default; an unparseable colour is replaced too.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let slider = |v: f32, fallback: f32| if v.is_nan() { fallback } else { v.clamp(0.0, 100.0) };
        Self {
            strength: slider(self.strength, d.strength),
            fill: slider(self.fill, d.fill),
            sensitivity: slider(self.sensitivity, d.sensitivity),
            liquid_color: if crate::renderer::Rgb::from_hex(&self.liquid_color).is_some() {
                self.liquid_color.clone()
            } else {
                d.liquid_color
            },
            master_volume: if self.master_volume.is_nan() {
                d.master_volume
            } else {
                self.master_volume.clamp(0.0, 1.0)
            },
        }
    }

    /// Steering gain for the sensitivity slider
    pub fn sensitivity_gain(&self) -> f32 {
        let t = (self.sensitivity / 100.0).clamp(0.0, 1.0);
        Self::MIN_SENSITIVITY_GAIN + t * (Self::MAX_SENSITIVITY_GAIN - Self::MIN_SENSITIVITY_GAIN)
    }

    /// Normalized per-frame controls for the stepper
    pub fn controls(&self) -> Controls {
        Controls {
            strength: self.strength / 100.0,
            fill: self.fill / 100.0,
            sensitivity: self.sensitivity_gain(),
        }
        .clamped()
    }

    /// Parse settings JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => Some(settings.sanitized()),
            Err(e) => {
                log::warn!("Ignoring invalid settings: {}", e);
                None
            }
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "liquid_slosh_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Could not save settings");
                }
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
