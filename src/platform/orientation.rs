//! Device orientation permission
//!
//! Some browsers (iOS Safari) gate `deviceorientation` events behind an
//! explicit, gesture-initiated permission prompt. Others deliver them freely.

/// Outcome of the one-shot permission negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationPermission {
    /// The user accepted the prompt
    Granted,
    /// The user refused, or the prompt failed
    Denied,
    /// No prompt exists; events arrive without asking
    Unsupported,
}

impl OrientationPermission {
    /// Map the string `DeviceOrientationEvent.requestPermission()` resolves to
    pub fn from_response(response: &str) -> Self {
        if response == "granted" {
            OrientationPermission::Granted
        } else {
            OrientationPermission::Denied
        }
    }

    /// Whether device tilt may be switched on
    pub fn allows_device_tilt(self) -> bool {
        matches!(
            self,
            OrientationPermission::Granted | OrientationPermission::Unsupported
        )
    }
}

/// Ask for orientation access (must run inside a user gesture handler)
#[cfg(target_arch = "wasm32")]
pub async fn request_orientation_permission() -> OrientationPermission {
    use wasm_bindgen::{JsCast, JsValue};

    let Some(window) = web_sys::window() else {
        return OrientationPermission::Denied;
    };
    let Ok(ctor) = js_sys::Reflect::get(&window, &JsValue::from_str("DeviceOrientationEvent"))
    else {
        return OrientationPermission::Unsupported;
    };
    if ctor.is_undefined() {
        return OrientationPermission::Unsupported;
    }
    let request = js_sys::Reflect::get(&ctor, &JsValue::from_str("requestPermission"))
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
    let Some(request) = request else {
        return OrientationPermission::Unsupported;
    };

    let promise = match request.call0(&ctor) {
        Ok(p) => js_sys::Promise::from(p),
        Err(e) => {
            log::warn!("Orientation permission request failed: {:?}", e);
            return OrientationPermission::Denied;
        }
    };
    match wasm_bindgen_futures::JsFuture::from(promise).await {
        Ok(response) => {
            let response = response.as_string().unwrap_or_default();
            log::info!("Orientation permission: {}", response);
            OrientationPermission::from_response(&response)
        }
        Err(e) => {
            log::warn!("Orientation permission rejected: {:?}", e);
            OrientationPermission::Denied
        }
    }
}
