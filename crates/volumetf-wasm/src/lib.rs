//! VolumeTF WASM - WebAssembly bindings for VolumeTF
//!
//! This crate exposes the volumetf-core editing session to a browser
//! front-end. The renderer and the canvas widgets live on the JS side; this
//! crate owns the model, turns DOM pointer events into edits and hands back
//! lookup tables.
//!
//! # Module Structure
//!
//! - `session` - `JsTfSession`, the editing session
//! - `histogram` - Intensity and joint histogram wrappers
//! - `logger` - `log` backend over the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsTfSession } from '@volumetf/wasm';
//!
//! await init();
//!
//! const session = new JsTfSession(intensity, gradient);
//! session.set_mode('widgets');
//! session.add_widget('gaussian', 'bone');
//! const lut = session.sample_lut();
//! ```

use wasm_bindgen::prelude::*;

mod histogram;
mod logger;
mod session;

pub use histogram::{compute_histogram, JsHistogram, JsJointHistogram};
pub use session::JsTfSession;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Info);
}

/// Raise or lower console log verbosity (`"error"` through `"trace"`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter: log::LevelFilter = level
        .parse()
        .map_err(|_| JsValue::from_str(&format!("Unknown log level '{}'", level)))?;
    logger::install(filter);
    Ok(())
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
