//! Histogram WASM bindings.
//!
//! The curve editor draws the intensity histogram behind the curve, the
//! widget editor draws the joint (intensity, gradient) histogram.

use volumetf_core::histogram::{IntensityHistogram, JointHistogram, HISTOGRAM_BINS};
use wasm_bindgen::prelude::*;

/// Intensity histogram accessible from JavaScript.
///
/// # Example (TypeScript)
/// ```typescript
/// const hist = session.histogram();
/// const heights = hist.normalized(true);  // Float32Array[256], log scaled
/// hist.free();
/// ```
#[wasm_bindgen]
pub struct JsHistogram {
    inner: IntensityHistogram,
}

impl From<IntensityHistogram> for JsHistogram {
    fn from(inner: IntensityHistogram) -> Self {
        Self { inner }
    }
}

#[wasm_bindgen]
impl JsHistogram {
    /// Raw bin counts (256 bins over [0, 255]).
    pub fn bins(&self) -> Vec<u32> {
        self.inner.bins.to_vec()
    }

    /// Tallest bin, for normalizing the display.
    #[wasm_bindgen(getter)]
    pub fn max_value(&self) -> u32 {
        self.inner.max_count()
    }

    /// Bin heights scaled into [0, 1], optionally log1p compressed.
    pub fn normalized(&self, log: bool) -> Vec<f32> {
        self.inner.normalized(log)
    }
}

/// Joint intensity/gradient histogram, row-major by gradient.
#[wasm_bindgen]
pub struct JsJointHistogram {
    inner: JointHistogram,
}

impl From<JointHistogram> for JsJointHistogram {
    fn from(inner: JointHistogram) -> Self {
        Self { inner }
    }
}

#[wasm_bindgen]
impl JsJointHistogram {
    /// Side length of the square grid.
    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        HISTOGRAM_BINS
    }

    #[wasm_bindgen(getter)]
    pub fn max_value(&self) -> u32 {
        self.inner.max_count()
    }

    /// Cell heights scaled into [0, 1], ready for an image texture.
    pub fn normalized(&self, log: bool) -> Vec<f32> {
        self.inner.normalized(log)
    }
}

/// Histogram of already-normalized intensities in [0, 255].
#[wasm_bindgen]
pub fn compute_histogram(intensity: &[f32]) -> JsHistogram {
    IntensityHistogram::compute(intensity).into()
}
