//! Editing session WASM bindings.
//!
//! Pointer events arrive as primitives from DOM handlers and are translated
//! into core events. Model changes are pushed to an optional JS callback as
//! plain objects, for example `{ kind: "widgets", op: "added", index: 1 }`.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use volumetf_core::edit::{Button, CurveLayout, Modifiers, PointerEvent, TfChange};
use volumetf_core::widget::ParamValue;
use volumetf_core::{
    AxisScale, DataDrivenConfig, Rgb, ScreenPoint, TfMode, TfSession, UniformScan, ValueRange,
    Viewport, Volume, WidgetKind, WidgetSampling,
};
use wasm_bindgen::prelude::*;

use crate::histogram::{JsHistogram, JsJointHistogram};

fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

type Callback = Rc<RefCell<Option<js_sys::Function>>>;

fn deliver(callback: &Callback, change: &TfChange) {
    let Some(function) = callback.borrow().clone() else {
        return;
    };
    match serde_wasm_bindgen::to_value(change) {
        Ok(value) => {
            if let Err(e) = function.call1(&JsValue::NULL, &value) {
                log::warn!("change callback threw: {:?}", e);
            }
        }
        Err(e) => log::warn!("could not convert change: {}", e),
    }
}

fn button(code: u8) -> Button {
    match code {
        1 => Button::Middle,
        2 => Button::Secondary,
        _ => Button::Primary,
    }
}

fn press(x: f32, y: f32, code: u8, shift: bool, ctrl: bool, double_click: bool) -> PointerEvent {
    PointerEvent::Press {
        pos: ScreenPoint::new(x, y),
        button: button(code),
        modifiers: Modifiers { shift, ctrl },
        double_click,
    }
}

fn scroll(x: f32, y: f32, step: f32, shift: bool, ctrl: bool) -> PointerEvent {
    PointerEvent::Scroll {
        pos: ScreenPoint::new(x, y),
        step,
        modifiers: Modifiers { shift, ctrl },
    }
}

/// Transfer-function editing session.
///
/// # Example (TypeScript)
/// ```typescript
/// const session = new JsTfSession(intensity, gradient);
/// session.set_on_change((change) => renderer.update(change));
/// session.set_curve_viewport(canvas.width, canvas.height);
///
/// canvas.onmousedown = (e) =>
///   session.curve_press(e.offsetX, e.offsetY, e.button, e.shiftKey, e.ctrlKey, e.detail === 2);
///
/// const lut = session.sample_lut();  // Float32Array, 5 floats per entry
/// ```
#[wasm_bindgen]
pub struct JsTfSession {
    inner: TfSession,
    callback: Callback,
}

#[wasm_bindgen]
impl JsTfSession {
    /// Create a session from raw intensity and gradient arrays of equal length.
    ///
    /// # Errors
    /// Returns error on length mismatch or non-finite samples
    #[wasm_bindgen(constructor)]
    pub fn new(intensity: &[f32], gradient: &[f32]) -> Result<JsTfSession, JsValue> {
        let volume = Volume::from_raw(intensity, gradient).map_err(js_error)?;
        Ok(Self::with_volume(volume))
    }

    /// Create a session from arrays already normalized to [0, 255] plus the
    /// original value ranges.
    pub fn from_normalized(
        intensity: Vec<f32>,
        gradient: Vec<f32>,
        intensity_min: f32,
        intensity_max: f32,
        gradient_min: f32,
        gradient_max: f32,
    ) -> Result<JsTfSession, JsValue> {
        let volume = Volume::from_normalized(
            intensity,
            gradient,
            ValueRange::new(intensity_min, intensity_max),
            ValueRange::new(gradient_min, gradient_max),
        )
        .map_err(js_error)?;
        Ok(Self::with_volume(volume))
    }

    /// Register (or clear with `undefined`) the change callback.
    pub fn set_on_change(&mut self, callback: Option<js_sys::Function>) {
        *self.callback.borrow_mut() = callback;
    }

    /// Replace the dataset. Returns true when the widgets were reseeded.
    pub fn load_volume(&mut self, intensity: &[f32], gradient: &[f32]) -> Result<bool, JsValue> {
        let volume = Volume::from_raw(intensity, gradient).map_err(js_error)?;
        Ok(self.inner.load_volume(volume))
    }

    #[wasm_bindgen(getter)]
    pub fn sample_count(&self) -> usize {
        self.inner.volume().len()
    }

    // ------------------------------------------------------------------------
    // Mode and sampling
    // ------------------------------------------------------------------------

    /// `"curve"` or `"widgets"`.
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        match self.inner.mode() {
            TfMode::Curve => "curve".to_string(),
            TfMode::Widgets => "widgets".to_string(),
        }
    }

    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = match mode {
            "curve" => TfMode::Curve,
            "widgets" => TfMode::Widgets,
            other => return Err(js_error(format!("Unknown mode '{}'", other))),
        };
        self.inner.set_mode(mode);
        Ok(())
    }

    /// Sample widgets on a regular grid with `samples` gradient rows per column.
    pub fn use_uniform_sampling(&mut self, samples: usize) {
        self.inner
            .set_widget_sampling(WidgetSampling::Uniform(UniformScan::GradientScan { samples }));
    }

    /// Sample widgets at a seeded subsample of the dataset's voxels.
    pub fn use_data_driven_sampling(&mut self, max_points: usize, seed: u64, min_opacity: f32) {
        self.inner
            .set_widget_sampling(WidgetSampling::DataDriven(DataDrivenConfig {
                max_points,
                seed,
                min_opacity,
            }));
    }

    /// Current LUT as `[intensity, opacity, r, g, b]` per entry.
    pub fn sample_lut(&self) -> Vec<f32> {
        self.inner.sample_lut().flatten()
    }

    /// Current LUT opacities only (256 entries).
    pub fn lut_opacities(&self) -> Vec<f32> {
        self.inner.sample_lut().opacities()
    }

    /// Current LUT with intensities in the dataset's original value range.
    pub fn sample_lut_original(&self) -> Vec<f32> {
        self.inner
            .sample_lut_original()
            .iter()
            .flat_map(|e| [e.intensity, e.opacity, e.color.r, e.color.g, e.color.b])
            .collect()
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub fn set_curve_viewport(&mut self, width: f32, height: f32) {
        self.inner.set_curve_viewport(Viewport::new(width, height));
    }

    pub fn set_widget_viewport(&mut self, width: f32, height: f32) {
        self.inner.set_widget_viewport(Viewport::new(width, height));
    }

    pub fn set_log_axis(&mut self, log: bool) {
        let axis = if log { AxisScale::Log } else { AxisScale::Linear };
        self.inner.set_axis_scale(axis);
    }

    /// Switch the curve editor between the 1D and 2D layouts.
    pub fn set_two_d_layout(&mut self, two_d: bool) {
        let layout = if two_d {
            CurveLayout::TwoD
        } else {
            CurveLayout::OneD
        };
        self.inner.set_curve_layout(layout);
    }

    pub fn reset_views(&mut self) {
        self.inner.reset_views();
    }

    // ------------------------------------------------------------------------
    // Pointer events
    // ------------------------------------------------------------------------

    /// Button codes follow `MouseEvent.button`: 0 primary, 1 middle, 2 secondary.
    pub fn curve_press(
        &mut self,
        x: f32,
        y: f32,
        button: u8,
        shift: bool,
        ctrl: bool,
        double_click: bool,
    ) -> bool {
        self.inner
            .handle_curve_event(press(x, y, button, shift, ctrl, double_click))
    }

    pub fn curve_motion(&mut self, x: f32, y: f32) -> bool {
        self.inner.handle_curve_event(PointerEvent::Motion {
            pos: ScreenPoint::new(x, y),
        })
    }

    pub fn curve_release(&mut self, x: f32, y: f32) -> bool {
        self.inner.handle_curve_event(PointerEvent::Release {
            pos: ScreenPoint::new(x, y),
        })
    }

    pub fn curve_scroll(&mut self, x: f32, y: f32, step: f32, shift: bool, ctrl: bool) -> bool {
        self.inner.handle_curve_event(scroll(x, y, step, shift, ctrl))
    }

    pub fn widget_press(&mut self, x: f32, y: f32, button: u8, shift: bool, ctrl: bool) -> bool {
        self.inner
            .handle_widget_event(press(x, y, button, shift, ctrl, false))
    }

    pub fn widget_motion(&mut self, x: f32, y: f32) -> bool {
        self.inner.handle_widget_event(PointerEvent::Motion {
            pos: ScreenPoint::new(x, y),
        })
    }

    pub fn widget_release(&mut self, x: f32, y: f32) -> bool {
        self.inner.handle_widget_event(PointerEvent::Release {
            pos: ScreenPoint::new(x, y),
        })
    }

    pub fn widget_scroll(&mut self, x: f32, y: f32, step: f32, shift: bool, ctrl: bool) -> bool {
        self.inner.handle_widget_event(scroll(x, y, step, shift, ctrl))
    }

    // ------------------------------------------------------------------------
    // Curve
    // ------------------------------------------------------------------------

    /// Curve points as `[position, opacity, r, g, b]` per point.
    pub fn curve_points(&self) -> Vec<f32> {
        self.inner
            .curve()
            .points()
            .iter()
            .flat_map(|p| [p.position, p.opacity, p.color.r, p.color.g, p.color.b])
            .collect()
    }

    pub fn insert_point(&mut self, position: f32, opacity: f32) -> Result<(), JsValue> {
        self.inner
            .insert_point(position, opacity, None)
            .map_err(js_error)
    }

    pub fn remove_point(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.remove_point(index).map_err(js_error)
    }

    pub fn move_point(&mut self, index: usize, position: f32, opacity: f32) -> Result<(), JsValue> {
        self.inner
            .move_point(index, position, opacity)
            .map_err(js_error)
    }

    pub fn recolor_point(&mut self, index: usize, r: f32, g: f32, b: f32) -> Result<(), JsValue> {
        self.inner
            .recolor_point(index, Rgb::new(r, g, b))
            .map_err(js_error)
    }

    // ------------------------------------------------------------------------
    // Widgets
    // ------------------------------------------------------------------------

    #[wasm_bindgen(getter)]
    pub fn widget_count(&self) -> usize {
        self.inner.widget_editor().widgets().len()
    }

    /// Add a widget by kind name (`"gaussian"`, `"triangular"`, ...) and
    /// optional preset name. Returns its index.
    pub fn add_widget(&mut self, kind: &str, preset: Option<String>) -> Result<usize, JsValue> {
        let kind: WidgetKind = kind.parse().map_err(js_error)?;
        self.inner
            .create_widget(kind, preset.as_deref(), &[])
            .map_err(js_error)
    }

    pub fn remove_widget(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.remove_widget(index).map_err(js_error)
    }

    /// Parameter schema of one widget as `{ name: { value, range, step, options, kind } }`.
    pub fn widget_params(&self, index: usize) -> Result<JsValue, JsValue> {
        let widget = self
            .inner
            .widget_editor()
            .widgets()
            .get(index)
            .ok_or_else(|| js_error(format!("No widget at index {}", index)))?;
        serde_wasm_bindgen::to_value(&widget.params()).map_err(js_error)
    }

    pub fn set_widget_number(
        &mut self,
        index: usize,
        name: &str,
        value: f32,
    ) -> Result<(), JsValue> {
        self.inner
            .set_widget_param(index, name, &ParamValue::Number(value))
            .map_err(js_error)
    }

    pub fn set_widget_choice(
        &mut self,
        index: usize,
        name: &str,
        value: &str,
    ) -> Result<(), JsValue> {
        self.inner
            .set_widget_param(index, name, &ParamValue::from(value))
            .map_err(js_error)
    }

    pub fn set_widget_color(
        &mut self,
        index: usize,
        r: f32,
        g: f32,
        b: f32,
    ) -> Result<(), JsValue> {
        self.inner
            .set_widget_color(index, Rgb::new(r, g, b))
            .map_err(js_error)
    }

    pub fn clear_widgets(&mut self) {
        self.inner.clear_widgets();
    }

    pub fn reseed_widgets(&mut self) {
        self.inner.reseed_widgets();
    }

    // ------------------------------------------------------------------------
    // Presets
    // ------------------------------------------------------------------------

    pub fn preset_names(&self) -> Vec<String> {
        self.inner
            .presets()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn save_preset(&mut self, name: &str) {
        self.inner.save_preset(name);
    }

    pub fn load_preset(&mut self, name: &str) -> Result<(), JsValue> {
        self.inner.load_preset(name).map_err(js_error)
    }

    /// Merge a preset document. Returns how many presets loaded.
    pub fn import_presets(&mut self, json: &str) -> Result<usize, JsValue> {
        self.inner.import_presets(json).map_err(js_error)
    }

    pub fn export_presets(&self) -> Result<String, JsValue> {
        self.inner.export_presets().map_err(js_error)
    }

    // ------------------------------------------------------------------------
    // Histograms
    // ------------------------------------------------------------------------

    pub fn histogram(&self) -> JsHistogram {
        self.inner.histogram().clone().into()
    }

    /// Editor background histogram as `[center, height]` pairs.
    pub fn display_histogram(&self, log: bool) -> Vec<f32> {
        self.inner
            .display_histogram(log)
            .into_iter()
            .flat_map(|(center, height)| [center, height])
            .collect()
    }

    pub fn joint_histogram(&self) -> JsJointHistogram {
        self.inner.joint_histogram().into()
    }
}

impl JsTfSession {
    fn with_volume(volume: Volume) -> Self {
        let callback: Callback = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&callback);
        let inner = TfSession::new(volume, move |change: &TfChange| deliver(&sink, change));
        Self { inner, callback }
    }
}
