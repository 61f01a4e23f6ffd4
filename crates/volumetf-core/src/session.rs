//! The editing session.
//!
//! A [`TfSession`] owns the loaded volume, both editors and the preset
//! library. Every model mutation that goes through the session is forwarded
//! to the injected [`ChangeListener`].

use crate::curve::{ControlPoint, ControlPointCurve, CurveError};
use crate::edit::{
    ChangeListener, ColorPicker, CurveEditor, CurveLayout, EditorConfig, NoColorPicker,
    PointerEvent, TfChange, WidgetEditor,
};
use crate::histogram::{IntensityHistogram, JointHistogram};
use crate::lut::{Lut, LutEntry, WidgetSampling};
use crate::preset::{PresetError, PresetLibrary};
use crate::shape::WidgetKind;
use crate::transform::{AxisScale, Viewport};
use crate::volume::Volume;
use crate::widget::{ParamValue, Widget, WidgetError, WidgetFactory};
use crate::Rgb;
use serde::{Deserialize, Serialize};

/// Which representation `sample_lut` resamples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TfMode {
    #[default]
    Curve,
    Widgets,
}

/// Session tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub editor: EditorConfig,
    pub widget_sampling: WidgetSampling,
    /// Relative range change that counts as a new dataset
    pub range_tolerance: f32,
    /// Bins of the editor background histogram
    pub display_histogram_bins: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            widget_sampling: WidgetSampling::default(),
            range_tolerance: 1e-3,
            display_histogram_bins: 128,
        }
    }
}

/// An explicitly constructed editing session.
pub struct TfSession {
    volume: Volume,
    histogram: IntensityHistogram,
    curve_editor: CurveEditor,
    widget_editor: WidgetEditor,
    presets: PresetLibrary,
    mode: TfMode,
    config: SessionConfig,
    listener: Box<dyn ChangeListener>,
    picker: Box<dyn ColorPicker>,
}

impl std::fmt::Debug for TfSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfSession")
            .field("samples", &self.volume.len())
            .field("mode", &self.mode)
            .field("points", &self.curve_editor.curve().len())
            .field("widgets", &self.widget_editor.widgets().len())
            .field("presets", &self.presets.len())
            .finish()
    }
}

impl TfSession {
    pub fn new(volume: Volume, listener: impl ChangeListener + 'static) -> Self {
        Self::with_config(volume, listener, SessionConfig::default())
    }

    pub fn with_config(
        volume: Volume,
        listener: impl ChangeListener + 'static,
        config: SessionConfig,
    ) -> Self {
        let histogram = volume.histogram();
        let curve = ControlPointCurve::from_histogram(&histogram);
        log::debug!(
            "session over {} samples, initial curve with {} points",
            volume.len(),
            curve.len()
        );
        Self {
            volume,
            histogram,
            curve_editor: CurveEditor::new(curve, config.editor),
            widget_editor: WidgetEditor::seeded(config.editor),
            presets: PresetLibrary::new(),
            mode: TfMode::default(),
            config,
            listener: Box::new(listener),
            picker: Box::new(NoColorPicker),
        }
    }

    /// Attach a preset library. The curve starts from its initial preset
    /// when it has one.
    pub fn with_presets(mut self, presets: PresetLibrary) -> Self {
        if let Some(points) = presets.initial_points() {
            self.curve_editor.restore(points.to_vec());
        }
        self.presets = presets;
        self
    }

    pub fn with_color_picker(mut self, picker: impl ColorPicker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    pub fn set_listener(&mut self, listener: impl ChangeListener + 'static) {
        self.listener = Box::new(listener);
    }

    pub fn set_color_picker(&mut self, picker: impl ColorPicker + 'static) {
        self.picker = Box::new(picker);
    }

    fn emit(&mut self, change: TfChange) {
        self.listener.on_change(&change);
    }

    fn emit_opt(&mut self, change: Option<TfChange>) -> bool {
        match change {
            Some(change) => {
                self.emit(change);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl TfSession {
    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> TfMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TfMode) {
        self.mode = mode;
    }

    pub fn set_widget_sampling(&mut self, sampling: WidgetSampling) {
        self.config.widget_sampling = sampling;
    }

    pub fn curve(&self) -> &ControlPointCurve {
        self.curve_editor.curve()
    }

    pub fn curve_editor(&self) -> &CurveEditor {
        &self.curve_editor
    }

    pub fn widget_editor(&self) -> &WidgetEditor {
        &self.widget_editor
    }

    pub fn presets(&self) -> &PresetLibrary {
        &self.presets
    }

    pub fn histogram(&self) -> &IntensityHistogram {
        &self.histogram
    }

    /// Background histogram for the curve editor.
    pub fn display_histogram(&self, log: bool) -> Vec<(f32, f32)> {
        IntensityHistogram::display_curve(
            self.volume.intensity(),
            self.config.display_histogram_bins,
            log,
        )
    }

    /// Background histogram for the widget editor.
    pub fn joint_histogram(&self) -> JointHistogram {
        self.volume.joint_histogram()
    }
}

// ============================================================================
// Views
// ============================================================================

impl TfSession {
    pub fn set_curve_viewport(&mut self, viewport: Viewport) {
        self.curve_editor.set_viewport(viewport);
    }

    pub fn set_widget_viewport(&mut self, viewport: Viewport) {
        self.widget_editor.set_viewport(viewport);
    }

    pub fn set_axis_scale(&mut self, axis: AxisScale) {
        self.curve_editor.set_axis_scale(axis);
    }

    pub fn set_curve_layout(&mut self, layout: CurveLayout) {
        self.curve_editor.set_layout(layout);
    }

    pub fn reset_views(&mut self) {
        self.curve_editor.reset_view();
        self.widget_editor.reset_view();
    }
}

// ============================================================================
// Pointer Events
// ============================================================================

impl TfSession {
    /// Route an event to the curve editor. Returns true when the curve changed.
    pub fn handle_curve_event(&mut self, event: PointerEvent) -> bool {
        let change = self
            .curve_editor
            .handle_event(event, self.picker.as_mut());
        self.emit_opt(change)
    }

    /// Route an event to the widget editor. Returns true when the set changed.
    pub fn handle_widget_event(&mut self, event: PointerEvent) -> bool {
        let change = self
            .widget_editor
            .handle_event(event, self.picker.as_mut());
        self.emit_opt(change)
    }
}

// ============================================================================
// Curve Edits
// ============================================================================

impl TfSession {
    pub fn insert_point(
        &mut self,
        position: f32,
        opacity: f32,
        color: Option<Rgb>,
    ) -> Result<(), CurveError> {
        let change = self.curve_editor.insert_point(position, opacity, color)?;
        self.emit(change);
        Ok(())
    }

    pub fn remove_point(&mut self, index: usize) -> Result<(), CurveError> {
        let change = self.curve_editor.remove_point(index)?;
        self.emit(change);
        Ok(())
    }

    pub fn move_point(
        &mut self,
        index: usize,
        position: f32,
        opacity: f32,
    ) -> Result<(), CurveError> {
        let change = self.curve_editor.move_point(index, position, opacity)?;
        self.emit(change);
        Ok(())
    }

    pub fn recolor_point(&mut self, index: usize, color: Rgb) -> Result<(), CurveError> {
        let change = self.curve_editor.recolor_point(index, color)?;
        self.emit(change);
        Ok(())
    }

    pub fn restore_curve(&mut self, points: Vec<ControlPoint>) {
        let change = self.curve_editor.restore(points);
        self.emit(change);
    }
}

// ============================================================================
// Widget Edits
// ============================================================================

impl TfSession {
    pub fn add_widget(&mut self, widget: Widget) -> usize {
        let index = self.widget_editor.widgets().len();
        let change = self.widget_editor.add_widget(widget);
        self.emit(change);
        index
    }

    /// Create a widget through the factory and add it.
    pub fn create_widget(
        &mut self,
        kind: WidgetKind,
        preset: Option<&str>,
        overrides: &[(&str, ParamValue)],
    ) -> Result<usize, WidgetError> {
        let widget = WidgetFactory::create(kind, preset, overrides)?;
        Ok(self.add_widget(widget))
    }

    pub fn remove_widget(&mut self, index: usize) -> Result<(), WidgetError> {
        let change = self.widget_editor.remove_widget(index)?;
        self.emit(change);
        Ok(())
    }

    pub fn set_widget_param(
        &mut self,
        index: usize,
        name: &str,
        value: &ParamValue,
    ) -> Result<(), WidgetError> {
        let change = self.widget_editor.set_widget_param(index, name, value)?;
        self.emit(change);
        Ok(())
    }

    pub fn set_widget_color(&mut self, index: usize, color: Rgb) -> Result<(), WidgetError> {
        let change = self.widget_editor.set_widget_color(index, color)?;
        self.emit(change);
        Ok(())
    }

    pub fn clear_widgets(&mut self) {
        let change = self.widget_editor.clear();
        self.emit(change);
    }

    pub fn reseed_widgets(&mut self) {
        let change = self.widget_editor.reseed();
        self.emit(change);
    }
}

// ============================================================================
// Dataset and Presets
// ============================================================================

impl TfSession {
    /// Replace the dataset.
    ///
    /// The curve is rebuilt from the new histogram. When either original
    /// range changed materially the widgets are reseeded too. Returns whether
    /// that happened.
    pub fn load_volume(&mut self, volume: Volume) -> bool {
        let tol = self.config.range_tolerance;
        let reseed = self
            .volume
            .intensity_range()
            .differs_materially(&volume.intensity_range(), tol)
            || self
                .volume
                .gradient_range()
                .differs_materially(&volume.gradient_range(), tol);

        self.histogram = volume.histogram();
        self.volume = volume;
        log::debug!("loaded volume with {} samples", self.volume.len());

        let curve = ControlPointCurve::from_histogram(&self.histogram);
        self.restore_curve(curve.snapshot());
        if reseed {
            log::debug!("value range changed, reseeding widgets");
            self.reseed_widgets();
        }
        reseed
    }

    /// Store the current curve under `name`, replacing any previous entry.
    pub fn save_preset(&mut self, name: &str) {
        self.presets.insert(name, self.curve_editor.curve().snapshot());
        log::debug!("saved preset '{}'", name);
    }

    pub fn load_preset(&mut self, name: &str) -> Result<(), PresetError> {
        let points = self
            .presets
            .get(name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))?
            .to_vec();
        self.restore_curve(points);
        Ok(())
    }

    pub fn delete_preset(&mut self, name: &str) -> Result<(), PresetError> {
        self.presets.remove(name).map(|_| ())
    }

    /// Merge presets from a library document. Returns how many loaded.
    pub fn import_presets(&mut self, json: &str) -> Result<usize, PresetError> {
        let library = PresetLibrary::from_json(json)?;
        Ok(self.presets.merge(library))
    }

    pub fn export_presets(&self) -> Result<String, PresetError> {
        self.presets.to_json()
    }
}

// ============================================================================
// Sampling
// ============================================================================

impl TfSession {
    /// Resample the active representation into a LUT.
    pub fn sample_lut(&self) -> Lut {
        log::debug!("sampling LUT in {:?} mode", self.mode);
        match self.mode {
            TfMode::Curve => Lut::from_curve(self.curve_editor.curve()),
            TfMode::Widgets => Lut::from_widgets(
                self.widget_editor.widgets(),
                &self.config.widget_sampling,
                &self.volume,
            ),
        }
    }

    /// Current LUT with positions mapped back to raw intensity values.
    pub fn sample_lut_original(&self) -> Vec<LutEntry> {
        self.sample_lut()
            .to_original_range(&self.volume.intensity_range())
    }
}
