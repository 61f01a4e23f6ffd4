//! Pointer-driven editing of the curve and the widget set.
//!
//! Editors are synchronous state machines. Each pointer event is handled to
//! completion and, when it changed the model, yields a [`TfChange`] that the
//! owning session forwards to its [`ChangeListener`]. View-only events
//! (zooming, histogram scaling) yield nothing.

pub mod curve_editor;
pub mod widget_editor;

pub use curve_editor::{CurveEditor, CurveLayout};
pub use widget_editor::WidgetEditor;

use crate::curve::ControlPointCurve;
use crate::transform::ScreenPoint;
use crate::Rgb;
use serde::{Deserialize, Serialize};

// ============================================================================
// Input Events
// ============================================================================

/// Mouse button of a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Primary,
    Secondary,
    Middle,
}

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
    };
}

/// A pointer event in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Press {
        pos: ScreenPoint,
        button: Button,
        modifiers: Modifiers,
        double_click: bool,
    },
    Motion {
        pos: ScreenPoint,
    },
    Release {
        pos: ScreenPoint,
    },
    /// Wheel step; positive zooms in.
    Scroll {
        pos: ScreenPoint,
        step: f32,
        modifiers: Modifiers,
    },
}

/// Interaction state shared by both editors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    /// Dragging the point or widget at this index
    Dragging { index: usize },
    /// Dragging in the histogram gutter, y of the previous motion
    ScalingHistogram { last_y: f32 },
}

// ============================================================================
// Change Notification
// ============================================================================

/// What happened to the widget set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "index", rename_all = "snake_case")]
pub enum WidgetDelta {
    Added(usize),
    Removed(usize),
    Updated(usize),
    Cleared,
    /// Cleared and replaced by the default widget
    Reseeded,
}

/// A model mutation, as delivered to the renderer side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TfChange {
    Curve {
        positions: Vec<f32>,
        opacities: Vec<f32>,
        colors: Vec<Rgb>,
    },
    Widgets(WidgetDelta),
}

impl TfChange {
    /// Full snapshot of a curve.
    pub fn from_curve(curve: &ControlPointCurve) -> Self {
        TfChange::Curve {
            positions: curve.positions(),
            opacities: curve.opacities(),
            colors: curve.colors(),
        }
    }

    pub fn widgets(delta: WidgetDelta) -> Self {
        TfChange::Widgets(delta)
    }
}

/// Receiver of model changes.
pub trait ChangeListener {
    fn on_change(&mut self, change: &TfChange);
}

impl<F> ChangeListener for F
where
    F: FnMut(&TfChange),
{
    fn on_change(&mut self, change: &TfChange) {
        self(change)
    }
}

/// Listener that drops every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullListener;

impl ChangeListener for NullListener {
    fn on_change(&mut self, _change: &TfChange) {}
}

// ============================================================================
// Color Picking
// ============================================================================

/// Source of user-chosen colors (a color dialog in a UI).
pub trait ColorPicker {
    /// Ask for a color starting from `current`; `None` means cancelled.
    fn pick_color(&mut self, current: Rgb) -> Option<Rgb>;
}

impl<F> ColorPicker for F
where
    F: FnMut(Rgb) -> Option<Rgb>,
{
    fn pick_color(&mut self, current: Rgb) -> Option<Rgb> {
        self(current)
    }
}

/// Picker that always cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoColorPicker;

impl ColorPicker for NoColorPicker {
    fn pick_color(&mut self, _current: Rgb) -> Option<Rgb> {
        None
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Interaction tuning shared by the editors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Curve point hit radius in pixels
    pub pick_tolerance_px: f32,
    /// Width of the left histogram gutter in pixels
    pub histogram_gutter_px: f32,
    /// Scroll zoom factor per wheel step
    pub zoom_base: f32,
    /// Pixels of vertical drag per e-fold of histogram scaling
    pub histogram_drag_scale: f32,
    /// Smallest visible horizontal span (display units)
    pub min_span_x: f32,
    /// Smallest visible vertical span, as a fraction of the full height
    pub min_span_y: f32,
    /// Widget hit radius as a fraction of the domain
    pub widget_pick_fraction: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pick_tolerance_px: 10.0,
            histogram_gutter_px: 40.0,
            zoom_base: 0.9,
            histogram_drag_scale: 200.0,
            min_span_x: 1.0,
            min_span_y: 1e-3,
            widget_pick_fraction: 0.05,
        }
    }
}

impl EditorConfig {
    /// Zoom factor for a wheel step.
    #[inline]
    pub fn zoom_scale(&self, step: f32) -> f32 {
        self.zoom_base.powf(step)
    }
}

/// Apply the shared scroll-zoom rules to a view window.
///
/// Shift zooms vertically, ctrl zooms both axes, otherwise only the
/// horizontal axis zooms.
pub(crate) fn apply_scroll_zoom(
    window: &mut crate::transform::ViewWindow,
    anchor: (f32, f32),
    step: f32,
    modifiers: Modifiers,
    config: &EditorConfig,
    full_height: f32,
) {
    let scale = config.zoom_scale(step);
    let min_span_y = config.min_span_y * full_height;
    if modifiers.shift {
        window.zoom_y(anchor.1, scale, min_span_y);
    } else if modifiers.ctrl {
        window.zoom_x(anchor.0, scale, config.min_span_x);
        window.zoom_y(anchor.1, scale, min_span_y);
    } else {
        window.zoom_x(anchor.0, scale, config.min_span_x);
    }
}
