//! Pointer interaction with the control-point curve.
//!
//! # Event Rules
//!
//! - **Press** hits the nearest point within the pixel tolerance. A press
//!   that misses every point inside the left histogram gutter starts
//!   histogram scaling instead. The plot starts right of the gutter.
//!   - double-click on empty space inserts a point (shift asks for a color)
//!   - secondary click on a point removes it (endpoints are kept)
//!   - primary click on a point starts a drag, or recolors it with shift held
//! - **Motion** drags the selected point, or rescales the view vertically
//!   while histogram scaling
//! - **Release** returns to idle
//! - **Scroll** zooms around the cursor

use super::{
    apply_scroll_zoom, Button, ColorPicker, EditState, EditorConfig, PointerEvent, TfChange,
};
use crate::curve::{ControlPoint, ControlPointCurve, CurveError};
use crate::transform::{AxisScale, ScreenPoint, ViewWindow, Viewport};
use crate::{clamp_unit, Rgb, DOMAIN_MAX};
use serde::{Deserialize, Serialize};

/// How opacity maps onto the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveLayout {
    /// y shows opacity in `[0, 1]`
    #[default]
    OneD,
    /// y shows `255 * opacity`, drawn over the joint histogram
    TwoD,
}

impl CurveLayout {
    /// Height of the full view in display units.
    pub fn full_height(self) -> f32 {
        match self {
            CurveLayout::OneD => 1.0,
            CurveLayout::TwoD => DOMAIN_MAX,
        }
    }

    #[inline]
    pub fn opacity_to_y(self, opacity: f32) -> f32 {
        opacity * self.full_height()
    }

    #[inline]
    pub fn y_to_opacity(self, y: f32) -> f32 {
        clamp_unit(y / self.full_height())
    }
}

/// Interactive editor over a [`ControlPointCurve`].
#[derive(Debug, Clone)]
pub struct CurveEditor {
    curve: ControlPointCurve,
    state: EditState,
    axis: AxisScale,
    layout: CurveLayout,
    viewport: Viewport,
    window: ViewWindow,
    config: EditorConfig,
    reset_pending: bool,
}

impl CurveEditor {
    pub fn new(curve: ControlPointCurve, config: EditorConfig) -> Self {
        let layout = CurveLayout::default();
        Self {
            curve,
            state: EditState::Idle,
            axis: AxisScale::default(),
            layout,
            viewport: Viewport::default().with_left_margin(config.histogram_gutter_px),
            window: ViewWindow::full(layout.full_height()),
            config,
            reset_pending: false,
        }
    }

    pub fn curve(&self) -> &ControlPointCurve {
        &self.curve
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn axis_scale(&self) -> AxisScale {
        self.axis
    }

    /// Switch between linear and log display. Data is untouched.
    pub fn set_axis_scale(&mut self, axis: AxisScale) {
        if axis != self.axis {
            log::debug!("curve axis scale {:?} -> {:?}", self.axis, axis);
            self.axis = axis;
            self.window = ViewWindow::full(self.layout.full_height());
        }
    }

    pub fn layout(&self) -> CurveLayout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: CurveLayout) {
        self.layout = layout;
        self.window = ViewWindow::full(layout.full_height());
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Set the canvas size. The histogram gutter is reserved on the left.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport.with_left_margin(self.config.histogram_gutter_px);
    }

    pub fn window(&self) -> ViewWindow {
        self.window
    }

    /// Restore the full view and flag a redraw for the renderer side.
    pub fn reset_view(&mut self) {
        self.window = ViewWindow::full(self.layout.full_height());
        self.state = EditState::Idle;
        self.reset_pending = true;
    }

    /// Consume the pending reset flag.
    pub fn take_reset_request(&mut self) -> bool {
        std::mem::take(&mut self.reset_pending)
    }

    /// Screen position of a curve point.
    pub fn point_to_screen(&self, point: &ControlPoint) -> ScreenPoint {
        let display = (
            self.axis.to_display(point.position),
            self.layout.opacity_to_y(point.opacity),
        );
        self.viewport.to_screen(&self.window, display)
    }

    /// Data `(position, opacity)` under a screen position.
    pub fn screen_to_data(&self, pos: ScreenPoint) -> (f32, f32) {
        let (x, y) = self.viewport.to_display(&self.window, pos);
        (self.axis.to_data(x), self.layout.y_to_opacity(y))
    }

    /// Screen positions of every point, for drawing.
    pub fn screen_points(&self) -> Vec<ScreenPoint> {
        self.curve
            .points()
            .iter()
            .map(|p| self.point_to_screen(p))
            .collect()
    }

    /// Nearest point within the pick tolerance.
    pub fn hit_test(&self, pos: ScreenPoint) -> Option<usize> {
        self.curve
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| (i, self.point_to_screen(p).distance(pos)))
            .filter(|&(_, d)| d <= self.config.pick_tolerance_px)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}

// ============================================================================
// Programmatic Edits
// ============================================================================

impl CurveEditor {
    pub fn insert_point(
        &mut self,
        position: f32,
        opacity: f32,
        color: Option<Rgb>,
    ) -> Result<TfChange, CurveError> {
        let index = self.curve.insert(position, opacity, color)?;
        log::debug!("inserted curve point {} at {}", index, position);
        Ok(TfChange::from_curve(&self.curve))
    }

    pub fn remove_point(&mut self, index: usize) -> Result<TfChange, CurveError> {
        self.curve.remove(index)?;
        self.state = EditState::Idle;
        Ok(TfChange::from_curve(&self.curve))
    }

    pub fn move_point(
        &mut self,
        index: usize,
        position: f32,
        opacity: f32,
    ) -> Result<TfChange, CurveError> {
        self.curve.move_point(index, position, opacity)?;
        Ok(TfChange::from_curve(&self.curve))
    }

    pub fn recolor_point(&mut self, index: usize, color: Rgb) -> Result<TfChange, CurveError> {
        self.curve.recolor(index, color)?;
        Ok(TfChange::from_curve(&self.curve))
    }

    /// Replace the whole curve (preset load, dataset reload).
    pub fn restore(&mut self, points: Vec<ControlPoint>) -> TfChange {
        self.curve.restore(points);
        self.state = EditState::Idle;
        TfChange::from_curve(&self.curve)
    }
}

// ============================================================================
// Pointer Events
// ============================================================================

impl CurveEditor {
    /// Handle one pointer event. Returns the change when the curve was mutated.
    pub fn handle_event(
        &mut self,
        event: PointerEvent,
        picker: &mut dyn ColorPicker,
    ) -> Option<TfChange> {
        match event {
            PointerEvent::Press {
                pos,
                button,
                modifiers,
                double_click,
            } => self.on_press(pos, button, modifiers.shift, double_click, picker),
            PointerEvent::Motion { pos } => self.on_motion(pos),
            PointerEvent::Release { .. } => {
                self.state = EditState::Idle;
                None
            }
            PointerEvent::Scroll {
                pos,
                step,
                modifiers,
            } => {
                let anchor = self.viewport.to_display(&self.window, pos);
                apply_scroll_zoom(
                    &mut self.window,
                    anchor,
                    step,
                    modifiers,
                    &self.config,
                    self.layout.full_height(),
                );
                None
            }
        }
    }

    fn on_press(
        &mut self,
        pos: ScreenPoint,
        button: Button,
        shift: bool,
        double_click: bool,
        picker: &mut dyn ColorPicker,
    ) -> Option<TfChange> {
        let hit = self.hit_test(pos);
        if hit.is_none() && self.viewport.in_left_margin(pos.x) {
            self.state = EditState::ScalingHistogram { last_y: pos.y };
            return None;
        }

        match (hit, button) {
            (None, _) if double_click => {
                let (position, opacity) = self.screen_to_data(pos);
                let color = if shift {
                    picker.pick_color(Rgb::WHITE)
                } else {
                    None
                };
                self.insert_point(position, opacity, color).ok()
            }
            (Some(index), Button::Secondary) => match self.remove_point(index) {
                Ok(change) => Some(change),
                Err(err) => {
                    log::debug!("curve remove ignored: {}", err);
                    None
                }
            },
            (Some(index), Button::Primary) if shift => {
                let current = self.curve.point(index)?.color;
                let color = picker.pick_color(current)?;
                self.recolor_point(index, color).ok()
            }
            (Some(index), Button::Primary) => {
                self.state = EditState::Dragging { index };
                None
            }
            _ => None,
        }
    }

    fn on_motion(&mut self, pos: ScreenPoint) -> Option<TfChange> {
        match self.state {
            EditState::Dragging { index } => {
                let (position, opacity) = self.screen_to_data(pos);
                match self.curve.move_point(index, position, opacity) {
                    Ok(new_index) => {
                        self.state = EditState::Dragging { index: new_index };
                        Some(TfChange::from_curve(&self.curve))
                    }
                    Err(_) => {
                        self.state = EditState::Idle;
                        None
                    }
                }
            }
            EditState::ScalingHistogram { last_y } => {
                // Screen y grows downward; dragging up magnifies
                let dy = last_y - pos.y;
                let factor = (dy / self.config.histogram_drag_scale).exp();
                self.window
                    .scale_y(factor, self.config.min_span_y * self.layout.full_height());
                self.state = EditState::ScalingHistogram { last_y: pos.y };
                None
            }
            EditState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{Modifiers, NoColorPicker};

    const W: f32 = 295.0;
    const H: f32 = 100.0;

    /// Three-point curve on a 295x100 canvas. The 40 px histogram gutter
    /// leaves a 255 px plot, one pixel per intensity step.
    fn editor() -> CurveEditor {
        let curve = ControlPointCurve::from_points(vec![
            ControlPoint::white(0.0, 0.0),
            ControlPoint::white(128.0, 0.5),
            ControlPoint::white(255.0, 1.0),
        ]);
        let mut editor = CurveEditor::new(curve, EditorConfig::default());
        editor.set_viewport(Viewport::new(W, H));
        editor
    }

    fn screen(editor: &CurveEditor, position: f32, opacity: f32) -> ScreenPoint {
        editor.point_to_screen(&ControlPoint::white(position, opacity))
    }

    fn press(
        pos: ScreenPoint,
        button: Button,
        modifiers: Modifiers,
        double_click: bool,
    ) -> PointerEvent {
        PointerEvent::Press {
            pos,
            button,
            modifiers,
            double_click,
        }
    }

    #[test]
    fn test_drag_interior_point() {
        let mut ed = editor();
        let at = screen(&ed, 128.0, 0.5);
        assert_eq!(
            ed.handle_event(press(at, Button::Primary, Modifiers::NONE, false), &mut NoColorPicker),
            None
        );
        assert_eq!(ed.state(), EditState::Dragging { index: 1 });

        let to = screen(&ed, 200.0, 0.75);
        let change = ed.handle_event(PointerEvent::Motion { pos: to }, &mut NoColorPicker);
        assert!(matches!(change, Some(TfChange::Curve { .. })));
        let p = ed.curve().points()[1];
        assert!((p.position - 200.0).abs() < 1e-3);
        assert!((p.opacity - 0.75).abs() < 1e-4);

        ed.handle_event(PointerEvent::Release { pos: to }, &mut NoColorPicker);
        assert_eq!(ed.state(), EditState::Idle);
    }

    #[test]
    fn test_drag_first_point_stays_pinned() {
        let mut ed = editor();
        let at = screen(&ed, 0.0, 0.0);
        assert_eq!(at, ScreenPoint::new(40.0, 100.0));
        ed.handle_event(press(at, Button::Primary, Modifiers::NONE, false), &mut NoColorPicker);
        assert_eq!(ed.state(), EditState::Dragging { index: 0 });

        let to = screen(&ed, 200.0, 0.6);
        ed.handle_event(PointerEvent::Motion { pos: to }, &mut NoColorPicker);
        let first = ed.curve().points()[0];
        assert_eq!(first.position, 0.0);
        assert!((first.opacity - 0.6).abs() < 1e-4);
    }

    #[test]
    fn test_left_edge_editable_beside_gutter() {
        let mut ed = editor();
        assert_eq!(ed.viewport().left, 40.0);

        // A press just inside the gutter still picks the endpoint
        ed.handle_event(
            press(ScreenPoint::new(35.0, 100.0), Button::Primary, Modifiers::NONE, false),
            &mut NoColorPicker,
        );
        assert_eq!(ed.state(), EditState::Dragging { index: 0 });
        ed.handle_event(
            PointerEvent::Release { pos: ScreenPoint::new(35.0, 100.0) },
            &mut NoColorPicker,
        );

        let at = screen(&ed, 20.0, 0.5);
        assert!(!ed.viewport().in_left_margin(at.x));
        let change = ed.handle_event(
            press(at, Button::Primary, Modifiers::NONE, true),
            &mut NoColorPicker,
        );
        assert!(change.is_some());
        assert_eq!(ed.curve().len(), 4);
        assert!((ed.curve().points()[1].position - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_drag_across_neighbor_tracks_index() {
        let mut ed = editor();
        ed.insert_point(180.0, 0.2, None).unwrap();
        let at = screen(&ed, 128.0, 0.5);
        ed.handle_event(press(at, Button::Primary, Modifiers::NONE, false), &mut NoColorPicker);

        let to = screen(&ed, 220.0, 0.5);
        ed.handle_event(PointerEvent::Motion { pos: to }, &mut NoColorPicker);
        assert_eq!(ed.state(), EditState::Dragging { index: 2 });
    }

    #[test]
    fn test_double_click_inserts() {
        let mut ed = editor();
        let at = screen(&ed, 64.0, 0.9);
        let change = ed.handle_event(
            press(at, Button::Primary, Modifiers::NONE, true),
            &mut NoColorPicker,
        );
        assert!(change.is_some());
        assert_eq!(ed.curve().len(), 4);
        let p = ed.curve().points()[1];
        assert!((p.position - 64.0).abs() < 1e-3);
        assert_eq!(p.color, Rgb::WHITE);
    }

    #[test]
    fn test_shift_double_click_uses_picker() {
        let mut ed = editor();
        let green = Rgb::new(0.0, 1.0, 0.0);
        let mut picker = |_: Rgb| Some(green);
        let at = screen(&ed, 64.0, 0.9);
        ed.handle_event(press(at, Button::Primary, Modifiers::SHIFT, true), &mut picker);
        assert_eq!(ed.curve().points()[1].color, green);
    }

    #[test]
    fn test_secondary_click_removes_interior_only() {
        let mut ed = editor();
        let first = screen(&ed, 0.0, 0.0);
        assert_eq!(
            ed.handle_event(
                press(first, Button::Secondary, Modifiers::NONE, false),
                &mut NoColorPicker,
            ),
            None
        );
        assert_eq!(ed.curve().len(), 3);

        let mid = screen(&ed, 128.0, 0.5);
        let change = ed.handle_event(
            press(mid, Button::Secondary, Modifiers::NONE, false),
            &mut NoColorPicker,
        );
        assert!(change.is_some());
        assert_eq!(ed.curve().len(), 2);
    }

    #[test]
    fn test_shift_click_recolors() {
        let mut ed = editor();
        let blue = Rgb::new(0.0, 0.0, 1.0);
        let mut picker = |_: Rgb| Some(blue);
        let at = screen(&ed, 128.0, 0.5);
        let change = ed.handle_event(
            press(at, Button::Primary, Modifiers::SHIFT, false),
            &mut picker,
        );
        assert!(change.is_some());
        assert_eq!(ed.curve().colors()[1], blue);
        assert_eq!(ed.state(), EditState::Idle);

        // Cancelled dialog: no change
        let change = ed.handle_event(
            press(at, Button::Primary, Modifiers::SHIFT, false),
            &mut NoColorPicker,
        );
        assert_eq!(change, None);
    }

    #[test]
    fn test_press_on_empty_space_does_nothing() {
        let mut ed = editor();
        let at = screen(&ed, 64.0, 0.9);
        let change = ed.handle_event(
            press(at, Button::Primary, Modifiers::NONE, false),
            &mut NoColorPicker,
        );
        assert_eq!(change, None);
        assert_eq!(ed.state(), EditState::Idle);
    }

    #[test]
    fn test_histogram_gutter_scaling() {
        let mut ed = editor();
        let before = ed.window();
        ed.handle_event(
            press(ScreenPoint::new(20.0, 80.0), Button::Primary, Modifiers::NONE, false),
            &mut NoColorPicker,
        );
        assert_eq!(ed.state(), EditState::ScalingHistogram { last_y: 80.0 });

        // Drag up by 200 px: factor e
        let change = ed.handle_event(
            PointerEvent::Motion {
                pos: ScreenPoint::new(20.0, -120.0),
            },
            &mut NoColorPicker,
        );
        assert_eq!(change, None);
        let expected = before.y_span() / std::f32::consts::E;
        assert!((ed.window().y_span() - expected).abs() < 1e-4);
        assert_eq!(ed.curve().len(), 3);
    }

    #[test]
    fn test_scroll_zoom_is_view_only() {
        let mut ed = editor();
        let before = ed.curve().clone();
        let change = ed.handle_event(
            PointerEvent::Scroll {
                pos: ScreenPoint::new(150.0, 50.0),
                step: 2.0,
                modifiers: Modifiers::NONE,
            },
            &mut NoColorPicker,
        );
        assert_eq!(change, None);
        assert!(ed.window().x_span() < 255.0);
        assert_eq!(ed.window().y_span(), 1.0);
        assert_eq!(ed.curve(), &before);
    }

    #[test]
    fn test_log_axis_keeps_data_positions() {
        let mut ed = editor();
        let before = ed.curve().positions();
        ed.set_axis_scale(AxisScale::Log);
        assert_eq!(ed.curve().positions(), before);

        // Hit-testing follows the log projection
        let at = screen(&ed, 128.0, 0.5);
        assert_eq!(ed.hit_test(at), Some(1));
        let (position, _) = ed.screen_to_data(at);
        assert!((position - 128.0).abs() < 0.1);
    }

    #[test]
    fn test_two_d_layout() {
        let mut ed = editor();
        ed.set_layout(CurveLayout::TwoD);
        assert_eq!(ed.window().y_max, 255.0);
        let at = screen(&ed, 128.0, 0.5);
        assert_eq!(ed.hit_test(at), Some(1));
        let (_, opacity) = ed.screen_to_data(at);
        assert!((opacity - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_reset_view() {
        let mut ed = editor();
        ed.handle_event(
            PointerEvent::Scroll {
                pos: ScreenPoint::new(150.0, 50.0),
                step: 3.0,
                modifiers: Modifiers::CTRL,
            },
            &mut NoColorPicker,
        );
        ed.reset_view();
        assert_eq!(ed.window(), ViewWindow::full(1.0));
        assert!(ed.take_reset_request());
        assert!(!ed.take_reset_request());
    }
}
