//! Pointer interaction with the widget set on the 2D (intensity, gradient) canvas.

use super::{
    apply_scroll_zoom, Button, ColorPicker, EditState, EditorConfig, PointerEvent, TfChange,
    WidgetDelta,
};
use crate::composite::WidgetSet;
use crate::transform::{ScreenPoint, ViewWindow, Viewport};
use crate::widget::{ParamValue, Widget, WidgetError, WidgetFactory};
use crate::{Rgb, DOMAIN_MAX, DOMAIN_MIN};

/// Interactive editor over a [`WidgetSet`].
///
/// The canvas shows intensity horizontally and gradient vertically, both in
/// `[0, 255]`. Widgets are picked by their center in data space.
#[derive(Debug, Clone)]
pub struct WidgetEditor {
    widgets: WidgetSet,
    state: EditState,
    viewport: Viewport,
    window: ViewWindow,
    config: EditorConfig,
}

impl WidgetEditor {
    pub fn new(widgets: WidgetSet, config: EditorConfig) -> Self {
        Self {
            widgets,
            state: EditState::Idle,
            viewport: Viewport::default(),
            window: ViewWindow::full(DOMAIN_MAX),
            config,
        }
    }

    /// Editor holding only the default widget.
    pub fn seeded(config: EditorConfig) -> Self {
        let mut widgets = WidgetSet::new();
        widgets.push(WidgetFactory::default_widget());
        Self::new(widgets, config)
    }

    pub fn widgets(&self) -> &WidgetSet {
        &self.widgets
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn window(&self) -> ViewWindow {
        self.window
    }

    pub fn reset_view(&mut self) {
        self.window = ViewWindow::full(DOMAIN_MAX);
        self.state = EditState::Idle;
    }

    /// Hit radius in data units.
    pub fn pick_radius(&self) -> f32 {
        (DOMAIN_MAX - DOMAIN_MIN) * self.config.widget_pick_fraction
    }

    /// Data `(intensity, gradient)` under a screen position.
    pub fn screen_to_data(&self, pos: ScreenPoint) -> (f32, f32) {
        self.viewport.to_display(&self.window, pos)
    }

    /// Screen position of a widget center.
    pub fn center_to_screen(&self, widget: &Widget) -> ScreenPoint {
        self.viewport.to_screen(&self.window, widget.center)
    }

    /// Nearest widget center within the pick radius.
    pub fn hit_test(&self, pos: ScreenPoint) -> Option<usize> {
        let (intensity, gradient) = self.screen_to_data(pos);
        self.widgets
            .nearest_center(intensity, gradient, self.pick_radius())
    }

    fn check_index(&self, index: usize) -> Result<(), WidgetError> {
        if index < self.widgets.len() {
            Ok(())
        } else {
            Err(WidgetError::IndexOutOfRange {
                index,
                len: self.widgets.len(),
            })
        }
    }
}

// ============================================================================
// Programmatic Edits
// ============================================================================

impl WidgetEditor {
    pub fn add_widget(&mut self, widget: Widget) -> TfChange {
        let index = self.widgets.push(widget);
        log::debug!("added widget {}", index);
        TfChange::widgets(WidgetDelta::Added(index))
    }

    pub fn remove_widget(&mut self, index: usize) -> Result<TfChange, WidgetError> {
        self.widgets.remove(index)?;
        self.state = EditState::Idle;
        log::debug!("removed widget {}", index);
        Ok(TfChange::widgets(WidgetDelta::Removed(index)))
    }

    pub fn set_widget_param(
        &mut self,
        index: usize,
        name: &str,
        value: &ParamValue,
    ) -> Result<TfChange, WidgetError> {
        self.check_index(index)?;
        if let Some(widget) = self.widgets.get_mut(index) {
            widget.set_param(name, value)?;
        }
        Ok(TfChange::widgets(WidgetDelta::Updated(index)))
    }

    pub fn set_widget_color(&mut self, index: usize, color: Rgb) -> Result<TfChange, WidgetError> {
        self.check_index(index)?;
        if let Some(widget) = self.widgets.get_mut(index) {
            widget.color = Rgb::new(color.r, color.g, color.b);
        }
        Ok(TfChange::widgets(WidgetDelta::Updated(index)))
    }

    /// Replace one widget wholesale.
    pub fn replace_widget(
        &mut self,
        index: usize,
        widget: Widget,
    ) -> Result<TfChange, WidgetError> {
        self.check_index(index)?;
        if let Some(slot) = self.widgets.get_mut(index) {
            *slot = widget;
        }
        Ok(TfChange::widgets(WidgetDelta::Updated(index)))
    }

    pub fn clear(&mut self) -> TfChange {
        self.widgets.clear();
        self.state = EditState::Idle;
        TfChange::widgets(WidgetDelta::Cleared)
    }

    /// Clear and insert the default widget.
    pub fn reseed(&mut self) -> TfChange {
        self.widgets.clear();
        self.widgets.push(WidgetFactory::default_widget());
        self.state = EditState::Idle;
        log::debug!("widget set reseeded");
        TfChange::widgets(WidgetDelta::Reseeded)
    }
}

// ============================================================================
// Pointer Events
// ============================================================================

impl WidgetEditor {
    /// Handle one pointer event. Returns the change when the widget set was mutated.
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
                ..
            } => {
                let index = self.hit_test(pos)?;
                match button {
                    Button::Primary if modifiers.shift => {
                        let current = self.widgets.get(index)?.color;
                        let color = picker.pick_color(current)?;
                        self.set_widget_color(index, color).ok()
                    }
                    Button::Primary => {
                        self.state = EditState::Dragging { index };
                        None
                    }
                    Button::Secondary => self.remove_widget(index).ok(),
                    Button::Middle => None,
                }
            }
            PointerEvent::Motion { pos } => {
                let EditState::Dragging { index } = self.state else {
                    return None;
                };
                let (intensity, gradient) = self.screen_to_data(pos);
                match self.widgets.get_mut(index) {
                    Some(widget) => {
                        widget.set_center(intensity, gradient);
                        Some(TfChange::widgets(WidgetDelta::Updated(index)))
                    }
                    None => {
                        self.state = EditState::Idle;
                        None
                    }
                }
            }
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
                    DOMAIN_MAX,
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{Modifiers, NoColorPicker};
    use crate::shape::WidgetKind;

    fn editor() -> WidgetEditor {
        let mut ed = WidgetEditor::seeded(EditorConfig::default());
        ed.set_viewport(Viewport::new(255.0, 255.0));
        ed
    }

    fn at(ed: &WidgetEditor, intensity: f32, gradient: f32) -> ScreenPoint {
        ed.viewport.to_screen(&ed.window, (intensity, gradient))
    }

    fn press(pos: ScreenPoint, button: Button, modifiers: Modifiers) -> PointerEvent {
        PointerEvent::Press {
            pos,
            button,
            modifiers,
            double_click: false,
        }
    }

    #[test]
    fn test_seeded_default() {
        let ed = editor();
        assert_eq!(ed.widgets().len(), 1);
        assert_eq!(ed.widgets().get(0).map(|w| w.center), Some((127.5, 127.5)));
    }

    #[test]
    fn test_pick_radius() {
        let ed = editor();
        assert!((ed.pick_radius() - 12.75).abs() < 1e-4);
        assert_eq!(ed.hit_test(at(&ed, 135.0, 130.0)), Some(0));
        assert_eq!(ed.hit_test(at(&ed, 145.0, 127.5)), None);
    }

    #[test]
    fn test_drag_moves_center() {
        let mut ed = editor();
        ed.handle_event(
            press(at(&ed, 127.5, 127.5), Button::Primary, Modifiers::NONE),
            &mut NoColorPicker,
        );
        assert_eq!(ed.state(), EditState::Dragging { index: 0 });

        let change = ed.handle_event(
            PointerEvent::Motion {
                pos: at(&ed, 60.0, 300.0),
            },
            &mut NoColorPicker,
        );
        assert_eq!(change, Some(TfChange::widgets(WidgetDelta::Updated(0))));
        let center = ed.widgets().get(0).map(|w| w.center).unwrap();
        assert!((center.0 - 60.0).abs() < 1e-3);
        assert_eq!(center.1, 255.0);

        ed.handle_event(PointerEvent::Release { pos: at(&ed, 0.0, 0.0) }, &mut NoColorPicker);
        assert_eq!(ed.state(), EditState::Idle);
        assert_eq!(
            ed.handle_event(PointerEvent::Motion { pos: at(&ed, 10.0, 10.0) }, &mut NoColorPicker),
            None
        );
    }

    #[test]
    fn test_secondary_removes() {
        let mut ed = editor();
        let change = ed.handle_event(
            press(at(&ed, 127.5, 127.5), Button::Secondary, Modifiers::NONE),
            &mut NoColorPicker,
        );
        assert_eq!(change, Some(TfChange::widgets(WidgetDelta::Removed(0))));
        assert!(ed.widgets().is_empty());
    }

    #[test]
    fn test_shift_click_recolors() {
        let mut ed = editor();
        let red = Rgb::new(1.0, 0.0, 0.0);
        let mut picker = |_: Rgb| Some(red);
        let change = ed.handle_event(
            press(at(&ed, 127.5, 127.5), Button::Primary, Modifiers::SHIFT),
            &mut picker,
        );
        assert_eq!(change, Some(TfChange::widgets(WidgetDelta::Updated(0))));
        assert_eq!(ed.widgets().get(0).map(|w| w.color), Some(red));
        assert_eq!(ed.state(), EditState::Idle);
    }

    #[test]
    fn test_nearest_widget_wins() {
        let mut ed = editor();
        let w = WidgetFactory::create(WidgetKind::Diamond, None, &[])
            .unwrap()
            .with_center(134.0, 127.5);
        ed.add_widget(w);
        assert_eq!(ed.hit_test(at(&ed, 132.0, 127.5)), Some(1));
        assert_eq!(ed.hit_test(at(&ed, 129.0, 127.5)), Some(0));
    }

    #[test]
    fn test_programmatic_edits() {
        let mut ed = editor();
        let change = ed.set_widget_param(0, "opacity", &ParamValue::Number(0.3)).unwrap();
        assert_eq!(change, TfChange::widgets(WidgetDelta::Updated(0)));
        assert!((ed.widgets().get(0).map(|w| w.opacity_scale).unwrap() - 0.3).abs() < 1e-6);

        assert_eq!(
            ed.set_widget_param(5, "opacity", &ParamValue::Number(0.3)),
            Err(WidgetError::IndexOutOfRange { index: 5, len: 1 })
        );
        assert!(ed.set_widget_param(0, "bogus", &ParamValue::Number(1.0)).is_err());
        assert!(ed.remove_widget(3).is_err());

        assert_eq!(ed.clear(), TfChange::widgets(WidgetDelta::Cleared));
        assert!(ed.widgets().is_empty());
        assert_eq!(ed.reseed(), TfChange::widgets(WidgetDelta::Reseeded));
        assert_eq!(ed.widgets().len(), 1);
    }

    #[test]
    fn test_scroll_zoom() {
        let mut ed = editor();
        ed.handle_event(
            PointerEvent::Scroll {
                pos: ScreenPoint::new(100.0, 100.0),
                step: 1.0,
                modifiers: Modifiers::CTRL,
            },
            &mut NoColorPicker,
        );
        assert!(ed.window().x_span() < 255.0);
        assert!(ed.window().y_span() < 255.0);
        ed.reset_view();
        assert_eq!(ed.window(), ViewWindow::full(255.0));
    }
}
