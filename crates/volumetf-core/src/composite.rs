//! Compositing of overlapping widgets into one opacity/color field.
//!
//! # Algorithm
//!
//! Opacity is a left fold over the widgets in insertion order, starting from
//! 0. Each widget folds its scaled opacity `w` into the accumulator with its
//! own [`BlendMode`]:
//!
//! ```text
//! max:      acc = max(acc, w)
//! add:      acc = acc + w
//! multiply: acc = acc * (1 - w) + w
//! ```
//!
//! The result is clamped to `[0, 1]` once, after the fold. Color is taken from
//! the single widget with the largest scaled opacity at the query point, the
//! earliest one winning ties, regardless of blend mode.
//!
//! [`BlendMode`]: crate::widget::BlendMode

use crate::widget::{Widget, WidgetError};
use crate::{clamp_unit, Rgb};
use serde::{Deserialize, Serialize};

/// Insertion-ordered collection of widgets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WidgetSet {
    widgets: Vec<Widget>,
}

impl WidgetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a widget and return its index.
    pub fn push(&mut self, widget: Widget) -> usize {
        self.widgets.push(widget);
        self.widgets.len() - 1
    }

    /// Remove a widget; later widgets shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<Widget, WidgetError> {
        if index >= self.widgets.len() {
            return Err(WidgetError::IndexOutOfRange {
                index,
                len: self.widgets.len(),
            });
        }
        Ok(self.widgets.remove(index))
    }

    pub fn clear(&mut self) {
        self.widgets.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Widget> {
        self.widgets.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Widget> {
        self.widgets.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Widget> {
        self.widgets.iter()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Blend-mode fold of every widget's scaled opacity, clamped to `[0, 1]`.
    pub fn combined_opacity(&self, intensity: f32, gradient: f32) -> f32 {
        let acc = self.widgets.iter().fold(0.0f32, |acc, w| {
            w.blend_mode.apply(acc, w.opacity_at(intensity, gradient))
        });
        clamp_unit(acc)
    }

    /// Color of the strongest contributor, or white when nothing contributes.
    pub fn resolve_color(&self, intensity: f32, gradient: f32) -> Rgb {
        let mut best: Option<(f32, Rgb)> = None;
        for widget in &self.widgets {
            let w = widget.opacity_at(intensity, gradient);
            if w <= 0.0 {
                continue;
            }
            // Strictly greater: earlier widgets win ties
            if best.map_or(true, |(top, _)| w > top) {
                best = Some((w, widget.color));
            }
        }
        best.map_or(Rgb::WHITE, |(_, color)| color)
    }

    /// Combined opacity and resolved color at a point.
    pub fn evaluate(&self, intensity: f32, gradient: f32) -> (f32, Rgb) {
        (
            self.combined_opacity(intensity, gradient),
            self.resolve_color(intensity, gradient),
        )
    }

    /// Index of the widget whose center is nearest to a point, if within `radius`.
    ///
    /// Ties go to the earliest widget.
    pub fn nearest_center(&self, intensity: f32, gradient: f32, radius: f32) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, widget) in self.widgets.iter().enumerate() {
            let di = widget.center.0 - intensity;
            let dg = widget.center.1 - gradient;
            let dist = (di * di + dg * dg).sqrt();
            if dist > radius {
                continue;
            }
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((index, dist));
            }
        }
        best.map(|(index, _)| index)
    }
}

impl<'a> IntoIterator for &'a WidgetSet {
    type Item = &'a Widget;
    type IntoIter = std::slice::Iter<'a, Widget>;

    fn into_iter(self) -> Self::IntoIter {
        self.widgets.iter()
    }
}

impl FromIterator<Widget> for WidgetSet {
    fn from_iter<I: IntoIterator<Item = Widget>>(iter: I) -> Self {
        Self {
            widgets: iter.into_iter().collect(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::shape::{Shape, WidgetKind};
    use crate::widget::BlendMode;
    use proptest::prelude::*;

    fn widget_strategy(mode: BlendMode) -> impl Strategy<Value = Widget> {
        (
            prop::sample::select(WidgetKind::ALL.to_vec()),
            0.0f32..=255.0,
            0.0f32..=255.0,
            0.0f32..=1.0,
        )
            .prop_map(move |(kind, ci, cg, scale)| {
                Widget::new(Shape::default_for(kind))
                    .with_center(ci, cg)
                    .with_opacity(scale)
                    .with_blend_mode(mode)
            })
    }

    proptest! {
        /// Property: a max-only set is invariant to insertion order.
        #[test]
        fn prop_max_order_invariant(
            widgets in prop::collection::vec(widget_strategy(BlendMode::Max), 1..6),
            i in 0.0f32..=255.0,
            g in 0.0f32..=255.0,
        ) {
            let forward: WidgetSet = widgets.iter().cloned().collect();
            let reverse: WidgetSet = widgets.iter().rev().cloned().collect();
            prop_assert_eq!(forward.combined_opacity(i, g), reverse.combined_opacity(i, g));
        }

        /// Property: an add-only set is invariant to insertion order (up to rounding).
        #[test]
        fn prop_add_order_invariant(
            widgets in prop::collection::vec(widget_strategy(BlendMode::Add), 1..6),
            i in 0.0f32..=255.0,
            g in 0.0f32..=255.0,
        ) {
            let forward: WidgetSet = widgets.iter().cloned().collect();
            let reverse: WidgetSet = widgets.iter().rev().cloned().collect();
            let diff = (forward.combined_opacity(i, g) - reverse.combined_opacity(i, g)).abs();
            prop_assert!(diff < 1e-5);
        }

        /// Property: combined opacity is always within [0, 1].
        #[test]
        fn prop_combined_in_range(
            widgets in prop::collection::vec(
                prop_oneof![
                    widget_strategy(BlendMode::Max),
                    widget_strategy(BlendMode::Add),
                    widget_strategy(BlendMode::Multiply),
                ],
                0..8,
            ),
            i in 0.0f32..=255.0,
            g in 0.0f32..=255.0,
        ) {
            let set: WidgetSet = widgets.into_iter().collect();
            let value = set.combined_opacity(i, g);
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }
}
