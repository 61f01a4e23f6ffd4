//! Zoomable view window and screen projection.

use crate::{DOMAIN_MAX, DOMAIN_MIN};
use serde::{Deserialize, Serialize};

/// A position in canvas pixels (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    #[inline]
    pub fn distance(self, other: ScreenPoint) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

// ============================================================================
// View Window
// ============================================================================

/// Visible region in display coordinates.
///
/// The horizontal extent always stays inside `[0, 255]`. The vertical extent
/// is free, so the editor can zoom opacity or scale the histogram backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl ViewWindow {
    /// The whole intensity range with `y` spanning `[0, y_max]`.
    pub fn full(y_max: f32) -> Self {
        Self {
            x_min: DOMAIN_MIN,
            x_max: DOMAIN_MAX,
            y_min: 0.0,
            y_max,
        }
    }

    #[inline]
    pub fn x_span(&self) -> f32 {
        self.x_max - self.x_min
    }

    #[inline]
    pub fn y_span(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Zoom horizontally around `anchor` by `scale` (< 1 zooms in).
    ///
    /// The result keeps at least `min_span` visible and stays inside the
    /// intensity domain, shifting rather than shrinking when it hits an edge.
    pub fn zoom_x(&mut self, anchor: f32, scale: f32, min_span: f32) {
        let (lo, hi) = zoom_interval(self.x_min, self.x_max, anchor, scale, min_span);
        let (lo, hi) = fit_interval(lo, hi, DOMAIN_MIN, DOMAIN_MAX);
        self.x_min = lo;
        self.x_max = hi;
    }

    /// Zoom vertically around `anchor` by `scale` (< 1 zooms in).
    pub fn zoom_y(&mut self, anchor: f32, scale: f32, min_span: f32) {
        let (lo, hi) = zoom_interval(self.y_min, self.y_max, anchor, scale, min_span);
        self.y_min = lo;
        self.y_max = hi;
    }

    /// Divide the vertical extent by `factor`, keeping `y_min` fixed.
    pub fn scale_y(&mut self, factor: f32, min_span: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let span = (self.y_span() / factor).max(min_span);
        self.y_max = self.y_min + span;
    }
}

/// Scale `[lo, hi]` around `anchor`, never below `min_span`.
fn zoom_interval(lo: f32, hi: f32, anchor: f32, scale: f32, min_span: f32) -> (f32, f32) {
    if !scale.is_finite() || scale <= 0.0 || !anchor.is_finite() {
        return (lo, hi);
    }
    let new_lo = anchor + (lo - anchor) * scale;
    let new_hi = anchor + (hi - anchor) * scale;
    let span = new_hi - new_lo;
    if span >= min_span {
        return (new_lo, new_hi);
    }

    // Keep the anchor at the same relative position
    let t = if hi > lo { (anchor - lo) / (hi - lo) } else { 0.5 };
    let new_lo = anchor - t * min_span;
    (new_lo, new_lo + min_span)
}

/// Shift `[lo, hi]` inside `[min, max]`, collapsing to the bounds if wider.
fn fit_interval(lo: f32, hi: f32, min: f32, max: f32) -> (f32, f32) {
    let span = hi - lo;
    if span >= max - min {
        return (min, max);
    }
    if lo < min {
        (min, min + span)
    } else if hi > max {
        (max - span, max)
    } else {
        (lo, hi)
    }
}

// ============================================================================
// Viewport
// ============================================================================

/// Canvas size in pixels.
///
/// The plot occupies the canvas right of `left`; the strip before it is
/// free for side decorations such as the histogram gutter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Left margin in pixels
    #[serde(default)]
    pub left: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 512.0,
            height: 256.0,
            left: 0.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            left: 0.0,
        }
    }

    /// Reserve `left` pixels before the plot. The margin never leaves the
    /// plot narrower than one pixel.
    pub fn with_left_margin(mut self, left: f32) -> Self {
        self.left = if left.is_finite() {
            left.max(0.0).min((self.width - 1.0).max(0.0))
        } else {
            0.0
        };
        self
    }

    /// Width of the plot area.
    #[inline]
    pub fn plot_width(&self) -> f32 {
        (self.width - self.left).max(1.0)
    }

    /// Whether a canvas x lies in the left margin.
    #[inline]
    pub fn in_left_margin(&self, x: f32) -> bool {
        x < self.left
    }

    /// Project a display-space point onto the canvas.
    pub fn to_screen(&self, window: &ViewWindow, display: (f32, f32)) -> ScreenPoint {
        let fx = (display.0 - window.x_min) / nonzero(window.x_span());
        let fy = (display.1 - window.y_min) / nonzero(window.y_span());
        ScreenPoint {
            x: self.left + fx * self.plot_width(),
            y: (1.0 - fy) * self.height,
        }
    }

    /// Unproject a canvas point into display space.
    pub fn to_display(&self, window: &ViewWindow, screen: ScreenPoint) -> (f32, f32) {
        let fx = (screen.x - self.left) / self.plot_width();
        let fy = 1.0 - screen.y / self.height.max(1.0);
        (
            window.x_min + fx * window.x_span(),
            window.y_min + fy * window.y_span(),
        )
    }
}

#[inline]
fn nonzero(span: f32) -> f32 {
    if span.abs() < f32::EPSILON {
        f32::EPSILON
    } else {
        span
    }
}
