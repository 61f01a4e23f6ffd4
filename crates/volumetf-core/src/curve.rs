//! Control-point curve with pinned endpoints and piecewise-linear evaluation.
//!
//! The curve is the point-based representation of a transfer function: an
//! ordered list of (position, opacity, color) anchors. The first anchor always
//! sits at intensity 0 and the last at 255; every mutation restores ordering and
//! the pins before returning.

use crate::histogram::IntensityHistogram;
use crate::{clamp_domain, clamp_unit, Rgb, DOMAIN_MAX, DOMAIN_MIN};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Histogram bins above this fraction of the tallest bin seed the initial curve.
pub const PEAK_FRACTION: f32 = 0.05;

// ============================================================================
// Types
// ============================================================================

/// Rejected curve edits. These are reported no-ops: the curve is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CurveError {
    /// The first and last points cannot be removed.
    #[error("Control point {index} is a pinned endpoint")]
    EndpointLocked { index: usize },

    /// The index does not name a point of the curve.
    #[error("Control point {index} out of range (curve has {len} points)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Position or opacity was NaN or infinite.
    #[error("Control point position and opacity must be finite")]
    NonFinite,
}

/// A single (position, opacity, color) anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Intensity position (0.0 to 255.0)
    pub position: f32,
    /// Opacity (0.0 to 1.0)
    pub opacity: f32,
    /// Point color
    pub color: Rgb,
}

impl ControlPoint {
    /// Create a point, clamping position and opacity into their domains.
    pub fn new(position: f32, opacity: f32, color: Rgb) -> Self {
        Self {
            position: clamp_domain(position),
            opacity: clamp_unit(opacity),
            color: Rgb::new(color.r, color.g, color.b),
        }
    }

    /// Create a white point.
    pub fn white(position: f32, opacity: f32) -> Self {
        Self::new(position, opacity, Rgb::WHITE)
    }
}

/// Ordered control points, sorted by position, with pinned endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPointCurve {
    points: Vec<ControlPoint>,
}

impl Default for ControlPointCurve {
    fn default() -> Self {
        Self {
            // Linear ramp by default
            points: vec![
                ControlPoint::white(DOMAIN_MIN, 0.0),
                ControlPoint::white(DOMAIN_MAX, 1.0),
            ],
        }
    }
}

// ============================================================================
// Construction
// ============================================================================

impl ControlPointCurve {
    /// Create the default two-point ramp.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve from arbitrary points (see [`ControlPointCurve::restore`]).
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = ControlPoint>,
    {
        let mut curve = Self::default();
        curve.restore(points);
        curve
    }

    /// Derive an initial curve from the intensity histogram.
    ///
    /// Every bin taller than [`PEAK_FRACTION`] of the tallest bin becomes a
    /// white point at the bin center with opacity `count / max`. Falls back to
    /// the default ramp when fewer than two bins qualify.
    pub fn from_histogram(histogram: &IntensityHistogram) -> Self {
        let max = histogram.max_count();
        if max == 0 {
            return Self::default();
        }

        let threshold = max as f32 * PEAK_FRACTION;
        let peaks: Vec<ControlPoint> = histogram
            .bins
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count as f32 > threshold)
            .map(|(bin, &count)| {
                ControlPoint::white(
                    IntensityHistogram::bin_center(bin),
                    count as f32 / max as f32,
                )
            })
            .collect();

        if peaks.len() < 2 {
            return Self::default();
        }

        log::debug!("histogram-derived curve with {} peaks", peaks.len());
        Self::from_points(peaks)
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl ControlPointCurve {
    /// Number of control points (always at least 2).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed curve.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in position order.
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// A single point by index.
    pub fn point(&self, index: usize) -> Option<&ControlPoint> {
        self.points.get(index)
    }

    pub fn positions(&self) -> Vec<f32> {
        self.points.iter().map(|p| p.position).collect()
    }

    pub fn opacities(&self) -> Vec<f32> {
        self.points.iter().map(|p| p.opacity).collect()
    }

    pub fn colors(&self) -> Vec<Rgb> {
        self.points.iter().map(|p| p.color).collect()
    }

    /// Copy of the current points, for presets and notifications.
    pub fn snapshot(&self) -> Vec<ControlPoint> {
        self.points.clone()
    }

    /// Check if this is the default two-point ramp.
    pub fn is_default_ramp(&self) -> bool {
        *self == Self::default()
    }

    fn is_endpoint(&self, index: usize) -> bool {
        index == 0 || index == self.points.len() - 1
    }

    fn check_index(&self, index: usize) -> Result<(), CurveError> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(CurveError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
        }
    }
}

// ============================================================================
// Mutation
// ============================================================================

impl ControlPointCurve {
    /// Insert a point and return its index.
    ///
    /// Position and opacity are clamped; color defaults to white. The new point
    /// lands after any existing points at the same position, and always between
    /// the two endpoints. Non-finite input is rejected.
    pub fn insert(
        &mut self,
        position: f32,
        opacity: f32,
        color: Option<Rgb>,
    ) -> Result<usize, CurveError> {
        check_finite(position, opacity)?;
        let point = ControlPoint::new(position, opacity, color.unwrap_or(Rgb::WHITE));
        let last = self.points.len() - 1;
        let index = self
            .points
            .partition_point(|p| p.position <= point.position)
            .clamp(1, last);
        self.points.insert(index, point);
        Ok(index)
    }

    /// Remove an interior point.
    ///
    /// Endpoints and unknown indices are rejected without touching the curve.
    pub fn remove(&mut self, index: usize) -> Result<ControlPoint, CurveError> {
        self.check_index(index)?;
        if self.is_endpoint(index) {
            return Err(CurveError::EndpointLocked { index });
        }
        Ok(self.points.remove(index))
    }

    /// Move a point and return its index after re-sorting.
    ///
    /// The first point stays at 0 and the last at 255; only their opacity
    /// changes. Interior points are clamped into the domain and then shifted
    /// past any neighbors they crossed. Points with equal positions keep their
    /// relative order.
    pub fn move_point(
        &mut self,
        index: usize,
        position: f32,
        opacity: f32,
    ) -> Result<usize, CurveError> {
        self.check_index(index)?;
        check_finite(position, opacity)?;

        let last = self.points.len() - 1;
        let position = if index == 0 {
            DOMAIN_MIN
        } else if index == last {
            DOMAIN_MAX
        } else {
            clamp_domain(position)
        };

        let point = &mut self.points[index];
        point.position = position;
        point.opacity = clamp_unit(opacity);

        Ok(self.resettle(index))
    }

    /// Replace a point's color.
    pub fn recolor(&mut self, index: usize, color: Rgb) -> Result<(), CurveError> {
        self.check_index(index)?;
        self.points[index].color = Rgb::new(color.r, color.g, color.b);
        Ok(())
    }

    /// Replace every point.
    ///
    /// Values are clamped and sorted. If the leftmost point is not at 0 (or the
    /// rightmost not at 255) a copy of it is added at the domain edge, which
    /// keeps the flat extrapolation the curve had before pinning. An empty
    /// input yields the default ramp.
    pub fn restore<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = ControlPoint>,
    {
        let mut points: Vec<ControlPoint> = points
            .into_iter()
            .filter(|p| p.position.is_finite() && p.opacity.is_finite())
            .map(|p| ControlPoint::new(p.position, p.opacity, p.color))
            .collect();

        if points.is_empty() {
            *self = Self::default();
            return;
        }

        points.sort_by(|a, b| a.position.total_cmp(&b.position));

        if let Some(&first) = points.first() {
            if first.position > DOMAIN_MIN {
                points.insert(0, ControlPoint { position: DOMAIN_MIN, ..first });
            }
        }
        if let Some(&last) = points.last() {
            if last.position < DOMAIN_MAX || points.len() < 2 {
                points.push(ControlPoint { position: DOMAIN_MAX, ..last });
            }
        }

        self.points = points;
    }

    /// Bubble the point at `index` left or right until order holds again.
    fn resettle(&mut self, mut index: usize) -> usize {
        while index > 0 && self.points[index - 1].position > self.points[index].position {
            self.points.swap(index - 1, index);
            index -= 1;
        }
        while index + 1 < self.points.len()
            && self.points[index + 1].position < self.points[index].position
        {
            self.points.swap(index, index + 1);
            index += 1;
        }
        index
    }
}

fn check_finite(position: f32, opacity: f32) -> Result<(), CurveError> {
    if position.is_finite() && opacity.is_finite() {
        Ok(())
    } else {
        Err(CurveError::NonFinite)
    }
}

// ============================================================================
// Evaluation
// ============================================================================

impl ControlPointCurve {
    /// Evaluate opacity and color at an intensity by linear interpolation.
    ///
    /// Intensities outside the first/last points take that endpoint's value.
    pub fn evaluate(&self, intensity: f32) -> (f32, Rgb) {
        let points = &self.points;
        let n = points.len();

        if n == 1 {
            return (points[0].opacity, points[0].color);
        }

        let x = intensity.clamp(points[0].position, points[n - 1].position);
        let i = find_interval(points, x);

        let p0 = &points[i];
        let p1 = &points[i + 1];

        let h = p1.position - p0.position;
        if h.abs() < f32::EPSILON {
            return (p1.opacity, p1.color);
        }

        let t = ((x - p0.position) / h).clamp(0.0, 1.0);
        let opacity = p0.opacity + (p1.opacity - p0.opacity) * t;
        (clamp_unit(opacity), p0.color.lerp(p1.color, t))
    }
}

/// Binary search for the interval containing x.
fn find_interval(points: &[ControlPoint], x: f32) -> usize {
    let n = points.len();
    if n <= 2 {
        return 0;
    }

    let mut low = 0;
    let mut high = n - 2;

    while low < high {
        let mid = (low + high).div_ceil(2);
        if points[mid].position <= x {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    low
}

// ============================================================================
// Tests
// ============================================================================


// ============================================================================
// Property-Based Tests
// ============================================================================
