//! Opacity functions for the widget kinds.
//!
//! Each shape maps an offset from the widget center, `(Δintensity, Δgradient)`,
//! to an opacity in `[0, 1]` before the widget's opacity scale is applied.
//!
//! ## Shapes
//!
//! - **Gaussian**: 2D Gaussian truncated at the 3σ ellipse
//! - **Triangular**: linear falloff, optionally one-sided along the gradient axis
//! - **Rectangular**: flat top with a linear falloff band
//! - **Ellipsoid**: `1 - d^p` inside the ellipse
//! - **Diamond**: L1 falloff inside the diamond
//!
//! Every shape is exactly 1 at the center and exactly 0 on and beyond its
//! unit-distance boundary.

pub mod diamond;
pub mod ellipsoid;
pub mod gaussian;
pub mod rectangular;
pub mod triangular;

pub use diamond::Diamond;
pub use ellipsoid::Ellipsoid;
pub use gaussian::Gaussian;
pub use rectangular::Rectangular;
pub use triangular::{TriangleDirection, Triangular};

use crate::widget::schema::{ParamSpec, ParamValue};
use crate::widget::WidgetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest allowed value for size-like parameters (widths, radii, sigmas).
pub const MIN_EXTENT: f32 = 1.0;

/// Floor a size-like parameter so it can be used as a divisor.
#[inline]
pub fn floor_extent(value: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_EXTENT)
    } else {
        MIN_EXTENT
    }
}

/// Smallest allowed falloff exponent.
pub const MIN_FALLOFF_POWER: f32 = 0.1;

#[inline]
pub fn floor_power(value: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_FALLOFF_POWER)
    } else {
        MIN_FALLOFF_POWER
    }
}

/// Widget kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Gaussian,
    Triangular,
    Rectangular,
    Ellipsoid,
    Diamond,
}

impl WidgetKind {
    /// Every kind, in menu order.
    pub const ALL: [WidgetKind; 5] = [
        WidgetKind::Gaussian,
        WidgetKind::Triangular,
        WidgetKind::Rectangular,
        WidgetKind::Ellipsoid,
        WidgetKind::Diamond,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKind::Gaussian => "gaussian",
            WidgetKind::Triangular => "triangular",
            WidgetKind::Rectangular => "rectangular",
            WidgetKind::Ellipsoid => "ellipsoid",
            WidgetKind::Diamond => "diamond",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WidgetError::UnknownKind(s.to_string()))
    }
}

/// Kind-specific shape parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Gaussian(Gaussian),
    Triangular(Triangular),
    Rectangular(Rectangular),
    Ellipsoid(Ellipsoid),
    Diamond(Diamond),
}

impl Shape {
    /// Default parameters for a kind.
    pub fn default_for(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Gaussian => Shape::Gaussian(Gaussian::default()),
            WidgetKind::Triangular => Shape::Triangular(Triangular::default()),
            WidgetKind::Rectangular => Shape::Rectangular(Rectangular::default()),
            WidgetKind::Ellipsoid => Shape::Ellipsoid(Ellipsoid::default()),
            WidgetKind::Diamond => Shape::Diamond(Diamond::default()),
        }
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            Shape::Gaussian(_) => WidgetKind::Gaussian,
            Shape::Triangular(_) => WidgetKind::Triangular,
            Shape::Rectangular(_) => WidgetKind::Rectangular,
            Shape::Ellipsoid(_) => WidgetKind::Ellipsoid,
            Shape::Diamond(_) => WidgetKind::Diamond,
        }
    }

    /// Opacity at an offset from the widget center, in `[0, 1]`.
    #[inline]
    pub fn evaluate(&self, di: f32, dg: f32) -> f32 {
        let value = match self {
            Shape::Gaussian(s) => s.evaluate(di, dg),
            Shape::Triangular(s) => s.evaluate(di, dg),
            Shape::Rectangular(s) => s.evaluate(di, dg),
            Shape::Ellipsoid(s) => s.evaluate(di, dg),
            Shape::Diamond(s) => s.evaluate(di, dg),
        };
        value.clamp(0.0, 1.0)
    }

    /// Kind-specific parameter specs.
    pub fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        match self {
            Shape::Gaussian(s) => s.params(),
            Shape::Triangular(s) => s.params(),
            Shape::Rectangular(s) => s.params(),
            Shape::Ellipsoid(s) => s.params(),
            Shape::Diamond(s) => s.params(),
        }
    }

    /// Set a kind-specific parameter.
    ///
    /// Returns `Ok(false)` when the name does not belong to this kind, so the
    /// caller can report it.
    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<bool, WidgetError> {
        match self {
            Shape::Gaussian(s) => s.set_param(name, value),
            Shape::Triangular(s) => s.set_param(name, value),
            Shape::Rectangular(s) => s.set_param(name, value),
            Shape::Ellipsoid(s) => s.set_param(name, value),
            Shape::Diamond(s) => s.set_param(name, value),
        }
    }
}
