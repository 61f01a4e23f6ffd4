//! VolumeTF Core - Transfer-function engine for direct volume rendering
//!
//! This crate provides the model behind an interactive transfer-function
//! editor: a control-point curve, a set of parametric opacity widgets, the
//! compositing engine that merges overlapping widgets, and the sampler that
//! turns either representation into the 256-entry lookup table a volume
//! renderer consumes every frame.
//!
//! # Module Structure
//!
//! - `curve` - Ordered control points with pinned endpoints
//! - `shape` - Per-kind opacity functions over (intensity, gradient)
//! - `widget` - Parametric widgets, parameter schema and factory presets
//! - `composite` - Blend-mode reduction over a widget set
//! - `lut` - Curve and widget LUT sampling strategies
//! - `transform` - Axis scales, view windows and screen projection
//! - `edit` - Pointer-event state machines for the curve and widget editors
//! - `volume` - Normalized intensity/gradient data
//! - `histogram` - Intensity and joint histograms
//! - `preset` - Named curve library and its persisted schema
//! - `session` - The editing session tying everything together
//!
//! # Domain
//!
//! Intensity and gradient are normalized to `[0, 255]`, opacity lives in
//! `[0, 1]` and colors are RGB triples of floats in `[0, 1]`.

pub mod composite;
pub mod curve;
pub mod edit;
pub mod histogram;
pub mod lut;
pub mod preset;
pub mod session;
pub mod shape;
pub mod transform;
pub mod volume;
pub mod widget;

pub use composite::WidgetSet;
pub use curve::{ControlPoint, ControlPointCurve, CurveError};
pub use lut::{DataDrivenConfig, Lut, LutEntry, UniformScan, WidgetSampling, LUT_SIZE};
pub use session::{SessionConfig, TfMode, TfSession};
pub use shape::{Shape, WidgetKind};
pub use transform::{AxisScale, ScreenPoint, ViewWindow, Viewport};
pub use volume::{ValueRange, Volume, VolumeError};
pub use widget::{BlendMode, Widget, WidgetError, WidgetFactory};

/// Lower bound of the normalized intensity/gradient domain.
pub const DOMAIN_MIN: f32 = 0.0;

/// Upper bound of the normalized intensity/gradient domain.
pub const DOMAIN_MAX: f32 = 255.0;

/// Clamp a value into the normalized `[0, 255]` domain.
#[inline]
pub fn clamp_domain(value: f32) -> f32 {
    value.clamp(DOMAIN_MIN, DOMAIN_MAX)
}

/// Clamp an opacity into `[0, 1]`.
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Opaque RGB color with float channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    /// Red channel (0.0 to 1.0)
    pub r: f32,
    /// Green channel (0.0 to 1.0)
    pub g: f32,
    /// Blue channel (0.0 to 1.0)
    pub b: f32,
}

impl Rgb {
    /// Pure white, the default color of new points and widgets.
    pub const WHITE: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Create a color, clamping every channel into `[0, 1]`.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: clamp_unit(r),
            g: clamp_unit(g),
            b: clamp_unit(b),
        }
    }

    /// Build from an `[r, g, b]` array (the persisted layout).
    pub fn from_array(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }

    /// Convert to an `[r, g, b]` array.
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Linear interpolation per channel, `t` in `[0, 1]`.
    #[inline]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}
