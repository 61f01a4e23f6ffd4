//! Parametric transfer-function widgets.
//!
//! A widget is a [`Shape`] placed at a center in (intensity, gradient) space,
//! together with a color, a global opacity scale and the blend mode it uses
//! when the compositing engine folds it into the widget set.

pub mod factory;
pub mod schema;

pub use factory::WidgetFactory;
pub use schema::{ParamKind, ParamSpec, ParamValue};

use crate::shape::{Shape, WidgetKind};
use crate::{clamp_domain, clamp_unit, Rgb};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Rejected widget operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("Unknown parameter '{0}'")]
    UnknownParam(String),

    #[error("Invalid value '{value}' for parameter '{name}'")]
    InvalidValue { name: String, value: String },

    #[error("Unknown widget kind '{0}'")]
    UnknownKind(String),

    #[error("Unknown blend mode '{0}'")]
    UnknownBlendMode(String),

    #[error("Widget {index} out of range (set has {len} widgets)")]
    IndexOutOfRange { index: usize, len: usize },
}

// ============================================================================
// Blend Mode
// ============================================================================

/// Reduction rule a widget applies to the running opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Max,
    Add,
    Multiply,
}

impl BlendMode {
    pub const OPTIONS: [&'static str; 3] = ["max", "add", "multiply"];

    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Max => "max",
            BlendMode::Add => "add",
            BlendMode::Multiply => "multiply",
        }
    }

    /// Fold a widget opacity `w` into the accumulator.
    ///
    /// The result is not clamped; the compositing engine clamps once at the end.
    #[inline]
    pub fn apply(self, acc: f32, w: f32) -> f32 {
        match self {
            BlendMode::Max => acc.max(w),
            BlendMode::Add => acc + w,
            BlendMode::Multiply => acc * (1.0 - w) + w,
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(BlendMode::Max),
            "add" => Ok(BlendMode::Add),
            "multiply" => Ok(BlendMode::Multiply),
            _ => Err(WidgetError::UnknownBlendMode(s.to_string())),
        }
    }
}

// ============================================================================
// Widget
// ============================================================================

/// A shape placed in (intensity, gradient) space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    /// Center as (intensity, gradient), each in `[0, 255]`
    pub center: (f32, f32),
    pub color: Rgb,
    /// Global opacity multiplier (0.0 to 1.0)
    pub opacity_scale: f32,
    pub blend_mode: BlendMode,
    pub shape: Shape,
}

impl Widget {
    /// Widget with the given shape at the domain center, white, full opacity.
    pub fn new(shape: Shape) -> Self {
        Self {
            center: (128.0, 128.0),
            color: Rgb::WHITE,
            opacity_scale: 1.0,
            blend_mode: BlendMode::Max,
            shape,
        }
    }

    pub fn with_center(mut self, intensity: f32, gradient: f32) -> Self {
        self.set_center(intensity, gradient);
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Rgb::new(color.r, color.g, color.b);
        self
    }

    pub fn with_opacity(mut self, opacity_scale: f32) -> Self {
        self.opacity_scale = clamp_unit(opacity_scale);
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn kind(&self) -> WidgetKind {
        self.shape.kind()
    }

    /// Move the center, clamping into the domain.
    pub fn set_center(&mut self, intensity: f32, gradient: f32) {
        self.center = (clamp_domain(intensity), clamp_domain(gradient));
    }

    /// Shape opacity at a point, before the opacity scale.
    #[inline]
    pub fn raw_opacity(&self, intensity: f32, gradient: f32) -> f32 {
        self.shape
            .evaluate(intensity - self.center.0, gradient - self.center.1)
    }

    /// Scaled opacity at a point.
    #[inline]
    pub fn opacity_at(&self, intensity: f32, gradient: f32) -> f32 {
        self.raw_opacity(intensity, gradient) * self.opacity_scale
    }

    /// Every editable parameter, shared ones first.
    pub fn params(&self) -> BTreeMap<String, ParamSpec> {
        let mut params = BTreeMap::new();
        params.insert(
            "center_intensity".to_string(),
            ParamSpec::slider(self.center.0, (0.0, 255.0), 1.0),
        );
        params.insert(
            "center_gradient".to_string(),
            ParamSpec::slider(self.center.1, (0.0, 255.0), 1.0),
        );
        params.insert(
            "opacity".to_string(),
            ParamSpec::slider(self.opacity_scale, (0.0, 1.0), 0.01),
        );
        params.insert(
            "blend_mode".to_string(),
            ParamSpec::combo(self.blend_mode.as_str(), &BlendMode::OPTIONS),
        );
        params.insert("color".to_string(), ParamSpec::color(self.color));
        for (name, spec) in self.shape.params() {
            params.insert(name.to_string(), spec);
        }
        params
    }

    /// Set a parameter by name.
    ///
    /// Numeric values are clamped or floored into their valid range. Unknown
    /// names and values of the wrong type are rejected and leave the widget
    /// unchanged.
    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), WidgetError> {
        match name {
            "center_intensity" => self.center.0 = clamp_domain(value.as_number(name)?),
            "center_gradient" => self.center.1 = clamp_domain(value.as_number(name)?),
            "opacity" => self.opacity_scale = clamp_unit(value.as_number(name)?),
            "blend_mode" => self.blend_mode = value.as_choice(name)?.parse()?,
            "color" => self.color = value.as_color(name)?,
            _ => {
                if !self.shape.set_param(name, value)? {
                    return Err(WidgetError::UnknownParam(name.to_string()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Gaussian, Rectangular};

    #[test]
    fn test_blend_apply() {
        assert_eq!(BlendMode::Max.apply(0.3, 0.5), 0.5);
        assert_eq!(BlendMode::Max.apply(0.7, 0.5), 0.7);
        assert!((BlendMode::Add.apply(0.7, 0.5) - 1.2).abs() < 1e-6);
        assert_eq!(BlendMode::Multiply.apply(0.5, 0.5), 0.75);
        assert_eq!(BlendMode::Multiply.apply(0.0, 0.4), 0.4);
    }

    #[test]
    fn test_blend_from_str() {
        assert_eq!("ADD".parse::<BlendMode>(), Ok(BlendMode::Add));
        assert_eq!(
            "screen".parse::<BlendMode>(),
            Err(WidgetError::UnknownBlendMode("screen".to_string()))
        );
    }

    #[test]
    fn test_opacity_scale_applies() {
        let w = Widget::new(Shape::Gaussian(Gaussian::new(30.0, 30.0)))
            .with_center(100.0, 50.0)
            .with_opacity(0.4);
        assert!((w.opacity_at(100.0, 50.0) - 0.4).abs() < 1e-6);
        assert_eq!(w.raw_opacity(100.0, 50.0), 1.0);
    }

    #[test]
    fn test_center_clamped() {
        let w = Widget::new(Shape::default_for(WidgetKind::Diamond)).with_center(-10.0, 300.0);
        assert_eq!(w.center, (0.0, 255.0));
    }

    #[test]
    fn test_params_contain_shared_and_kind_specific() {
        let w = Widget::new(Shape::Rectangular(Rectangular::default()));
        let params = w.params();
        for name in [
            "center_intensity",
            "center_gradient",
            "opacity",
            "blend_mode",
            "color",
            "intensity_width",
            "gradient_height",
            "falloff",
        ] {
            assert!(params.contains_key(name), "missing {}", name);
        }
        assert_eq!(params.len(), 8);
        assert_eq!(params["blend_mode"].kind, ParamKind::Combo);
        assert_eq!(params["color"].kind, ParamKind::Color);
        assert_eq!(params["opacity"].range, Some((0.0, 1.0)));
    }

    #[test]
    fn test_set_param_clamps() {
        let mut w = Widget::new(Shape::default_for(WidgetKind::Gaussian));
        w.set_param("opacity", &ParamValue::Number(1.7)).unwrap();
        assert_eq!(w.opacity_scale, 1.0);
        w.set_param("center_intensity", &ParamValue::Number(-4.0)).unwrap();
        assert_eq!(w.center.0, 0.0);
        w.set_param("blend_mode", &ParamValue::from("multiply")).unwrap();
        assert_eq!(w.blend_mode, BlendMode::Multiply);
        w.set_param("intensity_std", &ParamValue::Number(0.0)).unwrap();
        assert_eq!(w.params()["intensity_std"].value, ParamValue::Number(1.0));
        w.set_param("color", &ParamValue::Color([0.2, 0.4, 2.0])).unwrap();
        assert_eq!(w.color, Rgb::new(0.2, 0.4, 1.0));
        w.set_param("falloff_power", &ParamValue::Number(2.0)).unwrap();
        assert_eq!(w.params()["falloff_power"].value, ParamValue::Number(2.0));
    }

    #[test]
    fn test_set_param_rejects_unknown_and_mistyped() {
        let mut w = Widget::new(Shape::default_for(WidgetKind::Diamond));
        let before = w.clone();
        assert_eq!(
            w.set_param("falloff", &ParamValue::Number(3.0)),
            Err(WidgetError::UnknownParam("falloff".to_string()))
        );
        assert!(w.set_param("opacity", &ParamValue::from("high")).is_err());
        assert!(w.set_param("blend_mode", &ParamValue::from("screen")).is_err());
        assert!(w.set_param("color", &ParamValue::from("red")).is_err());
        assert!(w.set_param("color", &ParamValue::Color([0.0, f32::INFINITY, 0.0])).is_err());
        assert_eq!(w, before);
    }
}
