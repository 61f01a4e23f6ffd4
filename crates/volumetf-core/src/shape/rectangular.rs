//! Rectangular opacity function with a linear falloff band.

use super::floor_extent;
use crate::widget::schema::{ParamSpec, ParamValue};
use crate::widget::WidgetError;
use serde::{Deserialize, Serialize};

/// Flat-topped rectangle of size `(intensity_width, gradient_height)`.
///
/// Opacity is 1 inside the rectangle and falls linearly to 0 over a band of
/// `falloff` units outside it. The band is measured per axis and the larger
/// overhang wins, so the falloff region has square corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangular {
    pub intensity_width: f32,
    pub gradient_height: f32,
    /// Width of the falloff band (>= 0; at least 1 when used as a divisor)
    pub falloff: f32,
}

impl Default for Rectangular {
    fn default() -> Self {
        Self {
            intensity_width: 40.0,
            gradient_height: 40.0,
            falloff: 5.0,
        }
    }
}

impl Rectangular {
    pub fn new(intensity_width: f32, gradient_height: f32, falloff: f32) -> Self {
        Self {
            intensity_width: floor_extent(intensity_width),
            gradient_height: floor_extent(gradient_height),
            falloff: floor_falloff(falloff),
        }
    }

    pub fn evaluate(&self, di: f32, dg: f32) -> f32 {
        let half_w = self.intensity_width / 2.0;
        let half_h = self.gradient_height / 2.0;
        let band = self.falloff.max(1.0);

        let over_x = (di.abs() - half_w).max(0.0) / band;
        let over_y = (dg.abs() - half_h).max(0.0) / band;
        let overhang = over_x.max(over_y);

        if overhang >= 1.0 {
            0.0
        } else {
            1.0 - overhang
        }
    }

    pub fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![
            ("intensity_width", ParamSpec::slider(self.intensity_width, (5.0, 200.0), 1.0)),
            ("gradient_height", ParamSpec::slider(self.gradient_height, (5.0, 200.0), 1.0)),
            ("falloff", ParamSpec::slider(self.falloff, (0.0, 50.0), 1.0)),
        ]
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<bool, WidgetError> {
        match name {
            "intensity_width" => self.intensity_width = floor_extent(value.as_number(name)?),
            "gradient_height" => self.gradient_height = floor_extent(value.as_number(name)?),
            "falloff" => self.falloff = floor_falloff(value.as_number(name)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[inline]
fn floor_falloff(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
