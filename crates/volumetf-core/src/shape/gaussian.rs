//! 2D Gaussian opacity function.

use super::{floor_extent, floor_power};
use crate::widget::schema::{ParamSpec, ParamValue};
use crate::widget::WidgetError;
use serde::{Deserialize, Serialize};

/// Number of standard deviations at which the Gaussian is cut to zero.
pub const TRUNCATION_SIGMAS: f32 = 3.0;

/// Axis-aligned 2D Gaussian.
///
/// `exp(-0.5 * ((Δi/σi)² + (Δg/σg)²))` raised to `falloff_power`, truncated
/// to exactly zero on and outside the 3σ ellipse. A power above 1 narrows the
/// peak, below 1 flattens it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    /// Standard deviation along intensity (>= 1)
    pub intensity_std: f32,
    /// Standard deviation along gradient (>= 1)
    pub gradient_std: f32,
    #[serde(default = "unit_power")]
    pub falloff_power: f32,
}

fn unit_power() -> f32 {
    1.0
}

impl Default for Gaussian {
    fn default() -> Self {
        Self {
            intensity_std: 30.0,
            gradient_std: 30.0,
            falloff_power: 1.0,
        }
    }
}

impl Gaussian {
    pub fn new(intensity_std: f32, gradient_std: f32) -> Self {
        Self {
            intensity_std: floor_extent(intensity_std),
            gradient_std: floor_extent(gradient_std),
            falloff_power: 1.0,
        }
    }

    pub fn with_falloff_power(mut self, falloff_power: f32) -> Self {
        self.falloff_power = floor_power(falloff_power);
        self
    }

    #[inline]
    pub fn evaluate(&self, di: f32, dg: f32) -> f32 {
        let x = di / self.intensity_std.max(1.0);
        let y = dg / self.gradient_std.max(1.0);
        let dist_sq = x * x + y * y;

        if dist_sq >= TRUNCATION_SIGMAS * TRUNCATION_SIGMAS {
            return 0.0;
        }
        let value = (-0.5 * dist_sq).exp();
        if self.falloff_power == 1.0 {
            value
        } else {
            value.powf(self.falloff_power)
        }
    }

    pub fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![
            ("intensity_std", ParamSpec::slider(self.intensity_std, (1.0, 100.0), 1.0)),
            ("gradient_std", ParamSpec::slider(self.gradient_std, (1.0, 100.0), 1.0)),
            ("falloff_power", ParamSpec::slider(self.falloff_power, (0.5, 3.0), 0.1)),
        ]
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<bool, WidgetError> {
        match name {
            "intensity_std" => self.intensity_std = floor_extent(value.as_number(name)?),
            "gradient_std" => self.gradient_std = floor_extent(value.as_number(name)?),
            "falloff_power" => self.falloff_power = floor_power(value.as_number(name)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}
