//! Diamond (L1 ball) opacity function.

use super::floor_extent;
use crate::widget::schema::{ParamSpec, ParamValue};
use crate::widget::WidgetError;
use serde::{Deserialize, Serialize};

/// Diamond spanning `intensity_width` by `gradient_height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diamond {
    pub intensity_width: f32,
    pub gradient_height: f32,
}

impl Default for Diamond {
    fn default() -> Self {
        Self {
            intensity_width: 50.0,
            gradient_height: 50.0,
        }
    }
}

impl Diamond {
    pub fn new(intensity_width: f32, gradient_height: f32) -> Self {
        Self {
            intensity_width: floor_extent(intensity_width),
            gradient_height: floor_extent(gradient_height),
        }
    }

    pub fn evaluate(&self, di: f32, dg: f32) -> f32 {
        let dx = di.abs() / (self.intensity_width.max(1.0) / 2.0);
        let dy = dg.abs() / (self.gradient_height.max(1.0) / 2.0);
        (1.0 - (dx + dy)).max(0.0)
    }

    pub fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![
            ("intensity_width", ParamSpec::slider(self.intensity_width, (10.0, 200.0), 1.0)),
            ("gradient_height", ParamSpec::slider(self.gradient_height, (10.0, 200.0), 1.0)),
        ]
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<bool, WidgetError> {
        match name {
            "intensity_width" => self.intensity_width = floor_extent(value.as_number(name)?),
            "gradient_height" => self.gradient_height = floor_extent(value.as_number(name)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}
