//! Triangular opacity function with optional one-sided gradient response.

use super::floor_extent;
use crate::widget::schema::{ParamSpec, ParamValue};
use crate::widget::WidgetError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which side of the center gradient a triangle covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriangleDirection {
    /// Only gradients at or above the center
    Up,
    /// Only gradients at or below the center
    Down,
    /// Both sides
    #[default]
    Symmetric,
}

impl TriangleDirection {
    pub const OPTIONS: [&'static str; 3] = ["up", "down", "symmetric"];

    pub fn as_str(self) -> &'static str {
        match self {
            TriangleDirection::Up => "up",
            TriangleDirection::Down => "down",
            TriangleDirection::Symmetric => "symmetric",
        }
    }
}

impl FromStr for TriangleDirection {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(TriangleDirection::Up),
            "down" => Ok(TriangleDirection::Down),
            "symmetric" => Ok(TriangleDirection::Symmetric),
            _ => Err(WidgetError::InvalidValue {
                name: "direction".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Triangle with base `intensity_width` and height `gradient_height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangular {
    pub intensity_width: f32,
    pub gradient_height: f32,
    pub direction: TriangleDirection,
}

impl Default for Triangular {
    fn default() -> Self {
        Self {
            intensity_width: 50.0,
            gradient_height: 50.0,
            direction: TriangleDirection::Symmetric,
        }
    }
}

impl Triangular {
    pub fn new(intensity_width: f32, gradient_height: f32, direction: TriangleDirection) -> Self {
        Self {
            intensity_width: floor_extent(intensity_width),
            gradient_height: floor_extent(gradient_height),
            direction,
        }
    }

    pub fn evaluate(&self, di: f32, dg: f32) -> f32 {
        let half_w = self.intensity_width.max(1.0) / 2.0;
        let half_h = self.gradient_height.max(1.0) / 2.0;
        let dx = di.abs() / half_w;

        let rel = match self.direction {
            TriangleDirection::Symmetric => {
                let dy = dg.abs() / half_h;
                return (1.0 - dx - dy).max(0.0);
            }
            TriangleDirection::Up if dg < 0.0 => return 0.0,
            TriangleDirection::Down if dg > 0.0 => return 0.0,
            TriangleDirection::Up | TriangleDirection::Down => dg.abs() / half_h,
        };

        if dx > 1.0 || rel > 1.0 {
            return 0.0;
        }
        (1.0 - dx - rel).max(0.0)
    }

    pub fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![
            ("intensity_width", ParamSpec::slider(self.intensity_width, (10.0, 200.0), 1.0)),
            ("gradient_height", ParamSpec::slider(self.gradient_height, (10.0, 200.0), 1.0)),
            (
                "direction",
                ParamSpec::combo(self.direction.as_str(), &TriangleDirection::OPTIONS),
            ),
        ]
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<bool, WidgetError> {
        match name {
            "intensity_width" => self.intensity_width = floor_extent(value.as_number(name)?),
            "gradient_height" => self.gradient_height = floor_extent(value.as_number(name)?),
            "direction" => self.direction = value.as_choice(name)?.parse()?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}
