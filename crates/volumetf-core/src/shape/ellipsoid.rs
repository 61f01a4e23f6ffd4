//! Ellipsoid opacity function with a power falloff.

use super::{floor_extent, floor_power};
use crate::widget::schema::{ParamSpec, ParamValue};
use crate::widget::WidgetError;
use serde::{Deserialize, Serialize};

/// Ellipse with radii `(intensity_radius, gradient_radius)`.
///
/// Opacity is `1 - d^p` where `d` is the distance in radius-normalized
/// coordinates (1 on the ellipse edge) and `p` is `falloff_power`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub intensity_radius: f32,
    pub gradient_radius: f32,
    pub falloff_power: f32,
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self {
            intensity_radius: 30.0,
            gradient_radius: 30.0,
            falloff_power: 1.0,
        }
    }
}

impl Ellipsoid {
    pub fn new(intensity_radius: f32, gradient_radius: f32, falloff_power: f32) -> Self {
        Self {
            intensity_radius: floor_extent(intensity_radius),
            gradient_radius: floor_extent(gradient_radius),
            falloff_power: floor_power(falloff_power),
        }
    }

    /// Normalized distance from the center (1.0 = on the edge).
    #[inline]
    fn normalized_distance(&self, di: f32, dg: f32) -> f32 {
        let x = di / self.intensity_radius.max(1.0);
        let y = dg / self.gradient_radius.max(1.0);
        (x * x + y * y).sqrt()
    }

    pub fn evaluate(&self, di: f32, dg: f32) -> f32 {
        // Bounding-box early out
        if di.abs() >= self.intensity_radius || dg.abs() >= self.gradient_radius {
            return 0.0;
        }

        let d = self.normalized_distance(di, dg);
        if d >= 1.0 {
            return 0.0;
        }
        (1.0 - d.powf(self.falloff_power)).max(0.0)
    }

    pub fn params(&self) -> Vec<(&'static str, ParamSpec)> {
        vec![
            ("intensity_radius", ParamSpec::slider(self.intensity_radius, (5.0, 100.0), 1.0)),
            ("gradient_radius", ParamSpec::slider(self.gradient_radius, (5.0, 100.0), 1.0)),
            ("falloff_power", ParamSpec::slider(self.falloff_power, (0.5, 3.0), 0.1)),
        ]
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<bool, WidgetError> {
        match name {
            "intensity_radius" => self.intensity_radius = floor_extent(value.as_number(name)?),
            "gradient_radius" => self.gradient_radius = floor_extent(value.as_number(name)?),
            "falloff_power" => self.falloff_power = floor_power(value.as_number(name)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::MIN_FALLOFF_POWER;

    #[test]
    fn test_linear_power() {
        let e = Ellipsoid::new(30.0, 30.0, 1.0);
        assert_eq!(e.evaluate(0.0, 0.0), 1.0);
        assert!((e.evaluate(15.0, 0.0) - 0.5).abs() < 1e-6);
        assert_eq!(e.evaluate(30.0, 0.0), 0.0);
    }

    #[test]
    fn test_diagonal_edge_is_zero() {
        let e = Ellipsoid::new(30.0, 30.0, 1.0);
        // Inside the bounding box but outside the ellipse
        assert_eq!(e.evaluate(25.0, 25.0), 0.0);
    }

    #[test]
    fn test_higher_power_is_flatter() {
        let soft = Ellipsoid::new(40.0, 20.0, 1.0);
        let hard = Ellipsoid::new(40.0, 20.0, 3.0);
        assert!(hard.evaluate(20.0, 5.0) > soft.evaluate(20.0, 5.0));
    }

    #[test]
    fn test_power_floor() {
        let e = Ellipsoid::new(30.0, 30.0, 0.0);
        assert_eq!(e.falloff_power, MIN_FALLOFF_POWER);
        let mut e = Ellipsoid::default();
        assert_eq!(e.set_param("falloff_power", &ParamValue::Number(-1.0)), Ok(true));
        assert_eq!(e.falloff_power, MIN_FALLOFF_POWER);
    }
}
