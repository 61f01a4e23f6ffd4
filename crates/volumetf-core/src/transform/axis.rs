//! Linear and logarithmic intensity axes.

use crate::clamp_domain;
use serde::{Deserialize, Serialize};

/// `ln(1 + 255)`, the log-axis normalizer.
const LOG_NORM: f32 = 5.545_177_4;

/// Horizontal axis scale of the curve editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    #[default]
    Linear,
    /// `255 * ln(1 + x) / ln(256)`; expands the low end of the range
    Log,
}

impl AxisScale {
    /// Map a data value to display space.
    #[inline]
    pub fn to_display(self, data: f32) -> f32 {
        let x = clamp_domain(data);
        match self {
            AxisScale::Linear => x,
            AxisScale::Log => clamp_domain(255.0 * x.ln_1p() / LOG_NORM),
        }
    }

    /// Map a display value back to data space.
    #[inline]
    pub fn to_data(self, display: f32) -> f32 {
        let x = clamp_domain(display);
        match self {
            AxisScale::Linear => x,
            AxisScale::Log => clamp_domain(((x / 255.0) * LOG_NORM).exp_m1()),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            AxisScale::Linear => AxisScale::Log,
            AxisScale::Log => AxisScale::Linear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_norm_constant() {
        assert!((LOG_NORM - 256.0f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn test_linear_is_clamped_identity() {
        assert_eq!(AxisScale::Linear.to_display(42.0), 42.0);
        assert_eq!(AxisScale::Linear.to_display(-3.0), 0.0);
        assert_eq!(AxisScale::Linear.to_data(400.0), 255.0);
    }

    #[test]
    fn test_log_endpoints() {
        assert_eq!(AxisScale::Log.to_display(0.0), 0.0);
        assert!((AxisScale::Log.to_display(255.0) - 255.0).abs() < 1e-3);
        assert!((AxisScale::Log.to_data(255.0) - 255.0).abs() < 1e-2);
    }

    #[test]
    fn test_log_expands_low_end() {
        assert!(AxisScale::Log.to_display(10.0) > 100.0);
    }

    #[test]
    fn test_toggle() {
        assert_eq!(AxisScale::Linear.toggled(), AxisScale::Log);
        assert_eq!(AxisScale::Log.toggled(), AxisScale::Linear);
    }
}
