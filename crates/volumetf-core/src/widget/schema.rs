//! Declarative parameter schema for binding widget parameters to UI controls.

use super::WidgetError;
use crate::Rgb;
use serde::{Deserialize, Serialize};

/// Control used to edit a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Slider,
    Combo,
    Color,
}

/// A parameter value: numeric for sliders, a named option for combos,
/// `[r, g, b]` for colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f32),
    Color([f32; 3]),
    Choice(String),
}

impl ParamValue {
    /// Read a finite number, or report which parameter had the wrong type.
    pub fn as_number(&self, name: &str) -> Result<f32, WidgetError> {
        match self {
            ParamValue::Number(v) if v.is_finite() => Ok(*v),
            other => Err(WidgetError::InvalidValue {
                name: name.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Read a color with finite channels, clamped into `[0, 1]`.
    pub fn as_color(&self, name: &str) -> Result<Rgb, WidgetError> {
        match self {
            ParamValue::Color(rgb) if rgb.iter().all(|c| c.is_finite()) => {
                Ok(Rgb::from_array(*rgb))
            }
            other => Err(WidgetError::InvalidValue {
                name: name.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Read an option name.
    pub fn as_choice(&self, name: &str) -> Result<&str, WidgetError> {
        match self {
            ParamValue::Choice(s) => Ok(s.as_str()),
            other => Err(WidgetError::InvalidValue {
                name: name.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{}", v),
            ParamValue::Color([r, g, b]) => write!(f, "[{}, {}, {}]", r, g, b),
            ParamValue::Choice(s) => f.write_str(s),
        }
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Number(value)
    }
}

impl From<Rgb> for ParamValue {
    fn from(value: Rgb) -> Self {
        ParamValue::Color(value.to_array())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Choice(value.to_string())
    }
}

/// Description of one editable parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub value: ParamValue,
    /// Slider bounds
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub range: Option<(f32, f32)>,
    /// Slider step
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub step: Option<f32>,
    /// Combo options
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<String>,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub fn slider(value: f32, range: (f32, f32), step: f32) -> Self {
        Self {
            value: ParamValue::Number(value),
            range: Some(range),
            step: Some(step),
            options: Vec::new(),
            kind: ParamKind::Slider,
        }
    }

    pub fn combo(value: &str, options: &[&str]) -> Self {
        Self {
            value: ParamValue::Choice(value.to_string()),
            range: None,
            step: None,
            options: options.iter().map(|s| s.to_string()).collect(),
            kind: ParamKind::Combo,
        }
    }

    pub fn color(value: Rgb) -> Self {
        Self {
            value: ParamValue::from(value),
            range: None,
            step: None,
            options: Vec::new(),
            kind: ParamKind::Color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_value_untagged_json() {
        let n: ParamValue = serde_json::from_str("12.5").unwrap();
        assert_eq!(n, ParamValue::Number(12.5));
        let c: ParamValue = serde_json::from_str("\"add\"").unwrap();
        assert_eq!(c, ParamValue::Choice("add".to_string()));
        let rgb: ParamValue = serde_json::from_str("[1.0, 0.5, 0.0]").unwrap();
        assert_eq!(rgb, ParamValue::Color([1.0, 0.5, 0.0]));
    }

    #[test]
    fn test_color_value_is_clamped_and_checked() {
        let rgb = ParamValue::Color([1.5, 0.25, -1.0]).as_color("color").unwrap();
        assert_eq!(rgb.to_array(), [1.0, 0.25, 0.0]);
        assert!(ParamValue::Color([f32::NAN, 0.0, 0.0]).as_color("color").is_err());
        assert!(ParamValue::from("red").as_color("color").is_err());
        assert!(ParamValue::Color([0.0; 3]).as_number("opacity").is_err());
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let value = ParamValue::from("wide");
        assert!(matches!(
            value.as_number("intensity_std"),
            Err(WidgetError::InvalidValue { .. })
        ));
        assert!(ParamValue::Number(f32::NAN).as_number("opacity").is_err());
        assert_eq!(ParamValue::from(3.0).as_number("x"), Ok(3.0));
    }

    #[test]
    fn test_spec_serialization_skips_empty_fields() {
        let slider = serde_json::to_value(ParamSpec::slider(1.0, (0.0, 1.0), 0.01)).unwrap();
        assert!(slider.get("options").is_none());
        assert_eq!(slider["kind"], "slider");

        let combo = serde_json::to_value(ParamSpec::combo("max", &["max", "add"])).unwrap();
        assert!(combo.get("range").is_none());
        assert_eq!(combo["options"][1], "add");

        let color = serde_json::to_value(ParamSpec::color(Rgb::WHITE)).unwrap();
        assert_eq!(color["kind"], "color");
        assert_eq!(color["value"][2], 1.0);
        assert!(color.get("range").is_none());
    }
}
