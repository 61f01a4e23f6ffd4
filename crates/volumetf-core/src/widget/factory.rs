//! Widget construction from a kind, an optional named preset and overrides.

use super::schema::ParamValue;
use super::{Widget, WidgetError};
use crate::shape::{Gaussian, Shape, WidgetKind};
use crate::{Rgb, DOMAIN_MAX, DOMAIN_MIN};

/// A named starting point for a widget.
#[derive(Debug, Clone, Copy)]
struct Preset {
    name: &'static str,
    center: (f32, f32),
    shape: PresetShape,
    opacity: f32,
    color: [f32; 3],
}

#[derive(Debug, Clone, Copy)]
enum PresetShape {
    Gaussian { intensity_std: f32, gradient_std: f32 },
}

impl PresetShape {
    fn kind(self) -> WidgetKind {
        match self {
            PresetShape::Gaussian { .. } => WidgetKind::Gaussian,
        }
    }

    fn to_shape(self) -> Shape {
        match self {
            PresetShape::Gaussian {
                intensity_std,
                gradient_std,
            } => Shape::Gaussian(Gaussian::new(intensity_std, gradient_std)),
        }
    }
}

const PRESETS: [Preset; 3] = [
    Preset {
        name: "soft_tissue",
        center: (120.0, 80.0),
        shape: PresetShape::Gaussian {
            intensity_std: 25.0,
            gradient_std: 30.0,
        },
        opacity: 0.6,
        color: [0.8, 0.8, 1.0],
    },
    Preset {
        name: "bone",
        center: (200.0, 150.0),
        shape: PresetShape::Gaussian {
            intensity_std: 15.0,
            gradient_std: 20.0,
        },
        opacity: 0.9,
        color: [1.0, 1.0, 0.8],
    },
    Preset {
        name: "vessels",
        center: (80.0, 180.0),
        shape: PresetShape::Gaussian {
            intensity_std: 10.0,
            gradient_std: 8.0,
        },
        opacity: 0.7,
        color: [1.0, 0.8, 0.8],
    },
];

/// Builds widgets.
pub struct WidgetFactory;

impl WidgetFactory {
    /// Create a widget of `kind`.
    ///
    /// A known `preset` replaces the defaults; an unknown one is logged and
    /// ignored. `overrides` are then applied through [`Widget::set_param`], so
    /// the first invalid override aborts creation.
    pub fn create(
        kind: WidgetKind,
        preset: Option<&str>,
        overrides: &[(&str, ParamValue)],
    ) -> Result<Widget, WidgetError> {
        let mut widget = match preset {
            Some(name) => Self::preset(kind, name).unwrap_or_else(|| {
                log::warn!("unknown {} preset '{}', using defaults", kind, name);
                Widget::new(Shape::default_for(kind))
            }),
            None => Widget::new(Shape::default_for(kind)),
        };

        for (name, value) in overrides {
            widget.set_param(name, value)?;
        }

        log::debug!("created {} widget at {:?}", kind, widget.center);
        Ok(widget)
    }

    /// Look up a named preset for a kind.
    pub fn preset(kind: WidgetKind, name: &str) -> Option<Widget> {
        PRESETS
            .iter()
            .find(|p| p.shape.kind() == kind && p.name == name)
            .map(|p| {
                Widget::new(p.shape.to_shape())
                    .with_center(p.center.0, p.center.1)
                    .with_opacity(p.opacity)
                    .with_color(Rgb::from_array(p.color))
            })
    }

    /// Names of the presets available for a kind.
    pub fn preset_names(kind: WidgetKind) -> Vec<&'static str> {
        PRESETS
            .iter()
            .filter(|p| p.shape.kind() == kind)
            .map(|p| p.name)
            .collect()
    }

    /// The widget seeded into a fresh or reset widget set: a Gaussian at the
    /// domain center with σ at 10% of the domain.
    pub fn default_widget() -> Widget {
        let span = DOMAIN_MAX - DOMAIN_MIN;
        let mid = DOMAIN_MIN + span / 2.0;
        Widget::new(Shape::Gaussian(Gaussian::new(span / 10.0, span / 10.0))).with_center(mid, mid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::BlendMode;

    #[test]
    fn test_create_defaults() {
        let w = WidgetFactory::create(WidgetKind::Triangular, None, &[]).unwrap();
        assert_eq!(w.kind(), WidgetKind::Triangular);
        assert_eq!(w.center, (128.0, 128.0));
        assert_eq!(w.opacity_scale, 1.0);
        assert_eq!(w.color, Rgb::WHITE);
        assert_eq!(w.blend_mode, BlendMode::Max);
    }

    #[test]
    fn test_create_from_preset() {
        let w = WidgetFactory::create(WidgetKind::Gaussian, Some("bone"), &[]).unwrap();
        assert_eq!(w.center, (200.0, 150.0));
        assert!((w.opacity_scale - 0.9).abs() < 1e-6);
        assert_eq!(w.color.to_array(), [1.0, 1.0, 0.8]);
        assert_eq!(w.shape, Shape::Gaussian(Gaussian::new(15.0, 20.0)));
    }

    #[test]
    fn test_overrides_win_over_preset() {
        let w = WidgetFactory::create(
            WidgetKind::Gaussian,
            Some("vessels"),
            &[
                ("center_intensity", ParamValue::Number(90.0)),
                ("blend_mode", ParamValue::from("add")),
            ],
        )
        .unwrap();
        assert_eq!(w.center, (90.0, 180.0));
        assert_eq!(w.blend_mode, BlendMode::Add);
    }

    #[test]
    fn test_color_and_falloff_overrides() {
        let w = WidgetFactory::create(
            WidgetKind::Gaussian,
            Some("bone"),
            &[
                ("color", ParamValue::Color([0.9, 0.1, 0.1])),
                ("falloff_power", ParamValue::Number(2.5)),
            ],
        )
        .unwrap();
        assert_eq!(w.color.to_array(), [0.9, 0.1, 0.1]);
        assert_eq!(
            w.shape,
            Shape::Gaussian(Gaussian::new(15.0, 20.0).with_falloff_power(2.5))
        );
        assert_eq!(w.center, (200.0, 150.0));
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        let w = WidgetFactory::create(WidgetKind::Gaussian, Some("lungs"), &[]).unwrap();
        assert_eq!(w, Widget::new(Shape::default_for(WidgetKind::Gaussian)));
        // Presets are per kind
        assert!(WidgetFactory::preset(WidgetKind::Diamond, "bone").is_none());
    }

    #[test]
    fn test_invalid_override_fails() {
        let result = WidgetFactory::create(
            WidgetKind::Diamond,
            None,
            &[("intensity_std", ParamValue::Number(4.0))],
        );
        assert_eq!(
            result,
            Err(WidgetError::UnknownParam("intensity_std".to_string()))
        );
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(
            WidgetFactory::preset_names(WidgetKind::Gaussian),
            vec!["soft_tissue", "bone", "vessels"]
        );
        assert!(WidgetFactory::preset_names(WidgetKind::Ellipsoid).is_empty());
    }

    #[test]
    fn test_default_widget() {
        let w = WidgetFactory::default_widget();
        assert_eq!(w.center, (127.5, 127.5));
        assert_eq!(w.shape, Shape::Gaussian(Gaussian::new(25.5, 25.5)));
    }
}
