//! 256-entry opacity/color lookup tables.
//!
//! A [`Lut`] is what the renderer consumes every frame. It can be sampled
//! from the control-point curve, or from the composited widget field with
//! one of two strategies:
//!
//! - **Uniform**: evaluate on a regular grid, either at one fixed gradient or
//!   taking the maximum over a column of gradients
//! - **Data-driven**: evaluate at a seeded random subsample of the actual
//!   volume samples and keep the maximum per intensity bucket
//!
//! Both strategies are pure functions of their inputs; sampling twice gives
//! bit-identical tables.

use crate::composite::WidgetSet;
use crate::curve::ControlPointCurve;
use crate::volume::{ValueRange, Volume};
use crate::{Rgb, DOMAIN_MAX, DOMAIN_MIN};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Number of LUT entries.
pub const LUT_SIZE: usize = 256;

/// Floats per entry in [`Lut::flatten`].
pub const FLAT_STRIDE: usize = 5;

// ============================================================================
// Configuration
// ============================================================================

/// Grid used by uniform widget sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformScan {
    /// Evaluate every intensity at one gradient (the 1D widget view).
    FixedGradient(f32),
    /// Take the maximum over `samples` evenly spaced gradients (the 2D view).
    GradientScan { samples: usize },
}

impl Default for UniformScan {
    fn default() -> Self {
        UniformScan::GradientScan { samples: 64 }
    }
}

/// Settings for data-driven widget sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataDrivenConfig {
    /// Upper bound on sampled volume points
    pub max_points: usize,
    /// RNG seed; equal seeds give equal tables
    pub seed: u64,
    /// Opacities at or below this are ignored
    pub min_opacity: f32,
}

impl Default for DataDrivenConfig {
    fn default() -> Self {
        Self {
            max_points: 5000,
            seed: 0,
            min_opacity: 0.01,
        }
    }
}

/// Strategy for turning a widget set into a LUT.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetSampling {
    Uniform(UniformScan),
    DataDriven(DataDrivenConfig),
}

impl Default for WidgetSampling {
    fn default() -> Self {
        WidgetSampling::Uniform(UniformScan::default())
    }
}

// ============================================================================
// LUT
// ============================================================================

/// One table row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LutEntry {
    pub intensity: f32,
    pub opacity: f32,
    pub color: Rgb,
}

impl LutEntry {
    fn empty(index: usize) -> Self {
        Self {
            intensity: index as f32,
            opacity: 0.0,
            color: Rgb::WHITE,
        }
    }
}

/// Fixed-size lookup table, entry `i` at intensity `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut {
    entries: [LutEntry; LUT_SIZE],
}

impl Default for Lut {
    fn default() -> Self {
        Self {
            entries: std::array::from_fn(LutEntry::empty),
        }
    }
}

impl Lut {
    /// Interpolate the curve at every integer intensity.
    pub fn from_curve(curve: &ControlPointCurve) -> Self {
        let entries = std::array::from_fn(|i| {
            let (opacity, color) = curve.evaluate(i as f32);
            LutEntry {
                intensity: i as f32,
                opacity,
                color,
            }
        });
        Self { entries }
    }

    /// Evaluate the composited widgets on a regular grid.
    pub fn from_widgets_uniform(set: &WidgetSet, scan: UniformScan) -> Self {
        let entries = match scan {
            UniformScan::FixedGradient(gradient) => std::array::from_fn(|i| {
                let (opacity, color) = set.evaluate(i as f32, gradient);
                LutEntry {
                    intensity: i as f32,
                    opacity,
                    color,
                }
            }),
            UniformScan::GradientScan { samples } => {
                let gradients = scan_gradients(samples);
                std::array::from_fn(|i| max_over_gradients(set, i as f32, &gradients))
            }
        };
        Self { entries }
    }

    /// Evaluate the composited widgets at a seeded subsample of the volume.
    ///
    /// Each sampled point lands in bucket `floor(intensity)`; the bucket keeps
    /// the largest opacity seen and the color resolved at that point. Buckets
    /// with no point above `min_opacity` stay transparent white.
    pub fn from_widgets_data_driven(
        set: &WidgetSet,
        volume: &Volume,
        config: DataDrivenConfig,
    ) -> Self {
        let mut lut = Self::default();
        if volume.is_empty() || set.is_empty() {
            return lut;
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let amount = config.max_points.min(volume.len());
        let indices = rand::seq::index::sample(&mut rng, volume.len(), amount);

        for index in indices.iter() {
            let Some((intensity, gradient)) = volume.sample(index) else {
                continue;
            };
            let opacity = set.combined_opacity(intensity, gradient);
            if opacity <= config.min_opacity {
                continue;
            }
            let bucket = (intensity.floor().max(0.0) as usize).min(LUT_SIZE - 1);
            let entry = &mut lut.entries[bucket];
            if opacity > entry.opacity {
                entry.opacity = opacity;
                entry.color = set.resolve_color(intensity, gradient);
            }
        }

        log::debug!(
            "data-driven LUT from {} of {} samples (seed {})",
            amount,
            volume.len(),
            config.seed
        );
        lut
    }

    /// Sample widgets with the given strategy.
    pub fn from_widgets(set: &WidgetSet, sampling: &WidgetSampling, volume: &Volume) -> Self {
        match sampling {
            WidgetSampling::Uniform(scan) => Self::from_widgets_uniform(set, *scan),
            WidgetSampling::DataDriven(config) => {
                Self::from_widgets_data_driven(set, volume, *config)
            }
        }
    }

    pub fn entries(&self) -> &[LutEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&LutEntry> {
        self.entries.get(index)
    }

    pub fn opacities(&self) -> Vec<f32> {
        self.entries.iter().map(|e| e.opacity).collect()
    }

    pub fn colors(&self) -> Vec<Rgb> {
        self.entries.iter().map(|e| e.color).collect()
    }

    /// Entries with intensity mapped into the dataset's original range.
    pub fn to_original_range(&self, range: &ValueRange) -> Vec<LutEntry> {
        self.entries
            .iter()
            .map(|e| LutEntry {
                intensity: range.to_original(e.intensity),
                ..*e
            })
            .collect()
    }

    /// `[intensity, opacity, r, g, b]` per entry, for typed-array transfer.
    pub fn flatten(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(LUT_SIZE * FLAT_STRIDE);
        for e in &self.entries {
            out.extend_from_slice(&[e.intensity, e.opacity, e.color.r, e.color.g, e.color.b]);
        }
        out
    }
}

/// Evenly spaced gradients over the domain, endpoints included.
fn scan_gradients(samples: usize) -> Vec<f32> {
    let samples = samples.max(2);
    let step = (DOMAIN_MAX - DOMAIN_MIN) / (samples - 1) as f32;
    (0..samples).map(|k| DOMAIN_MIN + k as f32 * step).collect()
}

/// Maximum combined opacity down one intensity column, with the color at
/// the maximizing gradient. The lowest gradient wins ties.
fn max_over_gradients(set: &WidgetSet, intensity: f32, gradients: &[f32]) -> LutEntry {
    let mut best = LutEntry {
        intensity,
        opacity: 0.0,
        color: Rgb::WHITE,
    };
    for &g in gradients {
        let opacity = set.combined_opacity(intensity, g);
        if opacity > best.opacity {
            best.opacity = opacity;
            best.color = set.resolve_color(intensity, g);
        }
    }
    best
}
