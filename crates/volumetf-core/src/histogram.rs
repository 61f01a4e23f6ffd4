//! Histogram computation from normalized volume data.
//!
//! This module provides the 256-bin intensity histogram used to seed the
//! initial curve and draw the 1D editor background, and the 256x256 joint
//! intensity/gradient histogram drawn behind the 2D editors.

use crate::{DOMAIN_MAX, DOMAIN_MIN};

/// Number of bins per axis.
pub const HISTOGRAM_BINS: usize = 256;

/// Map a normalized value to one of `bins` equal-width bins over `[0, 255]`.
///
/// The upper edge is inclusive, so 255 lands in the last bin. Non-finite
/// values return `None`.
#[inline]
fn bin_index(value: f32, bins: usize) -> Option<usize> {
    if !value.is_finite() || value < DOMAIN_MIN || value > DOMAIN_MAX {
        return None;
    }
    let width = (DOMAIN_MAX - DOMAIN_MIN) / bins as f32;
    Some((((value - DOMAIN_MIN) / width) as usize).min(bins - 1))
}

/// Scale counts into `[0, 1]`, optionally through `log1p` first.
fn normalize_counts(counts: &[u32], log: bool) -> Vec<f32> {
    let mut values: Vec<f32> = counts
        .iter()
        .map(|&c| if log { (c as f32).ln_1p() } else { c as f32 })
        .collect();
    let max = values.iter().copied().fold(0.0f32, f32::max);
    if max > 0.0 {
        for v in values.iter_mut() {
            *v /= max;
        }
    }
    values
}

// ============================================================================
// Intensity Histogram
// ============================================================================

/// 256-bin histogram of normalized intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityHistogram {
    /// Bin counts over `[0, 255]`
    pub bins: [u32; HISTOGRAM_BINS],
}

impl Default for IntensityHistogram {
    fn default() -> Self {
        Self {
            bins: [0; HISTOGRAM_BINS],
        }
    }
}

impl IntensityHistogram {
    /// Create a new empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Count normalized intensities. Values outside `[0, 255]` are ignored.
    ///
    /// # Performance
    /// Single pass, O(n) time, constant memory.
    pub fn compute(values: &[f32]) -> Self {
        let mut hist = Self::new();
        for &v in values {
            if let Some(bin) = bin_index(v, HISTOGRAM_BINS) {
                hist.bins[bin] += 1;
            }
        }
        hist
    }

    /// Center of a bin in intensity units.
    #[inline]
    pub fn bin_center(bin: usize) -> f32 {
        let width = (DOMAIN_MAX - DOMAIN_MIN) / HISTOGRAM_BINS as f32;
        DOMAIN_MIN + (bin as f32 + 0.5) * width
    }

    /// Tallest bin.
    pub fn max_count(&self) -> u32 {
        *self.bins.iter().max().unwrap_or(&0)
    }

    /// Total number of counted samples.
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|&c| c as u64).sum()
    }

    /// Bin heights scaled to `[0, 1]` for display, optionally log-compressed.
    pub fn normalized(&self, log: bool) -> Vec<f32> {
        normalize_counts(&self.bins, log)
    }

    /// Coarser display histogram as `(bin_center, height)` pairs.
    ///
    /// The editor background uses fewer bins than the LUT so sparse data
    /// still draws a readable silhouette.
    pub fn display_curve(values: &[f32], bins: usize, log: bool) -> Vec<(f32, f32)> {
        let bins = bins.max(1);
        let mut counts = vec![0u32; bins];
        for &v in values {
            if let Some(bin) = bin_index(v, bins) {
                counts[bin] += 1;
            }
        }
        let width = (DOMAIN_MAX - DOMAIN_MIN) / bins as f32;
        normalize_counts(&counts, log)
            .into_iter()
            .enumerate()
            .map(|(i, h)| (DOMAIN_MIN + (i as f32 + 0.5) * width, h))
            .collect()
    }
}

// ============================================================================
// Joint Histogram
// ============================================================================

/// 256x256 histogram over (intensity, gradient), row-major by gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct JointHistogram {
    counts: Vec<u32>,
}

impl JointHistogram {
    /// Count paired samples. Pairs with either value outside `[0, 255]` are
    /// ignored; extra elements of the longer slice are ignored too.
    pub fn compute(intensity: &[f32], gradient: &[f32]) -> Self {
        let mut counts = vec![0u32; HISTOGRAM_BINS * HISTOGRAM_BINS];
        for (&i, &g) in intensity.iter().zip(gradient) {
            if let (Some(bi), Some(bg)) = (
                bin_index(i, HISTOGRAM_BINS),
                bin_index(g, HISTOGRAM_BINS),
            ) {
                counts[bg * HISTOGRAM_BINS + bi] += 1;
            }
        }
        Self { counts }
    }

    /// Count at (intensity bin, gradient bin).
    pub fn count(&self, intensity_bin: usize, gradient_bin: usize) -> u32 {
        if intensity_bin >= HISTOGRAM_BINS || gradient_bin >= HISTOGRAM_BINS {
            return 0;
        }
        self.counts[gradient_bin * HISTOGRAM_BINS + intensity_bin]
    }

    pub fn max_count(&self) -> u32 {
        *self.counts.iter().max().unwrap_or(&0)
    }

    /// Cell values scaled to `[0, 1]`, optionally log-compressed, row-major by gradient.
    pub fn normalized(&self, log: bool) -> Vec<f32> {
        normalize_counts(&self.counts, log)
    }
}
