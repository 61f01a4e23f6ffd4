//! Normalized volume samples.
//!
//! The editor works on intensity and gradient magnitude normalized into
//! `[0, 255]`. The original value range of each array is kept so sampled
//! lookup tables can be mapped back into raw units for the renderer.

use crate::histogram::{IntensityHistogram, JointHistogram};
use crate::{clamp_domain, DOMAIN_MAX};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from building a [`Volume`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VolumeError {
    #[error("Intensity has {intensity} samples but gradient has {gradient}")]
    LengthMismatch { intensity: usize, gradient: usize },

    #[error("Non-finite {array} value at index {index}")]
    NonFinite { array: &'static str, index: usize },
}

/// Result type for volume construction.
pub type VolumeResult<T> = Result<T, VolumeError>;

// ============================================================================
// Value Range
// ============================================================================

/// Original `(min, max)` of a raw array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Map a normalized `[0, 255]` value back into this range.
    #[inline]
    pub fn to_original(&self, normalized: f32) -> f32 {
        self.min + clamp_domain(normalized) / DOMAIN_MAX * self.span()
    }

    /// Whether `other` is a different dataset range rather than noise.
    ///
    /// True when either bound moved by more than `tolerance` times this
    /// range's span, or when one span is zero and the other is not.
    pub fn differs_materially(&self, other: &ValueRange, tolerance: f32) -> bool {
        let span = self.span();
        if span <= 0.0 || other.span() <= 0.0 {
            return (span <= 0.0) != (other.span() <= 0.0) || self.min != other.min;
        }
        let limit = span * tolerance;
        (self.min - other.min).abs() > limit || (self.max - other.max).abs() > limit
    }

    fn of(values: &[f32]) -> Self {
        let mut iter = values.iter().copied();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Self { min, max }
    }
}

/// Normalize into `[0, 255]`; a zero range yields zeros.
fn normalize(values: &[f32], range: &ValueRange) -> Vec<f32> {
    let span = range.span();
    if span <= 0.0 {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|&v| clamp_domain(DOMAIN_MAX * (v - range.min) / span))
        .collect()
}

fn check_finite(values: &[f32], array: &'static str) -> VolumeResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(VolumeError::NonFinite { array, index }),
        None => Ok(()),
    }
}

// ============================================================================
// Volume
// ============================================================================

/// Paired intensity and gradient samples in `[0, 255]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Volume {
    intensity: Vec<f32>,
    gradient: Vec<f32>,
    intensity_range: ValueRange,
    gradient_range: ValueRange,
}

impl Volume {
    /// Normalize raw arrays.
    ///
    /// # Errors
    /// - [`VolumeError::LengthMismatch`] if the arrays differ in length
    /// - [`VolumeError::NonFinite`] on NaN or infinite samples
    pub fn from_raw(intensity: &[f32], gradient: &[f32]) -> VolumeResult<Self> {
        if intensity.len() != gradient.len() {
            return Err(VolumeError::LengthMismatch {
                intensity: intensity.len(),
                gradient: gradient.len(),
            });
        }
        check_finite(intensity, "intensity")?;
        check_finite(gradient, "gradient")?;

        let intensity_range = ValueRange::of(intensity);
        let gradient_range = ValueRange::of(gradient);
        log::debug!(
            "volume with {} samples, intensity {:?}, gradient {:?}",
            intensity.len(),
            intensity_range,
            gradient_range
        );

        Ok(Self {
            intensity: normalize(intensity, &intensity_range),
            gradient: normalize(gradient, &gradient_range),
            intensity_range,
            gradient_range,
        })
    }

    /// Wrap already-normalized arrays (clamped into `[0, 255]`) with their
    /// original ranges.
    pub fn from_normalized(
        intensity: Vec<f32>,
        gradient: Vec<f32>,
        intensity_range: ValueRange,
        gradient_range: ValueRange,
    ) -> VolumeResult<Self> {
        if intensity.len() != gradient.len() {
            return Err(VolumeError::LengthMismatch {
                intensity: intensity.len(),
                gradient: gradient.len(),
            });
        }
        check_finite(&intensity, "intensity")?;
        check_finite(&gradient, "gradient")?;

        Ok(Self {
            intensity: intensity.into_iter().map(clamp_domain).collect(),
            gradient: gradient.into_iter().map(clamp_domain).collect(),
            intensity_range,
            gradient_range,
        })
    }

    /// A volume without samples.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.intensity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensity.is_empty()
    }

    pub fn intensity(&self) -> &[f32] {
        &self.intensity
    }

    pub fn gradient(&self) -> &[f32] {
        &self.gradient
    }

    pub fn intensity_range(&self) -> ValueRange {
        self.intensity_range
    }

    pub fn gradient_range(&self) -> ValueRange {
        self.gradient_range
    }

    /// Sample `index` as `(intensity, gradient)`.
    pub fn sample(&self, index: usize) -> Option<(f32, f32)> {
        Some((*self.intensity.get(index)?, *self.gradient.get(index)?))
    }

    pub fn histogram(&self) -> IntensityHistogram {
        IntensityHistogram::compute(&self.intensity)
    }

    pub fn joint_histogram(&self) -> JointHistogram {
        JointHistogram::compute(&self.intensity, &self.gradient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let v = Volume::from_raw(&[-100.0, 0.0, 100.0], &[5.0, 10.0, 15.0]).unwrap();
        assert_eq!(v.intensity(), &[0.0, 127.5, 255.0]);
        assert_eq!(v.gradient(), &[0.0, 127.5, 255.0]);
        assert_eq!(v.intensity_range(), ValueRange::new(-100.0, 100.0));
        assert_eq!(v.gradient_range(), ValueRange::new(5.0, 15.0));
    }

    #[test]
    fn test_zero_range_is_all_zero() {
        let v = Volume::from_raw(&[7.0, 7.0, 7.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!(v.intensity().iter().all(|&x| x == 0.0));
        assert!(v.intensity().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            Volume::from_raw(&[1.0, 2.0], &[1.0]),
            Err(VolumeError::LengthMismatch {
                intensity: 2,
                gradient: 1
            })
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(
            Volume::from_raw(&[1.0, f32::NAN], &[1.0, 2.0]),
            Err(VolumeError::NonFinite {
                array: "intensity",
                index: 1
            })
        );
        assert!(Volume::from_raw(&[1.0], &[f32::INFINITY]).is_err());
    }

    #[test]
    fn test_empty_volume() {
        let v = Volume::from_raw(&[], &[]).unwrap();
        assert!(v.is_empty());
        assert_eq!(v.histogram().total(), 0);
        assert_eq!(v, Volume::empty());
    }

    #[test]
    fn test_from_normalized_clamps() {
        let v = Volume::from_normalized(
            vec![-1.0, 300.0],
            vec![10.0, 20.0],
            ValueRange::new(0.0, 1000.0),
            ValueRange::new(0.0, 1.0),
        )
        .unwrap();
        assert_eq!(v.intensity(), &[0.0, 255.0]);
        assert_eq!(v.sample(1), Some((255.0, 20.0)));
        assert_eq!(v.sample(2), None);
    }

    #[test]
    fn test_to_original() {
        let range = ValueRange::new(-1000.0, 3000.0);
        assert_eq!(range.to_original(0.0), -1000.0);
        assert_eq!(range.to_original(255.0), 3000.0);
        assert!((range.to_original(127.5) - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_differs_materially() {
        let a = ValueRange::new(0.0, 1000.0);
        assert!(!a.differs_materially(&ValueRange::new(0.5, 1000.5), 1e-3));
        assert!(a.differs_materially(&ValueRange::new(0.0, 1200.0), 1e-3));
        assert!(a.differs_materially(&ValueRange::new(5.0, 5.0), 1e-3));
        let flat = ValueRange::new(5.0, 5.0);
        assert!(!flat.differs_materially(&ValueRange::new(5.0, 5.0), 1e-3));
        assert!(flat.differs_materially(&ValueRange::new(6.0, 6.0), 1e-3));
    }

    #[test]
    fn test_histograms_from_volume() {
        let v = Volume::from_raw(&[0.0, 1.0, 1.0], &[0.0, 0.0, 1.0]).unwrap();
        let hist = v.histogram();
        assert_eq!(hist.bins[0], 1);
        assert_eq!(hist.bins[255], 2);
        assert_eq!(v.joint_histogram().count(255, 255), 1);
    }
}
