//! Range diagnostics for permissive input validation.
//!
//! Encoders and display models accept out-of-range input: they warn and keep
//! going. The warning is returned as a value next to the result so callers
//! and tests can inspect it without capturing console output.
//!
//! ```rust
//! use pu21_core::diagnostics::{RangeScan, WarningSource};
//!
//! let scan = RangeScan::scan(&[0.5, 1.5, -0.2], 0.0, 1.0);
//! let warning = scan.into_warning(WarningSource::DisplayInput, 0.0, 1.0).unwrap();
//! assert_eq!(warning.count, 2);
//! assert_eq!(warning.min, -0.2);
//! ```

use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Which transform raised a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningSource {
    /// Luminance passed to the PU21 encoder.
    EncoderInput,
    /// Pixel values passed to the display model.
    DisplayInput,
}

impl fmt::Display for WarningSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EncoderInput => f.write_str("encoder input"),
            Self::DisplayInput => f.write_str("display model input"),
        }
    }
}

/// Non-fatal report of values outside a transform's valid domain.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeWarning {
    /// Transform that saw the values.
    pub source: WarningSource,
    /// Number of offending elements (NaN included).
    pub count: usize,
    /// Smallest finite value seen.
    pub min: f32,
    /// Largest finite value seen.
    pub max: f32,
    /// Lower end of the valid domain.
    pub valid_min: f32,
    /// Upper end of the valid domain.
    pub valid_max: f32,
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} value(s) passed to {} outside the valid range [{}, {}] (observed [{}, {}])",
            self.count, self.source, self.valid_min, self.valid_max, self.min, self.max
        )
    }
}

/// A result with the range warnings collected while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Checked<T> {
    /// The computed value.
    pub value: T,
    /// Warnings raised on the way, in order.
    pub warnings: Vec<RangeWarning>,
}

impl<T> Checked<T> {
    /// Wraps a value with no warnings.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Wraps a value with an optional warning.
    pub fn new(value: T, warning: Option<RangeWarning>) -> Self {
        Self {
            value,
            warnings: warning.into_iter().collect(),
        }
    }

    /// `true` if nothing was reported.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Drops the warnings.
    #[inline]
    pub fn into_value(self) -> T {
        self.value
    }

    /// Transforms the value, keeping the warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Checked<U> {
        Checked {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Appends warnings from another step.
    pub fn absorb(&mut self, warnings: impl IntoIterator<Item = RangeWarning>) {
        self.warnings.extend(warnings);
    }
}

/// One-pass summary of values outside `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeScan {
    /// Elements outside the range, NaN included.
    pub count: usize,
    /// Smallest finite value.
    pub min: f32,
    /// Largest finite value.
    pub max: f32,
}

impl RangeScan {
    const EMPTY: Self = Self {
        count: 0,
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    fn single(v: f32, lo: f32, hi: f32) -> Self {
        // NaN fails both comparisons and counts as out of range
        let inside = v >= lo && v <= hi;
        // Only finite values contribute to the observed range
        let (min, max) = if v.is_finite() {
            (v, v)
        } else {
            (f32::INFINITY, f32::NEG_INFINITY)
        };
        Self {
            count: usize::from(!inside),
            min,
            max,
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Scans `values` against the closed range `[lo, hi]`.
    pub fn scan(values: &[f32], lo: f32, hi: f32) -> Self {
        #[cfg(feature = "parallel")]
        let scan = values
            .par_iter()
            .map(|&v| Self::single(v, lo, hi))
            .reduce(|| Self::EMPTY, Self::merge);
        #[cfg(not(feature = "parallel"))]
        let scan = values
            .iter()
            .map(|&v| Self::single(v, lo, hi))
            .fold(Self::EMPTY, Self::merge);
        scan
    }

    /// Turns the scan into a warning if anything was out of range.
    pub fn into_warning(self, source: WarningSource, valid_min: f32, valid_max: f32) -> Option<RangeWarning> {
        (self.count > 0).then_some(RangeWarning {
            source,
            count: self.count,
            min: self.min,
            max: self.max,
            valid_min,
            valid_max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_scan() {
        let scan = RangeScan::scan(&[0.0, 0.5, 1.0], 0.0, 1.0);
        assert_eq!(scan.count, 0);
        assert_eq!(scan.min, 0.0);
        assert_eq!(scan.max, 1.0);
        assert!(scan.into_warning(WarningSource::DisplayInput, 0.0, 1.0).is_none());
    }

    #[test]
    fn test_nan_counts() {
        let scan = RangeScan::scan(&[0.5, f32::NAN], 0.0, 1.0);
        assert_eq!(scan.count, 1);
        assert_eq!(scan.max, 0.5);
    }

    #[test]
    fn test_infinity_counts_but_not_in_range() {
        let scan = RangeScan::scan(&[f32::NAN, f32::INFINITY, 0.5, 2.0], 0.0, 1.0);
        assert_eq!(scan.count, 3);
        assert_eq!(scan.min, 0.5);
        assert_eq!(scan.max, 2.0);
    }

    #[test]
    fn test_empty_slice() {
        let scan = RangeScan::scan(&[], 0.0, 1.0);
        assert_eq!(scan.count, 0);
    }

    #[test]
    fn test_warning_message() {
        let w = RangeScan::scan(&[20000.0], 0.005, 10000.0)
            .into_warning(WarningSource::EncoderInput, 0.005, 10000.0)
            .unwrap();
        let msg = w.to_string();
        assert!(msg.contains("encoder input"));
        assert!(msg.contains("20000"));
    }

    #[test]
    fn test_checked_map() {
        let c = Checked::new(2, None).map(|v| v * 3);
        assert!(c.is_clean());
        assert_eq!(c.into_value(), 6);
    }
}
