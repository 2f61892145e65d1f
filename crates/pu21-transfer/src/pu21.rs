//! PU21 perceptually uniform luminance encoding.
//!
//! PU21 maps absolute luminance (cd/m2) to code values in which equal steps
//! are roughly equally visible, so that metrics designed for 8-bit SDR images
//! (PSNR, SSIM) can be run on HDR content.
//!
//! # Range
//!
//! - Linear: [0.005, 10000] cd/m2, inputs are clamped to it
//! - Encoded: [0, p7-scaled maximum], about 256 at 100 cd/m2
//!
//! The raw code range is chosen so that SDR luminance levels land on the
//! familiar 0-255 scale. [`PuEncoder::encode_normalized`] divides by the code
//! at 10000 cd/m2 for a [0, 1] range instead.
//!
//! # Formula
//!
//! ```text
//! V = p7 * (((p1 + p2 * Y^p4) / (1 + p3 * Y^p4))^p5 - p6)
//!
//! V' = max(V / p7 + p6, 0)^(1 / p5)
//! Y  = (max(V' - p1, 0) / (p2 - p3 * V'))^(1 / p4)
//! ```
//!
//! # Reference
//!
//! R. Mantiuk and M. Azimi, "PU21: A novel perceptually uniform encoding for
//! adapting existing quality metrics for HDR", Picture Coding Symposium 2021.
//!
//! # Usage
//!
//! ```rust
//! use pu21_transfer::pu21::{Calibration, PuEncoder};
//!
//! let pu = PuEncoder::new(Calibration::BandingGlare);
//!
//! // 100 cd/m2 lands near the top of the 8-bit scale
//! let v = pu.encode_value(100.0);
//! assert!((v - 256.38).abs() < 0.1);
//!
//! // decode is the exact inverse
//! let y = pu.decode_value(v);
//! assert!((y - 100.0).abs() < 0.01);
//! ```

use crate::par;
use pu21_core::{Checked, Error, RangeScan, RangeWarning, Result, Tensor, WarningSource};
use std::fmt;
use std::str::FromStr;
use tracing::{trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lowest luminance the encoding is fitted for, cd/m2.
pub const L_MIN: f32 = 0.005;

/// Highest luminance the encoding is fitted for, cd/m2.
pub const L_MAX: f32 = 10000.0;

/// Slack around [`L_MIN`, `L_MAX`] before a range warning is raised.
pub const RANGE_EPSILON: f32 = 1e-5;

/// Fitted parameter set.
///
/// Each calibration was fitted to a different psychophysical dataset.
/// [`Calibration::BandingGlare`] is the recommended default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Calibration {
    /// Contrast sensitivity to banding.
    Banding,
    /// Banding, with a glare model.
    #[default]
    BandingGlare,
    /// Peak luminance discrimination.
    Peaks,
    /// Peak luminance discrimination, with a glare model.
    PeaksGlare,
}

impl Calibration {
    /// All calibrations, in declaration order.
    pub const ALL: [Self; 4] = [Self::Banding, Self::BandingGlare, Self::Peaks, Self::PeaksGlare];

    /// Coefficients `[p1, p2, p3, p4, p5, p6, p7]`.
    pub const fn params(self) -> [f32; 7] {
        match self {
            Self::Banding => [
                1.070275272, 0.4088273932, 0.153224308, 0.2520326168, 1.063512885, 1.14115047,
                521.4527484,
            ],
            Self::BandingGlare => [
                0.353487901, 0.3734658629, 8.277049286e-05, 0.9062562627, 0.09150303166,
                0.9099517204, 596.3148142,
            ],
            Self::Peaks => [
                1.043882782, 0.6459495343, 0.3194584211, 0.374025247, 1.114783422, 1.095360363,
                384.9217577,
            ],
            Self::PeaksGlare => [
                816.885024, 1479.463946, 0.001253215609, 0.9329636822, 0.06746643971, 1.573435413,
                419.6006374,
            ],
        }
    }

    /// Canonical name (`"banding_glare"`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Banding => "banding",
            Self::BandingGlare => "banding_glare",
            Self::Peaks => "peaks",
            Self::PeaksGlare => "peaks_glare",
        }
    }
}

impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Calibration {
    type Err = Error;

    /// Parses a calibration name. Case and `-`/`_` are not significant.
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.name() == key)
            .ok_or_else(|| Error::unknown_calibration(s))
    }
}

/// Encoder between absolute luminance and PU21 code values.
///
/// Immutable after construction; `Copy`, and safe to share across threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PuEncoder {
    calibration: Calibration,
    par: [f32; 7],
    /// Code value at [`L_MAX`], used for normalization
    code_max: f32,
}

impl PuEncoder {
    /// Creates an encoder for a calibration.
    pub fn new(calibration: Calibration) -> Self {
        let par = calibration.params();
        let code_max = encode_with(&par, L_MAX);
        Self {
            calibration,
            par,
            code_max,
        }
    }

    /// Creates an encoder from a calibration name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCalibration`] for names other than
    /// `banding`, `banding_glare`, `peaks` and `peaks_glare`.
    ///
    /// ```rust
    /// use pu21_transfer::pu21::PuEncoder;
    ///
    /// assert!(PuEncoder::from_name("peaks_glare").is_ok());
    /// assert!(PuEncoder::from_name("glare").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Selected calibration.
    #[inline]
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Coefficients `[p1, ..., p7]`.
    #[inline]
    pub fn params(&self) -> &[f32; 7] {
        &self.par
    }

    /// Code value for [`L_MAX`].
    #[inline]
    pub fn code_max(&self) -> f32 {
        self.code_max
    }

    /// Code value for [`L_MIN`], approximately 0.
    #[inline]
    pub fn code_min(&self) -> f32 {
        self.encode_value(L_MIN)
    }

    /// Encodes one luminance value, clamping to [`L_MIN`, `L_MAX`].
    ///
    /// No diagnostics are produced; use [`encode`](Self::encode) for that.
    #[inline]
    pub fn encode_value(&self, y: f32) -> f32 {
        encode_with(&self.par, y.clamp(L_MIN, L_MAX))
    }

    /// Decodes one code value. Never clamps or validates.
    #[inline]
    pub fn decode_value(&self, v: f32) -> f32 {
        let [p1, p2, p3, p4, p5, p6, p7] = self.par.map(f64::from);
        let v = f64::from(v);
        // Both max() guards keep fractional powers away from negative bases
        let v_p = (v / p7 + p6).max(0.0).powf(1.0 / p5);
        ((v_p - p1).max(0.0) / (p2 - p3 * v_p)).powf(1.0 / p4) as f32
    }

    /// Encodes one value into [0, 1] (code divided by [`code_max`](Self::code_max)).
    #[inline]
    pub fn encode_normalized_value(&self, y: f32) -> f32 {
        self.encode_value(y) / self.code_max
    }

    /// Inverse of [`encode_normalized_value`](Self::encode_normalized_value).
    #[inline]
    pub fn decode_normalized_value(&self, v: f32) -> f32 {
        self.decode_value(v * self.code_max)
    }

    /// Checks `values` against the valid luminance range.
    ///
    /// Emits a `warn` event and returns the warning when anything lies outside
    /// `[L_MIN - RANGE_EPSILON, L_MAX + RANGE_EPSILON]` or is NaN.
    pub fn check_range(&self, values: &[f32]) -> Option<RangeWarning> {
        let warning = RangeScan::scan(values, L_MIN - RANGE_EPSILON, L_MAX + RANGE_EPSILON)
            .into_warning(WarningSource::EncoderInput, L_MIN, L_MAX)?;
        warn!(
            calibration = %self.calibration,
            count = warning.count,
            min = warning.min,
            max = warning.max,
            "values passed to encode are outside the valid range"
        );
        Some(warning)
    }

    /// Encodes `values` in place.
    ///
    /// Out-of-range values are reported, then clamped and encoded anyway.
    pub fn encode_in_place(&self, values: &mut [f32]) -> Option<RangeWarning> {
        trace!(calibration = %self.calibration, len = values.len(), "encode");
        let warning = self.check_range(values);
        par::apply(values, |y| self.encode_value(y));
        warning
    }

    /// Decodes `values` in place.
    pub fn decode_in_place(&self, values: &mut [f32]) {
        trace!(calibration = %self.calibration, len = values.len(), "decode");
        par::apply(values, |v| self.decode_value(v));
    }

    /// Encodes a slice of luminance values.
    ///
    /// ```rust
    /// use pu21_transfer::pu21::PuEncoder;
    ///
    /// let pu = PuEncoder::default();
    /// let out = pu.encode(&[0.001, 1.0]);
    /// assert_eq!(out.warnings.len(), 1);
    /// assert_eq!(out.value[0], pu.encode_value(0.005));
    /// ```
    pub fn encode(&self, values: &[f32]) -> Checked<Vec<f32>> {
        let mut out = values.to_vec();
        let warning = self.encode_in_place(&mut out);
        Checked::new(out, warning)
    }

    /// Decodes a slice of code values.
    pub fn decode(&self, values: &[f32]) -> Vec<f32> {
        let mut out = values.to_vec();
        self.decode_in_place(&mut out);
        out
    }

    /// Encodes a slice into [0, 1].
    pub fn encode_normalized(&self, values: &[f32]) -> Checked<Vec<f32>> {
        let mut out = values.to_vec();
        let warning = self.check_range(&out);
        par::apply(&mut out, |y| self.encode_normalized_value(y));
        Checked::new(out, warning)
    }

    /// Decodes normalized code values.
    pub fn decode_normalized(&self, values: &[f32]) -> Vec<f32> {
        let mut out = values.to_vec();
        par::apply(&mut out, |v| self.decode_normalized_value(v));
        out
    }

    /// Encodes every element of a tensor.
    pub fn encode_tensor(&self, luminance: &Tensor<f32>) -> Checked<Tensor<f32>> {
        let mut out = luminance.clone();
        let warning = self.encode_in_place(out.data_mut());
        Checked::new(out, warning)
    }

    /// Decodes every element of a tensor.
    pub fn decode_tensor(&self, codes: &Tensor<f32>) -> Tensor<f32> {
        let mut out = codes.clone();
        self.decode_in_place(out.data_mut());
        out
    }
}

impl Default for PuEncoder {
    fn default() -> Self {
        Self::new(Calibration::default())
    }
}

/// Evaluated in f64 so that adjacent f32 inputs never encode out of order.
#[inline]
fn encode_with(par: &[f32; 7], y: f32) -> f32 {
    let [p1, p2, p3, p4, p5, p6, p7] = par.map(f64::from);
    let y_p = f64::from(y).powf(p4);
    (p7 * (((p1 + p2 * y_p) / (1.0 + p3 * y_p)).powf(p5) - p6)) as f32
}
