//! Gain-gamma-offset (GOG) photometric display model.
//!
//! Maps gamma-encoded display values in [0, 1] to the absolute luminance a
//! display emits, in cd/m2. Used to feed SDR (display-referred) images into
//! the PU21 encoder, which expects absolute units.
//!
//! # Formula
//!
//! ```text
//! Y_black = E_ambient / pi * k_refl + Y_peak / contrast
//! L       = (Y_peak - Y_black) * V^gamma + Y_black
//! ```
//!
//! The black level combines panel leakage (`Y_peak / contrast`) with ambient
//! light reflected off the screen, so the effective contrast of a display in
//! a lit room is always below its rated contrast.
//!
//! # Reference
//!
//! R. Mantiuk, "Practicalities of predicting quality of high dynamic range
//! images and video", ICIP 2016.
//!
//! # Usage
//!
//! ```rust
//! use pu21_transfer::display::DisplayModel;
//!
//! // 100 cd/m2 office monitor in a 10 lux room
//! let dm = DisplayModel::new(100.0).with_ambient(10.0);
//!
//! assert_eq!(dm.forward_value(1.0), 100.0);
//! assert_eq!(dm.forward_value(0.0), dm.black_level());
//! assert!(dm.effective_contrast() < dm.contrast());
//! ```

use crate::par;
use pu21_core::{Checked, Error, RangeScan, RangeWarning, Result, Tensor, WarningSource};
use std::f32::consts::PI;
use std::fmt;
use tracing::{info, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::path::Path;

/// Default rated contrast, 1000:1.
pub const DEFAULT_CONTRAST: f32 = 1000.0;
/// Default display gamma.
pub const DEFAULT_GAMMA: f32 = 2.2;
/// Default ambient illuminance, lux.
pub const DEFAULT_AMBIENT: f32 = 0.0;
/// Default screen reflectivity.
pub const DEFAULT_REFLECTIVITY: f32 = 0.005;

/// GOG display model parameters.
///
/// `Y_black < Y_peak` is required for a monotonic model but not enforced by
/// the constructors; [`validate`](Self::validate) checks it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct DisplayModel {
    /// Peak luminance, cd/m2.
    y_peak: f32,
    /// Rated contrast ratio (1000 means 1000:1).
    #[cfg_attr(feature = "serde", serde(default = "default_contrast"))]
    contrast: f32,
    /// Display gamma.
    #[cfg_attr(feature = "serde", serde(default = "default_gamma"))]
    gamma: f32,
    /// Ambient illuminance, lux.
    #[cfg_attr(feature = "serde", serde(default))]
    e_ambient: f32,
    /// Screen reflectivity, fraction.
    #[cfg_attr(feature = "serde", serde(default = "default_reflectivity"))]
    k_refl: f32,
}

#[cfg(feature = "serde")]
fn default_contrast() -> f32 {
    DEFAULT_CONTRAST
}

#[cfg(feature = "serde")]
fn default_gamma() -> f32 {
    DEFAULT_GAMMA
}

#[cfg(feature = "serde")]
fn default_reflectivity() -> f32 {
    DEFAULT_REFLECTIVITY
}

impl DisplayModel {
    /// Creates a model with default contrast, gamma, ambient and reflectivity.
    ///
    /// # Arguments
    ///
    /// * `y_peak` - Peak luminance in cd/m2, e.g. 200 for an office monitor
    pub fn new(y_peak: f32) -> Self {
        Self {
            y_peak,
            contrast: DEFAULT_CONTRAST,
            gamma: DEFAULT_GAMMA,
            e_ambient: DEFAULT_AMBIENT,
            k_refl: DEFAULT_REFLECTIVITY,
        }
    }

    /// Creates a model with every parameter given.
    ///
    /// # Arguments
    ///
    /// * `y_peak` - Peak luminance, cd/m2
    /// * `contrast` - Rated contrast ratio
    /// * `gamma` - Display gamma
    /// * `e_ambient` - Ambient illuminance in lux, e.g. 600 for a bright office
    /// * `k_refl` - Screen reflectivity
    pub fn gog(y_peak: f32, contrast: f32, gamma: f32, e_ambient: f32, k_refl: f32) -> Self {
        Self {
            y_peak,
            contrast,
            gamma,
            e_ambient,
            k_refl,
        }
    }

    /// Sets the peak luminance.
    pub fn with_peak(mut self, y_peak: f32) -> Self {
        self.y_peak = y_peak;
        self
    }

    /// Sets the rated contrast.
    pub fn with_contrast(mut self, contrast: f32) -> Self {
        self.contrast = contrast;
        self
    }

    /// Sets the gamma.
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Sets the ambient illuminance in lux.
    pub fn with_ambient(mut self, e_ambient: f32) -> Self {
        self.e_ambient = e_ambient;
        self
    }

    /// Sets the screen reflectivity.
    pub fn with_reflectivity(mut self, k_refl: f32) -> Self {
        self.k_refl = k_refl;
        self
    }

    /// Peak luminance, cd/m2.
    #[inline]
    pub fn y_peak(&self) -> f32 {
        self.y_peak
    }

    /// Rated contrast ratio.
    #[inline]
    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    /// Display gamma.
    #[inline]
    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Ambient illuminance, lux.
    #[inline]
    pub fn e_ambient(&self) -> f32 {
        self.e_ambient
    }

    /// Screen reflectivity.
    #[inline]
    pub fn k_refl(&self) -> f32 {
        self.k_refl
    }

    /// Checks that the parameters describe a physically sensible display.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for non-positive peak, contrast or
    /// gamma, negative ambient light, reflectivity outside [0, 1], or a black
    /// level at or above the peak.
    pub fn validate(&self) -> Result<()> {
        if self.y_peak.is_nan() || self.y_peak <= 0.0 {
            return Err(Error::invalid_parameter("y_peak", self.y_peak, "must be positive"));
        }
        if self.contrast.is_nan() || self.contrast <= 0.0 {
            return Err(Error::invalid_parameter("contrast", self.contrast, "must be positive"));
        }
        if self.gamma.is_nan() || self.gamma <= 0.0 {
            return Err(Error::invalid_parameter("gamma", self.gamma, "must be positive"));
        }
        if self.e_ambient.is_nan() || self.e_ambient < 0.0 {
            return Err(Error::invalid_parameter("e_ambient", self.e_ambient, "must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.k_refl) {
            return Err(Error::invalid_parameter("k_refl", self.k_refl, "must be within [0, 1]"));
        }
        let black = self.black_level();
        if black >= self.y_peak {
            return Err(Error::invalid_parameter(
                "e_ambient",
                self.e_ambient,
                format!("black level {black} cd/m^2 reaches the peak luminance"),
            ));
        }
        Ok(())
    }

    /// Black level in cd/m2: reflected ambient light plus panel leakage.
    #[inline]
    pub fn black_level(&self) -> f32 {
        let y_refl = self.e_ambient / PI * self.k_refl;
        y_refl + self.y_peak / self.contrast
    }

    /// Contrast once reflections are accounted for, `Y_peak / Y_black`.
    #[inline]
    pub fn effective_contrast(&self) -> f32 {
        self.y_peak / self.black_level()
    }

    /// Luminance for one display value. No diagnostics.
    ///
    /// Values outside [0, 1] follow the power law: above 1 it keeps rising,
    /// below 0 it is mirrored (`-|V|^gamma`) so the result stays real.
    #[inline]
    pub fn forward_value(&self, v: f32) -> f32 {
        let g = v.abs().powf(self.gamma).copysign(v);
        // Written as a blend so that V = 1 gives Y_peak and V = 0 gives
        // Y_black without rounding
        self.y_peak * g + self.black_level() * (1.0 - g)
    }

    /// Display value that produces luminance `l`. Inverse of
    /// [`forward_value`](Self::forward_value) on [Y_black, Y_peak].
    ///
    /// Luminance below the black level maps to 0.
    #[inline]
    pub fn inverse_value(&self, l: f32) -> f32 {
        let black = self.black_level();
        ((l - black) / (self.y_peak - black)).max(0.0).powf(1.0 / self.gamma)
    }

    /// Checks display values against [0, 1].
    ///
    /// Emits a `warn` event and returns the warning if any value is outside.
    pub fn check_range(&self, values: &[f32]) -> Option<RangeWarning> {
        let warning =
            RangeScan::scan(values, 0.0, 1.0).into_warning(WarningSource::DisplayInput, 0.0, 1.0)?;
        warn!(
            count = warning.count,
            min = warning.min,
            max = warning.max,
            "pixel values must be in the range 0-1"
        );
        Some(warning)
    }

    /// Converts display values to luminance in place.
    pub fn forward_in_place(&self, values: &mut [f32]) -> Option<RangeWarning> {
        trace!(y_peak = self.y_peak, len = values.len(), "display forward");
        let warning = self.check_range(values);
        par::apply(values, |v| self.forward_value(v));
        warning
    }

    /// Converts display values to luminance.
    ///
    /// Values outside [0, 1] raise a warning but are still converted.
    /// Negative values are mirrored (`-|V|^gamma`) and give a finite result
    /// where a plain power law would give NaN.
    ///
    /// ```rust
    /// use pu21_transfer::display::DisplayModel;
    ///
    /// let dm = DisplayModel::new(200.0);
    /// let out = dm.forward(&[0.5, 1.2]);
    /// assert_eq!(out.warnings.len(), 1);
    /// assert!(out.value[1] > 200.0);
    /// ```
    pub fn forward(&self, values: &[f32]) -> Checked<Vec<f32>> {
        let mut out = values.to_vec();
        let warning = self.forward_in_place(&mut out);
        Checked::new(out, warning)
    }

    /// Converts a tensor of display values to luminance.
    pub fn forward_tensor(&self, values: &Tensor<f32>) -> Checked<Tensor<f32>> {
        let mut out = values.clone();
        let warning = self.forward_in_place(out.data_mut());
        Checked::new(out, warning)
    }

    /// Converts luminance back to display values.
    pub fn inverse(&self, luminance: &[f32]) -> Vec<f32> {
        let mut out = luminance.to_vec();
        par::apply(&mut out, |l| self.inverse_value(l));
        out
    }

    /// Human-readable summary of the model.
    pub fn describe(&self) -> DisplayReport {
        DisplayReport {
            y_peak: self.y_peak,
            contrast: self.contrast,
            effective_contrast: self.effective_contrast(),
            e_ambient: self.e_ambient,
            k_refl: self.k_refl,
        }
    }

    /// Emits [`describe`](Self::describe) as an `info` event.
    pub fn log(&self) {
        info!("{}", self.describe());
    }

    /// Parses a model from YAML.
    ///
    /// Only `y_peak` is required:
    ///
    /// ```rust
    /// use pu21_transfer::display::DisplayModel;
    ///
    /// let dm = DisplayModel::from_yaml_str("y_peak: 100\ne_ambient: 10\n").unwrap();
    /// assert_eq!(dm.contrast(), 1000.0);
    /// assert_eq!(dm.e_ambient(), 10.0);
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let model: Self = serde_yaml::from_str(yaml)?;
        model.validate()?;
        Ok(model)
    }

    /// Loads a model from a YAML file.
    #[cfg(feature = "serde")]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }
}

/// Printable summary of a [`DisplayModel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayReport {
    /// Peak luminance, cd/m2.
    pub y_peak: f32,
    /// Rated contrast ratio.
    pub contrast: f32,
    /// Contrast including reflections.
    pub effective_contrast: f32,
    /// Ambient illuminance, lux.
    pub e_ambient: f32,
    /// Screen reflectivity, fraction.
    pub k_refl: f32,
}

impl fmt::Display for DisplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Photometric display model:")?;
        writeln!(f, "  Peak luminance: {} cd/m^2", self.y_peak)?;
        writeln!(f, "  Contrast - theoretical: {}:1", self.contrast.round())?;
        writeln!(f, "  Contrast - effective: {}:1", self.effective_contrast.round())?;
        writeln!(f, "  Ambient light: {} lux", self.e_ambient)?;
        write!(f, "  Display reflectivity: {}%", self.k_refl * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn office() -> DisplayModel {
        DisplayModel::gog(100.0, 1000.0, 2.2, 10.0, 0.005)
    }

    #[test]
    fn test_black_level() {
        let dm = office();
        let expected = 10.0 / PI * 0.005 + 100.0 / 1000.0;
        assert_relative_eq!(dm.black_level(), expected);
        assert!((dm.black_level() - 0.11592).abs() < 1e-4);
    }

    #[test]
    fn test_endpoints_exact() {
        let dm = office();
        assert_eq!(dm.forward_value(1.0), 100.0);
        assert_eq!(dm.forward_value(0.0), dm.black_level());
    }

    #[test]
    fn test_defaults() {
        let dm = DisplayModel::new(200.0);
        assert_eq!(dm.contrast(), 1000.0);
        assert_eq!(dm.gamma(), 2.2);
        assert_eq!(dm.e_ambient(), 0.0);
        assert_eq!(dm.k_refl(), 0.005);
        // No ambient light: black level is pure leakage
        assert_relative_eq!(dm.black_level(), 0.2);
        assert_relative_eq!(dm.effective_contrast(), 1000.0, max_relative = 1e-5);
    }

    #[test]
    fn test_effective_contrast_drops_with_ambient() {
        for lux in [1.0, 10.0, 600.0] {
            let dm = DisplayModel::new(100.0).with_ambient(lux);
            assert!(dm.effective_contrast() < dm.contrast(), "lux={lux}");
        }
    }

    #[test]
    fn test_monotonic() {
        let dm = office();
        let mut prev = f32::NEG_INFINITY;
        for i in 0..=100 {
            let l = dm.forward_value(i as f32 / 100.0);
            assert!(l > prev);
            prev = l;
        }
    }

    #[test]
    fn test_inverse_roundtrip() {
        let dm = office();
        for i in 0..=100 {
            let v = i as f32 / 100.0;
            let back = dm.inverse_value(dm.forward_value(v));
            assert!((back - v).abs() < 1e-4, "v={v}, back={back}");
        }
    }

    #[test]
    fn test_out_of_range_warns_and_extrapolates() {
        let dm = office();
        let out = dm.forward(&[-0.1, 0.5, 1.1]);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].source, WarningSource::DisplayInput);
        assert_eq!(out.warnings[0].count, 2);
        assert!(out.value[0] < dm.black_level());
        assert!(out.value[0].is_finite());
        assert!(out.value[2] > 100.0);
    }

    #[test]
    fn test_in_range_is_clean() {
        let dm = office();
        assert!(dm.forward(&[0.0, 0.25, 1.0]).is_clean());
    }

    #[test]
    fn test_report() {
        let text = office().describe().to_string();
        assert!(text.contains("Peak luminance: 100 cd/m^2"));
        assert!(text.contains("Contrast - theoretical: 1000:1"));
        assert!(text.contains("Contrast - effective: 863:1"));
        assert!(text.contains("Ambient light: 10 lux"));
        assert!(text.contains("Display reflectivity: 0.5%"));
    }

    #[test]
    fn test_validate() {
        assert!(office().validate().is_ok());
        assert!(DisplayModel::new(0.0).validate().is_err());
        assert!(DisplayModel::new(100.0).with_contrast(-5.0).validate().is_err());
        assert!(DisplayModel::new(100.0).with_reflectivity(2.0).validate().is_err());
        assert!(DisplayModel::new(1.0).with_ambient(1e6).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let nan = f32::NAN;
        assert!(DisplayModel::new(nan).validate().is_err());
        assert!(DisplayModel::new(100.0).with_contrast(nan).validate().is_err());
        assert!(DisplayModel::new(100.0).with_gamma(nan).validate().is_err());
        assert!(DisplayModel::new(100.0).with_ambient(nan).validate().is_err());
        assert!(DisplayModel::new(100.0).with_reflectivity(nan).validate().is_err());
    }

    #[test]
    fn test_negative_input_mirrors() {
        let dm = office();
        let black = dm.black_level();
        let below = dm.forward_value(-0.5);
        let above = dm.forward_value(0.5);
        assert!(below.is_finite());
        // Same distance from black on either side of zero
        assert_relative_eq!(black - below, above - black, epsilon = 1e-4);
    }

    #[test]
    fn test_tensor_forward() {
        let dm = office();
        let t = Tensor::from_data(1, 2, 1, vec![0.0f32, 1.0]).unwrap();
        let out = dm.forward_tensor(&t);
        assert!(out.is_clean());
        assert_eq!(out.value.data(), &[dm.black_level(), 100.0]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_yaml_rejects_unknown_field() {
        assert!(DisplayModel::from_yaml_str("y_peak: 100\nbrightness: 3\n").is_err());
        assert!(DisplayModel::from_yaml_str("contrast: 100\n").is_err());
    }
}
