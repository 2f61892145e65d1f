//! Error types for PU21 operations.
//!
//! This module provides the error taxonomy shared by every crate in the
//! workspace.
//!
//! # Overview
//!
//! Only *fatal* conditions are errors:
//! - Invalid configuration (unknown calibration name, bad display parameters)
//! - Unsupported metric names at the metric adapter boundary
//! - Tensor shape problems
//!
//! Out-of-range input values are NOT errors. Encoders and display models
//! report them as [`RangeWarning`](crate::diagnostics::RangeWarning)s and keep
//! computing.
//!
//! # Usage
//!
//! ```rust
//! use pu21_core::{Error, Result};
//!
//! fn check_peak(y_peak: f32) -> Result<()> {
//!     if y_peak <= 0.0 {
//!         return Err(Error::invalid_parameter("y_peak", y_peak, "must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_peak(-1.0).is_err());
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during PU21 processing.
///
/// # Categories
///
/// - **Configuration errors**: [`UnknownCalibration`](Error::UnknownCalibration),
///   [`InvalidParameter`](Error::InvalidParameter), [`InvalidBitDepth`](Error::InvalidBitDepth)
/// - **Metric errors**: [`UnsupportedMetric`](Error::UnsupportedMetric), [`Metric`](Error::Metric)
/// - **Shape errors**: [`ShapeMismatch`](Error::ShapeMismatch), [`InvalidDimensions`](Error::InvalidDimensions)
/// - **I/O errors**: [`Io`](Error::Io), `Yaml` (with the `serde` feature)
#[derive(Debug, Error)]
pub enum Error {
    /// Calibration name is not one of the four fitted parameter sets.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pu21_core::Error;
    ///
    /// let err = Error::unknown_calibration("bandingglare");
    /// assert!(err.to_string().contains("bandingglare"));
    /// ```
    #[error("unknown calibration: {name} (expected banding, banding_glare, peaks or peaks_glare)")]
    UnknownCalibration {
        /// Name that was requested
        name: String,
    },

    /// A numeric configuration parameter is out of its valid domain.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
        /// Why the value was rejected
        reason: String,
    },

    /// Bit depth cannot describe the integer container it was applied to.
    #[error("invalid bit depth {bits} for {container}-bit samples")]
    InvalidBitDepth {
        /// Requested bit depth
        bits: u32,
        /// Bits available in the sample type
        container: u32,
    },

    /// Metric name is not registered and no callable was supplied.
    #[error("unknown metric {name}")]
    UnsupportedMetric {
        /// Metric name as given by the caller
        name: String,
    },

    /// A metric implementation failed.
    #[error("metric failed: {0}")]
    Metric(String),

    /// Test and reference tensors differ in shape.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Shape of the reference tensor
        expected: [usize; 3],
        /// Shape of the test tensor
        got: [usize; 3],
    },

    /// Tensor dimensions don't match the data length.
    #[error("invalid dimensions: {dims:?} ({reason})")]
    InvalidDimensions {
        /// Requested dimensions
        dims: [usize; 3],
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// I/O error reading configuration files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration parse error.
    #[cfg(feature = "serde")]
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Creates an [`Error::UnknownCalibration`] error.
    #[inline]
    pub fn unknown_calibration(name: impl Into<String>) -> Self {
        Self::UnknownCalibration { name: name.into() }
    }

    /// Creates an [`Error::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(name: &'static str, value: impl Into<f64>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::UnsupportedMetric`] error.
    #[inline]
    pub fn unsupported_metric(name: impl Into<String>) -> Self {
        Self::UnsupportedMetric { name: name.into() }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(dims: [usize; 3], reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            dims,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::ShapeMismatch`] error.
    #[inline]
    pub fn shape_mismatch(expected: [usize; 3], got: [usize; 3]) -> Self {
        Self::ShapeMismatch { expected, got }
    }

    /// Returns `true` for errors caused by bad configuration.
    #[inline]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCalibration { .. } | Self::InvalidParameter { .. } | Self::InvalidBitDepth { .. }
        )
    }

    /// Returns `true` if this is an I/O error.
    #[inline]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
