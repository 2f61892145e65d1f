//! # pu21-transfer
//!
//! Luminance transforms for evaluating HDR images with SDR quality metrics.
//!
//! - [`pu21`] - PU21 perceptually uniform encoding (luminance <-> code values)
//! - [`display`] - GOG display model (display values -> luminance)
//!
//! # Terminology
//!
//! - **Display-referred** values are gamma-encoded pixel values in [0, 1]
//!   as sent to a display (standard SDR images).
//! - **Absolute luminance** is the light the display emits, in cd/m2. PU21
//!   only accepts absolute luminance.
//!
//! # Usage
//!
//! ```rust
//! use pu21_transfer::{DisplayModel, PuEncoder};
//!
//! // SDR pixel values -> emitted luminance -> PU21 codes
//! let dm = DisplayModel::new(100.0).with_ambient(10.0);
//! let pu = PuEncoder::default();
//!
//! let luminance = dm.forward(&[0.0, 0.5, 1.0]).into_value();
//! let codes = pu.encode(&luminance);
//! assert!(codes.is_clean());
//! assert!(codes.value[2] > codes.value[1]);
//! ```
//!
//! # Range handling
//!
//! Both transforms accept out-of-range input. They emit a `tracing` warning,
//! return a [`RangeWarning`](pu21_core::RangeWarning) next to the result, and
//! keep computing (PU21 clamps, the display model extrapolates).
//!
//! # Dependencies
//!
//! - [`pu21-core`] - Tensor, errors, diagnostics
//! - `tracing` - Range warnings and trace events
//! - `rayon` - Parallel slices (`parallel` feature)
//!
//! # Used By
//!
//! - `pu21-metric` - Metric adapter
//! - `pu21-cli` - Command-line tool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod display;
mod par;
pub mod pu21;

pub use display::{DisplayModel, DisplayReport};
pub use pu21::{Calibration, PuEncoder, L_MAX, L_MIN};
