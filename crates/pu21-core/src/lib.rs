//! # pu21-core
//!
//! Core types for PU21 perceptually uniform encoding.
//!
//! This crate provides the foundational types used throughout the workspace:
//!
//! - [`Tensor`] - Dense height x width x channel image array with [`Layout`]
//! - [`Sample`] - Element types (u8, u16, f16, f32) and [`BitDepth`]
//! - [`Error`] / [`Result`] - Fatal error taxonomy
//! - [`diagnostics`] - Non-fatal range warnings returned next to results
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. All other crates depend on it:
//!
//! ```text
//! pu21-core (this crate)
//!    ^
//!    |
//!    +-- pu21-transfer (display model, PU21 encoder)
//!    +-- pu21-metric (metric adapter)
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Parallel elementwise evaluation with rayon (enabled by default)
//! - `serde` - YAML error variant for configuration loading

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod diagnostics;
pub mod error;
pub mod sample;
pub mod tensor;

pub use diagnostics::{Checked, RangeScan, RangeWarning, WarningSource};
pub use error::*;
pub use sample::{BitDepth, Sample};
pub use tensor::{Axis, Layout, Tensor};

/// Prelude module for convenient imports.
///
/// ```
/// use pu21_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::diagnostics::{Checked, RangeWarning, WarningSource};
    pub use crate::error::{Error, Result};
    pub use crate::sample::{BitDepth, Sample};
    pub use crate::tensor::{Axis, Layout, Tensor};
}
