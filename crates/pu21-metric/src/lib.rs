//! # pu21-metric
//!
//! Applies standard SDR image quality metrics to HDR images through the
//! PU21 encoding.
//!
//! Metrics such as PSNR or SSIM expect values on a roughly perceptual
//! 0-255 scale. This crate normalizes integer inputs, optionally maps them
//! through a [`DisplayModel`](pu21_transfer::DisplayModel), encodes them
//! with a [`PuEncoder`](pu21_transfer::PuEncoder), rearranges axes for the
//! metric, and calls it. The metric implementations themselves come from the
//! caller.
//!
//! # Usage
//!
//! ```rust
//! use pu21_core::Tensor;
//! use pu21_metric::{pu21_metric, MetricOptions};
//!
//! fn mse(a: &Tensor, b: &Tensor) -> f64 {
//!     let sum: f64 = a.data().iter().zip(b.data()).map(|(x, y)| ((x - y) as f64).powi(2)).sum();
//!     sum / a.len() as f64
//! }
//!
//! // Absolute luminance in cd/m^2
//! let reference = Tensor::from_data(1, 2, 1, vec![10.0f32, 1000.0]).unwrap();
//! let test = Tensor::from_data(1, 2, 1, vec![11.0f32, 1000.0]).unwrap();
//!
//! let out = pu21_metric(&test, &reference, &mse, None, &MetricOptions::default()).unwrap();
//! assert!(out.value > 0.0);
//! assert!(out.is_clean());
//! ```
//!
//! # Dependencies
//!
//! - [`pu21-core`] - Tensor, sample types, errors
//! - [`pu21-transfer`] - Display model and encoder
//! - [`tracing`] - Debug events
//!
//! # Used By
//!
//! - Applications comparing HDR images with existing SDR metrics

#![warn(missing_docs)]

pub mod adapter;
pub mod metric;

pub use adapter::{normalize, pu21_metric, MetricOptions, Pu21Metric};
pub use metric::{FnMetric, Metric, MetricChoice, MetricRegistry, WithLayout};
