//! Metric trait and name registry.
//!
//! PU21 does not implement PSNR, SSIM or any other quality metric. Callers
//! bring their own implementations and register them under a name; the
//! adapter looks names up case-insensitively.
//!
//! # Example
//!
//! ```rust
//! use pu21_core::{Layout, Tensor};
//! use pu21_metric::{Metric, MetricRegistry};
//!
//! let mut registry = MetricRegistry::new();
//!
//! // Any Fn(&Tensor, &Tensor) -> f64 is a metric
//! registry.register("MAE", |a: &Tensor, b: &Tensor| {
//!     let sum: f64 = a.data().iter().zip(b.data()).map(|(x, y)| (x - y).abs() as f64).sum();
//!     sum / a.len() as f64
//! });
//!
//! assert!(registry.get("mae").is_ok());
//! assert!(registry.get("VMAF").is_err());
//! ```

use pu21_core::{Error, Layout, Result, Tensor};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An image quality metric over PU-encoded tensors.
///
/// Both tensors arrive in the layout returned by [`layout`](Self::layout),
/// with identical shapes.
pub trait Metric: Send + Sync {
    /// Computes the score of `test` against `reference`.
    fn compute(&self, test: &Tensor<f32>, reference: &Tensor<f32>) -> Result<f64>;

    /// Axis order the metric expects. Interleaved `HWC` by default.
    fn layout(&self) -> Layout {
        Layout::Hwc
    }

    /// Wraps the metric so it receives tensors in `layout` order.
    fn with_layout(self, layout: Layout) -> WithLayout<Self>
    where
        Self: Sized,
    {
        WithLayout { inner: self, layout }
    }
}

impl<F> Metric for F
where
    F: Fn(&Tensor<f32>, &Tensor<f32>) -> f64 + Send + Sync,
{
    fn compute(&self, test: &Tensor<f32>, reference: &Tensor<f32>) -> Result<f64> {
        Ok(self(test, reference))
    }
}

/// Adapts a fallible closure into a [`Metric`].
///
/// Plain `Fn(&Tensor, &Tensor) -> f64` closures are metrics already; wrap a
/// closure in `FnMetric` when it can fail.
///
/// ```rust
/// use pu21_core::{Error, Tensor};
/// use pu21_metric::{FnMetric, Metric};
///
/// let nonempty = FnMetric::new(|a: &Tensor, _: &Tensor| {
///     if a.is_empty() {
///         return Err(Error::Metric("empty image".into()));
///     }
///     Ok(0.0)
/// });
/// let empty = Tensor::from_vec(Vec::new());
/// assert!(nonempty.compute(&empty, &empty).is_err());
/// ```
#[derive(Clone)]
pub struct FnMetric<F> {
    f: F,
}

impl<F> FnMetric<F>
where
    F: Fn(&Tensor<f32>, &Tensor<f32>) -> Result<f64> + Send + Sync,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Metric for FnMetric<F>
where
    F: Fn(&Tensor<f32>, &Tensor<f32>) -> Result<f64> + Send + Sync,
{
    fn compute(&self, test: &Tensor<f32>, reference: &Tensor<f32>) -> Result<f64> {
        (self.f)(test, reference)
    }
}

/// A metric with an overridden input layout.
#[derive(Debug, Clone)]
pub struct WithLayout<M> {
    inner: M,
    layout: Layout,
}

impl<M: Metric> Metric for WithLayout<M> {
    fn compute(&self, test: &Tensor<f32>, reference: &Tensor<f32>) -> Result<f64> {
        self.inner.compute(test, reference)
    }

    fn layout(&self) -> Layout {
        self.layout
    }
}

/// Named collection of metrics.
///
/// Names are stored lowercase; lookups ignore case, so `"PSNR"`, `"psnr"`
/// and `"Psnr"` all resolve to the same entry.
#[derive(Clone, Default)]
pub struct MetricRegistry {
    metrics: HashMap<String, Arc<dyn Metric>>,
}

impl MetricRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `metric` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, metric: impl Metric + 'static) -> &mut Self {
        self.metrics.insert(name.to_ascii_lowercase(), Arc::new(metric));
        self
    }

    /// Looks up a metric by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMetric`] if nothing is registered under
    /// `name`.
    pub fn get(&self, name: &str) -> Result<&dyn Metric> {
        self.metrics
            .get(&name.to_ascii_lowercase())
            .map(|m| m.as_ref())
            .ok_or_else(|| Error::unsupported_metric(name))
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.metrics.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("metrics", &self.names())
            .finish()
    }
}

/// Which metric to run: a registered name or a caller-supplied metric.
#[derive(Clone, Copy)]
pub enum MetricChoice<'a> {
    /// Looked up in the [`MetricRegistry`], case-insensitively.
    Named(&'a str),
    /// Used directly.
    Custom(&'a dyn Metric),
}

impl<'a> From<&'a str> for MetricChoice<'a> {
    fn from(name: &'a str) -> Self {
        Self::Named(name)
    }
}

impl fmt::Debug for MetricChoice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Custom(metric) => f.debug_tuple("Custom").field(&metric.layout()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero(_: &Tensor<f32>, _: &Tensor<f32>) -> f64 {
        0.0
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut registry = MetricRegistry::new();
        registry.register("PSNR", zero);
        assert!(registry.get("psnr").is_ok());
        assert!(registry.get("Psnr").is_ok());
        assert!(registry.contains("PSNR"));
        assert_eq!(registry.names(), vec!["psnr"]);
    }

    #[test]
    fn test_unknown_metric() {
        let registry = MetricRegistry::new();
        let err = registry.get("SSIM").err().unwrap();
        assert!(matches!(err, Error::UnsupportedMetric { ref name } if name == "SSIM"));
    }

    #[test]
    fn test_default_layout() {
        assert_eq!(Metric::layout(&zero), Layout::Hwc);
        assert_eq!(zero.with_layout(Layout::Cwh).layout(), Layout::Cwh);
    }

    #[test]
    fn test_replace_entry() {
        let mut registry = MetricRegistry::new();
        registry.register("m", zero);
        registry.register("M", |_: &Tensor, _: &Tensor| 1.0);
        assert_eq!(registry.len(), 1);
        let t = Tensor::from_vec(vec![0.0f32]);
        assert_eq!(registry.get("m").unwrap().compute(&t, &t).unwrap(), 1.0);
    }
}
