//! Metric adapter: runs an SDR metric on PU-encoded HDR images.
//!
//! Each call takes the same path for the test and the reference image:
//!
//! ```text
//! integer codes --normalize--> [0, 1] --DisplayModel--> cd/m^2 --PuEncoder--> PU codes
//!                                                                               |
//!                                                          permute to metric layout
//!                                                                               |
//!                                                                         Metric::compute
//! ```
//!
//! Float tensors skip normalization. Without a display model the (normalized)
//! values are taken as absolute luminance.
//!
//! # Example
//!
//! ```rust
//! use pu21_core::Tensor;
//! use pu21_metric::{MetricChoice, Pu21Metric};
//! use pu21_transfer::DisplayModel;
//!
//! let mut adapter = Pu21Metric::new();
//! adapter.registry_mut().register("max_abs", |a: &Tensor, b: &Tensor| {
//!     a.data().iter().zip(b.data()).map(|(x, y)| (x - y).abs() as f64).fold(0.0, f64::max)
//! });
//!
//! let test = Tensor::from_data(1, 2, 1, vec![0u8, 255]).unwrap();
//! let reference = Tensor::from_data(1, 2, 1, vec![0u8, 255]).unwrap();
//! let display = DisplayModel::new(100.0);
//!
//! let score = adapter
//!     .evaluate(&test, &reference, MetricChoice::Named("MAX_ABS"), Some(&display))
//!     .unwrap();
//! assert_eq!(score.value, 0.0);
//! ```

use pu21_core::{BitDepth, Checked, Error, Result, Sample, Tensor};
use pu21_transfer::{DisplayModel, PuEncoder};
use tracing::{debug, trace};

use crate::metric::{Metric, MetricChoice, MetricRegistry};

/// Settings shared by every adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricOptions {
    /// Encoder applied to both images. `banding_glare` by default.
    pub encoder: PuEncoder,
    /// Depth of integer inputs. `None` uses the container's full depth.
    pub bit_depth: Option<BitDepth>,
}

impl MetricOptions {
    /// Sets the encoder.
    pub fn with_encoder(mut self, encoder: PuEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Sets the bit depth used to normalize integer inputs.
    pub fn with_bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.bit_depth = Some(bit_depth);
        self
    }
}

/// Converts a tensor to f32, mapping integer codes into [0, 1].
///
/// Floats are copied unchanged. Integers are divided by `2^bits - 1`, with
/// `bits` taken from `bit_depth` or, when `None`, the container width.
///
/// # Errors
///
/// Returns [`Error::InvalidBitDepth`] if `bit_depth` exceeds the container.
///
/// ```rust
/// use pu21_core::{BitDepth, Tensor};
/// use pu21_metric::normalize;
///
/// // 10-bit codes stored in u16
/// let t = Tensor::from_data(1, 2, 1, vec![0u16, 1023]).unwrap();
/// let n = normalize(&t, Some(BitDepth::TEN)).unwrap();
/// assert_eq!(n.data(), &[0.0, 1.0]);
/// ```
pub fn normalize<T: Sample>(tensor: &Tensor<T>, bit_depth: Option<BitDepth>) -> Result<Tensor<f32>> {
    if T::IS_FLOAT {
        return Ok(tensor.to_f32());
    }
    let depth = bit_depth.unwrap_or_else(BitDepth::native::<T>);
    depth.check_container::<T>()?;
    trace!(bits = depth.bits(), len = tensor.len(), "normalize");
    Ok(tensor.map(|v| depth.normalize(v)))
}

/// Runs `metric` on PU-encoded versions of `test` and `reference`.
///
/// Range warnings from the display model and the encoder are collected in
/// the returned [`Checked`]; they never abort the computation.
///
/// # Errors
///
/// - [`Error::ShapeMismatch`] if the tensors differ in logical shape
/// - [`Error::InvalidBitDepth`] if `options.bit_depth` does not fit `T`
/// - any error returned by the metric itself
pub fn pu21_metric<T: Sample>(
    test: &Tensor<T>,
    reference: &Tensor<T>,
    metric: &dyn Metric,
    display: Option<&DisplayModel>,
    options: &MetricOptions,
) -> Result<Checked<f64>> {
    if !test.same_shape(reference) {
        return Err(Error::shape_mismatch(reference.shape(), test.shape()));
    }

    let layout = metric.layout();
    let test = prepare(test, display, options)?;
    let reference = prepare(reference, display, options)?;

    let mut warnings = test.warnings;
    warnings.extend(reference.warnings);

    let test = test.value.permute(layout);
    let reference = reference.value.permute(layout);

    let score = metric.compute(&test, &reference)?;
    debug!(%layout, score, warnings = warnings.len(), "pu21 metric");
    Ok(Checked { value: score, warnings })
}

/// Normalizes, applies the display model and encodes one image.
fn prepare<T: Sample>(
    image: &Tensor<T>,
    display: Option<&DisplayModel>,
    options: &MetricOptions,
) -> Result<Checked<Tensor<f32>>> {
    let normalized = normalize(image, options.bit_depth)?;

    let mut luminance = match display {
        Some(dm) => dm.forward_tensor(&normalized),
        None => Checked::clean(normalized),
    };

    let encoded = options.encoder.encode_tensor(&luminance.value);
    let max_code = encoded.value.data().iter().copied().fold(f32::NEG_INFINITY, f32::max);
    debug!(
        calibration = %options.encoder.calibration(),
        max_code,
        "encoded image"
    );

    luminance.absorb(encoded.warnings);
    Ok(Checked {
        value: encoded.value,
        warnings: luminance.warnings,
    })
}

/// Metric adapter with a registry of named metrics.
///
/// Holds the caller's metrics plus the [`MetricOptions`] applied to every
/// evaluation.
#[derive(Debug, Clone, Default)]
pub struct Pu21Metric {
    registry: MetricRegistry,
    options: MetricOptions,
}

impl Pu21Metric {
    /// Creates an adapter with an empty registry and default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter around an existing registry.
    pub fn with_registry(registry: MetricRegistry) -> Self {
        Self {
            registry,
            options: MetricOptions::default(),
        }
    }

    /// Sets the encoder.
    pub fn with_encoder(mut self, encoder: PuEncoder) -> Self {
        self.options.encoder = encoder;
        self
    }

    /// Sets the bit depth for integer inputs.
    pub fn with_bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.options.bit_depth = Some(bit_depth);
        self
    }

    /// Registered metrics.
    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Mutable access for registering metrics.
    pub fn registry_mut(&mut self) -> &mut MetricRegistry {
        &mut self.registry
    }

    /// Current options.
    pub fn options(&self) -> &MetricOptions {
        &self.options
    }

    /// Resolves `choice` and runs [`pu21_metric`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMetric`] for an unregistered name, before
    /// any pixel is touched. Otherwise as [`pu21_metric`].
    pub fn evaluate<T: Sample>(
        &self,
        test: &Tensor<T>,
        reference: &Tensor<T>,
        choice: MetricChoice<'_>,
        display: Option<&DisplayModel>,
    ) -> Result<Checked<f64>> {
        let metric = match choice {
            MetricChoice::Named(name) => self.registry.get(name)?,
            MetricChoice::Custom(metric) => metric,
        };
        pu21_metric(test, reference, metric, display, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pu21_core::Layout;
    use pu21_transfer::Calibration;

    fn mean_abs(a: &Tensor, b: &Tensor) -> f64 {
        let sum: f64 = a
            .data()
            .iter()
            .zip(b.data())
            .map(|(x, y)| (x - y).abs() as f64)
            .sum();
        sum / a.len() as f64
    }

    #[test]
    fn test_normalize_u8() {
        let t = Tensor::from_data(1, 3, 1, vec![0u8, 51, 255]).unwrap();
        let n = normalize(&t, None).unwrap();
        assert_relative_eq!(n.data()[1], 0.2, epsilon = 1e-6);
        assert_eq!(n.data()[2], 1.0);
    }

    #[test]
    fn test_normalize_float_passthrough() {
        let t = Tensor::from_data(1, 2, 1, vec![0.25f32, 500.0]).unwrap();
        assert_eq!(normalize(&t, Some(BitDepth::TEN)).unwrap().data(), t.data());
    }

    #[test]
    fn test_normalize_rejects_oversized_depth() {
        let t = Tensor::from_data(1, 1, 1, vec![1u8]).unwrap();
        let err = normalize(&t, Some(BitDepth::TEN)).unwrap_err();
        assert!(matches!(err, Error::InvalidBitDepth { bits: 10, container: 8 }));
    }

    #[test]
    fn test_identical_images_score_zero() {
        let img = Tensor::from_data(2, 2, 3, (0..12).map(|i| i as f32 * 100.0).collect()).unwrap();
        let out = pu21_metric(&img, &img, &mean_abs, None, &MetricOptions::default()).unwrap();
        assert_eq!(out.value, 0.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Tensor::<f32>::new(2, 2, 3);
        let b = Tensor::<f32>::new(2, 3, 3);
        let err = pu21_metric(&a, &b, &mean_abs, None, &MetricOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch { expected: [2, 3, 3], got: [2, 2, 3] }
        ));
    }

    #[test]
    fn test_unknown_metric_before_shape_check() {
        let a = Tensor::<f32>::new(1, 1, 1);
        let b = Tensor::<f32>::new(2, 2, 2);
        let err = Pu21Metric::new()
            .evaluate(&a, &b, MetricChoice::Named("SSIM"), None)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedMetric { .. }));
    }

    #[test]
    fn test_encoder_option() {
        let a = Tensor::from_data(1, 1, 1, vec![10000.0f32]).unwrap();
        let b = Tensor::from_data(1, 1, 1, vec![0.005f32]).unwrap();
        let opts = MetricOptions::default().with_encoder(PuEncoder::new(Calibration::Peaks));
        let out = pu21_metric(&a, &b, &mean_abs, None, &opts).unwrap();
        assert_relative_eq!(out.value, 380.9853, epsilon = 0.01);
    }

    #[test]
    fn test_metric_sees_requested_layout() {
        let seen = |a: &Tensor, _: &Tensor| {
            assert_eq!(a.layout(), Layout::Cwh);
            0.0
        };
        let img = Tensor::<f32>::new(2, 3, 3);
        let metric = seen.with_layout(Layout::Cwh);
        pu21_metric(&img, &img, &metric, None, &MetricOptions::default()).unwrap();
    }
}
