//! Image tensor type.
//!
//! This module provides [`Tensor`], a dense 3-D array holding one image:
//! height, width and channels, in a configurable axis order ([`Layout`]).
//!
//! # Memory Layout
//!
//! Elements are stored contiguously with the last axis of the layout varying
//! fastest. The default [`Layout::Hwc`] is the usual interleaved image layout:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//!         ...
//! ```
//!
//! Metric libraries disagree on axis order (planar `CHW`, `CWH`, ...);
//! [`Tensor::permute`] rearranges the data without changing any value.
//!
//! # Usage
//!
//! ```rust
//! use pu21_core::{Layout, Tensor};
//!
//! let t = Tensor::from_data(2, 3, 1, vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
//! assert_eq!(t.get(1, 2, 0), 6.0);
//!
//! let planar = t.permute(Layout::Chw);
//! assert_eq!(planar.dims(), [1, 2, 3]);
//! assert_eq!(planar.get(1, 2, 0), 6.0);
//! ```
//!
//! # Dependencies
//!
//! - [`crate::sample::Sample`] - Element type trait
//! - [`rayon`] - Parallel elementwise mapping (`parallel` feature)

use crate::{Error, Result, Sample};
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Logical image axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Rows.
    Height,
    /// Columns.
    Width,
    /// Colour channels.
    Channel,
}

/// Storage order of the three image axes, slowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    /// Height, width, channel (interleaved). The default.
    #[default]
    Hwc,
    /// Height, channel, width.
    Hcw,
    /// Width, height, channel.
    Whc,
    /// Width, channel, height.
    Wch,
    /// Channel, height, width (planar).
    Chw,
    /// Channel, width, height (planar, transposed).
    Cwh,
}

impl Layout {
    /// Axes in storage order, slowest varying first.
    pub const fn axes(self) -> [Axis; 3] {
        use Axis::*;
        match self {
            Self::Hwc => [Height, Width, Channel],
            Self::Hcw => [Height, Channel, Width],
            Self::Whc => [Width, Height, Channel],
            Self::Wch => [Width, Channel, Height],
            Self::Chw => [Channel, Height, Width],
            Self::Cwh => [Channel, Width, Height],
        }
    }

    /// Storage position of a logical axis.
    fn position(self, axis: Axis) -> usize {
        let axes = self.axes();
        if axes[0] == axis {
            0
        } else if axes[1] == axis {
            1
        } else {
            2
        }
    }

    /// Short lowercase name (`"hwc"`, `"chw"`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hwc => "hwc",
            Self::Hcw => "hcw",
            Self::Whc => "whc",
            Self::Wch => "wch",
            Self::Chw => "chw",
            Self::Cwh => "cwh",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dense 3-D image array.
///
/// `Tensor<T>` owns its elements. Shape queries ([`height`](Self::height),
/// [`width`](Self::width), [`channels`](Self::channels)) are independent of
/// the layout; [`dims`](Self::dims) reports sizes in storage order.
#[derive(Clone, PartialEq)]
pub struct Tensor<T: Sample = f32> {
    data: Vec<T>,
    /// Axis sizes in storage order
    dims: [usize; 3],
    layout: Layout,
}

impl<T: Sample> Tensor<T> {
    /// Creates a zero-filled `HWC` tensor.
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        Self {
            data: vec![T::zero(); height * width * channels],
            dims: [height, width, channels],
            layout: Layout::Hwc,
        }
    }

    /// Creates an `HWC` tensor from existing data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len()` is not
    /// `height * width * channels`.
    pub fn from_data(height: usize, width: usize, channels: usize, data: Vec<T>) -> Result<Self> {
        Self::with_layout([height, width, channels], Layout::Hwc, data)
    }

    /// Creates a tensor from data already stored in `layout` order.
    ///
    /// `dims` lists axis sizes in the same order as `layout`.
    pub fn with_layout(dims: [usize; 3], layout: Layout, data: Vec<T>) -> Result<Self> {
        let expected = dims[0]
            .checked_mul(dims[1])
            .and_then(|v| v.checked_mul(dims[2]))
            .ok_or_else(|| Error::invalid_dimensions(dims, "size overflows usize"))?;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                dims,
                format!("expected {} elements, got {}", expected, data.len()),
            ));
        }
        Ok(Self { data, dims, layout })
    }

    /// Wraps a flat sample vector as a `1 x N x 1` tensor.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            dims: [1, data.len(), 1],
            data,
            layout: Layout::Hwc,
        }
    }

    /// Axis sizes in storage order.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Axis sizes as `[height, width, channels]`.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        [self.height(), self.width(), self.channels()]
    }

    /// Current layout.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.axis_len(Axis::Height)
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.axis_len(Axis::Width)
    }

    /// Number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.axis_len(Axis::Channel)
    }

    /// Size of a logical axis.
    #[inline]
    pub fn axis_len(&self, axis: Axis) -> usize {
        self.dims[self.layout.position(axis)]
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the tensor holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw elements in storage order.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable raw elements in storage order.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Element strides for `[height, width, channel]`.
    fn logical_strides(&self) -> [usize; 3] {
        let storage = [self.dims[1] * self.dims[2], self.dims[2], 1];
        [
            storage[self.layout.position(Axis::Height)],
            storage[self.layout.position(Axis::Width)],
            storage[self.layout.position(Axis::Channel)],
        ]
    }

    /// Element at row `y`, column `x`, channel `c`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is out of range.
    #[inline]
    pub fn get(&self, y: usize, x: usize, c: usize) -> T {
        let [sy, sx, sc] = self.logical_strides();
        assert!(
            y < self.height() && x < self.width() && c < self.channels(),
            "index ({y}, {x}, {c}) out of bounds for shape {:?}",
            self.shape()
        );
        self.data[y * sy + x * sx + c * sc]
    }

    /// Returns a copy with axes rearranged into `target` order.
    ///
    /// Values are unchanged; only their storage order moves.
    pub fn permute(&self, target: Layout) -> Self {
        if target == self.layout {
            return self.clone();
        }
        let [sy, sx, sc] = self.logical_strides();
        let src_stride = |axis: Axis| match axis {
            Axis::Height => sy,
            Axis::Width => sx,
            Axis::Channel => sc,
        };

        let axes = target.axes();
        let dims = axes.map(|a| self.axis_len(a));
        let strides = axes.map(src_stride);

        let mut data = Vec::with_capacity(self.data.len());
        for i in 0..dims[0] {
            for j in 0..dims[1] {
                let base = i * strides[0] + j * strides[1];
                for k in 0..dims[2] {
                    data.push(self.data[base + k * strides[2]]);
                }
            }
        }

        Self { data, dims, layout: target }
    }

    /// Applies `f` to every element, producing a tensor of the same shape.
    ///
    /// Runs in parallel with the `parallel` feature; results are identical.
    pub fn map<U, F>(&self, f: F) -> Tensor<U>
    where
        U: Sample,
        F: Fn(T) -> U + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        let data: Vec<U> = self.data.par_iter().map(|&v| f(v)).collect();
        #[cfg(not(feature = "parallel"))]
        let data: Vec<U> = self.data.iter().map(|&v| f(v)).collect();

        Tensor {
            data,
            dims: self.dims,
            layout: self.layout,
        }
    }

    /// Converts every element to f32 (numeric value, no normalization).
    pub fn to_f32(&self) -> Tensor<f32> {
        self.map(Sample::to_f32)
    }

    /// Returns `true` when both tensors have the same logical shape.
    #[inline]
    pub fn same_shape<U: Sample>(&self, other: &Tensor<U>) -> bool {
        self.shape() == other.shape()
    }
}

impl<T: Sample> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("dims", &self.dims)
            .field("layout", &self.layout)
            .field("format", &std::any::type_name::<T>())
            .finish()
    }
}
