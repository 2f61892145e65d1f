//! Sample element types and bit depth.
//!
//! This module provides:
//! - [`Sample`] - Trait for tensor element types (u8, u16, f16, f32)
//! - [`BitDepth`] - Number of significant bits in an integer code value
//!
//! # Raw values vs normalized values
//!
//! [`Sample::to_f32`] returns the *numeric* value of a sample without any
//! scaling: `128u8.to_f32() == 128.0`. Mapping integer codes into [0, 1] is a
//! separate, explicit step that needs a [`BitDepth`], because the container
//! width does not always match the depth of the data it carries (10-bit video
//! in `u16`, 12-bit raw in `u16`, ...).
//!
//! ```
//! use pu21_core::{BitDepth, Sample};
//!
//! // 8-bit code in an 8-bit container
//! let depth = BitDepth::native::<u8>();
//! assert_eq!(depth.normalize(255u8), 1.0);
//!
//! // 10-bit code in a 16-bit container
//! let depth = BitDepth::new(10).unwrap();
//! assert_eq!(depth.normalize(1023u16), 1.0);
//! ```
//!
//! # Dependencies
//!
//! - `half` crate for `f16` support

use crate::{Error, Result};
use half::f16;

/// Trait for tensor element types.
///
/// Implemented for:
/// - `u8` - 8-bit integer codes
/// - `u16` - up to 16-bit integer codes
/// - `f16` - half-precision float
/// - `f32` - single-precision float, the working type of all transforms
pub trait Sample: Copy + Default + Send + Sync + PartialOrd + 'static {
    /// Number of bits in the container.
    const BITS: u32;

    /// Whether this is a floating-point type.
    const IS_FLOAT: bool;

    /// Numeric value as f32, no normalization.
    fn to_f32(self) -> f32;

    /// Additive identity.
    fn zero() -> Self;
}

impl Sample for u8 {
    const BITS: u32 = 8;
    const IS_FLOAT: bool = false;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn zero() -> Self {
        0
    }
}

impl Sample for u16 {
    const BITS: u32 = 16;
    const IS_FLOAT: bool = false;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn zero() -> Self {
        0
    }
}

impl Sample for f16 {
    const BITS: u32 = 16;
    const IS_FLOAT: bool = true;

    #[inline]
    fn to_f32(self) -> f32 {
        f16::to_f32(self)
    }

    #[inline]
    fn zero() -> Self {
        f16::ZERO
    }
}

impl Sample for f32 {
    const BITS: u32 = 32;
    const IS_FLOAT: bool = true;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }
}

/// Number of significant bits in integer code values.
///
/// The largest code at depth `n` is `2^n - 1`; dividing by it maps codes
/// into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitDepth(u32);

impl BitDepth {
    /// 8 bits per sample.
    pub const EIGHT: Self = Self(8);
    /// 10 bits per sample.
    pub const TEN: Self = Self(10);
    /// 12 bits per sample.
    pub const TWELVE: Self = Self(12);
    /// 16 bits per sample.
    pub const SIXTEEN: Self = Self(16);

    /// Creates a bit depth in the range 1..=16.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBitDepth`] outside that range.
    pub fn new(bits: u32) -> Result<Self> {
        if bits == 0 || bits > 16 {
            return Err(Error::InvalidBitDepth { bits, container: 16 });
        }
        Ok(Self(bits))
    }

    /// Full depth of the sample container (8 for `u8`, 16 for `u16`).
    ///
    /// Float types report their container width, which is meaningless for
    /// normalization; callers pass floats through untouched.
    pub fn native<T: Sample>() -> Self {
        Self(T::BITS.min(16))
    }

    /// Number of bits.
    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Largest code value, `2^bits - 1`.
    #[inline]
    pub fn max_code(self) -> f32 {
        ((1u32 << self.0) - 1) as f32
    }

    /// Checks that codes of this depth fit in `T`.
    pub fn check_container<T: Sample>(self) -> Result<()> {
        if !T::IS_FLOAT && self.0 > T::BITS {
            return Err(Error::InvalidBitDepth {
                bits: self.0,
                container: T::BITS,
            });
        }
        Ok(())
    }

    /// Maps an integer code to [0, 1].
    #[inline]
    pub fn normalize<T: Sample>(self, v: T) -> f32 {
        v.to_f32() / self.max_code()
    }
}

impl Default for BitDepth {
    fn default() -> Self {
        Self::EIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_values() {
        assert_eq!(128u8.to_f32(), 128.0);
        assert_eq!(40000u16.to_f32(), 40000.0);
        assert_eq!(f16::from_f32(0.5).to_f32(), 0.5);
    }

    #[test]
    fn test_max_code() {
        assert_eq!(BitDepth::EIGHT.max_code(), 255.0);
        assert_eq!(BitDepth::TEN.max_code(), 1023.0);
        assert_eq!(BitDepth::SIXTEEN.max_code(), 65535.0);
    }

    #[test]
    fn test_native_depth() {
        assert_eq!(BitDepth::native::<u8>(), BitDepth::EIGHT);
        assert_eq!(BitDepth::native::<u16>(), BitDepth::SIXTEEN);
    }

    #[test]
    fn test_invalid_depth() {
        assert!(BitDepth::new(0).is_err());
        assert!(BitDepth::new(17).is_err());
        assert!(BitDepth::new(12).is_ok());
    }

    #[test]
    fn test_container_check() {
        assert!(BitDepth::TEN.check_container::<u16>().is_ok());
        assert!(BitDepth::TEN.check_container::<u8>().is_err());
        assert!(BitDepth::SIXTEEN.check_container::<f32>().is_ok());
    }

    #[test]
    fn test_normalize_ten_bit() {
        let depth = BitDepth::TEN;
        assert_eq!(depth.normalize(0u16), 0.0);
        approx::assert_relative_eq!(depth.normalize(512u16), 512.0 / 1023.0);
    }
}
