//! Elementwise evaluation over slices.
//!
//! With the `parallel` feature the work is split across the rayon pool.
//! Every element is computed by the same scalar function either way, so
//! results do not depend on the feature or the thread count.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Below this many elements the sequential loop is used.
#[cfg(feature = "parallel")]
const PAR_THRESHOLD: usize = 16 * 1024;

/// Replaces every element `x` with `f(x)`.
#[cfg(feature = "parallel")]
pub(crate) fn apply<F>(values: &mut [f32], f: F)
where
    F: Fn(f32) -> f32 + Sync + Send,
{
    if values.len() >= PAR_THRESHOLD {
        values.par_iter_mut().for_each(|v| *v = f(*v));
    } else {
        apply_seq(values, f);
    }
}

/// Replaces every element `x` with `f(x)`.
#[cfg(not(feature = "parallel"))]
pub(crate) fn apply<F>(values: &mut [f32], f: F)
where
    F: Fn(f32) -> f32,
{
    apply_seq(values, f);
}

#[inline]
fn apply_seq<F: Fn(f32) -> f32>(values: &mut [f32], f: F) {
    for v in values.iter_mut() {
        *v = f(*v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_large_matches_small() {
        let mut big: Vec<f32> = (0..100_000).map(|i| i as f32 * 0.5).collect();
        apply(&mut big, |x| x * 2.0 + 1.0);
        for (i, v) in big.iter().enumerate() {
            assert_eq!(*v, i as f32 + 1.0);
        }
    }
}
