//! Tabulates the encoding curve

use crate::CurveArgs;
use anyhow::{Result, bail};
use pu21_transfer::{L_MAX, L_MIN, PuEncoder};

pub fn run(args: CurveArgs, _verbose: u8) -> Result<()> {
    if args.samples < 2 {
        bail!("Need at least 2 samples, got {}", args.samples);
    }
    let pu = super::encoder(&args.calibration)?;

    println!("# {} (code max {:.4})", pu.calibration(), pu.code_max());
    println!("# Y [cd/m^2]\tV\tV normalized");
    for (y, v, n) in table(&pu, args.samples) {
        println!("{y:.6}\t{v:.4}\t{n:.6}");
    }
    Ok(())
}

/// Log-spaced `(Y, V, V / code_max)` rows over [L_MIN, L_MAX].
fn table(pu: &PuEncoder, samples: usize) -> Vec<(f32, f32, f32)> {
    let lo = f64::from(L_MIN).log10();
    let hi = f64::from(L_MAX).log10();
    (0..samples)
        .map(|i| {
            let t = i as f64 / (samples - 1) as f64;
            let y = (10f64.powf(lo + (hi - lo) * t) as f32).clamp(L_MIN, L_MAX);
            (y, pu.encode_value(y), pu.encode_normalized_value(y))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_endpoints() {
        let pu = PuEncoder::default();
        let rows = table(&pu, 11);
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[0].0, L_MIN);
        assert_eq!(rows[10].0, L_MAX);
        assert!(rows[0].1.abs() < 1e-3);
        assert!((rows[10].2 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_table_monotonic() {
        let rows = table(&PuEncoder::default(), 50);
        assert!(rows.windows(2).all(|w| w[1].1 > w[0].1));
    }
}
