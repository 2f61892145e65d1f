//! PU21 codes to luminance

use crate::DecodeArgs;
use anyhow::Result;
use tracing::debug;

pub fn run(args: DecodeArgs, verbose: u8) -> Result<()> {
    let pu = super::encoder(&args.calibration)?;
    let values = super::read_values(args.values)?;
    debug!(calibration = %pu.calibration(), count = values.len(), normalized = args.normalized, "decode");

    let luminance = if args.normalized {
        pu.decode_normalized(&values)
    } else {
        pu.decode(&values)
    };

    super::print_values(&values, &luminance, verbose);
    Ok(())
}
