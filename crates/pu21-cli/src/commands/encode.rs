//! Luminance to PU21 codes

use crate::EncodeArgs;
use anyhow::Result;
use tracing::debug;

pub fn run(args: EncodeArgs, verbose: u8) -> Result<()> {
    let pu = super::encoder(&args.calibration)?;
    let values = super::read_values(args.values)?;
    debug!(calibration = %pu.calibration(), count = values.len(), normalized = args.normalized, "encode");

    let codes = if args.normalized {
        pu.encode_normalized(&values)
    } else {
        pu.encode(&values)
    };

    // Range warnings were already logged by the encoder
    super::print_values(&values, &codes.value, verbose);
    Ok(())
}
