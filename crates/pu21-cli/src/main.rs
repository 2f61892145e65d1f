//! pu21 - PU21 luminance encoding from the command line
//!
//! Encodes absolute luminance into PU code values, decodes them back, and
//! evaluates the GOG display model.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "pu21")]
#[command(author, version, about = "PU21 perceptually uniform luminance encoding")]
#[command(long_about = "
Perceptually uniform (PU21) encoding of HDR luminance, plus the GOG display
model that turns display pixel values into absolute luminance.

Values are taken from the command line or, when none are given, read from
stdin as whitespace-separated numbers.

Examples:
  pu21 encode 0.005 1 100 10000           # Luminance (cd/m^2) to PU codes
  pu21 encode -c peaks --normalized 100   # Code in [0, 1] for another calibration
  pu21 decode 256.38                      # PU code back to luminance
  pu21 display --peak 100 --ambient 10 0 0.5 1
  pu21 display --config office.yaml --inverse 50
  pu21 curve -n 16                        # Tabulate the curve
  cat luminance.txt | pu21 -v encode
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode absolute luminance (cd/m^2) into PU21 code values
    #[command(visible_alias = "e")]
    Encode(EncodeArgs),

    /// Decode PU21 code values into absolute luminance
    #[command(visible_alias = "d")]
    Decode(DecodeArgs),

    /// Map display pixel values in [0, 1] to luminance with the GOG model
    Display(DisplayArgs),

    /// Print the encoding curve over the valid luminance range
    Curve(CurveArgs),
}

#[derive(Args)]
pub struct EncodeArgs {
    /// Luminance values in cd/m^2 (stdin if omitted)
    #[arg(allow_negative_numbers = true)]
    values: Vec<f32>,

    /// Calibration: banding, banding_glare, peaks, peaks_glare
    #[arg(short, long, default_value = "banding_glare")]
    calibration: String,

    /// Scale codes to [0, 1] by the code of 10000 cd/m^2
    #[arg(short, long)]
    normalized: bool,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// PU21 code values (stdin if omitted)
    #[arg(allow_negative_numbers = true)]
    values: Vec<f32>,

    /// Calibration: banding, banding_glare, peaks, peaks_glare
    #[arg(short, long, default_value = "banding_glare")]
    calibration: String,

    /// Codes are normalized to [0, 1]
    #[arg(short, long)]
    normalized: bool,
}

#[derive(Args)]
pub struct DisplayArgs {
    /// Pixel values in [0, 1], or luminance with --inverse (stdin if omitted)
    #[arg(allow_negative_numbers = true)]
    values: Vec<f32>,

    /// YAML file with display model fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Peak luminance in cd/m^2
    #[arg(long)]
    peak: Option<f32>,

    /// Contrast ratio
    #[arg(long)]
    contrast: Option<f32>,

    /// Gamma exponent
    #[arg(long)]
    gamma: Option<f32>,

    /// Ambient illuminance in lux
    #[arg(long)]
    ambient: Option<f32>,

    /// Screen reflectivity (0.005 = 0.5%)
    #[arg(long)]
    refl: Option<f32>,

    /// Map luminance back to pixel values
    #[arg(long)]
    inverse: bool,
}

#[derive(Args)]
pub struct CurveArgs {
    /// Calibration: banding, banding_glare, peaks, peaks_glare
    #[arg(short, long, default_value = "banding_glare")]
    calibration: String,

    /// Number of log-spaced samples
    #[arg(short = 'n', long, default_value = "11")]
    samples: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = commands::init_logging(cli.verbose, cli.log_file.as_deref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Encode(args) => commands::encode::run(args, cli.verbose),
        Commands::Decode(args) => commands::decode::run(args, cli.verbose),
        Commands::Display(args) => commands::display::run(args, cli.verbose),
        Commands::Curve(args) => commands::curve::run(args, cli.verbose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_encode() {
        let cli = Cli::try_parse_from(["pu21", "-vv", "encode", "-c", "peaks", "1", "100"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Encode(args) => {
                assert_eq!(args.values, vec![1.0, 100.0]);
                assert_eq!(args.calibration, "peaks");
                assert!(!args.normalized);
            }
            _ => panic!("expected encode"),
        }
    }

    #[test]
    fn test_parse_negative_values() {
        let cli = Cli::try_parse_from(["pu21", "decode", "-5", "10"]).unwrap();
        match cli.command {
            Commands::Decode(args) => assert_eq!(args.values, vec![-5.0, 10.0]),
            _ => panic!("expected decode"),
        }
    }

    #[test]
    fn test_parse_display_flags() {
        let cli = Cli::try_parse_from([
            "pu21", "display", "--peak", "100", "--ambient", "10", "--inverse", "50",
        ])
        .unwrap();
        match cli.command {
            Commands::Display(args) => {
                assert_eq!(args.peak, Some(100.0));
                assert_eq!(args.ambient, Some(10.0));
                assert_eq!(args.contrast, None);
                assert!(args.inverse);
                assert_eq!(args.values, vec![50.0]);
            }
            _ => panic!("expected display"),
        }
    }
}
