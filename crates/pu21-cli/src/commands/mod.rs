//! CLI command implementations

pub mod curve;
pub mod decode;
pub mod display;
pub mod encode;

use anyhow::{Context, Result};
use pu21_transfer::PuEncoder;
use std::io::Read;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the `-v` count. The returned guard
/// flushes the log file on drop and must outlive `main`'s work.
pub fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_filter(verbose)));

    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file: {}", path.display()))?;
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

/// Maps the `-v` count to a default filter directive.
fn level_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Returns `values`, or numbers read from stdin when it is empty.
pub fn read_values(values: Vec<f32>) -> Result<Vec<f32>> {
    if !values.is_empty() {
        return Ok(values);
    }
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read values from stdin")?;
    parse_values(&input)
}

/// Parses whitespace-separated numbers.
pub fn parse_values(text: &str) -> Result<Vec<f32>> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<f32>()
                .with_context(|| format!("Invalid number: {tok}"))
        })
        .collect()
}

/// Builds an encoder from a calibration name.
pub fn encoder(calibration: &str) -> Result<PuEncoder> {
    PuEncoder::from_name(calibration).with_context(|| format!("Invalid calibration '{calibration}'"))
}

/// Prints one result per line, with the input alongside when verbose.
pub fn print_values(inputs: &[f32], outputs: &[f32], verbose: u8) {
    for (i, o) in inputs.iter().zip(outputs) {
        if verbose > 0 {
            println!("{i}\t{o}");
        } else {
            println!("{o}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values() {
        let v = parse_values(" 0.005\n1 100\t10000 ").unwrap();
        assert_eq!(v, vec![0.005, 1.0, 100.0, 10000.0]);
    }

    #[test]
    fn test_parse_values_rejects_garbage() {
        let err = parse_values("1 two 3").unwrap_err();
        assert!(err.to_string().contains("two"));
    }

    #[test]
    fn test_args_take_precedence() {
        assert_eq!(read_values(vec![5.0]).unwrap(), vec![5.0]);
    }

    #[test]
    fn test_encoder_names() {
        assert!(encoder("peaks_glare").is_ok());
        let err = encoder("glare").unwrap_err();
        assert!(format!("{err:#}").contains("glare"));
    }

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(0), "warn");
        assert_eq!(level_filter(2), "debug");
        assert_eq!(level_filter(9), "trace");
    }
}
