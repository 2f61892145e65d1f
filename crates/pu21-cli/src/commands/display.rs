//! GOG display model evaluation

use crate::DisplayArgs;
use anyhow::{Context, Result, bail};
use pu21_transfer::DisplayModel;
use tracing::debug;

pub fn run(args: DisplayArgs, verbose: u8) -> Result<()> {
    let model = build_model(&args)?;
    model.log();
    println!("{}", model.describe());

    let values = super::read_values(args.values)?;
    let out = if args.inverse {
        model.inverse(&values)
    } else {
        model.forward(&values).into_value()
    };

    super::print_values(&values, &out, verbose);
    Ok(())
}

/// Loads the config file (if any), then applies command-line overrides.
fn build_model(args: &DisplayArgs) -> Result<DisplayModel> {
    let base = match (&args.config, args.peak) {
        (Some(path), _) => {
            debug!(path = %path.display(), "loading display config");
            DisplayModel::from_file(path)
                .with_context(|| format!("Failed to load display config: {}", path.display()))?
        }
        (None, Some(peak)) => DisplayModel::new(peak),
        (None, None) => bail!("Either --peak or --config is required"),
    };

    let mut model = base;
    if let Some(peak) = args.peak {
        model = model.with_peak(peak);
    }
    if let Some(contrast) = args.contrast {
        model = model.with_contrast(contrast);
    }
    if let Some(gamma) = args.gamma {
        model = model.with_gamma(gamma);
    }
    if let Some(ambient) = args.ambient {
        model = model.with_ambient(ambient);
    }
    if let Some(refl) = args.refl {
        model = model.with_reflectivity(refl);
    }

    model.validate().context("Invalid display model")?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn args(config: Option<PathBuf>) -> DisplayArgs {
        DisplayArgs {
            values: Vec::new(),
            config,
            peak: None,
            contrast: None,
            gamma: None,
            ambient: None,
            refl: None,
            inverse: false,
        }
    }

    fn write_config(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_flags_only() {
        let mut a = args(None);
        a.peak = Some(100.0);
        a.ambient = Some(10.0);
        let dm = build_model(&a).unwrap();
        assert_eq!(dm.y_peak(), 100.0);
        assert_eq!(dm.contrast(), 1000.0);
        assert!((dm.black_level() - 0.115_915).abs() < 1e-5);
    }

    #[test]
    fn test_peak_required() {
        assert!(build_model(&args(None)).is_err());
    }

    #[test]
    fn test_config_file() {
        let file = write_config("y_peak: 500\ncontrast: 5000\ngamma: 2.4\n");
        let dm = build_model(&args(Some(file.path().to_path_buf()))).unwrap();
        assert_eq!(dm.y_peak(), 500.0);
        assert_eq!(dm.contrast(), 5000.0);
        assert_eq!(dm.gamma(), 2.4);
        assert_eq!(dm.k_refl(), 0.005);
    }

    #[test]
    fn test_flags_override_config() {
        let file = write_config("y_peak: 500\ne_ambient: 100\n");
        let mut a = args(Some(file.path().to_path_buf()));
        a.peak = Some(200.0);
        a.ambient = Some(0.0);
        let dm = build_model(&a).unwrap();
        assert_eq!(dm.y_peak(), 200.0);
        assert_eq!(dm.e_ambient(), 0.0);
    }

    #[test]
    fn test_bad_config() {
        let file = write_config("y_peak: 100\nbrightness: 3\n");
        let err = build_model(&args(Some(file.path().to_path_buf()))).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load display config"));
    }

    #[test]
    fn test_invalid_override() {
        let mut a = args(None);
        a.peak = Some(100.0);
        a.gamma = Some(-1.0);
        let err = build_model(&a).unwrap_err();
        assert!(format!("{err:#}").contains("gamma"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = build_model(&args(Some(PathBuf::from("/nonexistent/pu21-display.yaml")))).unwrap_err();
        assert!(format!("{err:#}").contains("nonexistent"));
    }
}
