use crate::cli::ScanKind;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use stemsim::core::grid::PerAxis;
use tracing::debug;

/// A TOML value that is either a scalar broadcast to both grid axes or an
/// explicit per-axis pair.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum ScalarOrPair<T> {
    Scalar(T),
    Pair([T; 2]),
}

impl<T: Copy> From<ScalarOrPair<T>> for PerAxis<T> {
    fn from(value: ScalarOrPair<T>) -> Self {
        match value {
            ScalarOrPair::Scalar(v) => PerAxis::from(v),
            ScalarOrPair::Pair(p) => PerAxis::from(p),
        }
    }
}

/// Scan parameters read from a TOML configuration file.
///
/// Every field is optional; command-line flags take precedence over file
/// values, and whatever remains unset falls back to the command defaults.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ScanFileConfig {
    pub kind: Option<ScanKind>,
    pub start: Option<[f64; 2]>,
    pub end: Option<[f64; 2]>,
    pub gpts: Option<ScalarOrPair<usize>>,
    pub sampling: Option<ScalarOrPair<f64>>,
    pub endpoint: Option<bool>,
    pub partitions: Option<[usize; 2]>,
    /// Explicit probe positions for a custom scan.
    pub positions: Option<Vec<[f64; 2]>>,
}

pub fn load_scan_config(path: &Path) -> Result<ScanFileConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config = toml::from_str(&contents).map_err(|source| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded scan configuration from '{}'.", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn scalar_and_pair_values_both_deserialize() {
        let config: ScanFileConfig = toml::from_str(
            r#"
            kind = "grid"
            start = [0.0, 0.0]
            end = [2.0, 4.0]
            gpts = 16
            sampling = [0.5, 0.25]
            endpoint = false
            partitions = [2, 2]
            "#,
        )
        .unwrap();

        assert_eq!(config.kind, Some(ScanKind::Grid));
        assert_eq!(PerAxis::from(config.gpts.unwrap()), PerAxis::new(16, 16));
        assert_eq!(
            PerAxis::from(config.sampling.unwrap()),
            PerAxis::new(0.5, 0.25)
        );
        assert_eq!(config.partitions, Some([2, 2]));
    }

    #[test]
    fn custom_scan_positions_deserialize() {
        let config: ScanFileConfig = toml::from_str(
            r#"
            kind = "custom"
            positions = [[2.0, 2.0], [1.0, 1.0]]
            "#,
        )
        .unwrap();
        assert_eq!(config.positions, Some(vec![[2.0, 2.0], [1.0, 1.0]]));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(toml::from_str::<ScanFileConfig>("spacing = 0.5").is_err());
    }

    #[test]
    fn load_reports_the_offending_path_on_parse_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "start = \"not a point\"").unwrap();

        let err = load_scan_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse file"));
    }
}
