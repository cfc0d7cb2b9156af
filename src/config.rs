//! Pipeline configuration
//!
//! All tunable constants of the harness live here rather than as embedded
//! literals: split fraction, seed, SMOTE neighbor count, decision
//! threshold, and risk-band cut points. Loadable from YAML or JSON with
//! CLI overrides on top.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default decision threshold for the hard 0/1 label
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Default risk-band boundaries (lower-inclusive, upper-exclusive; the top
/// band is closed at 1.0)
pub const DEFAULT_BAND_CUTS: [f64; 3] = [0.25, 0.50, 0.75];

/// Tunable parameters of the training/evaluation harness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fraction of rows held out for testing
    pub test_fraction: f64,
    /// Seed for the split shuffle, SMOTE, and any stochastic model
    pub seed: u64,
    /// Nearest-neighbor count for SMOTE
    pub smote_k: usize,
    /// Decision threshold for the hard label
    pub threshold: f64,
    /// Risk-band boundaries, ascending
    pub band_cuts: [f64; 3],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            smote_k: 5,
            threshold: DEFAULT_THRESHOLD,
            band_cuts: DEFAULT_BAND_CUTS,
        }
    }
}

impl PipelineConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file and validate
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&text)
                .map_err(|e| Error::Serialization(format!("YAML config parse failed: {e}")))?,
            Some("json") => serde_json::from_str(&text)
                .map_err(|e| Error::Serialization(format!("JSON config parse failed: {e}")))?,
            other => {
                return Err(Error::Serialization(format!(
                    "unsupported config extension {other:?} (expected yaml, yml, or json)"
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field is in range
    pub fn validate(&self) -> Result<()> {
        if self.test_fraction <= 0.0 || self.test_fraction >= 1.0 {
            return Err(Error::Schema(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.smote_k == 0 {
            return Err(Error::Schema("smote_k must be at least 1".to_string()));
        }
        if self.threshold <= 0.0 || self.threshold >= 1.0 {
            return Err(Error::Schema(format!(
                "threshold must be in (0, 1), got {}",
                self.threshold
            )));
        }
        let cuts = &self.band_cuts;
        let ascending = cuts[0] < cuts[1] && cuts[1] < cuts[2];
        if !ascending || cuts[0] <= 0.0 || cuts[2] >= 1.0 {
            return Err(Error::Schema(format!(
                "band_cuts must be strictly ascending within (0, 1), got {cuts:?}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.band_cuts, [0.25, 0.50, 0.75]);
    }

    #[test]
    fn test_validate_rejects_bad_fraction() {
        let mut config = PipelineConfig::default();
        config.test_fraction = 0.0;
        assert!(config.validate().is_err());
        config.test_fraction = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unordered_cuts() {
        let mut config = PipelineConfig::default();
        config.band_cuts = [0.5, 0.25, 0.75];
        assert!(config.validate().is_err());
        config.band_cuts = [0.0, 0.5, 0.75];
        assert!(config.validate().is_err());
        config.band_cuts = [0.25, 0.5, 1.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_k() {
        let mut config = PipelineConfig::default();
        config.smote_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_yaml_with_partial_fields() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "test_fraction: 0.3\nseed: 7").unwrap();
        let config = PipelineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.test_fraction, 0.3);
        assert_eq!(config.seed, 7);
        // Unspecified fields fall back to defaults
        assert_eq!(config.smote_k, 5);
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{{\"threshold\": 0.4}}").unwrap();
        let config = PipelineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.threshold, 0.4);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = NamedTempFile::new().unwrap();
        assert!(PipelineConfig::from_path(file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "test_fraction: 2.0").unwrap();
        assert!(PipelineConfig::from_path(file.path()).is_err());
    }
}
