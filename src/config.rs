use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Parameters of the spectral-flux onset pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    /// Samples per analysis window; also the FFT size and the hop size.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Number of flux values averaged into each local threshold.
    #[serde(default = "default_threshold_window_size")]
    pub threshold_window_size: usize,
    /// Sensitivity applied to the local mean flux.
    #[serde(default = "default_threshold_multiplier")]
    pub threshold_multiplier: f32,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub peaks_only: bool,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            threshold_window_size: default_threshold_window_size(),
            threshold_multiplier: default_threshold_multiplier(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            peaks_only: false,
            pretty: default_pretty(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidConfig("window_size must be positive".into()));
        }
        if self.threshold_window_size < MIN_THRESHOLD_WINDOW_SIZE {
            return Err(Error::InvalidConfig(format!(
                "threshold_window_size must be at least {}, got {}",
                MIN_THRESHOLD_WINDOW_SIZE,
                self.threshold_window_size
            )));
        }
        if !self.threshold_multiplier.is_finite() || self.threshold_multiplier <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "threshold_multiplier must be a positive number, got {}",
                self.threshold_multiplier
            )));
        }
        Ok(())
    }
}

pub const DEFAULT_WINDOW_SIZE: usize = 1024;
pub const DEFAULT_THRESHOLD_WINDOW_SIZE: usize = 50;
pub const DEFAULT_THRESHOLD_MULTIPLIER: f32 = 1.5;
/// Peak picking looks two records behind the first thresholded index.
const MIN_THRESHOLD_WINDOW_SIZE: usize = 4;

fn default_window_size() -> usize { DEFAULT_WINDOW_SIZE }
fn default_threshold_window_size() -> usize { DEFAULT_THRESHOLD_WINDOW_SIZE }
fn default_threshold_multiplier() -> f32 { DEFAULT_THRESHOLD_MULTIPLIER }
fn default_pretty() -> bool { true }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            log::warn!("Ignoring malformed config {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.analysis, AnalysisConfig::default());
        assert_eq!(cfg.analysis.window_size, 1024);
        assert_eq!(cfg.analysis.threshold_window_size, 50);
        assert!(!cfg.output.peaks_only);
        assert!(cfg.output.pretty);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: Config = toml::from_str("[analysis]\nthreshold_multiplier = 2.0\n").unwrap();
        assert_eq!(cfg.analysis.threshold_multiplier, 2.0);
        assert_eq!(cfg.analysis.window_size, DEFAULT_WINDOW_SIZE);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = AnalysisConfig::default();
        assert!(cfg.validate().is_ok());

        cfg.window_size = 0;
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));

        cfg = AnalysisConfig { threshold_window_size: 3, ..AnalysisConfig::default() };
        assert!(cfg.validate().is_err());

        cfg = AnalysisConfig { threshold_multiplier: f32::NAN, ..AnalysisConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
