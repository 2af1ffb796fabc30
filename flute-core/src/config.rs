//! Game settings, optionally read from a TOML file. Missing keys keep their
//! default value.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FluteError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Requested capture rate in Hz; the device may settle on another one.
    pub sample_rate: u32,
    /// Samples per analysis window.
    pub window_size: usize,
    /// YIN absolute threshold.
    pub threshold: f64,
    /// Full windows skipped after each analysed one.
    pub skipped_windows: usize,
    /// Score columns on screen.
    pub viewport_width: usize,
    /// Column where notes are judged.
    pub alignment_column: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            window_size: 5000,
            threshold: 0.05,
            skipped_windows: 2,
            viewport_width: 40,
            alignment_column: 10,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(FluteError::InvalidConfig("sample_rate must be positive".into()));
        }
        if self.window_size < 8 {
            return Err(FluteError::InvalidConfig(format!(
                "window_size {} is too small, use at least 8 samples",
                self.window_size
            )));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(FluteError::InvalidConfig(format!(
                "threshold {} must be between 0 and 1",
                self.threshold
            )));
        }
        if self.viewport_width < 2 {
            return Err(FluteError::InvalidConfig("viewport_width must be at least 2".into()));
        }
        if self.alignment_column + 1 >= self.viewport_width {
            return Err(FluteError::InvalidConfig(format!(
                "alignment_column {} must be left of the last column of a {} wide viewport",
                self.alignment_column, self.viewport_width
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_size, 5000);
        assert_eq!(config.skipped_windows, 2);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = GameConfig::from_toml_str("threshold = 0.1\nviewport_width = 60\n").unwrap();
        assert_eq!(config.threshold, 0.1);
        assert_eq!(config.viewport_width, 60);
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.alignment_column, 10);
    }

    #[test]
    fn rejects_bad_values() {
        for source in [
            "window_size = 4",
            "threshold = 0.0",
            "threshold = 1.5",
            "sample_rate = 0",
            "viewport_width = 1",
            "alignment_column = 39",
        ] {
            assert!(
                matches!(GameConfig::from_toml_str(source), Err(FluteError::InvalidConfig(_))),
                "{source} accepted"
            );
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(GameConfig::from_toml_str("window_size = \"big\""), Err(FluteError::Toml(_))));
    }
}
