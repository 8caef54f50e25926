use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// User configuration, loaded from `~/.config/csvpeek/config.toml`.
/// Every field has a default; command-line flags override the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows shown when neither --head nor the pager applies
    pub default_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Case-insensitive filtering by default
    pub ignore_case: bool,

    /// Never start the interactive pager
    pub no_pager: bool,

    /// Lines sampled by the delimiter detector
    pub delimiter_sample_lines: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            behavior: BehaviorConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { default_rows: 50 }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            ignore_case: false,
            no_pager: false,
            delimiter_sample_lines: crate::data::delimiter::DEFAULT_SAMPLE_LINES,
        }
    }
}

impl Config {
    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        Ok(config_dir.join("csvpeek").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.display.default_rows, 50);
        assert!(!config.behavior.ignore_case);
        assert!(!config.behavior.no_pager);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config = toml::from_str("[behavior]\nignore_case = true\n").unwrap();
        assert!(config.behavior.ignore_case);
        assert_eq!(config.display.default_rows, 50);
        assert_eq!(
            config.behavior.delimiter_sample_lines,
            crate::data::delimiter::DEFAULT_SAMPLE_LINES
        );
    }
}
