use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIB: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("levels_of_undo ({min}) is larger than max_levels ({max})")]
    InvalidLimits { min: usize, max: usize },
}

/// How much history a document keeps
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Steps that are kept whatever memory they use
    #[serde(default = "default_levels_of_undo")]
    pub levels_of_undo: usize,
    /// Hard cap on undo steps
    #[serde(default = "default_max_levels")]
    pub max_levels: usize,
    /// Bytes the undo stack may use before old steps are dropped
    #[serde(default = "default_undo_size")]
    pub undo_size: usize,
    /// Longest side of a history thumbnail, in pixels
    #[serde(default = "default_undo_preview_size")]
    pub undo_preview_size: u32,
}

fn default_levels_of_undo() -> usize {
    5
}

fn default_max_levels() -> usize {
    1024
}

fn default_undo_size() -> usize {
    64 * MIB
}

fn default_undo_preview_size() -> u32 {
    64
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            levels_of_undo: default_levels_of_undo(),
            max_levels: default_max_levels(),
            undo_size: default_undo_size(),
            undo_preview_size: default_undo_preview_size(),
        }
    }
}

impl HistoryConfig {
    /// Load a config from a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels_of_undo > self.max_levels {
            return Err(ConfigError::InvalidLimits {
                min: self.levels_of_undo,
                max: self.max_levels,
            });
        }
        Ok(())
    }
}
