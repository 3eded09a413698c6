use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Error while loading or parsing a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Optional RNG seed for deterministic output.
    pub seed: Option<u64>,
    /// Environment readings used once to create the local visitor.
    #[serde(default)]
    pub environment: EnvironmentConfig,
    /// Snapshot sink configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads a config file from TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

/// Current path and viewport of the real session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub current_path: String,
    pub viewport_width: u32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            current_path: "/".to_string(),
            viewport_width: 1280,
        }
    }
}

/// Snapshot output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output file; stdout when unset.
    pub path: Option<String>,
    /// `none` or `gzip`.
    pub compression: Option<String>,
}
