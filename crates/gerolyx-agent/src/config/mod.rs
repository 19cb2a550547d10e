//! Configuration loading for Gerolyx.
//! Reads gerolyx.toml from the current directory, or the path given by --config /
//! the GEROLYX_CONFIG env var.

use gerolyx_query::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::Context;

pub const DEFAULT_CONFIG_FILE: &str = "gerolyx.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter directive, used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_log_level() -> String { "warn,gerolyx_query=info".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub pretty: bool,
    /// Include the planned data operation and prompt template in the output
    #[serde(default = "bool_true")]
    pub include_operation: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: false, include_operation: bool_true() }
    }
}

fn bool_true() -> bool { true }


impl Config {
    /// Load configuration.
    /// An explicit path must exist; otherwise gerolyx.toml is read when present and
    /// defaults are used when it is not.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!(
                        "Config file not found: {}\n\
                         Copy gerolyx.example.toml to gerolyx.toml and edit it.",
                        path.display()
                    );
                }
                Self::from_file(path)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(Path::new(DEFAULT_CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
