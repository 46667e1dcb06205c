use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::faker::DEFAULT_MAX_DEPTH;

pub const DEFAULT_CONFIG_PATH: &str = "specmock.toml";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub specs: SpecsConfig,
    pub faker: FakerConfig,
    pub logs: LogsConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let cfg = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&cfg)?)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where OpenAPI documents are read from.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SpecsConfig {
    pub dir: PathBuf,
}

impl Default for SpecsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./specs"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FakerConfig {
    /// Fixed seed for reproducible responses; unset means OS entropy.
    pub seed: Option<u64>,
    pub max_depth: usize,
}

impl Default for FakerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LogsConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    pub buffer_capacity: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            buffer_capacity: 1000,
        }
    }
}
