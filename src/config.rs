//! Board bindings read from a TOML file.
//!
//! ```toml
//! [[board]]
//! bus = "/dev/i2c-1"
//! compatible = "equiser,qwxioe"
//! name = "exp0"
//! address = 0x50
//! ```
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::board::BoardConfig;
use crate::driver::COMPATIBLE;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration")]
    Parse(#[source] toml::de::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverConfig {
    #[serde(default, rename = "board")]
    pub boards: Vec<BoardBinding>,
}

/// One board to attach: where it sits and what it declares itself as.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardBinding {
    pub bus: PathBuf,
    #[serde(default = "default_compatible")]
    pub compatible: String,
    #[serde(flatten)]
    pub board: BoardConfig,
}

fn default_compatible() -> String {
    COMPATIBLE[0].to_owned()
}

impl DriverConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }
}
