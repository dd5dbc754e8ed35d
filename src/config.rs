use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Where `strip` and `arch` put copies of files before rewriting them.
    pub backup_dir: PathBuf,
    /// Name prefix of the "click to select" entry that `strip` removes.
    pub placeholder_prefix: String,
    /// Architectures `arch` asks a download URL for, in output order.
    pub architectures: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backup_dir: PathBuf::from("json_backups"),
            placeholder_prefix: "点击选择 ".to_string(),
            architectures: ["all", "arm64-v8a", "armeabi-v7a", "x86", "x86_64"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
    };
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}
