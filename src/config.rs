use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::model::ConfigError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub history_csv: PathBuf,
    pub default_top_n: usize,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_csv: PathBuf::from("prices_history.csv"),
            default_top_n: 10,
            export_dir: PathBuf::from("."),
        }
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
