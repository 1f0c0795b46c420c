use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_CONFLICT_RETRIES: u32 = 3;
const MAX_CONFLICT_RETRIES: u32 = 10;
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration for shopfront, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShopConfig {
    /// How many times a reorder is recomputed after another writer got there first
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,

    /// Run the homepage repair pass whenever homepage articles are listed
    #[serde(default = "default_repair_on_read")]
    pub repair_on_read: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_conflict_retries() -> u32 {
    DEFAULT_CONFLICT_RETRIES
}

fn default_repair_on_read() -> bool {
    true
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
            repair_on_read: true,
            log_level: default_log_level(),
        }
    }
}

impl ShopConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: ShopConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["conflict-retries", "repair-on-read", "log-level"]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "conflict-retries" => Some(self.conflict_retries.to_string()),
            "repair-on-read" => Some(self.repair_on_read.to_string()),
            "log-level" => Some(self.log_level.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "conflict-retries" => {
                let retries: u32 = value
                    .parse()
                    .map_err(|_| format!("conflict-retries must be a number, got {}", value))?;
                if retries > MAX_CONFLICT_RETRIES {
                    return Err(format!(
                        "conflict-retries must be at most {}, got {}",
                        MAX_CONFLICT_RETRIES, retries
                    ));
                }
                self.conflict_retries = retries;
            }
            "repair-on-read" => {
                self.repair_on_read = value
                    .parse()
                    .map_err(|_| format!("repair-on-read must be true or false, got {}", value))?;
            }
            "log-level" => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(format!(
                        "log-level must be one of {}, got {}",
                        LOG_LEVELS.join(", "),
                        value
                    ));
                }
                self.log_level = level;
            }
            other => return Err(format!("Unknown config key: {}", other)),
        }
        Ok(())
    }
}
