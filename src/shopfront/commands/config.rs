use crate::commands::{Outcome, ShopPaths};
use crate::config::ShopConfig;
use crate::error::{Result, ShopError};

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(paths: &ShopPaths, action: ConfigAction) -> Result<Outcome<ShopConfig>> {
    let dir = &paths.data_dir;
    match action {
        ConfigAction::ShowAll => {
            let config = ShopConfig::load(dir)?;
            let lines: Vec<String> = ShopConfig::keys()
                .iter()
                .filter_map(|key| config.get(key).map(|val| format!("{} = {}", key, val)))
                .collect();
            Ok(Outcome::new(lines.join("\n")).with_items(vec![config]))
        }
        ConfigAction::ShowKey(key) => {
            let config = ShopConfig::load(dir)?;
            match config.get(&key) {
                Some(val) => Ok(Outcome::new(val).with_items(vec![config])),
                None => Err(ShopError::InvalidInput(format!(
                    "Unknown config key: {}",
                    key
                ))),
            }
        }
        ConfigAction::Set(key, value) => {
            let mut config = ShopConfig::load(dir)?;
            config.set(&key, &value).map_err(ShopError::InvalidInput)?;
            config.save(dir)?;
            let display_val = config.get(&key).unwrap_or_else(|| value.clone());
            tracing::info!(%key, value = %display_val, "config updated");
            Ok(Outcome::new(format!("{} set to {}", key, display_val)).with_items(vec![config]))
        }
    }
}
