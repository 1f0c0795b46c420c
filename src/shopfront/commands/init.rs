use crate::commands::{Outcome, ShopPaths};
use crate::config::ShopConfig;
use crate::error::Result;

/// Creates the data directory and writes a default `config.json` if there is none yet.
/// Store files are created on first write.
pub fn run(paths: &ShopPaths) -> Result<Outcome<ShopConfig>> {
    let dir = paths.ensure_data_dir()?;

    let config = ShopConfig::load(dir)?;
    if !dir.join("config.json").exists() {
        config.save(dir)?;
    }

    tracing::info!(data_dir = %dir.display(), "store initialized");
    Ok(
        Outcome::new(format!("Initialized shopfront store at {}", dir.display()))
            .with_items(vec![config]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_dir_and_config() {
        let temp = tempdir().unwrap();
        let paths = ShopPaths::new(temp.path().join("shop"));

        let result = run(&paths).unwrap();
        assert!(result.message.starts_with("Initialized shopfront store"));
        assert!(temp.path().join("shop").join("config.json").exists());
    }

    #[test]
    fn keeps_existing_config() {
        let temp = tempdir().unwrap();
        let mut config = ShopConfig::default();
        config.set("conflict-retries", "9").unwrap();
        config.save(temp.path()).unwrap();

        let paths = ShopPaths::new(temp.path().to_path_buf());
        let result = run(&paths).unwrap();
        assert_eq!(result.items()[0].conflict_retries, 9);
    }
}
