use crate::config::SiftConfig;
use crate::error::SiftError;
use crate::model::DatasetContent;
use crate::storage::DatasetStore;
use anyhow::{Context, Result};
use colored::Colorize;

pub fn handle_init(dataset: String) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let config_path = cwd.join(".sift.yml");

    if config_path.exists() {
        return Err(SiftError::AlreadyInitialized(config_path.display().to_string()).into());
    }

    let mut config = SiftConfig::default();
    config.datasets.default_dataset = dataset.clone();
    config.save(&config_path)?;

    let store = DatasetStore::new(config.data_path(&cwd));
    store.save(&dataset, &DatasetContent::default())?;

    println!(
        "{} sift workspace with dataset '{}'",
        "Initialized".green(),
        dataset.cyan()
    );
    println!("Capture your first note with: sift capture \"...\"");
    Ok(())
}
