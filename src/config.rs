use crate::error::{Result, SiftError};
use crate::triage::ClassifierConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiftConfig {
    #[serde(default)]
    pub datasets: DatasetSettings,

    #[serde(default)]
    pub ai: ClassifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSettings {
    /// Directory holding the dataset files, relative to the workspace root.
    #[serde(default = "default_path")]
    pub path: String,

    /// Dataset opened when none is specified.
    #[serde(default = "default_dataset")]
    pub default_dataset: String,
}

fn default_path() -> String {
    ".sift".to_string()
}

fn default_dataset() -> String {
    "default".to_string()
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            path: default_path(),
            default_dataset: default_dataset(),
        }
    }
}

impl SiftConfig {
    pub fn load(start_path: &Path) -> Result<(Self, PathBuf)> {
        let config_path = Self::find_config_file(start_path)?;
        let content = std::fs::read_to_string(&config_path)?;
        let config: SiftConfig = serde_yaml::from_str(&content)?;
        let workspace_root = config_path
            .parent()
            .ok_or_else(|| SiftError::Config("Config file has no parent directory".to_string()))?
            .to_path_buf();
        Ok((config, workspace_root))
    }

    pub fn find_config_file(start_path: &Path) -> Result<PathBuf> {
        let mut current = start_path.to_path_buf();
        loop {
            let config_path = current.join(".sift.yml");
            if config_path.exists() {
                return Ok(config_path);
            }
            if !current.pop() {
                return Err(SiftError::NotInitialized);
            }
        }
    }

    pub fn data_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.datasets.path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
