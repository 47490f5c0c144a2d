mod capture;
mod dataset;
mod init;
mod list;
mod mutate;
mod triage;

pub use capture::{handle_capture, handle_inbox};
pub use dataset::{handle_datasets, handle_save, handle_status, handle_switch};
pub use init::handle_init;
pub use list::{handle_goals, handle_items, handle_next, handle_projects, handle_shopping};
pub use mutate::{
    handle_acquire, handle_add, handle_done, handle_goal_assign, handle_goal_new, handle_reorder,
    handle_undone,
};
pub use triage::handle_triage;

use crate::config::SiftConfig;
use crate::storage::{DatasetStore, Repository};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Common context passed to all command handlers
pub struct CommandContext {
    pub config: SiftConfig,
    pub root: PathBuf,
    pub repo: Repository,
}

impl CommandContext {
    /// Load the workspace config and open the requested dataset.
    pub fn new(dataset_override: Option<&str>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine working directory")?;
        let (config, root) = SiftConfig::load(&cwd).context("Failed to load workspace")?;

        let name = dataset_override.unwrap_or(&config.datasets.default_dataset);
        let store = DatasetStore::new(config.data_path(&root));
        let repo = Repository::open(store, name)
            .with_context(|| format!("Failed to open dataset '{}'", name))?;

        Ok(Self { config, root, repo })
    }
}
