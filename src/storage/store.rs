use crate::error::{Result, SiftError};
use crate::model::DatasetContent;
use crate::validation;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File IO for named datasets.
///
/// Each dataset is a single YAML document at `{base}/{name}.yaml`. Field
/// order follows struct declaration order, so consecutive saves of the
/// same data produce identical bytes and minimal diffs.
pub struct DatasetStore {
    base_path: PathBuf,
}

impl DatasetStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn dataset_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.yaml", name))
    }

    pub fn exists(&self, name: &str) -> bool {
        validation::validate_dataset_name(name).is_ok() && self.dataset_path(name).exists()
    }

    /// Parse the named dataset. Never mutates anything; on failure the
    /// caller's in-memory state is untouched by construction.
    pub fn load(&self, name: &str) -> Result<DatasetContent> {
        validation::validate_dataset_name(name)?;
        let path = self.dataset_path(name);
        if !path.exists() {
            return Err(SiftError::NotFound(name.to_string()));
        }

        let content = std::fs::read_to_string(&path)?;
        serde_yaml::from_str(&content).map_err(|e| SiftError::CorruptData {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Serialize and write the dataset with write-replace discipline:
    /// a crash or write failure leaves the prior valid file in place.
    pub fn save(&self, name: &str, data: &DatasetContent) -> Result<()> {
        validation::validate_dataset_name(name)?;
        std::fs::create_dir_all(&self.base_path)
            .map_err(|e| SiftError::Persistence(format!("Failed to create data dir: {}", e)))?;

        let content = serde_yaml::to_string(data)
            .map_err(|e| SiftError::Persistence(format!("Failed to serialize dataset: {}", e)))?;

        self.atomic_write(&self.dataset_path(name), &content)
    }

    /// Enumerate available dataset names, sorted. Pure read.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().map(|e| e == "yaml").unwrap_or(false) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Atomically write content to a file using temp file + rename.
    fn atomic_write(&self, target_path: &Path, content: &str) -> Result<()> {
        let target_dir = target_path.parent().ok_or_else(|| {
            SiftError::Persistence("Target path has no parent directory".to_string())
        })?;

        // Temp file must live in the target directory for the rename to
        // stay atomic
        let mut temp_file = NamedTempFile::new_in(target_dir)
            .map_err(|e| SiftError::Persistence(format!("Failed to create temp file: {}", e)))?;

        use std::io::Write;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| SiftError::Persistence(format!("Failed to write temp file: {}", e)))?;

        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| SiftError::Persistence(format!("Failed to sync temp file: {}", e)))?;

        temp_file
            .persist(target_path)
            .map_err(|e| SiftError::Persistence(format!("Failed to persist temp file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemDetail, Project, ProjectItem};
    use tempfile::TempDir;

    fn sample_dataset() -> DatasetContent {
        let mut data = DatasetContent::default();
        let mut project = Project::new(1, "Kitchen".into());
        project.items.push(
            ProjectItem::new("itm-aaaaa".into(), "Sand wall".into(), ItemDetail::task(None))
                .with_tags(["physical"]),
        );
        data.projects.push(project);
        data.inbox.enqueue("Buy milk".into());
        data
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = DatasetStore::new(temp.path().to_path_buf());

        let data = sample_dataset();
        store.save("home", &data).unwrap();
        let loaded = store.load("home").unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = DatasetStore::new(temp.path().to_path_buf());
        assert!(matches!(store.load("nope"), Err(SiftError::NotFound(_))));
    }

    #[test]
    fn test_load_corrupt_reports_corrupt_data() {
        let temp = TempDir::new().unwrap();
        let store = DatasetStore::new(temp.path().to_path_buf());
        std::fs::write(store.dataset_path("bad"), "projects: [not valid").unwrap();
        assert!(matches!(
            store.load("bad"),
            Err(SiftError::CorruptData { .. })
        ));
    }

    #[test]
    fn test_save_is_byte_stable() {
        let temp = TempDir::new().unwrap();
        let store = DatasetStore::new(temp.path().to_path_buf());

        let data = sample_dataset();
        store.save("home", &data).unwrap();
        let first = std::fs::read_to_string(store.dataset_path("home")).unwrap();
        store.save("home", &data).unwrap();
        let second = std::fs::read_to_string(store.dataset_path("home")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_save_keeps_prior_file() {
        let temp = TempDir::new().unwrap();
        let store = DatasetStore::new(temp.path().to_path_buf());
        store.save("home", &sample_dataset()).unwrap();
        let before = std::fs::read_to_string(store.dataset_path("home")).unwrap();

        // A store pointed at a file (not a directory) cannot create its
        // temp file, so the write fails before touching the target
        let bogus = DatasetStore::new(store.dataset_path("home").join("sub"));
        assert!(bogus.save("home", &sample_dataset()).is_err());

        let after = std::fs::read_to_string(store.dataset_path("home")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_list_sorted() {
        let temp = TempDir::new().unwrap();
        let store = DatasetStore::new(temp.path().to_path_buf());
        store.save("work", &DatasetContent::default()).unwrap();
        store.save("home", &DatasetContent::default()).unwrap();
        assert_eq!(store.list().unwrap(), vec!["home", "work"]);
    }

    #[test]
    fn test_rejects_traversal_names() {
        let temp = TempDir::new().unwrap();
        let store = DatasetStore::new(temp.path().to_path_buf());
        assert!(store.save("../evil", &DatasetContent::default()).is_err());
        assert!(store.load("../evil").is_err());
    }
}
