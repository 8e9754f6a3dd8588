use crate::domain::storage::{Storage, StorageKeys};
use crate::domain::{EventRecord, MentionsResume, Report};
use crate::error::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Clone)]
pub struct FileSystemStore {
    data_dir: PathBuf,
    catalog_file: PathBuf,
}

impl FileSystemStore {
    pub fn new(data_dir: impl Into<PathBuf>, catalog_file: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            catalog_file: catalog_file.into(),
        }
    }

    fn get_path_for_key(&self, key: &str, subdir: &str) -> PathBuf {
        self.data_dir.join(subdir).join(format!("{}.json", key))
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    fn write_json_file<T: serde::Serialize + ?Sized>(
        &self,
        key: &str,
        subdir: &str,
        data: &T,
    ) -> Result<PathBuf> {
        self.ensure_dir(&self.data_dir.join(subdir))?;

        let path = self.get_path_for_key(key, subdir);
        let content = serde_json::to_string_pretty(data)?;
        fs::write(&path, content)?;
        Ok(path)
    }

    fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(Some(serde_json::from_str(&content)?))
        } else {
            Ok(None)
        }
    }
}

impl Storage for FileSystemStore {
    fn load_events(&self) -> Result<Option<Vec<EventRecord>>> {
        Self::read_json_file(&self.catalog_file)
    }

    fn load_resume_snapshot(&self) -> Result<Option<MentionsResume>> {
        Self::read_json_file(
            &self.get_path_for_key(StorageKeys::RESUME_SNAPSHOT, StorageKeys::SNAPSHOTS_DIR),
        )
    }

    fn save_resume_snapshot(&self, resume: &MentionsResume) -> Result<()> {
        self.write_json_file(
            StorageKeys::RESUME_SNAPSHOT,
            StorageKeys::SNAPSHOTS_DIR,
            resume,
        )?;
        Ok(())
    }

    fn save_report(&self, report: &Report) -> Result<PathBuf> {
        let key = format!("{}_{}", report.kind, Local::now().format("%Y%m%d_%H%M%S"));
        let path = self.write_json_file(&key, StorageKeys::REPORTS_DIR, report)?;
        info!("Saved {} report to {}", report.kind, path.display());
        Ok(path)
    }
}
