use super::{EventRecord, MentionsResume, Report};
use crate::error::Result;
use std::path::PathBuf;

pub trait Storage: Send + Sync {
    fn load_events(&self) -> Result<Option<Vec<EventRecord>>>;
    fn load_resume_snapshot(&self) -> Result<Option<MentionsResume>>;
    fn save_resume_snapshot(&self, resume: &MentionsResume) -> Result<()>;
    fn save_report(&self, report: &Report) -> Result<PathBuf>;
}

pub struct StorageKeys;

impl StorageKeys {
    // Base directories
    pub const REPORTS_DIR: &'static str = "reports";
    pub const SNAPSHOTS_DIR: &'static str = "snapshots";

    pub const RESUME_SNAPSHOT: &'static str = "resume";
}
