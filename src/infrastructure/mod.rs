mod clients;
mod storage;

pub use clients::monitor::{MonitorClient, RankingQuery, DEFAULT_API_BASE_URL};
pub use storage::fs_store::FileSystemStore;
