use crate::config::Config;
use crate::domain::storage::Storage;
use crate::domain::InMemoryCatalog;
use crate::error::Result;
use crate::infrastructure::{FileSystemStore, MonitorClient};
use crate::services::report_service::ReportService;
use std::sync::Arc;
use tracing::{info, warn, Level};

mod config;
mod domain;
mod error;
mod infrastructure;
mod services;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new()?;

    let level = config.args.log_level.parse().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    config.ensure_directories()?;

    let store = Arc::new(FileSystemStore::new(
        &config.args.data_dir,
        &config.args.catalog_file,
    ));

    let events = store.load_events()?.unwrap_or_else(|| {
        warn!(
            "No catalog at {}, continuing with an empty one",
            config.args.catalog_file.display()
        );
        Vec::new()
    });
    info!("Loaded {} catalog events", events.len());
    let catalog = Arc::new(InMemoryCatalog::new(events));

    let monitor = MonitorClient::new(config.http_client.clone(), &config.settings.api_base_url)?;

    let service = ReportService::new(config, store, catalog, monitor);
    service.run().await
}
