use crate::config::cli::Args;
use crate::error::Result;
use crate::infrastructure::DEFAULT_API_BASE_URL;
use crate::services::buzz::DEFAULT_REFERENCE_DATE;
use crate::services::opportunities::{DEFAULT_HORIZON_DAYS, DEFAULT_TOP_OPPORTUNITIES};
use chrono::{Local, NaiveDate};
use clap::Parser;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub(crate) mod cli;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 900;

/// Optional settings file. Missing keys fall back to defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub poll_interval_secs: u64,
    pub horizon_days: u32,
    pub top_opportunities: usize,
    pub buzz_reference_date: NaiveDate,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            horizon_days: DEFAULT_HORIZON_DAYS,
            top_opportunities: DEFAULT_TOP_OPPORTUNITIES,
            buzz_reference_date: DEFAULT_REFERENCE_DATE,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}

pub struct Config {
    pub args: Args,
    pub settings: Settings,
    pub http_client: Client,
}

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let mut settings = Settings::load(&args.config_file)?;
        if let Some(url) = &args.api_base_url {
            settings.api_base_url = url.clone();
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("eventscope/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            args,
            settings,
            http_client,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.args.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.settings.poll_interval_secs.max(1))
    }

    pub fn ensure_directories(&self) -> Result<()> {
        if !self.args.data_dir.exists() {
            std::fs::create_dir_all(&self.args.data_dir)?;
        }

        info!("Data dir {} exists", self.args.data_dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(dir: &TempDir, extra: &[&str]) -> Args {
        let config_file = dir.path().join("eventscope.json");
        let mut argv = vec![
            "eventscope".to_string(),
            "--config-file".to_string(),
            config_file.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        argv.push("temporal".to_string());
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn missing_settings_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_args(args(&dir, &[])).unwrap();
        assert_eq!(config.settings.poll_interval_secs, 900);
        assert_eq!(config.settings.horizon_days, 90);
        assert_eq!(config.settings.top_opportunities, 15);
        assert_eq!(config.settings.buzz_reference_date.to_string(), "2025-10-09");
    }

    #[test]
    fn settings_file_is_partial_and_cli_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("eventscope.json"),
            r#"{"poll_interval_secs": 60, "api_base_url": "http://file/api/"}"#,
        )
        .unwrap();

        let config = Config::from_args(args(&dir, &[])).unwrap();
        assert_eq!(config.settings.poll_interval_secs, 60);
        assert_eq!(config.settings.api_base_url, "http://file/api/");
        assert_eq!(config.settings.horizon_days, 90);

        let config =
            Config::from_args(args(&dir, &["--api-base-url", "http://cli/api/"])).unwrap();
        assert_eq!(config.settings.api_base_url, "http://cli/api/");
    }

    #[test]
    fn today_override() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_args(args(&dir, &["--today", "2025-11-01"])).unwrap();
        assert_eq!(config.today().to_string(), "2025-11-01");
    }
}
