use crate::config::cli::Command;
use crate::config::Config;
use crate::domain::storage::Storage;
use crate::domain::{DetectionKind, EventCatalog, MentionsResume, Report};
use crate::error::{Result, ScopeError};
use crate::infrastructure::{MonitorClient, RankingQuery};
use crate::services::{
    buzz::BuzzModel,
    calendar::month_calendar,
    competition::{competition_summary, SaturationClassifier},
    opportunities::OpportunityFinder,
    rankings::{
        artist_mention_stats, artist_ranking, event_ranking, latest_mentions, ArtistSort,
        DetectionFilter, RankingTab,
    },
    temporal::temporal_metrics,
    viability::DateViabilityScorer,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs one CLI command end to end: analysis, stdout output and optional storage.
pub struct ReportService {
    config: Config,
    store: Arc<dyn Storage>,
    catalog: Arc<dyn EventCatalog>,
    monitor: MonitorClient,
}

impl ReportService {
    pub fn new(
        config: Config,
        store: Arc<dyn Storage + 'static>,
        catalog: Arc<dyn EventCatalog + 'static>,
        monitor: MonitorClient,
    ) -> Self {
        Self {
            config,
            store,
            catalog,
            monitor,
        }
    }

    pub async fn run(&self) -> Result<()> {
        let command = self.config.args.command.clone();
        if let Command::Watch = command {
            return self.watch().await;
        }

        let (kind, payload) = self.build_report(&command).await?;
        println!("{}", serde_json::to_string_pretty(&payload)?);

        if self.config.args.save {
            let report = Report::new(kind, self.catalog.events().len(), payload);
            let path = self.store.save_report(&report)?;
            info!("Report written to {}", path.display());
        }

        Ok(())
    }

    pub async fn build_report(&self, command: &Command) -> Result<(&'static str, Value)> {
        let catalog = Arc::clone(&self.catalog);
        let settings = &self.config.settings;

        match command {
            Command::ScoreDate { date } => {
                let analysis = DateViabilityScorer::new(catalog).score_date(*date);
                info!("Scored {}: {} ({:?})", date, analysis.score, analysis.level);
                Ok(("score_date", to_value(&analysis)?))
            }
            Command::Competition { genre, window_days } => {
                let entries =
                    SaturationClassifier::new(catalog).classify(genre.as_deref(), *window_days);
                let summary = competition_summary(&entries);
                Ok(("competition", json!({ "summary": summary, "entries": entries })))
            }
            Command::Opportunities { horizon_days, top } => {
                let finder = OpportunityFinder::new(
                    catalog,
                    horizon_days.unwrap_or(settings.horizon_days),
                    top.unwrap_or(settings.top_opportunities),
                );
                Ok(("opportunities", to_value(&finder.report(self.config.today()))?))
            }
            Command::Buzz {
                event_id,
                as_of,
                compare,
                weeks,
            } => {
                let model = BuzzModel::new(catalog, as_of.unwrap_or(settings.buzz_reference_date));
                match event_id {
                    Some(id) => Ok(("buzz", to_value(&model.profile(id, compare, *weeks)?)?)),
                    None => Ok(("buzz_ranking", to_value(&model.ranking())?)),
                }
            }
            Command::Calendar { year, month } => Ok((
                "calendar",
                to_value(&month_calendar(catalog.as_ref(), *year, *month)?)?,
            )),
            Command::Temporal => Ok(("temporal", to_value(&temporal_metrics(catalog.as_ref()))?)),
            Command::Mentions { city, kind, artist } => {
                let resume = self.fetch_resume().await?;
                if let Some(artist) = artist {
                    let stats = artist_mention_stats(&resume, artist);
                    return Ok(("artist_mentions", to_value(&stats)?));
                }
                let filter = DetectionFilter {
                    city: city.as_deref(),
                    kind: parse_kind(kind.as_deref())?,
                    station: None,
                };
                Ok(("mentions", to_value(&latest_mentions(&resume, &filter))?))
            }
            Command::Artists {
                city,
                kind,
                station,
                sort_by,
            } => {
                let resume = self.fetch_resume().await?;
                let filter = DetectionFilter {
                    city: city.as_deref(),
                    kind: parse_kind(kind.as_deref())?,
                    station: station.as_deref(),
                };
                let sort = ArtistSort::from_str(sort_by).map_err(ScopeError::Parse)?;
                Ok(("artists", to_value(&artist_ranking(&resume, &filter, sort))?))
            }
            Command::EventsRanking {
                country,
                city,
                venue,
                range,
                tab,
            } => {
                let tab = RankingTab::from_str(tab).map_err(ScopeError::Parse)?;
                let query = RankingQuery {
                    country: country.clone(),
                    city: city.clone(),
                    venue: venue.clone(),
                    range: range.clone(),
                };
                let events = self.monitor.get_event_ranking(&query).await?;
                Ok(("events_ranking", to_value(&event_ranking(events, tab))?))
            }
            Command::Watch => Err(ScopeError::Other(
                "watch does not produce a report".to_string(),
            )),
        }
    }

    /// Latest detections from the API, or the stored snapshot when the API fails.
    async fn fetch_resume(&self) -> Result<MentionsResume> {
        match self.monitor.get_mentions_resume().await {
            Ok(resume) => {
                self.store.save_resume_snapshot(&resume)?;
                Ok(resume)
            }
            Err(e) => match self.store.load_resume_snapshot()? {
                Some(snapshot) => {
                    warn!("Detections API unavailable ({}), using stored snapshot", e);
                    Ok(snapshot)
                }
                None => Err(e),
            },
        }
    }

    async fn watch(&self) -> Result<()> {
        let period = self.config.poll_interval();
        info!("Refreshing detections every {}s", period.as_secs());

        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = interval.tick() => self.refresh_snapshot().await,
                _ = tokio::signal::ctrl_c() => {
                    info!("Stopping detections watch");
                    return Ok(());
                }
            }
        }
    }

    async fn refresh_snapshot(&self) {
        let refreshed = match self.monitor.get_mentions_resume().await {
            Ok(resume) => self.store.save_resume_snapshot(&resume).map(|_| resume),
            Err(e) => Err(e),
        };

        match refreshed {
            Ok(resume) => info!(
                "Snapshot refreshed: {} detections, {} top artists",
                resume.latest_detections.len(),
                resume.top_artists.len()
            ),
            Err(e) => error!("Failed to refresh detections: {}", e),
        }
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn parse_kind(kind: Option<&str>) -> Result<Option<DetectionKind>> {
    match kind {
        None => Ok(None),
        Some(k) if k.eq_ignore_ascii_case("todos") => Ok(None),
        Some(k) => DetectionKind::from_str(k).map(Some).map_err(ScopeError::Parse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::Args;
    use crate::domain::{EventRecord, InMemoryCatalog, TopArtist};
    use crate::infrastructure::FileSystemStore;
    use clap::Parser;
    use tempfile::TempDir;

    fn service(dir: &TempDir, argv: &[&str]) -> ReportService {
        let config_file = dir.path().join("eventscope.json").display().to_string();
        let mut full = vec!["eventscope", "--config-file", config_file.as_str()];
        full.extend_from_slice(argv);
        // Nothing listens here, so every API call fails fast.
        full.extend_from_slice(&["--api-base-url", "http://127.0.0.1:9/api/"]);

        let config = Config::from_args(Args::try_parse_from(full).unwrap()).unwrap();
        let store = Arc::new(FileSystemStore::new(
            dir.path().join("data"),
            dir.path().join("events.json"),
        ));
        let catalog = Arc::new(InMemoryCatalog::new(vec![
            EventRecord::new(
                "pesopluma-gdl-2025-11-22",
                "2025-11-22",
                "Regional",
                "Guadalajara",
                "Estadio Akron",
            )
            .with_capacity(48_071)
            .with_reach("2.1M"),
            EventRecord::new("dualipa-cdmx-2025-11-15", "2025-11-15", "Anglo", "CDMX", "Foro Sol")
                .with_capacity(65_000),
        ]));
        let monitor =
            MonitorClient::new(config.http_client.clone(), &config.settings.api_base_url).unwrap();

        ReportService::new(config, store, catalog, monitor)
    }

    #[tokio::test]
    async fn score_date_report() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, &["score-date", "2025-11-18"]);
        let command = service.config.args.command.clone();

        let (kind, payload) = service.build_report(&command).await.unwrap();
        assert_eq!(kind, "score_date");
        assert_eq!(payload["date"], "2025-11-18");
        assert!(payload["score"].as_u64().unwrap() <= 100);
    }

    #[tokio::test]
    async fn unknown_buzz_event_is_an_error() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, &["buzz", "--event-id", "nope"]);
        let command = service.config.args.command.clone();
        assert!(matches!(
            service.build_report(&command).await,
            Err(ScopeError::Other(_))
        ));
    }

    #[tokio::test]
    async fn buzz_uses_configured_reference_date() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, &["buzz", "--event-id", "pesopluma-gdl-2025-11-22"]);
        let command = service.config.args.command.clone();

        let (_, payload) = service.build_report(&command).await.unwrap();
        assert_eq!(payload["series"]["buzz_score"], 30);
        assert_eq!(payload["series"]["weekly_mentions"][0], 2084);
    }

    #[tokio::test]
    async fn buzz_trend_window_and_comparison() {
        let dir = TempDir::new().unwrap();
        let argv = [
            "buzz",
            "--event-id",
            "pesopluma-gdl-2025-11-22",
            "--compare",
            "dualipa-cdmx-2025-11-15",
            "--weeks",
            "4",
        ];
        let compared = service(&dir, &argv);
        let command = compared.config.args.command.clone();

        let (_, payload) = compared.build_report(&command).await.unwrap();
        let trend = payload["trend"].as_array().unwrap();
        assert_eq!(trend.len(), 4);
        assert_eq!(trend[0]["week"], "W-4");
        assert_eq!(trend[0]["shares"].as_array().unwrap().len(), 2);
        assert_eq!(trend[0]["shares"][0]["pct"], 95);
        assert_eq!(payload["influencers"][0]["handle"], "@músicanews32");

        let odd = service(
            &dir,
            &["buzz", "--event-id", "pesopluma-gdl-2025-11-22", "--weeks", "6"],
        );
        let command = odd.config.args.command.clone();
        assert!(matches!(
            odd.build_report(&command).await,
            Err(ScopeError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn opportunities_use_today_override() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, &["--today", "2025-11-01", "opportunities", "--top", "3"]);
        let command = service.config.args.command.clone();

        let (_, payload) = service.build_report(&command).await.unwrap();
        assert_eq!(payload["from"], "2025-11-01");
        assert_eq!(payload["dates"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn mentions_fall_back_to_snapshot() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, &["artists", "--sort-by", "spots"]);
        let command = service.config.args.command.clone();

        assert!(service.build_report(&command).await.is_err());

        service
            .store
            .save_resume_snapshot(&MentionsResume {
                top_artists: vec![TopArtist {
                    name: "Peso Pluma".into(),
                    count: 3,
                }],
                ..Default::default()
            })
            .unwrap();

        let (kind, payload) = service.build_report(&command).await.unwrap();
        assert_eq!(kind, "artists");
        assert!(payload.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_saves_report_when_requested() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, &["--save", "calendar", "2025", "11"]);
        service.run().await.unwrap();

        let reports: Vec<_> = std::fs::read_dir(dir.path().join("data/reports"))
            .unwrap()
            .collect();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn kind_filter_parsing() {
        assert_eq!(parse_kind(None).unwrap(), None);
        assert_eq!(parse_kind(Some("todos")).unwrap(), None);
        assert_eq!(parse_kind(Some("spot")).unwrap(), Some(DetectionKind::Spot));
        assert!(parse_kind(Some("radio")).is_err());
    }
}
