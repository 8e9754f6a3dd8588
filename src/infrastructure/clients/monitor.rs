use crate::domain::{EventRanking, MentionsResume};
use crate::error::{Result, ScopeError};
use crate::services::rankings::{days_from_range, is_wildcard};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

pub const DEFAULT_API_BASE_URL: &str = "https://backevent.monitorlatino.com/api/";

const RESUME_ENDPOINT: &str = "dashboard/resumen";
const EVENT_RANKING_ENDPOINT: &str = "dashboard/ranking-eventos";

/// Filters accepted by `dashboard/ranking-eventos`.
#[derive(Debug, Clone, Default)]
pub struct RankingQuery {
    pub country: Option<String>,
    pub city: Option<String>,
    pub venue: Option<String>,
    pub range: Option<String>,
}

impl RankingQuery {
    /// Query pairs, leaving out wildcard values and unbounded ranges.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        for (key, value) in [
            ("pais", &self.country),
            ("ciudad", &self.city),
            ("venue", &self.venue),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !is_wildcard(v)) {
                params.push((key, value.to_string()));
            }
        }

        let days = self.range.as_deref().map_or(0, days_from_range);
        if days > 0 {
            params.push(("dias", days.to_string()));
        }
        params
    }
}

pub struct MonitorClient {
    client: Client,
    base_url: Url,
}

impl MonitorClient {
    pub fn new(client: Client, base_url: &str) -> Result<Self> {
        // Url::join drops the last path segment unless it ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ScopeError::Parse(format!("invalid API base URL '{base_url}': {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint)
            .map_err(|e| ScopeError::Parse(format!("invalid endpoint '{endpoint}': {e}")))
    }

    pub async fn get_mentions_resume(&self) -> Result<MentionsResume> {
        let resume: MentionsResume = self.get_json(RESUME_ENDPOINT, &[]).await?;
        info!(
            "Fetched resume: {} detections from {} stations",
            resume.total_detections, resume.total_stations
        );
        Ok(resume)
    }

    pub async fn get_event_ranking(&self, query: &RankingQuery) -> Result<Vec<EventRanking>> {
        let events: Vec<EventRanking> = self
            .get_json(EVENT_RANKING_ENDPOINT, &query.params())
            .await?;
        info!("Fetched {} ranked events", events.len());
        Ok(events)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<T> {
        let url = self.endpoint_url(endpoint)?;
        debug!("GET {} {:?}", url, params);

        let response = self.client.get(url).query(params).send().await?;

        if !response.status().is_success() {
            error!("Monitor API error: Status {} on {}", response.status(), endpoint);
            return Err(ScopeError::Api {
                status: response.status().as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}
