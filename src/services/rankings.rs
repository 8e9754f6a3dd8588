use crate::domain::{Detection, DetectionKind, EventRanking, MentionsResume};
use chrono::NaiveDateTime;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::str::FromStr;

const TOP_COUNT_MENTION_SHARE: f64 = 0.7;
const TOP_COUNT_SPOT_SHARE: f64 = 0.3;

/// Values the dashboard uses for "no filter".
pub fn is_wildcard(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "" | "todos" | "todas" | "all")
}

fn matches_filter(filter: Option<&str>, value: &str) -> bool {
    filter.map_or(true, |f| is_wildcard(f) || f == value)
}

/// Days for a range label such as "Últimos 30 días" or "3 meses". 0 means no limit.
pub fn days_from_range(label: &str) -> u32 {
    let text = label.to_lowercase();
    if text.is_empty() || text == "todos" {
        return 0;
    }
    [("7", 7), ("14", 14), ("30", 30), ("60", 60), ("90", 90), ("3 meses", 90)]
        .into_iter()
        .find(|(needle, _)| text.contains(needle))
        .map_or(0, |(_, days)| days)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ArtistSort {
    Date,
    Spots,
    Mentions,
    #[default]
    Total,
    Confidence,
}

impl FromStr for ArtistSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" => Ok(ArtistSort::Date),
            "spots" => Ok(ArtistSort::Spots),
            "mentions" => Ok(ArtistSort::Mentions),
            "total" => Ok(ArtistSort::Total),
            "confidence" => Ok(ArtistSort::Confidence),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RankingTab {
    Spots,
    Mentions,
    #[default]
    All,
}

impl FromStr for RankingTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spots" => Ok(RankingTab::Spots),
            "mentions" | "menciones" => Ok(RankingTab::Mentions),
            "all" | "todos" => Ok(RankingTab::All),
            other => Err(format!("unknown ranking tab '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DetectionFilter<'a> {
    pub city: Option<&'a str>,
    pub kind: Option<DetectionKind>,
    pub station: Option<&'a str>,
}

impl DetectionFilter<'_> {
    fn accepts_city_and_kind(&self, city: &str, kind: DetectionKind) -> bool {
        matches_filter(self.city, city) && self.kind.map_or(true, |k| k == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistActivity {
    pub artist: String,
    pub detection_id: i64,
    pub station: String,
    pub station_id: i64,
    pub city: String,
    pub venue: String,
    pub kind: DetectionKind,
    pub confidence: f64,
    pub context: String,
    pub audio_url: String,
    pub count: u64,
    pub spots: u64,
    pub mentions: u64,
    pub total: u64,
    pub last_detection: String,
    #[serde(skip)]
    last_seen: Option<NaiveDateTime>,
}

impl ArtistActivity {
    fn from_detection(det: &Detection) -> Self {
        Self {
            artist: det.artist.clone(),
            detection_id: det.detection_id,
            station: det.station.clone(),
            station_id: det.station_id,
            city: det.city.clone(),
            venue: det.venue.clone(),
            kind: det.kind,
            confidence: det.confidence,
            context: det.context.clone(),
            audio_url: det.audio_url.clone(),
            count: 0,
            spots: 0,
            mentions: 0,
            total: 0,
            last_detection: det.timestamp.clone(),
            last_seen: det.detected_at(),
        }
    }

    fn record(&mut self, det: &Detection) {
        self.count += 1;
        // anything that is not a spot is read as a mention
        if det.kind == DetectionKind::Spot {
            self.spots += 1;
        } else {
            self.mentions += 1;
        }
        self.total = self.spots + self.mentions;

        let seen = det.detected_at();
        if seen.is_some() && seen > self.last_seen {
            self.last_seen = seen;
            self.last_detection = det.timestamp.clone();
            self.station = det.station.clone();
            self.venue = det.venue.clone();
            self.city = det.city.clone();
            self.kind = det.kind;
            self.confidence = det.confidence;
            self.context = det.context.clone();
            self.audio_url = det.audio_url.clone();
        }
    }

    /// The resume's top count replaces `count`; a split is only derived when
    /// nothing was tallied from detections.
    fn apply_top_count(&mut self, count: u64) {
        self.count = count;
        if self.total == 0 {
            self.mentions = (count as f64 * TOP_COUNT_MENTION_SHARE).floor() as u64;
            self.spots = (count as f64 * TOP_COUNT_SPOT_SHARE).floor() as u64;
            self.total = count;
        }
    }
}

/// Detections grouped per artist (case-insensitive), in first-seen order.
pub fn group_by_artist(resume: &MentionsResume) -> Vec<ArtistActivity> {
    let mut index: FxHashMap<String, usize> =
        FxHashMap::with_capacity_and_hasher(resume.latest_detections.len(), Default::default());
    let mut artists: Vec<ArtistActivity> = Vec::new();

    for det in &resume.latest_detections {
        let key = det.artist.to_lowercase();
        let slot = *index.entry(key).or_insert_with(|| {
            artists.push(ArtistActivity::from_detection(det));
            artists.len() - 1
        });
        artists[slot].record(det);
    }

    for top in &resume.top_artists {
        if let Some(&slot) = index.get(&top.name.to_lowercase()) {
            artists[slot].apply_top_count(top.count);
        }
    }

    artists
}

pub fn artist_ranking(
    resume: &MentionsResume,
    filter: &DetectionFilter<'_>,
    sort: ArtistSort,
) -> Vec<ArtistActivity> {
    let mut artists: Vec<ArtistActivity> = group_by_artist(resume)
        .into_iter()
        .filter(|a| filter.accepts_city_and_kind(&a.city, a.kind))
        .filter(|a| matches_filter(filter.station, &a.station))
        .collect();

    match sort {
        ArtistSort::Date => artists.sort_by(|a, b| b.last_seen.cmp(&a.last_seen)),
        ArtistSort::Spots => artists.sort_by(|a, b| b.spots.cmp(&a.spots)),
        ArtistSort::Mentions => artists.sort_by(|a, b| b.mentions.cmp(&a.mentions)),
        ArtistSort::Total => artists.sort_by(|a, b| b.total.cmp(&a.total)),
        ArtistSort::Confidence => artists.sort_by(|a, b| b.confidence.total_cmp(&a.confidence)),
    }
    artists
}

pub fn event_ranking(mut events: Vec<EventRanking>, tab: RankingTab) -> Vec<EventRanking> {
    match tab {
        RankingTab::Spots => {
            events.retain(|e| e.spots > 0);
            events.sort_by(|a, b| b.spots.cmp(&a.spots));
        }
        RankingTab::Mentions => {
            events.retain(|e| e.mentions > 0);
            events.sort_by(|a, b| b.mentions.cmp(&a.mentions));
        }
        RankingTab::All => events.sort_by(|a, b| b.total.cmp(&a.total)),
    }
    events
}

pub fn latest_mentions<'a>(
    resume: &'a MentionsResume,
    filter: &DetectionFilter<'_>,
) -> Vec<&'a Detection> {
    resume
        .latest_detections
        .iter()
        .filter(|d| filter.accepts_city_and_kind(&d.city, d.kind))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArtistMentionStats {
    pub artist: String,
    pub total: usize,
    pub spots: usize,
    pub mentions: usize,
    pub cities: Vec<String>,
    pub stations: Vec<String>,
    pub venues: Vec<String>,
    pub first_detection: Option<NaiveDateTime>,
    pub last_detection: Option<NaiveDateTime>,
}

/// Everything known about one artist in the latest detections.
pub fn artist_mention_stats(resume: &MentionsResume, artist: &str) -> ArtistMentionStats {
    let wanted = artist.to_lowercase();
    let detections: Vec<&Detection> = resume
        .latest_detections
        .iter()
        .filter(|d| d.artist.to_lowercase() == wanted)
        .collect();

    let timestamps: Vec<NaiveDateTime> =
        detections.iter().filter_map(|d| d.detected_at()).collect();

    ArtistMentionStats {
        artist: detections
            .first()
            .map_or_else(|| artist.to_string(), |d| d.artist.clone()),
        total: detections.len(),
        spots: detections.iter().filter(|d| d.kind == DetectionKind::Spot).count(),
        mentions: detections
            .iter()
            .filter(|d| d.kind == DetectionKind::Mention)
            .count(),
        cities: distinct(detections.iter().map(|d| d.city.as_str())),
        stations: distinct(detections.iter().map(|d| d.station.as_str())),
        venues: distinct(detections.iter().map(|d| d.venue.as_str())),
        first_detection: timestamps.iter().min().copied(),
        last_detection: timestamps.iter().max().copied(),
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    values
        .filter(|v| !v.trim().is_empty())
        .filter(|v| seen.insert(*v))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TopArtist;

    fn det(
        id: i64,
        artist: &str,
        kind: DetectionKind,
        city: &str,
        station: &str,
        hora: &str,
    ) -> Detection {
        Detection {
            detection_id: id,
            artist: artist.to_string(),
            kind,
            city: city.to_string(),
            station: station.to_string(),
            timestamp: hora.to_string(),
            venue: format!("Venue {city}"),
            confidence: id as f64 / 10.0,
            ..Default::default()
        }
    }

    fn resume() -> MentionsResume {
        MentionsResume {
            total_stations: 3,
            total_detections: 6,
            latest_detections: vec![
                det(1, "Peso Pluma", DetectionKind::Spot, "CDMX", "La Z", "2025-10-08T10:00:00"),
                det(
                    2,
                    "peso pluma",
                    DetectionKind::Mention,
                    "Guadalajara",
                    "Ke Buena",
                    "2025-10-08T12:00:00",
                ),
                det(3, "PESO PLUMA", DetectionKind::Spot, "CDMX", "La Z", "2025-10-07T09:00:00"),
                det(4, "Dua Lipa", DetectionKind::Mention, "CDMX", "Los 40", "2025-10-08T08:00:00"),
                det(5, "Feid", DetectionKind::Unknown, "Monterrey", "Exa", "2025-10-06T08:00:00"),
            ],
            top_artists: vec![
                TopArtist { name: "PESO PLUMA".into(), count: 311 },
                TopArtist { name: "Feid".into(), count: 10 },
                TopArtist { name: "Karol G".into(), count: 99 },
            ],
        }
    }

    #[test]
    fn groups_case_insensitively_and_tracks_latest() {
        let artists = group_by_artist(&resume());
        assert_eq!(artists.len(), 3);

        let peso = &artists[0];
        assert_eq!(peso.artist, "Peso Pluma");
        assert_eq!((peso.spots, peso.mentions, peso.total), (2, 1, 3));
        assert_eq!(peso.count, 311);
        assert_eq!(peso.city, "Guadalajara");
        assert_eq!(peso.station, "Ke Buena");
        assert_eq!(peso.kind, DetectionKind::Mention);
        assert_eq!(peso.last_detection, "2025-10-08T12:00:00");
    }

    #[test]
    fn untyped_detections_count_as_mentions() {
        let artists = group_by_artist(&resume());
        let feid = artists.iter().find(|a| a.artist == "Feid").unwrap();
        assert_eq!((feid.spots, feid.mentions, feid.total), (0, 1, 1));
        assert_eq!(feid.count, 10);
    }

    #[test]
    fn top_count_split_only_without_tallies() {
        let mut artist = ArtistActivity::from_detection(&det(
            9,
            "Karol G",
            DetectionKind::Unknown,
            "CDMX",
            "Los 40",
            "2025-10-08T08:00:00",
        ));
        artist.apply_top_count(99);
        assert_eq!((artist.spots, artist.mentions, artist.total), (29, 69, 99));
        assert_eq!(artist.count, 99);

        artist.record(&det(10, "Karol G", DetectionKind::Spot, "CDMX", "Los 40", ""));
        artist.apply_top_count(5);
        assert_eq!((artist.spots, artist.mentions, artist.total), (30, 69, 99));
        assert_eq!(artist.count, 5);
    }

    #[test]
    fn ranking_filters_and_sorts() {
        let r = resume();
        let by_total = artist_ranking(&r, &DetectionFilter::default(), ArtistSort::Total);
        let names: Vec<&str> = by_total.iter().map(|a| a.artist.as_str()).collect();
        assert_eq!(names, vec!["Peso Pluma", "Dua Lipa", "Feid"]);

        let cdmx = DetectionFilter {
            city: Some("CDMX"),
            ..Default::default()
        };
        let ranked = artist_ranking(&r, &cdmx, ArtistSort::Date);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].artist, "Dua Lipa");

        let wildcard = DetectionFilter {
            city: Some("Todas"),
            station: Some("Todos"),
            kind: None,
        };
        assert_eq!(artist_ranking(&r, &wildcard, ArtistSort::Spots).len(), 3);

        let by_date = artist_ranking(&r, &DetectionFilter::default(), ArtistSort::Date);
        assert_eq!(by_date[0].artist, "Peso Pluma");
        assert_eq!(by_date[2].artist, "Feid");
    }

    #[test]
    fn event_ranking_tabs() {
        let row = |id: i64, spots: u64, mentions: u64| EventRanking {
            event_group_id: id,
            spots,
            mentions,
            total: spots + mentions,
            ..Default::default()
        };
        let rows = vec![row(1, 0, 5), row(2, 3, 1), row(3, 9, 0)];

        let ids = |v: Vec<EventRanking>| v.iter().map(|e| e.event_group_id).collect::<Vec<_>>();
        assert_eq!(ids(event_ranking(rows.clone(), RankingTab::Spots)), vec![3, 2]);
        assert_eq!(ids(event_ranking(rows.clone(), RankingTab::Mentions)), vec![1, 2]);
        assert_eq!(ids(event_ranking(rows, RankingTab::All)), vec![3, 1, 2]);
    }

    #[test]
    fn latest_mentions_by_city_and_kind() {
        let r = resume();
        let filter = DetectionFilter {
            city: Some("CDMX"),
            kind: Some(DetectionKind::Spot),
            station: None,
        };
        let ids: Vec<i64> = latest_mentions(&r, &filter).iter().map(|d| d.detection_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(latest_mentions(&r, &DetectionFilter::default()).len(), 5);
    }

    #[test]
    fn artist_stats() {
        let mut r = resume();
        r.latest_detections[2].venue = "  ".into();
        let stats = artist_mention_stats(&r, "peso PLUMA");
        assert_eq!(stats.artist, "Peso Pluma");
        assert_eq!((stats.total, stats.spots, stats.mentions), (3, 2, 1));
        assert_eq!(stats.cities, vec!["CDMX", "Guadalajara"]);
        assert_eq!(stats.stations, vec!["La Z", "Ke Buena"]);
        assert_eq!(stats.venues, vec!["Venue CDMX", "Venue Guadalajara"]);
        assert_eq!(stats.first_detection.unwrap().to_string(), "2025-10-07 09:00:00");
        assert_eq!(stats.last_detection.unwrap().to_string(), "2025-10-08 12:00:00");

        let none = artist_mention_stats(&r, "Bad Bunny");
        assert_eq!(none.total, 0);
        assert!(none.first_detection.is_none());
    }

    #[test]
    fn range_labels() {
        assert_eq!(days_from_range("todos"), 0);
        assert_eq!(days_from_range("Últimos 7 días"), 7);
        assert_eq!(days_from_range("30"), 30);
        assert_eq!(days_from_range("3 meses"), 90);
        assert_eq!(days_from_range("semana"), 0);
    }
}
