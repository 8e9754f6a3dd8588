//! Synthetic digital buzz for catalog events.
//!
//! Everything here is derived from a seeded generator, so the same event and
//! reference date always produce the same series. Outputs are published to the
//! dashboard and compared across releases; the constants below are frozen.

use super::random::{seed_from_id, SeededRandom};
use crate::domain::{parse_reach_millions, EventCatalog, EventRecord};
use crate::error::{Result, ScopeError};
use crate::utils::{days_between, round_half_up};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

pub const WEEKS: usize = 12;
/// Reference date the published series were generated against.
pub const DEFAULT_REFERENCE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 10, 9) {
    Some(date) => date,
    None => panic!("invalid reference date"),
};
const MIN_WEEKLY_MENTIONS: f64 = 50.0;
const MAX_VOLUME: f64 = 10_000.0;

const SENTIMENT_SEED_OFFSET: u64 = 1000;
const INFLUENCER_SEED_OFFSET: u64 = 2000;
const ANNOTATION_SEED_OFFSET: u64 = 3000;

pub const DEFAULT_INFLUENCERS: usize = 5;
const SUGGESTED_INFLUENCERS: usize = 3;
const AVATAR_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg";
pub const TREND_WINDOWS: [usize; 3] = [4, 8, 12];

static TOUR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"- (.+?)(?:\s+Tour)?$").expect("tour pattern is valid"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuzzSeries {
    pub event_id: String,
    pub weekly_mentions: [u32; WEEKS],
    pub buzz_score: u8,
    pub growth_pct: i32,
    pub sentiment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComplianceStatus {
    #[serde(rename = "OK")]
    Ok,
    Medio,
    Bajo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadioCompliance {
    pub event_id: String,
    pub spots: u64,
    pub mentions: u64,
    pub total: u64,
    pub expected: i64,
    /// Delivered over expected, in percent.
    pub compliance_pct: i64,
    pub status: ComplianceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hashtags {
    pub primary: String,
    pub secondary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendAnnotation {
    pub week: u8,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformSplit {
    #[serde(rename = "X")]
    pub x: i64,
    #[serde(rename = "IG")]
    pub instagram: i64,
    #[serde(rename = "TikTok")]
    pub tiktok: i64,
    #[serde(rename = "YT")]
    pub youtube: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SocialPlatform {
    X,
    Instagram,
    TikTok,
    YouTube,
}

impl SocialPlatform {
    const ALL: [SocialPlatform; 4] = [
        SocialPlatform::X,
        SocialPlatform::Instagram,
        SocialPlatform::TikTok,
        SocialPlatform::YouTube,
    ];

    fn host(self) -> &'static str {
        match self {
            SocialPlatform::X => "x",
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::TikTok => "tiktok",
            SocialPlatform::YouTube => "youtube",
        }
    }
}

/// Kind of account posting about an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Voice {
    News,
    Fan,
    Local,
}

impl Voice {
    fn tag(self) -> &'static str {
        match self {
            Voice::News => "news",
            Voice::Fan => "fan",
            Voice::Local => "local",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Voice::News => "News",
            Voice::Fan | Voice::Local => "Fan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Influencer {
    pub name: String,
    pub handle: String,
    pub platform: SocialPlatform,
    pub avatar: String,
    pub mentions: i64,
    pub engagement: i64,
    pub sentiment: f64,
    pub post_url: String,
    pub post_preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendShare {
    pub event_id: String,
    /// Week volume over the event's peak week, in percent.
    pub pct: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub week: String,
    pub shares: Vec<TrendShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuzzProfile {
    pub event: EventRecord,
    pub series: BuzzSeries,
    pub hashtags: Hashtags,
    pub compliance: RadioCompliance,
    pub annotations: Vec<TrendAnnotation>,
    pub platforms: PlatformSplit,
    pub influencers: Vec<Influencer>,
    pub suggested_influencers: Vec<Influencer>,
    pub trend: Vec<TrendPoint>,
}

pub struct BuzzModel {
    catalog: Arc<dyn EventCatalog>,
    as_of: NaiveDate,
}

impl BuzzModel {
    pub fn new(catalog: Arc<dyn EventCatalog>, as_of: NaiveDate) -> Self {
        Self { catalog, as_of }
    }

    /// Full buzz profile of one event, with its trend compared against
    /// `compare` over the last `weeks` weeks.
    pub fn profile(&self, event_id: &str, compare: &[String], weeks: usize) -> Result<BuzzProfile> {
        let event = self.find(event_id)?;
        for other in compare {
            self.find(other)?;
        }

        let seed = seed_from_id(&event.id);
        let series = compute_buzz(event, seed, self.as_of)?;
        let recent_total: u32 = series.weekly_mentions[WEEKS - 4..].iter().sum();

        // selection keeps catalog order, not argument order
        let compared = self
            .catalog
            .events()
            .iter()
            .filter(|e| e.id == event.id || compare.contains(&e.id))
            .map(|e| buzz_for(e, self.as_of))
            .collect::<Result<Vec<_>>>()?;

        Ok(BuzzProfile {
            event: event.clone(),
            hashtags: hashtags(event),
            compliance: radio_compliance(event),
            annotations: trend_annotations(event),
            platforms: split_by_platform(u64::from(recent_total), seed),
            influencers: influencers(event, DEFAULT_INFLUENCERS),
            suggested_influencers: suggested_influencers(self.catalog.as_ref(), event),
            trend: trend_comparison(&compared, weeks)?,
            series,
        })
    }

    fn find(&self, event_id: &str) -> Result<&EventRecord> {
        self.catalog
            .find(event_id)
            .ok_or_else(|| ScopeError::Other(format!("Unknown event '{event_id}'")))
    }

    /// Every event with a parseable date, highest buzz first.
    pub fn ranking(&self) -> Vec<BuzzSeries> {
        let mut ranking: Vec<BuzzSeries> = self
            .catalog
            .events()
            .iter()
            .filter_map(|event| match buzz_for(event, self.as_of) {
                Ok(series) => Some(series),
                Err(e) => {
                    warn!("Skipping buzz for {}: {}", event.id, e);
                    None
                }
            })
            .collect();

        ranking.sort_by(|a, b| b.buzz_score.cmp(&a.buzz_score));
        ranking
    }
}

/// Buzz of an event seeded from its identifier.
pub fn buzz_for(event: &EventRecord, as_of: NaiveDate) -> Result<BuzzSeries> {
    compute_buzz(event, seed_from_id(&event.id), as_of)
}

pub fn compute_buzz(event: &EventRecord, seed: u64, as_of: NaiveDate) -> Result<BuzzSeries> {
    let weekly_mentions = weekly_mentions(event, seed, as_of)?;
    let sentiment = sentiment(&event.genre, seed);

    let series = BuzzSeries {
        event_id: event.id.clone(),
        buzz_score: buzz_score(&weekly_mentions, sentiment),
        growth_pct: growth_pct(&weekly_mentions),
        weekly_mentions,
        sentiment,
    };

    debug!(
        "Buzz for {}: score {} growth {}%",
        event.id, series.buzz_score, series.growth_pct
    );

    Ok(series)
}

fn reach_millions(event: &EventRecord) -> f64 {
    parse_reach_millions(event.reach_or_zero()).unwrap_or_else(|| {
        warn!("Unreadable reach '{}' for {}, using 0", event.reach_or_zero(), event.id);
        0.0
    })
}

/// Twelve weeks of mentions, indexed `k = 0..12` with `weeks_until - k` weeks
/// between the reference date and the event.
pub fn weekly_mentions(event: &EventRecord, seed: u64, as_of: NaiveDate) -> Result<[u32; WEEKS]> {
    let event_date = event.date().ok_or_else(|| {
        ScopeError::Parse(format!("event {} has invalid date '{}'", event.id, event.raw_date()))
    })?;

    let mut random = SeededRandom::new(seed);
    let base = 600.0 + event.capacity_or_zero() as f64 / 80.0 + reach_millions(event) * 1200.0;
    let weeks_until = days_between(as_of, event_date).div_euclid(7);

    let mut mentions = [0u32; WEEKS];
    for (k, slot) in mentions.iter_mut().enumerate() {
        let week_from_event = weeks_until - k as i64;

        let factor = match week_from_event {
            w if w > 0 => random.range(0.3, 0.6),
            0 => 1.0,
            w => 1.0 / (1.0 + ((w.abs() as f64) - 6.0).exp()),
        };

        let week = round_half_up(base * factor * random.range(0.85, 1.15));
        *slot = week.max(MIN_WEEKLY_MENTIONS) as u32;
    }

    Ok(mentions)
}

pub fn sentiment(genre: &str, seed: u64) -> f64 {
    let mut random = SeededRandom::with_offset(seed, SENTIMENT_SEED_OFFSET);
    let (low, high) = match genre {
        "Pop/Urbano" | "Urbano" | "Pop" => (0.66, 0.78),
        "Regional" => (0.62, 0.74),
        _ => (0.68, 0.80),
    };
    random.range(low, high)
}

fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

fn relative_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous
    } else {
        0.0
    }
}

/// 50% volume of the last four weeks, 30% growth of the last two weeks over
/// weeks 6-7, 20% sentiment.
pub fn buzz_score(mentions: &[u32; WEEKS], sentiment: f64) -> u8 {
    let volume = (mean(&mentions[8..12]) / MAX_VOLUME).min(1.0);
    let growth = relative_change(mean(&mentions[10..12]), mean(&mentions[6..8])).clamp(0.0, 1.0);

    let score = round_half_up((volume * 0.5 + growth * 0.3 + sentiment * 0.2) * 100.0);
    score.clamp(0.0, 100.0) as u8
}

/// Last two weeks over the two before, signed percent.
pub fn growth_pct(mentions: &[u32; WEEKS]) -> i32 {
    let change = relative_change(mean(&mentions[10..12]), mean(&mentions[8..10]));
    round_half_up(change * 100.0) as i32
}

pub fn radio_compliance(event: &EventRecord) -> RadioCompliance {
    let expected = event.capacity_or_zero() as f64 / 1000.0 + reach_millions(event) * 50.0;
    let total = event.radio_total();
    let ratio = if expected > 0.0 {
        total as f64 / expected
    } else {
        0.0
    };

    let status = if ratio >= 1.0 {
        ComplianceStatus::Ok
    } else if ratio >= 0.7 {
        ComplianceStatus::Medio
    } else {
        ComplianceStatus::Bajo
    };

    RadioCompliance {
        event_id: event.id.clone(),
        spots: event.radio_spots,
        mentions: event.radio_mentions,
        total,
        expected: round_half_up(expected) as i64,
        compliance_pct: round_half_up(ratio * 100.0) as i64,
        status,
    }
}

fn artist_name(event: &EventRecord) -> &str {
    event.artist.as_deref().unwrap_or(event.display_name())
}

pub fn hashtags(event: &EventRecord) -> Hashtags {
    let artist = artist_name(event);
    let artist_slug = WHITESPACE.replace_all(artist, "");
    let city_slug = WHITESPACE.replace_all(&event.city, "");

    let secondary = event
        .name
        .as_deref()
        .and_then(|name| TOUR_PATTERN.captures(name))
        .and_then(|captures| captures.get(1))
        .map(|tour| {
            let tour = WHITESPACE.replace_all(tour.as_str(), "");
            format!("#{}Tour", tour.strip_suffix("Tour").unwrap_or(&*tour))
        })
        .unwrap_or_else(|| format!("#{artist_slug}Tour"));

    Hashtags {
        primary: format!("#{artist_slug}{city_slug}"),
        secondary,
    }
}

const ANNOTATION_POOL: [(u8, &str); 7] = [
    (8, "Anuncio 2ª fecha"),
    (8, "Pre-venta inicia"),
    (9, "Sold out zona VIP"),
    (10, "Video viral TikTok"),
    (10, "Sold out zona A"),
    (11, "Último día preventa"),
    (11, "Trending topic"),
];

/// Two or three milestone labels, at most one per week, ordered by week.
pub fn trend_annotations(event: &EventRecord) -> Vec<TrendAnnotation> {
    let mut random = SeededRandom::with_offset(seed_from_id(&event.id), ANNOTATION_SEED_OFFSET);
    let mut pool: Vec<(u8, &'static str)> = ANNOTATION_POOL.to_vec();

    let count = random.range(2.0, 4.0).floor() as usize;
    let mut annotations: Vec<TrendAnnotation> = Vec::with_capacity(count);

    while annotations.len() < count && !pool.is_empty() {
        let (week, label) = pool.remove(random.index(pool.len()));
        if !annotations.iter().any(|a| a.week == week) {
            annotations.push(TrendAnnotation { week, label });
        }
    }

    annotations.sort_by_key(|a| a.week);
    annotations
}

pub fn split_by_platform(total: u64, seed: u64) -> PlatformSplit {
    let mut random = SeededRandom::new(seed);
    let x = random.range(0.22, 0.28);
    let instagram = random.range(0.27, 0.33);
    let tiktok = random.range(0.27, 0.33);
    let youtube = 1.0 - x - instagram - tiktok;

    let share = |pct: f64| round_half_up(total as f64 * pct) as i64;

    PlatformSplit {
        x: share(x),
        instagram: share(instagram),
        tiktok: share(tiktok),
        youtube: share(youtube),
    }
}

/// Simulated accounts posting about an event, highest engagement first.
pub fn influencers(event: &EventRecord, count: usize) -> Vec<Influencer> {
    let seed = seed_from_id(&event.id);
    let mut random = SeededRandom::with_offset(seed, INFLUENCER_SEED_OFFSET);
    let event_sentiment = sentiment(&event.genre, seed);
    let artist = artist_name(event);

    let voices = [
        ("Música", Voice::News),
        ("Conciertos", Voice::Fan),
        (event.city.as_str(), Voice::Local),
        (artist, Voice::Fan),
        ("Live", Voice::News),
    ];

    let mut influencers: Vec<Influencer> = (0..count)
        .map(|i| {
            let (prefix, voice) = voices[i % voices.len()];
            let platform = SocialPlatform::ALL[random.index(SocialPlatform::ALL.len())];
            let mentions = round_half_up(random.range(50.0, 300.0));
            let engagement_rate = random.range(15.0, 45.0);
            let handle_number = round_half_up(random.range(1.0, 99.0)) as i64;
            let sentiment = random.range(event_sentiment - 0.05, event_sentiment + 0.05);
            let post_preview = post_preview(event, artist, voice, &mut random);

            Influencer {
                name: format!("{prefix} {}", voice.title()),
                handle: format!("@{}{}{handle_number}", prefix.to_lowercase(), voice.tag()),
                platform,
                avatar: format!("{AVATAR_URL}?seed={}-{i}", event.id),
                mentions: mentions as i64,
                engagement: round_half_up(mentions * engagement_rate) as i64,
                sentiment,
                post_url: format!(
                    "https://{}.com/post/simulated-{}-{i}",
                    platform.host(),
                    event.id
                ),
                post_preview,
            }
        })
        .collect();

    influencers.sort_by(|a, b| b.engagement.cmp(&a.engagement));
    influencers
}

fn post_preview(
    event: &EventRecord,
    artist: &str,
    voice: Voice,
    random: &mut SeededRandom,
) -> String {
    let (city, venue) = (&event.city, &event.venue);
    let options = match voice {
        Voice::News => [
            format!("🚨 CONFIRMADO: {artist} en {city}"),
            format!("📢 Anuncian fecha de {artist} en {venue}"),
            format!("🎤 {artist} llega a {city} - Detalles aquí"),
        ],
        Voice::Fan => [
            format!("¡NO PUEDO ESPERAR! 😭 {artist} en {city}"),
            format!("Ya tengo mis boletos para {artist} 🎉"),
            format!("Quién va al concierto de {artist}? 🙋‍♀️"),
        ],
        Voice::Local => [
            format!("{city} se prepara para recibir a {artist} 🔥"),
            format!("Gran expectativa en {city} por {artist}"),
            format!("{venue} lista para el show de {artist}"),
        ],
    };
    let pick = random.index(options.len());
    options.into_iter().nth(pick).unwrap_or_default()
}

/// Top accounts from other events of the same genre.
pub fn suggested_influencers(catalog: &dyn EventCatalog, event: &EventRecord) -> Vec<Influencer> {
    let mut suggested: Vec<Influencer> = catalog
        .events()
        .iter()
        .filter(|other| other.genre == event.genre && other.id != event.id)
        .flat_map(|other| influencers(other, DEFAULT_INFLUENCERS))
        .collect();

    suggested.sort_by(|a, b| b.engagement.cmp(&a.engagement));
    suggested.truncate(SUGGESTED_INFLUENCERS);
    suggested
}

/// The last `weeks` weeks of each series, each as a percent of its own peak.
pub fn trend_comparison(series: &[BuzzSeries], weeks: usize) -> Result<Vec<TrendPoint>> {
    if !TREND_WINDOWS.contains(&weeks) {
        return Err(ScopeError::Parse(format!(
            "trend window must be one of {TREND_WINDOWS:?} weeks, got {weeks}"
        )));
    }

    let points = (0..weeks)
        .map(|idx| TrendPoint {
            week: format!("W-{}", weeks - idx),
            shares: series
                .iter()
                .map(|s| {
                    let peak = s.weekly_mentions.iter().copied().max().unwrap_or(0);
                    let value = s.weekly_mentions[WEEKS - weeks + idx];
                    let pct = if peak > 0 {
                        round_half_up(f64::from(value) / f64::from(peak) * 100.0) as i64
                    } else {
                        0
                    };
                    TrendShare {
                        event_id: s.event_id.clone(),
                        pct,
                    }
                })
                .collect(),
        })
        .collect();

    Ok(points)
}
