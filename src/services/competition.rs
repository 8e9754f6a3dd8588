use crate::domain::{DatedEvent, EventCatalog, EventRecord};
use crate::utils::days_between;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Radius used to count competing events, independent of the display window.
///
/// The report lets the caller pick a window (7, 14, 30 days...) but the
/// competition count has always used +/-4 days. The selected window is only
/// echoed back as `window_days`.
pub const COMPETITION_RADIUS_DAYS: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompetitionLevel {
    Low,
    Medium,
    High,
}

impl CompetitionLevel {
    pub fn from_nearby_count(count: usize) -> Self {
        match count {
            0 => CompetitionLevel::Low,
            1 | 2 => CompetitionLevel::Medium,
            _ => CompetitionLevel::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyEvent {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub venue: String,
    pub genre: String,
    pub capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitionEntry {
    pub event: EventRecord,
    pub nearby_count: usize,
    pub level: CompetitionLevel,
    pub nearby_events: Vec<NearbyEvent>,
    pub total_nearby_capacity: u64,
    pub window_days: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompetitionSummary {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

pub struct SaturationClassifier {
    catalog: Arc<dyn EventCatalog>,
}

impl SaturationClassifier {
    pub fn new(catalog: Arc<dyn EventCatalog>) -> Self {
        Self { catalog }
    }

    pub fn classify(&self, genre: Option<&str>, window_days: u32) -> Vec<CompetitionEntry> {
        classify_competition(self.catalog.as_ref(), genre, window_days)
    }
}

/// Local competition of every event, least competitive first.
///
/// All genres compete: `genre` only selects which events get classified.
pub fn classify_competition(
    catalog: &dyn EventCatalog,
    genre: Option<&str>,
    window_days: u32,
) -> Vec<CompetitionEntry> {
    let dated = catalog.dated_events();

    let mut entries: Vec<CompetitionEntry> = dated
        .par_iter()
        .filter(|d| genre.map_or(true, |g| d.event.genre == g))
        .map(|d| competition_for(d, &dated, window_days))
        .collect();

    entries.sort_by_key(|entry| entry.nearby_count);

    info!(
        "Classified competition for {} events (genre: {})",
        entries.len(),
        genre.unwrap_or("todos")
    );

    entries
}

fn competition_for(
    subject: &DatedEvent<'_>,
    dated: &[DatedEvent<'_>],
    window_days: u32,
) -> CompetitionEntry {
    let nearby_events: Vec<NearbyEvent> = dated
        .iter()
        .filter(|other| other.event.id != subject.event.id)
        .filter(|other| other.event.city == subject.event.city)
        .filter(|other| days_between(subject.date, other.date).abs() <= COMPETITION_RADIUS_DAYS)
        .map(|other| NearbyEvent {
            id: other.event.id.clone(),
            name: other.event.display_name().to_string(),
            date: other.date,
            venue: other.event.venue.clone(),
            genre: other.event.genre.clone(),
            capacity: other.event.capacity_or_zero(),
        })
        .collect();

    CompetitionEntry {
        event: subject.event.clone(),
        nearby_count: nearby_events.len(),
        level: CompetitionLevel::from_nearby_count(nearby_events.len()),
        total_nearby_capacity: nearby_events.iter().map(|n| n.capacity).sum(),
        nearby_events,
        window_days,
    }
}

pub fn competition_summary(entries: &[CompetitionEntry]) -> CompetitionSummary {
    entries
        .iter()
        .fold(CompetitionSummary::default(), |mut acc, entry| {
            match entry.level {
                CompetitionLevel::Low => acc.low += 1,
                CompetitionLevel::Medium => acc.medium += 1,
                CompetitionLevel::High => acc.high += 1,
            }
            acc
        })
}
