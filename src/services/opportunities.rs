use crate::domain::{DatedEvent, EventCatalog};
use crate::utils::days_between;
use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_HORIZON_DAYS: u32 = 90;
pub const DEFAULT_TOP_OPPORTUNITIES: usize = 15;
const NEARBY_RADIUS_DAYS: i64 = 3;
const NEARBY_WEIGHT: f64 = 0.3;
const MAX_OPPORTUNITY_SCORE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OpportunityBadge {
    Excellent,
    VeryGood,
    Good,
}

impl OpportunityBadge {
    pub fn from_score(score: f64) -> Self {
        if score == 0.0 {
            OpportunityBadge::Excellent
        } else if score <= 0.5 {
            OpportunityBadge::VeryGood
        } else {
            OpportunityBadge::Good
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateOpportunity {
    pub date: NaiveDate,
    pub events_on_day: usize,
    pub nearby_events: usize,
    pub opportunity_score: f64,
    pub badge: OpportunityBadge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenreSaturation {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreOpportunity {
    pub genre: String,
    pub total_events: usize,
    pub avg_events_per_day: f64,
    pub saturation: GenreSaturation,
    pub next_available: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueOpportunity {
    pub venue: String,
    pub total_events: usize,
    pub capacity: u64,
    pub avg_occupancy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityReport {
    pub from: NaiveDate,
    pub horizon_days: u32,
    pub dates: Vec<DateOpportunity>,
    pub genres: Vec<GenreOpportunity>,
    pub venues: Vec<VenueOpportunity>,
}

pub struct OpportunityFinder {
    catalog: Arc<dyn EventCatalog>,
    horizon_days: u32,
    top_n: usize,
}

impl OpportunityFinder {
    pub fn new(catalog: Arc<dyn EventCatalog>, horizon_days: u32, top_n: usize) -> Self {
        Self {
            catalog,
            horizon_days,
            top_n,
        }
    }

    pub fn report(&self, today: NaiveDate) -> OpportunityReport {
        let catalog = self.catalog.as_ref();
        let dates = find_opportunities(catalog, today, self.horizon_days, self.top_n);
        let genres = genre_opportunities(catalog, today, self.horizon_days);
        let venues = venue_opportunities(catalog);

        info!(
            "Found {} date opportunities in the next {} days",
            dates.len(),
            self.horizon_days
        );

        OpportunityReport {
            from: today,
            horizon_days: self.horizon_days,
            dates,
            genres,
            venues,
        }
    }
}

/// Least saturated days from `today` through `today + horizon_days`.
pub fn find_opportunities(
    catalog: &dyn EventCatalog,
    today: NaiveDate,
    horizon_days: u32,
    top_n: usize,
) -> Vec<DateOpportunity> {
    let dated = catalog.dated_events();

    let candidates: Vec<NaiveDate> = days_ahead(today, 0..=i64::from(horizon_days)).collect();

    let mut days: Vec<DateOpportunity> = candidates
        .into_par_iter()
        .map(|day| analyze_day(day, &dated))
        .filter(|day| day.opportunity_score <= MAX_OPPORTUNITY_SCORE)
        .collect();

    days.sort_by(|a, b| a.opportunity_score.total_cmp(&b.opportunity_score));
    days.truncate(top_n);
    days
}

/// `today + offset` for each offset, stopping at the last representable date.
fn days_ahead(
    today: NaiveDate,
    offsets: impl Iterator<Item = i64>,
) -> impl Iterator<Item = NaiveDate> {
    offsets.map_while(move |offset| today.checked_add_signed(Duration::days(offset)))
}

fn analyze_day(day: NaiveDate, dated: &[DatedEvent<'_>]) -> DateOpportunity {
    let (mut events_on_day, mut nearby_events) = (0, 0);
    for d in dated {
        let diff = days_between(day, d.date).abs();
        if diff == 0 {
            events_on_day += 1;
        } else if diff <= NEARBY_RADIUS_DAYS {
            nearby_events += 1;
        }
    }

    let opportunity_score = events_on_day as f64 + nearby_events as f64 * NEARBY_WEIGHT;

    DateOpportunity {
        date: day,
        events_on_day,
        nearby_events,
        opportunity_score,
        badge: OpportunityBadge::from_score(opportunity_score),
    }
}

/// Genres ordered from least to most active over the horizon.
pub fn genre_opportunities(
    catalog: &dyn EventCatalog,
    today: NaiveDate,
    horizon_days: u32,
) -> Vec<GenreOpportunity> {
    let dated = catalog.dated_events();
    let horizon = f64::from(horizon_days.max(1));

    let mut genres: Vec<GenreOpportunity> = catalog
        .genres()
        .into_iter()
        .map(|genre| {
            let total_events = catalog.events().iter().filter(|e| e.genre == genre).count();
            let avg_events_per_day = total_events as f64 / horizon;

            let next_available = days_ahead(today, 0..i64::from(horizon_days))
                .find(|day| !dated.iter().any(|d| d.event.genre == genre && d.date == *day));

            let saturation = if avg_events_per_day < 0.3 {
                GenreSaturation::Low
            } else if avg_events_per_day < 0.6 {
                GenreSaturation::Medium
            } else {
                GenreSaturation::High
            };

            GenreOpportunity {
                genre,
                total_events,
                avg_events_per_day,
                saturation,
                next_available,
            }
        })
        .collect();

    genres.sort_by(|a, b| a.avg_events_per_day.total_cmp(&b.avg_events_per_day));
    genres
}

/// Venues ordered from least to most booked.
pub fn venue_opportunities(catalog: &dyn EventCatalog) -> Vec<VenueOpportunity> {
    let mut venues: Vec<VenueOpportunity> = catalog
        .venues()
        .into_iter()
        .map(|venue| {
            let events: Vec<_> = catalog
                .events()
                .iter()
                .filter(|e| e.venue == venue)
                .collect();
            let capacity = events.first().map(|e| e.capacity_or_zero()).unwrap_or(0);
            let avg_occupancy = events.iter().map(|e| e.occupancy_or_default()).sum::<f64>()
                / events.len().max(1) as f64;

            VenueOpportunity {
                venue,
                total_events: events.len(),
                capacity,
                avg_occupancy,
            }
        })
        .collect();

    venues.sort_by_key(|v| v.total_events);
    venues
}
