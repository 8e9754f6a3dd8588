use crate::domain::EventCatalog;
use crate::utils::round_half_up;
use chrono::{Datelike, Weekday};
use serde::Serialize;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];
const REVENUE_PER_OCCUPANCY_POINT: f64 = 50.0;
const VENUE_NAME_MAX_CHARS: usize = 20;
const TOP_VENUES: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthBucket {
    pub month: u32,
    pub events: usize,
    pub capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayBucket {
    pub weekday: Weekday,
    pub events: usize,
    pub estimated_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueAttendance {
    pub venue: String,
    pub avg_attendance: i64,
    pub events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalMetrics {
    pub total_events: usize,
    pub monthly_average: f64,
    pub busiest_weekday: Weekday,
    pub busiest_weekday_events: usize,
    pub monthly: Vec<MonthBucket>,
    pub weekdays: Vec<WeekdayBucket>,
    pub genres: Vec<(String, usize)>,
    pub venues: Vec<VenueAttendance>,
}

pub fn temporal_metrics(catalog: &dyn EventCatalog) -> TemporalMetrics {
    let dated = catalog.dated_events();

    let mut monthly: Vec<MonthBucket> = (1..=12)
        .map(|month| MonthBucket {
            month,
            ..Default::default()
        })
        .collect();
    let mut weekdays: Vec<WeekdayBucket> = WEEKDAYS
        .iter()
        .map(|&weekday| WeekdayBucket {
            weekday,
            events: 0,
            estimated_revenue: 0.0,
        })
        .collect();

    for d in &dated {
        let month = &mut monthly[d.date.month0() as usize];
        month.events += 1;
        month.capacity += d.event.capacity_or_zero();

        let weekday = &mut weekdays[d.date.weekday().num_days_from_sunday() as usize];
        weekday.events += 1;
        weekday.estimated_revenue += d.event.capacity_or_zero() as f64
            * d.event.occupancy_or_default()
            * REVENUE_PER_OCCUPANCY_POINT;
    }

    // first maximum wins
    let busiest = weekdays
        .iter()
        .fold(&weekdays[0], |max, day| if day.events > max.events { day } else { max });
    let (busiest_weekday, busiest_weekday_events) = (busiest.weekday, busiest.events);

    let total_events = catalog.events().len();

    TemporalMetrics {
        total_events,
        monthly_average: total_events as f64 / 12.0,
        busiest_weekday,
        busiest_weekday_events,
        genres: genre_distribution(catalog),
        venues: venue_attendance(catalog),
        monthly,
        weekdays,
    }
}

pub fn genre_distribution(catalog: &dyn EventCatalog) -> Vec<(String, usize)> {
    catalog
        .genres()
        .into_iter()
        .map(|genre| {
            let count = catalog.events().iter().filter(|e| e.genre == genre).count();
            (genre, count)
        })
        .collect()
}

/// Average expected attendance per venue, busiest first.
pub fn venue_attendance(catalog: &dyn EventCatalog) -> Vec<VenueAttendance> {
    let mut venues: Vec<VenueAttendance> = catalog
        .venues()
        .into_iter()
        .map(|venue| {
            let events: Vec<_> = catalog.events().iter().filter(|e| e.venue == venue).collect();
            let total: f64 = events
                .iter()
                .map(|e| e.capacity_or_zero() as f64 * e.occupancy_or_default() / 100.0)
                .sum();

            VenueAttendance {
                venue: truncate_name(&venue),
                avg_attendance: round_half_up(total / events.len().max(1) as f64) as i64,
                events: events.len(),
            }
        })
        .collect();

    venues.sort_by(|a, b| b.avg_attendance.cmp(&a.avg_attendance));
    venues.truncate(TOP_VENUES);
    venues
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() > VENUE_NAME_MAX_CHARS {
        let short: String = name.chars().take(VENUE_NAME_MAX_CHARS).collect();
        format!("{short}...")
    } else {
        name.to_string()
    }
}
