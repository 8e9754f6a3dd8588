use crate::domain::{EventCatalog, EventRecord};
use crate::utils::days_between;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

const NEARBY_RADIUS_DAYS: i64 = 7;
const HIGH_CAPACITY_THRESHOLD: u64 = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViabilityLevel {
    Excellent,
    Good,
    Medium,
    Low,
}

impl ViabilityLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => ViabilityLevel::Excellent,
            60..=79 => ViabilityLevel::Good,
            40..=59 => ViabilityLevel::Medium,
            _ => ViabilityLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorSign {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreFactor {
    pub text: &'static str,
    pub impact: i32,
    pub sign: FactorSign,
}

impl ScoreFactor {
    fn new(text: &'static str, impact: i32) -> Self {
        let sign = if impact >= 0 {
            FactorSign::Positive
        } else {
            FactorSign::Negative
        };
        Self { text, impact, sign }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateAnalysis {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub score: u8,
    pub level: ViabilityLevel,
    pub factors: Vec<ScoreFactor>,
    pub events_on_date: Vec<EventRecord>,
    pub nearby_count: usize,
    pub genre_breakdown: Vec<(String, usize)>,
    pub total_capacity: u64,
    pub avg_occupancy: f64,
}

/// Scores how good a calendar date is for scheduling a new event.
pub struct DateViabilityScorer {
    catalog: Arc<dyn EventCatalog>,
}

impl DateViabilityScorer {
    pub fn new(catalog: Arc<dyn EventCatalog>) -> Self {
        Self { catalog }
    }

    pub fn score_date(&self, target: NaiveDate) -> DateAnalysis {
        score_date(self.catalog.as_ref(), target)
    }
}

pub fn score_date(catalog: &dyn EventCatalog, target: NaiveDate) -> DateAnalysis {
    let dated = catalog.dated_events();

    let events_on_date: Vec<EventRecord> = dated
        .iter()
        .filter(|d| d.date == target)
        .map(|d| d.event.clone())
        .collect();

    let nearby_count = dated
        .iter()
        .filter(|d| {
            let diff = days_between(target, d.date).abs();
            diff > 0 && diff <= NEARBY_RADIUS_DAYS
        })
        .count();

    let mut genre_breakdown: Vec<(String, usize)> = Vec::new();
    for event in &events_on_date {
        match genre_breakdown.iter_mut().find(|(g, _)| *g == event.genre) {
            Some((_, count)) => *count += 1,
            None => genre_breakdown.push((event.genre.clone(), 1)),
        }
    }

    let total_capacity: u64 = events_on_date.iter().map(|e| e.capacity_or_zero()).sum();
    let avg_occupancy = if events_on_date.is_empty() {
        0.0
    } else {
        events_on_date
            .iter()
            .map(|e| e.occupancy_or_default())
            .sum::<f64>()
            / events_on_date.len() as f64
    };

    let mut factors = Vec::new();

    match events_on_date.len() {
        0 => factors.push(ScoreFactor::new("Sin eventos programados", 20)),
        n if n >= 5 => factors.push(ScoreFactor::new("Día muy saturado", -30)),
        n if n >= 3 => factors.push(ScoreFactor::new("Múltiples eventos", -15)),
        _ => {}
    }

    if nearby_count < 3 {
        factors.push(ScoreFactor::new("Poca competencia cercana", 15));
    } else if nearby_count > 10 {
        factors.push(ScoreFactor::new("Alta competencia en la semana", -20));
    }

    if total_capacity > HIGH_CAPACITY_THRESHOLD {
        factors.push(ScoreFactor::new("Alta capacidad comprometida", -10));
    }

    let weekday = target.weekday();
    if matches!(weekday, Weekday::Fri | Weekday::Sat) {
        factors.push(ScoreFactor::new("Fin de semana (mayor asistencia)", 10));
    }

    let raw_score: i32 = 100 + factors.iter().map(|f| f.impact).sum::<i32>();
    let score = raw_score.clamp(0, 100) as u8;

    debug!(
        "Date {} scored {} ({} on date, {} nearby)",
        target,
        score,
        events_on_date.len(),
        nearby_count
    );

    DateAnalysis {
        date: target,
        weekday,
        score,
        level: ViabilityLevel::from_score(score),
        factors,
        events_on_date,
        nearby_count,
        genre_breakdown,
        total_capacity,
        avg_occupancy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InMemoryCatalog;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event_on(id: usize, day: NaiveDate) -> EventRecord {
        EventRecord::new(
            format!("ev-{id}"),
            day.format("%Y-%m-%d").to_string(),
            "Pop",
            "CDMX",
            "Foro Sol",
        )
        .with_capacity(1_000)
    }

    #[test]
    fn empty_calendar_is_excellent() {
        let catalog = InMemoryCatalog::default();
        // Tuesday
        let analysis = score_date(&catalog, date(2025, 11, 18));
        assert_eq!(analysis.score, 100);
        assert_eq!(analysis.level, ViabilityLevel::Excellent);
        let texts: Vec<&str> = analysis.factors.iter().map(|f| f.text).collect();
        assert_eq!(texts, vec!["Sin eventos programados", "Poca competencia cercana"]);
        assert_eq!(analysis.avg_occupancy, 0.0);

        // Saturday gets the weekend factor and is still clamped at 100
        let analysis = score_date(&catalog, date(2025, 11, 22));
        assert_eq!(analysis.score, 100);
        assert_eq!(analysis.factors.len(), 3);
    }

    #[test]
    fn saturated_tuesday_scores_fifty() {
        let target = date(2025, 11, 18);
        assert_eq!(target.weekday(), Weekday::Tue);

        let mut events: Vec<EventRecord> = (0..6).map(|i| event_on(i, target)).collect();
        for i in 0..12 {
            let offset = (i % 7) as i64 + 1;
            let day = if i % 2 == 0 {
                target + chrono::Duration::days(offset)
            } else {
                target - chrono::Duration::days(offset)
            };
            events.push(event_on(100 + i, day));
        }
        // Outside the +/-7 window
        events.push(event_on(500, target + chrono::Duration::days(8)));

        let analysis = score_date(&InMemoryCatalog::new(events), target);
        assert_eq!(analysis.events_on_date.len(), 6);
        assert_eq!(analysis.nearby_count, 12);
        assert_eq!(analysis.score, 50);
        assert_eq!(analysis.level, ViabilityLevel::Medium);
        assert!(analysis
            .factors
            .iter()
            .all(|f| f.sign == FactorSign::Negative));
    }

    #[test]
    fn multiple_events_band_and_capacity_penalty() {
        let target = date(2025, 11, 19);
        let events = vec![
            event_on(1, target).with_capacity(30_000),
            event_on(2, target).with_capacity(25_000).with_occupancy(55.0),
            event_on(3, target),
        ];
        let analysis = score_date(&InMemoryCatalog::new(events), target);

        // 100 - 15 + 15 - 10
        assert_eq!(analysis.score, 90);
        assert_eq!(analysis.total_capacity, 56_000);
        assert!((analysis.avg_occupancy - (75.0 + 55.0 + 75.0) / 3.0).abs() < 1e-9);
        assert_eq!(analysis.genre_breakdown, vec![("Pop".to_string(), 3)]);
    }

    #[test]
    fn unparseable_dates_do_not_count() {
        let target = date(2025, 11, 19);
        let events = vec![
            EventRecord::new("x", "??", "Pop", "CDMX", "Foro Sol"),
            event_on(1, target),
        ];
        let analysis = score_date(&InMemoryCatalog::new(events), target);
        assert_eq!(analysis.events_on_date.len(), 1);
        // one event on the date gets no band adjustment
        assert_eq!(analysis.score, 100);
    }

    #[test]
    fn scores_are_bounded_and_idempotent() {
        let target = date(2025, 12, 5);
        let events: Vec<EventRecord> = (0..40)
            .map(|i| {
                event_on(i, target + chrono::Duration::days((i % 5) as i64)).with_capacity(20_000)
            })
            .collect();
        let catalog: Arc<dyn EventCatalog> = Arc::new(InMemoryCatalog::new(events));
        let scorer = DateViabilityScorer::new(catalog);

        for offset in -10..10 {
            let analysis = scorer.score_date(target + chrono::Duration::days(offset));
            assert!(analysis.score <= 100);
        }
        assert_eq!(scorer.score_date(target), scorer.score_date(target));
    }

    #[test]
    fn level_thresholds() {
        assert_eq!(ViabilityLevel::from_score(80), ViabilityLevel::Excellent);
        assert_eq!(ViabilityLevel::from_score(79), ViabilityLevel::Good);
        assert_eq!(ViabilityLevel::from_score(60), ViabilityLevel::Good);
        assert_eq!(ViabilityLevel::from_score(40), ViabilityLevel::Medium);
        assert_eq!(ViabilityLevel::from_score(39), ViabilityLevel::Low);
    }
}
