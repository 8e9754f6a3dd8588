use crate::domain::EventCatalog;
use crate::error::{Result, ScopeError};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaturationLevel {
    None,
    Low,
    Medium,
    High,
}

impl SaturationLevel {
    pub fn from_event_count(count: usize) -> Self {
        match count {
            0 => SaturationLevel::None,
            1..=2 => SaturationLevel::Low,
            3..=4 => SaturationLevel::Medium,
            _ => SaturationLevel::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub events: usize,
    pub level: SaturationLevel,
    pub event_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    /// Empty cells before the 1st in a Sunday-first grid.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

pub fn month_calendar(catalog: &dyn EventCatalog, year: i32, month: u32) -> Result<MonthCalendar> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ScopeError::Parse(format!("invalid month {year}-{month:02}")))?;

    let dated = catalog.dated_events();

    let days = first
        .iter_days()
        .take_while(|day| day.month() == month)
        .map(|day| {
            let event_ids: Vec<String> = dated
                .iter()
                .filter(|d| d.date == day)
                .map(|d| d.event.id.clone())
                .collect();
            CalendarDay {
                date: day,
                events: event_ids.len(),
                level: SaturationLevel::from_event_count(event_ids.len()),
                event_ids,
            }
        })
        .collect();

    Ok(MonthCalendar {
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
    })
}
