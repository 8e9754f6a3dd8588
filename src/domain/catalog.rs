use super::EventRecord;
use chrono::NaiveDate;
use tracing::warn;

/// Read-only access to the event catalog.
///
/// Every analysis receives the catalog through this trait, so fixtures can
/// stand in for the production dataset.
pub trait EventCatalog: Send + Sync {
    fn events(&self) -> &[EventRecord];

    /// Events paired with their parsed calendar day.
    ///
    /// Records whose date does not parse are skipped with a warning.
    fn dated_events(&self) -> Vec<DatedEvent<'_>> {
        self.events()
            .iter()
            .filter_map(|event| match event.date() {
                Some(date) => Some(DatedEvent { event, date }),
                None => {
                    warn!(
                        "Skipping event {} with unparseable date '{}'",
                        event.id, event.raw_date()
                    );
                    None
                }
            })
            .collect()
    }

    /// Distinct genres in catalog order.
    fn genres(&self) -> Vec<String> {
        distinct(self.events().iter().map(|e| e.genre.as_str()))
    }

    /// Distinct venues in catalog order.
    fn venues(&self) -> Vec<String> {
        distinct(self.events().iter().map(|e| e.venue.as_str()))
    }

    fn find(&self, id: &str) -> Option<&EventRecord> {
        self.events().iter().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DatedEvent<'a> {
    pub event: &'a EventRecord,
    pub date: NaiveDate,
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|v| v == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Catalog snapshot held in memory, loaded once at start.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    events: Vec<EventRecord>,
}

impl InMemoryCatalog {
    pub fn new(events: Vec<EventRecord>) -> Self {
        Self { events }
    }
}

impl EventCatalog for InMemoryCatalog {
    fn events(&self) -> &[EventRecord] {
        &self.events
    }
}

impl From<Vec<EventRecord>> for InMemoryCatalog {
    fn from(events: Vec<EventRecord>) -> Self {
        Self::new(events)
    }
}
