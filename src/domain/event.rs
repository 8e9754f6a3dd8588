use crate::utils::parse_calendar_date;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_OCCUPANCY_RATE: f64 = 75.0;

/// One scheduled music event of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "dateISO", default, skip_serializing_if = "Option::is_none")]
    pub date_iso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(alias = "genero")]
    pub genre: String,
    #[serde(alias = "ciudad")]
    pub city: String,
    pub venue: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "evento")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "artista")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "capacidad")]
    pub capacity: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "alcance")]
    pub reach: Option<String>,
    #[serde(default, alias = "radio_spots")]
    pub radio_spots: u64,
    #[serde(default, alias = "radio_menciones")]
    pub radio_mentions: u64,
}

#[cfg(test)]
impl EventRecord {
    pub fn new(
        id: impl Into<String>,
        date_iso: impl Into<String>,
        genre: impl Into<String>,
        city: impl Into<String>,
        venue: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date_iso: Some(date_iso.into()),
            date: None,
            fecha: None,
            genre: genre.into(),
            city: city.into(),
            venue: venue.into(),
            name: None,
            artist: None,
            capacity: None,
            occupancy_rate: None,
            reach: None,
            radio_spots: 0,
            radio_mentions: 0,
        }
    }

    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_occupancy(mut self, occupancy_rate: f64) -> Self {
        self.occupancy_rate = Some(occupancy_rate);
        self
    }

    pub fn with_reach(mut self, reach: impl Into<String>) -> Self {
        self.reach = Some(reach.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>, name: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self.name = Some(name.into());
        self
    }

    pub fn with_radio(mut self, spots: u64, mentions: u64) -> Self {
        self.radio_spots = spots;
        self.radio_mentions = mentions;
        self
    }
}

impl EventRecord {
    /// Date text as stored, `dateISO` first, then `date`, then `fecha`.
    pub fn raw_date(&self) -> &str {
        self.date_iso
            .as_deref()
            .or(self.date.as_deref())
            .or(self.fecha.as_deref())
            .unwrap_or("")
    }

    /// Calendar day of the event, `None` when the stored date does not parse.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_calendar_date(self.raw_date())
    }

    pub fn capacity_or_zero(&self) -> u64 {
        self.capacity.unwrap_or(0)
    }

    pub fn occupancy_or_default(&self) -> f64 {
        self.occupancy_rate.unwrap_or(DEFAULT_OCCUPANCY_RATE)
    }

    pub fn reach_or_zero(&self) -> &str {
        self.reach.as_deref().unwrap_or("0")
    }

    pub fn radio_total(&self) -> u64 {
        self.radio_spots + self.radio_mentions
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Ids come as strings in hand-kept catalogs and as numbers in exported ones.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(text) => text,
        StringOrNumber::Integer(n) => n.to_string(),
        StringOrNumber::Float(n) => n.to_string(),
    })
}

/// Reach strings look like `2.8M`, `950K` or a bare number.
///
/// `M` values are millions already, anything else is read as thousands and
/// converted. Returns `None` when no number can be read.
pub fn parse_reach_millions(reach: &str) -> Option<f64> {
    let cleaned: String = reach.trim().chars().filter(|c| *c != 'K' && *c != 'M').collect();
    let number: f64 = cleaned.trim().parse().ok()?;

    if reach.contains('M') {
        Some(number)
    } else {
        Some(number / 1000.0)
    }
}
