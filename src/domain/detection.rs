use crate::utils::parse_timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionKind {
    #[serde(rename = "MENCION")]
    Mention,
    #[serde(rename = "SPOT")]
    Spot,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionKind::Mention => write!(f, "MENCION"),
            DetectionKind::Spot => write!(f, "SPOT"),
            DetectionKind::Unknown => write!(f, "DESCONOCIDO"),
        }
    }
}

impl FromStr for DetectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MENCION" | "MENTION" => Ok(DetectionKind::Mention),
            "SPOT" => Ok(DetectionKind::Spot),
            other => Err(format!("unknown detection kind '{other}'")),
        }
    }
}

/// A radio detection of an artist mention or commercial spot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Detection {
    #[serde(rename = "DeteccionID")]
    pub detection_id: i64,
    #[serde(rename = "EmisoraID")]
    pub station_id: i64,
    #[serde(rename = "Emisora")]
    pub station: String,
    #[serde(rename = "Ciudad")]
    pub city: String,
    #[serde(rename = "Pais")]
    pub country: String,
    #[serde(rename = "Artista")]
    pub artist: String,
    #[serde(rename = "Tipo")]
    pub kind: DetectionKind,
    pub venue: String,
    #[serde(rename = "FechaEvento")]
    pub event_date: String,
    #[serde(rename = "NombreEvento")]
    pub event_name: String,
    pub confidence: f64,
    #[serde(rename = "Hora")]
    pub timestamp: String,
    pub audio_url: String,
    #[serde(rename = "Contexto")]
    pub context: String,
}

impl Detection {
    pub fn detected_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopArtist {
    #[serde(rename = "NombreOficial")]
    pub name: String,
    #[serde(rename = "conteo")]
    pub count: u64,
}

/// Payload of `dashboard/resumen`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionsResume {
    #[serde(rename = "totalEmisoras")]
    pub total_stations: u64,
    #[serde(rename = "totalDetecciones")]
    pub total_detections: u64,
    #[serde(rename = "ultimasDetecciones")]
    pub latest_detections: Vec<Detection>,
    #[serde(rename = "topArtistas")]
    pub top_artists: Vec<TopArtist>,
}

/// One row of `dashboard/ranking-eventos`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EventRanking {
    #[serde(rename = "EventGroupID")]
    pub event_group_id: i64,
    #[serde(rename = "NombreEvento")]
    pub event_name: String,
    #[serde(rename = "Artista")]
    pub artist: String,
    #[serde(rename = "Ciudad")]
    pub city: String,
    pub venue: String,
    #[serde(rename = "Fecha")]
    pub date: String,
    pub spots: u64,
    #[serde(rename = "Menciones")]
    pub mentions: u64,
    pub total: u64,
    #[serde(rename = "Alcance")]
    pub reach: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_resume_payload() {
        let payload = r#"{
            "totalEmisoras": 42,
            "totalDetecciones": 1380,
            "ultimasDetecciones": [{
                "DeteccionID": 9001, "EmisoraID": 7, "Emisora": "La Mejor 97.7",
                "Ciudad": "CDMX", "Pais": "México", "Artista": "Peso Pluma",
                "Tipo": "SPOT", "Venue": "Estadio Akron", "FechaEvento": "2025-11-22",
                "NombreEvento": "Éxodo Tour", "Confidence": 0.93,
                "Hora": "2025-10-08T14:32:10", "AudioUrl": "https://cdn/x.mp3",
                "Contexto": "boletos ya a la venta"
            }, {
                "DeteccionID": 9002, "Tipo": "PATROCINIO", "Artista": "Feid"
            }],
            "topArtistas": [{"NombreOficial": "Peso Pluma", "conteo": 311}]
        }"#;

        let resume: MentionsResume = serde_json::from_str(payload).unwrap();
        assert_eq!(resume.total_stations, 42);
        assert_eq!(resume.latest_detections.len(), 2);
        assert_eq!(resume.latest_detections[0].kind, DetectionKind::Spot);
        assert_eq!(resume.latest_detections[0].station, "La Mejor 97.7");
        assert!(resume.latest_detections[0].detected_at().is_some());
        assert_eq!(resume.latest_detections[1].kind, DetectionKind::Unknown);
        assert_eq!(resume.latest_detections[1].city, "");
        assert_eq!(resume.top_artists[0].count, 311);
    }

    #[test]
    fn deserializes_event_ranking_row() {
        let payload = r#"[{"EventGroupID": 3, "NombreEvento": "Mor Tour", "Artista": "Feid",
            "Ciudad": "Puebla", "Venue": "Estadio Cuauhtémoc", "Fecha": "2025-12-18",
            "Spots": 218, "Menciones": 76, "Total": 294, "Alcance": 1200000}]"#;
        let rows: Vec<EventRanking> = serde_json::from_str(payload).unwrap();
        assert_eq!(rows[0].total, 294);
        assert_eq!(rows[0].mentions, 76);
    }

    #[test]
    fn kind_from_str_is_case_insensitive() {
        assert_eq!("spot".parse::<DetectionKind>(), Ok(DetectionKind::Spot));
        assert_eq!("Mencion".parse::<DetectionKind>(), Ok(DetectionKind::Mention));
        assert!("otro".parse::<DetectionKind>().is_err());
    }
}
