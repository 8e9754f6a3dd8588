use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope stored for every saved report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub kind: String,
    pub generated_at: String,
    pub metadata: ReportMetadata,
    pub payload: Value,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub catalog_events: usize,
    pub version: String,
}

impl Report {
    pub fn new(kind: impl Into<String>, catalog_events: usize, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            generated_at: Local::now().to_rfc3339(),
            metadata: ReportMetadata {
                catalog_events,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            payload,
        }
    }
}
