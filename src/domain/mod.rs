mod catalog;
mod detection;
mod event;
mod report;
pub(crate) mod storage;

pub use catalog::{DatedEvent, EventCatalog, InMemoryCatalog};
pub use detection::{Detection, DetectionKind, EventRanking, MentionsResume};
#[cfg(test)]
pub use detection::TopArtist;
pub use event::{parse_reach_millions, EventRecord};
pub use report::Report;
